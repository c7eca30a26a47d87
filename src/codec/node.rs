//! Tree node interface consumed by the document encoder.
//!
//! Nodes come from an external transformation engine (a parser or
//! compiler front end). Rather than reflecting over runtime fields,
//! every node variant declares its attributes as an explicit list of
//! `(name, value)` descriptors, so the encoder stays generic over a
//! closed set of value kinds.
//!
//! # Example
//!
//! ```
//! use astwire::codec::{Attr, Scalar, TreeNode};
//!
//! struct NameNode {
//!     id: String,
//! }
//!
//! impl TreeNode for NameNode {
//!     fn type_tag(&self) -> &str {
//!         "NameNode"
//!     }
//!
//!     fn attributes(&self) -> Vec<(String, Attr<'_>)> {
//!         vec![("id".into(), Attr::Scalar(Scalar::Str(self.id.clone())))]
//!     }
//! }
//! ```

use std::fmt;

/// An opaque, externally owned syntax tree node.
///
/// Object-safe so transformation engines can hand back heterogeneous
/// node graphs as `Box<dyn TreeNode>`. The tree reachable from a node
/// must be finite and acyclic; the encoder's depth guard is the only
/// defense against violations.
pub trait TreeNode {
    /// The node's structural class name (e.g. `"ModuleNode"`).
    ///
    /// A trailing `"Node"` suffix, if present, is stripped by the
    /// encoder before it is emitted as `__node__`.
    fn type_tag(&self) -> &str;

    /// The node's named attributes, in a stable enumeration order.
    ///
    /// Order is not semantically significant to callers.
    fn attributes(&self) -> Vec<(String, Attr<'_>)>;
}

/// A plain scalar attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// A string value.
    Str(String),
    /// An integer value.
    Int(i64),
    /// A floating point value.
    Float(f64),
    /// A boolean value.
    Bool(bool),
    /// An absent value.
    Null,
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => f.write_str(s),
            Scalar::Int(n) => write!(f, "{n}"),
            Scalar::Float(n) => write!(f, "{n}"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Null => f.write_str("null"),
        }
    }
}

/// A source coordinate: `(source unit, line, column)`.
///
/// The source unit identifies the file the coordinates refer to; the
/// encoder discards it and emits only `line` and `col`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePos {
    /// Identifier of the source unit (typically a file name).
    pub unit: String,
    /// 1-based line number.
    pub line: u32,
    /// 0-based column number.
    pub col: u32,
}

impl SourcePos {
    /// Create a new source position.
    pub fn new(unit: impl Into<String>, line: u32, col: u32) -> Self {
        Self {
            unit: unit.into(),
            line,
            col,
        }
    }
}

/// The value of one named attribute.
pub enum Attr<'a> {
    /// A plain scalar, rendered as its string representation.
    Scalar(Scalar),
    /// The node's source position (`pos` / `position` attributes).
    ///
    /// Rendered as sibling `line` and `col` fields; the attribute's own
    /// name is never emitted.
    Pos(SourcePos),
    /// A nested child node, encoded recursively.
    Node(&'a dyn TreeNode),
    /// An ordered sequence of children.
    Seq(Vec<SeqItem<'a>>),
}

/// One element of a top-level attribute sequence.
pub enum SeqItem<'a> {
    /// A child node, encoded recursively.
    Node(&'a dyn TreeNode),
    /// A nested sequence (at most this one extra level).
    Seq(Vec<InnerItem<'a>>),
    /// Any other element; dropped from the rebuilt sequence.
    Other(Scalar),
}

/// One element of a nested sequence.
pub enum InnerItem<'a> {
    /// A string scalar, kept as-is.
    Str(String),
    /// A byte-string scalar, kept (decoded leniently to text).
    Bytes(Vec<u8>),
    /// A child node, encoded recursively.
    Node(&'a dyn TreeNode),
    /// Any other element; dropped.
    Other(Scalar),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::Str("abc".into()).to_string(), "abc");
        assert_eq!(Scalar::Int(-7).to_string(), "-7");
        assert_eq!(Scalar::Float(1.5).to_string(), "1.5");
        assert_eq!(Scalar::Bool(true).to_string(), "true");
        assert_eq!(Scalar::Null.to_string(), "null");
    }

    #[test]
    fn test_source_pos_new() {
        let pos = SourcePos::new("mod.pyx", 10, 4);
        assert_eq!(pos.unit, "mod.pyx");
        assert_eq!(pos.line, 10);
        assert_eq!(pos.col, 4);
    }
}
