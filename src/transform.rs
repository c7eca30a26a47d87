//! Transformation engine seam.
//!
//! The bridge does not parse anything itself: the embedding process
//! supplies a [`Transform`] that turns raw source text into a
//! [`TreeNode`] graph. The one failure mode a transformation may report
//! as data (rather than as a bridge malfunction) is a compile error,
//! which is itself tree-shaped so the encoder can render it.

use std::fmt;

use crate::codec::TreeNode;

/// A source-to-tree transformation engine.
///
/// Implementations wrap a real parser or compiler front end; tests use
/// synthetic nodes.
pub trait Transform: Send + Sync {
    /// Version string of the underlying engine, stamped into root
    /// documents as `__version__`.
    fn version(&self) -> &str;

    /// Parse `source` into a tree.
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError`] when the source itself is invalid.
    /// This is domain data, not a bridge failure: the dispatcher
    /// encodes the error node and marks the document `is_error: true`.
    fn transform(&self, source: &str) -> std::result::Result<Box<dyn TreeNode>, CompileError>;
}

/// A compile error reported by a transformation engine.
///
/// Wraps a tree-shaped error object so it travels through the same
/// document encoding as a successful parse.
pub struct CompileError {
    node: Box<dyn TreeNode>,
}

impl CompileError {
    /// Wrap a tree-shaped error object.
    pub fn new(node: Box<dyn TreeNode>) -> Self {
        Self { node }
    }

    /// The error object, ready for document encoding.
    pub fn node(&self) -> &dyn TreeNode {
        self.node.as_ref()
    }
}

impl fmt::Debug for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileError")
            .field("type_tag", &self.node.type_tag())
            .finish()
    }
}
