//! Document encoder: syntax tree to JSON-compatible document.
//!
//! Converts an arbitrary [`TreeNode`] graph into a `serde_json` map,
//! preserving structure: nested nodes become nested documents, ordered
//! sequences are rebuilt with non-encodable elements dropped, and
//! source positions are flattened into sibling `line`/`col` fields.
//!
//! Encoding is a pure function of the input tree plus the injected
//! engine version; the input is never mutated.

use serde_json::{Map, Value};

use super::node::{Attr, InnerItem, SeqItem, TreeNode};
use crate::error::{AstwireError, Result};

/// The JSON-compatible rendering of one tree node and its subtree.
pub type Document = Map<String, Value>;

/// Maximum recursion depth before encoding is aborted.
///
/// Defensive guard against unexpectedly cyclic or pathologically deep
/// trees; tripping it is a fatal internal error, not a normal path.
pub const MAX_ENCODE_DEPTH: usize = 5000;

/// Conventional type-class suffix stripped from type tags.
const NODE_SUFFIX: &str = "Node";

/// Key carrying the node's type tag.
pub const NODE_KEY: &str = "__node__";

/// Key carrying the engine version, present only on the root document.
pub const VERSION_KEY: &str = "__version__";

/// Encoder for turning [`TreeNode`] graphs into [`Document`]s.
///
/// The transformation engine's version string is injected at
/// construction rather than read from process-wide state.
pub struct DocumentEncoder {
    /// Version string emitted as `__version__` on root documents.
    version: String,
    /// Recursion depth bound.
    max_depth: usize,
}

impl DocumentEncoder {
    /// Create an encoder stamping root documents with `version`.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            max_depth: MAX_ENCODE_DEPTH,
        }
    }

    /// Create an encoder with a custom recursion bound.
    pub fn with_max_depth(version: impl Into<String>, max_depth: usize) -> Self {
        Self {
            version: version.into(),
            max_depth,
        }
    }

    /// Encode a tree into a document.
    ///
    /// Only the root document carries `__version__`.
    ///
    /// # Errors
    ///
    /// Returns [`AstwireError::DepthExceeded`] if the tree is deeper
    /// than the configured bound. This is fatal to the bridge: a tree
    /// that deep is assumed to be cyclic or malformed.
    pub fn encode(&self, node: &dyn TreeNode) -> Result<Document> {
        self.encode_at(node, 1)
    }

    fn encode_at(&self, node: &dyn TreeNode, depth: usize) -> Result<Document> {
        if depth >= self.max_depth {
            return Err(AstwireError::DepthExceeded {
                max_depth: self.max_depth,
            });
        }

        let mut doc = Document::new();
        doc.insert(
            NODE_KEY.to_string(),
            Value::String(strip_node_suffix(node.type_tag()).to_string()),
        );
        if depth == 1 {
            doc.insert(VERSION_KEY.to_string(), Value::String(self.version.clone()));
        }

        for (name, attr) in node.attributes() {
            match attr {
                Attr::Pos(pos) => {
                    // The source unit is discarded; the attribute's own
                    // name is never emitted.
                    doc.insert("line".to_string(), Value::from(pos.line));
                    doc.insert("col".to_string(), Value::from(pos.col));
                }
                Attr::Node(child) => {
                    doc.insert(name, Value::Object(self.encode_at(child, depth + 1)?));
                }
                Attr::Seq(items) => {
                    doc.insert(name, Value::Array(self.encode_seq(items, depth)?));
                }
                Attr::Scalar(scalar) => {
                    doc.insert(name, Value::String(scalar.to_string()));
                }
            }
        }

        Ok(doc)
    }

    /// Rebuild a top-level attribute sequence.
    ///
    /// Keeps encoded nodes and rebuilt nested sequences; every other
    /// element kind is dropped silently.
    fn encode_seq(&self, items: Vec<SeqItem<'_>>, depth: usize) -> Result<Vec<Value>> {
        let mut out = Vec::new();
        for item in items {
            match item {
                SeqItem::Node(child) => {
                    out.push(Value::Object(self.encode_at(child, depth + 1)?));
                }
                SeqItem::Seq(inner) => {
                    let mut tup = Vec::new();
                    for el in inner {
                        match el {
                            InnerItem::Str(s) => tup.push(Value::String(s)),
                            InnerItem::Bytes(b) => {
                                tup.push(Value::String(String::from_utf8_lossy(&b).into_owned()));
                            }
                            InnerItem::Node(child) => {
                                tup.push(Value::Object(self.encode_at(child, depth + 1)?));
                            }
                            InnerItem::Other(_) => {}
                        }
                    }
                    out.push(Value::Array(tup));
                }
                SeqItem::Other(_) => {}
            }
        }
        Ok(out)
    }
}

/// Strip the conventional `"Node"` suffix from a type tag.
fn strip_node_suffix(tag: &str) -> &str {
    tag.strip_suffix(NODE_SUFFIX).unwrap_or(tag)
}
