//! Codec module - tree-to-document encoding.
//!
//! This module turns externally owned syntax trees into JSON-compatible
//! documents:
//!
//! - [`TreeNode`] - the closed attribute-descriptor interface nodes
//!   implement
//! - [`DocumentEncoder`] - the structure-preserving, depth-bounded
//!   encoder
//!
//! # Example
//!
//! ```
//! use astwire::codec::{Attr, DocumentEncoder, TreeNode};
//!
//! struct PassStatNode;
//!
//! impl TreeNode for PassStatNode {
//!     fn type_tag(&self) -> &str {
//!         "PassStatNode"
//!     }
//!     fn attributes(&self) -> Vec<(String, Attr<'_>)> {
//!         Vec::new()
//!     }
//! }
//!
//! let encoder = DocumentEncoder::new("3.0.11");
//! let doc = encoder.encode(&PassStatNode).unwrap();
//! assert_eq!(doc["__node__"], "PassStat");
//! assert_eq!(doc["__version__"], "3.0.11");
//! ```

mod document;
mod node;

pub use document::{Document, DocumentEncoder, MAX_ENCODE_DEPTH, NODE_KEY, VERSION_KEY};
pub use node::{Attr, InnerItem, Scalar, SeqItem, SourcePos, TreeNode};
