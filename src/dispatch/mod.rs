//! Command dispatcher - routes decoded frame bodies.
//!
//! The dispatcher is the catch-all boundary of the bridge: whatever a
//! frame body contains, [`Dispatcher::process`] returns valid JSON
//! bytes for the peer. Recoverable failures (bad JSON, missing fields,
//! unknown commands) become `<errored>` / `<unexpected>` envelopes and
//! the connection survives; only fatal conditions - the encoder depth
//! guard - propagate as `Err` and take the bridge down.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use astwire::dispatch::Dispatcher;
//!
//! let dispatcher = Dispatcher::new(Arc::new(MyTransform::new()));
//! let response = dispatcher.process(br#"{"command":"transform_to_document","contents":"x = 1"}"#)?;
//! ```

mod envelope;

use std::sync::Arc;

use serde_json::Value;

use crate::codec::{Document, DocumentEncoder};
use crate::error::{error_trace, Result};
use crate::transform::Transform;

pub use envelope::{
    Reply, Request, CMD_ERRORED, CMD_TRANSFORM_TO_DOCUMENT, CMD_UNEXPECTED, IS_ERROR_KEY,
};

/// Routes inbound envelopes to the transformation and packages replies.
pub struct Dispatcher {
    /// The external transformation engine.
    transform: Arc<dyn Transform>,
    /// Document encoder stamped with the engine's version.
    encoder: DocumentEncoder,
}

impl Dispatcher {
    /// Create a dispatcher around a transformation engine.
    pub fn new(transform: Arc<dyn Transform>) -> Self {
        let encoder = DocumentEncoder::new(transform.version());
        Self { transform, encoder }
    }

    /// Process one raw frame body into response bytes.
    ///
    /// `Ok` is always a complete, valid UTF-8 JSON envelope; malformed
    /// characters in the input are replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// Only fatal conditions (see [`crate::AstwireError::is_fatal`])
    /// are returned as `Err`; everything else is folded into an
    /// `<errored>` reply.
    pub fn process(&self, raw: &[u8]) -> Result<Vec<u8>> {
        let reply = match self.dispatch(raw) {
            Ok(reply) => reply,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                tracing::debug!("request failed: {err}");
                Reply::Errored {
                    error: error_trace(&err),
                }
            }
        };
        Ok(reply.into_bytes())
    }

    fn dispatch(&self, raw: &[u8]) -> Result<Reply> {
        let text = String::from_utf8_lossy(raw);

        let request: Request = match serde_json::from_str(&text) {
            Ok(request) => request,
            Err(err) => {
                tracing::debug!("unparseable request: {err}");
                return Ok(Reply::Errored {
                    error: error_trace(&err),
                });
            }
        };

        if request.command != CMD_TRANSFORM_TO_DOCUMENT {
            return Ok(Reply::Unexpected {
                received: text.into_owned(),
            });
        }

        let Some(contents) = request.contents else {
            return Ok(Reply::Errored {
                error: format!("request is missing `contents` for {CMD_TRANSFORM_TO_DOCUMENT}"),
            });
        };

        Ok(Reply::Document(self.transform_to_document(&contents)?))
    }

    /// Run one transform + encode cycle.
    ///
    /// A compile error from the transformation is not a dispatch
    /// failure: its tree-shaped error object is encoded like any other
    /// document and marked `is_error: true` at the top level. Shared by
    /// the wire path and the offline mode.
    pub fn transform_to_document(&self, source: &str) -> Result<Document> {
        match self.transform.transform(source) {
            Ok(tree) => self.encoder.encode(tree.as_ref()),
            Err(compile_error) => {
                let mut doc = self.encoder.encode(compile_error.node())?;
                doc.insert(IS_ERROR_KEY.to_string(), Value::Bool(true));
                Ok(doc)
            }
        }
    }
}
