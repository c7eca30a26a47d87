//! Wire-level JSON envelopes.
//!
//! Inbound frames carry a [`Request`]; outbound frames carry one of the
//! three [`Reply`] shapes. The reply is modeled as a sum type and only
//! flattened to its ad-hoc JSON shape at serialization time.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::codec::Document;

/// The one concrete command the bridge understands.
pub const CMD_TRANSFORM_TO_DOCUMENT: &str = "transform_to_document";

/// Command tag of an internal-failure reply.
pub const CMD_ERRORED: &str = "<errored>";

/// Command tag of an unknown-command reply.
pub const CMD_UNEXPECTED: &str = "<unexpected>";

/// Top-level marker distinguishing an encoded compile error from a
/// successful document.
pub const IS_ERROR_KEY: &str = "is_error";

/// An inbound request envelope.
#[derive(Debug, Deserialize)]
pub struct Request {
    /// Command name.
    pub command: String,
    /// Source payload for `transform_to_document`.
    #[serde(default)]
    pub contents: Option<String>,
}

/// An outbound reply, exhaustive over the three wire shapes.
#[derive(Debug)]
pub enum Reply {
    /// Successful (or compile-error-marked) document.
    Document(Document),
    /// The command was not recognized; echoes the original text back.
    Unexpected {
        /// The request body as received.
        received: String,
    },
    /// A recoverable dispatch failure.
    Errored {
        /// Formatted failure trace.
        error: String,
    },
}

impl Reply {
    /// Flatten to the wire-compatible JSON value.
    pub fn into_value(self) -> Value {
        match self {
            Reply::Document(doc) => Value::Object(doc),
            Reply::Unexpected { received } => json!({
                "command": CMD_UNEXPECTED,
                "received": received,
            }),
            Reply::Errored { error } => json!({
                "command": CMD_ERRORED,
                "error": error,
            }),
        }
    }

    /// Serialize to UTF-8 JSON bytes.
    ///
    /// Always yields valid JSON; the peer never sees a truncated or
    /// non-JSON response.
    pub fn into_bytes(self) -> Vec<u8> {
        let value = self.into_value();
        serde_json::to_vec(&value).unwrap_or_else(|_| {
            // Serializing a Value cannot fail in practice; keep a
            // well-formed envelope even if it somehow does.
            br#"{"command":"<errored>","error":"response serialization failed"}"#.to_vec()
        })
    }
}
