//! # astwire
//!
//! Syntax-tree-to-JSON bridge for compiler sidecar processes.
//!
//! This crate lets a worker process expose a parser (or any
//! source-to-tree transformation) to a peer over a tiny wire protocol:
//! `Content-Length:`-framed JSON envelopes on a loopback socket. The
//! peer listens; the worker dials out, then serves one sequential
//! read-dispatch-write loop until the peer hangs up.
//!
//! ## Architecture
//!
//! - **Document Encoder** ([`codec`]): tree graph to JSON document,
//!   cycle-safe via a recursion depth guard
//! - **Framing Engine** ([`protocol`]): header-delimited frames over a
//!   byte stream, partial reads buffered
//! - **Dispatcher** ([`dispatch`]): envelope decode, command routing,
//!   error packaging
//! - **Transport Driver** ([`transport`], [`Bridge`]): the outbound
//!   connection and the serve loop
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use astwire::{Bridge, BridgeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bridge = Bridge::new(Arc::new(MyParser::new()));
//!     bridge.run(&BridgeConfig::new(port)).await?;
//!     Ok(())
//! }
//! ```
//!
//! For one-shot offline use there is [`control::run_stdin_stdout`],
//! which skips the socket and framing entirely.

pub mod codec;
pub mod control;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod transform;
pub mod transport;

mod bridge;

pub use bridge::{Bridge, BridgeConfig};
pub use error::{AstwireError, Result};
pub use transform::{CompileError, Transform};
