//! Bridge runtime loop.
//!
//! The [`Bridge`] owns the read-dispatch-write cycle of one connection:
//! 1. Connect out to the peer (which listens and initiates nothing)
//! 2. Accumulate bytes into the framing state machine
//! 3. Hand each complete body to the dispatcher
//! 4. Write the framed response back
//!
//! One request is fully served before the next is read; there is no
//! concurrent request handling. The peer signals completion by closing
//! the connection (or sending an empty body), which ends the loop with
//! success.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use astwire::{Bridge, BridgeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bridge = Bridge::new(Arc::new(MyTransform::new()));
//!     bridge.run(&BridgeConfig::new(port)).await?;
//!     Ok(())
//! }
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::protocol::{encode_frame, FrameBuffer};
use crate::transform::Transform;
use crate::transport;

/// Size of the transport read buffer.
const READ_BUF_SIZE: usize = 64 * 1024;

/// Where the bridge connects.
///
/// Explicit configuration instead of process-global host lookup; the
/// port is the one external parameter supplied at process start.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Peer host; loopback by default.
    pub host: IpAddr,
    /// Peer port.
    pub port: u16,
}

impl BridgeConfig {
    /// Configuration for a peer on `127.0.0.1:<port>`.
    pub fn new(port: u16) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port,
        }
    }
}

/// The protocol bridge serving one peer connection.
pub struct Bridge {
    dispatcher: Dispatcher,
}

impl Bridge {
    /// Create a bridge around a transformation engine.
    pub fn new(transform: Arc<dyn Transform>) -> Self {
        Self {
            dispatcher: Dispatcher::new(transform),
        }
    }

    /// The dispatcher, for reuse by the offline mode.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Connect to the configured peer and serve until the connection
    /// ends.
    ///
    /// # Errors
    ///
    /// Connection failure and fatal dispatch/write errors; a peer that
    /// simply goes away is a graceful `Ok(())`.
    pub async fn run(&self, config: &BridgeConfig) -> Result<()> {
        let stream = transport::connect(config.host, config.port).await?;
        tracing::debug!("connected to peer, serving");
        self.serve(stream).await
    }

    /// Serve the framing protocol loop over an established stream.
    ///
    /// The loop ends cleanly on: peer close (empty read), an empty
    /// frame body, a transport read error, or a framing violation.
    /// Fatal errors from the dispatcher or the write path propagate.
    pub async fn serve<S>(&self, mut stream: S) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut frames = FrameBuffer::new();
        let mut buf = vec![0u8; READ_BUF_SIZE];

        'conn: loop {
            let n = match stream.read(&mut buf).await {
                Ok(0) => {
                    tracing::debug!("peer closed the connection");
                    break;
                }
                Ok(n) => n,
                Err(err) => {
                    // The peer vanishing mid-read is the same as a
                    // close for this protocol.
                    tracing::debug!("read failed, treating as connection end: {err}");
                    break;
                }
            };

            let bodies = match frames.push(&buf[..n]) {
                Ok(bodies) => bodies,
                Err(err) => {
                    tracing::debug!("framing violation, ending connection: {err}");
                    break;
                }
            };

            for body in bodies {
                if body.is_empty() {
                    tracing::debug!("empty body, peer is done");
                    break 'conn;
                }

                tracing::debug!(len = body.len(), "processing request");
                let response = self.dispatcher.process(&body)?;
                send_all(&mut stream, &encode_frame(&response)).await?;
            }
        }

        Ok(())
    }
}

/// Write the complete byte sequence, retrying partial writes.
///
/// A zero-byte write means the transport can make no progress (half
/// closed or flaky); the remainder is abandoned without error so the
/// loop can discover the close on its next read.
async fn send_all<W>(writer: &mut W, buf: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut remaining = buf;
    while !remaining.is_empty() {
        let n = writer.write(remaining).await?;
        if n == 0 {
            tracing::warn!(unsent = remaining.len(), "peer stopped accepting data");
            return Ok(());
        }
        remaining = &remaining[n..];
    }
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Attr, Scalar, TreeNode};
    use crate::error::AstwireError;
    use crate::transform::CompileError;
    use bytes::Bytes;
    use serde_json::Value;
    use tokio::io::DuplexStream;

    struct EchoTransform;

    struct SourceNode {
        source: String,
    }

    impl TreeNode for SourceNode {
        fn type_tag(&self) -> &str {
            "SourceNode"
        }
        fn attributes(&self) -> Vec<(String, Attr<'_>)> {
            vec![(
                "source".to_string(),
                Attr::Scalar(Scalar::Str(self.source.clone())),
            )]
        }
    }

    impl Transform for EchoTransform {
        fn version(&self) -> &str {
            "1.0-test"
        }
        fn transform(&self, source: &str) -> std::result::Result<Box<dyn TreeNode>, CompileError> {
            Ok(Box::new(SourceNode {
                source: source.to_string(),
            }))
        }
    }

    struct CyclicTransform;

    struct Loopy;

    impl TreeNode for Loopy {
        fn type_tag(&self) -> &str {
            "LoopyNode"
        }
        fn attributes(&self) -> Vec<(String, Attr<'_>)> {
            vec![("next".to_string(), Attr::Node(self))]
        }
    }

    impl Transform for CyclicTransform {
        fn version(&self) -> &str {
            "0.0"
        }
        fn transform(&self, _: &str) -> std::result::Result<Box<dyn TreeNode>, CompileError> {
            Ok(Box::new(Loopy))
        }
    }

    fn spawn_bridge(
        transform: Arc<dyn Transform>,
    ) -> (DuplexStream, tokio::task::JoinHandle<Result<()>>) {
        let (client, server) = tokio::io::duplex(READ_BUF_SIZE);
        let bridge = Bridge::new(transform);
        let handle = tokio::spawn(async move { bridge.serve(server).await });
        (client, handle)
    }

    async fn read_one_frame(client: &mut DuplexStream) -> Bytes {
        let mut frames = FrameBuffer::new();
        let mut buf = vec![0u8; 4096];
        loop {
            let n = client.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed before a full frame arrived");
            let bodies = frames.push(&buf[..n]).unwrap();
            if let Some(body) = bodies.into_iter().next() {
                return body;
            }
        }
    }

    async fn request(client: &mut DuplexStream, body: &[u8]) -> Value {
        client.write_all(&encode_frame(body)).await.unwrap();
        let response = read_one_frame(client).await;
        serde_json::from_slice(&response).unwrap()
    }

    #[tokio::test]
    async fn test_request_response_round_trip() {
        let (mut client, handle) = spawn_bridge(Arc::new(EchoTransform));

        let value = request(
            &mut client,
            br#"{"command":"transform_to_document","contents":"x = 1"}"#,
        )
        .await;

        assert_eq!(value["__node__"], "Source");
        assert_eq!(value["__version__"], "1.0-test");
        assert_eq!(value["source"], "x = 1");

        drop(client);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_peer_close_ends_loop_with_success() {
        let (client, handle) = spawn_bridge(Arc::new(EchoTransform));
        drop(client);
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_empty_body_ends_loop_with_success() {
        let (mut client, handle) = spawn_bridge(Arc::new(EchoTransform));
        client.write_all(&encode_frame(b"")).await.unwrap();
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_connection_survives_malformed_request() {
        let (mut client, handle) = spawn_bridge(Arc::new(EchoTransform));

        let bad = request(&mut client, b"{not json").await;
        assert_eq!(bad["command"], "<errored>");

        let good = request(
            &mut client,
            br#"{"command":"transform_to_document","contents":"ok"}"#,
        )
        .await;
        assert_eq!(good["__node__"], "Source");

        drop(client);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_unknown_command_answered_in_band() {
        let (mut client, handle) = spawn_bridge(Arc::new(EchoTransform));

        let value = request(&mut client, br#"{"command":"foo","contents":"x"}"#).await;
        assert_eq!(value["command"], "<unexpected>");

        drop(client);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_framing_violation_ends_loop_cleanly() {
        let (mut client, handle) = spawn_bridge(Arc::new(EchoTransform));
        client
            .write_all(b"Content-Length: banana\r\n")
            .await
            .unwrap();
        // Connection-end, not an error, and nothing is written back.
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_fatal_encoder_error_propagates() {
        let (mut client, handle) = spawn_bridge(Arc::new(CyclicTransform));
        client
            .write_all(&encode_frame(
                br#"{"command":"transform_to_document","contents":"x"}"#,
            ))
            .await
            .unwrap();

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(AstwireError::DepthExceeded { .. })));
    }

    #[tokio::test]
    async fn test_two_requests_in_one_write() {
        let (mut client, handle) = spawn_bridge(Arc::new(EchoTransform));

        let mut batch = encode_frame(br#"{"command":"transform_to_document","contents":"a"}"#);
        batch.extend(encode_frame(
            br#"{"command":"transform_to_document","contents":"b"}"#,
        ));
        client.write_all(&batch).await.unwrap();

        // Both responses may land in one read; collect across pushes.
        let mut frames = FrameBuffer::new();
        let mut buf = vec![0u8; 4096];
        let mut bodies = Vec::new();
        while bodies.len() < 2 {
            let n = client.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed early");
            bodies.extend(frames.push(&buf[..n]).unwrap());
        }

        let first: Value = serde_json::from_slice(&bodies[0]).unwrap();
        let second: Value = serde_json::from_slice(&bodies[1]).unwrap();
        assert_eq!(first["source"], "a");
        assert_eq!(second["source"], "b");

        drop(client);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_send_all_abandons_on_zero_write() {
        struct ZeroWriter;

        impl AsyncWrite for ZeroWriter {
            fn poll_write(
                self: std::pin::Pin<&mut Self>,
                _: &mut std::task::Context<'_>,
                _: &[u8],
            ) -> std::task::Poll<std::io::Result<usize>> {
                std::task::Poll::Ready(Ok(0))
            }
            fn poll_flush(
                self: std::pin::Pin<&mut Self>,
                _: &mut std::task::Context<'_>,
            ) -> std::task::Poll<std::io::Result<()>> {
                std::task::Poll::Ready(Ok(()))
            }
            fn poll_shutdown(
                self: std::pin::Pin<&mut Self>,
                _: &mut std::task::Context<'_>,
            ) -> std::task::Poll<std::io::Result<()>> {
                std::task::Poll::Ready(Ok(()))
            }
        }

        let mut writer = ZeroWriter;
        // Must return Ok without looping forever.
        send_all(&mut writer, b"data the peer will never take")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_default_config_targets_loopback() {
        let config = BridgeConfig::new(4520);
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.port, 4520);
    }
}
