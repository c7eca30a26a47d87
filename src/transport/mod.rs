//! Transport module - connection establishment.
//!
//! The bridge is the connecting side: the peer listens on a loopback
//! port and this process dials out to it, exactly once, for the
//! lifetime of the process. There is no reconnect logic; a failed
//! connect is fatal.

use std::net::IpAddr;

use tokio::net::TcpStream;

use crate::error::{AstwireError, Result};

/// Open the bridge's single outbound connection.
///
/// # Errors
///
/// Returns [`AstwireError::Connect`] carrying the target host and port
/// when the peer cannot be reached.
pub async fn connect(host: IpAddr, port: u16) -> Result<TcpStream> {
    tracing::debug!("connecting to peer at {host}:{port}");
    TcpStream::connect((host, port))
        .await
        .map_err(|source| AstwireError::Connect { host, port, source })
}
