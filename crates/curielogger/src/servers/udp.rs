//! UDP intake: each datagram is one canonical record as JSON.

use std::sync::Arc;

use anyhow::Context as _;

use crate::entities::AccessLog;
use crate::sender::LogSender;

/// Maximum accepted datagram size.
const MAX_DATAGRAM: usize = 4096;

/// Binds the datagram socket and serves forever; only the bind can fail.
pub async fn serve(addr: &str, sender: Arc<LogSender>) -> anyhow::Result<()> {
    let socket = bind(addr).await?;
    run(socket, sender).await
}

pub async fn bind(addr: &str) -> anyhow::Result<tokio::net::UdpSocket> {
    let socket = tokio::net::UdpSocket::bind(addr)
        .await
        .with_context(|| format!("failed to UDP listen on {addr}"))?;
    tracing::info!(addr, "UDP server listening");
    Ok(socket)
}

pub async fn run(socket: tokio::net::UdpSocket, sender: Arc<LogSender>) -> anyhow::Result<()> {
    let mut buf = vec![0u8; MAX_DATAGRAM];
    loop {
        let len = match socket.recv_from(&mut buf).await {
            Ok((len, _peer)) => len,
            Err(error) => {
                tracing::error!(%error, "failed to receive UDP datagram");
                continue;
            }
        };
        match serde_json::from_slice::<AccessLog>(&buf[..len]) {
            Ok(log) => {
                if let Err(error) = sender.write(log).await {
                    tracing::error!(error = format!("{error:#}"), "failed to submit log entry");
                }
            }
            Err(error) => tracing::error!(%error, "failed to parse UDP datagram"),
        }
    }
}
