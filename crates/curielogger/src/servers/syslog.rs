//! TCP syslog intake (RFC3164, newline framed).
//!
//! The proxy's nginx flavor ships access logs as syslog messages whose MSG
//! part is `nginx: ` followed by the canonical JSON document. Anything else
//! on the socket is silently dropped.

use std::sync::Arc;

use anyhow::Context as _;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;

use crate::entities::AccessLog;
use crate::sender::LogSender;

const NGINX_PREFIX: &str = "nginx: ";

pub async fn serve(addr: &str, sender: Arc<LogSender>) -> anyhow::Result<()> {
    let listener = bind(addr).await?;
    run(listener, sender).await
}

pub async fn bind(addr: &str) -> anyhow::Result<tokio::net::TcpListener> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to listen on {addr}"))?;
    tracing::info!(addr, "syslog server listening");
    Ok(listener)
}

pub async fn run(
    listener: tokio::net::TcpListener,
    sender: Arc<LogSender>,
) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(error) => {
                tracing::error!(%error, "failed to accept syslog connection");
                continue;
            }
        };
        let sender = sender.clone();
        tokio::spawn(async move {
            if let Err(error) = handle_connection(socket, sender).await {
                tracing::debug!(%peer, %error, "syslog connection ended");
            }
        });
    }
}

async fn handle_connection(socket: TcpStream, sender: Arc<LogSender>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(socket).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(payload) = nginx_payload(&line) else {
            continue;
        };
        match serde_json::from_str::<AccessLog>(payload) {
            Ok(log) => {
                if let Err(error) = sender.write(log).await {
                    tracing::error!(error = format!("{error:#}"), "failed to submit log entry");
                }
            }
            Err(error) => tracing::error!(%error, "failed to parse syslog payload"),
        }
    }
    Ok(())
}

/// Returns the JSON payload of a frame whose MSG carries the nginx prefix.
fn nginx_payload(line: &str) -> Option<&str> {
    rfc3164_content(line)?.strip_prefix(NGINX_PREFIX)
}

/// Extracts the MSG part of `<PRI>Mmm dd hh:mm:ss hostname MSG`.
fn rfc3164_content(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('<')?;
    let (pri, rest) = rest.split_once('>')?;
    if pri.is_empty() || pri.len() > 3 || !pri.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // The RFC3164 TIMESTAMP is exactly 15 characters, space included.
    if rest.len() < 16 || !rest.is_char_boundary(15) {
        return None;
    }
    let (_timestamp, rest) = rest.split_at(15);
    let rest = rest.strip_prefix(' ')?;
    let (_hostname, content) = rest.split_once(' ')?;
    Some(content)
}

#[cfg(test)]
mod test {
    use super::*;

    const FRAME: &str = r#"<190>Jan  2 15:04:05 gateway nginx: {"timestamp":"2024-01-01T00:00:00Z","response":{"code":200}}"#;

    #[test]
    fn extracts_nginx_payload() {
        let payload = nginx_payload(FRAME).unwrap();
        let log: AccessLog = serde_json::from_str(payload).unwrap();
        assert_eq!(log.response.code, 200);
        assert_eq!(log.timestamp, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn non_nginx_messages_are_dropped() {
        // Same framing, different tag: silently ignored.
        assert_eq!(
            nginx_payload(r#"<190>Jan  2 15:04:05 gateway cron: {"x":1}"#),
            None
        );
        // Prefix must be literal, including the space.
        assert_eq!(
            nginx_payload("<190>Jan  2 15:04:05 gateway nginx:{}"),
            None
        );
    }

    #[test]
    fn malformed_frames_are_dropped() {
        assert_eq!(nginx_payload("not syslog at all"), None);
        assert_eq!(nginx_payload("<abc>Jan  2 15:04:05 host nginx: {}"), None);
        assert_eq!(nginx_payload("<190>too short"), None);
    }
}
