//! Stdout sink: one JSON document per line.

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::{Driver, QueuedOutput};
use crate::entities::AccessLog;
use crate::metrics::Metrics;

pub fn new_output(capacity: usize, metrics: &Metrics) -> QueuedOutput {
    tracing::info!("stdout driver started");
    QueuedOutput::spawn("stdout", Stdout::new(tokio::io::stdout()), capacity, metrics)
}

pub(crate) struct Stdout<W> {
    out: W,
}

impl<W: AsyncWrite + Unpin + Send + 'static> Stdout<W> {
    pub(crate) fn new(out: W) -> Stdout<W> {
        Stdout { out }
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send + 'static> Driver for Stdout<W> {
    async fn insert_entry(&mut self, entry: &AccessLog) -> anyhow::Result<()> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');
        self.out.write_all(&line).await?;
        Ok(())
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        self.out.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};
    use std::task::{Context, Poll};

    /// In-memory stand-in for process stdout.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl AsyncWrite for SharedBuf {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn writes_one_line_per_record() {
        let buf = SharedBuf::default();
        let mut driver = Stdout::new(buf.clone());

        let mut log = AccessLog::default();
        log.timestamp = "2024-01-01T00:00:00Z".to_string();
        log.response.code = 200;

        for _ in 0..3 {
            driver.insert_entry(&log).await.unwrap();
        }
        driver.close().await.unwrap();

        let written = buf.0.lock().unwrap().clone();
        let text = String::from_utf8(written).unwrap();
        assert!(text.ends_with('\n'));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            let round: AccessLog = serde_json::from_str(line).unwrap();
            assert_eq!(round, log);
        }
    }
}
