//! `LogSender` is the single entry point intake handlers hand records to:
//! metric derivation first, then fan-out.

use std::sync::Arc;

use crate::entities::AccessLog;
use crate::metrics::Metrics;
use crate::outputs::Tee;

pub struct LogSender {
    tee: Tee,
    metrics: Arc<Metrics>,
}

impl LogSender {
    pub fn new(tee: Tee, metrics: Arc<Metrics>) -> LogSender {
        LogSender { tee, metrics }
    }

    /// Meters the record, then tees it to every enabled sink. Runs on the
    /// intake task that decoded the record.
    pub async fn write(&self, log: AccessLog) -> anyhow::Result<()> {
        self.metrics.add(&log);
        self.tee.write(Arc::new(log)).await
    }

    /// Idempotent; a closed sender silently discards subsequent writes.
    pub async fn close(&self) -> anyhow::Result<()> {
        self.tee.close().await
    }
}
