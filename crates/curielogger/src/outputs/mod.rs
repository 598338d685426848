//! Sink plumbing: the `Output` trait, the bounded queue + worker helper
//! every concrete sink composes, and the `Tee` fanning records out to all
//! enabled sinks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::entities::AccessLog;
use crate::metrics::Metrics;

pub mod bucket;
mod columnar;
pub mod elasticsearch;
pub mod http;
pub mod stdout;

/// A terminal consumer of canonical records.
#[async_trait]
pub trait Output: Send + Sync {
    fn name(&self) -> &'static str;

    /// Accepts a record for delivery. Must never block on sink latency.
    async fn write(&self, entry: Arc<AccessLog>) -> anyhow::Result<()>;

    /// Idempotent. Flushes whatever the sink still holds.
    async fn close(&self) -> anyhow::Result<()>;
}

/// Transport half of a sink, driven by its queue worker.
#[async_trait]
pub(crate) trait Driver: Send + 'static {
    async fn insert_entry(&mut self, entry: &AccessLog) -> anyhow::Result<()>;

    async fn close(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// The queue + worker helper: a bounded channel in front of a [`Driver`],
/// consumed by a single task. Submission drops (and counts) when the queue
/// is full; it never pushes back on the producer.
pub struct QueuedOutput {
    name: &'static str,
    tx: Mutex<Option<mpsc::Sender<Arc<AccessLog>>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
    dropped: prometheus::IntCounterVec,
}

impl QueuedOutput {
    pub(crate) fn spawn<D: Driver>(
        name: &'static str,
        driver: D,
        capacity: usize,
        metrics: &Metrics,
    ) -> QueuedOutput {
        let (tx, rx) = mpsc::channel(capacity);
        let latency = metrics.logger_latency.clone();
        let dropped = metrics.dropped_log_entries.clone();
        let worker = tokio::spawn(run_worker(name, driver, rx, latency, dropped.clone()));
        QueuedOutput {
            name,
            tx: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
            closed: AtomicBool::new(false),
            dropped,
        }
    }
}

async fn run_worker<D: Driver>(
    name: &'static str,
    mut driver: D,
    mut rx: mpsc::Receiver<Arc<AccessLog>>,
    latency: prometheus::HistogramVec,
    dropped: prometheus::IntCounterVec,
) {
    tracing::info!(sink = name, "sink worker started");
    while let Some(entry) = rx.recv().await {
        let timer = latency.with_label_values(&[name]).start_timer();
        if let Err(error) = driver.insert_entry(&entry).await {
            dropped.with_label_values(&[name]).inc();
            tracing::error!(sink = name, error = format!("{error:#}"), "failed to insert log entry");
        }
        timer.observe_duration();
    }
    if let Err(error) = driver.close().await {
        tracing::error!(sink = name, error = format!("{error:#}"), "failed to close sink");
    }
}

#[async_trait]
impl Output for QueuedOutput {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn write(&self, entry: Arc<AccessLog>) -> anyhow::Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Ok(());
        }
        let result = match &*self.tx.lock().unwrap() {
            Some(tx) => tx.try_send(entry),
            None => return Ok(()),
        };
        match result {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.dropped.with_label_values(&[self.name]).inc();
                tracing::warn!(sink = self.name, "buffer full, log entry dropped");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Ok(()),
        }
    }

    async fn close(&self) -> anyhow::Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        // Dropping the sender lets the worker drain the queue, close the
        // driver, and exit.
        drop(self.tx.lock().unwrap().take());
        let worker = self.worker.lock().unwrap().take();
        if let Some(worker) = worker {
            worker.await?;
        }
        Ok(())
    }
}

/// Fans each record out to every sink concurrently and surfaces the last
/// error. A closed tee accepts writes as successful no-ops.
pub struct Tee {
    outputs: Vec<Box<dyn Output>>,
    closed: AtomicBool,
}

impl Tee {
    pub fn new(outputs: Vec<Box<dyn Output>>) -> Tee {
        Tee {
            outputs,
            closed: AtomicBool::new(false),
        }
    }

    pub async fn write(&self, entry: Arc<AccessLog>) -> anyhow::Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Ok(());
        }
        let results = futures::future::join_all(
            self.outputs.iter().map(|output| output.write(entry.clone())),
        )
        .await;
        match results.into_iter().filter_map(Result::err).last() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub async fn close(&self) -> anyhow::Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let mut last = Ok(());
        for output in &self.outputs {
            if let Err(err) = output.close().await {
                last = Err(err);
            }
        }
        last
    }
}

/// Assembles the sinks enabled by configuration.
pub fn build(cfg: &Config, metrics: &Arc<Metrics>) -> Vec<Box<dyn Output>> {
    let capacity = cfg.channel_capacity();
    let mut outputs: Vec<Box<dyn Output>> = Vec::new();

    if cfg.outputs.stdout.enabled {
        outputs.push(Box::new(stdout::new_output(capacity, metrics)));
    }
    if cfg.outputs.bucket.enabled {
        match bucket::new_output(&cfg.outputs.bucket, capacity, metrics) {
            Ok(output) => outputs.push(Box::new(output)),
            Err(error) => {
                tracing::error!(error = format!("{error:#}"), "failed to initialize bucket export")
            }
        }
    }
    if cfg.outputs.logstash.enabled {
        outputs.push(Box::new(http::logstash(
            &cfg.outputs.logstash,
            capacity,
            metrics,
        )));
    }
    if cfg.outputs.webhook.enabled {
        outputs.push(Box::new(http::webhook(
            &cfg.outputs.webhook,
            capacity,
            metrics,
        )));
    }
    if let Some(url) = cfg.fluentd_url() {
        outputs.push(Box::new(http::fluentd(&url, capacity, metrics)));
    }
    if cfg.outputs.elasticsearch.enabled {
        match elasticsearch::new_output(&cfg.outputs.elasticsearch, capacity, metrics) {
            Ok(output) => outputs.push(Box::new(output)),
            Err(error) => {
                tracing::error!(error = format!("{error:#}"), "failed to initialize elasticsearch")
            }
        }
    }
    outputs
}
