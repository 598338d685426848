//! Rotating object-store sink.
//!
//! Records stream through a per-rotation pipeline: format encoder -> byte
//! pipe -> copier task -> compressor -> blob writer. Rotation swaps the
//! pipeline under a dedicated lock while `write` only ever holds the
//! submission lock on the current encoder, so blob latency never stalls
//! submission beyond the pipe's buffer.

use std::io::Write as _;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context as _;
use arrow_json::reader::{Decoder, ReaderBuilder};
use async_trait::async_trait;
use object_store::buffered::BufWriter;
use object_store::path::Path;
use object_store::{Attribute, Attributes, ObjectStore};
use parquet::arrow::AsyncArrowWriter;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;

use super::{columnar, Driver, QueuedOutput};
use crate::config::{default_bucket_path, BucketConfig, Compression, Format};
use crate::entities::AccessLog;
use crate::metrics::Metrics;

const PIPE_CAPACITY: usize = 256 * 1024;
const COPY_CHUNK: usize = 16 * 1024;

pub fn new_output(
    cfg: &BucketConfig,
    capacity: usize,
    metrics: &Metrics,
) -> anyhow::Result<QueuedOutput> {
    let driver = Bucket::open(cfg)?;
    tracing::info!(url = cfg.url, "initialized bucket export");
    Ok(QueuedOutput::spawn("bucket", driver, capacity, metrics))
}

pub(crate) struct Bucket {
    inner: Arc<Inner>,
    ticker: JoinHandle<()>,
}

struct Inner {
    store: Arc<dyn ObjectStore>,
    base: Path,
    cfg: BucketConfig,
    /// Plain filesystems cannot carry content-type/encoding attributes.
    supports_attributes: bool,
    /// Submission lock: guards the current record writer only.
    current: tokio::sync::Mutex<Option<RecordWriter>>,
    /// Rotation lock: serializes pipeline swaps and close.
    rotation: tokio::sync::Mutex<()>,
    /// Records written since the last rotation.
    records: AtomicU64,
    copiers: Mutex<Vec<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl Bucket {
    pub(crate) fn open(cfg: &BucketConfig) -> anyhow::Result<Bucket> {
        let url = url::Url::parse(&cfg.url)
            .with_context(|| format!("invalid bucket URL {:?}", cfg.url))?;
        let (store, base) = object_store::parse_url(&url)
            .with_context(|| format!("failed to open bucket {:?}", cfg.url))?;

        let inner = Arc::new(Inner {
            store: Arc::from(store),
            base,
            cfg: cfg.clone(),
            supports_attributes: url.scheme() != "file",
            current: tokio::sync::Mutex::new(None),
            rotation: tokio::sync::Mutex::new(()),
            records: AtomicU64::new(0),
            copiers: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        });

        match inner.open_pipeline() {
            Ok(writer) => *inner.current.try_lock().expect("new bucket is uncontended") = Some(writer),
            Err(error) => tracing::error!(
                error = format!("{error:#}"),
                "failed to open initial bucket object"
            ),
        }

        let flush = Duration::from_secs(cfg.flush_seconds.max(1));
        let ticker = tokio::spawn({
            let inner = inner.clone();
            async move {
                let mut interval = tokio::time::interval(flush);
                interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                interval.tick().await; // immediate first tick
                loop {
                    interval.tick().await;
                    if inner.closed.load(Ordering::SeqCst) {
                        break;
                    }
                    inner.rotate().await;
                }
            }
        });

        Ok(Bucket { inner, ticker })
    }
}

#[async_trait]
impl Driver for Bucket {
    async fn insert_entry(&mut self, entry: &AccessLog) -> anyhow::Result<()> {
        let mut current = self.inner.current.lock().await;
        let writer = current
            .as_mut()
            .context("bucket pipeline is not open")?;
        self.inner.records.fetch_add(1, Ordering::SeqCst);
        writer.write(entry).await
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        {
            let _rotation = self.inner.rotation.lock().await;
            self.inner.closed.store(true, Ordering::SeqCst);
            let mut current = self.inner.current.lock().await;
            if self.inner.records.swap(0, Ordering::SeqCst) == 0 {
                // Nothing written since the last rotation: cancel the
                // outstanding upload instead of finishing an empty object.
                current.take();
            } else if let Some(writer) = current.take() {
                writer.finish().await?;
            }
        }
        self.ticker.abort();
        let copiers: Vec<_> = self.inner.copiers.lock().unwrap().drain(..).collect();
        for copier in copiers {
            let _ = copier.await;
        }
        Ok(())
    }
}

impl Inner {
    async fn rotate(self: &Arc<Inner>) {
        let _rotation = self.rotation.lock().await;
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        let mut current = self.current.lock().await;
        if self.records.swap(0, Ordering::SeqCst) == 0 {
            // Empty interval: abort the outstanding object.
            current.take();
        } else if let Some(writer) = current.take() {
            if let Err(error) = writer.finish().await {
                tracing::error!(error = format!("{error:#}"), "failed to finalize bucket object");
            }
        }
        match self.open_pipeline() {
            Ok(writer) => *current = Some(writer),
            Err(error) => {
                tracing::error!(error = format!("{error:#}"), "failed to open bucket object")
            }
        }
        self.copiers.lock().unwrap().retain(|c| !c.is_finished());
    }

    fn open_pipeline(self: &Arc<Inner>) -> anyhow::Result<RecordWriter> {
        let location = self.object_path();
        let mut attributes = Attributes::new();
        if self.supports_attributes {
            attributes.insert(Attribute::ContentType, self.cfg.format.content_type().into());
            if let Some(encoding) = self.cfg.compression.content_encoding() {
                attributes.insert(Attribute::ContentEncoding, encoding.into());
            }
        }

        let (record_side, copier_side) = tokio::io::duplex(PIPE_CAPACITY);
        let copier = tokio::spawn(copy_to_store(
            self.store.clone(),
            location,
            attributes,
            self.cfg.compression,
            copier_side,
        ));
        self.copiers.lock().unwrap().push(copier);

        match self.cfg.format {
            Format::Json => Ok(RecordWriter::Json(record_side)),
            Format::Parquet => {
                let schema = columnar::schema();
                let writer = AsyncArrowWriter::try_new(record_side, schema.clone(), None)
                    .context("failed to start columnar writer")?;
                let decoder = ReaderBuilder::new(schema)
                    .build_decoder()
                    .context("failed to build row decoder")?;
                Ok(RecordWriter::Parquet { writer, decoder })
            }
        }
    }

    fn object_path(&self) -> Path {
        let extension = format!(
            "{}{}",
            self.cfg.format.extension(),
            self.cfg.compression.extension_suffix()
        );
        let template = self
            .cfg
            .path
            .replace("{uuid}", &uuid::Uuid::new_v4().to_string())
            .replace("{ext}", &extension);
        let rendered = render_time_template(&template).unwrap_or_else(|| {
            tracing::error!(path = self.cfg.path, "invalid path template, using default");
            let fallback = default_bucket_path()
                .replace("{uuid}", &uuid::Uuid::new_v4().to_string())
                .replace("{ext}", &extension);
            render_time_template(&fallback).expect("default template is valid")
        });

        let mut location = self.base.to_string();
        if !self.cfg.prefix.is_empty() {
            location = format!("{location}/{}", self.cfg.prefix);
        }
        Path::from(format!("{location}/{rendered}"))
    }
}

/// Renders chrono strftime codes against the current UTC time, or None when
/// the template contains an invalid specifier.
fn render_time_template(template: &str) -> Option<String> {
    use chrono::format::{Item, StrftimeItems};

    let items: Vec<Item> = StrftimeItems::new(template).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }
    Some(
        chrono::Utc::now()
            .format_with_items(items.into_iter())
            .to_string(),
    )
}

enum RecordWriter {
    Json(DuplexStream),
    Parquet {
        writer: AsyncArrowWriter<DuplexStream>,
        decoder: Decoder,
    },
}

impl RecordWriter {
    async fn write(&mut self, entry: &AccessLog) -> anyhow::Result<()> {
        match self {
            RecordWriter::Json(pipe) => {
                let mut line = serde_json::to_vec(entry)?;
                line.push(b'\n');
                pipe.write_all(&line).await?;
            }
            RecordWriter::Parquet { writer, decoder } => {
                let row = columnar::row(entry)?;
                decoder.serialize(std::slice::from_ref(&row))?;
                if let Some(batch) = decoder.flush()? {
                    writer.write(&batch).await?;
                }
            }
        }
        Ok(())
    }

    /// Completes the current object: parquet writes its footer, then the
    /// pipe closes and the copier finishes the upload. Dropping a
    /// `RecordWriter` without calling this cancels the object instead.
    async fn finish(self) -> anyhow::Result<()> {
        match self {
            RecordWriter::Json(mut pipe) => {
                pipe.shutdown().await?;
            }
            RecordWriter::Parquet { writer, .. } => {
                writer.close().await?;
            }
        }
        Ok(())
    }
}

async fn copy_to_store(
    store: Arc<dyn ObjectStore>,
    location: Path,
    attributes: Attributes,
    compression: Compression,
    mut src: DuplexStream,
) {
    let mut dst = BufWriter::new(store, location.clone()).with_attributes(attributes);
    match copy_compressed(&mut src, &mut dst, compression).await {
        Ok(0) => {
            // No bytes reached the pipe: abort instead of storing an empty
            // object.
            if let Err(error) = dst.abort().await {
                tracing::error!(
                    error = format!("{error:#}"),
                    %location,
                    "failed to abort empty upload"
                );
            }
        }
        Ok(_) => {
            if let Err(error) = dst.shutdown().await {
                tracing::error!(error = format!("{error:#}"), %location, "failed to complete upload");
            }
        }
        Err(error) => {
            tracing::error!(error = format!("{error:#}"), %location, "upload failed");
            let _ = dst.abort().await;
        }
    }
}

async fn copy_compressed(
    src: &mut DuplexStream,
    dst: &mut BufWriter,
    compression: Compression,
) -> anyhow::Result<u64> {
    let mut compressor = Compressor::new(compression);
    let mut buf = vec![0u8; COPY_CHUNK];
    let mut total = 0u64;
    loop {
        let n = src.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        total += n as u64;
        let out = compressor.write(&buf[..n])?;
        if !out.is_empty() {
            dst.write_all(&out).await?;
        }
    }
    if total > 0 {
        let tail = compressor.finish()?;
        if !tail.is_empty() {
            dst.write_all(&tail).await?;
        }
    }
    Ok(total)
}

/// Incremental compressor over a shared chunk buffer, draining compressed
/// bytes as they become available.
enum Compressor {
    None,
    Gzip(flate2::write::GzEncoder<ChunkBuffer>, ChunkBuffer),
    Lz4(lz4_flex::frame::FrameEncoder<ChunkBuffer>, ChunkBuffer),
}

impl Compressor {
    fn new(compression: Compression) -> Compressor {
        match compression {
            Compression::None => Compressor::None,
            Compression::Gzip => {
                let buf = ChunkBuffer::default();
                Compressor::Gzip(
                    flate2::write::GzEncoder::new(buf.clone(), flate2::Compression::default()),
                    buf,
                )
            }
            Compression::Lz4 => {
                let buf = ChunkBuffer::default();
                Compressor::Lz4(lz4_flex::frame::FrameEncoder::new(buf.clone()), buf)
            }
        }
    }

    /// Feeds a chunk and returns whatever compressed bytes are ready.
    fn write(&mut self, chunk: &[u8]) -> anyhow::Result<Vec<u8>> {
        match self {
            Compressor::None => Ok(chunk.to_vec()),
            Compressor::Gzip(encoder, buf) => {
                encoder.write_all(chunk)?;
                Ok(buf.take())
            }
            Compressor::Lz4(encoder, buf) => {
                encoder.write_all(chunk)?;
                Ok(buf.take())
            }
        }
    }

    /// Flushes the stream trailer.
    fn finish(self) -> anyhow::Result<Vec<u8>> {
        match self {
            Compressor::None => Ok(Vec::new()),
            Compressor::Gzip(encoder, buf) => {
                encoder.finish()?;
                Ok(buf.take())
            }
            Compressor::Lz4(encoder, buf) => {
                encoder.finish()?;
                Ok(buf.take())
            }
        }
    }
}

#[derive(Clone, Default)]
struct ChunkBuffer(Arc<Mutex<Vec<u8>>>);

impl ChunkBuffer {
    fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl std::io::Write for ChunkBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Read;

    fn bucket_config(dir: &std::path::Path, format: Format, compression: Compression) -> BucketConfig {
        BucketConfig {
            enabled: true,
            url: url::Url::from_directory_path(dir).unwrap().to_string(),
            prefix: String::new(),
            format,
            path: default_bucket_path(),
            compression,
            flush_seconds: 1,
        }
    }

    fn entry(index: u32) -> AccessLog {
        let mut log = AccessLog::default();
        log.timestamp = format!("2024-01-01T00:00:{index:02}Z");
        log.response.code = 200;
        log.tags = vec![format!("seq:{index}")];
        log
    }

    fn list_files(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
        let mut found = Vec::new();
        let mut pending = vec![dir.to_path_buf()];
        while let Some(next) = pending.pop() {
            for entry in std::fs::read_dir(next).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    pending.push(path);
                } else {
                    found.push(path);
                }
            }
        }
        found.sort();
        found
    }

    #[tokio::test]
    async fn single_object_matches_record_serializations() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = bucket_config(dir.path(), Format::Json, Compression::None);
        cfg.flush_seconds = 3600; // no tick during the test
        let mut bucket = Bucket::open(&cfg).unwrap();

        let records = vec![entry(0), entry(1)];
        for record in &records {
            bucket.insert_entry(record).await.unwrap();
        }
        bucket.close().await.unwrap();

        let files = list_files(dir.path());
        assert_eq!(files.len(), 1);
        let contents = std::fs::read_to_string(&files[0]).unwrap();
        let expected: String = records
            .iter()
            .map(|r| serde_json::to_string(r).unwrap() + "\n")
            .collect();
        assert_eq!(contents, expected);
        assert!(files[0].to_str().unwrap().ends_with(".json"));
    }

    #[tokio::test]
    async fn rotation_splits_records_across_gzip_objects() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = bucket_config(dir.path(), Format::Json, Compression::Gzip);
        let mut bucket = Bucket::open(&cfg).unwrap();

        for index in 0..3 {
            bucket.insert_entry(&entry(index)).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(1500)).await;
        for index in 3..5 {
            bucket.insert_entry(&entry(index)).await.unwrap();
        }
        bucket.close().await.unwrap();

        let files = list_files(dir.path());
        assert!(
            (2..=4).contains(&files.len()),
            "expected 2..=4 objects, found {files:?}"
        );

        let mut seen = Vec::new();
        for file in &files {
            assert!(file.to_str().unwrap().ends_with(".json.gz"));
            let mut text = String::new();
            flate2::read::GzDecoder::new(std::fs::File::open(file).unwrap())
                .read_to_string(&mut text)
                .unwrap();
            let mut in_file = Vec::new();
            for line in text.lines() {
                let log: AccessLog = serde_json::from_str(line).unwrap();
                in_file.push(log.tags[0].clone());
            }
            // Per-object contents preserve submission order.
            let mut sorted = in_file.clone();
            sorted.sort();
            assert_eq!(in_file, sorted);
            seen.extend(in_file);
        }
        seen.sort();
        let expected: Vec<String> = (0..5).map(|i| format!("seq:{i}")).collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn empty_intervals_create_no_objects() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = bucket_config(dir.path(), Format::Json, Compression::None);
        let mut bucket = Bucket::open(&cfg).unwrap();

        tokio::time::sleep(Duration::from_millis(2500)).await;
        bucket.close().await.unwrap();

        assert_eq!(list_files(dir.path()), Vec::<std::path::PathBuf>::new());
    }

    #[tokio::test]
    async fn parquet_objects_contain_all_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = bucket_config(dir.path(), Format::Parquet, Compression::None);
        cfg.flush_seconds = 3600;
        let mut bucket = Bucket::open(&cfg).unwrap();

        for index in 0..3 {
            bucket.insert_entry(&entry(index)).await.unwrap();
        }
        bucket.close().await.unwrap();

        let files = list_files(dir.path());
        assert_eq!(files.len(), 1);
        assert!(files[0].to_str().unwrap().ends_with(".parquet"));

        let file = std::fs::File::open(&files[0]).unwrap();
        let reader = parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();
        let rows: usize = reader.map(|batch| batch.unwrap().num_rows()).sum();
        assert_eq!(rows, 3);
    }

    #[tokio::test]
    async fn compressors_round_trip() {
        let payload = b"{\"a\":1}\n".repeat(500);

        for compression in [Compression::Gzip, Compression::Lz4] {
            let mut compressor = Compressor::new(compression);
            let mut compressed = Vec::new();
            for chunk in payload.chunks(100) {
                compressed.extend(compressor.write(chunk).unwrap());
            }
            compressed.extend(compressor.finish().unwrap());
            assert!(!compressed.is_empty());

            let mut restored = Vec::new();
            match compression {
                Compression::Gzip => {
                    flate2::read::GzDecoder::new(compressed.as_slice())
                        .read_to_end(&mut restored)
                        .unwrap();
                }
                Compression::Lz4 => {
                    lz4_flex::frame::FrameDecoder::new(compressed.as_slice())
                        .read_to_end(&mut restored)
                        .unwrap();
                }
                Compression::None => unreachable!(),
            }
            assert_eq!(restored, payload);
        }
    }

    #[test]
    fn invalid_time_template_is_rejected() {
        assert!(render_time_template("%Y-%m-%d/%H/x").is_some());
        assert!(render_time_template("%Q/x").is_none());
    }
}
