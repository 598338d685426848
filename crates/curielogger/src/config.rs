//! Configuration loading.
//!
//! Settings come from an optional YAML file (`curielogger.yaml` looked up in
//! `.`, `./..` and `/etc/curielogger/`) overlaid by `CURIELOGGER_*`
//! environment variables, where a dotted key maps to an underscored variable
//! (`outputs.bucket.flush_seconds` -> `CURIELOGGER_OUTPUTS_BUCKET_FLUSH_SECONDS`).

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 65_536;

const SEARCH_PATHS: &[&str] = &[".", "./..", "/etc/curielogger"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid value {value:?} for {key}: {detail}")]
    InvalidValue {
        key: &'static str,
        value: String,
        detail: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum LogLevel {
    Info,
    Debug,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl LogLevel {
    /// Directive consumed by the tracing `EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{other}', expected one of info|debug|error")),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(s: String) -> Result<Self, String> {
        s.parse()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On-disk format of bucket objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Format {
    Json,
    Parquet,
}

impl Default for Format {
    fn default() -> Self {
        Format::Json
    }
}

impl Format {
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Parquet => "parquet",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Parquet => "application/octet-stream",
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "parquet" => Ok(Format::Parquet),
            other => Err(format!("unknown format '{other}', expected json or parquet")),
        }
    }
}

impl TryFrom<String> for Format {
    type Error = String;

    fn try_from(s: String) -> Result<Self, String> {
        s.parse()
    }
}

/// Compression applied between the format encoder and the blob writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Compression {
    None,
    Gzip,
    Lz4,
}

impl Default for Compression {
    fn default() -> Self {
        Compression::None
    }
}

impl Compression {
    /// Suffix added to the object extension, empty when uncompressed.
    pub fn extension_suffix(&self) -> &'static str {
        match self {
            Compression::None => "",
            Compression::Gzip => ".gz",
            Compression::Lz4 => ".lz4",
        }
    }

    /// `ContentEncoding` advertised on uploaded objects.
    pub fn content_encoding(&self) -> Option<&'static str> {
        match self {
            Compression::None => None,
            Compression::Gzip => Some("gzip"),
            Compression::Lz4 => Some("lz4"),
        }
    }
}

impl FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" => Ok(Compression::None),
            "gzip" => Ok(Compression::Gzip),
            "lz4" => Ok(Compression::Lz4),
            other => Err(format!(r#"unknown compression '{other}', expected "", gzip or lz4"#)),
        }
    }
}

impl TryFrom<String> for Compression {
    type Error = String;

    fn try_from(s: String) -> Result<Self, String> {
        s.parse()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: LogLevel,
    pub channel_capacity: Option<usize>,
    pub outputs: OutputsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputsConfig {
    pub stdout: StdoutConfig,
    pub bucket: BucketConfig,
    pub logstash: LogstashConfig,
    pub webhook: WebhookConfig,
    pub elasticsearch: ElasticsearchConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StdoutConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BucketConfig {
    pub enabled: bool,
    /// Cloud-blob URL: `s3://…`, `gs://…`, `az://…`, `file://…`.
    pub url: String,
    pub prefix: String,
    pub format: Format,
    /// Object path template, rendered with chrono strftime codes plus
    /// `{uuid}` and `{ext}` placeholders.
    pub path: String,
    pub compression: Compression,
    pub flush_seconds: u64,
}

impl Default for BucketConfig {
    fn default() -> Self {
        BucketConfig {
            enabled: false,
            url: String::new(),
            prefix: String::new(),
            format: Format::default(),
            path: default_bucket_path(),
            compression: Compression::default(),
            flush_seconds: 1,
        }
    }
}

pub fn default_bucket_path() -> String {
    "%Y-%m-%d/%H/{uuid}.{ext}".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogstashConfig {
    pub enabled: bool,
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub enabled: bool,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ElasticsearchConfig {
    pub enabled: bool,
    pub url: String,
    pub kibana_url: String,
    pub initialize: bool,
    pub overwrite: bool,
    pub accesslog_index_name: String,
    pub use_data_stream: bool,
    /// Literal ILM policy body; the embedded default applies when empty.
    pub ilm_policy: String,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        ElasticsearchConfig {
            enabled: false,
            url: String::new(),
            kibana_url: String::new(),
            initialize: false,
            overwrite: false,
            accesslog_index_name: "curieaccesslog".to_string(),
            use_data_stream: false,
            ilm_policy: String::new(),
        }
    }
}

impl Config {
    /// Loads configuration from the search path and the environment. A
    /// missing file is not an error; an unreadable or unparseable one is.
    pub fn load() -> Result<Config, ConfigError> {
        let mut cfg = match find_config_file() {
            Some(path) => Config::from_file(&path)?,
            None => Config::default(),
        };
        cfg.apply_env()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity.unwrap_or(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Fluentd is enabled through the environment only.
    pub fn fluentd_url(&self) -> Option<String> {
        if check_env_flag("CURIELOGGER_USES_FLUENTD") {
            Some(std::env::var("CURIELOGGER_FLUENTD_URL").unwrap_or_default())
        } else {
            None
        }
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        env_parse(&mut self.log_level, "CURIELOGGER_LOG_LEVEL")?;
        if let Ok(raw) = std::env::var("CURIELOGGER_CHANNEL_CAPACITY") {
            let parsed = raw.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    key: "CURIELOGGER_CHANNEL_CAPACITY",
                    value: raw.clone(),
                    detail: e.to_string(),
                }
            })?;
            self.channel_capacity = Some(parsed);
        }

        let o = &mut self.outputs;
        env_flag(&mut o.stdout.enabled, "CURIELOGGER_OUTPUTS_STDOUT_ENABLED");

        env_flag(&mut o.bucket.enabled, "CURIELOGGER_OUTPUTS_BUCKET_ENABLED");
        env_string(&mut o.bucket.url, "CURIELOGGER_OUTPUTS_BUCKET_URL");
        env_string(&mut o.bucket.prefix, "CURIELOGGER_OUTPUTS_BUCKET_PREFIX");
        env_string(&mut o.bucket.path, "CURIELOGGER_OUTPUTS_BUCKET_PATH");
        env_parse(&mut o.bucket.format, "CURIELOGGER_OUTPUTS_BUCKET_FORMAT")?;
        env_parse(
            &mut o.bucket.compression,
            "CURIELOGGER_OUTPUTS_BUCKET_COMPRESSION",
        )?;
        env_parse(
            &mut o.bucket.flush_seconds,
            "CURIELOGGER_OUTPUTS_BUCKET_FLUSH_SECONDS",
        )?;

        env_flag(&mut o.logstash.enabled, "CURIELOGGER_OUTPUTS_LOGSTASH_ENABLED");
        env_string(&mut o.logstash.url, "CURIELOGGER_OUTPUTS_LOGSTASH_URL");

        env_flag(&mut o.webhook.enabled, "CURIELOGGER_OUTPUTS_WEBHOOK_ENABLED");
        env_string(&mut o.webhook.url, "CURIELOGGER_OUTPUTS_WEBHOOK_URL");

        let es = &mut o.elasticsearch;
        env_flag(&mut es.enabled, "CURIELOGGER_OUTPUTS_ELASTICSEARCH_ENABLED");
        env_string(&mut es.url, "CURIELOGGER_OUTPUTS_ELASTICSEARCH_URL");
        env_string(&mut es.kibana_url, "CURIELOGGER_OUTPUTS_ELASTICSEARCH_KIBANA_URL");
        env_flag(&mut es.initialize, "CURIELOGGER_OUTPUTS_ELASTICSEARCH_INITIALIZE");
        env_flag(&mut es.overwrite, "CURIELOGGER_OUTPUTS_ELASTICSEARCH_OVERWRITE");
        env_string(
            &mut es.accesslog_index_name,
            "CURIELOGGER_OUTPUTS_ELASTICSEARCH_ACCESSLOG_INDEX_NAME",
        );
        env_flag(
            &mut es.use_data_stream,
            "CURIELOGGER_OUTPUTS_ELASTICSEARCH_USE_DATA_STREAM",
        );
        env_string(&mut es.ilm_policy, "CURIELOGGER_OUTPUTS_ELASTICSEARCH_ILM_POLICY");
        Ok(())
    }
}

fn find_config_file() -> Option<PathBuf> {
    for dir in SEARCH_PATHS {
        for name in ["curielogger.yaml", "curielogger.yml"] {
            let path = Path::new(dir).join(name);
            if path.is_file() {
                return Some(path);
            }
        }
    }
    None
}

/// Truthiness of flag-style environment variables: set, non-empty, and
/// neither `0` nor `false`.
pub fn check_env_flag(key: &str) -> bool {
    match std::env::var(key) {
        Ok(value) => !value.is_empty() && value != "0" && value.to_ascii_lowercase() != "false",
        Err(_) => false,
    }
}

fn env_flag(target: &mut bool, key: &str) {
    if std::env::var(key).is_ok() {
        *target = check_env_flag(key);
    }
}

fn env_string(target: &mut String, key: &str) {
    if let Ok(value) = std::env::var(key) {
        *target = value;
    }
}

fn env_parse<T>(target: &mut T, key: &'static str) -> Result<(), ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    if let Ok(raw) = std::env::var(key) {
        *target = raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            value: raw.clone(),
            detail: e.to_string(),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.log_level, LogLevel::Info);
        assert_eq!(cfg.channel_capacity(), 65_536);
        assert!(!cfg.outputs.stdout.enabled);
        assert_eq!(cfg.outputs.bucket.flush_seconds, 1);
        assert_eq!(cfg.outputs.bucket.format, Format::Json);
        assert_eq!(cfg.outputs.bucket.compression, Compression::None);
        assert_eq!(cfg.outputs.elasticsearch.accesslog_index_name, "curieaccesslog");
    }

    #[test]
    fn parses_yaml_document() {
        let raw = r#"
log_level: debug
channel_capacity: 1024
outputs:
  stdout:
    enabled: true
  bucket:
    enabled: true
    url: file:///tmp/out
    format: parquet
    compression: gzip
    flush_seconds: 5
  logstash:
    enabled: true
    url: http://logstash:8080
  elasticsearch:
    enabled: true
    url: http://es:9200
    initialize: true
    use_data_stream: true
"#;
        let cfg: Config = serde_yaml::from_str(raw).unwrap();
        assert_eq!(cfg.log_level, LogLevel::Debug);
        assert_eq!(cfg.channel_capacity(), 1024);
        assert!(cfg.outputs.stdout.enabled);
        assert_eq!(cfg.outputs.bucket.format, Format::Parquet);
        assert_eq!(cfg.outputs.bucket.compression, Compression::Gzip);
        assert_eq!(cfg.outputs.bucket.flush_seconds, 5);
        assert_eq!(cfg.outputs.logstash.url, "http://logstash:8080");
        assert!(cfg.outputs.elasticsearch.use_data_stream);
        // Unset sections keep their defaults.
        assert!(!cfg.outputs.webhook.enabled);
        assert_eq!(cfg.outputs.bucket.path, default_bucket_path());
    }

    #[test]
    fn compression_accepts_empty_string() {
        assert_eq!("".parse::<Compression>().unwrap(), Compression::None);
        assert_eq!("gzip".parse::<Compression>().unwrap(), Compression::Gzip);
        assert_eq!("lz4".parse::<Compression>().unwrap(), Compression::Lz4);
        assert!("zstd".parse::<Compression>().is_err());
    }

    #[test]
    fn rejects_unknown_log_level() {
        assert!(serde_yaml::from_str::<Config>("log_level: verbose").is_err());
    }
}
