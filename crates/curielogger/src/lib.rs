//! curielogger: access-log ingestion sidecar for the curiefense reverse
//! proxy.
//!
//! Three intake listeners (envoy gRPC access-log stream, UDP JSON, TCP
//! syslog) decode heterogeneous wire formats into one canonical record,
//! which is metered into Prometheus counters and fanned out to a
//! configurable set of sinks (stdout, rotating object-store objects, HTTP
//! collectors, Elasticsearch). Sinks shed load by dropping records when
//! their queue fills; the proxy is never blocked on a slow sink.

pub mod config;
pub mod entities;
pub mod metrics;
pub mod outputs;
pub mod sender;
pub mod servers;

pub use config::Config;
pub use entities::AccessLog;
pub use sender::LogSender;
