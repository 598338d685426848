use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use curielogger::config::{check_env_flag, Config, LogLevel};
use curielogger::metrics::Metrics;
use curielogger::outputs::{self, Tee};
use curielogger::sender::LogSender;
use curielogger::servers;

/// Access-log ingestion sidecar for the curiefense reverse proxy.
#[derive(Debug, Parser)]
#[command(about, version)]
struct Cli {
    /// Address of the envoy gRPC access-log intake.
    #[arg(long, default_value = ":9001", env = "CURIELOGGER_GRPC_LISTEN")]
    grpc_listen: String,
    /// Address of the UDP JSON intake.
    #[arg(long, default_value = ":9002", env = "CURIELOGGER_UDP_LISTEN")]
    udp_listen: String,
    /// Address of the TCP syslog intake.
    #[arg(long, default_value = ":9514", env = "CURIELOGGER_SYSLOG_LISTEN")]
    syslog_listen: String,
    /// Address of the Prometheus exposition endpoint.
    #[arg(long, default_value = ":2112", env = "CURIELOGGER_PROMETHEUS_LISTEN")]
    prometheus_listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("cannot load config")?;
    init_tracing(config.log_level);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting curielogger");
    tracing::info!(log_level = %config.log_level, "log level set");
    tracing::info!(channel_capacity = config.channel_capacity(), "channel capacity set");

    let metrics_enabled = check_env_flag("CURIELOGGER_METRICS_PROMETHEUS_ENABLED");
    let metrics = Metrics::new(metrics_enabled);
    let sender = Arc::new(LogSender::new(
        Tee::new(outputs::build(&config, &metrics)),
        metrics.clone(),
    ));

    if metrics_enabled {
        let addr = listen_addr(&cli.prometheus_listen);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind prometheus exporter on {addr}"))?;
        tracing::info!(addr, "prometheus exporter listening");
        let router = curielogger::metrics::build_router(metrics.clone());
        tokio::spawn(async move {
            if let Err(error) = axum::serve(listener, router).await {
                tracing::error!(%error, "prometheus exporter failed");
            }
        });
    }

    // Bind every intake up front so a taken port fails the process instead
    // of a background task.
    let udp_socket = servers::udp::bind(&listen_addr(&cli.udp_listen)).await?;
    let syslog_listener = servers::syslog::bind(&listen_addr(&cli.syslog_listen)).await?;
    {
        let sender = sender.clone();
        tokio::spawn(async move {
            if let Err(error) = servers::udp::run(udp_socket, sender).await {
                tracing::error!(error = format!("{error:#}"), "UDP intake failed");
            }
        });
    }
    {
        let sender = sender.clone();
        tokio::spawn(async move {
            if let Err(error) = servers::syslog::run(syslog_listener, sender).await {
                tracing::error!(error = format!("{error:#}"), "syslog intake failed");
            }
        });
    }

    let grpc_addr: SocketAddr = listen_addr(&cli.grpc_listen)
        .parse()
        .with_context(|| format!("invalid gRPC listen address {:?}", cli.grpc_listen))?;
    servers::grpc::serve(grpc_addr, sender.clone(), shutdown_signal())
        .await
        .context("failed to serve gRPC")?;

    tracing::info!("shutting down");
    sender.close().await?;
    Ok(())
}

/// Accepts the `:port` shorthand of the container deployments.
fn listen_addr(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    }
}

async fn shutdown_signal() {
    use tokio::signal::unix;

    let mut sigterm =
        unix::signal(unix::SignalKind::terminate()).expect("failed to install signal handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => (),
        _ = sigterm.recv() => (),
    }
    tracing::info!("caught signal to exit");
}

fn init_tracing(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(level.as_str())
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_target(false)
        .compact()
        .init();
}
