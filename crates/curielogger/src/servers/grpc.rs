//! gRPC intake: the envoy `AccessLogService` streaming endpoint.
//!
//! Each stream message carries a batch of HTTP log entries. Entries are
//! decoded in two stages: the protobuf envelope provides the proxy-side
//! properties (bytes, timings, sockets, TLS, response flags), while the
//! firewall's own fields arrive as a JSON document embedded in the
//! `request.info` filter-metadata string. Entries without curiefense
//! metadata were not produced by the firewall and are dropped.

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use proto_envoy::envoy::config::core::v3 as core;
use proto_envoy::envoy::data::accesslog::v3 as accesslog;
use proto_envoy::envoy::service::accesslog::v3 as als;
use tonic::{Request, Response, Status, Streaming};

use crate::entities::{
    AccessLog, CertificateData, CurieProxyLog, Downstream, Metadata, Request as RequestData,
    Response as ResponseData, RxTimer, Tls, TxTimer, Upstream,
};
use crate::sender::LogSender;

/// Filter-metadata key reserved for the firewall's per-request data.
const CURIEFENSE_METADATA_KEY: &str = "com.reblaze.curiefense";

pub struct AccessLogSvc {
    sender: Arc<LogSender>,
}

impl AccessLogSvc {
    pub fn new(sender: Arc<LogSender>) -> AccessLogSvc {
        AccessLogSvc { sender }
    }
}

#[tonic::async_trait]
impl als::access_log_service_server::AccessLogService for AccessLogSvc {
    async fn stream_access_logs(
        &self,
        request: Request<Streaming<als::StreamAccessLogsMessage>>,
    ) -> Result<Response<als::StreamAccessLogsResponse>, Status> {
        let mut stream = request.into_inner();
        while let Some(message) = stream.message().await? {
            let Some(als::stream_access_logs_message::LogEntries::HttpLogs(http_logs)) =
                message.log_entries
            else {
                continue;
            };
            for entry in http_logs.log_entry {
                let Some(log) = decode_entry(&entry) else {
                    continue;
                };
                if let Err(error) = self.sender.write(log).await {
                    tracing::error!(error = format!("{error:#}"), "failed to submit log entry");
                }
            }
        }
        Ok(Response::new(als::StreamAccessLogsResponse {}))
    }
}

/// Runs the service until `shutdown` resolves.
pub async fn serve(
    addr: SocketAddr,
    sender: Arc<LogSender>,
    shutdown: impl std::future::Future<Output = ()>,
) -> anyhow::Result<()> {
    tracing::info!(%addr, "GRPC server listening");
    tonic::transport::Server::builder()
        .add_service(als::access_log_service_server::AccessLogServiceServer::new(
            AccessLogSvc::new(sender),
        ))
        .serve_with_shutdown(addr, shutdown)
        .await?;
    Ok(())
}

/// Merges one envoy log entry with its embedded firewall document into the
/// canonical record. `None` means the entry is skipped.
pub fn decode_entry(entry: &accesslog::HttpAccessLogEntry) -> Option<AccessLog> {
    let common = entry.common_properties.clone().unwrap_or_default();

    let Some(curiefense) = common
        .metadata
        .as_ref()
        .and_then(|m| m.filter_metadata.get(CURIEFENSE_METADATA_KEY))
    else {
        // This log line was not generated by curiefense.
        tracing::debug!("no curiefense metadata, dropping log entry");
        return None;
    };
    let Some(pbjson_types::value::Kind::StringValue(raw_info)) = curiefense
        .fields
        .get("request.info")
        .and_then(|value| value.kind.as_ref())
    else {
        tracing::error!("did not find request.info in curiefense metadata");
        return None;
    };
    let info: CurieProxyLog = match serde_json::from_str(raw_info) {
        Ok(info) => info,
        Err(error) => {
            tracing::error!(%error, raw = raw_info.as_str(), "failed to parse request.info");
            return None;
        }
    };

    let request = entry.request.clone().unwrap_or_default();
    let response = entry.response.clone().unwrap_or_default();
    let flags = common.response_flags.unwrap_or_default();
    let tls = common.tls_properties.clone().unwrap_or_default();

    let (downstream_remote, downstream_remote_port) =
        socket_address(&common.downstream_remote_address);
    let (downstream_direct, downstream_direct_port) =
        socket_address(&common.downstream_direct_remote_address);
    let (downstream_local, downstream_local_port) =
        socket_address(&common.downstream_local_address);
    let (upstream_remote, upstream_remote_port) = socket_address(&common.upstream_remote_address);
    let (upstream_local, upstream_local_port) = socket_address(&common.upstream_local_address);

    Some(AccessLog {
        timestamp: timestamp_to_rfc3339(common.start_time.as_ref()),
        blocked: info.blocked,
        block_reason: info.block_reason,
        tags: info.tags,
        rx_timers: RxTimer {
            firstupstreambyte: duration_to_seconds(common.time_to_first_upstream_rx_byte.as_ref()),
            lastupstreambyte: duration_to_seconds(common.time_to_last_upstream_rx_byte.as_ref()),
            lastbyte: duration_to_seconds(common.time_to_last_rx_byte.as_ref()),
        },
        tx_timers: TxTimer {
            firstupstreambyte: duration_to_seconds(common.time_to_first_upstream_tx_byte.as_ref()),
            lastupstreambyte: duration_to_seconds(common.time_to_last_upstream_tx_byte.as_ref()),
            firstdownstreambyte: duration_to_seconds(
                common.time_to_first_downstream_tx_byte.as_ref(),
            ),
            lastdownstreambyte: duration_to_seconds(
                common.time_to_last_downstream_tx_byte.as_ref(),
            ),
        },
        upstream: Upstream {
            cluster: common.upstream_cluster,
            connectionfailure: flags.upstream_connection_failure,
            connectiontermination: flags.upstream_connection_termination,
            localaddress: upstream_local,
            localaddressport: upstream_local_port,
            overflow: flags.upstream_overflow,
            remoteaddress: upstream_remote,
            remoteaddressport: upstream_remote_port,
            remotereset: flags.upstream_remote_reset,
            requesttimeout: flags.upstream_request_timeout,
            retrylimitexceeded: flags.upstream_retry_limit_exceeded,
            transportfailurereason: common.upstream_transport_failure_reason,
        },
        downstream: Downstream {
            connectiontermination: flags.downstream_connection_termination,
            directremoteaddress: downstream_direct,
            directremoteaddressport: downstream_direct_port,
            localaddress: downstream_local,
            localaddressport: downstream_local_port,
            protocolerror: flags.downstream_protocol_error,
            remoteaddress: downstream_remote,
            remoteaddressport: downstream_remote_port,
        },
        tls: Tls {
            localcertificate: certificate(&tls.local_certificate_properties),
            peercertificate: certificate(&tls.peer_certificate_properties),
            ciphersuite: tls
                .tls_cipher_suite
                .as_ref()
                .map(|suite| suite.value.to_string())
                .unwrap_or_default(),
            sessionid: tls.tls_session_id.clone(),
            snihostname: tls.tls_sni_hostname.clone(),
            version: tls.tls_version().as_str_name().to_string(),
        },
        request: RequestData {
            requestid: request.request_id.clone(),
            scheme: request.scheme.clone(),
            bodybytes: request.request_body_bytes,
            headersbytes: request.request_headers_bytes,
            headers: info.headers,
            cookies: info.cookies,
            arguments: info.arguments,
            geo: info.geo,
            attributes: info.attributes,
        },
        response: ResponseData {
            headersbytes: response.response_headers_bytes,
            bodybytes: response.response_body_bytes,
            code: response
                .response_code
                .as_ref()
                .map(|code| code.value as i32)
                .unwrap_or_default(),
            codedetails: response.response_code_details.clone(),
            headers: response.response_headers.into_iter().collect(),
            trailers: response.response_trailers.into_iter().collect(),
        },
        metadata: Metadata {
            delayinjected: flags.delay_injected,
            failedlocalhealthcheck: flags.failed_local_healthcheck,
            faultinjected: flags.fault_injected,
            invalidenvoyrequestheaders: flags.invalid_envoy_request_headers,
            localreset: flags.local_reset,
            nohealthyupstream: flags.no_healthy_upstream,
            noroutefound: flags.no_route_found,
            ratelimited: flags.rate_limited,
            ratelimitserviceerror: flags.rate_limit_service_error,
            streamidletimeout: flags.stream_idle_timeout,
            samplerate: common.sample_rate,
            routename: common.route_name,
            unauthorizeddetails: flags
                .unauthorized_details
                .map(|details| details.reason())
                .unwrap_or(accesslog::response_flags::unauthorized::Reason::ReasonUnspecified)
                .as_str_name()
                .to_string(),
        },
    })
}

fn duration_to_seconds(duration: Option<&pbjson_types::Duration>) -> f64 {
    match duration {
        Some(duration) => duration.seconds as f64 + f64::from(duration.nanos) * 1e-9,
        None => 0.0,
    }
}

fn timestamp_to_rfc3339(timestamp: Option<&pbjson_types::Timestamp>) -> String {
    timestamp
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts.seconds, ts.nanos.max(0) as u32))
        .unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn socket_address(address: &Option<core::Address>) -> (String, u32) {
    if let Some(core::address::Address::SocketAddress(socket)) =
        address.as_ref().and_then(|a| a.address.as_ref())
    {
        let port = match socket.port_specifier {
            Some(core::socket_address::PortSpecifier::PortValue(port)) => port,
            _ => 0,
        };
        (socket.address.clone(), port)
    } else {
        (String::new(), 0)
    }
}

fn certificate(
    properties: &Option<accesslog::tls_properties::CertificateProperties>,
) -> CertificateData {
    use accesslog::tls_properties::certificate_properties::subject_alt_name::San;
    match properties {
        Some(properties) => CertificateData {
            properties: properties.subject.clone(),
            propertiesaltnames: properties
                .subject_alt_name
                .iter()
                .filter_map(|san| match &san.san {
                    Some(San::Uri(uri)) => Some(uri.clone()),
                    Some(San::Dns(dns)) => Some(dns.clone()),
                    None => None,
                })
                .collect(),
        },
        None => CertificateData::default(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn request_info() -> String {
        serde_json::json!({
            "headers": {"host": "example.com"},
            "cookies": {"session": "abc"},
            "geo": {"company": "ACME", "country": {"name": "US"}},
            "arguments": {"q": "1"},
            "attributes": {"ip": "203.0.113.7", "method": "GET", "uri": "/", "authority": "example.com"},
            "blocked": false,
            "block_reason": {},
            "tags": ["asn:1", "x:y"]
        })
        .to_string()
    }

    fn curiefense_metadata(info: &str) -> core::Metadata {
        let mut fields = std::collections::BTreeMap::new();
        fields.insert(
            "request.info".to_string(),
            pbjson_types::Value {
                kind: Some(pbjson_types::value::Kind::StringValue(info.to_string())),
            },
        );
        core::Metadata {
            filter_metadata: [(
                CURIEFENSE_METADATA_KEY.to_string(),
                pbjson_types::Struct {
                    fields: fields.into_iter().collect(),
                },
            )]
            .into_iter()
            .collect(),
        }
    }

    fn socket(address: &str, port: u32) -> Option<core::Address> {
        Some(core::Address {
            address: Some(core::address::Address::SocketAddress(core::SocketAddress {
                address: address.to_string(),
                port_specifier: Some(core::socket_address::PortSpecifier::PortValue(port)),
                ..Default::default()
            })),
        })
    }

    fn fixture_entry() -> accesslog::HttpAccessLogEntry {
        accesslog::HttpAccessLogEntry {
            common_properties: Some(accesslog::AccessLogCommon {
                sample_rate: 1.0,
                start_time: Some(pbjson_types::Timestamp {
                    seconds: 1_704_067_200,
                    nanos: 0,
                }),
                time_to_last_rx_byte: Some(pbjson_types::Duration {
                    seconds: 0,
                    nanos: 250_000_000,
                }),
                downstream_remote_address: socket("198.51.100.1", 443),
                upstream_remote_address: socket("10.0.0.9", 8080),
                upstream_cluster: "origin".to_string(),
                route_name: "default".to_string(),
                response_flags: Some(accesslog::ResponseFlags {
                    no_route_found: false,
                    upstream_connection_failure: true,
                    ..Default::default()
                }),
                metadata: Some(curiefense_metadata(&request_info())),
                ..Default::default()
            }),
            request: Some(accesslog::HttpRequestProperties {
                request_method: core::RequestMethod::Get as i32,
                scheme: "https".to_string(),
                request_id: "req-1".to_string(),
                request_headers_bytes: 1,
                request_body_bytes: 0,
                ..Default::default()
            }),
            response: Some(accesslog::HttpResponseProperties {
                response_code: Some(pbjson_types::UInt32Value { value: 200 }),
                response_headers_bytes: 5,
                response_body_bytes: 10,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn merges_envoy_and_firewall_fields() {
        let log = decode_entry(&fixture_entry()).unwrap();

        assert_eq!(log.timestamp, "2024-01-01T00:00:00.000000000Z");
        assert_eq!(log.rx_timers.lastbyte, 0.25);
        assert_eq!(log.downstream.remoteaddress, "198.51.100.1");
        assert_eq!(log.downstream.remoteaddressport, 443);
        assert_eq!(log.upstream.remoteaddress, "10.0.0.9");
        assert!(log.upstream.connectionfailure);
        assert_eq!(log.upstream.cluster, "origin");
        assert_eq!(log.request.requestid, "req-1");
        assert_eq!(log.request.scheme, "https");
        assert_eq!(log.request.headersbytes, 1);
        assert_eq!(log.request.headers["host"], "example.com");
        assert_eq!(log.request.attributes.method, "GET");
        assert_eq!(log.response.code, 200);
        assert_eq!(log.response.headersbytes, 5);
        assert_eq!(log.response.bodybytes, 10);
        assert_eq!(log.metadata.routename, "default");
        assert_eq!(log.metadata.samplerate, 1.0);
        assert_eq!(log.metadata.unauthorizeddetails, "REASON_UNSPECIFIED");
        assert_eq!(log.tags, vec!["asn:1", "x:y"]);
    }

    #[test]
    fn entries_without_curiefense_metadata_are_dropped() {
        let mut entry = fixture_entry();
        entry
            .common_properties
            .as_mut()
            .unwrap()
            .metadata
            .take();
        assert_eq!(decode_entry(&entry), None);
    }

    #[test]
    fn malformed_request_info_is_dropped() {
        let mut entry = fixture_entry();
        entry.common_properties.as_mut().unwrap().metadata =
            Some(curiefense_metadata("{not json"));
        assert_eq!(decode_entry(&entry), None);
    }

    #[test]
    fn missing_start_time_falls_back_to_wall_clock() {
        let mut entry = fixture_entry();
        entry.common_properties.as_mut().unwrap().start_time = None;
        let log = decode_entry(&entry).unwrap();
        // Wall-clock timestamps still render RFC3339 with nanoseconds.
        let parsed = chrono::DateTime::parse_from_rfc3339(&log.timestamp).unwrap();
        assert!(parsed.timestamp() > 1_704_067_200);
    }
}
