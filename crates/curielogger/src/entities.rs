//! The canonical access-log record.
//!
//! Every intake path decodes into [`AccessLog`] and every sink consumes it.
//! JSON field names follow the wire schema emitted by the proxy, which is
//! also the shape accepted on the UDP and syslog intakes. All fields default
//! so that sparse documents decode cleanly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tag appended by the logstash and webhook sinks to their serialized copy
/// of a record before shipping it.
pub const MARKER_TAG: &str = "curieaccesslog";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessLog {
    /// RFC3339 with nanoseconds.
    pub timestamp: String,

    pub blocked: bool,
    pub block_reason: serde_json::Map<String, serde_json::Value>,
    /// Ordered, duplicates preserved; sinks count per appearance.
    pub tags: Vec<String>,

    pub rx_timers: RxTimer,
    pub tx_timers: TxTimer,

    pub upstream: Upstream,
    pub downstream: Downstream,

    pub tls: Tls,
    pub request: Request,
    pub response: Response,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RxTimer {
    pub firstupstreambyte: f64,
    pub lastupstreambyte: f64,
    pub lastbyte: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxTimer {
    pub firstupstreambyte: f64,
    pub lastupstreambyte: f64,
    pub firstdownstreambyte: f64,
    pub lastdownstreambyte: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Downstream {
    pub connectiontermination: bool,
    pub directremoteaddress: String,
    pub directremoteaddressport: u32,
    pub localaddress: String,
    pub localaddressport: u32,
    pub protocolerror: bool,
    pub remoteaddress: String,
    pub remoteaddressport: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Upstream {
    pub cluster: String,
    pub connectionfailure: bool,
    pub connectiontermination: bool,
    pub localaddress: String,
    pub localaddressport: u32,
    pub overflow: bool,
    pub remoteaddress: String,
    pub remoteaddressport: u32,
    pub remotereset: bool,
    pub requesttimeout: bool,
    pub retrylimitexceeded: bool,
    pub transportfailurereason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateData {
    pub properties: String,
    pub propertiesaltnames: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tls {
    pub localcertificate: CertificateData,
    pub peercertificate: CertificateData,
    pub ciphersuite: String,
    pub sessionid: String,
    pub snihostname: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestAttributes {
    pub ip: String,
    pub query: String,
    pub uri: String,
    pub path: String,
    pub method: String,
    pub authority: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geo {
    pub company: String,
    pub city: BTreeMap<String, String>,
    pub country: BTreeMap<String, String>,
    pub continent: BTreeMap<String, String>,
    pub location: BTreeMap<String, f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Request {
    pub requestid: String,
    pub scheme: String,
    pub bodybytes: u64,
    pub headersbytes: u64,
    pub headers: BTreeMap<String, String>,
    pub cookies: BTreeMap<String, String>,
    pub arguments: BTreeMap<String, String>,
    pub geo: Geo,
    pub attributes: RequestAttributes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Response {
    pub headersbytes: u64,
    pub bodybytes: u64,
    pub code: i32,
    pub codedetails: String,
    pub headers: BTreeMap<String, String>,
    pub trailers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub delayinjected: bool,
    pub failedlocalhealthcheck: bool,
    pub faultinjected: bool,
    pub invalidenvoyrequestheaders: bool,
    pub localreset: bool,
    pub nohealthyupstream: bool,
    pub noroutefound: bool,
    pub ratelimited: bool,
    pub ratelimitserviceerror: bool,
    pub streamidletimeout: bool,
    pub samplerate: f64,
    pub routename: String,
    pub unauthorizeddetails: String,
}

/// The firewall-specific document embedded as a JSON string under the
/// `request.info` metadata field of the gRPC intake.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurieProxyLog {
    pub headers: BTreeMap<String, String>,
    pub cookies: BTreeMap<String, String>,
    pub geo: Geo,
    pub arguments: BTreeMap<String, String>,
    pub attributes: RequestAttributes,
    pub blocked: bool,
    pub block_reason: serde_json::Map<String, serde_json::Value>,
    pub tags: Vec<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sparse_datagram_decodes_with_defaults() {
        let raw = r#"{"timestamp":"2024-01-01T00:00:00Z",
            "response":{"code":200,"bodybytes":10,"headersbytes":5},
            "request":{"headersbytes":1,"bodybytes":0,
                       "attributes":{"method":"GET","uri":"/"}},
            "tags":["asn:1","x:y"],"blocked":false}"#;
        let log: AccessLog = serde_json::from_str(raw).unwrap();

        assert_eq!(log.timestamp, "2024-01-01T00:00:00Z");
        assert_eq!(log.response.code, 200);
        assert_eq!(log.response.bodybytes, 10);
        assert_eq!(log.request.headersbytes, 1);
        assert_eq!(log.request.attributes.method, "GET");
        assert_eq!(log.tags, vec!["asn:1", "x:y"]);
        assert!(!log.blocked);
        // Untouched sections are all defaults.
        assert_eq!(log.upstream, Upstream::default());
        assert_eq!(log.tls, Tls::default());
    }

    #[test]
    fn serialization_round_trips() {
        let mut log = AccessLog::default();
        log.timestamp = "2024-01-01T00:00:00.000000001Z".to_string();
        log.tags = vec!["all".to_string(), "geo:us".to_string()];
        log.request
            .headers
            .insert("user-agent".to_string(), "curl".to_string());
        log.request.geo.location.insert("lat".to_string(), 48.85);
        log.block_reason
            .insert("reason".to_string(), serde_json::json!({"initiator": "acl"}));
        log.response.code = 403;
        log.blocked = true;

        let round: AccessLog =
            serde_json::from_str(&serde_json::to_string(&log).unwrap()).unwrap();
        assert_eq!(round, log);
    }

    #[test]
    fn curie_proxy_log_parses_request_info() {
        let raw = r#"{"headers":{"host":"example.com"},"cookies":{},
            "geo":{"company":"ACME","country":{"name":"US"}},
            "arguments":{"q":"1"},
            "attributes":{"ip":"10.0.0.1","method":"POST","uri":"/a?q=1"},
            "blocked":true,"block_reason":{"initiator":"acl"},
            "tags":["all","aclid:42"]}"#;
        let info: CurieProxyLog = serde_json::from_str(raw).unwrap();
        assert_eq!(info.headers["host"], "example.com");
        assert_eq!(info.geo.country["name"], "US");
        assert_eq!(info.attributes.method, "POST");
        assert!(info.blocked);
        assert_eq!(info.tags.len(), 2);
    }
}
