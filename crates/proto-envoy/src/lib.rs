//! Vendored bindings for the envoy v3 access-log API: the message subset
//! consumed by curielogger plus the `AccessLogService` gRPC service.
//!
//! Sources are committed in prost/tonic generated style so that building the
//! workspace does not require `protoc`. Field tags match the upstream
//! `envoy/data/accesslog/v3` and `envoy/service/accesslog/v3` protos;
//! messages and fields that curielogger never reads are omitted (unknown
//! fields are skipped by prost on decode).

pub mod envoy {
    pub mod config {
        pub mod core {
            pub mod v3 {
                include!("envoy.config.core.v3.rs");
            }
        }
    }
    pub mod data {
        pub mod accesslog {
            pub mod v3 {
                include!("envoy.data.accesslog.v3.rs");
            }
        }
    }
    pub mod service {
        pub mod accesslog {
            pub mod v3 {
                include!("envoy.service.accesslog.v3.rs");
            }
        }
    }
}
