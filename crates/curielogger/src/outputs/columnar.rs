//! Arrow schema of the canonical record, used by the bucket sink's parquet
//! path. Rows are decoded straight from the record's JSON serialization;
//! the only massaging is stringifying the free-form `block_reason` values so
//! that the column stays `Utf8 -> Utf8`.

use std::sync::Arc;

use arrow_schema::{DataType, Field, Fields, Schema, SchemaRef};

use crate::entities::AccessLog;

fn utf8(name: &str) -> Field {
    Field::new(name, DataType::Utf8, true)
}

fn boolean(name: &str) -> Field {
    Field::new(name, DataType::Boolean, true)
}

fn float64(name: &str) -> Field {
    Field::new(name, DataType::Float64, true)
}

fn uint32(name: &str) -> Field {
    Field::new(name, DataType::UInt32, true)
}

fn uint64(name: &str) -> Field {
    Field::new(name, DataType::UInt64, true)
}

fn string_map(name: &str) -> Field {
    map(name, DataType::Utf8)
}

fn map(name: &str, values: DataType) -> Field {
    Field::new_map(
        name,
        "entries",
        Arc::new(Field::new("keys", DataType::Utf8, false)),
        Arc::new(Field::new("values", values, true)),
        false,
        true,
    )
}

fn string_list(name: &str) -> Field {
    Field::new(
        name,
        DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
        true,
    )
}

fn structure(name: &str, fields: Vec<Field>) -> Field {
    Field::new(name, DataType::Struct(Fields::from(fields)), true)
}

fn certificate(name: &str) -> Field {
    structure(
        name,
        vec![utf8("properties"), string_list("propertiesaltnames")],
    )
}

/// Schema mirroring [`AccessLog`]'s serialization.
pub(crate) fn schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        utf8("timestamp"),
        boolean("blocked"),
        string_map("block_reason"),
        string_list("tags"),
        structure(
            "rx_timers",
            vec![
                float64("firstupstreambyte"),
                float64("lastupstreambyte"),
                float64("lastbyte"),
            ],
        ),
        structure(
            "tx_timers",
            vec![
                float64("firstupstreambyte"),
                float64("lastupstreambyte"),
                float64("firstdownstreambyte"),
                float64("lastdownstreambyte"),
            ],
        ),
        structure(
            "upstream",
            vec![
                utf8("cluster"),
                boolean("connectionfailure"),
                boolean("connectiontermination"),
                utf8("localaddress"),
                uint32("localaddressport"),
                boolean("overflow"),
                utf8("remoteaddress"),
                uint32("remoteaddressport"),
                boolean("remotereset"),
                boolean("requesttimeout"),
                boolean("retrylimitexceeded"),
                utf8("transportfailurereason"),
            ],
        ),
        structure(
            "downstream",
            vec![
                boolean("connectiontermination"),
                utf8("directremoteaddress"),
                uint32("directremoteaddressport"),
                utf8("localaddress"),
                uint32("localaddressport"),
                boolean("protocolerror"),
                utf8("remoteaddress"),
                uint32("remoteaddressport"),
            ],
        ),
        structure(
            "tls",
            vec![
                certificate("localcertificate"),
                certificate("peercertificate"),
                utf8("ciphersuite"),
                utf8("sessionid"),
                utf8("snihostname"),
                utf8("version"),
            ],
        ),
        structure(
            "request",
            vec![
                utf8("requestid"),
                utf8("scheme"),
                uint64("bodybytes"),
                uint64("headersbytes"),
                string_map("headers"),
                string_map("cookies"),
                string_map("arguments"),
                structure(
                    "geo",
                    vec![
                        utf8("company"),
                        string_map("city"),
                        string_map("country"),
                        string_map("continent"),
                        map("location", DataType::Float32),
                    ],
                ),
                structure(
                    "attributes",
                    vec![
                        utf8("ip"),
                        utf8("query"),
                        utf8("uri"),
                        utf8("path"),
                        utf8("method"),
                        utf8("authority"),
                    ],
                ),
            ],
        ),
        structure(
            "response",
            vec![
                uint64("headersbytes"),
                uint64("bodybytes"),
                Field::new("code", DataType::Int32, true),
                utf8("codedetails"),
                string_map("headers"),
                string_map("trailers"),
            ],
        ),
        structure(
            "metadata",
            vec![
                boolean("delayinjected"),
                boolean("failedlocalhealthcheck"),
                boolean("faultinjected"),
                boolean("invalidenvoyrequestheaders"),
                boolean("localreset"),
                boolean("nohealthyupstream"),
                boolean("noroutefound"),
                boolean("ratelimited"),
                boolean("ratelimitserviceerror"),
                boolean("streamidletimeout"),
                float64("samplerate"),
                utf8("routename"),
                utf8("unauthorizeddetails"),
            ],
        ),
    ]))
}

/// One schema-shaped row for the columnar writer.
pub(crate) fn row(entry: &AccessLog) -> anyhow::Result<serde_json::Value> {
    let mut doc = serde_json::to_value(entry)?;
    if let Some(reason) = doc
        .get_mut("block_reason")
        .and_then(serde_json::Value::as_object_mut)
    {
        for value in reason.values_mut() {
            if !value.is_string() {
                *value = serde_json::Value::String(value.to_string());
            }
        }
    }
    Ok(doc)
}

#[cfg(test)]
mod test {
    use super::*;
    use arrow_json::ReaderBuilder;

    fn populated() -> AccessLog {
        let mut log = AccessLog::default();
        log.timestamp = "2024-01-01T00:00:00.5Z".to_string();
        log.blocked = true;
        log.block_reason
            .insert("reason".to_string(), serde_json::json!({"initiator": "acl"}));
        log.block_reason
            .insert("kind".to_string(), serde_json::json!("block"));
        log.tags = vec!["all".to_string(), "asn:1".to_string()];
        log.rx_timers.lastbyte = 0.25;
        log.upstream.remoteaddress = "10.0.0.9".to_string();
        log.upstream.remoteaddressport = 8080;
        log.tls.localcertificate.propertiesaltnames = vec!["example.com".to_string()];
        log.request
            .headers
            .insert("host".to_string(), "example.com".to_string());
        log.request.geo.location.insert("lat".to_string(), 48.85);
        log.request.attributes.method = "GET".to_string();
        log.response.code = 403;
        log.response
            .headers
            .insert("content-type".to_string(), "text/plain".to_string());
        log.metadata.samplerate = 1.0;
        log
    }

    #[test]
    fn rows_decode_against_the_schema() {
        let mut decoder = ReaderBuilder::new(schema()).build_decoder().unwrap();
        let rows = [
            row(&AccessLog::default()).unwrap(),
            row(&populated()).unwrap(),
        ];
        decoder.serialize(&rows).unwrap();
        let batch = decoder.flush().unwrap().expect("a batch");
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), schema().fields().len());
    }

    #[test]
    fn free_form_block_reason_values_are_stringified() {
        let doc = row(&populated()).unwrap();
        let reason = doc["block_reason"].as_object().unwrap();
        assert_eq!(reason["kind"], serde_json::json!("block"));
        assert_eq!(
            reason["reason"],
            serde_json::json!(r#"{"initiator":"acl"}"#)
        );
    }
}
