//! Scan metrics travel as `{name, value}` pairs. They are diagnostics
//! only, so decoding never fails the caller.

use std::collections::BTreeMap;

use prost::Message;

use crate::proto;

pub fn encode_scan_metrics(metrics: &BTreeMap<String, i64>) -> proto::ScanMetrics {
    proto::ScanMetrics {
        metrics: metrics
            .iter()
            .map(|(name, value)| proto::NameInt64Pair { name: Some(name.clone()), value: Some(*value) })
            .collect(),
    }
}

/// Best-effort decode. Unparsable input yields an empty map and pairs
/// missing either half are skipped.
pub fn decode_scan_metrics(bytes: &[u8]) -> BTreeMap<String, i64> {
    match proto::ScanMetrics::decode(bytes) {
        Ok(wire) => scan_metrics_from_wire(&wire),
        Err(e) => {
            tracing::debug!(error = %e, len = bytes.len(), "ignoring unparsable scan metrics");
            BTreeMap::new()
        }
    }
}

pub fn scan_metrics_from_wire(wire: &proto::ScanMetrics) -> BTreeMap<String, i64> {
    wire.metrics
        .iter()
        .filter_map(|pair| match (&pair.name, pair.value) {
            (Some(name), Some(value)) => Some((name.clone(), value)),
            _ => None,
        })
        .collect()
}
