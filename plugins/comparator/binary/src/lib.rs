//! Byte-array comparators: whole-value and prefix comparison.
//!
//! Both carry their operand as a `ByteArrayComparable` wrapped in a
//! one-field message, the layout remote peers expect.

use std::any::Any;
use std::cmp::Ordering;
use std::sync::Arc;

use bytes::Bytes;
use prost::Message;

use cellwire_api::{Comparator, WireError};
use cellwire_codec::PluginRegistry;
use cellwire_codec::plugin::to_byte_array_comparable;
use cellwire_codec::proto::ByteArrayComparable;

pub const BINARY_COMPARATOR: &str = "org.apache.hadoop.hbase.filter.BinaryComparator";
pub const BINARY_PREFIX_COMPARATOR: &str = "org.apache.hadoop.hbase.filter.BinaryPrefixComparator";

#[derive(Clone, PartialEq, prost::Message)]
struct ComparatorPayload {
    #[prost(message, optional, tag = "1")]
    comparable: Option<ByteArrayComparable>,
}

fn encode_payload(value: &[u8]) -> Bytes {
    ComparatorPayload { comparable: Some(to_byte_array_comparable(value)) }
        .encode_to_vec()
        .into()
}

fn decode_payload(payload: &[u8]) -> Result<Bytes, WireError> {
    let wire = ComparatorPayload::decode(payload).map_err(|e| WireError::format(e.to_string()))?;
    let value = wire
        .comparable
        .ok_or_else(|| WireError::format("comparable is missing"))?
        .value
        .unwrap_or_default();
    Ok(Bytes::copy_from_slice(&value))
}

// ---- BinaryComparator ----

/// Lexicographic comparison against a fixed operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryComparator {
    value: Bytes,
}

impl BinaryComparator {
    pub fn new(value: impl Into<Bytes>) -> Self {
        Self { value: value.into() }
    }

    pub fn value(&self) -> &Bytes {
        &self.value
    }

    pub fn parse(payload: &[u8], _: &PluginRegistry) -> Result<Arc<dyn Comparator>, WireError> {
        Ok(Arc::new(Self { value: decode_payload(payload)? }))
    }
}

impl Comparator for BinaryComparator {
    fn type_name(&self) -> &str {
        BINARY_COMPARATOR
    }

    fn to_bytes(&self) -> Bytes {
        encode_payload(&self.value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn compare_to(&self, other: &[u8]) -> Ordering {
        self.value[..].cmp(other)
    }
}

// ---- BinaryPrefixComparator ----

/// Compares the operand against at most its own length of the other side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryPrefixComparator {
    value: Bytes,
}

impl BinaryPrefixComparator {
    pub fn new(value: impl Into<Bytes>) -> Self {
        Self { value: value.into() }
    }

    pub fn value(&self) -> &Bytes {
        &self.value
    }

    pub fn parse(payload: &[u8], _: &PluginRegistry) -> Result<Arc<dyn Comparator>, WireError> {
        Ok(Arc::new(Self { value: decode_payload(payload)? }))
    }
}

impl Comparator for BinaryPrefixComparator {
    fn type_name(&self) -> &str {
        BINARY_PREFIX_COMPARATOR
    }

    fn to_bytes(&self) -> Bytes {
        encode_payload(&self.value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn compare_to(&self, other: &[u8]) -> Ordering {
        let end = other.len().min(self.value.len());
        self.value[..].cmp(&other[..end])
    }
}

/// Register both comparators.
pub fn register(registry: &mut PluginRegistry) {
    registry
        .register_comparator(BINARY_COMPARATOR, BinaryComparator::parse)
        .register_comparator(BINARY_PREFIX_COMPARATOR, BinaryPrefixComparator::parse);
}
