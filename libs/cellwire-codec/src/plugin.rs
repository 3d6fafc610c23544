//! Named-extension codec.
//!
//! Filters and comparators travel as `{type name, opaque payload}`. The
//! receiving side resolves the name against parse functions registered up
//! front; nothing is loaded at runtime.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;

use cellwire_api::{Comparator, Filter, WireError};

use crate::proto;

/// Rebuild a filter from its payload. The registry is passed along so
/// filters wrapping a comparator can resolve it.
pub type FilterParseFn = fn(&[u8], &PluginRegistry) -> Result<Arc<dyn Filter>, WireError>;

pub type ComparatorParseFn = fn(&[u8], &PluginRegistry) -> Result<Arc<dyn Comparator>, WireError>;

/// Name → parse function tables. Populated once at start-up, read-only
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    filters: HashMap<String, FilterParseFn>,
    comparators: HashMap<String, ComparatorParseFn>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filter parser. A later registration under the same name
    /// replaces the earlier one.
    pub fn register_filter(&mut self, name: impl Into<String>, parse: FilterParseFn) -> &mut Self {
        let name = name.into();
        tracing::debug!(filter = %name, "registered filter parser");
        self.filters.insert(name, parse);
        self
    }

    pub fn register_comparator(
        &mut self,
        name: impl Into<String>,
        parse: ComparatorParseFn,
    ) -> &mut Self {
        let name = name.into();
        tracing::debug!(comparator = %name, "registered comparator parser");
        self.comparators.insert(name, parse);
        self
    }

    pub fn has_filter(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    pub fn has_comparator(&self, name: &str) -> bool {
        self.comparators.contains_key(name)
    }

    pub fn decode_filter(&self, wire: &proto::Filter) -> Result<Arc<dyn Filter>, WireError> {
        let parse = self
            .filters
            .get(&wire.name)
            .ok_or_else(|| WireError::plugin(&wire.name, "no filter registered under this name"))?;
        let payload = wire.serialized_filter.as_deref().unwrap_or_default();
        parse(payload, self).map_err(|e| resolution_error(&wire.name, e))
    }

    pub fn decode_comparator(&self, wire: &proto::Comparator) -> Result<Arc<dyn Comparator>, WireError> {
        let parse = self.comparators.get(&wire.name).ok_or_else(|| {
            WireError::plugin(&wire.name, "no comparator registered under this name")
        })?;
        let payload = wire.serialized_comparator.as_deref().unwrap_or_default();
        parse(payload, self).map_err(|e| resolution_error(&wire.name, e))
    }
}

/// Every failure while resolving a named extension surfaces as a
/// resolution error for that name.
fn resolution_error(name: &str, err: WireError) -> WireError {
    match err {
        e @ WireError::PluginResolution { .. } => e,
        other => WireError::plugin(name, other),
    }
}

pub fn encode_filter(filter: &dyn Filter) -> proto::Filter {
    proto::Filter {
        name: filter.type_name().to_string(),
        serialized_filter: Some(filter.to_bytes()),
    }
}

pub fn encode_comparator(comparator: &dyn Comparator) -> proto::Comparator {
    proto::Comparator {
        name: comparator.type_name().to_string(),
        serialized_comparator: Some(comparator.to_bytes()),
    }
}

/// Payload of the byte-array comparators.
pub fn to_byte_array_comparable(value: &[u8]) -> proto::ByteArrayComparable {
    proto::ByteArrayComparable { value: Some(Bytes::copy_from_slice(value)) }
}
