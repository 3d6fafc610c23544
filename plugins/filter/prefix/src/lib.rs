//! Row-prefix filter.

use std::any::Any;
use std::sync::Arc;

use bytes::Bytes;
use prost::Message;

use cellwire_api::{Cell, Filter, WireError};
use cellwire_codec::PluginRegistry;

pub const PREFIX_FILTER: &str = "org.apache.hadoop.hbase.filter.PrefixFilter";

#[derive(Clone, PartialEq, prost::Message)]
struct PrefixPayload {
    #[prost(bytes = "bytes", optional, tag = "1")]
    prefix: Option<Bytes>,
}

/// Lets through cells whose row starts with `prefix`. An empty prefix
/// matches every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixFilter {
    prefix: Bytes,
}

impl PrefixFilter {
    pub fn new(prefix: impl Into<Bytes>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn prefix(&self) -> &Bytes {
        &self.prefix
    }

    pub fn parse(payload: &[u8], _: &PluginRegistry) -> Result<Arc<dyn Filter>, WireError> {
        let wire = PrefixPayload::decode(payload).map_err(|e| WireError::format(e.to_string()))?;
        let prefix = wire.prefix.as_deref().map(Bytes::copy_from_slice).unwrap_or_default();
        Ok(Arc::new(Self { prefix }))
    }
}

impl Filter for PrefixFilter {
    fn type_name(&self) -> &str {
        PREFIX_FILTER
    }

    fn to_bytes(&self) -> Bytes {
        let wire = PrefixPayload {
            prefix: (!self.prefix.is_empty()).then(|| self.prefix.clone()),
        };
        wire.encode_to_vec().into()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn accepts(&self, cell: &Cell) -> bool {
        cell.row.starts_with(&self.prefix)
    }
}

pub fn register(registry: &mut PluginRegistry) {
    registry.register_filter(PREFIX_FILTER, PrefixFilter::parse);
}
