//! Get, Scan and time-range codecs.
//!
//! Encoders leave out fields that still hold their wire default so the
//! message stays minimal. Decoders check presence field by field.

use std::collections::{BTreeMap, BTreeSet};

use bytes::Bytes;

use cellwire_api::{Get, LATEST_TIMESTAMP, Scan, TimeRange, WireError};

use crate::enums::{consistency_from_wire, consistency_to_wire, read_type_from_wire, read_type_to_wire};
use crate::plugin::{PluginRegistry, encode_filter};
use crate::proto;

pub(crate) fn owned(bytes: &Bytes) -> Bytes {
    Bytes::copy_from_slice(bytes)
}

// ════════════════════════════════════════════════════════════════
//  Shared fields
// ════════════════════════════════════════════════════════════════

pub fn encode_time_range(range: TimeRange) -> proto::TimeRange {
    proto::TimeRange { from: Some(range.min()), to: Some(range.max()) }
}

/// Absent bounds default to the widest range.
pub fn decode_time_range(wire: &proto::TimeRange) -> Result<TimeRange, WireError> {
    TimeRange::new(wire.from.unwrap_or(0), wire.to.unwrap_or(LATEST_TIMESTAMP))
}

/// `None` for the all-time range, which is never written out.
pub(crate) fn encode_bounded_time_range(range: TimeRange) -> Option<proto::TimeRange> {
    (!range.is_all_time()).then(|| encode_time_range(range))
}

pub(crate) fn encode_attributes(attributes: &BTreeMap<String, Bytes>) -> Vec<proto::NameBytesPair> {
    attributes
        .iter()
        .map(|(name, value)| proto::NameBytesPair { name: name.clone(), value: Some(value.clone()) })
        .collect()
}

pub(crate) fn decode_attributes(pairs: &[proto::NameBytesPair]) -> BTreeMap<String, Bytes> {
    pairs
        .iter()
        .map(|p| (p.name.clone(), p.value.as_ref().map(owned).unwrap_or_default()))
        .collect()
}

fn encode_columns(columns: &BTreeMap<Bytes, BTreeSet<Bytes>>) -> Vec<proto::Column> {
    columns
        .iter()
        .map(|(family, qualifiers)| proto::Column {
            family: family.clone(),
            qualifier: qualifiers.iter().cloned().collect(),
        })
        .collect()
}

/// A column without qualifiers selects the whole family.
fn decode_columns(wire: &[proto::Column]) -> BTreeMap<Bytes, BTreeSet<Bytes>> {
    let mut columns: BTreeMap<Bytes, BTreeSet<Bytes>> = BTreeMap::new();
    for column in wire {
        let family = owned(&column.family);
        if column.qualifier.is_empty() {
            columns.insert(family, BTreeSet::new());
        } else {
            columns.entry(family).or_default().extend(column.qualifier.iter().map(owned));
        }
    }
    columns
}

fn encode_cf_time_ranges(ranges: &BTreeMap<Bytes, TimeRange>) -> Vec<proto::ColumnFamilyTimeRange> {
    ranges
        .iter()
        .map(|(family, range)| proto::ColumnFamilyTimeRange {
            column_family: family.clone(),
            time_range: encode_time_range(*range),
        })
        .collect()
}

fn decode_cf_time_ranges(
    wire: &[proto::ColumnFamilyTimeRange],
) -> Result<BTreeMap<Bytes, TimeRange>, WireError> {
    wire.iter()
        .map(|cftr| Ok((owned(&cftr.column_family), decode_time_range(&cftr.time_range)?)))
        .collect()
}

// ════════════════════════════════════════════════════════════════
//  Get
// ════════════════════════════════════════════════════════════════

pub fn encode_get(get: &Get) -> proto::Get {
    proto::Get {
        row: get.row.clone(),
        column: encode_columns(&get.columns),
        attribute: encode_attributes(&get.attributes),
        filter: get.filter.as_deref().map(|f| encode_filter(f)),
        time_range: encode_bounded_time_range(get.time_range),
        max_versions: Some(get.max_versions),
        cache_blocks: Some(get.cache_blocks),
        store_limit: get.store_limit,
        store_offset: (get.store_offset > 0).then_some(get.store_offset),
        existence_only: get.existence_only.then_some(true),
        consistency: (get.consistency != cellwire_api::Consistency::Strong)
            .then(|| consistency_to_wire(get.consistency) as i32),
        cf_time_range: encode_cf_time_ranges(&get.cf_time_ranges),
        load_column_families_on_demand: get.load_column_families_on_demand,
    }
}

pub fn decode_get(wire: &proto::Get, registry: &PluginRegistry) -> Result<Get, WireError> {
    let mut get = Get::new(owned(&wire.row))?;
    if let Some(cache_blocks) = wire.cache_blocks {
        get.cache_blocks = cache_blocks;
    }
    if let Some(max_versions) = wire.max_versions {
        get.max_versions = max_versions;
    }
    get.store_limit = wire.store_limit;
    if let Some(store_offset) = wire.store_offset {
        get.store_offset = store_offset;
    }
    get.cf_time_ranges = decode_cf_time_ranges(&wire.cf_time_range)?;
    if let Some(range) = &wire.time_range {
        get.time_range = decode_time_range(range)?;
    }
    if let Some(filter) = &wire.filter {
        get.filter = Some(registry.decode_filter(filter)?);
    }
    get.attributes = decode_attributes(&wire.attribute);
    get.columns = decode_columns(&wire.column);
    get.existence_only = wire.existence_only.unwrap_or(false);
    if let Some(code) = wire.consistency {
        get.consistency = consistency_from_wire(code)?;
    }
    get.load_column_families_on_demand = wire.load_column_families_on_demand;
    Ok(get)
}

// ════════════════════════════════════════════════════════════════
//  Scan
// ════════════════════════════════════════════════════════════════

pub fn encode_scan(scan: &Scan) -> proto::Scan {
    let nonempty = |row: &Bytes| (!row.is_empty()).then(|| row.clone());
    proto::Scan {
        column: encode_columns(&scan.columns),
        attribute: encode_attributes(&scan.attributes),
        start_row: nonempty(&scan.start_row),
        stop_row: nonempty(&scan.stop_row),
        filter: scan.filter.as_deref().map(|f| encode_filter(f)),
        time_range: encode_bounded_time_range(scan.time_range),
        max_versions: Some(scan.max_versions),
        cache_blocks: Some(scan.cache_blocks),
        batch_size: scan.batch_size.filter(|&n| n > 0),
        max_result_size: scan.max_result_size.filter(|&n| n > 0),
        store_limit: scan.store_limit,
        store_offset: (scan.store_offset > 0).then_some(scan.store_offset),
        load_column_families_on_demand: scan.load_column_families_on_demand,
        small: scan.small.then_some(true),
        reversed: scan.reversed.then_some(true),
        consistency: (scan.consistency != cellwire_api::Consistency::Strong)
            .then(|| consistency_to_wire(scan.consistency) as i32),
        caching: scan.caching.filter(|&n| n > 0),
        allow_partial_results: scan.allow_partial_results.then_some(true),
        cf_time_range: encode_cf_time_ranges(&scan.cf_time_ranges),
        mvcc_read_point: scan.mvcc_read_point.filter(|&p| p > 0),
        include_start_row: (!scan.include_start_row).then_some(false),
        include_stop_row: scan.include_stop_row.then_some(true),
        read_type: (scan.read_type != cellwire_api::ReadType::Default)
            .then(|| read_type_to_wire(scan.read_type) as i32),
    }
}

/// A small scan always reads with positional reads, whatever read type
/// the message names.
pub fn decode_scan(wire: &proto::Scan, registry: &PluginRegistry) -> Result<Scan, WireError> {
    let mut scan = Scan {
        start_row: wire.start_row.as_ref().map(owned).unwrap_or_default(),
        stop_row: wire.stop_row.as_ref().map(owned).unwrap_or_default(),
        include_start_row: wire.include_start_row.unwrap_or(true),
        include_stop_row: wire.include_stop_row.unwrap_or(false),
        ..Scan::default()
    };
    if let Some(cache_blocks) = wire.cache_blocks {
        scan.cache_blocks = cache_blocks;
    }
    if let Some(max_versions) = wire.max_versions {
        scan.max_versions = max_versions;
    }
    scan.store_limit = wire.store_limit;
    if let Some(store_offset) = wire.store_offset {
        scan.store_offset = store_offset;
    }
    scan.load_column_families_on_demand = wire.load_column_families_on_demand;
    scan.cf_time_ranges = decode_cf_time_ranges(&wire.cf_time_range)?;
    if let Some(range) = &wire.time_range {
        scan.time_range = decode_time_range(range)?;
    }
    if let Some(filter) = &wire.filter {
        scan.filter = Some(registry.decode_filter(filter)?);
    }
    scan.batch_size = wire.batch_size;
    scan.max_result_size = wire.max_result_size;
    scan.small = wire.small.unwrap_or(false);
    scan.allow_partial_results = wire.allow_partial_results.unwrap_or(false);
    scan.attributes = decode_attributes(&wire.attribute);
    scan.columns = decode_columns(&wire.column);
    scan.reversed = wire.reversed.unwrap_or(false);
    if let Some(code) = wire.consistency {
        scan.consistency = consistency_from_wire(code)?;
    }
    scan.caching = wire.caching;
    scan.mvcc_read_point = wire.mvcc_read_point;
    if scan.small {
        scan.read_type = cellwire_api::ReadType::Pread;
    } else if let Some(code) = wire.read_type {
        scan.read_type = read_type_from_wire(code)?;
    }
    Ok(scan)
}
