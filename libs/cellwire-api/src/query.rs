use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize, Serializer};

use crate::cell::LATEST_TIMESTAMP;
use crate::error::WireError;
use crate::mutation::check_row;
use crate::plugin::Filter;

// ════════════════════════════════════════════════════════════════
//  Time range
// ════════════════════════════════════════════════════════════════

/// Half-open timestamp interval `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeRange")]
pub struct TimeRange {
    min: u64,
    max: u64,
}

#[derive(Deserialize)]
struct RawTimeRange {
    #[serde(default)]
    min: u64,
    #[serde(default = "latest")]
    max: u64,
}

fn latest() -> u64 {
    LATEST_TIMESTAMP
}

impl TryFrom<RawTimeRange> for TimeRange {
    type Error = WireError;

    fn try_from(raw: RawTimeRange) -> Result<Self, Self::Error> {
        TimeRange::new(raw.min, raw.max)
    }
}

impl TimeRange {
    pub const fn all_time() -> Self {
        Self { min: 0, max: LATEST_TIMESTAMP }
    }

    pub fn new(min: u64, max: u64) -> Result<Self, WireError> {
        if min > max {
            return Err(WireError::format(format!(
                "time range min {min} is greater than max {max}"
            )));
        }
        Ok(Self { min, max })
    }

    /// Exactly one timestamp.
    pub fn at(ts: u64) -> Self {
        Self { min: ts, max: ts.saturating_add(1) }
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn is_all_time(&self) -> bool {
        self.min == 0 && self.max == LATEST_TIMESTAMP
    }

    pub fn contains(&self, ts: u64) -> bool {
        self.min <= ts && ts < self.max
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::all_time()
    }
}

// ════════════════════════════════════════════════════════════════
//  Read options
// ════════════════════════════════════════════════════════════════

/// Whether a read may be served by a secondary replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consistency {
    #[default]
    Strong,
    Timeline,
}

/// How the region server reads store files for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadType {
    #[default]
    Default,
    Stream,
    Pread,
}

fn filter_name<S: Serializer>(filter: &Option<Arc<dyn Filter>>, s: S) -> Result<S::Ok, S::Error> {
    match filter {
        Some(f) => s.serialize_some(f.type_name()),
        None => s.serialize_none(),
    }
}

fn same_filter(a: &Option<Arc<dyn Filter>>, b: &Option<Arc<dyn Filter>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.type_name() == b.type_name() && a.to_bytes() == b.to_bytes(),
        _ => false,
    }
}

fn yes() -> bool {
    true
}

fn one() -> u32 {
    1
}

// ════════════════════════════════════════════════════════════════
//  Get
// ════════════════════════════════════════════════════════════════

/// Single-row read.
///
/// `columns` maps a family to the qualifiers to fetch; an empty set means
/// the whole family. Filters are written out by type name only in JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Get {
    #[serde(with = "crate::b64")]
    pub row: Bytes,
    #[serde(with = "crate::b64::columns", default)]
    pub columns: BTreeMap<Bytes, BTreeSet<Bytes>>,
    #[serde(with = "crate::b64::values", default)]
    pub attributes: BTreeMap<String, Bytes>,
    #[serde(serialize_with = "filter_name", skip_deserializing)]
    pub filter: Option<Arc<dyn Filter>>,
    #[serde(default)]
    pub time_range: TimeRange,
    #[serde(with = "crate::b64::keys", default)]
    pub cf_time_ranges: BTreeMap<Bytes, TimeRange>,
    #[serde(default = "one")]
    pub max_versions: u32,
    #[serde(default = "yes")]
    pub cache_blocks: bool,
    #[serde(default)]
    pub store_limit: Option<u32>,
    #[serde(default)]
    pub store_offset: u32,
    #[serde(default)]
    pub existence_only: bool,
    #[serde(default)]
    pub consistency: Consistency,
    #[serde(default)]
    pub load_column_families_on_demand: Option<bool>,
}

impl Get {
    pub fn new(row: impl Into<Bytes>) -> Result<Self, WireError> {
        let row = row.into();
        check_row(&row)?;
        Ok(Self {
            row,
            columns: BTreeMap::new(),
            attributes: BTreeMap::new(),
            filter: None,
            time_range: TimeRange::all_time(),
            cf_time_ranges: BTreeMap::new(),
            max_versions: 1,
            cache_blocks: true,
            store_limit: None,
            store_offset: 0,
            existence_only: false,
            consistency: Consistency::Strong,
            load_column_families_on_demand: None,
        })
    }

    /// Fetch every column of `family`.
    pub fn add_family(&mut self, family: impl Into<Bytes>) -> &mut Self {
        self.columns.insert(family.into(), BTreeSet::new());
        self
    }

    pub fn add_column(&mut self, family: impl Into<Bytes>, qualifier: impl Into<Bytes>) -> &mut Self {
        self.columns.entry(family.into()).or_default().insert(qualifier.into());
        self
    }

    pub fn with_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filter = Some(filter);
        self
    }
}

impl PartialEq for Get {
    fn eq(&self, other: &Self) -> bool {
        self.row == other.row
            && self.columns == other.columns
            && self.attributes == other.attributes
            && same_filter(&self.filter, &other.filter)
            && self.time_range == other.time_range
            && self.cf_time_ranges == other.cf_time_ranges
            && self.max_versions == other.max_versions
            && self.cache_blocks == other.cache_blocks
            && self.store_limit == other.store_limit
            && self.store_offset == other.store_offset
            && self.existence_only == other.existence_only
            && self.consistency == other.consistency
            && self.load_column_families_on_demand == other.load_column_families_on_demand
    }
}

// ════════════════════════════════════════════════════════════════
//  Scan
// ════════════════════════════════════════════════════════════════

/// Range read over `[start_row, stop_row)` by default; the include flags
/// widen or narrow either end. Empty rows mean unbounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scan {
    #[serde(with = "crate::b64", default)]
    pub start_row: Bytes,
    #[serde(default = "yes")]
    pub include_start_row: bool,
    #[serde(with = "crate::b64", default)]
    pub stop_row: Bytes,
    #[serde(default)]
    pub include_stop_row: bool,
    #[serde(with = "crate::b64::columns", default)]
    pub columns: BTreeMap<Bytes, BTreeSet<Bytes>>,
    #[serde(with = "crate::b64::values", default)]
    pub attributes: BTreeMap<String, Bytes>,
    #[serde(serialize_with = "filter_name", skip_deserializing)]
    pub filter: Option<Arc<dyn Filter>>,
    #[serde(default)]
    pub time_range: TimeRange,
    #[serde(with = "crate::b64::keys", default)]
    pub cf_time_ranges: BTreeMap<Bytes, TimeRange>,
    #[serde(default = "one")]
    pub max_versions: u32,
    #[serde(default = "yes")]
    pub cache_blocks: bool,
    #[serde(default)]
    pub batch_size: Option<u32>,
    #[serde(default)]
    pub max_result_size: Option<u64>,
    #[serde(default)]
    pub store_limit: Option<u32>,
    #[serde(default)]
    pub store_offset: u32,
    #[serde(default)]
    pub load_column_families_on_demand: Option<bool>,
    #[serde(default)]
    pub small: bool,
    #[serde(default)]
    pub reversed: bool,
    #[serde(default)]
    pub consistency: Consistency,
    #[serde(default)]
    pub caching: Option<u32>,
    #[serde(default)]
    pub allow_partial_results: bool,
    #[serde(default)]
    pub mvcc_read_point: Option<u64>,
    #[serde(default)]
    pub read_type: ReadType,
}

impl Default for Scan {
    fn default() -> Self {
        Self {
            start_row: Bytes::new(),
            include_start_row: true,
            stop_row: Bytes::new(),
            include_stop_row: false,
            columns: BTreeMap::new(),
            attributes: BTreeMap::new(),
            filter: None,
            time_range: TimeRange::all_time(),
            cf_time_ranges: BTreeMap::new(),
            max_versions: 1,
            cache_blocks: true,
            batch_size: None,
            max_result_size: None,
            store_limit: None,
            store_offset: 0,
            load_column_families_on_demand: None,
            small: false,
            reversed: false,
            consistency: Consistency::Strong,
            caching: None,
            allow_partial_results: false,
            mvcc_read_point: None,
            read_type: ReadType::Default,
        }
    }
}

impl Scan {
    pub fn add_family(&mut self, family: impl Into<Bytes>) -> &mut Self {
        self.columns.insert(family.into(), BTreeSet::new());
        self
    }

    pub fn add_column(&mut self, family: impl Into<Bytes>, qualifier: impl Into<Bytes>) -> &mut Self {
        self.columns.entry(family.into()).or_default().insert(qualifier.into());
        self
    }

    pub fn with_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filter = Some(filter);
        self
    }
}

impl PartialEq for Scan {
    fn eq(&self, other: &Self) -> bool {
        self.start_row == other.start_row
            && self.include_start_row == other.include_start_row
            && self.stop_row == other.stop_row
            && self.include_stop_row == other.include_stop_row
            && self.columns == other.columns
            && self.attributes == other.attributes
            && same_filter(&self.filter, &other.filter)
            && self.time_range == other.time_range
            && self.cf_time_ranges == other.cf_time_ranges
            && self.max_versions == other.max_versions
            && self.cache_blocks == other.cache_blocks
            && self.batch_size == other.batch_size
            && self.max_result_size == other.max_result_size
            && self.store_limit == other.store_limit
            && self.store_offset == other.store_offset
            && self.load_column_families_on_demand == other.load_column_families_on_demand
            && self.small == other.small
            && self.reversed == other.reversed
            && self.consistency == other.consistency
            && self.caching == other.caching
            && self.allow_partial_results == other.allow_partial_results
            && self.mvcc_read_point == other.mvcc_read_point
            && self.read_type == other.read_type
    }
}
