use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::cell::{Cell, KeyType, LATEST_TIMESTAMP, MAX_ROW_LENGTH};
use crate::error::WireError;
use crate::query::TimeRange;

/// Which write operation a mutation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Append,
    Increment,
    Put,
    Delete,
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MutationKind::Append => f.write_str("APPEND"),
            MutationKind::Increment => f.write_str("INCREMENT"),
            MutationKind::Put => f.write_str("PUT"),
            MutationKind::Delete => f.write_str("DELETE"),
        }
    }
}

/// How aggressively the write-ahead log entry must be persisted before the
/// write is acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Durability {
    /// Whatever the table is configured with.
    #[default]
    UseDefault,
    SkipWal,
    AsyncWal,
    SyncWal,
    FsyncWal,
}

/// A pending write grouping cells under one row key.
///
/// Cells are kept per family in insertion order; families are ordered by
/// their bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutation {
    kind: MutationKind,
    #[serde(with = "crate::b64")]
    row: Bytes,
    timestamp: u64,
    #[serde(default)]
    durability: Durability,
    #[serde(with = "crate::b64::keys", default)]
    families: BTreeMap<Bytes, Vec<Cell>>,
    #[serde(with = "crate::b64::values", default)]
    attributes: BTreeMap<String, Bytes>,
    /// Only meaningful for increments.
    #[serde(default)]
    time_range: TimeRange,
}

pub(crate) fn check_row(row: &Bytes) -> Result<(), WireError> {
    if row.is_empty() {
        return Err(WireError::format("row key cannot be empty"));
    }
    if row.len() > MAX_ROW_LENGTH {
        return Err(WireError::format(format!(
            "row key length {} exceeds {MAX_ROW_LENGTH}",
            row.len()
        )));
    }
    Ok(())
}

impl Mutation {
    pub fn new(kind: MutationKind, row: impl Into<Bytes>) -> Result<Self, WireError> {
        let row = row.into();
        check_row(&row)?;
        Ok(Self {
            kind,
            row,
            timestamp: LATEST_TIMESTAMP,
            durability: Durability::UseDefault,
            families: BTreeMap::new(),
            attributes: BTreeMap::new(),
            time_range: TimeRange::all_time(),
        })
    }

    pub fn put(row: impl Into<Bytes>) -> Result<Self, WireError> {
        Self::new(MutationKind::Put, row)
    }

    pub fn delete(row: impl Into<Bytes>) -> Result<Self, WireError> {
        Self::new(MutationKind::Delete, row)
    }

    pub fn increment(row: impl Into<Bytes>) -> Result<Self, WireError> {
        Self::new(MutationKind::Increment, row)
    }

    pub fn append(row: impl Into<Bytes>) -> Result<Self, WireError> {
        Self::new(MutationKind::Append, row)
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_durability(mut self, durability: Durability) -> Self {
        self.durability = durability;
        self
    }

    pub fn with_time_range(mut self, time_range: TimeRange) -> Self {
        self.time_range = time_range;
        self
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Bytes>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Add a cell at the mutation's timestamp.
    pub fn add_column(
        &mut self,
        family: impl Into<Bytes>,
        qualifier: impl Into<Bytes>,
        value: impl Into<Bytes>,
    ) -> &mut Self {
        let ts = self.timestamp;
        self.add_column_at(family, qualifier, ts, value)
    }

    pub fn add_column_at(
        &mut self,
        family: impl Into<Bytes>,
        qualifier: impl Into<Bytes>,
        timestamp: u64,
        value: impl Into<Bytes>,
    ) -> &mut Self {
        let family = family.into();
        let cell = Cell::new(self.row.clone(), family.clone(), qualifier, timestamp, KeyType::Put, value);
        self.families.entry(family).or_default().push(cell);
        self
    }

    /// Increment amounts travel as 8-byte big-endian values.
    pub fn add_increment(
        &mut self,
        family: impl Into<Bytes>,
        qualifier: impl Into<Bytes>,
        amount: i64,
    ) -> &mut Self {
        let value = Bytes::copy_from_slice(&amount.to_be_bytes());
        self.add_column(family, qualifier, value)
    }

    /// Delete the version of a column at exactly `timestamp`.
    pub fn delete_column(
        &mut self,
        family: impl Into<Bytes>,
        qualifier: impl Into<Bytes>,
        timestamp: u64,
    ) -> &mut Self {
        self.push_marker(family.into(), qualifier.into(), timestamp, KeyType::Delete)
    }

    /// Delete all versions of a column up to and including `timestamp`.
    pub fn delete_columns(
        &mut self,
        family: impl Into<Bytes>,
        qualifier: impl Into<Bytes>,
        timestamp: u64,
    ) -> &mut Self {
        self.push_marker(family.into(), qualifier.into(), timestamp, KeyType::DeleteColumn)
    }

    pub fn delete_family(&mut self, family: impl Into<Bytes>, timestamp: u64) -> &mut Self {
        self.push_marker(family.into(), Bytes::new(), timestamp, KeyType::DeleteFamily)
    }

    pub fn delete_family_version(&mut self, family: impl Into<Bytes>, timestamp: u64) -> &mut Self {
        self.push_marker(family.into(), Bytes::new(), timestamp, KeyType::DeleteFamilyVersion)
    }

    fn push_marker(&mut self, family: Bytes, qualifier: Bytes, timestamp: u64, key_type: KeyType) -> &mut Self {
        let cell = Cell::delete_marker(self.row.clone(), family.clone(), qualifier, timestamp, key_type);
        self.families.entry(family).or_default().push(cell);
        self
    }

    /// Add an already-built cell. The cell must belong to this row. Deletes
    /// take only delete markers, increments and appends only value cells;
    /// puts take both.
    pub fn add_cell(&mut self, cell: Cell) -> Result<&mut Self, WireError> {
        if cell.row != self.row {
            return Err(WireError::protocol(format!(
                "cell row '{}' does not match mutation row '{}'",
                crate::cell::to_string_binary(&cell.row),
                crate::cell::to_string_binary(&self.row)
            )));
        }
        let fits = match self.kind {
            MutationKind::Delete => cell.is_delete(),
            MutationKind::Increment | MutationKind::Append => !cell.is_delete(),
            MutationKind::Put => true,
        };
        if !fits {
            return Err(WireError::protocol(format!(
                "{} mutation given a {:?} cell",
                self.kind, cell.key_type
            )));
        }
        self.families.entry(cell.family.clone()).or_default().push(cell);
        Ok(self)
    }

    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    pub fn row(&self) -> &Bytes {
        &self.row
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn durability(&self) -> Durability {
        self.durability
    }

    pub fn time_range(&self) -> TimeRange {
        self.time_range
    }

    pub fn attributes(&self) -> &BTreeMap<String, Bytes> {
        &self.attributes
    }

    pub fn family_map(&self) -> &BTreeMap<Bytes, Vec<Cell>> {
        &self.families
    }

    /// All cells, family by family, in the order a side channel carries them.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.families.values().flatten()
    }

    /// Total number of cells.
    pub fn size(&self) -> usize {
        self.families.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_row_is_rejected() {
        assert!(matches!(Mutation::put(Bytes::new()), Err(WireError::Format(_))));
    }

    #[test]
    fn oversized_row_is_rejected() {
        let row = vec![b'x'; MAX_ROW_LENGTH + 1];
        assert!(Mutation::put(row).is_err());
    }

    #[test]
    fn cells_follow_family_order() {
        let mut put = Mutation::put("r1").unwrap().with_timestamp(5);
        put.add_column("b", "q1", "v1");
        put.add_column("a", "q2", "v2");
        put.add_column("b", "q3", "v3");
        let quals: Vec<_> = put.cells().map(|c| c.qualifier.clone()).collect();
        assert_eq!(quals, vec!["q2", "q1", "q3"]);
        assert_eq!(put.size(), 3);
        assert!(put.cells().all(|c| c.timestamp == 5));
    }

    #[test]
    fn delete_accepts_only_markers() {
        let mut delete = Mutation::delete("r1").unwrap();
        let put_cell = Cell::new("r1", "f", "q", 1, KeyType::Put, "v");
        assert!(delete.add_cell(put_cell).is_err());
        let marker = Cell::delete_marker("r1", "f", "q", 1, KeyType::DeleteColumn);
        assert!(delete.add_cell(marker.clone()).is_ok());

        let mut inc = Mutation::increment("r1").unwrap();
        assert!(inc.add_cell(marker.clone()).is_err());
        let mut put = Mutation::put("r1").unwrap();
        assert!(put.add_cell(marker).is_ok());
    }

    #[test]
    fn foreign_row_cell_is_rejected() {
        let mut put = Mutation::put("r1").unwrap();
        let cell = Cell::new("r2", "f", "q", 1, KeyType::Put, "v");
        assert!(matches!(put.add_cell(cell), Err(WireError::ProtocolViolation(_))));
    }

    #[test]
    fn increment_amount_is_big_endian() {
        let mut inc = Mutation::increment("r").unwrap();
        inc.add_increment("f", "q", 1);
        let cell = inc.cells().next().unwrap();
        assert_eq!(&cell.value[..], &[0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn serializes_to_json() {
        let mut put = Mutation::put("r1").unwrap().with_timestamp(100);
        put.add_column("cf", "q", "v");
        let json = serde_json::to_value(&put).unwrap();
        assert_eq!(json["kind"], "put");
        assert_eq!(json["row"], "cjE=");
        let back: Mutation = serde_json::from_value(json).unwrap();
        assert_eq!(back, put);
    }
}
