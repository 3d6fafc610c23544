use std::ops::Range;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::WireError;

/// "Newest version" timestamp sentinel. Kept at the signed 64-bit maximum so
/// it stays compatible with peers that store timestamps as signed longs.
pub const LATEST_TIMESTAMP: u64 = i64::MAX as u64;

/// Upper bound on row key length, inherited from the 16-bit row length slot
/// of the storage format.
pub const MAX_ROW_LENGTH: usize = i16::MAX as usize;

/// Type tag of a cell.
///
/// Numeric codes are part of the wire contract and are assigned explicitly;
/// never rely on declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    Put,
    Delete,
    DeleteFamilyVersion,
    DeleteColumn,
    DeleteFamily,
}

impl KeyType {
    pub const fn code(self) -> u8 {
        match self {
            KeyType::Put => 4,
            KeyType::Delete => 8,
            KeyType::DeleteFamilyVersion => 10,
            KeyType::DeleteColumn => 12,
            KeyType::DeleteFamily => 14,
        }
    }

    /// `None` for codes outside the table, including the `0`/`255`
    /// minimum/maximum sort sentinels that never appear on real cells.
    pub const fn from_code(code: u8) -> Option<KeyType> {
        match code {
            4 => Some(KeyType::Put),
            8 => Some(KeyType::Delete),
            10 => Some(KeyType::DeleteFamilyVersion),
            12 => Some(KeyType::DeleteColumn),
            14 => Some(KeyType::DeleteFamily),
            _ => None,
        }
    }

    pub const fn is_delete(self) -> bool {
        !matches!(self, KeyType::Put)
    }
}

/// Read access to the components of a cell.
///
/// Accessors hand out `Bytes`, so implementations backed by a shared buffer
/// can return slices of it without copying.
pub trait CellRef {
    fn row(&self) -> Bytes;
    fn family(&self) -> Bytes;
    fn qualifier(&self) -> Bytes;
    fn value(&self) -> Bytes;
    fn tags(&self) -> Option<Bytes>;
    fn timestamp(&self) -> u64;
    fn key_type(&self) -> KeyType;

    fn to_cell(&self) -> Cell {
        Cell {
            row: self.row(),
            family: self.family(),
            qualifier: self.qualifier(),
            timestamp: self.timestamp(),
            key_type: self.key_type(),
            value: self.value(),
            tags: self.tags(),
        }
    }
}

/// The atomic unit of stored data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    #[serde(with = "crate::b64")]
    pub row: Bytes,
    #[serde(with = "crate::b64")]
    pub family: Bytes,
    #[serde(with = "crate::b64")]
    pub qualifier: Bytes,
    pub timestamp: u64,
    pub key_type: KeyType,
    #[serde(with = "crate::b64", default)]
    pub value: Bytes,
    #[serde(
        with = "crate::b64::option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub tags: Option<Bytes>,
}

impl Cell {
    pub fn new(
        row: impl Into<Bytes>,
        family: impl Into<Bytes>,
        qualifier: impl Into<Bytes>,
        timestamp: u64,
        key_type: KeyType,
        value: impl Into<Bytes>,
    ) -> Self {
        Self {
            row: row.into(),
            family: family.into(),
            qualifier: qualifier.into(),
            timestamp,
            key_type,
            value: value.into(),
            tags: None,
        }
    }

    /// A delete marker carries no value.
    pub fn delete_marker(
        row: impl Into<Bytes>,
        family: impl Into<Bytes>,
        qualifier: impl Into<Bytes>,
        timestamp: u64,
        key_type: KeyType,
    ) -> Self {
        Self::new(row, family, qualifier, timestamp, key_type, Bytes::new())
    }

    /// Attach a tags blob. An empty blob is the same as no tags.
    pub fn with_tags(mut self, tags: impl Into<Bytes>) -> Self {
        let tags = tags.into();
        self.tags = if tags.is_empty() { None } else { Some(tags) };
        self
    }

    pub fn is_delete(&self) -> bool {
        self.key_type.is_delete()
    }
}

impl CellRef for Cell {
    fn row(&self) -> Bytes {
        self.row.clone()
    }
    fn family(&self) -> Bytes {
        self.family.clone()
    }
    fn qualifier(&self) -> Bytes {
        self.qualifier.clone()
    }
    fn value(&self) -> Bytes {
        self.value.clone()
    }
    fn tags(&self) -> Option<Bytes> {
        self.tags.clone()
    }
    fn timestamp(&self) -> u64 {
        self.timestamp
    }
    fn key_type(&self) -> KeyType {
        self.key_type
    }

    fn to_cell(&self) -> Cell {
        self.clone()
    }
}

/// A cell whose components are ranges of one shared buffer (for example a
/// block read off disk or the network). Accessors slice the buffer.
#[derive(Debug, Clone)]
pub struct BufferCell {
    buf: Bytes,
    row: Range<usize>,
    family: Range<usize>,
    qualifier: Range<usize>,
    value: Range<usize>,
    tags: Option<Range<usize>>,
    timestamp: u64,
    key_type: KeyType,
}

fn check_range(buf: &Bytes, range: &Range<usize>, what: &str) -> Result<(), WireError> {
    if range.start > range.end || range.end > buf.len() {
        return Err(WireError::format(format!(
            "{what} range {}..{} outside buffer of {} bytes",
            range.start,
            range.end,
            buf.len()
        )));
    }
    Ok(())
}

impl BufferCell {
    pub fn new(
        buf: Bytes,
        row: Range<usize>,
        family: Range<usize>,
        qualifier: Range<usize>,
        value: Range<usize>,
        timestamp: u64,
        key_type: KeyType,
    ) -> Result<Self, WireError> {
        check_range(&buf, &row, "row")?;
        check_range(&buf, &family, "family")?;
        check_range(&buf, &qualifier, "qualifier")?;
        check_range(&buf, &value, "value")?;
        Ok(Self { buf, row, family, qualifier, value, tags: None, timestamp, key_type })
    }

    pub fn with_tags(mut self, tags: Range<usize>) -> Result<Self, WireError> {
        check_range(&self.buf, &tags, "tags")?;
        self.tags = if tags.is_empty() { None } else { Some(tags) };
        Ok(self)
    }

    pub fn buffer(&self) -> &Bytes {
        &self.buf
    }
}

impl CellRef for BufferCell {
    fn row(&self) -> Bytes {
        self.buf.slice(self.row.clone())
    }
    fn family(&self) -> Bytes {
        self.buf.slice(self.family.clone())
    }
    fn qualifier(&self) -> Bytes {
        self.buf.slice(self.qualifier.clone())
    }
    fn value(&self) -> Bytes {
        self.buf.slice(self.value.clone())
    }
    fn tags(&self) -> Option<Bytes> {
        self.tags.as_ref().map(|r| self.buf.slice(r.clone()))
    }
    fn timestamp(&self) -> u64 {
        self.timestamp
    }
    fn key_type(&self) -> KeyType {
        self.key_type
    }
}

/// Render bytes with printable ASCII kept and everything else as `\xNN`.
pub fn to_string_binary(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if (b' '..=b'~').contains(&b) && b != b'\\' {
            out.push(b as char);
        } else {
            out.push_str(&format!("\\x{b:02X}"));
        }
    }
    out
}
