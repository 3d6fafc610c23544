use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::error::WireError;

/// Cells returned for one row of a read.
///
/// An existence-only answer carries `exists` and no cells. The two are
/// mutually exclusive; constructors keep it that way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawResult")]
pub struct RowResult {
    cells: Vec<Cell>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exists: Option<bool>,
    stale: bool,
    partial: bool,
}

#[derive(Deserialize)]
struct RawResult {
    #[serde(default)]
    cells: Vec<Cell>,
    #[serde(default)]
    exists: Option<bool>,
    #[serde(default)]
    stale: bool,
    #[serde(default)]
    partial: bool,
}

impl TryFrom<RawResult> for RowResult {
    type Error = WireError;

    fn try_from(raw: RawResult) -> Result<Self, Self::Error> {
        if raw.exists.is_some() && !raw.cells.is_empty() {
            return Err(WireError::protocol("result carries both exists and cells"));
        }
        Ok(RowResult {
            cells: raw.cells,
            exists: raw.exists,
            stale: raw.stale,
            partial: raw.partial,
        })
    }
}

impl RowResult {
    /// No cells, no existence flag.
    pub const fn empty(stale: bool) -> Self {
        Self { cells: Vec::new(), exists: None, stale, partial: false }
    }

    /// Existence-only answer.
    pub const fn existence(exists: bool, stale: bool) -> Self {
        Self { cells: Vec::new(), exists: Some(exists), stale, partial: false }
    }

    pub fn new(cells: Vec<Cell>, stale: bool, partial: bool) -> Self {
        Self { cells, exists: None, stale, partial }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }

    pub fn exists(&self) -> Option<bool> {
        self.exists
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Set when the server split the row across several results.
    pub fn is_partial(&self) -> bool {
        self.partial
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }
}
