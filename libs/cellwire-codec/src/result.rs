//! Row-result codec.
//!
//! Existence answers and empty results are by far the most common replies,
//! so both directions hand out shared `'static` values for them instead of
//! building new ones. Callers get a [`Cow`]; the borrowed arm is always one
//! of the canonical values below.

use std::borrow::Cow;

use cellwire_api::{CellSource, RowResult, WireError};

use crate::cell::{decode_cell, encode_cell, reserved_cells};
use crate::proto;

// ---- canonical wire results ----

const fn wire_result(exists: Option<bool>, stale: bool) -> proto::ResultProto {
    proto::ResultProto {
        cell: Vec::new(),
        associated_cell_count: Some(0),
        exists,
        stale: if stale { Some(true) } else { None },
        partial: None,
    }
}

static EMPTY_RESULT_PB: proto::ResultProto = wire_result(None, false);
static EMPTY_RESULT_PB_STALE: proto::ResultProto = wire_result(None, true);
static EMPTY_RESULT_PB_EXISTS_TRUE: proto::ResultProto = wire_result(Some(true), false);
static EMPTY_RESULT_PB_EXISTS_TRUE_STALE: proto::ResultProto = wire_result(Some(true), true);
static EMPTY_RESULT_PB_EXISTS_FALSE: proto::ResultProto = wire_result(Some(false), false);
static EMPTY_RESULT_PB_EXISTS_FALSE_STALE: proto::ResultProto = wire_result(Some(false), true);

// ---- canonical domain results ----

static EMPTY_RESULT: RowResult = RowResult::empty(false);
static EMPTY_RESULT_STALE: RowResult = RowResult::empty(true);
static EMPTY_RESULT_EXISTS_TRUE: RowResult = RowResult::existence(true, false);
static EMPTY_RESULT_EXISTS_TRUE_STALE: RowResult = RowResult::existence(true, true);
static EMPTY_RESULT_EXISTS_FALSE: RowResult = RowResult::existence(false, false);
static EMPTY_RESULT_EXISTS_FALSE_STALE: RowResult = RowResult::existence(false, true);

/// The shared wire message for an existence-only answer.
pub fn existence_result(exists: bool, stale: bool) -> &'static proto::ResultProto {
    match (exists, stale) {
        (true, false) => &EMPTY_RESULT_PB_EXISTS_TRUE,
        (true, true) => &EMPTY_RESULT_PB_EXISTS_TRUE_STALE,
        (false, false) => &EMPTY_RESULT_PB_EXISTS_FALSE,
        (false, true) => &EMPTY_RESULT_PB_EXISTS_FALSE_STALE,
    }
}

/// The shared wire message for a result without cells.
pub fn empty_result(stale: bool) -> &'static proto::ResultProto {
    if stale { &EMPTY_RESULT_PB_STALE } else { &EMPTY_RESULT_PB }
}

/// The shared domain value for an existence-only answer.
pub fn existence_row_result(exists: bool, stale: bool) -> &'static RowResult {
    match (exists, stale) {
        (true, false) => &EMPTY_RESULT_EXISTS_TRUE,
        (true, true) => &EMPTY_RESULT_EXISTS_TRUE_STALE,
        (false, false) => &EMPTY_RESULT_EXISTS_FALSE,
        (false, true) => &EMPTY_RESULT_EXISTS_FALSE_STALE,
    }
}

/// The shared domain value for a result without cells.
pub fn empty_row_result(stale: bool) -> &'static RowResult {
    if stale { &EMPTY_RESULT_STALE } else { &EMPTY_RESULT }
}

// ════════════════════════════════════════════════════════════════
//  Encode
// ════════════════════════════════════════════════════════════════

/// Encode with every cell inline.
pub fn encode_result(result: &RowResult) -> Cow<'static, proto::ResultProto> {
    if let Some(exists) = result.exists() {
        return Cow::Borrowed(existence_result(exists, result.is_stale()));
    }
    if result.is_empty() {
        return Cow::Borrowed(empty_result(result.is_stale()));
    }
    Cow::Owned(proto::ResultProto {
        cell: result.cells().iter().map(encode_cell).collect(),
        associated_cell_count: None,
        exists: None,
        stale: Some(result.is_stale()),
        partial: Some(result.is_partial()),
    })
}

/// Encode the cell count only; the caller ships `result.cells()` on the
/// side channel.
pub fn encode_result_no_data(result: &RowResult) -> Result<Cow<'static, proto::ResultProto>, WireError> {
    if let Some(exists) = result.exists() {
        return Ok(Cow::Borrowed(existence_result(exists, result.is_stale())));
    }
    if result.is_empty() {
        return Ok(Cow::Borrowed(empty_result(result.is_stale())));
    }
    let count = i32::try_from(result.len()).map_err(|_| {
        WireError::format(format!("{} cells do not fit the cell count field", result.len()))
    })?;
    Ok(Cow::Owned(proto::ResultProto {
        cell: Vec::new(),
        associated_cell_count: Some(count),
        exists: None,
        stale: Some(result.is_stale()),
        partial: result.is_partial().then_some(true),
    }))
}

// ════════════════════════════════════════════════════════════════
//  Decode
// ════════════════════════════════════════════════════════════════

/// Rebuild a result.
///
/// Side-channel cells come first (`associated_cell_count` of them, pulled
/// from `source`), then any cells embedded in the message. Existence
/// answers and empty results decode to the shared values.
pub fn decode_result(
    wire: &proto::ResultProto,
    source: Option<&mut dyn CellSource>,
) -> Result<Cow<'static, RowResult>, WireError> {
    let stale = wire.stale.unwrap_or(false);
    let count = wire.associated_cell_count.unwrap_or(0);

    if let Some(exists) = wire.exists {
        if !wire.cell.is_empty() || count > 0 {
            return Err(WireError::protocol(format!(
                "result asserts exists={exists} but carries {} inline cells and a cell count of {count}",
                wire.cell.len()
            )));
        }
        return Ok(Cow::Borrowed(existence_row_result(exists, stale)));
    }

    let mut cells = Vec::with_capacity(wire.cell.len() + reserved_cells(count));
    if count > 0 {
        let source = source.ok_or_else(|| {
            WireError::protocol(format!("result cell count of {count} but no cell source"))
        })?;
        for index in 0..count {
            if !source.advance()? {
                return Err(WireError::protocol(format!(
                    "result cell count of {count} but at index {index} no cell returned"
                )));
            }
            let cell = source.current().cloned().ok_or_else(|| {
                WireError::protocol(format!("cell source advanced to nothing at index {index}"))
            })?;
            cells.push(cell);
        }
    }
    for wire_cell in &wire.cell {
        cells.push(decode_cell(wire_cell)?);
    }

    if cells.is_empty() {
        return Ok(Cow::Borrowed(empty_row_result(stale)));
    }
    Ok(Cow::Owned(RowResult::new(cells, stale, wire.partial.unwrap_or(false))))
}
