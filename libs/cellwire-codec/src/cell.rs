use bytes::Bytes;

use cellwire_api::{Cell, CellRef, WireError};

use crate::enums::{cell_type_from_wire, cell_type_to_wire};
use crate::proto;

/// Most cells reserved up front for a declared side-channel count. The
/// count comes off the wire, so anything past this grows on push.
const MAX_RESERVED_CELLS: usize = 1024;

/// Capacity for a cell list that will hold `count` side-channel cells.
pub(crate) fn reserved_cells(count: i32) -> usize {
    usize::try_from(count).unwrap_or_default().min(MAX_RESERVED_CELLS)
}

/// Wire form of a cell. Components are taken as `Bytes` handles, so a
/// buffer-backed cell is wrapped without copying.
pub fn encode_cell<C: CellRef + ?Sized>(cell: &C) -> proto::Cell {
    proto::Cell {
        row: Some(cell.row()),
        family: Some(cell.family()),
        qualifier: Some(cell.qualifier()),
        timestamp: Some(cell.timestamp()),
        cell_type: Some(cell_type_to_wire(cell.key_type()) as i32),
        value: Some(cell.value()),
        tags: cell.tags().filter(|t| !t.is_empty()),
    }
}

fn owned(field: &Option<Bytes>) -> Bytes {
    field.as_deref().map(Bytes::copy_from_slice).unwrap_or_default()
}

/// Rebuild a cell from its wire form. Every component is copied, so the
/// result never keeps the wire buffer alive.
pub fn decode_cell(wire: &proto::Cell) -> Result<Cell, WireError> {
    let key_type = cell_type_from_wire(wire.cell_type)?;
    let cell = Cell::new(
        owned(&wire.row),
        owned(&wire.family),
        owned(&wire.qualifier),
        wire.timestamp.unwrap_or_default(),
        key_type,
        owned(&wire.value),
    );
    Ok(cell.with_tags(owned(&wire.tags)))
}
