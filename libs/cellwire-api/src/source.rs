use crate::cell::Cell;
use crate::error::WireError;

/// Sequential supply of cells consumed in lockstep with a count declared in
/// a metadata-only message.
///
/// The caller owns the source; codecs only borrow it for one call. A
/// source is single-consumer.
pub trait CellSource {
    /// Move to the next cell. `Ok(false)` once exhausted.
    fn advance(&mut self) -> Result<bool, WireError>;

    /// The cell the last successful `advance` moved to.
    fn current(&self) -> Option<&Cell>;
}

/// In-memory source over an owned list of cells.
#[derive(Debug, Clone, Default)]
pub struct VecCellSource {
    cells: Vec<Cell>,
    // Index of the current cell plus one; 0 before the first advance.
    pos: usize,
}

impl VecCellSource {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells, pos: 0 }
    }

    /// Cells not yet handed out.
    pub fn remaining(&self) -> usize {
        self.cells.len().saturating_sub(self.pos)
    }
}

impl From<Vec<Cell>> for VecCellSource {
    fn from(cells: Vec<Cell>) -> Self {
        Self::new(cells)
    }
}

impl CellSource for VecCellSource {
    fn advance(&mut self) -> Result<bool, WireError> {
        if self.pos < self.cells.len() {
            self.pos += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn current(&self) -> Option<&Cell> {
        self.pos.checked_sub(1).and_then(|i| self.cells.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::KeyType;

    #[test]
    fn walks_cells_in_order() {
        let a = Cell::new("r", "f", "a", 1, KeyType::Put, "1");
        let b = Cell::new("r", "f", "b", 1, KeyType::Put, "2");
        let mut src = VecCellSource::new(vec![a.clone(), b.clone()]);
        assert!(src.current().is_none());
        assert!(src.advance().unwrap());
        assert_eq!(src.current(), Some(&a));
        assert!(src.advance().unwrap());
        assert_eq!(src.current(), Some(&b));
        assert_eq!(src.remaining(), 0);
        assert!(!src.advance().unwrap());
    }
}
