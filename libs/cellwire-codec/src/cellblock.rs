//! Cell block: the side channel that carries cells next to count-only
//! messages. A block is a run of `varint(len) ‖ Cell` units.

use bytes::{Buf, Bytes, BytesMut};
use prost::Message;

use cellwire_api::{Cell, CellRef, CellSource, WireError};

use crate::cell::{decode_cell, encode_cell};
use crate::reader::decode_error;

pub fn encode_cell_block<'a, C, I>(cells: I) -> Bytes
where
    C: CellRef + ?Sized + 'a,
    I: IntoIterator<Item = &'a C>,
{
    let mut buf = BytesMut::new();
    for cell in cells {
        let wire = encode_cell(cell);
        let len = wire.encoded_len();
        buf.reserve(prost::length_delimiter_len(len) + len);
        prost::encoding::encode_varint(len as u64, &mut buf);
        wire.encode_raw(&mut buf);
    }
    buf.freeze()
}

/// Reads cells out of a block one at a time, decoding each only when the
/// consumer advances to it.
#[derive(Debug, Clone)]
pub struct CellBlockSource {
    remaining: Bytes,
    current: Option<Cell>,
    index: usize,
}

impl CellBlockSource {
    pub fn new(block: Bytes) -> Self {
        Self { remaining: block, current: None, index: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining_len(&self) -> usize {
        self.remaining.len()
    }
}

impl CellSource for CellBlockSource {
    fn advance(&mut self) -> Result<bool, WireError> {
        self.current = None;
        if !self.remaining.has_remaining() {
            return Ok(false);
        }
        let len = prost::decode_length_delimiter(&mut self.remaining).map_err(decode_error)?;
        if len > self.remaining.len() {
            return Err(WireError::format(format!(
                "cell {} declares {len} bytes but the block has {} left",
                self.index,
                self.remaining.len()
            )));
        }
        let body = self.remaining.split_to(len);
        let wire = crate::proto::Cell::decode(body).map_err(decode_error)?;
        let cell = decode_cell(&wire)?;
        tracing::trace!(index = self.index, len, "decoded cell from block");
        self.index += 1;
        self.current = Some(cell);
        Ok(true)
    }

    fn current(&self) -> Option<&Cell> {
        self.current.as_ref()
    }
}
