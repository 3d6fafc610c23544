//! Message decoding without a built-in size ceiling.
//!
//! Parsing is bounded by the input itself unless the caller sets an
//! explicit limit. A message is always parsed from exactly its declared
//! span; `prost` rejects a zero tag and consumes the whole span, so no
//! bytes can be left behind inside it.

use std::io::{self, Read, Write};

use bytes::{BufMut, Bytes, BytesMut};
use prost::Message;

use cellwire_api::WireError;

use crate::config::CodecConfig;
use crate::magic::{MAGIC, MAGIC_LEN};

/// Longest varint a 64-bit length can take.
const MAX_VARINT_LEN: usize = 10;

pub(crate) fn decode_error(err: prost::DecodeError) -> WireError {
    WireError::format(err.to_string())
}

fn read_error(err: io::Error) -> WireError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        WireError::format("stream ended inside a message")
    } else {
        WireError::Io(err)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageReader {
    limit: Option<usize>,
}

impl MessageReader {
    /// No ceiling; a message may be as large as the input.
    pub const fn unbounded() -> Self {
        Self { limit: None }
    }

    pub const fn with_limit(limit: usize) -> Self {
        Self { limit: Some(limit) }
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self { limit: config.max_message_size }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    fn check_size(&self, len: usize) -> Result<(), WireError> {
        match self.limit {
            Some(limit) if len > limit => Err(WireError::format(format!(
                "message of {len} bytes exceeds limit of {limit}"
            ))),
            _ => Ok(()),
        }
    }

    /// Parse a whole byte slice. Byte fields are copied out of `buf`.
    pub fn parse_slice<M: Message + Default>(&self, buf: &[u8]) -> Result<M, WireError> {
        self.check_size(buf.len())?;
        M::decode(buf).map_err(decode_error)
    }

    /// Parse `buf[offset..offset + len]`.
    pub fn parse_range<M: Message + Default>(
        &self,
        buf: &[u8],
        offset: usize,
        len: usize,
    ) -> Result<M, WireError> {
        let span = offset
            .checked_add(len)
            .and_then(|end| buf.get(offset..end))
            .ok_or_else(|| {
                WireError::format(format!(
                    "range {offset}+{len} outside buffer of {} bytes",
                    buf.len()
                ))
            })?;
        self.parse_slice(span)
    }

    /// Parse a shared buffer. Byte fields of the message slice `buf`
    /// without copying.
    pub fn parse_bytes<M: Message + Default>(&self, buf: Bytes) -> Result<M, WireError> {
        self.check_size(buf.len())?;
        M::decode(buf).map_err(decode_error)
    }

    /// Parse everything left in `reader` as one message.
    pub fn parse_reader<M: Message + Default, R: Read>(&self, reader: R) -> Result<M, WireError> {
        let mut buf = Vec::new();
        match self.limit {
            Some(limit) => {
                // One byte past the limit is enough to know it was exceeded.
                reader.take(limit as u64 + 1).read_to_end(&mut buf)?;
                self.check_size(buf.len())?;
            }
            None => {
                let mut reader = reader;
                reader.read_to_end(&mut buf)?;
            }
        }
        M::decode(Bytes::from(buf)).map_err(decode_error)
    }

    /// Parse exactly `len` bytes from `reader`. A shorter stream is a
    /// format error.
    pub fn parse_reader_sized<M: Message + Default, R: Read>(
        &self,
        reader: R,
        len: usize,
    ) -> Result<M, WireError> {
        self.check_size(len)?;
        let body = read_exact_bytes(reader, len)?;
        M::decode(body).map_err(decode_error)
    }

    /// Parse one `varint(len) ‖ message` unit.
    ///
    /// `Ok(None)` when the stream is already exhausted, which marks the end
    /// of a delimited sequence rather than a failure.
    pub fn parse_delimited<M: Message + Default, R: Read>(
        &self,
        mut reader: R,
    ) -> Result<Option<M>, WireError> {
        let Some(len) = read_length_prefix(&mut reader)? else {
            return Ok(None);
        };
        let len = usize::try_from(len)
            .map_err(|_| WireError::format(format!("length prefix {len} does not fit in memory")))?;
        self.parse_reader_sized(reader, len).map(Some)
    }

    /// Read delimited units until the stream is cleanly exhausted.
    pub fn parse_all_delimited<M: Message + Default, R: Read>(
        &self,
        mut reader: R,
    ) -> Result<Vec<M>, WireError> {
        let mut out = Vec::new();
        while let Some(msg) = self.parse_delimited(&mut reader)? {
            out.push(msg);
        }
        Ok(out)
    }
}

fn read_exact_bytes<R: Read>(reader: R, len: usize) -> Result<Bytes, WireError> {
    let mut body = Vec::with_capacity(len.min(64 * 1024));
    reader.take(len as u64).read_to_end(&mut body).map_err(read_error)?;
    if body.len() < len {
        return Err(WireError::format(format!(
            "length prefix declares {len} bytes but only {} follow",
            body.len()
        )));
    }
    Ok(Bytes::from(body))
}

/// `None` on a clean end of stream before the first byte.
fn read_length_prefix<R: Read>(reader: &mut R) -> Result<Option<u64>, WireError> {
    let mut raw = [0u8; MAX_VARINT_LEN];
    let mut n = 0;
    loop {
        let mut byte = [0u8; 1];
        let got = loop {
            match reader.read(&mut byte) {
                Ok(got) => break got,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(WireError::Io(e)),
            }
        };
        if got == 0 {
            if n == 0 {
                return Ok(None);
            }
            return Err(WireError::format("stream ended inside a length prefix"));
        }
        raw[n] = byte[0];
        n += 1;
        if byte[0] & 0x80 == 0 {
            break;
        }
        if n == MAX_VARINT_LEN {
            return Err(WireError::format("length prefix varint is too long"));
        }
    }
    let mut slice = &raw[..n];
    prost::encoding::decode_varint(&mut slice)
        .map(Some)
        .map_err(decode_error)
}

/// `MAGIC ‖ varint(len) ‖ message`, the layout of persisted coordination
/// blobs.
pub fn to_delimited_bytes<M: Message>(msg: &M) -> Bytes {
    let len = msg.encoded_len();
    let mut buf = BytesMut::with_capacity(MAGIC_LEN + prost::length_delimiter_len(len) + len);
    buf.put_slice(MAGIC);
    prost::encoding::encode_varint(len as u64, &mut buf);
    msg.encode_raw(&mut buf);
    buf.freeze()
}

/// Write one `varint(len) ‖ message` unit.
pub fn write_delimited<M: Message, W: Write>(msg: &M, mut writer: W) -> Result<(), WireError> {
    writer.write_all(&msg.encode_length_delimited_to_vec())?;
    Ok(())
}
