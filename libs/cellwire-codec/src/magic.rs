//! Magic-prefixed framing for persisted blobs.

use bytes::{BufMut, Bytes, BytesMut};

use cellwire_api::WireError;

/// Marker identifying a blob as holding a serialized message.
pub const MAGIC: &[u8; 4] = b"PBUF";

pub const MAGIC_LEN: usize = MAGIC.len();

/// `MAGIC ‖ payload` in a fresh buffer.
pub fn frame(payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(MAGIC_LEN + payload.len());
    buf.put_slice(MAGIC);
    buf.put_slice(payload);
    buf.freeze()
}

pub fn has_magic(bytes: &[u8]) -> bool {
    bytes.starts_with(MAGIC)
}

/// Check for the marker inside `bytes[offset..offset + len]`. Short or
/// out-of-bounds windows answer `false`.
pub fn has_magic_in(bytes: &[u8], offset: usize, len: usize) -> bool {
    if len < MAGIC_LEN {
        return false;
    }
    offset
        .checked_add(MAGIC_LEN)
        .and_then(|end| bytes.get(offset..end))
        .is_some_and(|head| head == MAGIC)
}

pub fn require_magic(bytes: &[u8]) -> Result<(), WireError> {
    if has_magic(bytes) {
        Ok(())
    } else {
        Err(WireError::format(format!(
            "missing magic prefix '{}'",
            String::from_utf8_lossy(MAGIC)
        )))
    }
}

/// Verify the marker and return what follows it.
pub fn strip_magic(bytes: &[u8]) -> Result<&[u8], WireError> {
    require_magic(bytes)?;
    Ok(&bytes[MAGIC_LEN..])
}
