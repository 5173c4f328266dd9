use crate::{RespBuf, decode_integer, encode_integer};

/// Append `data` with its length prefix. Does nothing on a discard sink.
pub fn encode_blob(buf: &mut RespBuf, data: &[u8]) {
    let Some(buf) = buf.as_vec_mut() else {
        return;
    };
    encode_integer(buf, data.len() as i64);
    buf.extend_from_slice(data);
}

/// Decode a length-prefixed blob, returning the blob and the bytes after it.
///
/// Fails when the length cannot be decoded, is negative, or exceeds the remaining input.
pub fn decode_blob(buf: &[u8]) -> Option<(&[u8], &[u8])> {
    let (size, rest) = decode_integer(buf)?;
    let size = usize::try_from(size).ok()?;
    rest.split_at_checked(size)
}

#[inline]
pub fn encode_str(buf: &mut RespBuf, s: &str) {
    encode_blob(buf, s.as_bytes())
}

/// Decode a string blob. Besides the blob failures, invalid UTF-8 also fails.
#[inline]
pub fn decode_str(buf: &[u8]) -> Option<(&str, &[u8])> {
    let (data, rest) = decode_blob(buf)?;
    Some((std::str::from_utf8(data).ok()?, rest))
}
