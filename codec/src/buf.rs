use crate::{encode_blob, encode_integer};

/// Output buffer of a request.
///
/// Either a real buffer that encoded values are appended to, or a discard sink used when
/// the caller will never read the output (a one-way request). All writes into a discard
/// sink are no-ops.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RespBuf(Option<Vec<u8>>);

impl RespBuf {
    /// Wrap `buf`, values are appended after its existing content.
    #[inline]
    pub fn new(buf: Vec<u8>) -> Self {
        Self(Some(buf))
    }

    #[inline]
    pub fn discard() -> Self {
        Self(None)
    }

    #[inline]
    pub fn is_discard(&self) -> bool {
        self.0.is_none()
    }

    /// Bytes currently held, always 0 for a discard sink.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.as_ref().map_or(0, Vec::len)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn as_vec_mut(&mut self) -> Option<&mut Vec<u8>> {
        self.0.as_mut()
    }

    #[inline]
    pub fn as_slice(&self) -> Option<&[u8]> {
        self.0.as_deref()
    }

    #[inline]
    pub fn put_integer(&mut self, v: i64) {
        if let Some(buf) = self.0.as_mut() {
            encode_integer(buf, v);
        }
    }

    #[inline]
    pub fn put_blob(&mut self, data: &[u8]) {
        encode_blob(self, data);
    }

    #[inline]
    pub fn put_str(&mut self, s: &str) {
        encode_blob(self, s.as_bytes());
    }

    /// Append bytes without a length prefix.
    #[inline]
    pub fn extend_raw(&mut self, data: &[u8]) {
        if let Some(buf) = self.0.as_mut() {
            buf.extend_from_slice(data);
        }
    }

    #[inline]
    pub fn truncate(&mut self, len: usize) {
        if let Some(buf) = self.0.as_mut() {
            buf.truncate(len);
        }
    }

    /// Take the buffer out, `None` for a discard sink.
    #[inline]
    pub fn into_inner(self) -> Option<Vec<u8>> {
        self.0
    }
}

impl From<Vec<u8>> for RespBuf {
    #[inline]
    fn from(buf: Vec<u8>) -> Self {
        Self::new(buf)
    }
}
