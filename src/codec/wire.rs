//! codec::wire
//!
//! Low-level byte reader and writer for the metadata wire format.
//!
//! # Encoding Rules
//!
//! - Fixed-width integers are little-endian
//! - Lengths and type ids use the compact integer encoding (2-bit mode tag
//!   in the low bits of the first byte)
//! - Strings are compact-length-prefixed UTF-8
//! - `Option<T>` is a `0x00` / `0x01` tag followed by `T` when present
//!
//! # Example
//!
//! ```
//! use metaconform::codec::wire::{Reader, Writer};
//!
//! let mut w = Writer::new();
//! w.compact(300);
//! w.str("balances");
//!
//! let bytes = w.into_bytes();
//! let mut r = Reader::new(&bytes);
//! assert_eq!(r.compact().unwrap(), 300);
//! assert_eq!(r.str().unwrap(), "balances");
//! assert!(r.is_empty());
//! ```

use super::CodecError;

/// Cursor over an encoded byte slice.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Create a reader positioned at the start of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Current offset into the input.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Whether every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Fail with `TrailingBytes` if input is left over.
    pub fn finish(&self) -> Result<(), CodecError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CodecError::TrailingBytes(self.remaining()))
        }
    }

    /// Take the next `len` bytes.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < len {
            return Err(CodecError::UnexpectedEof {
                offset: self.pos,
                needed: len,
                remaining: self.remaining(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    pub fn u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    pub fn u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    pub fn u128(&mut self) -> Result<u128, CodecError> {
        Ok(u128::from_le_bytes(self.array()?))
    }

    /// Read a boolean encoded as `0x00` / `0x01`.
    pub fn bool(&mut self) -> Result<bool, CodecError> {
        let offset = self.pos;
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            tag => Err(CodecError::InvalidTag {
                what: "bool",
                tag,
                offset,
            }),
        }
    }

    /// Read a compact-encoded unsigned integer.
    pub fn compact(&mut self) -> Result<u128, CodecError> {
        let offset = self.pos;
        let first = self.u8()?;
        match first & 0b11 {
            0b00 => Ok(u128::from(first >> 2)),
            0b01 => {
                let second = self.u8()?;
                Ok(u128::from(u16::from_le_bytes([first, second]) >> 2))
            }
            0b10 => {
                let rest = self.take(3)?;
                let raw = u32::from_le_bytes([first, rest[0], rest[1], rest[2]]);
                Ok(u128::from(raw >> 2))
            }
            _ => {
                let len = usize::from(first >> 2) + 4;
                if len > 16 {
                    return Err(CodecError::Overflow {
                        what: "compact integer",
                        offset,
                    });
                }
                let raw = self.take(len)?;
                let mut buf = [0u8; 16];
                buf[..len].copy_from_slice(raw);
                Ok(u128::from_le_bytes(buf))
            }
        }
    }

    /// Read a compact integer that must fit in `u32`.
    pub fn compact_u32(&mut self) -> Result<u32, CodecError> {
        let offset = self.pos;
        u32::try_from(self.compact()?).map_err(|_| CodecError::Overflow {
            what: "compact u32",
            offset,
        })
    }

    /// Read a compact length prefix, bounded by the remaining input.
    pub fn len_prefix(&mut self) -> Result<usize, CodecError> {
        let offset = self.pos;
        let len = usize::try_from(self.compact()?).map_err(|_| CodecError::Overflow {
            what: "length prefix",
            offset,
        })?;
        // Every element occupies at least one byte; reject absurd prefixes early.
        if len > self.remaining() {
            return Err(CodecError::UnexpectedEof {
                offset,
                needed: len,
                remaining: self.remaining(),
            });
        }
        Ok(len)
    }

    /// Read compact-length-prefixed raw bytes.
    pub fn bytes(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.len_prefix()?;
        Ok(self.take(len)?.to_vec())
    }

    /// Read a compact-length-prefixed UTF-8 string.
    pub fn str(&mut self) -> Result<String, CodecError> {
        let offset = self.pos;
        let raw = self.bytes()?;
        String::from_utf8(raw).map_err(|_| CodecError::InvalidUtf8 { offset })
    }

    /// Read a compact-length-prefixed sequence.
    pub fn seq<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Result<T, CodecError>,
    ) -> Result<Vec<T>, CodecError> {
        let len = self.len_prefix()?;
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(item(self)?);
        }
        Ok(out)
    }

    /// Read an `Option<T>` tag and payload.
    pub fn option<T>(
        &mut self,
        item: impl FnOnce(&mut Self) -> Result<T, CodecError>,
    ) -> Result<Option<T>, CodecError> {
        let offset = self.pos;
        match self.u8()? {
            0 => Ok(None),
            1 => Ok(Some(item(self)?)),
            tag => Err(CodecError::InvalidTag {
                what: "option",
                tag,
                offset,
            }),
        }
    }

    /// Read a sequence of strings (used for docs and paths).
    pub fn strings(&mut self) -> Result<Vec<String>, CodecError> {
        self.seq(|r| r.str())
    }
}

/// Growable output buffer mirroring [`Reader`].
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn u16(&mut self, v: u16) {
        self.raw(&v.to_le_bytes());
    }

    pub fn u32(&mut self, v: u32) {
        self.raw(&v.to_le_bytes());
    }

    pub fn u64(&mut self, v: u64) {
        self.raw(&v.to_le_bytes());
    }

    pub fn u128(&mut self, v: u128) {
        self.raw(&v.to_le_bytes());
    }

    pub fn bool(&mut self, v: bool) {
        self.u8(u8::from(v));
    }

    /// Write `v` in the shortest compact form.
    pub fn compact(&mut self, v: u128) {
        if v < 1 << 6 {
            self.u8((v as u8) << 2);
        } else if v < 1 << 14 {
            self.u16(((v as u16) << 2) | 0b01);
        } else if v < 1 << 30 {
            self.u32(((v as u32) << 2) | 0b10);
        } else {
            let le = v.to_le_bytes();
            let significant = 16 - (v.leading_zeros() as usize / 8);
            let len = significant.max(4);
            self.u8((((len - 4) as u8) << 2) | 0b11);
            self.raw(&le[..len]);
        }
    }

    pub fn len_prefix(&mut self, len: usize) {
        self.compact(len as u128);
    }

    pub fn bytes(&mut self, bytes: &[u8]) {
        self.len_prefix(bytes.len());
        self.raw(bytes);
    }

    pub fn str(&mut self, s: &str) {
        self.bytes(s.as_bytes());
    }

    pub fn seq<T>(&mut self, items: &[T], mut item: impl FnMut(&mut Self, &T)) {
        self.len_prefix(items.len());
        for it in items {
            item(self, it);
        }
    }

    pub fn option<T>(&mut self, value: Option<&T>, item: impl FnOnce(&mut Self, &T)) {
        match value {
            None => self.u8(0),
            Some(v) => {
                self.u8(1);
                item(self, v);
            }
        }
    }

    pub fn strings(&mut self, items: &[String]) {
        self.seq(items, |w, s| w.str(s));
    }
}
