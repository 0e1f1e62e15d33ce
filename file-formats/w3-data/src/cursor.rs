//! Sequential little-endian cursor over map file buffers.

use memchr::memchr;

use crate::error::{CursorError, Result};
use crate::fourcc::FourCC;

/// Number of decimal places kept when a float is read.
pub const FLOAT_PRECISION: i32 = 3;

/// Round a float to [`FLOAT_PRECISION`] decimal places, half away from zero.
///
/// The rounding runs in `f64` so that a value which already sits on the
/// grid maps back onto the same `f32`.
pub fn round_to_precision(value: f32) -> f32 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(FLOAT_PRECISION);
    ((f64::from(value) * factor).round() / factor) as f32
}

/// Forward-only reader over a borrowed byte buffer.
#[derive(Debug, Clone)]
pub struct W3Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    lossy_strings: usize,
}

impl<'a> W3Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            lossy_strings: 0,
        }
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether every byte of the buffer has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// Number of strings that were not valid UTF-8 and had to be replaced.
    pub fn lossy_strings(&self) -> usize {
        self.lossy_strings
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        if len > available {
            return Err(CursorError::OutOfData {
                offset: self.pos,
                needed: len,
                available,
            });
        }
        let buf: &'a [u8] = self.buf;
        let bytes = &buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read a float exactly as stored.
    pub fn read_f32_raw(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Read a float rounded to three decimal places.
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(round_to_precision(self.read_f32_raw()?))
    }

    /// Read bytes up to the next NUL and consume the terminator.
    pub fn read_cstring(&mut self) -> Result<String> {
        let buf: &'a [u8] = self.buf;
        let rest = &buf[self.pos..];
        let Some(len) = memchr(0, rest) else {
            return Err(CursorError::OutOfData {
                offset: self.pos,
                needed: rest.len() + 1,
                available: rest.len(),
            });
        };
        let bytes = &rest[..len];
        self.pos += len + 1;

        match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_owned()),
            Err(_) => {
                self.lossy_strings += 1;
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }

    /// Read exactly `len` bytes as Latin-1 characters, no terminator.
    pub fn read_chars(&mut self, len: usize) -> Result<String> {
        Ok(self.read_bytes(len)?.iter().map(|&b| char::from(b)).collect())
    }

    pub fn read_fourcc(&mut self) -> Result<FourCC> {
        Ok(FourCC::new(self.read_array()?))
    }
}

/// Append-only writer producing a map file buffer.
#[derive(Debug, Default, Clone)]
pub struct W3Writer {
    buf: Vec<u8>,
}

impl W3Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, n: u8) {
        self.buf.push(n);
    }

    pub fn write_i16(&mut self, n: i16) {
        self.write_bytes(&n.to_le_bytes());
    }

    pub fn write_u16(&mut self, n: u16) {
        self.write_bytes(&n.to_le_bytes());
    }

    pub fn write_i32(&mut self, n: i32) {
        self.write_bytes(&n.to_le_bytes());
    }

    pub fn write_u32(&mut self, n: u32) {
        self.write_bytes(&n.to_le_bytes());
    }

    pub fn write_f32(&mut self, n: f32) {
        self.write_bytes(&n.to_le_bytes());
    }

    /// Write a string followed by its NUL terminator.
    pub fn write_cstring(&mut self, s: &str) -> Result<()> {
        if let Some(index) = memchr(0, s.as_bytes()) {
            return Err(CursorError::InteriorNul { index });
        }
        self.write_bytes(s.as_bytes());
        self.write_u8(0);
        Ok(())
    }

    /// Write exactly `len` Latin-1 characters, no terminator.
    pub fn write_chars(&mut self, s: &str, len: usize) -> Result<()> {
        let bytes = s
            .chars()
            .map(|c| u8::try_from(u32::from(c)).map_err(|_| CursorError::NonLatin1(c)))
            .collect::<Result<Vec<u8>>>()?;
        if bytes.len() != len {
            return Err(CursorError::FixedLength {
                expected: len,
                found: bytes.len(),
            });
        }
        self.write_bytes(&bytes);
        Ok(())
    }

    pub fn write_fourcc(&mut self, code: FourCC) {
        self.write_bytes(code.as_bytes());
    }
}
