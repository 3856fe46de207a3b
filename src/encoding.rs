//! Encoding utils for proofs and commitments.
//! All methods err with `UtreexoError::FormatError` for convenience.
use byteorder::{ByteOrder, LittleEndian};

use crate::errors::UtreexoError;

/// A cursor over a byte slice that fails on any out-of-bounds or trailing
/// read.
#[derive(Debug)]
pub struct SliceReader<'a> {
    whole: &'a [u8],
    start: usize,
    end: usize,
}

impl<'a> SliceReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        SliceReader {
            start: 0,
            end: data.len(),
            whole: data,
        }
    }

    /// Number of bytes left to read.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Parses the whole slice with the given closure, failing if any
    /// bytes are left unread.
    pub fn parse<F, T>(data: &'a [u8], parse_fn: F) -> Result<T, UtreexoError>
    where
        F: FnOnce(&mut Self) -> Result<T, UtreexoError>,
    {
        let mut reader = Self::new(data);
        let result = parse_fn(&mut reader)?;
        if reader.len() != 0 {
            return Err(UtreexoError::FormatError);
        }
        Ok(result)
    }

    /// Returns a slice of the first `prefix_size` bytes and advances the
    /// internal offset.
    pub fn read_bytes(&mut self, prefix_size: usize) -> Result<&[u8], UtreexoError> {
        if prefix_size > self.len() {
            return Err(UtreexoError::FormatError);
        }
        let prefix = &self.whole[self.start..(self.start + prefix_size)];
        self.start += prefix_size;
        Ok(prefix)
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self) -> Result<u8, UtreexoError> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    /// Reads a LE32-encoded integer.
    pub fn read_u32(&mut self) -> Result<u32, UtreexoError> {
        let bytes = self.read_bytes(4)?;
        Ok(LittleEndian::read_u32(&bytes))
    }

    /// Reads a LE32-encoded length prefix.
    pub fn read_size(&mut self) -> Result<usize, UtreexoError> {
        let n = self.read_u32()?;
        Ok(n as usize)
    }

    /// Reads a 32-byte array.
    pub fn read_u8x32(&mut self) -> Result<[u8; 32], UtreexoError> {
        let mut buf = [0u8; 32];
        let bytes = self.read_bytes(32)?;
        buf[..].copy_from_slice(&bytes);
        Ok(buf)
    }
}

// Writing API: appends to a Vec.

pub(crate) fn write_u8(x: u8, target: &mut Vec<u8>) {
    target.push(x);
}

pub(crate) fn write_u32(x: u32, target: &mut Vec<u8>) {
    let mut buf = [0u8; 4];
    LittleEndian::write_u32(&mut buf, x);
    target.extend_from_slice(&buf);
}

pub(crate) fn write_size(x: usize, target: &mut Vec<u8>) {
    write_u32(x as u32, target);
}

pub(crate) fn write_bytes(x: &[u8], target: &mut Vec<u8>) {
    target.extend_from_slice(&x);
}
