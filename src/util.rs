use crate::{traits, Result, UdfError};
use std::cell::RefCell;
use std::fs::File;
use std::io::{prelude::*, SeekFrom};

use log::warn;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

/// Offset-tracked reader over an in-memory byte buffer. All multi-byte
/// integers on a UDF volume are little-endian; reading past the end of the
/// buffer fails with [`UdfError::UnexpectedEod`].
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Cursor { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(UdfError::UnexpectedEod);
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// A 48-bit little-endian location field, zero-extended to 64 bits.
    pub fn read_u48(&mut self) -> Result<u64> {
        let b = self.read_bytes(6)?;
        Ok(u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], 0, 0]))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let b = self.read_bytes(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Reads the next u16 without advancing the cursor.
    pub fn peek_u16(&self) -> Result<u16> {
        if self.remaining() < 2 {
            return Err(UdfError::UnexpectedEod);
        }
        Ok(u16::from_le_bytes([self.buf[self.pos], self.buf[self.pos + 1]]))
    }

    /// Fixed-size character field. The final byte records the logical length
    /// (including the leading compression id byte); a zero length means the
    /// whole field is empty. Only compression id 8, one byte per character,
    /// is supported.
    pub fn read_dstring(&mut self, len: usize) -> Result<String> {
        if len < 2 {
            return Ok(String::new());
        }
        let field = self.read_bytes(len)?;
        let mut recorded = field[len - 1] as usize;
        if recorded == 0 {
            return Ok(String::new());
        }
        let compression_id = field[0];
        if compression_id != 8 {
            return Err(UdfError::UnsupportedCompressionId(compression_id));
        }
        if recorded > len - 1 {
            warn!("dstring length {} overflows a {} byte field", recorded, len);
            recorded = len - 1;
        }
        Ok(field[1..recorded].iter().map(|&b| char::from(b)).collect())
    }

    /// Variable-size identifier field, as used by directory entries. The
    /// first byte selects the encoding: 8 for one byte per character, 16 for
    /// big-endian 16-bit units.
    pub fn read_dchars(&mut self, len: usize) -> Result<String> {
        if len == 0 {
            return Ok(String::new());
        }
        let field = self.read_bytes(len)?;
        let chars = &field[1..];
        match field[0] {
            8 => Ok(chars.iter().map(|&b| char::from(b)).collect()),
            16 => Ok(char::decode_utf16(
                chars
                    .chunks_exact(2)
                    .map(|unit| u16::from_be_bytes([unit[0], unit[1]])),
            )
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()),
            other => Err(UdfError::UnsupportedCharacterEncoding(other)),
        }
    }

    /// On-disk timestamp: type/timezone (ignored), year, month, day, hour,
    /// minute, second, then three bytes of sub-second precision (ignored).
    /// Yields a UTC timestamp with zero nanoseconds.
    pub fn read_timestamp(&mut self) -> Result<OffsetDateTime> {
        self.skip(2)?;
        let year = self.read_u16()?;
        let month = self.read_u8()?;
        let day = self.read_u8()?;
        let hour = self.read_u8()?;
        let minute = self.read_u8()?;
        let second = self.read_u8()?;
        self.skip(3)?;

        let month = Month::try_from(month).map_err(|_| UdfError::InvalidTimestamp)?;
        let date = Date::from_calendar_date(i32::from(year), month, day)
            .map_err(|_| UdfError::InvalidTimestamp)?;
        let time =
            Time::from_hms(hour, minute, second).map_err(|_| UdfError::InvalidTimestamp)?;
        Ok(PrimitiveDateTime::new(date, time).assume_utc())
    }
}

/// Read-only file-backed image source.
pub struct ImageFile(RefCell<File>);

impl traits::ReadAt for ImageFile {
    fn read_at(&self, offset: u64, data: &mut [u8]) -> Result<usize> {
        let mut file = self.0.borrow_mut();
        file.seek(SeekFrom::Start(offset))?;
        file.read(data).map_err(From::from)
    }
}

impl ImageFile {
    pub fn open(path: &str) -> Result<Self> {
        let file = File::open(path)?;
        Ok(ImageFile(RefCell::new(file)))
    }

    pub fn size(&self) -> Result<u64> {
        let metadata = self.0.borrow().metadata()?;
        Ok(metadata.len())
    }
}
