//! Bounds-checked reads over a DNS message buffer.
//!
//! Every read goes through nom's complete-input parsers, so running out of
//! bytes surfaces as a [`ParseError::TruncatedMessage`] instead of a panic.

use bytes::Bytes;
use nom::{
    bytes::complete::take,
    number::complete::{be_u16, be_u32, be_u8},
    IResult,
};

use crate::errors::{Malformed, ParseError};

/// A read position over an owned message buffer.
///
/// The position never exceeds the buffer length.
#[derive(Debug, Clone)]
pub struct ByteCursor {
    buffer: Bytes,
    position: usize,
}

impl ByteCursor {
    pub fn new(buffer: Bytes) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Creates a cursor that starts at `position` instead of the beginning.
    pub(crate) fn at(buffer: Bytes, position: usize) -> Self {
        let position = position.min(buffer.len());
        Self { buffer, position }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes left between the position and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    pub(crate) fn buffer(&self) -> &Bytes {
        &self.buffer
    }

    /// Moves to an absolute offset, as a compression pointer does.
    pub fn seek(&mut self, offset: usize) -> Result<(), ParseError> {
        if offset >= self.buffer.len() {
            return Err(ParseError::malformed(
                self.position,
                Malformed::SeekOutOfBounds {
                    target: offset,
                    len: self.buffer.len(),
                },
            ));
        }
        self.position = offset;
        Ok(())
    }

    /// Returns to a position recorded earlier from this cursor.
    ///
    /// Unlike [`seek`](Self::seek) this accepts the end of the buffer, which
    /// is where a name ending in a pointer leaves the cursor when nothing
    /// follows it.
    pub(crate) fn resume_at(&mut self, position: usize) {
        debug_assert!(position <= self.buffer.len());
        self.position = position.min(self.buffer.len());
    }

    pub fn read_u8(&mut self) -> Result<u8, ParseError> {
        self.read_with(1, |input| be_u8(input))
    }

    pub fn read_u16(&mut self) -> Result<u16, ParseError> {
        self.read_with(2, |input| be_u16(input))
    }

    pub fn read_u32(&mut self) -> Result<u32, ParseError> {
        self.read_with(4, |input| be_u32(input))
    }

    /// Returns the next `count` bytes as a slice sharing the message buffer.
    pub fn read_bytes(&mut self, count: usize) -> Result<Bytes, ParseError> {
        let start = self.position;
        self.read_with(count, |input| {
            take(count)(input).map(|(rest, taken)| (rest, taken.len()))
        })?;
        Ok(self.buffer.slice(start..self.position))
    }

    /// Advances past `count` bytes without keeping them.
    pub fn skip(&mut self, count: usize) -> Result<(), ParseError> {
        self.read_bytes(count).map(|_| ())
    }

    fn read_with<T>(
        &mut self,
        needed: usize,
        parser: impl FnOnce(&[u8]) -> IResult<&[u8], T>,
    ) -> Result<T, ParseError> {
        let input = &self.buffer[self.position..];
        let available = input.len();
        match parser(input) {
            Ok((rest, value)) => {
                let consumed = available - rest.len();
                self.position += consumed;
                Ok(value)
            }
            Err(_) => Err(ParseError::TruncatedMessage {
                offset: self.position,
                needed,
                available,
            }),
        }
    }
}
