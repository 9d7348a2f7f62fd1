//! Bounded line assembly on top of the block reader.
//!
//! One logical line at a time, at most [`MAX_LINE_BYTES`] payload bytes,
//! with the absolute file offset of the line's first raw byte recorded
//! before any trimming.

use crate::error::ScanError;
use crate::reader::BlockReader;

/// Maximum payload bytes in one line after trimming.
pub const MAX_LINE_BYTES: usize = 127;

/// One scan step: either a line borrowed from the scanner's buffer, or the
/// end of the file.
#[derive(Debug, PartialEq, Eq)]
pub enum ScannedLine<'a> {
    /// A logical line. `bytes` excludes the terminator, carriage returns
    /// and leading spaces; `offset` is the file position of the line's
    /// first byte before that trimming. Valid until the next `next_line`.
    Line {
        bytes: &'a [u8],
        offset: u64,
    },
    EndOfFile,
}

/// Assembles lines from a [`BlockReader`].
pub struct LineScanner {
    reader: BlockReader,
    buf: [u8; MAX_LINE_BYTES],
}

impl LineScanner {
    pub fn new(reader: BlockReader) -> Self {
        Self {
            reader,
            buf: [0; MAX_LINE_BYTES],
        }
    }

    /// Pull bytes until a line feed or end of file.
    ///
    /// - `\r` is discarded wherever it appears.
    /// - `\n` terminates the line and is not part of the payload.
    /// - Leading `' '` bytes are discarded only while the payload is empty;
    ///   embedded and trailing spaces are kept.
    /// - A partial line at end of file is returned as a normal line; the
    ///   following call reports `EndOfFile`.
    /// - Exceeding [`MAX_LINE_BYTES`] payload bytes fails with
    ///   [`ScanError::LineTooLong`].
    pub fn next_line(&mut self) -> Result<ScannedLine<'_>, ScanError> {
        let offset = self.reader.offset();
        let mut len = 0usize;
        let mut saw_byte = false;
        loop {
            match self.reader.next_byte()? {
                None => {
                    if !saw_byte {
                        return Ok(ScannedLine::EndOfFile);
                    }
                    break;
                }
                Some(b'\r') => saw_byte = true,
                Some(b'\n') => break,
                Some(b' ') if len == 0 => saw_byte = true,
                Some(b) => {
                    saw_byte = true;
                    if len == MAX_LINE_BYTES {
                        return Err(ScanError::LineTooLong { offset });
                    }
                    self.buf[len] = b;
                    len += 1;
                }
            }
        }
        Ok(ScannedLine::Line {
            bytes: &self.buf[..len],
            offset,
        })
    }

    /// Drain bytes through the next line feed (or end of file) without
    /// buffering them. Lets a skip-and-continue policy abandon an over-long
    /// line and resynchronize on the next one.
    pub fn skip_to_eol(&mut self) -> Result<(), ScanError> {
        loop {
            match self.reader.next_byte()? {
                None | Some(b'\n') => return Ok(()),
                Some(_) => {}
            }
        }
    }
}
