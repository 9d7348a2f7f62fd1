//! Fixed-size block streaming reader.
//!
//! Owns the open file handle and a single 512 KiB buffer so that indexing a
//! file of any size never holds more than one block in memory. The running
//! offset base advances by exactly one block per refill; refills always fill
//! the buffer to capacity (looping over short reads), so the base is the
//! true file offset of the current block and `offset()` is exact.

use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;

use crate::error::OpenError;

/// Size of one read block.
pub const BLOCK_SIZE: usize = 512 * 1024;

/// Streaming byte reader over one open G-code file.
#[derive(Debug)]
pub struct BlockReader {
    file: File,
    buf: Vec<u8>,
    /// Bytes valid in `buf`.
    len: usize,
    /// Next unread position within `buf`.
    pos: usize,
    /// File offset of `buf[0]`.
    base: u64,
    block_size: usize,
    primed: bool,
    eof: bool,
}

impl BlockReader {
    /// Open a file for streaming. Storage-level preconditions (mount state)
    /// are the caller's responsibility; this maps OS-level open failures.
    pub fn open(path: &Path) -> Result<Self, OpenError> {
        Self::with_block_size(path, BLOCK_SIZE)
    }

    /// Open with a non-standard block size. Small blocks make boundary
    /// behavior cheap to exercise in tests.
    pub(crate) fn with_block_size(path: &Path, block_size: usize) -> Result<Self, OpenError> {
        debug_assert!(block_size > 0);
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => OpenError::NotFound(path.to_path_buf()),
            _ => OpenError::Unreadable {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        Ok(Self {
            file,
            buf: vec![0; block_size],
            len: 0,
            pos: 0,
            base: 0,
            block_size,
            primed: false,
            eof: false,
        })
    }

    /// Absolute file offset of the next byte `next_byte` would return.
    pub fn offset(&self) -> u64 {
        self.base + self.pos as u64
    }

    /// Return the next byte of the file, refilling the block buffer on
    /// demand. `Ok(None)` signals end of file; it is sticky.
    pub fn next_byte(&mut self) -> io::Result<Option<u8>> {
        if self.pos >= self.len {
            if self.eof {
                return Ok(None);
            }
            self.refill()?;
            if self.len == 0 {
                self.eof = true;
                return Ok(None);
            }
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(Some(b))
    }

    /// Load the next block. The offset base advances by the fixed block
    /// size, never by the byte count of the read; filling to capacity keeps
    /// the two in agreement for every block before the final one.
    fn refill(&mut self) -> io::Result<()> {
        if self.primed {
            self.base += self.block_size as u64;
        } else {
            self.primed = true;
        }
        self.pos = 0;
        self.len = 0;
        while self.len < self.block_size {
            let n = self.file.read(&mut self.buf[self.len..])?;
            if n == 0 {
                break;
            }
            self.len += n;
        }
        // a short block is the last one with data; the refill after it
        // yields no bytes and flips the eof flag
        Ok(())
    }
}
