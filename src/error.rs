//! Error taxonomy for the layer indexer.
//!
//! Three tiers, matching how failures propagate:
//! - fatal at open time ([`OpenError`]): nothing was scanned.
//! - line-level ([`ScanError`], [`DecodeError`], [`ArgError`]): under the
//!   default abort policy any of these halts the pass.
//! - pass-level ([`IndexError`]): what `index_file` hands back, carrying the
//!   partial result accumulated before the halt.

use std::io;
use std::path::PathBuf;

use crate::decoder::ArgLetter;
use crate::parser::IndexReport;
use crate::scanner::MAX_LINE_BYTES;

/// Failure to open a G-code file for indexing. No retry is attempted.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// The storage backing the file is not mounted or not accessible.
    #[error("storage is not available")]
    StorageUnavailable,

    /// The file does not exist under the storage root.
    #[error("file {0} does not exist")]
    NotFound(PathBuf),

    /// The file exists but could not be opened for reading.
    #[error("file {path} is unreadable")]
    Unreadable {
        /// The path that was attempted.
        path: PathBuf,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },
}

/// Failure while assembling one line from the byte stream.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// More than [`MAX_LINE_BYTES`] payload bytes accumulated without a
    /// line feed.
    #[error("line starting at byte {offset} exceeds {MAX_LINE_BYTES} bytes")]
    LineTooLong {
        /// File offset of the first byte of the offending line.
        offset: u64,
    },

    /// The underlying block read failed.
    #[error("read failed")]
    Io(#[from] io::Error),
}

/// Failure while decoding the opcode of a G-line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The line handed to the decoder does not fit its command buffer.
    #[error("command exceeds the {MAX_LINE_BYTES}-byte buffer ({len} bytes)")]
    LineTooLong {
        /// Length of the rejected line.
        len: usize,
    },

    /// No decimal digit follows the command letter.
    #[error("malformed G-code: no opcode digits after the command letter")]
    MalformedCommand,

    /// The opcode is not in the supported set.
    #[error("unsupported G-code opcode G{0}")]
    InvalidOpcode(i32),
}

/// Failure to fetch an argument from a decoded command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ArgError {
    /// The opcode's capability set does not include this letter, regardless
    /// of whether the line contained it.
    #[error("argument {letter} is not legal for opcode G{code}")]
    Invalid {
        /// The decoded opcode.
        code: i32,
        /// The requested argument letter.
        letter: ArgLetter,
    },

    /// The letter is legal for the opcode but was not present on the line.
    #[error("argument {letter} not present on this line")]
    NotFound {
        /// The requested argument letter.
        letter: ArgLetter,
    },
}

/// Why a scan halted before end of file.
#[derive(Debug, thiserror::Error)]
pub enum HaltReason {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Argument(#[from] ArgError),
}

/// Failure of a whole indexing pass.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// `index_file` was called with no file open.
    #[error("no file is open")]
    NotOpen,

    /// The scan halted on a line-level failure. The report reflects only
    /// the prefix of the file processed before the halt.
    #[error("scan aborted after {} lines: {reason}", report.lines)]
    Aborted {
        /// Lines counted and layers found up to the halt.
        report: IndexReport,
        /// The line-level failure that stopped the pass.
        #[source]
        reason: HaltReason,
    },
}

impl IndexError {
    /// The partial report accumulated before an aborted scan, if any.
    pub fn partial_report(&self) -> Option<&IndexReport> {
        match self {
            IndexError::Aborted { report, .. } => Some(report),
            IndexError::NotOpen => None,
        }
    }
}
