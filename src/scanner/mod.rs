//! Line and number scanning.
//!
//! Builds logical lines on top of the block reader and converts ASCII byte
//! ranges into numbers with deliberately tolerant truncating semantics.

pub mod line;
pub mod numeric;

pub use line::{LineScanner, ScannedLine, MAX_LINE_BYTES};
pub use numeric::{scan_float, scan_float_or_sentinel, scan_int, scan_int_or_sentinel};
