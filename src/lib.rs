//! G-code layer indexer
//!
//! Builds, in a single streaming pass, an in-memory index mapping each
//! vertical-layer transition in a G-code file to the byte offset where that
//! layer begins, so a print controller can seek straight to any layer
//! without re-scanning the file.
//!
//! This library provides:
//! - Fixed-block streaming reads bounded to one 512 KiB buffer
//! - Bounded line scanning with exact line-start offsets
//! - Opcode-validated command decoding with lazy argument parsing
//! - Layer boundary detection over Z changes on move commands
//! - Configuration management for the CLI host

pub mod config;
pub mod decoder;
pub mod error;
pub mod index;
pub mod parser;
pub mod reader;
pub mod scanner;
pub mod storage;

// Re-exports for clean public API
pub use config::Config;
pub use decoder::{ArgLetter, CommandDecoder, SUPPORTED_OPCODES};
pub use error::{ArgError, DecodeError, HaltReason, IndexError, OpenError, ScanError};
pub use index::{LayerEntry, LayerIndex, LayerIndexer};
pub use parser::{ErrorPolicy, GcodeParser, IndexReport};
pub use reader::{BlockReader, BLOCK_SIZE};
pub use scanner::{LineScanner, ScannedLine, MAX_LINE_BYTES};
pub use storage::{DirStorage, MountState, Storage};
