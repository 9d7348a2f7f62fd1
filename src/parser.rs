//! The indexing orchestrator.
//!
//! Owns the whole pipeline for one file: storage probe, block reader, line
//! scanner, command decoder and layer indexer. One instance, one pass at a
//! time; every buffer is an owned field, so independent parsers never share
//! state.

use log::{debug, error, info, warn};
use serde::Serialize;

use crate::decoder::CommandDecoder;
use crate::error::{HaltReason, IndexError, OpenError, ScanError};
use crate::index::{LayerIndex, LayerIndexer};
use crate::reader::BlockReader;
use crate::scanner::{LineScanner, ScannedLine};
use crate::storage::Storage;

/// What to do when a single line fails to scan or decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ErrorPolicy {
    /// Stop the pass at the first bad line; the report covers only the
    /// prefix processed so far. A single bad line invalidates trust in the
    /// rest of the file.
    #[default]
    Abort,
    /// Log the bad line and continue with the next one. I/O errors still
    /// abort.
    Skip,
}

/// Result of one completed indexing pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexReport {
    /// Ordered layer index, root sentinel included.
    pub layers: LayerIndex,
    /// Lines scanned, whether or not they decoded into commands.
    pub lines: u64,
}

/// Facade driving the scan-until-EOF loop over one G-code file.
pub struct GcodeParser<S: Storage> {
    storage: S,
    policy: ErrorPolicy,
    explain: bool,
    scanner: Option<LineScanner>,
    decoder: CommandDecoder,
}

impl<S: Storage> GcodeParser<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            policy: ErrorPolicy::default(),
            explain: false,
            scanner: None,
            decoder: CommandDecoder::new(),
        }
    }

    /// Select the line-failure policy for subsequent passes.
    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Log a human-readable explanation of every decoded command at debug
    /// level during the pass.
    pub fn with_explanations(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }

    /// Probe storage and open the named job for scanning.
    pub fn open_file(&mut self, name: &str) -> Result<(), OpenError> {
        if !self.storage.state().is_readable() {
            warn!("storage is not mounted");
            return Err(OpenError::StorageUnavailable);
        }
        let path = self.storage.resolve(name);
        info!("attempting to open {}", path.display());
        let reader = BlockReader::open(&path).inspect_err(|e| warn!("{e}"))?;
        self.scanner = Some(LineScanner::new(reader));
        Ok(())
    }

    /// Scan the open file once, line by line, and build the layer index.
    ///
    /// G-lines are decoded; opcode 0/1 moves feed the layer detector with
    /// the offset of the line's first byte. M-lines and lines starting with
    /// anything else are accepted and skipped without decoding. Every
    /// scanned line counts toward the report except the one a halt stops
    /// on.
    pub fn index_file(&mut self) -> Result<IndexReport, IndexError> {
        let policy = self.policy;
        let explain = self.explain;
        let Self {
            scanner, decoder, ..
        } = self;
        let scanner = scanner.as_mut().ok_or(IndexError::NotOpen)?;

        let mut indexer = LayerIndexer::new();
        let mut lines: u64 = 0;
        let mut halt: Option<HaltReason> = None;

        info!("indexing file");
        loop {
            match scanner.next_line() {
                Err(e) => {
                    let recoverable =
                        matches!(e, ScanError::LineTooLong { .. }) && policy == ErrorPolicy::Skip;
                    if !recoverable {
                        halt = Some(e.into());
                        break;
                    }
                    warn!("skipping line: {e}");
                    lines += 1;
                    if let Err(e) = scanner.skip_to_eol() {
                        halt = Some(e.into());
                        break;
                    }
                }
                Ok(ScannedLine::EndOfFile) => break,
                Ok(ScannedLine::Line { bytes, offset }) => {
                    match bytes.first() {
                        Some(b'G' | b'g') => {
                            if let Err(reason) =
                                Self::decode_g_line(decoder, &mut indexer, bytes, offset, explain)
                            {
                                if policy == ErrorPolicy::Abort {
                                    // the failing line does not count
                                    halt = Some(reason);
                                    break;
                                }
                                warn!("skipping line at byte {offset}: {reason}");
                            }
                        }
                        // M-codes are accepted but not interpreted
                        Some(b'M' | b'm') => {}
                        // not a command line
                        _ => {}
                    }
                    lines += 1;
                }
            }
        }

        let report = IndexReport {
            layers: indexer.into_index(),
            lines,
        };
        match halt {
            Some(reason) => {
                error!("aborting scan after {} lines: {reason}", report.lines);
                Err(IndexError::Aborted { report, reason })
            }
            None => {
                info!("parsed {} lines", report.lines);
                for entry in report.layers.entries() {
                    info!("layer {} @ {}", entry.ordinal, entry.offset);
                }
                Ok(report)
            }
        }
    }

    fn decode_g_line(
        decoder: &mut CommandDecoder,
        indexer: &mut LayerIndexer,
        bytes: &[u8],
        offset: u64,
        explain: bool,
    ) -> Result<(), HaltReason> {
        decoder.set_line(bytes)?;
        if matches!(decoder.code(), 0 | 1) {
            indexer.observe_move(decoder, offset)?;
        }
        if explain {
            debug!("{}", decoder.explain()?);
        }
        Ok(())
    }

    /// Release the file handle and buffers. Idempotent.
    pub fn close_file(&mut self) {
        self.scanner = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DirStorage, MountState};
    use std::io::Write;
    use std::path::PathBuf;

    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn state(&self) -> MountState {
            MountState::Unavailable
        }

        fn resolve(&self, name: &str) -> PathBuf {
            PathBuf::from(name)
        }
    }

    fn parser_for(content: &[u8]) -> (GcodeParser<DirStorage>, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut f = std::fs::File::create(dir.path().join("job.gcode")).expect("create job");
        f.write_all(content).expect("write job");
        let mut parser = GcodeParser::new(DirStorage::new(dir.path()));
        parser.open_file("job.gcode").expect("open");
        (parser, dir)
    }

    #[test]
    fn unavailable_storage_fails_open() {
        let mut parser = GcodeParser::new(BrokenStorage);
        assert!(matches!(
            parser.open_file("job.gcode"),
            Err(OpenError::StorageUnavailable)
        ));
    }

    #[test]
    fn missing_file_fails_open() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut parser = GcodeParser::new(DirStorage::new(dir.path()));
        assert!(matches!(
            parser.open_file("absent.gcode"),
            Err(OpenError::NotFound(_))
        ));
    }

    #[test]
    fn index_without_open_is_rejected() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut parser = GcodeParser::new(DirStorage::new(dir.path()));
        assert!(matches!(parser.index_file(), Err(IndexError::NotOpen)));
    }

    #[test]
    fn counts_every_line_and_skips_m_codes() {
        let (mut parser, _dir) = parser_for(b"M104 S200\nG90\n; setup done\nG1 X1 Y1\n");
        let report = parser.index_file().expect("index");
        assert_eq!(report.lines, 4);
        assert!(report.layers.is_empty());
    }

    #[test]
    fn abort_policy_stops_on_bad_opcode() {
        let (mut parser, _dir) = parser_for(b"G1 Z0.2\nG7 X1\nG1 Z0.4\n");
        let err = parser.index_file().unwrap_err();
        let report = err.partial_report().expect("partial report");
        // only the first layer made it in before the halt; the failing
        // line itself is not counted
        assert_eq!(report.lines, 1);
        assert_eq!(report.layers.len(), 2);
    }

    #[test]
    fn skip_policy_recovers_from_bad_opcode() {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::write(dir.path().join("job.gcode"), b"G1 Z0.2\nG7 X1\nG1 Z0.4\n")
            .expect("write job");
        let mut parser =
            GcodeParser::new(DirStorage::new(dir.path())).with_policy(ErrorPolicy::Skip);
        parser.open_file("job.gcode").expect("open");
        let report = parser.index_file().expect("index");
        assert_eq!(report.lines, 3);
        assert_eq!(report.layers.len(), 3);
    }

    #[test]
    fn close_file_is_idempotent() {
        let (mut parser, _dir) = parser_for(b"G28\n");
        parser.close_file();
        parser.close_file();
        assert!(matches!(parser.index_file(), Err(IndexError::NotOpen)));
    }
}
