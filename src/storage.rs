//! Storage collaborator interface.
//!
//! The indexer core never touches paths directly: a [`Storage`]
//! implementation answers whether the backing medium is usable and resolves
//! job names into paths. Production code uses [`DirStorage`]; tests
//! substitute mocks for the unavailable and read-only cases.

use std::path::{Path, PathBuf};

/// Availability of the storage medium holding G-code jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
    /// Mounted and writable.
    Mounted,
    /// Mounted read-only. Reading jobs is still fine.
    ReadOnly,
    /// Not present or not accessible.
    Unavailable,
}

impl MountState {
    /// True when jobs can be read from the medium.
    pub fn is_readable(self) -> bool {
        matches!(self, MountState::Mounted | MountState::ReadOnly)
    }
}

/// Where G-code jobs live and whether they can currently be read.
pub trait Storage {
    /// Probe the medium.
    fn state(&self) -> MountState;

    /// Resolve a job name into a concrete path on the medium.
    fn resolve(&self, name: &str) -> PathBuf;
}

/// Directory-backed storage: a root directory stands in for the removable
/// medium of a printer host.
#[derive(Debug, Clone)]
pub struct DirStorage {
    root: PathBuf,
}

impl DirStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Storage for DirStorage {
    fn state(&self) -> MountState {
        match std::fs::metadata(&self.root) {
            Ok(meta) if meta.is_dir() => {
                if meta.permissions().readonly() {
                    MountState::ReadOnly
                } else {
                    MountState::Mounted
                }
            }
            _ => MountState::Unavailable,
        }
    }

    fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}
