//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait allows the collector to work with both real `/proc`
//! filesystem on Linux and mock implementations for testing on macOS or in CI.
//! `PidSource` is the injected "list current process identifiers" capability.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};

/// Abstraction for filesystem operations.
///
/// This trait allows collectors to read from the real filesystem or from
/// a mock implementation for testing purposes.
pub trait FileSystem: Send + Sync {
    /// Reads the raw bytes of a file.
    ///
    /// Kernel files are not guaranteed to be UTF-8: `/proc/[pid]/cmdline`
    /// embeds NUL bytes and process names may hold arbitrary bytes.
    ///
    /// # Arguments
    /// * `path` - Path to the file to read
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Opens a file for buffered, single-pass reading.
    ///
    /// Fails immediately if the file cannot be opened. Content is pulled on
    /// demand, so callers that stop early never read the rest.
    fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead + '_>> {
        let content = self.read(path)?;
        Ok(Box::new(Cursor::new(content)))
    }

    /// Lists entries in a directory.
    ///
    /// # Arguments
    /// * `path` - Path to the directory
    ///
    /// # Returns
    /// A vector of paths to entries in the directory, or an I/O error.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Real filesystem implementation that delegates to `std::fs`.
///
/// Use this in production to read from the actual `/proc` filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead + '_>> {
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }
}

/// Source of the process identifiers alive right now.
pub trait PidSource: Send + Sync {
    /// Lists current process identifiers, in listing order.
    fn pids(&self) -> io::Result<Vec<u32>>;
}

/// Fixed identifier list, mostly useful in tests.
impl PidSource for Vec<u32> {
    fn pids(&self) -> io::Result<Vec<u32>> {
        Ok(self.clone())
    }
}

/// Lists processes as the purely numeric entries of the proc root.
#[derive(Debug, Clone)]
pub struct ProcPids<F: FileSystem> {
    fs: F,
    proc_path: PathBuf,
}

impl<F: FileSystem> ProcPids<F> {
    pub fn new(fs: F, proc_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }
}

impl<F: FileSystem> PidSource for ProcPids<F> {
    /// Returns identifiers in ascending order, matching how the kernel
    /// lists `/proc`.
    fn pids(&self) -> io::Result<Vec<u32>> {
        let mut pids: Vec<u32> = self
            .fs
            .read_dir(&self.proc_path)?
            .iter()
            .filter_map(|entry| entry.file_name().and_then(|n| n.to_str()))
            .filter(|name| !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()))
            .filter_map(|name| name.parse().ok())
            .collect();
        pids.sort_unstable();
        Ok(pids)
    }
}
