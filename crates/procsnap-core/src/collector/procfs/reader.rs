//! Opens kernel pseudo-files and hands their content out line by line.
//!
//! No interpretation happens here; see `parser` for that.

use std::io::BufRead;
use std::path::Path;

use super::error::CollectError;
use crate::collector::traits::FileSystem;

/// Line-oriented reader over a `FileSystem`.
///
/// Each call re-opens the file, so a sequence of lines is never shared
/// between two reads.
#[derive(Debug, Clone)]
pub struct KernelTextReader<F: FileSystem> {
    fs: F,
}

impl<F: FileSystem> KernelTextReader<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    /// Opens `path` and returns a lazy, single-pass iterator over its lines.
    ///
    /// Fails with `NotAvailable` if the file cannot be opened. A read error
    /// after opening ends the sequence early. Lines are split on raw `\n`
    /// bytes and decoded lossily, since process names and passwd comments
    /// are not guaranteed to be UTF-8.
    pub fn lines<'a>(
        &'a self,
        path: &Path,
    ) -> Result<impl Iterator<Item = String> + use<'a, F>, CollectError> {
        let reader = self
            .fs
            .open(path)
            .map_err(|e| CollectError::not_available(path, e))?;
        Ok(reader
            .split(b'\n')
            .map_while(Result::ok)
            .map(|line| String::from_utf8_lossy(&line).into_owned()))
    }

    /// Returns the first line of `path`; an empty file is malformed.
    pub fn first_line(&self, path: &Path) -> Result<String, CollectError> {
        self.lines(path)?
            .next()
            .ok_or_else(|| CollectError::malformed(format!("{} is empty", path.display())))
    }

    /// Returns the raw bytes of `path`.
    pub fn bytes(&self, path: &Path) -> Result<Vec<u8>, CollectError> {
        self.fs
            .read(path)
            .map_err(|e| CollectError::not_available(path, e))
    }
}
