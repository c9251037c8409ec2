//! Paths and platform constants used by the readers.

use std::path::{Path, PathBuf};

/// Clock ticks per second (USER_HZ). Standard value for Linux.
pub const DEFAULT_CLOCK_TICKS: u64 = 100;

/// Where the readers look for kernel and user-database files.
///
/// This is the only state the readers carry; every metric is re-derived
/// from the files on each call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Base path to proc filesystem (usually "/proc").
    pub proc_path: PathBuf,
    /// Release metadata with `PRETTY_NAME=...`.
    pub os_release_path: PathBuf,
    /// Colon-delimited user database.
    pub passwd_path: PathBuf,
    /// Jiffies per second, used to convert process start times.
    pub clock_ticks: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            proc_path: PathBuf::from("/proc"),
            os_release_path: PathBuf::from("/etc/os-release"),
            passwd_path: PathBuf::from("/etc/passwd"),
            clock_ticks: DEFAULT_CLOCK_TICKS,
        }
    }
}

impl CollectorConfig {
    pub fn with_proc_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.proc_path = path.into();
        self
    }

    pub fn with_os_release_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.os_release_path = path.into();
        self
    }

    pub fn with_passwd_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.passwd_path = path.into();
        self
    }

    pub fn with_clock_ticks(mut self, ticks: u64) -> Self {
        self.clock_ticks = ticks;
        self
    }

    /// Path of a system-wide file such as `meminfo` under the proc root.
    pub(crate) fn proc_file(&self, name: &str) -> PathBuf {
        self.proc_path.join(name)
    }

    /// Path of a per-process file such as `stat` under `/proc/[pid]/`.
    pub(crate) fn pid_file(&self, pid: u32, name: &str) -> PathBuf {
        self.proc_path.join(pid.to_string()).join(name)
    }

    pub(crate) fn proc_root(&self) -> &Path {
        &self.proc_path
    }
}
