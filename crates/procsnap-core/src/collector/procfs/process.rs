//! Process reader for per-process metrics from `/proc/[pid]/`.
//!
//! A process can exit at any point between being listed and being read.
//! Failing to open one of its own files is reported as `ProcessGone`.

use tracing::debug;

use super::error::CollectError;
use super::parser::{ProcStat, labeled_value, parse_cmdline, parse_proc_stat, passwd_user};
use super::reader::KernelTextReader;
use super::system::{read_cpu_times, read_uptime};
use crate::collector::config::CollectorConfig;
use crate::collector::traits::FileSystem;
use crate::model::ProcessSnapshot;

/// Reads metrics for one process identifier at a time.
pub struct ProcessStatsReader<F: FileSystem> {
    reader: KernelTextReader<F>,
    config: CollectorConfig,
}

impl<F: FileSystem> ProcessStatsReader<F> {
    /// Creates a new process reader.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `config` - Paths and clock tick rate
    pub fn new(fs: F, config: CollectorConfig) -> Self {
        Self {
            reader: KernelTextReader::new(fs),
            config,
        }
    }

    /// Command line with NUL separators rendered as spaces.
    pub fn command(&self, pid: u32) -> Result<String, CollectError> {
        let raw = self
            .reader
            .bytes(&self.config.pid_file(pid, "cmdline"))
            .map_err(|e| e.gone_if_unavailable(pid))?;
        Ok(parse_cmdline(&raw))
    }

    /// Resident memory in kB from the `VmRSS:` line; kernel threads have none.
    pub fn ram(&self, pid: u32) -> Result<Option<u64>, CollectError> {
        self.status_value(pid, "VmRSS:")
    }

    /// Real UID from the `Uid:` line of the status file.
    pub fn uid(&self, pid: u32) -> Result<u32, CollectError> {
        self.status_value(pid, "Uid:")?
            .ok_or_else(|| CollectError::malformed(format!("no Uid line for process {}", pid)))
    }

    /// Owner name looked up in the passwd file by UID.
    ///
    /// `Ok(None)` when no row carries the UID.
    pub fn user(&self, pid: u32) -> Result<Option<String>, CollectError> {
        let uid = self.uid(pid)?;
        let lines = self.reader.lines(&self.config.passwd_path)?;
        Ok(passwd_user(lines, uid))
    }

    /// utime + stime (fields 14 and 15 of the stat line).
    pub fn active_jiffies(&self, pid: u32) -> Result<u64, CollectError> {
        Ok(self.stat(pid)?.active_jiffies()?)
    }

    /// Seconds since the process started: system uptime minus field 22
    /// converted from jiffies.
    pub fn uptime(&self, pid: u32) -> Result<u64, CollectError> {
        let starttime = self.stat(pid)?.starttime.ok_or_else(|| {
            CollectError::malformed(format!("no starttime in stat of process {}", pid))
        })?;
        let started_at = starttime
            .checked_div(self.config.clock_ticks)
            .ok_or_else(|| CollectError::malformed("clock ticks per second is zero"))?;
        Ok(read_uptime(&self.reader, &self.config)?.saturating_sub(started_at))
    }

    /// Percentage of all CPU ticks since boot spent by this process.
    pub fn cpu_utilization(&self, pid: u32) -> Result<f64, CollectError> {
        let active = self.active_jiffies(pid)?;
        let total = read_cpu_times(&self.reader, &self.config)?.total()?;
        if total == 0 {
            return Err(CollectError::malformed("total jiffies is zero"));
        }
        Ok(100.0 * active as f64 / total as f64)
    }

    /// Builds the snapshot of one process.
    ///
    /// Only `ProcessGone` is returned as an error. Any other failure blanks
    /// out the one field it affects.
    pub fn snapshot(&self, pid: u32) -> Result<ProcessSnapshot, CollectError> {
        let cpu_utilization = best_effort(pid, "cpu", self.cpu_utilization(pid))?;
        let uptime = best_effort(pid, "uptime", self.uptime(pid))?;
        let command = best_effort(pid, "command", self.command(pid))?;
        let ram_kb = best_effort(pid, "ram", self.ram(pid))?.flatten();
        let user = best_effort(pid, "user", self.user(pid))?.flatten();

        Ok(ProcessSnapshot {
            pid,
            command: command.unwrap_or_default(),
            ram_kb,
            user: user.unwrap_or_default(),
            cpu_utilization: cpu_utilization.unwrap_or_default(),
            uptime,
        })
    }

    fn stat(&self, pid: u32) -> Result<ProcStat, CollectError> {
        let line = self
            .reader
            .first_line(&self.config.pid_file(pid, "stat"))
            .map_err(|e| e.gone_if_unavailable(pid))?;
        Ok(parse_proc_stat(&line)?)
    }

    fn status_value<T: std::str::FromStr>(
        &self,
        pid: u32,
        label: &str,
    ) -> Result<Option<T>, CollectError> {
        let lines = self
            .reader
            .lines(&self.config.pid_file(pid, "status"))
            .map_err(|e| e.gone_if_unavailable(pid))?;
        Ok(labeled_value(lines, label)?)
    }
}

/// Passes `ProcessGone` through and turns every other error into `None`.
fn best_effort<T>(
    pid: u32,
    metric: &str,
    result: Result<T, CollectError>,
) -> Result<Option<T>, CollectError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(gone @ CollectError::ProcessGone(_)) => Err(gone),
        Err(e) => {
            debug!(pid, metric, error = %e, "process metric unavailable");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    fn reader(fs: MockFs) -> ProcessStatsReader<MockFs> {
        ProcessStatsReader::new(fs, CollectorConfig::default())
    }

    #[test]
    fn test_command() {
        let processes = reader(MockFs::typical_system());
        assert_eq!(processes.command(1).unwrap(), "/sbin/init splash");
        assert_eq!(processes.command(1001).unwrap(), "python3 -m http.server");
    }

    #[test]
    fn test_command_kernel_thread_is_empty() {
        let processes = reader(MockFs::with_kernel_threads());
        assert_eq!(processes.command(2).unwrap(), "");
    }

    #[test]
    fn test_ram() {
        let processes = reader(MockFs::with_kernel_threads());
        assert_eq!(processes.ram(1000).unwrap(), Some(8000));
        assert_eq!(processes.ram(2).unwrap(), None);
    }

    #[test]
    fn test_uid_and_user() {
        let processes = reader(MockFs::typical_system());
        assert_eq!(processes.uid(1000).unwrap(), 1000);
        assert_eq!(processes.user(1000).unwrap(), Some("alice".to_string()));
        assert_eq!(processes.user(1).unwrap(), Some("root".to_string()));
    }

    #[test]
    fn test_user_unmatched_uid() {
        let processes = reader(MockFs::typical_system());
        assert_eq!(processes.uid(1001).unwrap(), 2000);
        assert_eq!(processes.user(1001).unwrap(), None);
    }

    #[test]
    fn test_user_without_passwd_file() {
        let mut fs = MockFs::typical_system();
        fs.remove_file("/etc/passwd");
        let result = reader(fs).user(1000);
        assert!(matches!(result, Err(CollectError::NotAvailable { .. })));
    }

    #[test]
    fn test_uid_missing_line() {
        let mut fs = MockFs::typical_system();
        fs.add_file("/proc/1000/status", "Name:\tbash\nState:\tS (sleeping)\n");
        let result = reader(fs).uid(1000);
        assert!(matches!(result, Err(CollectError::MalformedRecord(_))));
    }

    #[test]
    fn test_active_jiffies() {
        let processes = reader(MockFs::typical_system());
        assert_eq!(processes.active_jiffies(1000).unwrap(), 150);
        assert_eq!(processes.active_jiffies(1001).unwrap(), 6000);
    }

    #[test]
    fn test_active_jiffies_with_special_names() {
        let processes = reader(MockFs::with_special_names());
        assert_eq!(processes.active_jiffies(5000).unwrap(), 1000);
        assert_eq!(processes.active_jiffies(5001).unwrap(), 15);
    }

    #[test]
    fn test_active_jiffies_short_stat_line() {
        let mut fs = MockFs::typical_system();
        fs.add_file("/proc/1000/stat", "1000 (bash) S 1 1000 1000 0 -1 0 0 0 0 0 100\n");
        let result = reader(fs).active_jiffies(1000);
        assert!(matches!(result, Err(CollectError::MalformedRecord(_))));
    }

    #[test]
    fn test_uptime() {
        let processes = reader(MockFs::typical_system());
        // system uptime 12345s, starttime 100000 jiffies at 100 Hz
        assert_eq!(processes.uptime(1000).unwrap(), 12345 - 1000);
        assert_eq!(processes.uptime(1).unwrap(), 12345);
    }

    #[test]
    fn test_uptime_uses_clock_ticks() {
        let config = CollectorConfig::default().with_clock_ticks(1000);
        let processes = ProcessStatsReader::new(MockFs::typical_system(), config);
        assert_eq!(processes.uptime(1000).unwrap(), 12345 - 100);
    }

    #[test]
    fn test_uptime_zero_clock_ticks() {
        let config = CollectorConfig::default().with_clock_ticks(0);
        let processes = ProcessStatsReader::new(MockFs::typical_system(), config);
        assert!(matches!(
            processes.uptime(1000),
            Err(CollectError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_cpu_utilization() {
        let processes = reader(MockFs::typical_system());
        let cpu = processes.cpu_utilization(1001).unwrap();
        assert!((cpu - 100.0 * 6000.0 / 94800.0).abs() < 1e-9);
    }

    #[test]
    fn test_process_gone() {
        let processes = reader(MockFs::with_vanishing_process());
        assert!(matches!(processes.command(4000), Err(CollectError::ProcessGone(4000))));
        assert!(matches!(processes.ram(4000), Err(CollectError::ProcessGone(4000))));
        assert!(matches!(
            processes.active_jiffies(4000),
            Err(CollectError::ProcessGone(4000))
        ));
        assert!(matches!(processes.uptime(4000), Err(CollectError::ProcessGone(4000))));
        assert!(matches!(processes.user(4000), Err(CollectError::ProcessGone(4000))));
        assert!(matches!(processes.snapshot(4000), Err(CollectError::ProcessGone(4000))));
    }

    #[test]
    fn test_snapshot_gone_mid_read() {
        // stat is still there, status and cmdline are not
        let processes = reader(MockFs::with_vanishing_process());
        assert!(processes.active_jiffies(4001).is_ok());
        assert!(matches!(processes.snapshot(4001), Err(CollectError::ProcessGone(4001))));
    }

    #[test]
    fn test_snapshot() {
        let processes = reader(MockFs::typical_system());
        let snapshot = processes.snapshot(1000).unwrap();

        assert_eq!(snapshot.pid, 1000);
        assert_eq!(snapshot.command, "-bash");
        assert_eq!(snapshot.ram_kb, Some(8000));
        assert_eq!(snapshot.user, "alice");
        assert_eq!(snapshot.uptime, Some(11345));
        assert!((snapshot.cpu_utilization - 100.0 * 150.0 / 94800.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_utf8_names_and_passwd_rows() {
        let mut fs = MockFs::typical_system();
        fs.add_file(
            "/proc/1000/stat",
            &b"1000 (b\xffsh) S 1 1000 1000 0 -1 4194304 0 0 0 0 100 50 0 0 20 0 1 0 100000 0 0\n"[..],
        );
        fs.add_file(
            "/proc/1000/status",
            &b"Name:\tb\xffsh\nState:\tS (sleeping)\nUid:\t1000\t1000\t1000\t1000\nVmRSS:\t    8000 kB\n"[..],
        );
        fs.add_file(
            "/etc/passwd",
            &b"root:x:0:0:root:/root:/bin/bash\n\
bob:x:1001:1001:Jos\xe9:/home/bob:/bin/sh\n\
alice:x:1000:1000:Alice:/home/alice:/bin/bash\n"[..],
        );
        let processes = reader(fs);

        assert_eq!(processes.active_jiffies(1000).unwrap(), 150);
        assert_eq!(processes.uptime(1000).unwrap(), 11345);
        assert_eq!(processes.ram(1000).unwrap(), Some(8000));
        assert_eq!(processes.user(1000).unwrap(), Some("alice".to_string()));

        let snapshot = processes.snapshot(1000).unwrap();
        assert_eq!(snapshot.user, "alice");
        assert!((snapshot.cpu_utilization - 100.0 * 150.0 / 94800.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_degrades_malformed_fields() {
        let mut fs = MockFs::typical_system();
        fs.add_file("/proc/1000/stat", "garbage\n");
        fs.remove_file("/etc/passwd");
        let snapshot = reader(fs).snapshot(1000).unwrap();

        assert_eq!(snapshot.cpu_utilization, 0.0);
        assert_eq!(snapshot.uptime, None);
        assert_eq!(snapshot.user, "");
        assert_eq!(snapshot.command, "-bash");
        assert_eq!(snapshot.ram_kb, Some(8000));
    }
}
