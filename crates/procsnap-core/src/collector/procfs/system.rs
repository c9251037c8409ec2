//! System reader for machine-wide facts from `/proc/` and `/etc/`.

use tracing::debug;

use super::error::CollectError;
use super::parser::{
    CpuTimes, is_running, os_release_value, parse_cpu_times, parse_kernel_release, parse_meminfo,
    parse_uptime,
};
use super::reader::KernelTextReader;
use crate::collector::config::CollectorConfig;
use crate::collector::traits::{FileSystem, PidSource, ProcPids};
use crate::model::MachineFacts;

/// Reads machine-wide metrics.
///
/// Holds no state besides configuration: every call re-reads the kernel
/// files it depends on.
pub struct SystemStatsReader<F: FileSystem, P: PidSource = ProcPids<F>> {
    reader: KernelTextReader<F>,
    pids: P,
    config: CollectorConfig,
}

impl<F: FileSystem + Clone> SystemStatsReader<F> {
    /// Creates a system reader that lists processes from the proc root.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `config` - Paths and clock tick rate
    pub fn new(fs: F, config: CollectorConfig) -> Self {
        let pids = ProcPids::new(fs.clone(), config.proc_root());
        Self::with_pid_source(fs, config, pids)
    }
}

impl<F: FileSystem, P: PidSource> SystemStatsReader<F, P> {
    /// Creates a system reader with an injected process listing.
    pub fn with_pid_source(fs: F, config: CollectorConfig, pids: P) -> Self {
        Self {
            reader: KernelTextReader::new(fs),
            pids,
            config,
        }
    }

    /// `PRETTY_NAME` from the release metadata file, empty if absent.
    pub fn operating_system(&self) -> Result<String, CollectError> {
        let name = self
            .reader
            .lines(&self.config.os_release_path)?
            .find_map(|line| os_release_value(&line, "PRETTY_NAME"))
            .unwrap_or_default();
        Ok(name)
    }

    /// Kernel release from `/proc/version`.
    pub fn kernel(&self) -> Result<String, CollectError> {
        let line = self.reader.first_line(&self.config.proc_file("version"))?;
        Ok(parse_kernel_release(&line)?)
    }

    /// Whole seconds since boot from `/proc/uptime`.
    pub fn uptime(&self) -> Result<u64, CollectError> {
        read_uptime(&self.reader, &self.config)
    }

    /// Fraction of physical memory in use, from `/proc/meminfo`.
    ///
    /// Zero or missing `MemTotal` is reported as `MalformedRecord`.
    pub fn memory_utilization(&self) -> Result<f64, CollectError> {
        let info = parse_meminfo(self.reader.lines(&self.config.proc_file("meminfo"))?)?;
        Ok(info.utilization()?)
    }

    /// Aggregate CPU counters from `/proc/stat`.
    pub fn cpu_times(&self) -> Result<CpuTimes, CollectError> {
        read_cpu_times(&self.reader, &self.config)
    }

    /// Total jiffies since boot across all CPU states.
    pub fn jiffies(&self) -> Result<u64, CollectError> {
        Ok(self.cpu_times()?.total()?)
    }

    /// Jiffies spent outside idle and iowait.
    pub fn active_jiffies(&self) -> Result<u64, CollectError> {
        Ok(self.cpu_times()?.active()?)
    }

    /// Idle jiffies, excluding iowait.
    pub fn idle_jiffies(&self) -> Result<u64, CollectError> {
        Ok(self.cpu_times()?.idle())
    }

    /// `active / total` since boot, in `[0, 1]`.
    ///
    /// The two counters come from separate reads of `/proc/stat`, so they may
    /// be a few ticks apart.
    pub fn cpu_utilization(&self) -> Result<f64, CollectError> {
        let active = self.active_jiffies()?;
        let total = self.jiffies()?;
        if total == 0 {
            return Err(CollectError::malformed("total jiffies is zero"));
        }
        Ok(active as f64 / total as f64)
    }

    /// Current process identifiers, in listing order.
    pub fn pids(&self) -> Result<Vec<u32>, CollectError> {
        self.pids
            .pids()
            .map_err(|e| CollectError::not_available(self.config.proc_root(), e))
    }

    /// Number of listed processes.
    pub fn total_processes(&self) -> Result<usize, CollectError> {
        Ok(self.pids()?.len())
    }

    /// Number of listed processes whose state is `R (running)`.
    ///
    /// Reads every process's status file; processes whose status cannot be
    /// read are not counted.
    pub fn running_processes(&self) -> Result<usize, CollectError> {
        let running = self
            .pids()?
            .into_iter()
            .filter(|&pid| {
                self.reader
                    .lines(&self.config.pid_file(pid, "status"))
                    .is_ok_and(is_running)
            })
            .count();
        Ok(running)
    }

    /// Collects all machine facts, degrading each unreadable metric to its
    /// empty or zero value.
    pub fn machine_facts(&self) -> MachineFacts {
        MachineFacts {
            operating_system: degrade(self.operating_system(), "operating_system"),
            kernel: degrade(self.kernel(), "kernel"),
            uptime: degrade(self.uptime(), "uptime"),
            memory_utilization: degrade(self.memory_utilization(), "memory_utilization"),
            cpu_utilization: degrade(self.cpu_utilization(), "cpu_utilization"),
            total_processes: degrade(self.total_processes(), "total_processes"),
            running_processes: degrade(self.running_processes(), "running_processes"),
        }
    }
}

/// Seconds since boot. Shared with the per-process reader.
pub(super) fn read_uptime<F: FileSystem>(
    reader: &KernelTextReader<F>,
    config: &CollectorConfig,
) -> Result<u64, CollectError> {
    let line = reader.first_line(&config.proc_file("uptime"))?;
    Ok(parse_uptime(&line)?)
}

/// Aggregate `cpu` line of `/proc/stat`. Shared with the per-process reader.
pub(super) fn read_cpu_times<F: FileSystem>(
    reader: &KernelTextReader<F>,
    config: &CollectorConfig,
) -> Result<CpuTimes, CollectError> {
    Ok(parse_cpu_times(reader.lines(&config.proc_file("stat"))?)?)
}

fn degrade<T: Default>(result: Result<T, CollectError>, metric: &str) -> T {
    result.unwrap_or_else(|e| {
        debug!(metric, error = %e, "system metric unavailable");
        T::default()
    })
}
