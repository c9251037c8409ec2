//! Snapshot types handed to the presentation layer.
//!
//! All of these are rebuilt from scratch on every refresh and never mutated
//! afterwards.

use std::cmp::Ordering;

use serde::Serialize;

/// Machine-wide facts.
#[derive(Clone, Serialize, Debug, PartialEq, Default)]
pub struct MachineFacts {
    /// `PRETTY_NAME` from `/etc/os-release`.
    pub operating_system: String,
    /// Kernel release, third token of `/proc/version`.
    pub kernel: String,
    /// Seconds since boot.
    pub uptime: u64,
    /// `(MemTotal - MemFree) / MemTotal`, in `[0, 1]`.
    pub memory_utilization: f64,
    /// Active / total jiffies since boot, in `[0, 1]`.
    pub cpu_utilization: f64,
    /// Number of listed processes.
    pub total_processes: usize,
    /// Processes in state `R (running)`.
    pub running_processes: usize,
}

/// Per-process facts from one refresh.
#[derive(Clone, Serialize, Debug, PartialEq, Default)]
pub struct ProcessSnapshot {
    pub pid: u32,
    /// Command line with arguments joined by spaces; empty for kernel threads.
    pub command: String,
    /// Resident set size in kB (`VmRSS`), `None` when the status file has none.
    pub ram_kb: Option<u64>,
    /// Owner name from `/etc/passwd`, empty if the UID is unknown.
    pub user: String,
    /// `100 * (utime + stime) / total system jiffies`.
    ///
    /// The denominator is all ticks on all CPUs since boot, not the
    /// process's own lifetime.
    pub cpu_utilization: f64,
    /// Seconds since the process started, `None` if unavailable.
    pub uptime: Option<u64>,
}

impl ProcessSnapshot {
    /// Resident memory in kB as text, empty when unavailable.
    pub fn ram(&self) -> String {
        self.ram_kb.map(|kb| kb.to_string()).unwrap_or_default()
    }
}

/// Everything one refresh produced.
#[derive(Clone, Serialize, Debug, PartialEq, Default)]
pub struct SystemSnapshot {
    /// Unix timestamp (seconds) when the refresh finished.
    pub timestamp: i64,
    pub machine: MachineFacts,
    /// Processes ranked by CPU utilization, busiest first.
    pub processes: Vec<ProcessSnapshot>,
}

/// Orders busier processes first.
pub fn by_cpu_descending(a: &ProcessSnapshot, b: &ProcessSnapshot) -> Ordering {
    b.cpu_utilization.total_cmp(&a.cpu_utilization)
}

/// Orders idler processes first.
pub fn by_cpu_ascending(a: &ProcessSnapshot, b: &ProcessSnapshot) -> Ordering {
    a.cpu_utilization.total_cmp(&b.cpu_utilization)
}

/// Sorts in place with a stable sort, so equal entries keep listing order.
pub fn rank_processes<C>(processes: &mut [ProcessSnapshot], compare: C)
where
    C: FnMut(&ProcessSnapshot, &ProcessSnapshot) -> Ordering,
{
    processes.sort_by(compare);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process(pid: u32, cpu: f64) -> ProcessSnapshot {
        ProcessSnapshot {
            pid,
            cpu_utilization: cpu,
            ..Default::default()
        }
    }

    fn cpus(processes: &[ProcessSnapshot]) -> Vec<f64> {
        processes.iter().map(|p| p.cpu_utilization).collect()
    }

    #[test]
    fn test_rank_descending() {
        let mut processes = vec![process(1, 1.0), process(2, 5.0), process(3, 3.0)];
        rank_processes(&mut processes, by_cpu_descending);
        assert_eq!(cpus(&processes), vec![5.0, 3.0, 1.0]);
    }

    #[test]
    fn test_rank_ascending() {
        let mut processes = vec![process(1, 1.0), process(2, 5.0), process(3, 3.0)];
        rank_processes(&mut processes, by_cpu_ascending);
        assert_eq!(cpus(&processes), vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_rank_ties_keep_listing_order() {
        let mut processes = vec![
            process(10, 2.0),
            process(20, 7.0),
            process(30, 2.0),
            process(40, 7.0),
            process(50, 2.0),
        ];
        rank_processes(&mut processes, by_cpu_descending);
        let pids: Vec<u32> = processes.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![20, 40, 10, 30, 50]);

        rank_processes(&mut processes, by_cpu_ascending);
        let pids: Vec<u32> = processes.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![10, 30, 50, 20, 40]);
    }

    #[test]
    fn test_ram_text() {
        let mut p = process(1, 0.0);
        assert_eq!(p.ram(), "");
        p.ram_kb = Some(8000);
        assert_eq!(p.ram(), "8000");
    }
}
