//! Main collector that combines process and system readers.
//!
//! The `Collector` struct provides a unified interface for refreshing
//! all metrics into a `SystemSnapshot` for the presentation layer.

use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::collector::config::CollectorConfig;
use crate::collector::procfs::{CollectError, ProcessStatsReader, SystemStatsReader};
use crate::collector::traits::{FileSystem, PidSource, ProcPids};
use crate::model::{SystemSnapshot, by_cpu_descending, rank_processes};

/// Composition root called once per refresh tick.
///
/// `refresh` takes `&self` and keeps all intermediate buffers local, so
/// concurrent refreshes do not share mutable state.
pub struct Collector<F: FileSystem + Clone, P: PidSource = ProcPids<F>> {
    system: SystemStatsReader<F, P>,
    processes: ProcessStatsReader<F>,
}

impl<F: FileSystem + Clone> Collector<F> {
    /// Creates a new collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `config` - Paths and clock tick rate
    pub fn new(fs: F, config: CollectorConfig) -> Self {
        Self {
            processes: ProcessStatsReader::new(fs.clone(), config.clone()),
            system: SystemStatsReader::new(fs, config),
        }
    }
}

impl<F: FileSystem + Clone, P: PidSource> Collector<F, P> {
    /// Creates a collector with an injected process listing.
    pub fn with_pid_source(fs: F, config: CollectorConfig, pids: P) -> Self {
        Self {
            processes: ProcessStatsReader::new(fs.clone(), config.clone()),
            system: SystemStatsReader::with_pid_source(fs, config, pids),
        }
    }

    /// Re-derives every metric from current kernel state.
    ///
    /// Processes that exit while being read are left out. Listing failures
    /// yield an empty process list rather than an error.
    pub fn refresh(&self) -> SystemSnapshot {
        let start = Instant::now();

        let pids = self.system.pids().unwrap_or_else(|e| {
            warn!(error = %e, "failed to list processes");
            Vec::new()
        });

        let mut processes = Vec::with_capacity(pids.len());
        let mut gone = 0usize;
        for pid in pids {
            match self.processes.snapshot(pid) {
                Ok(snapshot) => processes.push(snapshot),
                Err(CollectError::ProcessGone(_)) => {
                    trace!(pid, "process exited during refresh");
                    gone += 1;
                }
                Err(e) => {
                    warn!(pid, error = %e, "failed to read process");
                }
            }
        }

        rank_processes(&mut processes, by_cpu_descending);

        let machine = self.system.machine_facts();

        debug!(
            processes = processes.len(),
            gone,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "refresh complete"
        );

        SystemSnapshot {
            timestamp: chrono::Utc::now().timestamp(),
            machine,
            processes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    fn pids(snapshot: &SystemSnapshot) -> Vec<u32> {
        snapshot.processes.iter().map(|p| p.pid).collect()
    }

    #[test]
    fn test_refresh_typical_system() {
        let collector = Collector::new(MockFs::typical_system(), CollectorConfig::default());
        let snapshot = collector.refresh();

        // python3 (6000 jiffies), systemd (300), bash (150)
        assert_eq!(pids(&snapshot), vec![1001, 1, 1000]);
        assert_eq!(snapshot.machine.total_processes, 3);
        assert_eq!(snapshot.machine.running_processes, 1);
        assert_eq!(snapshot.machine.kernel, "5.15.0-91-generic");
        assert!(snapshot.timestamp > 0);

        let python = &snapshot.processes[0];
        assert_eq!(python.command, "python3 -m http.server");
        assert_eq!(python.user, "");
        assert_eq!(python.ram(), "100000");
    }

    #[test]
    fn test_refresh_drops_vanished_processes() {
        let collector =
            Collector::new(MockFs::with_vanishing_process(), CollectorConfig::default());
        let snapshot = collector.refresh();

        assert_eq!(pids(&snapshot), vec![1001, 1, 1000]);
        // Machine-level count still reflects the listing
        assert_eq!(snapshot.machine.total_processes, 5);
    }

    #[test]
    fn test_refresh_ties_keep_listing_order() {
        let fs = MockFs::with_cpu_ties();
        let collector = Collector::with_pid_source(
            fs.clone(),
            CollectorConfig::default(),
            vec![10, 20, 30, 40, 50],
        );
        assert_eq!(pids(&collector.refresh()), vec![20, 30, 40, 10, 50]);

        let collector =
            Collector::with_pid_source(fs, CollectorConfig::default(), vec![50, 40, 30, 20, 10]);
        assert_eq!(pids(&collector.refresh()), vec![20, 40, 30, 50, 10]);
    }

    #[test]
    fn test_refresh_cpu_percentages() {
        let collector = Collector::with_pid_source(
            MockFs::with_cpu_ties(),
            CollectorConfig::default(),
            vec![10, 20, 30],
        );
        let snapshot = collector.refresh();
        let cpus: Vec<f64> = snapshot.processes.iter().map(|p| p.cpu_utilization).collect();
        assert_eq!(cpus, vec![5.0, 3.0, 1.0]);
    }

    #[test]
    fn test_refresh_special_names() {
        let collector = Collector::new(MockFs::with_special_names(), CollectorConfig::default());
        let snapshot = collector.refresh();

        let web = snapshot.processes.iter().find(|p| p.pid == 5000).unwrap();
        assert_eq!(web.command, "/usr/lib/firefox/firefox -contentproc");
        assert_eq!(web.user, "alice");
        assert_eq!(web.uptime, Some(12345 - 5000));
    }

    #[test]
    fn test_refresh_without_proc() {
        let collector = Collector::new(MockFs::new(), CollectorConfig::default());
        let snapshot = collector.refresh();
        assert!(snapshot.processes.is_empty());
        assert_eq!(snapshot.machine.total_processes, 0);
    }

    #[test]
    fn test_refresh_is_independent_of_previous_calls() {
        let collector = Collector::new(MockFs::typical_system(), CollectorConfig::default());
        let first = collector.refresh();
        let second = collector.refresh();
        assert_eq!(first.processes, second.processes);
        assert_eq!(first.machine, second.machine);
    }

    #[test]
    fn test_concurrent_refresh() {
        let collector = Collector::new(MockFs::typical_system(), CollectorConfig::default());
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4).map(|_| s.spawn(|| collector.refresh())).collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap().processes.len(), 3);
            }
        });
    }
}
