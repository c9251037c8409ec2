//! Metrics acquisition from the Linux `/proc` filesystem.
//!
//! This module reads kernel-exposed text files and derives machine and
//! per-process facts from them, with support for mocking for testing on macOS.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Collector                           │
//! │  ┌─────────────────────┐   ┌─────────────────────────────┐  │
//! │  │ ProcessStatsReader  │   │     SystemStatsReader       │  │
//! │  │  - /proc/[pid]/*    │   │  - /proc/meminfo, stat, ... │  │
//! │  │  - /etc/passwd      │   │  - /etc/os-release          │  │
//! │  └──────────┬──────────┘   └──────────────┬──────────────┘  │
//! │             └──────────────┬──────────────┘                 │
//! │                     ┌──────▼───────────┐                    │
//! │                     │ KernelTextReader │ + parser           │
//! │                     └──────┬───────────┘                    │
//! │                     ┌──────▼──────┐                         │
//! │                     │  FileSystem │ (trait)                 │
//! │                     └──────┬──────┘                         │
//! └────────────────────────────┼────────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!              │               │               │
//!       ┌──────▼──────┐ ┌──────▼──────┐ ┌──────▼──────┐
//!       │   RealFs    │ │   MockFs    │ │  Scenarios  │
//!       │ (Linux)     │ │ (Testing)   │ │ (Fixtures)  │
//!       └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use procsnap_core::collector::{Collector, CollectorConfig, RealFs};
//!
//! let collector = Collector::new(RealFs::new(), CollectorConfig::default());
//! let snapshot = collector.refresh();
//! ```
//!
//! ## Testing (with MockFs)
//!
//! ```
//! use procsnap_core::collector::{Collector, CollectorConfig, MockFs};
//!
//! let collector = Collector::new(MockFs::typical_system(), CollectorConfig::default());
//! let snapshot = collector.refresh();
//! assert_eq!(snapshot.processes.len(), 3);
//! assert_eq!(snapshot.machine.total_processes, 3);
//! ```

#[allow(clippy::module_inception)]
mod collector;
mod config;
pub mod mock;
pub mod procfs;
pub mod traits;

pub use collector::Collector;
pub use config::CollectorConfig;
pub use mock::MockFs;
pub use procfs::{
    CollectError, KernelTextReader, ParseError, ProcessStatsReader, SystemStatsReader,
};
pub use traits::{FileSystem, PidSource, ProcPids, RealFs};
