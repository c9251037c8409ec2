//! Readers for the Linux `/proc` filesystem.
//!
//! `reader` opens files, `parser` turns lines into typed fields, and the
//! `system`/`process` readers combine both into metrics.

mod error;
pub mod parser;
pub mod process;
pub mod reader;
pub mod system;

pub use error::CollectError;
pub use parser::ParseError;
pub use process::ProcessStatsReader;
pub use reader::KernelTextReader;
pub use system::SystemStatsReader;
