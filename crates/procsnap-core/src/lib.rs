//! procsnap-core — point-in-time process and machine statistics.
//!
//! Provides:
//! - `collector` — kernel text readers, field parsers and the refresh orchestrator
//! - `model` — snapshot types handed to a presentation layer, plus ranking

pub mod collector;
pub mod model;
