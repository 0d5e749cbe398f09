//! Batch reframing worker.
//!
//! This crate provides:
//! - Environment-driven configuration
//! - Per-frame label file loading
//! - Scene-based and direct crop planning runs
//! - JSON crop plan output and Prometheus metrics snapshots

pub mod config;
pub mod error;
pub mod labels;
pub mod logging;
pub mod metrics;
pub mod runner;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use labels::LabelSource;
pub use logging::RunLogger;
pub use runner::{build_plan, ReframeRunner};
