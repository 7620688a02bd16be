//! Metrics for vocalis.
//!
//! Instrumented crates record through the `metrics` facade macros re-exported
//! here, using the names in this crate so dashboards see one vocabulary. With
//! the `prometheus` feature, [`init_metrics`] installs a recorder whose
//! [`MetricsHandle`] renders the `/metrics` exposition text.

mod definitions;
mod recorder;

pub use {
    definitions::*,
    recorder::{MetricsHandle, MetricsRecorderConfig, init_metrics},
};

pub use metrics::{counter, gauge, histogram};
