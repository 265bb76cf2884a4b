#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Least squares scale and shift alignment of inverse depth.
pub mod align;

/// Run configuration.
pub mod config;

/// Benchmark datasets and their conventions.
pub mod dataset;

/// Dataset level evaluation driver.
pub mod driver;

/// Error types for the evaluation.
pub mod error;

/// Depth estimation error metrics.
pub mod metrics;

/// Per-sample evaluation steps.
pub mod pipeline;

/// Aggregated dataset report.
pub mod report;

/// Sample collections consumed by the driver.
pub mod source;

pub use crate::align::{compute_scale_and_shift, AlignmentParams};
pub use crate::config::EvalConfig;
pub use crate::dataset::Dataset;
pub use crate::driver::Evaluator;
pub use crate::error::EvalError;
pub use crate::metrics::{compute_errors, ErrorVector};
pub use crate::pipeline::{evaluate_sample, DepthBounds, SampleOutcome};
pub use crate::report::AggregateReport;
pub use crate::source::{DirectorySource, Sample, SampleSource, VecSource};
