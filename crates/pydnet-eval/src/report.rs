use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{error::EvalError, metrics::ErrorVector};

/// Dataset level result: the mean of the per-sample metrics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Element-wise mean over the evaluated samples.
    pub errors: ErrorVector,
    /// Number of samples that contributed to the mean.
    pub num_evaluated: usize,
    /// Identifiers of the samples without valid ground truth.
    pub skipped: Vec<String>,
}

impl AggregateReport {
    /// Average `errors`; `skipped` lists the samples left out of the mean.
    ///
    /// # Errors
    ///
    /// [`EvalError::EmptyDataset`] when there is nothing to average.
    pub fn from_errors(errors: &[ErrorVector], skipped: Vec<String>) -> Result<Self, EvalError> {
        let mean = ErrorVector::mean(errors).ok_or(EvalError::EmptyDataset {
            skipped: skipped.len(),
        })?;

        Ok(Self {
            errors: mean,
            num_evaluated: errors.len(),
            skipped,
        })
    }

    /// Number of samples left out of the mean.
    pub fn num_skipped(&self) -> usize {
        self.skipped.len()
    }

    /// Write the report as pretty printed JSON.
    pub fn write_json(&self, file_path: impl AsRef<Path>) -> Result<(), EvalError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(file_path, json).map_err(pydnet_io::IoError::from)?;
        Ok(())
    }
}

impl std::fmt::Display for AggregateReport {
    /// One `name:value` line per metric, in report order.
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (label, value) in ErrorVector::LABELS.iter().zip(self.errors.to_array()) {
            writeln!(f, "{label}:{value}")?;
        }
        Ok(())
    }
}
