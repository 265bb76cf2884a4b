use std::path::{Path, PathBuf};

use pydnet_io::prediction::PREDICTION_PNG_SCALE;
use serde::{Deserialize, Serialize};

use crate::{dataset::Dataset, error::EvalError, pipeline::DepthBounds};

/// Settings of one dataset evaluation run.
///
/// Every field except `dataset` falls back to the dataset default when it is
/// missing from a JSON configuration file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// The benchmark being evaluated.
    pub dataset: Dataset,
    /// Upper bound on valid ground truth depth, in metres.
    pub max_depth: f32,
    /// Manifest listing the samples of the split.
    pub data_list_file: PathBuf,
    /// Directory holding the `{key}.png` inverse depth predictions.
    pub predictions_dir: PathBuf,
    /// Directory holding the `{key}.{tiff,tif,png}` ground truth depth.
    pub ground_truth_dir: PathBuf,
    /// Divisor turning stored prediction integers into inverse depth.
    pub prediction_scale: f32,
    /// Divisor turning integer ground truth into metres.
    pub ground_truth_scale: f32,
    /// Resize predictions to the ground truth resolution when they differ.
    pub resize_prediction: bool,
    /// Number of worker threads, 1 runs on the calling thread.
    pub num_threads: usize,
}

#[derive(Deserialize)]
struct PartialConfig {
    dataset: Dataset,
    max_depth: Option<f32>,
    data_list_file: Option<PathBuf>,
    predictions_dir: Option<PathBuf>,
    ground_truth_dir: Option<PathBuf>,
    prediction_scale: Option<f32>,
    ground_truth_scale: Option<f32>,
    resize_prediction: Option<bool>,
    num_threads: Option<usize>,
}

impl EvalConfig {
    /// Create the configuration with the defaults of `dataset`.
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            max_depth: dataset.default_max_depth(),
            data_list_file: PathBuf::from(dataset.default_data_list_file()),
            predictions_dir: PathBuf::from(dataset.default_predictions_dir()),
            ground_truth_dir: PathBuf::from("."),
            prediction_scale: PREDICTION_PNG_SCALE,
            ground_truth_scale: dataset.default_ground_truth_scale(),
            resize_prediction: true,
            num_threads: 1,
        }
    }

    /// Parse a JSON configuration, filling missing fields with dataset defaults.
    pub fn from_json_str(json: &str) -> Result<Self, EvalError> {
        let partial: PartialConfig = serde_json::from_str(json)?;
        let defaults = Self::new(partial.dataset);

        let config = Self {
            dataset: partial.dataset,
            max_depth: partial.max_depth.unwrap_or(defaults.max_depth),
            data_list_file: partial.data_list_file.unwrap_or(defaults.data_list_file),
            predictions_dir: partial.predictions_dir.unwrap_or(defaults.predictions_dir),
            ground_truth_dir: partial
                .ground_truth_dir
                .unwrap_or(defaults.ground_truth_dir),
            prediction_scale: partial
                .prediction_scale
                .unwrap_or(defaults.prediction_scale),
            ground_truth_scale: partial
                .ground_truth_scale
                .unwrap_or(defaults.ground_truth_scale),
            resize_prediction: partial
                .resize_prediction
                .unwrap_or(defaults.resize_prediction),
            num_threads: partial.num_threads.unwrap_or(defaults.num_threads),
        };

        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file, see [`EvalConfig::from_json_str`].
    pub fn from_json_file(file_path: impl AsRef<Path>) -> Result<Self, EvalError> {
        let file_path = file_path.as_ref();
        if !file_path.exists() {
            return Err(pydnet_io::IoError::FileDoesNotExist(file_path.to_path_buf()).into());
        }
        let json = std::fs::read_to_string(file_path).map_err(pydnet_io::IoError::from)?;
        Self::from_json_str(&json)
    }

    /// The validity bounds of this run.
    pub fn bounds(&self) -> DepthBounds {
        self.dataset.bounds(self.max_depth)
    }

    /// Check that the numeric settings are usable.
    pub fn validate(&self) -> Result<(), EvalError> {
        if !(self.max_depth.is_finite() && self.max_depth > self.dataset.lower_bound()) {
            return Err(EvalError::InvalidConfig(format!(
                "max_depth must be finite and greater than {}, got {}",
                self.dataset.lower_bound(),
                self.max_depth
            )));
        }
        if !(self.prediction_scale.is_finite() && self.prediction_scale > 0.0) {
            return Err(EvalError::InvalidConfig(format!(
                "prediction_scale must be positive, got {}",
                self.prediction_scale
            )));
        }
        if !(self.ground_truth_scale.is_finite() && self.ground_truth_scale > 0.0) {
            return Err(EvalError::InvalidConfig(format!(
                "ground_truth_scale must be positive, got {}",
                self.ground_truth_scale
            )));
        }
        if self.num_threads == 0 {
            return Err(EvalError::InvalidConfig(
                "num_threads must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
