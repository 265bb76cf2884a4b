use std::path::PathBuf;

use pydnet_image::{DepthMap, InverseDepthMap};
use pydnet_io::{
    ground_truth::{find_ground_truth, read_ground_truth},
    manifest::read_manifest,
    prediction::read_prediction_png,
};

use crate::{config::EvalConfig, dataset::Dataset, error::EvalError};

/// One ground truth depth map paired with its predicted inverse depth.
#[derive(Clone, Debug)]
pub struct Sample {
    /// Identifier used in diagnostics.
    pub id: String,
    /// Ground truth depth in metres.
    pub target: DepthMap,
    /// Predicted inverse depth.
    pub prediction: InverseDepthMap,
}

/// A finite, restartable collection of evaluation samples.
///
/// Samples are pulled by index so that the driver can load them lazily, in
/// any order and from several threads.
pub trait SampleSource: Sync {
    /// Number of samples in the collection.
    fn len(&self) -> usize;

    /// True if the collection holds no sample.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identifier of the sample at `index`, `#{index}` when out of range.
    fn sample_id(&self, index: usize) -> String;

    /// Load the sample at `index`.
    ///
    /// Fails with [`EvalError::IndexOutOfRange`] when `index >= len()`.
    fn load(&self, index: usize) -> Result<Sample, EvalError>;
}

fn check_index(index: usize, len: usize) -> Result<(), EvalError> {
    if index >= len {
        return Err(EvalError::IndexOutOfRange { index, len });
    }
    Ok(())
}

/// Samples stored as rasters on disk and listed by a manifest.
pub struct DirectorySource {
    dataset: Dataset,
    entries: Vec<String>,
    predictions_dir: PathBuf,
    ground_truth_dir: PathBuf,
    prediction_scale: f32,
    ground_truth_scale: f32,
}

impl DirectorySource {
    /// Create a source from the manifest and directories of `config`.
    pub fn from_config(config: &EvalConfig) -> Result<Self, EvalError> {
        let entries = read_manifest(&config.data_list_file)?;
        log::info!(
            "{} manifest {} lists {} samples",
            config.dataset,
            config.data_list_file.display(),
            entries.len()
        );
        Ok(Self::new(config, entries))
    }

    /// Create a source over explicit manifest entries.
    pub fn new(config: &EvalConfig, entries: Vec<String>) -> Self {
        Self {
            dataset: config.dataset,
            entries,
            predictions_dir: config.predictions_dir.clone(),
            ground_truth_dir: config.ground_truth_dir.clone(),
            prediction_scale: config.prediction_scale,
            ground_truth_scale: config.ground_truth_scale,
        }
    }

    /// File stem of the sample at `index`, `None` past the end of the manifest.
    pub fn key(&self, index: usize) -> Option<String> {
        self.entries
            .get(index)
            .map(|entry| self.dataset.sample_key(index, entry))
    }

    fn load_impl(&self, index: usize) -> Result<Sample, EvalError> {
        let key = self.key(index).ok_or(EvalError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })?;

        let prediction_path = self.predictions_dir.join(format!("{key}.png"));
        let prediction = read_prediction_png(&prediction_path, self.prediction_scale)?;

        let ground_truth_path = find_ground_truth(&self.ground_truth_dir, &key).ok_or_else(|| {
            EvalError::MissingGroundTruth {
                key: key.clone(),
                dir: self.ground_truth_dir.clone(),
            }
        })?;
        let target = read_ground_truth(&ground_truth_path, self.ground_truth_scale)?;

        Ok(Sample {
            id: self.sample_id(index),
            target,
            prediction,
        })
    }
}

impl SampleSource for DirectorySource {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn sample_id(&self, index: usize) -> String {
        match (self.entries.get(index), self.key(index)) {
            (Some(entry), Some(key)) => format!("{entry} ({key})"),
            _ => format!("#{index}"),
        }
    }

    fn load(&self, index: usize) -> Result<Sample, EvalError> {
        check_index(index, self.len())?;
        self.load_impl(index)
            .map_err(|e| e.for_sample(self.sample_id(index)))
    }
}

/// Samples already held in memory.
#[derive(Clone, Debug, Default)]
pub struct VecSource {
    samples: Vec<Sample>,
}

impl VecSource {
    /// Wrap a list of samples.
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }
}

impl SampleSource for VecSource {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn sample_id(&self, index: usize) -> String {
        self.samples
            .get(index)
            .map_or_else(|| format!("#{index}"), |sample| sample.id.clone())
    }

    fn load(&self, index: usize) -> Result<Sample, EvalError> {
        check_index(index, self.len())?;
        Ok(self.samples[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pydnet_image::Image;

    #[test]
    fn vec_source_out_of_range() -> Result<(), EvalError> {
        let source = VecSource::new(vec![Sample {
            id: "only".to_string(),
            target: Image::from_size_val([2, 1].into(), 1.0)?,
            prediction: Image::from_size_val([2, 1].into(), 1.0)?,
        }]);

        assert_eq!(source.sample_id(0), "only");
        assert_eq!(source.sample_id(3), "#3");
        assert!(source.load(0).is_ok());
        assert!(matches!(
            source.load(1),
            Err(EvalError::IndexOutOfRange { index: 1, len: 1 })
        ));
        Ok(())
    }

    #[test]
    fn directory_source_out_of_range() {
        let config = EvalConfig::new(Dataset::Tum);
        let source = DirectorySource::new(&config, vec!["frame_0001.jpg.h5".to_string()]);

        assert_eq!(source.key(0), Some("frame_0001".to_string()));
        assert_eq!(source.key(1), None);
        assert_eq!(source.sample_id(1), "#1");
        assert!(matches!(
            source.load(1),
            Err(EvalError::IndexOutOfRange { index: 1, len: 1 })
        ));
    }
}
