use serde::{Deserialize, Serialize};

use crate::{error::EvalError, pipeline::DepthBounds};

/// Suffix of the TUM manifest entries, stripped to obtain the sample key.
pub const TUM_ENTRY_SUFFIX: &str = ".jpg.h5";

/// The benchmark datasets with their evaluation conventions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    /// KITTI, Eigen test split, sparse lidar ground truth.
    Kitti,
    /// NYU depth v2, labelled test split.
    Nyu,
    /// TUM RGB-D sequences from the mannequin challenge release.
    Tum,
}

impl Dataset {
    /// Ground truth must be strictly above this depth to be valid.
    ///
    /// Projected lidar leaves tiny non-zero values where there is no return.
    pub fn lower_bound(&self) -> f32 {
        match self {
            Dataset::Kitti => 1e-3,
            Dataset::Nyu | Dataset::Tum => 0.0,
        }
    }

    /// Maximum valid depth in metres used when none is configured.
    pub fn default_max_depth(&self) -> f32 {
        match self {
            Dataset::Kitti => 80.0,
            Dataset::Nyu | Dataset::Tum => 10.0,
        }
    }

    /// Depth bounds for a given maximum depth.
    pub fn bounds(&self, max_depth: f32) -> DepthBounds {
        DepthBounds {
            lower: self.lower_bound(),
            max_depth,
        }
    }

    /// Manifest file listing the test split.
    pub fn default_data_list_file(&self) -> &'static str {
        match self {
            Dataset::Kitti => "test_kitti.txt",
            Dataset::Nyu => "test_nyu.txt",
            Dataset::Tum => "test_tum.txt",
        }
    }

    /// Folder the inference step writes the predictions to.
    pub fn default_predictions_dir(&self) -> &'static str {
        match self {
            Dataset::Kitti => "kitti",
            Dataset::Nyu => "nyu",
            Dataset::Tum => "tum",
        }
    }

    /// Divisor applied to integer ground truth rasters to obtain metres.
    pub fn default_ground_truth_scale(&self) -> f32 {
        match self {
            Dataset::Kitti => 256.0,
            Dataset::Nyu | Dataset::Tum => 1000.0,
        }
    }

    /// File stem shared by the prediction and the ground truth of a sample.
    ///
    /// KITTI and NYU samples are paired by position, TUM samples by name.
    ///
    /// # Example
    ///
    /// ```
    /// use pydnet_eval::dataset::Dataset;
    ///
    /// assert_eq!(Dataset::Kitti.sample_key(7, "2011_09_26/0000000069"), "0007");
    /// assert_eq!(Dataset::Tum.sample_key(7, "frame_0042.jpg.h5"), "frame_0042");
    /// ```
    pub fn sample_key(&self, index: usize, entry: &str) -> String {
        match self {
            Dataset::Kitti | Dataset::Nyu => format!("{index:04}"),
            Dataset::Tum => entry
                .strip_suffix(TUM_ENTRY_SUFFIX)
                .unwrap_or(entry)
                .to_string(),
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Dataset::Kitti => write!(f, "kitti"),
            Dataset::Nyu => write!(f, "nyu"),
            Dataset::Tum => write!(f, "tum"),
        }
    }
}

impl std::str::FromStr for Dataset {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kitti" => Ok(Dataset::Kitti),
            "nyu" => Ok(Dataset::Nyu),
            "tum" => Ok(Dataset::Tum),
            _ => Err(EvalError::UnknownDataset(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dataset() -> Result<(), EvalError> {
        assert_eq!("kitti".parse::<Dataset>()?, Dataset::Kitti);
        assert_eq!("NYU".parse::<Dataset>()?, Dataset::Nyu);
        assert_eq!("tum".parse::<Dataset>()?, Dataset::Tum);
        assert!(matches!(
            "eth3d".parse::<Dataset>(),
            Err(EvalError::UnknownDataset(_))
        ));
        Ok(())
    }

    #[test]
    fn dataset_defaults() {
        assert_eq!(Dataset::Kitti.default_max_depth(), 80.0);
        assert_eq!(Dataset::Nyu.default_max_depth(), 10.0);
        assert_eq!(Dataset::Tum.default_max_depth(), 10.0);
        assert_eq!(Dataset::Kitti.lower_bound(), 1e-3);
        assert_eq!(Dataset::Tum.bounds(5.0).max_depth, 5.0);
    }

    #[test]
    fn sample_keys() {
        assert_eq!(Dataset::Nyu.sample_key(653, "653"), "0653");
        assert_eq!(Dataset::Tum.sample_key(0, "plain_name"), "plain_name");
    }
}
