use std::path::PathBuf;

/// Which side of the comparison a depth value belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepthKind {
    /// The ground truth depth.
    GroundTruth,
    /// The aligned predicted depth.
    Prediction,
}

impl std::fmt::Display for DepthKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DepthKind::GroundTruth => write!(f, "ground truth"),
            DepthKind::Prediction => write!(f, "prediction"),
        }
    }
}

/// An error type for the evaluation.
#[derive(thiserror::Error, Debug)]
pub enum EvalError {
    /// Error from the raster types, e.g. mismatching sizes.
    #[error(transparent)]
    Image(#[from] pydnet_image::ImageError),

    /// Error while reading or writing rasters.
    #[error(transparent)]
    Io(#[from] pydnet_io::IoError),

    /// The metric inputs do not have the same length.
    #[error("Length mismatch: ground truth has {0} values, prediction has {1}")]
    LengthMismatch(usize, usize),

    /// There is no valid pixel to compute the metrics on.
    #[error("No valid pixels to evaluate")]
    NoValidPixels,

    /// A metric input is zero, negative or not finite.
    #[error("Invalid {which} depth {value} at index {index}: depth must be positive and finite")]
    NonPositiveDepth {
        /// Which input holds the value.
        which: DepthKind,
        /// Position of the value in the input.
        index: usize,
        /// The offending value.
        value: f64,
    },

    /// No ground truth raster exists for the sample.
    #[error("No ground truth raster for key {key} in {dir}")]
    MissingGroundTruth {
        /// The file stem that was looked up.
        key: String,
        /// The directory that was searched.
        dir: PathBuf,
    },

    /// Loading or evaluating a sample failed.
    #[error("Sample {id}: {source}")]
    Sample {
        /// Identifier of the failing sample.
        id: String,
        /// The underlying error.
        source: Box<EvalError>,
    },

    /// A sample index past the end of the source.
    #[error("Sample index {index} out of range for a source of {len} samples")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of samples in the source.
        len: usize,
    },

    /// Every sample was skipped, so there is nothing to average.
    #[error("No sample could be evaluated ({skipped} skipped)")]
    EmptyDataset {
        /// Number of samples without valid pixels.
        skipped: usize,
    },

    /// The dataset name is not known.
    #[error("Unknown dataset {0}, expected one of kitti, nyu, tum")]
    UnknownDataset(String),

    /// The configuration is not usable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be parsed.
    #[error("Failed to parse the configuration. {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// The thread pool failed to build.
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(String),
}

impl EvalError {
    /// Attach the sample identifier to an error.
    pub fn for_sample(self, id: impl Into<String>) -> Self {
        match self {
            EvalError::Sample { .. } => self,
            other => EvalError::Sample {
                id: id.into(),
                source: Box::new(other),
            },
        }
    }
}
