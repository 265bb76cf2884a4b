use serde::{Deserialize, Serialize};

use crate::error::{DepthKind, EvalError};

/// Base of the threshold accuracies `a1`, `a2` and `a3`.
pub const DELTA_THRESHOLD: f64 = 1.25;

/// The standard monocular depth error statistics of one sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorVector {
    /// Mean absolute relative error `|gt - pred| / gt`.
    pub abs_rel: f64,
    /// Mean squared relative error `(gt - pred)² / gt`.
    pub sq_rel: f64,
    /// Root mean squared error in metres.
    pub rmse: f64,
    /// Root mean squared error of the natural log depth.
    pub rmse_log: f64,
    /// Fraction of pixels with `max(gt/pred, pred/gt) < 1.25`.
    pub a1: f64,
    /// Fraction of pixels with `max(gt/pred, pred/gt) < 1.25²`.
    pub a2: f64,
    /// Fraction of pixels with `max(gt/pred, pred/gt) < 1.25³`.
    pub a3: f64,
}

impl ErrorVector {
    /// Metric names in report order.
    pub const LABELS: [&'static str; 7] =
        ["abs_rel", "sq_rel", "rmse", "rmse_log", "a1", "a2", "a3"];

    /// The metrics in report order, matching [`ErrorVector::LABELS`].
    pub fn to_array(&self) -> [f64; 7] {
        [
            self.abs_rel,
            self.sq_rel,
            self.rmse,
            self.rmse_log,
            self.a1,
            self.a2,
            self.a3,
        ]
    }

    /// Build a vector from metrics in report order.
    pub fn from_array(values: [f64; 7]) -> Self {
        let [abs_rel, sq_rel, rmse, rmse_log, a1, a2, a3] = values;
        Self {
            abs_rel,
            sq_rel,
            rmse,
            rmse_log,
            a1,
            a2,
            a3,
        }
    }

    /// Element-wise arithmetic mean, `None` for an empty slice.
    pub fn mean(errors: &[ErrorVector]) -> Option<ErrorVector> {
        if errors.is_empty() {
            return None;
        }

        let mut sum = [0f64; 7];
        for error in errors {
            sum.iter_mut()
                .zip(error.to_array())
                .for_each(|(s, v)| *s += v);
        }

        let n = errors.len() as f64;
        Some(Self::from_array(sum.map(|s| s / n)))
    }
}

fn check_positive(values: &[f64], which: DepthKind) -> Result<(), EvalError> {
    match values
        .iter()
        .enumerate()
        .find(|&(_, &v)| !(v.is_finite() && v > 0.0))
    {
        Some((index, &value)) => Err(EvalError::NonPositiveDepth {
            which,
            index,
            value,
        }),
        None => Ok(()),
    }
}

/// Compute the error metrics between ground truth and predicted depth.
///
/// Both inputs are the masked, aligned depths of one sample, gathered into
/// flat arrays of equal length.
///
/// # Arguments
///
/// * `ground_truth` - Ground truth depth values.
/// * `prediction` - Aligned predicted depth values.
///
/// # Returns
///
/// The metrics `(abs_rel, sq_rel, rmse, rmse_log, a1, a2, a3)`.
///
/// # Errors
///
/// * [`EvalError::LengthMismatch`] if the lengths differ.
/// * [`EvalError::NoValidPixels`] if the inputs are empty.
/// * [`EvalError::NonPositiveDepth`] if any value is zero, negative or not finite.
///
/// # Example
///
/// ```
/// use pydnet_eval::metrics::compute_errors;
///
/// let gt = [1.0, 2.0, 4.0];
/// let errors = compute_errors(&gt, &gt).unwrap();
///
/// assert_eq!(errors.rmse, 0.0);
/// assert_eq!(errors.a1, 1.0);
/// ```
pub fn compute_errors(ground_truth: &[f64], prediction: &[f64]) -> Result<ErrorVector, EvalError> {
    if ground_truth.len() != prediction.len() {
        return Err(EvalError::LengthMismatch(
            ground_truth.len(),
            prediction.len(),
        ));
    }

    if ground_truth.is_empty() {
        return Err(EvalError::NoValidPixels);
    }

    check_positive(ground_truth, DepthKind::GroundTruth)?;
    check_positive(prediction, DepthKind::Prediction)?;

    let thresholds = [
        DELTA_THRESHOLD,
        DELTA_THRESHOLD.powi(2),
        DELTA_THRESHOLD.powi(3),
    ];

    let mut within = [0usize; 3];
    let (mut sq_err, mut sq_log_err, mut abs_rel, mut sq_rel) = (0f64, 0f64, 0f64, 0f64);

    for (&gt, &pred) in ground_truth.iter().zip(prediction) {
        let ratio = (gt / pred).max(pred / gt);
        within
            .iter_mut()
            .zip(thresholds)
            .filter(|(_, threshold)| ratio < *threshold)
            .for_each(|(count, _)| *count += 1);

        let diff = gt - pred;
        let log_diff = gt.ln() - pred.ln();

        sq_err += diff * diff;
        sq_log_err += log_diff * log_diff;
        abs_rel += diff.abs() / gt;
        sq_rel += diff * diff / gt;
    }

    let n = ground_truth.len() as f64;

    Ok(ErrorVector {
        abs_rel: abs_rel / n,
        sq_rel: sq_rel / n,
        rmse: (sq_err / n).sqrt(),
        rmse_log: (sq_log_err / n).sqrt(),
        a1: within[0] as f64 / n,
        a2: within[1] as f64 / n,
        a3: within[2] as f64 / n,
    })
}
