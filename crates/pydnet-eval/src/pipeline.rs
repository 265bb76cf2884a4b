use pydnet_image::{DepthMap, Image, InverseDepthMap, ValidityMask};
use serde::{Deserialize, Serialize};

use crate::{
    align::{compute_scale_and_shift, AlignmentParams},
    error::EvalError,
    metrics::{compute_errors, ErrorVector},
};

/// Open interval of ground truth depths considered trustworthy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DepthBounds {
    /// Depths must be strictly greater than this value.
    pub lower: f32,
    /// Depths must be strictly smaller than this value.
    pub max_depth: f32,
}

impl DepthBounds {
    /// Floor applied to the aligned inverse depth, `1 / max_depth`.
    pub fn disparity_cap(&self) -> f64 {
        1.0 / self.max_depth as f64
    }

    /// True if `depth` lies inside the bounds. NaN is never valid.
    pub fn contains(&self, depth: f32) -> bool {
        depth > self.lower && depth < self.max_depth
    }
}

/// Result of evaluating one sample.
#[derive(Clone, Debug, PartialEq)]
pub enum SampleOutcome {
    /// The metrics were computed on `num_valid` pixels.
    Evaluated {
        /// The per-sample metrics.
        errors: ErrorVector,
        /// The fitted calibration.
        params: AlignmentParams,
        /// Number of pixels inside the validity mask.
        num_valid: usize,
    },
    /// The ground truth has no pixel inside the bounds.
    NoValidPixels,
}

/// Mark the ground truth pixels with `lower < depth < max_depth`.
pub fn build_validity_mask(target: &DepthMap, bounds: DepthBounds) -> ValidityMask {
    target.map(|&depth| bounds.contains(depth))
}

/// Reciprocal of `target` on the mask, zero elsewhere.
pub fn invert_depth(
    target: &DepthMap,
    mask: &ValidityMask,
) -> Result<InverseDepthMap, EvalError> {
    target.ensure_same_size(mask)?;

    let data = target
        .as_slice()
        .iter()
        .zip(mask.as_slice())
        .map(|(&depth, &valid)| if valid { 1.0 / depth } else { 0.0 })
        .collect();

    Ok(Image::new(target.size(), data)?)
}

/// Apply the calibration to every pixel and floor it at `disparity_cap`.
///
/// The floor keeps the inverse depth strictly positive so that it can be
/// inverted back to a finite depth.
pub fn apply_alignment(
    prediction: &InverseDepthMap,
    params: AlignmentParams,
    disparity_cap: f64,
) -> Image<f64> {
    prediction.map(|&p| params.apply(p as f64).max(disparity_cap))
}

/// Evaluate one predicted inverse depth map against its ground truth depth.
///
/// The steps are: build the validity mask from `bounds`, invert the ground
/// truth, fit scale and shift in inverse depth, apply them with the disparity
/// cap, invert back to depth and compute the metrics on the masked pixels.
///
/// # Arguments
///
/// * `target` - Ground truth depth in metres.
/// * `prediction` - Predicted inverse depth, same size as `target`.
/// * `bounds` - Valid ground truth depth range.
///
/// # Returns
///
/// [`SampleOutcome::NoValidPixels`] when the mask is empty, otherwise the metrics.
pub fn evaluate_sample(
    target: &DepthMap,
    prediction: &InverseDepthMap,
    bounds: DepthBounds,
) -> Result<SampleOutcome, EvalError> {
    target.ensure_same_size(prediction)?;

    let mask = build_validity_mask(target, bounds);
    let num_valid = mask.count_true();
    if num_valid == 0 {
        return Ok(SampleOutcome::NoValidPixels);
    }

    let target_idepth = invert_depth(target, &mask)?;
    let params = compute_scale_and_shift(prediction, &target_idepth, &mask)?;
    let aligned_idepth = apply_alignment(prediction, params, bounds.disparity_cap());

    let (gt_valid, pred_valid): (Vec<f64>, Vec<f64>) = target
        .as_slice()
        .iter()
        .zip(aligned_idepth.as_slice())
        .zip(mask.as_slice())
        .filter(|&(_, &valid)| valid)
        .map(|((&depth, &idepth), _)| (depth as f64, 1.0 / idepth))
        .unzip();

    let errors = compute_errors(&gt_valid, &pred_valid)?;

    Ok(SampleOutcome::Evaluated {
        errors,
        params,
        num_valid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KITTI_BOUNDS: DepthBounds = DepthBounds {
        lower: 1e-3,
        max_depth: 80.0,
    };

    const INDOOR_BOUNDS: DepthBounds = DepthBounds {
        lower: 0.0,
        max_depth: 10.0,
    };

    #[test]
    fn mask_from_bounds() -> Result<(), EvalError> {
        let target = Image::new([5, 1].into(), vec![0.0, 5e-4, 2.0, 80.0, f32::NAN])?;
        let mask = build_validity_mask(&target, KITTI_BOUNDS);
        assert_eq!(mask.as_slice(), &[false, false, true, false, false]);
        Ok(())
    }

    #[test]
    fn inversion_zeroes_masked_out() -> Result<(), EvalError> {
        let target = Image::new([3, 1].into(), vec![0.0, 2.0, 4.0])?;
        let mask = build_validity_mask(&target, INDOOR_BOUNDS);
        let idepth = invert_depth(&target, &mask)?;
        assert_eq!(idepth.as_slice(), &[0.0, 0.5, 0.25]);
        Ok(())
    }

    #[test]
    fn alignment_is_floored() -> Result<(), EvalError> {
        let prediction = Image::new([3, 1].into(), vec![0.0, 1.0, 2.0])?;
        let params = AlignmentParams {
            scale: 1.0,
            shift: -1.0,
        };
        let aligned = apply_alignment(&prediction, params, 0.1);
        assert_eq!(aligned.as_slice(), &[0.1, 0.1, 1.0]);
        Ok(())
    }

    #[test]
    fn perfect_affine_prediction() -> Result<(), EvalError> {
        let target = Image::new([2, 2].into(), vec![1.0, 2.0, 4.0, 5.0])?;
        // inverse depth up to scale 0.5 and shift 0.1
        let prediction = target.map(|&d| (1.0 / d - 0.1) / 0.5);

        let outcome = evaluate_sample(&target, &prediction, INDOOR_BOUNDS)?;

        let SampleOutcome::Evaluated {
            errors,
            params,
            num_valid,
        } = outcome
        else {
            panic!("expected an evaluated sample");
        };
        assert_eq!(num_valid, 4);
        approx::assert_relative_eq!(params.scale, 0.5, epsilon = 1e-5);
        approx::assert_relative_eq!(params.shift, 0.1, epsilon = 1e-5);
        approx::assert_abs_diff_eq!(errors.abs_rel, 0.0, epsilon = 1e-5);
        approx::assert_abs_diff_eq!(errors.rmse, 0.0, epsilon = 1e-5);
        assert_eq!(errors.a1, 1.0);
        Ok(())
    }

    #[test]
    fn uniform_batch_hits_fallback() -> Result<(), EvalError> {
        let target = Image::from_size_val([2, 2].into(), 2.0f32)?;
        let prediction = Image::from_size_val([2, 2].into(), 1.0f32)?;

        let outcome = evaluate_sample(&target, &prediction, INDOOR_BOUNDS)?;

        let SampleOutcome::Evaluated { errors, params, .. } = outcome else {
            panic!("expected an evaluated sample");
        };
        assert!(params.is_fallback());
        // every aligned depth is clamped to max_depth
        approx::assert_relative_eq!(errors.abs_rel, 4.0);
        approx::assert_relative_eq!(errors.rmse, 8.0);
        assert_eq!(errors.a3, 0.0);
        Ok(())
    }

    #[test]
    fn empty_mask_is_reported() -> Result<(), EvalError> {
        let target = Image::from_size_val([3, 2].into(), 0.0f32)?;
        let prediction = Image::from_size_val([3, 2].into(), 1.0f32)?;

        let outcome = evaluate_sample(&target, &prediction, KITTI_BOUNDS)?;

        assert_eq!(outcome, SampleOutcome::NoValidPixels);
        Ok(())
    }

    #[test]
    fn size_mismatch_is_an_error() -> Result<(), EvalError> {
        let target = Image::from_size_val([3, 2].into(), 1.0f32)?;
        let prediction = Image::from_size_val([2, 3].into(), 1.0f32)?;

        assert!(matches!(
            evaluate_sample(&target, &prediction, KITTI_BOUNDS),
            Err(EvalError::Image(_))
        ));
        Ok(())
    }
}
