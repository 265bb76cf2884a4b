use pydnet_image::{InverseDepthMap, ValidityMask};
use serde::{Deserialize, Serialize};

use crate::error::EvalError;

/// Affine calibration mapping a prediction onto the target: `scale * p + shift`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlignmentParams {
    /// Multiplicative factor.
    pub scale: f64,
    /// Additive offset.
    pub shift: f64,
}

impl AlignmentParams {
    /// Parameters returned when the least squares system is rank deficient.
    pub const FALLBACK: Self = Self {
        scale: 0.0,
        shift: 0.0,
    };

    /// Apply the calibration to one value.
    pub fn apply(&self, value: f64) -> f64 {
        self.scale * value + self.shift
    }

    /// True when these are the rank deficient fallback parameters.
    pub fn is_fallback(&self) -> bool {
        *self == Self::FALLBACK
    }
}

/// Solve for the scale and shift that best map `prediction` onto `target`.
///
/// Fits `target ≈ scale * prediction + shift` in the least squares sense over
/// the pixels where `mask` is true. Pixels outside the mask carry zero weight,
/// whatever value they hold. The 2x2 normal equations are
///
/// ```text
/// | a00 a01 | |scale|   |b0|
/// | a01 a11 | |shift| = |b1|
/// ```
///
/// with `a00 = Σp²`, `a01 = Σp`, `a11 = count`, `b0 = Σp·t` and `b1 = Σt`.
/// The determinant is evaluated as `a11 * Σ(p - p̄)²`, which equals
/// `a00 * a11 - a01²` without its cancellation, and the solution in the
/// same centred form.
///
/// When the determinant is not positive (empty or single pixel mask, constant
/// prediction) the system has no unique solution and
/// [`AlignmentParams::FALLBACK`] is returned. A determinant within
/// `a11 * f64::EPSILON * a00` of zero is rounding noise and counts as zero.
///
/// # Arguments
///
/// * `prediction` - The predicted inverse depth.
/// * `target` - The ground truth inverse depth.
/// * `mask` - The pixels to fit on.
///
/// # Errors
///
/// Fails if the three rasters do not share one size.
///
/// # Example
///
/// ```
/// use pydnet_image::Image;
/// use pydnet_eval::align::compute_scale_and_shift;
///
/// let prediction = Image::<f32>::new([3, 1].into(), vec![1.0, 2.0, 3.0]).unwrap();
/// let target = prediction.map(|&p| 2.0 * p + 0.5);
/// let mask = prediction.map(|_| true);
///
/// let params = compute_scale_and_shift(&prediction, &target, &mask).unwrap();
/// assert!((params.scale - 2.0).abs() < 1e-9);
/// assert!((params.shift - 0.5).abs() < 1e-9);
/// ```
pub fn compute_scale_and_shift(
    prediction: &InverseDepthMap,
    target: &InverseDepthMap,
    mask: &ValidityMask,
) -> Result<AlignmentParams, EvalError> {
    prediction.ensure_same_size(target)?;
    prediction.ensure_same_size(mask)?;

    let masked = || {
        prediction
            .as_slice()
            .iter()
            .zip(target.as_slice())
            .zip(mask.as_slice())
            .filter(|&(_, &valid)| valid)
            .map(|((&p, &t), _)| (p as f64, t as f64))
    };

    let (mut a00, mut a01, mut a11, mut b1) = (0f64, 0f64, 0f64, 0f64);
    masked().for_each(|(p, t)| {
        a00 += p * p;
        a01 += p;
        a11 += 1.0;
        b1 += t;
    });

    if a11 == 0.0 {
        log::debug!("empty alignment mask, falling back to zero");
        return Ok(AlignmentParams::FALLBACK);
    }

    let (mean_p, mean_t) = (a01 / a11, b1 / a11);

    // centred second moments
    let (mut spp, mut spt) = (0f64, 0f64);
    masked().for_each(|(p, t)| {
        let dp = p - mean_p;
        spp += dp * dp;
        spt += dp * (t - mean_t);
    });

    let det = a11 * spp;

    if !det.is_finite() || det <= a11 * f64::EPSILON * a00 {
        log::debug!(
            "rank deficient alignment over {} pixels (det {det}), falling back to zero",
            a11
        );
        return Ok(AlignmentParams::FALLBACK);
    }

    let scale = spt / spp;
    Ok(AlignmentParams {
        scale,
        shift: mean_t - scale * mean_p,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pydnet_image::Image;

    fn image(width: usize, height: usize, data: Vec<f32>) -> Image<f32> {
        Image::new([width, height].into(), data).unwrap()
    }

    #[test]
    fn identity_alignment() -> Result<(), EvalError> {
        let prediction = image(3, 2, vec![0.1, 0.5, 0.2, 0.9, 0.3, 0.7]);
        let mask = prediction.map(|_| true);

        let params = compute_scale_and_shift(&prediction, &prediction, &mask)?;

        approx::assert_relative_eq!(params.scale, 1.0, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(params.shift, 0.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn recovers_affine_relation() -> Result<(), EvalError> {
        let prediction = image(4, 1, vec![1.0, 2.0, 4.0, 8.0]);
        let target = prediction.map(|&p| 0.25 * p - 0.125);
        let mask = prediction.map(|_| true);

        let params = compute_scale_and_shift(&prediction, &target, &mask)?;

        approx::assert_relative_eq!(params.scale, 0.25, epsilon = 1e-9);
        approx::assert_relative_eq!(params.shift, -0.125, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn low_variance_prediction_is_solved() -> Result<(), EvalError> {
        // 16-bit stored predictions near the top of the range, one step apart
        let mut data = vec![200.0f32; 1000];
        data[999] = 200.0 + 1.0 / 256.0;
        let prediction = image(1000, 1, data);
        let target = prediction.map(|&p| 0.5 * p + 0.25);
        let mask = prediction.map(|_| true);

        let params = compute_scale_and_shift(&prediction, &target, &mask)?;

        assert!(!params.is_fallback());
        approx::assert_relative_eq!(params.scale, 0.5, epsilon = 1e-9);
        approx::assert_relative_eq!(params.shift, 0.25, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn masked_out_pixels_are_ignored() -> Result<(), EvalError> {
        let mask = Image::new([4, 1].into(), vec![true, false, true, true])?;
        let prediction = image(4, 1, vec![1.0, 2.0, 3.0, 5.0]);
        let target = image(4, 1, vec![2.0, 0.0, 4.0, 7.0]);

        let reference = compute_scale_and_shift(&prediction, &target, &mask)?;

        let prediction_perturbed = image(4, 1, vec![1.0, 1e6, 3.0, 5.0]);
        let target_perturbed = image(4, 1, vec![2.0, f32::NAN, 4.0, 7.0]);
        let perturbed =
            compute_scale_and_shift(&prediction_perturbed, &target_perturbed, &mask)?;

        assert_eq!(reference, perturbed);
        Ok(())
    }

    #[test]
    fn single_pixel_falls_back() -> Result<(), EvalError> {
        let mask = Image::new([3, 1].into(), vec![false, true, false])?;
        let prediction = image(3, 1, vec![0.3, 0.7, 0.1]);
        let target = image(3, 1, vec![1.0, 2.0, 3.0]);

        let params = compute_scale_and_shift(&prediction, &target, &mask)?;

        assert!(params.is_fallback());
        Ok(())
    }

    #[test]
    fn constant_prediction_falls_back() -> Result<(), EvalError> {
        let prediction = image(7, 1, vec![0.1; 7]);
        let target = image(7, 1, vec![0.5, 0.2, 0.3, 0.9, 0.1, 0.4, 0.6]);
        let mask = prediction.map(|_| true);

        let params = compute_scale_and_shift(&prediction, &target, &mask)?;

        assert_eq!(params, AlignmentParams::FALLBACK);
        Ok(())
    }

    #[test]
    fn uniform_region_falls_back() -> Result<(), EvalError> {
        // inverse depth of a 2x2 patch at 2m against a flat prediction
        let prediction = image(2, 2, vec![1.0; 4]);
        let target = image(2, 2, vec![0.5; 4]);
        let mask = prediction.map(|_| true);

        let params = compute_scale_and_shift(&prediction, &target, &mask)?;

        assert_eq!(params, AlignmentParams::FALLBACK);
        Ok(())
    }

    #[test]
    fn empty_mask_falls_back() -> Result<(), EvalError> {
        let prediction = image(2, 1, vec![1.0, 2.0]);
        let mask = prediction.map(|_| false);

        let params = compute_scale_and_shift(&prediction, &prediction, &mask)?;

        assert!(params.is_fallback());
        Ok(())
    }

    #[test]
    fn size_mismatch() {
        let prediction = image(2, 1, vec![1.0, 2.0]);
        let target = image(1, 2, vec![1.0, 2.0]);
        let mask = prediction.map(|_| true);

        assert!(matches!(
            compute_scale_and_shift(&prediction, &target, &mask),
            Err(EvalError::Image(_))
        ));
    }
}
