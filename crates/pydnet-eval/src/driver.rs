use pydnet_image::{Image, InverseDepthMap};
use pydnet_imgproc::resize::resize_bilinear;
use rayon::prelude::*;

use crate::{
    config::EvalConfig,
    error::EvalError,
    metrics::ErrorVector,
    pipeline::{evaluate_sample, SampleOutcome},
    report::AggregateReport,
    source::{Sample, SampleSource},
};

/// Runs the evaluation of a whole dataset.
///
/// Every sample is aligned and scored on its own, the report is the mean of
/// the per-sample metrics so samples can be processed in any order.
pub struct Evaluator {
    config: EvalConfig,
}

impl Evaluator {
    /// Create an evaluator, validating the configuration.
    pub fn new(config: EvalConfig) -> Result<Self, EvalError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration of this run.
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Evaluate every sample of `source` and average the metrics.
    pub fn run(&self, source: &dyn SampleSource) -> Result<AggregateReport, EvalError> {
        self.run_with_progress(source, |_| {})
    }

    /// Like [`Evaluator::run`], calling `on_sample` after each processed sample.
    ///
    /// The first sample that fails to load or evaluate aborts the run, the
    /// error names the sample.
    pub fn run_with_progress(
        &self,
        source: &dyn SampleSource,
        on_sample: impl Fn(usize) + Send + Sync,
    ) -> Result<AggregateReport, EvalError> {
        log::info!(
            "evaluating {} samples of {} with max depth {}",
            source.len(),
            self.config.dataset,
            self.config.max_depth
        );

        let process = |index: usize| {
            let outcome = self
                .process_sample(source, index)
                .map(|outcome| (index, outcome));
            on_sample(index);
            outcome
        };

        let outcomes = if self.config.num_threads > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.num_threads)
                .build()
                .map_err(|e| EvalError::ThreadPool(e.to_string()))?;
            pool.install(|| {
                (0..source.len())
                    .into_par_iter()
                    .map(process)
                    .collect::<Result<Vec<_>, _>>()
            })?
        } else {
            (0..source.len())
                .map(process)
                .collect::<Result<Vec<_>, _>>()?
        };

        let mut errors: Vec<ErrorVector> = Vec::with_capacity(outcomes.len());
        let mut skipped = Vec::new();
        for (index, outcome) in outcomes {
            match outcome {
                SampleOutcome::Evaluated { errors: e, .. } => errors.push(e),
                SampleOutcome::NoValidPixels => {
                    let id = source.sample_id(index);
                    log::warn!("sample {id} has no valid ground truth pixel, skipped");
                    skipped.push(id);
                }
            }
        }

        let report = AggregateReport::from_errors(&errors, skipped)?;
        log::info!(
            "evaluated {} samples, skipped {}",
            report.num_evaluated,
            report.num_skipped()
        );

        Ok(report)
    }

    /// Load and evaluate one sample.
    pub fn process_sample(
        &self,
        source: &dyn SampleSource,
        index: usize,
    ) -> Result<SampleOutcome, EvalError> {
        let sample = source.load(index)?;
        self.evaluate(&sample)
            .map_err(|e| e.for_sample(sample.id.clone()))
    }

    /// Evaluate a loaded sample, resizing the prediction if configured.
    pub fn evaluate(&self, sample: &Sample) -> Result<SampleOutcome, EvalError> {
        let outcome = if sample.prediction.size() != sample.target.size()
            && self.config.resize_prediction
        {
            let prediction = resize_to(&sample.prediction, &sample.target)?;
            evaluate_sample(&sample.target, &prediction, self.config.bounds())?
        } else {
            evaluate_sample(&sample.target, &sample.prediction, self.config.bounds())?
        };

        if let SampleOutcome::Evaluated {
            params, num_valid, ..
        } = &outcome
        {
            log::debug!(
                "sample {}: scale {} shift {} over {} pixels",
                sample.id,
                params.scale,
                params.shift,
                num_valid
            );
        }

        Ok(outcome)
    }
}

fn resize_to<T>(prediction: &InverseDepthMap, target: &Image<T>) -> Result<InverseDepthMap, EvalError> {
    let mut resized = Image::from_size_val(target.size(), 0.0f32)?;
    resize_bilinear(prediction, &mut resized)?;
    Ok(resized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dataset::Dataset, source::VecSource};

    fn sample(id: &str, target: Vec<f32>, prediction: Vec<f32>) -> Sample {
        Sample {
            id: id.to_string(),
            target: Image::new([2, 2].into(), target).unwrap(),
            prediction: Image::new([2, 2].into(), prediction).unwrap(),
        }
    }

    #[test]
    fn skips_samples_without_valid_pixels() -> Result<(), EvalError> {
        let source = VecSource::new(vec![
            sample("a", vec![1.0, 2.0, 4.0, 5.0], vec![1.0, 0.5, 0.25, 0.2]),
            sample("b", vec![0.0; 4], vec![1.0; 4]),
        ]);

        let evaluator = Evaluator::new(EvalConfig::new(Dataset::Nyu))?;
        let report = evaluator.run(&source)?;

        assert_eq!(report.num_evaluated, 1);
        assert_eq!(report.skipped, vec!["b".to_string()]);
        approx::assert_abs_diff_eq!(report.errors.abs_rel, 0.0, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn all_skipped_is_an_error() -> Result<(), EvalError> {
        let source = VecSource::new(vec![sample("a", vec![0.0; 4], vec![1.0; 4])]);

        let evaluator = Evaluator::new(EvalConfig::new(Dataset::Tum))?;

        assert!(matches!(
            evaluator.run(&source),
            Err(EvalError::EmptyDataset { skipped: 1 })
        ));
        Ok(())
    }

    #[test]
    fn process_sample_out_of_range() -> Result<(), EvalError> {
        let source = VecSource::new(vec![sample("a", vec![1.0; 4], vec![1.0; 4])]);
        let evaluator = Evaluator::new(EvalConfig::new(Dataset::Nyu))?;

        assert!(matches!(
            evaluator.process_sample(&source, 5),
            Err(EvalError::IndexOutOfRange { index: 5, len: 1 })
        ));
        Ok(())
    }

    #[test]
    fn resizes_prediction_to_target() -> Result<(), EvalError> {
        let sample = Sample {
            id: "a".to_string(),
            target: Image::new([2, 1].into(), vec![2.0, 4.0])?,
            prediction: Image::new([4, 2].into(), vec![0.5, 0.5, 0.25, 0.25, 0.5, 0.5, 0.25, 0.25])?,
        };

        let mut config = EvalConfig::new(Dataset::Nyu);
        let evaluator = Evaluator::new(config.clone())?;
        assert!(matches!(
            evaluator.evaluate(&sample)?,
            SampleOutcome::Evaluated { num_valid: 2, .. }
        ));

        config.resize_prediction = false;
        let evaluator = Evaluator::new(config)?;
        assert!(matches!(
            evaluator.evaluate(&sample),
            Err(EvalError::Image(_))
        ));
        Ok(())
    }

    #[test]
    fn parallel_matches_serial() -> Result<(), EvalError> {
        let samples = (0..16)
            .map(|i| {
                let d = 1.0 + i as f32;
                sample(
                    &format!("{i:04}"),
                    vec![d, d + 1.0, d + 2.0, d + 4.0],
                    vec![1.0 / d, 0.9 / (d + 1.0), 1.1 / (d + 2.0), 1.0 / (d + 4.0)],
                )
            })
            .collect();
        let source = VecSource::new(samples);

        let mut config = EvalConfig::new(Dataset::Kitti);
        let serial = Evaluator::new(config.clone())?.run(&source)?;
        config.num_threads = 4;
        let parallel = Evaluator::new(config)?.run(&source)?;

        assert_eq!(serial.num_evaluated, parallel.num_evaluated);
        for (a, b) in serial
            .errors
            .to_array()
            .iter()
            .zip(parallel.errors.to_array().iter())
        {
            approx::assert_relative_eq!(a, b, epsilon = 1e-12);
        }
        Ok(())
    }
}
