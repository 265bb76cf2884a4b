use std::path::PathBuf;

use argh::FromArgs;
use indicatif::{ProgressBar, ProgressStyle};

use pydnet::eval::{Dataset, DirectorySource, EvalConfig, Evaluator, SampleSource};

#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "eval")]
/// Evaluate a directory of predictions on a benchmark split.
pub struct EvalArgs {
    /// dataset to evaluate: kitti, nyu or tum
    #[argh(option, short = 'd')]
    dataset: Option<Dataset>,

    /// path to a JSON configuration file
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// maximum valid ground truth depth in metres
    #[argh(option)]
    max_depth: Option<f32>,

    /// manifest listing the samples of the split
    #[argh(option)]
    data_list_file: Option<PathBuf>,

    /// directory holding the prediction PNGs
    #[argh(option, short = 'p')]
    predictions_dir: Option<PathBuf>,

    /// directory holding the ground truth rasters
    #[argh(option, short = 'g')]
    ground_truth_dir: Option<PathBuf>,

    /// divisor turning stored prediction integers into inverse depth
    #[argh(option)]
    prediction_scale: Option<f32>,

    /// divisor turning integer ground truth into metres
    #[argh(option)]
    ground_truth_scale: Option<f32>,

    /// fail instead of resizing predictions to the ground truth size
    #[argh(switch)]
    no_resize: bool,

    /// number of threads to use
    #[argh(option, short = 'n')]
    num_threads: Option<usize>,

    /// write the report as JSON to this file
    #[argh(option)]
    report_json: Option<PathBuf>,
}

impl EvalArgs {
    fn into_config(self) -> Result<(EvalConfig, Option<PathBuf>), Box<dyn std::error::Error>> {
        let mut config = match (&self.config, self.dataset) {
            (Some(path), dataset) => {
                let config = EvalConfig::from_json_file(path)?;
                if let Some(dataset) = dataset.filter(|&d| d != config.dataset) {
                    return Err(format!(
                        "--dataset {} conflicts with {} in {}",
                        dataset,
                        config.dataset,
                        path.display()
                    )
                    .into());
                }
                config
            }
            (None, Some(dataset)) => EvalConfig::new(dataset),
            (None, None) => return Err("either --dataset or --config is required".into()),
        };

        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(data_list_file) = self.data_list_file {
            config.data_list_file = data_list_file;
        }
        if let Some(predictions_dir) = self.predictions_dir {
            config.predictions_dir = predictions_dir;
        }
        if let Some(ground_truth_dir) = self.ground_truth_dir {
            config.ground_truth_dir = ground_truth_dir;
        }
        if let Some(prediction_scale) = self.prediction_scale {
            config.prediction_scale = prediction_scale;
        }
        if let Some(ground_truth_scale) = self.ground_truth_scale {
            config.ground_truth_scale = ground_truth_scale;
        }
        if self.no_resize {
            config.resize_prediction = false;
        }
        if let Some(num_threads) = self.num_threads {
            config.num_threads = num_threads;
        }

        Ok((config, self.report_json))
    }
}

pub fn run(args: EvalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (config, report_json) = args.into_config()?;

    let source = DirectorySource::from_config(&config)?;
    let evaluator = Evaluator::new(config)?;

    println!(
        "Evaluating {} samples of {} with max depth {}",
        source.len(),
        evaluator.config().dataset,
        evaluator.config().max_depth
    );

    // create a progress bar
    let pb = ProgressBar::new(source.len() as u64);
    pb.set_style(ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>7}/{len:7} ({eta}) {per_sec}",
    )?.progress_chars("##>-"));

    let report = evaluator.run_with_progress(&source, |_| pb.inc(1));
    pb.finish_and_clear();
    let report = report?;

    if report.num_skipped() > 0 {
        println!(
            "{} samples without valid ground truth were skipped",
            report.num_skipped()
        );
    }

    print!("{report}");

    if let Some(path) = report_json {
        report.write_json(&path)?;
        log::info!("report written to {}", path.display());
    }

    println!("Evaluation done!");

    Ok(())
}
