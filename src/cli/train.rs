use std::path::PathBuf;
use std::process;

use burn::backend::NdArray;
use clap::Args;

use lstm_template::accel::DEFAULT_CORES;
use lstm_template::model::ModelSummary;
use lstm_template::pipeline::{default_model_dir, run, RunConfig};

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory to write model.hd5 into (default: <temp>/lstm-template)
    #[arg(long, value_name = "DIR")]
    pub model_dir: Option<PathBuf>,
    /// Train on an accelerator instead of the host CPU
    #[arg(long, alias = "use-tpu")]
    pub use_accelerator: bool,
    /// Accelerator address, e.g. wgpu://discrete:0
    #[arg(long, alias = "tpu", value_name = "ADDR")]
    pub accelerator: Option<String>,
    /// Accelerator cores to spread each batch over
    #[arg(long, default_value_t = DEFAULT_CORES)]
    pub cores: usize,
    /// Passes over the synthetic data
    #[arg(long, default_value_t = 3)]
    pub epochs: usize,
    /// Seed for data generation and shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
    /// Print the model summary before training
    #[arg(long)]
    pub summary: bool,
}

impl TrainArgs {
    pub fn into_run_config(self) -> RunConfig {
        let defaults = RunConfig::default();
        RunConfig {
            model_dir: self.model_dir.unwrap_or_else(default_model_dir),
            use_accelerator: self.use_accelerator,
            accelerator: self.accelerator,
            cores: self.cores,
            training: defaults
                .training
                .clone()
                .with_epochs(self.epochs)
                .with_seed(self.seed),
            ..defaults
        }
    }
}

/// Layer table of the model `config` would train, built on the host.
pub fn model_summary(config: &RunConfig) -> ModelSummary {
    config.model.init::<NdArray>(&Default::default()).summary()
}

pub fn cmd_train(args: TrainArgs) {
    let show_summary = args.summary;
    let config = args
        .into_run_config()
        .apply_environment(|key| std::env::var(key).ok());

    if show_summary {
        eprintln!("{}", model_summary(&config));
        eprintln!();
    }

    eprintln!(
        "Training for {} epoch(s), output {}",
        config.training.epochs,
        config.model_dir.display()
    );

    let start = std::time::Instant::now();
    let report = match run(&config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    for (i, epoch) in report.history.epochs.iter().enumerate() {
        eprintln!(
            "  epoch {}/{}  loss {:.4}",
            i + 1,
            report.history.epochs.len(),
            epoch.loss
        );
    }
    eprintln!(
        "Done: loss {:.4}, accuracy {:.3}, {} replica(s) ({:.1}s)",
        report.evaluation.loss,
        report.evaluation.accuracy,
        report.replicas,
        start.elapsed().as_secs_f64(),
    );
    eprintln!("  model: {}", report.model_path.display());
}
