use clap::Parser;

mod cli;

#[derive(Parser)]
#[command(
    name = "lstm-template",
    version,
    about = "Train a tiny LSTM classifier on synthetic data, optionally on an accelerator"
)]
struct Cli {
    #[command(flatten)]
    train: cli::train::TrainArgs,
    /// Log filter, e.g. info or lstm_template=debug (RUST_LOG wins)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();
    lstm_template::logging::init_logging(&cli.log_level);
    cli::train::cmd_train(cli.train);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_train_on_host() {
        let cli = Cli::try_parse_from(["lstm-template"]).unwrap();
        assert!(!cli.train.use_accelerator);
        assert!(cli.train.accelerator.is_none());
        assert_eq!(cli.train.epochs, 3);
        assert_eq!(cli.log_level, "info");

        let config = cli.train.into_run_config();
        assert!(config.model_dir.ends_with("lstm-template"));
        assert_eq!(config.training.epochs, 3);
    }

    #[test]
    fn tpu_aliases_are_accepted() {
        let cli = Cli::try_parse_from([
            "lstm-template",
            "--use-tpu",
            "--tpu",
            "wgpu://discrete:0",
            "--model-dir",
            "/tmp/out",
            "--cores",
            "4",
        ])
        .unwrap();
        let config = cli.train.into_run_config();
        assert!(config.use_accelerator);
        assert_eq!(config.accelerator.as_deref(), Some("wgpu://discrete:0"));
        assert_eq!(config.model_dir, std::path::PathBuf::from("/tmp/out"));
        assert_eq!(config.cores, 4);
    }

    #[test]
    fn summary_flag_reports_model_parameters() {
        use burn::backend::NdArray;
        use burn::module::Module;

        let cli = Cli::try_parse_from(["lstm-template", "--summary"]).unwrap();
        assert!(cli.train.summary);

        let config = cli.train.into_run_config();
        let summary = cli::train::model_summary(&config);
        let model = config.model.init::<NdArray>(&Default::default());
        assert_eq!(summary.total_params(), model.num_params());
        assert!(summary
            .to_string()
            .contains(&format!("Total params: {}", model.num_params())));
    }
}
