//! The template run: build, place, generate, fit, save.

use std::path::PathBuf;

use burn::backend::ndarray::NdArrayDevice;
use burn::backend::wgpu::WgpuDevice;
use burn::backend::{Autodiff, NdArray, Wgpu};
use burn::module::AutodiffModule;
use burn::tensor::backend::AutodiffBackend;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::accel::{ClusterResolver, DistributionStrategy, ACCELERATOR_ADDR_ENV, DEFAULT_CORES};
use crate::checkpoint::save_model;
use crate::data::{make_data, DATA_SIZE, NUM_FEATURES, SEQ_LEN};
use crate::error::{Error, Result};
use crate::model::SequenceClassifierConfig;
use crate::training::{evaluate, fit, Evaluation, History, TrainingConfig};

/// Directory name used under the system temp dir when none is given.
pub const DEFAULT_MODEL_DIR_NAME: &str = "lstm-template";

/// Default output directory: `<temp>/lstm-template`.
pub fn default_model_dir() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_MODEL_DIR_NAME)
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub model_dir: PathBuf,
    pub use_accelerator: bool,
    /// Accelerator address, see [`crate::accel::AcceleratorAddress`].
    pub accelerator: Option<String>,
    /// Accelerator cores to replicate over. Ignored on the host.
    pub cores: usize,
    pub model: SequenceClassifierConfig,
    pub training: TrainingConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            use_accelerator: false,
            accelerator: None,
            cores: DEFAULT_CORES,
            model: SequenceClassifierConfig::new(),
            training: TrainingConfig::new(),
        }
    }
}

impl RunConfig {
    /// Adopt the address a notebook runtime advertises.
    ///
    /// If `ACCELERATOR_ADDR` is set and no address was given explicitly, the
    /// address is taken from it and the accelerator is switched on.
    pub fn apply_environment(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.accelerator.is_none() {
            if let Some(addr) = lookup(ACCELERATOR_ADDR_ENV).filter(|a| !a.trim().is_empty()) {
                warn!(address = %addr, "using accelerator from {}", ACCELERATOR_ADDR_ENV);
                self.accelerator = Some(addr);
                self.use_accelerator = true;
            }
        }
        self
    }

    /// Check the model accepts the synthetic data's `[SEQ_LEN, NUM_FEATURES]` sequences.
    pub fn check_model(&self) -> Result<()> {
        if self.model.seq_len != SEQ_LEN || self.model.num_features != NUM_FEATURES {
            return Err(Error::InputShapeMismatch {
                seq_len: self.model.seq_len,
                num_features: self.model.num_features,
                data_seq_len: SEQ_LEN,
                data_num_features: NUM_FEATURES,
            });
        }
        Ok(())
    }

    /// Decide where training runs. Never falls back to the host once the
    /// accelerator was requested.
    pub fn placement(&self) -> Result<Placement> {
        if !self.use_accelerator {
            return Ok(Placement::Host);
        }
        let address = self
            .accelerator
            .as_deref()
            .ok_or(Error::MissingAcceleratorAddress)?;
        let resolver = ClusterResolver::from_address(address)?;
        let strategy = DistributionStrategy::replicated(self.cores)?;
        Ok(Placement::Accelerator {
            device: resolver.resolve()?,
            strategy,
        })
    }
}

/// Where the model trains.
#[derive(Debug, Clone)]
pub enum Placement {
    /// CPU via ndarray, single replica.
    Host,
    /// wgpu adapter, replicated over its cores.
    Accelerator {
        device: WgpuDevice,
        strategy: DistributionStrategy,
    },
}

/// Outcome of [`run`].
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Saved weights file.
    pub model_path: PathBuf,
    pub history: History,
    /// Final model scored on the training data.
    pub evaluation: Evaluation,
    pub replicas: usize,
}

/// Run the template end to end.
pub fn run(config: &RunConfig) -> Result<RunReport> {
    config.check_model()?;
    match config.placement()? {
        Placement::Host => {
            info!("training on host");
            train_and_save::<Autodiff<NdArray>>(
                config,
                &NdArrayDevice::default(),
                DistributionStrategy::single_replica(),
            )
        }
        Placement::Accelerator { device, strategy } => {
            info!(device = ?device, cores = strategy.replicas(), "training on accelerator");
            train_and_save::<Autodiff<Wgpu>>(config, &device, strategy)
        }
    }
}

/// Build, fit and save on a concrete backend.
pub fn train_and_save<B: AutodiffBackend>(
    config: &RunConfig,
    device: &B::Device,
    strategy: DistributionStrategy,
) -> Result<RunReport> {
    config.check_model()?;
    let model = config.model.init::<B>(device);

    let mut rng = StdRng::seed_from_u64(config.training.seed);
    let data = make_data(DATA_SIZE, &mut rng);

    let (model, history) = fit(model, &data, &strategy, &config.training, device)?;

    let model = model.valid();
    let evaluation = evaluate(&model, &data, device);
    info!(
        loss = evaluation.loss,
        accuracy = evaluation.accuracy,
        "final evaluation"
    );

    let model_path = save_model(&model, &config.model, &config.model_dir)?;

    Ok(RunReport {
        model_path,
        history,
        evaluation,
        replicas: strategy.replicas(),
    })
}
