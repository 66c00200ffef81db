//! Fit loop: RMSProp on log loss, a fixed number of epochs over the data.

pub mod loss;

use burn::config::Config;
use burn::optim::{GradientsParams, Optimizer, RmsPropConfig};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::ElementConversion;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::accel::DistributionStrategy;
use crate::data::SyntheticData;
use crate::error::Error;
use crate::model::SequenceClassifier;
use loss::log_loss;

/// Training hyperparameters.
#[derive(Config, Debug)]
pub struct TrainingConfig {
    /// Passes over the data.
    #[config(default = 3)]
    pub epochs: usize,
    /// Global batch size, split across replicas.
    #[config(default = 32)]
    pub batch_size: usize,
    #[config(default = 0.05)]
    pub learning_rate: f64,
    /// RMSProp decay of the squared-gradient average.
    #[config(default = 0.9)]
    pub rho: f32,
    /// RMSProp denominator offset.
    #[config(default = 1e-10)]
    pub epsilon: f32,
    /// Seeds data generation and per-epoch shuffling.
    #[config(default = 42)]
    pub seed: u64,
    #[config(default = true)]
    pub shuffle: bool,
}

/// Result of one training epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochResult {
    /// Mean log loss over the epoch, weighted by batch size.
    pub loss: f32,
    pub num_samples: usize,
}

/// Per-epoch record of a [`fit`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    pub epochs: Vec<EpochResult>,
}

impl History {
    pub fn final_loss(&self) -> Option<f32> {
        self.epochs.last().map(|e| e.loss)
    }
}

/// Loss and accuracy of a model over a dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub loss: f32,
    /// Fraction of samples whose prediction rounds to the label.
    pub accuracy: f32,
}

/// Create the RMSProp optimizer (no momentum, not centered).
pub fn create_optimizer<B: AutodiffBackend>(
    config: &TrainingConfig,
) -> impl Optimizer<SequenceClassifier<B>, B> {
    RmsPropConfig::new()
        .with_alpha(config.rho)
        .with_momentum(0.0)
        .with_epsilon(config.epsilon)
        .init()
}

/// Train `model` for `config.epochs` epochs.
///
/// Fails before touching the model if the data or batch cannot be split
/// evenly across the strategy's replicas.
pub fn fit<B: AutodiffBackend>(
    model: SequenceClassifier<B>,
    data: &SyntheticData,
    strategy: &DistributionStrategy,
    config: &TrainingConfig,
    device: &B::Device,
) -> crate::error::Result<(SequenceClassifier<B>, History)> {
    if config.batch_size == 0 {
        return Err(Error::InvalidBatchSize);
    }
    strategy.check_divisible(data.len(), config.batch_size)?;

    let mut optimizer = create_optimizer::<B>(config);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut indices: Vec<usize> = (0..data.len()).collect();
    let mut history = History::default();
    let mut model = model;

    for epoch in 0..config.epochs {
        if config.shuffle {
            indices.shuffle(&mut rng);
        }
        let (next, result) = train_epoch(
            model,
            data,
            &indices,
            strategy,
            &mut optimizer,
            config,
            device,
        );
        model = next;
        info!(
            epoch = epoch + 1,
            epochs = config.epochs,
            loss = result.loss,
            samples = result.num_samples,
            "epoch complete"
        );
        history.epochs.push(result);
    }

    Ok((model, history))
}

/// One pass over `indices` in batches of `config.batch_size`.
///
/// Returns the model with updated weights and the epoch result.
pub fn train_epoch<B: AutodiffBackend>(
    model: SequenceClassifier<B>,
    data: &SyntheticData,
    indices: &[usize],
    strategy: &DistributionStrategy,
    optimizer: &mut impl Optimizer<SequenceClassifier<B>, B>,
    config: &TrainingConfig,
    device: &B::Device,
) -> (SequenceClassifier<B>, EpochResult) {
    let mut model = model;
    let mut total_loss = 0.0f64;

    for (step, batch) in indices.chunks(config.batch_size).enumerate() {
        let (sequences, labels) = data.batch::<B>(batch, device);
        let loss = strategy.replica_loss(&model, sequences, labels);
        let loss_val: f32 = loss.clone().into_scalar().elem();
        total_loss += loss_val as f64 * batch.len() as f64;
        debug!(step, rows = batch.len(), loss = loss_val, "batch");

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &model);
        model = optimizer.step(config.learning_rate, model, grads);
    }

    let loss = if indices.is_empty() {
        0.0
    } else {
        (total_loss / indices.len() as f64) as f32
    };

    (
        model,
        EpochResult {
            loss,
            num_samples: indices.len(),
        },
    )
}

/// Score `model` on every sample of `data` in one batch.
pub fn evaluate<B: Backend>(
    model: &SequenceClassifier<B>,
    data: &SyntheticData,
    device: &B::Device,
) -> Evaluation {
    let (sequences, labels) = data.full_batch::<B>(device);
    let predictions = model.forward(sequences);

    let accuracy: f32 = predictions
        .clone()
        .greater_equal_elem(0.5)
        .float()
        .equal(labels.clone())
        .float()
        .mean()
        .into_scalar()
        .elem();
    let loss: f32 = log_loss(predictions, labels).into_scalar().elem();

    Evaluation { loss, accuracy }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{make_data, DATA_SIZE};
    use crate::model::SequenceClassifierConfig;
    use burn::backend::{Autodiff, NdArray};
    use burn::module::AutodiffModule;

    type B = Autodiff<NdArray>;

    #[test]
    fn default_hyperparameters() {
        let config = TrainingConfig::new();
        assert_eq!(config.epochs, 3);
        assert_eq!(config.batch_size, 32);
        assert!((config.learning_rate - 0.05).abs() < f64::EPSILON);
        assert!((config.rho - 0.9).abs() < f32::EPSILON);
        assert_eq!(config.epsilon, 1e-10);
        assert!(config.shuffle);
    }

    #[test]
    fn config_survives_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("training.json");
        let config = TrainingConfig::new().with_epochs(7).with_seed(9);

        config.save(&path).unwrap();
        let loaded = TrainingConfig::load(&path).unwrap();
        assert_eq!(loaded.epochs, 7);
        assert_eq!(loaded.seed, 9);
        assert_eq!(loaded.epsilon, config.epsilon);
    }

    #[test]
    fn fit_moves_weights_and_replicas_agree() {
        let device = Default::default();
        let data = make_data(DATA_SIZE, &mut StdRng::seed_from_u64(11));
        let config = TrainingConfig::new().with_epochs(1).with_shuffle(false);
        let init = SequenceClassifierConfig::new().init::<B>(&device);
        let (x, _) = data.full_batch::<NdArray>(&device);

        let before: Vec<f32> = init.valid().predict(x.clone()).into_data().to_vec().unwrap();
        let (single, _) = fit(
            init.clone(),
            &data,
            &DistributionStrategy::single_replica(),
            &config,
            &device,
        )
        .unwrap();
        let (sharded, _) = fit(
            init,
            &data,
            &DistributionStrategy::replicated(8).unwrap(),
            &config,
            &device,
        )
        .unwrap();

        let single: Vec<f32> = single.valid().predict(x.clone()).into_data().to_vec().unwrap();
        let sharded: Vec<f32> = sharded.valid().predict(x).into_data().to_vec().unwrap();
        let moved = before
            .iter()
            .zip(&single)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f32, f32::max);
        let drift = single
            .iter()
            .zip(&sharded)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f32, f32::max);
        assert!(moved > 1e-4, "one epoch left predictions unchanged");
        assert!(drift < 1e-4, "replicated fit drifted by {drift}");
    }

    #[test]
    fn fit_runs_every_epoch() {
        let device = Default::default();
        let model = SequenceClassifierConfig::new().init::<B>(&device);
        let data = make_data(DATA_SIZE, &mut StdRng::seed_from_u64(5));
        let config = TrainingConfig::new();

        let (_model, history) = fit(
            model,
            &data,
            &DistributionStrategy::single_replica(),
            &config,
            &device,
        )
        .unwrap();

        assert_eq!(history.epochs.len(), 3);
        for epoch in &history.epochs {
            assert_eq!(epoch.num_samples, DATA_SIZE);
            assert!(epoch.loss.is_finite());
            assert!(epoch.loss > 0.0, "loss should be positive");
        }
        assert_eq!(history.final_loss(), Some(history.epochs[2].loss));
    }

    #[test]
    fn fit_replicated_over_cores() {
        let device = Default::default();
        let model = SequenceClassifierConfig::new().init::<B>(&device);
        let data = make_data(DATA_SIZE, &mut StdRng::seed_from_u64(6));
        let config = TrainingConfig::new().with_epochs(1);
        let strategy = DistributionStrategy::replicated(8).unwrap();

        let (_model, history) = fit(model, &data, &strategy, &config, &device).unwrap();
        assert!(history.final_loss().unwrap().is_finite());
    }

    #[test]
    fn fit_rejects_indivisible_data() {
        let device = Default::default();
        let model = SequenceClassifierConfig::new().init::<B>(&device);
        let data = make_data(100, &mut StdRng::seed_from_u64(6));
        let strategy = DistributionStrategy::replicated(8).unwrap();

        let result = fit(model, &data, &strategy, &TrainingConfig::new(), &device);
        assert!(matches!(result, Err(Error::UnevenShards { .. })));
    }

    #[test]
    fn fit_rejects_zero_batch() {
        let device = Default::default();
        let model = SequenceClassifierConfig::new().init::<B>(&device);
        let data = make_data(8, &mut StdRng::seed_from_u64(6));
        let config = TrainingConfig::new().with_batch_size(0);

        let result = fit(
            model,
            &data,
            &DistributionStrategy::single_replica(),
            &config,
            &device,
        );
        assert!(matches!(result, Err(Error::InvalidBatchSize)));
    }

    #[test]
    fn short_last_batch_is_weighted() {
        let device = Default::default();
        let model = SequenceClassifierConfig::new().init::<B>(&device);
        let data = make_data(10, &mut StdRng::seed_from_u64(8));
        let config = TrainingConfig::new().with_batch_size(4);
        let mut optimizer = create_optimizer::<B>(&config);
        let indices: Vec<usize> = (0..10).collect();

        let (_model, result) = train_epoch(
            model,
            &data,
            &indices,
            &DistributionStrategy::single_replica(),
            &mut optimizer,
            &config,
            &device,
        );
        assert_eq!(result.num_samples, 10);
        assert!(result.loss.is_finite());
    }

    #[test]
    fn evaluate_reports_probability_metrics() {
        let device = Default::default();
        let model = SequenceClassifierConfig::new().init::<B>(&device).valid();
        let data = make_data(32, &mut StdRng::seed_from_u64(9));

        let eval = evaluate(&model, &data, &device);
        assert!(eval.loss.is_finite() && eval.loss > 0.0);
        assert!((0.0..=1.0).contains(&eval.accuracy));
    }
}
