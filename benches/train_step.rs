//! Host-side cost of the template's hot paths.
//!
//! 1. Forward pass over the full synthetic dataset
//! 2. One training epoch (4 batches of 32)
//! 3. One epoch with the batch sharded over 8 replicas

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use burn::backend::{Autodiff, NdArray};
use rand::rngs::StdRng;
use rand::SeedableRng;

use lstm_template::accel::DistributionStrategy;
use lstm_template::data::{make_data, DATA_SIZE};
use lstm_template::model::SequenceClassifierConfig;
use lstm_template::training::{create_optimizer, train_epoch, TrainingConfig};

type B = NdArray;
type AB = Autodiff<NdArray>;

fn bench_forward(c: &mut Criterion) {
    let device = Default::default();
    let model = SequenceClassifierConfig::new().init::<B>(&device);
    let data = make_data(DATA_SIZE, &mut StdRng::seed_from_u64(0));
    let (x, _) = data.full_batch::<B>(&device);

    c.bench_function("forward_128", |b| {
        b.iter(|| model.forward(black_box(x.clone())))
    });
}

fn bench_epoch(c: &mut Criterion) {
    let device = Default::default();
    let data = make_data(DATA_SIZE, &mut StdRng::seed_from_u64(0));
    let config = TrainingConfig::new();
    let indices: Vec<usize> = (0..DATA_SIZE).collect();

    let mut group = c.benchmark_group("epoch");
    group.sample_size(20);
    for (name, strategy) in [
        ("single_replica", DistributionStrategy::single_replica()),
        ("8_replicas", DistributionStrategy::replicated(8).unwrap()),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let model = SequenceClassifierConfig::new().init::<AB>(&device);
                let mut optimizer = create_optimizer::<AB>(&config);
                train_epoch(
                    model,
                    &data,
                    &indices,
                    &strategy,
                    &mut optimizer,
                    &config,
                    &device,
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_forward, bench_epoch);
criterion_main!(benches);
