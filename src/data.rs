//! Synthetic training data.
//!
//! Uniform random sequences with uniform random binary labels. There is
//! nothing to learn; the data only exists to drive the fit loop.

use burn::prelude::*;
use rand::Rng;

/// Samples per run. Must stay divisible by the accelerator core count.
pub const DATA_SIZE: usize = 128;

/// Time steps per sequence.
pub const SEQ_LEN: usize = 5;

/// Features per time step.
pub const NUM_FEATURES: usize = 3;

const SAMPLE_LEN: usize = SEQ_LEN * NUM_FEATURES;

/// Host-side sequences and labels, row-major.
#[derive(Debug, Clone)]
pub struct SyntheticData {
    sequences: Vec<f32>,
    labels: Vec<f32>,
}

/// Generate `size` random sequences in `[0, 1)` and labels in `{0, 1}`.
pub fn make_data<R: Rng + ?Sized>(size: usize, rng: &mut R) -> SyntheticData {
    let sequences = (0..size * SAMPLE_LEN).map(|_| rng.gen::<f32>()).collect();
    let labels = (0..size).map(|_| rng.gen_range(0..2u8) as f32).collect();
    SyntheticData { sequences, labels }
}

impl SyntheticData {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[f32] {
        &self.labels
    }

    /// Feature values of sample `index`, `SEQ_LEN * NUM_FEATURES` long.
    pub fn sequence(&self, index: usize) -> &[f32] {
        &self.sequences[index * SAMPLE_LEN..(index + 1) * SAMPLE_LEN]
    }

    /// Gather the selected samples into tensors.
    ///
    /// Returns: (sequences [n, SEQ_LEN, NUM_FEATURES], labels [n, 1])
    pub fn batch<B: Backend>(
        &self,
        indices: &[usize],
        device: &B::Device,
    ) -> (Tensor<B, 3>, Tensor<B, 2>) {
        let n = indices.len();
        let mut seq_data = Vec::with_capacity(n * SAMPLE_LEN);
        let mut label_data = Vec::with_capacity(n);
        for &i in indices {
            seq_data.extend_from_slice(self.sequence(i));
            label_data.push(self.labels[i]);
        }
        (
            Tensor::from_data(TensorData::new(seq_data, [n, SEQ_LEN, NUM_FEATURES]), device),
            Tensor::from_data(TensorData::new(label_data, [n, 1]), device),
        )
    }

    /// The whole dataset as one batch.
    pub fn full_batch<B: Backend>(&self, device: &B::Device) -> (Tensor<B, 3>, Tensor<B, 2>) {
        let indices: Vec<usize> = (0..self.len()).collect();
        self.batch(&indices, device)
    }
}
