//! Data-parallel distribution strategy.
//!
//! The model is replicated over `replicas` cores. Every global batch is cut
//! into equal per-replica shards, each shard is scored independently, and
//! the replica losses are averaged before one backward pass. With equal
//! shards that average has the same gradient as all-reducing the replicas'
//! gradients and dividing by the replica count.

use burn::prelude::*;

use crate::error::{Error, Result};
use crate::model::SequenceClassifier;
use crate::training::loss::log_loss;

/// Cores in the smallest accelerator slice.
pub const DEFAULT_CORES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistributionStrategy {
    replicas: usize,
}

impl DistributionStrategy {
    /// No replication: host execution.
    pub fn single_replica() -> Self {
        Self { replicas: 1 }
    }

    /// Replicate over `cores` accelerator cores.
    pub fn replicated(cores: usize) -> Result<Self> {
        if cores == 0 {
            return Err(Error::InvalidCoreCount);
        }
        Ok(Self { replicas: cores })
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Both the sample count and the global batch must split evenly
    /// across replicas; otherwise the shards would differ in size.
    pub fn check_divisible(&self, samples: usize, batch_size: usize) -> Result<()> {
        if samples % self.replicas != 0 {
            return Err(Error::UnevenShards {
                what: "samples",
                count: samples,
                cores: self.replicas,
            });
        }
        if batch_size % self.replicas != 0 {
            return Err(Error::UnevenShards {
                what: "batch rows",
                count: batch_size,
                cores: self.replicas,
            });
        }
        Ok(())
    }

    /// Mean log loss over all replica shards of one global batch.
    ///
    /// - `sequences`: [batch, seq_len, num_features]
    /// - `labels`: [batch, 1]
    pub fn replica_loss<B: Backend>(
        &self,
        model: &SequenceClassifier<B>,
        sequences: Tensor<B, 3>,
        labels: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        if self.replicas == 1 {
            return log_loss(model.forward(sequences), labels);
        }

        let losses: Vec<Tensor<B, 1>> = sequences
            .chunk(self.replicas, 0)
            .into_iter()
            .zip(labels.chunk(self.replicas, 0))
            .map(|(x, y)| log_loss(model.forward(x), y))
            .collect();
        Tensor::cat(losses, 0).mean()
    }
}
