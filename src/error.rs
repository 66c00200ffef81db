use std::path::PathBuf;

use thiserror::Error;

use crate::accel::ACCELERATOR_ADDR_ENV;

/// Everything that can stop a training run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("accelerator requested but no address given (pass --accelerator or set {})", ACCELERATOR_ADDR_ENV)]
    MissingAcceleratorAddress,

    #[error("invalid accelerator address '{address}': {reason}")]
    InvalidAcceleratorAddress { address: String, reason: String },

    #[error("no {kind} accelerator at index {index} ({available} available)")]
    AcceleratorNotFound {
        kind: String,
        index: usize,
        available: usize,
    },

    #[error(
        "model expects [{seq_len}, {num_features}] sequences but the data is [{data_seq_len}, {data_num_features}]"
    )]
    InputShapeMismatch {
        seq_len: usize,
        num_features: usize,
        data_seq_len: usize,
        data_num_features: usize,
    },

    #[error("core count must be at least 1")]
    InvalidCoreCount,

    #[error("batch size must be at least 1")]
    InvalidBatchSize,

    #[error("{count} {what} cannot be split evenly across {cores} cores")]
    UnevenShards {
        what: &'static str,
        count: usize,
        cores: usize,
    },

    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model record {}: {message}", .path.display())]
    Record { path: PathBuf, message: String },

    #[error("model config {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}

impl Error {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
