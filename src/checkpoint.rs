//! Model persistence.
//!
//! Weights use burn's named MessagePack record at full precision, written
//! to `<dir>/model.hd5`. The architecture config sits beside it as
//! `<dir>/model.json` so the model can be rebuilt before loading.

use std::path::{Path, PathBuf};

use burn::config::Config;
use burn::module::Module;
use burn::prelude::*;
use burn::record::{FullPrecisionSettings, NamedMpkBytesRecorder, Recorder};

use crate::error::{Error, Result};
use crate::model::{SequenceClassifier, SequenceClassifierConfig};

/// Weights file name inside the model directory.
pub const MODEL_FILE: &str = "model.hd5";

/// Architecture file name inside the model directory.
pub const CONFIG_FILE: &str = "model.json";

type ModelRecorder = NamedMpkBytesRecorder<FullPrecisionSettings>;

/// Save weights and architecture into `dir`, creating it if needed.
///
/// Returns the path of the weights file.
pub fn save_model<B: Backend>(
    model: &SequenceClassifier<B>,
    config: &SequenceClassifierConfig,
    dir: &Path,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| Error::io("create", dir, e))?;

    let path = dir.join(MODEL_FILE);
    let recorder = ModelRecorder::default();
    let bytes = Recorder::<B>::record(&recorder, model.clone().into_record(), ()).map_err(
        |e| Error::Record {
            path: path.clone(),
            message: e.to_string(),
        },
    )?;
    std::fs::write(&path, bytes).map_err(|e| Error::io("write", &path, e))?;

    let config_path = dir.join(CONFIG_FILE);
    config
        .save(&config_path)
        .map_err(|e| Error::io("write", &config_path, e))?;

    tracing::info!(path = %path.display(), params = model.num_params(), "saved model");
    Ok(path)
}

/// Rebuild the model saved in `dir` on `device`.
pub fn load_model<B: Backend>(dir: &Path, device: &B::Device) -> Result<SequenceClassifier<B>> {
    let config_path = dir.join(CONFIG_FILE);
    let config = SequenceClassifierConfig::load(&config_path).map_err(|e| Error::Config {
        path: config_path.clone(),
        message: e.to_string(),
    })?;

    let path = dir.join(MODEL_FILE);
    let bytes = std::fs::read(&path).map_err(|e| Error::io("read", &path, e))?;
    let recorder = ModelRecorder::default();
    let record: <SequenceClassifier<B> as Module<B>>::Record =
        Recorder::<B>::load(&recorder, bytes, device).map_err(|e| Error::Record {
            path: path.clone(),
            message: e.to_string(),
        })?;

    Ok(config.init::<B>(device).load_record(record))
}
