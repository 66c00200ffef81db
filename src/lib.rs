//! Train a tiny LSTM classifier on synthetic data and save it.
//!
//! ```ignore
//! use lstm_template::pipeline::{run, RunConfig};
//! let report = run(&RunConfig::default())?;
//! println!("saved {}", report.model_path.display());
//! ```

pub mod accel;
pub mod checkpoint;
pub mod data;
pub mod error;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod training;

pub use error::{Error, Result};
pub use pipeline::{run, RunConfig, RunReport};
