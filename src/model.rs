//! Fixed-architecture sequence classifier.
//!
//! `LSTM(3 → 10)` over a length-5 sequence; the final hidden state feeds a
//! single-unit dense layer squashed by a sigmoid, so every prediction is a
//! probability in `[0, 1]`.

use std::fmt;

use burn::config::Config;
use burn::module::Module;
use burn::nn::{Linear, LinearConfig, Lstm, LstmConfig};
use burn::prelude::*;
use burn::tensor::activation::sigmoid;

// ─── Configuration ────────────────────────────────────────────────

/// Architecture of the classifier. Saved next to the weights so a model
/// can be rebuilt without knowing how it was trained.
#[derive(Config, Debug)]
pub struct SequenceClassifierConfig {
    /// Time steps per input sequence.
    #[config(default = 5)]
    pub seq_len: usize,
    /// Features per time step.
    #[config(default = 3)]
    pub num_features: usize,
    /// LSTM units.
    #[config(default = 10)]
    pub hidden_size: usize,
}

impl SequenceClassifierConfig {
    /// Initialize the classifier on `device`.
    pub fn init<B: Backend>(&self, device: &B::Device) -> SequenceClassifier<B> {
        SequenceClassifier {
            lstm: LstmConfig::new(self.num_features, self.hidden_size, true).init(device),
            head: LinearConfig::new(self.hidden_size, 1).init(device),
            seq_len: self.seq_len,
            num_features: self.num_features,
        }
    }
}

// ─── Model ────────────────────────────────────────────────────────

#[derive(Module, Debug)]
pub struct SequenceClassifier<B: Backend> {
    lstm: Lstm<B>,
    head: Linear<B>,
    seq_len: usize,
    num_features: usize,
}

impl<B: Backend> SequenceClassifier<B> {
    /// Forward pass.
    ///
    /// - `input`: [batch, seq_len, num_features]
    ///
    /// Returns: [batch, 1] probabilities.
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
        let (_, state) = self.lstm.forward(input, None);
        sigmoid(self.head.forward(state.hidden))
    }

    /// Inference entry point; identical to [`forward`](Self::forward).
    pub fn predict(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
        self.forward(input)
    }

    /// Expected `[seq_len, num_features]` of one input sample.
    pub fn input_dims(&self) -> [usize; 2] {
        [self.seq_len, self.num_features]
    }

    /// Per-layer parameter table.
    pub fn summary(&self) -> ModelSummary {
        // Linear weights are [d_input, d_output]
        let hidden = self.head.weight.dims()[0];
        ModelSummary {
            layers: vec![
                LayerSummary {
                    name: "input",
                    output_dims: vec![self.seq_len, self.num_features],
                    params: 0,
                },
                LayerSummary {
                    name: "lstm",
                    output_dims: vec![hidden],
                    params: self.lstm.num_params(),
                },
                LayerSummary {
                    name: "dense",
                    output_dims: vec![1],
                    params: self.head.num_params(),
                },
            ],
        }
    }
}

// ─── Summary ──────────────────────────────────────────────────────

/// One row of [`ModelSummary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSummary {
    pub name: &'static str,
    /// Output shape without the batch dimension.
    pub output_dims: Vec<usize>,
    pub params: usize,
}

/// Layer table in the spirit of a Keras `model.summary()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSummary {
    pub layers: Vec<LayerSummary>,
}

impl ModelSummary {
    pub fn total_params(&self) -> usize {
        self.layers.iter().map(|l| l.params).sum()
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<8} {:<16} {:>8}", "Layer", "Output shape", "Params")?;
        for layer in &self.layers {
            let dims: Vec<String> = layer.output_dims.iter().map(|d| d.to_string()).collect();
            let shape = format!("(batch, {})", dims.join(", "));
            writeln!(f, "{:<8} {:<16} {:>8}", layer.name, shape, layer.params)?;
        }
        write!(f, "Total params: {}", self.total_params())
    }
}
