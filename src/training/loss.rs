use burn::prelude::*;

/// Keeps `ln` finite when a prediction saturates at 0 or 1.
pub const LOG_LOSS_EPSILON: f32 = 1e-7;

/// Log loss (binary cross-entropy on probabilities).
///
/// `-mean(y·ln(p + ε) + (1 - y)·ln(1 - p + ε))`
///
/// predictions, labels: [batch, 1]
pub fn log_loss<B: Backend>(predictions: Tensor<B, 2>, labels: Tensor<B, 2>) -> Tensor<B, 1> {
    let positive = labels.clone() * predictions.clone().add_scalar(LOG_LOSS_EPSILON).log();
    let negative = labels.neg().add_scalar(1.0)
        * predictions
            .neg()
            .add_scalar(1.0 + LOG_LOSS_EPSILON)
            .log();
    (positive + negative).mean().neg()
}
