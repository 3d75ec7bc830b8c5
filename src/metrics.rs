//! Classification error metrics

use crate::model::TreeModel;
use crate::record::LabeledExample;
use crate::{Error, Result};

/// Fraction of examples whose prediction differs from the label.
///
/// `partition` names the examples in the error raised for an empty slice
/// (e.g. `"training"` or `"validation"`).
///
/// # Errors
///
/// Returns `EmptyPartition` when `examples` is empty and `TrainingFailure`
/// when the model does not return exactly one prediction per example.
pub fn misclassification_rate<M: TreeModel + ?Sized>(
    model: &M,
    examples: &[LabeledExample],
    partition: &'static str,
) -> Result<f64> {
    if examples.is_empty() {
        return Err(Error::EmptyPartition(partition));
    }

    let predictions = model.predict_all(examples);
    if predictions.len() != examples.len() {
        return Err(Error::TrainingFailure(format!(
            "model returned {} predictions for {} {partition} examples",
            predictions.len(),
            examples.len()
        )));
    }

    let wrong = predictions
        .iter()
        .zip(examples)
        .filter(|(predicted, example)| **predicted != example.label())
        .count();

    #[allow(clippy::cast_precision_loss)]
    let rate = wrong as f64 / examples.len() as f64;
    Ok(rate)
}
