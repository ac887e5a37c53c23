//! Arg-max label resolution.

use leaf_models::Prediction;
use tracing::warn;

use crate::error::{InferenceError, InferenceResult};
use crate::labels::ClassLabelTable;

/// Index and value of the largest score.
///
/// Ties go to the lowest index. NaN never wins; an empty or all-NaN vector
/// yields `None`.
pub fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in scores.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best
}

/// Resolve a score vector to a labelled prediction.
///
/// The confidence is the raw maximum score. An index past the end of the
/// table resolves to "Unknown".
pub fn resolve(scores: &[f32], labels: &ClassLabelTable) -> InferenceResult<Prediction> {
    let (index, confidence) = argmax(scores).ok_or(InferenceError::EmptyOutput)?;

    let label = labels.label_for(index);
    if labels.get(index).is_none() {
        warn!(
            index,
            labels = labels.len(),
            "Predicted index outside label table"
        );
    }

    Ok(Prediction::new(index, label, confidence))
}
