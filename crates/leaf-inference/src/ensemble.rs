//! Ensemble of classifiers combined by unweighted averaging.
//!
//! Every member sees the same preprocessed tensor; the ensemble output is the
//! element-wise arithmetic mean of the member outputs. No confidence
//! weighting and no voting.

use std::sync::Arc;

use tracing::debug;

use crate::error::{InferenceError, InferenceResult};
use crate::model::{ClassifierModel, InputSpec};
use crate::preprocess::ImageTensor;

/// Fixed set of models sharing one input spec.
pub struct Ensemble {
    name: String,
    input: InputSpec,
    members: Vec<Arc<dyn ClassifierModel>>,
}

impl Ensemble {
    /// Build an ensemble. All members must accept the same input tensor.
    pub fn new(members: Vec<Arc<dyn ClassifierModel>>) -> InferenceResult<Self> {
        let first = members
            .first()
            .ok_or_else(|| InferenceError::model_not_found("ensemble has no members"))?;
        let input = first.input().clone();

        if let Some(odd) = members.iter().find(|m| !m.input().compatible_with(&input)) {
            return Err(InferenceError::model_load(
                odd.name(),
                format!(
                    "input shape {:?} differs from ensemble input {:?}",
                    odd.input().shape,
                    input.shape
                ),
            ));
        }

        let name = format!("ensemble[{}]", members.len());
        Ok(Self {
            name,
            input,
            members,
        })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Arc<dyn ClassifierModel>] {
        &self.members
    }
}

impl ClassifierModel for Ensemble {
    fn name(&self) -> &str {
        &self.name
    }

    fn input(&self) -> &InputSpec {
        &self.input
    }

    fn forward(&self, input: &ImageTensor) -> InferenceResult<Vec<f32>> {
        let outputs = self
            .members
            .iter()
            .map(|member| member.forward(input))
            .collect::<InferenceResult<Vec<_>>>()?;

        debug!(members = outputs.len(), "Averaging ensemble outputs");
        average_outputs(&outputs)
    }

    fn member_count(&self) -> usize {
        self.members.len()
    }

    fn output_len(&self) -> Option<usize> {
        self.members.first().and_then(|m| m.output_len())
    }

    fn output_name(&self) -> Option<&str> {
        self.members.first().and_then(|m| m.output_name())
    }
}

/// Element-wise arithmetic mean of equal-length vectors.
pub fn average_outputs(outputs: &[Vec<f32>]) -> InferenceResult<Vec<f32>> {
    let first = outputs.first().ok_or(InferenceError::EmptyOutput)?;
    let len = first.len();
    if len == 0 {
        return Err(InferenceError::EmptyOutput);
    }

    let mut sum = vec![0.0f32; len];
    for output in outputs {
        if output.len() != len {
            return Err(InferenceError::OutputMismatch {
                expected: len,
                actual: output.len(),
            });
        }
        for (acc, v) in sum.iter_mut().zip(output) {
            *acc += *v;
        }
    }

    let n = outputs.len() as f32;
    Ok(sum.into_iter().map(|s| s / n).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};
    use leaf_models::Normalization;

    use crate::preprocess::{preprocess_image, TargetSize};
    use crate::resolver::argmax;

    struct FixedModel {
        input: InputSpec,
        output: Vec<f32>,
    }

    impl FixedModel {
        fn arc(input: InputSpec, output: Vec<f32>) -> Arc<dyn ClassifierModel> {
            Arc::new(Self { input, output })
        }
    }

    impl ClassifierModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        fn input(&self) -> &InputSpec {
            &self.input
        }

        fn forward(&self, input: &ImageTensor) -> InferenceResult<Vec<f32>> {
            self.input.check(input)?;
            Ok(self.output.clone())
        }
    }

    fn tensor() -> ImageTensor {
        let img = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        preprocess_image(&img, TargetSize::square(4), Normalization::None).unwrap()
    }

    #[test]
    fn test_average_two_models() {
        let ensemble = Ensemble::new(vec![
            FixedModel::arc(InputSpec::nhwc(4, 4), vec![1.0, 0.0, 0.0]),
            FixedModel::arc(InputSpec::nhwc(4, 4), vec![0.0, 1.0, 0.0]),
        ])
        .unwrap();

        let avg = ensemble.forward(&tensor()).unwrap();
        assert_eq!(avg, vec![0.5, 0.5, 0.0]);
        // Tie between 0 and 1 resolves to the first index.
        assert_eq!(argmax(&avg), Some((0, 0.5)));
        assert_eq!(ensemble.member_count(), 2);
    }

    #[test]
    fn test_average_outputs_pure() {
        let avg = average_outputs(&[vec![2.0, 4.0], vec![4.0, 0.0], vec![0.0, 2.0]]).unwrap();
        assert_eq!(avg, vec![2.0, 2.0]);

        let single = average_outputs(&[vec![0.3, 0.7]]).unwrap();
        assert_eq!(single, vec![0.3, 0.7]);
    }

    #[test]
    fn test_average_rejects_mismatch() {
        let err = average_outputs(&[vec![1.0, 2.0], vec![1.0]]).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::OutputMismatch {
                expected: 2,
                actual: 1
            }
        ));
        assert!(matches!(average_outputs(&[]), Err(InferenceError::EmptyOutput)));
    }

    #[test]
    fn test_members_must_share_input() {
        let result = Ensemble::new(vec![
            FixedModel::arc(InputSpec::nhwc(4, 4), vec![1.0]),
            FixedModel::arc(InputSpec::nhwc(8, 8), vec![1.0]),
        ]);
        assert!(matches!(result, Err(InferenceError::ModelLoad { .. })));

        assert!(Ensemble::new(Vec::new()).is_err());
    }

    #[test]
    fn test_member_failure_propagates() {
        let ensemble = Ensemble::new(vec![
            FixedModel::arc(InputSpec::nhwc(8, 8), vec![1.0]),
            FixedModel::arc(InputSpec::nhwc(8, 8), vec![1.0]),
        ])
        .unwrap();

        let err = ensemble.forward(&tensor()).unwrap_err();
        assert!(matches!(err, InferenceError::ShapeMismatch { .. }));
    }
}
