//! Classifier model loading and single-model inference.
//!
//! Models are ONNX graphs with one image input and one score output. The
//! input may be declared channels-last `(1, H, W, 3)` or channels-first
//! `(1, 3, H, W)`; preprocessing always produces channels-last and the tensor
//! is reordered at bind time.
//!
//! Model sources are either a plain path or a glob such as
//! `models/best_swin_fold*.onnx`. Glob matches load in sorted order.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ort::execution_providers::ExecutionProviderDispatch;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};
use tracing::{debug, info, warn};

use crate::ensemble::Ensemble;
use crate::error::{InferenceError, InferenceResult};
use crate::preprocess::{ImageTensor, TargetSize};

/// Spatial size assumed when a model declares dynamic height/width.
pub const DEFAULT_INPUT_SIDE: u32 = 224;

/// Memory layout of a model's image input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorLayout {
    /// (batch, height, width, channels)
    Nhwc,
    /// (batch, channels, height, width)
    Nchw,
}

impl TensorLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            TensorLayout::Nhwc => "nhwc",
            TensorLayout::Nchw => "nchw",
        }
    }
}

/// Declared image input of a model. Dynamic dimensions are `-1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
    pub name: String,
    pub shape: Vec<i64>,
    pub layout: TensorLayout,
}

impl InputSpec {
    /// Build from a declared shape, inferring the layout from where the
    /// 3-channel dimension sits.
    pub fn from_shape(name: impl Into<String>, shape: Vec<i64>) -> Result<Self, String> {
        if shape.len() != 4 {
            return Err(format!("expected a 4-D image input, got {:?}", shape));
        }

        let layout = if shape[3] == 3 {
            TensorLayout::Nhwc
        } else if shape[1] == 3 {
            TensorLayout::Nchw
        } else {
            return Err(format!("no 3-channel dimension in input shape {:?}", shape));
        };

        Ok(Self {
            name: name.into(),
            shape,
            layout,
        })
    }

    /// Channels-last spec with a fixed spatial size.
    pub fn nhwc(height: u32, width: u32) -> Self {
        Self {
            name: "input".to_string(),
            shape: vec![1, height as i64, width as i64, 3],
            layout: TensorLayout::Nhwc,
        }
    }

    /// Channels-first spec with a fixed spatial size.
    pub fn nchw(height: u32, width: u32) -> Self {
        Self {
            name: "input".to_string(),
            shape: vec![1, 3, height as i64, width as i64],
            layout: TensorLayout::Nchw,
        }
    }

    /// Declared (height, width), `-1` when dynamic.
    fn spatial(&self) -> (i64, i64) {
        match self.layout {
            TensorLayout::Nhwc => (self.shape[1], self.shape[2]),
            TensorLayout::Nchw => (self.shape[2], self.shape[3]),
        }
    }

    /// Resize target for this input.
    pub fn target_size(&self) -> TargetSize {
        let (h, w) = self.spatial();
        let side = |d: i64| {
            if d > 0 {
                d as u32
            } else {
                DEFAULT_INPUT_SIDE
            }
        };
        TargetSize::new(side(h), side(w))
    }

    /// Declared shape expressed in NHWC order.
    pub fn nhwc_shape(&self) -> [i64; 4] {
        let (h, w) = self.spatial();
        let batch = self.shape[0];
        [batch, h, w, 3]
    }

    /// Verify a preprocessed tensor fits this input. `-1` matches any size.
    pub fn check(&self, tensor: &ImageTensor) -> InferenceResult<()> {
        let expected = self.nhwc_shape();
        let actual = tensor.shape();
        let fits = expected
            .iter()
            .zip(actual.iter())
            .all(|(&e, &a)| e < 0 || e as usize == a);

        if fits {
            Ok(())
        } else {
            Err(InferenceError::ShapeMismatch {
                expected: self.shape.clone(),
                actual: actual.to_vec(),
            })
        }
    }

    /// Shape of the bound tensor in this input's layout.
    fn bound_shape(&self, tensor: &ImageTensor) -> Vec<usize> {
        let [b, h, w, c] = tensor.shape();
        match self.layout {
            TensorLayout::Nhwc => vec![b, h, w, c],
            TensorLayout::Nchw => vec![b, c, h, w],
        }
    }

    /// True when both specs accept the same tensors.
    pub fn compatible_with(&self, other: &InputSpec) -> bool {
        self.shape == other.shape && self.layout == other.layout
    }
}

/// A loaded classifier: one forward pass from image tensor to score vector.
///
/// Implementations are immutable after load and shared read-only across
/// requests.
pub trait ClassifierModel: Send + Sync {
    /// Human-readable identifier for logs.
    fn name(&self) -> &str;

    /// Declared image input.
    fn input(&self) -> &InputSpec;

    /// Run one forward pass, returning the scores of the single batch row.
    fn forward(&self, input: &ImageTensor) -> InferenceResult<Vec<f32>>;

    /// Number of underlying models.
    fn member_count(&self) -> usize {
        1
    }

    /// Output vector length when statically known.
    fn output_len(&self) -> Option<usize> {
        None
    }

    /// Name of the output tensor read after the forward pass.
    fn output_name(&self) -> Option<&str> {
        None
    }
}

/// ONNX Runtime-backed classifier.
pub struct OrtClassifier {
    name: String,
    session: Mutex<Session>,
    input: InputSpec,
    output_name: String,
    output_len: Option<usize>,
}

impl OrtClassifier {
    /// Load a model file and read its input/output metadata.
    pub fn load(model_path: &Path) -> InferenceResult<Self> {
        if !model_path.exists() {
            return Err(InferenceError::model_not_found(model_path.display().to_string()));
        }

        let session = create_session(model_path)?;

        let first_input = session
            .inputs
            .first()
            .ok_or_else(|| InferenceError::model_load(model_path, "model declares no inputs"))?;
        let input_shape: Vec<i64> = first_input
            .input_type
            .tensor_shape()
            .ok_or_else(|| InferenceError::model_load(model_path, "first input is not a tensor"))?
            .iter()
            .copied()
            .collect();
        let input = InputSpec::from_shape(first_input.name.clone(), input_shape)
            .map_err(|msg| InferenceError::model_load(model_path, msg))?;

        let first_output = session
            .outputs
            .first()
            .ok_or_else(|| InferenceError::model_load(model_path, "model declares no outputs"))?;
        let output_name = first_output.name.clone();
        let output_len = first_output
            .output_type
            .tensor_shape()
            .and_then(|shape| shape.last().copied())
            .filter(|&d| d > 0)
            .map(|d| d as usize);

        if input.shape.iter().skip(1).any(|&d| d < 0) {
            warn!(
                model = %model_path.display(),
                shape = ?input.shape,
                "Model declares dynamic spatial dimensions, resizing to {}x{}",
                DEFAULT_INPUT_SIDE,
                DEFAULT_INPUT_SIDE
            );
        }

        info!(
            model = %model_path.display(),
            input = %input.name,
            input_shape = ?input.shape,
            layout = input.layout.as_str(),
            output = %output_name,
            output_len = ?output_len,
            "Classifier model loaded"
        );

        Ok(Self {
            name: model_path.display().to_string(),
            session: Mutex::new(session),
            input,
            output_name,
            output_len,
        })
    }

    fn to_value(&self, tensor: &ImageTensor) -> InferenceResult<Value> {
        let shape = self.input.bound_shape(tensor);
        let data = match self.input.layout {
            TensorLayout::Nhwc => tensor.to_nhwc_vec(),
            TensorLayout::Nchw => tensor.to_nchw_vec(),
        };

        Tensor::from_array((shape, data.into_boxed_slice()))
            .map(Value::from)
            .map_err(|e| InferenceError::inference(format!("Failed to create tensor: {}", e)))
    }
}

impl ClassifierModel for OrtClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn input(&self) -> &InputSpec {
        &self.input
    }

    fn forward(&self, input: &ImageTensor) -> InferenceResult<Vec<f32>> {
        self.input.check(input)?;
        let value = self.to_value(input)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::inference("Session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![value])
            .map_err(|e| InferenceError::inference(format!("ONNX inference failed: {}", e)))?;

        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            InferenceError::inference(format!("Missing {} tensor", self.output_name))
        })?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::inference(format!("Failed to extract tensor: {}", e)))?;

        debug!(model = %self.name, output_shape = ?shape, "Forward pass complete");

        if data.is_empty() {
            return Err(InferenceError::EmptyOutput);
        }
        Ok(data.to_vec())
    }

    fn output_len(&self) -> Option<usize> {
        self.output_len
    }

    fn output_name(&self) -> Option<&str> {
        Some(&self.output_name)
    }
}

/// Build a session, preferring a hardware execution provider when one is
/// compiled in and usable, else the CPU.
fn create_session(model_path: &Path) -> InferenceResult<Session> {
    let model_bytes = std::fs::read(model_path)?;

    let builder = Session::builder()
        .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
        .map_err(|e| InferenceError::model_load(model_path, format!("session builder: {}", e)))?;

    for (provider, dispatch) in accelerated_providers() {
        let attempt = builder
            .clone()
            .with_execution_providers([dispatch])
            .and_then(|b| b.commit_from_memory(&model_bytes));
        match attempt {
            Ok(session) => {
                info!(model = %model_path.display(), provider, "Session created");
                return Ok(session);
            }
            Err(e) => debug!(provider, error = %e, "Execution provider unusable, falling back"),
        }
    }

    let session = builder
        .commit_from_memory(&model_bytes)
        .map_err(|e| InferenceError::model_load(model_path, format!("invalid model: {}", e)))?;
    info!(model = %model_path.display(), provider = "cpu", "Session created");
    Ok(session)
}

/// Hardware providers to try, in order. CUDA needs the `cuda` feature.
fn accelerated_providers() -> Vec<(&'static str, ExecutionProviderDispatch)> {
    #[allow(unused_mut)]
    let mut providers = Vec::new();

    #[cfg(all(target_os = "linux", feature = "cuda"))]
    providers.push((
        "cuda",
        ort::execution_providers::CUDAExecutionProvider::default().build(),
    ));

    #[cfg(target_os = "macos")]
    providers.push((
        "coreml",
        ort::execution_providers::CoreMLExecutionProvider::default().build(),
    ));

    providers
}

/// Resolve a path or glob to existing model files, sorted.
pub fn discover_model_paths(source: &str) -> InferenceResult<Vec<PathBuf>> {
    let entries = glob::glob(source)
        .map_err(|e| InferenceError::model_not_found(format!("{}: {}", source, e)))?;

    let mut matches: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();
    matches.sort();

    if matches.is_empty() {
        return Err(InferenceError::model_not_found(source));
    }
    Ok(matches)
}

/// Load every model matched by `source`.
pub fn load_models(source: &str) -> InferenceResult<Vec<Arc<dyn ClassifierModel>>> {
    let paths = discover_model_paths(source)?;
    info!(source, count = paths.len(), "Loading classifier models");

    paths
        .iter()
        .map(|p| OrtClassifier::load(p).map(|m| Arc::new(m) as Arc<dyn ClassifierModel>))
        .collect()
}

/// Load `source` as one handle: the model itself, or an ensemble when the
/// source matches several files.
pub fn load_classifier(source: &str) -> InferenceResult<Arc<dyn ClassifierModel>> {
    let mut models = load_models(source)?;
    if models.len() == 1 {
        return Ok(models.remove(0));
    }
    Ok(Arc::new(Ensemble::new(models)?))
}
