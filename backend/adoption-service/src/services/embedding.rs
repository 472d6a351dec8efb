// ============================================
// Image embedding model
// ============================================
//
// A vision transformer exported to ONNX turns an uploaded photo into a
// feature vector. The model is loaded once, on first use, behind an explicit
// shared handle: concurrent first callers wait on the same load, and a failed
// load is retried by the next caller.

use crate::config::EmbeddingConfig;
use crate::error::{AppError, Result};
use image::imageops::FilterType;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{error, info};
use tract_onnx::prelude::*;

/// ImageNet normalisation used by the ViT preprocessing pipeline
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Model output before pooling: flat data plus its shape
#[derive(Debug, Clone, PartialEq)]
pub struct RawEmbedding {
    pub data: Vec<f32>,
    pub dims: Vec<usize>,
}

/// Turns encoded image bytes into a raw model output.
///
/// Implementations are CPU bound and are called from a blocking thread.
pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, image: &[u8]) -> Result<RawEmbedding>;
}

type Plan = TypedRunnableModel<TypedModel>;

pub struct OnnxFeatureExtractor {
    plan: Plan,
    image_size: u32,
}

impl OnnxFeatureExtractor {
    pub fn load(model_path: &str, image_size: u32) -> Result<Self> {
        let start = Instant::now();
        let size = image_size as usize;

        let plan = tract_onnx::onnx()
            .model_for_path(model_path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, 3, size, size]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| {
                error!(model_path, "failed to load embedding model: {}", e);
                AppError::Internal(format!("failed to load embedding model: {}", e))
            })?;

        info!(model_path, elapsed_ms = start.elapsed().as_millis() as u64, "embedding model loaded");
        Ok(Self { plan, image_size })
    }

    fn preprocess(&self, bytes: &[u8]) -> Result<Tensor> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| AppError::BadRequest(format!("unsupported image: {}", e)))?;
        let rgb = decoded
            .resize_exact(self.image_size, self.image_size, FilterType::Triangle)
            .to_rgb8();

        let size = self.image_size as usize;
        let input = tract_ndarray::Array4::from_shape_fn((1, 3, size, size), |(_, c, y, x)| {
            let pixel = rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0;
            (pixel - MEAN[c]) / STD[c]
        });
        Ok(input.into())
    }
}

impl FeatureExtractor for OnnxFeatureExtractor {
    fn extract(&self, image: &[u8]) -> Result<RawEmbedding> {
        let input = self.preprocess(image)?;
        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| AppError::Internal(format!("embedding inference failed: {}", e)))?;

        let output = outputs
            .first()
            .ok_or_else(|| AppError::Internal("embedding model produced no output".to_string()))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| AppError::Internal(format!("unexpected embedding output: {}", e)))?;

        Ok(RawEmbedding {
            dims: view.shape().to_vec(),
            data: view.iter().copied().collect(),
        })
    }
}

/// Pool a raw output into a unit-length vector.
///
/// `[1, tokens, dim]` takes the first (class) token, `[1, dim]` the whole row.
pub fn extract_embedding(raw: &RawEmbedding) -> Result<Vec<f32>> {
    let dim = match raw.dims.as_slice() {
        [1, tokens, dim] if *tokens > 0 => *dim,
        [1, dim] => *dim,
        other => {
            return Err(AppError::Internal(format!(
                "unsupported embedding shape {:?}",
                other
            )))
        }
    };

    if dim == 0 || raw.data.len() < dim {
        return Err(AppError::Internal(format!(
            "embedding data too short for shape {:?}",
            raw.dims
        )));
    }

    Ok(l2_normalize(raw.data[..dim].to_vec()))
}

/// Scale to unit length; an all-zero vector is returned unchanged.
pub fn l2_normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|v| *v /= norm);
    }
    vector
}

type Loader = dyn Fn() -> Result<Arc<dyn FeatureExtractor>> + Send + Sync;

/// Lazily loaded, shared feature extractor
pub struct SharedModel {
    cell: OnceCell<Arc<dyn FeatureExtractor>>,
    loader: Arc<Loader>,
}

impl SharedModel {
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn FeatureExtractor>> + Send + Sync + 'static,
    {
        Self {
            cell: OnceCell::new(),
            loader: Arc::new(loader),
        }
    }

    pub fn onnx(config: &EmbeddingConfig) -> Self {
        let model_path = config.model_path.clone();
        let image_size = config.image_size;
        Self::new(move || {
            let extractor = OnnxFeatureExtractor::load(&model_path, image_size)?;
            Ok(Arc::new(extractor) as Arc<dyn FeatureExtractor>)
        })
    }

    /// Handle around an already constructed extractor
    pub fn ready(extractor: Arc<dyn FeatureExtractor>) -> Self {
        let model = Self::new(|| {
            Err(AppError::Internal(
                "preloaded model handle cannot reload".to_string(),
            ))
        });
        let _ = model.cell.set(extractor);
        model
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn get(&self) -> Result<Arc<dyn FeatureExtractor>> {
        let model = self
            .cell
            .get_or_try_init(|| async {
                let loader = Arc::clone(&self.loader);
                tokio::task::spawn_blocking(move || loader()).await?
            })
            .await?;
        Ok(Arc::clone(model))
    }

    /// Load if needed, then embed `image` on a blocking thread
    pub async fn embed(&self, image: Vec<u8>) -> Result<Vec<f32>> {
        let model = self.get().await?;
        tokio::task::spawn_blocking(move || {
            let raw = model.extract(&image)?;
            extract_embedding(&raw)
        })
        .await?
    }
}
