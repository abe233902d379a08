//! Rendered layer retrieval and decoding.
//!
//! Layer PNGs must be downloaded and decoded before the sampler can read
//! them. Decoded buffers are kept per (location, layer) in a [`RasterCache`];
//! a layer without a decoded buffer is simply not ready for sampling yet.

use async_trait::async_trait;
use reqwest::Url;
use std::collections::HashMap;
use thiserror::Error;

use crate::model::{ImageryResult, LayerKind};
use crate::sampler::{self, PixelBuffer, PixelSample, Viewport};

/// Errors that can occur while loading a rendered layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    /// Layer path could not be resolved against the backend origin
    #[error("Invalid layer URL '{path}': {message}")]
    InvalidUrl { path: String, message: String },

    /// Download failed
    #[error("Failed to fetch layer image: {0}")]
    Fetch(String),

    /// Image bytes could not be decoded
    #[error("Failed to decode layer image: {0}")]
    Decode(String),

    /// Raw pixel data does not match the stated dimensions
    #[error("Pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

/// Source of raw layer image bytes.
#[async_trait(?Send)]
pub trait RasterSource {
    /// Download the bytes at `url`.
    async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>, RasterError>;
}

/// Resolve a backend-relative path (layer PNG or GeoTIFF) against the origin.
///
/// The path is appended to the origin, so a path prefix on the origin is kept.
pub fn resolve_asset_url(origin: &Url, path: &str) -> Result<Url, RasterError> {
    append_path(origin, path).map_err(|message| RasterError::InvalidUrl {
        path: path.to_string(),
        message,
    })
}

/// Append `path` to the origin's path, with exactly one `/` between them.
pub(crate) fn append_path(origin: &Url, path: &str) -> Result<Url, String> {
    let mut base = origin.clone();
    base.set_query(None);
    base.set_fragment(None);
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| e.to_string())
}

/// Decode PNG (or any format enabled on `image`) bytes into RGBA8 pixels.
pub fn decode_layer(bytes: &[u8]) -> Result<PixelBuffer, RasterError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| RasterError::Decode(e.to_string()))?
        .to_rgba8();
    let buffer = PixelBuffer::from_rgba_image(img);
    log::trace!(
        "Decoded layer image: {}x{}",
        buffer.width(),
        buffer.height()
    );
    Ok(buffer)
}

/// Download and decode one layer of a result.
pub async fn load_layer<S: RasterSource + ?Sized>(
    source: &S,
    origin: &Url,
    result: &ImageryResult,
    layer: LayerKind,
) -> Result<PixelBuffer, RasterError> {
    let url = resolve_asset_url(origin, result.layer_path(layer))?;
    let bytes = source.fetch_bytes(&url).await?;
    let buffer = decode_layer(&bytes)?;
    log::info!(
        "🖼️ Loaded {} layer for '{}': {}x{}",
        layer,
        result.location,
        buffer.width(),
        buffer.height()
    );
    Ok(buffer)
}

/// Decoded layer buffers keyed by location and layer.
#[derive(Debug, Default)]
pub struct RasterCache {
    buffers: HashMap<(String, LayerKind), PixelBuffer>,
}

impl RasterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a decoded buffer.
    pub fn insert(&mut self, location: &str, layer: LayerKind, buffer: PixelBuffer) {
        self.buffers.insert((location.to_string(), layer), buffer);
    }

    /// Decoded buffer for a layer, if it has finished loading.
    pub fn get(&self, location: &str, layer: LayerKind) -> Option<&PixelBuffer> {
        self.buffers.get(&(location.to_string(), layer))
    }

    /// Whether a layer can be sampled.
    pub fn is_ready(&self, location: &str, layer: LayerKind) -> bool {
        self.buffers.contains_key(&(location.to_string(), layer))
    }

    /// Sample a layer, or None while its image is still loading.
    pub fn sample(
        &self,
        location: &str,
        layer: LayerKind,
        viewport: &Viewport,
        pointer_x: f64,
        pointer_y: f64,
    ) -> Option<PixelSample> {
        self.get(location, layer)
            .map(|buffer| sampler::sample(buffer, layer, viewport, pointer_x, pointer_y))
    }

    /// Download and decode a layer unless it is already cached.
    pub async fn ensure_loaded<S: RasterSource + ?Sized>(
        &mut self,
        source: &S,
        origin: &Url,
        location: &str,
        result: &ImageryResult,
        layer: LayerKind,
    ) -> Result<&PixelBuffer, RasterError> {
        let key = (location.to_string(), layer);
        if !self.buffers.contains_key(&key) {
            let buffer = load_layer(source, origin, result, layer).await?;
            self.buffers.insert(key.clone(), buffer);
        }
        self.buffers
            .get(&key)
            .ok_or_else(|| RasterError::Decode("layer buffer missing after load".to_string()))
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffers.clear();
    }
}
