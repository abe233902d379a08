//! Imagery results returned by the generation backend.

use serde::{Deserialize, Serialize};

use super::LayerKind;

/// URL paths of the three rendered layers, relative to the backend origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerPaths {
    pub rgb: String,
    pub ndvi: String,
    pub ndbi: String,
}

impl LayerPaths {
    /// Path of the given layer.
    pub fn get(&self, layer: LayerKind) -> &str {
        match layer {
            LayerKind::Rgb => &self.rgb,
            LayerKind::Ndvi => &self.ndvi,
            LayerKind::Ndbi => &self.ndbi,
        }
    }
}

/// Geocoded point the backend resolved the location to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// One fetched response for a location. Immutable once cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageryResult {
    /// Location as echoed by the backend
    pub location: String,
    /// Capture date, opaque and server-assigned
    pub date: String,
    /// Rendered layer paths
    #[serde(rename = "png")]
    pub layers: LayerPaths,
    /// Full-resolution GeoTIFF path
    #[serde(rename = "tif_url")]
    pub download_url: String,
    /// Geocoded point, when the backend reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coords: Option<Coordinates>,
}

impl ImageryResult {
    /// Path of a rendered layer.
    pub fn layer_path(&self, layer: LayerKind) -> &str {
        self.layers.get(layer)
    }
}

/// Error body the backend returns with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(default)]
    pub detail: Option<String>,
}
