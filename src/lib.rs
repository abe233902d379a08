//! satview - satellite imagery inspection engine
//!
//! Client-side core of a satellite imagery portal: a session store that
//! caches imagery results per queried location and keeps a short recent
//! history, and a sampler that reads approximate NDVI/NDBI values back out
//! of the rendered false-color layers under the pointer.

pub mod config;
pub mod constants;
pub mod fetch;
pub mod history;
pub mod model;
pub mod navigation;
pub mod raster;
pub mod sampler;
pub mod state;

pub use config::AppConfig;
pub use fetch::{HttpImageryClient, ImageryFetcher, QueryError};
pub use history::{HistoryStore, MemoryHistoryStore, RecentHistory};
pub use model::{ImageryResult, LayerKind};
pub use navigation::LayerNavigator;
pub use raster::{RasterCache, RasterError};
pub use sampler::{PixelBuffer, PixelSample, Viewport};
pub use state::{QueryOutcome, SessionState};

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
