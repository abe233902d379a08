//! Data models for satview.

mod imagery;
mod layer;

pub use imagery::{Coordinates, ErrorPayload, ImageryResult, LayerPaths};
pub use layer::{Channel, IndexFormula, LayerKind, Rgb, UnknownLayer};
