//! Raster layer kinds and their index reconstruction formulas.
//!
//! Every queried location comes with three pre-rendered layers. The two
//! index layers are false-color renderings where a single channel encodes
//! the index linearly over a fixed visualization range, which is what lets
//! the sampler turn a pixel color back into an approximate index value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::INDEX_PRECISION;

/// One of the three raster visualizations available per location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// True-color composite
    #[default]
    Rgb,
    /// Normalized Difference Vegetation Index
    Ndvi,
    /// Normalized Difference Built-up Index
    Ndbi,
}

impl LayerKind {
    /// All layers in navigation order.
    pub const ALL: [LayerKind; 3] = [LayerKind::Rgb, LayerKind::Ndvi, LayerKind::Ndbi];

    /// Position of this layer in the navigation cycle.
    pub fn position(self) -> usize {
        match self {
            LayerKind::Rgb => 0,
            LayerKind::Ndvi => 1,
            LayerKind::Ndbi => 2,
        }
    }

    /// The layer after this one, wrapping around.
    pub fn next(self) -> LayerKind {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    /// The layer before this one, wrapping around.
    pub fn previous(self) -> LayerKind {
        let len = Self::ALL.len();
        Self::ALL[(self.position() + len - 1) % len]
    }

    /// Short lowercase identifier, as used in the backend payload.
    pub fn name(self) -> &'static str {
        match self {
            LayerKind::Rgb => "rgb",
            LayerKind::Ndvi => "ndvi",
            LayerKind::Ndbi => "ndbi",
        }
    }

    /// Label used next to an index reading ("NDVI", "NDBI").
    pub fn label(self) -> &'static str {
        match self {
            LayerKind::Rgb => "RGB",
            LayerKind::Ndvi => "NDVI",
            LayerKind::Ndbi => "NDBI",
        }
    }

    /// Title shown above a layer.
    pub fn title(self) -> &'static str {
        match self {
            LayerKind::Rgb => "RGB Composite",
            LayerKind::Ndvi => "NDVI from Sentinel-2",
            LayerKind::Ndbi => "NDBI from Sentinel-2",
        }
    }

    /// Linear formula recovering the index from a rendered pixel, if any.
    pub fn index_formula(self) -> Option<IndexFormula> {
        match self {
            LayerKind::Rgb => None,
            LayerKind::Ndvi => Some(IndexFormula {
                channel: Channel::Green,
                offset: -0.2,
                span: 1.0,
            }),
            LayerKind::Ndbi => Some(IndexFormula {
                channel: Channel::Red,
                offset: -0.5,
                span: 1.0,
            }),
        }
    }

    /// Whether this layer carries an index value.
    pub fn is_index(self) -> bool {
        self.index_formula().is_some()
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown layer name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown layer '{0}' (expected rgb, ndvi or ndbi)")]
pub struct UnknownLayer(pub String);

impl FromStr for LayerKind {
    type Err = UnknownLayer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rgb" => Ok(LayerKind::Rgb),
            "ndvi" => Ok(LayerKind::Ndvi),
            "ndbi" => Ok(LayerKind::Ndbi),
            _ => Err(UnknownLayer(s.to_string())),
        }
    }
}

/// Color channel of an RGBA pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

/// 8-bit color of a sampled pixel, alpha dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Value of a single channel.
    pub fn channel(&self, channel: Channel) -> u8 {
        match channel {
            Channel::Red => self.r,
            Channel::Green => self.g,
            Channel::Blue => self.b,
        }
    }
}

/// `index = offset + span * (channel / 255)`, rounded to two decimals.
///
/// The constants mirror the server's false-color rendering so readings are
/// reproducible for a given pixel color. They are not tunable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexFormula {
    /// Channel that encodes the index
    pub channel: Channel,
    /// Index value at channel 0
    pub offset: f64,
    /// Index range covered by channel 0..=255
    pub span: f64,
}

impl IndexFormula {
    /// Reconstruct the index value from a pixel color.
    pub fn apply(&self, color: Rgb) -> f64 {
        let raw = self.offset + self.span * (f64::from(color.channel(self.channel)) / 255.0);
        round_reading(raw)
    }

    /// Visualization range `(min, max)` covered by this formula.
    pub fn range(&self) -> (f64, f64) {
        (self.offset, self.offset + self.span)
    }
}

/// Round to two decimals, halves rounding up.
fn round_reading(value: f64) -> f64 {
    (value * INDEX_PRECISION + 0.5).floor() / INDEX_PRECISION
}
