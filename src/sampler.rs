//! Pixel index sampling.
//!
//! Translates a pointer position over a rendered layer into an approximate
//! spectral index reading. The sampler only sees the 8-bit false-color PNG,
//! never the original bands, so readings are approximations of the
//! server-side index.
//!
//! Sampling never fails: positions outside the image degrade to a sample
//! with coordinates and no reading, and positions that cannot be mapped at
//! all (a collapsed viewport, NaN pointer) degrade to no coordinates either.

use crate::constants::BYTES_PER_PIXEL;
use crate::model::{LayerKind, Rgb};
use crate::raster::RasterError;

/// Decoded RGBA8 pixels of one rendered layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA8 data, checking it matches the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, RasterError> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(RasterError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Take ownership of a decoded `image` buffer.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check whether a pixel coordinate lies inside the buffer.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height)
    }

    /// Color at a pixel coordinate, or None outside the buffer.
    pub fn pixel(&self, x: i64, y: i64) -> Option<Rgb> {
        if !self.contains(x, y) {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = self.data.get(offset..offset + 3)?;
        Some(Rgb::new(px[0], px[1], px[2]))
    }
}

/// Placement of a rendered layer on screen.
///
/// Scale factors are native size divided by rendered size, per axis, since
/// images are usually displayed scaled down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Viewport {
    pub fn new(left: f64, top: f64, scale_x: f64, scale_y: f64) -> Self {
        Self {
            left,
            top,
            scale_x,
            scale_y,
        }
    }

    /// Image drawn at its native size with its top-left corner at the origin.
    pub fn native() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    /// Derive scale factors from rendered and native sizes.
    ///
    /// A zero rendered extent leaves that axis unmappable.
    pub fn from_sizes(
        left: f64,
        top: f64,
        rendered_width: f64,
        rendered_height: f64,
        native_width: u32,
        native_height: u32,
    ) -> Self {
        Self::new(
            left,
            top,
            scale_for(native_width, rendered_width),
            scale_for(native_height, rendered_height),
        )
    }

    /// Map a pointer position to image pixel coordinates.
    ///
    /// Returns None when either axis does not map to a finite value.
    pub fn to_pixel(&self, pointer_x: f64, pointer_y: f64) -> Option<(i64, i64)> {
        let x = map_axis(pointer_x, self.left, self.scale_x)?;
        let y = map_axis(pointer_y, self.top, self.scale_y)?;
        Some((x, y))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::native()
    }
}

fn scale_for(native: u32, rendered: f64) -> f64 {
    if rendered > 0.0 {
        f64::from(native) / rendered
    } else {
        f64::NAN
    }
}

fn map_axis(pointer: f64, origin: f64, scale: f64) -> Option<i64> {
    if !(scale.is_finite() && scale > 0.0) {
        return None;
    }
    let mapped = ((pointer - origin) * scale).floor();
    // `as` saturates, so huge but finite values still land out of bounds.
    mapped.is_finite().then_some(mapped as i64)
}

/// Reading under the pointer. Recomputed on every pointer move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelSample {
    /// Mapped pixel coordinate, reported even when out of bounds.
    /// None when the pointer could not be mapped at all.
    pub pixel: Option<(i64, i64)>,
    /// Sampled color, present only inside the image
    pub channels: Option<Rgb>,
    /// Approximate index, present only for index layers inside the image
    pub index_value: Option<f64>,
}

impl PixelSample {
    /// Whether the pointer mapped inside the image.
    pub fn in_bounds(&self) -> bool {
        self.channels.is_some()
    }
}

/// Sample a layer buffer at a pointer position.
pub fn sample(
    buffer: &PixelBuffer,
    layer: LayerKind,
    viewport: &Viewport,
    pointer_x: f64,
    pointer_y: f64,
) -> PixelSample {
    let pixel = viewport.to_pixel(pointer_x, pointer_y);
    let channels = pixel.and_then(|(x, y)| buffer.pixel(x, y));
    let index_value = channels
        .zip(layer.index_formula())
        .map(|(color, formula)| formula.apply(color));

    PixelSample {
        pixel,
        channels,
        index_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    /// 2x2 buffer: (0,0) green 255, (1,0) green 0, (0,1) green 128, (1,1) red 255.
    fn quad() -> PixelBuffer {
        #[rustfmt::skip]
        let data = vec![
            0, 255, 0, 255,   0, 0, 0, 255,
            0, 128, 0, 255,   255, 0, 0, 255,
        ];
        PixelBuffer::new(2, 2, data).unwrap()
    }

    fn value_at(layer: LayerKind, x: f64, y: f64) -> Option<f64> {
        sample(&quad(), layer, &Viewport::native(), x, y).index_value
    }

    #[test]
    fn test_buffer_size_is_checked() {
        let err = PixelBuffer::new(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            RasterError::BufferSize {
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn test_ndvi_readings() {
        assert!(approx_eq(value_at(LayerKind::Ndvi, 0.5, 0.5).unwrap(), 0.8));
        assert!(approx_eq(value_at(LayerKind::Ndvi, 1.5, 0.5).unwrap(), -0.2));
        assert!(approx_eq(value_at(LayerKind::Ndvi, 0.5, 1.5).unwrap(), 0.3));
    }

    #[test]
    fn test_ndbi_readings() {
        assert!(approx_eq(value_at(LayerKind::Ndbi, 1.5, 1.5).unwrap(), 0.5));
        assert!(approx_eq(value_at(LayerKind::Ndbi, 1.5, 0.5).unwrap(), -0.5));
    }

    #[test]
    fn test_rgb_never_reads_an_index() {
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)] {
            let s = sample(&quad(), LayerKind::Rgb, &Viewport::native(), x, y);
            assert!(s.in_bounds());
            assert_eq!(s.index_value, None);
        }
    }

    #[test]
    fn test_channels_are_reported() {
        let s = sample(&quad(), LayerKind::Rgb, &Viewport::native(), 1.0, 1.0);
        assert_eq!(s.channels, Some(Rgb::new(255, 0, 0)));
    }

    #[test]
    fn test_out_of_bounds_keeps_coordinates() {
        for layer in LayerKind::ALL {
            for (px, py, expected) in [
                (-0.5, 0.0, (-1, 0)),
                (0.0, -3.0, (0, -3)),
                (2.0, 0.0, (2, 0)),
                (0.0, 2.0, (0, 2)),
                (10.0, 10.0, (10, 10)),
            ] {
                let s = sample(&quad(), layer, &Viewport::native(), px, py);
                assert_eq!(s.pixel, Some(expected));
                assert_eq!(s.channels, None);
                assert_eq!(s.index_value, None);
            }
        }
    }

    #[test]
    fn test_scaled_down_display() {
        // 2x2 image drawn at 100x100, placed at (50, 20) on screen
        let viewport = Viewport::from_sizes(50.0, 20.0, 100.0, 100.0, 2, 2);
        assert!(approx_eq(viewport.scale_x, 0.02));
        assert!(approx_eq(viewport.scale_y, 0.02));

        let s = sample(&quad(), LayerKind::Ndbi, &viewport, 149.0, 119.0);
        assert_eq!(s.pixel, Some((1, 1)));
        assert!(approx_eq(s.index_value.unwrap(), 0.5));

        let s = sample(&quad(), LayerKind::Ndvi, &viewport, 50.0, 20.0);
        assert_eq!(s.pixel, Some((0, 0)));
        assert!(approx_eq(s.index_value.unwrap(), 0.8));
    }

    #[test]
    fn test_independent_axis_scales() {
        let viewport = Viewport::from_sizes(0.0, 0.0, 4.0, 1.0, 2, 2);
        assert_eq!(viewport.to_pixel(3.9, 0.6), Some((1, 1)));
    }

    #[test]
    fn test_zero_rendered_size_gives_no_reading() {
        let green = PixelBuffer::new(1, 1, vec![0, 255, 0, 255]).unwrap();
        let viewport = Viewport::from_sizes(10.0, 10.0, 0.0, 0.0, 1, 1);
        assert_eq!(viewport.to_pixel(500.0, 500.0), None);

        let s = sample(&green, LayerKind::Ndvi, &viewport, 500.0, 500.0);
        assert_eq!(s.pixel, None);
        assert_eq!(s.channels, None);
        assert_eq!(s.index_value, None);

        // One collapsed axis is enough.
        let viewport = Viewport::from_sizes(0.0, 0.0, 1.0, 0.0, 1, 1);
        assert_eq!(sample(&green, LayerKind::Ndvi, &viewport, 0.5, 0.5).index_value, None);
    }

    #[test]
    fn test_non_finite_pointer_gives_no_reading() {
        let green = PixelBuffer::new(1, 1, vec![0, 255, 0, 255]).unwrap();
        for (x, y) in [
            (f64::NAN, 0.0),
            (0.0, f64::NAN),
            (f64::INFINITY, 0.0),
            (0.0, f64::NEG_INFINITY),
        ] {
            let s = sample(&green, LayerKind::Ndvi, &Viewport::native(), x, y);
            assert_eq!(s.pixel, None);
            assert_eq!(s.index_value, None);
        }
    }

    #[test]
    fn test_non_finite_scale_gives_no_reading() {
        let green = PixelBuffer::new(1, 1, vec![0, 255, 0, 255]).unwrap();
        let viewport = Viewport::new(0.0, 0.0, f64::INFINITY, 1.0);
        let s = sample(&green, LayerKind::Ndvi, &viewport, 0.0, 0.0);
        assert_eq!(s.channels, None);
        assert_eq!(s.index_value, None);
    }

    #[test]
    fn test_from_rgba_image() {
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        let buffer = PixelBuffer::from_rgba_image(img);
        assert_eq!((buffer.width(), buffer.height()), (3, 2));
        assert_eq!(buffer.pixel(2, 1), Some(Rgb::new(10, 20, 30)));
        assert_eq!(buffer.pixel(3, 1), None);
    }
}
