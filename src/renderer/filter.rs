//! Color-matrix filter used for sprite tint and opacity.

use image::RgbaImage;

use crate::scene::Color;

/// A 4x5 row-major color matrix over straight RGBA in `0.0..=1.0`.
///
/// Row `i` computes output channel `i` as
/// `m[i][0]*r + m[i][1]*g + m[i][2]*b + m[i][3]*a + m[i][4]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix(pub [f32; 20]);

impl ColorMatrix {
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, 0.0, // r
        0.0, 1.0, 0.0, 0.0, 0.0, // g
        0.0, 0.0, 1.0, 0.0, 0.0, // b
        0.0, 0.0, 0.0, 1.0, 0.0, // a
    ]);

    /// Multiply color channels by `tint` and alpha by `opacity`.
    pub fn tint(tint: Color, opacity: f32) -> Self {
        Self([
            tint.r, 0.0, 0.0, 0.0, 0.0, //
            0.0, tint.g, 0.0, 0.0, 0.0, //
            0.0, 0.0, tint.b, 0.0, 0.0, //
            0.0, 0.0, 0.0, opacity, 0.0, //
        ])
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    fn apply_pixel(&self, px: [u8; 4]) -> [u8; 4] {
        let input = px.map(|c| c as f32 / 255.0);
        let m = &self.0;
        let mut out = [0u8; 4];
        for (row, channel) in out.iter_mut().enumerate() {
            let r = &m[row * 5..row * 5 + 5];
            let v = r[0] * input[0] + r[1] * input[1] + r[2] * input[2] + r[3] * input[3] + r[4];
            *channel = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        out
    }

    /// Apply to every pixel, returning a new image.
    pub fn apply(&self, image: &RgbaImage) -> RgbaImage {
        let mut out = image.clone();
        if self.is_identity() {
            return out;
        }
        for px in out.pixels_mut() {
            px.0 = self.apply_pixel(px.0);
        }
        out
    }
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}
