use super::primitives::Color;

/// A bitmap drawn at its intrinsic size, scaled by the composed transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    /// Source identifier (path, `file://` URL or `data:` URI).
    pub source: String,
    pub tint: Option<Color>,
    /// 0.0 (invisible) to 1.0 (opaque).
    pub opacity: f32,
}

impl Sprite {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            tint: None,
            opacity: 1.0,
        }
    }

    pub fn tint(mut self, color: Color) -> Self {
        self.tint = Some(color);
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Whether drawing needs the color-matrix filter at all.
    pub fn has_filter(&self) -> bool {
        let tinted = self.tint.is_some_and(|t| t != Color::WHITE);
        tinted || self.opacity < 1.0
    }
}
