//! Drawing surface wrapper with a scoped, non-inherited rotation.

use image::RgbaImage;
use resvg::tiny_skia::{
    self, FillRule, FilterQuality, IntSize, Paint, PathBuilder, Pixmap, PixmapPaint, Transform,
};

use crate::scene::{Color, Point, Rect, Stroke};
use crate::transform::Rotation;

pub(crate) fn skia_color(color: Color) -> tiny_skia::Color {
    let [r, g, b, a] = color.to_rgba8();
    tiny_skia::Color::from_rgba8(r, g, b, a)
}

fn solid(color: Color) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn skia_stroke(stroke: &Stroke) -> tiny_skia::Stroke {
    tiny_skia::Stroke {
        width: stroke.width,
        ..Default::default()
    }
}

fn skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    let rect = rect.normalized();
    tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height)
}

fn rotation_transform(rotation: &Rotation) -> Transform {
    let [sx, ky, kx, sy, tx, ty] = rotation.affine();
    Transform::from_row(sx, ky, kx, sy, tx, ty)
}

/// Convert straight RGBA into a premultiplied pixmap.
pub(crate) fn to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(image.width(), image.height())?;
    let data = image
        .pixels()
        .flat_map(|p| {
            let [r, g, b, a] = p.0;
            let pm = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
            [pm(r), pm(g), pm(b), a]
        })
        .collect();
    Pixmap::from_vec(data, size)
}

/// Borrowed pixmap plus the current device transform.
///
/// The device transform is only ever changed inside
/// [`Canvas::with_rotation`], which restores it before returning.
pub struct Canvas<'a> {
    pixmap: &'a mut Pixmap,
    transform: Transform,
}

impl<'a> Canvas<'a> {
    pub fn new(pixmap: &'a mut Pixmap) -> Self {
        Self {
            pixmap,
            transform: Transform::identity(),
        }
    }

    pub fn clear(&mut self, color: Color) {
        self.pixmap.fill(skia_color(color));
    }

    /// Run `draw` with the device rotated by `rotation`, then restore.
    pub fn with_rotation<R>(&mut self, rotation: &Rotation, draw: impl FnOnce(&mut Self) -> R) -> R {
        if rotation.is_identity() {
            return draw(self);
        }
        let saved = self.transform;
        self.transform = saved.pre_concat(rotation_transform(rotation));
        let out = draw(self);
        self.transform = saved;
        out
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        if let Some(rect) = skia_rect(rect) {
            self.pixmap
                .fill_rect(rect, &solid(color), self.transform, None);
        }
    }

    pub fn stroke_rect(&mut self, rect: Rect, stroke: &Stroke) {
        if let Some(path) = skia_rect(rect).map(PathBuilder::from_rect) {
            self.pixmap.stroke_path(
                &path,
                &solid(stroke.color),
                &skia_stroke(stroke),
                self.transform,
                None,
            );
        }
    }

    pub fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        if let Some(path) = PathBuilder::from_circle(center.x, center.y, radius) {
            self.pixmap.fill_path(
                &path,
                &solid(color),
                FillRule::Winding,
                self.transform,
                None,
            );
        }
    }

    pub fn stroke_circle(&mut self, center: Point, radius: f32, stroke: &Stroke) {
        if let Some(path) = PathBuilder::from_circle(center.x, center.y, radius) {
            self.pixmap.stroke_path(
                &path,
                &solid(stroke.color),
                &skia_stroke(stroke),
                self.transform,
                None,
            );
        }
    }

    pub fn stroke_polyline(&mut self, points: &[Point], stroke: &Stroke) {
        let [first, rest @ ..] = points else {
            return;
        };
        if rest.is_empty() {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(first.x, first.y);
        for p in rest {
            pb.line_to(p.x, p.y);
        }
        if let Some(path) = pb.finish() {
            self.pixmap.stroke_path(
                &path,
                &solid(stroke.color),
                &skia_stroke(stroke),
                self.transform,
                None,
            );
        }
    }

    /// Blit the whole of `image` into `dest`.
    pub fn draw_image(&mut self, image: &Pixmap, dest: Rect) {
        let dest = dest.normalized();
        let sx = dest.width / image.width() as f32;
        let sy = dest.height / image.height() as f32;
        let placement = Transform::from_row(sx, 0.0, 0.0, sy, dest.x, dest.y);
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..Default::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            image.as_ref(),
            &paint,
            self.transform.pre_concat(placement),
            None,
        );
    }
}
