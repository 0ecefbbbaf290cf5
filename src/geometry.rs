//! Geometry resolution: local shape data + composed transform -> output space.
//!
//! Every shape kind has an explicit [`ScalePolicy`]. The painter, the
//! exporter and the hit tester all resolve through [`resolve`], so they agree
//! on where a shape lands, including its rotation pivot.

use crate::scene::{Point, Rect, Shape, ShapeKind};
use crate::transform::{ComposedTransform, Rotation};

/// How a shape kind reacts to the composed scale factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalePolicy {
    /// Offset and size scale per axis (x-scale for width, y-scale for height).
    Anisotropic,
    /// Offset is translated but not scaled; size scales by `|scale_x|` only.
    XOnly,
    /// Points are translated, never scaled.
    Ignored,
}

pub fn scale_policy(kind: &ShapeKind) -> ScalePolicy {
    match kind {
        ShapeKind::Rectangle(_) => ScalePolicy::Anisotropic,
        ShapeKind::Circle { .. } => ScalePolicy::XOnly,
        ShapeKind::Polyline(_) => ScalePolicy::Ignored,
    }
}

/// Shape geometry in output (pixel / point) space.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputGeometry {
    Rect(Rect),
    Circle { center: Point, radius: f32 },
    Points(Vec<Point>),
    /// A closed outline; what a rectangle becomes once rotated analytically.
    Polygon(Vec<Point>),
}

impl OutputGeometry {
    /// Axis-aligned bounds, `None` for an empty point list.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            OutputGeometry::Rect(rect) => Some(rect.normalized()),
            OutputGeometry::Circle { center, radius } => Some(Rect::new(
                center.x - radius,
                center.y - radius,
                radius * 2.0,
                radius * 2.0,
            )),
            OutputGeometry::Points(points) | OutputGeometry::Polygon(points) => {
                Rect::bounding(points.iter().copied())
            }
        }
    }

    /// Rotate the geometry's reference points analytically.
    ///
    /// Rectangles turn into polygons; a circle only has its center moved.
    pub fn rotate(&self, rotation: &Rotation) -> OutputGeometry {
        let turn = |p: &Point| Point::from(rotation.apply(p.x, p.y));
        match self {
            OutputGeometry::Rect(rect) if rotation.is_identity() => OutputGeometry::Rect(*rect),
            OutputGeometry::Rect(rect) => {
                OutputGeometry::Polygon(rect.corners().iter().map(turn).collect())
            }
            OutputGeometry::Circle { center, radius } => OutputGeometry::Circle {
                center: turn(center),
                radius: *radius,
            },
            OutputGeometry::Points(points) => OutputGeometry::Points(points.iter().map(turn).collect()),
            OutputGeometry::Polygon(points) => {
                OutputGeometry::Polygon(points.iter().map(turn).collect())
            }
        }
    }
}

/// A shape resolved into output space, with its last-mile rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedShape {
    /// Translated/scaled geometry, before rotation.
    pub geometry: OutputGeometry,
    /// Axis-aligned bounds of `geometry`; the rotation pivot is its center.
    pub bounds: Rect,
    pub rotation: Rotation,
}

impl ResolvedShape {
    /// Axis-aligned bounds after rotation.
    pub fn rotated_bounds(&self) -> Rect {
        self.geometry
            .rotate(&self.rotation)
            .bounds()
            .unwrap_or(self.bounds)
    }
}

impl ScalePolicy {
    /// Map a local reference point into output space.
    fn place(self, transform: &ComposedTransform, p: Point) -> Point {
        match self {
            ScalePolicy::Anisotropic => transform.transform_point(p.x, p.y).into(),
            ScalePolicy::XOnly | ScalePolicy::Ignored => transform.translate_point(p.x, p.y).into(),
        }
    }

    /// Map a local extent into output space.
    fn extent(self, transform: &ComposedTransform, width: f32, height: f32) -> (f32, f32) {
        match self {
            ScalePolicy::Anisotropic => (width * transform.scale_x, height * transform.scale_y),
            ScalePolicy::XOnly => {
                let s = transform.scale_x.abs();
                (width * s, height * s)
            }
            ScalePolicy::Ignored => (width, height),
        }
    }
}

/// Resolve a shape against a composed transform.
pub fn resolve(shape: &Shape, transform: &ComposedTransform) -> ResolvedShape {
    let policy = scale_policy(&shape.kind);
    let geometry = match &shape.kind {
        ShapeKind::Rectangle(rect) => {
            let origin = policy.place(transform, Point::new(rect.x, rect.y));
            let (width, height) = policy.extent(transform, rect.width, rect.height);
            OutputGeometry::Rect(Rect::new(origin.x, origin.y, width, height).normalized())
        }
        ShapeKind::Circle { center, radius } => OutputGeometry::Circle {
            center: policy.place(transform, *center),
            radius: policy.extent(transform, *radius, *radius).0,
        },
        ShapeKind::Polyline(points) => OutputGeometry::Points(
            points.iter().map(|p| policy.place(transform, *p)).collect(),
        ),
    };

    let bounds = geometry.bounds().unwrap_or_else(|| {
        Rect::new(transform.translate_x, transform.translate_y, 0.0, 0.0)
    });
    let rotation = Rotation::about(transform.rotation, bounds.center().into());

    ResolvedShape {
        geometry,
        bounds,
        rotation,
    }
}

/// Destination rectangle and rotation of a sprite of intrinsic size
/// `width x height`.
pub fn resolve_sprite(transform: &ComposedTransform, width: u32, height: u32) -> (Rect, Rotation) {
    let dest = Rect::new(
        transform.translate_x,
        transform.translate_y,
        width as f32 * transform.scale_x,
        height as f32 * transform.scale_y,
    )
    .normalized();
    let rotation = Rotation::about(transform.rotation, dest.center().into());
    (dest, rotation)
}
