use bitflags::bitflags;

use super::primitives::{Color, Point, Rect};

bitflags! {
    /// Which paint passes a shape takes part in.
    ///
    /// An empty set means the shape is a no-op for painting, export and
    /// hit-testing alike.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Visibility: u8 {
        const FILL   = 0b01;
        const STROKE = 0b10;
    }
}

/// Outline style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

impl Stroke {
    pub fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

/// Geometry of a primitive shape, in the node's local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Rectangle(Rect),
    Circle { center: Point, radius: f32 },
    /// Open polyline. Needs at least two points to draw anything.
    Polyline(Vec<Point>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub fill: Option<Color>,
    pub stroke: Option<Stroke>,
}

impl Shape {
    pub fn rectangle(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            kind: ShapeKind::Rectangle(Rect::new(x, y, width, height)),
            fill: None,
            stroke: None,
        }
    }

    pub fn circle(x: f32, y: f32, radius: f32) -> Self {
        Self {
            kind: ShapeKind::Circle {
                center: Point::new(x, y),
                radius,
            },
            fill: None,
            stroke: None,
        }
    }

    pub fn polyline(points: impl IntoIterator<Item = (f32, f32)>, stroke: Stroke) -> Self {
        Self {
            kind: ShapeKind::Polyline(points.into_iter().map(Point::from).collect()),
            fill: None,
            stroke: Some(stroke),
        }
    }

    pub fn fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn stroke(mut self, color: Color, width: f32) -> Self {
        self.stroke = Some(Stroke::new(color, width));
        self
    }

    pub fn visibility(&self) -> Visibility {
        let mut visibility = Visibility::empty();
        match &self.kind {
            // Polylines are never filled.
            ShapeKind::Polyline(points) => {
                if self.stroke.is_some() && points.len() >= 2 {
                    visibility |= Visibility::STROKE;
                }
            }
            ShapeKind::Rectangle(_) | ShapeKind::Circle { .. } => {
                if self.fill.is_some() {
                    visibility |= Visibility::FILL;
                }
                if self.stroke.is_some() {
                    visibility |= Visibility::STROKE;
                }
            }
        }
        visibility
    }

    pub fn is_visible(&self) -> bool {
        !self.visibility().is_empty()
    }
}
