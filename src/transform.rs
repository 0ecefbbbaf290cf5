//! Transform composition shared by the painter, the exporter and the hit tester.
//!
//! Translation and non-uniform scale flatten down the ancestor chain.
//! Rotation does not: it is a last-mile transform applied to a single node's
//! own geometry around that geometry's bounding-box center, and children
//! never inherit it.

/// A node's transform relative to its parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalTransform {
    pub x: f32,
    pub y: f32,
    /// Rotation in degrees about the node's own visual-bounds center.
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl LocalTransform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        rotation: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };

    pub fn translate(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::IDENTITY
        }
    }
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Flattened translation/scale of a node in output space plus the node's own
/// (non-inherited) rotation.
///
/// Computed fresh on every walk and never stored on the node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComposedTransform {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    /// Rotation in degrees of this node only.
    pub rotation: f32,
}

impl ComposedTransform {
    pub const IDENTITY: Self = Self {
        translate_x: 0.0,
        translate_y: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
        rotation: 0.0,
    };

    /// Transform built from a node's own position and scale, ignoring every
    /// ancestor. This is what the hit tester works with.
    pub fn from_local(local: &LocalTransform) -> Self {
        compose(&Self::IDENTITY, local)
    }

    /// Map a local point into output space (scale, then translate).
    pub fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.translate_x + x * self.scale_x,
            self.translate_y + y * self.scale_y,
        )
    }

    /// Map a local point into output space without scaling it.
    pub fn translate_point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.translate_x + x, self.translate_y + y)
    }
}

impl Default for ComposedTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Combine an already-flattened ancestor transform with a child's local one.
///
/// The child's offset is scaled by the ancestor's scale factors before being
/// added, scale factors multiply per axis, and only the child's own rotation
/// is carried.
pub fn compose(ancestor: &ComposedTransform, local: &LocalTransform) -> ComposedTransform {
    let (translate_x, translate_y) = ancestor.transform_point(local.x, local.y);
    ComposedTransform {
        translate_x,
        translate_y,
        scale_x: ancestor.scale_x * local.scale_x,
        scale_y: ancestor.scale_y * local.scale_y,
        rotation: local.rotation,
    }
}

/// A rotation about a pivot point, applied to exactly one node's geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rotation {
    pub radians: f32,
    pub pivot: (f32, f32),
}

impl Rotation {
    pub const NONE: Self = Self {
        radians: 0.0,
        pivot: (0.0, 0.0),
    };

    pub fn about(degrees: f32, pivot: (f32, f32)) -> Self {
        Self {
            radians: degrees.to_radians(),
            pivot,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.radians == 0.0
    }

    /// The opposite rotation around the same pivot.
    pub fn inverse(&self) -> Self {
        Self {
            radians: -self.radians,
            pivot: self.pivot,
        }
    }

    /// Rotate a point around the pivot.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        if self.is_identity() {
            return (x, y);
        }
        let (sin, cos) = self.radians.sin_cos();
        let (px, py) = self.pivot;
        let dx = x - px;
        let dy = y - py;
        (px + dx * cos - dy * sin, py + dx * sin + dy * cos)
    }

    /// The rotation as a 2D affine in `[sx, ky, kx, sy, tx, ty]` order, so
    /// that `x' = sx*x + kx*y + tx` and `y' = ky*x + sy*y + ty`.
    pub fn affine(&self) -> [f32; 6] {
        let (sin, cos) = self.radians.sin_cos();
        let (px, py) = self.pivot;
        [
            cos,
            sin,
            -sin,
            cos,
            px - cos * px + sin * py,
            py - sin * px - cos * py,
        ]
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::NONE
    }
}
