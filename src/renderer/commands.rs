//! Display list built by one painter walk.

use crate::geometry::{resolve, ResolvedShape};
use crate::image_cache::{ImageCache, ImageRequest};
use crate::scene::{flatten, Color, Leaf, SceneNode, Stroke};
use crate::transform::ComposedTransform;

use super::filter::ColorMatrix;

/// A single draw operation in output space.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// A visible shape, already resolved. Rotation happens at draw time.
    Shape {
        resolved: ResolvedShape,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },

    /// A sprite whose image arrives through `requests[slot]`.
    ///
    /// The destination rectangle depends on the intrinsic image size, so it
    /// is resolved once the image is available.
    Sprite {
        transform: ComposedTransform,
        filter: ColorMatrix,
        slot: usize,
    },
}

/// Draw commands in paint order plus the image loads they wait on.
pub struct DisplayList {
    pub commands: Vec<DrawCommand>,
    pub requests: Vec<ImageRequest>,
}

impl DisplayList {
    /// Walk the tree, resolving shapes immediately and scheduling one image
    /// request per sprite.
    pub fn build(root: &SceneNode, cache: &ImageCache) -> Self {
        let mut commands = Vec::new();
        let mut requests = Vec::new();

        for flat in flatten(root) {
            match flat.leaf {
                Leaf::Shape(shape) => {
                    if !shape.is_visible() {
                        continue;
                    }
                    commands.push(DrawCommand::Shape {
                        resolved: resolve(shape, &flat.transform),
                        fill: shape.fill,
                        stroke: shape.stroke,
                    });
                }
                Leaf::Sprite(sprite) => {
                    let filter = if sprite.has_filter() {
                        ColorMatrix::tint(sprite.tint.unwrap_or(Color::WHITE), sprite.opacity)
                    } else {
                        ColorMatrix::IDENTITY
                    };
                    commands.push(DrawCommand::Sprite {
                        transform: flat.transform,
                        filter,
                        slot: requests.len(),
                    });
                    requests.push(cache.get_or_load(&sprite.source));
                }
            }
        }

        Self { commands, requests }
    }
}
