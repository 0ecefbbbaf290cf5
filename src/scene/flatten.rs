//! Pre-order flattening with composed transforms.

use crate::transform::{compose, ComposedTransform};

use super::{NodeKind, SceneNode, Shape, Sprite};

/// A drawable leaf borrowed from the tree.
#[derive(Debug, Clone, Copy)]
pub enum Leaf<'a> {
    Shape(&'a Shape),
    Sprite(&'a Sprite),
}

/// A leaf node together with its transform composed from all ancestors.
#[derive(Debug, Clone, Copy)]
pub struct FlattenedNode<'a> {
    pub node: &'a SceneNode,
    pub leaf: Leaf<'a>,
    pub transform: ComposedTransform,
}

/// Walk `root` depth-first, pre-order, and return every shape and sprite in
/// paint order (first to last).
pub fn flatten(root: &SceneNode) -> Vec<FlattenedNode<'_>> {
    let mut out = Vec::new();
    flatten_node(root, &ComposedTransform::IDENTITY, &mut out);
    out
}

fn flatten_node<'a>(
    node: &'a SceneNode,
    parent: &ComposedTransform,
    out: &mut Vec<FlattenedNode<'a>>,
) {
    let transform = compose(parent, &node.transform);
    match &node.kind {
        NodeKind::Container(children) => {
            for child in children {
                flatten_node(child, &transform, out);
            }
        }
        NodeKind::Shape(shape) => out.push(FlattenedNode {
            node,
            leaf: Leaf::Shape(shape),
            transform,
        }),
        NodeKind::Sprite(sprite) => out.push(FlattenedNode {
            node,
            leaf: Leaf::Sprite(sprite),
            transform,
        }),
    }
}
