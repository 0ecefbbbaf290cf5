//! The scene graph consumed by the three backends.
//!
//! A [`SceneNode`] is a closed tagged union over containers, shapes and
//! sprites. Containers own their children outright, so the graph is always
//! a tree.

mod event;
mod flatten;
mod primitives;
mod shape;
mod sprite;

use std::sync::atomic::{AtomicU64, Ordering};

use crate::transform::LocalTransform;

pub use event::{Handlers, PointerEvent, PointerEventKind, PointerHandler};
pub use flatten::{flatten, FlattenedNode, Leaf};
pub use primitives::{Color, Point, Rect};
pub use shape::{Shape, ShapeKind, Stroke, Visibility};
pub use sprite::Sprite;

/// Unique identifier for a scene node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(u64);

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

impl NodeId {
    /// Generate a new unique node ID
    pub fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub enum NodeKind {
    Container(Vec<SceneNode>),
    Shape(Shape),
    Sprite(Sprite),
}

#[derive(Debug)]
pub struct SceneNode {
    id: NodeId,
    pub transform: LocalTransform,
    pub kind: NodeKind,
    handlers: Handlers,
}

impl SceneNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::next(),
            transform: LocalTransform::IDENTITY,
            kind,
            handlers: Handlers::default(),
        }
    }

    pub fn container(children: impl IntoIterator<Item = SceneNode>) -> Self {
        Self::new(NodeKind::Container(children.into_iter().collect()))
    }

    pub fn shape(shape: Shape) -> Self {
        Self::new(NodeKind::Shape(shape))
    }

    pub fn sprite(sprite: Sprite) -> Self {
        Self::new(NodeKind::Sprite(sprite))
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.transform.x = x;
        self.transform.y = y;
        self
    }

    /// Rotation in degrees about the node's own bounding-box center.
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.transform.rotation = degrees;
        self
    }

    pub fn with_scale(mut self, scale_x: f32, scale_y: f32) -> Self {
        self.transform.scale_x = scale_x;
        self.transform.scale_y = scale_y;
        self
    }

    /// Register a pointer handler on this node.
    pub fn on(mut self, kind: PointerEventKind, handler: impl Fn(&PointerEvent) + 'static) -> Self {
        self.handlers.register(kind, std::rc::Rc::new(handler));
        self
    }

    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }

    /// Children in paint order. Empty for leaves.
    pub fn children(&self) -> &[SceneNode] {
        match &self.kind {
            NodeKind::Container(children) => children,
            NodeKind::Shape(_) | NodeKind::Sprite(_) => &[],
        }
    }

    /// Append a child. Returns the child back if this node is not a container.
    pub fn push_child(&mut self, child: SceneNode) -> Result<(), SceneNode> {
        match &mut self.kind {
            NodeKind::Container(children) => {
                children.push(child);
                Ok(())
            }
            NodeKind::Shape(_) | NodeKind::Sprite(_) => Err(child),
        }
    }

    /// Detach a direct child by id.
    pub fn remove_child(&mut self, id: NodeId) -> Option<SceneNode> {
        match &mut self.kind {
            NodeKind::Container(children) => {
                let index = children.iter().position(|c| c.id == id)?;
                Some(children.remove(index))
            }
            NodeKind::Shape(_) | NodeKind::Sprite(_) => None,
        }
    }

    /// Depth-first search for a node by id, including `self`.
    pub fn find(&self, id: NodeId) -> Option<&SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(id))
    }

    /// Invoke this node's handlers for `event`. Returns how many ran.
    pub fn emit(&self, event: &PointerEvent) -> usize {
        self.handlers.emit(event)
    }
}
