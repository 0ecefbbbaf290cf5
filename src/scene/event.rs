//! Synthetic pointer events dispatched after a hit test.

use std::fmt;
use std::rc::Rc;

use super::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    /// The node the hit tester resolved.
    pub target: NodeId,
    /// Global (screen) coordinates of the pointer.
    pub x: f32,
    pub y: f32,
}

pub type PointerHandler = Rc<dyn Fn(&PointerEvent)>;

/// Handlers registered on a single node.
#[derive(Default, Clone)]
pub struct Handlers {
    entries: Vec<(PointerEventKind, PointerHandler)>,
}

impl Handlers {
    pub fn register(&mut self, kind: PointerEventKind, handler: PointerHandler) {
        self.entries.push((kind, handler));
    }

    /// Invoke every handler registered for `event.kind`, in registration
    /// order. Returns how many ran.
    pub fn emit(&self, event: &PointerEvent) -> usize {
        let mut count = 0;
        for (kind, handler) in &self.entries {
            if *kind == event.kind {
                handler(event);
                count += 1;
            }
        }
        count
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("count", &self.entries.len())
            .finish()
    }
}
