//! Per-frame list of things to draw
//!
//! Actors and their components submit items during the draw phase; the
//! renderer consumes the list in submission order.

use kiln_core::{Color, Mat4};

use crate::actor::ActorId;

/// Primitive a [`DrawItem`] is rendered as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Unit cube centered on the origin
    Cube,
}

/// One shape placed in the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    /// Actor that submitted the item, if any
    pub actor: Option<ActorId>,
    pub shape: Shape,
    pub world: Mat4,
    pub color: Color,
}

#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawItem>,
    current: Option<ActorId>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape, attributed to the actor currently drawing
    pub fn submit(&mut self, shape: Shape, world: Mat4, color: Color) {
        self.items.push(DrawItem {
            actor: self.current,
            shape,
            world,
            color,
        });
    }

    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop last frame's items
    pub fn clear(&mut self) {
        self.items.clear();
        self.current = None;
    }

    pub(crate) fn set_current(&mut self, actor: Option<ActorId>) {
        self.current = actor;
    }
}
