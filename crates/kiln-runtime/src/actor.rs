//! Actors and their attached components

use std::any::Any;
use std::fmt;

use kiln_core::{Mat4, Quat, Transform, Vec3};

use crate::draw::DrawList;
use crate::input::InputState;
use crate::registry::ActorContext;

/// Handle to an actor owned by an [`ActorRegistry`](crate::ActorRegistry).
///
/// The handle does not keep the actor alive. It resolves through the registry
/// until the actor has been destroyed and pruned at a frame boundary, after
/// which lookups return `None`. Ids are never reused within a registry.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ActorId(pub(crate) u64);

impl ActorId {
    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({})", self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorState {
    /// Updated, drawn, and fed input every frame.
    Active,
    /// Kept alive but skipped by update, draw, and input.
    Paused,
    /// Waiting to be pruned at the next reconciliation. Terminal.
    Dead,
}

/// Upcast helper so registries can hand out `&T` for a stored `dyn Actor`.
///
/// Implemented for every `'static` type; actor implementations never
/// write it by hand.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A behavior or visual attached to an actor.
///
/// Components run in ascending `update_order`, before the owning actor's own
/// update hook.
#[allow(unused_variables)]
pub trait Component {
    /// Lower orders update first. Ties keep attachment order.
    fn update_order(&self) -> i32 {
        100
    }

    fn update(&mut self, owner: &mut ActorBase, dt: f32) {}

    fn process_input(&mut self, owner: &mut ActorBase, input: &InputState) {}

    /// Submit whatever this component contributes to the frame
    fn draw(&self, owner: &ActorBase, out: &mut DrawList) {}

    /// Called after the owner's world matrix was recomputed
    fn on_world_transform(&mut self, world: &Mat4) {}
}

/// State shared by every actor: transform, cached world matrix, components.
pub struct ActorBase {
    transform: Transform,
    world: Mat4,
    recompute_world: bool,
    components: Vec<Box<dyn Component>>,
}

impl Default for ActorBase {
    fn default() -> Self {
        Self::new()
    }
}

impl ActorBase {
    pub fn new() -> Self {
        Self::with_transform(Transform::IDENTITY)
    }

    pub fn with_transform(transform: Transform) -> Self {
        Self {
            transform,
            world: Mat4::IDENTITY,
            recompute_world: true,
            components: Vec::new(),
        }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
        self.recompute_world = true;
    }

    pub fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.transform.rotation = rotation;
        self.recompute_world = true;
    }

    pub fn scale(&self) -> Vec3 {
        self.transform.scale
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.transform.scale = scale;
        self.recompute_world = true;
    }

    /// World matrix as of the last [`compute_world_transform`](Self::compute_world_transform)
    pub fn world_transform(&self) -> &Mat4 {
        &self.world
    }

    /// Rebuild the world matrix if the transform changed since the last call
    pub fn compute_world_transform(&mut self) {
        if !self.recompute_world {
            return;
        }
        self.recompute_world = false;
        self.world = self.transform.to_matrix();

        for component in &mut self.components {
            component.on_world_transform(&self.world);
        }
    }

    /// Attach a component, keeping the list sorted by update order
    pub fn add_component(&mut self, component: Box<dyn Component>) {
        let order = component.update_order();
        let index = self
            .components
            .iter()
            .position(|c| c.update_order() > order)
            .unwrap_or(self.components.len());
        self.components.insert(index, component);
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub(crate) fn update_components(&mut self, dt: f32) {
        self.with_components(|component, owner| component.update(owner, dt));
    }

    pub(crate) fn draw_components(&self, out: &mut DrawList) {
        for component in &self.components {
            component.draw(self, out);
        }
    }

    pub(crate) fn input_components(&mut self, input: &InputState) {
        self.with_components(|component, owner| component.process_input(owner, input));
    }

    // Components are detached while they run so they can borrow their owner.
    fn with_components(&mut self, mut f: impl FnMut(&mut dyn Component, &mut ActorBase)) {
        let mut components = std::mem::take(&mut self.components);
        for component in &mut components {
            f(component.as_mut(), self);
        }
        // Components attached during the pass go after the existing ones.
        let added = std::mem::take(&mut self.components);
        self.components = components;
        for component in added {
            self.add_component(component);
        }
    }
}

/// A live, updatable, drawable entity owned by an [`ActorRegistry`](crate::ActorRegistry).
///
/// ```rust,ignore
/// struct Spinner { base: ActorBase, speed: f32 }
///
/// impl Actor for Spinner {
///     fn base(&self) -> &ActorBase { &self.base }
///     fn base_mut(&mut self) -> &mut ActorBase { &mut self.base }
///
///     fn update_actor(&mut self, _ctx: &mut ActorContext<'_>, dt: f32) {
///         let spin = Quat::from_rotation_y(self.speed * dt);
///         self.base.set_rotation(spin * self.base.rotation());
///     }
/// }
/// ```
#[allow(unused_variables)]
pub trait Actor: AsAny {
    fn base(&self) -> &ActorBase;

    fn base_mut(&mut self) -> &mut ActorBase;

    /// Actor-specific per-frame logic, run after the components
    fn update_actor(&mut self, ctx: &mut ActorContext<'_>, dt: f32) {}

    /// Actor-specific input handling, run after the components
    fn actor_input(&mut self, input: &InputState) {}

    /// Actor-specific drawing, run after the components
    fn draw_actor(&self, out: &mut DrawList) {}
}

pub(crate) fn run_update(actor: &mut dyn Actor, ctx: &mut ActorContext<'_>, dt: f32) {
    actor.base_mut().compute_world_transform();
    actor.base_mut().update_components(dt);
    actor.update_actor(ctx, dt);
    actor.base_mut().compute_world_transform();
}

pub(crate) fn run_draw(actor: &dyn Actor, out: &mut DrawList) {
    actor.base().draw_components(out);
    actor.draw_actor(out);
}

pub(crate) fn run_input(actor: &mut dyn Actor, input: &InputState) {
    actor.base_mut().input_components(input);
    actor.actor_input(input);
}
