//! Actor ownership with frame-boundary reconciliation
//!
//! Actors created or destroyed while the registry is iterating never touch the
//! live list directly. Creations land in a pending list and destructions only
//! flip the actor's state; [`ActorRegistry::reconcile`] applies both between
//! frames.

use std::collections::HashMap;

use crate::actor::{run_draw, run_input, run_update, Actor, ActorId, ActorState};
use crate::draw::DrawList;
use crate::input::InputState;

struct ActorSlot {
    id: ActorId,
    actor: Box<dyn Actor>,
}

/// Everything an actor may mutate while the live list is borrowed
#[derive(Default)]
struct Staging {
    pending: Vec<ActorSlot>,
    states: HashMap<ActorId, ActorState>,
    next_id: u64,
}

impl Staging {
    fn allocate(&mut self) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        self.states.insert(id, ActorState::Active);
        id
    }

    fn stage(&mut self, actor: Box<dyn Actor>) -> ActorId {
        let id = self.allocate();
        self.pending.push(ActorSlot { id, actor });
        id
    }

    fn destroy(&mut self, id: ActorId) {
        if let Some(state) = self.states.get_mut(&id) {
            *state = ActorState::Dead;
        }
    }

    fn set_state(&mut self, id: ActorId, new_state: ActorState) {
        match self.states.get_mut(&id) {
            Some(state) if *state != ActorState::Dead => *state = new_state,
            _ => {}
        }
    }
}

/// Handed to [`Actor::update_actor`] for structural changes during the update pass.
///
/// Actors created here join the live list at the next reconciliation and are
/// first updated on the following frame.
pub struct ActorContext<'a> {
    staging: &'a mut Staging,
    current: ActorId,
}

impl<'a> ActorContext<'a> {
    /// The actor currently being updated
    pub fn self_id(&self) -> ActorId {
        self.current
    }

    pub fn create<T: Actor>(&mut self, actor: T) -> ActorId {
        self.staging.stage(Box::new(actor))
    }

    /// Mark an actor dead. Unknown or already-dead ids are ignored.
    pub fn destroy(&mut self, id: ActorId) {
        self.staging.destroy(id);
    }

    pub fn state(&self, id: ActorId) -> Option<ActorState> {
        self.staging.states.get(&id).copied()
    }

    pub fn set_state(&mut self, id: ActorId, state: ActorState) {
        self.staging.set_state(id, state);
    }
}

/// Exclusive owner of every actor in a running application
#[derive(Default)]
pub struct ActorRegistry {
    live: Vec<ActorSlot>,
    staging: Staging,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of an actor and add it to the live list.
    ///
    /// Its world transform is computed before it is stored, so the first
    /// update already sees a valid matrix.
    pub fn create<T: Actor>(&mut self, actor: T) -> ActorId {
        let id = self.staging.allocate();
        let mut actor: Box<dyn Actor> = Box::new(actor);
        actor.base_mut().compute_world_transform();
        self.live.push(ActorSlot { id, actor });
        id
    }

    /// Mark an actor dead. It stays reachable until the next [`reconcile`](Self::reconcile).
    pub fn destroy(&mut self, id: ActorId) {
        self.staging.destroy(id);
    }

    pub fn state(&self, id: ActorId) -> Option<ActorState> {
        self.staging.states.get(&id).copied()
    }

    /// Switch between `Active` and `Paused`. Dead actors stay dead.
    pub fn set_state(&mut self, id: ActorId, state: ActorState) {
        self.staging.set_state(id, state);
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.staging.states.contains_key(&id)
    }

    /// Number of live actors, not counting ones still pending
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.staging.pending.len()
    }

    /// Live actor ids in update order
    pub fn ids(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.live.iter().map(|slot| slot.id)
    }

    pub fn get_dyn(&self, id: ActorId) -> Option<&dyn Actor> {
        self.slot(id).map(|slot| &*slot.actor)
    }

    /// Borrow an actor as its concrete type
    pub fn get<T: Actor>(&self, id: ActorId) -> Option<&T> {
        self.slot(id)
            .and_then(|slot| (*slot.actor).as_any().downcast_ref::<T>())
    }

    pub fn get_mut<T: Actor>(&mut self, id: ActorId) -> Option<&mut T> {
        self.slot_mut(id)
            .and_then(|slot| (*slot.actor).as_any_mut().downcast_mut::<T>())
    }

    /// Run every active actor's update in insertion order
    pub fn update_all(&mut self, dt: f32) {
        for slot in &mut self.live {
            if self.staging.states.get(&slot.id) != Some(&ActorState::Active) {
                continue;
            }
            let mut ctx = ActorContext {
                staging: &mut self.staging,
                current: slot.id,
            };
            run_update(slot.actor.as_mut(), &mut ctx, dt);
        }
    }

    /// Feed the frame's input to every active actor
    pub fn process_input(&mut self, input: &InputState) {
        for slot in &mut self.live {
            if self.staging.states.get(&slot.id) == Some(&ActorState::Active) {
                run_input(slot.actor.as_mut(), input);
            }
        }
    }

    /// Collect draw items from every active actor in insertion order
    pub fn draw_all(&self, out: &mut DrawList) {
        for slot in &self.live {
            if self.staging.states.get(&slot.id) != Some(&ActorState::Active) {
                continue;
            }
            out.set_current(Some(slot.id));
            run_draw(&*slot.actor, out);
        }
        out.set_current(None);
    }

    /// Merge pending actors into the live list, then drop every dead one
    pub fn reconcile(&mut self) {
        for mut slot in self.staging.pending.drain(..) {
            slot.actor.base_mut().compute_world_transform();
            self.live.push(slot);
        }

        let states = &mut self.staging.states;
        self.live.retain(|slot| {
            let dead = states.get(&slot.id) == Some(&ActorState::Dead);
            if dead {
                states.remove(&slot.id);
            }
            !dead
        });
    }

    /// Drop every actor, live and pending. Ids are not reused afterwards.
    pub fn clear(&mut self) {
        let count = self.live.len() + self.staging.pending.len();
        self.live.clear();
        self.staging.pending.clear();
        self.staging.states.clear();
        if count > 0 {
            log::debug!("released {} actors", count);
        }
    }

    fn slot(&self, id: ActorId) -> Option<&ActorSlot> {
        self.live
            .iter()
            .chain(self.staging.pending.iter())
            .find(|slot| slot.id == id)
    }

    fn slot_mut(&mut self, id: ActorId) -> Option<&mut ActorSlot> {
        self.live
            .iter_mut()
            .chain(self.staging.pending.iter_mut())
            .find(|slot| slot.id == id)
    }
}
