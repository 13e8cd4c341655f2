//! Orbit demo: a spinning sun, orbiting planets, and short-lived sparks
//!
//! Exercises the runtime end to end: components on actors, actors that create
//! and destroy other actors mid-update, and game-issued window commands.

use kiln_core::{Color, Quat, Result, Transform, Vec3};
use kiln_runtime::{
    Actor, ActorBase, ActorContext, ActorId, ButtonState, Component, DrawList, Game, GameContext,
    Shape,
};
use winit::keyboard::KeyCode;

/// Rotates its owner about the Y axis
pub struct Spin {
    /// Radians per second
    pub speed: f32,
}

impl Component for Spin {
    fn update(&mut self, owner: &mut ActorBase, dt: f32) {
        let step = Quat::from_rotation_y(self.speed * dt);
        owner.set_rotation(step * owner.rotation());
    }
}

/// Moves its owner on a circle around a fixed center
pub struct Orbit {
    pub center: Vec3,
    pub radius: f32,
    /// Radians per second
    pub speed: f32,
    pub angle: f32,
}

impl Component for Orbit {
    // Position first, so other components see this frame's location.
    fn update_order(&self) -> i32 {
        10
    }

    fn update(&mut self, owner: &mut ActorBase, dt: f32) {
        self.angle = (self.angle + self.speed * dt) % std::f32::consts::TAU;
        let offset = Vec3::new(self.angle.cos(), 0.0, self.angle.sin()) * self.radius;
        owner.set_position(self.center + offset);
    }
}

/// Draws its owner as a cube of one color
pub struct Paint {
    pub color: Color,
}

impl Component for Paint {
    fn draw(&self, owner: &ActorBase, out: &mut DrawList) {
        out.submit(Shape::Cube, *owner.world_transform(), self.color);
    }
}

/// An actor whose behavior lives entirely in its components
pub struct Body {
    base: ActorBase,
}

impl Body {
    pub fn new(transform: Transform) -> Self {
        Self {
            base: ActorBase::with_transform(transform),
        }
    }

    pub fn with_component(mut self, component: impl Component + 'static) -> Self {
        self.base.add_component(Box::new(component));
        self
    }
}

impl Actor for Body {
    fn base(&self) -> &ActorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ActorBase {
        &mut self.base
    }
}

/// Drifts upward and destroys itself when its time runs out
pub struct Spark {
    base: ActorBase,
    lifetime: f32,
    remaining: f32,
}

impl Spark {
    const COLOR: Color = Color::new(1.0, 0.7, 0.2, 1.0);

    pub fn new(position: Vec3, lifetime: f32) -> Self {
        Self {
            base: ActorBase::with_transform(
                Transform::from_position(position).with_scale(Vec3::splat(0.15)),
            ),
            lifetime,
            remaining: lifetime,
        }
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

impl Actor for Spark {
    fn base(&self) -> &ActorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ActorBase {
        &mut self.base
    }

    fn update_actor(&mut self, ctx: &mut ActorContext<'_>, dt: f32) {
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            let me = ctx.self_id();
            ctx.destroy(me);
            return;
        }
        self.base.set_position(self.base.position() + Vec3::Y * dt);
    }

    // Fades out over its lifetime.
    fn draw_actor(&self, out: &mut DrawList) {
        let alpha = if self.lifetime > 0.0 {
            (self.remaining / self.lifetime).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let color = Color { a: alpha, ..Self::COLOR };
        out.submit(Shape::Cube, *self.base.world_transform(), color);
    }
}

/// Emits a spark at a fixed interval
pub struct Spawner {
    base: ActorBase,
    interval: f32,
    lifetime: f32,
    elapsed: f32,
    spawned: u32,
}

impl Spawner {
    pub fn new(position: Vec3, interval: f32, lifetime: f32) -> Self {
        Self {
            base: ActorBase::with_transform(Transform::from_position(position)),
            interval,
            lifetime,
            elapsed: 0.0,
            spawned: 0,
        }
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }
}

impl Actor for Spawner {
    fn base(&self) -> &ActorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ActorBase {
        &mut self.base
    }

    fn update_actor(&mut self, ctx: &mut ActorContext<'_>, dt: f32) {
        if self.interval <= 0.0 {
            return;
        }
        self.elapsed += dt;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            ctx.create(Spark::new(self.base.position(), self.lifetime));
            self.spawned += 1;
        }
    }
}

/// The demo game: builds the scene on load and handles a few keys
#[derive(Debug, Default)]
pub struct OrbitDemo {
    sun: Option<ActorId>,
    spawner: Option<ActorId>,
    elapsed: f32,
    last_report: f32,
}

impl OrbitDemo {
    pub fn sun(&self) -> Option<ActorId> {
        self.sun
    }

    pub fn spawner(&self) -> Option<ActorId> {
        self.spawner
    }
}

impl Game for OrbitDemo {
    fn load_data(&mut self, ctx: &mut GameContext<'_>) -> Result<()> {
        let sun = Body::new(Transform::IDENTITY.with_scale(Vec3::splat(2.0)))
            .with_component(Spin { speed: 0.5 })
            .with_component(Paint {
                color: Color::from_hex(0xFFC83D),
            });
        self.sun = Some(ctx.actors.create(sun));

        let planets = [(3.0_f32, 0x4F9DDE), (5.0, 0x6CC24A), (8.0, 0xC9503A)];
        for (i, (radius, hex)) in planets.into_iter().enumerate() {
            let planet = Body::new(Transform::IDENTITY.with_scale(Vec3::splat(0.5)))
                .with_component(Orbit {
                    center: Vec3::ZERO,
                    radius,
                    speed: 1.5 / radius,
                    angle: i as f32 * 2.0,
                })
                .with_component(Spin { speed: 2.0 })
                .with_component(Paint {
                    color: Color::from_hex(hex),
                });
            ctx.actors.create(planet);
        }

        self.spawner = Some(ctx.actors.create(Spawner::new(Vec3::new(0.0, 1.0, 0.0), 0.25, 1.5)));
        log::info!("orbit demo loaded {} actors", ctx.actors.len());
        Ok(())
    }

    fn init_game(&mut self, ctx: &mut GameContext<'_>) {
        log::info!(
            "starting at {:02.0}:00, window {}x{}",
            ctx.time_of_day.hour(),
            ctx.window.pixel_size.width,
            ctx.window.pixel_size.height
        );
    }

    fn update_game(&mut self, ctx: &mut GameContext<'_>, dt: f32) {
        if ctx.input.key_state(KeyCode::KeyF) == ButtonState::Pressed {
            ctx.toggle_fullscreen();
        }

        self.elapsed += dt;
        if self.elapsed - self.last_report >= 5.0 {
            self.last_report = self.elapsed;
            log::debug!(
                "{:.0}s in, {} actors, hour {:.1}",
                self.elapsed,
                ctx.actors.len(),
                ctx.time_of_day.hour()
            );
        }
    }

    fn shutdown_game(&mut self, ctx: &mut GameContext<'_>) {
        let spawned = self
            .spawner
            .and_then(|id| ctx.actors.get::<Spawner>(id))
            .map_or(0, Spawner::spawned);
        log::info!("orbit demo finished after {:.1}s, {} sparks", self.elapsed, spawned);
    }
}
