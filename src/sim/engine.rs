//! Frame engine
//!
//! Owns the entity registry, the particle system, the viewport and the clock.
//! Each frame: clamp Δt, update entities in registration order, sweep the
//! inactive ones, update particles, run the active game's hook, then render
//! entities, particles and the hook's overlay on top.

use glam::Vec2;

use super::Player;
use super::entity::{Entity, EntityId, GameObject};
use super::particles::ParticleSystem;
use crate::audio::Sound;
use crate::consts::{FPS_WINDOW_MS, MAX_FRAME_DT};
use crate::renderer::{Canvas, Color};

/// Something a simulation reports upward during a frame
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    Sound(Sound),
    Score { player_one: u32, player_two: u32 },
    GameOver { winner: Player },
}

/// Per-frame hook the active game installs into the engine
pub trait FrameHook {
    /// Runs after entities and particles have been updated
    fn update(&mut self, engine: &mut Engine);
    /// Runs after entities and particles have been drawn
    fn render(&self, engine: &Engine, canvas: &mut dyn Canvas);
}

#[derive(Debug, Clone)]
struct Slot {
    id: EntityId,
    entity: Entity,
}

pub struct Engine {
    entities: Vec<Slot>,
    next_id: u32,
    particles: ParticleSystem,
    viewport: Vec2,
    running: bool,
    last_frame_ms: Option<f64>,
    delta: f32,
    clock: f64,
    fps: u32,
    fps_frames: u32,
    fps_window_start: Option<f64>,
    events: Vec<SimEvent>,
}

impl Engine {
    pub fn new(viewport: Vec2, seed: u64) -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
            particles: ParticleSystem::new(seed),
            viewport,
            running: false,
            last_frame_ms: None,
            delta: 0.0,
            clock: 0.0,
            fps: 0,
            fps_frames: 0,
            fps_window_start: None,
            events: Vec::new(),
        }
    }

    // === Lifecycle ===

    pub fn start(&mut self, now_ms: f64) {
        self.running = true;
        self.last_frame_ms = Some(now_ms);
        self.fps_window_start = Some(now_ms);
        self.fps_frames = 0;
        log::debug!("Engine started");
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.last_frame_ms = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Takes effect from the next frame on
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Clamped Δt of the current frame (seconds)
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Seconds of stepped (unpaused) time since creation
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    // === Registry ===

    pub fn add(&mut self, entity: impl Into<Entity>) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push(Slot {
            id,
            entity: entity.into(),
        });
        id
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.index_of(id)?;
        Some(self.entities.remove(index).entity)
    }

    /// Drop every entity and particle
    pub fn clear(&mut self) {
        self.entities.clear();
        self.particles.clear();
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|s| s.id == id).map(|s| &s.entity)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities
            .iter_mut()
            .find(|s| s.id == id)
            .map(|s| &mut s.entity)
    }

    /// Mutable access to two distinct entities at once
    pub fn pair_mut(&mut self, a: EntityId, b: EntityId) -> Option<(&mut Entity, &mut Entity)> {
        let ia = self.index_of(a)?;
        let ib = self.index_of(b)?;
        if ia == ib {
            return None;
        }
        if ia < ib {
            let (head, tail) = self.entities.split_at_mut(ib);
            Some((&mut head[ia].entity, &mut tail[0].entity))
        } else {
            let (head, tail) = self.entities.split_at_mut(ia);
            Some((&mut tail[0].entity, &mut head[ib].entity))
        }
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|s| s.id == id)
    }

    /// Registered and not yet destroyed
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(|e| e.is_active())
    }

    /// Entities in registration order
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter().map(|s| (s.id, &s.entity))
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // === Particles and events ===

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut ParticleSystem {
        &mut self.particles
    }

    pub fn burst(&mut self, origin: Vec2, count: usize, color: Color) {
        self.particles.emit(origin, count, color);
    }

    pub fn emit(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn play(&mut self, sound: Sound) {
        self.events.push(SimEvent::Sound(sound));
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    // === Frame ===

    /// Advance by `elapsed` seconds of wall time. Δt is clamped to
    /// `MAX_FRAME_DT`; the clock advances by the full elapsed time.
    pub fn step(&mut self, elapsed: f32, hook: Option<&mut (dyn FrameHook + '_)>) {
        let elapsed = elapsed.max(0.0);
        self.delta = elapsed.min(MAX_FRAME_DT);
        self.clock += elapsed as f64;
        let dt = self.delta;

        for slot in &mut self.entities {
            slot.entity.update(dt);
        }
        self.entities.retain(|s| s.entity.is_active());
        self.particles.update(dt);

        if let Some(hook) = hook {
            hook.update(self);
        }
    }

    pub fn render(&self, canvas: &mut dyn Canvas, hook: Option<&(dyn FrameHook + '_)>) {
        canvas.clear(self.viewport);
        for slot in &self.entities {
            if slot.entity.is_active() {
                slot.entity.render(canvas);
            }
        }
        self.particles.render(canvas);
        if let Some(hook) = hook {
            hook.render(self, canvas);
        }
    }

    /// One animation frame at timestamp `now_ms`: step then render
    pub fn frame(
        &mut self,
        now_ms: f64,
        mut hook: Option<&mut (dyn FrameHook + '_)>,
        canvas: &mut dyn Canvas,
    ) {
        if !self.running {
            return;
        }
        let elapsed = self.take_elapsed(now_ms);
        self.step(elapsed, hook.as_deref_mut());
        self.render(canvas, hook.as_deref());
        self.count_frame(now_ms);
    }

    /// A frame that renders without stepping; the clock holds still
    pub fn idle_frame(
        &mut self,
        now_ms: f64,
        hook: Option<&(dyn FrameHook + '_)>,
        canvas: &mut dyn Canvas,
    ) {
        if !self.running {
            return;
        }
        self.take_elapsed(now_ms);
        self.delta = 0.0;
        self.render(canvas, hook);
        self.count_frame(now_ms);
    }

    fn take_elapsed(&mut self, now_ms: f64) -> f32 {
        let last = self.last_frame_ms.replace(now_ms).unwrap_or(now_ms);
        ((now_ms - last) / 1000.0).max(0.0) as f32
    }

    fn count_frame(&mut self, now_ms: f64) {
        self.fps_frames += 1;
        let start = *self.fps_window_start.get_or_insert(now_ms);
        let window = now_ms - start;
        if window >= FPS_WINDOW_MS {
            self.fps = (self.fps_frames as f64 * 1000.0 / window).round() as u32;
            self.fps_frames = 0;
            self.fps_window_start = Some(now_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{CommandBuffer, DrawCommand};
    use crate::sim::{Ball, Bullet};

    struct Recorder {
        updates: u32,
        saw_entities: usize,
    }

    impl FrameHook for Recorder {
        fn update(&mut self, engine: &mut Engine) {
            self.updates += 1;
            self.saw_entities = engine.entity_count();
        }

        fn render(&self, _engine: &Engine, canvas: &mut dyn Canvas) {
            canvas.save();
            canvas.restore();
        }
    }

    fn moving_ball(engine: &mut Engine) -> EntityId {
        let mut ball = Ball::new(Vec2::new(100.0, 100.0), 8.0, 300.0, 600.0);
        ball.body.velocity = Vec2::new(300.0, 0.0);
        engine.add(ball)
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut engine = Engine::new(Vec2::new(800.0, 400.0), 1);
        let id = moving_ball(&mut engine);
        engine.step(0.5, None);
        assert!((engine.delta() - MAX_FRAME_DT).abs() < 1e-6);
        assert!((engine.clock() - 0.5).abs() < 1e-6);
        let x = engine.get(id).unwrap().body().position.x;
        assert!((x - 110.0).abs() < 1e-3);
    }

    #[test]
    fn test_destroyed_entities_are_swept_before_hook() {
        let mut engine = Engine::new(Vec2::new(800.0, 400.0), 1);
        let keep = moving_ball(&mut engine);
        let gone = engine.add(Bullet::new(Vec2::ZERO, Vec2::X, 10.0, Player::One));
        engine.get_mut(gone).unwrap().destroy();
        assert!(!engine.is_alive(gone));

        let mut hook = Recorder {
            updates: 0,
            saw_entities: 0,
        };
        engine.step(0.016, Some(&mut hook));
        assert_eq!(hook.updates, 1);
        assert_eq!(hook.saw_entities, 1);
        assert!(engine.get(gone).is_none());
        assert!(engine.is_alive(keep));
    }

    #[test]
    fn test_registry_order_and_remove() {
        let mut engine = Engine::new(Vec2::new(800.0, 400.0), 1);
        let a = moving_ball(&mut engine);
        let b = moving_ball(&mut engine);
        let c = moving_ball(&mut engine);
        assert!(engine.remove(b).is_some());
        assert!(engine.remove(b).is_none());
        let ids: Vec<_> = engine.entities().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, c]);
        engine.burst(Vec2::ZERO, 5, crate::renderer::colors::WHITE);
        engine.clear();
        assert_eq!(engine.entity_count(), 0);
        assert!(engine.particles().is_empty());
    }

    #[test]
    fn test_pair_mut_in_either_order() {
        let mut engine = Engine::new(Vec2::new(800.0, 400.0), 1);
        let a = moving_ball(&mut engine);
        let b = engine.add(Bullet::new(Vec2::ZERO, Vec2::X, 10.0, Player::Two));
        let (first, second) = engine.pair_mut(b, a).unwrap();
        assert!(first.as_bullet_mut().is_some());
        assert!(second.as_ball_mut().is_some());
        assert!(engine.pair_mut(a, a).is_none());
        assert!(engine.pair_mut(a, EntityId(99)).is_none());
    }

    #[test]
    fn test_frame_renders_in_layers() {
        let mut engine = Engine::new(Vec2::new(800.0, 400.0), 1);
        moving_ball(&mut engine);
        let mut hook = Recorder {
            updates: 0,
            saw_entities: 0,
        };
        let mut canvas = CommandBuffer::new();

        // Not started: nothing happens
        engine.frame(0.0, Some(&mut hook), &mut canvas);
        assert!(canvas.is_empty());

        engine.start(0.0);
        engine.frame(16.0, Some(&mut hook), &mut canvas);
        assert_eq!(hook.updates, 1);
        assert_eq!(canvas.commands()[0], DrawCommand::Clear(Vec2::new(800.0, 400.0)));
        assert_eq!(canvas.commands().last(), Some(&DrawCommand::Restore));
        assert!(canvas.is_balanced());
    }

    #[test]
    fn test_idle_frame_holds_clock() {
        let mut engine = Engine::new(Vec2::new(800.0, 400.0), 1);
        let id = moving_ball(&mut engine);
        let mut canvas = CommandBuffer::new();
        engine.start(0.0);
        engine.idle_frame(500.0, None, &mut canvas);
        assert_eq!(engine.clock(), 0.0);
        assert_eq!(engine.get(id).unwrap().body().position.x, 100.0);
        // Resuming does not replay the held time
        engine.frame(516.0, None, &mut canvas);
        assert!((engine.clock() - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_fps_window() {
        let mut engine = Engine::new(Vec2::new(800.0, 400.0), 1);
        let mut canvas = CommandBuffer::new();
        engine.start(0.0);
        for i in 1..=60 {
            engine.frame(i as f64 * 1000.0 / 60.0, None, &mut canvas);
        }
        assert_eq!(engine.fps(), 60);
    }

    #[test]
    fn test_resize_applies_to_next_frame() {
        let mut engine = Engine::new(Vec2::new(800.0, 400.0), 1);
        let mut canvas = CommandBuffer::new();
        engine.start(0.0);
        engine.resize(1024.0, 768.0);
        engine.frame(16.0, None, &mut canvas);
        assert_eq!(canvas.commands()[0], DrawCommand::Clear(Vec2::new(1024.0, 768.0)));
    }
}
