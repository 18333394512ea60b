//! Short-lived cosmetic particles
//!
//! Particles never interact with gameplay. Each burst sprays in random
//! directions; gravity pulls them down while they fade out.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::{Body, GameObject};
use crate::consts::{MAX_PARTICLES, PARTICLE_GRAVITY};
use crate::geometry::{Circle, Shape, from_angle};
use crate::renderer::{Canvas, Color};

#[derive(Debug, Clone)]
pub struct Particle {
    pub body: Body,
    pub color: Color,
    pub size: f32,
    life: f32,
    max_life: f32,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, life: f32, size: f32, color: Color) -> Self {
        let mut body = Body::new(position);
        body.velocity = velocity;
        body.acceleration = Vec2::new(0.0, PARTICLE_GRAVITY);
        Self {
            body,
            color,
            size,
            life,
            max_life: life,
        }
    }

    pub fn life(&self) -> f32 {
        self.life
    }

    /// Remaining life fraction, used as opacity
    pub fn alpha(&self) -> f32 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

impl GameObject for Particle {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update(&mut self, dt: f32) {
        self.life -= dt;
        if self.life <= 0.0 {
            self.body.destroy();
        }
        self.body.integrate(dt);
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.set_alpha(self.alpha());
        canvas.fill_circle(Vec2::ZERO, self.size, self.color);
        canvas.set_alpha(1.0);
    }

    fn bounds(&self) -> Shape {
        Shape::Circle(Circle::new(self.body.position, self.size))
    }
}

/// Owns every live particle
pub struct ParticleSystem {
    particles: Vec<Particle>,
    rng: Pcg32,
    cap: usize,
}

impl ParticleSystem {
    pub fn new(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            cap: MAX_PARTICLES,
        }
    }

    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    /// Spray `count` particles from `origin`
    pub fn emit(&mut self, origin: Vec2, count: usize, color: Color) {
        for _ in 0..count {
            let angle = self.rng.random_range(0.0..TAU);
            let speed = self.rng.random_range(50.0..200.0);
            let life = self.rng.random_range(0.5..1.5);
            let size = self.rng.random_range(2.0..6.0);
            self.particles
                .push(Particle::new(origin, from_angle(angle, speed), life, size, color));
        }
        if self.particles.len() > self.cap {
            let excess = self.particles.len() - self.cap;
            self.particles.drain(..excess);
        }
    }

    /// Age every particle and drop the expired ones
    pub fn update(&mut self, dt: f32) {
        for particle in &mut self.particles {
            particle.update(dt);
        }
        self.particles.retain(|p| p.is_active());
    }

    pub fn render(&self, canvas: &mut dyn Canvas) {
        for particle in &self.particles {
            particle.render(canvas);
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}
