//! Breakout Duel
//!
//! Paddles along the bottom (player one) and top (player two) edges, each
//! guarding a wall of bricks in front of it. Breaking an opponent's brick is
//! worth `points_per_brick`; the first player whose wall is gone loses.

use std::f32::consts::FRAC_PI_4;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{GameKind, MatchState, Scoreboard, Simulation, ball_mut, ball_ref, draw_winner_banner};
use crate::audio::Sound;
use crate::geometry::Rect;
use crate::input::{InputSurface, Split, control_point};
use crate::renderer::{Canvas, Font, colors};
use crate::settings::Settings;
use crate::sim::physics::{self, Axis};
use crate::sim::{Ball, Brick, Engine, EntityId, Paddle, Player};
use crate::tuning::BreakoutTuning;

#[derive(Debug, Clone, Copy)]
struct Court {
    paddles: [EntityId; 2],
    ball: EntityId,
}

impl Court {
    fn paddle(&self, player: Player) -> EntityId {
        match player {
            Player::One => self.paddles[0],
            Player::Two => self.paddles[1],
        }
    }
}

pub struct Breakout {
    tuning: BreakoutTuning,
    settings: Settings,
    state: MatchState,
    court: Option<Court>,
    /// Brick handles per owner, in layout order
    walls: [Vec<EntityId>; 2],
    rng: Pcg32,
}

fn seat(player: Player) -> usize {
    match player {
        Player::One => 0,
        Player::Two => 1,
    }
}

impl Breakout {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(BreakoutTuning::default(), seed)
    }

    pub fn with_tuning(tuning: BreakoutTuning, seed: u64) -> Self {
        Self {
            tuning,
            settings: Settings::default(),
            state: MatchState::default(),
            court: None,
            walls: [Vec::new(), Vec::new()],
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    fn paddle_size(&self) -> Vec2 {
        Vec2::new(self.tuning.paddle_width, self.tuning.paddle_height) * self.settings.paddle_size
    }

    fn ball_speed(&self) -> f32 {
        self.tuning.ball_speed * self.settings.game_speed
    }

    fn ball_max_speed(&self) -> f32 {
        self.tuning.ball_max_speed * self.settings.game_speed
    }

    fn home(&self, player: Player, viewport: Vec2) -> Vec2 {
        let y = match player {
            Player::One => viewport.y - self.tuning.paddle_inset,
            Player::Two => self.tuning.paddle_inset,
        };
        Vec2::new(viewport.x / 2.0, y)
    }

    /// Strip each paddle slides in
    fn lane(player: Player, viewport: Vec2) -> Rect {
        let y = match player {
            Player::One => viewport.y - 80.0,
            Player::Two => 20.0,
        };
        Rect::new(0.0, y, viewport.x, 60.0)
    }

    /// Lay out both walls, centred horizontally. Player one's rows stack up
    /// from `wall_offset_bottom`; player two's stack down from `wall_offset_top`.
    fn build_walls(&mut self, engine: &mut Engine) {
        let viewport = engine.viewport();
        let t = &self.tuning;
        let pitch = Vec2::new(t.brick_width, t.brick_height);
        let size = pitch - Vec2::splat(t.brick_gap);
        let start_x = (viewport.x - t.brick_cols as f32 * t.brick_width) / 2.0;

        let mut walls = [Vec::new(), Vec::new()];
        for player in [Player::One, Player::Two] {
            for row in 0..t.brick_rows {
                for col in 0..t.brick_cols {
                    let x = start_x + col as f32 * pitch.x;
                    let y = match player {
                        Player::One => viewport.y - t.wall_offset_bottom - row as f32 * pitch.y,
                        Player::Two => t.wall_offset_top + row as f32 * pitch.y,
                    };
                    let brick = Brick::new(Vec2::new(x, y) + size / 2.0, size, player, t.brick_health);
                    walls[seat(player)].push(engine.add(brick));
                }
            }
        }
        log::debug!("Built {} bricks per wall", walls[0].len());
        self.walls = walls;
    }

    fn remove_walls(&mut self, engine: &mut Engine) {
        for id in self.walls.iter_mut().flat_map(std::mem::take) {
            engine.remove(id);
        }
    }

    /// Bricks still standing for `player`
    pub fn bricks_left(&self, engine: &Engine, player: Player) -> usize {
        self.walls[seat(player)]
            .iter()
            .filter(|id| engine.is_alive(**id))
            .count()
    }

    /// Launch from the centre, up or down at random
    fn serve(&mut self, engine: &mut Engine, court: Court) {
        let center = engine.viewport() / 2.0;
        let angle = self.rng.random_range(-FRAC_PI_4..FRAC_PI_4);
        let toward = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let speed = self.ball_speed();
        if let Some(ball) = ball_mut(engine, court.ball) {
            ball.speed = speed;
            ball.serve(center, Vec2::new(angle.sin(), angle.cos() * toward));
        }
    }

    /// Side walls only turn the ball around; unlike Pong they add no speed
    fn bounce_walls(&mut self, engine: &mut Engine, court: Court) {
        let width = engine.viewport().x;
        let Some(ball) = ball_mut(engine, court.ball) else {
            return;
        };
        let pos = ball.body.position;
        let vx = ball.body.velocity.x;
        let edge = if pos.x - ball.radius <= 0.0 && vx < 0.0 {
            0.0
        } else if pos.x + ball.radius >= width && vx > 0.0 {
            width
        } else {
            return;
        };
        ball.set_velocity(physics::flip(ball.body.velocity, Axis::Horizontal));
        ball.body.position.x = pos.x.clamp(ball.radius, (width - ball.radius).max(ball.radius));
        let spark = Vec2::new(edge, ball.body.position.y);

        engine.play(Sound::WallHit);
        engine.burst(spark, 5, colors::SPARK);
    }

    fn hit_paddles(&mut self, engine: &mut Engine, court: Court) {
        for player in [Player::One, Player::Two] {
            let Some((ball, paddle)) = engine.pair_mut(court.ball, court.paddle(player)) else {
                continue;
            };
            let (Some(ball), Some(paddle)) = (ball.as_ball_mut(), paddle.as_paddle_mut()) else {
                continue;
            };
            let approaching = match player {
                Player::One => ball.body.velocity.y > 0.0,
                Player::Two => ball.body.velocity.y < 0.0,
            };
            if !approaching || !ball.circle().intersects_rect(&paddle.rect()) {
                continue;
            }
            ball.bounce_off_paddle(paddle);
            let at = ball.body.position;
            let color = paddle.color;

            engine.play(Sound::PaddleHit);
            engine.burst(at, 8, color);
        }
    }

    /// Resolve at most one brick per tick: the first standing brick the ball
    /// overlaps, scanning from the last brick of player two's wall back to
    /// the first brick of player one's.
    fn hit_bricks(&mut self, engine: &mut Engine, court: Court) {
        let Some(circle) = ball_ref(engine, court.ball).map(|b| b.circle()) else {
            return;
        };
        let struck = self
            .walls
            .iter()
            .rev()
            .flat_map(|wall| wall.iter().rev())
            .copied()
            .find(|id| {
                engine
                    .get(*id)
                    .and_then(|e| e.as_brick())
                    .is_some_and(|b| b.body.active && circle.intersects_rect(&b.rect()))
            });
        let Some(id) = struck else {
            return;
        };
        let Some((ball, brick)) = engine.pair_mut(court.ball, id) else {
            return;
        };
        let (Some(ball), Some(brick)) = (ball.as_ball_mut(), brick.as_brick_mut()) else {
            return;
        };

        let axis = physics::deflection_axis(ball.body.position, &brick.rect());
        ball.set_velocity(physics::flip(ball.body.velocity, axis));
        let destroyed = brick.hit();
        let (owner, at, color) = (brick.owner, brick.body.position, brick.color);

        self.state
            .award(engine, owner.opponent(), self.tuning.points_per_brick);
        engine.burst(at, 12, color);
        engine.play(Sound::WallHit);

        if destroyed {
            self.check_walls(engine, court);
        }
    }

    /// End the match once a wall is gone. Player one is checked first.
    fn check_walls(&mut self, engine: &mut Engine, court: Court) -> bool {
        let winner = if self.bricks_left(engine, Player::One) == 0 {
            Player::Two
        } else if self.bricks_left(engine, Player::Two) == 0 {
            Player::One
        } else {
            return false;
        };
        let center = engine.viewport() / 2.0;
        if let Some(ball) = ball_mut(engine, court.ball) {
            ball.park(center);
        }
        self.state.finish(engine, winner);
        true
    }

    fn check_exit(&mut self, engine: &mut Engine, court: Court) {
        let height = engine.viewport().y;
        let margin = self.tuning.out_margin;
        let Some(y) = ball_ref(engine, court.ball).map(|b| b.body.position.y) else {
            return;
        };
        if y >= -margin && y <= height + margin {
            return;
        }
        log::debug!("Ball out at y={y:.0}");
        if !self.check_walls(engine, court) {
            self.serve(engine, court);
        }
    }

    fn steer(&self, engine: &mut Engine, court: Court, input: &dyn InputSurface) {
        let viewport = engine.viewport();
        for player in [Player::One, Player::Two] {
            let Some(point) = control_point(input, viewport, player, Split::Halves) else {
                continue;
            };
            if let Some(paddle) = engine
                .get_mut(court.paddle(player))
                .and_then(|e| e.as_paddle_mut())
            {
                let y = paddle.body.position.y;
                paddle.move_to(Vec2::new(point.x, y));
            }
        }
    }
}

impl Simulation for Breakout {
    fn kind(&self) -> GameKind {
        GameKind::Breakout
    }

    fn init(&mut self, engine: &mut Engine, settings: &Settings) {
        self.settings = settings.clone();
        let viewport = engine.viewport();
        let size = self.paddle_size();

        let mut paddles = [EntityId(0); 2];
        for (slot, player) in paddles.iter_mut().zip([Player::One, Player::Two]) {
            let face = match player {
                Player::One => Vec2::NEG_Y,
                Player::Two => Vec2::Y,
            };
            let mut paddle = Paddle::new(
                self.home(player, viewport),
                size,
                player,
                face,
                self.tuning.paddle_speed,
            );
            paddle.bounds = Some(Self::lane(player, viewport));
            *slot = engine.add(paddle);
        }

        self.build_walls(engine);

        let ball = Ball::new(
            viewport / 2.0,
            self.tuning.ball_radius,
            self.ball_speed(),
            self.ball_max_speed(),
        );
        let court = Court {
            paddles,
            ball: engine.add(ball),
        };
        self.court = Some(court);
        self.serve(engine, court);
        log::info!("Breakout Duel ready");
    }

    fn update(&mut self, engine: &mut Engine, input: &dyn InputSurface) {
        if self.state.is_over() {
            return;
        }
        let Some(court) = self.court else {
            return;
        };

        self.bounce_walls(engine, court);
        self.hit_paddles(engine, court);
        self.hit_bricks(engine, court);
        if self.state.is_over() {
            return;
        }
        self.check_exit(engine, court);
        self.steer(engine, court, input);
    }

    fn render(&self, engine: &Engine, canvas: &mut dyn Canvas) {
        let viewport = engine.viewport();
        let center = viewport / 2.0;

        canvas.line(
            Vec2::new(0.0, center.y),
            Vec2::new(viewport.x, center.y),
            colors::WHITE.with_alpha(0.2),
            2.0,
            Some([10.0, 10.0]),
        );

        let counters = [
            (Player::One, Vec2::new(viewport.x / 4.0, viewport.y - 20.0)),
            (Player::Two, Vec2::new(viewport.x * 3.0 / 4.0, 40.0)),
        ];
        for (player, at) in counters {
            canvas.text(
                &format!("Bricks: {}", self.bricks_left(engine, player)),
                at,
                Font::regular(20.0),
                player.color().with_alpha(0.7),
            );
        }

        if let Some(winner) = self.state.winner() {
            draw_winner_banner(canvas, viewport, winner, Some("All opponent bricks destroyed!"));
        }
    }

    fn restart(&mut self, engine: &mut Engine) {
        self.state.reset(engine);
        self.remove_walls(engine);
        self.build_walls(engine);
        let Some(court) = self.court else {
            return;
        };
        let viewport = engine.viewport();
        for player in [Player::One, Player::Two] {
            let home = self.home(player, viewport);
            if let Some(paddle) = engine
                .get_mut(court.paddle(player))
                .and_then(|e| e.as_paddle_mut())
            {
                paddle.place(home);
            }
        }
        self.serve(engine, court);
        log::info!("Breakout Duel restarted");
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        self.remove_walls(engine);
        if let Some(court) = self.court.take() {
            for id in court.paddles.into_iter().chain([court.ball]) {
                engine.remove(id);
            }
        }
        engine.particles_mut().clear();
    }

    fn update_settings(&mut self, engine: &mut Engine, settings: &Settings) {
        self.settings = settings.clone();
        let Some(court) = self.court else {
            return;
        };
        let size = self.paddle_size();
        for id in court.paddles {
            if let Some(paddle) = engine.get_mut(id).and_then(|e| e.as_paddle_mut()) {
                paddle.size = size;
            }
        }
        let (speed, max_speed) = (self.ball_speed(), self.ball_max_speed());
        if let Some(ball) = ball_mut(engine, court.ball) {
            ball.max_speed = max_speed;
            ball.speed = speed;
            if ball.body.velocity.length() > 0.0 {
                let direction = ball.body.velocity.normalize();
                ball.set_velocity(direction * speed);
            }
        }
    }

    fn scores(&self) -> Scoreboard {
        self.state.scores()
    }

    fn is_game_over(&self) -> bool {
        self.state.is_over()
    }

    fn winner(&self) -> Option<Player> {
        self.state.winner()
    }
}
