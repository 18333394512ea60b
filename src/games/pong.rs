//! Pong
//!
//! Paddles on the left (player one) and right (player two) edges. The ball
//! scores once it is `goal_margin` past an edge; first to `win_score` wins.
//! Each player steers from their own quadrant: bottom-left for player one,
//! top-right for player two.

use std::f32::consts::FRAC_PI_4;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{GameKind, MatchState, Scoreboard, Simulation, ball_mut, ball_ref, draw_winner_banner};
use crate::audio::Sound;
use crate::geometry::Rect;
use crate::input::{InputSurface, Split, control_point};
use crate::renderer::{Canvas, colors};
use crate::settings::Settings;
use crate::sim::{Ball, Engine, EntityId, Paddle, Player, Timers};
use crate::tuning::PongTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Serve,
}

#[derive(Debug, Clone, Copy)]
struct Table {
    paddles: [EntityId; 2],
    ball: EntityId,
}

impl Table {
    fn paddle(&self, player: Player) -> EntityId {
        match player {
            Player::One => self.paddles[0],
            Player::Two => self.paddles[1],
        }
    }
}

pub struct Pong {
    tuning: PongTuning,
    settings: Settings,
    state: MatchState,
    timers: Timers<Task>,
    table: Option<Table>,
    rng: Pcg32,
}

impl Pong {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(PongTuning::default(), seed)
    }

    pub fn with_tuning(tuning: PongTuning, seed: u64) -> Self {
        Self {
            tuning,
            settings: Settings::default(),
            state: MatchState::default(),
            timers: Timers::new(),
            table: None,
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
        let x = match player {
            Player::One => self.tuning.paddle_inset,
            Player::Two => viewport.x - self.tuning.paddle_inset,
        };
        Vec2::new(x, viewport.y / 2.0)
    }

    /// Lane each paddle may travel in: an 80px strip around its edge
    fn lane(player: Player, viewport: Vec2) -> Rect {
        let x = match player {
            Player::One => 20.0,
            Player::Two => viewport.x - 100.0,
        };
        Rect::new(x, 20.0, 80.0, viewport.y - 40.0)
    }

    /// Launch from the centre toward whoever is behind (random on a tie)
    fn serve(&mut self, engine: &mut Engine, table: Table) {
        let center = engine.viewport() / 2.0;
        let angle = self.rng.random_range(-FRAC_PI_4..FRAC_PI_4);
        let toward = match self.state.scores().trailing() {
            Some(Player::One) => -1.0,
            Some(Player::Two) => 1.0,
            None if self.rng.random_bool(0.5) => -1.0,
            None => 1.0,
        };
        let speed = self.ball_speed();
        if let Some(ball) = ball_mut(engine, table.ball) {
            ball.speed = speed;
            ball.serve(center, Vec2::new(angle.cos() * toward, angle.sin()));
        }
    }

    fn bounce_walls(&mut self, engine: &mut Engine, table: Table) {
        let height = engine.viewport().y;
        let Some(ball) = ball_mut(engine, table.ball) else {
            return;
        };
        let pos = ball.body.position;
        let vy = ball.body.velocity.y;
        let (normal, edge) = if pos.y - ball.radius <= 0.0 && vy < 0.0 {
            (Vec2::Y, 0.0)
        } else if pos.y + ball.radius >= height && vy > 0.0 {
            (Vec2::NEG_Y, height)
        } else {
            return;
        };
        ball.bounce_off_wall(normal);
        ball.body.position.y = pos.y.clamp(ball.radius, (height - ball.radius).max(ball.radius));
        let spark = Vec2::new(ball.body.position.x, edge);

        engine.play(Sound::WallHit);
        engine.burst(spark, 5, colors::SPARK);
    }

    fn hit_paddles(&mut self, engine: &mut Engine, table: Table) {
        for player in [Player::One, Player::Two] {
            let Some((ball, paddle)) = engine.pair_mut(table.ball, table.paddle(player)) else {
                continue;
            };
            let (Some(ball), Some(paddle)) = (ball.as_ball_mut(), paddle.as_paddle_mut()) else {
                continue;
            };
            // Only a ball travelling toward the paddle can be returned
            let approaching = match player {
                Player::One => ball.body.velocity.x < 0.0,
                Player::Two => ball.body.velocity.x > 0.0,
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

    fn check_goal(&mut self, engine: &mut Engine, table: Table) {
        let width = engine.viewport().x;
        let Some(ball) = ball_ref(engine, table.ball) else {
            return;
        };
        let x = ball.body.position.x;
        if x < -self.tuning.goal_margin {
            self.score(engine, table, Player::Two);
        } else if x > width + self.tuning.goal_margin {
            self.score(engine, table, Player::One);
        }
    }

    fn score(&mut self, engine: &mut Engine, table: Table, scorer: Player) {
        let viewport = engine.viewport();
        self.state.award(engine, scorer, 1);
        engine.play(Sound::Score);
        let goal_x = match scorer {
            Player::One => viewport.x,
            Player::Two => 0.0,
        };
        engine.burst(Vec2::new(goal_x, viewport.y / 2.0), 20, scorer.color());

        if let Some(ball) = ball_mut(engine, table.ball) {
            ball.park(viewport / 2.0);
        }

        if let Some(winner) = self.state.scores().reached(self.tuning.win_score) {
            self.state.finish(engine, winner);
            self.timers.clear();
        } else {
            self.timers
                .schedule(engine.clock(), self.tuning.serve_delay, Task::Serve);
        }
    }

    fn steer(&self, engine: &mut Engine, table: Table, input: &dyn InputSurface) {
        let viewport = engine.viewport();
        for player in [Player::One, Player::Two] {
            let Some(point) = control_point(input, viewport, player, Split::Quadrants) else {
                continue;
            };
            if let Some(paddle) = engine
                .get_mut(table.paddle(player))
                .and_then(|e| e.as_paddle_mut())
            {
                let x = paddle.body.position.x;
                paddle.move_to(Vec2::new(x, point.y));
            }
        }
    }
}

impl Simulation for Pong {
    fn kind(&self) -> GameKind {
        GameKind::Pong
    }

    fn init(&mut self, engine: &mut Engine, settings: &Settings) {
        self.settings = settings.clone();
        let viewport = engine.viewport();
        let size = self.paddle_size();

        let mut paddles = [EntityId(0); 2];
        for (slot, player) in paddles.iter_mut().zip([Player::One, Player::Two]) {
            let face = match player {
                Player::One => Vec2::X,
                Player::Two => Vec2::NEG_X,
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

        let ball = Ball::new(
            viewport / 2.0,
            self.tuning.ball_radius,
            self.ball_speed(),
            self.ball_max_speed(),
        );
        let table = Table {
            paddles,
            ball: engine.add(ball),
        };
        self.table = Some(table);
        self.serve(engine, table);
        log::info!("Pong ready");
    }

    fn update(&mut self, engine: &mut Engine, input: &dyn InputSurface) {
        if self.state.is_over() {
            return;
        }
        let Some(table) = self.table else {
            return;
        };

        for task in self.timers.poll(engine.clock()) {
            match task {
                Task::Serve if !self.state.is_over() => self.serve(engine, table),
                Task::Serve => {}
            }
        }

        let in_play = ball_ref(engine, table.ball).is_some_and(|b| !b.is_parked());
        if in_play {
            self.bounce_walls(engine, table);
            self.hit_paddles(engine, table);
            self.check_goal(engine, table);
        }
        self.steer(engine, table, input);
    }

    fn render(&self, engine: &Engine, canvas: &mut dyn Canvas) {
        let viewport = engine.viewport();
        let center = viewport / 2.0;

        canvas.line(
            Vec2::new(center.x, 0.0),
            Vec2::new(center.x, viewport.y),
            colors::WHITE.with_alpha(0.3),
            2.0,
            Some([10.0, 10.0]),
        );
        canvas.stroke_circle(center, 50.0, colors::WHITE.with_alpha(0.2), 3.0);

        let goal = colors::WHITE.with_alpha(0.1);
        let mouth_y = viewport.y * 0.3;
        let mouth_h = viewport.y * 0.4;
        canvas.stroke_rect(Rect::new(0.0, mouth_y, 50.0, mouth_h), goal, 2.0);
        canvas.stroke_rect(Rect::new(viewport.x - 50.0, mouth_y, 50.0, mouth_h), goal, 2.0);

        if let Some(winner) = self.state.winner() {
            draw_winner_banner(canvas, viewport, winner, None);
        }
    }

    fn restart(&mut self, engine: &mut Engine) {
        self.state.reset(engine);
        self.timers.clear();
        let Some(table) = self.table else {
            return;
        };
        let viewport = engine.viewport();
        for player in [Player::One, Player::Two] {
            let home = self.home(player, viewport);
            if let Some(paddle) = engine
                .get_mut(table.paddle(player))
                .and_then(|e| e.as_paddle_mut())
            {
                paddle.place(home);
            }
        }
        self.serve(engine, table);
        log::info!("Pong restarted");
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        self.timers.clear();
        if let Some(table) = self.table.take() {
            for id in table.paddles.into_iter().chain([table.ball]) {
                engine.remove(id);
            }
        }
        engine.particles_mut().clear();
    }

    fn update_settings(&mut self, engine: &mut Engine, settings: &Settings) {
        self.settings = settings.clone();
        let Some(table) = self.table else {
            return;
        };
        let size = self.paddle_size();
        for id in table.paddles {
            if let Some(paddle) = engine.get_mut(id).and_then(|e| e.as_paddle_mut()) {
                paddle.size = size;
            }
        }
        let (speed, max_speed) = (self.ball_speed(), self.ball_max_speed());
        if let Some(ball) = ball_mut(engine, table.ball) {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{no_input, run_frames};
    use crate::input::PointerTracker;
    use crate::renderer::CommandBuffer;
    use crate::sim::SimEvent;

    const VIEW: Vec2 = Vec2::new(800.0, 400.0);

    fn setup() -> (Engine, Pong) {
        let mut engine = Engine::new(VIEW, 3);
        let mut pong = Pong::new(3);
        pong.init(&mut engine, &Settings::default());
        (engine, pong)
    }

    fn ball(engine: &Engine, pong: &Pong) -> Ball {
        ball_ref(engine, pong.table.unwrap().ball).unwrap().clone()
    }

    fn place_ball(engine: &mut Engine, pong: &Pong, pos: Vec2, vel: Vec2) {
        let b = ball_mut(engine, pong.table.unwrap().ball).unwrap();
        b.body.position = pos;
        b.body.velocity = vel;
    }

    #[test]
    fn test_init_layout() {
        let (engine, pong) = setup();
        assert_eq!(engine.entity_count(), 3);
        let b = ball(&engine, &pong);
        assert_eq!(b.body.position, VIEW / 2.0);
        assert!((b.body.velocity.length() - 300.0).abs() < 1e-3);
        // Tie at 0:0, so any direction within ±45° of horizontal
        assert!(b.body.velocity.x.abs() >= b.body.velocity.y.abs() - 1e-3);
    }

    #[test]
    fn test_left_exit_scores_for_player_two() {
        let (mut engine, mut pong) = setup();
        place_ball(&mut engine, &pong, Vec2::new(-51.0, 200.0), Vec2::new(-300.0, 0.0));
        pong.update(&mut engine, &no_input());

        assert_eq!(pong.scores(), Scoreboard { player_one: 0, player_two: 1 });
        let b = ball(&engine, &pong);
        assert!(b.is_parked());
        assert_eq!(b.body.position, VIEW / 2.0);

        // A parked ball cannot score twice
        pong.update(&mut engine, &no_input());
        assert_eq!(pong.scores().player_two, 1);

        // Serve after the delay, toward the trailing player on the left
        run_frames(&mut engine, &mut pong, &no_input(), 65);
        let b = ball(&engine, &pong);
        assert!(!b.is_parked());
        assert!(b.body.velocity.x < 0.0);
        assert!((b.body.velocity.length() - 300.0).abs() < 1e-2);
    }

    #[test]
    fn test_right_exit_scores_for_player_one() {
        let (mut engine, mut pong) = setup();
        place_ball(&mut engine, &pong, Vec2::new(851.0, 100.0), Vec2::new(300.0, 0.0));
        pong.update(&mut engine, &no_input());
        assert_eq!(pong.scores(), Scoreboard { player_one: 1, player_two: 0 });
        let events = engine.drain_events();
        assert!(events.contains(&SimEvent::Sound(Sound::Score)));
    }

    #[test]
    fn test_wall_bounce_speeds_up() {
        let (mut engine, mut pong) = setup();
        place_ball(&mut engine, &pong, Vec2::new(400.0, 5.0), Vec2::new(100.0, -200.0));
        pong.update(&mut engine, &no_input());
        let b = ball(&engine, &pong);
        assert!(b.body.velocity.y > 0.0);
        assert_eq!(b.body.position.y, 8.0);
        let expected = Vec2::new(100.0, -200.0).length() * 1.02;
        assert!((b.body.velocity.length() - expected).abs() < 1e-2);
        assert!(engine.drain_events().contains(&SimEvent::Sound(Sound::WallHit)));
    }

    #[test]
    fn test_paddle_returns_only_approaching_ball() {
        let (mut engine, mut pong) = setup();
        // Overlapping player one's paddle while moving away: untouched
        place_ball(&mut engine, &pong, Vec2::new(55.0, 200.0), Vec2::new(300.0, 0.0));
        pong.update(&mut engine, &no_input());
        assert_eq!(ball(&engine, &pong).body.velocity, Vec2::new(300.0, 0.0));

        place_ball(&mut engine, &pong, Vec2::new(55.0, 200.0), Vec2::new(-300.0, 0.0));
        pong.update(&mut engine, &no_input());
        let b = ball(&engine, &pong);
        assert!(b.body.velocity.x > 0.0);
        assert!((b.body.velocity.length() - 315.0).abs() < 1e-2);
        assert_eq!(b.last_paddle_hit, Some(Player::One));
    }

    #[test]
    fn test_quadrant_steering_mirrors_player_one() {
        let (mut engine, mut pong) = setup();
        let mut input = PointerTracker::new();
        // Bottom-left belongs to player one; mirrored y = 400 - 350 = 50
        input.pointer_down(1, Vec2::new(100.0, 350.0), 0.0);
        // Top-left belongs to nobody
        input.pointer_down(2, Vec2::new(100.0, 50.0), 0.0);
        pong.update(&mut engine, &input);
        let table = pong.table.unwrap();
        let p1 = engine.get(table.paddles[0]).unwrap().as_paddle().unwrap();
        assert_eq!(p1.target(), Vec2::new(50.0, 50.0));
        let p2 = engine.get(table.paddles[1]).unwrap().as_paddle().unwrap();
        assert_eq!(p2.target(), Vec2::new(750.0, 200.0));
    }

    #[test]
    fn test_match_point_ends_game() {
        let (mut engine, mut pong) = setup();
        for _ in 0..11 {
            place_ball(&mut engine, &pong, Vec2::new(-60.0, 200.0), Vec2::new(-300.0, 0.0));
            pong.update(&mut engine, &no_input());
            // Flush the pending serve
            run_frames(&mut engine, &mut pong, &no_input(), 65);
        }
        assert!(pong.is_game_over());
        assert_eq!(pong.winner(), Some(Player::Two));
        assert_eq!(pong.scores().player_two, 11);
        assert!(engine.drain_events().contains(&SimEvent::GameOver { winner: Player::Two }));

        // Frozen: no serve, no more scoring
        run_frames(&mut engine, &mut pong, &no_input(), 120);
        assert!(ball(&engine, &pong).is_parked());

        let mut canvas = CommandBuffer::new();
        engine.render(&mut canvas, None);
        pong.render(&engine, &mut canvas);
        assert!(canvas.texts().any(|t| t == "Player 2 Wins!"));
    }

    #[test]
    fn test_serve_pending_at_match_end_never_fires() {
        let (mut engine, mut pong) = setup();
        place_ball(&mut engine, &pong, Vec2::new(-51.0, 200.0), Vec2::new(-300.0, 0.0));
        pong.update(&mut engine, &no_input());
        assert_eq!(pong.timers.len(), 1);

        // The match ends while the serve is still queued
        pong.state.finish(&mut engine, Player::Two);
        run_frames(&mut engine, &mut pong, &no_input(), 120);

        let b = ball(&engine, &pong);
        assert!(b.is_parked());
        assert_eq!(b.body.velocity, Vec2::ZERO);
        assert_eq!(pong.scores(), Scoreboard { player_one: 0, player_two: 1 });
    }

    #[test]
    fn test_restart_restores_spawn() {
        let (mut engine, mut pong) = setup();
        place_ball(&mut engine, &pong, Vec2::new(-60.0, 200.0), Vec2::new(-300.0, 0.0));
        pong.update(&mut engine, &no_input());
        let table = pong.table.unwrap();
        engine
            .get_mut(table.paddles[0])
            .unwrap()
            .as_paddle_mut()
            .unwrap()
            .place(Vec2::new(50.0, 40.0));

        pong.restart(&mut engine);
        assert_eq!(pong.scores(), Scoreboard::default());
        assert!(!pong.is_game_over());
        assert!(pong.timers.is_empty());
        let p1 = engine.get(table.paddles[0]).unwrap().as_paddle().unwrap();
        assert_eq!(p1.body.position, Vec2::new(50.0, 200.0));
        assert!(!ball(&engine, &pong).is_parked());
    }

    #[test]
    fn test_settings_rescale_without_moving() {
        let (mut engine, mut pong) = setup();
        let before = ball(&engine, &pong).body.position;
        let settings = Settings {
            game_speed: 2.0,
            paddle_size: 0.5,
            ..Settings::default()
        };
        pong.update_settings(&mut engine, &settings);
        let b = ball(&engine, &pong);
        assert_eq!(b.body.position, before);
        assert!((b.body.velocity.length() - 600.0).abs() < 1e-2);
        assert_eq!(b.max_speed, 1200.0);
        let table = pong.table.unwrap();
        let p1 = engine.get(table.paddles[0]).unwrap().as_paddle().unwrap();
        assert_eq!(p1.size, Vec2::new(7.5, 40.0));
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let (mut engine, mut pong) = setup();
        engine.burst(Vec2::ZERO, 10, colors::SPARK);
        pong.cleanup(&mut engine);
        pong.cleanup(&mut engine);
        assert_eq!(engine.entity_count(), 0);
        assert!(engine.particles().is_empty());
        // Updating a torn-down game does nothing
        pong.update(&mut engine, &no_input());
    }
}
