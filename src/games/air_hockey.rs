//! Air Hockey
//!
//! Round mallets, each confined to its own half of the table. The puck loses
//! speed to friction and to every wall or mallet contact. Reaching a side
//! edge inside the goal mouth scores; outside it the puck rebounds.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{GameKind, MatchState, Scoreboard, Simulation, ball_mut, ball_ref, draw_winner_banner};
use crate::audio::Sound;
use crate::geometry::Rect;
use crate::input::{InputSurface, Split, control_point};
use crate::renderer::{Canvas, colors};
use crate::settings::Settings;
use crate::sim::{Ball, Engine, EntityId, Mallet, Player, Timers, physics};
use crate::tuning::AirHockeyTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Serve,
}

#[derive(Debug, Clone, Copy)]
struct Rink {
    mallets: [EntityId; 2],
    puck: EntityId,
}

impl Rink {
    fn mallet(&self, player: Player) -> EntityId {
        match player {
            Player::One => self.mallets[0],
            Player::Two => self.mallets[1],
        }
    }
}

pub struct AirHockey {
    tuning: AirHockeyTuning,
    settings: Settings,
    state: MatchState,
    timers: Timers<Task>,
    rink: Option<Rink>,
    rng: Pcg32,
}

impl AirHockey {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(AirHockeyTuning::default(), seed)
    }

    pub fn with_tuning(tuning: AirHockeyTuning, seed: u64) -> Self {
        Self {
            tuning,
            settings: Settings::default(),
            state: MatchState::default(),
            timers: Timers::new(),
            rink: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    fn mallet_radius(&self) -> f32 {
        self.tuning.mallet_radius * self.settings.paddle_size
    }

    fn puck_speed(&self) -> f32 {
        self.tuning.puck_speed * self.settings.game_speed
    }

    fn puck_max_speed(&self) -> f32 {
        self.tuning.puck_max_speed * self.settings.game_speed
    }

    fn home(player: Player, viewport: Vec2) -> Vec2 {
        let x = match player {
            Player::One => viewport.x / 4.0,
            Player::Two => viewport.x * 3.0 / 4.0,
        };
        Vec2::new(x, viewport.y / 2.0)
    }

    /// Each player's half of the table, 20px in from the rails
    fn half(player: Player, viewport: Vec2) -> Rect {
        let center_x = viewport.x / 2.0;
        let x = match player {
            Player::One => 20.0,
            Player::Two => center_x + 20.0,
        };
        Rect::new(x, 20.0, center_x - 40.0, viewport.y - 40.0)
    }

    /// Goal mouth as a y range
    fn mouth(&self, height: f32) -> (f32, f32) {
        (height * self.tuning.goal_top, height * self.tuning.goal_bottom)
    }

    /// Face-off from the centre in a random direction
    fn serve(&mut self, engine: &mut Engine, rink: Rink) {
        let center = engine.viewport() / 2.0;
        let angle = self.rng.random_range(0.0..TAU);
        let speed = self.puck_speed();
        if let Some(puck) = ball_mut(engine, rink.puck) {
            puck.speed = speed;
            puck.serve(center, Vec2::from_angle(angle));
        }
    }

    fn apply_friction(&self, engine: &mut Engine, rink: Rink) {
        // Tuned per 60 Hz frame; rescale to the actual step
        let retain = self.tuning.friction.powf(engine.delta() * 60.0);
        if let Some(puck) = ball_mut(engine, rink.puck) {
            puck.body.velocity *= retain;
        }
    }

    fn bounce_rails(&mut self, engine: &mut Engine, rink: Rink) {
        let height = engine.viewport().y;
        let restitution = self.tuning.restitution;
        let Some(puck) = ball_mut(engine, rink.puck) else {
            return;
        };
        let r = puck.radius;
        let pos = puck.body.position;
        let vy = puck.body.velocity.y;
        let into_top = pos.y - r <= 0.0 && vy < 0.0;
        let into_bottom = pos.y + r >= height && vy > 0.0;
        if !(into_top || into_bottom) {
            return;
        }
        puck.body.velocity.y = -vy * restitution;
        puck.body.position.y = pos.y.clamp(r, (height - r).max(r));
        let at = puck.body.position;

        engine.play(Sound::WallHit);
        engine.burst(at, 3, colors::SPARK);
    }

    /// Score inside the goal mouth, rebound off the end rail outside it
    fn check_ends(&mut self, engine: &mut Engine, rink: Rink) {
        let viewport = engine.viewport();
        let (top, bottom) = self.mouth(viewport.y);
        let restitution = self.tuning.restitution;
        let Some(puck) = ball_mut(engine, rink.puck) else {
            return;
        };
        let r = puck.radius;
        let pos = puck.body.position;
        let (at_left, at_right) = (pos.x - r <= 0.0, pos.x + r >= viewport.x);
        if !(at_left || at_right) {
            return;
        }
        if pos.y >= top && pos.y <= bottom {
            let scorer = if at_left { Player::Two } else { Player::One };
            self.score(engine, rink, scorer);
            return;
        }

        let vx = puck.body.velocity.x;
        let into_rail = (at_left && vx < 0.0) || (at_right && vx > 0.0);
        puck.body.position.x = if at_left { r } else { viewport.x - r };
        if into_rail {
            puck.body.velocity.x = -vx * restitution;
            engine.play(Sound::WallHit);
        }
    }

    fn strike(&mut self, engine: &mut Engine, rink: Rink) {
        let restitution = self.tuning.restitution;
        for player in [Player::One, Player::Two] {
            let Some((puck, mallet)) = engine.pair_mut(rink.puck, rink.mallet(player)) else {
                continue;
            };
            let (Some(puck), Some(mallet)) = (puck.as_ball_mut(), mallet.as_mallet_mut()) else {
                continue;
            };
            if !physics::strike_puck(puck, mallet, restitution) {
                continue;
            }
            let at = puck.body.position;
            let color = mallet.color;

            engine.play(Sound::PaddleHit);
            engine.burst(at, 8, color);
        }
    }

    fn score(&mut self, engine: &mut Engine, rink: Rink, scorer: Player) {
        let viewport = engine.viewport();
        self.state.award(engine, scorer, 1);
        engine.play(Sound::Score);
        let goal_x = match scorer {
            Player::One => viewport.x,
            Player::Two => 0.0,
        };
        engine.burst(Vec2::new(goal_x, viewport.y / 2.0), 25, scorer.color());

        if let Some(puck) = ball_mut(engine, rink.puck) {
            puck.park(viewport / 2.0);
        }

        if let Some(winner) = self.state.scores().reached(self.tuning.win_score) {
            self.state.finish(engine, winner);
            self.timers.clear();
        } else {
            self.timers
                .schedule(engine.clock(), self.tuning.serve_delay, Task::Serve);
        }
    }

    fn steer(&self, engine: &mut Engine, rink: Rink, input: &dyn InputSurface) {
        let viewport = engine.viewport();
        for player in [Player::One, Player::Two] {
            let Some(point) = control_point(input, viewport, player, Split::Quadrants) else {
                continue;
            };
            if let Some(mallet) = engine
                .get_mut(rink.mallet(player))
                .and_then(|e| e.as_mallet_mut())
            {
                mallet.move_to(point);
            }
        }
    }

    fn draw_table(&self, viewport: Vec2, canvas: &mut dyn Canvas) {
        let center = viewport / 2.0;
        let (top, bottom) = self.mouth(viewport.y);

        canvas.line(
            Vec2::new(center.x, 0.0),
            Vec2::new(center.x, viewport.y),
            colors::WHITE.with_alpha(0.3),
            3.0,
            Some([15.0, 15.0]),
        );
        canvas.stroke_circle(center, 60.0, colors::WHITE.with_alpha(0.2), 3.0);

        // Goal mouths
        canvas.line(Vec2::new(0.0, top), Vec2::new(0.0, bottom), colors::PLAYER_ONE, 4.0, None);
        canvas.line(
            Vec2::new(viewport.x, top),
            Vec2::new(viewport.x, bottom),
            colors::PLAYER_TWO,
            4.0,
            None,
        );
        canvas.stroke_arc(
            Vec2::new(0.0, center.y),
            80.0,
            -PI / 3.0,
            PI / 3.0,
            colors::PLAYER_ONE.with_alpha(0.3),
            2.0,
        );
        canvas.stroke_arc(
            Vec2::new(viewport.x, center.y),
            80.0,
            PI * 2.0 / 3.0,
            PI * 4.0 / 3.0,
            colors::PLAYER_TWO.with_alpha(0.3),
            2.0,
        );

        // Rails, broken at the goal mouths
        let rail = colors::WHITE.with_alpha(0.5);
        let corners = [
            Vec2::ZERO,
            Vec2::new(viewport.x, 0.0),
            Vec2::new(0.0, viewport.y),
            viewport,
        ];
        canvas.line(corners[0], corners[1], rail, 3.0, None);
        canvas.line(corners[2], corners[3], rail, 3.0, None);
        for x in [0.0, viewport.x] {
            canvas.line(Vec2::new(x, 0.0), Vec2::new(x, top), rail, 3.0, None);
            canvas.line(Vec2::new(x, bottom), Vec2::new(x, viewport.y), rail, 3.0, None);
        }
    }
}

impl Simulation for AirHockey {
    fn kind(&self) -> GameKind {
        GameKind::AirHockey
    }

    fn init(&mut self, engine: &mut Engine, settings: &Settings) {
        self.settings = settings.clone();
        let viewport = engine.viewport();

        let mut mallets = [EntityId(0); 2];
        for (slot, player) in mallets.iter_mut().zip([Player::One, Player::Two]) {
            let mut mallet = Mallet::new(
                Self::home(player, viewport),
                self.mallet_radius(),
                player,
                self.tuning.mallet_speed,
            );
            mallet.bounds = Some(Self::half(player, viewport));
            *slot = engine.add(mallet);
        }

        let puck = Ball::puck(
            viewport / 2.0,
            self.tuning.puck_radius,
            self.puck_speed(),
            self.puck_max_speed(),
        );
        let rink = Rink {
            mallets,
            puck: engine.add(puck),
        };
        self.rink = Some(rink);
        self.serve(engine, rink);
        log::info!("Air Hockey ready");
    }

    fn update(&mut self, engine: &mut Engine, input: &dyn InputSurface) {
        if self.state.is_over() {
            return;
        }
        let Some(rink) = self.rink else {
            return;
        };

        for task in self.timers.poll(engine.clock()) {
            match task {
                Task::Serve if !self.state.is_over() => self.serve(engine, rink),
                Task::Serve => {}
            }
        }

        let in_play = ball_ref(engine, rink.puck).is_some_and(|p| !p.is_parked());
        if in_play {
            self.apply_friction(engine, rink);
            self.bounce_rails(engine, rink);
            self.check_ends(engine, rink);
        }
        // The goal may have parked the puck
        if ball_ref(engine, rink.puck).is_some_and(|p| !p.is_parked()) {
            self.strike(engine, rink);
        }
        self.steer(engine, rink, input);
    }

    fn render(&self, engine: &Engine, canvas: &mut dyn Canvas) {
        let viewport = engine.viewport();
        self.draw_table(viewport, canvas);
        if let Some(winner) = self.state.winner() {
            draw_winner_banner(canvas, viewport, winner, None);
        }
    }

    fn restart(&mut self, engine: &mut Engine) {
        self.state.reset(engine);
        self.timers.clear();
        let Some(rink) = self.rink else {
            return;
        };
        let viewport = engine.viewport();
        for player in [Player::One, Player::Two] {
            if let Some(mallet) = engine
                .get_mut(rink.mallet(player))
                .and_then(|e| e.as_mallet_mut())
            {
                mallet.place(Self::home(player, viewport));
            }
        }
        self.serve(engine, rink);
        log::info!("Air Hockey restarted");
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        self.timers.clear();
        if let Some(rink) = self.rink.take() {
            for id in rink.mallets.into_iter().chain([rink.puck]) {
                engine.remove(id);
            }
        }
        engine.particles_mut().clear();
    }

    fn update_settings(&mut self, engine: &mut Engine, settings: &Settings) {
        self.settings = settings.clone();
        let Some(rink) = self.rink else {
            return;
        };
        let radius = self.mallet_radius();
        for id in rink.mallets {
            if let Some(mallet) = engine.get_mut(id).and_then(|e| e.as_mallet_mut()) {
                mallet.radius = radius;
            }
        }
        let (speed, max_speed) = (self.puck_speed(), self.puck_max_speed());
        if let Some(puck) = ball_mut(engine, rink.puck) {
            puck.max_speed = max_speed;
            puck.speed = speed;
            if puck.body.velocity.length() > 0.0 {
                let direction = puck.body.velocity.normalize();
                puck.set_velocity(direction * speed);
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
    use crate::renderer::{CommandBuffer, DrawCommand};
    use crate::sim::SimEvent;

    const VIEW: Vec2 = Vec2::new(800.0, 400.0);

    fn setup() -> (Engine, AirHockey) {
        let mut engine = Engine::new(VIEW, 5);
        let mut game = AirHockey::new(5);
        game.init(&mut engine, &Settings::default());
        (engine, game)
    }

    fn puck(engine: &Engine, game: &AirHockey) -> Ball {
        ball_ref(engine, game.rink.unwrap().puck).unwrap().clone()
    }

    fn place_puck(engine: &mut Engine, game: &AirHockey, pos: Vec2, vel: Vec2) {
        let p = ball_mut(engine, game.rink.unwrap().puck).unwrap();
        p.body.position = pos;
        p.body.velocity = vel;
    }

    #[test]
    fn test_goal_inside_mouth_scores() {
        let (mut engine, mut game) = setup();
        place_puck(&mut engine, &game, Vec2::new(0.0, VIEW.y * 0.5), Vec2::new(-200.0, 0.0));
        game.update(&mut engine, &no_input());
        assert_eq!(game.scores(), Scoreboard { player_one: 0, player_two: 1 });
        assert!(puck(&engine, &game).is_parked());

        // Face-off after 1.5 s
        run_frames(&mut engine, &mut game, &no_input(), 80);
        assert!(puck(&engine, &game).is_parked());
        run_frames(&mut engine, &mut game, &no_input(), 15);
        assert!(!puck(&engine, &game).is_parked());
    }

    #[test]
    fn test_face_off_pending_at_match_end_never_fires() {
        let (mut engine, mut game) = setup();
        place_puck(&mut engine, &game, Vec2::new(VIEW.x, VIEW.y * 0.5), Vec2::new(200.0, 0.0));
        game.update(&mut engine, &no_input());
        assert_eq!(game.timers.len(), 1);

        game.state.finish(&mut engine, Player::One);
        run_frames(&mut engine, &mut game, &no_input(), 150);

        let p = puck(&engine, &game);
        assert!(p.is_parked());
        assert_eq!(p.body.velocity, Vec2::ZERO);
        assert_eq!(game.scores(), Scoreboard { player_one: 1, player_two: 0 });
    }

    #[test]
    fn test_outside_mouth_rebounds() {
        let (mut engine, mut game) = setup();
        place_puck(&mut engine, &game, Vec2::new(0.0, VIEW.y * 0.1), Vec2::new(-200.0, 0.0));
        game.update(&mut engine, &no_input());
        assert_eq!(game.scores(), Scoreboard::default());
        let p = puck(&engine, &game);
        assert!(!p.is_parked());
        assert_eq!(p.body.position.x, 12.0);
        assert!((p.body.velocity.x - 160.0).abs() < 1e-3);
    }

    #[test]
    fn test_right_goal_scores_for_player_one() {
        let (mut engine, mut game) = setup();
        place_puck(&mut engine, &game, Vec2::new(795.0, 200.0), Vec2::new(100.0, 0.0));
        game.update(&mut engine, &no_input());
        assert_eq!(game.scores().player_one, 1);
    }

    #[test]
    fn test_rail_loses_energy() {
        let (mut engine, mut game) = setup();
        place_puck(&mut engine, &game, Vec2::new(400.0, 395.0), Vec2::new(0.0, 100.0));
        game.update(&mut engine, &no_input());
        let p = puck(&engine, &game);
        assert_eq!(p.body.position.y, 388.0);
        assert!((p.body.velocity.y + 80.0).abs() < 1e-3);
        assert!(engine.drain_events().contains(&SimEvent::Sound(Sound::WallHit)));
    }

    #[test]
    fn test_friction_scales_with_step() {
        let (mut engine, mut game) = setup();
        // Keep the puck clear of mallets and rails
        place_puck(&mut engine, &game, Vec2::new(400.0, 100.0), Vec2::new(100.0, 0.0));
        run_frames(&mut engine, &mut game, &no_input(), 1);
        let v = puck(&engine, &game).body.velocity.x;
        assert!((v - 98.0).abs() < 1e-2);
    }

    #[test]
    fn test_mallet_strike_pushes_puck_out() {
        let (mut engine, mut game) = setup();
        let home = AirHockey::home(Player::One, VIEW);
        place_puck(&mut engine, &game, home + Vec2::new(30.0, 0.0), Vec2::new(-150.0, 0.0));
        game.update(&mut engine, &no_input());
        let p = puck(&engine, &game);
        // Resting mallet absorbs most of an equal-mass head-on hit
        assert!(p.body.velocity.x > -150.0);
        assert!(p.body.position.distance(home) >= 37.0 - 1e-3);
        assert!(engine.drain_events().contains(&SimEvent::Sound(Sound::PaddleHit)));
    }

    #[test]
    fn test_mallets_follow_quadrant_pointers() {
        let (mut engine, mut game) = setup();
        let mut input = PointerTracker::new();
        input.pointer_down(1, Vec2::new(300.0, 300.0), 0.0);
        input.pointer_down(2, Vec2::new(600.0, 100.0), 0.0);
        game.update(&mut engine, &input);
        let rink = game.rink.unwrap();
        let m1 = engine.get(rink.mallets[0]).unwrap().as_mallet().unwrap();
        assert_eq!(m1.target(), Vec2::new(500.0, 100.0));
        let m2 = engine.get(rink.mallets[1]).unwrap().as_mallet().unwrap();
        assert_eq!(m2.target(), Vec2::new(600.0, 100.0));

        // Player one's target is mirrored into the far half, then clamped home
        run_frames(&mut engine, &mut game, &input, 1);
        let m1 = engine.get(rink.mallets[0]).unwrap().as_mallet().unwrap();
        assert!(m1.body.position.x <= 380.0 - 25.0 + 1e-3);
    }

    #[test]
    fn test_seven_goals_win() {
        let (mut engine, mut game) = setup();
        for _ in 0..7 {
            place_puck(&mut engine, &game, Vec2::new(800.0, 200.0), Vec2::new(100.0, 0.0));
            game.update(&mut engine, &no_input());
            run_frames(&mut engine, &mut game, &no_input(), 95);
        }
        assert_eq!(game.winner(), Some(Player::One));
        assert_eq!(game.scores().player_one, 7);
        assert!(game.timers.is_empty());

        let mut canvas = CommandBuffer::new();
        game.render(&engine, &mut canvas);
        assert!(canvas.texts().any(|t| t == "Player 1 Wins!"));
        assert!(
            canvas
                .commands()
                .iter()
                .any(|c| matches!(c, DrawCommand::StrokeArc { radius, .. } if *radius == 80.0))
        );
    }
}
