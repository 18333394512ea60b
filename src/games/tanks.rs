//! Tank Battle
//!
//! One tank per half of the screen. Tanks drive toward their player's
//! pointer and fire on their own at a fixed interval along their heading.
//! A hit scores for the shooter and respawns the victim at home.

use glam::Vec2;

use super::{GameKind, MatchState, Scoreboard, Simulation, draw_winner_banner};
use crate::audio::Sound;
use crate::geometry::Rect;
use crate::input::{InputSurface, Split, control_point};
use crate::renderer::{Canvas, Font, colors};
use crate::settings::Settings;
use crate::sim::{Bullet, Engine, EntityId, Obstacle, Player, Tank};
use crate::tuning::TankTuning;

fn seat(player: Player) -> usize {
    match player {
        Player::One => 0,
        Player::Two => 1,
    }
}

pub struct TankBattle {
    tuning: TankTuning,
    settings: Settings,
    state: MatchState,
    tanks: Option<[EntityId; 2]>,
    obstacles: Vec<EntityId>,
    bullets: Vec<EntityId>,
    /// Clock time of each tank's last shot
    last_fire: [Option<f64>; 2],
}

impl Default for TankBattle {
    fn default() -> Self {
        Self::new()
    }
}

impl TankBattle {
    pub fn new() -> Self {
        Self::with_tuning(TankTuning::default())
    }

    pub fn with_tuning(tuning: TankTuning) -> Self {
        Self {
            tuning,
            settings: Settings::default(),
            state: MatchState::default(),
            tanks: None,
            obstacles: Vec::new(),
            bullets: Vec::new(),
            last_fire: [None; 2],
        }
    }

    fn tank_speed(&self) -> f32 {
        self.tuning.tank_speed * self.settings.game_speed
    }

    fn bullet_speed(&self) -> f32 {
        self.tuning.bullet_speed * self.settings.game_speed
    }

    fn home(player: Player, viewport: Vec2) -> Vec2 {
        match player {
            Player::One => viewport * Vec2::new(0.25, 0.75),
            Player::Two => viewport * Vec2::new(0.75, 0.25),
        }
    }

    /// Half of the field each tank is confined to
    fn territory(player: Player, viewport: Vec2) -> Rect {
        let half = viewport.y / 2.0;
        let y = match player {
            Player::One => half + 20.0,
            Player::Two => 20.0,
        };
        Rect::new(20.0, y, viewport.x - 40.0, half - 40.0)
    }

    fn tank(&self, player: Player) -> Option<EntityId> {
        self.tanks.map(|t| t[seat(player)])
    }

    fn live_bullets(&self, engine: &Engine, player: Player) -> usize {
        self.bullets
            .iter()
            .filter_map(|id| engine.get(*id)?.as_bullet())
            .filter(|b| b.body.active && b.owner() == player)
            .count()
    }

    fn clear_bullets(&mut self, engine: &mut Engine) {
        for id in self.bullets.drain(..) {
            engine.remove(id);
        }
    }

    fn steer(&self, engine: &mut Engine, input: &dyn InputSurface) {
        let viewport = engine.viewport();
        for player in [Player::One, Player::Two] {
            let Some(point) = control_point(input, viewport, player, Split::Halves) else {
                continue;
            };
            let Some(id) = self.tank(player) else {
                continue;
            };
            if let Some(tank) = engine.get_mut(id).and_then(|e| e.as_tank_mut()) {
                tank.move_to(point);
            }
        }
    }

    /// Drop bullets that left the canvas or were destroyed elsewhere
    fn prune_bullets(&mut self, engine: &mut Engine) {
        let viewport = engine.viewport();
        let field = Rect::new(0.0, 0.0, viewport.x, viewport.y);
        let (keep, gone): (Vec<EntityId>, Vec<EntityId>) =
            self.bullets.iter().copied().partition(|id| {
                engine
                    .get(*id)
                    .and_then(|e| e.as_bullet())
                    .is_some_and(|b| b.body.active && field.contains(b.body.position))
            });
        for id in gone {
            engine.remove(id);
        }
        self.bullets = keep;
    }

    fn auto_fire(&mut self, engine: &mut Engine) {
        let now = engine.clock();
        for player in [Player::One, Player::Two] {
            let due = self.last_fire[seat(player)]
                .is_none_or(|last| now - last >= self.tuning.fire_interval);
            if !due {
                continue;
            }
            self.last_fire[seat(player)] = Some(now);
            if self.live_bullets(engine, player) >= self.tuning.max_bullets {
                continue;
            }
            let Some(id) = self.tank(player) else {
                continue;
            };
            let Some(tank) = engine.get(id).and_then(|e| e.as_tank()) else {
                continue;
            };
            let bullet = Bullet::new(
                tank.muzzle(),
                Vec2::from_angle(tank.body.rotation),
                self.bullet_speed(),
                player,
            );
            self.bullets.push(engine.add(bullet));
            engine.play(Sound::TankShot);
        }
    }

    fn check_hits(&mut self, engine: &mut Engine) {
        let mut spent = Vec::new();
        let mut victims = Vec::new();
        for &id in &self.bullets {
            let Some(bullet) = engine.get(id).and_then(|e| e.as_bullet()) else {
                continue;
            };
            let (circle, owner) = (bullet.circle(), bullet.owner());
            let target = owner.opponent();
            let struck = self
                .tank(target)
                .and_then(|t| engine.get(t)?.as_tank())
                .is_some_and(|t| circle.intersects_rect(&t.rect()));
            if struck {
                spent.push(id);
                victims.push(target);
                continue;
            }
            let blocked = self.obstacles.iter().any(|o| {
                engine
                    .get(*o)
                    .and_then(|e| e.as_obstacle())
                    .is_some_and(|o| circle.intersects_rect(&o.rect()))
            });
            if blocked {
                spent.push(id);
                engine.burst(circle.center, 5, colors::SPARK);
                engine.play(Sound::WallHit);
            }
        }

        for id in &spent {
            engine.remove(*id);
        }
        self.bullets.retain(|id| !spent.contains(id));
        for victim in victims {
            if self.state.is_over() {
                break;
            }
            self.tank_hit(engine, victim);
        }
    }

    /// Score a hit on `victim`'s tank and send it home. Ends the match at
    /// `win_score`, clearing bullets and holding both tanks where they are.
    pub fn tank_hit(&mut self, engine: &mut Engine, victim: Player) {
        if self.state.is_over() {
            return;
        }
        let viewport = engine.viewport();
        self.state.award(engine, victim.opponent(), 1);
        engine.play(Sound::Explosion);

        if let Some(id) = self.tank(victim) {
            if let Some(tank) = engine.get_mut(id).and_then(|e| e.as_tank_mut()) {
                let wreck = tank.body.position;
                tank.respawn(Self::home(victim, viewport), 0.0);
                engine.burst(wreck, 20, colors::EXPLOSION);
            }
        }

        if let Some(winner) = self.state.scores().reached(self.tuning.win_score) {
            self.state.finish(engine, winner);
            self.clear_bullets(engine);
            for id in self.tanks.into_iter().flatten() {
                if let Some(tank) = engine.get_mut(id).and_then(|e| e.as_tank_mut()) {
                    let here = tank.body.position;
                    tank.move_to(here);
                    tank.body.velocity = Vec2::ZERO;
                }
            }
        }
    }
}

impl Simulation for TankBattle {
    fn kind(&self) -> GameKind {
        GameKind::Tanks
    }

    fn init(&mut self, engine: &mut Engine, settings: &Settings) {
        self.settings = settings.clone();
        let viewport = engine.viewport();

        let mut tanks = [EntityId(0); 2];
        for (slot, player) in tanks.iter_mut().zip([Player::One, Player::Two]) {
            let mut tank = Tank::new(
                Self::home(player, viewport),
                self.tuning.tank_size,
                player,
                self.tank_speed(),
            );
            tank.bounds = Some(Self::territory(player, viewport));
            *slot = engine.add(tank);
        }
        self.tanks = Some(tanks);

        let size = Vec2::splat(self.tuning.obstacle_size);
        self.obstacles = self
            .tuning
            .obstacles
            .iter()
            .map(|[fx, fy]| engine.add(Obstacle::new(viewport * Vec2::new(*fx, *fy), size)))
            .collect();
        log::info!("Tank Battle ready with {} obstacles", self.obstacles.len());
    }

    fn update(&mut self, engine: &mut Engine, input: &dyn InputSurface) {
        if self.state.is_over() || self.tanks.is_none() {
            return;
        }
        self.steer(engine, input);
        self.prune_bullets(engine);
        self.auto_fire(engine);
        self.check_hits(engine);
    }

    fn render(&self, engine: &Engine, canvas: &mut dyn Canvas) {
        let viewport = engine.viewport();
        canvas.line(
            Vec2::new(0.0, viewport.y / 2.0),
            Vec2::new(viewport.x, viewport.y / 2.0),
            colors::WHITE.with_alpha(0.2),
            2.0,
            Some([10.0, 10.0]),
        );

        let counters = [
            (Player::One, Vec2::new(viewport.x / 4.0, viewport.y - 10.0)),
            (Player::Two, Vec2::new(viewport.x * 3.0 / 4.0, 30.0)),
        ];
        for (player, at) in counters {
            let ammo = self
                .tuning
                .max_bullets
                .saturating_sub(self.live_bullets(engine, player));
            canvas.text(
                &format!("Ammo: {ammo}"),
                at,
                Font::regular(16.0),
                player.color().with_alpha(0.7),
            );
        }

        if let Some(winner) = self.state.winner() {
            draw_winner_banner(canvas, viewport, winner, Some("Tank Battle Complete!"));
        }
    }

    fn restart(&mut self, engine: &mut Engine) {
        self.state.reset(engine);
        self.clear_bullets(engine);
        self.last_fire = [None; 2];
        let viewport = engine.viewport();
        for player in [Player::One, Player::Two] {
            let Some(id) = self.tank(player) else {
                continue;
            };
            if let Some(tank) = engine.get_mut(id).and_then(|e| e.as_tank_mut()) {
                tank.respawn(Self::home(player, viewport), 0.0);
            }
        }
        log::info!("Tank Battle restarted");
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        self.clear_bullets(engine);
        let tanks = self.tanks.take().into_iter().flatten();
        for id in tanks.chain(self.obstacles.drain(..)) {
            engine.remove(id);
        }
        engine.particles_mut().clear();
    }

    fn update_settings(&mut self, engine: &mut Engine, settings: &Settings) {
        self.settings = settings.clone();
        let speed = self.tank_speed();
        for id in self.tanks.into_iter().flatten() {
            if let Some(tank) = engine.get_mut(id).and_then(|e| e.as_tank_mut()) {
                tank.speed = speed;
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
