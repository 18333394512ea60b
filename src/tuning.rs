//! Data-driven game balance
//!
//! Base values for each game before the global speed/size multipliers are
//! applied. Every record deserializes with defaults, so a partial override
//! only needs the fields it changes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PongTuning {
    pub win_score: u32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Paddle chase speed (px/s)
    pub paddle_speed: f32,
    /// Distance of each paddle from its edge
    pub paddle_inset: f32,
    pub ball_radius: f32,
    pub ball_speed: f32,
    pub ball_max_speed: f32,
    /// How far past an edge the ball must travel to score
    pub goal_margin: f32,
    /// Seconds between a goal and the next serve
    pub serve_delay: f64,
}

impl Default for PongTuning {
    fn default() -> Self {
        Self {
            win_score: 11,
            paddle_width: 15.0,
            paddle_height: 80.0,
            paddle_speed: 480.0,
            paddle_inset: 50.0,
            ball_radius: 8.0,
            ball_speed: 300.0,
            ball_max_speed: 600.0,
            goal_margin: 50.0,
            serve_delay: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirHockeyTuning {
    pub win_score: u32,
    pub mallet_radius: f32,
    pub mallet_speed: f32,
    pub puck_radius: f32,
    pub puck_speed: f32,
    pub puck_max_speed: f32,
    /// Velocity retained per 60 Hz frame
    pub friction: f32,
    /// Energy kept on wall and mallet contacts
    pub restitution: f32,
    /// Goal mouth as fractions of the table height
    pub goal_top: f32,
    pub goal_bottom: f32,
    pub serve_delay: f64,
}

impl Default for AirHockeyTuning {
    fn default() -> Self {
        Self {
            win_score: 7,
            mallet_radius: 25.0,
            mallet_speed: 720.0,
            puck_radius: 12.0,
            puck_speed: 250.0,
            puck_max_speed: 600.0,
            friction: 0.98,
            restitution: 0.8,
            goal_top: 0.3,
            goal_bottom: 0.7,
            serve_delay: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakoutTuning {
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub paddle_speed: f32,
    /// Distance of each paddle centre from its edge
    pub paddle_inset: f32,
    pub ball_radius: f32,
    pub ball_speed: f32,
    pub ball_max_speed: f32,
    pub brick_width: f32,
    pub brick_height: f32,
    /// Gap left between neighbouring bricks
    pub brick_gap: f32,
    pub brick_rows: usize,
    pub brick_cols: usize,
    pub brick_health: u32,
    /// Top of player one's first row, measured up from the bottom edge
    pub wall_offset_bottom: f32,
    /// Top of player two's first row, measured down from the top edge
    pub wall_offset_top: f32,
    pub points_per_brick: u32,
    pub out_margin: f32,
}

impl Default for BreakoutTuning {
    fn default() -> Self {
        Self {
            paddle_width: 60.0,
            paddle_height: 15.0,
            paddle_speed: 480.0,
            paddle_inset: 40.0,
            ball_radius: 8.0,
            ball_speed: 280.0,
            ball_max_speed: 600.0,
            brick_width: 40.0,
            brick_height: 20.0,
            brick_gap: 2.0,
            brick_rows: 4,
            brick_cols: 8,
            brick_health: 1,
            wall_offset_bottom: 120.0,
            wall_offset_top: 100.0,
            points_per_brick: 10,
            out_margin: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankTuning {
    pub win_score: u32,
    pub tank_size: f32,
    pub tank_speed: f32,
    pub bullet_speed: f32,
    pub max_bullets: usize,
    /// Seconds between automatic shots
    pub fire_interval: f64,
    pub obstacle_size: f32,
    /// Obstacle centres as fractions of the viewport
    pub obstacles: Vec<[f32; 2]>,
}

impl Default for TankTuning {
    fn default() -> Self {
        Self {
            win_score: 5,
            tank_size: 25.0,
            tank_speed: 150.0,
            bullet_speed: 400.0,
            max_bullets: 3,
            fire_interval: 0.8,
            obstacle_size: 40.0,
            obstacles: vec![
                [0.3, 0.3],
                [0.7, 0.7],
                [0.5, 0.4],
                [0.5, 0.6],
                [0.2, 0.5],
                [0.8, 0.5],
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override() {
        let t: TankTuning = serde_json::from_str(r#"{"max_bullets": 5}"#).unwrap();
        assert_eq!(t.max_bullets, 5);
        assert_eq!(t.win_score, 5);
        assert_eq!(t.obstacles.len(), 6);
    }

    #[test]
    fn test_goal_band_is_centered() {
        let t = AirHockeyTuning::default();
        assert!((t.goal_top + t.goal_bottom - 1.0).abs() < 1e-6);
    }
}
