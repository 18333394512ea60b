//! Recording canvas for headless runs and tests

use glam::Vec2;

use super::{Canvas, Color, Font};
use crate::geometry::Rect;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Vec2),
    Save,
    Restore,
    Translate(Vec2),
    Rotate(f32),
    Scale(Vec2),
    Alpha(f32),
    Glow(Color, f32),
    FillRect(Rect, Color),
    StrokeRect(Rect, Color, f32),
    FillCircle(Vec2, f32, Color),
    StrokeCircle(Vec2, f32, Color, f32),
    StrokeArc {
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
        color: Color,
        width: f32,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Color,
        width: f32,
        dash: Option<[f32; 2]>,
    },
    Text(String, Vec2, Font, Color),
}

/// Canvas that records every call in order
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<DrawCommand>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop everything recorded so far
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    /// All text strings drawn, in order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text(s, ..) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Save/restore calls are balanced and never underflow
    pub fn is_balanced(&self) -> bool {
        let mut depth = 0i32;
        for c in &self.commands {
            match c {
                DrawCommand::Save => depth += 1,
                DrawCommand::Restore => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        depth == 0
    }
}

impl Canvas for CommandBuffer {
    fn clear(&mut self, size: Vec2) {
        self.commands.push(DrawCommand::Clear(size));
    }

    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, offset: Vec2) {
        self.commands.push(DrawCommand::Translate(offset));
    }

    fn rotate(&mut self, angle: f32) {
        self.commands.push(DrawCommand::Rotate(angle));
    }

    fn scale(&mut self, factor: Vec2) {
        self.commands.push(DrawCommand::Scale(factor));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::Alpha(alpha));
    }

    fn set_glow(&mut self, color: Color, blur: f32) {
        self.commands.push(DrawCommand::Glow(color, blur));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect(rect, color));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32) {
        self.commands.push(DrawCommand::StrokeRect(rect, color, width));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle(center, radius, color));
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Color, width: f32) {
        self.commands
            .push(DrawCommand::StrokeCircle(center, radius, color, width));
    }

    fn stroke_arc(&mut self, center: Vec2, radius: f32, start: f32, end: f32, color: Color, width: f32) {
        self.commands.push(DrawCommand::StrokeArc {
            center,
            radius,
            start,
            end,
            color,
            width,
        });
    }

    fn line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32, dash: Option<[f32; 2]>) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
            dash,
        });
    }

    fn text(&mut self, text: &str, at: Vec2, font: Font, color: Color) {
        self.commands
            .push(DrawCommand::Text(text.to_string(), at, font, color));
    }
}
