//! 2D rendering surface
//!
//! Everything draws through the [`Canvas`] trait, an immediate-mode subset of
//! the HTML canvas 2D context. The browser backend forwards to
//! `CanvasRenderingContext2d`; [`CommandBuffer`] records calls for headless
//! runs and tests.

pub mod color;
pub mod commands;
#[cfg(target_arch = "wasm32")]
pub mod canvas2d;

pub use color::{Color, colors};
pub use commands::{CommandBuffer, DrawCommand};
#[cfg(target_arch = "wasm32")]
pub use canvas2d::Canvas2d;

use glam::Vec2;

use crate::geometry::Rect;

/// Horizontal anchor for text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// Font description for [`Canvas::text`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub size: f32,
    pub bold: bool,
    pub align: TextAlign,
}

impl Font {
    pub const fn regular(size: f32) -> Self {
        Self {
            size,
            bold: false,
            align: TextAlign::Center,
        }
    }

    pub const fn bold(size: f32) -> Self {
        Self {
            size,
            bold: true,
            align: TextAlign::Center,
        }
    }

    pub const fn aligned(self, align: TextAlign) -> Self {
        Self { align, ..self }
    }

    pub fn css(&self) -> String {
        if self.bold {
            format!("bold {}px Arial", self.size)
        } else {
            format!("{}px Arial", self.size)
        }
    }
}

/// Immediate-mode drawing surface
///
/// Transform, alpha and glow are part of the saved state, exactly like the
/// canvas 2D context.
pub trait Canvas {
    fn clear(&mut self, size: Vec2);

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, offset: Vec2);
    fn rotate(&mut self, angle: f32);
    fn scale(&mut self, factor: Vec2);

    /// Global alpha multiplier for subsequent draws
    fn set_alpha(&mut self, alpha: f32);
    /// Shadow glow; a blur of zero disables it
    fn set_glow(&mut self, color: Color, blur: f32);

    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Color, width: f32);
    fn stroke_arc(&mut self, center: Vec2, radius: f32, start: f32, end: f32, color: Color, width: f32);
    /// Straight segment, optionally dashed as `[on, off]`
    fn line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32, dash: Option<[f32; 2]>);
    fn text(&mut self, text: &str, at: Vec2, font: Font, color: Color);
}
