//! Colour type and the arcade palette

/// sRGB colour with straight alpha
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour from `0xRRGGBB`
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
            a: 1.0,
        }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS `rgba()` string for the 2D canvas
    pub fn css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

pub mod colors {
    use super::Color;

    pub const PLAYER_ONE: Color = Color::hex(0xff6b6b);
    pub const PLAYER_TWO: Color = Color::hex(0x4ecdc4);
    pub const WHITE: Color = Color::hex(0xffffff);
    pub const SPARK: Color = Color::hex(0xffff00);
    pub const EXPLOSION: Color = Color::hex(0xff6600);
    pub const OBSTACLE: Color = Color::hex(0x666666);
    pub const SHADE: Color = Color::rgba(0, 0, 0, 0.7);
    pub const HIGHLIGHT: Color = Color::rgba(255, 255, 255, 0.3);
}
