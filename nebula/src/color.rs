//! Colors and node palettes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An sRGB color with alpha in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0.0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb` or `#rrggbb`. Returns `None` for anything else.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().strip_prefix('#')?;
        if !digits.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            3 => {
                let expand = |i: usize| channel(&digits[i..i + 1].repeat(2));
                Some(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Some(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => None,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// `#rrggbb`, ignoring alpha.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Color set for one node: solid core, glow halo and orbit trails.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub core: Color,
    pub glow: Color,
    pub trail: Color,
}

impl Palette {
    pub fn from_core(core: Color) -> Self {
        Self {
            core,
            glow: core.with_alpha(0.4),
            trail: core.with_alpha(0.1),
        }
    }

    /// Cyclic palette for the `index`-th node, overridden by the member's
    /// own color when it parses.
    pub fn for_node(index: usize, own_color: Option<&str>) -> Self {
        own_color
            .and_then(Color::from_hex)
            .map(Self::from_core)
            .unwrap_or_else(|| Self::from_core(PALETTE_CORES[index % PALETTE_CORES.len()]))
    }
}

const PALETTE_CORES: [Color; 5] = [
    Color::rgb(0, 255, 255),
    Color::rgb(255, 0, 255),
    Color::rgb(112, 0, 255),
    Color::rgb(0, 102, 255),
    Color::rgb(255, 204, 0),
];
