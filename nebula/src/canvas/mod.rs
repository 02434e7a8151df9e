//! Drawing surface abstraction.
//!
//! The render pass talks to a [`Canvas`]; hosts provide one. Two are
//! built in:
//!
//! - [`DisplayList`]: records commands (tests, inspection)
//! - [`SvgCanvas`]: renders a frame to an SVG document

pub mod display_list;
pub mod svg;

pub use display_list::{DisplayList, DrawCommand};
pub use svg::SvgCanvas;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::math::Viewport;

/// How new pixels combine with what is already drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    /// Source over
    #[default]
    Normal,
    /// Additive-like lightening for glow layers
    Screen,
}

/// Line style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
    /// Dash and gap lengths
    pub dash: Option<(f32, f32)>,
}

impl Stroke {
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub fn dashed(color: Color, width: f32, dash: f32, gap: f32) -> Self {
        Self {
            color,
            width,
            dash: Some((dash, gap)),
        }
    }
}

/// One color stop of a radial gradient; `offset` in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

impl GradientStop {
    pub const fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Label font. Text is always centered on its anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub size: f32,
    pub weight: u16,
    pub letter_spacing: f32,
}

/// A 2D drawing surface with a save/restore state stack.
///
/// State covered by `save`/`restore`: translation, alpha, blend mode
/// and shadow.
pub trait Canvas: Send {
    /// Start a new frame, discarding the previous one.
    fn begin_frame(&mut self, viewport: Viewport);

    fn save(&mut self);

    fn restore(&mut self);

    fn translate(&mut self, offset: Vec2);

    /// Global alpha multiplied into every fill and stroke.
    fn set_alpha(&mut self, alpha: f32);

    fn set_blend(&mut self, mode: BlendMode);

    /// Glow around subsequent shapes; `blur == 0` disables it.
    fn set_shadow(&mut self, blur: f32, color: Color);

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    /// Fill a disc of radius `outer` with a gradient running from
    /// `inner` to `outer`.
    fn fill_radial_gradient(&mut self, center: Vec2, inner: f32, outer: f32, stops: &[GradientStop]);

    /// Arc from `start` to `end` radians, clockwise in screen space.
    fn stroke_arc(&mut self, center: Vec2, radius: f32, start: f32, end: f32, stroke: &Stroke);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, stroke: &Stroke);

    fn fill_text(&mut self, text: &str, at: Vec2, font: &Font, color: Color);

    /// Draw the image at `url` clipped to a circle.
    fn draw_image_circle(&mut self, url: &str, center: Vec2, radius: f32);
}
