//! Recording canvas.

use super::*;

/// A recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    BeginFrame(Viewport),
    Save,
    Restore,
    Translate(Vec2),
    Alpha(f32),
    Blend(BlendMode),
    Shadow { blur: f32, color: Color },
    Rect { origin: Vec2, size: Vec2, color: Color },
    Circle { center: Vec2, radius: f32, color: Color },
    RadialGradient { center: Vec2, inner: f32, outer: f32, stops: Vec<GradientStop> },
    Arc { center: Vec2, radius: f32, start: f32, end: f32, stroke: Stroke },
    Line { from: Vec2, to: Vec2, stroke: Stroke },
    Text { text: String, at: Vec2, font: Font, color: Color },
    Image { url: String, center: Vec2, radius: f32 },
}

/// Canvas that records the commands of the current frame.
#[derive(Debug, Default)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
    frames: u64,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands of the current frame.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Frames begun so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Text drawn this frame, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Index of the first command matching `pred`.
    pub fn position(&self, pred: impl Fn(&DrawCommand) -> bool) -> Option<usize> {
        self.commands.iter().position(pred)
    }

    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

impl Canvas for DisplayList {
    fn begin_frame(&mut self, viewport: Viewport) {
        self.commands.clear();
        self.frames += 1;
        self.push(DrawCommand::BeginFrame(viewport));
    }

    fn save(&mut self) {
        self.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.push(DrawCommand::Restore);
    }

    fn translate(&mut self, offset: Vec2) {
        self.push(DrawCommand::Translate(offset));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.push(DrawCommand::Alpha(alpha));
    }

    fn set_blend(&mut self, mode: BlendMode) {
        self.push(DrawCommand::Blend(mode));
    }

    fn set_shadow(&mut self, blur: f32, color: Color) {
        self.push(DrawCommand::Shadow { blur, color });
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        self.push(DrawCommand::Rect { origin, size, color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.push(DrawCommand::Circle { center, radius, color });
    }

    fn fill_radial_gradient(&mut self, center: Vec2, inner: f32, outer: f32, stops: &[GradientStop]) {
        self.push(DrawCommand::RadialGradient {
            center,
            inner,
            outer,
            stops: stops.to_vec(),
        });
    }

    fn stroke_arc(&mut self, center: Vec2, radius: f32, start: f32, end: f32, stroke: &Stroke) {
        self.push(DrawCommand::Arc {
            center,
            radius,
            start,
            end,
            stroke: *stroke,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, stroke: &Stroke) {
        self.push(DrawCommand::Line {
            from,
            to,
            stroke: *stroke,
        });
    }

    fn fill_text(&mut self, text: &str, at: Vec2, font: &Font, color: Color) {
        self.push(DrawCommand::Text {
            text: text.to_string(),
            at,
            font: *font,
            color,
        });
    }

    fn draw_image_circle(&mut self, url: &str, center: Vec2, radius: f32) {
        self.push(DrawCommand::Image {
            url: url.to_string(),
            center,
            radius,
        });
    }
}
