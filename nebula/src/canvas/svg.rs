//! SVG canvas for headless snapshots.

use std::f32::consts::TAU;

use super::*;

#[derive(Debug, Clone, Copy)]
struct State {
    offset: Vec2,
    alpha: f32,
    blend: BlendMode,
    filter: Option<usize>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            alpha: 1.0,
            blend: BlendMode::Normal,
            filter: None,
        }
    }
}

/// Canvas that renders the current frame into an SVG document.
#[derive(Debug)]
pub struct SvgCanvas {
    viewport: Viewport,
    defs: String,
    body: String,
    next_id: usize,
    state: State,
    stack: Vec<State>,
}

impl Default for SvgCanvas {
    fn default() -> Self {
        Self::new(Viewport::new(0.0, 0.0))
    }
}

impl SvgCanvas {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            defs: String::new(),
            body: String::new(),
            next_id: 0,
            state: State::default(),
            stack: Vec::new(),
        }
    }

    /// The current frame as a standalone SVG document.
    pub fn to_svg(&self) -> String {
        let (w, h) = (self.viewport.width, self.viewport.height);
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\
             <defs>{}</defs>{}</svg>",
            self.defs, self.body
        )
    }

    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn at(&self, p: Vec2) -> Vec2 {
        p + self.state.offset
    }

    fn opacity(&self, color: Color) -> f32 {
        (color.a * self.state.alpha).clamp(0.0, 1.0)
    }

    /// Blend and shadow attributes shared by every element.
    fn effects(&self) -> String {
        let mut out = String::new();
        if self.state.blend == BlendMode::Screen {
            out.push_str(" style=\"mix-blend-mode:screen\"");
        }
        if let Some(id) = self.state.filter {
            out.push_str(&format!(" filter=\"url(#f{id})\""));
        }
        out
    }

    fn fill(&self, color: Color) -> String {
        format!(
            "fill=\"rgb({},{},{})\" fill-opacity=\"{:.3}\"",
            color.r,
            color.g,
            color.b,
            self.opacity(color)
        )
    }

    fn stroke(&self, stroke: &Stroke) -> String {
        let c = stroke.color;
        let mut out = format!(
            "fill=\"none\" stroke=\"rgb({},{},{})\" stroke-opacity=\"{:.3}\" stroke-width=\"{}\"",
            c.r,
            c.g,
            c.b,
            self.opacity(c),
            stroke.width
        );
        if let Some((dash, gap)) = stroke.dash {
            out.push_str(&format!(" stroke-dasharray=\"{dash} {gap}\""));
        }
        out
    }
}

impl Canvas for SvgCanvas {
    fn begin_frame(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.defs.clear();
        self.body.clear();
        self.next_id = 0;
        self.state = State::default();
        self.stack.clear();
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, offset: Vec2) {
        self.state.offset += offset;
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_blend(&mut self, mode: BlendMode) {
        self.state.blend = mode;
    }

    fn set_shadow(&mut self, blur: f32, color: Color) {
        if blur <= 0.0 || color.a <= 0.0 {
            self.state.filter = None;
            return;
        }
        self.next_id += 1;
        let id = self.next_id;
        self.defs.push_str(&format!(
            "<filter id=\"f{id}\" x=\"-100%\" y=\"-100%\" width=\"300%\" height=\"300%\">\
             <feDropShadow dx=\"0\" dy=\"0\" stdDeviation=\"{:.1}\" flood-color=\"{}\" flood-opacity=\"{:.3}\"/></filter>",
            blur / 2.0,
            color.to_hex(),
            color.a
        ));
        self.state.filter = Some(id);
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        let p = self.at(origin);
        self.body.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" {}{}/>",
            p.x,
            p.y,
            size.x,
            size.y,
            self.fill(color),
            self.effects()
        ));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        let c = self.at(center);
        self.body.push_str(&format!(
            "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{:.2}\" {}{}/>",
            c.x,
            c.y,
            radius.max(0.0),
            self.fill(color),
            self.effects()
        ));
    }

    fn fill_radial_gradient(&mut self, center: Vec2, inner: f32, outer: f32, stops: &[GradientStop]) {
        if outer <= 0.0 {
            return;
        }
        let c = self.at(center);
        let id = self.id("g");
        let mut def = format!(
            "<radialGradient id=\"{id}\" gradientUnits=\"userSpaceOnUse\" cx=\"{:.1}\" cy=\"{:.1}\" r=\"{:.1}\" fr=\"{:.1}\">",
            c.x,
            c.y,
            outer,
            inner.clamp(0.0, outer)
        );
        for stop in stops {
            def.push_str(&format!(
                "<stop offset=\"{:.3}\" stop-color=\"{}\" stop-opacity=\"{:.3}\"/>",
                stop.offset.clamp(0.0, 1.0),
                stop.color.to_hex(),
                self.opacity(stop.color)
            ));
        }
        def.push_str("</radialGradient>");
        self.defs.push_str(&def);
        self.body.push_str(&format!(
            "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{:.1}\" fill=\"url(#{id})\"{}/>",
            c.x,
            c.y,
            outer,
            self.effects()
        ));
    }

    fn stroke_arc(&mut self, center: Vec2, radius: f32, start: f32, end: f32, stroke: &Stroke) {
        let c = self.at(center);
        let sweep = end - start;
        if sweep.abs() >= TAU {
            self.body.push_str(&format!(
                "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{:.2}\" {}{}/>",
                c.x,
                c.y,
                radius,
                self.stroke(stroke),
                self.effects()
            ));
            return;
        }
        let from = c + Vec2::from_angle(start) * radius;
        let to = c + Vec2::from_angle(end) * radius;
        let large = u8::from(sweep.abs() > std::f32::consts::PI);
        let clockwise = u8::from(sweep > 0.0);
        self.body.push_str(&format!(
            "<path d=\"M {:.1} {:.1} A {r:.2} {r:.2} 0 {large} {clockwise} {:.1} {:.1}\" {}{}/>",
            from.x,
            from.y,
            to.x,
            to.y,
            self.stroke(stroke),
            self.effects(),
            r = radius
        ));
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, stroke: &Stroke) {
        let (a, b) = (self.at(from), self.at(to));
        self.body.push_str(&format!(
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" {}{}/>",
            a.x,
            a.y,
            b.x,
            b.y,
            self.stroke(stroke),
            self.effects()
        ));
    }

    fn fill_text(&mut self, text: &str, at: Vec2, font: &Font, color: Color) {
        let p = self.at(at);
        self.body.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-family=\"Inter, sans-serif\" \
             font-size=\"{:.1}\" font-weight=\"{}\" letter-spacing=\"{}\" {}{}>{}</text>",
            p.x,
            p.y,
            font.size,
            font.weight,
            font.letter_spacing,
            self.fill(color),
            self.effects(),
            escape(text)
        ));
    }

    fn draw_image_circle(&mut self, url: &str, center: Vec2, radius: f32) {
        let c = self.at(center);
        let id = self.id("c");
        self.defs.push_str(&format!(
            "<clipPath id=\"{id}\"><circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{:.2}\"/></clipPath>",
            c.x, c.y, radius
        ));
        self.body.push_str(&format!(
            "<image href=\"{}\" x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" \
             preserveAspectRatio=\"xMidYMid slice\" clip-path=\"url(#{id})\" opacity=\"{:.3}\"{}/>",
            escape(url),
            c.x - radius,
            c.y - radius,
            radius * 2.0,
            radius * 2.0,
            self.state.alpha,
            self.effects()
        ));
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
