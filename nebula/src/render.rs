//! Frame rendering.
//!
//! Layers are drawn back to front:
//!
//! 1. background fill
//! 2. drifting clouds (screen blend)
//! 3. flickering stars with pointer parallax
//! 4. graph edges between nearby nodes
//! 5. nodes: community rings, atmosphere, orbiters, core, label,
//!    activity ring
//! 6. whispers
//!
//! Drawing also advances cosmetic animation state (cloud drift,
//! orbiter angles, node rotation); the physics tick happens before.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::canvas::{BlendMode, Canvas, Font, GradientStop, Stroke};
use crate::color::Color;
use crate::config::NebulaConfig;
use crate::engine::RenderContext;
use crate::images::ImageCache;
use crate::node::SimNode;
use crate::scene::to_canvas;

/// Rings drawn at most, however many communities a member joined.
const MAX_COMMUNITY_RINGS: u32 = 5;

const LABEL_COLOR: Color = Color::rgba(255, 255, 255, 0.9);
const WHISPER_COLOR: Color = Color::rgb(255, 255, 255);

/// Draw one frame of `ctx` onto `canvas`.
pub fn draw(ctx: &mut RenderContext, config: &NebulaConfig, canvas: &mut dyn Canvas) {
    canvas.begin_frame(ctx.viewport);
    draw_background(ctx, config, canvas);
    draw_clouds(ctx, canvas);
    draw_stars(ctx, config, canvas);
    draw_connections(ctx, config, canvas);
    for id in ctx.graph.node_indices().collect::<Vec<_>>() {
        draw_node(&mut ctx.graph[id], ctx.frame, &ctx.images, canvas);
    }
    draw_whispers(ctx, canvas);
}

fn draw_background(ctx: &RenderContext, config: &NebulaConfig, canvas: &mut dyn Canvas) {
    let fill = Color::from_hex(&config.scene.background).unwrap_or(Color::rgb(2, 4, 8));
    canvas.fill_rect(
        Vec2::ZERO,
        Vec2::new(ctx.viewport.width, ctx.viewport.height),
        fill,
    );
}

fn draw_clouds(ctx: &mut RenderContext, canvas: &mut dyn Canvas) {
    ctx.scene.drift_clouds();
    let span = ctx.viewport.width.max(ctx.viewport.height);

    canvas.save();
    canvas.set_blend(BlendMode::Screen);
    for cloud in &ctx.scene.clouds {
        let center = to_canvas(cloud.position, ctx.viewport);
        canvas.fill_radial_gradient(
            center,
            0.0,
            cloud.size * span,
            &[
                GradientStop::new(0.0, cloud.color),
                GradientStop::new(1.0, Color::TRANSPARENT),
            ],
        );
    }
    canvas.restore();
}

fn draw_stars(ctx: &RenderContext, config: &NebulaConfig, canvas: &mut dyn Canvas) {
    let displacement = (ctx.pointer.smoothed() - ctx.viewport.center()) * config.scene.parallax;
    for star in &ctx.scene.stars {
        let at = to_canvas(star.position, ctx.viewport) + displacement * star.depth;
        let alpha = star.opacity * star.flicker(ctx.frame);
        canvas.fill_circle(at, star.size, Color::WHITE.with_alpha(alpha));
    }
}

fn draw_connections(ctx: &RenderContext, config: &NebulaConfig, canvas: &mut dyn Canvas) {
    let max = config.scene.connection_distance;
    if max <= 0.0 {
        return;
    }
    for edge in ctx.graph.edge_indices() {
        let Some((a, b)) = ctx.graph.edge_endpoints(edge) else {
            continue;
        };
        let (a, b) = (ctx.graph[a].position(), ctx.graph[b].position());
        let d = a.distance(b);
        if d >= max {
            continue;
        }
        let alpha = config.scene.connection_alpha * (1.0 - d / max);
        canvas.stroke_line(a, b, &Stroke::solid(Color::WHITE.with_alpha(alpha), 0.5));
    }
}

fn draw_node(node: &mut SimNode, frame: u64, images: &ImageCache, canvas: &mut dyn Canvas) {
    let radius = node.sim.radius;
    let palette = node.sim.palette;
    let t = frame as f32;

    canvas.save();
    canvas.translate(node.position());

    // Community rings
    let spin = t * 0.01;
    for c in 0..node.identity.community_count.min(MAX_COMMUNITY_RINGS) {
        canvas.stroke_arc(
            Vec2::ZERO,
            radius + 50.0 + c as f32 * 20.0,
            spin,
            spin + TAU,
            &Stroke::dashed(palette.glow, 0.5, 5.0, 15.0),
        );
    }

    node.sim.rotation = (node.sim.rotation + node.sim.rotation_speed).rem_euclid(TAU);

    // Atmosphere
    canvas.set_blend(BlendMode::Screen);
    canvas.fill_radial_gradient(
        Vec2::ZERO,
        radius * 0.5,
        radius * 4.0,
        &[
            GradientStop::new(0.0, palette.glow),
            GradientStop::new(1.0, Color::TRANSPARENT),
        ],
    );
    canvas.set_blend(BlendMode::Normal);

    // Orbiters and their trails
    for orbiter in &mut node.sim.orbiters {
        orbiter.advance();
        let (size, color, alpha) = if orbiter.is_planet {
            (orbiter.size * 1.5, Color::WHITE, 0.8)
        } else {
            (orbiter.size, palette.core, 0.4)
        };
        canvas.set_alpha(alpha);
        canvas.fill_circle(orbiter.offset(), size, color);
        canvas.set_alpha(1.0);

        if orbiter.is_planet {
            canvas.set_shadow(10.0, palette.core);
        }
        canvas.stroke_arc(
            Vec2::ZERO,
            orbiter.distance,
            orbiter.angle - 0.8,
            orbiter.angle,
            &Stroke::solid(palette.trail, 0.5),
        );
        if orbiter.is_planet {
            canvas.set_shadow(0.0, Color::TRANSPARENT);
        }
    }

    // Core
    let portrait = node.identity.portrait_url.as_str();
    if images.is_ready(portrait) {
        canvas.draw_image_circle(portrait, Vec2::ZERO, radius);
    } else {
        canvas.set_shadow(30.0, palette.core);
        canvas.fill_circle(Vec2::ZERO, radius, Color::WHITE);
        canvas.set_shadow(0.0, Color::TRANSPARENT);
        canvas.fill_radial_gradient(
            Vec2::ZERO,
            0.0,
            radius,
            &[
                GradientStop::new(0.0, Color::WHITE),
                GradientStop::new(0.4, palette.core),
                GradientStop::new(1.0, Color::TRANSPARENT),
            ],
        );
    }

    // Label
    let resonance = node.total_resonance as f32;
    let font = Font {
        size: (8.0 + resonance).max(10.0),
        weight: 700,
        letter_spacing: 3.0,
    };
    canvas.fill_text(
        &node.identity.name.to_uppercase(),
        Vec2::new(0.0, radius + 40.0 + resonance * 2.0),
        &font,
        LABEL_COLOR,
    );

    // Activity ring
    if node.posted_today {
        let pulse = 1.0 + (t * 0.05).sin() * 0.1;
        canvas.stroke_arc(
            Vec2::ZERO,
            (radius + 12.0) * pulse,
            0.0,
            TAU,
            &Stroke::dashed(palette.core, 2.0, 4.0, 8.0),
        );
    }

    canvas.restore();
}

fn draw_whispers(ctx: &RenderContext, canvas: &mut dyn Canvas) {
    let font = Font {
        size: 14.0,
        weight: 300,
        letter_spacing: 2.0,
    };
    for whisper in &ctx.whispers {
        canvas.fill_text(
            &whisper.text,
            whisper.position,
            &font,
            WHISPER_COLOR.with_alpha(whisper.alpha()),
        );
    }
}
