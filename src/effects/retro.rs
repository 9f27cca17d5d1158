use std::f64::consts::TAU;

use kurbo::Shape;

use crate::effects::{EffectContext, EffectProcedure, polygon, segment};
use crate::foundation::core::{Point, Rect, Rgba8, Vec2};
use crate::foundation::error::BannerResult;
use crate::render::fonts::GenericFamily;
use crate::render::gradient::Gradient;
use crate::render::surface::Shadow;

/// Share of the canvas height where the floor grid starts.
const HORIZON: f64 = 0.7;
const GRID_STEP: f64 = 20.0;
const GRID_COLUMNS: u32 = 8;
const SHAPE_COUNT: usize = 6;
const BEAM_COUNT: usize = 4;
const BEAM_LENGTH: f64 = 80.0;

/// Synthwave: sunset sky, perspective floor grid, neon shapes and extruded chrome text.
pub(crate) struct Retro;

impl EffectProcedure for Retro {
    fn draw(&self, cx: &mut EffectContext<'_>) -> BannerResult<()> {
        let canvas = cx.canvas();
        let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
        let c = cx.color;

        let sunset = Gradient::linear(Point::ZERO, Point::new(0.0, h))
            .with_stop(0.0, c.shifted(100, -50, 150).with_alpha(0.6))
            .with_stop(0.4, c.shifted(0, 100, 0).with_alpha(0.4))
            .with_stop(0.8, c.shifted(50, 150, -50).with_alpha(0.3))
            .with_stop(1.0, c.shifted(-50, -50, 0).with_alpha(0.2));
        cx.surface.fill_rect_gradient(canvas.rect(), &sunset)?;

        cx.surface.set_line_width(2.0);
        let grid = c.with_alpha(0.4);
        let horizon = h * HORIZON;
        let mut y = horizon;
        while y < h {
            let depth = (y - horizon) / (h * (1.0 - HORIZON));
            let span = w * (0.9 - depth * 0.4);
            let start = (w - span) / 2.0;
            cx.surface
                .stroke_path(&segment((start, y), (start + span, y)), grid)?;
            y += GRID_STEP;
        }
        for i in 0..=GRID_COLUMNS {
            let top = w / f64::from(GRID_COLUMNS) * f64::from(i);
            let bottom = top + (top - w / 2.0) * 0.3;
            cx.surface
                .stroke_path(&segment((top, horizon), (bottom, h)), grid)?;
        }

        // The shapes' glow stays on for the scanlines and the extrusion.
        neon_shapes(cx)?;

        let scan = c.with_alpha(0.08);
        cx.surface.batch(|b| {
            for y in (0..canvas.height).step_by(4) {
                b.fill_rect(Rect::new(0.0, f64::from(y), w, f64::from(y) + 1.0), scan);
            }
        })?;

        let run = cx.banner_run(cx.headline_size(), GenericFamily::SansSerif)?;
        let origin = cx.centered(&run);

        let extrusion = [
            c.shifted(-150, -150, -50).with_alpha(0.9),
            c.shifted(-100, -100, -30).with_alpha(0.7),
            c.shifted(-50, -50, 0).with_alpha(0.5),
        ];
        for (step, shade) in extrusion.into_iter().enumerate() {
            let d = (step + 1) as f64 * 3.0;
            cx.surface
                .fill_text(&run, origin + Vec2::new(d, d), shade)?;
        }

        cx.surface.set_line_width(4.0);
        cx.surface.set_shadow(Shadow::glow(c, 20.0));
        cx.surface.stroke_text(&run, origin, c)?;

        cx.surface.set_shadow(Shadow::glow(c, 25.0));
        cx.surface.fill_text(&run, origin, c)?;

        cx.surface
            .set_shadow(Shadow::glow(Rgba8::WHITE.with_alpha(0.9), 10.0));
        cx.surface
            .fill_text(&run, origin, Rgba8::WHITE.with_alpha(0.8))?;

        cx.surface.set_line_width(3.0);
        cx.surface.set_shadow(Shadow::glow(c, 10.0));
        for i in 0..BEAM_COUNT {
            let angle = TAU / BEAM_COUNT as f64 * i as f64;
            let end = cx.anchor + Vec2::from_angle(angle) * BEAM_LENGTH;
            cx.surface
                .stroke_path(&segment(cx.anchor, end), c.with_alpha(0.3))?;
        }
        Ok(())
    }
}

/// Scatter the neon shapes over the upper part of the canvas, leaving their glow set.
pub(super) fn neon_shapes(cx: &mut EffectContext<'_>) -> BannerResult<()> {
    let canvas = cx.canvas();
    let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
    let c = cx.color;

    cx.surface.set_shadow(Shadow::glow(c, 15.0));
    for i in 0..SHAPE_COUNT {
        let center = Point::new(cx.rng.range(0.0, w), cx.rng.range(0.0, h * 0.6));
        let size = cx.rng.range(10.0, 30.0);
        let shape = match i % 3 {
            0 => polygon(&[
                center + Vec2::new(0.0, -size),
                center + Vec2::new(-size, size),
                center + Vec2::new(size, size),
            ]),
            1 => kurbo::Circle::new(center, size).to_path(0.1),
            _ => polygon(&[
                center + Vec2::new(0.0, -size),
                center + Vec2::new(size, 0.0),
                center + Vec2::new(0.0, size),
                center + Vec2::new(-size, 0.0),
            ]),
        };
        cx.surface.fill_path(&shape, c.with_alpha(0.3))?;
    }
    Ok(())
}
