use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::effects::{EffectContext, EffectProcedure, polygon};
use crate::foundation::core::{BezPath, Point, Rect, Rgba8, Vec2};
use crate::foundation::error::BannerResult;
use crate::render::fonts::GenericFamily;
use crate::render::gradient::Gradient;
use crate::render::surface::Shadow;

const STAR_COUNT: usize = 20;
/// Inner radius of a star as a share of its outer radius.
const STAR_INNER: f64 = 0.4;
const HALO_RADIUS: f64 = 80.0;
const RING_SPARKLES: usize = 12;

/// (blur, offset, alpha) of the soft passes under the headline.
const SOFT_PASSES: [(f32, f64, f32); 3] = [(20.0, 3.0, 0.8), (15.0, 2.0, 0.9), (10.0, 1.0, 1.0)];

/// Star field with a ring of white cross sparkles around the text.
pub(crate) struct Sparkle;

impl EffectProcedure for Sparkle {
    fn draw(&self, cx: &mut EffectContext<'_>) -> BannerResult<()> {
        let canvas = cx.canvas();
        let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
        let c = cx.color;

        cx.surface.set_shadow(Shadow::glow(c, 10.0));
        for _ in 0..STAR_COUNT {
            let center = Point::new(cx.rng.range(0.0, w), cx.rng.range(0.0, h));
            let size = cx.rng.range(2.0, 8.0);
            let brightness = cx.rng.next_f64() as f32;
            cx.surface
                .fill_path(&star(center, size), c.with_alpha(brightness))?;
        }
        cx.surface.clear_shadow();

        let halo = Gradient::radial(cx.anchor, HALO_RADIUS)
            .with_stop(0.0, c.with_alpha(0.2))
            .with_stop(1.0, c.with_alpha(0.0));
        let halo_rect = Rect::from_center_size(cx.anchor, (HALO_RADIUS * 2.0, HALO_RADIUS * 2.0));
        cx.surface.fill_rect_gradient(halo_rect, &halo)?;

        let run = cx.banner_run(cx.headline_size(), GenericFamily::Serif)?;
        let origin = cx.centered(&run);
        for (blur, offset, alpha) in SOFT_PASSES {
            cx.surface
                .set_shadow(Shadow::glow(c, blur).offset_by(offset, offset));
            cx.surface.set_global_alpha(alpha);
            cx.surface.fill_text(&run, origin, c)?;
        }

        cx.surface.set_shadow(Shadow::glow(c, 25.0));
        cx.surface.set_global_alpha(1.0);
        cx.surface.fill_text(&run, origin, c)?;

        cx.surface.set_shadow(Shadow::glow(Rgba8::WHITE, 15.0));
        cx.surface.set_global_alpha(0.9);
        for i in 0..RING_SPARKLES {
            let angle = TAU * i as f64 / RING_SPARKLES as f64;
            let distance = cx.rng.range(60.0, 100.0);
            let at = cx.anchor + Vec2::from_angle(angle) * distance;
            let size = cx.rng.range(3.0, 7.0);

            cx.surface.fill_rect(
                Rect::new(at.x - size, at.y - 1.0, at.x + size, at.y + 1.0),
                Rgba8::WHITE,
            )?;
            cx.surface.fill_rect(
                Rect::new(at.x - 1.0, at.y - size, at.x + 1.0, at.y + size),
                Rgba8::WHITE,
            )?;
        }
        Ok(())
    }
}

/// Five-pointed star with its first point straight up.
fn star(center: Point, outer: f64) -> BezPath {
    let points: Vec<Point> = (0..10)
        .map(|k| {
            let radius = if k % 2 == 0 { outer } else { outer * STAR_INNER };
            let angle = -FRAC_PI_2 + f64::from(k) * PI / 5.0;
            center + Vec2::from_angle(angle) * radius
        })
        .collect();
    polygon(&points)
}
