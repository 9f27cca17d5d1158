use std::collections::HashMap;

use crate::effects::{EffectContext, EffectProcedure};
use crate::foundation::core::{Point, Rect, Rgba8};
use crate::foundation::error::BannerResult;
use crate::render::fonts::GenericFamily;
use crate::render::gradient::Gradient;
use crate::render::surface::Shadow;
use crate::render::text::TextRun;

/// Character set of each rain layer, back to front.
const RAIN_SETS: [&str; 4] = [
    "01",
    "アイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワヲン",
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789",
    "!@#$%^&*()_+-=[]{}|;:,.<>?",
];
const RAIN_FAMILY: &str = "Courier New";
const COLUMN_WIDTH: f64 = 14.0;
const NOISE_GLYPHS: [char; 2] = ['█', '▓'];
const NOISE_COUNT: usize = 200;
const GLITCH_BARS: usize = 5;
const GLOW_RADIUS: f64 = 100.0;

/// Digital rain behind layered, glowing text.
pub(crate) struct Matrix;

/// A single rain glyph waiting to be drawn.
struct RainGlyph {
    key: (u8, char),
    at: Point,
    color: Rgba8,
}

impl EffectProcedure for Matrix {
    fn draw(&self, cx: &mut EffectContext<'_>) -> BannerResult<()> {
        let canvas = cx.canvas();
        let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
        let base = cx.color;
        let bright = base.shifted(100, 100, 100);
        let dark = base.shifted(-100, -100, -100);

        // Shaped glyphs, keyed by (font size, char).
        let mut glyphs: HashMap<(u8, char), TextRun> = HashMap::new();

        let mut drops = Vec::new();
        let columns = (w / COLUMN_WIDTH).floor() as usize;
        for (layer, set) in RAIN_SETS.iter().enumerate() {
            let alpha = 0.3 - layer as f32 * 0.05;
            let size = 12 + layer as u8 * 2;
            let set: Vec<char> = set.chars().collect();

            for col in 0..columns {
                let column_x = col as f64 * COLUMN_WIDTH;
                let count = 5 + cx.rng.index(15);
                for i in 0..count {
                    let ch = set[cx.rng.index(set.len())];
                    let y = cx.rng.range(0.0, h) + layer as f64 * 50.0;
                    let distance = (y - h / 2.0).abs() / (h / 2.0);
                    let brightness = (1.0 - distance).max(0.1) as f32;
                    let color = match i {
                        0..3 => Rgba8::WHITE.with_alpha(alpha * brightness),
                        3..6 => base.with_alpha(alpha * brightness),
                        _ => base.with_alpha(alpha * brightness * 0.7),
                    };
                    let jitter = (cx.rng.next_f64() - 0.5) * 3.0;
                    drops.push(RainGlyph {
                        key: (size, ch),
                        at: Point::new(column_x + jitter, y),
                        color,
                    });
                }
            }
        }

        let noise_color = base.with_alpha(0.05);
        for _ in 0..NOISE_COUNT {
            let ch = if cx.rng.chance(0.5) {
                NOISE_GLYPHS[0]
            } else {
                NOISE_GLYPHS[1]
            };
            let at = Point::new(cx.rng.range(0.0, w), cx.rng.range(0.0, h));
            drops.push(RainGlyph {
                key: (8, ch),
                at,
                color: noise_color,
            });
        }

        for drop in &drops {
            if !glyphs.contains_key(&drop.key) {
                let (size, ch) = drop.key;
                let run = cx.typesetter.layout(
                    ch.encode_utf8(&mut [0u8; 4]),
                    RAIN_FAMILY,
                    GenericFamily::Monospace,
                    f32::from(size),
                )?;
                glyphs.insert(drop.key, run);
            }
        }

        cx.surface.batch(|b| {
            for drop in &drops {
                if let Some(run) = glyphs.get(&drop.key) {
                    b.fill_text(run, run.origin_centered_on(drop.at), drop.color);
                }
            }
        })?;

        let glitch_color = base.with_alpha(0.2);
        let bars: Vec<Rect> = (0..GLITCH_BARS)
            .map(|_| {
                let y = cx.rng.range(0.0, h);
                let thickness = cx.rng.range(1.0, 4.0);
                Rect::new(0.0, y, w, y + thickness)
            })
            .collect();
        cx.surface.batch(|b| {
            for bar in &bars {
                b.fill_rect(*bar, glitch_color);
            }
        })?;

        let halo = Gradient::radial(cx.anchor, GLOW_RADIUS)
            .with_stop(0.0, base.with_alpha(0.3))
            .with_stop(0.5, base.with_alpha(0.1))
            .with_stop(1.0, base.with_alpha(0.0));
        let halo_rect = Rect::from_center_size(cx.anchor, (GLOW_RADIUS * 2.0, GLOW_RADIUS * 2.0));
        cx.surface.fill_rect_gradient(halo_rect, &halo)?;

        let run = cx.banner_run(cx.headline_size(), GenericFamily::Monospace)?;
        let origin = cx.centered(&run);
        for (color, blur, offset) in [
            (dark, 20.0, 4.0),
            (base, 15.0, 2.0),
            (bright, 8.0, 1.0),
            (Rgba8::WHITE, 3.0, 0.0),
        ] {
            cx.surface
                .set_shadow(Shadow::glow(color, blur).offset_by(offset, offset));
            cx.surface.fill_text(&run, origin, color)?;
        }

        cx.surface.set_shadow(Shadow::glow(base, 25.0));
        cx.surface.fill_text(&run, origin, base)?;

        cx.surface.clear_shadow();
        let scan_color = base.with_alpha(0.1);
        let scanlines: Vec<Rect> = (0..canvas.height)
            .step_by(4)
            .filter(|_| cx.rng.next_f64() > 0.7)
            .map(|y| Rect::new(0.0, f64::from(y), w, f64::from(y) + 1.0))
            .collect();
        cx.surface.batch(|b| {
            for line in &scanlines {
                b.fill_rect(*line, scan_color);
            }
        })
    }
}
