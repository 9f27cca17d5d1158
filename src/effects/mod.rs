//! Per-effect drawing procedures and the frame renderer that dispatches to them.
//!
//! Every procedure draws onto a [`Surface`] that has already been cleared and given its
//! background. Procedures are free to change the draw state; [`render_frame`] resets it after
//! the procedure returns, on success and on error alike.

mod glow;
mod matrix;
mod neon;
mod plain;
mod retro;
mod sparkle;

use std::fmt;
use std::str::FromStr;

use crate::foundation::core::{BezPath, Canvas, Point, Rgba8};
use crate::foundation::error::{BannerError, BannerResult};
use crate::foundation::math::Prng;
use crate::render::fonts::GenericFamily;
use crate::render::gradient::Gradient;
use crate::render::surface::Surface;
use crate::render::text::{TextRun, Typesetter};

/// Visual effect applied to the banner text.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(from = "String", into = "String")]
pub enum Effect {
    /// Flat fill with a soft drop shadow.
    #[default]
    None,
    Glow,
    Neon,
    Matrix,
    Retro,
    /// Star field around the text. `fire` is accepted as an alias.
    Sparkle,
}

impl Effect {
    pub const ALL: [Effect; 6] = [
        Effect::None,
        Effect::Glow,
        Effect::Neon,
        Effect::Matrix,
        Effect::Retro,
        Effect::Sparkle,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Glow => "glow",
            Self::Neon => "neon",
            Self::Matrix => "matrix",
            Self::Retro => "retro",
            Self::Sparkle => "sparkle",
        }
    }

    /// Parse an effect id, falling back to [`Effect::None`] for anything unknown.
    pub fn from_id_lenient(id: &str) -> Self {
        id.parse().unwrap_or_else(|_| {
            tracing::warn!(effect = id, "unrecognized effect, falling back to none");
            Self::None
        })
    }

    fn procedure(self) -> &'static dyn EffectProcedure {
        match self {
            Self::None => &plain::Plain,
            Self::Glow => &glow::Glow,
            Self::Neon => &neon::Neon,
            Self::Matrix => &matrix::Matrix,
            Self::Retro => &retro::Retro,
            Self::Sparkle => &sparkle::Sparkle,
        }
    }
}

impl FromStr for Effect {
    type Err = BannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "glow" => Ok(Self::Glow),
            "neon" => Ok(Self::Neon),
            "matrix" => Ok(Self::Matrix),
            "retro" => Ok(Self::Retro),
            "sparkle" | "fire" => Ok(Self::Sparkle),
            other => Err(BannerError::validation(format!(
                "unknown effect '{other}' (expected one of none, glow, neon, matrix, retro, sparkle)"
            ))),
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl From<String> for Effect {
    fn from(id: String) -> Self {
        Self::from_id_lenient(&id)
    }
}

impl From<Effect> for String {
    fn from(effect: Effect) -> Self {
        effect.id().to_string()
    }
}

/// How the area behind the text is painted.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    /// Flat fill with the background color.
    #[default]
    Solid,
    /// Diagonal gradient from the background color to a darker shade of it.
    Gradient,
    /// Nothing is painted; the frame keeps its alpha.
    Transparent,
}

impl FromStr for BackgroundMode {
    type Err = BannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solid" => Ok(Self::Solid),
            "gradient" => Ok(Self::Gradient),
            "transparent" | "none" => Ok(Self::Transparent),
            other => Err(BannerError::validation(format!(
                "unknown background mode '{other}' (expected solid, gradient or transparent)"
            ))),
        }
    }
}

/// Per-frame styling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameOptions {
    pub text_color: Rgba8,
    pub background_color: Rgba8,
    pub background_mode: BackgroundMode,
    pub effect: Effect,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            text_color: Rgba8::WHITE,
            background_color: Rgba8::BLACK,
            background_mode: BackgroundMode::Solid,
            effect: Effect::None,
        }
    }
}

/// Channel amount the gradient background darkens by toward its far corner.
const GRADIENT_DARKEN: i16 = 50;

/// Everything an effect procedure may touch while drawing one frame.
pub struct EffectContext<'a> {
    pub surface: &'a mut Surface,
    pub typesetter: &'a mut Typesetter,
    pub rng: &'a mut Prng,
    pub text: &'a str,
    pub font_family: &'a str,
    pub font_size: f32,
    pub color: Rgba8,
    /// Text anchor: the canvas midpoint.
    pub anchor: Point,
}

impl EffectContext<'_> {
    pub fn canvas(&self) -> Canvas {
        self.surface.canvas()
    }

    /// Size used by the effects that scale their headline with the canvas.
    pub fn headline_size(&self) -> f32 {
        (f64::from(self.canvas().height) * 0.15) as f32
    }

    /// Lay out the banner text in the requested family.
    pub fn banner_run(&mut self, size_px: f32, generic: GenericFamily) -> BannerResult<TextRun> {
        self.typesetter
            .layout(self.text, self.font_family, generic, size_px)
    }

    /// Top-left corner that centers `run` on the anchor.
    pub fn centered(&self, run: &TextRun) -> Point {
        run.origin_centered_on(self.anchor)
    }
}

/// One visual effect.
pub trait EffectProcedure: Sync {
    fn draw(&self, cx: &mut EffectContext<'_>) -> BannerResult<()>;
}

/// Clear `surface`, paint the background and draw `text` with the requested effect.
///
/// The draw state is reset before returning, whether or not the effect succeeded.
#[allow(clippy::too_many_arguments)]
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(effect = %options.effect, font = font_family)
)]
pub fn render_frame<'s>(
    surface: &'s mut Surface,
    typesetter: &mut Typesetter,
    rng: &mut Prng,
    text: &str,
    font_family: &str,
    font_size: f32,
    options: &FrameOptions,
) -> BannerResult<&'s mut Surface> {
    surface.clear();
    {
        let mut scoped = surface.scoped_state();
        paint_background(&mut scoped, options.background_color, options.background_mode)?;

        let anchor = scoped.canvas().center();
        let mut cx = EffectContext {
            surface: &mut *scoped,
            typesetter,
            rng,
            text,
            font_family,
            font_size,
            color: options.text_color,
            anchor,
        };
        options.effect.procedure().draw(&mut cx)?;
    }
    Ok(surface)
}

/// Paint the background according to `mode`.
pub fn paint_background(
    surface: &mut Surface,
    color: Rgba8,
    mode: BackgroundMode,
) -> BannerResult<()> {
    let rect = surface.canvas().rect();
    match mode {
        BackgroundMode::Solid => surface.fill_rect(rect, color),
        BackgroundMode::Gradient => {
            let gradient = Gradient::linear(rect.origin(), Point::new(rect.x1, rect.y1))
                .with_stop(0.0, color)
                .with_stop(
                    1.0,
                    color.shifted(-GRADIENT_DARKEN, -GRADIENT_DARKEN, -GRADIENT_DARKEN),
                );
            surface.fill_rect_gradient(rect, &gradient)
        }
        BackgroundMode::Transparent => Ok(()),
    }
}

/// Open two-point path.
pub(crate) fn segment(from: impl Into<Point>, to: impl Into<Point>) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(from);
    path.line_to(to);
    path
}

/// Closed polygon through `points`.
pub(crate) fn polygon(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((&first, rest)) = points.split_first() {
        path.move_to(first);
        for &p in rest {
            path.line_to(p);
        }
        path.close_path();
    }
    path
}

#[cfg(test)]
#[path = "../../tests/unit/effects/effects.rs"]
mod tests;
