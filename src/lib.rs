//! gifbanner renders short text into looping animated GIF banners.
//!
//! Every frame is the same text drawn in a different font (or once, in one chosen font) with one
//! of a handful of layered effects. The public API is generator-oriented:
//!
//! - Describe a request with [`RenderSettings`]
//! - Create a [`BannerGenerator`] from a [`BannerConfig`]
//! - Call [`BannerGenerator::generate`] and use the [`AnimationResult`]
//!
//! Lower-level pieces ([`render_frame`], [`GifSink`], [`assemble`]) are exported for callers that
//! want to drive frames themselves.
#![forbid(unsafe_code)]

mod foundation;
mod render;

/// Generator configuration.
pub mod config;
/// Per-effect drawing procedures.
pub mod effects;
/// Encoding sessions.
pub mod encode;
/// Generation orchestration.
pub mod session;
/// Request settings and validation.
pub mod settings;

pub use crate::foundation::core::{
    BezPath, Canvas, FrameIndex, Point, Rect, Rgba8, Rgba8Premul, Vec2,
};
pub use crate::foundation::error::{BannerError, BannerResult};
pub use crate::foundation::math::Prng;

pub use crate::config::{BannerConfig, FONT_ROTATION, FontOptions};
pub use crate::effects::{BackgroundMode, Effect, FrameOptions, render_frame};
pub use crate::encode::gif::{GifSink, assemble};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::render::fonts::{FontFace, FontSources, GenericFamily};
pub use crate::render::surface::{DrawState, FrameRGBA, Shadow, Surface};
pub use crate::render::text::{TextRun, Typesetter};
pub use crate::session::generator::{
    BannerGenerator, GenerationState, GenerationTicket, RenderStats,
};
pub use crate::session::result::{AnimationResult, Download, human_size};
pub use crate::settings::{FontSelection, RenderSettings, ValidatedSettings};
