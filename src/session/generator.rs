use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::BannerConfig;
use crate::effects::render_frame;
use crate::encode::gif::GifSink;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{BannerError, BannerResult};
use crate::foundation::math::Prng;
use crate::render::fonts::{FontFace, GenericFamily};
use crate::render::surface::Surface;
use crate::render::text::Typesetter;
use crate::session::result::AnimationResult;
use crate::settings::{RenderSettings, ValidatedSettings};

/// Whether a generation run is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GenerationState {
    #[default]
    Idle,
    InProgress,
}

/// Per-run statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames pushed into the sink.
    pub frames: usize,
    /// Frames whose requested family was not installed and used a fallback face.
    pub fallback_frames: usize,
}

/// Exclusive right to run one generation. Dropping it makes the generator idle again.
#[derive(Debug)]
#[must_use = "the generator is idle again as soon as the ticket drops"]
pub struct GenerationTicket<'g> {
    generator: &'g BannerGenerator,
}

impl Drop for GenerationTicket<'_> {
    fn drop(&mut self) {
        *lock(&self.generator.state) = GenerationState::Idle;
    }
}

/// Top-level orchestrator: validates requests, renders one frame per font and keeps the latest
/// finished animation.
///
/// Only one generation runs at a time. A request that arrives while another is in progress fails
/// with [`BannerError::GenerationInProgress`]; it is never queued.
#[derive(Debug)]
pub struct BannerGenerator {
    config: BannerConfig,
    state: Mutex<GenerationState>,
    typesetter: Mutex<Typesetter>,
    current: Mutex<Option<Arc<AnimationResult>>>,
}

impl BannerGenerator {
    /// Validate `config` and load its fonts.
    ///
    /// Fails with [`BannerError::Font`] when no font face can be found at all.
    pub fn new(config: BannerConfig) -> BannerResult<Self> {
        config.validate()?;
        let typesetter = Typesetter::new(&config.font_sources())?;
        Ok(Self {
            config,
            state: Mutex::new(GenerationState::Idle),
            typesetter: Mutex::new(typesetter),
            current: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &BannerConfig {
        &self.config
    }

    pub fn state(&self) -> GenerationState {
        *lock(&self.state)
    }

    pub fn is_generating(&self) -> bool {
        self.state() == GenerationState::InProgress
    }

    /// Claim the generator, or fail if a run is already active.
    pub fn try_begin(&self) -> BannerResult<GenerationTicket<'_>> {
        let mut state = lock(&self.state);
        if *state == GenerationState::InProgress {
            tracing::warn!("generation requested while another is in progress");
            return Err(BannerError::GenerationInProgress);
        }
        *state = GenerationState::InProgress;
        Ok(GenerationTicket { generator: self })
    }

    /// Validate `settings`, render every frame and encode the animation.
    pub fn generate(&self, settings: &RenderSettings) -> BannerResult<Arc<AnimationResult>> {
        let ticket = self.try_begin()?;
        self.generate_with(&ticket, settings)
    }

    /// [`BannerGenerator::generate`] for a caller that already holds a ticket.
    ///
    /// On success the result becomes the current one. On failure the current result is left
    /// as it was.
    #[tracing::instrument(
        level = "info",
        skip_all,
        fields(effect = %settings.effect, font = %settings.font, frames = tracing::field::Empty)
    )]
    pub fn generate_with(
        &self,
        ticket: &GenerationTicket<'_>,
        settings: &RenderSettings,
    ) -> BannerResult<Arc<AnimationResult>> {
        let validated = settings.validate()?;
        let frame_count = validated.font.frame_count(&self.config.font_rotation);
        tracing::Span::current().record("frames", frame_count);

        let mut sink = GifSink::new(self.config.quantizer_speed);
        let stats = self.render_frames(ticket, &validated, &mut sink)?;
        let bytes = sink.finish()?;

        let result = Arc::new(AnimationResult::new(
            bytes,
            validated.text,
            settings.clone(),
            stats.frames,
        ));
        tracing::info!(
            bytes = result.byte_size,
            size = %result.human_size(),
            frames = stats.frames,
            fallback_frames = stats.fallback_frames,
            text_color = %validated.frame.text_color.to_hex(),
            background_color = %validated.frame.background_color.to_hex(),
            "banner generated"
        );
        *lock(&self.current) = Some(Arc::clone(&result));
        Ok(result)
    }

    /// Render every frame of `settings` into `sink`, in font order.
    ///
    /// One surface is allocated for the run and cleared before each frame; the sink copies each
    /// frame before the next one is drawn.
    pub fn render_frames(
        &self,
        ticket: &GenerationTicket<'_>,
        settings: &ValidatedSettings,
        sink: &mut dyn FrameSink,
    ) -> BannerResult<RenderStats> {
        if !std::ptr::eq(ticket.generator, self) {
            return Err(BannerError::render(
                "generation ticket belongs to a different generator",
            ));
        }

        let families = settings.font.families(&self.config.font_rotation);
        let canvas = self.config.canvas;
        let mut rng = match self.config.seed {
            Some(seed) => Prng::seeded(seed),
            None => Prng::from_clock(),
        };
        let mut typesetter = lock(&self.typesetter);
        let mut surface = Surface::new(canvas)?;

        sink.begin(SinkConfig {
            width: canvas.width,
            height: canvas.height,
            delay_ms: settings.delay_ms,
            loop_count: self.config.loop_count,
        })?;

        let mut stats = RenderStats::default();
        for (i, family) in families.iter().enumerate() {
            if !typesetter.resolve(family, GenericFamily::SansSerif)?.exact {
                stats.fallback_frames += 1;
            }
            render_frame(
                &mut surface,
                &mut typesetter,
                &mut rng,
                &settings.text,
                family,
                self.config.font_size_px,
                &settings.frame,
            )?;
            let idx = u32::try_from(i)
                .map_err(|_| BannerError::assembly("too many frames for one animation"))?;
            sink.push_frame(FrameIndex(idx), &surface.to_frame())?;
            tracing::debug!(frame = i, family = *family, "frame rendered");
            stats.frames += 1;
        }

        sink.end()?;
        Ok(stats)
    }

    /// Resolve every family of the rotation to the face that would be drawn.
    pub fn resolve_rotation(&self) -> BannerResult<Vec<(String, FontFace)>> {
        let mut typesetter = lock(&self.typesetter);
        self.config
            .font_rotation
            .iter()
            .map(|family| {
                let face = typesetter.resolve(family, GenericFamily::SansSerif)?;
                Ok((family.clone(), face))
            })
            .collect()
    }

    /// The latest successful result, if any.
    pub fn current(&self) -> Option<Arc<AnimationResult>> {
        lock(&self.current).clone()
    }

    /// Forget the current result.
    pub fn clear_current(&self) -> Option<Arc<AnimationResult>> {
        lock(&self.current).take()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "../../tests/unit/session/generator.rs"]
mod tests;
