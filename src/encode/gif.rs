use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{BannerError, BannerResult};
use crate::render::surface::FrameRGBA;

/// Palette quantizer speed used when none is configured.
pub const DEFAULT_SPEED: i32 = 10;

/// Accepted quantizer speeds (1 is slowest and best).
pub const SPEED_RANGE: std::ops::RangeInclusive<i32> = 1..=30;

/// Sink that collects frames and encodes them into one looping GIF.
///
/// Frames are converted to straight alpha and copied on push. The stream is written in `end`,
/// after which [`GifSink::finish`] hands out the bytes.
pub struct GifSink {
    speed: i32,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    frames: Vec<Frame>,
    bytes: Option<Vec<u8>>,
}

impl GifSink {
    /// Sink with the given quantizer speed, clamped to [`SPEED_RANGE`].
    pub fn new(speed: i32) -> Self {
        Self {
            speed: speed.clamp(*SPEED_RANGE.start(), *SPEED_RANGE.end()),
            cfg: None,
            last_idx: None,
            frames: Vec::new(),
            bytes: None,
        }
    }

    /// Number of frames buffered in the current session.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Take the encoded stream. Fails unless `end` has completed.
    pub fn finish(self) -> BannerResult<Vec<u8>> {
        self.bytes
            .ok_or_else(|| BannerError::assembly("gif sink has not been finalized"))
    }
}

impl std::fmt::Debug for GifSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GifSink")
            .field("speed", &self.speed)
            .field("cfg", &self.cfg)
            .field("last_idx", &self.last_idx)
            .field("frames", &self.frames.len())
            .field("bytes", &self.bytes.as_ref().map(Vec::len))
            .finish()
    }
}

impl Default for GifSink {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED)
    }
}

impl FrameSink for GifSink {
    fn begin(&mut self, cfg: SinkConfig) -> BannerResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(BannerError::assembly("gif width/height must be non-zero"));
        }
        if cfg.width > u32::from(u16::MAX) || cfg.height > u32::from(u16::MAX) {
            return Err(BannerError::assembly(format!(
                "gif dimensions {}x{} exceed the format limit",
                cfg.width, cfg.height
            )));
        }
        tracing::debug!(
            width = cfg.width,
            height = cfg.height,
            delay_ms = cfg.delay_ms,
            loop_count = cfg.loop_count,
            "gif session started"
        );
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.frames.clear();
        self.bytes = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> BannerResult<()> {
        let Some(cfg) = self.cfg.as_ref() else {
            return Err(if self.bytes.is_some() {
                BannerError::assembly("gif sink is already finalized")
            } else {
                BannerError::assembly("gif sink not started")
            });
        };
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(BannerError::assembly(
                "gif sink received out-of-order frame index",
            ));
        }

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(BannerError::assembly(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        let image = RgbaImage::from_raw(frame.width, frame.height, frame.straight_rgba())
            .ok_or_else(|| BannerError::assembly("frame.data size mismatch with width*height*4"))?;

        let delay = Delay::from_numer_denom_ms(cfg.delay_ms, 1);
        self.frames.push(Frame::from_parts(image, 0, 0, delay));
        self.last_idx = Some(idx);
        Ok(())
    }

    fn end(&mut self) -> BannerResult<()> {
        let cfg = self
            .cfg
            .take()
            .ok_or_else(|| BannerError::assembly("gif sink not started"))?;
        if self.frames.is_empty() {
            return Err(BannerError::assembly("no frames to encode"));
        }

        let frame_count = self.frames.len();
        let repeat = match cfg.loop_count {
            0 => Repeat::Infinite,
            n => Repeat::Finite(n),
        };

        let mut bytes = Vec::new();
        {
            // The trailer is written when the encoder drops.
            let mut encoder = GifEncoder::new_with_speed(&mut bytes, self.speed);
            encoder
                .set_repeat(repeat)
                .map_err(|e| BannerError::assembly(format!("failed to set loop count: {e}")))?;
            encoder
                .encode_frames(self.frames.drain(..))
                .map_err(|e| BannerError::assembly(format!("gif encoding failed: {e}")))?;
        }

        tracing::debug!(frames = frame_count, bytes = bytes.len(), "gif session finished");
        self.bytes = Some(bytes);
        Ok(())
    }
}

/// Encode `frames` in order into one GIF with a uniform delay.
///
/// `loop_count == 0` loops forever. All frames must share the size of the first one.
pub fn assemble(frames: &[FrameRGBA], delay_ms: u32, loop_count: u16) -> BannerResult<Vec<u8>> {
    let first = frames
        .first()
        .ok_or_else(|| BannerError::assembly("no frames to encode"))?;

    let mut sink = GifSink::default();
    sink.begin(SinkConfig {
        width: first.width,
        height: first.height,
        delay_ms,
        loop_count,
    })?;
    for (i, frame) in frames.iter().enumerate() {
        let idx = u32::try_from(i)
            .map_err(|_| BannerError::assembly("too many frames for one animation"))?;
        sink.push_frame(FrameIndex(idx), frame)?;
    }
    sink.end()?;
    sink.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
