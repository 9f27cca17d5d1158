use std::path::Path;

use anyhow::Context as _;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};

use crate::foundation::error::BannerResult;
use crate::settings::{RenderSettings, slugify};

/// MIME type of every generated animation.
pub const GIF_MIME: &str = "image/gif";

/// A finished animation plus what it was made from.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnimationResult {
    /// Encoded GIF stream.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// Sanitized banner text.
    pub text: String,
    /// Snapshot of the request.
    pub settings: RenderSettings,
    pub byte_size: usize,
    pub frame_count: usize,
    pub created_at: DateTime<Utc>,
}

/// What a download needs: the payload as a data URI, a file name and a MIME type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Download {
    pub data_uri: String,
    pub filename: String,
    pub mime_type: &'static str,
}

impl AnimationResult {
    pub(crate) fn new(
        bytes: Vec<u8>,
        text: String,
        settings: RenderSettings,
        frame_count: usize,
    ) -> Self {
        Self {
            byte_size: bytes.len(),
            bytes,
            text,
            settings,
            frame_count,
            created_at: Utc::now(),
        }
    }

    /// `data:image/gif;base64,...` form of the stream, ready for an `<img src>`.
    pub fn data_uri(&self) -> String {
        format!("data:{GIF_MIME};base64,{}", STANDARD.encode(&self.bytes))
    }

    /// `banner-<slug>.gif`.
    pub fn download_filename(&self) -> String {
        format!("banner-{}.gif", slugify(&self.text))
    }

    pub fn download(&self) -> Download {
        Download {
            data_uri: self.data_uri(),
            filename: self.download_filename(),
            mime_type: GIF_MIME,
        }
    }

    /// Size rendered the way the preview shows it, e.g. `12.5 KB`.
    pub fn human_size(&self) -> String {
        human_size(self.byte_size as u64)
    }

    /// Write the stream to `path`, creating parent directories.
    pub fn write_to(&self, path: impl AsRef<Path>) -> BannerResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory '{}'", parent.display())
            })?;
        }
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        Ok(())
    }
}

/// Format a byte count with binary units and at most two decimals (`0 Bytes`, `1.5 KB`).
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}
