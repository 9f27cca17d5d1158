use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::encode::gif::{DEFAULT_SPEED, SPEED_RANGE};
use crate::foundation::core::Canvas;
use crate::foundation::error::{BannerError, BannerResult};
use crate::render::fonts::FontSources;
use crate::settings::DEFAULT_DELAY_MS;

/// Environment variable holding extra font directories (platform path-list syntax).
pub const ENV_FONT_DIRS: &str = "GIFBANNER_FONT_DIRS";
/// Environment variable fixing the particle seed.
pub const ENV_SEED: &str = "GIFBANNER_SEED";

/// Built-in font rotation, one frame per family, in animation order.
pub const FONT_ROTATION: [&str; 23] = [
    "Barlow Condensed",
    "Caveat",
    "Chela One",
    "Dancing Script",
    "El Messiri",
    "Gelasio",
    "Gloria Hallelujah",
    "Great Vibes",
    "Indie Flower",
    "Lexend Deca",
    "Lilita One",
    "Lobster",
    "Lugrasimo",
    "Lumanosimo",
    "Pacifico",
    "Pangolin",
    "Playfair Display",
    "Rubik",
    "Shadows Into Light",
    "Space Mono",
    "Tektur",
    "Wix Madefor Text",
    "Yuji Boku",
];

/// Where font faces are loaded from.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FontOptions {
    /// Load the fonts installed on the system.
    pub system_fonts: bool,
    /// Extra directories scanned for `.ttf`, `.otf` and `.ttc` files.
    pub dirs: Vec<PathBuf>,
}

impl Default for FontOptions {
    fn default() -> Self {
        Self {
            system_fonts: true,
            dirs: Vec::new(),
        }
    }
}

/// Generator configuration. Every field has a default, so `{}` is a valid config file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BannerConfig {
    pub canvas: Canvas,
    pub font_size_px: f32,
    pub default_delay_ms: u32,
    /// Number of repeats; `0` loops forever.
    pub loop_count: u16,
    /// GIF palette quantizer speed, 1 (best) to 30 (fastest).
    pub quantizer_speed: i32,
    /// Fixed particle seed. `None` seeds from the clock.
    pub seed: Option<u64>,
    pub font_rotation: Vec<String>,
    pub fonts: FontOptions,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::BANNER,
            font_size_px: 32.0,
            default_delay_ms: DEFAULT_DELAY_MS,
            loop_count: 0,
            quantizer_speed: DEFAULT_SPEED,
            seed: None,
            font_rotation: FONT_ROTATION.iter().map(|s| s.to_string()).collect(),
            fonts: FontOptions::default(),
        }
    }
}

impl BannerConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> BannerResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| BannerError::serde(format!("parse config JSON: {e}")))
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> BannerResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            BannerError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> BannerResult<()> {
        let Canvas { width, height } = self.canvas;
        if width == 0 || height == 0 {
            return Err(BannerError::validation("canvas width/height must be non-zero"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(BannerError::validation(format!(
                "canvas {width}x{height} exceeds {max}x{max}",
                max = u16::MAX
            )));
        }
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(BannerError::validation("font_size_px must be finite and > 0"));
        }
        if self.font_rotation.is_empty() {
            return Err(BannerError::validation("font_rotation must not be empty"));
        }
        if self.font_rotation.iter().any(|f| f.trim().is_empty()) {
            return Err(BannerError::validation(
                "font_rotation entries must not be empty",
            ));
        }
        if !SPEED_RANGE.contains(&self.quantizer_speed) {
            return Err(BannerError::validation(format!(
                "quantizer_speed must be in {}..={}",
                SPEED_RANGE.start(),
                SPEED_RANGE.end()
            )));
        }
        Ok(())
    }

    /// Apply `GIFBANNER_FONT_DIRS` and `GIFBANNER_SEED` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var_os(key))
    }

    /// Apply overrides read through `lookup`.
    ///
    /// Font directories are appended to the configured ones. An unparsable seed is ignored.
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<std::ffi::OsString>,
    ) -> Self {
        if let Some(dirs) = lookup(ENV_FONT_DIRS) {
            self.fonts
                .dirs
                .extend(std::env::split_paths(&dirs).filter(|p| !p.as_os_str().is_empty()));
        }
        if let Some(raw) = lookup(ENV_SEED) {
            match raw.to_str().and_then(|s| s.trim().parse::<u64>().ok()) {
                Some(seed) => self.seed = Some(seed),
                None => tracing::warn!(value = ?raw, "ignoring unparsable {ENV_SEED}"),
            }
        }
        self
    }

    /// Font sources for the typesetter.
    pub fn font_sources(&self) -> FontSources {
        FontSources {
            system_fonts: self.fonts.system_fonts,
            dirs: self.fonts.dirs.clone(),
        }
    }
}
