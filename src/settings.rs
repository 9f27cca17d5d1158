//! Caller-facing render settings and their validation.
//!
//! [`RenderSettings`] is what a caller hands in (JSON-friendly, camelCase). Nothing is drawn from
//! it directly: [`RenderSettings::validate`] turns it into [`ValidatedSettings`] first, so a bad
//! request is rejected before any surface is touched.

use std::fmt;

use crate::effects::{BackgroundMode, Effect, FrameOptions};
use crate::foundation::core::Rgba8;
use crate::foundation::error::{BannerError, BannerResult};

/// Longest accepted banner text, in characters, after sanitizing.
pub const MAX_TEXT_CHARS: usize = 50;
/// Shortest frame delay in milliseconds.
pub const MIN_DELAY_MS: u32 = 50;
/// Longest frame delay in milliseconds.
pub const MAX_DELAY_MS: u32 = 1000;
/// Frame delay used when the caller does not pick one.
pub const DEFAULT_DELAY_MS: u32 = 100;

pub(crate) const EMPTY_TEXT_MESSAGE: &str = "Please enter text for your banner";

/// Which fonts the animation cycles through.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FontSelection {
    /// One frame per family of the configured rotation, in rotation order.
    #[default]
    Rotation,
    /// A single frame in one named family.
    Named(String),
}

impl FontSelection {
    /// Families to render, in frame order.
    pub fn families<'a>(&'a self, rotation: &'a [String]) -> Vec<&'a str> {
        match self {
            Self::Rotation => rotation.iter().map(String::as_str).collect(),
            Self::Named(family) => vec![family.as_str()],
        }
    }

    /// Number of frames this selection produces.
    pub fn frame_count(&self, rotation: &[String]) -> usize {
        match self {
            Self::Rotation => rotation.len(),
            Self::Named(_) => 1,
        }
    }
}

impl From<String> for FontSelection {
    fn from(value: String) -> Self {
        match value.trim() {
            "" | "random" | "rotation" => Self::Rotation,
            family => Self::Named(family.to_string()),
        }
    }
}

impl From<&str> for FontSelection {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<FontSelection> for String {
    fn from(value: FontSelection) -> Self {
        match value {
            FontSelection::Rotation => "random".to_string(),
            FontSelection::Named(family) => family,
        }
    }
}

impl fmt::Display for FontSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rotation => f.write_str("rotation"),
            Self::Named(family) => f.write_str(family),
        }
    }
}

/// One generation request as a caller describes it.
///
/// Field aliases accept the names older front-ends used (`speed`, `bgColor`, `backgroundType`,
/// `visualEffect`).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderSettings {
    pub text: String,
    pub font: FontSelection,
    #[serde(alias = "speed")]
    pub delay_ms: u32,
    pub text_color: String,
    #[serde(alias = "bgColor")]
    pub background_color: String,
    #[serde(alias = "backgroundType")]
    pub background_mode: BackgroundMode,
    #[serde(alias = "visualEffect")]
    pub effect: Effect,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            text: String::new(),
            font: FontSelection::Rotation,
            delay_ms: DEFAULT_DELAY_MS,
            text_color: "#ffffff".to_string(),
            background_color: "#000000".to_string(),
            background_mode: BackgroundMode::Solid,
            effect: Effect::None,
        }
    }
}

impl RenderSettings {
    /// Default settings for `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_font(mut self, font: impl Into<FontSelection>) -> Self {
        self.font = font.into();
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }

    pub fn with_colors(mut self, text: impl Into<String>, background: impl Into<String>) -> Self {
        self.text_color = text.into();
        self.background_color = background.into();
        self
    }

    pub fn with_background_mode(mut self, mode: BackgroundMode) -> Self {
        self.background_mode = mode;
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Parse settings from a JSON document.
    pub fn from_json_str(s: &str) -> BannerResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| BannerError::serde(format!("settings JSON parse failed: {e}")))
    }

    /// Check every field and produce the values rendering works from.
    ///
    /// Text is checked first, then colors; the first problem found is returned.
    pub fn validate(&self) -> BannerResult<ValidatedSettings> {
        let text = sanitize_text(&self.text)?;
        let text_color = parse_color("text color", &self.text_color)?;
        let background_color = parse_color("background color", &self.background_color)?;
        if let FontSelection::Named(family) = &self.font
            && family.trim().is_empty()
        {
            return Err(BannerError::validation("font family must not be empty"));
        }

        Ok(ValidatedSettings {
            text,
            font: self.font.clone(),
            delay_ms: clamp_delay(self.delay_ms),
            frame: FrameOptions {
                text_color,
                background_color,
                background_mode: self.background_mode,
                effect: self.effect,
            },
        })
    }
}

fn parse_color(field: &str, value: &str) -> BannerResult<Rgba8> {
    Rgba8::from_hex(value).map_err(|_| {
        BannerError::validation(format!("invalid {field} '{value}': expected #RRGGBB"))
    })
}

/// Settings that passed validation.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedSettings {
    /// Sanitized banner text.
    pub text: String,
    pub font: FontSelection,
    /// Delay clamped to `MIN_DELAY_MS..=MAX_DELAY_MS`.
    pub delay_ms: u32,
    pub frame: FrameOptions,
}

/// Clamp a frame delay into the accepted range.
pub fn clamp_delay(delay_ms: u32) -> u32 {
    delay_ms.clamp(MIN_DELAY_MS, MAX_DELAY_MS)
}

/// Trim `text`, drop `<` and `>`, and check the result is 1 to 50 characters long.
pub fn sanitize_text(text: &str) -> BannerResult<String> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, '<' | '>'))
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return Err(BannerError::validation(EMPTY_TEXT_MESSAGE));
    }
    if cleaned.chars().count() > MAX_TEXT_CHARS {
        return Err(BannerError::validation(format!(
            "Text must be {MAX_TEXT_CHARS} characters or less"
        )));
    }
    Ok(cleaned.to_string())
}

/// Lowercase `text` and replace every character outside `[a-z0-9]` with `_`.
pub fn slugify(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../tests/unit/settings.rs"]
mod tests;
