/// Result alias used across the crate.
pub type BannerResult<T> = Result<T, BannerError>;

/// Error taxonomy for banner generation.
///
/// Every failure surfaces at the single generation boundary; no partial output is returned
/// alongside an error.
#[derive(thiserror::Error, Debug)]
pub enum BannerError {
    /// Input rejected before any rendering started.
    #[error("validation error: {0}")]
    Validation(String),

    /// A generation run is already active on this generator.
    #[error("generation already in progress")]
    GenerationInProgress,

    /// Frames could not be turned into an animated stream.
    #[error("assembly error: {0}")]
    Assembly(String),

    /// Drawing-surface failure. Not recoverable for a given configuration.
    #[error("render error: {0}")]
    Render(String),

    /// No usable font face in the configured sources.
    #[error("font error: {0}")]
    Font(String),

    /// Settings or configuration could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else (I/O from helpers, mostly).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BannerError {
    /// Build a [`BannerError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BannerError::Assembly`].
    pub fn assembly(msg: impl Into<String>) -> Self {
        Self::Assembly(msg.into())
    }

    /// Build a [`BannerError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`BannerError::Font`].
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`BannerError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Message suitable for showing to the person who asked for the banner.
    ///
    /// Validation messages are surfaced verbatim; everything unexpected collapses into a generic
    /// failure line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::GenerationInProgress => {
                "Please wait for current generation to complete".to_string()
            }
            Self::Assembly(_) | Self::Render(_) | Self::Font(_) | Self::Serde(_) | Self::Other(_) => {
                "Failed to generate banner".to_string()
            }
        }
    }

    /// `true` for errors raised before rendering started.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
