//! Generation orchestration: one in-flight run at a time, one result kept.

/// The generator and its state token.
pub mod generator;
/// Finished animations and their download helpers.
pub mod result;
