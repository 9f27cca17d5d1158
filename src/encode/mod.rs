//! Encoding sessions.
//!
//! Sinks consume rendered frames in sequence order; [`gif::GifSink`] turns them into the final
//! animated stream.

/// GIF sink and the one-shot [`gif::assemble`] helper.
pub mod gif;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;
