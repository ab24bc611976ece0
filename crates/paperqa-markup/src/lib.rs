//! Rendering helpers for answer text.
//!
//! [`normalize`] rewrites the bracketed math notations models tend to emit into
//! `$$…$$` display blocks, each on its own line, so a Markdown+KaTeX renderer picks
//! them up. It is pure and idempotent and can be run over partially streamed text.

pub mod math;

pub use math::normalize;
