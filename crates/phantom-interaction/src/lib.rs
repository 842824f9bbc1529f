//! Provider implementations for Phantom Chat.
//!
//! Currently a single provider: the Gemini REST API.

pub mod gemini;

pub use gemini::GeminiProvider;
