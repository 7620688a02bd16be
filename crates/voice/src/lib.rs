//! Text-to-speech backends for vocalis capabilities.
//!
//! Providers sit behind [`TtsProvider`]; the speech capability only sees the
//! trait and the model tier it was built with.

pub mod tts;

pub use tts::{AudioFormat, AudioOutput, ModelTier, OpenAiTts, SynthesizeRequest, TtsProvider, Voice};
