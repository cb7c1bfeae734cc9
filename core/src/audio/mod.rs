// Speech rendering: markup cleanup, synthesis backends, and artifact writing

mod markup;
mod renderer;
mod tts;

pub use markup::clean_text_for_speech;
pub use renderer::SpeechRenderer;
pub use tts::{AudioStream, ElevenLabsBackend, SpeechBackend};
