pub mod session;
pub mod tts;
