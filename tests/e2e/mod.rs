// End-to-end tests for the Voicify HTTP API
//
// Each test gets its own server on an ephemeral port, backed by an in-process
// mock TTS provider, the real speed adjuster and a disk cache in a temporary
// directory. Tests share nothing and run in parallel.

mod helpers;
mod test_health;
mod test_session;
mod test_tts;
