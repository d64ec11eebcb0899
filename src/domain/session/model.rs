use crate::domain::tts::model::{text_preview, GeneratedAudio};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Most recent generations kept in the history.
pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub text_preview: String,
    pub language: String,
    pub speed: f32,
    pub size_bytes: usize,
    pub from_cache: bool,
}

/// Per-process front-end state: counters and a bounded generation history.
#[derive(Debug, Clone)]
pub struct SessionState {
    id: Uuid,
    started_at: DateTime<Utc>,
    generations: u64,
    cache_hits: u64,
    characters: u64,
    audio_bytes: u64,
    history: VecDeque<HistoryEntry>,
}

/// Serializable view returned by GET /api/session
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub generations: u64,
    pub cache_hits: u64,
    pub characters: u64,
    pub audio_bytes: u64,
    /// Newest first
    pub history: Vec<HistoryEntry>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            generations: 0,
            cache_hits: 0,
            characters: 0,
            audio_bytes: 0,
            history: VecDeque::with_capacity(HISTORY_LIMIT),
        }
    }

    /// Start over with a fresh session id.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Record a successful generation at the speed it was produced with.
    pub fn record(&mut self, text: &str, audio: &GeneratedAudio) {
        self.generations += 1;
        self.characters += text.chars().count() as u64;
        self.audio_bytes += audio.size_bytes() as u64;
        if audio.from_cache {
            self.cache_hits += 1;
        }

        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_back();
        }
        self.history.push_front(HistoryEntry {
            timestamp: Utc::now(),
            text_preview: text_preview(text),
            language: audio.language_code.clone(),
            speed: audio.speed,
            size_bytes: audio.size_bytes(),
            from_cache: audio.from_cache,
        });
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn generations(&self) -> u64 {
        self.generations
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            started_at: self.started_at,
            generations: self.generations,
            cache_hits: self.cache_hits,
            characters: self.characters,
            audio_bytes: self.audio_bytes,
            history: self.history.iter().cloned().collect(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
