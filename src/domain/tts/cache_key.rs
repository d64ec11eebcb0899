use sha2::{Digest, Sha256};
use std::fmt;

/// Number of digest bytes kept in a key (128 bits).
const KEY_BYTES: usize = 16;

/// Fingerprint of a synthesis request, used as the cache file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for `(text, language, speed, domain variant)`.
    ///
    /// Each field is length-prefixed before hashing so that no pair of
    /// distinct requests shares a canonical encoding.
    pub fn derive(
        text: &str,
        language_code: &str,
        speed: f32,
        domain_variant: Option<&str>,
    ) -> Self {
        let speed = speed.to_string();
        let mut hasher = Sha256::new();
        for field in [text, language_code, speed.as_str(), domain_variant.unwrap_or("")] {
            hasher.update((field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
        let digest = hasher.finalize();

        let hex = digest[..KEY_BYTES]
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect();
        Self(hex)
    }

    /// Rebuild a key from a cache file stem, if it looks like one.
    pub fn from_hex(stem: &str) -> Option<Self> {
        let valid = stem.len() == KEY_BYTES * 2
            && stem.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase());
        valid.then(|| Self(stem.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the cached artifact for this key.
    pub fn file_name(&self) -> String {
        format!("{}.mp3", self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
