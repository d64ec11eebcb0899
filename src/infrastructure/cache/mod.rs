//! Content-addressed MP3 cache on local disk.
//!
//! One flat directory holding `<key>.mp3` files; the presence of a file is the
//! index. An in-memory LRU index sized by file length keeps the directory
//! under the configured bound and deletes evicted files.

use crate::domain::tts::CacheKey;
use moka::future::Cache;
use moka::notification::RemovalCause;
use moka::policy::EvictionPolicy;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

const TEMP_SUFFIX: &str = ".tmp";

/// Result of looking a key up in the cache.
#[derive(Debug, PartialEq)]
pub enum CacheLookup {
    Hit(Vec<u8>),
    Miss,
    ReadError(String),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CacheStats {
    pub entries: u64,
    pub size_bytes: u64,
    /// `None` when the cache is unbounded
    pub max_size_bytes: Option<u64>,
}

pub struct DiskAudioCache {
    dir: PathBuf,
    index: Cache<CacheKey, u64>,
    max_size_bytes: Option<u64>,
}

impl DiskAudioCache {
    /// Open (creating if needed) the cache directory and index the files
    /// already in it, oldest first.
    pub async fn open(dir: impl Into<PathBuf>, max_size_bytes: Option<u64>) -> io::Result<Self> {
        let dir = dir.into();
        let eviction_dir = dir.clone();

        let mut builder = Cache::builder()
            .eviction_policy(EvictionPolicy::lru())
            .weigher(|_key: &CacheKey, size: &u64| -> u32 {
                u32::try_from(*size).unwrap_or(u32::MAX)
            })
            .eviction_listener(move |key: Arc<CacheKey>, size: u64, cause: RemovalCause| {
                if matches!(cause, RemovalCause::Size) {
                    remove_evicted_file(&eviction_dir, &key, size);
                }
            });
        if let Some(max_size_bytes) = max_size_bytes {
            builder = builder.max_capacity(max_size_bytes);
        }

        let cache = Self {
            dir,
            index: builder.build(),
            max_size_bytes,
        };
        cache.ensure_directory().await?;
        cache.load_existing_entries().await?;
        Ok(cache)
    }

    /// Idempotently create the cache directory.
    pub async fn ensure_directory(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    pub async fn lookup(&self, key: &CacheKey) -> CacheLookup {
        let path = self.path_for(key);

        match tokio::fs::read(&path).await {
            Ok(audio) if audio.is_empty() => {
                CacheLookup::ReadError(format!("{} is empty", path.display()))
            }
            Ok(audio) => {
                // Refreshes recency; files written out-of-band get adopted
                if self.index.get(key).await.is_none() {
                    self.index.insert(key.clone(), audio.len() as u64).await;
                }
                CacheLookup::Hit(audio)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.index.invalidate(key).await;
                CacheLookup::Miss
            }
            Err(e) => CacheLookup::ReadError(format!("{}: {}", path.display(), e)),
        }
    }

    /// Write `audio` under `key`.
    ///
    /// The bytes go to a unique temporary file that is renamed into place, so a
    /// lookup never sees a partially written artifact.
    pub async fn store(&self, key: &CacheKey, audio: &[u8]) -> io::Result<()> {
        self.ensure_directory().await?;

        let path = self.path_for(key);
        let temp_path = self
            .dir
            .join(format!("{}.{}{}", key.file_name(), Uuid::new_v4(), TEMP_SUFFIX));

        if let Err(e) = write_then_rename(&temp_path, &path, audio).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e);
        }

        self.index.insert(key.clone(), audio.len() as u64).await;
        self.index.run_pending_tasks().await;

        tracing::debug!(key = %key, size_bytes = audio.len(), "Audio stored in cache");
        Ok(())
    }

    pub async fn stats(&self) -> CacheStats {
        self.index.run_pending_tasks().await;
        CacheStats {
            entries: self.index.entry_count(),
            size_bytes: self.index.weighted_size(),
            max_size_bytes: self.max_size_bytes,
        }
    }

    /// Whether the cache directory exists and is a directory.
    pub async fn is_available(&self) -> bool {
        tokio::fs::metadata(&self.dir)
            .await
            .map(|metadata| metadata.is_dir())
            .unwrap_or(false)
    }

    async fn load_existing_entries(&self) -> io::Result<()> {
        let mut found: Vec<(SystemTime, CacheKey, u64)> = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();

            if name.ends_with(TEMP_SUFFIX) {
                // Left behind by an interrupted write
                let _ = tokio::fs::remove_file(entry.path()).await;
                continue;
            }

            let Some(key) = name.strip_suffix(".mp3").and_then(CacheKey::from_hex) else {
                continue;
            };
            let metadata = entry.metadata().await?;
            if !metadata.is_file() || metadata.len() == 0 {
                continue;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            found.push((modified, key, metadata.len()));
        }

        found.sort_by_key(|(modified, _, _)| *modified);
        for (_, key, size) in &found {
            self.index.insert(key.clone(), *size).await;
        }
        self.index.run_pending_tasks().await;

        tracing::info!(
            dir = %self.dir.display(),
            entries = found.len(),
            max_size_bytes = ?self.max_size_bytes,
            "Audio cache opened"
        );
        Ok(())
    }
}

async fn write_then_rename(temp_path: &Path, path: &Path, audio: &[u8]) -> io::Result<()> {
    let mut file = tokio::fs::File::create(temp_path).await?;
    file.write_all(audio).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(temp_path, path).await
}

fn remove_evicted_file(dir: &Path, key: &CacheKey, size: u64) {
    let path = dir.join(key.file_name());
    match std::fs::remove_file(&path) {
        Ok(()) => tracing::info!(key = %key, size_bytes = size, "Evicted cached audio"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            key = %key,
            error = %e,
            "Failed to delete evicted cache file"
        ),
    }
}
