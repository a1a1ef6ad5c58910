//! Two-tier cache for fetched thumbnail/preview bytes.
//!
//! Entries are content-addressed by URL: a small in-memory LRU tier in front
//! of a disk tier whose filenames are the SHA-256 of the URL. Both tiers are
//! bounded; the disk tier additionally enforces a total byte budget. The
//! cache is an optimization, never a correctness requirement: every I/O
//! failure degrades to a miss or a silent no-op, and only the network fetch
//! in [`fetch_image_bytes`] can surface an error.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use parking_lot::Mutex;
use reqwest::Client;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::client::ClientError;

fn env_i64(name: &str, default: i64) -> i64 {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => value.parse().unwrap_or(default),
        _ => default,
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => !matches!(value.as_str(), "0" | "false" | "FALSE"),
        Err(_) => default,
    }
}

/// Cache limits and location. Disk caps of zero or below mean "unlimited"
/// for that dimension; a memory cap of zero disables the memory tier.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    pub cache_dir: PathBuf,
    pub max_mem_items: usize,
    pub max_disk_items: i64,
    pub max_disk_mb: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_dir: std::env::temp_dir().join("anycloud_image_cache"),
            max_mem_items: 64,
            max_disk_items: 256,
            max_disk_mb: 128,
        }
    }
}

impl CacheConfig {
    /// Read overrides from the environment. Unset or unparsable values fall
    /// back to the defaults.
    ///
    /// Recognized variables: `ANYCLOUD_IMAGE_CACHE` (flag),
    /// `ANYCLOUD_IMAGE_CACHE_DIR`, `ANYCLOUD_IMAGE_CACHE_MEM`,
    /// `ANYCLOUD_IMAGE_CACHE_ITEMS`, `ANYCLOUD_IMAGE_CACHE_MB`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_bool("ANYCLOUD_IMAGE_CACHE", defaults.enabled),
            cache_dir: std::env::var_os("ANYCLOUD_IMAGE_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            max_mem_items: env_i64("ANYCLOUD_IMAGE_CACHE_MEM", defaults.max_mem_items as i64)
                .max(0) as usize,
            max_disk_items: env_i64("ANYCLOUD_IMAGE_CACHE_ITEMS", defaults.max_disk_items),
            max_disk_mb: env_i64("ANYCLOUD_IMAGE_CACHE_MB", defaults.max_disk_mb),
        }
    }
}

/// Insertion-ordered memory tier; the back of the vec is most recently used.
#[derive(Default)]
struct MemoryTier {
    entries: Vec<(String, Bytes)>,
}

impl MemoryTier {
    fn get(&mut self, url: &str) -> Option<Bytes> {
        let pos = self.entries.iter().position(|(key, _)| key == url)?;
        let entry = self.entries.remove(pos);
        let data = entry.1.clone();
        self.entries.push(entry);
        Some(data)
    }

    fn insert(&mut self, url: &str, data: Bytes) {
        if let Some(pos) = self.entries.iter().position(|(key, _)| key == url) {
            self.entries.remove(pos);
        }
        self.entries.push((url.to_string(), data));
    }

    fn trim(&mut self, max_items: usize) {
        while self.entries.len() > max_items {
            self.entries.remove(0);
        }
    }

    fn contains(&self, url: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == url)
    }
}

pub struct ImageCache {
    config: CacheConfig,
    // Guards the memory tier AND every disk scan+evict sequence. Never held
    // across network I/O.
    memory: Mutex<MemoryTier>,
}

impl ImageCache {
    pub fn new(config: CacheConfig) -> Self {
        if config.enabled
            && let Err(e) = fs::create_dir_all(&config.cache_dir)
        {
            debug!(dir = %config.cache_dir.display(), error = %e, "Failed to create cache dir");
        }
        Self {
            config,
            memory: Mutex::new(MemoryTier::default()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn path_for(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        self.config.cache_dir.join(format!("{}.bin", hex::encode(digest)))
    }

    /// Look the URL up in memory, then on disk. A disk hit refreshes the
    /// file's mtime and promotes the entry into the memory tier. Misses,
    /// I/O failures, and empty files all return `None`.
    pub fn get(&self, url: &str) -> Option<Bytes> {
        if !self.config.enabled || url.is_empty() {
            return None;
        }

        {
            let mut memory = self.memory.lock();
            if let Some(data) = memory.get(url) {
                return Some(data);
            }
        }

        let path = self.path_for(url);
        let data = fs::read(&path).ok()?;
        if data.is_empty() {
            return None;
        }

        // Keep disk eviction ordering in step with actual use.
        if let Ok(file) = fs::OpenOptions::new().append(true).open(&path) {
            let _ = file.set_modified(SystemTime::now());
        }

        let data = Bytes::from(data);
        let mut memory = self.memory.lock();
        memory.insert(url, data.clone());
        memory.trim(self.config.max_mem_items);
        Some(data)
    }

    /// Store bytes under the URL. The disk write goes through a temp file
    /// and an atomic rename, so a crash never leaves a partial entry visible
    /// under its final name. Write failures are swallowed after a
    /// best-effort temp cleanup.
    pub fn set(&self, url: &str, data: &Bytes) {
        if !self.config.enabled || url.is_empty() || data.is_empty() {
            return;
        }

        let path = self.path_for(url);
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let written = (|| {
            fs::create_dir_all(&self.config.cache_dir)?;
            fs::write(&tmp, data)?;
            fs::rename(&tmp, &path)
        })();
        if let Err(e) = written {
            debug!(url, error = %e, "Cache write failed; dropping entry");
            let _ = fs::remove_file(&tmp);
            return;
        }

        let mut memory = self.memory.lock();
        memory.insert(url, data.clone());
        memory.trim(self.config.max_mem_items);
        self.enforce_disk_limits();
    }

    /// Delete oldest-mtime entries until both the item-count and byte caps
    /// hold. Must be called with the cache lock held.
    fn enforce_disk_limits(&self) {
        let max_items = self.config.max_disk_items;
        let max_bytes = self.config.max_disk_mb.saturating_mul(1024 * 1024);
        if max_items <= 0 && max_bytes <= 0 {
            return;
        }

        let Ok(dir) = fs::read_dir(&self.config.cache_dir) else {
            return;
        };

        let mut entries: Vec<(PathBuf, SystemTime, u64)> = Vec::new();
        for entry in dir.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "bin") {
                continue;
            }
            let Ok(meta) = entry.metadata() else { continue };
            if !meta.is_file() {
                continue;
            }
            let mtime = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            entries.push((path, mtime, meta.len()));
        }

        let mut total: u64 = entries.iter().map(|(_, _, size)| *size).sum();
        let items_over = |count: usize| max_items > 0 && count as i64 > max_items;
        let bytes_over = |total: u64| max_bytes > 0 && total > max_bytes as u64;

        if !items_over(entries.len()) && !bytes_over(total) {
            return;
        }

        entries.sort_by_key(|(_, mtime, _)| *mtime);
        let mut index = 0;
        while index < entries.len()
            && (items_over(entries.len() - index) || bytes_over(total))
        {
            let (path, _, size) = &entries[index];
            if let Err(e) = fs::remove_file(path) {
                debug!(path = %path.display(), error = %e, "Cache eviction failed");
            }
            total = total.saturating_sub(*size);
            index += 1;
        }
    }

    #[cfg(test)]
    fn in_memory(&self, url: &str) -> bool {
        self.memory.lock().contains(url)
    }

    #[cfg(test)]
    fn on_disk(&self, url: &str) -> bool {
        self.path_for(url).is_file()
    }
}

/// Fetch bytes for a URL: cache lookup, then a streaming network fetch on a
/// miss, then a best-effort cache store. Only the network fetch can fail;
/// the caller-supplied timeout is passed straight through to the transport.
pub async fn fetch_image_bytes(
    client: &Client,
    cache: &ImageCache,
    url: &str,
    timeout: Duration,
) -> Result<Bytes, ClientError> {
    if let Some(cached) = cache.get(url) {
        return Ok(cached);
    }

    let response = client.get(url).timeout(timeout).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::http_status(status, url));
    }

    let mut stream = response.bytes_stream();
    let mut buf = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        buf.extend_from_slice(&chunk?);
    }
    let data = buf.freeze();

    if !data.is_empty() {
        cache.set(url, &data);
    }
    Ok(data)
}

/// Convenience wrapper over [`fetch_image_bytes`] with the default timeout.
pub async fn fetch_image_bytes_default(
    client: &Client,
    cache: &ImageCache,
    url: &str,
) -> Result<Bytes, ClientError> {
    fetch_image_bytes(client, cache, url, Duration::from_secs(20)).await
}
