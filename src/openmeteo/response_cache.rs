//! On-disk cache of raw provider responses, keyed by request URL.

use crate::openmeteo::error::FetchError;
use log::{debug, info, warn};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;
use tokio::{fs, task};

/// How long a cached response stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Archive data does not change once published.
    Forever,
    /// Forecasts go stale; entries older than the TTL are refetched.
    Ttl(Duration),
}

impl CachePolicy {
    fn is_fresh(&self, age: Duration) -> bool {
        match self {
            CachePolicy::Forever => true,
            CachePolicy::Ttl(ttl) => age < *ttl,
        }
    }
}

pub struct ResponseCache {
    cache_dir: PathBuf,
}

impl ResponseCache {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
        }
    }

    pub fn entry_path(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        self.cache_dir.join(format!("openmeteo-{:x}.json", digest))
    }

    /// Returns the cached body for `url` if present and fresh under `policy`.
    pub async fn get(&self, url: &str, policy: CachePolicy) -> Result<Option<String>, FetchError> {
        let path = self.entry_path(url);
        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Cache miss for {}", url);
                return Ok(None);
            }
            Err(e) => return Err(FetchError::CacheMetadataRead(path, e)),
        };

        let modified = metadata
            .modified()
            .map_err(|e| FetchError::CacheMetadataRead(path.clone(), e))?;
        // A modification time in the future counts as brand new.
        let age = match SystemTime::now().duration_since(modified) {
            Ok(age) => age,
            Err(_) => Duration::ZERO,
        };
        if !policy.is_fresh(age) {
            info!(
                "Cache entry {:?} expired ({}s old), refetching",
                path,
                age.as_secs()
            );
            return Ok(None);
        }

        let body = fs::read_to_string(&path)
            .await
            .map_err(|e| FetchError::CacheRead(path.clone(), e))?;
        info!("Cache hit for {} at {:?}", url, path);
        Ok(Some(body))
    }

    /// Stores `body` for `url`. The write goes through a temporary file in the
    /// cache directory so a crash never leaves a truncated entry behind.
    pub async fn put(&self, url: &str, body: &str) -> Result<(), FetchError> {
        fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| FetchError::CacheDirCreation(self.cache_dir.clone(), e))?;

        let path = self.entry_path(url);
        let dir = self.cache_dir.clone();
        let bytes = body.as_bytes().to_vec();
        task::spawn_blocking(move || {
            let mut temp_file = NamedTempFile::new_in(&dir)
                .map_err(|e| FetchError::CacheWrite(path.clone(), e))?;
            temp_file
                .write_all(&bytes)
                .map_err(|e| FetchError::CacheWrite(path.clone(), e))?;
            temp_file
                .persist(&path)
                .map_err(|e| FetchError::CacheWrite(path.clone(), e.error))?;
            debug!("Cached {} bytes to {:?}", bytes.len(), path);
            Ok::<(), FetchError>(())
        })
        .await??;
        Ok(())
    }
}
