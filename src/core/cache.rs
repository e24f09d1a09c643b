//! # Quote Frame Cache
//!
//! Local cache for fetched quote frames, keyed by a digest of the request
//! (endpoint, symbol, parameters). The cache persists as a single file in
//! either Bincode or JSON encoding; loading sniffs the format. Frames
//! carry their fetch time so reads can demand freshness.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::types::{CacheEncoding, Payload};
use crate::utils::error::{Error, Result};

/// Identity of a cached frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameKey {
    pub endpoint: String,
    pub symbol: String,
    pub params: String,
}

impl FrameKey {
    pub fn new(endpoint: &str, symbol: &str, params: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            symbol: symbol.to_string(),
            params: params.to_string(),
        }
    }

    /// Stable hex digest used as the map key.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.endpoint.as_bytes());
        hasher.update(b"\x1f");
        hasher.update(self.symbol.as_bytes());
        hasher.update(b"\x1f");
        hasher.update(self.params.as_bytes());

        hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}

/// A fetched frame with its fetch timestamp (unix seconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedFrame {
    pub key: FrameKey,
    pub fetched_at: i64,
    pub payload: Payload,
}

/// On-disk cache structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteCache {
    pub version: u32,
    pub written: i64,
    pub frames: HashMap<String, CachedFrame>,
}

pub const CACHE_VERSION: u32 = 1;

impl QuoteCache {
    pub fn empty() -> Self {
        Self {
            version: CACHE_VERSION,
            written: Utc::now().timestamp(),
            frames: HashMap::new(),
        }
    }

    /// Look up a frame younger than `ttl` seconds; a zero ttl never hits.
    pub fn fresh(&self, key: &FrameKey, ttl: u64) -> Option<&CachedFrame> {
        let frame = self.frames.get(&key.digest())?;
        let age = Utc::now().timestamp().saturating_sub(frame.fetched_at);

        if age >= 0 && (age as u64) < ttl {
            Some(frame)
        } else {
            None
        }
    }

    pub fn insert(&mut self, key: FrameKey, payload: Payload) {
        let digest = key.digest();
        self.frames.insert(
            digest,
            CachedFrame {
                key,
                fetched_at: Utc::now().timestamp(),
                payload,
            },
        );
        self.written = Utc::now().timestamp();
    }
}

/// Store a `QuoteCache` to `path` using the given encoding.
pub fn store_cache(cache: &QuoteCache, path: &Path, encoding: CacheEncoding) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);

    match encoding {
        CacheEncoding::Bincode => {
            bincode::serde::encode_into_std_write(cache, &mut writer, bincode::config::standard())
                .map_err(|e| Error::new(&format!("Failed to serialize cache: {}", e)))?;
        }
        CacheEncoding::Json => {
            serde_json::to_writer_pretty(&mut writer, cache)
                .map_err(|e| Error::new(&format!("Failed to serialize cache to JSON: {}", e)))?;
        }
    }

    writer.flush()?;

    Ok(())
}

/// Load a `QuoteCache` from `path`, sniffing the encoding.
///
/// A leading `{` suggests JSON; otherwise Bincode is attempted first with
/// a JSON fallback.
pub fn load_cache(path: &Path) -> Result<QuoteCache> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| Error::new(&format!("Failed to open cache file: {}", e)))?;

    let mut first_byte = [0u8; 1];
    let read_result = file.read_exact(&mut first_byte);
    drop(file);

    if read_result.is_ok() && first_byte[0] == b'{' {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::new(&format!("Failed to open cache file: {}", e)))?;
        let reader = std::io::BufReader::new(file);

        return serde_json::from_reader(reader)
            .map_err(|e| Error::new(&format!("Failed to deserialize JSON cache: {}", e)));
    }

    let file = std::fs::File::open(path)
        .map_err(|e| Error::new(&format!("Failed to open cache file: {}", e)))?;
    let mut reader = std::io::BufReader::new(file);

    match bincode::serde::decode_from_std_read(&mut reader, bincode::config::standard()) {
        Ok(cache) => Ok(cache),
        Err(_) => {
            let file = std::fs::File::open(path)
                .map_err(|e| Error::new(&format!("Failed to open cache file: {}", e)))?;
            let reader = std::io::BufReader::new(file);

            serde_json::from_reader(reader).map_err(|e| {
                Error::new(&format!(
                    "Failed to deserialize cache in any supported format: {}",
                    e
                ))
            })
        }
    }
}

/// Serve `key` from the cache at `cache_file` when fresh, otherwise invoke
/// `fetch`, store the result and return it.
pub fn sync_frame<F>(
    cache_file: &Path,
    key: FrameKey,
    ttl: u64,
    encoding: CacheEncoding,
    fetch: F,
) -> Result<Payload>
where
    F: FnOnce() -> Result<Payload>,
{
    let mut cache = if cache_file.exists() {
        load_cache(cache_file)?
    } else {
        QuoteCache::empty()
    };

    if cache.version != CACHE_VERSION {
        log::debug!("cache version mismatch, discarding");
        cache = QuoteCache::empty();
    }

    if let Some(frame) = cache.fresh(&key, ttl) {
        log::debug!("cache hit for {}/{}", key.endpoint, key.symbol);
        return Ok(frame.payload.clone());
    }

    let payload = fetch()?;

    cache.insert(key, payload.clone());
    store_cache(&cache, cache_file, encoding)?;

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{MinuteBar, Payload};

    fn sample_payload() -> Payload {
        Payload::Minutes(vec![MinuteBar {
            time: "09:31".into(),
            price: 10.5,
            avg_price: 10.4,
            vol: 300,
        }])
    }

    #[test]
    fn test_store_load_round_trip_bincode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.cache");

        let mut cache = QuoteCache::empty();
        cache.insert(FrameKey::new("quotes", "600036", ""), sample_payload());

        store_cache(&cache, &path, CacheEncoding::Bincode).unwrap();
        let loaded = load_cache(&path).unwrap();

        assert_eq!(loaded.version, CACHE_VERSION);
        assert_eq!(loaded.frames.len(), 1);
    }

    #[test]
    fn test_store_load_round_trip_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.json");

        let mut cache = QuoteCache::empty();
        cache.insert(FrameKey::new("bars", "000001", "day"), sample_payload());

        store_cache(&cache, &path, CacheEncoding::Json).unwrap();
        let loaded = load_cache(&path).unwrap();

        let key = FrameKey::new("bars", "000001", "day");
        assert!(loaded.frames.contains_key(&key.digest()));
    }

    #[test]
    fn test_fresh_respects_ttl() {
        let mut cache = QuoteCache::empty();
        let key = FrameKey::new("quotes", "600036", "");
        cache.insert(key.clone(), sample_payload());

        assert!(cache.fresh(&key, 60).is_some());

        // Backdate the frame past any reasonable ttl.
        let digest = key.digest();
        cache.frames.get_mut(&digest).unwrap().fetched_at -= 3600;
        assert!(cache.fresh(&key, 60).is_none());
    }

    #[test]
    fn test_sync_frame_hits_do_not_refetch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.cache");
        let key = FrameKey::new("quotes", "600036", "");

        let first = sync_frame(&path, key.clone(), 600, CacheEncoding::Bincode, || {
            Ok(sample_payload())
        })
        .unwrap();
        assert_eq!(first.len(), 1);

        // A fresh hit must not invoke the fetch closure.
        let second = sync_frame(&path, key, 600, CacheEncoding::Bincode, || {
            panic!("fetch invoked despite fresh cache")
        })
        .unwrap();
        assert_eq!(second, first);
    }

    #[test]
    fn test_sync_frame_refetches_when_stale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.cache");
        let key = FrameKey::new("quotes", "600036", "");

        sync_frame(&path, key.clone(), 600, CacheEncoding::Bincode, || {
            Ok(sample_payload())
        })
        .unwrap();

        // ttl 0 forces a refetch.
        let mut fetched = false;
        sync_frame(&path, key, 0, CacheEncoding::Bincode, || {
            fetched = true;
            Ok(sample_payload())
        })
        .unwrap();
        assert!(fetched);
    }

    #[test]
    fn test_digest_is_stable_and_distinct() {
        let a = FrameKey::new("quotes", "600036", "");
        let b = FrameKey::new("quotes", "600036", "");
        let c = FrameKey::new("quotes", "600037", "");

        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), c.digest());
        assert_eq!(a.digest().len(), 64);
    }
}
