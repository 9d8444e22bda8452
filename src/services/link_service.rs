//! Link service
//!
//! Save / read orchestration shared by the CLI and any outer transport.
//! Callers work with short codes; ids never leave this layer.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::cache::{CacheFactory, CacheStats, ReadCache};
use crate::config::{StaticConfig, StorageConfig};
use crate::errors::{Result, ScantyError};
use crate::services::{IdSource, RandomIdSource};
use crate::storage::{
    BackendStat, Capabilities, CleanerHandle, ExpiryCleaner, Item, LinkBackend, StorageFactory,
};
use crate::utils::base62;

/// Save behaviour knobs
#[derive(Debug, Clone, Copy)]
pub struct ServiceOptions {
    /// Reuse the code of an identical live URL when the backend can look it up
    pub find_existing: bool,
    /// Upper bound on create attempts per save
    pub max_attempts: u32,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self::from(&StorageConfig::default())
    }
}

impl From<&StorageConfig> for ServiceOptions {
    fn from(config: &StorageConfig) -> Self {
        Self {
            find_existing: config.find_existing,
            max_attempts: config.max_attempts,
        }
    }
}

/// Diagnostics snapshot
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStat {
    pub backend: BackendStat,
    pub capabilities: Capabilities,
    pub cache_type: &'static str,
    pub cache: CacheStats,
    pub cache_hit_rate: f64,
    pub collisions: u64,
    pub cleaner_running: bool,
}

pub struct LinkService {
    backend: Arc<dyn LinkBackend>,
    cache: Arc<dyn ReadCache>,
    ids: Arc<dyn IdSource>,
    options: ServiceOptions,
    collisions: AtomicU64,
    shutdown: CancellationToken,
    cleaner: Mutex<Option<CleanerHandle>>,
}

impl LinkService {
    pub fn new(
        backend: Arc<dyn LinkBackend>,
        cache: Arc<dyn ReadCache>,
        options: ServiceOptions,
    ) -> Self {
        Self {
            backend,
            cache,
            ids: Arc::new(RandomIdSource),
            options,
            collisions: AtomicU64::new(0),
            shutdown: CancellationToken::new(),
            cleaner: Mutex::new(None),
        }
    }

    /// Replace the id generator
    pub fn with_id_source(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    /// Build backend, cache and cleaner from configuration.
    ///
    /// Fails if the backend cannot be reached.
    pub async fn from_config(config: &StaticConfig) -> Result<Self> {
        let backend = StorageFactory::create(&config.storage).await?;
        let cache = CacheFactory::create(&config.cache);
        let service = Self::new(backend, cache, ServiceOptions::from(&config.storage));

        if config.cleaner.enabled {
            service.start_cleaner(Duration::from_secs(config.cleaner.interval_secs));
        }
        Ok(service)
    }

    /// Start the expiry cleaner if the backend supports batch expiry.
    ///
    /// Returns whether a cleaner is running afterwards. Must be called
    /// inside a tokio runtime.
    pub fn start_cleaner(&self, interval: Duration) -> bool {
        if !self.backend.capabilities().clean_expired {
            debug!(
                "{} relies on lazy or native expiry, cleaner not started",
                self.backend.name()
            );
            return false;
        }

        let mut slot = self.cleaner.lock();
        if slot.is_none() {
            *slot = Some(ExpiryCleaner::spawn(
                self.backend.clone(),
                interval,
                self.shutdown.child_token(),
            ));
        }
        true
    }

    pub fn backend(&self) -> &Arc<dyn LinkBackend> {
        &self.backend
    }

    /// Number of id collisions absorbed by `save` so far
    pub fn collisions(&self) -> u64 {
        self.collisions.load(Ordering::Relaxed)
    }

    /// Store `url` and return its short code.
    pub async fn save(&self, url: &str, expires: Option<DateTime<Utc>>) -> Result<String> {
        if self.options.find_existing && self.backend.capabilities().find {
            if let Some(id) = self.backend.find(url).await? {
                debug!("Reusing existing id {} for {}", id, url);
                return Ok(base62::encode(id));
            }
        }

        let max_attempts = self.options.max_attempts.max(1);
        let mut collided = 0u32;

        for _ in 0..max_attempts {
            let item = Item::new(self.ids.next_id(), url, expires);

            match self.backend.create(&item).await {
                Ok(()) => {
                    if collided > 0 {
                        warn!(
                            "Saved id {} after {} collision(s)",
                            item.id, collided
                        );
                    }
                    let code = base62::encode(item.id);
                    info!("Saved link {} -> {}", code, url);
                    return Ok(code);
                }
                Err(e) if e.is_duplicate() => {
                    collided += 1;
                    self.collisions.fetch_add(1, Ordering::Relaxed);
                    debug!("id {} already taken, drawing another", item.id);
                }
                Err(e) => return Err(e),
            }
        }

        warn!("Gave up saving {} after {} collisions", url, collided);
        Err(ScantyError::allocation_exhausted(format!(
            "no free id after {} attempts",
            max_attempts
        )))
    }

    /// Resolve a short code, reading through the cache.
    pub async fn load(&self, code: &str) -> Result<String> {
        let id = base62::decode(code)?;

        if let Some(url) = self.cache.get(id).await {
            trace!("Cache hit for {}", code);
            return Ok(url);
        }

        let url = self.backend.load(id).await?;
        if let Err(e) = self.cache.insert(id, url.clone()).await {
            error!("Failed to populate cache for {}: {}", code, e);
        }
        Ok(url)
    }

    /// Full record for a short code. Bypasses the cache.
    pub async fn load_info(&self, code: &str) -> Result<Item> {
        let id = base62::decode(code)?;
        self.backend.load_info(id).await
    }

    pub async fn stat(&self) -> Result<ServiceStat> {
        let backend = self.backend.stat().await?;
        let cache = self.cache.stats();
        let cleaner_running = self
            .cleaner
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished());

        Ok(ServiceStat {
            backend,
            capabilities: self.backend.capabilities(),
            cache_type: self.cache.name(),
            cache_hit_rate: cache.hit_rate(),
            cache,
            collisions: self.collisions(),
            cleaner_running,
        })
    }

    /// Sweep expired records now. Returns 0 for backends without batch expiry.
    pub async fn clean_expired(&self) -> Result<u64> {
        self.backend.clean_expired().await
    }

    /// Stop the cleaner, wait for its current tick, then close the backend.
    pub async fn close(&self) -> Result<()> {
        self.shutdown.cancel();

        let cleaner = self.cleaner.lock().take();
        if let Some(handle) = cleaner {
            handle.shutdown().await?;
        }

        self.backend.close().await
    }
}
