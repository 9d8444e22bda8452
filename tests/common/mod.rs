//! Shared test doubles

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use scanty::errors::{Result, ScantyError};
use scanty::services::IdSource;
use scanty::storage::{BackendStat, Capabilities, Item, LinkBackend};

/// In-memory backend that counts every call
#[derive(Default)]
pub struct CountingBackend {
    pub items: Mutex<HashMap<u64, Item>>,
    pub creates: AtomicU64,
    pub loads: AtomicU64,
    pub finds: AtomicU64,
    pub closes: AtomicU64,
    pub sweeps: AtomicU64,
    pub supports_find: bool,
    pub supports_clean: bool,
    /// 每次清理持续的时间
    pub sweep_delay: Option<Duration>,
    pub in_sweep: AtomicBool,
    /// close 被调用时是否仍有清理在进行
    pub closed_during_sweep: AtomicBool,
    /// create 遇到该错误时直接返回
    pub fail_create: Option<ScantyError>,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_find() -> Self {
        Self {
            supports_find: true,
            ..Self::default()
        }
    }

    pub fn with_clean() -> Self {
        Self {
            supports_clean: true,
            ..Self::default()
        }
    }

    pub fn with_slow_clean(delay: Duration) -> Self {
        Self {
            supports_clean: true,
            sweep_delay: Some(delay),
            ..Self::default()
        }
    }

    /// 预先占用一个 id
    pub fn occupy(&self, id: u64, url: &str) {
        self.items.lock().insert(id, Item::new(id, url, None));
    }

    pub fn count(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LinkBackend for CountingBackend {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            find: self.supports_find,
            clean_expired: self.supports_clean,
        }
    }

    async fn create(&self, item: &Item) -> Result<()> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.fail_create {
            return Err(err.clone());
        }

        let mut items = self.items.lock();
        match items.get(&item.id) {
            Some(existing) if !existing.is_expired() => {
                Err(ScantyError::item_duplicated(item.id.to_string()))
            }
            _ => {
                items.insert(item.id, item.clone());
                Ok(())
            }
        }
    }

    async fn load(&self, id: u64) -> Result<String> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let mut items = self.items.lock();
        match items.get_mut(&id) {
            Some(item) if !item.is_expired() => {
                item.visits += 1;
                Ok(item.url.clone())
            }
            _ => Err(ScantyError::no_link(id.to_string())),
        }
    }

    async fn load_info(&self, id: u64) -> Result<Item> {
        match self.items.lock().get(&id) {
            Some(item) if !item.is_expired() => Ok(item.clone()),
            _ => Err(ScantyError::no_link(id.to_string())),
        }
    }

    async fn find(&self, url: &str) -> Result<Option<u64>> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .items
            .lock()
            .values()
            .find(|item| item.url == url && !item.is_expired())
            .map(|item| item.id))
    }

    async fn stat(&self) -> Result<BackendStat> {
        Ok(BackendStat {
            backend: "counting".to_string(),
            reachable: true,
            active_items: Some(self.items.lock().len() as u64),
            details: serde_json::Value::Null,
        })
    }

    async fn close(&self) -> Result<()> {
        if self.in_sweep.load(Ordering::SeqCst) {
            self.closed_during_sweep.store(true, Ordering::SeqCst);
        }
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clean_expired(&self) -> Result<u64> {
        self.sweeps.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.sweep_delay {
            self.in_sweep.store(true, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            self.in_sweep.store(false, Ordering::SeqCst);
        }

        let mut items = self.items.lock();
        let before = items.len();
        items.retain(|_, item| !item.is_expired());
        Ok((before - items.len()) as u64)
    }
}

/// Hands out a fixed sequence of ids, then repeats the last one
pub struct SequenceIdSource {
    ids: Mutex<VecDeque<u64>>,
    last: Mutex<u64>,
}

impl SequenceIdSource {
    pub fn new(ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            ids: Mutex::new(ids.into_iter().collect()),
            last: Mutex::new(0),
        }
    }
}

impl IdSource for SequenceIdSource {
    fn next_id(&self) -> u64 {
        let mut last = self.last.lock();
        if let Some(id) = self.ids.lock().pop_front() {
            *last = id;
        }
        *last
    }
}
