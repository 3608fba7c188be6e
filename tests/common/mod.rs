// 集成测试公共模块
//
// 提供测试环境构建、故障注入后端和共享辅助函数

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bson::oid::ObjectId;

use locale_service::cache::{CacheBackend, MemoryCacheBackend, TranslationCacheService};
use locale_service::error::{LocaleError, LocaleResult};
use locale_service::models::Translation;
use locale_service::service::{LocaleService, TranslationService};
use locale_service::settings::{CacheSettings, LocaleSettings, StoreSettings};
use locale_service::store::{
    MemoryLocaleStore, MemoryTranslationStore, TranslationFilter, TranslationStore,
};

/// 模块列表
pub fn modules(names: &[&str]) -> Vec<String> {
    names.iter().map(|m| m.to_string()).collect()
}

/// 测试环境：内存存储 + 内存缓存
pub struct TestEnvironment {
    pub store: Arc<MemoryTranslationStore>,
    pub backend: Arc<MemoryCacheBackend>,
    pub cache: Arc<TranslationCacheService>,
    pub translations: Arc<TranslationService>,
    pub locales: Arc<LocaleService>,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self::with_settings(CacheSettings::default(), StoreSettings::default())
    }

    pub fn with_settings(cache_settings: CacheSettings, store_settings: StoreSettings) -> Self {
        let store = Arc::new(MemoryTranslationStore::new());
        let backend = Arc::new(MemoryCacheBackend::new());
        let cache = Arc::new(TranslationCacheService::new(backend.clone(), cache_settings));
        let translations = Arc::new(TranslationService::new(
            store.clone(),
            cache.clone(),
            store_settings,
        ));
        let locales = Arc::new(LocaleService::new(
            Arc::new(MemoryLocaleStore::new()),
            LocaleSettings::default(),
        ));

        Self {
            store,
            backend,
            cache,
            translations,
            locales,
        }
    }
}

/// 所有操作都失败的缓存后端
#[derive(Debug, Default)]
pub struct FailingCacheBackend {
    pub calls: AtomicUsize,
}

impl FailingCacheBackend {
    fn fail<T>(&self) -> LocaleResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LocaleError::Cache("connection refused".to_string()))
    }
}

#[async_trait]
impl CacheBackend for FailingCacheBackend {
    async fn get(&self, _key: &str) -> LocaleResult<Option<String>> {
        self.fail()
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> LocaleResult<()> {
        self.fail()
    }

    async fn set_many(&self, _entries: &[(String, String)], _ttl: Duration) -> LocaleResult<()> {
        self.fail()
    }

    async fn delete(&self, _key: &str) -> LocaleResult<bool> {
        self.fail()
    }

    async fn delete_many(&self, _keys: &[String]) -> LocaleResult<usize> {
        self.fail()
    }

    async fn scan_pattern(&self, _pattern: &str) -> LocaleResult<Vec<String>> {
        self.fail()
    }
}

/// 记录扫描次数的内存缓存后端
#[derive(Debug, Default)]
pub struct CountingCacheBackend {
    pub inner: MemoryCacheBackend,
    pub scans: AtomicUsize,
}

#[async_trait]
impl CacheBackend for CountingCacheBackend {
    async fn get(&self, key: &str) -> LocaleResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> LocaleResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn set_many(&self, entries: &[(String, String)], ttl: Duration) -> LocaleResult<()> {
        self.inner.set_many(entries, ttl).await
    }

    async fn delete(&self, key: &str) -> LocaleResult<bool> {
        self.inner.delete(key).await
    }

    async fn delete_many(&self, keys: &[String]) -> LocaleResult<usize> {
        self.inner.delete_many(keys).await
    }

    async fn scan_pattern(&self, pattern: &str) -> LocaleResult<Vec<String>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.inner.scan_pattern(pattern).await
    }
}

/// 版本化保存会先失败若干次的存储
#[derive(Debug, Default)]
pub struct FlakyTranslationStore {
    pub inner: MemoryTranslationStore,
    pub save_failures: AtomicUsize,
}

impl FlakyTranslationStore {
    pub fn failing(times: usize) -> Self {
        Self {
            inner: MemoryTranslationStore::new(),
            save_failures: AtomicUsize::new(times),
        }
    }
}

#[async_trait]
impl TranslationStore for FlakyTranslationStore {
    async fn find_by_id(&self, id: &ObjectId) -> LocaleResult<Option<Translation>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_key(&self, key: &str) -> LocaleResult<Option<Translation>> {
        self.inner.find_by_key(key).await
    }

    async fn find(
        &self,
        filter: &TranslationFilter,
        skip: u64,
        limit: Option<i64>,
    ) -> LocaleResult<Vec<Translation>> {
        self.inner.find(filter, skip, limit).await
    }

    async fn insert(&self, translation: Translation) -> LocaleResult<Translation> {
        self.inner.insert(translation).await
    }

    async fn save(&self, translation: &Translation, expected_version: i64) -> LocaleResult<bool> {
        let remaining = self.save_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.save_failures.store(remaining - 1, Ordering::SeqCst);
            return Ok(false);
        }
        self.inner.save(translation, expected_version).await
    }

    async fn delete_by_id(&self, id: &ObjectId) -> LocaleResult<bool> {
        self.inner.delete_by_id(id).await
    }
}
