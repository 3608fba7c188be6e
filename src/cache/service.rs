//! 翻译缓存服务
//!
//! 在 [`CacheBackend`] 之上提供翻译专用的键空间、读写与失效操作。
//! 后端错误在这里被吞掉：记录 `warn!`，计入错误计数，并按未命中处理，
//! 从不让缓存故障影响翻译读取。

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{CacheBackend, CacheKeys};
use crate::error::LocaleError;
use crate::settings::CacheSettings;

/// 命中统计
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
    invalidated: AtomicU64,
}

/// 统计快照
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub errors: u64,
    pub invalidated_keys: u64,
    pub hit_rate: f64,
}

impl CacheStats {
    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("i18n_cache_hits_total").increment(1);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("i18n_cache_misses_total").increment(1);
    }

    fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("i18n_cache_errors_total").increment(1);
    }

    fn record_invalidated(&self, count: usize) {
        self.invalidated.fetch_add(count as u64, Ordering::Relaxed);
        metrics::counter!("i18n_cache_invalidated_keys_total").increment(count as u64);
    }

    /// 命中率（无请求时为 0）
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let total = hits + self.misses.load(Ordering::Relaxed);
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            invalidated_keys: self.invalidated.load(Ordering::Relaxed),
            hit_rate: self.hit_rate(),
        }
    }
}

/// 翻译缓存服务
pub struct TranslationCacheService {
    backend: Arc<dyn CacheBackend>,
    keys: CacheKeys,
    settings: CacheSettings,
    stats: CacheStats,
}

impl TranslationCacheService {
    pub fn new(backend: Arc<dyn CacheBackend>, settings: CacheSettings) -> Self {
        Self {
            backend,
            keys: CacheKeys::new(settings.key_prefix.clone()),
            settings,
            stats: CacheStats::default(),
        }
    }

    pub fn keys(&self) -> &CacheKeys {
        &self.keys
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    fn swallow(&self, operation: &str, target: &str, error: LocaleError) {
        self.stats.record_error();
        warn!("缓存{}失败 ({}): {}", operation, target, error);
    }

    /// 读取单条翻译
    pub async fn get_text(&self, locale: &str, key: &str, module: Option<&str>) -> Option<String> {
        let cache_key = self.keys.text(locale, key, module);
        match self.backend.get(&cache_key).await {
            Ok(Some(text)) => {
                self.stats.record_hit();
                debug!("缓存命中: {}", cache_key);
                Some(text)
            }
            Ok(None) => {
                self.stats.record_miss();
                debug!("缓存未命中: {}", cache_key);
                None
            }
            Err(e) => {
                self.stats.record_miss();
                self.swallow("读取", &cache_key, e);
                None
            }
        }
    }

    /// 写入单条翻译
    pub async fn set_text(
        &self,
        locale: &str,
        key: &str,
        text: &str,
        module: Option<&str>,
        ttl: Option<Duration>,
    ) {
        let cache_key = self.keys.text(locale, key, module);
        let ttl = ttl.unwrap_or(self.settings.text_ttl);
        if let Err(e) = self.backend.set(&cache_key, text, ttl).await {
            self.swallow("写入", &cache_key, e);
        }
    }

    /// 批量写入单条翻译（一次管道写入）
    pub async fn set_bulk(
        &self,
        locale: &str,
        translations: &BTreeMap<String, String>,
        module: Option<&str>,
        ttl: Option<Duration>,
    ) {
        if translations.is_empty() {
            return;
        }

        let entries: Vec<(String, String)> = translations
            .iter()
            .map(|(key, text)| (self.keys.text(locale, key, module), text.clone()))
            .collect();
        let ttl = ttl.unwrap_or(self.settings.text_ttl);

        match self.backend.set_many(&entries, ttl).await {
            Ok(()) => debug!("批量缓存 {} 条翻译 ({})", entries.len(), locale),
            Err(e) => self.swallow("批量写入", locale, e),
        }
    }

    /// 读取 (语言, 模块) 映射；损坏的负载按未命中处理并删除
    pub async fn get_map(&self, locale: &str, module: &str) -> Option<BTreeMap<String, String>> {
        let cache_key = self.keys.map(locale, module);
        let raw = match self.backend.get(&cache_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.stats.record_miss();
                debug!("映射缓存未命中: {}", cache_key);
                return None;
            }
            Err(e) => {
                self.stats.record_miss();
                self.swallow("读取映射", &cache_key, e);
                return None;
            }
        };

        match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
            Ok(map) => {
                self.stats.record_hit();
                debug!("映射缓存命中: {} ({} 条)", cache_key, map.len());
                Some(map)
            }
            Err(e) => {
                self.stats.record_miss();
                warn!("映射缓存负载损坏，已丢弃 ({}): {}", cache_key, e);
                if let Err(e) = self.backend.delete(&cache_key).await {
                    self.swallow("删除", &cache_key, e);
                }
                None
            }
        }
    }

    /// 写入 (语言, 模块) 映射
    pub async fn set_map(
        &self,
        locale: &str,
        module: &str,
        map: &BTreeMap<String, String>,
        ttl: Option<Duration>,
    ) {
        let cache_key = self.keys.map(locale, module);
        let payload = match serde_json::to_string(map) {
            Ok(payload) => payload,
            Err(e) => {
                self.swallow("序列化映射", &cache_key, e.into());
                return;
            }
        };

        let ttl = ttl.unwrap_or(self.settings.map_ttl);
        if let Err(e) = self.backend.set(&cache_key, &payload, ttl).await {
            self.swallow("写入映射", &cache_key, e);
        }
    }

    /// 失效某个键在某语言下的全部变体
    pub async fn invalidate_key(&self, locale: &str, key: &str) -> usize {
        let pattern = self.keys.key_pattern(locale, key);
        self.invalidate_patterns(&[pattern]).await
    }

    /// 失效某个键在所有语言下的单条缓存
    pub async fn invalidate_key_all_locales(&self, key: &str) -> usize {
        let pattern = self.keys.key_all_locales_pattern(key);
        self.invalidate_patterns(&[pattern]).await
    }

    /// 失效某语言下某模块的单条缓存与映射
    pub async fn invalidate_module(&self, locale: &str, module: &str) -> usize {
        let pattern = self.keys.module_pattern(locale, module);
        let mut removed = self.invalidate_patterns(&[pattern]).await;

        let map_key = self.keys.map(locale, module);
        match self.backend.delete(&map_key).await {
            Ok(true) => {
                removed += 1;
                self.stats.record_invalidated(1);
            }
            Ok(false) => {}
            Err(e) => self.swallow("删除映射", &map_key, e),
        }
        removed
    }

    /// 失效某语言下的全部缓存
    pub async fn invalidate_locale(&self, locale: &str) -> usize {
        let patterns = self.keys.locale_patterns(locale);
        let removed = self.invalidate_patterns(&patterns).await;
        if removed > 0 {
            info!("语言 {} 缓存失效: {} 个键", locale, removed);
        }
        removed
    }

    /// 两阶段失效：先扫描，再分批删除
    async fn invalidate_patterns(&self, patterns: &[String]) -> usize {
        let mut matched = Vec::new();
        for pattern in patterns {
            match self.backend.scan_pattern(pattern).await {
                Ok(keys) => matched.extend(keys),
                Err(e) => self.swallow("扫描", pattern, e),
            }
        }
        if matched.is_empty() {
            return 0;
        }

        let batch_size = self.settings.delete_batch_size.max(1);
        let mut removed = 0;
        for batch in matched.chunks(batch_size) {
            match self.backend.delete_many(batch).await {
                Ok(count) => removed += count,
                Err(e) => self.swallow("批量删除", &format!("{} 个键", batch.len()), e),
            }
        }

        self.stats.record_invalidated(removed);
        debug!("缓存失效 {:?}: {} 个键", patterns, removed);
        removed
    }
}
