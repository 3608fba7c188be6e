//! 进程内缓存后端
//!
//! 条目带过期时间，读取时过滤过期条目，`cleanup_expired` 负责回收。

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use regex::Regex;
use tokio::sync::RwLock;

use super::CacheBackend;
use crate::error::{LocaleError, LocaleResult};

/// 缓存条目
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// 内存缓存后端
#[derive(Debug, Default)]
pub struct MemoryCacheBackend {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 清理过期条目，返回清理数量
    pub async fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!("清理过期缓存条目: {}", removed);
        }
        removed
    }

    /// 当前条目数（含尚未清理的过期条目）
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn insert(&self, key: &str, value: &str, ttl: Duration, now: Instant) {
        let entry = CacheEntry {
            value: value.to_string(),
            expires_at: now + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
    }
}

/// 把 Redis 风格的 glob 转成正则
pub(crate) fn glob_to_regex(pattern: &str) -> LocaleResult<Regex> {
    let mut expr = String::with_capacity(pattern.len() * 2 + 2);
    expr.push('^');

    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            '\\' => {
                if let Some(next) = chars.next() {
                    expr.push_str(&regex::escape(next.encode_utf8(&mut [0; 4])));
                }
            }
            other => expr.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    expr.push('$');

    Regex::new(&expr).map_err(|e| LocaleError::Cache(format!("invalid pattern '{}': {}", pattern, e)))
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    async fn get(&self, key: &str) -> LocaleResult<Option<String>> {
        let entries = self.entries.read().await;
        let now = Instant::now();
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> LocaleResult<()> {
        self.insert(key, value, ttl, Instant::now()).await;
        Ok(())
    }

    async fn set_many(&self, entries: &[(String, String)], ttl: Duration) -> LocaleResult<()> {
        let expires_at = Instant::now() + ttl;
        let mut map = self.entries.write().await;
        for (key, value) in entries {
            map.insert(
                key.clone(),
                CacheEntry {
                    value: value.clone(),
                    expires_at,
                },
            );
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> LocaleResult<bool> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn delete_many(&self, keys: &[String]) -> LocaleResult<usize> {
        let mut entries = self.entries.write().await;
        Ok(keys.iter().filter(|key| entries.remove(*key).is_some()).count())
    }

    async fn scan_pattern(&self, pattern: &str) -> LocaleResult<Vec<String>> {
        let regex = glob_to_regex(pattern)?;
        let entries = self.entries.read().await;
        let now = Instant::now();
        Ok(entries
            .iter()
            .filter(|(key, entry)| entry.is_live(now) && regex.is_match(key))
            .map(|(key, _)| key.clone())
            .collect())
    }
}
