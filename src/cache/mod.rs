//! 翻译缓存
//!
//! - `memory` - 进程内后端（带TTL）
//! - `redis` - Redis 后端（需要 `redis-cache` 特性）
//! - `service` - 翻译缓存服务：键空间、读穿、失效与统计
//!
//! 键空间：
//! - 单条：`{prefix}:text:{locale}:{key}:{module|default}`
//! - 映射：`{prefix}:map:{locale}:{module}`
//!
//! 各段中的 `%` 与 `:` 会被编码（`%25`、`%3A`），段之间不会串位。

pub mod memory;
#[cfg(feature = "redis-cache")]
pub mod redis;
pub mod service;

pub use memory::MemoryCacheBackend;
#[cfg(feature = "redis-cache")]
pub use self::redis::RedisCacheBackend;
pub use service::{CacheStats, CacheStatsSnapshot, TranslationCacheService};

use std::borrow::Cow;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::LocaleResult;

/// 无模块时使用的键段
pub const DEFAULT_MODULE_SEGMENT: &str = "default";

/// 缓存后端
///
/// 值一律为字符串；`scan_pattern` 使用 Redis 风格的 glob（`*`、`?`、`\` 转义）。
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> LocaleResult<Option<String>>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> LocaleResult<()>;

    /// 批量写入（同一TTL，一次往返）
    async fn set_many(&self, entries: &[(String, String)], ttl: Duration) -> LocaleResult<()>;

    async fn delete(&self, key: &str) -> LocaleResult<bool>;

    /// 返回实际删除的数量
    async fn delete_many(&self, keys: &[String]) -> LocaleResult<usize>;

    async fn scan_pattern(&self, pattern: &str) -> LocaleResult<Vec<String>>;
}

/// 转义 glob 元字符
pub fn escape_glob(segment: &str) -> String {
    let mut escaped = String::with_capacity(segment.len());
    for c in segment.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// 编码键段中的分隔符
pub fn encode_segment(segment: &str) -> Cow<'_, str> {
    if !segment.contains(['%', ':']) {
        return Cow::Borrowed(segment);
    }
    Cow::Owned(segment.replace('%', "%25").replace(':', "%3A"))
}

/// 单条缓存的模块段
///
/// 名为 `default` 的模块编码为 `%64efault`，与无模块的槽位区分。
fn module_segment(module: Option<&str>) -> Cow<'_, str> {
    match module {
        None => Cow::Borrowed(DEFAULT_MODULE_SEGMENT),
        Some(DEFAULT_MODULE_SEGMENT) => Cow::Borrowed("%64efault"),
        Some(module) => encode_segment(module),
    }
}

/// 编码后再转义，用于扫描模式
fn pattern_segment(segment: &str) -> String {
    escape_glob(&encode_segment(segment))
}

/// 缓存键构建器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    prefix: String,
}

impl CacheKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn text(&self, locale: &str, key: &str, module: Option<&str>) -> String {
        format!(
            "{}:text:{}:{}:{}",
            self.prefix,
            encode_segment(locale),
            encode_segment(key),
            module_segment(module)
        )
    }

    pub fn map(&self, locale: &str, module: &str) -> String {
        format!(
            "{}:map:{}:{}",
            self.prefix,
            encode_segment(locale),
            encode_segment(module)
        )
    }

    /// 某个键在某语言下的所有模块变体（含默认）
    pub fn key_pattern(&self, locale: &str, key: &str) -> String {
        format!(
            "{}:text:{}:{}:*",
            self.prefix,
            pattern_segment(locale),
            pattern_segment(key)
        )
    }

    /// 某个键在所有语言下的单条缓存
    ///
    /// 包括记录中没有的语言（解析结果为键本身的条目）。
    pub fn key_all_locales_pattern(&self, key: &str) -> String {
        format!("{}:text:*:{}:*", self.prefix, pattern_segment(key))
    }

    /// 某语言下某模块的所有单条缓存
    pub fn module_pattern(&self, locale: &str, module: &str) -> String {
        format!(
            "{}:text:{}:*:{}",
            self.prefix,
            pattern_segment(locale),
            escape_glob(&module_segment(Some(module)))
        )
    }

    /// 某语言下的全部单条与映射缓存
    pub fn locale_patterns(&self, locale: &str) -> [String; 2] {
        let locale = pattern_segment(locale);
        [
            format!("{}:text:{}:*", self.prefix, locale),
            format!("{}:map:{}:*", self.prefix, locale),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let keys = CacheKeys::new("i18n");
        assert_eq!(keys.text("en", "btn.save", None), "i18n:text:en:btn.save:default");
        assert_eq!(
            keys.text("en", "btn.save", Some("billing")),
            "i18n:text:en:btn.save:billing"
        );
        assert_eq!(keys.map("fr", "core"), "i18n:map:fr:core");
    }

    #[test]
    fn test_patterns_escape_glob_chars() {
        let keys = CacheKeys::new("i18n");
        assert_eq!(keys.key_pattern("en", "a*b"), "i18n:text:en:a\\*b:*");
        assert_eq!(keys.module_pattern("en", "core"), "i18n:text:en:*:core");
        assert_eq!(
            keys.locale_patterns("de"),
            ["i18n:text:de:*".to_string(), "i18n:map:de:*".to_string()]
        );
        assert_eq!(keys.key_all_locales_pattern("btn.save"), "i18n:text:*:btn.save:*");
    }

    #[test]
    fn test_separator_in_segments_is_encoded() {
        let keys = CacheKeys::new("i18n");
        assert_eq!(keys.text("en", "a:b", None), "i18n:text:en:a%3Ab:default");
        assert_ne!(
            keys.text("en", "a:b", None),
            keys.text("en", "a", Some("b:default"))
        );
        assert_eq!(keys.text("en", "50%", None), "i18n:text:en:50%25:default");
        assert_eq!(keys.map("en", "x:y"), "i18n:map:en:x%3Ay");
        assert_eq!(keys.key_pattern("en", "a:*"), "i18n:text:en:a%3A\\*:*");
    }

    #[test]
    fn test_module_named_default_has_own_slot() {
        let keys = CacheKeys::new("i18n");
        assert_ne!(keys.text("en", "k1", None), keys.text("en", "k1", Some("default")));
        assert_eq!(keys.module_pattern("en", "default"), "i18n:text:en:*:%64efault");
    }
}
