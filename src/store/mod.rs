//! 文档存储
//!
//! 翻译与语言记录的持久化接口。服务层只依赖这里的 trait，
//! 具体实现通过 `Arc<dyn ...>` 注入：
//!
//! - `memory` - 进程内存储，用于测试与开发模式
//! - `mongo` - MongoDB 存储（需要 `web` 特性）

pub mod memory;
#[cfg(feature = "web")]
pub mod mongo;

pub use memory::{MemoryLocaleStore, MemoryTranslationStore};
#[cfg(feature = "web")]
pub use mongo::{MongoLocaleStore, MongoTranslationStore};

use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::error::{LocaleError, LocaleResult};
use crate::models::{Locale, Translation};

/// 翻译查询条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationFilter {
    /// 只返回 `modules` 包含此模块的记录
    pub module: Option<String>,
    /// 只返回带有此语言的记录
    pub locale: Option<String>,
}

impl TranslationFilter {
    pub fn for_module(module: impl Into<String>) -> Self {
        Self {
            module: Some(module.into()),
            locale: None,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn matches(&self, translation: &Translation) -> bool {
        let module_ok = self
            .module
            .as_deref()
            .map_or(true, |m| translation.has_module(m));
        let locale_ok = self
            .locale
            .as_deref()
            .map_or(true, |l| translation.translations.contains_key(l));
        module_ok && locale_ok
    }
}

/// 语言查询条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocaleFilter {
    pub active: Option<bool>,
}

impl LocaleFilter {
    pub fn active() -> Self {
        Self { active: Some(true) }
    }

    pub fn matches(&self, locale: &Locale) -> bool {
        self.active.map_or(true, |active| locale.active == active)
    }
}

/// 翻译记录存储
#[async_trait]
pub trait TranslationStore: Send + Sync {
    async fn find_by_id(&self, id: &ObjectId) -> LocaleResult<Option<Translation>>;

    async fn find_by_key(&self, key: &str) -> LocaleResult<Option<Translation>>;

    /// 按键排序分页查询
    async fn find(
        &self,
        filter: &TranslationFilter,
        skip: u64,
        limit: Option<i64>,
    ) -> LocaleResult<Vec<Translation>>;

    /// 插入新记录；键已存在时返回 `Conflict`
    async fn insert(&self, translation: Translation) -> LocaleResult<Translation>;

    /// 版本化保存
    ///
    /// 仅当存储中的版本等于 `expected_version` 时写入，写入后版本加一。
    /// 版本不匹配（或记录已被删除）时返回 `Ok(false)`。
    async fn save(&self, translation: &Translation, expected_version: i64) -> LocaleResult<bool>;

    async fn delete_by_id(&self, id: &ObjectId) -> LocaleResult<bool>;
}

/// 语言记录存储
#[async_trait]
pub trait LocaleStore: Send + Sync {
    async fn find_by_id(&self, id: &ObjectId) -> LocaleResult<Option<Locale>>;

    /// 按 (代码, 国家) 查找
    async fn find_by_code(&self, code: &str, country: Option<&str>) -> LocaleResult<Option<Locale>>;

    /// 按 sort_order、名称排序分页查询
    async fn find(&self, filter: LocaleFilter, skip: u64, limit: Option<i64>) -> LocaleResult<Vec<Locale>>;

    /// 插入新记录；(代码, 国家) 已存在时返回 `Conflict`
    async fn insert(&self, locale: Locale) -> LocaleResult<Locale>;

    /// 整体替换；返回记录是否存在
    async fn save(&self, locale: &Locale) -> LocaleResult<bool>;

    async fn delete_by_id(&self, id: &ObjectId) -> LocaleResult<bool>;
}

/// 解析 ObjectId 十六进制字符串
pub fn parse_object_id(id: &str) -> LocaleResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| LocaleError::invalid(format!("invalid id '{}'", id)))
}

/// 记录缺少 id 时的统一错误
pub(crate) fn missing_id(what: &str) -> LocaleError {
    LocaleError::invalid(format!("{} has no id", what))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LocaleTranslation;

    #[test]
    fn test_translation_filter_matches() {
        let mut translation = Translation::new("k1", vec!["core".to_string()]).unwrap();
        translation
            .translations
            .insert("en".to_string(), LocaleTranslation::new("Hello"));

        assert!(TranslationFilter::default().matches(&translation));
        assert!(TranslationFilter::for_module("core").matches(&translation));
        assert!(!TranslationFilter::for_module("billing").matches(&translation));
        assert!(TranslationFilter::for_module("core")
            .with_locale("en")
            .matches(&translation));
        assert!(!TranslationFilter::for_module("core")
            .with_locale("fr")
            .matches(&translation));
    }

    #[test]
    fn test_parse_object_id() {
        let id = ObjectId::new();
        assert_eq!(parse_object_id(&id.to_hex()).unwrap(), id);
        assert!(matches!(
            parse_object_id("btn.save"),
            Err(LocaleError::InvalidInput(_))
        ));
    }
}
