//! 进程内存储
//!
//! 以 `RwLock<HashMap>` 保存记录，语义与 MongoDB 存储一致：
//! 唯一键冲突、版本化保存、排序与分页。

use std::collections::HashMap;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::{missing_id, LocaleFilter, LocaleStore, TranslationFilter, TranslationStore};
use crate::error::{LocaleError, LocaleResult};
use crate::models::{Locale, Translation};

fn paginate<T>(items: Vec<T>, skip: u64, limit: Option<i64>) -> Vec<T> {
    let iter = items.into_iter().skip(skip as usize);
    match limit {
        Some(limit) if limit > 0 => iter.take(limit as usize).collect(),
        _ => iter.collect(),
    }
}

/// 内存翻译存储
#[derive(Debug, Default)]
pub struct MemoryTranslationStore {
    records: RwLock<HashMap<ObjectId, Translation>>,
}

impl MemoryTranslationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl TranslationStore for MemoryTranslationStore {
    async fn find_by_id(&self, id: &ObjectId) -> LocaleResult<Option<Translation>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn find_by_key(&self, key: &str) -> LocaleResult<Option<Translation>> {
        let records = self.records.read().await;
        Ok(records.values().find(|t| t.key == key).cloned())
    }

    async fn find(
        &self,
        filter: &TranslationFilter,
        skip: u64,
        limit: Option<i64>,
    ) -> LocaleResult<Vec<Translation>> {
        let records = self.records.read().await;
        let mut matched: Vec<Translation> =
            records.values().filter(|t| filter.matches(t)).cloned().collect();
        matched.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(paginate(matched, skip, limit))
    }

    async fn insert(&self, mut translation: Translation) -> LocaleResult<Translation> {
        let mut records = self.records.write().await;
        if records.values().any(|t| t.key == translation.key) {
            return Err(LocaleError::conflict(format!(
                "translation key '{}' already exists",
                translation.key
            )));
        }

        let id = translation.id.unwrap_or_else(ObjectId::new);
        translation.id = Some(id);
        translation.version = 0;
        records.insert(id, translation.clone());
        Ok(translation)
    }

    async fn save(&self, translation: &Translation, expected_version: i64) -> LocaleResult<bool> {
        let id = translation.id.ok_or_else(|| missing_id("translation"))?;
        let mut records = self.records.write().await;

        let Some(current) = records.get_mut(&id) else {
            return Ok(false);
        };
        if current.version != expected_version {
            return Ok(false);
        }

        let mut stored = translation.clone();
        stored.version = expected_version + 1;
        *current = stored;
        Ok(true)
    }

    async fn delete_by_id(&self, id: &ObjectId) -> LocaleResult<bool> {
        Ok(self.records.write().await.remove(id).is_some())
    }
}

/// 内存语言存储
#[derive(Debug, Default)]
pub struct MemoryLocaleStore {
    records: RwLock<HashMap<ObjectId, Locale>>,
}

impl MemoryLocaleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocaleStore for MemoryLocaleStore {
    async fn find_by_id(&self, id: &ObjectId) -> LocaleResult<Option<Locale>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn find_by_code(&self, code: &str, country: Option<&str>) -> LocaleResult<Option<Locale>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|l| l.code == code && l.country.as_deref() == country)
            .cloned())
    }

    async fn find(&self, filter: LocaleFilter, skip: u64, limit: Option<i64>) -> LocaleResult<Vec<Locale>> {
        let records = self.records.read().await;
        let mut matched: Vec<Locale> = records.values().filter(|l| filter.matches(l)).cloned().collect();
        matched.sort_by(Locale::list_order);
        Ok(paginate(matched, skip, limit))
    }

    async fn insert(&self, mut locale: Locale) -> LocaleResult<Locale> {
        let mut records = self.records.write().await;
        if records
            .values()
            .any(|l| l.code == locale.code && l.country == locale.country)
        {
            return Err(LocaleError::conflict(format!(
                "locale '{}' already exists",
                locale.code
            )));
        }

        let id = locale.id.unwrap_or_else(ObjectId::new);
        locale.id = Some(id);
        records.insert(id, locale.clone());
        Ok(locale)
    }

    async fn save(&self, locale: &Locale) -> LocaleResult<bool> {
        let id = locale.id.ok_or_else(|| missing_id("locale"))?;
        let mut records = self.records.write().await;

        if records
            .iter()
            .any(|(other, l)| *other != id && l.code == locale.code && l.country == locale.country)
        {
            return Err(LocaleError::conflict(format!(
                "locale '{}' already exists",
                locale.code
            )));
        }

        match records.get_mut(&id) {
            Some(current) => {
                *current = locale.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: &ObjectId) -> LocaleResult<bool> {
        Ok(self.records.write().await.remove(id).is_some())
    }
}
