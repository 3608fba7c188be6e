//! MongoDB 存储
//!
//! 集合：
//! - `i18n_translations` - 翻译记录，`key` 唯一索引
//! - `i18n_locales` - 语言记录，`(code, country)` 唯一索引

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use futures::stream::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};

use super::{missing_id, LocaleFilter, LocaleStore, TranslationFilter, TranslationStore};
use crate::error::{LocaleError, LocaleResult};
use crate::models::{Locale, Translation};

pub const TRANSLATIONS_COLLECTION: &str = "i18n_translations";
pub const LOCALES_COLLECTION: &str = "i18n_locales";

/// MongoDB 重复键错误码
const DUPLICATE_KEY_CODE: i32 = 11000;

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

fn translation_query(filter: &TranslationFilter) -> Document {
    let mut query = doc! {};
    if let Some(ref module) = filter.module {
        query.insert("modules", module.as_str());
    }
    if let Some(ref locale) = filter.locale {
        query.insert(format!("translations.{}", locale), doc! { "$exists": true });
    }
    query
}

fn country_value(country: Option<&str>) -> Bson {
    country.map_or(Bson::Null, |c| Bson::String(c.to_string()))
}

/// MongoDB 翻译存储
#[derive(Debug, Clone)]
pub struct MongoTranslationStore {
    collection: Collection<Translation>,
}

impl MongoTranslationStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Translation>(TRANSLATIONS_COLLECTION),
        }
    }

    /// 创建唯一索引（可重复调用）
    pub async fn ensure_indexes(&self) -> LocaleResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "key": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;

        let modules_index = IndexModel::builder().keys(doc! { "modules": 1 }).build();
        self.collection.create_index(modules_index).await?;

        tracing::debug!("翻译集合索引已就绪");
        Ok(())
    }
}

#[async_trait]
impl TranslationStore for MongoTranslationStore {
    async fn find_by_id(&self, id: &ObjectId) -> LocaleResult<Option<Translation>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_key(&self, key: &str) -> LocaleResult<Option<Translation>> {
        Ok(self.collection.find_one(doc! { "key": key }).await?)
    }

    async fn find(
        &self,
        filter: &TranslationFilter,
        skip: u64,
        limit: Option<i64>,
    ) -> LocaleResult<Vec<Translation>> {
        let mut action = self
            .collection
            .find(translation_query(filter))
            .sort(doc! { "key": 1 })
            .skip(skip);
        if let Some(limit) = limit.filter(|l| *l > 0) {
            action = action.limit(limit);
        }

        let cursor = action.await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert(&self, mut translation: Translation) -> LocaleResult<Translation> {
        translation.version = 0;
        match self.collection.insert_one(&translation).await {
            Ok(result) => {
                translation.id = result.inserted_id.as_object_id();
                Ok(translation)
            }
            Err(e) if is_duplicate_key(&e) => Err(LocaleError::conflict(format!(
                "translation key '{}' already exists",
                translation.key
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, translation: &Translation, expected_version: i64) -> LocaleResult<bool> {
        let id = translation.id.ok_or_else(|| missing_id("translation"))?;

        let mut stored = translation.clone();
        stored.version = expected_version + 1;

        let result = self
            .collection
            .replace_one(doc! { "_id": id, "version": expected_version }, &stored)
            .await?;
        Ok(result.matched_count == 1)
    }

    async fn delete_by_id(&self, id: &ObjectId) -> LocaleResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

/// MongoDB 语言存储
#[derive(Debug, Clone)]
pub struct MongoLocaleStore {
    collection: Collection<Locale>,
}

impl MongoLocaleStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Locale>(LOCALES_COLLECTION),
        }
    }

    /// 创建唯一索引（可重复调用）
    pub async fn ensure_indexes(&self) -> LocaleResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "code": 1, "country": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        tracing::debug!("语言集合索引已就绪");
        Ok(())
    }
}

#[async_trait]
impl LocaleStore for MongoLocaleStore {
    async fn find_by_id(&self, id: &ObjectId) -> LocaleResult<Option<Locale>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_code(&self, code: &str, country: Option<&str>) -> LocaleResult<Option<Locale>> {
        Ok(self
            .collection
            .find_one(doc! { "code": code, "country": country_value(country) })
            .await?)
    }

    async fn find(&self, filter: LocaleFilter, skip: u64, limit: Option<i64>) -> LocaleResult<Vec<Locale>> {
        let mut query = doc! {};
        if let Some(active) = filter.active {
            query.insert("active", active);
        }

        let mut action = self
            .collection
            .find(query)
            .sort(doc! { "sort_order": 1, "name": 1 })
            .skip(skip);
        if let Some(limit) = limit.filter(|l| *l > 0) {
            action = action.limit(limit);
        }

        let cursor = action.await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert(&self, mut locale: Locale) -> LocaleResult<Locale> {
        match self.collection.insert_one(&locale).await {
            Ok(result) => {
                locale.id = result.inserted_id.as_object_id();
                Ok(locale)
            }
            Err(e) if is_duplicate_key(&e) => Err(LocaleError::conflict(format!(
                "locale '{}' already exists",
                locale.code
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, locale: &Locale) -> LocaleResult<bool> {
        let id = locale.id.ok_or_else(|| missing_id("locale"))?;
        match self.collection.replace_one(doc! { "_id": id }, locale).await {
            Ok(result) => Ok(result.matched_count == 1),
            Err(e) if is_duplicate_key(&e) => Err(LocaleError::conflict(format!(
                "locale '{}' already exists",
                locale.code
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_by_id(&self, id: &ObjectId) -> LocaleResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_query() {
        assert_eq!(translation_query(&TranslationFilter::default()), doc! {});

        let filter = TranslationFilter::for_module("billing").with_locale("en");
        let query = translation_query(&filter);
        assert_eq!(query.get_str("modules").unwrap(), "billing");
        assert!(query.get_document("translations.en").is_ok());
    }

    #[test]
    fn test_country_value() {
        assert_eq!(country_value(None), Bson::Null);
        assert_eq!(country_value(Some("US")), Bson::String("US".to_string()));
    }
}
