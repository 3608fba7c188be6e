//! 语言服务

use std::sync::Arc;

use tracing::info;

use crate::error::{LocaleError, LocaleResult};
use crate::models::{Locale, LocaleCreate, LocaleUpdate};
use crate::seed::seed_default_locales;
use crate::settings::LocaleSettings;
use crate::store::{parse_object_id, LocaleFilter, LocaleStore};

/// 语言服务
pub struct LocaleService {
    store: Arc<dyn LocaleStore>,
    settings: LocaleSettings,
}

impl LocaleService {
    pub fn new(store: Arc<dyn LocaleStore>, settings: LocaleSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &LocaleSettings {
        &self.settings
    }

    /// 创建语言；(代码, 国家) 已存在时返回 `Conflict`
    pub async fn create_locale(&self, create: LocaleCreate) -> LocaleResult<Locale> {
        let locale = self.store.insert(create.into_locale()?).await?;
        info!("创建语言: {}", locale.code);
        Ok(locale)
    }

    pub async fn get_locale(&self, id: &str) -> LocaleResult<Locale> {
        let object_id = parse_object_id(id)?;
        self.store
            .find_by_id(&object_id)
            .await?
            .ok_or_else(|| LocaleError::not_found(format!("locale '{}'", id)))
    }

    pub async fn get_locale_by_code(&self, code: &str, country: Option<&str>) -> LocaleResult<Option<Locale>> {
        self.store.find_by_code(code, country).await
    }

    /// 启用的语言，按 sort_order、名称排序
    pub async fn list_active(&self, skip: u64, limit: Option<i64>) -> LocaleResult<Vec<Locale>> {
        self.store.find(LocaleFilter::active(), skip, limit).await
    }

    /// 全部语言（管理端）
    pub async fn list_all(&self, skip: u64, limit: Option<i64>) -> LocaleResult<Vec<Locale>> {
        self.store.find(LocaleFilter::default(), skip, limit).await
    }

    pub async fn update_locale(&self, id: &str, update: LocaleUpdate) -> LocaleResult<Locale> {
        let mut locale = self.get_locale(id).await?;
        locale.apply_update(update)?;

        if !self.store.save(&locale).await? {
            return Err(LocaleError::not_found(format!("locale '{}'", id)));
        }
        info!("更新语言: {}", locale.code);
        Ok(locale)
    }

    pub async fn delete_locale(&self, id: &str) -> LocaleResult<bool> {
        let object_id = parse_object_id(id)?;
        let deleted = self.store.delete_by_id(&object_id).await?;
        if deleted {
            info!("删除语言: {}", id);
        }
        Ok(deleted)
    }

    /// 为尚无记录的受支持语言写入默认记录
    pub async fn seed_defaults(&self) -> LocaleResult<usize> {
        seed_default_locales(self.store.as_ref(), &self.settings).await
    }
}
