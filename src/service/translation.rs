//! 翻译服务
//!
//! 读取路径：缓存 -> 存储 -> 解析 -> 回填缓存。
//! 写入路径：读取 -> 合并 -> 版本化保存（冲突时重读重试）-> 失效受影响的缓存。

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use bson::oid::ObjectId;
use tracing::{debug, info};

use crate::cache::TranslationCacheService;
use crate::error::{LocaleError, LocaleResult};
use crate::merge;
use crate::models::{
    LocaleTranslation, Translation, TranslationCreate, TranslationUpdate, UpsertRequest,
};
use crate::resolve::{build_translations_map, resolve};
use crate::settings::StoreSettings;
use crate::store::{TranslationFilter, TranslationStore};

/// 记录定位方式
#[derive(Debug, Clone, Copy)]
enum Lookup<'a> {
    Key(&'a str),
    /// ObjectId 十六进制或键
    IdOrKey(&'a str),
}

impl Lookup<'_> {
    fn describe(&self) -> &str {
        match self {
            Lookup::Key(key) | Lookup::IdOrKey(key) => key,
        }
    }
}

/// 写入前后发生变化的语言
///
/// 模块列表变化会影响该记录所有语言的映射，因此全部视为受影响。
fn touched_locales(before: Option<&Translation>, after: Option<&Translation>) -> BTreeSet<String> {
    let modules_changed = before.map(|t| &t.modules) != after.map(|t| &t.modules);

    before
        .into_iter()
        .chain(after)
        .flat_map(|t| t.translations.keys())
        .filter(|locale| {
            modules_changed
                || before.and_then(|t| t.locale(locale)) != after.and_then(|t| t.locale(locale))
        })
        .cloned()
        .collect()
}

/// 翻译服务
pub struct TranslationService {
    store: Arc<dyn TranslationStore>,
    cache: Arc<TranslationCacheService>,
    settings: StoreSettings,
}

impl TranslationService {
    pub fn new(
        store: Arc<dyn TranslationStore>,
        cache: Arc<TranslationCacheService>,
        settings: StoreSettings,
    ) -> Self {
        Self {
            store,
            cache,
            settings,
        }
    }

    pub fn cache(&self) -> &Arc<TranslationCacheService> {
        &self.cache
    }

    // ---- 读取 ----

    /// 获取解析后的文本
    ///
    /// 记录不存在时返回 `NotFound`；记录中没有该语言时返回键本身。
    pub async fn get_text(&self, key: &str, locale: &str, module: Option<&str>) -> LocaleResult<String> {
        if let Some(text) = self.cache.get_text(locale, key, module).await {
            return Ok(text);
        }

        let translation = self.store.find_by_key(key).await?;
        let text = resolve(translation.as_ref(), locale, module)?;
        self.cache.set_text(locale, key, &text, module, None).await;
        Ok(text)
    }

    /// 获取 (语言, 模块) 下的 键 -> 文本 映射
    ///
    /// 只有完整映射（无分页）会读写缓存；空结果不缓存。
    pub async fn get_translations_map(
        &self,
        locale: &str,
        module: &str,
        skip: u64,
        limit: Option<i64>,
    ) -> LocaleResult<BTreeMap<String, String>> {
        let cacheable = skip == 0 && limit.is_none();
        if cacheable {
            if let Some(map) = self.cache.get_map(locale, module).await {
                return Ok(map);
            }
        }

        let filter = TranslationFilter::for_module(module).with_locale(locale);
        let translations = self.store.find(&filter, skip, limit).await?;
        let map = build_translations_map(&translations, locale, module);

        if cacheable && !map.is_empty() {
            self.cache.set_map(locale, module, &map, None).await;
        }
        Ok(map)
    }

    /// 按 ID 或键获取记录
    pub async fn get_translation(&self, id_or_key: &str) -> LocaleResult<Translation> {
        self.lookup(Lookup::IdOrKey(id_or_key))
            .await?
            .ok_or_else(|| LocaleError::not_found(format!("translation '{}'", id_or_key)))
    }

    /// 管理端分页列表
    pub async fn list_translations(
        &self,
        filter: &TranslationFilter,
        skip: u64,
        limit: Option<i64>,
    ) -> LocaleResult<Vec<Translation>> {
        self.store.find(filter, skip, limit).await
    }

    async fn lookup(&self, lookup: Lookup<'_>) -> LocaleResult<Option<Translation>> {
        match lookup {
            Lookup::Key(key) => self.store.find_by_key(key).await,
            Lookup::IdOrKey(value) => {
                if let Ok(id) = ObjectId::parse_str(value) {
                    if let Some(translation) = self.store.find_by_id(&id).await? {
                        return Ok(Some(translation));
                    }
                }
                self.store.find_by_key(value).await
            }
        }
    }

    // ---- 写入 ----

    /// 创建新记录；键已存在时返回 `Conflict`
    pub async fn create_translation(&self, create: TranslationCreate) -> LocaleResult<Translation> {
        let request = UpsertRequest {
            key: create.key,
            modules: Some(create.modules),
            translations: Some(merge::create_deltas(create.translations)),
            description: create.description,
            ..Default::default()
        };
        let translation = merge::apply_upsert(None, &request)?;
        let inserted = self.store.insert(translation).await?;

        info!("创建翻译: {} ({} 个语言)", inserted.key, inserted.translations.len());
        self.invalidate_write(None, Some(&inserted)).await;
        Ok(inserted)
    }

    /// 部分更新已存在记录
    pub async fn update_translation(
        &self,
        id_or_key: &str,
        update: TranslationUpdate,
    ) -> LocaleResult<Translation> {
        self.write_with_retry(Lookup::IdOrKey(id_or_key), |current| {
            let current = current
                .ok_or_else(|| LocaleError::not_found(format!("translation '{}'", id_or_key)))?;
            merge::apply_update(current.clone(), &update).map(Some)
        })
        .await?
        .ok_or_else(|| LocaleError::not_found(format!("translation '{}'", id_or_key)))
    }

    /// 创建或合并更新
    pub async fn upsert(&self, request: UpsertRequest) -> LocaleResult<Translation> {
        let key = request.key.trim().to_string();
        let request = UpsertRequest { key, ..request };

        let saved = self
            .write_with_retry(Lookup::Key(&request.key), |current| {
                merge::apply_upsert(current.cloned(), &request).map(Some)
            })
            .await?;
        saved.ok_or_else(|| LocaleError::not_found(format!("translation '{}'", request.key)))
    }

    /// 单语言 upsert
    pub async fn upsert_translation_locale(
        &self,
        key: &str,
        locale: &str,
        text: &str,
        modules: Vec<String>,
        description: Option<String>,
        module_overrides: Option<BTreeMap<String, String>>,
    ) -> LocaleResult<Translation> {
        let mut request = UpsertRequest::single(key, modules, locale, text);
        request.description = description;
        request.module_override = module_overrides;
        self.upsert(request).await
    }

    /// 设置一个模块覆盖；键或语言不存在时返回 `NotFound`
    pub async fn upsert_module_override(
        &self,
        key: &str,
        locale: &str,
        module: &str,
        text: &str,
    ) -> LocaleResult<Translation> {
        self.write_with_retry(Lookup::Key(key), |current| {
            let mut translation = current
                .cloned()
                .ok_or_else(|| LocaleError::not_found(format!("translation '{}'", key)))?;
            merge::set_module_override(&mut translation, locale, module, text)?;
            Ok(Some(translation))
        })
        .await?
        .ok_or_else(|| LocaleError::not_found(format!("translation '{}'", key)))
    }

    /// 为模块登记翻译键
    ///
    /// 键已存在时只把模块并入 `modules`（已包含则返回 `Conflict`）；
    /// 否则创建记录，与键相同的文本不会被存储。
    pub async fn register_translation(
        &self,
        key: &str,
        locale: &str,
        module: &str,
        text: Option<&str>,
        description: Option<&str>,
    ) -> LocaleResult<Translation> {
        let module = module.trim();
        if module.is_empty() {
            return Err(LocaleError::invalid("module name cannot be empty"));
        }
        let modules = vec![module.to_string()];

        let saved = self
            .write_with_retry(Lookup::Key(key), |current| match current {
                Some(current) => {
                    let mut translation = current.clone();
                    if merge::union_modules(&mut translation, &modules).is_empty() {
                        return Err(LocaleError::conflict(format!(
                            "translation '{}' already registered for module '{}'",
                            key, module
                        )));
                    }
                    Ok(Some(translation))
                }
                None => {
                    let mut translation = Translation::new(key, modules.clone())?;
                    translation.description = description.map(str::to_string);
                    if let Some(text) = text.filter(|text| *text != translation.key) {
                        translation
                            .translations
                            .insert(locale.to_string(), LocaleTranslation::new(text));
                    }
                    Ok(Some(translation))
                }
            })
            .await?;
        saved.ok_or_else(|| LocaleError::not_found(format!("translation '{}'", key)))
    }

    /// 删除整条记录
    pub async fn delete_translation(&self, id_or_key: &str) -> LocaleResult<bool> {
        let Some(translation) = self.lookup(Lookup::IdOrKey(id_or_key)).await? else {
            return Ok(false);
        };
        let Some(id) = translation.id else {
            return Ok(false);
        };

        let deleted = self.store.delete_by_id(&id).await?;
        if deleted {
            info!("删除翻译: {}", translation.key);
            self.invalidate_write(Some(&translation), None).await;
        }
        Ok(deleted)
    }

    /// 删除某个语言；记录本身保留
    pub async fn delete_locale_translation(&self, key: &str, locale: &str) -> LocaleResult<bool> {
        let saved = self
            .write_with_retry(Lookup::Key(key), |current| {
                let Some(current) = current else {
                    return Ok(None);
                };
                let mut translation = current.clone();
                Ok(merge::remove_locale(&mut translation, locale).then_some(translation))
            })
            .await?;
        Ok(saved.is_some())
    }

    /// 读取-修改-保存
    ///
    /// `mutate` 返回 `None` 表示无需写入。存储版本变化时重读并重试，
    /// 次数耗尽返回 `Conflict`。
    async fn write_with_retry<F>(&self, lookup: Lookup<'_>, mut mutate: F) -> LocaleResult<Option<Translation>>
    where
        F: FnMut(Option<&Translation>) -> LocaleResult<Option<Translation>>,
    {
        let attempts = self.settings.max_retries.max(1);

        for attempt in 1..=attempts {
            let current = self.lookup(lookup).await?;
            let Some(next) = mutate(current.as_ref())? else {
                return Ok(None);
            };

            let saved = match current {
                Some(ref current) => {
                    if self.store.save(&next, current.version).await? {
                        Some(Translation {
                            version: current.version + 1,
                            ..next
                        })
                    } else {
                        None
                    }
                }
                None => match self.store.insert(next).await {
                    Ok(inserted) => Some(inserted),
                    // 并发创建了同一个键，重读后按更新处理
                    Err(LocaleError::Conflict(_)) if attempt < attempts => None,
                    Err(e) => return Err(e),
                },
            };

            if let Some(saved) = saved {
                debug!("保存翻译: {} (版本 {})", saved.key, saved.version);
                self.invalidate_write(current.as_ref(), Some(&saved)).await;
                return Ok(Some(saved));
            }
            debug!(
                "翻译版本冲突: {} (第 {}/{} 次)",
                lookup.describe(),
                attempt,
                attempts
            );
        }

        Err(LocaleError::conflict(format!(
            "concurrent modification of translation '{}'",
            lookup.describe()
        )))
    }

    /// 失效写入影响的缓存
    ///
    /// 每个受影响的语言整体失效（单条与映射）。删除记录时还要清掉其他语言下
    /// 以键本身作为结果缓存的条目。
    async fn invalidate_write(&self, before: Option<&Translation>, after: Option<&Translation>) {
        let locales = touched_locales(before, after);

        let mut removed = 0;
        for locale in &locales {
            removed += self.cache.invalidate_locale(locale).await;
        }
        if let (Some(deleted), None) = (before, after) {
            removed += self.cache.invalidate_key_all_locales(&deleted.key).await;
        }
        if removed > 0 || !locales.is_empty() {
            debug!("写入后失效 {} 个语言，{} 个缓存键", locales.len(), removed);
        }
    }
}
