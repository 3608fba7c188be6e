//! 翻译合并逻辑
//!
//! 把部分增量合并到翻译记录中，不会丢弃无关语言或模块的数据。
//! 这里只做纯内存变换，读写存储与缓存失效由服务层负责。

use std::collections::BTreeMap;

use crate::error::{LocaleError, LocaleResult};
use crate::models::{
    normalize_modules, now, LocaleTranslation, LocaleTranslationUpdate, Translation,
    TranslationUpdate, UpsertRequest,
};

/// 以 upsert 增量创建或更新记录
///
/// - 记录不存在：`modules` 必须提供且非空
/// - 记录存在：提供的 `modules` 整体替换，提供的 `description`（包括空字符串）替换原值
/// - 每个语言：已存在则合并文本与模块覆盖，否则新建
pub fn apply_upsert(existing: Option<Translation>, request: &UpsertRequest) -> LocaleResult<Translation> {
    let deltas = request.locale_deltas()?;

    let mut translation = match existing {
        Some(mut translation) => {
            translation.updated_at = now();
            if let Some(ref modules) = request.modules {
                translation.modules = normalize_modules(modules.clone())?;
            }
            if let Some(ref description) = request.description {
                translation.description = Some(description.clone());
            }
            translation
        }
        None => {
            let modules = request.modules.clone().ok_or_else(|| {
                LocaleError::invalid("at least one module must be specified")
            })?;
            let mut translation = Translation::new(request.key.clone(), modules)?;
            translation.description = request.description.clone();
            translation
        }
    };

    for (locale, delta) in deltas {
        merge_locale(&mut translation, locale, delta)?;
    }

    Ok(translation)
}

/// 合并更新请求到已存在记录
pub fn apply_update(existing: Translation, update: &TranslationUpdate) -> LocaleResult<Translation> {
    if matches!(update.modules, Some(ref modules) if modules.is_empty()) {
        return Err(LocaleError::invalid("at least one module must be specified"));
    }

    let request = UpsertRequest {
        key: existing.key.clone(),
        modules: update.modules.clone(),
        translations: update.translations.clone(),
        description: update.description.clone(),
        ..Default::default()
    };
    apply_upsert(Some(existing), &request)
}

/// 合并单个语言的增量
fn merge_locale(
    translation: &mut Translation,
    locale: String,
    delta: LocaleTranslationUpdate,
) -> LocaleResult<()> {
    let timestamp = now();

    if let Some(lt) = translation.translations.get_mut(&locale) {
        if let Some(text) = delta.text {
            lt.text = text;
        }
        if let Some(overrides) = delta.module_overrides {
            lt.module_overrides.extend(overrides);
        }
        if let Some(description) = delta.description {
            lt.description = Some(description);
        }
        lt.updated_at = timestamp;
        return Ok(());
    }

    let text = delta.text.ok_or_else(|| {
        LocaleError::invalid(format!("text is required for new locale '{}'", locale))
    })?;
    let lt = LocaleTranslation {
        text,
        module_overrides: delta.module_overrides.unwrap_or_default(),
        description: delta.description,
        created_at: timestamp,
        updated_at: timestamp,
    };
    translation.translations.insert(locale, lt);
    Ok(())
}

/// 设置一个模块覆盖
///
/// 语言必须已存在；模块不在 `modules` 中时会被追加。
pub fn set_module_override(
    translation: &mut Translation,
    locale: &str,
    module: &str,
    text: impl Into<String>,
) -> LocaleResult<()> {
    let module = module.trim();
    if module.is_empty() {
        return Err(LocaleError::invalid("module name cannot be empty"));
    }

    let timestamp = now();
    let lt = translation.translations.get_mut(locale).ok_or_else(|| {
        LocaleError::not_found(format!(
            "locale '{}' not found in translation '{}'",
            locale, translation.key
        ))
    })?;
    lt.module_overrides.insert(module.to_string(), text.into());
    lt.updated_at = timestamp;

    if !translation.has_module(module) {
        translation.modules.push(module.to_string());
    }
    translation.updated_at = timestamp;
    Ok(())
}

/// 移除一个语言；返回是否有内容被移除
///
/// 即使记录因此不再包含任何语言，记录本身也保留。
pub fn remove_locale(translation: &mut Translation, locale: &str) -> bool {
    let removed = translation.translations.remove(locale).is_some();
    if removed {
        translation.updated_at = now();
    }
    removed
}

/// 把模块并入记录；返回新增的模块
pub fn union_modules(translation: &mut Translation, modules: &[String]) -> Vec<String> {
    let mut added = Vec::new();
    for module in modules {
        if !translation.has_module(module) {
            translation.modules.push(module.clone());
            added.push(module.clone());
        }
    }
    if !added.is_empty() {
        translation.updated_at = now();
    }
    added
}

/// 把创建请求中的语言转换成合并增量
pub fn create_deltas(
    translations: BTreeMap<String, crate::models::LocaleTranslationCreate>,
) -> BTreeMap<String, LocaleTranslationUpdate> {
    translations
        .into_iter()
        .map(|(locale, create)| (locale, create.into()))
        .collect()
}
