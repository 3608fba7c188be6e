//! 翻译记录
//!
//! 一个翻译键对应一条记录，内嵌所有语言的文本及模块覆盖

use std::collections::BTreeMap;

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LocaleError, LocaleResult};

/// 某一语言下的翻译
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleTranslation {
    /// 默认文本
    pub text: String,
    /// 模块 -> 覆盖文本（稀疏）
    #[serde(default)]
    pub module_overrides: BTreeMap<String, String>,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LocaleTranslation {
    pub fn new(text: impl Into<String>) -> Self {
        let now = super::now();
        Self {
            text: text.into(),
            module_overrides: BTreeMap::new(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 翻译记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// 全局唯一的翻译键
    pub key: String,
    /// 使用此键的模块（非空）
    pub modules: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// 语言代码 -> 翻译
    #[serde(default)]
    pub translations: BTreeMap<String, LocaleTranslation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// 乐观并发版本号，由存储层维护
    #[serde(default)]
    pub version: i64,
}

impl Translation {
    /// 创建空记录；modules 必须非空
    pub fn new(key: impl Into<String>, modules: Vec<String>) -> LocaleResult<Self> {
        let key = validate_key(&key.into())?;
        let modules = normalize_modules(modules)?;
        let now = super::now();
        Ok(Self {
            id: None,
            key,
            modules,
            description: None,
            translations: BTreeMap::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    pub fn has_module(&self, module: &str) -> bool {
        self.modules.iter().any(|m| m == module)
    }

    pub fn locale(&self, locale: &str) -> Option<&LocaleTranslation> {
        self.translations.get(locale)
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.translations.keys().map(String::as_str)
    }
}

/// 创建翻译时某一语言的输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleTranslationCreate {
    pub text: String,
    #[serde(default)]
    pub module_overrides: BTreeMap<String, String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// 某一语言的部分更新
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocaleTranslationUpdate {
    pub text: Option<String>,
    pub module_overrides: Option<BTreeMap<String, String>>,
    pub description: Option<String>,
}

impl LocaleTranslationUpdate {
    /// 合并同一语言的另一份增量
    fn absorb(&mut self, other: LocaleTranslationUpdate) {
        if other.text.is_some() {
            self.text = other.text;
        }
        if other.description.is_some() {
            self.description = other.description;
        }
        if let Some(overrides) = other.module_overrides {
            self.module_overrides
                .get_or_insert_with(BTreeMap::new)
                .extend(overrides);
        }
    }
}

impl From<LocaleTranslationCreate> for LocaleTranslationUpdate {
    fn from(create: LocaleTranslationCreate) -> Self {
        Self {
            text: Some(create.text),
            module_overrides: Some(create.module_overrides),
            description: create.description,
        }
    }
}

/// 创建翻译请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationCreate {
    pub key: String,
    pub modules: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub translations: BTreeMap<String, LocaleTranslationCreate>,
}

/// 更新翻译请求
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationUpdate {
    pub modules: Option<Vec<String>>,
    pub description: Option<String>,
    pub translations: Option<BTreeMap<String, LocaleTranslationUpdate>>,
}

/// 统一的 upsert 增量
///
/// 所有写入路径在进入合并逻辑前都会归一化为此结构。
/// `locale` + `text`（以及可选的 `module_override`）是单语言写法，
/// `translations` 是批量写法，两者可同时提供，单语言条目最后应用。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpsertRequest {
    pub key: String,
    /// 提供时整体替换（非并集）
    pub modules: Option<Vec<String>>,
    pub translations: Option<BTreeMap<String, LocaleTranslationUpdate>>,
    pub locale: Option<String>,
    pub text: Option<String>,
    pub description: Option<String>,
    pub module_override: Option<BTreeMap<String, String>>,
}

impl UpsertRequest {
    /// 单语言写法
    pub fn single(
        key: impl Into<String>,
        modules: Vec<String>,
        locale: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            modules: Some(modules),
            locale: Some(locale.into()),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_module_overrides(mut self, overrides: BTreeMap<String, String>) -> Self {
        self.module_override = Some(overrides);
        self
    }

    /// 合并单语言与批量写法，得到 语言 -> 增量
    ///
    /// 批量写法的语言代码与单语言写法一样去除首尾空白；
    /// 去空白后相同的条目合并，后出现的字段优先。
    pub fn locale_deltas(&self) -> LocaleResult<BTreeMap<String, LocaleTranslationUpdate>> {
        let mut deltas: BTreeMap<String, LocaleTranslationUpdate> = BTreeMap::new();
        for (locale, delta) in self.translations.iter().flatten() {
            let locale = validate_locale_code(locale)?;
            match deltas.get_mut(&locale) {
                Some(entry) => entry.absorb(delta.clone()),
                None => {
                    deltas.insert(locale, delta.clone());
                }
            }
        }

        match (&self.locale, &self.text) {
            (Some(locale), Some(text)) => {
                let locale = validate_locale_code(locale)?;
                let entry = deltas.entry(locale).or_default();
                entry.text = Some(text.clone());
                if let Some(ref overrides) = self.module_override {
                    entry
                        .module_overrides
                        .get_or_insert_with(BTreeMap::new)
                        .extend(overrides.clone());
                }
            }
            (Some(_), None) => {
                return Err(LocaleError::invalid("'text' is required when 'locale' is given"))
            }
            (None, Some(_)) => {
                return Err(LocaleError::invalid("'locale' is required when 'text' is given"))
            }
            (None, None) => {
                if self.module_override.is_some() {
                    return Err(LocaleError::invalid(
                        "'module_override' requires 'locale' and 'text'",
                    ));
                }
            }
        }

        Ok(deltas)
    }
}

pub(crate) fn validate_key(key: &str) -> LocaleResult<String> {
    let key = key.trim();
    if key.is_empty() {
        return Err(LocaleError::invalid("translation key cannot be empty"));
    }
    Ok(key.to_string())
}

pub(crate) fn validate_locale_code(locale: &str) -> LocaleResult<String> {
    let locale = locale.trim();
    if locale.is_empty() {
        return Err(LocaleError::invalid("locale code cannot be empty"));
    }
    Ok(locale.to_string())
}

/// 去重（保持首次出现顺序），拒绝空列表与空模块名
pub fn normalize_modules(modules: Vec<String>) -> LocaleResult<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(modules.len());
    for module in modules {
        let module = module.trim();
        if module.is_empty() {
            return Err(LocaleError::invalid("module name cannot be empty"));
        }
        if !normalized.iter().any(|m| m == module) {
            normalized.push(module.to_string());
        }
    }

    if normalized.is_empty() {
        return Err(LocaleError::invalid("at least one module must be specified"));
    }
    Ok(normalized)
}
