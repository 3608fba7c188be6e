//! 语言记录

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LocaleError, LocaleResult};

fn default_true() -> bool {
    true
}

/// 语言记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locale {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// 语言代码，例如 "en"
    pub code: String,
    /// 英文名称，例如 "English"
    pub name: String,
    /// 本地名称，例如 "Deutsch"
    pub localized_name: String,
    /// 国家/地区，例如 "US"
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    /// 排序（0 表示按名称字母序）
    #[serde(default)]
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 创建语言请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleCreate {
    pub code: String,
    pub name: String,
    pub localized_name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

/// 更新语言请求（仅覆盖提供的字段）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocaleUpdate {
    pub code: Option<String>,
    pub name: Option<String>,
    pub localized_name: Option<String>,
    pub country: Option<String>,
    pub details: Option<String>,
    pub active: Option<bool>,
    pub sort_order: Option<i32>,
}

/// 空字符串的国家视为未设置
fn normalize_country(country: Option<String>) -> Option<String> {
    country
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

fn validate_code(code: &str) -> LocaleResult<String> {
    let code = code.trim();
    if code.is_empty() {
        return Err(LocaleError::invalid("locale code cannot be empty"));
    }
    Ok(code.to_string())
}

impl LocaleCreate {
    /// 校验输入并构建新记录
    pub fn into_locale(self) -> LocaleResult<Locale> {
        let code = validate_code(&self.code)?;
        if self.name.trim().is_empty() {
            return Err(LocaleError::invalid("locale name cannot be empty"));
        }

        let now = super::now();
        Ok(Locale {
            id: None,
            code,
            name: self.name,
            localized_name: self.localized_name,
            country: normalize_country(self.country),
            details: self.details,
            active: self.active,
            sort_order: self.sort_order,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Locale {
    /// 应用部分更新
    pub fn apply_update(&mut self, update: LocaleUpdate) -> LocaleResult<()> {
        if let Some(code) = update.code {
            self.code = validate_code(&code)?;
        }
        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(LocaleError::invalid("locale name cannot be empty"));
            }
            self.name = name;
        }
        if let Some(localized_name) = update.localized_name {
            self.localized_name = localized_name;
        }
        if update.country.is_some() {
            self.country = normalize_country(update.country);
        }
        if let Some(details) = update.details {
            self.details = Some(details);
        }
        if let Some(active) = update.active {
            self.active = active;
        }
        if let Some(sort_order) = update.sort_order {
            self.sort_order = sort_order;
        }
        self.updated_at = super::now();
        Ok(())
    }

    /// 列表排序：先 sort_order，再名称
    pub fn list_order(a: &Locale, b: &Locale) -> std::cmp::Ordering {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.name.cmp(&b.name))
    }
}
