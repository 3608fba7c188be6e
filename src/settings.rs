//! 模块配置
//!
//! 语言、缓存与存储设置，可由环境变量汇总配置构建

use std::time::Duration;

use crate::env::EnvConfig;

/// 默认支持的语言代码
pub const DEFAULT_SUPPORTED_LOCALES: &[&str] = &[
    "en", "fr", "es", "de", "pl", "ru", "pt", "it", "nl", "dk", "ua", "ro", "cz", "se", "no",
    "fi", "gr", "tr", "hu", "bg", "sk", "hr", "lt", "lv", "ee",
];

/// (语言代码, 英文名称, 本地名称)
pub const LANGUAGE_NAMES: &[(&str, &str, &str)] = &[
    ("en", "English", "English"),
    ("fr", "French", "Français"),
    ("es", "Spanish", "Español"),
    ("de", "German", "Deutsch"),
    ("pl", "Polish", "Polski"),
    ("ru", "Russian", "Русский"),
    ("pt", "Portuguese", "Português"),
    ("it", "Italian", "Italiano"),
    ("nl", "Dutch", "Nederlands"),
    ("dk", "Danish", "Dansk"),
    ("ua", "Ukrainian", "Українська"),
    ("ro", "Romanian", "Română"),
    ("cz", "Czech", "Čeština"),
    ("se", "Swedish", "Svenska"),
    ("no", "Norwegian", "Norsk"),
    ("fi", "Finnish", "Suomi"),
    ("gr", "Greek", "Ελληνικά"),
    ("tr", "Turkish", "Türkçe"),
    ("hu", "Hungarian", "Magyar"),
    ("bg", "Bulgarian", "Български"),
    ("sk", "Slovak", "Slovenčina"),
    ("hr", "Croatian", "Hrvatski"),
    ("lt", "Lithuanian", "Lietuvių"),
    ("lv", "Latvian", "Latviešu"),
    ("ee", "Estonian", "Eesti"),
];

/// 查找语言的显示名称
pub fn language_names(code: &str) -> Option<(&'static str, &'static str)> {
    LANGUAGE_NAMES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, name, localized)| (*name, *localized))
}

/// 语言设置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSettings {
    pub default_locale: String,
    pub fallback_locale: String,
    pub use_fallback: bool,
    pub supported_locales: Vec<String>,
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            default_locale: "en".to_string(),
            fallback_locale: "en".to_string(),
            use_fallback: true,
            supported_locales: DEFAULT_SUPPORTED_LOCALES
                .iter()
                .map(|code| code.to_string())
                .collect(),
        }
    }
}

impl LocaleSettings {
    pub fn from_env_config(config: &EnvConfig) -> Self {
        Self {
            default_locale: config.default_locale.clone(),
            fallback_locale: config.fallback_locale.clone(),
            use_fallback: config.use_fallback,
            supported_locales: config.supported_locales.clone(),
        }
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.supported_locales.iter().any(|c| c == code)
    }
}

/// 缓存设置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// 缓存键命名空间
    pub key_prefix: String,
    /// 单条翻译TTL（默认1小时）
    pub text_ttl: Duration,
    /// 翻译映射TTL（默认5分钟）
    pub map_ttl: Duration,
    /// 失效时每轮删除的键数量
    pub delete_batch_size: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            key_prefix: "i18n".to_string(),
            text_ttl: Duration::from_secs(3600),
            map_ttl: Duration::from_secs(300),
            delete_batch_size: 1000,
        }
    }
}

impl CacheSettings {
    pub fn from_env_config(config: &EnvConfig) -> Self {
        Self {
            key_prefix: config.cache_prefix.clone(),
            text_ttl: config.cache_text_ttl,
            map_ttl: config.cache_map_ttl,
            delete_batch_size: config.cache_delete_batch_size,
        }
    }
}

/// 存储写入设置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreSettings {
    /// 版本冲突时的最大尝试次数
    pub max_retries: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self { max_retries: 3 }
    }
}

impl StoreSettings {
    pub fn from_env_config(config: &EnvConfig) -> Self {
        Self {
            max_retries: config.store_max_retries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_locale_settings() {
        let settings = LocaleSettings::default();
        assert_eq!(settings.default_locale, "en");
        assert_eq!(settings.supported_locales.len(), 25);
        assert!(settings.is_supported("ua"));
        assert!(!settings.is_supported("xx"));
    }

    #[test]
    fn test_every_supported_locale_has_names() {
        for code in DEFAULT_SUPPORTED_LOCALES {
            assert!(language_names(code).is_some(), "missing names for {}", code);
        }
        assert_eq!(language_names("de"), Some(("German", "Deutsch")));
    }

    #[test]
    fn test_cache_defaults() {
        let settings = CacheSettings::default();
        assert_eq!(settings.text_ttl, Duration::from_secs(3600));
        assert_eq!(settings.map_ttl, Duration::from_secs(300));
        assert!(settings.map_ttl < settings.text_ttl);
        assert_eq!(settings.delete_batch_size, 1000);
    }
}
