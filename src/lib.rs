//! # Locale Service
//!
//! 多语言翻译管理服务：每个翻译键一条记录，内嵌所有语言的文本与按模块的覆盖，
//! 读取走读穿缓存，写入后按语言/模块精确失效。
//!
//! ## 模块组织
//!
//! - `models` - 语言与翻译记录、部分更新结构
//! - `resolve` - 文本解析（语言回退、模块覆盖）
//! - `merge` - upsert 合并逻辑
//! - `store` - 文档存储接口（内存 / MongoDB）
//! - `cache` - 缓存后端（内存 / Redis）与翻译缓存服务
//! - `service` - 翻译服务与语言服务
//! - `seed` - 默认语言初始化
//! - `negotiate` - 请求语言协商
//! - `env` / `settings` - 环境变量与配置
//! - `web` - HTTP 接口（可选）

pub mod cache;
pub mod env;
pub mod error;
pub mod merge;
pub mod models;
pub mod negotiate;
pub mod resolve;
pub mod seed;
pub mod service;
pub mod settings;
pub mod store;
#[cfg(feature = "web")]
pub mod web;

pub use cache::{CacheBackend, MemoryCacheBackend, TranslationCacheService};
pub use error::{ErrorCategory, LocaleError, LocaleResult};
pub use models::{
    Locale, LocaleCreate, LocaleTranslation, LocaleTranslationCreate, LocaleTranslationUpdate,
    LocaleUpdate, Translation, TranslationCreate, TranslationUpdate, UpsertRequest,
};
pub use negotiate::negotiate_locale;
pub use resolve::resolve;
pub use service::{LocaleService, TranslationService};
pub use settings::{CacheSettings, LocaleSettings, StoreSettings};
pub use store::{LocaleStore, TranslationFilter, TranslationStore};
