//! 业务服务
//!
//! - `translation` - 翻译读取（读穿缓存）、写入（版本化保存 + 缓存失效）
//! - `locale` - 语言管理

pub mod locale;
pub mod translation;

pub use locale::LocaleService;
pub use translation::TranslationService;
