//! 数据模型
//!
//! - `locale` - 语言记录及其创建/更新结构
//! - `translation` - 翻译记录（内嵌各语言翻译）及部分更新结构

pub mod locale;
pub mod translation;

pub use locale::*;
pub use translation::*;

use chrono::{DateTime, SubsecRound, Utc};

/// 当前时间（秒级精度，与存储往返后保持一致）
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}
