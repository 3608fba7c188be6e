//! 默认语言初始化

use tracing::{debug, info};

use crate::error::{LocaleError, LocaleResult};
use crate::models::LocaleCreate;
use crate::settings::{language_names, LocaleSettings};
use crate::store::LocaleStore;

/// 为每个受支持、但还没有记录的语言代码插入默认记录
///
/// 名称取内置表，未知代码使用大写代码作为名称。可重复执行，返回插入数量。
pub async fn seed_default_locales(store: &dyn LocaleStore, settings: &LocaleSettings) -> LocaleResult<usize> {
    let mut inserted = 0;

    for (index, code) in settings.supported_locales.iter().enumerate() {
        if store.find_by_code(code, None).await?.is_some() {
            continue;
        }

        let (name, localized_name) = match language_names(code) {
            Some((name, localized)) => (name.to_string(), localized.to_string()),
            None => (code.to_uppercase(), code.to_uppercase()),
        };
        let create = LocaleCreate {
            code: code.clone(),
            name,
            localized_name,
            country: None,
            details: None,
            active: true,
            sort_order: index as i32,
        };

        match store.insert(create.into_locale()?).await {
            Ok(_) => inserted += 1,
            // 另一个实例同时写入
            Err(LocaleError::Conflict(_)) => debug!("语言已存在: {}", code),
            Err(e) => return Err(e),
        }
    }

    if inserted > 0 {
        info!("初始化默认语言: {} 个", inserted);
    }
    Ok(inserted)
}
