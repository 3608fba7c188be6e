//! 翻译解析
//!
//! 根据语言与请求模块，从翻译记录中解析出最终显示的文本。
//!
//! 优先级：
//! 1. 记录不存在 -> `NotFound`
//! 2. 记录中没有该语言 -> 返回键本身（未翻译占位）
//! 3. 请求模块在 `module_overrides` 中 -> 覆盖文本（空字符串也是有效覆盖）
//! 4. 否则 -> 该语言的默认文本

use std::collections::BTreeMap;

use crate::error::{LocaleError, LocaleResult};
use crate::models::Translation;

/// 解析单条翻译文本
pub fn resolve(
    translation: Option<&Translation>,
    locale: &str,
    module: Option<&str>,
) -> LocaleResult<String> {
    let translation =
        translation.ok_or_else(|| LocaleError::not_found("translation not found"))?;
    Ok(resolve_text(translation, locale, module).to_string())
}

/// 对已存在的记录解析文本，从不失败
pub fn resolve_text<'a>(translation: &'a Translation, locale: &str, module: Option<&str>) -> &'a str {
    let Some(lt) = translation.translations.get(locale) else {
        return &translation.key;
    };

    // 覆盖按键独立存储，不要求模块出现在 modules 中
    if let Some(text) = module.and_then(|m| lt.module_overrides.get(m)) {
        return text;
    }

    &lt.text
}

/// 为 (语言, 模块) 构建 键 -> 文本 映射
///
/// 只包含声明了该模块且带有该语言的记录。
pub fn build_translations_map<'a, I>(translations: I, locale: &str, module: &str) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = &'a Translation>,
{
    translations
        .into_iter()
        .filter(|t| t.has_module(module) && t.translations.contains_key(locale))
        .map(|t| (t.key.clone(), resolve_text(t, locale, Some(module)).to_string()))
        .collect()
}
