//! 请求语言协商
//!
//! 优先级：`Accept-Language` 头 > 查询参数 > 默认语言。
//! 请求的语言都不受支持时，启用回退则返回回退语言。

use crate::settings::LocaleSettings;

/// 解析 `Accept-Language`，按权重降序返回语言标签
///
/// 权重相同保持原顺序；`q=0` 与无法解析的条目被忽略。
pub fn parse_accept_language(header: &str) -> Vec<String> {
    let mut weighted: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|item| {
            let mut parts = item.split(';');
            let tag = parts.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }

            let mut quality = 1.0_f32;
            for param in parts {
                if let Some(value) = param.trim().strip_prefix("q=") {
                    quality = value.trim().parse().ok()?;
                }
            }
            (quality > 0.0).then(|| (tag.to_lowercase(), quality))
        })
        .collect();

    weighted.sort_by(|a, b| b.1.total_cmp(&a.1));
    weighted.into_iter().map(|(tag, _)| tag).collect()
}

/// 在受支持语言中查找标签（先完整标签，再主语言子标签）
fn match_supported(tag: &str, settings: &LocaleSettings) -> Option<String> {
    let tag = tag.trim().to_lowercase().replace('_', "-");
    let primary = tag.split('-').next().unwrap_or(&tag).to_string();

    let found = [tag.as_str(), primary.as_str()]
        .into_iter()
        .find_map(|candidate| {
            settings
                .supported_locales
                .iter()
                .find(|code| code.eq_ignore_ascii_case(candidate))
                .cloned()
        });
    found
}

/// 为请求选择语言
pub fn negotiate_locale(
    accept_language: Option<&str>,
    query_locale: Option<&str>,
    settings: &LocaleSettings,
) -> String {
    let mut requested = false;

    if let Some(header) = accept_language.filter(|h| !h.trim().is_empty()) {
        for tag in parse_accept_language(header) {
            requested = true;
            if let Some(locale) = match_supported(&tag, settings) {
                return locale;
            }
        }
    }

    if let Some(query) = query_locale.filter(|q| !q.trim().is_empty()) {
        requested = true;
        if let Some(locale) = match_supported(query, settings) {
            return locale;
        }
    }

    if requested && settings.use_fallback {
        settings.fallback_locale.clone()
    } else {
        settings.default_locale.clone()
    }
}
