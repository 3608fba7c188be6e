//! 翻译相关 HTTP 处理器

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header::ACCEPT_LANGUAGE, HeaderMap},
    Json,
};

use crate::cache::CacheStatsSnapshot;
use crate::models::{Translation, TranslationCreate, TranslationUpdate, UpsertRequest};
use crate::negotiate::negotiate_locale;
use crate::store::TranslationFilter;
use crate::web::types::*;

/// 获取解析后的单条文本
///
/// 未传 `locale` 时按 `Accept-Language` 协商。
pub async fn get_text(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(query): Query<TextQuery>,
    headers: HeaderMap,
) -> ApiResult<TextResponse> {
    let locale = match query.locale {
        Some(locale) => locale,
        None => {
            let accept = headers.get(ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok());
            negotiate_locale(accept, None, state.locales.settings())
        }
    };

    let text = state
        .translations
        .get_text(&key, &locale, query.module.as_deref())
        .await
        .map_err(error_response)?;

    Ok(Json(TextResponse {
        key,
        locale,
        module: query.module,
        text,
    }))
}

/// 获取 (语言, 模块) 映射
pub async fn get_translations_map(
    State(state): State<Arc<AppState>>,
    Path((locale, module)): Path<(String, String)>,
    Query(page): Query<PageQuery>,
) -> ApiResult<TranslationsMapResponse> {
    let translations = state
        .translations
        .get_translations_map(&locale, &module, page.skip, page.limit)
        .await
        .map_err(error_response)?;

    Ok(Json(TranslationsMapResponse {
        locale,
        module,
        translations,
    }))
}

pub async fn list_translations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TranslationListQuery>,
) -> ApiResult<Vec<Translation>> {
    let filter = TranslationFilter {
        module: query.module,
        locale: query.locale,
    };
    let translations = state
        .translations
        .list_translations(&filter, query.skip, query.limit)
        .await
        .map_err(error_response)?;
    Ok(Json(translations))
}

pub async fn create_translation(
    State(state): State<Arc<AppState>>,
    Json(create): Json<TranslationCreate>,
) -> ApiResult<Translation> {
    let translation = state
        .translations
        .create_translation(create)
        .await
        .map_err(error_response)?;
    Ok(Json(translation))
}

pub async fn get_translation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Translation> {
    let translation = state
        .translations
        .get_translation(&id)
        .await
        .map_err(error_response)?;
    Ok(Json(translation))
}

pub async fn update_translation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<TranslationUpdate>,
) -> ApiResult<Translation> {
    let translation = state
        .translations
        .update_translation(&id, update)
        .await
        .map_err(error_response)?;
    Ok(Json(translation))
}

pub async fn delete_translation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<DeleteResponse> {
    let deleted = state
        .translations
        .delete_translation(&id)
        .await
        .map_err(error_response)?;
    Ok(Json(DeleteResponse { deleted }))
}

pub async fn upsert_translation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpsertRequest>,
) -> ApiResult<Translation> {
    let translation = state
        .translations
        .upsert(request)
        .await
        .map_err(error_response)?;
    Ok(Json(translation))
}

pub async fn register_translation(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterBody>,
) -> ApiResult<Translation> {
    let translation = state
        .translations
        .register_translation(
            &body.key,
            &body.locale,
            &body.module,
            body.text.as_deref(),
            body.description.as_deref(),
        )
        .await
        .map_err(error_response)?;
    Ok(Json(translation))
}

pub async fn upsert_translation_locale(
    State(state): State<Arc<AppState>>,
    Path((key, locale)): Path<(String, String)>,
    Json(body): Json<UpsertLocaleBody>,
) -> ApiResult<Translation> {
    let translation = state
        .translations
        .upsert_translation_locale(
            &key,
            &locale,
            &body.text,
            body.modules,
            body.description,
            body.module_overrides,
        )
        .await
        .map_err(error_response)?;
    Ok(Json(translation))
}

pub async fn delete_locale_translation(
    State(state): State<Arc<AppState>>,
    Path((key, locale)): Path<(String, String)>,
) -> ApiResult<DeleteResponse> {
    let deleted = state
        .translations
        .delete_locale_translation(&key, &locale)
        .await
        .map_err(error_response)?;
    Ok(Json(DeleteResponse { deleted }))
}

pub async fn upsert_module_override(
    State(state): State<Arc<AppState>>,
    Path((key, locale, module)): Path<(String, String, String)>,
    Json(body): Json<ModuleOverrideBody>,
) -> ApiResult<Translation> {
    let translation = state
        .translations
        .upsert_module_override(&key, &locale, &module, &body.text)
        .await
        .map_err(error_response)?;
    Ok(Json(translation))
}

/// 缓存命中统计
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStatsSnapshot> {
    Json(state.translations.cache().stats())
}
