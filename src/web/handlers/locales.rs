//! 语言相关 HTTP 处理器

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::models::{Locale, LocaleCreate, LocaleUpdate};
use crate::web::types::*;

/// 启用的语言
pub async fn list_active_locales(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<Locale>> {
    let locales = state
        .locales
        .list_active(page.skip, page.limit)
        .await
        .map_err(error_response)?;
    Ok(Json(locales))
}

/// 全部语言（含停用）
pub async fn list_all_locales(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<Locale>> {
    let locales = state
        .locales
        .list_all(page.skip, page.limit)
        .await
        .map_err(error_response)?;
    Ok(Json(locales))
}

pub async fn create_locale(
    State(state): State<Arc<AppState>>,
    Json(create): Json<LocaleCreate>,
) -> ApiResult<Locale> {
    let locale = state
        .locales
        .create_locale(create)
        .await
        .map_err(error_response)?;
    Ok(Json(locale))
}

pub async fn get_locale(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Locale> {
    let locale = state.locales.get_locale(&id).await.map_err(error_response)?;
    Ok(Json(locale))
}

pub async fn update_locale(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<LocaleUpdate>,
) -> ApiResult<Locale> {
    let locale = state
        .locales
        .update_locale(&id, update)
        .await
        .map_err(error_response)?;
    Ok(Json(locale))
}

pub async fn delete_locale(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<DeleteResponse> {
    let deleted = state.locales.delete_locale(&id).await.map_err(error_response)?;
    Ok(Json(DeleteResponse { deleted }))
}
