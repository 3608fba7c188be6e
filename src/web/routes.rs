//! Web 路由定义

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::web::{handlers::*, types::AppState};

/// 创建路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        // 公共读取接口
        .route("/api/i18n/text/:key", get(get_text))
        .route("/api/i18n/map/:locale/:module", get(get_translations_map))
        .route("/api/i18n/locales", get(list_active_locales).post(create_locale))
        // 翻译管理
        .route(
            "/api/i18n/translations",
            get(list_translations).post(create_translation),
        )
        .route("/api/i18n/translations/upsert", post(upsert_translation))
        .route("/api/i18n/translations/register", post(register_translation))
        .route(
            "/api/i18n/translations/:key",
            get(get_translation)
                .patch(update_translation)
                .delete(delete_translation),
        )
        .route(
            "/api/i18n/translations/:key/locales/:locale",
            put(upsert_translation_locale).delete(delete_locale_translation),
        )
        .route(
            "/api/i18n/translations/:key/locales/:locale/modules/:module",
            put(upsert_module_override),
        )
        // 语言管理
        .route("/api/i18n/locales/all", get(list_all_locales))
        .route(
            "/api/i18n/locales/:id",
            get(get_locale).patch(update_locale).delete(delete_locale),
        )
        .route("/api/i18n/cache/stats", get(cache_stats))
}
