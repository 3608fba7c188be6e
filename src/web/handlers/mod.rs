//! Web 路由处理器

pub mod locales;
pub mod translations;

pub use locales::*;
pub use translations::*;

use axum::Json;

use crate::web::types::HealthResponse;

/// 健康检查
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
