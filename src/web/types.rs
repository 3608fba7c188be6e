//! Web 模块的数据类型定义

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorCategory, LocaleError};
use crate::service::{LocaleService, TranslationService};

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub translations: Arc<TranslationService>,
    pub locales: Arc<LocaleService>,
}

/// API 错误响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error_code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub request_id: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

pub type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

/// 创建API错误响应
pub fn create_api_error(
    status: StatusCode,
    error_code: &str,
    message: &str,
    request_id: String,
    details: Option<serde_json::Value>,
) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            error_code: error_code.to_string(),
            message: message.to_string(),
            details,
            request_id,
            timestamp: chrono::Utc::now(),
        }),
    )
}

/// 把服务错误映射成 HTTP 错误
pub fn error_response(error: LocaleError) -> (StatusCode, Json<ApiError>) {
    let request_id = uuid::Uuid::new_v4().to_string();
    let (status, code) = match error.category() {
        ErrorCategory::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        ErrorCategory::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
        ErrorCategory::Input => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
        ErrorCategory::Store => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
        ErrorCategory::Cache => (StatusCode::INTERNAL_SERVER_ERROR, "CACHE_ERROR"),
        ErrorCategory::Serialization => (StatusCode::INTERNAL_SERVER_ERROR, "SERIALIZATION_ERROR"),
        ErrorCategory::Configuration => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
    };

    if !error.is_client_error() {
        tracing::error!("请求失败 [{}]: {}", request_id, error);
    }
    create_api_error(status, code, &error.to_string(), request_id, None)
}

/// 分页参数
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub skip: u64,
    pub limit: Option<i64>,
}

/// 单条文本查询
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextQuery {
    pub locale: Option<String>,
    pub module: Option<String>,
}

/// 单条文本响应
#[derive(Debug, Serialize)]
pub struct TextResponse {
    pub key: String,
    pub locale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    pub text: String,
}

/// 映射响应
#[derive(Debug, Serialize)]
pub struct TranslationsMapResponse {
    pub locale: String,
    pub module: String,
    pub translations: BTreeMap<String, String>,
}

/// 管理端列表查询
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslationListQuery {
    pub module: Option<String>,
    pub locale: Option<String>,
    #[serde(default)]
    pub skip: u64,
    pub limit: Option<i64>,
}

/// 单语言 upsert 请求体
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertLocaleBody {
    pub text: String,
    pub modules: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub module_overrides: Option<BTreeMap<String, String>>,
}

/// 模块覆盖请求体
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleOverrideBody {
    pub text: String,
}

/// 模块登记请求体
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterBody {
    pub key: String,
    pub locale: String,
    pub module: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// 删除结果
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let (status, body) = error_response(LocaleError::not_found("k1"));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error_code, "NOT_FOUND");

        let (status, _) = error_response(LocaleError::conflict("k1"));
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = error_response(LocaleError::invalid("modules"));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = error_response(LocaleError::Store("down".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
