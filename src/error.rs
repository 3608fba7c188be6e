//! 语言与翻译模块统一错误处理
//!
//! 提供结构化错误类型和错误分类

use std::fmt;

use thiserror::Error;

use crate::env::EnvError;

/// 统一结果类型
pub type LocaleResult<T> = Result<T, LocaleError>;

/// 语言与翻译错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocaleError {
    /// 记录不存在（翻译键、ID、键内的语言）
    #[error("未找到: {0}")]
    NotFound(String),

    /// 创建时键或代码已存在，或并发写入重试耗尽
    #[error("冲突: {0}")]
    Conflict(String),

    /// 输入验证错误
    #[error("输入无效: {0}")]
    InvalidInput(String),

    /// 存储错误（对操作是致命的）
    #[error("存储错误: {0}")]
    Store(String),

    /// 缓存错误（在缓存服务内被吞掉并降级为未命中）
    #[error("缓存错误: {0}")]
    Cache(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    Serialization(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),
}

impl LocaleError {
    pub fn not_found<T: fmt::Display>(what: T) -> Self {
        LocaleError::NotFound(what.to_string())
    }

    pub fn conflict<T: fmt::Display>(what: T) -> Self {
        LocaleError::Conflict(what.to_string())
    }

    pub fn invalid<T: fmt::Display>(what: T) -> Self {
        LocaleError::InvalidInput(what.to_string())
    }

    /// 检查错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            LocaleError::Store(_) => true,
            LocaleError::Cache(_) => true,
            LocaleError::Conflict(_) => false,
            LocaleError::NotFound(_) => false,
            LocaleError::InvalidInput(_) => false,
            LocaleError::Serialization(_) => false,
            LocaleError::Config(_) => false,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            LocaleError::NotFound(_) => ErrorCategory::NotFound,
            LocaleError::Conflict(_) => ErrorCategory::Conflict,
            LocaleError::InvalidInput(_) => ErrorCategory::Input,
            LocaleError::Store(_) => ErrorCategory::Store,
            LocaleError::Cache(_) => ErrorCategory::Cache,
            LocaleError::Serialization(_) => ErrorCategory::Serialization,
            LocaleError::Config(_) => ErrorCategory::Configuration,
        }
    }

    /// 是否应直接暴露给调用方（而不是作为内部错误）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::NotFound | ErrorCategory::Conflict | ErrorCategory::Input
        )
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    NotFound,
    Conflict,
    Input,
    Store,
    Cache,
    Serialization,
    Configuration,
}

impl From<serde_json::Error> for LocaleError {
    fn from(error: serde_json::Error) -> Self {
        LocaleError::Serialization(error.to_string())
    }
}

impl From<bson::ser::Error> for LocaleError {
    fn from(error: bson::ser::Error) -> Self {
        LocaleError::Serialization(error.to_string())
    }
}

impl From<EnvError> for LocaleError {
    fn from(error: EnvError) -> Self {
        LocaleError::Config(error.to_string())
    }
}

#[cfg(feature = "web")]
impl From<mongodb::error::Error> for LocaleError {
    fn from(error: mongodb::error::Error) -> Self {
        LocaleError::Store(error.to_string())
    }
}

#[cfg(feature = "redis-cache")]
impl From<redis::RedisError> for LocaleError {
    fn from(error: redis::RedisError) -> Self {
        LocaleError::Cache(error.to_string())
    }
}
