//! Web 服务器配置
//!
//! 由环境变量汇总配置构建

use crate::env::{EnvConfig, EnvError, EnvResult};
use crate::settings::{CacheSettings, LocaleSettings, StoreSettings};

/// MongoDB 配置
#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// MongoDB 连接字符串
    pub connection_string: String,
    /// 数据库名称
    pub database_name: String,
}

impl MongoConfig {
    /// 验证配置
    pub fn validate(&self) -> EnvResult<()> {
        if self.connection_string.is_empty() {
            return Err(EnvError {
                variable: "MONGODB_URL".to_string(),
                message: "Connection string cannot be empty".to_string(),
            });
        }

        if self.database_name.is_empty() {
            return Err(EnvError {
                variable: "MONGODB_DATABASE".to_string(),
                message: "Database name cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// 缓存后端选择
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackendConfig {
    Memory,
    Redis { url: String },
}

/// Web 服务器配置
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// 绑定地址
    pub bind_addr: String,
    /// 端口
    pub port: u16,
    pub mongo: MongoConfig,
    pub cache_backend: CacheBackendConfig,
    pub locale: LocaleSettings,
    pub cache: CacheSettings,
    pub store: StoreSettings,
}

impl WebConfig {
    /// 从环境变量创建配置
    pub fn from_env() -> EnvResult<Self> {
        let config = EnvConfig::from_env()?;
        config.validate()?;
        Ok(Self::from_env_config(&config))
    }

    pub fn from_env_config(config: &EnvConfig) -> Self {
        let cache_backend = if config.cache_backend == "redis" {
            CacheBackendConfig::Redis {
                url: config.redis_url.clone(),
            }
        } else {
            CacheBackendConfig::Memory
        };

        Self {
            bind_addr: config.web_bind_address.clone(),
            port: config.web_port,
            mongo: MongoConfig {
                connection_string: config.mongodb_connection_string.clone(),
                database_name: config.mongodb_database_name.clone(),
            },
            cache_backend,
            locale: LocaleSettings::from_env_config(config),
            cache: CacheSettings::from_env_config(config),
            store: StoreSettings::from_env_config(config),
        }
    }

    /// 验证配置
    pub fn validate(&self) -> EnvResult<()> {
        if self.bind_addr.is_empty() {
            return Err(EnvError {
                variable: "LOCALE_WEB_BIND_ADDRESS".to_string(),
                message: "Bind address cannot be empty".to_string(),
            });
        }

        if self.port == 0 {
            return Err(EnvError {
                variable: "LOCALE_WEB_PORT".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        self.mongo.validate()
    }

    /// 监听地址
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}
