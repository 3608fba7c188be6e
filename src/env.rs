//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量管理

use std::env;
use std::fmt;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 应用运行模式
    pub struct Mode;
    impl EnvVar<String> for Mode {
        const NAME: &'static str = "LOCALE_MODE";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Application mode: development, staging, production";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("production".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "development" | "dev" => Ok("development".to_string()),
                "staging" | "stage" => Ok("staging".to_string()),
                "production" | "prod" => Ok("production".to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid mode '{}'. Use: development, staging, production",
                        value
                    ),
                }),
            }
        }
    }

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "LOCALE_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }
}

/// 语言相关环境变量
pub mod locale {
    use super::*;

    /// 默认语言
    pub struct DefaultLocale;
    impl EnvVar<String> for DefaultLocale {
        const NAME: &'static str = "LOCALE_DEFAULT";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Default locale code for new users and requests";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("en".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            parse_locale_code(value, Self::NAME)
        }
    }

    /// 回退语言
    pub struct FallbackLocale;
    impl EnvVar<String> for FallbackLocale {
        const NAME: &'static str = "LOCALE_FALLBACK";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Locale used when the requested one is not supported";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("en".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            parse_locale_code(value, Self::NAME)
        }
    }

    /// 是否启用回退
    pub struct UseFallback;
    impl EnvVar<bool> for UseFallback {
        const NAME: &'static str = "LOCALE_USE_FALLBACK";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Fall back to LOCALE_FALLBACK for unsupported locales";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 支持的语言列表
    pub struct SupportedLocales;
    impl EnvVar<Vec<String>> for SupportedLocales {
        const NAME: &'static str = "LOCALE_SUPPORTED";
        const DEFAULT: Option<Vec<String>> = None;
        const DESCRIPTION: &'static str = "Supported locale codes (comma-separated)";

        fn get() -> EnvResult<Vec<String>> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(crate::settings::DEFAULT_SUPPORTED_LOCALES
                    .iter()
                    .map(|code| code.to_string())
                    .collect()),
            }
        }

        fn parse(value: &str) -> EnvResult<Vec<String>> {
            let codes = value
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| parse_locale_code(s, Self::NAME))
                .collect::<EnvResult<Vec<_>>>()?;

            if codes.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "At least one locale must be listed".to_string(),
                });
            }
            Ok(codes)
        }
    }
}

/// 缓存相关环境变量
pub mod cache {
    use super::*;

    /// 缓存后端
    pub struct Backend;
    impl EnvVar<String> for Backend {
        const NAME: &'static str = "LOCALE_CACHE_BACKEND";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Cache backend: memory, redis";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("memory".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.trim().to_lowercase().as_str() {
                "memory" | "mem" => Ok("memory".to_string()),
                "redis" => Ok("redis".to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!("Invalid cache backend '{}'. Use: memory, redis", value),
                }),
            }
        }
    }

    /// Redis 连接地址
    pub struct RedisUrl;
    impl EnvVar<String> for RedisUrl {
        const NAME: &'static str = "REDIS_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Redis connection URL";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("redis://127.0.0.1:6379".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("redis://") || url.starts_with("rediss://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Redis URL must start with redis:// or rediss://".to_string(),
                })
            }
        }
    }

    /// 缓存键前缀
    pub struct KeyPrefix;
    impl EnvVar<String> for KeyPrefix {
        const NAME: &'static str = "LOCALE_CACHE_PREFIX";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Namespace prefix for every cache key";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("i18n".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let prefix = value.trim().trim_end_matches(':');
            if prefix.is_empty() || prefix.contains(['*', '?', '[', ']']) {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Prefix cannot be empty or contain glob characters".to_string(),
                });
            }
            Ok(prefix.to_string())
        }
    }

    /// 单条翻译缓存TTL
    pub struct TextTtl;
    impl EnvVar<Duration> for TextTtl {
        const NAME: &'static str = "LOCALE_CACHE_TEXT_TTL";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(3600));
        const DESCRIPTION: &'static str = "TTL in seconds for single translation entries";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_ttl(value, Self::NAME)
        }
    }

    /// 翻译映射缓存TTL
    pub struct MapTtl;
    impl EnvVar<Duration> for MapTtl {
        const NAME: &'static str = "LOCALE_CACHE_MAP_TTL";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(300));
        const DESCRIPTION: &'static str = "TTL in seconds for cached locale/module maps";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_ttl(value, Self::NAME)
        }
    }

    /// 批量删除大小
    pub struct DeleteBatchSize;
    impl EnvVar<usize> for DeleteBatchSize {
        const NAME: &'static str = "LOCALE_CACHE_DELETE_BATCH";
        const DEFAULT: Option<usize> = Some(1000);
        const DESCRIPTION: &'static str = "Keys deleted per round-trip during invalidation";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 100000)
        }
    }
}

/// 存储相关环境变量
pub mod store {
    use super::*;

    /// 并发写入冲突时的最大重试次数
    pub struct MaxRetries;
    impl EnvVar<usize> for MaxRetries {
        const NAME: &'static str = "LOCALE_STORE_MAX_RETRIES";
        const DEFAULT: Option<usize> = Some(3);
        const DESCRIPTION: &'static str = "Attempts for a translation write on version conflicts";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 20)
        }
    }
}

/// Web服务器相关环境变量
pub mod web {
    use super::*;

    /// 绑定地址
    pub struct BindAddress;
    impl EnvVar<String> for BindAddress {
        const NAME: &'static str = "LOCALE_WEB_BIND_ADDRESS";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Web server bind address";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("127.0.0.1".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let addr = value.trim();
            if addr.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Address cannot be empty".to_string(),
                });
            }
            Ok(addr.to_string())
        }
    }

    /// 端口
    pub struct Port;
    impl EnvVar<u16> for Port {
        const NAME: &'static str = "LOCALE_WEB_PORT";
        const DEFAULT: Option<u16> = Some(7090);
        const DESCRIPTION: &'static str = "Web server port";

        fn parse(value: &str) -> EnvResult<u16> {
            let port: u16 = value.parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid port number (1-65535)".to_string(),
            })?;

            if port == 0 {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Port cannot be 0".to_string(),
                });
            }

            Ok(port)
        }
    }
}

/// MongoDB相关环境变量
pub mod mongodb {
    use super::*;

    /// MongoDB连接字符串
    pub struct ConnectionString;
    impl EnvVar<String> for ConnectionString {
        const NAME: &'static str = "MONGODB_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "MongoDB connection string";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("mongodb://localhost:27017".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("mongodb://") || url.starts_with("mongodb+srv://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "MongoDB URL must start with mongodb:// or mongodb+srv://"
                        .to_string(),
                })
            }
        }
    }

    /// 数据库名称
    pub struct DatabaseName;
    impl EnvVar<String> for DatabaseName {
        const NAME: &'static str = "MONGODB_DATABASE";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "MongoDB database name";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("stufio".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let name = value.trim();
            if name.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Database name cannot be empty".to_string(),
                });
            }
            Ok(name.to_string())
        }
    }
}

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

fn parse_ttl(value: &str, var_name: &str) -> EnvResult<Duration> {
    let seconds: u64 = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid number of seconds".to_string(),
    })?;

    if seconds == 0 {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "TTL must be greater than 0".to_string(),
        });
    }

    if seconds > 86400 * 7 {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "TTL too long (maximum 7 days)".to_string(),
        });
    }

    Ok(Duration::from_secs(seconds))
}

fn parse_locale_code(value: &str, var_name: &str) -> EnvResult<String> {
    let code = value.trim().to_lowercase();
    let valid = !code.is_empty()
        && code.len() <= 16
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if !valid {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Invalid locale code '{}'", value),
        });
    }
    Ok(code)
}

/// 环境变量配置汇总
#[derive(Debug, Clone)]
pub struct EnvConfig {
    // 核心配置
    pub mode: String,
    pub log_level: String,

    // 语言配置
    pub default_locale: String,
    pub fallback_locale: String,
    pub use_fallback: bool,
    pub supported_locales: Vec<String>,

    // 缓存配置
    pub cache_backend: String,
    pub redis_url: String,
    pub cache_prefix: String,
    pub cache_text_ttl: Duration,
    pub cache_map_ttl: Duration,
    pub cache_delete_batch_size: usize,

    // 存储配置
    pub store_max_retries: usize,

    // Web配置
    pub web_bind_address: String,
    pub web_port: u16,

    // MongoDB配置
    pub mongodb_connection_string: String,
    pub mongodb_database_name: String,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            mode: core::Mode::get()?,
            log_level: core::LogLevel::get()?,

            default_locale: locale::DefaultLocale::get()?,
            fallback_locale: locale::FallbackLocale::get()?,
            use_fallback: locale::UseFallback::get()?,
            supported_locales: locale::SupportedLocales::get()?,

            cache_backend: cache::Backend::get()?,
            redis_url: cache::RedisUrl::get()?,
            cache_prefix: cache::KeyPrefix::get()?,
            cache_text_ttl: cache::TextTtl::get()?,
            cache_map_ttl: cache::MapTtl::get()?,
            cache_delete_batch_size: cache::DeleteBatchSize::get()?,

            store_max_retries: store::MaxRetries::get()?,

            web_bind_address: web::BindAddress::get()?,
            web_port: web::Port::get()?,

            mongodb_connection_string: mongodb::ConnectionString::get()?,
            mongodb_database_name: mongodb::DatabaseName::get()?,
        })
    }

    /// 验证跨字段约束
    pub fn validate(&self) -> EnvResult<()> {
        if !self.supported_locales.contains(&self.default_locale) {
            return Err(EnvError {
                variable: locale::DefaultLocale::NAME.to_string(),
                message: format!(
                    "Default locale '{}' is not in {}",
                    self.default_locale,
                    locale::SupportedLocales::NAME
                ),
            });
        }

        if self.use_fallback && !self.supported_locales.contains(&self.fallback_locale) {
            return Err(EnvError {
                variable: locale::FallbackLocale::NAME.to_string(),
                message: format!(
                    "Fallback locale '{}' is not in {}",
                    self.fallback_locale,
                    locale::SupportedLocales::NAME
                ),
            });
        }

        Ok(())
    }

    /// 是否为开发模式
    pub fn is_development(&self) -> bool {
        self.mode == "development"
    }
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables Documentation\n\n");

    docs.push_str("## Core Configuration\n\n");
    push_doc::<core::Mode, String>(&mut docs);
    push_doc::<core::LogLevel, String>(&mut docs);

    docs.push_str("\n## Locale Configuration\n\n");
    push_doc::<locale::DefaultLocale, String>(&mut docs);
    push_doc::<locale::FallbackLocale, String>(&mut docs);
    push_doc::<locale::UseFallback, bool>(&mut docs);
    push_doc::<locale::SupportedLocales, Vec<String>>(&mut docs);

    docs.push_str("\n## Cache Configuration\n\n");
    push_doc::<cache::Backend, String>(&mut docs);
    push_doc::<cache::RedisUrl, String>(&mut docs);
    push_doc::<cache::KeyPrefix, String>(&mut docs);
    push_doc::<cache::TextTtl, Duration>(&mut docs);
    push_doc::<cache::MapTtl, Duration>(&mut docs);
    push_doc::<cache::DeleteBatchSize, usize>(&mut docs);

    docs.push_str("\n## Store Configuration\n\n");
    push_doc::<store::MaxRetries, usize>(&mut docs);

    docs.push_str("\n## Web Server Configuration\n\n");
    push_doc::<web::BindAddress, String>(&mut docs);
    push_doc::<web::Port, u16>(&mut docs);

    docs.push_str("\n## MongoDB Configuration\n\n");
    push_doc::<mongodb::ConnectionString, String>(&mut docs);
    push_doc::<mongodb::DatabaseName, String>(&mut docs);

    docs
}

fn push_doc<V: EnvVar<T>, T: fmt::Debug>(docs: &mut String) {
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        V::NAME,
        V::DESCRIPTION,
        V::DEFAULT
    ));
}
