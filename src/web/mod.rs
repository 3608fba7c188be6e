//! Web 服务器模块
//!
//! 翻译与语言管理的 HTTP 接口

pub mod config;
pub mod handlers;
pub mod routes;
pub mod types;

pub use config::*;
pub use routes::*;
pub use types::*;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::cache::{CacheBackend, MemoryCacheBackend, TranslationCacheService};
use crate::error::{LocaleError, LocaleResult};
use crate::service::{LocaleService, TranslationService};
use crate::store::{MongoLocaleStore, MongoTranslationStore};

/// Web 服务器
pub struct WebServer {
    config: WebConfig,
}

impl WebServer {
    /// 创建新的 Web 服务器
    pub fn new(config: WebConfig) -> Self {
        Self { config }
    }

    /// 连接存储与缓存，初始化默认语言，构建应用状态
    pub async fn build_state(&self) -> LocaleResult<Arc<AppState>> {
        let client = mongodb::Client::with_uri_str(&self.config.mongo.connection_string).await?;
        let database = client.database(&self.config.mongo.database_name);
        tracing::info!("MongoDB 已连接: {}", self.config.mongo.database_name);

        let translation_store = MongoTranslationStore::new(&database);
        translation_store.ensure_indexes().await?;
        let locale_store = MongoLocaleStore::new(&database);
        locale_store.ensure_indexes().await?;

        let backend = self.cache_backend().await;
        let cache = Arc::new(TranslationCacheService::new(
            backend,
            self.config.cache.clone(),
        ));

        let translations = Arc::new(TranslationService::new(
            Arc::new(translation_store),
            cache,
            self.config.store,
        ));
        let locales = Arc::new(LocaleService::new(
            Arc::new(locale_store),
            self.config.locale.clone(),
        ));

        locales.seed_defaults().await?;

        Ok(Arc::new(AppState {
            translations,
            locales,
        }))
    }

    /// 选择缓存后端；Redis 不可用时退回内存缓存
    async fn cache_backend(&self) -> Arc<dyn CacheBackend> {
        match self.config.cache_backend {
            #[cfg(feature = "redis-cache")]
            CacheBackendConfig::Redis { ref url } => {
                match crate::cache::RedisCacheBackend::connect(url).await {
                    Ok(backend) => match backend.ping().await {
                        Ok(()) => {
                            tracing::info!("Redis 缓存连接成功: {}", url);
                            return Arc::new(backend);
                        }
                        Err(e) => tracing::warn!("Redis 连接失败，使用内存缓存: {}", e),
                    },
                    Err(e) => tracing::warn!("无法初始化 Redis 缓存，使用内存缓存: {}", e),
                }
            }
            #[cfg(not(feature = "redis-cache"))]
            CacheBackendConfig::Redis { .. } => {
                tracing::warn!("未启用 redis-cache 特性，使用内存缓存");
            }
            CacheBackendConfig::Memory => {}
        }

        tracing::info!("使用内存缓存");
        let backend = Arc::new(MemoryCacheBackend::new());
        spawn_cleanup(backend.clone(), self.config.cache.map_ttl);
        backend
    }

    /// 启动 Web 服务器
    pub async fn start(&self) -> LocaleResult<()> {
        let app_state = self.build_state().await?;
        let app = create_router(app_state);

        let listener = tokio::net::TcpListener::bind(self.config.listen_addr())
            .await
            .map_err(|e| LocaleError::Config(format!("Failed to bind server: {}", e)))?;

        tracing::info!("Web server starting at http://{}", self.config.listen_addr());

        axum::serve(listener, app)
            .await
            .map_err(|e| LocaleError::Config(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// 定期清理内存缓存中的过期条目
fn spawn_cleanup(backend: Arc<MemoryCacheBackend>, period: std::time::Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period.max(std::time::Duration::from_secs(1)));
        loop {
            interval.tick().await;
            backend.cleanup_expired().await;
        }
    });
}

/// 创建路由器
pub fn create_router(app_state: Arc<AppState>) -> Router {
    create_routes()
        .with_state(app_state)
        .layer(CorsLayer::permissive())
}
