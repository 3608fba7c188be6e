//! Web 服务器主程序入口

use locale_service::env::{generate_env_docs, EnvConfig};
use locale_service::web::{WebConfig, WebServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::args().any(|arg| arg == "--env-docs") {
        println!("{}", generate_env_docs());
        return Ok(());
    }

    // .env 文件可选
    dotenv::dotenv().ok();

    let env_config = EnvConfig::from_env()?;
    env_config.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("locale_service={}", env_config.log_level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let web_config = WebConfig::from_env_config(&env_config);
    web_config.validate()?;

    tracing::info!(
        "启动语言服务 (模式: {}, 默认语言: {})",
        env_config.mode,
        env_config.default_locale
    );

    let server = WebServer::new(web_config);
    server.start().await?;

    Ok(())
}
