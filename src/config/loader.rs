//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（fsroute.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["fsroute", "fsroute.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "FSROUTE";

/// 加载应用配置
///
/// # 环境变量示例
/// - `FSROUTE_SERVER__PORT=8080`
/// - `FSROUTE_ROUTES__DIR=/srv/app/routes`
/// - `FSROUTE_ROUTES__EXTENSIONS=ts,js,mjs`
/// - `FSROUTE_ROUTES__FOLLOW_LINKS=true`
/// - `FSROUTE_LOG__LEVEL=debug`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// `config_path` 为 None 时搜索默认配置文件（可缺失）
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000)?
        .set_default("routes.dir", "routes")?
        .set_default("routes.follow_links", false)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量，层级分隔符为 __
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("routes.extensions"),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.routes.dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Routes directory cannot be empty".to_string(),
        ));
    }

    if config.routes.extensions.is_empty() {
        return Err(ConfigError::ValidationError(
            "At least one route file extension is required".to_string(),
        ));
    }

    if let Some(ext) = config
        .routes
        .extensions
        .iter()
        .find(|ext| ext.is_empty() || ext.contains('.') || ext.contains('/'))
    {
        return Err(ConfigError::ValidationError(format!(
            "Invalid route file extension: {:?}",
            ext
        )));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Routes Directory: {:?}", config.routes.dir);
    tracing::info!("Route Files: route.{{{}}}", config.routes.extensions.join(","));
    tracing::info!("Follow Symlinks: {}", config.routes.follow_links);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
