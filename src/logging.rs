//! Logging
//!
//! 初始化 tracing 订阅者；`RUST_LOG` 优先于配置中的日志级别

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// 默认过滤规则
pub fn default_filter(config: &LogConfig) -> String {
    format!(
        "{},fsroute={},tower_http=debug",
        config.level, config.level
    )
}

/// 安装全局订阅者
///
/// 已安装时返回错误，不会覆盖已有订阅者
pub fn init_tracing(config: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        let config = LogConfig {
            level: "debug".to_string(),
            json: false,
        };
        assert_eq!(default_filter(&config), "debug,fsroute=debug,tower_http=debug");
    }

    #[test]
    fn test_second_init_is_rejected() {
        let config = LogConfig::default();
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
