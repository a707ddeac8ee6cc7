//! Configuration Module
//!
//! 服务地址、路由目录与日志配置，来源优先级：
//! 环境变量（`FSROUTE_*`）> 配置文件（`fsroute.toml`）> 默认值

mod loader;
mod types;

pub use loader::{load_config, load_config_from_path, print_config, ConfigError};
pub use types::{AppConfig, LogConfig, RoutesConfig, ServerConfig};
