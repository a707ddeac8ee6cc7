//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::RouteFilePattern;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 路由目录配置
    #[serde(default)]
    pub routes: RoutesConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 路由目录配置
#[derive(Debug, Clone, Deserialize)]
pub struct RoutesConfig {
    /// 扫描的根目录
    #[serde(default = "default_routes_dir")]
    pub dir: PathBuf,

    /// `route.<ext>` 允许的扩展名
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// 扫描时跟随符号链接
    #[serde(default)]
    pub follow_links: bool,
}

fn default_routes_dir() -> PathBuf {
    PathBuf::from("routes")
}

fn default_extensions() -> Vec<String> {
    RouteFilePattern::default().extensions().to_vec()
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            dir: default_routes_dir(),
            extensions: default_extensions(),
            follow_links: false,
        }
    }
}

impl RoutesConfig {
    pub fn pattern(&self) -> RouteFilePattern {
        RouteFilePattern::new(self.extensions.iter().cloned())
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
