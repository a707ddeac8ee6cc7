//! HTTP Layer - axum 适配
//!
//! - router: 可后台填充的动态路由器与 `attach_routes`
//! - error: 终端错误处理器
//! - middleware: 状态码日志
//! - server: 服务启动

pub mod error;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::{app_error_handler, ErrorResponse, UNKNOWN_ERROR_MESSAGE};
pub use router::{
    attach_routes, attach_routes_with, attach_routes_with_config, Attachment, DynamicRouter,
    ErrorStage,
};
pub use server::HttpServer;
