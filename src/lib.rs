//! fsroute - 基于目录约定的 axum 路由挂载
//!
//! 扫描目录中的 `route.ts` / `route.js`，按文件位置推导 URL 路径，
//! 将模块导出的 `GET` / `POST` / `PUT` / `PATCH` / `DELETE` 处理器注册到路由器。
//!
//! 领域层 (domain/):
//! - HTTP 方法集合、路由文件 → URL 路径推导
//!
//! 应用层 (application/):
//! - 路由模块模型、响应归一化、错误分类、路由挂载
//! - Ports: DirectoryScanner, ModuleLoader, RouteRegistrar
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: 动态路由器、错误处理器、中间件、服务器
//! - fs: walkdir 目录枚举
//! - loader: 进程内模块注册表

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;

pub use application::{
    method_handler, Export, Handler, HandlerError, MethodHandler, Reply, RouteModule,
    StatusError, SweepReport,
};
pub use config::{load_config, AppConfig};
pub use domain::{HttpMethod, RouteFilePattern, RoutePath};
pub use infrastructure::{
    attach_routes, attach_routes_with_config, http::app_error_handler, Attachment,
    DynamicRouter, HttpServer, ModuleRegistry,
};
