//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod fs;
pub mod http;
pub mod loader;

pub use fs::WalkDirScanner;
pub use http::{
    attach_routes, attach_routes_with, attach_routes_with_config, Attachment, DynamicRouter,
    HttpServer,
};
pub use loader::ModuleRegistry;
