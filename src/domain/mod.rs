//! Domain Layer - 领域层
//!
//! 路由约定的纯逻辑：
//! - method: 固定的 HTTP 方法集合
//! - route_path: 路由文件 → URL 路径推导

pub mod method;
pub mod route_path;

pub use method::HttpMethod;
pub use route_path::{resolve_route_path, RouteFilePattern, RoutePath, ROUTE_FILE_STEM};
