//! Route Registrar Port - 路由注册抽象
//!
//! 路由器只接受追加注册，注册后不会撤销

use crate::application::handler::MethodHandler;
use crate::domain::{HttpMethod, RoutePath};

pub trait RouteRegistrar: Send + Sync {
    fn register(&self, method: HttpMethod, path: &RoutePath, handler: MethodHandler);
}
