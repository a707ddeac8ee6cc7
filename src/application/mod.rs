//! 应用层 - 用例编排
//!
//! 包含：
//! - module: 路由模块导出表、用户处理器与返回值
//! - handler: 响应归一化（method handler）
//! - attach: 路由发现与挂载
//! - error: 错误类型与分类
//! - ports: 文件系统、模块加载、路由器端口

pub mod attach;
pub mod error;
pub mod handler;
pub mod module;
pub mod ports;

pub use attach::{LoadFailure, Registration, RouteAttacher, SweepReport};
pub use error::{
    classify_error, is_known_error, validate, ErrorClass, KnownError, StatusError, StatusKind,
    StatusOptions, ThrownValue, ValidationError, ValidationIssue,
};
pub use handler::{method_handler, normalize_reply, MethodHandler};
pub use module::{Export, Handler, HandlerError, Reply, RouteModule, DEFAULT_EXPORT};
pub use ports::{loader_fn, DirectoryScanner, LoadError, ModuleLoader, RouteRegistrar};
