//! Application Ports - 出站端口定义
//!
//! 定义路由挂载与文件系统、模块系统、路由器之间的抽象接口

mod directory_scanner;
mod module_loader;
mod route_registrar;

pub use directory_scanner::DirectoryScanner;
pub use module_loader::{loader_fn, FnLoader, LoadError, ModuleLoader};
pub use route_registrar::RouteRegistrar;
