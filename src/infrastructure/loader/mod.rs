//! 模块加载适配

mod registry;

pub use registry::ModuleRegistry;
