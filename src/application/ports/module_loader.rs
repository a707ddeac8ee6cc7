//! Module Loader Port - 路由模块加载抽象
//!
//! 将路由文件路径解析为 [`RouteModule`]，具体实现在 infrastructure/loader 层

use std::future::Future;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::application::module::RouteModule;

/// 模块加载错误
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Module not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to load module {}: {reason}", .path.display())]
    Failed { path: PathBuf, reason: String },
}

impl LoadError {
    pub fn failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Failed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Module Loader Port
///
/// `path` 为路由目录与相对路径拼接后的完整路径，
/// `relative` 为相对于路由目录、以 `/` 分隔的路径（如 `users/route.ts`）
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    async fn load(&self, path: &Path, relative: &str) -> Result<RouteModule, LoadError>;
}

/// 由异步闭包实现的加载器
pub struct FnLoader<F> {
    f: F,
}

/// 将 `Fn(PathBuf) -> Future<Output = Result<RouteModule, LoadError>>` 包装为加载器
pub fn loader_fn<F, Fut>(f: F) -> FnLoader<F>
where
    F: Fn(PathBuf) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<RouteModule, LoadError>> + Send + 'static,
{
    FnLoader { f }
}

#[async_trait]
impl<F, Fut> ModuleLoader for FnLoader<F>
where
    F: Fn(PathBuf) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<RouteModule, LoadError>> + Send + 'static,
{
    async fn load(&self, path: &Path, _relative: &str) -> Result<RouteModule, LoadError> {
        (self.f)(path.to_path_buf()).await
    }
}
