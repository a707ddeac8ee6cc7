//! Module Registry - 进程内模块表
//!
//! 路由文件在磁盘上标记路由位置，模块内容由注册表提供：
//! 以相对于路由目录的路径登记模块，加载时按相对路径精确匹配。

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;

use crate::application::module::RouteModule;
use crate::application::ports::{LoadError, ModuleLoader};

#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, RouteModule>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以相对路径（如 `users/route.ts`）登记模块
    pub fn register(mut self, relative: impl AsRef<str>, module: RouteModule) -> Self {
        self.insert(relative, module);
        self
    }

    pub fn insert(&mut self, relative: impl AsRef<str>, module: RouteModule) {
        let key = normalize_key(relative.as_ref());
        if self.modules.insert(key.clone(), module).is_some() {
            tracing::warn!(module = %key, "Module registered twice, replacing");
        }
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    fn lookup(&self, relative: &str) -> Option<&RouteModule> {
        self.modules.get(&normalize_key(relative))
    }
}

/// `\` 统一为 `/`，去掉开头的 `./` 与 `/`
fn normalize_key(relative: &str) -> String {
    let slashed = relative.replace('\\', "/");
    let mut key = slashed.as_str();
    loop {
        if let Some(rest) = key.strip_prefix("./") {
            key = rest;
        } else if let Some(rest) = key.strip_prefix('/') {
            key = rest;
        } else {
            break;
        }
    }
    key.to_string()
}

#[async_trait]
impl ModuleLoader for ModuleRegistry {
    async fn load(&self, path: &Path, relative: &str) -> Result<RouteModule, LoadError> {
        self.lookup(relative)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(path.to_path_buf()))
    }
}
