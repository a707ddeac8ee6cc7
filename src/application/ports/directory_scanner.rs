//! Directory Scanner Port - 目录递归枚举

use std::io;
use std::path::Path;

use async_trait::async_trait;

/// Directory Scanner Port
///
/// 返回 `root` 下所有条目（文件与中间目录）的相对路径，分隔符统一为 `/`
#[async_trait]
pub trait DirectoryScanner: Send + Sync {
    async fn scan(&self, root: &Path) -> io::Result<Vec<String>>;
}
