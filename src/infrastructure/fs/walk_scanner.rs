//! WalkDir Scanner - 基于 walkdir 的目录递归枚举
//!
//! 实现 DirectoryScanner trait；遍历在阻塞线程池中执行

use std::io;
use std::path::{Component, Path};

use async_trait::async_trait;
use walkdir::WalkDir;

use crate::application::ports::DirectoryScanner;

/// 递归枚举目录，同一目录下按文件名排序
#[derive(Debug, Clone, Default)]
pub struct WalkDirScanner {
    follow_links: bool,
}

impl WalkDirScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// 是否跟随符号链接
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }
}

#[async_trait]
impl DirectoryScanner for WalkDirScanner {
    async fn scan(&self, root: &Path) -> io::Result<Vec<String>> {
        let root = root.to_path_buf();
        let follow_links = self.follow_links;

        tokio::task::spawn_blocking(move || walk(&root, follow_links))
            .await
            .map_err(io::Error::other)?
    }
}

fn walk(root: &Path, follow_links: bool) -> io::Result<Vec<String>> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .follow_links(follow_links)
        .sort_by_file_name()
    {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        entries.push(to_slash_path(relative));
    }

    tracing::debug!(root = %root.display(), entries = entries.len(), "Scanned route directory");

    Ok(entries)
}

/// 以 `/` 连接路径组件
fn to_slash_path(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
