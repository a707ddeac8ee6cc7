//! Route Path Resolver
//!
//! 根据路由文件的相对位置推导 URL 路径：
//! - `users/route.ts`        → `/users`
//! - `api/v1/products/route.js` → `/api/v1/products`
//! - `route.ts`              → `/`
//!
//! 纯函数，无副作用；不匹配的文件返回 `None`，不会被加载。

use std::fmt;

/// 路由文件名前缀（`route.<ext>`）
pub const ROUTE_FILE_STEM: &str = "route";

/// 路由文件匹配规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteFilePattern {
    extensions: Vec<String>,
}

impl Default for RouteFilePattern {
    fn default() -> Self {
        Self::new(["ts", "js"])
    }
}

impl RouteFilePattern {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// 文件名是否为 `route.<ext>`（大小写敏感）
    pub fn matches(&self, file_name: &str) -> bool {
        file_name
            .strip_prefix(ROUTE_FILE_STEM)
            .and_then(|rest| rest.strip_prefix('.'))
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    /// 推导路由路径
    pub fn resolve(&self, relative: &str) -> Option<RoutePath> {
        let normalized = relative.replace('\\', "/");
        let (dir, file_name) = match normalized.rsplit_once('/') {
            Some((dir, file_name)) => (dir, file_name),
            None => ("", normalized.as_str()),
        };

        if !self.matches(file_name) {
            return None;
        }

        let dir = dir.trim_start_matches('/').trim_end_matches('/');
        Some(RoutePath(format!("/{}", dir)))
    }
}

/// 由路由文件推导出的 URL 路径，总以 `/` 开头，除根路径外不以 `/` 结尾
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutePath(String);

impl RoutePath {
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// 校验已是规范形式的 URL 路径：以 `/` 开头，无 `//`，除根路径外不以 `/` 结尾
    pub fn parse(path: &str) -> Option<Self> {
        let well_formed = path.starts_with('/')
            && !path.contains("//")
            && !path.contains('\\')
            && (path == "/" || !path.ends_with('/'));
        well_formed.then(|| Self(path.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RoutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RoutePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 使用给定规则解析相对路径
pub fn resolve_route_path(relative: &str, pattern: &RouteFilePattern) -> Option<RoutePath> {
    pattern.resolve(relative)
}
