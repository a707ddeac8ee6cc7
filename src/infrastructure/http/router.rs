//! Dynamic Router
//!
//! 可在路由挂载完成前交给调用方组合的路由器：
//! axum `Router` 的 fallback 转发到共享的路由表，后台挂载任务追加注册即时生效。

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use axum::{
    extract::Request,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use dashmap::DashMap;
use tokio::task::JoinHandle;

use super::error::{app_error_handler, ErrorResponse};
use crate::application::{
    HandlerError, MethodHandler, ModuleLoader, Registration, RouteAttacher, RouteRegistrar,
    SweepReport,
};
use crate::config::RoutesConfig;
use crate::domain::{HttpMethod, RouteFilePattern, RoutePath};
use crate::infrastructure::fs::WalkDirScanner;

/// 错误处理阶段
pub type ErrorStage = Arc<dyn Fn(HandlerError) -> Response + Send + Sync>;

#[derive(Default)]
struct RouteTable {
    /// path -> (method -> handler)
    routes: DashMap<String, DashMap<HttpMethod, MethodHandler>>,
    /// 按注册顺序记录
    log: RwLock<Vec<Registration>>,
}

/// 动态路由器
#[derive(Clone)]
pub struct DynamicRouter {
    table: Arc<RouteTable>,
    error_stage: ErrorStage,
}

impl Default for DynamicRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicRouter {
    pub fn new() -> Self {
        Self {
            table: Arc::new(RouteTable::default()),
            error_stage: Arc::new(app_error_handler),
        }
    }

    /// 替换处理器错误的下一阶段（默认为 [`app_error_handler`]）
    pub fn with_error_stage<F>(mut self, stage: F) -> Self
    where
        F: Fn(HandlerError) -> Response + Send + Sync + 'static,
    {
        self.error_stage = Arc::new(stage);
        self
    }

    /// 已注册的路由（按注册顺序）
    pub fn registrations(&self) -> Vec<Registration> {
        self.table
            .log
            .read()
            .map(|log| log.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// 某路径已注册的方法（规范顺序）
    pub fn allowed_methods(&self, path: &str) -> Vec<HttpMethod> {
        let Some(methods) = self.table.routes.get(path) else {
            return Vec::new();
        };
        let mut allowed: Vec<_> = methods.iter().map(|entry| *entry.key()).collect();
        allowed.sort();
        allowed
    }

    /// 分发请求
    pub async fn dispatch(&self, request: Request) -> Response {
        let path = normalize_request_path(request.uri().path());

        let handler = {
            let Some(methods) = self.table.routes.get(&path) else {
                return not_found();
            };
            HttpMethod::from_http(request.method())
                .and_then(|method| methods.get(&method).map(|h| h.value().clone()))
        };

        let Some(handler) = handler else {
            return method_not_allowed(&self.allowed_methods(&path));
        };

        match handler.call(request).await {
            Ok(response) => response,
            Err(err) => (self.error_stage)(err),
        }
    }

    /// 转换为 axum Router，可与其他路由组合
    pub fn into_router<S>(self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        Router::new().fallback(move |request: Request| {
            let router = self.clone();
            async move { router.dispatch(request).await }
        })
    }
}

impl RouteRegistrar for DynamicRouter {
    fn register(&self, method: HttpMethod, path: &RoutePath, handler: MethodHandler) {
        let methods = self.table.routes.entry(path.to_string()).or_default();
        if methods.insert(method, handler).is_some() {
            tracing::warn!(
                method = %method,
                path = %path,
                "Route registered twice, replacing handler"
            );
        }
        drop(methods);

        let registration = Registration {
            method,
            path: path.clone(),
        };
        match self.table.log.write() {
            Ok(mut log) => log.push(registration),
            Err(poisoned) => poisoned.into_inner().push(registration),
        }
    }
}

/// 去掉末尾 `/`（根路径除外）
fn normalize_request_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found"))).into_response()
}

fn method_not_allowed(allowed: &[HttpMethod]) -> Response {
    let allow = allowed
        .iter()
        .map(|m| m.export_name())
        .collect::<Vec<_>>()
        .join(", ");

    let mut response = (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new("Method not allowed")),
    )
        .into_response();
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}

// ============================================================================
// attach_routes
// ============================================================================

/// 进行中的路由挂载
pub struct Attachment {
    router: DynamicRouter,
    sweep: JoinHandle<SweepReport>,
}

impl Attachment {
    /// 立即可用的路由器；路由在后台陆续注册
    pub fn router(&self) -> DynamicRouter {
        self.router.clone()
    }

    /// 等待后台挂载结束
    pub async fn finished(self) -> SweepReport {
        match self.sweep.await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(error = %e, "Route sweep task failed");
                SweepReport {
                    task_error: Some(e.to_string()),
                    ..SweepReport::default()
                }
            }
        }
    }

    pub fn into_parts(self) -> (DynamicRouter, JoinHandle<SweepReport>) {
        (self.router, self.sweep)
    }
}

/// 扫描 `directory` 下的 `route.ts` / `route.js` 并挂载到新的路由器
///
/// 立即返回，注册在后台任务中完成；须在 tokio 运行时内调用
pub fn attach_routes(
    directory: impl Into<PathBuf>,
    loader: impl ModuleLoader + 'static,
) -> Attachment {
    attach_routes_with(directory, loader, RouteFilePattern::default())
}

/// 按配置中的目录、扩展名与符号链接策略挂载
pub fn attach_routes_with_config(
    config: &RoutesConfig,
    loader: impl ModuleLoader + 'static,
) -> Attachment {
    let scanner = WalkDirScanner::new().follow_links(config.follow_links);
    attach(
        RouteAttacher::new(scanner, loader).with_pattern(config.pattern()),
        config.dir.clone(),
    )
}

/// 使用自定义路由文件规则挂载
pub fn attach_routes_with(
    directory: impl Into<PathBuf>,
    loader: impl ModuleLoader + 'static,
    pattern: RouteFilePattern,
) -> Attachment {
    attach(
        RouteAttacher::new(WalkDirScanner::new(), loader).with_pattern(pattern),
        directory.into(),
    )
}

fn attach(attacher: RouteAttacher, directory: PathBuf) -> Attachment {
    let router = DynamicRouter::new();
    let sweep = attacher.spawn(directory, Arc::new(router.clone()));

    Attachment { router, sweep }
}
