//! Route Attacher - 路由发现与挂载
//!
//! 流程：目录枚举 → 路径推导 → 模块加载 → 按方法注册
//!
//! 文件按枚举顺序逐个处理，同一文件内按 GET, POST, PUT, PATCH, DELETE 注册。
//! 单个文件加载失败只跳过该文件；枚举失败则本轮不注册任何路由。
//! 两种失败都记录日志并写入 [`SweepReport`]，不会向调用方抛出。

use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::task::JoinHandle;

use super::handler::{method_handler, panic_message};
use super::ports::{DirectoryScanner, ModuleLoader, RouteRegistrar};
use crate::domain::{HttpMethod, RouteFilePattern, RoutePath};

/// 一次成功的注册
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub method: HttpMethod,
    pub path: RoutePath,
}

/// 加载失败的路由文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    /// 相对于路由目录的文件路径
    pub file: String,
    pub error: String,
}

/// 一轮挂载的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub registered: Vec<Registration>,
    pub failures: Vec<LoadFailure>,
    pub scan_error: Option<String>,
    /// 后台挂载任务 panic 或被取消
    pub task_error: Option<String>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.scan_error.is_none() && self.task_error.is_none()
    }
}

/// 路由挂载器
#[derive(Clone)]
pub struct RouteAttacher {
    scanner: Arc<dyn DirectoryScanner>,
    loader: Arc<dyn ModuleLoader>,
    pattern: RouteFilePattern,
}

impl RouteAttacher {
    pub fn new(
        scanner: impl DirectoryScanner + 'static,
        loader: impl ModuleLoader + 'static,
    ) -> Self {
        Self::from_arcs(Arc::new(scanner), Arc::new(loader))
    }

    pub fn from_arcs(scanner: Arc<dyn DirectoryScanner>, loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            scanner,
            loader,
            pattern: RouteFilePattern::default(),
        }
    }

    /// 替换路由文件匹配规则
    pub fn with_pattern(mut self, pattern: RouteFilePattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn pattern(&self) -> &RouteFilePattern {
        &self.pattern
    }

    /// 在后台任务中挂载，立即返回
    ///
    /// # Panics
    ///
    /// 必须在 tokio 运行时内调用
    pub fn spawn<R>(
        self,
        directory: impl Into<PathBuf>,
        registrar: Arc<R>,
    ) -> JoinHandle<SweepReport>
    where
        R: RouteRegistrar + ?Sized + 'static,
    {
        let directory = directory.into();
        tokio::spawn(async move { self.sweep(&directory, registrar.as_ref()).await })
    }

    /// 扫描目录并注册所有路由
    pub async fn sweep<R>(&self, directory: &Path, registrar: &R) -> SweepReport
    where
        R: RouteRegistrar + ?Sized,
    {
        let mut report = SweepReport::default();

        let entries = match self.scanner.scan(directory).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(
                    directory = %directory.display(),
                    error = %e,
                    "Failed to scan route directory"
                );
                report.scan_error = Some(e.to_string());
                return report;
            }
        };

        for relative in entries {
            let Some(route_path) = self.pattern.resolve(&relative) else {
                continue;
            };

            let module_path = directory.join(&relative);
            let loaded = AssertUnwindSafe(self.loader.load(&module_path, &relative))
                .catch_unwind()
                .await;
            let module = match loaded {
                Ok(Ok(module)) => module,
                Ok(Err(e)) => {
                    tracing::warn!(file = %relative, error = %e, "Failed to load route module");
                    report.failures.push(LoadFailure {
                        file: relative,
                        error: e.to_string(),
                    });
                    continue;
                }
                Err(payload) => {
                    let error = format!("loader panicked: {}", panic_message(payload.as_ref()));
                    tracing::error!(
                        file = %relative,
                        error = %error,
                        "Route module loader panicked"
                    );
                    report.failures.push(LoadFailure {
                        file: relative,
                        error,
                    });
                    continue;
                }
            };

            for method in HttpMethod::ALL {
                let Some(handler) = module.handler_for(method) else {
                    continue;
                };

                tracing::info!(
                    method = %method,
                    path = %route_path,
                    "Attaching {} {}",
                    method,
                    route_path
                );
                registrar.register(method, &route_path, method_handler(handler.clone()));
                report.registered.push(Registration {
                    method,
                    path: route_path.clone(),
                });
            }
        }

        tracing::debug!(
            directory = %directory.display(),
            registered = report.registered.len(),
            failures = report.failures.len(),
            "Route sweep finished"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handler::MethodHandler;
    use crate::application::module::{Export, Handler, HandlerError, RouteModule};
    use crate::application::ports::{loader_fn, LoadError};
    use async_trait::async_trait;
    use axum::extract::Request;
    use std::io;
    use std::sync::Mutex;

    /// 固定返回给定条目的扫描器
    struct FixedListing(Result<Vec<String>, io::ErrorKind>);

    impl FixedListing {
        fn of(entries: &[&str]) -> Self {
            Self(Ok(entries.iter().map(|s| s.to_string()).collect()))
        }
    }

    #[async_trait]
    impl DirectoryScanner for FixedListing {
        async fn scan(&self, _root: &Path) -> io::Result<Vec<String>> {
            self.0.clone().map_err(io::Error::from)
        }
    }

    /// 记录注册调用的路由器
    #[derive(Default)]
    struct RecordingRegistrar {
        calls: Mutex<Vec<(String, String)>>,
    }

    impl RecordingRegistrar {
        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl RouteRegistrar for RecordingRegistrar {
        fn register(&self, method: HttpMethod, path: &RoutePath, _handler: MethodHandler) {
            self.calls
                .lock()
                .unwrap()
                .push((method.as_lower().to_string(), path.to_string()));
        }
    }

    fn noop() -> Handler {
        Handler::new(|_req: Request| async { Ok::<_, HandlerError>(()) })
    }

    fn call(method: &str, path: &str) -> (String, String) {
        (method.to_string(), path.to_string())
    }

    /// 按路径后缀返回模块，未知路径返回空模块
    fn modules(table: Vec<(&'static str, RouteModule)>) -> impl ModuleLoader {
        let table = Arc::new(table);
        loader_fn(move |path: PathBuf| {
            let table = table.clone();
            async move {
                Ok(table
                    .iter()
                    .find(|(suffix, _)| path.ends_with(suffix))
                    .map(|(_, module)| module.clone())
                    .unwrap_or_default())
            }
        })
    }

    async fn sweep(
        listing: FixedListing,
        loader: impl ModuleLoader + 'static,
    ) -> (SweepReport, Vec<(String, String)>) {
        let registrar = Arc::new(RecordingRegistrar::default());
        let report = RouteAttacher::new(listing, loader)
            .spawn("./routes", registrar.clone())
            .await
            .unwrap();
        (report, registrar.calls())
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let (report, calls) = sweep(FixedListing::of(&[]), modules(vec![])).await;
        assert!(calls.is_empty());
        assert_eq!(report, SweepReport::default());
    }

    #[tokio::test]
    async fn test_attach_direct_and_default_exports() {
        let loader = modules(vec![
            (
                "users/route.ts",
                RouteModule::new()
                    .method(HttpMethod::Post, noop())
                    .method(HttpMethod::Get, noop()),
            ),
            (
                "products/route.js",
                RouteModule::new().with_default(
                    RouteModule::new()
                        .method(HttpMethod::Delete, noop())
                        .method(HttpMethod::Put, noop()),
                ),
            ),
        ]);

        let (report, calls) = sweep(
            FixedListing::of(&["users", "users/route.ts", "products", "products/route.js"]),
            loader,
        )
        .await;

        assert_eq!(
            calls,
            vec![
                call("get", "/users"),
                call("post", "/users"),
                call("put", "/products"),
                call("delete", "/products"),
            ]
        );
        assert_eq!(report.registered.len(), 4);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_non_route_files_are_not_loaded() {
        let loaded = Arc::new(Mutex::new(Vec::new()));
        let seen = loaded.clone();
        let loader = loader_fn(move |path: PathBuf| {
            seen.lock().unwrap().push(path);
            async { Ok(RouteModule::new().method(HttpMethod::Get, noop())) }
        });

        let (_, calls) = sweep(
            FixedListing::of(&["users/index.ts", "products/route.ts"]),
            loader,
        )
        .await;

        assert_eq!(calls, vec![call("get", "/products")]);
        assert_eq!(
            *loaded.lock().unwrap(),
            vec![PathBuf::from("./routes/products/route.ts")]
        );
    }

    #[tokio::test]
    async fn test_nested_paths() {
        let loader = modules(vec![
            ("users/admin/route.ts", RouteModule::new().method(HttpMethod::Get, noop())),
            (
                "api/v1/products/route.js",
                RouteModule::new().method(HttpMethod::Post, noop()),
            ),
            ("route.ts", RouteModule::new().method(HttpMethod::Patch, noop())),
        ]);

        let (_, calls) = sweep(
            FixedListing::of(&["users/admin/route.ts", "api/v1/products/route.js", "route.ts"]),
            loader,
        )
        .await;

        assert_eq!(
            calls,
            vec![
                call("get", "/users/admin"),
                call("post", "/api/v1/products"),
                call("patch", "/"),
            ]
        );
    }

    #[tokio::test]
    async fn test_default_export_shadows_direct_export() {
        let loader = modules(vec![(
            "both/route.ts",
            RouteModule::new()
                .method(HttpMethod::Post, noop())
                .method(HttpMethod::Get, noop())
                .with_default(RouteModule::new().method(HttpMethod::Post, noop())),
        )]);

        let (_, calls) = sweep(FixedListing::of(&["both/route.ts"]), loader).await;
        assert_eq!(calls, vec![call("post", "/both")]);
    }

    #[tokio::test]
    async fn test_non_callable_exports_are_skipped() {
        let loader = modules(vec![(
            "odd/route.ts",
            RouteModule::new()
                .export("GET", Export::Value(serde_json::json!({ "not": "callable" })))
                .method(HttpMethod::Put, noop()),
        )]);

        let (_, calls) = sweep(FixedListing::of(&["odd/route.ts"]), loader).await;
        assert_eq!(calls, vec![call("put", "/odd")]);
    }

    #[tokio::test]
    async fn test_load_failure_skips_only_that_file() {
        let loader = loader_fn(|path: PathBuf| async move {
            if path.ends_with("broken/route.ts") {
                Err(LoadError::failed(&path, "syntax error"))
            } else {
                Ok(RouteModule::new().method(HttpMethod::Get, noop()))
            }
        });

        let (report, calls) = sweep(
            FixedListing::of(&["a/route.ts", "broken/route.ts", "b/route.js"]),
            loader,
        )
        .await;

        assert_eq!(calls, vec![call("get", "/a"), call("get", "/b")]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].file, "broken/route.ts");
        assert!(report.failures[0].error.contains("syntax error"));
    }

    #[tokio::test]
    async fn test_loader_panic_skips_only_that_file() {
        let loader = loader_fn(|path: PathBuf| async move {
            if path.ends_with("b/route.ts") {
                panic!("loader exploded");
            }
            Ok(RouteModule::new().method(HttpMethod::Get, noop()))
        });

        let (report, calls) = sweep(
            FixedListing::of(&["a/route.ts", "b/route.ts", "c/route.ts"]),
            loader,
        )
        .await;

        assert_eq!(calls, vec![call("get", "/a"), call("get", "/c")]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].file, "b/route.ts");
        assert!(report.failures[0].error.contains("loader exploded"));
        assert!(report.task_error.is_none());
    }

    #[tokio::test]
    async fn test_scan_failure_is_reported_not_raised() {
        let (report, calls) = sweep(
            FixedListing(Err(io::ErrorKind::NotFound)),
            modules(vec![]),
        )
        .await;

        assert!(calls.is_empty());
        assert!(report.scan_error.is_some());
        assert!(!report.is_clean());
    }

    #[tokio::test]
    async fn test_custom_pattern() {
        let loader = modules(vec![(
            "health/route.rs",
            RouteModule::new().method(HttpMethod::Get, noop()),
        )]);
        let registrar = Arc::new(RecordingRegistrar::default());

        RouteAttacher::new(FixedListing::of(&["health/route.rs", "users/route.ts"]), loader)
            .with_pattern(RouteFilePattern::new(["rs"]))
            .spawn("routes", registrar.clone())
            .await
            .unwrap();

        assert_eq!(registrar.calls(), vec![call("get", "/health")]);
    }
}
