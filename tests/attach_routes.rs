//! 端到端：磁盘上的路由文件 + 模块注册表 + 动态路由器

use std::path::Path;

use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Router;
use fsroute::application::{loader_fn, LoadError, ThrownValue};
use fsroute::config::RoutesConfig;
use fsroute::infrastructure::http::attach_routes_with;
use fsroute::{
    attach_routes, attach_routes_with_config, Handler, HandlerError, HttpMethod,
    ModuleRegistry, RouteFilePattern, RouteModule, StatusError,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt;

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"export {}").unwrap();
}

fn request(method: &str, uri: &str) -> Request {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn registry() -> ModuleRegistry {
    ModuleRegistry::new()
        .register(
            "users/route.ts",
            RouteModule::new()
                .method(
                    HttpMethod::Get,
                    Handler::new(|_req: Request| async {
                        Ok::<_, HandlerError>(json!([{ "id": 1 }, { "id": 2 }]))
                    }),
                )
                .method(
                    HttpMethod::Post,
                    Handler::new(|_req: Request| async {
                        Err::<(), _>(StatusError::unauthorized())
                    }),
                ),
        )
        .register(
            "products/route.js",
            RouteModule::new().with_default(
                RouteModule::new()
                    .method(
                        HttpMethod::Put,
                        Handler::new(|_req: Request| async {
                            Ok::<_, HandlerError>(json!({ "updated": true }))
                        }),
                    )
                    .method(
                        HttpMethod::Delete,
                        Handler::new(|_req: Request| async {
                            let thrown = json!({ "statusCode": 409, "message": "in use" });
                            Err::<(), _>(ThrownValue(thrown))
                        }),
                    ),
            ),
        )
        .register(
            "route.ts",
            RouteModule::new().method(
                HttpMethod::Get,
                Handler::new(|_req: Request| async { Ok::<_, HandlerError>("root") }),
            ),
        )
}

#[tokio::test]
async fn test_routes_attached_from_directory() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "users/route.ts");
    touch(dir.path(), "users/helpers.ts");
    touch(dir.path(), "products/route.js");
    touch(dir.path(), "route.ts");

    let attachment = attach_routes(dir.path(), registry());
    let app: Router = attachment.router().into_router();
    let report = attachment.finished().await;

    assert!(report.is_clean(), "{:?}", report);
    let registered: Vec<_> = report
        .registered
        .iter()
        .map(|r| format!("{} {}", r.method.as_lower(), r.path))
        .collect();
    assert_eq!(
        registered,
        ["put /products", "delete /products", "get /", "get /users", "post /users"]
    );

    let response = app.clone().oneshot(request("GET", "/users")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "data": [{ "id": 1 }, { "id": 2 }], "success": true })
    );

    let response = app.clone().oneshot(request("POST", "/users")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await, json!({ "message": "Unauthorized" }));

    let response = app.clone().oneshot(request("PUT", "/products")).await.unwrap();
    assert_eq!(
        body_json(response).await,
        json!({ "updated": true, "success": true })
    );

    let response = app.clone().oneshot(request("DELETE", "/products")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await, json!({ "message": "in use" }));

    let response = app.clone().oneshot(request("GET", "/")).await.unwrap();
    assert_eq!(body_json(response).await, json!({ "data": "root", "success": true }));

    let response = app.oneshot(request("GET", "/users/helpers")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_directory_still_returns_router() {
    let dir = TempDir::new().unwrap();
    let attachment = attach_routes(dir.path().join("missing"), registry());
    let app: Router = attachment.router().into_router();

    let report = attachment.finished().await;
    assert!(report.scan_error.is_some());
    assert!(report.registered.is_empty());

    let response = app.oneshot(request("GET", "/users")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unregistered_module_is_reported() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "orders/route.ts");
    touch(dir.path(), "route.ts");
    touch(dir.path(), "users/route.ts");

    let attachment = attach_routes(dir.path(), registry());
    let app: Router = attachment.router().into_router();
    let report = attachment.finished().await;

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].file, "orders/route.ts");
    assert!(report.registered.iter().all(|r| r.path.as_str() != "/orders"));
    assert_eq!(report.registered.len(), 3);

    let response = app.oneshot(request("GET", "/orders")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_injected_loader_and_pattern() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "health/route.rs");
    touch(dir.path(), "users/route.ts");

    let loader = loader_fn(|path: std::path::PathBuf| async move {
        if path.ends_with("health/route.rs") {
            Ok(RouteModule::new().method(
                HttpMethod::Get,
                Handler::new(|_req: Request| async {
                    Ok::<_, HandlerError>(json!({ "status": "ok" }))
                }),
            ))
        } else {
            Err(LoadError::NotFound(path))
        }
    });

    let attachment = attach_routes_with(dir.path(), loader, RouteFilePattern::new(["rs"]));
    let app: Router = attachment.router().into_router();
    let report = attachment.finished().await;
    assert!(report.is_clean());

    let response = app.oneshot(request("GET", "/health")).await.unwrap();
    assert_eq!(
        body_json(response).await,
        json!({ "status": "ok", "success": true })
    );
}

#[tokio::test]
async fn test_attach_from_routes_config() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "users/route.js");
    touch(dir.path(), "products/route.js");

    let config = RoutesConfig {
        dir: dir.path().to_path_buf(),
        extensions: vec!["js".to_string()],
        follow_links: false,
    };

    let report = attach_routes_with_config(&config, registry()).finished().await;
    let registered: Vec<_> = report
        .registered
        .iter()
        .map(|r| format!("{} {}", r.method, r.path))
        .collect();
    assert_eq!(registered, ["PUT /products", "DELETE /products"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].file, "users/route.js");
}
