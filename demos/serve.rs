//! fsroute 示例服务
//!
//! 路由文件位于 `demos/routes/`，处理器在进程内注册：
//!
//! ```sh
//! FSROUTE_ROUTES__DIR=demos/routes cargo run --example serve
//! ```

use axum::body::Bytes;
use axum::extract::Request;
use fsroute::application::{validate, StatusError};
use fsroute::config::print_config;
use fsroute::logging::init_tracing;
use fsroute::{
    attach_routes_with_config, load_config, Handler, HandlerError, HttpMethod, HttpServer,
    ModuleRegistry, RouteModule,
};
use garde::Validate;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize, Validate)]
struct NewUser {
    #[garde(length(min = 1, max = 64))]
    name: String,
    #[garde(email)]
    email: String,
}

fn registry() -> ModuleRegistry {
    ModuleRegistry::new()
        .register(
            "health/route.ts",
            RouteModule::new().method(
                HttpMethod::Get,
                Handler::new(|_req: Request| async {
                    Ok::<_, HandlerError>(json!({ "status": "ok" }))
                }),
            ),
        )
        .register(
            "users/route.ts",
            RouteModule::new().with_default(
                RouteModule::new()
                    .method(
                        HttpMethod::Get,
                        Handler::new(|_req: Request| async {
                            Ok::<_, HandlerError>(json!([{ "id": 1, "name": "ada" }]))
                        }),
                    )
                    .method(
                        HttpMethod::Post,
                        Handler::new(|req: Request| async move {
                            let body: Bytes = axum::body::to_bytes(req.into_body(), 64 * 1024)
                                .await
                                .map_err(|e| StatusError::new(e.to_string()))?;
                            let user: NewUser = serde_json::from_slice(&body)
                                .map_err(|e| StatusError::new(e.to_string()))?;
                            validate(&user)?;
                            Ok::<_, HandlerError>(json!({ "name": user.name, "email": user.email }))
                        }),
                    ),
            ),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log)?;
    print_config(&config);

    let (routes, sweep) = attach_routes_with_config(&config.routes, registry()).into_parts();
    tokio::spawn(async move {
        match sweep.await {
            Ok(report) if report.is_clean() => {
                tracing::info!(routes = report.registered.len(), "All routes attached")
            }
            Ok(report) => tracing::warn!(?report, "Routes attached with failures"),
            Err(e) => tracing::error!(error = %e, "Route sweep task failed"),
        }
    });

    let server = HttpServer::new(config.server.clone(), routes);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
