//! HTTP Middleware
//!
//! 按响应状态码记录日志：4xx → warn，5xx → error

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

/// 状态码日志中间件
///
/// 错误本身在 `app_error_handler` 中记录，这里只记录请求维度的信息
pub async fn status_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms,
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms,
            "HTTP client error"
        );
    } else {
        tracing::debug!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms,
            "HTTP request handled"
        );
    }

    response
}
