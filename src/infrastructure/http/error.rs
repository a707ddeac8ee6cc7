//! HTTP Error Handling
//!
//! 请求管道的终端错误处理器：唯一决定错误状态码与响应体的地方

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::application::{classify_error, ErrorClass, HandlerError};

/// 未知错误的响应消息
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 错误处理器
///
/// - 校验错误 → 400，body 为字段级问题列表
/// - 已知错误 → 错误自带的状态码，`{"message": ...}`
/// - 其他     → 500，`{"message": "Unknown error"}`
pub fn app_error_handler(err: HandlerError) -> Response {
    tracing::error!(error = ?err, "Error");

    match classify_error(&err) {
        ErrorClass::Validation(validation) => {
            tracing::warn!(formatted = %validation.format(), "Request validation failed");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "issues": validation.issues() })),
            )
                .into_response()
        }
        ErrorClass::Known {
            status_code,
            message,
        } => match u16::try_from(status_code)
            .ok()
            .and_then(|code| StatusCode::from_u16(code).ok())
        {
            Some(status) => (status, Json(ErrorResponse::new(message))).into_response(),
            None => {
                tracing::warn!(status_code, "Known error carries an invalid HTTP status");
                unknown_error()
            }
        },
        ErrorClass::Unknown => unknown_error(),
    }
}

fn unknown_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(UNKNOWN_ERROR_MESSAGE)),
    )
        .into_response()
}
