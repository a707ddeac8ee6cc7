//! Method Handler - 响应归一化
//!
//! 包装单个用户处理器：
//! - 返回完整响应 → 复制状态码与全部 header，body 原样透传（支持流式 body）
//! - 无返回值     → `{"success": true}`
//! - 数组         → `{"data": [...], "success": true}`
//! - 对象         → `{...字段, "success": true}`（`success` 最后写入，始终为 true）
//! - 其他原始值   → `{"data": <值>, "success": true}`
//!
//! 处理器出错（包括 panic）时不写响应，错误原样转交给下一阶段。

use std::any::Any;
use std::panic::AssertUnwindSafe;

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::FutureExt;
use serde_json::{Map, Value};

use super::module::{Handler, HandlerError, Reply};

/// 归一化后的请求处理器
///
/// 无状态，每个发现的处理器创建一次，每个请求调用一次
#[derive(Debug, Clone)]
pub struct MethodHandler {
    handler: Handler,
}

/// 包装用户处理器
pub fn method_handler(handler: Handler) -> MethodHandler {
    MethodHandler { handler }
}

impl MethodHandler {
    /// 调用处理器并归一化结果
    ///
    /// `Err` 为处理器产生的原始错误，由调用方转交给错误处理阶段
    pub async fn call(&self, request: Request) -> Result<Response, HandlerError> {
        let handler = self.handler.clone();
        let outcome = AssertUnwindSafe(async move { handler.call(request).await })
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(reply)) => Ok(normalize_reply(reply)),
            Ok(Err(err)) => Err(err),
            Err(payload) => Err(panic_error(payload)),
        }
    }
}

/// 将处理器返回值转换为响应
pub fn normalize_reply(reply: Reply) -> Response {
    match reply {
        Reply::Raw(response) => pass_through(response),
        Reply::Undefined | Reply::Json(Value::Null) => success(Map::new()),
        Reply::Json(Value::Object(fields)) => success(fields),
        Reply::Json(data) => {
            let mut fields = Map::new();
            fields.insert("data".to_string(), data);
            success(fields)
        }
    }
}

fn success(mut fields: Map<String, Value>) -> Response {
    fields.insert("success".to_string(), Value::Bool(true));
    Json(Value::Object(fields)).into_response()
}

fn pass_through(response: Response) -> Response {
    let (parts, body) = response.into_parts();

    let mut outgoing = Response::new(body);
    *outgoing.status_mut() = parts.status;
    for (name, value) in parts.headers.iter() {
        outgoing.headers_mut().append(name.clone(), value.clone());
    }

    outgoing
}

fn panic_error(payload: Box<dyn Any + Send>) -> HandlerError {
    anyhow::anyhow!("handler panicked: {}", panic_message(payload.as_ref()))
}

/// panic 负载中的消息
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
