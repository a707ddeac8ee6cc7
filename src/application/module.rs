//! Route Module Model
//!
//! 路由文件加载后的导出表：
//! - 方法名直接导出（`GET`, `POST`, ...）
//! - 或 `default` 导出一个包含这些方法的对象
//!
//! `default` 为真值时只查找 `default`，直接导出被忽略。

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::Response;
use futures_util::future::BoxFuture;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::HttpMethod;

/// 默认导出名
pub const DEFAULT_EXPORT: &str = "default";

/// 用户处理器返回的错误（沿请求管道转交给错误处理器）
pub type HandlerError = anyhow::Error;

pub type HandlerFuture = BoxFuture<'static, Result<Reply, HandlerError>>;

// ============================================================================
// Handler
// ============================================================================

/// 用户处理器
///
/// 接收请求，返回可归一化的 [`Reply`]
#[derive(Clone)]
pub struct Handler {
    inner: Arc<dyn Fn(Request) -> HandlerFuture + Send + Sync>,
}

impl Handler {
    pub fn new<F, Fut, T, E>(f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Into<Reply>,
        E: Into<HandlerError>,
    {
        Self {
            inner: Arc::new(move |request| -> HandlerFuture {
                let fut = f(request);
                Box::pin(async move { fut.await.map(Into::into).map_err(Into::into) })
            }),
        }
    }

    pub fn call(&self, request: Request) -> HandlerFuture {
        (self.inner)(request)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler")
    }
}

// ============================================================================
// Reply
// ============================================================================

/// 处理器返回值
#[derive(Debug)]
pub enum Reply {
    /// 无返回值
    Undefined,
    /// 任意 JSON 值（数组、对象、原始值）
    Json(Value),
    /// 处理器自行构造的完整响应，原样透传
    Raw(Response),
}

impl Reply {
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Reply::Json)
    }
}

impl From<()> for Reply {
    fn from(_: ()) -> Self {
        Reply::Undefined
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::Json(value)
    }
}

impl From<Map<String, Value>> for Reply {
    fn from(fields: Map<String, Value>) -> Self {
        Reply::Json(Value::Object(fields))
    }
}

impl From<Vec<Value>> for Reply {
    fn from(items: Vec<Value>) -> Self {
        Reply::Json(Value::Array(items))
    }
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Reply::Raw(response)
    }
}

impl From<String> for Reply {
    fn from(value: String) -> Self {
        Reply::Json(Value::String(value))
    }
}

impl From<&'static str> for Reply {
    fn from(value: &'static str) -> Self {
        Reply::Json(Value::from(value))
    }
}

impl From<bool> for Reply {
    fn from(value: bool) -> Self {
        Reply::Json(Value::Bool(value))
    }
}

impl From<i64> for Reply {
    fn from(value: i64) -> Self {
        Reply::Json(Value::from(value))
    }
}

impl From<f64> for Reply {
    fn from(value: f64) -> Self {
        Reply::Json(Value::from(value))
    }
}

impl<T: Into<Reply>> From<Option<T>> for Reply {
    fn from(value: Option<T>) -> Self {
        value.map_or(Reply::Undefined, Into::into)
    }
}

// ============================================================================
// RouteModule
// ============================================================================

/// 模块导出项
#[derive(Debug, Clone)]
pub enum Export {
    /// 可调用的处理器
    Handler(Handler),
    /// 嵌套对象（如 `default` 导出的方法表）
    Namespace(RouteModule),
    /// 其他不可调用的值
    Value(Value),
}

impl Export {
    /// JavaScript 语义下的真值判断
    fn is_truthy(&self) -> bool {
        match self {
            Export::Handler(_) | Export::Namespace(_) => true,
            Export::Value(value) => match value {
                Value::Null => false,
                Value::Bool(b) => *b,
                Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
                Value::String(s) => !s.is_empty(),
                Value::Array(_) | Value::Object(_) => true,
            },
        }
    }
}

/// 路由文件加载后的导出表
#[derive(Debug, Clone, Default)]
pub struct RouteModule {
    exports: HashMap<String, Export>,
}

impl RouteModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加任意导出项
    pub fn export(mut self, name: impl Into<String>, export: Export) -> Self {
        self.exports.insert(name.into(), export);
        self
    }

    /// 以方法名直接导出处理器
    pub fn method(self, method: HttpMethod, handler: Handler) -> Self {
        self.export(method.export_name(), Export::Handler(handler))
    }

    /// 设置 `default` 导出
    pub fn with_default(self, module: RouteModule) -> Self {
        self.export(DEFAULT_EXPORT, Export::Namespace(module))
    }

    pub fn get(&self, name: &str) -> Option<&Export> {
        self.exports.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }

    /// 实际提供方法的导出表
    ///
    /// 存在真值 `default` 时只使用它；若它不是对象则没有任何方法可用
    pub fn method_table(&self) -> Option<&RouteModule> {
        match self.exports.get(DEFAULT_EXPORT) {
            Some(Export::Namespace(module)) => Some(module),
            Some(export) if export.is_truthy() => None,
            _ => Some(self),
        }
    }

    /// 查找某个方法的处理器，非可调用值视为不存在
    pub fn handler_for(&self, method: HttpMethod) -> Option<&Handler> {
        match self.method_table()?.exports.get(method.export_name()) {
            Some(Export::Handler(handler)) => Some(handler),
            _ => None,
        }
    }
}
