//! 应用层错误定义
//!
//! 处理器可抛出的错误分为三类：
//! - 校验错误（garde 报告）→ 400
//! - 已知错误（携带状态码与消息）→ 对应状态码
//! - 未知错误 → 500

use garde::{Report, Validate};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::module::HandlerError;

/// StatusError 默认状态码
pub const DEFAULT_STATUS_CODE: u16 = 400;

// ============================================================================
// Known errors
// ============================================================================

/// 可直接返回给客户端的错误
pub trait KnownError {
    fn status_code(&self) -> u16;
    fn message(&self) -> &str;
}

/// StatusError 的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Status,
    Unauthorized,
    NotProcessed,
}

/// StatusError 构造选项
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusOptions {
    /// 覆盖默认状态码；`None` 或 0 时保持 400
    pub status_code: Option<u16>,
}

/// 携带 HTTP 状态码的错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StatusError {
    kind: StatusKind,
    status_code: u16,
    message: String,
}

impl StatusError {
    /// 状态码 400 的错误
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_options(message, StatusOptions::default())
    }

    pub fn with_options(message: impl Into<String>, options: StatusOptions) -> Self {
        Self {
            kind: StatusKind::Status,
            status_code: options
                .status_code
                .filter(|code| *code != 0)
                .unwrap_or(DEFAULT_STATUS_CODE),
            message: message.into(),
        }
    }

    /// 401 Unauthorized
    pub fn unauthorized() -> Self {
        Self::unauthorized_with("Unauthorized")
    }

    pub fn unauthorized_with(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Unauthorized,
            status_code: 401,
            message: message.into(),
        }
    }

    /// 403 NotProcessed
    pub fn not_processed() -> Self {
        Self::not_processed_with("NotProcessed")
    }

    pub fn not_processed_with(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::NotProcessed,
            status_code: 403,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> StatusKind {
        self.kind
    }
}

impl KnownError for StatusError {
    fn status_code(&self) -> u16 {
        self.status_code
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// 以任意 JSON 值作为错误抛出
///
/// 满足 [`is_known_error`] 的值按已知错误处理，其余按未知错误处理
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct ThrownValue(pub Value);

impl ThrownValue {
    /// 若为已知错误，返回原始状态码与消息
    pub fn as_known(&self) -> Option<(&serde_json::Number, &str)> {
        if !is_known_error(&self.0) {
            return None;
        }
        let status_code = match self.0.get("statusCode") {
            Some(Value::Number(n)) => n,
            _ => return None,
        };
        let message = self.0.get("message").and_then(Value::as_str)?;
        Some((status_code, message))
    }
}

/// 鸭子类型判断：对象且含数值 `statusCode` 与字符串 `message`
pub fn is_known_error(value: &Value) -> bool {
    value.as_object().is_some_and(|fields| {
        fields.get("statusCode").is_some_and(Value::is_number)
            && fields.get("message").is_some_and(Value::is_string)
    })
}

// ============================================================================
// Validation errors
// ============================================================================

/// 单个字段的校验问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

/// 请求数据校验失败
#[derive(Debug, Error)]
#[error("Validation failed: {report}")]
pub struct ValidationError {
    report: Report,
}

impl ValidationError {
    pub fn new(report: Report) -> Self {
        Self { report }
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    /// 扁平化的字段级问题列表
    pub fn issues(&self) -> Vec<ValidationIssue> {
        self.report
            .iter()
            .map(|(path, error)| ValidationIssue {
                path: path.to_string(),
                message: error.message().to_string(),
            })
            .collect()
    }

    /// 按字段路径嵌套的格式化结果，每层带 `_errors`
    ///
    /// `address.city` 的问题出现在 `{"address": {"city": {"_errors": [...]}}}`
    pub fn format(&self) -> Value {
        let mut root = error_node();
        for issue in self.issues() {
            let segments: Vec<&str> = issue.path.split('.').filter(|s| !s.is_empty()).collect();
            insert_issue(&mut root, &segments, issue.message.clone());
        }
        Value::Object(root)
    }
}

fn error_node() -> Map<String, Value> {
    let mut node = Map::new();
    node.insert("_errors".to_string(), Value::Array(Vec::new()));
    node
}

fn insert_issue(node: &mut Map<String, Value>, segments: &[&str], message: String) {
    match segments.split_first() {
        None => {
            if let Some(Value::Array(errors)) = node.get_mut("_errors") {
                errors.push(Value::String(message));
            }
        }
        Some((segment, rest)) => {
            let child = node
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(error_node()));
            if let Value::Object(child) = child {
                insert_issue(child, rest, message);
            }
        }
    }
}

impl From<Report> for ValidationError {
    fn from(report: Report) -> Self {
        Self::new(report)
    }
}

/// 使用 garde 校验数据
pub fn validate<T>(value: &T) -> Result<(), ValidationError>
where
    T: Validate,
    T::Context: Default,
{
    value.validate().map_err(ValidationError::new)
}

// ============================================================================
// Classification
// ============================================================================

/// 错误分类结果
#[derive(Debug)]
pub enum ErrorClass<'a> {
    Validation(&'a ValidationError),
    Known { status_code: u64, message: &'a str },
    Unknown,
}

/// 按 校验 → 已知 → 未知 的顺序分类，先匹配者生效
pub fn classify_error(err: &HandlerError) -> ErrorClass<'_> {
    if let Some(validation) = err.downcast_ref::<ValidationError>() {
        return ErrorClass::Validation(validation);
    }

    if let Some(status) = err.downcast_ref::<StatusError>() {
        return ErrorClass::Known {
            status_code: u64::from(status.status_code()),
            message: status.message(),
        };
    }

    if let Some((status_code, message)) = err
        .downcast_ref::<ThrownValue>()
        .and_then(ThrownValue::as_known)
    {
        // 非整数状态码无法映射为 HTTP 状态
        return match status_code.as_u64() {
            Some(status_code) => ErrorClass::Known { status_code, message },
            None => ErrorClass::Unknown,
        };
    }

    ErrorClass::Unknown
}
