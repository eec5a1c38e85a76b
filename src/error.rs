//! Error types.

use reqwest::StatusCode;
use thiserror::Error;

/// 单次接口调用的失败原因。
#[derive(Debug, Error)]
pub enum ApiError {
    /// 连接失败、超时等传输层错误。
    #[error("网络请求异常：{0}")]
    Transport(#[from] reqwest::Error),

    /// 非 2xx 状态码。
    #[error("网络请求异常：HTTP {0}")]
    Status(StatusCode),

    /// 响应体不是合法 JSON。
    #[error("响应解析失败：{0}")]
    Decode(#[from] serde_json::Error),

    /// 响应里没有 `data` 字段。
    #[error("响应缺少 data 字段")]
    MissingData,

    /// 服务端返回的业务错误信息。
    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Cookie 不是合法的 UTF-8（第 {valid_up_to} 字节后）")]
    NotUtf8 { valid_up_to: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("未添加COOKIE_QUARK变量")]
    MissingCookie,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_shows_message_verbatim() {
        let err = ApiError::Rejected("今日已签到".to_string());
        assert_eq!(err.to_string(), "今日已签到");
    }

    #[test]
    fn test_status_message() {
        let err = ApiError::Status(StatusCode::FORBIDDEN);
        assert_eq!(err.to_string(), "网络请求异常：HTTP 403 Forbidden");
    }
}
