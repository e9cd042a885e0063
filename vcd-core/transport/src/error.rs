//! 传输层错误定义

use thiserror::Error;

/// 传输层错误
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP 错误: {0}")]
    Http(String),

    #[error("API 错误 [{0}]: {1}")]
    Api(u16, String),

    #[error("XML 解析错误: {0}")]
    Parse(String),

    #[error("请求超时: {0}")]
    Timeout(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("认证错误: {0}")]
    Auth(String),
}

impl From<quick_xml::Error> for TransportError {
    fn from(err: quick_xml::Error) -> Self {
        TransportError::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

/// 传输层结果类型
pub type Result<T> = std::result::Result<T, TransportError>;
