//! vCloud 传输层
//!
//! 负责把"动词 + 路径 + 可选请求体 + 可选内容类型"发送到 vCloud API，
//! 并把响应解析为 XML 文档树和响应头。
//!
//! # 示例
//!
//! ```ignore
//! use vcd_transport::{HttpTransport, Transport, TransportConfig, TransportRequest};
//!
//! let transport = HttpTransport::new(TransportConfig::new("https://vcd.example.com/api"))?;
//! transport.set_auth_token("session-token").await;
//!
//! let response = transport
//!     .send(TransportRequest::get("/vApp/vapp-42/networkConfigSection"))
//!     .await?;
//! ```

pub mod client;
pub mod config;
pub mod document;
pub mod error;

pub use client::HttpTransport;
pub use config::TransportConfig;
pub use document::{Element, Node, XmlDocument};
pub use error::{Result, TransportError};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, LOCATION};

/// 请求方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
}

impl Method {
    /// 对应的 reqwest 方法
    pub fn as_reqwest(&self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Put => write!(f, "PUT"),
        }
    }
}

/// 传输请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// 请求方法
    pub method: Method,

    /// 相对 API 基础地址的路径
    pub path: String,

    /// 请求体
    pub body: Option<String>,

    /// 请求体内容类型
    pub content_type: Option<String>,
}

impl TransportRequest {
    /// 构建 GET 请求
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
            content_type: None,
        }
    }

    /// 构建带请求体的 PUT 请求
    pub fn put(path: impl Into<String>, body: String, content_type: impl Into<String>) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            body: Some(body),
            content_type: Some(content_type.into()),
        }
    }
}

/// 传输响应
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP 状态码
    pub status: u16,

    /// 响应头
    pub headers: HeaderMap,

    /// 解析后的响应文档（响应体为空时为 None）
    pub document: Option<XmlDocument>,
}

impl TransportResponse {
    /// 创建响应
    pub fn new(status: u16, headers: HeaderMap, document: Option<XmlDocument>) -> Self {
        Self {
            status,
            headers,
            document,
        }
    }

    /// `Location` 响应头
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
    }
}

/// 传输层抽象
///
/// 上层只通过这一个接口访问远端服务，便于在测试中替换。
#[async_trait]
pub trait Transport: Send + Sync {
    /// API 基础 URL（不含末尾 `/`），用于拼接资源引用的 href
    fn api_url(&self) -> &str;

    /// 发送请求，返回解析后的文档与响应头
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}
