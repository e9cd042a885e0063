//! 基于 reqwest 的 HTTP 传输实现

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::TransportConfig;
use crate::document::XmlDocument;
use crate::error::{Result, TransportError};
use crate::{Transport, TransportRequest, TransportResponse};

/// vCloud 会话令牌请求头
pub const AUTH_HEADER: &str = "x-vcloud-authorization";

/// HTTP 传输
pub struct HttpTransport {
    /// API 基础 URL
    api_url: String,

    /// HTTP 客户端
    http_client: Client,

    /// 会话令牌
    auth_token: Arc<RwLock<Option<String>>>,

    /// 配置
    config: TransportConfig,
}

impl HttpTransport {
    /// 创建新的 HTTP 传输
    pub fn new(config: TransportConfig) -> Result<Self> {
        config.validate()?;

        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(Self {
            api_url: config.normalized_api_url().to_string(),
            http_client,
            auth_token: Arc::new(RwLock::new(None)),
            config,
        })
    }

    /// 设置会话令牌
    pub async fn set_auth_token(&self, token: impl Into<String>) {
        *self.auth_token.write().await = Some(token.into());
    }

    /// 清除会话令牌
    pub async fn clear_auth_token(&self) {
        *self.auth_token.write().await = None;
    }

    /// 获取当前会话令牌
    pub async fn auth_token(&self) -> Result<String> {
        let token = self.auth_token.read().await;
        token
            .clone()
            .ok_or_else(|| TransportError::Auth("未设置会话令牌".to_string()))
    }

    /// 获取配置
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let url = format!("{}{}", self.api_url, request.path);
        debug!("vCloud API 请求: {} {}", request.method, url);

        let mut builder = self
            .http_client
            .request(request.method.as_reqwest(), &url)
            .header(ACCEPT, self.config.accept_header());

        if let Some(token) = self.auth_token.read().await.as_deref() {
            builder = builder.header(AUTH_HEADER, token);
        }
        if let Some(content_type) = &request.content_type {
            builder = builder.header(CONTENT_TYPE, content_type.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "无法读取错误响应".to_string());
            warn!("API 请求失败: {} {} - {}", request.method, status, error_text);
            return Err(TransportError::Api(status.as_u16(), error_text));
        }

        let body = response.text().await?;
        debug!("vCloud API 响应: {} ({} 字节)", status, body.len());

        let document = if body.trim().is_empty() {
            None
        } else {
            Some(XmlDocument::parse(&body)?)
        };

        Ok(TransportResponse::new(status.as_u16(), headers, document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_creation() {
        let transport = HttpTransport::new(TransportConfig::new("https://vcd.example.com/api/"));
        assert!(transport.is_ok());
        assert_eq!(transport.unwrap().api_url(), "https://vcd.example.com/api");
    }

    #[test]
    fn test_transport_rejects_invalid_url() {
        let transport = HttpTransport::new(TransportConfig::new("vcd.example.com"));
        assert!(matches!(transport, Err(TransportError::Config(_))));
    }

    #[tokio::test]
    async fn test_auth_token_lifecycle() {
        let transport =
            HttpTransport::new(TransportConfig::new("https://vcd.example.com/api")).unwrap();
        assert!(transport.auth_token().await.is_err());

        transport.set_auth_token("abc").await;
        assert_eq!(transport.auth_token().await.unwrap(), "abc");

        transport.clear_auth_token().await;
        assert!(matches!(
            transport.auth_token().await,
            Err(TransportError::Auth(_))
        ));
    }
}
