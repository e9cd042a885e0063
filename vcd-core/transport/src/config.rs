//! 传输层配置

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, TransportError};

/// 传输层配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// API 基础 URL，如 `https://vcd.example.com/api`
    #[serde(default)]
    pub api_url: String,

    /// API 版本（写入 Accept 头）
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// 连接超时（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// 请求超时（秒）
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// 是否验证 SSL 证书
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_version: default_api_version(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            verify_ssl: default_verify_ssl(),
        }
    }
}

impl TransportConfig {
    /// 以指定 API 地址创建配置，其余取默认值
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Default::default()
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// 去掉末尾 `/` 的 API 地址
    pub fn normalized_api_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// Accept 头的值
    pub fn accept_header(&self) -> String {
        format!("application/*+xml;version={}", self.api_version)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        let url = self.normalized_api_url();
        if url.is_empty() {
            return Err(TransportError::Config("api_url 不能为空".to_string()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(TransportError::Config(format!(
                "api_url 必须以 http:// 或 https:// 开头: {}",
                url
            )));
        }
        if self.api_version.trim().is_empty() {
            return Err(TransportError::Config("api_version 不能为空".to_string()));
        }
        Ok(())
    }
}

// 默认值函数
fn default_api_version() -> String {
    "5.1".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

fn default_verify_ssl() -> bool {
    true
}
