//! CLI 配置管理
//!
//! **数据存储方式**: TOML 文件 (~/.config/vcd/config.toml)，可用 `--config` 指定
//!
//! 环境变量 `VCD_API_URL`、`VCD_AUTH_TOKEN` 优先于文件中的值。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use vcd_transport::TransportConfig;

pub const ENV_API_URL: &str = "VCD_API_URL";
pub const ENV_AUTH_TOKEN: &str = "VCD_AUTH_TOKEN";

/// CLI 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// 传输层配置
    #[serde(default)]
    pub transport: TransportConfig,

    /// 会话令牌
    pub auth_token: Option<String>,

    /// 配置版本
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            auth_token: None,
            version: default_version(),
        }
    }
}

impl CliConfig {
    /// 获取默认配置文件路径
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("无法获取用户主目录")?;
        Ok(home.join(".config").join("vcd").join("config.toml"))
    }

    /// 加载配置并应用环境变量覆盖
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        let mut config = Self::load_file(&path)?;
        config.apply_overrides(
            std::env::var(ENV_API_URL).ok(),
            std::env::var(ENV_AUTH_TOKEN).ok(),
        );
        Ok(config)
    }

    /// 只读取文件，文件不存在时返回默认配置
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {:?}", path))?;

        toml::from_str(&content).with_context(|| format!("解析配置文件失败: {:?}", path))
    }

    /// 用外部提供的值覆盖文件配置，空值忽略
    pub fn apply_overrides(&mut self, api_url: Option<String>, auth_token: Option<String>) {
        if let Some(url) = api_url.filter(|v| !v.trim().is_empty()) {
            self.transport.api_url = url;
        }
        if let Some(token) = auth_token.filter(|v| !v.trim().is_empty()) {
            self.auth_token = Some(token);
        }
    }
}
