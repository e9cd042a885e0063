//! vApp 网络配置 API
//!
//! 三类操作共用同一个网络配置段资源：
//! - 合并编辑 (`network_config`): 取回现有配置，局部修改后整体回写
//! - 端口转发构建 (`port_forwarding`): 从零构建配置并整体替换
//! - 规则与状态读取 (`nat_reader`): 校验状态后提取 NAT 规则或边缘公网 IP

pub mod nat_reader;
pub mod network_config;
pub mod port_forwarding;

use tracing::debug;
use vcd_transport::{Transport, TransportRequest, XmlDocument};

use crate::error::{Result, VAppNetError};
use crate::models::NETWORK_CONFIG_SECTION_CONTENT_TYPE;
use crate::task::task_id_from_response;

/// vApp 网络配置段的资源路径
pub fn network_config_section_path(vapp_id: &str) -> String {
    format!("/vApp/vapp-{}/networkConfigSection", vapp_id)
}

/// vApp 网络配置 API
pub struct VAppNetworkApi<'a, T: Transport + ?Sized> {
    transport: &'a T,
}

impl<'a, T: Transport + ?Sized> VAppNetworkApi<'a, T> {
    /// 创建新的网络配置 API 实例
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// 获取网络配置段文档
    pub(crate) async fn fetch_section(&self, vapp_id: &str) -> Result<XmlDocument> {
        let path = network_config_section_path(vapp_id);
        let response = self.transport.send(TransportRequest::get(&path)).await?;
        debug!("获取网络配置段: {} -> {}", path, response.status);

        response
            .document
            .ok_or_else(|| VAppNetError::EmptyResponse(path))
    }

    /// 回写网络配置段文档，返回异步任务 ID
    pub(crate) async fn put_section(&self, vapp_id: &str, document: &XmlDocument) -> Result<String> {
        let path = network_config_section_path(vapp_id);
        let request = TransportRequest::put(
            &path,
            document.to_xml(),
            NETWORK_CONFIG_SECTION_CONTENT_TYPE,
        );
        let response = self.transport.send(request).await?;
        debug!("回写网络配置段: {} -> {}", path, response.status);

        task_id_from_response(&response)
    }

    /// API 基础 URL
    pub(crate) fn api_url(&self) -> &str {
        self.transport.api_url()
    }
}
