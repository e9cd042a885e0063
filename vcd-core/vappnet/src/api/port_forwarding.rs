//! 端口转发配置构建
//!
//! 不读取现有配置，直接从参数构建一份只含单个网络的完整配置段并整体替换。
//! 这是破坏性操作：该 vApp 上其他网络设置会被覆盖，需要保留时应使用合并编辑。

use tracing::info;
use vcd_transport::{Element, Transport, XmlDocument};

use super::VAppNetworkApi;
use crate::error::Result;
use crate::models::{NatRuleSpec, NatType, PortForwardingConfig, OVF_NAMESPACE, VCLOUD_NAMESPACE};

impl<'a, T: Transport + ?Sized> VAppNetworkApi<'a, T> {
    /// 以端口转发模式整体替换 vApp 网络配置，返回异步任务 ID
    pub async fn set_port_forwarding_rules(
        &self,
        vapp_id: &str,
        network_name: &str,
        config: &PortForwardingConfig,
    ) -> Result<String> {
        info!(
            "设置端口转发规则: vapp={}, network={}, 规则数={}",
            vapp_id,
            network_name,
            config.nat_rules.len()
        );

        let document = build_port_forwarding_document(self.api_url(), network_name, config);
        let task_id = self.put_section(vapp_id, &document).await?;

        info!("端口转发规则已提交: vapp={}, task={}", vapp_id, task_id);
        Ok(task_id)
    }
}

/// 构建端口转发网络配置段
pub fn build_port_forwarding_document(
    api_url: &str,
    network_name: &str,
    config: &PortForwardingConfig,
) -> XmlDocument {
    let nat_service = config.nat_rules.iter().fold(
        Element::new("NatService")
            .with_child(Element::new("IsEnabled").with_text("true"))
            .with_child(Element::new("NatType").with_text(NatType::PortForwarding.as_str()))
            .with_child(Element::new("Policy").with_text(config.effective_nat_policy().as_str())),
        |service, rule| service.with_child(nat_rule_element(rule)),
    );

    let configuration = Element::new("Configuration")
        .with_child(
            Element::new("ParentNetwork")
                .with_attr("href", format!("{}/network/{}", api_url, config.parent_network)),
        )
        .with_child(Element::new("FenceMode").with_text(config.effective_fence_mode().as_str()))
        .with_child(Element::new("Features").with_child(nat_service));

    let root = Element::new("NetworkConfigSection")
        .with_attr("xmlns", VCLOUD_NAMESPACE)
        .with_attr("xmlns:ovf", OVF_NAMESPACE)
        .with_child(Element::new("ovf:Info").with_text("Network configuration"))
        .with_child(
            Element::new("NetworkConfig")
                .with_attr("networkName", network_name)
                .with_child(configuration),
        );

    XmlDocument::new(root)
}

fn nat_rule_element(rule: &NatRuleSpec) -> Element {
    let vm_rule = Element::new("VmRule")
        .with_child(Element::new("ExternalPort").with_text(&rule.external_port.to_string()))
        .with_child(Element::new("VAppScopedVmId").with_text(&rule.vm_scoped_local_id))
        .with_child(Element::new("VmNicId").with_text(&rule.effective_vm_nic_id().to_string()))
        .with_child(Element::new("InternalPort").with_text(&rule.internal_port.to_string()))
        .with_child(Element::new("Protocol").with_text(rule.effective_protocol().as_str()));

    Element::new("NatRule").with_child(vm_rule)
}
