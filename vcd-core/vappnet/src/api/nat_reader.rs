//! NAT 规则与边缘公网 IP 读取
//!
//! 只有在 `FenceMode == natRouted` 且 `NatType == portForwarding` 时，
//! 端口转发规则和边缘设备外部地址才有意义；任一条件不满足都直接报错，
//! 不返回部分结果。
//!
//! 未指定网络名称时只检查第一个 `NetworkConfig/Configuration`。
//! 一个 vApp 有多个处于端口转发模式的路由网络时，应使用带网络名称的变体。

use tracing::{info, warn};
use vcd_transport::{Element, Transport};

use super::VAppNetworkApi;
use crate::error::{Result, VAppNetError};
use crate::models::{FenceMode, NatRuleFields, NatRuleMap, NatType, StateCheck};

impl<'a, T: Transport + ?Sized> VAppNetworkApi<'a, T> {
    /// 读取第一个网络的端口转发规则
    pub async fn get_port_forwarding_rules(&self, vapp_id: &str) -> Result<NatRuleMap> {
        info!("读取端口转发规则: vapp={}", vapp_id);
        let document = self.fetch_section(vapp_id).await?;
        let configuration = nat_routed_configuration(document.root(), None)?;
        Ok(read_nat_rules(configuration))
    }

    /// 读取指定网络的端口转发规则
    pub async fn get_port_forwarding_rules_of(
        &self,
        vapp_id: &str,
        network_name: &str,
    ) -> Result<NatRuleMap> {
        info!("读取端口转发规则: vapp={}, network={}", vapp_id, network_name);
        let document = self.fetch_section(vapp_id).await?;
        let configuration = nat_routed_configuration(document.root(), Some(network_name))?;
        Ok(read_nat_rules(configuration))
    }

    /// 读取第一个网络边缘设备的公网 IP，未分配时返回 None
    pub async fn get_edge_public_ip(&self, vapp_id: &str) -> Result<Option<String>> {
        info!("读取边缘公网 IP: vapp={}", vapp_id);
        let document = self.fetch_section(vapp_id).await?;
        let configuration = nat_routed_configuration(document.root(), None)?;
        Ok(read_edge_ip(configuration))
    }

    /// 读取指定网络边缘设备的公网 IP
    pub async fn get_edge_public_ip_of(
        &self,
        vapp_id: &str,
        network_name: &str,
    ) -> Result<Option<String>> {
        info!("读取边缘公网 IP: vapp={}, network={}", vapp_id, network_name);
        let document = self.fetch_section(vapp_id).await?;
        let configuration = nat_routed_configuration(document.root(), Some(network_name))?;
        Ok(read_edge_ip(configuration))
    }
}

/// 定位 `Configuration` 并校验状态前置条件
///
/// `network_name` 为 None 时取第一个带 `Configuration` 的 `NetworkConfig`。
/// 状态值按原文精确比较，不去除空白。
pub fn nat_routed_configuration<'d>(
    section: &'d Element,
    network_name: Option<&str>,
) -> Result<&'d Element> {
    if section.local_name() != "NetworkConfigSection" {
        return Err(VAppNetError::MissingElement("NetworkConfigSection".to_string()));
    }

    let missing_configuration = || {
        VAppNetError::MissingElement("NetworkConfigSection/NetworkConfig/Configuration".to_string())
    };

    let configuration = match network_name {
        Some(name) => section
            .children_named("NetworkConfig")
            .find(|el| el.attr("networkName") == Some(name))
            .ok_or_else(|| VAppNetError::NetworkNotFound(name.to_string()))?
            .child("Configuration")
            .ok_or_else(missing_configuration)?,
        None => {
            let mut configurations = section
                .children_named("NetworkConfig")
                .filter_map(|network| network.child("Configuration"));
            let first = configurations.next().ok_or_else(missing_configuration)?;
            let skipped = configurations.count();
            if skipped > 0 {
                warn!("vApp 存在 {} 个网络配置，仅检查第一个", skipped + 1);
            }
            first
        }
    };

    let fence_mode = configuration
        .child("FenceMode")
        .map(Element::text)
        .unwrap_or_default();
    require_state(StateCheck::FenceMode, FenceMode::NatRouted.as_str(), &fence_mode)?;

    let nat_type = configuration
        .find_path(&["Features", "NatService", "NatType"])
        .map(Element::text)
        .unwrap_or_default();
    require_state(StateCheck::NatType, NatType::PortForwarding.as_str(), &nat_type)?;

    Ok(configuration)
}

fn require_state(check: StateCheck, expected: &'static str, actual: &str) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(VAppNetError::InvalidState {
            check,
            expected,
            actual: actual.to_string(),
        })
    }
}

/// 提取所有 NAT 规则，按规则 ID 索引，字段保留原始文本
pub fn read_nat_rules(configuration: &Element) -> NatRuleMap {
    let Some(nat_service) = configuration.find_path(&["Features", "NatService"]) else {
        return NatRuleMap::new();
    };

    nat_service
        .children_named("NatRule")
        .map(|rule| {
            let id = child_text(Some(rule), "Id");
            let vm_rule = rule.child("VmRule");
            let fields = NatRuleFields {
                external_ip_address: child_text(vm_rule, "ExternalIpAddress"),
                external_port: child_text(vm_rule, "ExternalPort"),
                vapp_scoped_vm_id: child_text(vm_rule, "VAppScopedVmId"),
                vm_nic_id: child_text(vm_rule, "VmNicId"),
                internal_port: child_text(vm_rule, "InternalPort"),
                protocol: child_text(vm_rule, "Protocol"),
            };
            (id, fields)
        })
        .collect()
}

/// 提取 `RouterInfo/ExternalIp`
pub fn read_edge_ip(configuration: &Element) -> Option<String> {
    configuration
        .find_path(&["RouterInfo", "ExternalIp"])
        .map(Element::text)
}

fn child_text(parent: Option<&Element>, name: &str) -> String {
    parent
        .and_then(|el| el.child(name))
        .map(Element::text)
        .unwrap_or_default()
}
