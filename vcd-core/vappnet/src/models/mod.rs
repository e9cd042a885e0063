//! vApp 网络配置数据模型
//!
//! 线上格式中 `FenceMode`、`NatType`、`Policy`、`Protocol` 都是自由文本，
//! 这里在边界处收敛为封闭枚举，非法取值在解析时即报错。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::VAppNetError;

/// 网络配置段的内容类型
pub const NETWORK_CONFIG_SECTION_CONTENT_TYPE: &str =
    "application/vnd.vmware.vcloud.networkConfigSection+xml";

/// vCloud 1.5 命名空间
pub const VCLOUD_NAMESPACE: &str = "http://www.vmware.com/vcloud/v1.5";

/// OVF 命名空间（用于 `ovf:Info`）
pub const OVF_NAMESPACE: &str = "http://schemas.dmtf.org/ovf/envelope/1";

// ============================================
// 枚举取值
// ============================================

/// 网络隔离模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FenceMode {
    /// 桥接到父网络
    Bridged,
    /// 经边缘设备 NAT 路由
    NatRouted,
    /// 完全隔离
    #[default]
    Isolated,
}

impl FenceMode {
    /// 线上取值
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bridged => "bridged",
            Self::NatRouted => "natRouted",
            Self::Isolated => "isolated",
        }
    }
}

impl FromStr for FenceMode {
    type Err = VAppNetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "bridged" => Ok(Self::Bridged),
            "natRouted" => Ok(Self::NatRouted),
            "isolated" => Ok(Self::Isolated),
            other => Err(VAppNetError::InvalidValue {
                kind: "FenceMode",
                value: other.to_string(),
            }),
        }
    }
}

/// NAT 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NatType {
    /// 端口转发
    PortForwarding,
    /// IP 一对一映射
    IpTranslation,
}

impl NatType {
    /// 线上取值
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PortForwarding => "portForwarding",
            Self::IpTranslation => "ipTranslation",
        }
    }
}

impl FromStr for NatType {
    type Err = VAppNetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "portForwarding" => Ok(Self::PortForwarding),
            "ipTranslation" => Ok(Self::IpTranslation),
            other => Err(VAppNetError::InvalidValue {
                kind: "NatType",
                value: other.to_string(),
            }),
        }
    }
}

/// NAT 流量策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NatPolicy {
    /// 允许双向流量
    #[default]
    AllowTraffic,
    /// 仅允许入站流量
    AllowTrafficIn,
}

impl NatPolicy {
    /// 线上取值
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllowTraffic => "allowTraffic",
            Self::AllowTrafficIn => "allowTrafficIn",
        }
    }
}

impl FromStr for NatPolicy {
    type Err = VAppNetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "allowTraffic" => Ok(Self::AllowTraffic),
            "allowTrafficIn" => Ok(Self::AllowTrafficIn),
            other => Err(VAppNetError::InvalidValue {
                kind: "Policy",
                value: other.to_string(),
            }),
        }
    }
}

/// 转发协议
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Protocol {
    #[default]
    #[serde(rename = "TCP")]
    Tcp,
    #[serde(rename = "UDP")]
    Udp,
    #[serde(rename = "TCP_UDP")]
    TcpUdp,
}

impl Protocol {
    /// 线上取值
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "TCP",
            Self::Udp => "UDP",
            Self::TcpUdp => "TCP_UDP",
        }
    }
}

impl FromStr for Protocol {
    type Err = VAppNetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TCP" => Ok(Self::Tcp),
            "UDP" => Ok(Self::Udp),
            "TCP_UDP" => Ok(Self::TcpUdp),
            _ => Err(VAppNetError::InvalidValue {
                kind: "Protocol",
                value: s.to_string(),
            }),
        }
    }
}

macro_rules! display_as_wire {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_wire!(FenceMode, NatType, NatPolicy, Protocol);

/// 读取规则前检查的状态项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateCheck {
    FenceMode,
    NatType,
}

impl fmt::Display for StateCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FenceMode => f.write_str("FenceMode"),
            Self::NatType => f.write_str("NatType"),
        }
    }
}

// ============================================
// 合并编辑
// ============================================

/// 父网络引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentNetworkRef {
    /// 父网络名称
    pub name: String,

    /// 父网络 ID
    pub id: String,
}

impl ParentNetworkRef {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// 网络配置合并编辑项，未设置的字段保持服务端原值
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfigEdits {
    /// 新的隔离模式
    pub fence_mode: Option<FenceMode>,

    /// 新的父网络
    pub parent_network: Option<ParentNetworkRef>,
}

impl NetworkConfigEdits {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置隔离模式
    pub fn with_fence_mode(mut self, fence_mode: FenceMode) -> Self {
        self.fence_mode = Some(fence_mode);
        self
    }

    /// 设置父网络
    pub fn with_parent_network(mut self, parent: ParentNetworkRef) -> Self {
        self.parent_network = Some(parent);
        self
    }
}

// ============================================
// 端口转发构建
// ============================================

/// 单条端口转发规则
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatRuleSpec {
    /// 外部端口
    pub external_port: u16,

    /// vApp 内虚拟机的本地 ID
    pub vm_scoped_local_id: String,

    /// 虚拟机网卡序号，默认 0
    #[serde(default)]
    pub vm_nic_id: Option<u32>,

    /// 内部端口
    pub internal_port: u16,

    /// 协议，默认 TCP
    #[serde(default)]
    pub protocol: Option<Protocol>,
}

impl NatRuleSpec {
    pub fn new(external_port: u16, vm_scoped_local_id: impl Into<String>, internal_port: u16) -> Self {
        Self {
            external_port,
            vm_scoped_local_id: vm_scoped_local_id.into(),
            vm_nic_id: None,
            internal_port,
            protocol: None,
        }
    }

    pub fn with_vm_nic_id(mut self, vm_nic_id: u32) -> Self {
        self.vm_nic_id = Some(vm_nic_id);
        self
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    /// 实际写入的网卡序号
    pub fn effective_vm_nic_id(&self) -> u32 {
        self.vm_nic_id.unwrap_or(0)
    }

    /// 实际写入的协议
    pub fn effective_protocol(&self) -> Protocol {
        self.protocol.unwrap_or_default()
    }
}

/// 端口转发网络配置（整体替换，非合并）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortForwardingConfig {
    /// 父网络 ID
    pub parent_network: String,

    /// 隔离模式，默认 isolated
    #[serde(default)]
    pub fence_mode: Option<FenceMode>,

    /// NAT 策略，默认 allowTraffic
    #[serde(default)]
    pub nat_policy: Option<NatPolicy>,

    /// 转发规则，按顺序写入
    pub nat_rules: Vec<NatRuleSpec>,
}

impl PortForwardingConfig {
    pub fn new(parent_network: impl Into<String>, nat_rules: Vec<NatRuleSpec>) -> Self {
        Self {
            parent_network: parent_network.into(),
            fence_mode: None,
            nat_policy: None,
            nat_rules,
        }
    }

    pub fn with_fence_mode(mut self, fence_mode: FenceMode) -> Self {
        self.fence_mode = Some(fence_mode);
        self
    }

    pub fn with_nat_policy(mut self, nat_policy: NatPolicy) -> Self {
        self.nat_policy = Some(nat_policy);
        self
    }

    pub fn effective_fence_mode(&self) -> FenceMode {
        self.fence_mode.unwrap_or_default()
    }

    pub fn effective_nat_policy(&self) -> NatPolicy {
        self.nat_policy.unwrap_or_default()
    }
}

// ============================================
// 规则读取
// ============================================

/// 从服务端读取的端口转发规则字段，全部保留原始文本
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NatRuleFields {
    pub external_ip_address: String,
    pub external_port: String,
    #[serde(rename = "VAppScopedVmId")]
    pub vapp_scoped_vm_id: String,
    pub vm_nic_id: String,
    pub internal_port: String,
    pub protocol: String,
}

/// 规则 ID -> 规则字段
pub type NatRuleMap = BTreeMap<String, NatRuleFields>;
