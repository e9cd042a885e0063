//! vApp 网络配置模块
//!
//! 在应用意图与 vCloud 网络配置段之间做请求/响应转换。
//!
//! # 功能
//!
//! - **合并编辑** (`set_network_config`): 取回现有配置，只修改隔离模式、父网络，
//!   其余节点原样保留后整体回写
//! - **端口转发构建** (`set_port_forwarding_rules`): 从零构建端口转发配置并整体替换
//! - **规则读取** (`get_port_forwarding_rules`): 校验状态后返回 规则 ID -> 规则字段
//! - **边缘公网 IP** (`get_edge_public_ip`): 校验状态后返回边缘设备外部地址
//!
//! 修改类操作返回异步任务 ID，任务轮询由调用方负责。
//!
//! # 示例
//!
//! ```ignore
//! use vcd_transport::{HttpTransport, TransportConfig};
//! use vcd_vappnet::{FenceMode, NatRuleSpec, NetworkConfigEdits, PortForwardingConfig, VAppNetworkApi};
//!
//! let transport = HttpTransport::new(TransportConfig::new("https://vcd.example.com/api"))?;
//! let api = VAppNetworkApi::new(&transport);
//!
//! // 合并编辑
//! let edits = NetworkConfigEdits::new().with_fence_mode(FenceMode::NatRouted);
//! let task_id = api.set_network_config("42", "net1", &edits).await?;
//!
//! // 端口转发
//! let config = PortForwardingConfig::new("ext-net-id", vec![NatRuleSpec::new(2222, "vm-a", 22)]);
//! let task_id = api.set_port_forwarding_rules("42", "net1", &config).await?;
//!
//! // 读取
//! let rules = api.get_port_forwarding_rules("42").await?;
//! let ip = api.get_edge_public_ip("42").await?;
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod task;

pub use api::{
    nat_reader::{nat_routed_configuration, read_edge_ip, read_nat_rules},
    network_config::merge_network_config,
    network_config_section_path,
    port_forwarding::build_port_forwarding_document,
    VAppNetworkApi,
};
pub use error::{Result, VAppNetError};
pub use task::{extract_task_id, task_id_from_response};

// 导出数据模型
pub use models::{
    // 枚举取值
    FenceMode, NatPolicy, NatType, Protocol, StateCheck,

    // 合并编辑
    NetworkConfigEdits, ParentNetworkRef,

    // 端口转发
    NatRuleSpec, PortForwardingConfig,

    // 读取结果
    NatRuleFields, NatRuleMap,

    // 常量
    NETWORK_CONFIG_SECTION_CONTENT_TYPE, OVF_NAMESPACE, VCLOUD_NAMESPACE,
};
