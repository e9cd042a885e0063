//! vApp 网络配置命令

use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde::Serialize;
use tracing::info;
use vcd_transport::HttpTransport;
use vcd_vappnet::{
    FenceMode, NatPolicy, NatRuleFields, NatRuleSpec, NetworkConfigEdits, ParentNetworkRef,
    PortForwardingConfig, Protocol, VAppNetworkApi,
};

use super::output::{print_json, print_table, OutputFormat, TableRow};
use crate::config::CliConfig;
use crate::NetworkAction;

pub async fn handle(action: NetworkAction, config: &CliConfig) -> Result<()> {
    let transport = connect(config).await?;
    let api = VAppNetworkApi::new(&transport);

    match action {
        NetworkAction::SetConfig {
            vapp,
            network,
            fence_mode,
            parent_name,
            parent_id,
        } => {
            let mut edits = NetworkConfigEdits::new();
            if let Some(mode) = fence_mode {
                edits = edits.with_fence_mode(mode.parse::<FenceMode>()?);
            }
            if let (Some(name), Some(id)) = (parent_name, parent_id) {
                edits = edits.with_parent_network(ParentNetworkRef::new(name, id));
            }

            info!("合并编辑网络配置: vApp={}, 网络={}", vapp, network);
            let task_id = api
                .set_network_config(&vapp, &network, &edits)
                .await
                .with_context(|| format!("修改 vApp {} 的网络 {} 失败", vapp, network))?;
            print_task(&task_id);
        }

        NetworkAction::SetPortForwarding {
            vapp,
            network,
            parent,
            fence_mode,
            policy,
            rules,
        } => {
            let nat_rules = rules
                .iter()
                .map(|rule| parse_rule(rule))
                .collect::<Result<Vec<_>>>()?;

            let mut pf_config = PortForwardingConfig::new(parent, nat_rules);
            if let Some(mode) = fence_mode {
                pf_config = pf_config.with_fence_mode(mode.parse::<FenceMode>()?);
            }
            if let Some(policy) = policy {
                pf_config = pf_config.with_nat_policy(policy.parse::<NatPolicy>()?);
            }

            info!(
                "设置端口转发: vApp={}, 网络={}, 规则数={}",
                vapp,
                network,
                pf_config.nat_rules.len()
            );
            let task_id = api
                .set_port_forwarding_rules(&vapp, &network, &pf_config)
                .await
                .with_context(|| format!("设置 vApp {} 的端口转发失败", vapp))?;
            print_task(&task_id);
        }

        NetworkAction::Rules {
            vapp,
            network,
            format,
        } => {
            let format = OutputFormat::parse(&format)?;
            let rules = match network.as_deref() {
                Some(name) => api.get_port_forwarding_rules_of(&vapp, name).await,
                None => api.get_port_forwarding_rules(&vapp).await,
            }
            .with_context(|| format!("读取 vApp {} 的端口转发规则失败", vapp))?;

            match format {
                OutputFormat::Json => print_json(&rules)?,
                OutputFormat::Table => {
                    if rules.is_empty() {
                        println!("{}", "没有端口转发规则".yellow());
                    } else {
                        let rows: Vec<_> = rules
                            .iter()
                            .map(|(id, fields)| RuleRow { id, fields })
                            .collect();
                        print_table(&rows);
                    }
                }
            }
        }

        NetworkAction::EdgeIp { vapp, network } => {
            let ip = match network.as_deref() {
                Some(name) => api.get_edge_public_ip_of(&vapp, name).await,
                None => api.get_edge_public_ip(&vapp).await,
            }
            .with_context(|| format!("读取 vApp {} 的边缘公网 IP 失败", vapp))?;

            match ip {
                Some(ip) => println!("{}", ip),
                None => println!("{}", "边缘设备尚未分配公网 IP".yellow()),
            }
        }
    }

    Ok(())
}

async fn connect(config: &CliConfig) -> Result<HttpTransport> {
    let transport =
        HttpTransport::new(config.transport.clone()).context("创建 vCloud 传输失败")?;

    if let Some(token) = &config.auth_token {
        transport.set_auth_token(token.clone()).await;
    }

    Ok(transport)
}

fn print_task(task_id: &str) {
    println!("{} 已提交任务 {}", "✓".green().bold(), task_id.cyan().bold());
}

/// 解析 `EXT:VMID:INT[:PROTO[:NIC]]` 形式的转发规则
fn parse_rule(text: &str) -> Result<NatRuleSpec> {
    let parts: Vec<&str> = text.split(':').collect();
    if !(3..=5).contains(&parts.len()) {
        bail!("规则格式应为 EXT:VMID:INT[:PROTO[:NIC]]: {}", text);
    }

    let external_port: u16 = parts[0]
        .parse()
        .with_context(|| format!("外部端口无效: {}", parts[0]))?;
    let vm_id = parts[1];
    if vm_id.is_empty() {
        bail!("虚拟机 ID 不能为空: {}", text);
    }
    let internal_port: u16 = parts[2]
        .parse()
        .with_context(|| format!("内部端口无效: {}", parts[2]))?;

    let mut rule = NatRuleSpec::new(external_port, vm_id, internal_port);

    if let Some(protocol) = parts.get(3).filter(|p| !p.is_empty()) {
        rule = rule.with_protocol(protocol.parse::<Protocol>()?);
    }
    if let Some(nic) = parts.get(4) {
        let nic: u32 = nic
            .parse()
            .with_context(|| format!("网卡编号无效: {}", nic))?;
        rule = rule.with_vm_nic_id(nic);
    }

    Ok(rule)
}

/// 规则表格行
#[derive(Serialize)]
struct RuleRow<'a> {
    id: &'a str,
    #[serde(flatten)]
    fields: &'a NatRuleFields,
}

impl TableRow for RuleRow<'_> {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "外部地址", "外部端口", "虚拟机", "网卡", "内部端口", "协议"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.fields.external_ip_address.clone(),
            self.fields.external_port.clone(),
            self.fields.vapp_scoped_vm_id.clone(),
            self.fields.vm_nic_id.clone(),
            self.fields.internal_port.clone(),
            self.fields.protocol.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_rule() {
        let rule = parse_rule("2222:vm-a:22").unwrap();
        assert_eq!(rule.external_port, 2222);
        assert_eq!(rule.vm_scoped_local_id, "vm-a");
        assert_eq!(rule.internal_port, 22);
        assert_eq!(rule.protocol, None);
        assert_eq!(rule.vm_nic_id, None);
    }

    #[test]
    fn test_parse_full_rule() {
        let rule = parse_rule("5353:vm-b:53:udp:1").unwrap();
        assert_eq!(rule.effective_protocol(), Protocol::Udp);
        assert_eq!(rule.effective_vm_nic_id(), 1);
    }

    #[test]
    fn test_parse_rule_with_empty_protocol_keeps_default() {
        let rule = parse_rule("80:vm-c:8080::2").unwrap();
        assert_eq!(rule.protocol, None);
        assert_eq!(rule.effective_protocol(), Protocol::Tcp);
        assert_eq!(rule.vm_nic_id, Some(2));
    }

    #[test]
    fn test_parse_rule_rejects_bad_input() {
        assert!(parse_rule("80:vm").is_err());
        assert!(parse_rule("80:vm:81:tcp:0:extra").is_err());
        assert!(parse_rule("70000:vm:80").is_err());
        assert!(parse_rule("80::80").is_err());
        assert!(parse_rule("80:vm:80:icmp").is_err());
        assert!(parse_rule("80:vm:80:tcp:x").is_err());
    }

    #[test]
    fn test_rule_row_json_is_flat() {
        let fields = NatRuleFields {
            external_port: "2222".to_string(),
            ..Default::default()
        };
        let row = RuleRow {
            id: "1",
            fields: &fields,
        };

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["id"], "1");
        assert_eq!(value["ExternalPort"], "2222");
    }
}
