//! 网络配置合并编辑
//!
//! 取回 vApp 现有的网络配置段，只修改调用方指定的字段，
//! 然后把整份文档（而不仅是被修改的网络）回写。

use tracing::{info, warn};
use vcd_transport::{Element, Transport, XmlDocument};

use super::VAppNetworkApi;
use crate::error::{Result, VAppNetError};
use crate::models::{NetworkConfigEdits, ParentNetworkRef};

impl<'a, T: Transport + ?Sized> VAppNetworkApi<'a, T> {
    /// 合并编辑指定网络的配置，返回异步任务 ID
    ///
    /// 依次发出一次 GET 和一次 PUT。网络不存在或文档缺少必须节点时，
    /// 在 PUT 之前返回错误。
    pub async fn set_network_config(
        &self,
        vapp_id: &str,
        network_name: &str,
        edits: &NetworkConfigEdits,
    ) -> Result<String> {
        info!("合并编辑 vApp 网络配置: vapp={}, network={}", vapp_id, network_name);

        let mut document = self.fetch_section(vapp_id).await?;
        merge_network_config(&mut document, self.api_url(), network_name, edits)?;

        let task_id = self.put_section(vapp_id, &document).await?;
        info!("网络配置已提交: vapp={}, task={}", vapp_id, task_id);
        Ok(task_id)
    }
}

/// 在文档上原地应用编辑
///
/// - 按 `networkName` 选中第一个匹配的 `NetworkConfig`
/// - 设置了 `fence_mode` 时覆盖 `FenceMode`
/// - `IsInherited` 一律置为 `true`
/// - 设置了 `parent_network` 时覆盖已有 `ParentNetwork` 的属性，
///   不存在则新建并插入到 `IpScopes` 之后
pub fn merge_network_config(
    document: &mut XmlDocument,
    api_url: &str,
    network_name: &str,
    edits: &NetworkConfigEdits,
) -> Result<()> {
    let network = select_network_mut(document.root_mut(), network_name)?;

    if let Some(fence_mode) = edits.fence_mode {
        network
            .find_mut("FenceMode")
            .ok_or_else(|| VAppNetError::MissingElement("FenceMode".to_string()))?
            .set_text(fence_mode.as_str());
    }

    network
        .find_mut("IsInherited")
        .ok_or_else(|| VAppNetError::MissingElement("IsInherited".to_string()))?
        .set_text("true");

    if let Some(parent) = &edits.parent_network {
        apply_parent_network(network, api_url, parent)?;
    }

    Ok(())
}

/// 按名称选中网络配置，重名时取第一个
fn select_network_mut<'d>(root: &'d mut Element, network_name: &str) -> Result<&'d mut Element> {
    let matches: Vec<usize> = root
        .children()
        .iter()
        .enumerate()
        .filter(|(_, node)| {
            node.as_element().is_some_and(|el| {
                el.local_name() == "NetworkConfig" && el.attr("networkName") == Some(network_name)
            })
        })
        .map(|(index, _)| index)
        .collect();

    let index = *matches
        .first()
        .ok_or_else(|| VAppNetError::NetworkNotFound(network_name.to_string()))?;
    if matches.len() > 1 {
        warn!(
            "存在 {} 个名为 {} 的网络配置，仅修改第一个",
            matches.len(),
            network_name
        );
    }

    root.element_at_mut(index)
        .ok_or_else(|| VAppNetError::NetworkNotFound(network_name.to_string()))
}

/// 设置父网络引用
fn apply_parent_network(network: &mut Element, api_url: &str, parent: &ParentNetworkRef) -> Result<()> {
    let href = format!("{}/admin/network/{}", api_url, parent.id);

    if let Some(existing) = network.find_mut("ParentNetwork") {
        existing.set_attr("name", parent.name.as_str());
        existing.set_attr("id", parent.id.as_str());
        existing.set_attr("href", href);
        return Ok(());
    }

    // schema 要求 ParentNetwork 紧跟在 IpScopes 之后
    let holder = network
        .find_parent_of_mut("IpScopes")
        .ok_or_else(|| VAppNetError::MissingElement("IpScopes".to_string()))?;
    let anchor = holder
        .position_of_child("IpScopes")
        .ok_or_else(|| VAppNetError::MissingElement("IpScopes".to_string()))?;

    let parent_network = Element::new("ParentNetwork")
        .with_attr("name", parent.name.as_str())
        .with_attr("id", parent.id.as_str())
        .with_attr("href", href);
    holder.insert_child_at(anchor + 1, parent_network);

    Ok(())
}
