//! 测试公共工具：可录制请求的假传输与配置段样例

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, LOCATION};
use vcd_transport::{
    Result, Transport, TransportError, TransportRequest, TransportResponse, XmlDocument,
};

pub const API_URL: &str = "https://vcd.example.com/api";

/// 按顺序返回预置响应，并记录收到的每个请求
pub struct FakeTransport {
    responses: Mutex<VecDeque<Result<TransportResponse>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 预置一个携带文档的 200 响应
    pub fn respond_document(self, xml: &str) -> Self {
        let document = XmlDocument::parse(xml).unwrap();
        self.push(Ok(TransportResponse::new(200, HeaderMap::new(), Some(document))))
    }

    /// 预置一个接受异步任务的 202 响应
    pub fn respond_task(self, task_id: &str) -> Self {
        let mut headers = HeaderMap::new();
        let location = format!("{}/task/{}", API_URL, task_id);
        headers.insert(LOCATION, HeaderValue::from_str(&location).unwrap());
        self.push(Ok(TransportResponse::new(202, headers, None)))
    }

    /// 预置一个没有 Location 头的 202 响应
    pub fn respond_without_location(self) -> Self {
        self.push(Ok(TransportResponse::new(202, HeaderMap::new(), None)))
    }

    /// 预置一个空响应体的 200 响应
    pub fn respond_empty(self) -> Self {
        self.push(Ok(TransportResponse::new(200, HeaderMap::new(), None)))
    }

    /// 预置一个传输错误
    pub fn respond_error(self, err: TransportError) -> Self {
        self.push(Err(err))
    }

    fn push(self, response: Result<TransportResponse>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// 已收到的请求
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// 已收到的 PUT 请求体
    pub fn put_bodies(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|req| req.method == vcd_transport::Method::Put)
            .filter_map(|req| req.body)
            .collect()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    fn api_url(&self) -> &str {
        API_URL
    }

    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Http("没有预置的响应".to_string())))
    }
}

// ============================================
// 配置段样例
// ============================================

pub const SECTION_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<NetworkConfigSection xmlns="http://www.vmware.com/vcloud/v1.5" xmlns:ovf="http://schemas.dmtf.org/ovf/envelope/1" href="https://vcd.example.com/api/vApp/vapp-42/networkConfigSection/" type="application/vnd.vmware.vcloud.networkConfigSection+xml" ovf:required="false">
    <ovf:Info>The configuration parameters for logical networks</ovf:Info>
    <Link rel="edit" href="https://vcd.example.com/api/vApp/vapp-42/networkConfigSection/" type="application/vnd.vmware.vcloud.networkConfigSection+xml"/>
"#;

pub const SECTION_TAIL: &str = "</NetworkConfigSection>\n";

/// 断开网卡使用的占位网络
pub const NETWORK_NONE: &str = r#"    <NetworkConfig networkName="none">
        <Description>This is a special place-holder used for disconnected network interfaces.</Description>
        <Configuration>
            <IpScopes>
                <IpScope>
                    <IsInherited>false</IsInherited>
                    <Gateway>196.254.254.254</Gateway>
                    <Netmask>255.255.0.0</Netmask>
                    <Dns1>196.254.254.254</Dns1>
                </IpScope>
            </IpScopes>
            <FenceMode>isolated</FenceMode>
        </Configuration>
        <IsDeployed>false</IsDeployed>
    </NetworkConfig>
"#;

/// 没有父网络的隔离网络
pub const NETWORK_ISOLATED: &str = r#"    <NetworkConfig networkName="net1">
        <Description/>
        <Configuration>
            <IpScopes>
                <IpScope>
                    <IsInherited>false</IsInherited>
                    <Gateway>192.168.2.1</Gateway>
                    <Netmask>255.255.255.0</Netmask>
                    <IsEnabled>true</IsEnabled>
                    <IpRanges>
                        <IpRange>
                            <StartAddress>192.168.2.100</StartAddress>
                            <EndAddress>192.168.2.199</EndAddress>
                        </IpRange>
                    </IpRanges>
                </IpScope>
            </IpScopes>
            <FenceMode>isolated</FenceMode>
            <RetainNetInfoAcrossDeployments>false</RetainNetInfoAcrossDeployments>
        </Configuration>
        <IsDeployed>false</IsDeployed>
    </NetworkConfig>
"#;

/// 已有父网络的路由网络
pub const NETWORK_ROUTED: &str = r#"    <NetworkConfig networkName="routed">
        <Configuration>
            <IpScopes>
                <IpScope>
                    <IsInherited>false</IsInherited>
                    <Gateway>192.168.3.1</Gateway>
                    <Netmask>255.255.255.0</Netmask>
                </IpScope>
            </IpScopes>
            <ParentNetwork href="https://vcd.example.com/api/admin/network/old-id" id="old-id" name="old-net"/>
            <FenceMode>natRouted</FenceMode>
        </Configuration>
        <IsDeployed>true</IsDeployed>
    </NetworkConfig>
"#;

/// 由若干网络片段拼出完整配置段
pub fn section(networks: &[&str]) -> String {
    let mut xml = String::from(SECTION_HEAD);
    for network in networks {
        xml.push_str(network);
    }
    xml.push_str(SECTION_TAIL);
    xml
}

/// 端口转发模式的网络片段
pub fn nat_network(name: &str, fence_mode: &str, nat_type: &str, external_ip: Option<&str>) -> String {
    let router_info = external_ip
        .map(|ip| {
            format!(
                "\n            <RouterInfo>\n                <ExternalIp>{}</ExternalIp>\n            </RouterInfo>",
                ip
            )
        })
        .unwrap_or_default();

    format!(
        r#"    <NetworkConfig networkName="{name}">
        <Configuration>
            <IpScopes>
                <IpScope>
                    <IsInherited>false</IsInherited>
                    <Gateway>192.168.10.1</Gateway>
                    <Netmask>255.255.255.0</Netmask>
                </IpScope>
            </IpScopes>
            <ParentNetwork href="https://vcd.example.com/api/network/ext" id="ext" name="external"/>
            <FenceMode>{fence_mode}</FenceMode>
            <RetainNetInfoAcrossDeployments>false</RetainNetInfoAcrossDeployments>
            <Features>
                <FirewallService>
                    <IsEnabled>true</IsEnabled>
                </FirewallService>
                <NatService>
                    <IsEnabled>true</IsEnabled>
                    <NatType>{nat_type}</NatType>
                    <Policy>allowTraffic</Policy>
                    <NatRule>
                        <Id>1</Id>
                        <VmRule>
                            <ExternalIpAddress>10.20.30.40</ExternalIpAddress>
                            <ExternalPort>2222</ExternalPort>
                            <VAppScopedVmId>a1b2-c3</VAppScopedVmId>
                            <VmNicId>0</VmNicId>
                            <InternalPort>22</InternalPort>
                            <Protocol>TCP</Protocol>
                        </VmRule>
                    </NatRule>
                    <NatRule>
                        <Id>2</Id>
                        <VmRule>
                            <ExternalIpAddress>10.20.30.40</ExternalIpAddress>
                            <ExternalPort>8080</ExternalPort>
                            <VAppScopedVmId>d4e5-f6</VAppScopedVmId>
                            <VmNicId>1</VmNicId>
                            <InternalPort>80</InternalPort>
                            <Protocol>TCP_UDP</Protocol>
                        </VmRule>
                    </NatRule>
                </NatService>
            </Features>{router_info}
        </Configuration>
        <IsDeployed>true</IsDeployed>
    </NetworkConfig>
"#
    )
}
