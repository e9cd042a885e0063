//! 端口转发配置构建测试

mod common;

use common::*;
use vcd_transport::{Method, XmlDocument};
use vcd_vappnet::*;

fn rules(doc: &XmlDocument) -> Vec<Vec<(String, String)>> {
    doc.root()
        .find_all("VmRule")
        .into_iter()
        .map(|vm_rule| {
            vm_rule
                .elements()
                .map(|field| (field.local_name().to_string(), field.text()))
                .collect()
        })
        .collect()
}

fn pairs(fields: &[(&str, &str)]) -> Vec<(String, String)> {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_single_put_without_prior_get() {
    let transport = FakeTransport::new().respond_task("pf-1");
    let api = VAppNetworkApi::new(&transport);

    let config = PortForwardingConfig::new("ext-net", vec![NatRuleSpec::new(2222, "vm-a", 22)]);
    let task_id = api
        .set_port_forwarding_rules("42", "net1", &config)
        .await
        .unwrap();
    assert_eq!(task_id, "pf-1");

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Put);
    assert_eq!(requests[0].path, "/vApp/vapp-42/networkConfigSection");
    assert_eq!(
        requests[0].content_type.as_deref(),
        Some(NETWORK_CONFIG_SECTION_CONTENT_TYPE)
    );
}

#[tokio::test]
async fn test_rules_written_in_input_order_with_defaults() {
    let transport = FakeTransport::new().respond_task("t");
    let api = VAppNetworkApi::new(&transport);

    let config = PortForwardingConfig::new(
        "ext-net",
        vec![
            NatRuleSpec::new(2222, "vm-a", 22),
            NatRuleSpec::new(5353, "vm-b", 53)
                .with_protocol(Protocol::Udp)
                .with_vm_nic_id(1),
            NatRuleSpec::new(8443, "vm-c", 443).with_protocol(Protocol::TcpUdp),
        ],
    );
    api.set_port_forwarding_rules("42", "web", &config).await.unwrap();

    let doc = XmlDocument::parse(&transport.put_bodies()[0]).unwrap();
    assert_eq!(doc.root().find_all("NatRule").len(), 3);
    assert_eq!(
        rules(&doc),
        vec![
            pairs(&[
                ("ExternalPort", "2222"),
                ("VAppScopedVmId", "vm-a"),
                ("VmNicId", "0"),
                ("InternalPort", "22"),
                ("Protocol", "TCP"),
            ]),
            pairs(&[
                ("ExternalPort", "5353"),
                ("VAppScopedVmId", "vm-b"),
                ("VmNicId", "1"),
                ("InternalPort", "53"),
                ("Protocol", "UDP"),
            ]),
            pairs(&[
                ("ExternalPort", "8443"),
                ("VAppScopedVmId", "vm-c"),
                ("VmNicId", "0"),
                ("InternalPort", "443"),
                ("Protocol", "TCP_UDP"),
            ]),
        ]
    );

    let nat_service = doc.root().find("NatService").unwrap();
    assert_eq!(nat_service.child("IsEnabled").unwrap().text(), "true");
    assert_eq!(nat_service.child("NatType").unwrap().text(), "portForwarding");
    assert_eq!(nat_service.child("Policy").unwrap().text(), "allowTraffic");
    assert_eq!(doc.root().find("FenceMode").unwrap().text(), "isolated");
}

#[tokio::test]
async fn test_document_targets_named_network() {
    let transport = FakeTransport::new().respond_task("t");
    let api = VAppNetworkApi::new(&transport);

    let config = PortForwardingConfig::new("ext-net", vec![])
        .with_fence_mode(FenceMode::NatRouted)
        .with_nat_policy(NatPolicy::AllowTrafficIn);
    api.set_port_forwarding_rules("42", "web", &config).await.unwrap();

    let doc = XmlDocument::parse(&transport.put_bodies()[0]).unwrap();
    let networks: Vec<_> = doc.root().children_named("NetworkConfig").collect();
    assert_eq!(networks.len(), 1);
    assert_eq!(networks[0].attr("networkName"), Some("web"));

    let configuration = networks[0].child("Configuration").unwrap();
    assert_eq!(
        configuration.child("ParentNetwork").unwrap().attr("href"),
        Some("https://vcd.example.com/api/network/ext-net")
    );
    assert_eq!(configuration.child("FenceMode").unwrap().text(), "natRouted");
    assert_eq!(doc.root().find("Policy").unwrap().text(), "allowTrafficIn");
    assert!(doc.root().find("NatRule").is_none());
    assert_eq!(
        doc.root().child("Info").unwrap().text(),
        "Network configuration"
    );
}

#[tokio::test]
async fn test_missing_location_is_error() {
    let transport = FakeTransport::new().respond_without_location();
    let api = VAppNetworkApi::new(&transport);

    let config = PortForwardingConfig::new("ext-net", vec![NatRuleSpec::new(80, "vm-a", 80)]);
    let err = api
        .set_port_forwarding_rules("42", "net1", &config)
        .await
        .unwrap_err();
    assert!(matches!(err, VAppNetError::MissingTaskLocation));
}
