use px_model::group::{GroupOptions, LoadBalanceOptions, Member, ProxyGroup, UrlTestOptions};
use px_model::protocol::{
    Network, Protocol, ProtocolOptions, ShadowsocksCipher, ShadowsocksOptions, Socks5Options,
    VmessOptions, WireguardOptions,
};
use px_model::provider::ProxyProvider;
use px_model::shared::{Tls, WsTransport};
use px_model::TranslateError;
use px_surge::groups::group_from_canonical;
use px_surge::providers::provider_from_canonical;
use px_surge::proxies::proxy_from_canonical;

fn shadowsocks(name: &str, network: Network) -> Protocol {
    Protocol {
        name: name.into(),
        server: "localhost".into(),
        port: 1080,
        options: ProtocolOptions::Shadowsocks(ShadowsocksOptions {
            method: ShadowsocksCipher::Aes256Gcm,
            password: "pass".into(),
            network,
            plugin: None,
            udp_over_tcp: false,
            multiplex: None,
        }),
    }
}

#[test]
fn shadowsocks_line_matches_surge_syntax_exactly() {
    let line = proxy_from_canonical(&shadowsocks("proxy-ss", Network::TcpAndUdp)).unwrap();
    assert_eq!(
        line.to_string(),
        "proxy-ss = ss, localhost, 1080, encrypt-method=aes-256-gcm, password=pass, udp-relay=true"
    );
}

#[test]
fn tcp_only_shadowsocks_disables_udp_relay() {
    let line = proxy_from_canonical(&shadowsocks("proxy-ss", Network::Tcp)).unwrap();
    assert!(line.to_string().ends_with("udp-relay=false"));
}

#[test]
fn name_is_the_line_key_verbatim() {
    let line = proxy_from_canonical(&shadowsocks("My Proxy (HK)", Network::TcpAndUdp)).unwrap();
    assert!(line.to_string().starts_with("My Proxy (HK) = ss, "));
}

#[test]
fn socks5_tls_line_places_credentials_positionally() {
    let p = Protocol {
        name: "ProxySOCKS5TLS".into(),
        server: "1.2.3.4".into(),
        port: 443,
        options: ProtocolOptions::Socks5Tls(Socks5Options {
            username: Some("username".into()),
            password: Some("password".into()),
            tls: Some(Tls {
                verify: false,
                ..Default::default()
            }),
            network: Network::TcpAndUdp,
        }),
    };
    assert_eq!(
        proxy_from_canonical(&p).unwrap().to_string(),
        "ProxySOCKS5TLS = socks5-tls, 1.2.3.4, 443, username, password, skip-cert-verify=true"
    );
}

#[test]
fn vmess_line_uses_uuid_as_username() {
    let p = Protocol {
        name: "ProxyVMess".into(),
        server: "1.2.3.4".into(),
        port: 8000,
        options: ProtocolOptions::Vmess(VmessOptions {
            uuid: "0233d11c-15a4-47d3-ade3-48ffca0ce119".into(),
            alter_id: 0,
            security: Default::default(),
            network: Default::default(),
            tls: None,
            ws: Some(WsTransport {
                path: Some("/ws".into()),
                headers: None,
            }),
            h2: None,
        }),
    };
    assert_eq!(
        proxy_from_canonical(&p).unwrap().to_string(),
        "ProxyVMess = vmess, 1.2.3.4, 8000, username=0233d11c-15a4-47d3-ade3-48ffca0ce119, ws=true, ws-path=/ws"
    );
}

#[test]
fn vmess_with_two_transports_is_a_conflict() {
    use px_model::shared::H2Transport;
    let p = Protocol {
        name: "vmess-node".into(),
        server: "example.com".into(),
        port: 443,
        options: ProtocolOptions::Vmess(VmessOptions {
            uuid: "uuid".into(),
            alter_id: 0,
            security: Default::default(),
            network: Default::default(),
            tls: None,
            ws: Some(WsTransport::default()),
            h2: Some(H2Transport::default()),
        }),
    };
    match proxy_from_canonical(&p).unwrap_err() {
        TranslateError::ValidationConflict { entity, .. } => assert_eq!(entity, "vmess-node"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn wireguard_has_no_surge_counterpart() {
    let p = Protocol {
        name: "wg-node".into(),
        server: "vpn.example.com".into(),
        port: 51820,
        options: ProtocolOptions::Wireguard(WireguardOptions {
            private_key: "privkey".into(),
            peer_public_key: "pubkey".into(),
            preshared_key: None,
            address: Some("10.0.0.2/32".into()),
            address6: None,
            mtu: None,
            keepalive: None,
        }),
    };
    assert!(matches!(
        proxy_from_canonical(&p).unwrap_err(),
        TranslateError::UnsupportedVariant { tag, .. } if tag == "wireguard"
    ));
}

fn group(name: &str, options: GroupOptions, members: Vec<Member>) -> ProxyGroup {
    ProxyGroup {
        name: name.into(),
        members,
        options,
        url: "http://www.gstatic.com/generate_204".into(),
        udp: true,
        lazy: true,
    }
}

#[test]
fn select_group_joins_member_names_in_order() {
    let g = group(
        "Main",
        GroupOptions::Select,
        vec![
            Member::Name("node-a".into()),
            Member::Name("node-b".into()),
            Member::Name("DIRECT".into()),
        ],
    );
    assert_eq!(
        group_from_canonical(&g).unwrap().to_string(),
        "Main = select, node-a, node-b, DIRECT"
    );
}

#[test]
fn url_test_group_appends_probe_options() {
    let g = group(
        "Auto",
        GroupOptions::UrlTest(UrlTestOptions {
            interval: 60,
            tolerance: 300,
            timeout: 5,
        }),
        vec![Member::Name("node-a".into()), Member::Name("node-b".into())],
    );
    assert_eq!(
        group_from_canonical(&g).unwrap().to_string(),
        "Auto = url-test, node-a, node-b, url=http://www.gstatic.com/generate_204, interval=60, tolerance=300, timeout=5"
    );
}

#[test]
fn load_balance_maps_consistent_hashing_to_persistent() {
    let g = group(
        "Pool",
        GroupOptions::LoadBalance(LoadBalanceOptions {
            strategy: Some(px_model::group::BalanceStrategy::ConsistentHashing),
        }),
        vec![Member::Name("node-a".into())],
    );
    assert_eq!(
        group_from_canonical(&g).unwrap().to_string(),
        "Pool = load-balance, node-a, persistent=true"
    );
}

#[test]
fn provider_becomes_external_policy_group() {
    let p = ProxyProvider {
        name: "remote-pool".into(),
        url: "https://sub.example.com/surge".into(),
        path: None,
        interval: 21_600,
        filter: Some("HK|SG".into()),
        health_check: true,
    };
    assert_eq!(
        provider_from_canonical(&p).to_string(),
        "remote-pool = select, policy-path=https://sub.example.com/surge, update-interval=21600, policy-regex-filter=HK|SG"
    );
}
