use px_clash::proxies::{proxy_from_canonical, PROXIES};
use px_clash::ClashProxy;
use px_model::protocol::{
    HttpOptions, NaiveOptions, Protocol, ProtocolOptions, ShadowsocksCipher, ShadowsocksOptions,
    VmessOptions,
};
use px_model::shared::{H2Transport, Tls, WsTransport};
use px_model::TranslateError;
use serde_json::json;

fn shadowsocks(name: &str) -> Protocol {
    Protocol {
        name: name.into(),
        server: "localhost".into(),
        port: 1080,
        options: ProtocolOptions::Shadowsocks(ShadowsocksOptions {
            method: ShadowsocksCipher::Aes256Gcm,
            password: "pass".into(),
            network: Default::default(),
            plugin: None,
            udp_over_tcp: false,
            multiplex: None,
        }),
    }
}

#[test]
fn shadowsocks_maps_to_ss_entry() {
    let out = proxy_from_canonical(&shadowsocks("proxy-ss")).unwrap();
    let value = serde_json::to_value(&out).unwrap();
    assert_eq!(
        value,
        json!({
            "type": "ss",
            "name": "proxy-ss",
            "server": "localhost",
            "port": 1080,
            "cipher": "aes-256-gcm",
            "password": "pass",
            "udp": true,
        })
    );
}

#[test]
fn canonical_name_is_the_identifying_key() {
    let out = proxy_from_canonical(&shadowsocks("节点 A")).unwrap();
    assert_eq!(out.name(), "节点 A");
}

#[test]
fn translation_is_idempotent() {
    let p = shadowsocks("proxy-ss");
    assert_eq!(
        proxy_from_canonical(&p).unwrap(),
        proxy_from_canonical(&p).unwrap()
    );
}

#[test]
fn naive_is_unsupported_and_names_the_tag() {
    let p = Protocol {
        name: "naive-node".into(),
        server: "example.com".into(),
        port: 443,
        options: ProtocolOptions::Naive(NaiveOptions {
            username: "user".into(),
            password: "pass".into(),
            proto: "http2".into(),
        }),
    };
    match proxy_from_canonical(&p).unwrap_err() {
        TranslateError::UnsupportedVariant { tag, known, .. } => {
            assert_eq!(tag, "naive");
            assert!(known.contains(&"shadowsocks"));
            assert!(!known.contains(&"naive"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn known_tags_are_sorted_and_stable() {
    let tags = PROXIES.known_tags();
    let mut sorted = tags.clone();
    sorted.sort_unstable();
    assert_eq!(tags, sorted);
    assert_eq!(tags, PROXIES.known_tags());
}

#[test]
fn https_without_tls_is_a_conflict() {
    let p = Protocol {
        name: "corp-https".into(),
        server: "proxy.corp.example".into(),
        port: 443,
        options: ProtocolOptions::Https(HttpOptions {
            username: Some("user".into()),
            password: Some("pass".into()),
            tls: None,
        }),
    };
    match proxy_from_canonical(&p).unwrap_err() {
        TranslateError::ValidationConflict { entity, .. } => assert_eq!(entity, "corp-https"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn vmess_with_two_transports_is_a_conflict() {
    let p = Protocol {
        name: "vmess-node".into(),
        server: "example.com".into(),
        port: 443,
        options: ProtocolOptions::Vmess(VmessOptions {
            uuid: "0233d11c-15a4-47d3-ade3-48ffca0ce119".into(),
            alter_id: 0,
            security: Default::default(),
            network: Default::default(),
            tls: None,
            ws: Some(WsTransport::default()),
            h2: Some(H2Transport::default()),
        }),
    };
    assert!(matches!(
        proxy_from_canonical(&p).unwrap_err(),
        TranslateError::ValidationConflict { .. }
    ));
}

#[test]
fn vmess_ws_renders_network_and_opts() {
    let p = Protocol {
        name: "vmess-ws".into(),
        server: "example.com".into(),
        port: 443,
        options: ProtocolOptions::Vmess(VmessOptions {
            uuid: "0233d11c-15a4-47d3-ade3-48ffca0ce119".into(),
            alter_id: 0,
            security: Default::default(),
            network: Default::default(),
            tls: Some(Tls {
                server_name: Some("cdn.example.com".into()),
                verify: false,
                ..Default::default()
            }),
            ws: Some(WsTransport {
                path: Some("/tunnel".into()),
                headers: None,
            }),
            h2: None,
        }),
    };
    let ClashProxy::Vmess(v) = proxy_from_canonical(&p).unwrap() else {
        panic!("expected a vmess entry");
    };
    assert_eq!(v.network, Some("ws"));
    assert_eq!(v.ws_opts.as_ref().unwrap().path.as_deref(), Some("/tunnel"));
    assert_eq!(v.tls, Some(true));
    assert_eq!(v.skip_cert_verify, Some(true));
    assert_eq!(v.servername.as_deref(), Some("cdn.example.com"));
}
