//! Cross-backend scenario: one canonical fleet description translated to
//! all three engines.

use px_model::group::{GroupOptions, Member, ProxyGroup, UrlTestOptions};
use px_model::protocol::{
    Protocol, ProtocolOptions, ShadowsocksCipher, ShadowsocksOptions, TrojanOptions,
};
use px_model::provider::{ProxyProvider, RuleBehavior, RuleFormat, RuleProvider};
use px_model::rule::{Rule, RuleKind};
use px_model::shared::Tls;
use px_model::CanonicalConfig;

fn fleet() -> CanonicalConfig {
    let ss = Protocol {
        name: "proxy-ss".into(),
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
    };
    let trojan = Protocol {
        name: "proxy-trojan".into(),
        server: "trojan.example.com".into(),
        port: 443,
        options: ProtocolOptions::Trojan(TrojanOptions {
            password: "trojan-pass".into(),
            network: Default::default(),
            tls: Some(Tls {
                server_name: Some("trojan.example.com".into()),
                ..Default::default()
            }),
            ws: None,
        }),
    };
    let pool = ProxyProvider {
        name: "remote-pool".into(),
        url: "https://sub.example.com/pool".into(),
        path: None,
        interval: 21_600,
        filter: None,
        health_check: true,
    };
    let auto = ProxyGroup {
        name: "Auto".into(),
        members: vec![
            Member::Name("proxy-ss".into()),
            Member::Name("proxy-trojan".into()),
        ],
        options: GroupOptions::UrlTest(UrlTestOptions::default()),
        url: "https://www.gstatic.com/generate_204".into(),
        udp: true,
        lazy: true,
    };
    let ads = RuleProvider {
        name: "ads".into(),
        url: "https://rules.example.com/ads.list".into(),
        path: None,
        interval: 86_400,
        behavior: RuleBehavior::Domain,
        format: RuleFormat::Text,
    };
    CanonicalConfig {
        protocols: vec![ss, trojan],
        groups: vec![auto],
        providers: vec![pool],
        rule_providers: vec![ads.clone()],
        rules: vec![
            Rule::from_provider(RuleKind::RuleSet, ads, "reject"),
            Rule::group(RuleKind::DomainSuffix, ["example.com", "example.org"], "Auto"),
            Rule::basic(RuleKind::IpCidr, "10.0.0.0/8", "direct").with_no_resolve(true),
            Rule::final_rule("Auto"),
        ],
    }
}

#[test]
fn fleet_validates() {
    fleet().validate().unwrap();
}

#[test]
fn canonical_names_survive_every_backend() {
    let cfg = fleet();

    let clash = px_clash::config_from_canonical(&cfg).unwrap();
    let clash_names: Vec<&str> = clash.proxies.iter().map(|p| p.name()).collect();
    assert_eq!(clash_names, ["proxy-ss", "proxy-trojan"]);
    assert!(clash.proxy_providers.contains_key("remote-pool"));

    let surge = px_surge::config_from_canonical(&cfg).unwrap();
    let surge_names: Vec<&str> = surge.proxies.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(surge_names, ["proxy-ss", "proxy-trojan"]);

    let singbox = px_singbox::config_from_canonical(&cfg).unwrap();
    let tags: Vec<&str> = singbox.outbounds.iter().map(|o| o.tag()).collect();
    assert_eq!(tags, ["proxy-ss", "proxy-trojan", "Auto"]);
}

#[test]
fn surge_shadowsocks_golden_line() {
    let cfg = fleet();
    let surge = px_surge::config_from_canonical(&cfg).unwrap();
    assert_eq!(
        surge.proxies[0].to_string(),
        "proxy-ss = ss, localhost, 1080, encrypt-method=aes-256-gcm, password=pass, udp-relay=true"
    );
}

#[test]
fn surge_render_emits_all_sections() {
    let rendered = px_surge::config_from_canonical(&fleet()).unwrap().render();
    assert!(rendered.contains("[Proxy]\n"));
    assert!(rendered.contains("[Proxy Group]\n"));
    assert!(rendered.contains("[Rule]\n"));
    assert!(rendered.contains("remote-pool = select, policy-path=https://sub.example.com/pool"));
    assert!(rendered.contains("IP-CIDR,10.0.0.0/8,direct,no-resolve\n"));
    assert!(rendered.contains("FINAL,Auto\n"));
    // Group rules keep one line per matcher.
    assert!(rendered.contains("DOMAIN-SUFFIX,example.com,Auto\n"));
    assert!(rendered.contains("DOMAIN-SUFFIX,example.org,Auto\n"));
}

#[test]
fn clash_yaml_round_trips_through_serde() {
    let clash = px_clash::config_from_canonical(&fleet()).unwrap();
    let yaml = serde_yaml::to_string(&clash).unwrap();
    assert!(yaml.contains("proxy-ss"));
    assert!(yaml.contains("RULE-SET,ads,reject"));
    let reparsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(reparsed["mode"], serde_yaml::Value::from("rule"));
}

#[test]
fn whole_pipeline_is_deterministic() {
    let cfg = fleet();
    assert_eq!(
        px_clash::config_from_canonical(&cfg).unwrap(),
        px_clash::config_from_canonical(&cfg).unwrap()
    );
    assert_eq!(
        px_surge::config_from_canonical(&cfg).unwrap(),
        px_surge::config_from_canonical(&cfg).unwrap()
    );
    assert_eq!(
        px_singbox::config_from_canonical(&cfg).unwrap(),
        px_singbox::config_from_canonical(&cfg).unwrap()
    );
}

#[test]
fn canonical_config_parses_from_toml() {
    let doc = r#"
[[protocols]]
name = "proxy-ss"
server = "localhost"
port = 1080
type = "shadowsocks"
method = "aes-256-gcm"
password = "pass"

[[rules]]
type = "domain-suffix"
matcher = "example.com"
policy = "proxy-ss"

[[rules]]
type = "final"
policy = "proxy-ss"
"#;
    let cfg: CanonicalConfig = toml::from_str(doc).unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.protocols.len(), 1);
    assert_eq!(cfg.protocols[0].tag(), "shadowsocks");
    let surge = px_surge::config_from_canonical(&cfg).unwrap();
    assert_eq!(surge.rules.len(), 2);
}
