use px_model::provider::{RuleBehavior, RuleFormat, RuleProvider};
use px_model::rule::{Rule, RuleKind};
use px_surge::rules::{rules_from_canonical, RULES};

#[test]
fn basic_rule_renders_one_line() {
    let out = rules_from_canonical(&Rule::basic(RuleKind::Domain, "apple.com", "Direct")).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].to_string(), "DOMAIN,apple.com,Direct");
}

#[test]
fn group_rule_expansion_cardinality() {
    let rule = Rule::group(
        RuleKind::DomainSuffix,
        ["a.com", "b.com", "c.com", "d.com"],
        "Proxy",
    );
    let out = rules_from_canonical(&rule).unwrap();
    assert_eq!(out.len(), 4);
    assert!(out.iter().all(|r| r.policy == "Proxy"));
    assert_eq!(out[0].to_string(), "DOMAIN-SUFFIX,a.com,Proxy");
    assert_eq!(out[3].to_string(), "DOMAIN-SUFFIX,d.com,Proxy");
}

#[test]
fn ip_cidr_flag_values_produce_distinct_outputs() {
    let with_flag =
        rules_from_canonical(&Rule::basic(RuleKind::IpCidr, "10.0.0.0/8", "Proxy").with_no_resolve(true))
            .unwrap();
    let without_flag =
        rules_from_canonical(&Rule::basic(RuleKind::IpCidr, "10.0.0.0/8", "Proxy").with_no_resolve(false))
            .unwrap();
    assert_eq!(with_flag[0].to_string(), "IP-CIDR,10.0.0.0/8,Proxy,no-resolve");
    assert_eq!(without_flag[0].to_string(), "IP-CIDR,10.0.0.0/8,Proxy");
    assert_ne!(with_flag, without_flag);
    // The two outputs differ only in the flag.
    assert_eq!(with_flag[0].tag, without_flag[0].tag);
    assert_eq!(with_flag[0].matcher, without_flag[0].matcher);
    assert_eq!(with_flag[0].policy, without_flag[0].policy);
}

#[test]
fn geoip_supports_no_resolve_too() {
    let out =
        rules_from_canonical(&Rule::basic(RuleKind::Geoip, "CN", "Direct").with_no_resolve(true))
            .unwrap();
    assert_eq!(out[0].to_string(), "GEOIP,CN,Direct,no-resolve");
}

#[test]
fn final_rule_renders_as_final() {
    let out = rules_from_canonical(&Rule::final_rule("Proxy")).unwrap();
    assert_eq!(out[0].to_string(), "FINAL,Proxy");
}

#[test]
fn provider_matcher_resolves_to_url() {
    let provider = RuleProvider {
        name: "ads".into(),
        url: "https://rules.example.com/ads.list".into(),
        path: None,
        interval: 21_600,
        behavior: RuleBehavior::Classical,
        format: RuleFormat::Text,
    };
    let rule = Rule::from_provider(RuleKind::RuleSet, provider, "Reject");
    let out = rules_from_canonical(&rule).unwrap();
    assert_eq!(
        out[0].to_string(),
        "RULE-SET,https://rules.example.com/ads.list,Reject"
    );
}

#[test]
fn literal_rule_set_names_pass_through() {
    let out = rules_from_canonical(&Rule::basic(RuleKind::RuleSet, "SYSTEM", "Direct")).unwrap();
    assert_eq!(out[0].to_string(), "RULE-SET,SYSTEM,Direct");
}

#[test]
fn every_canonical_rule_kind_is_registered() {
    let known = RULES.known_tags();
    for tag in [
        "domain",
        "domain-suffix",
        "domain-keyword",
        "domain-set",
        "ip-cidr",
        "ip-cidr6",
        "geoip",
        "ip-asn",
        "user-agent",
        "url-regex",
        "process-name",
        "dest-port",
        "src-port",
        "src-ip",
        "protocol",
        "rule-set",
        "final",
    ] {
        assert!(known.contains(&tag), "missing {tag}");
    }
}

#[test]
fn rule_translation_is_idempotent() {
    let rule = Rule::group(RuleKind::Domain, ["a.com", "b.com"], "Proxy");
    assert_eq!(
        rules_from_canonical(&rule).unwrap(),
        rules_from_canonical(&rule).unwrap()
    );
}
