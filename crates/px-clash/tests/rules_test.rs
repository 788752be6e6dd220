use px_clash::rules::{rules_from_canonical, RULES};
use px_model::provider::{RuleBehavior, RuleFormat, RuleProvider};
use px_model::rule::{Rule, RuleKind};
use px_model::TranslateError;

#[test]
fn basic_rule_yields_one_classical_line() {
    let rule = Rule::basic(RuleKind::DomainSuffix, "example.com", "Proxy");
    let out = rules_from_canonical(&rule).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].to_string(), "DOMAIN-SUFFIX,example.com,Proxy");
}

#[test]
fn group_rule_expands_to_n_lines_sharing_one_policy() {
    let rule = Rule::group(RuleKind::Domain, ["a.com", "b.com"], "Proxy");
    let out = rules_from_canonical(&rule).unwrap();
    let lines: Vec<String> = out.iter().map(ToString::to_string).collect();
    assert_eq!(lines, ["DOMAIN,a.com,Proxy", "DOMAIN,b.com,Proxy"]);
}

#[test]
fn final_rule_renders_as_match() {
    let out = rules_from_canonical(&Rule::final_rule("Proxy")).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].to_string(), "MATCH,Proxy");
}

#[test]
fn no_resolve_is_never_defaulted() {
    let with_flag = Rule::basic(RuleKind::IpCidr, "10.0.0.0/8", "Proxy").with_no_resolve(true);
    let without_flag = Rule::basic(RuleKind::IpCidr, "10.0.0.0/8", "Proxy").with_no_resolve(false);
    let unset = Rule::basic(RuleKind::IpCidr, "10.0.0.0/8", "Proxy");

    let a = &rules_from_canonical(&with_flag).unwrap()[0];
    let b = &rules_from_canonical(&without_flag).unwrap()[0];
    let c = &rules_from_canonical(&unset).unwrap()[0];

    assert_eq!(a.to_string(), "IP-CIDR,10.0.0.0/8,Proxy,no-resolve");
    assert_eq!(b.to_string(), "IP-CIDR,10.0.0.0/8,Proxy");
    // The flag value survives in the typed output even when the rendered
    // line cannot show the difference.
    assert_eq!(a.no_resolve, Some(true));
    assert_eq!(b.no_resolve, Some(false));
    assert_eq!(c.no_resolve, None);
    assert_ne!(a, b);
    assert_ne!(b, c);
}

#[test]
fn provider_matcher_resolves_to_provider_name() {
    let provider = RuleProvider {
        name: "ads".into(),
        url: "https://rules.example.com/ads.txt".into(),
        path: None,
        interval: 21_600,
        behavior: RuleBehavior::Domain,
        format: RuleFormat::Text,
    };
    let rule = Rule::from_provider(RuleKind::RuleSet, provider, "Reject");
    let out = rules_from_canonical(&rule).unwrap();
    assert_eq!(out[0].to_string(), "RULE-SET,ads,Reject");
}

#[test]
fn unknown_discriminant_is_fatal_and_named() {
    let rule = Rule::basic(RuleKind::UserAgent, "curl*", "Direct");
    match rules_from_canonical(&rule).unwrap_err() {
        TranslateError::UnsupportedVariant { tag, known, .. } => {
            assert_eq!(tag, "user-agent");
            assert!(known.contains(&"domain"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn rule_translation_is_idempotent() {
    let rule = Rule::group(RuleKind::IpCidr, ["10.0.0.0/8", "172.16.0.0/12"], "Lan")
        .with_no_resolve(true);
    assert_eq!(
        rules_from_canonical(&rule).unwrap(),
        rules_from_canonical(&rule).unwrap()
    );
}

#[test]
fn serialized_rule_is_the_classical_string() {
    let rule = Rule::basic(RuleKind::Geoip, "CN", "Direct").with_no_resolve(true);
    let out = rules_from_canonical(&rule).unwrap();
    assert_eq!(
        serde_yaml::to_string(&out).unwrap().trim(),
        "- GEOIP,CN,Direct,no-resolve"
    );
}

#[test]
fn registry_reports_supported_rule_kinds() {
    let known = RULES.known_tags();
    for tag in ["domain", "ip-cidr", "rule-set", "final"] {
        assert!(known.contains(&tag), "missing {tag}");
    }
    assert!(!known.contains(&"url-regex"));
}
