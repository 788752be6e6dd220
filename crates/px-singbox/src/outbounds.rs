//! sing-box outbounds.
//!
//! Every canonical protocol and group becomes one outbound object whose
//! identity is its `tag` (the canonical name, unchanged). Keys are
//! snake_case — sing-box's own convention, owned here via serde renames.

use once_cell::sync::Lazy;
use serde::Serialize;

use px_model::errors::{conflict, Backend, EntityKind};
use px_model::group::{GroupOptions, Member, ProxyGroup};
use px_model::protocol::{Network, Protocol, ProtocolOptions, ShadowsocksPlugin};
use px_model::split::{classify_members, map_indexed, merge_by_index};
use px_model::{Registry, TranslateError};

use crate::shared::{OutboundMultiplex, OutboundTls, Transport};

const BACKEND: Backend = Backend::SingBox;

/// One outbound object; the `type` key selects the variant.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SingBoxOutbound {
    Shadowsocks {
        tag: String,
        server: String,
        server_port: u16,
        method: &'static str,
        password: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        plugin: Option<&'static str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        plugin_opts: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        network: Option<&'static str>,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        udp_over_tcp: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        multiplex: Option<OutboundMultiplex>,
    },
    Vmess {
        tag: String,
        server: String,
        server_port: u16,
        uuid: String,
        security: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        alter_id: Option<u16>,
        #[serde(skip_serializing_if = "Option::is_none")]
        network: Option<&'static str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tls: Option<OutboundTls>,
        #[serde(skip_serializing_if = "Option::is_none")]
        transport: Option<Transport>,
    },
    Trojan {
        tag: String,
        server: String,
        server_port: u16,
        password: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        network: Option<&'static str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tls: Option<OutboundTls>,
        #[serde(skip_serializing_if = "Option::is_none")]
        transport: Option<Transport>,
    },
    Http {
        tag: String,
        server: String,
        server_port: u16,
        #[serde(skip_serializing_if = "Option::is_none")]
        username: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        password: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tls: Option<OutboundTls>,
    },
    Socks {
        tag: String,
        server: String,
        server_port: u16,
        version: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        username: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        password: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        network: Option<&'static str>,
    },
    Tuic {
        tag: String,
        server: String,
        server_port: u16,
        uuid: String,
        password: String,
        congestion_control: &'static str,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        zero_rtt_handshake: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        tls: Option<OutboundTls>,
    },
    Wireguard {
        tag: String,
        server: String,
        server_port: u16,
        private_key: String,
        peer_public_key: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pre_shared_key: Option<String>,
        local_address: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        mtu: Option<u16>,
    },
    Selector {
        tag: String,
        outbounds: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },
    #[serde(rename = "urltest")]
    UrlTest {
        tag: String,
        outbounds: Vec<String>,
        url: String,
        /// Probe interval, seconds with unit suffix.
        interval: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        tolerance: Option<u64>,
    },
}

impl SingBoxOutbound {
    /// Canonical name, unchanged: the identifying `tag`.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            SingBoxOutbound::Shadowsocks { tag, .. }
            | SingBoxOutbound::Vmess { tag, .. }
            | SingBoxOutbound::Trojan { tag, .. }
            | SingBoxOutbound::Http { tag, .. }
            | SingBoxOutbound::Socks { tag, .. }
            | SingBoxOutbound::Tuic { tag, .. }
            | SingBoxOutbound::Wireguard { tag, .. }
            | SingBoxOutbound::Selector { tag, .. }
            | SingBoxOutbound::UrlTest { tag, .. } => tag,
        }
    }
}

/// Both-enabled is the sing-box default and is spelled by omission.
fn network_view(network: Network) -> Option<&'static str> {
    match network {
        Network::TcpAndUdp => None,
        Network::Tcp => Some("tcp"),
        Network::Udp => Some("udp"),
    }
}

fn shadowsocks(p: &Protocol) -> Result<SingBoxOutbound, TranslateError> {
    let ProtocolOptions::Shadowsocks(o) = &p.options else {
        unreachable!("registered under the shadowsocks tag");
    };
    if o.udp_over_tcp && o.multiplex.is_some() {
        return Err(conflict(
            BACKEND,
            EntityKind::Protocol,
            &p.name,
            "udp_over_tcp conflicts with multiplex",
        ));
    }
    let (plugin, plugin_opts) = match &o.plugin {
        Some(ShadowsocksPlugin::Obfs { mode, host }) => (
            Some("obfs-local"),
            Some(format!("obfs={mode};obfs-host={host}")),
        ),
        Some(ShadowsocksPlugin::V2rayPlugin {
            mode,
            host,
            path,
            tls,
        }) => {
            let mut s = format!("mode={mode};host={host};path={path}");
            if *tls {
                s.push_str(";tls");
            }
            (Some("v2ray-plugin"), Some(s))
        }
        None => (None, None),
    };
    Ok(SingBoxOutbound::Shadowsocks {
        tag: p.name.clone(),
        server: p.server.clone(),
        server_port: p.port,
        method: o.method.as_str(),
        password: o.password.clone(),
        plugin,
        plugin_opts,
        network: network_view(o.network),
        udp_over_tcp: o.udp_over_tcp,
        multiplex: o.multiplex.as_ref().map(OutboundMultiplex::from_canonical),
    })
}

fn vmess(p: &Protocol) -> Result<SingBoxOutbound, TranslateError> {
    let ProtocolOptions::Vmess(o) = &p.options else {
        unreachable!("registered under the vmess tag");
    };
    let transport = match (&o.ws, &o.h2) {
        (Some(_), Some(_)) => {
            return Err(conflict(
                BACKEND,
                EntityKind::Protocol,
                &p.name,
                "at most one transport kind may be set (ws and h2 are both present)",
            ))
        }
        (Some(ws), None) => Some(Transport::ws(ws)),
        (None, Some(h2)) => Some(Transport::h2(h2)),
        (None, None) => None,
    };
    Ok(SingBoxOutbound::Vmess {
        tag: p.name.clone(),
        server: p.server.clone(),
        server_port: p.port,
        uuid: o.uuid.clone(),
        security: o.security.as_str(),
        alter_id: (o.alter_id > 0).then_some(o.alter_id),
        network: network_view(o.network),
        tls: o.tls.as_ref().map(OutboundTls::from_canonical),
        transport,
    })
}

fn trojan(p: &Protocol) -> Result<SingBoxOutbound, TranslateError> {
    let ProtocolOptions::Trojan(o) = &p.options else {
        unreachable!("registered under the trojan tag");
    };
    Ok(SingBoxOutbound::Trojan {
        tag: p.name.clone(),
        server: p.server.clone(),
        server_port: p.port,
        password: o.password.clone(),
        network: network_view(o.network),
        tls: o.tls.as_ref().map(OutboundTls::from_canonical),
        transport: o.ws.as_ref().map(Transport::ws),
    })
}

fn http_like(p: &Protocol, tls_required: bool) -> Result<SingBoxOutbound, TranslateError> {
    let (ProtocolOptions::Http(o) | ProtocolOptions::Https(o)) = &p.options else {
        unreachable!("registered under the http/https tags");
    };
    if tls_required && o.tls.is_none() {
        return Err(conflict(
            BACKEND,
            EntityKind::Protocol,
            &p.name,
            "the https discriminant requires TLS options",
        ));
    }
    Ok(SingBoxOutbound::Http {
        tag: p.name.clone(),
        server: p.server.clone(),
        server_port: p.port,
        username: o.username.clone(),
        password: o.password.clone(),
        tls: o.tls.as_ref().map(OutboundTls::from_canonical),
    })
}

fn http(p: &Protocol) -> Result<SingBoxOutbound, TranslateError> {
    http_like(p, false)
}

fn https(p: &Protocol) -> Result<SingBoxOutbound, TranslateError> {
    http_like(p, true)
}

fn socks5(p: &Protocol) -> Result<SingBoxOutbound, TranslateError> {
    let ProtocolOptions::Socks5(o) = &p.options else {
        unreachable!("registered under the socks5 tag");
    };
    Ok(SingBoxOutbound::Socks {
        tag: p.name.clone(),
        server: p.server.clone(),
        server_port: p.port,
        version: "5",
        username: o.username.clone(),
        password: o.password.clone(),
        network: network_view(o.network),
    })
}

fn tuic(p: &Protocol) -> Result<SingBoxOutbound, TranslateError> {
    let ProtocolOptions::Tuic(o) = &p.options else {
        unreachable!("registered under the tuic tag");
    };
    Ok(SingBoxOutbound::Tuic {
        tag: p.name.clone(),
        server: p.server.clone(),
        server_port: p.port,
        uuid: o.uuid.clone(),
        password: o.token.clone(),
        congestion_control: o.congestion_control.as_str(),
        zero_rtt_handshake: o.reduce_rtt,
        tls: o.tls.as_ref().map(OutboundTls::from_canonical),
    })
}

fn wireguard(p: &Protocol) -> Result<SingBoxOutbound, TranslateError> {
    let ProtocolOptions::Wireguard(o) = &p.options else {
        unreachable!("registered under the wireguard tag");
    };
    let local_address = match (&o.address, &o.address6) {
        (Some(v4), None) => vec![v4.clone()],
        (None, Some(v6)) => vec![v6.clone()],
        (None, None) => {
            return Err(conflict(
                BACKEND,
                EntityKind::Protocol,
                &p.name,
                "one of address/address6 is required",
            ))
        }
        (Some(_), Some(_)) => {
            return Err(conflict(
                BACKEND,
                EntityKind::Protocol,
                &p.name,
                "address and address6 are mutually exclusive",
            ))
        }
    };
    Ok(SingBoxOutbound::Wireguard {
        tag: p.name.clone(),
        server: p.server.clone(),
        server_port: p.port,
        private_key: o.private_key.clone(),
        peer_public_key: o.peer_public_key.clone(),
        pre_shared_key: o.preshared_key.clone(),
        local_address,
        mtu: o.mtu,
    })
}

/// Protocol dispatch table for sing-box. naive, snell and socks5-tls
/// outbounds have no sing-box counterpart and are intentionally absent.
pub static PROXIES: Lazy<Registry<Protocol, SingBoxOutbound>> = Lazy::new(|| {
    Registry::new(BACKEND, EntityKind::Protocol)
        .with("shadowsocks", shadowsocks)
        .with("vmess", vmess)
        .with("trojan", trojan)
        .with("http", http)
        .with("https", https)
        .with("socks5", socks5)
        .with("tuic", tuic)
        .with("wireguard", wireguard)
});

/// Translate one canonical protocol into a sing-box outbound.
pub fn outbound_from_canonical(p: &Protocol) -> Result<SingBoxOutbound, TranslateError> {
    PROXIES.construct(p.tag(), p)
}

/// Member tags in original relative order.
///
/// sing-box has no proxy-provider notion; a provider member fails the
/// group rather than vanishing from it.
fn member_tags(group: &ProxyGroup) -> Result<Vec<String>, TranslateError> {
    if let Some(Member::Provider(p)) = group
        .members
        .iter()
        .find(|m| matches!(m, Member::Provider(_)))
    {
        return Err(TranslateError::UnsupportedVariant {
            backend: BACKEND,
            kind: EntityKind::ProxyProvider,
            tag: p.name.clone(),
            known: Vec::new(),
        });
    }
    let buckets = classify_members(&group.members);
    let protocols = map_indexed(&buckets.protocols, |p| {
        outbound_from_canonical(p).map(|ob| ob.tag().to_string())
    })?;
    let groups = map_indexed(&buckets.groups, |g| Ok(g.name.clone()))?;
    let names = map_indexed(&buckets.names, |n| Ok(n.to_string()))?;
    Ok(merge_by_index(vec![protocols, groups, names]))
}

fn selector(group: &ProxyGroup) -> Result<SingBoxOutbound, TranslateError> {
    Ok(SingBoxOutbound::Selector {
        tag: group.name.clone(),
        outbounds: member_tags(group)?,
        default: None,
    })
}

fn url_test(group: &ProxyGroup) -> Result<SingBoxOutbound, TranslateError> {
    let GroupOptions::UrlTest(o) = &group.options else {
        unreachable!("registered under the url-test tag");
    };
    Ok(SingBoxOutbound::UrlTest {
        tag: group.name.clone(),
        outbounds: member_tags(group)?,
        url: group.url.clone(),
        interval: format!("{}s", o.interval),
        tolerance: Some(o.tolerance),
    })
}

/// Group dispatch table for sing-box: selector and urltest only; fallback
/// and load-balance groups have no counterpart.
pub static GROUPS: Lazy<Registry<ProxyGroup, SingBoxOutbound>> = Lazy::new(|| {
    Registry::new(BACKEND, EntityKind::ProxyGroup)
        .with("select", selector)
        .with("url-test", url_test)
});

/// Translate one canonical proxy group into a selector/urltest outbound.
pub fn group_from_canonical(group: &ProxyGroup) -> Result<SingBoxOutbound, TranslateError> {
    GROUPS.construct(group.tag(), group)
}
