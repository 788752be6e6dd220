//! Clash proxy entries.
//!
//! Field naming (kebab-case, plus Clash's own `alterId`) is owned by this
//! backend and applied through serde renames; callers never configure it.

use once_cell::sync::Lazy;
use serde::Serialize;

use px_model::errors::{conflict, Backend, EntityKind};
use px_model::protocol::{
    HttpOptions, Protocol, ProtocolOptions, ShadowsocksPlugin, Socks5Options, VmessOptions,
    WireguardOptions,
};
use px_model::shared::Tls;
use px_model::{Registry, TranslateError};

const BACKEND: Backend = Backend::Clash;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct WsOpts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<(String, String)>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct H2Opts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ObfsOpts {
    pub mode: String,
    pub host: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct V2rayPluginOpts {
    pub mode: String,
    pub host: String,
    pub path: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub tls: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum PluginOpts {
    Obfs(ObfsOpts),
    V2ray(V2rayPluginOpts),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ShadowsocksProxy {
    pub name: String,
    pub server: String,
    pub port: u16,
    pub cipher: &'static str,
    pub password: String,
    pub udp: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_opts: Option<PluginOpts>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct VmessProxy {
    pub name: String,
    pub server: String,
    pub port: u16,
    pub uuid: String,
    #[serde(rename = "alterId")]
    pub alter_id: u16,
    pub cipher: &'static str,
    pub udp: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_cert_verify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servername: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ws_opts: Option<WsOpts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h2_opts: Option<H2Opts>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct TrojanProxy {
    pub name: String,
    pub server: String,
    pub port: u16,
    pub password: String,
    pub udp: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_cert_verify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ws_opts: Option<WsOpts>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Socks5Proxy {
    pub name: String,
    pub server: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub udp: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_cert_verify: Option<bool>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct HttpProxy {
    pub name: String,
    pub server: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_cert_verify: Option<bool>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct TuicProxy {
    pub name: String,
    pub server: String,
    pub port: u16,
    pub uuid: String,
    pub token: String,
    pub congestion_controller: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub reduce_rtt: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_cert_verify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpn: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct SnellProxy {
    pub name: String,
    pub server: String,
    pub port: u16,
    pub psk: String,
    pub version: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obfs_opts: Option<ObfsOpts>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct WireguardProxy {
    pub name: String,
    pub server: String,
    pub port: u16,
    pub private_key: String,
    pub public_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preshared_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u16>,
    pub udp: bool,
}

/// One Clash proxy entry; the `type` key selects the variant.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum ClashProxy {
    #[serde(rename = "ss")]
    Shadowsocks(ShadowsocksProxy),
    #[serde(rename = "vmess")]
    Vmess(VmessProxy),
    #[serde(rename = "trojan")]
    Trojan(TrojanProxy),
    #[serde(rename = "socks5")]
    Socks5(Socks5Proxy),
    #[serde(rename = "http")]
    Http(HttpProxy),
    #[serde(rename = "tuic")]
    Tuic(TuicProxy),
    #[serde(rename = "snell")]
    Snell(SnellProxy),
    #[serde(rename = "wireguard")]
    Wireguard(WireguardProxy),
}

impl ClashProxy {
    /// Canonical name, unchanged: the identifying key in Clash output.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            ClashProxy::Shadowsocks(p) => &p.name,
            ClashProxy::Vmess(p) => &p.name,
            ClashProxy::Trojan(p) => &p.name,
            ClashProxy::Socks5(p) => &p.name,
            ClashProxy::Http(p) => &p.name,
            ClashProxy::Tuic(p) => &p.name,
            ClashProxy::Snell(p) => &p.name,
            ClashProxy::Wireguard(p) => &p.name,
        }
    }
}

fn tls_view(tls: &Tls) -> (Option<bool>, Option<bool>, Option<String>) {
    (
        Some(true),
        if tls.verify { None } else { Some(true) },
        tls.server_name.clone(),
    )
}

fn shadowsocks(p: &Protocol) -> Result<ClashProxy, TranslateError> {
    let ProtocolOptions::Shadowsocks(opts) = &p.options else {
        unreachable!("registered under the shadowsocks tag");
    };
    let (plugin, plugin_opts) = match &opts.plugin {
        // Clash spells obfs-local as plain `obfs`.
        Some(ShadowsocksPlugin::Obfs { mode, host }) => (
            Some("obfs"),
            Some(PluginOpts::Obfs(ObfsOpts {
                mode: mode.clone(),
                host: host.clone(),
            })),
        ),
        Some(ShadowsocksPlugin::V2rayPlugin {
            mode,
            host,
            path,
            tls,
        }) => (
            Some("v2ray-plugin"),
            Some(PluginOpts::V2ray(V2rayPluginOpts {
                mode: mode.clone(),
                host: host.clone(),
                path: path.clone(),
                tls: *tls,
            })),
        ),
        None => (None, None),
    };
    Ok(ClashProxy::Shadowsocks(ShadowsocksProxy {
        name: p.name.clone(),
        server: p.server.clone(),
        port: p.port,
        cipher: opts.method.as_str(),
        password: opts.password.clone(),
        udp: opts.network.udp(),
        plugin,
        plugin_opts,
    }))
}

fn vmess(p: &Protocol) -> Result<ClashProxy, TranslateError> {
    let ProtocolOptions::Vmess(opts) = &p.options else {
        unreachable!("registered under the vmess tag");
    };
    let (network, ws_opts, h2_opts) = vmess_transport(p, opts)?;
    let (tls, skip_cert_verify, servername) = match &opts.tls {
        Some(t) => tls_view(t),
        None => (None, None, None),
    };
    Ok(ClashProxy::Vmess(VmessProxy {
        name: p.name.clone(),
        server: p.server.clone(),
        port: p.port,
        uuid: opts.uuid.clone(),
        alter_id: opts.alter_id,
        cipher: opts.security.as_str(),
        udp: opts.network.udp(),
        tls,
        skip_cert_verify,
        servername,
        network,
        ws_opts,
        h2_opts,
    }))
}

type TransportView = (Option<&'static str>, Option<WsOpts>, Option<H2Opts>);

fn vmess_transport(p: &Protocol, opts: &VmessOptions) -> Result<TransportView, TranslateError> {
    match (&opts.ws, &opts.h2) {
        (Some(_), Some(_)) => Err(conflict(
            BACKEND,
            EntityKind::Protocol,
            &p.name,
            "at most one transport kind may be set (ws and h2 are both present)",
        )),
        (Some(ws), None) => Ok((
            Some("ws"),
            Some(WsOpts {
                path: ws.path.clone(),
                headers: ws.headers.clone(),
            }),
            None,
        )),
        (None, Some(h2)) => Ok((
            Some("h2"),
            None,
            Some(H2Opts {
                path: h2.path.clone(),
                host: h2.host.clone(),
            }),
        )),
        (None, None) => Ok((None, None, None)),
    }
}

fn trojan(p: &Protocol) -> Result<ClashProxy, TranslateError> {
    let ProtocolOptions::Trojan(opts) = &p.options else {
        unreachable!("registered under the trojan tag");
    };
    let (_, skip_cert_verify, sni) = match &opts.tls {
        Some(t) => tls_view(t),
        None => (None, None, None),
    };
    let (network, ws_opts) = match &opts.ws {
        Some(ws) => (
            Some("ws"),
            Some(WsOpts {
                path: ws.path.clone(),
                headers: ws.headers.clone(),
            }),
        ),
        None => (None, None),
    };
    Ok(ClashProxy::Trojan(TrojanProxy {
        name: p.name.clone(),
        server: p.server.clone(),
        port: p.port,
        password: opts.password.clone(),
        udp: opts.network.udp(),
        sni,
        skip_cert_verify,
        network,
        ws_opts,
    }))
}

fn socks5_like(p: &Protocol, opts: &Socks5Options, tls_required: bool) -> Result<ClashProxy, TranslateError> {
    if tls_required && opts.tls.is_none() {
        return Err(conflict(
            BACKEND,
            EntityKind::Protocol,
            &p.name,
            "socks5-tls requires TLS options",
        ));
    }
    let (tls, skip_cert_verify, _) = match &opts.tls {
        Some(t) => tls_view(t),
        None => (None, None, None),
    };
    Ok(ClashProxy::Socks5(Socks5Proxy {
        name: p.name.clone(),
        server: p.server.clone(),
        port: p.port,
        username: opts.username.clone(),
        password: opts.password.clone(),
        udp: opts.network.udp(),
        tls,
        skip_cert_verify,
    }))
}

fn socks5(p: &Protocol) -> Result<ClashProxy, TranslateError> {
    let ProtocolOptions::Socks5(opts) = &p.options else {
        unreachable!("registered under the socks5 tag");
    };
    socks5_like(p, opts, false)
}

fn socks5_tls(p: &Protocol) -> Result<ClashProxy, TranslateError> {
    let ProtocolOptions::Socks5Tls(opts) = &p.options else {
        unreachable!("registered under the socks5-tls tag");
    };
    socks5_like(p, opts, true)
}

fn http_like(p: &Protocol, opts: &HttpOptions, tls_required: bool) -> Result<ClashProxy, TranslateError> {
    if tls_required && opts.tls.is_none() {
        return Err(conflict(
            BACKEND,
            EntityKind::Protocol,
            &p.name,
            "the https discriminant requires TLS options",
        ));
    }
    let (tls, skip_cert_verify, _) = match &opts.tls {
        Some(t) => tls_view(t),
        None => (None, None, None),
    };
    Ok(ClashProxy::Http(HttpProxy {
        name: p.name.clone(),
        server: p.server.clone(),
        port: p.port,
        username: opts.username.clone(),
        password: opts.password.clone(),
        tls,
        skip_cert_verify,
    }))
}

fn http(p: &Protocol) -> Result<ClashProxy, TranslateError> {
    let ProtocolOptions::Http(opts) = &p.options else {
        unreachable!("registered under the http tag");
    };
    http_like(p, opts, false)
}

fn https(p: &Protocol) -> Result<ClashProxy, TranslateError> {
    let ProtocolOptions::Https(opts) = &p.options else {
        unreachable!("registered under the https tag");
    };
    http_like(p, opts, true)
}

fn tuic(p: &Protocol) -> Result<ClashProxy, TranslateError> {
    let ProtocolOptions::Tuic(opts) = &p.options else {
        unreachable!("registered under the tuic tag");
    };
    let (sni, skip_cert_verify, alpn) = match &opts.tls {
        Some(t) => (
            t.server_name.clone(),
            if t.verify { None } else { Some(true) },
            t.alpn.clone(),
        ),
        None => (None, None, None),
    };
    Ok(ClashProxy::Tuic(TuicProxy {
        name: p.name.clone(),
        server: p.server.clone(),
        port: p.port,
        uuid: opts.uuid.clone(),
        token: opts.token.clone(),
        congestion_controller: opts.congestion_control.as_str(),
        reduce_rtt: opts.reduce_rtt,
        sni,
        skip_cert_verify,
        alpn,
    }))
}

fn snell(p: &Protocol) -> Result<ClashProxy, TranslateError> {
    let ProtocolOptions::Snell(opts) = &p.options else {
        unreachable!("registered under the snell tag");
    };
    let obfs_opts = match (&opts.obfs, &opts.obfs_host) {
        (Some(mode), Some(host)) => Some(ObfsOpts {
            mode: mode.clone(),
            host: host.clone(),
        }),
        (Some(mode), None) => Some(ObfsOpts {
            mode: mode.clone(),
            host: p.server.clone(),
        }),
        (None, Some(_)) => {
            return Err(conflict(
                BACKEND,
                EntityKind::Protocol,
                &p.name,
                "obfs-host without an obfs mode",
            ))
        }
        (None, None) => None,
    };
    Ok(ClashProxy::Snell(SnellProxy {
        name: p.name.clone(),
        server: p.server.clone(),
        port: p.port,
        psk: opts.psk.clone(),
        version: opts.version,
        obfs_opts,
    }))
}

fn wireguard(p: &Protocol) -> Result<ClashProxy, TranslateError> {
    let ProtocolOptions::Wireguard(opts) = &p.options else {
        unreachable!("registered under the wireguard tag");
    };
    check_wireguard_addresses(p, opts)?;
    Ok(ClashProxy::Wireguard(WireguardProxy {
        name: p.name.clone(),
        server: p.server.clone(),
        port: p.port,
        private_key: opts.private_key.clone(),
        public_key: opts.peer_public_key.clone(),
        preshared_key: opts.preshared_key.clone(),
        ip: opts.address.clone(),
        ipv6: opts.address6.clone(),
        mtu: opts.mtu,
        udp: true,
    }))
}

/// Exactly one of the two interface address fields must be present.
pub(crate) fn check_wireguard_addresses(
    p: &Protocol,
    opts: &WireguardOptions,
) -> Result<(), TranslateError> {
    match (&opts.address, &opts.address6) {
        (None, None) => Err(conflict(
            BACKEND,
            EntityKind::Protocol,
            &p.name,
            "one of address/address6 is required",
        )),
        (Some(_), Some(_)) => Err(conflict(
            BACKEND,
            EntityKind::Protocol,
            &p.name,
            "address and address6 are mutually exclusive",
        )),
        _ => Ok(()),
    }
}

/// Protocol dispatch table for Clash. naive and quic-style outbounds have
/// no Clash counterpart and are intentionally absent.
pub static PROXIES: Lazy<Registry<Protocol, ClashProxy>> = Lazy::new(|| {
    Registry::new(BACKEND, EntityKind::Protocol)
        .with("shadowsocks", shadowsocks)
        .with("vmess", vmess)
        .with("trojan", trojan)
        .with("socks5", socks5)
        .with("socks5-tls", socks5_tls)
        .with("http", http)
        .with("https", https)
        .with("tuic", tuic)
        .with("snell", snell)
        .with("wireguard", wireguard)
});

/// Translate one canonical protocol into a Clash proxy entry.
pub fn proxy_from_canonical(p: &Protocol) -> Result<ClashProxy, TranslateError> {
    PROXIES.construct(p.tag(), p)
}
