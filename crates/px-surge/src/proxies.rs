//! Surge proxy lines.
//!
//! Surge configuration is line-based: one `name = kind, server, port,
//! key=value, ...` entry per proxy. Required positional fields come
//! first, options follow in a fixed per-discriminant order, optional
//! fields are emitted only when present, and booleans render as literal
//! `true`/`false` tokens.

use std::fmt;

use once_cell::sync::Lazy;

use px_model::errors::{conflict, Backend, EntityKind};
use px_model::protocol::{
    HttpOptions, Protocol, ProtocolOptions, ShadowsocksPlugin, Socks5Options, VmessSecurity,
};
use px_model::shared::Tls;
use px_model::{Registry, TranslateError};

const BACKEND: Backend = Backend::Surge;

/// One `[Proxy]` section entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurgeProxy {
    /// Canonical name, unchanged: the key left of `=`.
    pub name: String,
    /// Native kind token, e.g. `ss` or `socks5-tls`.
    pub kind: &'static str,
    pub server: String,
    pub port: u16,
    /// Positional arguments following the port (SOCKS credentials).
    pub args: Vec<String>,
    /// `key=value` options in declared order.
    pub opts: Vec<(&'static str, String)>,
}

impl fmt::Display for SurgeProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}, {}, {}", self.name, self.kind, self.server, self.port)?;
        for arg in &self.args {
            write!(f, ", {arg}")?;
        }
        for (key, value) in &self.opts {
            write!(f, ", {key}={value}")?;
        }
        Ok(())
    }
}

fn bool_token(v: bool) -> String {
    if v { "true" } else { "false" }.to_string()
}

/// Append `skip-cert-verify` / `sni` options from a TLS group.
fn push_tls_opts(opts: &mut Vec<(&'static str, String)>, tls: &Tls) {
    if !tls.verify {
        opts.push(("skip-cert-verify", bool_token(true)));
    }
    if tls.enable_sni == Some(false) {
        opts.push(("sni", "off".to_string()));
    } else if let Some(name) = &tls.server_name {
        opts.push(("sni", name.clone()));
    }
}

fn shadowsocks(p: &Protocol) -> Result<SurgeProxy, TranslateError> {
    let ProtocolOptions::Shadowsocks(o) = &p.options else {
        unreachable!("registered under the shadowsocks tag");
    };
    let mut opts = vec![
        ("encrypt-method", o.method.as_str().to_string()),
        ("password", o.password.clone()),
        ("udp-relay", bool_token(o.network.udp())),
    ];
    match &o.plugin {
        Some(ShadowsocksPlugin::Obfs { mode, host }) => {
            opts.push(("obfs", mode.clone()));
            opts.push(("obfs-host", host.clone()));
        }
        Some(ShadowsocksPlugin::V2rayPlugin { .. }) => {
            return Err(conflict(
                BACKEND,
                EntityKind::Protocol,
                &p.name,
                "surge shadowsocks supports the obfs plugin only",
            ));
        }
        None => {}
    }
    Ok(SurgeProxy {
        name: p.name.clone(),
        kind: "ss",
        server: p.server.clone(),
        port: p.port,
        args: Vec::new(),
        opts,
    })
}

fn vmess(p: &Protocol) -> Result<SurgeProxy, TranslateError> {
    let ProtocolOptions::Vmess(o) = &p.options else {
        unreachable!("registered under the vmess tag");
    };
    if o.ws.is_some() && o.h2.is_some() {
        return Err(conflict(
            BACKEND,
            EntityKind::Protocol,
            &p.name,
            "at most one transport kind may be set (ws and h2 are both present)",
        ));
    }
    if o.h2.is_some() {
        return Err(conflict(
            BACKEND,
            EntityKind::Protocol,
            &p.name,
            "surge vmess supports the ws transport only",
        ));
    }
    let mut opts = vec![("username", o.uuid.clone())];
    if let Some(tls) = &o.tls {
        opts.push(("tls", bool_token(true)));
        push_tls_opts(&mut opts, tls);
    }
    if let Some(ws) = &o.ws {
        opts.push(("ws", bool_token(true)));
        if let Some(path) = &ws.path {
            opts.push(("ws-path", path.clone()));
        }
    }
    if o.security != VmessSecurity::Auto {
        opts.push(("encrypt-method", o.security.as_str().to_string()));
    }
    Ok(SurgeProxy {
        name: p.name.clone(),
        kind: "vmess",
        server: p.server.clone(),
        port: p.port,
        args: Vec::new(),
        opts,
    })
}

fn trojan(p: &Protocol) -> Result<SurgeProxy, TranslateError> {
    let ProtocolOptions::Trojan(o) = &p.options else {
        unreachable!("registered under the trojan tag");
    };
    let mut opts = vec![("password", o.password.clone())];
    if let Some(tls) = &o.tls {
        push_tls_opts(&mut opts, tls);
    }
    if let Some(ws) = &o.ws {
        opts.push(("ws", bool_token(true)));
        if let Some(path) = &ws.path {
            opts.push(("ws-path", path.clone()));
        }
    }
    opts.push(("udp-relay", bool_token(o.network.udp())));
    Ok(SurgeProxy {
        name: p.name.clone(),
        kind: "trojan",
        server: p.server.clone(),
        port: p.port,
        args: Vec::new(),
        opts,
    })
}

fn socks5_line(
    p: &Protocol,
    o: &Socks5Options,
    tls_required: bool,
) -> Result<SurgeProxy, TranslateError> {
    if tls_required && o.tls.is_none() {
        return Err(conflict(
            BACKEND,
            EntityKind::Protocol,
            &p.name,
            "socks5-tls requires TLS options",
        ));
    }
    let kind = if o.tls.is_some() { "socks5-tls" } else { "socks5" };
    let args = match (&o.username, &o.password) {
        (Some(user), Some(pass)) => vec![user.clone(), pass.clone()],
        _ => Vec::new(),
    };
    let mut opts = Vec::new();
    if let Some(tls) = &o.tls {
        if !tls.verify {
            opts.push(("skip-cert-verify", bool_token(true)));
        }
    }
    Ok(SurgeProxy {
        name: p.name.clone(),
        kind,
        server: p.server.clone(),
        port: p.port,
        args,
        opts,
    })
}

fn socks5(p: &Protocol) -> Result<SurgeProxy, TranslateError> {
    let ProtocolOptions::Socks5(o) = &p.options else {
        unreachable!("registered under the socks5 tag");
    };
    socks5_line(p, o, false)
}

fn socks5_tls(p: &Protocol) -> Result<SurgeProxy, TranslateError> {
    let ProtocolOptions::Socks5Tls(o) = &p.options else {
        unreachable!("registered under the socks5-tls tag");
    };
    socks5_line(p, o, true)
}

fn http_line(p: &Protocol, o: &HttpOptions, tls_required: bool) -> Result<SurgeProxy, TranslateError> {
    if tls_required && o.tls.is_none() {
        return Err(conflict(
            BACKEND,
            EntityKind::Protocol,
            &p.name,
            "the https discriminant requires TLS options",
        ));
    }
    let kind = if o.tls.is_some() { "https" } else { "http" };
    let args = match (&o.username, &o.password) {
        (Some(user), Some(pass)) => vec![user.clone(), pass.clone()],
        _ => Vec::new(),
    };
    let mut opts = Vec::new();
    if let Some(tls) = &o.tls {
        push_tls_opts(&mut opts, tls);
    }
    Ok(SurgeProxy {
        name: p.name.clone(),
        kind,
        server: p.server.clone(),
        port: p.port,
        args,
        opts,
    })
}

fn http(p: &Protocol) -> Result<SurgeProxy, TranslateError> {
    let ProtocolOptions::Http(o) = &p.options else {
        unreachable!("registered under the http tag");
    };
    http_line(p, o, false)
}

fn https(p: &Protocol) -> Result<SurgeProxy, TranslateError> {
    let ProtocolOptions::Https(o) = &p.options else {
        unreachable!("registered under the https tag");
    };
    http_line(p, o, true)
}

fn tuic(p: &Protocol) -> Result<SurgeProxy, TranslateError> {
    let ProtocolOptions::Tuic(o) = &p.options else {
        unreachable!("registered under the tuic tag");
    };
    let kind = if o.version >= 5 { "tuic-v5" } else { "tuic" };
    let mut opts = vec![("token", o.token.clone()), ("uuid", o.uuid.clone())];
    if let Some(tls) = &o.tls {
        if let Some(alpn) = &tls.alpn {
            opts.push(("alpn", alpn.join(",")));
        }
        push_tls_opts(&mut opts, tls);
    }
    Ok(SurgeProxy {
        name: p.name.clone(),
        kind,
        server: p.server.clone(),
        port: p.port,
        args: Vec::new(),
        opts,
    })
}

fn snell(p: &Protocol) -> Result<SurgeProxy, TranslateError> {
    let ProtocolOptions::Snell(o) = &p.options else {
        unreachable!("registered under the snell tag");
    };
    let mut opts = vec![
        ("psk", o.psk.clone()),
        ("version", o.version.to_string()),
    ];
    if let Some(obfs) = &o.obfs {
        opts.push(("obfs", obfs.clone()));
        if let Some(host) = &o.obfs_host {
            opts.push(("obfs-host", host.clone()));
        }
    }
    Ok(SurgeProxy {
        name: p.name.clone(),
        kind: "snell",
        server: p.server.clone(),
        port: p.port,
        args: Vec::new(),
        opts,
    })
}

/// Protocol dispatch table for Surge. naive, wireguard and plain quic
/// outbounds have no Surge counterpart and are intentionally absent.
pub static PROXIES: Lazy<Registry<Protocol, SurgeProxy>> = Lazy::new(|| {
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
});

/// Translate one canonical protocol into a Surge proxy line.
pub fn proxy_from_canonical(p: &Protocol) -> Result<SurgeProxy, TranslateError> {
    PROXIES.construct(p.tag(), p)
}
