//! Canonical proxy protocol model.
//!
//! A [`Protocol`] is the backend-agnostic description of one proxy server:
//! the common identity fields plus a closed [`ProtocolOptions`] enum whose
//! discriminant is the type tag used for registry dispatch. Values are
//! immutable once constructed; adapters build new backend objects from
//! them and never mutate or share them.

use serde::{Deserialize, Serialize};

use crate::shared::{H2Transport, Multiplex, Tls, WsTransport};

/// Enabled transport networks for a protocol.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    Tcp,
    Udp,
    #[default]
    TcpAndUdp,
}

impl Network {
    /// Whether UDP relay is enabled.
    #[must_use]
    pub fn udp(&self) -> bool {
        !matches!(self, Network::Tcp)
    }
}

/// Shadowsocks AEAD ciphers.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShadowsocksCipher {
    #[serde(rename = "aes-128-gcm")]
    Aes128Gcm,
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
    #[serde(rename = "chacha20-ietf-poly1305")]
    Chacha20IetfPoly1305,
    #[serde(rename = "2022-blake3-aes-128-gcm")]
    Blake3Aes128Gcm,
    #[serde(rename = "2022-blake3-aes-256-gcm")]
    Blake3Aes256Gcm,
    #[serde(rename = "2022-blake3-chacha20-poly1305")]
    Blake3Chacha20Poly1305,
}

impl ShadowsocksCipher {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ShadowsocksCipher::Aes128Gcm => "aes-128-gcm",
            ShadowsocksCipher::Aes256Gcm => "aes-256-gcm",
            ShadowsocksCipher::Chacha20IetfPoly1305 => "chacha20-ietf-poly1305",
            ShadowsocksCipher::Blake3Aes128Gcm => "2022-blake3-aes-128-gcm",
            ShadowsocksCipher::Blake3Aes256Gcm => "2022-blake3-aes-256-gcm",
            ShadowsocksCipher::Blake3Chacha20Poly1305 => "2022-blake3-chacha20-poly1305",
        }
    }
}

/// SIP003 plugin with its own options; the plugin command and its option
/// shape travel together, so mismatched pairs are unrepresentable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum ShadowsocksPlugin {
    /// simple-obfs / obfs-local.
    Obfs {
        /// `tls` or `http`.
        mode: String,
        host: String,
    },
    V2rayPlugin {
        /// Only `websocket` is meaningful for the supported backends.
        mode: String,
        host: String,
        path: String,
        #[serde(default)]
        tls: bool,
    },
}

/// VMess payload ciphers.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum VmessSecurity {
    #[default]
    Auto,
    None,
    Zero,
    Aes128Gcm,
    Chacha20Poly1305,
}

impl VmessSecurity {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            VmessSecurity::Auto => "auto",
            VmessSecurity::None => "none",
            VmessSecurity::Zero => "zero",
            VmessSecurity::Aes128Gcm => "aes-128-gcm",
            VmessSecurity::Chacha20Poly1305 => "chacha20-poly1305",
        }
    }
}

/// TUIC congestion control algorithms.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CongestionControl {
    Cubic,
    NewReno,
    #[default]
    Bbr,
}

impl CongestionControl {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CongestionControl::Cubic => "cubic",
            CongestionControl::NewReno => "new_reno",
            CongestionControl::Bbr => "bbr",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpOptions {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Required when the discriminant is `https`.
    #[serde(default)]
    pub tls: Option<Tls>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Socks5Options {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Required when the discriminant is `socks5-tls`.
    #[serde(default)]
    pub tls: Option<Tls>,
    #[serde(default)]
    pub network: Network,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShadowsocksOptions {
    pub method: ShadowsocksCipher,
    pub password: String,
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub plugin: Option<ShadowsocksPlugin>,
    /// UDP-over-TCP tunneling. Conflicts with `multiplex` on sing-box.
    #[serde(default)]
    pub udp_over_tcp: bool,
    #[serde(default)]
    pub multiplex: Option<Multiplex>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VmessOptions {
    pub uuid: String,
    #[serde(default)]
    pub alter_id: u16,
    #[serde(default)]
    pub security: VmessSecurity,
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub tls: Option<Tls>,
    /// At most one transport kind may be set; adapters reject `ws` and
    /// `h2` both present.
    #[serde(default)]
    pub ws: Option<WsTransport>,
    #[serde(default)]
    pub h2: Option<H2Transport>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrojanOptions {
    pub password: String,
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub tls: Option<Tls>,
    #[serde(default)]
    pub ws: Option<WsTransport>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TuicOptions {
    pub uuid: String,
    pub token: String,
    #[serde(default = "default_tuic_version")]
    pub version: u8,
    #[serde(default)]
    pub tls: Option<Tls>,
    #[serde(default)]
    pub disable_sni: bool,
    #[serde(default)]
    pub congestion_control: CongestionControl,
    #[serde(default)]
    pub reduce_rtt: bool,
}

fn default_tuic_version() -> u8 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NaiveOptions {
    pub username: String,
    pub password: String,
    /// `http2` or `quic`.
    pub proto: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnellOptions {
    pub psk: String,
    #[serde(default = "default_snell_version")]
    pub version: u8,
    #[serde(default)]
    pub obfs: Option<String>,
    #[serde(default)]
    pub obfs_host: Option<String>,
}

fn default_snell_version() -> u8 {
    4
}

/// Address-dual variant: exactly one of `address` / `address6` must be
/// set; adapters reject zero or two.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireguardOptions {
    pub private_key: String,
    pub peer_public_key: String,
    #[serde(default)]
    pub preshared_key: Option<String>,
    /// Local IPv4 interface address.
    #[serde(default)]
    pub address: Option<String>,
    /// Local IPv6 interface address.
    #[serde(default)]
    pub address6: Option<String>,
    #[serde(default)]
    pub mtu: Option<u16>,
    #[serde(default)]
    pub keepalive: Option<u16>,
}

/// Variant-specific protocol options; the enum discriminant is the
/// canonical type tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ProtocolOptions {
    Http(HttpOptions),
    Https(HttpOptions),
    Socks5(Socks5Options),
    Socks5Tls(Socks5Options),
    Shadowsocks(ShadowsocksOptions),
    Vmess(VmessOptions),
    Trojan(TrojanOptions),
    Tuic(TuicOptions),
    Naive(NaiveOptions),
    Snell(SnellOptions),
    Wireguard(WireguardOptions),
}

impl ProtocolOptions {
    /// Canonical tag string; the dispatch key for protocol registries.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            ProtocolOptions::Http(_) => "http",
            ProtocolOptions::Https(_) => "https",
            ProtocolOptions::Socks5(_) => "socks5",
            ProtocolOptions::Socks5Tls(_) => "socks5-tls",
            ProtocolOptions::Shadowsocks(_) => "shadowsocks",
            ProtocolOptions::Vmess(_) => "vmess",
            ProtocolOptions::Trojan(_) => "trojan",
            ProtocolOptions::Tuic(_) => "tuic",
            ProtocolOptions::Naive(_) => "naive",
            ProtocolOptions::Snell(_) => "snell",
            ProtocolOptions::Wireguard(_) => "wireguard",
        }
    }
}

/// One canonical proxy server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Protocol {
    /// Unique name; the only cross-reference key, kept verbatim as the
    /// identifying key in every backend's output.
    pub name: String,
    pub server: String,
    pub port: u16,
    #[serde(flatten)]
    pub options: ProtocolOptions,
}

impl Protocol {
    /// Canonical type tag of this protocol.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        self.options.tag()
    }
}
