//! Shared field groups embedded by value into protocol and group variants.
//!
//! These replace the mixin-style "TLS fields / transport fields" groups of
//! older configuration models with plain composition: each concrete
//! variant that needs a group carries it as an optional struct field.

use serde::{Deserialize, Serialize};

/// TLS options for an outbound connection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tls {
    /// Server name for SNI; the remote hostname is used when unset.
    #[serde(default)]
    pub server_name: Option<String>,
    /// Send SNI at all. `false` maps to `sni=off` / `disable_sni`.
    #[serde(default)]
    pub enable_sni: Option<bool>,
    /// ALPN protocol list.
    #[serde(default)]
    pub alpn: Option<Vec<String>>,
    /// Verify the server certificate. Backends express the negation
    /// (`skip-cert-verify`, `insecure`).
    #[serde(default = "default_true")]
    pub verify: bool,
}

fn default_true() -> bool {
    true
}

/// WebSocket transport options.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WsTransport {
    #[serde(default)]
    pub path: Option<String>,
    /// Extra request headers, e.g. `Host`.
    #[serde(default)]
    pub headers: Option<Vec<(String, String)>>,
}

/// HTTP/2 transport options.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct H2Transport {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub host: Option<Vec<String>>,
}

/// Stream multiplex options (smux/yamux/h2mux family).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Multiplex {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub protocol: Option<String>,
    /// Max pooled connections. Conflicts with `max_streams`.
    #[serde(default)]
    pub max_connections: Option<u32>,
    #[serde(default)]
    pub min_streams: Option<u32>,
    /// Conflicts with `max_connections` and `min_streams`.
    #[serde(default)]
    pub max_streams: Option<u32>,
    #[serde(default)]
    pub padding: Option<bool>,
}
