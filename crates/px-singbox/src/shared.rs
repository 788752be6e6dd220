//! Shared sing-box option blocks: TLS, transport, multiplex.

use serde::Serialize;

use px_model::shared::{H2Transport, Multiplex, Tls, WsTransport};

/// Outbound TLS block.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutboundTls {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_sni: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpn: Option<Vec<String>>,
}

impl OutboundTls {
    /// Map the canonical TLS group; sing-box spells the negations
    /// (`disable_sni`, `insecure`).
    #[must_use]
    pub fn from_canonical(tls: &Tls) -> Self {
        OutboundTls {
            enabled: true,
            disable_sni: (tls.enable_sni == Some(false)).then_some(true),
            server_name: tls.server_name.clone(),
            insecure: (!tls.verify).then_some(true),
            alpn: tls.alpn.clone(),
        }
    }
}

/// V2Ray-style transport block; the `type` key selects the variant.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Transport {
    Ws {
        #[serde(skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        headers: Option<Vec<(String, String)>>,
    },
    /// HTTP/2 transport; sing-box names it `http`.
    Http {
        #[serde(skip_serializing_if = "Option::is_none")]
        host: Option<Vec<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
}

impl Transport {
    #[must_use]
    pub fn ws(ws: &WsTransport) -> Self {
        Transport::Ws {
            path: ws.path.clone(),
            headers: ws.headers.clone(),
        }
    }

    #[must_use]
    pub fn h2(h2: &H2Transport) -> Self {
        Transport::Http {
            host: h2.host.clone(),
            path: h2.path.clone(),
        }
    }
}

/// Outbound multiplex block.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutboundMultiplex {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_streams: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_streams: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<bool>,
}

impl OutboundMultiplex {
    #[must_use]
    pub fn from_canonical(mux: &Multiplex) -> Self {
        OutboundMultiplex {
            enabled: mux.enabled,
            protocol: mux.protocol.clone(),
            max_connections: mux.max_connections,
            min_streams: mux.min_streams,
            max_streams: mux.max_streams,
            padding: mux.padding,
        }
    }
}
