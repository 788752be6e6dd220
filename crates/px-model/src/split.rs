//! Order-preserving classification of mixed proxy references.
//!
//! The canonical model interleaves protocols, groups, providers and bare
//! names in one ordered array, while Clash and sing-box keep "inline
//! proxies" and "providers" in two separate arrays. A naive re-scan per
//! kind would silently reorder members and change select/fallback
//! evaluation order, so classification tags every element with its
//! original index and the final merge sorts on that stored index — never
//! on completion or bucket order.

use crate::errors::TranslateError;
use crate::group::{Member, ProxyGroup};
use crate::protocol::Protocol;
use crate::provider::ProxyProvider;

/// Index-tagged kind buckets for one member list.
#[derive(Debug, Default)]
pub struct Classified<'a> {
    pub protocols: Vec<(usize, &'a Protocol)>,
    pub groups: Vec<(usize, &'a ProxyGroup)>,
    pub providers: Vec<(usize, &'a ProxyProvider)>,
    pub names: Vec<(usize, &'a str)>,
}

/// Bucket `members` by runtime kind, remembering each element's original
/// position.
#[must_use]
pub fn classify_members(members: &[Member]) -> Classified<'_> {
    let mut out = Classified::default();
    for (i, member) in members.iter().enumerate() {
        match member {
            Member::Protocol(p) => out.protocols.push((i, p)),
            Member::Group(g) => out.groups.push((i, g)),
            Member::Provider(p) => out.providers.push((i, p)),
            Member::Name(n) => out.names.push((i, n)),
        }
    }
    out
}

/// Translate one bucket, keeping each element's index tag.
pub fn map_indexed<T: Copy, U>(
    bucket: &[(usize, T)],
    mut f: impl FnMut(T) -> Result<U, TranslateError>,
) -> Result<Vec<(usize, U)>, TranslateError> {
    bucket.iter().map(|&(i, item)| Ok((i, f(item)?))).collect()
}

/// Merge index-tagged buckets back into one list ordered by original
/// index. The sort is stable, so same-kind elements keep their relative
/// order from the input.
#[must_use]
pub fn merge_by_index<T>(buckets: Vec<Vec<(usize, T)>>) -> Vec<T> {
    let mut all: Vec<(usize, T)> = buckets.into_iter().flatten().collect();
    all.sort_by_key(|(i, _)| *i);
    all.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GroupOptions;
    use crate::protocol::{Protocol, ProtocolOptions, ShadowsocksCipher, ShadowsocksOptions};

    fn proto(name: &str) -> Protocol {
        Protocol {
            name: name.into(),
            server: "example.com".into(),
            port: 8388,
            options: ProtocolOptions::Shadowsocks(ShadowsocksOptions {
                method: ShadowsocksCipher::Aes256Gcm,
                password: "secret".into(),
                network: Default::default(),
                plugin: None,
                udp_over_tcp: false,
                multiplex: None,
            }),
        }
    }

    fn provider(name: &str) -> ProxyProvider {
        ProxyProvider {
            name: name.into(),
            url: "https://sub.example.com/list".into(),
            path: None,
            interval: 21_600,
            filter: None,
            health_check: true,
        }
    }

    #[test]
    fn classification_preserves_relative_order_per_kind() {
        // [P1, R1, P2, R2] must classify to inline [P1, P2], providers [R1, R2].
        let members = vec![
            Member::Protocol(proto("P1")),
            Member::Provider(provider("R1")),
            Member::Protocol(proto("P2")),
            Member::Provider(provider("R2")),
        ];
        let c = classify_members(&members);
        let inline: Vec<_> = c.protocols.iter().map(|(_, p)| p.name.as_str()).collect();
        let provs: Vec<_> = c.providers.iter().map(|(_, p)| p.name.as_str()).collect();
        assert_eq!(inline, ["P1", "P2"]);
        assert_eq!(provs, ["R1", "R2"]);
    }

    #[test]
    fn merge_restores_original_interleaving() {
        let members = vec![
            Member::Name("a".into()),
            Member::Protocol(proto("b")),
            Member::Name("c".into()),
            Member::Protocol(proto("d")),
        ];
        let c = classify_members(&members);
        let names: Vec<(usize, String)> = c
            .names
            .iter()
            .map(|(i, n)| (*i, (*n).to_string()))
            .collect();
        let protos: Vec<(usize, String)> = c
            .protocols
            .iter()
            .map(|(i, p)| (*i, p.name.clone()))
            .collect();
        let merged = merge_by_index(vec![protos, names]);
        assert_eq!(merged, ["a", "b", "c", "d"]);
    }

    #[test]
    fn groups_bucket_alongside_protocols() {
        let inner = ProxyGroup {
            name: "inner".into(),
            members: vec![Member::Protocol(proto("x"))],
            options: GroupOptions::Select,
            url: "https://www.gstatic.com/generate_204".into(),
            udp: true,
            lazy: true,
        };
        let members = vec![
            Member::Group(Box::new(inner)),
            Member::Protocol(proto("p")),
        ];
        let c = classify_members(&members);
        assert_eq!(c.groups.len(), 1);
        assert_eq!(c.groups[0].0, 0);
        assert_eq!(c.protocols[0].0, 1);
    }
}
