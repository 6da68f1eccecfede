//! Key deriver (C2 half).
//!
//! Four key-naming shapes, crossing keyspace mode (single/multiple) with
//! topology (standalone/cluster), per `calc_keys` in
//! `original_source/.../policies/base.py` (`BaseSinglePolicy` /
//! `BaseClusterSinglePolicy` / `BaseMultiplePolicy` /
//! `BaseClusterMultiplePolicy`):
//!
//! - single-standalone:  `P:N:T:0` / `P:N:T:1`
//! - single-cluster:     `P{N:T}:0` / `P{N:T}:1`
//! - multiple-standalone: `P:N:T:fullname#checksum:0` / `...:1`
//! - multiple-cluster:    `P:N:T:fullname#{checksum}:0` / `...:1`
//!
//! `checksum` identifies the *callable*, not the call: `md5(fullname ||
//! source)`, independent of the per-invocation fingerprint. In cluster
//! mode only `checksum` is hash-tagged (not the name/tag prefix), so
//! sibling callables deliberately route to different shards while each
//! callable's own index/value pair stays co-located.

use crate::callable::CallableId;
use crate::config::{KeySpace, Topology};
use crate::fingerprint::{FingerprintAlgorithm, Md5Hash};

/// The two Redis keys one callable (in multiple mode) or one whole cache
/// instance (in single mode) is addressed by: an index key tracking
/// membership/recency/frequency, and a value key holding the cached
/// bytes, field-addressed by the per-invocation fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub index: String,
    pub data: String,
}

impl KeyPair {
    /// Keys as `(index, data)`, the order [`redis::Script`] expects in
    /// `KEYS[1]`/`KEYS[2]`.
    pub fn as_tuple(&self) -> (&str, &str) {
        (&self.index, &self.data)
    }
}

/// `checksum = md5(fullname || source)`, identifying a callable
/// independent of the arguments it's called with.
pub fn checksum_for_callable(callable: &CallableId) -> String {
    let mut chunks: Vec<&[u8]> = vec![callable.fullname.as_bytes()];
    if let Some(source) = &callable.source {
        chunks.push(source.as_bytes());
    }
    Md5Hash.digest(&chunks)
}

/// Derives the key pair a policy addresses for `callable`. `tag` is the
/// policy tag (e.g. `"lru"`, `"mru-cm"`) computed by
/// [`crate::policy::Policy::tag`].
pub fn calc_keys(prefix: &str, name: &str, tag: &str, keyspace: KeySpace, topology: Topology, callable: &CallableId) -> KeyPair {
    match (keyspace, topology) {
        (KeySpace::Single, Topology::Standalone) => {
            let base = format!("{prefix}:{name}:{tag}");
            KeyPair {
                index: format!("{base}:0"),
                data: format!("{base}:1"),
            }
        }
        (KeySpace::Single, Topology::Cluster) => {
            let base = format!("{prefix}{{{name}:{tag}}}");
            KeyPair {
                index: format!("{base}:0"),
                data: format!("{base}:1"),
            }
        }
        (KeySpace::Multiple, Topology::Standalone) => {
            let checksum = checksum_for_callable(callable);
            let base = format!("{prefix}:{name}:{tag}:{}#{checksum}", callable.fullname);
            KeyPair {
                index: format!("{base}:0"),
                data: format!("{base}:1"),
            }
        }
        (KeySpace::Multiple, Topology::Cluster) => {
            let checksum = checksum_for_callable(callable);
            let base = format!("{prefix}:{name}:{tag}:{}#{{{checksum}}}", callable.fullname);
            KeyPair {
                index: format!("{base}:0"),
                data: format!("{base}:1"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn callable() -> CallableId {
        CallableId::new("crate::handlers::fetch_user")
    }

    #[test]
    fn single_standalone_is_colon_joined() {
        let kp = calc_keys("rfc", "users", "lru", KeySpace::Single, Topology::Standalone, &callable());
        assert_eq!(kp.index, "rfc:users:lru:0");
        assert_eq!(kp.data, "rfc:users:lru:1");
    }

    #[test]
    fn single_cluster_wraps_name_and_tag() {
        let kp = calc_keys("rfc", "users", "lru", KeySpace::Single, Topology::Cluster, &callable());
        assert_eq!(kp.index, "rfc{users:lru}:0");
        assert_eq!(kp.data, "rfc{users:lru}:1");
    }

    #[test]
    fn multiple_standalone_embeds_fullname_and_checksum() {
        let kp = calc_keys("rfc", "users", "lru-m", KeySpace::Multiple, Topology::Standalone, &callable());
        assert!(kp.index.starts_with("rfc:users:lru-m:crate::handlers::fetch_user#"));
        assert!(kp.index.ends_with(":0"));
        assert!(kp.data.ends_with(":1"));
    }

    #[test]
    fn multiple_cluster_wraps_only_the_checksum() {
        let kp = calc_keys("rfc", "users", "lru-cm", KeySpace::Multiple, Topology::Cluster, &callable());
        let checksum = checksum_for_callable(&callable());
        assert_eq!(kp.index, format!("rfc:users:lru-cm:crate::handlers::fetch_user#{{{checksum}}}:0"));
        assert_eq!(kp.data, format!("rfc:users:lru-cm:crate::handlers::fetch_user#{{{checksum}}}:1"));
    }

    #[test]
    fn multiple_mode_same_callable_shares_pair_across_different_args() {
        // checksum depends only on callable identity, not on call args, so
        // distinct invocations of the same callable land on the same pair.
        let a = calc_keys("rfc", "users", "lru-m", KeySpace::Multiple, Topology::Standalone, &callable());
        let b = calc_keys("rfc", "users", "lru-m", KeySpace::Multiple, Topology::Standalone, &callable());
        assert_eq!(a, b);
    }

    #[test]
    fn multiple_mode_different_callables_get_different_pairs() {
        let a = calc_keys(
            "rfc",
            "users",
            "lru-m",
            KeySpace::Multiple,
            Topology::Standalone,
            &CallableId::new("crate::a"),
        );
        let b = calc_keys(
            "rfc",
            "users",
            "lru-m",
            KeySpace::Multiple,
            Topology::Standalone,
            &CallableId::new("crate::b"),
        );
        assert_ne!(a, b);
    }
}
