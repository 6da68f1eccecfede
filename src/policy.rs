//! Policy binding (C4) and the shared cache state it hangs off of.
//!
//! Grounded on the original implementation's `RedisFuncCache.policy`
//! lazy property, which hands the policy a `weakref.proxy(self)` back to
//! the owning cache so the two don't form a Python reference cycle. The
//! Rust equivalent is [`Arc::new_cyclic`]: [`CacheState`] owns its
//! [`Policy`] outright, and `Policy` holds only a [`Weak`] pointer back —
//! the single non-owning back-edge design note 9 calls for.

use std::sync::{Arc, Weak};

use crate::callable::CallableId;
use crate::config::{KeySpace, PolicySpec, PolicyKind, Topology};
use crate::error::{CacheError, CacheResult};
use crate::fingerprint::Fingerprinter;
use crate::keys::{self, KeyPair};
use crate::scripts::{self};

/// Immutable data shared by a cache instance and its policy: name, prefix,
/// capacity and default TTL. Created once per cache via [`CacheState::new`]
/// and shared behind an `Arc` by the sync and async orchestrators alike.
pub struct CacheState {
    pub name: String,
    pub prefix: String,
    pub maxsize: i64,
    pub ttl: i64,
    pub policy: Policy,
}

impl CacheState {
    pub fn new(name: String, prefix: String, maxsize: i64, ttl: i64, spec: PolicySpec) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<CacheState>| CacheState {
            name,
            prefix,
            maxsize,
            ttl,
            policy: Policy {
                state: weak.clone(),
                kind: spec.kind,
                keyspace: spec.keyspace,
                topology: spec.topology,
            },
        })
    }
}

pub struct Policy {
    state: Weak<CacheState>,
    kind: PolicyKind,
    keyspace: KeySpace,
    topology: Topology,
}

impl Policy {
    fn state(&self) -> CacheResult<Arc<CacheState>> {
        self.state
            .upgrade()
            .ok_or_else(|| CacheError::Configuration("cache state has been dropped".into()))
    }

    pub fn kind(&self) -> PolicyKind {
        self.kind
    }

    /// Derives the key pair `callable` addresses. In `KeySpace::Multiple`
    /// mode this is one pair per callable identity; in `KeySpace::Single`
    /// mode `callable` is accepted for a uniform signature but ignored,
    /// since every callable shares the cache's one pair.
    pub fn calc_keys(&self, callable: &CallableId) -> CacheResult<KeyPair> {
        let state = self.state()?;
        Ok(keys::calc_keys(
            &state.prefix,
            &state.name,
            &self.tag(),
            self.keyspace,
            self.topology,
            callable,
        ))
    }

    /// Same as [`Self::calc_keys`], but for administrative callers (e.g.
    /// `purge`) that may not have a callable on hand. `KeySpace::Multiple`
    /// has no single pair to purge without one, so `callable` being absent
    /// there is an invalid argument rather than silently picking a pair.
    pub fn calc_keys_for_purge(&self, callable: Option<&CallableId>) -> CacheResult<KeyPair> {
        match (self.keyspace, callable) {
            (KeySpace::Multiple, None) => Err(CacheError::InvalidArgument(
                "purge() requires a callable in multiple-keyspace mode".into(),
            )),
            (_, Some(callable)) => self.calc_keys(callable),
            (KeySpace::Single, None) => {
                let placeholder = CallableId::new("");
                self.calc_keys(&placeholder)
            }
        }
    }

    /// Computes the fingerprint for one invocation.
    pub fn calc_hash(&self, callable: &CallableId, args: &[u8], kwds: &[u8]) -> String {
        Fingerprinter::default().calc_hash(callable, args, kwds)
    }

    /// Extra `ARGV` entries appended after the common GET/PUT arguments.
    /// Only LRU/MRU need one, to pick which end of the shared script's
    /// sorted set is the eviction victim.
    pub fn calc_ext_args(&self) -> Vec<String> {
        match self.kind {
            PolicyKind::Lru => vec!["lru".to_string()],
            PolicyKind::Mru => vec!["mru".to_string()],
            PolicyKind::Fifo | PolicyKind::Lfu | PolicyKind::Rr => Vec::new(),
        }
    }

    /// The `(get, put)` Lua script source pair for this policy.
    pub fn lua_scripts(&self) -> (&'static str, &'static str) {
        scripts::scripts_for(self.kind)
    }

    /// Short tag identifying the policy, folded into every key this cache
    /// derives so that two caches sharing a prefix and name but differing
    /// in policy/keyspace/topology never collide. The base kind (`lru`,
    /// `mru`, `fifo`, `lfu`, `rr`) gets a suffix for non-default shapes:
    /// `-m` for `KeySpace::Multiple`, `-c` for `Topology::Cluster`, `-cm`
    /// for both — e.g. `"mru-cm"`.
    pub fn tag(&self) -> String {
        let base = match self.kind {
            PolicyKind::Lru => "lru",
            PolicyKind::Mru => "mru",
            PolicyKind::Fifo => "fifo",
            PolicyKind::Lfu => "lfu",
            PolicyKind::Rr => "rr",
        };
        let suffix = match (self.keyspace, self.topology) {
            (KeySpace::Single, Topology::Standalone) => "",
            (KeySpace::Multiple, Topology::Standalone) => "-m",
            (KeySpace::Single, Topology::Cluster) => "-c",
            (KeySpace::Multiple, Topology::Cluster) => "-cm",
        };
        format!("{base}{suffix}")
    }
}
