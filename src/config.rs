//! Deserializable configuration surface.
//!
//! Shapes and defaulting convention follow the teacher's `CacheConfig`/
//! `RedisCacheConfig`/`RedisClusterConfig` (`serde(default = ...)` per
//! field, a `validate()` returning a dedicated error type).

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("validation error: {0}")]
    Validation(String),
}

/// Eviction policy, orthogonal to keyspace and topology so the five
/// policies don't have to be multiplied out against both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Lru,
    Mru,
    Fifo,
    Lfu,
    Rr,
}

/// How many Redis keys back one cache instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySpace {
    /// One key pair per cache, shared by every fingerprint.
    #[default]
    Single,
    /// One key pair per fingerprint, keyed by an independent MD5 checksum.
    Multiple,
}

/// Whether the target Redis deployment is a single node or a cluster.
/// Cluster mode wraps keys in a `{...}` hash tag so both halves of a pair
/// co-locate on the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    #[default]
    Standalone,
    Cluster,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicySpec {
    pub kind: PolicyKind,
    #[serde(default)]
    pub keyspace: KeySpace,
    #[serde(default)]
    pub topology: Topology,
}

/// Cache instance configuration: name, key prefix, capacity, default TTL,
/// and the policy to enforce.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheOptions {
    /// The cache's name, folded into every derived key.
    pub name: String,

    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Maximum number of entries. Zero or negative means unbounded.
    #[serde(default = "default_maxsize")]
    pub maxsize: i64,

    /// Default time-to-live in seconds. Zero or negative means no expiry.
    #[serde(default = "default_ttl")]
    pub ttl: i64,

    pub policy: PolicySpec,
}

impl CacheOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::Validation("cache name cannot be empty".into()));
        }
        if self.prefix.is_empty() {
            return Err(ConfigError::Validation(
                "cache prefix cannot be empty".into(),
            ));
        }
        Ok(())
    }
}

fn default_prefix() -> String {
    "rfc".to_string()
}

fn default_maxsize() -> i64 {
    1000
}

fn default_ttl() -> i64 {
    0
}

/// Standalone Redis connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedisConfig {
    /// `redis://[user:password@]host:port[/database]`
    pub url: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl RedisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::Validation("redis url cannot be empty".into()));
        }
        Ok(())
    }
}

/// Redis Cluster connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedisClusterConfig {
    /// Seed node URLs; the driver discovers the rest of the topology.
    pub urls: Vec<String>,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default)]
    pub read_from_replicas: bool,
}

impl RedisClusterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.urls.is_empty() {
            return Err(ConfigError::Validation(
                "redis cluster requires at least one seed url".into(),
            ));
        }
        Ok(())
    }
}

fn default_connect_timeout_secs() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_options_rejects_empty_name() {
        let opts = CacheOptions {
            name: String::new(),
            prefix: default_prefix(),
            maxsize: default_maxsize(),
            ttl: default_ttl(),
            policy: PolicySpec {
                kind: PolicyKind::Lru,
                keyspace: KeySpace::Single,
                topology: Topology::Standalone,
            },
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn redis_cluster_config_rejects_empty_urls() {
        let cfg = RedisClusterConfig {
            urls: vec![],
            connect_timeout_secs: 5,
            read_from_replicas: false,
        };
        assert!(cfg.validate().is_err());
    }
}
