//! A function-result cache backed by a Redis-compatible KV server, with
//! pluggable server-side atomic eviction policies (LRU, MRU, FIFO, LFU,
//! RR).
//!
//! The hard part lives in three places: [`fingerprint`] turns a callable
//! plus its arguments into a stable digest, [`keys`]/[`policy`] turn that
//! digest into the Redis key pair a given policy addresses, and
//! [`scripts`] holds the Lua that performs the GET/PUT (and eviction)
//! atomically on the server. [`cache::FuncCache`] and
//! [`async_cache::AsyncFuncCache`] wire those pieces to a real connection
//! for the blocking and cooperative-suspension flavors respectively.

pub mod async_cache;
pub mod cache;
pub mod callable;
pub mod client;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod keys;
pub mod policy;
pub mod scripts;
pub mod serializer;

pub use async_cache::AsyncFuncCache;
pub use cache::FuncCache;
pub use callable::CallableId;
pub use config::{CacheOptions, KeySpace, PolicyKind, PolicySpec, RedisClusterConfig, RedisConfig, Topology};
pub use error::{CacheError, CacheResult, ExecError};
pub use serializer::{JsonSerializer, Serializer};
