//! Redis connection handling: standalone vs cluster, sync vs async.
//!
//! Mirrors the teacher's `cache/redis.rs` connection-dispatch enum, split
//! into a blocking flavor ([`sync_client`]) and a cooperative-suspension
//! flavor ([`async_client`]) since design note 9 forbids bridging the two
//! at runtime.

pub mod async_client;
pub mod sync_client;
