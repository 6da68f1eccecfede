//! Error taxonomy.
//!
//! [`CacheError`] covers everything that can go wrong inside the crate
//! itself. The user callable's own failure is not folded into it, since its
//! error type isn't fixed by the crate — see [`ExecError`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("redis transport error: {0}")]
    Transport(#[from] redis::RedisError),

    #[error("lua script not loaded on server: {0}")]
    ScriptMissing(String),

    #[error("failed to serialize value: {0}")]
    Serialization(String),

    #[error("failed to decode cached value: {0}")]
    Decode(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Error returned by [`crate::cache::FuncCache::exec`] and
/// [`crate::async_cache::AsyncFuncCache::aexec`].
///
/// Wraps either a crate-internal [`CacheError`] or the user callable's own
/// error, propagated unchanged so callers can match on it without the crate
/// getting in the way.
#[derive(Debug, Error)]
pub enum ExecError<E> {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("user callable failed: {0}")]
    User(E),
}
