//! Serializer collaborator (C6).
//!
//! The orchestrator never inspects a cached value's shape; it only needs to
//! turn a user return value into bytes before `PUT` and back again after a
//! `GET`. [`Serializer`] is the seam a caller can swap to use a different
//! wire format; [`JsonSerializer`] is the default, matching the teacher's
//! JSON-everywhere convention.

use crate::error::CacheError;

/// Serialize/deserialize a user return value to/from the bytes stored in
/// Redis.
///
/// `T` is the return type of the user callable being cached; it must
/// round-trip through `serde`.
pub trait Serializer<T>: Send + Sync {
    fn serialize(&self, value: &T) -> Result<Vec<u8>, CacheError>;
    fn deserialize(&self, data: &[u8]) -> Result<T, CacheError>;
}

/// Default serializer. Textual and Unicode-preserving, matching the
/// original implementation's `json.dumps(..., ensure_ascii=False)`.
///
/// `serde_json::Value`'s object representation is a `BTreeMap` unless the
/// `preserve_order` feature is enabled, so encoding the same value twice
/// always yields the same bytes — fingerprints computed over serialized
/// args/kwds are stable across process runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl<T> Serializer<T> for JsonSerializer
where
    T: serde::Serialize + serde::de::DeserializeOwned + Send + Sync,
{
    fn serialize(&self, value: &T) -> Result<Vec<u8>, CacheError> {
        serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))
    }

    fn deserialize(&self, data: &[u8]) -> Result<T, CacheError> {
        serde_json::from_slice(data).map_err(|e| CacheError::Decode(e.to_string()))
    }
}
