//! Sync cache orchestrator (C5, blocking flavor).
//!
//! `exec` is the whole algorithm from `SPEC_FULL.md` §4.5: derive the
//! fingerprint and key pair, attempt a GET, run the user callable on a
//! miss, then PUT the result. Matches the original implementation's
//! `RedisFuncCache.exec`, specialized to a blocking `redis::Connection`.

use std::sync::Arc;

use redis::Script;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::callable::CallableId;
use crate::client::sync_client::{self, RedisClient};
use crate::config::{CacheOptions, RedisClusterConfig, RedisConfig};
use crate::error::{CacheError, CacheResult, ExecError};
use crate::policy::CacheState;
use crate::serializer::{JsonSerializer, Serializer};

pub struct FuncCache<S = JsonSerializer> {
    state: Arc<CacheState>,
    client: RedisClient,
    script_get: Script,
    script_put: Script,
    serializer: S,
}

impl FuncCache<JsonSerializer> {
    pub fn standalone(options: CacheOptions, redis: &RedisConfig) -> CacheResult<Self> {
        options
            .validate()
            .map_err(|e| CacheError::Configuration(e.to_string()))?;
        Self::new(options, RedisClient::standalone(redis)?, JsonSerializer)
    }

    #[cfg(feature = "cluster")]
    pub fn cluster(options: CacheOptions, redis: &RedisClusterConfig) -> CacheResult<Self> {
        options
            .validate()
            .map_err(|e| CacheError::Configuration(e.to_string()))?;
        Self::new(options, RedisClient::cluster(redis)?, JsonSerializer)
    }
}

impl<S> FuncCache<S> {
    pub fn new(options: CacheOptions, client: RedisClient, serializer: S) -> CacheResult<Self> {
        let state = CacheState::new(
            options.name,
            options.prefix,
            options.maxsize,
            options.ttl,
            options.policy,
        );
        let (get_src, put_src) = state.policy.lua_scripts();
        Ok(Self {
            state,
            client,
            script_get: Script::new(get_src),
            script_put: Script::new(put_src),
            serializer,
        })
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// Executes `f` through the cache: GET first, call `f` on a miss, PUT
    /// the result, return it either way. `f` runs at most once.
    pub fn exec<T, Args, Kwds, F, E>(
        &self,
        callable: CallableId,
        args: &Args,
        kwds: &Kwds,
        options: Option<&serde_json::Value>,
        f: F,
    ) -> Result<T, ExecError<E>>
    where
        Args: Serialize,
        Kwds: Serialize,
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, E>,
        S: Serializer<T>,
    {
        let args_bytes = encode(args).map_err(ExecError::Cache)?;
        let kwds_bytes = encode(kwds).map_err(ExecError::Cache)?;
        let policy = &self.state.policy;
        let keys = policy.calc_keys(&callable).map_err(ExecError::Cache)?;
        let hash = policy.calc_hash(&callable, &args_bytes, &kwds_bytes);
        let ext_args = policy.calc_ext_args();
        let options_json = encode_options(options).map_err(ExecError::Cache)?;

        let mut conn = self.client.get_connection().map_err(ExecError::Cache)?;
        let cached = sync_client::exec_get(
            &mut conn,
            &self.script_get,
            &keys.index,
            &keys.data,
            self.state.ttl,
            &hash,
            &options_json,
            &ext_args,
        )
        .map_err(ExecError::Cache)?;

        if let Some(bytes) = cached {
            tracing::debug!(cache = %self.state.name, hash = %hash, "cache hit");
            return self.serializer.deserialize(&bytes).map_err(ExecError::Cache);
        }
        tracing::debug!(cache = %self.state.name, hash = %hash, "cache miss");

        let value = f().map_err(ExecError::User)?;
        let encoded = self.serializer.serialize(&value).map_err(ExecError::Cache)?;
        if let Err(err) = sync_client::exec_put(
            &mut conn,
            &self.script_put,
            &keys.index,
            &keys.data,
            self.state.maxsize,
            self.state.ttl,
            &hash,
            &encoded,
            &options_json,
            &ext_args,
        ) {
            tracing::warn!(cache = %self.state.name, hash = %hash, error = %err, "failed to store cache entry");
        }
        Ok(value)
    }

    /// Wraps `f` into a closure that runs it through [`Self::exec`]. A thin
    /// convenience over `exec`, not a procedural macro.
    pub fn decorate<T, Args, Kwds, F, E>(
        &self,
        callable: CallableId,
        f: F,
    ) -> impl Fn(&Args, &Kwds) -> Result<T, ExecError<E>> + '_
    where
        Args: Serialize,
        Kwds: Serialize,
        T: Serialize + DeserializeOwned,
        F: Fn(&Args, &Kwds) -> Result<T, E>,
        S: Serializer<T>,
    {
        move |args: &Args, kwds: &Kwds| self.exec(callable.clone(), args, kwds, None, || f(args, kwds))
    }

    /// Drops every entry tracked under one key pair: the whole cache in
    /// `KeySpace::Single` mode (`callable` may then be omitted), or one
    /// callable's entries in `KeySpace::Multiple` mode (`callable` is then
    /// required — see [`crate::policy::Policy::calc_keys_for_purge`]). Not
    /// part of the per-invocation atomicity guarantee `exec` relies on, but
    /// still a single `DEL` against both keys of the pair.
    pub fn purge(&self, callable: Option<&CallableId>) -> CacheResult<()> {
        let policy = &self.state.policy;
        let keys = policy.calc_keys_for_purge(callable)?;
        let mut conn = self.client.get_connection()?;
        let mut cmd = redis::cmd("DEL");
        cmd.arg(&keys.index).arg(&keys.data);
        let _: () = sync_client::run(&mut conn, &mut cmd)?;
        Ok(())
    }
}

fn encode<V: Serialize>(value: &V) -> CacheResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))
}

fn encode_options(options: Option<&serde_json::Value>) -> CacheResult<String> {
    match options {
        Some(v) => serde_json::to_string(v).map_err(|e| CacheError::Serialization(e.to_string())),
        None => Ok("{}".to_string()),
    }
}
