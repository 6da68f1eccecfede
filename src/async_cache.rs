//! Async cache orchestrator (C5, cooperative-suspension flavor).
//!
//! Same algorithm as [`crate::cache::FuncCache::exec`], specialized to
//! `redis::aio::MultiplexedConnection`/`cluster_async::ClusterConnection`
//! under Tokio. Kept as a fully separate type rather than bridged onto the
//! sync orchestrator at runtime, per design note 9.

use std::future::Future;
use std::sync::Arc;

use redis::Script;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::callable::CallableId;
use crate::client::async_client::{self, RedisClient};
use crate::config::{CacheOptions, RedisClusterConfig, RedisConfig};
use crate::error::{CacheError, CacheResult, ExecError};
use crate::policy::CacheState;
use crate::serializer::{JsonSerializer, Serializer};

pub struct AsyncFuncCache<S = JsonSerializer> {
    state: Arc<CacheState>,
    client: RedisClient,
    script_get: Script,
    script_put: Script,
    serializer: S,
}

impl AsyncFuncCache<JsonSerializer> {
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

impl<S> AsyncFuncCache<S> {
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

    /// Executes `f` through the cache: GET first, await `f` on a miss, PUT
    /// the result, return it either way. `f` runs at most once.
    pub async fn aexec<T, Args, Kwds, F, Fut, E>(
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
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        S: Serializer<T>,
    {
        let args_bytes = encode(args).map_err(ExecError::Cache)?;
        let kwds_bytes = encode(kwds).map_err(ExecError::Cache)?;
        let policy = &self.state.policy;
        let keys = policy.calc_keys(&callable).map_err(ExecError::Cache)?;
        let hash = policy.calc_hash(&callable, &args_bytes, &kwds_bytes);
        let ext_args = policy.calc_ext_args();
        let options_json = encode_options(options).map_err(ExecError::Cache)?;

        let mut conn = self.client.get_connection().await.map_err(ExecError::Cache)?;
        let cached = async_client::exec_get(
            &mut conn,
            &self.script_get,
            &keys.index,
            &keys.data,
            self.state.ttl,
            &hash,
            &options_json,
            &ext_args,
        )
        .await
        .map_err(ExecError::Cache)?;

        if let Some(bytes) = cached {
            tracing::debug!(cache = %self.state.name, hash = %hash, "cache hit");
            return self.serializer.deserialize(&bytes).map_err(ExecError::Cache);
        }
        tracing::debug!(cache = %self.state.name, hash = %hash, "cache miss");

        let value = f().await.map_err(ExecError::User)?;
        let encoded = self.serializer.serialize(&value).map_err(ExecError::Cache)?;
        if let Err(err) = async_client::exec_put(
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
        )
        .await
        {
            tracing::warn!(cache = %self.state.name, hash = %hash, error = %err, "failed to store cache entry");
        }
        Ok(value)
    }

    /// Wraps `f` into a closure that runs it through [`Self::aexec`]. A
    /// thin convenience over `aexec`, not a procedural macro. Returns a
    /// boxed future since stable Rust has no async closure trait yet.
    pub fn decorate_async<'a, T, Args, Kwds, F, Fut, E>(
        &'a self,
        callable: CallableId,
        f: F,
    ) -> impl Fn(&'a Args, &'a Kwds) -> std::pin::Pin<Box<dyn Future<Output = Result<T, ExecError<E>>> + 'a>>
    where
        Args: Serialize + 'a,
        Kwds: Serialize + 'a,
        T: Serialize + DeserializeOwned + 'a,
        F: Fn(&'a Args, &'a Kwds) -> Fut + Clone + 'a,
        Fut: Future<Output = Result<T, E>> + 'a,
        S: Serializer<T>,
    {
        move |args: &'a Args, kwds: &'a Kwds| {
            let callable = callable.clone();
            let f = f.clone();
            Box::pin(async move { self.aexec(callable, args, kwds, None, || f(args, kwds)).await })
        }
    }

    /// Drops every entry tracked under one key pair. See
    /// [`crate::cache::FuncCache::purge`] for the single/multiple-keyspace
    /// split this mirrors.
    pub async fn purge(&self, callable: Option<&CallableId>) -> CacheResult<()> {
        let policy = &self.state.policy;
        let keys = policy.calc_keys_for_purge(callable)?;
        let mut conn = self.client.get_connection().await?;
        let mut cmd = redis::cmd("DEL");
        cmd.arg(&keys.index).arg(&keys.data);
        let _: () = async_client::run(&mut conn, &mut cmd).await?;
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
