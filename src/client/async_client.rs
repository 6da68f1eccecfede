//! Cooperative-suspension Redis client, standalone or cluster.

use redis::aio::MultiplexedConnection;
use redis::{Client, RedisResult, Script};

#[cfg(feature = "cluster")]
use redis::cluster::ClusterClientBuilder;
#[cfg(feature = "cluster")]
use redis::cluster_async::ClusterConnection;

use crate::config::{RedisClusterConfig, RedisConfig};
use crate::error::{CacheError, CacheResult};

pub enum RedisClient {
    Standalone(Client),
    #[cfg(feature = "cluster")]
    Cluster(redis::cluster::ClusterClient),
}

impl RedisClient {
    pub fn standalone(cfg: &RedisConfig) -> CacheResult<Self> {
        cfg.validate()
            .map_err(|e| CacheError::Configuration(e.to_string()))?;
        let client = Client::open(cfg.url.as_str())?;
        Ok(Self::Standalone(client))
    }

    #[cfg(feature = "cluster")]
    pub fn cluster(cfg: &RedisClusterConfig) -> CacheResult<Self> {
        cfg.validate()
            .map_err(|e| CacheError::Configuration(e.to_string()))?;
        let client = ClusterClientBuilder::new(cfg.urls.clone())
            .read_from_replicas()
            .build()?;
        Ok(Self::Cluster(client))
    }

    pub async fn get_connection(&self) -> CacheResult<RedisConn> {
        match self {
            Self::Standalone(client) => {
                Ok(RedisConn::Standalone(client.get_multiplexed_async_connection().await?))
            }
            #[cfg(feature = "cluster")]
            Self::Cluster(client) => Ok(RedisConn::Cluster(client.get_async_connection().await?)),
        }
    }
}

pub enum RedisConn {
    Standalone(MultiplexedConnection),
    #[cfg(feature = "cluster")]
    Cluster(ClusterConnection),
}

macro_rules! redis_cmd {
    ($conn:expr, |$c:ident| $body:expr) => {
        match $conn {
            RedisConn::Standalone(ref mut $c) => $body,
            #[cfg(feature = "cluster")]
            RedisConn::Cluster(ref mut $c) => $body,
        }
    };
}

/// Runs an arbitrary command against whichever connection flavor is
/// active. Used by administrative operations (e.g. `purge`) that aren't
/// shaped like the GET/PUT scripts.
pub async fn run<T: redis::FromRedisValue>(conn: &mut RedisConn, cmd: &mut redis::Cmd) -> CacheResult<T> {
    let result: RedisResult<T> = redis_cmd!(conn, |c| cmd.query_async(c).await);
    Ok(result?)
}

pub async fn exec_get(
    conn: &mut RedisConn,
    script: &Script,
    index_key: &str,
    data_key: &str,
    ttl: i64,
    hash: &str,
    options: &str,
    ext_args: &[String],
) -> CacheResult<Option<Vec<u8>>> {
    let mut invocation = script.prepare_invoke();
    invocation
        .key(index_key)
        .key(data_key)
        .arg(ttl)
        .arg(hash)
        .arg(options)
        .arg(ext_args);
    let result: RedisResult<Option<Vec<u8>>> = redis_cmd!(conn, |c| invocation.invoke_async(c).await);
    Ok(result?)
}

#[allow(clippy::too_many_arguments)]
pub async fn exec_put(
    conn: &mut RedisConn,
    script: &Script,
    index_key: &str,
    data_key: &str,
    maxsize: i64,
    ttl: i64,
    hash: &str,
    value: &[u8],
    options: &str,
    ext_args: &[String],
) -> CacheResult<()> {
    let mut invocation = script.prepare_invoke();
    invocation
        .key(index_key)
        .key(data_key)
        .arg(maxsize)
        .arg(ttl)
        .arg(hash)
        .arg(value)
        .arg(options)
        .arg(ext_args);
    let _: () = redis_cmd!(conn, |c| invocation.invoke_async(c).await)?;
    Ok(())
}
