//! Server-side atomic script library (C3).
//!
//! Every policy ships a GET/PUT pair of Lua scripts, loaded lazily via
//! [`redis::Script`] the way the teacher's `cache/redis.rs` embeds its
//! scripts as `const` strings. LRU and MRU share one script shape: both
//! maintain a sorted set scored by a monotonic microsecond tick, and differ
//! only in whether a cache hit refreshes that score and which end of the
//! set the eviction victim comes from — selected at call time by a
//! `direction` ext-arg (`"lru"` or `"mru"`), per [`crate::policy::Policy`]'s
//! `calc_ext_args`.
//!
//! All scripts take the index key as `KEYS[1]` and the data hash key as
//! `KEYS[2]`. GET scripts take `ARGV = [ttl, hash, options, ...ext_args]`
//! and return the cached value or `false`. PUT scripts take
//! `ARGV = [maxsize, ttl, hash, value, options, ...ext_args]` and return
//! `"OK"`, evicting one entry first if the cache is at capacity and the
//! incoming hash isn't already present.

use crate::config::PolicyKind;

/// GET/PUT shared by LRU and MRU. `direction` (ext-arg 1) is `"lru"` or
/// `"mru"`: LRU refreshes the index score on every hit and evicts the
/// lowest score (least recently touched); MRU only ever scores on insert
/// and evicts the highest score (most recently inserted), matching the
/// original implementation's behavior where overflow evicts the newest
/// insertion rather than the most recently accessed entry.
pub const LRU_MRU_GET: &str = r#"
local index_key = KEYS[1]
local data_key = KEYS[2]
local ttl = tonumber(ARGV[1])
local hash = ARGV[2]
local direction = ARGV[4]

local value = redis.call('HGET', data_key, hash)
if value == false then
    return false
end

if direction == 'lru' then
    local now = redis.call('TIME')
    local ts = tonumber(now[1]) * 1000000 + tonumber(now[2])
    redis.call('ZADD', index_key, ts, hash)
end

if ttl > 0 then
    redis.call('EXPIRE', index_key, ttl)
    redis.call('EXPIRE', data_key, ttl)
end

return value
"#;

pub const LRU_MRU_PUT: &str = r#"
local index_key = KEYS[1]
local data_key = KEYS[2]
local maxsize = tonumber(ARGV[1])
local ttl = tonumber(ARGV[2])
local hash = ARGV[3]
local value = ARGV[4]
local direction = ARGV[6]

if maxsize > 0 and redis.call('ZSCORE', index_key, hash) == false then
    if redis.call('ZCARD', index_key) >= maxsize then
        local victim
        if direction == 'mru' then
            victim = redis.call('ZREVRANGE', index_key, 0, 0)
        else
            victim = redis.call('ZRANGE', index_key, 0, 0)
        end
        if victim[1] then
            redis.call('ZREM', index_key, victim[1])
            redis.call('HDEL', data_key, victim[1])
        end
    end
end

local now = redis.call('TIME')
local ts = tonumber(now[1]) * 1000000 + tonumber(now[2])
redis.call('ZADD', index_key, ts, hash)
redis.call('HSET', data_key, hash, value)

if ttl > 0 then
    redis.call('EXPIRE', index_key, ttl)
    redis.call('EXPIRE', data_key, ttl)
end

return redis.status_reply('OK')
"#;

/// GET/PUT for FIFO. Insertion order only: a hit never touches the index,
/// so `ZADD ... NX` on PUT leaves an already-present hash's position alone.
pub const FIFO_GET: &str = r#"
local index_key = KEYS[1]
local data_key = KEYS[2]
local ttl = tonumber(ARGV[1])
local hash = ARGV[2]

local value = redis.call('HGET', data_key, hash)
if value == false then
    return false
end

if ttl > 0 then
    redis.call('EXPIRE', index_key, ttl)
    redis.call('EXPIRE', data_key, ttl)
end

return value
"#;

pub const FIFO_PUT: &str = r#"
local index_key = KEYS[1]
local data_key = KEYS[2]
local maxsize = tonumber(ARGV[1])
local ttl = tonumber(ARGV[2])
local hash = ARGV[3]
local value = ARGV[4]

if maxsize > 0 and redis.call('ZSCORE', index_key, hash) == false then
    if redis.call('ZCARD', index_key) >= maxsize then
        local victim = redis.call('ZRANGE', index_key, 0, 0)
        if victim[1] then
            redis.call('ZREM', index_key, victim[1])
            redis.call('HDEL', data_key, victim[1])
        end
    end
end

local now = redis.call('TIME')
local ts = tonumber(now[1]) * 1000000 + tonumber(now[2])
redis.call('ZADD', index_key, 'NX', ts, hash)
redis.call('HSET', data_key, hash, value)

if ttl > 0 then
    redis.call('EXPIRE', index_key, ttl)
    redis.call('EXPIRE', data_key, ttl)
end

return redis.status_reply('OK')
"#;

/// GET/PUT for LFU. The index score is an access count, incremented on
/// every hit; eviction removes the lowest count.
pub const LFU_GET: &str = r#"
local index_key = KEYS[1]
local data_key = KEYS[2]
local ttl = tonumber(ARGV[1])
local hash = ARGV[2]

local value = redis.call('HGET', data_key, hash)
if value == false then
    return false
end

redis.call('ZINCRBY', index_key, 1, hash)

if ttl > 0 then
    redis.call('EXPIRE', index_key, ttl)
    redis.call('EXPIRE', data_key, ttl)
end

return value
"#;

pub const LFU_PUT: &str = r#"
local index_key = KEYS[1]
local data_key = KEYS[2]
local maxsize = tonumber(ARGV[1])
local ttl = tonumber(ARGV[2])
local hash = ARGV[3]
local value = ARGV[4]

if maxsize > 0 and redis.call('ZSCORE', index_key, hash) == false then
    if redis.call('ZCARD', index_key) >= maxsize then
        local victim = redis.call('ZRANGE', index_key, 0, 0)
        if victim[1] then
            redis.call('ZREM', index_key, victim[1])
            redis.call('HDEL', data_key, victim[1])
        end
    end
end

redis.call('ZADD', index_key, 'NX', 0, hash)
redis.call('HSET', data_key, hash, value)

if ttl > 0 then
    redis.call('EXPIRE', index_key, ttl)
    redis.call('EXPIRE', data_key, ttl)
end

return redis.status_reply('OK')
"#;

/// GET/PUT for random replacement. The index is an unordered set; a hit
/// never touches it, and eviction picks a uniformly random member.
pub const RR_GET: &str = r#"
local index_key = KEYS[1]
local data_key = KEYS[2]
local ttl = tonumber(ARGV[1])
local hash = ARGV[2]

local value = redis.call('HGET', data_key, hash)
if value == false then
    return false
end

if ttl > 0 then
    redis.call('EXPIRE', index_key, ttl)
    redis.call('EXPIRE', data_key, ttl)
end

return value
"#;

pub const RR_PUT: &str = r#"
local index_key = KEYS[1]
local data_key = KEYS[2]
local maxsize = tonumber(ARGV[1])
local ttl = tonumber(ARGV[2])
local hash = ARGV[3]
local value = ARGV[4]

if maxsize > 0 and redis.call('SISMEMBER', index_key, hash) == 0 then
    if redis.call('SCARD', index_key) >= maxsize then
        local victim = redis.call('SRANDMEMBER', index_key)
        if victim then
            redis.call('SREM', index_key, victim)
            redis.call('HDEL', data_key, victim)
        end
    end
end

redis.call('SADD', index_key, hash)
redis.call('HSET', data_key, hash, value)

if ttl > 0 then
    redis.call('EXPIRE', index_key, ttl)
    redis.call('EXPIRE', data_key, ttl)
end

return redis.status_reply('OK')
"#;

/// Returns the `(get, put)` script source pair for a policy kind.
pub fn scripts_for(kind: PolicyKind) -> (&'static str, &'static str) {
    match kind {
        PolicyKind::Lru | PolicyKind::Mru => (LRU_MRU_GET, LRU_MRU_PUT),
        PolicyKind::Fifo => (FIFO_GET, FIFO_PUT),
        PolicyKind::Lfu => (LFU_GET, LFU_PUT),
        PolicyKind::Rr => (RR_GET, RR_PUT),
    }
}
