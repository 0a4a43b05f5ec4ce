use redis::Commands;

use crate::domain::ports::ListCache;

/// Redis-backed list cache. Every failure, whether connecting, running the
/// command or decoding the reply, collapses into a miss or a no-op with a
/// warning; callers never observe cache errors.
pub struct RedisListCache {
    client: redis::Client,
}

impl RedisListCache {
    /// Accepts a `redis://` URL. Connections are opened lazily per call, so
    /// an unreachable server degrades to permanent misses instead of failing
    /// startup.
    pub fn connect(url: &str) -> Result<Self, redis::RedisError> {
        Ok(Self { client: redis::Client::open(url)? })
    }
}

impl ListCache for RedisListCache {
    fn get(&self, key: &str) -> Option<String> {
        let result = self
            .client
            .get_connection()
            .and_then(|mut conn| conn.get::<_, Option<String>>(key));
        match result {
            Ok(value) => value,
            Err(e) => {
                log::warn!("cache get {key}: {e}");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str, ttl_seconds: u64) {
        let result = self.client.get_connection().and_then(|mut conn| {
            if ttl_seconds > 0 {
                conn.set_ex::<_, _, ()>(key, value, ttl_seconds)
            } else {
                conn.set::<_, _, ()>(key, value)
            }
        });
        if let Err(e) = result {
            log::warn!("cache set {key}: {e}");
        }
    }

    fn invalidate_prefix(&self, prefix: &str) {
        let result = self.client.get_connection().and_then(|mut conn| {
            let pattern = format!("{prefix}*");
            let keys: Vec<String> = {
                let iter = conn.scan_match::<_, String>(&pattern)?;
                iter.collect()
            };
            if !keys.is_empty() {
                conn.del::<_, ()>(keys)?;
            }
            Ok(())
        });
        if let Err(e) = result {
            log::warn!("cache invalidate {prefix}*: {e}");
        }
    }
}

/// Stand-in when no `REDIS_URL` is configured: every read misses and every
/// write is dropped.
pub struct NoopListCache;

impl ListCache for NoopListCache {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str, _ttl_seconds: u64) {}

    fn invalidate_prefix(&self, _prefix: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    // Port 1 never hosts a Redis server, so every call below exercises the
    // degraded path: connection refused must read as a miss, not an error.
    #[test]
    fn unreachable_backend_degrades_to_misses() {
        let cache = RedisListCache::connect("redis://127.0.0.1:1/").expect("client");
        assert_eq!(cache.get("agency:product"), None);
        cache.set("agency:product", "[]", 120);
        cache.invalidate_prefix("agency:product");
    }

    #[test]
    fn noop_cache_never_hits() {
        let cache = NoopListCache;
        cache.set("agency:brand", "[]", 120);
        assert_eq!(cache.get("agency:brand"), None);
    }
}
