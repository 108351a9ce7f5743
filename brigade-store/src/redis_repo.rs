use redis::{AsyncCommands, RedisResult};
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    /// Cache a JSON payload under `key` for `ttl_seconds`.
    pub async fn cache_set(&self, key: &str, payload: &str, ttl_seconds: u64) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(key, payload, ttl_seconds).await?;
        Ok(())
    }

    pub async fn cache_get(&self, key: &str) -> RedisResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload: Option<String> = conn.get(key).await?;
        Ok(payload)
    }

    /// Delete every key matching `pattern`, iterating with SCAN rather
    /// than `KEYS`.
    pub async fn delete_matching(&self, pattern: &str) -> RedisResult<u64> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                deleted += keys.len() as u64;
                let _: () = redis::cmd("DEL").arg(&keys).query_async(&mut conn).await?;
            }

            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        debug!("Invalidated {} cache keys matching {}", deleted, pattern);
        Ok(deleted)
    }

    /// Store a refresh token secret under `refresh:{user_id}:{token_id}`.
    pub async fn store_refresh_token(
        &self,
        user_id: Uuid,
        token_id: &str,
        secret: &str,
        ttl_seconds: u64,
    ) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("refresh:{}:{}", user_id, token_id);
        conn.set_ex::<_, _, ()>(key, secret, ttl_seconds).await?;
        Ok(())
    }

    pub async fn get_refresh_token(
        &self,
        user_id: Uuid,
        token_id: &str,
    ) -> RedisResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("refresh:{}:{}", user_id, token_id);
        let secret: Option<String> = conn.get(key).await?;
        Ok(secret)
    }

    pub async fn revoke_refresh_token(&self, user_id: Uuid, token_id: &str) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("refresh:{}:{}", user_id, token_id);
        conn.del(key).await
    }
}
