use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::info;

use super::{KeyValueStore, KvError};

/// Redis backend. Accounts and session pointers survive restarts.
#[derive(Clone)]
pub struct RedisKv {
    conn: MultiplexedConnection,
}

impl RedisKv {
    /// Opens a multiplexed connection; fails fast if Redis is unreachable.
    pub async fn connect(redis_url: &str) -> anyhow::Result<Self> {
        info!("Connecting to Redis...");
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Redis connection established");
        Ok(Self { conn })
    }
}

fn unavailable(e: redis::RedisError) -> KvError {
    KvError::Unavailable(e.to_string())
}

#[async_trait]
impl KeyValueStore for RedisKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(key).await.map_err(unavailable)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, value).await.map_err(unavailable)
    }

    async fn delete(&self, key: &str) -> Result<(), KvError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await.map_err(unavailable)
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
