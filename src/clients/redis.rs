use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::MultiplexedConnection};
use tracing::{debug, info};

use crate::clients::store::ContentStore;

pub struct RedisStore {
    connection: MultiplexedConnection,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self, Error> {
        info!("Connecting to Redis");

        let client =
            Client::open(redis_url).map_err(|e| anyhow!("Failed to create redis client: {}", e))?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| anyhow!("Failed to connect to redis: {}", e))?;

        info!("Redis connection established");

        Ok(Self { connection })
    }
}

#[async_trait]
impl ContentStore for RedisStore {
    async fn put(&self, id: &str, payload: &str, ttl_seconds: u64) -> Result<(), Error> {
        let mut conn = self.connection.clone();

        conn.set_ex::<_, _, ()>(id, payload, ttl_seconds)
            .await
            .map_err(|e| anyhow!("Failed to write message: {}", e))?;

        debug!(message_id = id, ttl_seconds, "Message stored");
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<String>, Error> {
        let mut conn = self.connection.clone();

        let value: Option<String> = conn
            .get(id)
            .await
            .map_err(|e| anyhow!("Failed to read message: {}", e))?;

        Ok(value)
    }

    async fn ping(&self) -> Result<(), Error> {
        let mut conn = self.connection.clone();

        conn.ping::<String>()
            .await
            .map_err(|e| anyhow!("Ping failed: {}", e))?;

        Ok(())
    }
}
