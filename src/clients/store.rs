use anyhow::{Error, Result};
use async_trait::async_trait;

/// Key-value persistence with per-entry expiry, shared by the sender and
/// viewer routes.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn put(&self, id: &str, payload: &str, ttl_seconds: u64) -> Result<(), Error>;

    async fn get(&self, id: &str) -> Result<Option<String>, Error>;

    async fn ping(&self) -> Result<(), Error>;
}
