//! Key-value persistence — the only storage dependency of the entitlement store.
//!
//! Backends implement `KeyValueStore`; `AppState` carries one as `Arc<dyn KeyValueStore>`,
//! chosen at startup from config (Redis when `REDIS_URL` is set, memory otherwise).

use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod redis_store;

pub use memory::MemoryKv;
pub use redis_store::RedisKv;

#[derive(Debug, Error)]
pub enum KvError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// String-keyed, string-valued storage with get / set / delete.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError>;

    /// Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), KvError>;

    /// Short backend name for startup logs.
    fn backend(&self) -> &'static str;
}
