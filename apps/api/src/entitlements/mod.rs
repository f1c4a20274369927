// Entitlement Store: accounts, free-generation quota, pro status and the
// per-device session pointer. All persistence goes through kv::KeyValueStore.

pub mod handlers;
pub mod models;
pub mod store;

pub use models::{Account, FREE_QUOTA, UNLIMITED_GENERATIONS};
pub use store::{EntitlementError, EntitlementStore};
