use serde::{Deserialize, Serialize};

/// Generations granted to a new, non-pro account.
pub const FREE_QUOTA: u32 = 5;

/// Stored as `generations_remaining` for pro accounts. Pro accounts never
/// consume it; it only exists so clients can display a number.
pub const UNLIMITED_GENERATIONS: u32 = 999;

/// Durable account record, keyed by email in the account table.
///
/// Field names on the wire match the table layout written by the web client
/// (`generationsLeft`, `isPro`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub email: String,
    #[serde(rename = "generationsLeft")]
    pub generations_remaining: u32,
    #[serde(rename = "isPro")]
    pub is_pro: bool,
}

impl Account {
    /// A fresh free-tier account.
    pub fn new_free(email: &str) -> Self {
        Self {
            email: email.to_string(),
            generations_remaining: FREE_QUOTA,
            is_pro: false,
        }
    }

    /// Whether the paywall lets this account run another generation.
    pub fn can_generate(&self) -> bool {
        self.is_pro || self.generations_remaining > 0
    }
}
