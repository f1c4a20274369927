//! Entitlement Store — single source of truth for account existence, quota and pro status.
//!
//! Layout in the key-value backend:
//! - `MARINE_AI_PRO_USERS`: JSON object mapping email → `Account`
//! - `MARINE_AI_PRO_SESSION[:<device>]`: email of the signed-in account, absent when signed out
//! - `MARINE_AI_PRO_CHECKOUT:<reference>`: email a checkout reference was issued to
//!
//! The account table is a single value, so every read-modify-write of it runs under
//! `table_lock`. The lock is shared by all device-scoped views of the same store, but it is
//! process-local: one API instance per backend.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::entitlements::models::{Account, FREE_QUOTA, UNLIMITED_GENERATIONS};
use crate::kv::{KeyValueStore, KvError};

pub const ACCOUNTS_KEY: &str = "MARINE_AI_PRO_USERS";
pub const SESSION_KEY: &str = "MARINE_AI_PRO_SESSION";
pub const CHECKOUT_KEY_PREFIX: &str = "MARINE_AI_PRO_CHECKOUT";

type AccountTable = BTreeMap<String, Account>;

fn checkout_key(reference: &str) -> String {
    format!("{CHECKOUT_KEY_PREFIX}:{reference}")
}

#[derive(Debug, Error)]
pub enum EntitlementError {
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("No generations left for {0}")]
    QuotaExhausted(String),

    #[error("Email must not be empty")]
    InvalidEmail,
}

impl From<KvError> for EntitlementError {
    fn from(e: KvError) -> Self {
        match e {
            KvError::Unavailable(msg) => EntitlementError::PersistenceUnavailable(msg),
        }
    }
}

pub type EntitlementResult<T> = Result<T, EntitlementError>;

#[derive(Clone)]
pub struct EntitlementStore {
    kv: Arc<dyn KeyValueStore>,
    session_key: String,
    table_lock: Arc<Mutex<()>>,
}

impl EntitlementStore {
    /// A store with a single, unscoped session pointer.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            session_key: SESSION_KEY.to_string(),
            table_lock: Arc::new(Mutex::new(())),
        }
    }

    /// A view sharing the account table and its lock, with its own session pointer.
    pub fn for_device(&self, device_id: &str) -> Self {
        Self {
            kv: Arc::clone(&self.kv),
            session_key: format!("{SESSION_KEY}:{device_id}"),
            table_lock: Arc::clone(&self.table_lock),
        }
    }

    /// Returns the signed-in account, or `None` when nobody is signed in or the
    /// session points at an email with no account. Never creates anything.
    pub async fn resume_session(&self) -> EntitlementResult<Option<Account>> {
        let Some(email) = self.kv.get(&self.session_key).await? else {
            return Ok(None);
        };
        let mut accounts = self.load_accounts().await?;
        let account = accounts.remove(&email);
        if account.is_none() {
            debug!("Session points at unknown account {email}; treating as signed out");
        }
        Ok(account)
    }

    #[cfg(test)]
    pub async fn get_account(&self, email: &str) -> EntitlementResult<Option<Account>> {
        let mut accounts = self.load_accounts().await?;
        Ok(accounts.remove(email))
    }

    /// Signs in `email`, creating a free account on first use. The session pointer is
    /// written every time, whether or not the account already existed.
    ///
    /// `email` must already be trimmed by the caller.
    pub async fn login_or_create(&self, email: &str) -> EntitlementResult<Account> {
        if email.is_empty() {
            return Err(EntitlementError::InvalidEmail);
        }

        let account = {
            let _guard = self.table_lock.lock().await;
            let mut accounts = self.load_accounts().await?;
            match accounts.get(email) {
                Some(existing) => existing.clone(),
                None => {
                    let created = Account::new_free(email);
                    accounts.insert(email.to_string(), created.clone());
                    self.save_accounts(&accounts).await?;
                    info!("Created account {email}");
                    created
                }
            }
        };

        self.kv.set(&self.session_key, email).await?;
        Ok(account)
    }

    /// Clears the session pointer. Account records are untouched.
    pub async fn logout(&self) -> EntitlementResult<()> {
        self.kv.delete(&self.session_key).await?;
        Ok(())
    }

    /// Uses one free generation. Pro accounts are returned unchanged; free accounts
    /// are decremented and floored at zero.
    ///
    /// Never refuses; request handling goes through `reserve_generation` instead.
    #[allow(dead_code)]
    pub async fn consume_generation(&self, email: &str) -> EntitlementResult<Account> {
        self.update_account(email, |account| {
            if account.is_pro {
                return Ok(false);
            }
            account.generations_remaining = account.generations_remaining.saturating_sub(1);
            Ok(true)
        })
        .await
    }

    /// Checks the paywall and takes one free generation in a single locked step, so
    /// concurrent requests cannot spend the same generation twice. Fails with
    /// `QuotaExhausted` at zero. Pro accounts are returned unchanged.
    pub async fn reserve_generation(&self, email: &str) -> EntitlementResult<Account> {
        self.update_account(email, |account| {
            if account.is_pro {
                return Ok(false);
            }
            if account.generations_remaining == 0 {
                return Err(EntitlementError::QuotaExhausted(account.email.clone()));
            }
            account.generations_remaining -= 1;
            Ok(true)
        })
        .await
    }

    /// Gives back a generation taken by `reserve_generation` whose work failed.
    pub async fn refund_generation(&self, email: &str) -> EntitlementResult<Account> {
        self.update_account(email, |account| {
            if account.is_pro {
                return Ok(false);
            }
            account.generations_remaining =
                account.generations_remaining.saturating_add(1).min(FREE_QUOTA);
            Ok(true)
        })
        .await
    }

    /// Grants pro status. Re-asserting it on a pro account is a no-op in effect.
    pub async fn upgrade_to_pro(&self, email: &str) -> EntitlementResult<Account> {
        let updated = self
            .update_account(email, |account| {
                account.is_pro = true;
                account.generations_remaining = UNLIMITED_GENERATIONS;
                Ok(true)
            })
            .await?;
        info!("Account {email} upgraded to pro");
        Ok(updated)
    }

    /// Records that `reference` was issued to `email` for a pro checkout.
    pub async fn record_checkout(&self, reference: &str, email: &str) -> EntitlementResult<()> {
        self.kv.set(&checkout_key(reference), email).await?;
        Ok(())
    }

    /// Email the checkout `reference` was issued to, if it is still open.
    pub async fn checkout_email(&self, reference: &str) -> EntitlementResult<Option<String>> {
        Ok(self.kv.get(&checkout_key(reference)).await?)
    }

    pub async fn close_checkout(&self, reference: &str) -> EntitlementResult<()> {
        self.kv.delete(&checkout_key(reference)).await?;
        Ok(())
    }

    /// Locked read-modify-write of one account. `apply` returns whether it changed
    /// anything; unchanged accounts are not written back.
    async fn update_account<F>(&self, email: &str, apply: F) -> EntitlementResult<Account>
    where
        F: FnOnce(&mut Account) -> EntitlementResult<bool>,
    {
        let _guard = self.table_lock.lock().await;
        let mut accounts = self.load_accounts().await?;
        let account = accounts
            .get_mut(email)
            .ok_or_else(|| EntitlementError::AccountNotFound(email.to_string()))?;

        if !apply(&mut *account)? {
            return Ok(account.clone());
        }
        let updated = account.clone();
        self.save_accounts(&accounts).await?;

        debug!(
            "Account {email} saved: generations_left={} pro={}",
            updated.generations_remaining, updated.is_pro
        );
        Ok(updated)
    }

    /// Reads the account table. A corrupted table is logged and read as empty.
    async fn load_accounts(&self) -> EntitlementResult<AccountTable> {
        let Some(raw) = self.kv.get(ACCOUNTS_KEY).await? else {
            return Ok(AccountTable::new());
        };
        match serde_json::from_str(&raw) {
            Ok(accounts) => Ok(accounts),
            Err(e) => {
                warn!("Account table is malformed, treating as empty: {e}");
                Ok(AccountTable::new())
            }
        }
    }

    async fn save_accounts(&self, accounts: &AccountTable) -> EntitlementResult<()> {
        let raw = serde_json::to_string(accounts)
            .map_err(|e| EntitlementError::PersistenceUnavailable(e.to_string()))?;
        self.kv.set(ACCOUNTS_KEY, &raw).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;

    fn store_with_kv() -> (EntitlementStore, Arc<MemoryKv>) {
        let kv = Arc::new(MemoryKv::new());
        (EntitlementStore::new(kv.clone()), kv)
    }

    #[tokio::test]
    async fn test_free_quota_scenario() {
        let (store, _) = store_with_kv();

        let account = store.login_or_create("a@x.com").await.unwrap();
        assert_eq!(account.generations_remaining, 5);
        assert!(!account.is_pro);

        for _ in 0..5 {
            store.consume_generation("a@x.com").await.unwrap();
        }
        let account = store.get_account("a@x.com").await.unwrap().unwrap();
        assert_eq!(account.generations_remaining, 0);

        // Sixth call stays at zero without failing
        let account = store.consume_generation("a@x.com").await.unwrap();
        assert_eq!(account.generations_remaining, 0);

        let account = store.upgrade_to_pro("a@x.com").await.unwrap();
        assert_eq!(account.generations_remaining, 999);
        assert!(account.is_pro);

        let account = store.consume_generation("a@x.com").await.unwrap();
        assert_eq!(account.generations_remaining, 999);
        assert!(account.is_pro);
    }

    #[tokio::test]
    async fn test_consume_follows_max_zero_n_minus_k() {
        let (store, _) = store_with_kv();
        store.login_or_create("k@x.com").await.unwrap();

        for k in 1..=8u32 {
            let account = store.consume_generation("k@x.com").await.unwrap();
            assert_eq!(account.generations_remaining, FREE_QUOTA.saturating_sub(k));
        }
    }

    #[tokio::test]
    async fn test_pro_never_decrements() {
        let (store, _) = store_with_kv();
        store.login_or_create("pro@x.com").await.unwrap();
        store.upgrade_to_pro("pro@x.com").await.unwrap();

        for _ in 0..20 {
            store.consume_generation("pro@x.com").await.unwrap();
        }
        let account = store.get_account("pro@x.com").await.unwrap().unwrap();
        assert!(account.is_pro);
        assert_eq!(account.generations_remaining, UNLIMITED_GENERATIONS);
    }

    #[tokio::test]
    async fn test_upgrade_is_idempotent() {
        let (store, _) = store_with_kv();
        store.login_or_create("a@x.com").await.unwrap();
        let first = store.upgrade_to_pro("a@x.com").await.unwrap();
        let second = store.upgrade_to_pro("a@x.com").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unknown_email_is_account_not_found() {
        let (store, _) = store_with_kv();
        let err = store.consume_generation("unknown@x.com").await.unwrap_err();
        assert!(matches!(err, EntitlementError::AccountNotFound(ref e) if e == "unknown@x.com"));

        let err = store.upgrade_to_pro("unknown@x.com").await.unwrap_err();
        assert!(matches!(err, EntitlementError::AccountNotFound(_)));
    }

    #[tokio::test]
    async fn test_login_twice_creates_one_account_and_sets_session() {
        let (store, kv) = store_with_kv();

        store.login_or_create("a@x.com").await.unwrap();
        store.consume_generation("a@x.com").await.unwrap();
        store.logout().await.unwrap();

        let account = store.login_or_create("a@x.com").await.unwrap();
        // Pre-existing account is returned with its current quota
        assert_eq!(account.generations_remaining, 4);
        assert_eq!(
            kv.get(SESSION_KEY).await.unwrap().as_deref(),
            Some("a@x.com")
        );

        let table: AccountTable =
            serde_json::from_str(&kv.get(ACCOUNTS_KEY).await.unwrap().unwrap()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn test_login_rejects_empty_email() {
        let (store, kv) = store_with_kv();
        let err = store.login_or_create("").await.unwrap_err();
        assert!(matches!(err, EntitlementError::InvalidEmail));
        assert_eq!(kv.get(SESSION_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_emails_are_case_sensitive() {
        let (store, _) = store_with_kv();
        store.login_or_create("A@x.com").await.unwrap();
        store.consume_generation("A@x.com").await.unwrap();

        let other = store.login_or_create("a@x.com").await.unwrap();
        assert_eq!(other.generations_remaining, FREE_QUOTA);
    }

    #[tokio::test]
    async fn test_logout_then_resume_is_absent() {
        let (store, _) = store_with_kv();

        // No prior session
        store.logout().await.unwrap();
        assert_eq!(store.resume_session().await.unwrap(), None);

        store.login_or_create("a@x.com").await.unwrap();
        assert!(store.resume_session().await.unwrap().is_some());

        store.logout().await.unwrap();
        assert_eq!(store.resume_session().await.unwrap(), None);

        // Account survives logout
        assert!(store.get_account("a@x.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_dangling_session_resumes_as_absent() {
        let (store, kv) = store_with_kv();
        kv.set(SESSION_KEY, "ghost@x.com").await.unwrap();

        assert_eq!(store.resume_session().await.unwrap(), None);
        // Resuming never creates the account
        assert_eq!(store.get_account("ghost@x.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_upgrade_visible_after_fresh_resume() {
        let kv = Arc::new(MemoryKv::new());
        let store = EntitlementStore::new(kv.clone());
        store.login_or_create("a@x.com").await.unwrap();
        store.upgrade_to_pro("a@x.com").await.unwrap();

        // A new store over the same backend, as after a reload
        let reloaded = EntitlementStore::new(kv);
        let account = reloaded.resume_session().await.unwrap().unwrap();
        assert!(account.is_pro);
        assert_eq!(account.generations_remaining, UNLIMITED_GENERATIONS);
    }

    #[tokio::test]
    async fn test_malformed_table_reads_as_empty() {
        let (store, kv) = store_with_kv();
        kv.set(ACCOUNTS_KEY, "{not json").await.unwrap();
        kv.set(SESSION_KEY, "a@x.com").await.unwrap();

        assert_eq!(store.resume_session().await.unwrap(), None);

        let account = store.login_or_create("a@x.com").await.unwrap();
        assert_eq!(account.generations_remaining, FREE_QUOTA);
    }

    #[tokio::test]
    async fn test_persistence_failures_surface() {
        let (store, kv) = store_with_kv();
        store.login_or_create("a@x.com").await.unwrap();

        kv.fail_writes(true);
        let err = store.consume_generation("a@x.com").await.unwrap_err();
        assert!(matches!(err, EntitlementError::PersistenceUnavailable(_)));
        assert!(matches!(
            store.login_or_create("b@x.com").await,
            Err(EntitlementError::PersistenceUnavailable(_))
        ));
        assert!(store.logout().await.is_err());

        kv.fail_writes(false);
        kv.fail_reads(true);
        assert!(matches!(
            store.resume_session().await,
            Err(EntitlementError::PersistenceUnavailable(_))
        ));

        kv.fail_reads(false);
        // The failed decrement left the account untouched
        let account = store.get_account("a@x.com").await.unwrap().unwrap();
        assert_eq!(account.generations_remaining, FREE_QUOTA);
    }

    #[tokio::test]
    async fn test_device_sessions_are_independent() {
        let (store, _) = store_with_kv();
        let phone = store.for_device("phone");
        let laptop = store.for_device("laptop");

        phone.login_or_create("a@x.com").await.unwrap();
        assert!(phone.resume_session().await.unwrap().is_some());
        assert_eq!(laptop.resume_session().await.unwrap(), None);

        // Accounts are shared between devices
        laptop.login_or_create("a@x.com").await.unwrap();
        laptop.consume_generation("a@x.com").await.unwrap();
        let account = phone.resume_session().await.unwrap().unwrap();
        assert_eq!(account.generations_remaining, FREE_QUOTA - 1);

        phone.logout().await.unwrap();
        assert!(laptop.resume_session().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_consumes_do_not_lose_updates() {
        let (store, _) = store_with_kv();
        store.login_or_create("a@x.com").await.unwrap();
        store.login_or_create("b@x.com").await.unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let view = store.for_device(&format!("device-{i}"));
            let email = if i % 2 == 0 { "a@x.com" } else { "b@x.com" };
            handles.push(tokio::spawn(async move {
                view.consume_generation(email).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        for email in ["a@x.com", "b@x.com"] {
            let account = store.get_account(email).await.unwrap().unwrap();
            assert_eq!(account.generations_remaining, FREE_QUOTA - 4);
        }
    }

    #[tokio::test]
    async fn test_reserve_refuses_at_zero() {
        let (store, _) = store_with_kv();
        store.login_or_create("a@x.com").await.unwrap();

        for k in 1..=FREE_QUOTA {
            let account = store.reserve_generation("a@x.com").await.unwrap();
            assert_eq!(account.generations_remaining, FREE_QUOTA - k);
        }
        let err = store.reserve_generation("a@x.com").await.unwrap_err();
        assert!(matches!(err, EntitlementError::QuotaExhausted(ref e) if e == "a@x.com"));

        let account = store.get_account("a@x.com").await.unwrap().unwrap();
        assert_eq!(account.generations_remaining, 0);
    }

    #[tokio::test]
    async fn test_reserve_skips_pro_and_unknown_fails() {
        let (store, _) = store_with_kv();
        store.login_or_create("pro@x.com").await.unwrap();
        store.upgrade_to_pro("pro@x.com").await.unwrap();

        let account = store.reserve_generation("pro@x.com").await.unwrap();
        assert_eq!(account.generations_remaining, UNLIMITED_GENERATIONS);

        assert!(matches!(
            store.reserve_generation("nobody@x.com").await,
            Err(EntitlementError::AccountNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_refund_restores_reserved_generation() {
        let (store, _) = store_with_kv();
        store.login_or_create("a@x.com").await.unwrap();

        store.reserve_generation("a@x.com").await.unwrap();
        let account = store.refund_generation("a@x.com").await.unwrap();
        assert_eq!(account.generations_remaining, FREE_QUOTA);

        // Never refunds past the free quota
        let account = store.refund_generation("a@x.com").await.unwrap();
        assert_eq!(account.generations_remaining, FREE_QUOTA);
    }

    #[tokio::test]
    async fn test_concurrent_reserves_spend_each_generation_once() {
        let (store, _) = store_with_kv();
        store.login_or_create("a@x.com").await.unwrap();

        let mut handles = Vec::new();
        for i in 0..12 {
            let view = store.for_device(&format!("device-{i}"));
            handles.push(tokio::spawn(async move {
                view.reserve_generation("a@x.com").await
            }));
        }
        let mut granted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                granted += 1;
            }
        }

        assert_eq!(granted, FREE_QUOTA);
        let account = store.get_account("a@x.com").await.unwrap().unwrap();
        assert_eq!(account.generations_remaining, 0);
    }

    #[tokio::test]
    async fn test_checkout_reference_lifecycle() {
        let (store, _) = store_with_kv();
        assert_eq!(store.checkout_email("ref-1").await.unwrap(), None);

        store.record_checkout("ref-1", "a@x.com").await.unwrap();
        assert_eq!(
            store.checkout_email("ref-1").await.unwrap().as_deref(),
            Some("a@x.com")
        );

        store.close_checkout("ref-1").await.unwrap();
        assert_eq!(store.checkout_email("ref-1").await.unwrap(), None);
    }
}
