//! Persistent user balances and promo codes.
//!
//! The ledger is the only owner of mutable state. Every write goes through
//! [`Ledger::transaction`], which stages changes in memory, holds the write
//! lock for the whole closure and commits the staged records as a single
//! synchronous RocksDB batch. A closure that returns an error leaves the
//! store untouched.

use crate::{
    config::CoinbotConfig,
    errors::{CoinbotResult, LedgerError, StorageError},
    storage::{BatchOp, KvStore},
};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

pub type UserId = i64;

const USER_PREFIX: &[u8] = b"user:";
const PROMO_PREFIX: &[u8] = b"promo:";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: UserId,
    pub balance: i64,
    pub referral_count: u64,
}

/// Result of [`Ledger::get_or_create`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    pub record: UserRecord,
    /// True only for the call that inserted the record
    pub created: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromoCode {
    pub code: String,
    pub reward: i64,
}

// Sign bit flipped so big-endian keys sort in numeric order.
fn user_key(user_id: UserId) -> Vec<u8> {
    let ordered = (user_id as u64) ^ (1 << 63);
    let mut key = Vec::with_capacity(USER_PREFIX.len() + 8);
    key.extend_from_slice(USER_PREFIX);
    key.extend_from_slice(&ordered.to_be_bytes());
    key
}

fn promo_key(normalized_code: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(PROMO_PREFIX.len() + normalized_code.len());
    key.extend_from_slice(PROMO_PREFIX);
    key.extend_from_slice(normalized_code.as_bytes());
    key
}

/// Promo codes match case-insensitively
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

fn decode<T: for<'de> Deserialize<'de>>(bytes: &[u8], what: &str) -> CoinbotResult<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        StorageError::CorruptedData(format!("Failed to decode {}: {}", what, e)).into()
    })
}

fn encode<T: Serialize>(value: &T, what: &str) -> CoinbotResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| {
        StorageError::WriteFailed(format!("Failed to encode {}: {}", what, e)).into()
    })
}

fn load_user(store: &KvStore, user_id: UserId) -> CoinbotResult<Option<UserRecord>> {
    match store.get(&user_key(user_id))? {
        Some(bytes) => decode(&bytes, "user record").map(Some),
        None => Ok(None),
    }
}

/// Staged view of the ledger inside a write transaction
pub struct LedgerTxn<'a> {
    store: &'a KvStore,
    starting_balance: i64,
    staged: BTreeMap<UserId, UserRecord>,
}

impl<'a> LedgerTxn<'a> {
    fn new(store: &'a KvStore, starting_balance: i64) -> Self {
        Self {
            store,
            starting_balance,
            staged: BTreeMap::new(),
        }
    }

    /// Current record including changes staged by this transaction
    pub fn get(&self, user_id: UserId) -> CoinbotResult<Option<UserRecord>> {
        if let Some(record) = self.staged.get(&user_id) {
            return Ok(Some(record.clone()));
        }
        load_user(self.store, user_id)
    }

    pub fn get_or_create(&mut self, user_id: UserId) -> CoinbotResult<Registration> {
        if let Some(record) = self.get(user_id)? {
            return Ok(Registration { record, created: false });
        }

        let record = UserRecord {
            user_id,
            balance: self.starting_balance,
            referral_count: 0,
        };
        self.staged.insert(user_id, record.clone());
        Ok(Registration { record, created: true })
    }

    /// Add `delta` to the balance; the result may not drop below zero
    pub fn adjust_balance(&mut self, user_id: UserId, delta: i64) -> CoinbotResult<UserRecord> {
        let mut record = self.get(user_id)?.ok_or(LedgerError::UnknownUser(user_id))?;

        record.balance = record
            .balance
            .checked_add(delta)
            .filter(|balance| *balance >= 0)
            .ok_or(LedgerError::InsufficientBalance {
                user_id,
                balance: record.balance,
                delta,
            })?;

        self.staged.insert(user_id, record.clone());
        Ok(record)
    }

    pub fn increment_referrals(&mut self, user_id: UserId, delta: u64) -> CoinbotResult<UserRecord> {
        let mut record = self.get(user_id)?.ok_or(LedgerError::UnknownUser(user_id))?;
        record.referral_count = record.referral_count.saturating_add(delta);
        self.staged.insert(user_id, record.clone());
        Ok(record)
    }

    fn into_ops(self) -> CoinbotResult<Vec<BatchOp>> {
        self.staged
            .values()
            .map(|record| -> CoinbotResult<BatchOp> {
                Ok(BatchOp::Put(user_key(record.user_id), encode(record, "user record")?))
            })
            .collect()
    }
}

pub struct Ledger {
    store: KvStore,
    write_lock: Mutex<()>,
    starting_balance: i64,
}

impl Ledger {
    /// Open the ledger described by the storage and economy sections
    pub fn open(config: &CoinbotConfig) -> CoinbotResult<Self> {
        let store = KvStore::new_with_config(&config.storage)?;
        tracing::info!(path = %config.storage.data_directory, "Ledger opened");
        Ok(Self::with_store(store, config.economy.starting_balance))
    }

    pub fn with_store(store: KvStore, starting_balance: i64) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
            starting_balance,
        }
    }

    /// Run `f` against a staged view and commit everything it changed at once.
    ///
    /// Writes are serialized: no other transaction observes or interleaves with
    /// the staged state. On error nothing is written.
    pub fn transaction<T, F>(&self, f: F) -> CoinbotResult<T>
    where
        F: FnOnce(&mut LedgerTxn<'_>) -> CoinbotResult<T>,
    {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::LockPoisoned)?;

        let mut txn = LedgerTxn::new(&self.store, self.starting_balance);
        let value = f(&mut txn)?;

        let ops = txn.into_ops()?;
        self.store.batch_write(&ops)?;
        Ok(value)
    }

    pub fn get(&self, user_id: UserId) -> CoinbotResult<Option<UserRecord>> {
        load_user(&self.store, user_id)
    }

    pub fn get_or_create(&self, user_id: UserId) -> CoinbotResult<Registration> {
        self.transaction(|txn| txn.get_or_create(user_id))
    }

    pub fn adjust_balance(&self, user_id: UserId, delta: i64) -> CoinbotResult<UserRecord> {
        self.transaction(|txn| txn.adjust_balance(user_id, delta))
    }

    pub fn increment_referrals(&self, user_id: UserId, delta: u64) -> CoinbotResult<UserRecord> {
        self.transaction(|txn| txn.increment_referrals(user_id, delta))
    }

    /// Reward for `code`, or `PromoNotFound`
    pub fn lookup_promo(&self, code: &str) -> CoinbotResult<i64> {
        let normalized = normalize_code(code);
        if normalized.is_empty() {
            return Err(LedgerError::PromoNotFound(normalized).into());
        }

        match self.store.get(&promo_key(&normalized))? {
            Some(bytes) => Ok(decode::<PromoCode>(&bytes, "promo code")?.reward),
            None => Err(LedgerError::PromoNotFound(normalized).into()),
        }
    }

    /// Administrative insert or replace of a promo code
    pub fn insert_promo(&self, code: &str, reward: i64) -> CoinbotResult<PromoCode> {
        let normalized = normalize_code(code);
        if normalized.is_empty() || normalized.chars().any(char::is_whitespace) {
            return Err(LedgerError::InvalidPromo {
                code: code.to_string(),
                reason: "code must be a single non-empty word".to_string(),
            }
            .into());
        }
        if reward <= 0 {
            return Err(LedgerError::InvalidPromo {
                code: normalized,
                reason: format!("reward must be positive, got {}", reward),
            }
            .into());
        }

        let promo = PromoCode { code: normalized, reward };
        let bytes = encode(&promo, "promo code")?;

        let _guard = self.write_lock.lock().map_err(|_| StorageError::LockPoisoned)?;
        self.store.put(&promo_key(&promo.code), &bytes)?;
        tracing::info!(code = %promo.code, reward, "Promo code stored");
        Ok(promo)
    }

    /// Returns whether the code existed
    pub fn remove_promo(&self, code: &str) -> CoinbotResult<bool> {
        let key = promo_key(&normalize_code(code));

        let _guard = self.write_lock.lock().map_err(|_| StorageError::LockPoisoned)?;
        let existed = self.store.get(&key)?.is_some();
        if existed {
            self.store.delete(&key)?;
        }
        Ok(existed)
    }

    pub fn list_promos(&self) -> CoinbotResult<Vec<PromoCode>> {
        self.store
            .scan_prefix(PROMO_PREFIX)?
            .iter()
            .map(|(_, value)| decode(value, "promo code"))
            .collect()
    }

    /// All users ordered by id, taken from a single snapshot
    pub fn list_users(&self) -> CoinbotResult<Vec<UserRecord>> {
        self.store
            .scan_prefix(USER_PREFIX)?
            .iter()
            .map(|(_, value)| decode(value, "user record"))
            .collect()
    }

    pub fn reader(self: &Arc<Self>) -> LedgerReader {
        LedgerReader { ledger: Arc::clone(self) }
    }
}

/// Read-only handle for collaborators that must never write
#[derive(Clone)]
pub struct LedgerReader {
    ledger: Arc<Ledger>,
}

impl LedgerReader {
    pub fn get(&self, user_id: UserId) -> CoinbotResult<Option<UserRecord>> {
        self.ledger.get(user_id)
    }

    pub fn list_users(&self) -> CoinbotResult<Vec<UserRecord>> {
        self.ledger.list_users()
    }

    pub fn list_promos(&self) -> CoinbotResult<Vec<PromoCode>> {
        self.ledger.list_promos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CoinbotError;
    use tempfile::TempDir;

    fn test_ledger() -> (TempDir, Ledger) {
        let dir = TempDir::new().unwrap();
        let store = KvStore::open(dir.path()).unwrap();
        (dir, Ledger::with_store(store, 5))
    }

    #[test]
    fn test_get_or_create_reports_creation_once() {
        let (_dir, ledger) = test_ledger();

        let first = ledger.get_or_create(10).unwrap();
        assert!(first.created);
        assert_eq!(first.record.balance, 5);
        assert_eq!(first.record.referral_count, 0);

        let second = ledger.get_or_create(10).unwrap();
        assert!(!second.created);
        assert_eq!(second.record, first.record);
    }

    #[test]
    fn test_adjust_balance_guards_negative() {
        let (_dir, ledger) = test_ledger();
        ledger.get_or_create(1).unwrap();

        assert_eq!(ledger.adjust_balance(1, -5).unwrap().balance, 0);

        let err = ledger.adjust_balance(1, -1).unwrap_err();
        assert!(err.is_insufficient_balance());
        assert_eq!(ledger.get(1).unwrap().unwrap().balance, 0);
    }

    #[test]
    fn test_adjust_unknown_user() {
        let (_dir, ledger) = test_ledger();
        let err = ledger.adjust_balance(404, 3).unwrap_err();
        assert!(matches!(err, CoinbotError::Ledger(LedgerError::UnknownUser(404))));
        assert!(ledger.get(404).unwrap().is_none());
    }

    #[test]
    fn test_failed_transaction_writes_nothing() {
        let (_dir, ledger) = test_ledger();
        ledger.get_or_create(1).unwrap();

        let result = ledger.transaction(|txn| {
            txn.get_or_create(2)?;
            txn.adjust_balance(1, 100)?;
            txn.adjust_balance(1, -1_000)
        });

        assert!(result.is_err());
        assert!(ledger.get(2).unwrap().is_none());
        assert_eq!(ledger.get(1).unwrap().unwrap().balance, 5);
    }

    #[test]
    fn test_transaction_sees_staged_changes() {
        let (_dir, ledger) = test_ledger();

        let record = ledger
            .transaction(|txn| {
                txn.get_or_create(3)?;
                txn.adjust_balance(3, 3)?;
                txn.increment_referrals(3, 1)
            })
            .unwrap();

        assert_eq!(record.balance, 8);
        assert_eq!(record.referral_count, 1);
        assert_eq!(ledger.get(3).unwrap(), Some(record));
    }

    #[test]
    fn test_promo_lookup_is_case_insensitive() {
        let (_dir, ledger) = test_ledger();
        ledger.insert_promo("Test", 50).unwrap();

        assert_eq!(ledger.lookup_promo("test").unwrap(), 50);
        assert_eq!(ledger.lookup_promo(" TEST ").unwrap(), 50);
        assert!(ledger.lookup_promo("BOGUS").unwrap_err().is_promo_not_found());
    }

    #[test]
    fn test_promo_validation_and_removal() {
        let (_dir, ledger) = test_ledger();

        assert!(ledger.insert_promo("FREE", 0).is_err());
        assert!(ledger.insert_promo("   ", 10).is_err());
        assert!(ledger.insert_promo("TWO WORDS", 10).is_err());

        ledger.insert_promo("free", 10).unwrap();
        assert_eq!(ledger.list_promos().unwrap().len(), 1);
        assert!(ledger.remove_promo("FREE").unwrap());
        assert!(!ledger.remove_promo("FREE").unwrap());
        assert!(ledger.list_promos().unwrap().is_empty());
    }

    #[test]
    fn test_list_users_numeric_order() {
        let (_dir, ledger) = test_ledger();
        for id in [300, -2, 7, 1_000_000_000_000] {
            ledger.get_or_create(id).unwrap();
        }

        let ids: Vec<UserId> = ledger.list_users().unwrap().iter().map(|u| u.user_id).collect();
        assert_eq!(ids, vec![-2, 7, 300, 1_000_000_000_000]);
    }

    #[test]
    fn test_concurrent_get_or_create_creates_once() {
        let (_dir, ledger) = test_ledger();
        let ledger = Arc::new(ledger);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || ledger.get_or_create(77).unwrap().created)
            })
            .collect();

        let created = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|created| *created)
            .count();
        assert_eq!(created, 1);
        assert_eq!(ledger.list_users().unwrap().len(), 1);
    }

    #[test]
    fn test_reader_sees_writes() {
        let (_dir, ledger) = test_ledger();
        let ledger = Arc::new(ledger);
        let reader = ledger.reader();

        ledger.get_or_create(5).unwrap();
        assert_eq!(reader.list_users().unwrap().len(), 1);
        assert_eq!(reader.get(5).unwrap().unwrap().balance, 5);
    }
}
