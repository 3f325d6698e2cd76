//! RocksDB key-value store backing the ledger

use crate::config::StorageConfig;
use crate::errors::{CoinbotResult, StorageError};
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, WriteOptions, DB};
use std::path::Path;
use std::sync::Arc;

/// A single mutation inside an atomic batch
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOp {
    Put(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

#[derive(Clone)]
pub struct KvStore {
    db: Arc<DB>,
    sync_writes: bool,
}

impl KvStore {
    /// Open with default options and synchronous commits
    pub fn open<P: AsRef<Path>>(path: P) -> CoinbotResult<Self> {
        Self::open_with(path, true)
    }

    pub fn new_with_config(config: &StorageConfig) -> CoinbotResult<Self> {
        if config.clear_on_start {
            // Missing directory is fine here
            let _ = std::fs::remove_dir_all(&config.data_directory);
            tracing::warn!(path = %config.data_directory, "Cleared ledger storage on start");
        }
        Self::open_with(&config.data_directory, config.sync_writes)
    }

    fn open_with<P: AsRef<Path>>(path: P, sync_writes: bool) -> CoinbotResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

        let db = DB::open(&opts, path.as_ref())
            .map_err(|e| StorageError::DatabaseOpenFailed(format!("{}: {}", path.as_ref().display(), e)))?;

        Ok(Self {
            db: Arc::new(db),
            sync_writes,
        })
    }

    fn write_options(&self) -> WriteOptions {
        let mut opts = WriteOptions::default();
        opts.set_sync(self.sync_writes);
        opts
    }

    pub fn get(&self, key: &[u8]) -> CoinbotResult<Option<Vec<u8>>> {
        self.db
            .get(key)
            .map_err(|e| StorageError::ReadFailed(e.to_string()).into())
    }

    pub fn put(&self, key: &[u8], value: &[u8]) -> CoinbotResult<()> {
        self.db
            .put_opt(key, value, &self.write_options())
            .map_err(|e| StorageError::WriteFailed(e.to_string()).into())
    }

    pub fn delete(&self, key: &[u8]) -> CoinbotResult<()> {
        self.db
            .delete_opt(key, &self.write_options())
            .map_err(|e| StorageError::WriteFailed(e.to_string()).into())
    }

    /// Apply all operations or none of them
    pub fn batch_write(&self, ops: &[BatchOp]) -> CoinbotResult<()> {
        if ops.is_empty() {
            return Ok(());
        }

        let mut batch = WriteBatch::default();
        for op in ops {
            match op {
                BatchOp::Put(key, value) => batch.put(key, value),
                BatchOp::Delete(key) => batch.delete(key),
            }
        }

        self.db
            .write_opt(batch, &self.write_options())
            .map_err(|e| StorageError::WriteFailed(e.to_string()).into())
    }

    /// Every entry under `prefix`, in key order, read from one consistent snapshot
    pub fn scan_prefix(&self, prefix: &[u8]) -> CoinbotResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let snapshot = self.db.snapshot();
        let mut rows = Vec::new();

        for item in snapshot.iterator(IteratorMode::From(prefix, Direction::Forward)) {
            let (key, value) = item.map_err(|e| StorageError::ReadFailed(e.to_string()))?;
            if !key.starts_with(prefix) {
                break;
            }
            rows.push((key.to_vec(), value.to_vec()));
        }

        Ok(rows)
    }
}
