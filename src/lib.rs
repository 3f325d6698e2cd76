//! Coinbot - a chat bot with a coin ledger and randomized game advice
//!
//! Users start with a few coins, earn more through referrals, promo codes and
//! admin bonuses, and spend one coin per piece of game advice. All balances
//! live in a RocksDB ledger whose writes are all-or-nothing per event.
//!
//! Layering, from the leaf up:
//! - [`storage`]: key-value store with durable batch writes
//! - [`ledger`]: user and promo records, atomic transactions
//! - [`games`]: stateless advice generation and rendering
//! - [`coordinator`]: business rules for each inbound event
//! - [`bot`]: command parsing, replies and transports
//! - [`dashboard`]: read-only HTTP view of the ledger

pub mod bot;
pub mod config;
pub mod coordinator;
pub mod dashboard;
pub mod errors;
pub mod games;
pub mod ledger;
pub mod storage;

pub use config::{CoinbotConfig, ConfigLoader};
pub use coordinator::Coordinator;
pub use errors::{CoinbotError, CoinbotResult};
pub use games::{Advice, AdviceEngine, GameKind};
pub use ledger::{Ledger, LedgerReader, UserId, UserRecord};
