//! Read-only web dashboard over the ledger
//!
//! Serves an HTML users table, a JSON snapshot of the same data and a health
//! check. It only ever holds a `LedgerReader`, so it cannot mutate balances.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use server::{shutdown_signal, DashboardServer};
