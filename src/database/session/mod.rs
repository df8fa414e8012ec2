//! Database sessions
//!
//! A session owns the connection to one SQLite file together with the
//! registry of schemas it manages:
//!
//! - `sync`: create a table for every registered schema
//! - `select_all` / `select_one`: read rows mapped onto declared columns
//! - `insert`: write one row and commit it
//!
//! Values are always bound as parameters, never spliced into SQL text.

mod database;
pub mod query;

pub use database::{DatabaseSession, SyncReport};
