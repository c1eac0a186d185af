//! Relational persistence for accounts, patients, doctors, and the
//! assignment links between them.
//!
//! # Invariants
//! - Every patient/doctor read and write is scoped to the owning account in
//!   SQL; a row owned by someone else behaves exactly like a missing row.
//! - At most one assignment exists per (patient, doctor) pair, enforced by
//!   a UNIQUE constraint so the guarantee holds under concurrent inserts.
//! - Deleting a patient or doctor cascades to its assignments.

pub mod db;
mod error;

mod assignments;
mod doctors;
mod patients;
mod users;

pub use error::{StoreError, StoreResult};

use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;

/// Shared handle over the backing SQLite database. Cloning is cheap; all
/// clones serialize on one connection.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Opens (creating if needed) the database at `path` and applies the
    /// schema.
    pub fn open(path: &str) -> StoreResult<Self> {
        Ok(Self::wrap(db::open(path)?))
    }

    /// An in-memory database, for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::wrap(db::open_in_memory()?))
    }

    fn wrap(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }
}
