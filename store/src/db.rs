//! Connection bootstrap: pragmas plus idempotent schema application.

use rusqlite::Connection;

use crate::StoreResult;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    first_name    TEXT NOT NULL DEFAULT '',
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL,
    last_login    TEXT
);

CREATE TABLE IF NOT EXISTS patients (
    id              INTEGER PRIMARY KEY,
    user_id         INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name            TEXT NOT NULL,
    age             INTEGER NOT NULL,
    gender          TEXT NOT NULL,
    contact         TEXT NOT NULL,
    address         TEXT NOT NULL,
    medical_history TEXT,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS doctors (
    id             INTEGER PRIMARY KEY,
    user_id        INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name           TEXT NOT NULL,
    specialization TEXT NOT NULL,
    contact        TEXT NOT NULL,
    address        TEXT NOT NULL,
    experience     INTEGER NOT NULL,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS assignments (
    id          INTEGER PRIMARY KEY,
    patient_id  INTEGER NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
    doctor_id   INTEGER NOT NULL REFERENCES doctors(id) ON DELETE CASCADE,
    assigned_at TEXT NOT NULL,
    UNIQUE (patient_id, doctor_id)
);

CREATE INDEX IF NOT EXISTS idx_patients_user ON patients(user_id);
CREATE INDEX IF NOT EXISTS idx_doctors_user ON doctors(user_id);
CREATE INDEX IF NOT EXISTS idx_assignments_patient ON assignments(patient_id);
CREATE INDEX IF NOT EXISTS idx_assignments_doctor ON assignments(doctor_id);
";

/// Opens the database file at `path`, creating it and the schema on first
/// use.
pub fn open(path: &str) -> StoreResult<Connection> {
    prepare(Connection::open(path)?)
}

/// Opens a fresh in-memory database with the schema applied.
pub fn open_in_memory() -> StoreResult<Connection> {
    prepare(Connection::open_in_memory()?)
}

fn prepare(conn: Connection) -> StoreResult<Connection> {
    // Cascades depend on this pragma; SQLite defaults it off per connection.
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}
