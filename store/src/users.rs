use chrono::Utc;
use models::medical::{NewUser, User};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::{Store, StoreError, StoreResult};

impl Store {
    /// Inserts a new account with an already-hashed credential. Username
    /// and email collisions surface as `Duplicate` even when the caller's
    /// pre-checks raced a concurrent registration.
    pub async fn create_user(&self, new: &NewUser, password_hash: &str) -> StoreResult<User> {
        let conn = self.conn.lock().await;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO users (username, email, first_name, password_hash, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![new.username, new.email, new.first_name, password_hash, now, now],
        )
        .map_err(|e| StoreError::on_unique(e, "username or email already taken"))?;

        let id = conn.last_insert_rowid();
        user_by_id(&conn, id)?.ok_or(StoreError::NotFound("user"))
    }

    pub async fn get_user(&self, id: i64) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().await;
        user_by_id(&conn, id)
    }

    pub async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            &format!("{USER_COLUMNS} WHERE username = ?1;"),
            [username],
            user_from_row,
        )
        .optional()
        .map_err(StoreError::from)
    }

    pub async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            &format!("{USER_COLUMNS} WHERE email = ?1;"),
            [email],
            user_from_row,
        )
        .optional()
        .map_err(StoreError::from)
    }

    /// Stamps `last_login` on a successful credential check.
    pub async fn touch_last_login(&self, id: i64) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE users SET last_login = ?1 WHERE id = ?2;",
            params![Utc::now(), id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound("user"));
        }
        Ok(())
    }
}

const USER_COLUMNS: &str = "SELECT id, username, email, first_name, password_hash,
        created_at, updated_at, last_login
 FROM users";

fn user_by_id(conn: &Connection, id: i64) -> StoreResult<Option<User>> {
    conn.query_row(&format!("{USER_COLUMNS} WHERE id = ?1;"), [id], user_from_row)
        .optional()
        .map_err(StoreError::from)
}

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        first_name: row.get("first_name")?,
        password_hash: row.get("password_hash")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        last_login: row.get("last_login")?,
    })
}
