//! Database Module
//!
//! SQLite storage for users, clients, profiles, documents and CVs

mod clients;
mod documents;
mod profiles;
mod schema;
mod users;

use std::path::Path;

use rusqlite::backup::Backup;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Connection;

use crate::error::AppError;
use crate::models::{DiscType, Module, Role};

pub use documents::AggregateSwap;

/// Database wrapper. One instance is opened per command and dropped when it finishes.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file
    pub fn new(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// In-memory database, used by tests
    pub fn in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Open and make sure the schema exists
    pub fn open_initialized(path: &Path) -> Result<Self, AppError> {
        let db = Self::new(path)?;
        db.initialize()?;
        Ok(db)
    }

    /// Create tables if absent
    pub fn initialize(&self) -> Result<(), AppError> {
        self.conn.execute_batch(schema::CREATE_SCHEMA)?;
        Ok(())
    }

    /// Copy the live database to a standalone file using the SQLite online-backup API
    pub fn export_db_to_file(&self, out_path: &Path) -> Result<(), AppError> {
        if let Some(parent) = out_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut out_conn = Connection::open(out_path)?;
        out_conn.execute_batch(schema::CREATE_SCHEMA)?;

        let backup = Backup::new(&self.conn, &mut out_conn)?;
        backup.run_to_completion(5, std::time::Duration::from_millis(10), None)?;
        Ok(())
    }
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl FromSql for DiscType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        s.parse()
            .map_err(|_| FromSqlError::Other(format!("invalid disc_type '{}'", s).into()))
    }
}

impl ToSql for DiscType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Module {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let n = value.as_i64()?;
        Module::from_number(n).map_err(|_| FromSqlError::OutOfRange(n))
    }
}

impl ToSql for Module {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.number()))
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        s.parse()
            .map_err(|_| FromSqlError::Other(format!("invalid role '{}'", s).into()))
    }
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn initialize_is_idempotent() {
        let db = Database::in_memory().unwrap();
        db.initialize().unwrap();
        db.initialize().unwrap();
    }

    #[test]
    fn export_produces_a_readable_copy() {
        let dir = tempdir().unwrap();
        let db = Database::open_initialized(&dir.path().join("live.db")).unwrap();
        db.seed_users(&[("admin", "hash", Role::Admin)]).unwrap();

        let out = dir.path().join("backup").join("copy.db");
        db.export_db_to_file(&out).unwrap();

        let copy = Database::new(&out).unwrap();
        assert!(copy.find_user("admin").unwrap().is_some());
    }
}
