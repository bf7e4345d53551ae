use rusqlite::OptionalExtension;

use super::Database;
use crate::error::AppError;
use crate::models::{Role, User};

impl Database {
    pub fn count_users(&self) -> Result<i64, AppError> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(n)
    }

    /// Insert users with already-hashed passwords in one transaction
    pub fn seed_users(&self, users: &[(&str, &str, Role)]) -> Result<(), AppError> {
        let tx = self.conn.unchecked_transaction()?;
        for (username, password_hash, role) in users {
            tx.execute(
                "INSERT INTO users (username, password_hash, role) VALUES (?1, ?2, ?3)",
                (username, password_hash, role),
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn find_user(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, password_hash, role FROM users WHERE username = ?1",
                [username],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password_hash: row.get(2)?,
                        role: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }
}
