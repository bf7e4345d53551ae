//! Users & bootstrap
//!
//! Seeds the two demo accounts on an empty database and checks logins with
//! bcrypt.

use serde::Serialize;

use crate::db::Database;
use crate::error::AppError;
use crate::models::{Role, User};

const DEMO_USERS: [(&str, &str, Role); 2] = [
    ("admin", "admin123", Role::Admin),
    ("consultor", "consultor123", Role::Consultor),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapOutcome {
    /// Usernames created by this run; empty when users already existed
    pub created: Vec<String>,
}

/// Create the schema and, on an empty `users` table, the demo accounts.
pub fn bootstrap(db: &Database, cost: u32) -> Result<BootstrapOutcome, AppError> {
    db.initialize()?;
    if db.count_users()? > 0 {
        tracing::debug!("users already present, nothing to seed");
        return Ok(BootstrapOutcome { created: Vec::new() });
    }

    let mut hashed = Vec::with_capacity(DEMO_USERS.len());
    for (username, password, role) in DEMO_USERS {
        hashed.push((username, bcrypt::hash(password, cost)?, role));
    }
    let rows: Vec<(&str, &str, Role)> = hashed
        .iter()
        .map(|(username, hash, role)| (*username, hash.as_str(), *role))
        .collect();
    db.seed_users(&rows)?;

    tracing::info!(count = rows.len(), "seeded demo users");
    Ok(BootstrapOutcome {
        created: DEMO_USERS.iter().map(|(u, _, _)| u.to_string()).collect(),
    })
}

/// Check a username/password pair. Unknown users and wrong passwords fail alike.
pub fn authenticate(db: &Database, username: &str, password: &str) -> Result<User, AppError> {
    let user = db
        .find_user(username.trim())?
        .ok_or(AppError::InvalidCredentials)?;
    if bcrypt::verify(password, &user.password_hash)? {
        Ok(user)
    } else {
        tracing::warn!(username = %user.username, "rejected login");
        Err(AppError::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Lowest cost bcrypt accepts; keeps the tests fast
    const TEST_COST: u32 = 4;

    #[test]
    fn bootstrap_seeds_once() {
        let db = Database::in_memory().unwrap();

        let first = bootstrap(&db, TEST_COST).unwrap();
        let second = bootstrap(&db, TEST_COST).unwrap();

        assert_eq!(first.created, vec!["admin", "consultor"]);
        assert!(second.created.is_empty());
        assert_eq!(db.count_users().unwrap(), 2);
    }

    #[test]
    fn passwords_are_stored_hashed() {
        let db = Database::in_memory().unwrap();
        bootstrap(&db, TEST_COST).unwrap();
        let admin = db.find_user("admin").unwrap().unwrap();
        assert_ne!(admin.password_hash, "admin123");
        assert_eq!(admin.role, Role::Admin);
    }

    #[test]
    fn login_checks_password_and_user() {
        let db = Database::in_memory().unwrap();
        bootstrap(&db, TEST_COST).unwrap();

        let user = authenticate(&db, "consultor", "consultor123").unwrap();
        assert_eq!(user.role, Role::Consultor);

        assert!(matches!(
            authenticate(&db, "consultor", "admin123"),
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            authenticate(&db, "nobody", "x"),
            Err(AppError::InvalidCredentials)
        ));
    }
}
