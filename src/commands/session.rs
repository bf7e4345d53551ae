//! Bootstrap and login

use crate::auth::{self, BootstrapOutcome};
use crate::config::{Settings, ENV_PASSWORD, ENV_USER};
use crate::db::Database;
use crate::error::{AppError, CommandError, CommandResult};
use crate::models::User;

use super::Session;

pub fn open_database(settings: &Settings) -> CommandResult<Database> {
    Database::open_initialized(&settings.db_path).map_err(CommandError::from)
}

pub fn bootstrap(settings: &Settings) -> CommandResult<BootstrapOutcome> {
    let db = Database::new(&settings.db_path)?;
    Ok(auth::bootstrap(&db, settings.bcrypt_cost)?)
}

fn credentials(settings: &Settings) -> CommandResult<(&str, &str)> {
    match (settings.username.as_deref(), settings.password.as_deref()) {
        (Some(user), Some(password)) => Ok((user, password)),
        _ => Err(AppError::Validation(format!(
            "credentials required: pass --user/--password or set {}/{}",
            ENV_USER, ENV_PASSWORD
        ))
        .into()),
    }
}

pub fn login(settings: &Settings) -> CommandResult<User> {
    let db = open_database(settings)?;
    let (username, password) = credentials(settings)?;
    Ok(auth::authenticate(&db, username, password)?)
}

/// Open the database and authenticate; required by every data command
pub fn start(settings: Settings) -> CommandResult<Session> {
    let db = open_database(&settings)?;
    let (username, password) = credentials(&settings)?;
    let user = auth::authenticate(&db, username, password)?;
    tracing::debug!(user = %user.username, "session started");
    Ok(Session { db, settings, user })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    pub fn settings(dir: &Path, user: Option<&str>, password: Option<&str>) -> Settings {
        Settings {
            db_path: dir.join("coachdesk.db"),
            workspace: dir.join("workspace"),
            username: user.map(str::to_string),
            password: password.map(str::to_string),
            bcrypt_cost: 4,
        }
    }

    /// Bootstrapped database with an admin session
    pub fn admin_session(dir: &Path) -> Session {
        let s = settings(dir, Some("admin"), Some("admin123"));
        bootstrap(&s).unwrap();
        start(s).unwrap()
    }

    #[test]
    fn bootstrap_then_login() {
        let dir = tempdir().unwrap();
        let s = settings(dir.path(), Some("admin"), Some("admin123"));

        assert_eq!(bootstrap(&s).unwrap().created.len(), 2);
        assert!(bootstrap(&s).unwrap().created.is_empty());
        assert_eq!(login(&s).unwrap().username, "admin");
    }

    #[test]
    fn data_commands_need_credentials() {
        let dir = tempdir().unwrap();
        let s = settings(dir.path(), None, None);
        bootstrap(&s).unwrap();

        let err = start(s).err().unwrap();
        assert_eq!(err.code, "VALIDATION_ERROR");

        let wrong = settings(dir.path(), Some("admin"), Some("nope"));
        assert_eq!(start(wrong).err().unwrap().code, "INVALID_CREDENTIALS");
    }
}
