//! Command handlers
//!
//! Every data command runs inside a logged-in `Session`. Handlers return
//! `CommandResult` so failures reach the user as a stable error code.

pub mod clients;
pub mod documents;
pub mod pipeline;
pub mod report;
pub mod session;
pub mod storage;

use crate::config::Settings;
use crate::db::Database;
use crate::models::User;

/// Open database plus the authenticated user for one invocation
pub struct Session {
    pub db: Database,
    pub settings: Settings,
    pub user: User,
}
