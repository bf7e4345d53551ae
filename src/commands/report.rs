//! Final report command

use crate::aggregate::{build_final_report, FinalReport};
use crate::error::CommandResult;

use super::Session;

pub fn final_report(session: &Session, client_id: i64) -> CommandResult<FinalReport> {
    Ok(build_final_report(
        &session.db,
        client_id,
        &session.settings.workspace,
    )?)
}
