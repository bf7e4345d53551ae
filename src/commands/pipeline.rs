//! Pipeline and demand-analysis commands

use std::path::Path;

use crate::error::CommandResult;
use crate::intake;
use crate::models::RelevantPosition;
use crate::workflow::{PipelineAnswers, Runner, WorkflowContext};

use super::Session;

pub fn run_pipeline(session: &Session, answers_path: &Path) -> CommandResult<WorkflowContext> {
    let answers = PipelineAnswers::load(answers_path)?;
    let runner = Runner {
        db: &session.db,
        workspace: &session.settings.workspace,
        answers: &answers,
    };
    Ok(runner.run(&answers.stages())?)
}

pub fn add_demand(
    session: &Session,
    candidate_id: i64,
    titles: &str,
) -> CommandResult<Vec<RelevantPosition>> {
    Ok(intake::record_demand(&session.db, candidate_id, titles)?)
}
