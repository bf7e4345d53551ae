//! Sequential intake runner
//!
//! Stages run in a fixed order from a JSON answers file. Each stage takes the
//! accumulated context by value and returns the next one.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::Database;
use crate::error::AppError;
use crate::generators::generate_and_register;
use crate::intake::{self, ClientIntake};
use crate::models::{CandidateProfile, Client, Document, RelevantPosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Intake,
    BrandCanvas,
    DemandAnalysis,
    ContentPlan,
    Networking,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Intake => "intake",
            Stage::BrandCanvas => "brand_canvas",
            Stage::DemandAnalysis => "demand_analysis",
            Stage::ContentPlan => "content_plan",
            Stage::Networking => "networking",
        };
        f.write_str(name)
    }
}

/// Answers file layout
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineAnswers {
    pub intake: ClientIntake,
    pub brand_canvas: Value,
    /// Comma-separated position titles
    pub demand: String,
    pub content_plan: Option<Value>,
    pub networking: Option<Value>,
}

impl PipelineAnswers {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            return Err(AppError::FileNotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Mandatory stages, then the optional ones that have answers
    pub fn stages(&self) -> Vec<Stage> {
        let mut stages = vec![Stage::Intake, Stage::BrandCanvas, Stage::DemandAnalysis];
        if self.content_plan.is_some() {
            stages.push(Stage::ContentPlan);
        }
        if self.networking.is_some() {
            stages.push(Stage::Networking);
        }
        stages
    }
}

/// What the stages produced so far
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowContext {
    pub client: Option<Client>,
    pub candidate: Option<CandidateProfile>,
    pub documents: Vec<Document>,
    pub positions: Vec<RelevantPosition>,
    pub completed: Vec<Stage>,
}

impl WorkflowContext {
    fn require_client(&self, stage: Stage) -> Result<&Client, AppError> {
        self.client.as_ref().ok_or_else(|| {
            AppError::InvalidOperation(format!("stage '{}' needs the intake stage to run first", stage))
        })
    }

    fn done(mut self, stage: Stage) -> Self {
        self.completed.push(stage);
        self
    }
}

/// Inputs every stage may use
pub struct Runner<'a> {
    pub db: &'a Database,
    pub workspace: &'a Path,
    pub answers: &'a PipelineAnswers,
}

impl Runner<'_> {
    pub fn run_stage(&self, ctx: WorkflowContext, stage: Stage) -> Result<WorkflowContext, AppError> {
        tracing::info!(%stage, "running stage");
        let ctx = match stage {
            Stage::Intake => self.intake(ctx)?,
            Stage::BrandCanvas => self.generate(ctx, stage, "brand_canvas", &self.answers.brand_canvas)?,
            Stage::DemandAnalysis => self.demand(ctx)?,
            Stage::ContentPlan => {
                let answers = self.answers.content_plan.clone().unwrap_or_default();
                self.generate(ctx, stage, "content_plan", &answers)?
            }
            Stage::Networking => {
                let answers = self.answers.networking.clone().unwrap_or_default();
                self.generate(ctx, stage, "networking_plan", &answers)?
            }
        };
        Ok(ctx.done(stage))
    }

    pub fn run(&self, stages: &[Stage]) -> Result<WorkflowContext, AppError> {
        stages
            .iter()
            .try_fold(WorkflowContext::default(), |ctx, stage| self.run_stage(ctx, *stage))
    }

    fn intake(&self, ctx: WorkflowContext) -> Result<WorkflowContext, AppError> {
        let client = intake::register_client(self.db, &self.answers.intake)?;
        let candidate = intake::register_candidate(self.db, &self.answers.intake)?;
        Ok(WorkflowContext {
            client: Some(client),
            candidate: Some(candidate),
            ..ctx
        })
    }

    fn generate(
        &self,
        ctx: WorkflowContext,
        stage: Stage,
        tag: &str,
        answers: &Value,
    ) -> Result<WorkflowContext, AppError> {
        let client_id = ctx.require_client(stage)?.id;
        let docs = generate_and_register(self.db, client_id, tag, answers, self.workspace)?;
        let mut documents = ctx.documents;
        documents.extend(docs);
        Ok(WorkflowContext { documents, ..ctx })
    }

    fn demand(&self, ctx: WorkflowContext) -> Result<WorkflowContext, AppError> {
        let candidate_id = ctx
            .candidate
            .as_ref()
            .map(|c| c.id)
            .ok_or_else(|| {
                AppError::InvalidOperation(format!(
                    "stage '{}' needs the intake stage to run first",
                    Stage::DemandAnalysis
                ))
            })?;
        let rows = intake::record_demand(self.db, candidate_id, &self.answers.demand)?;
        let mut positions = ctx.positions;
        positions.extend(rows);
        Ok(WorkflowContext { positions, ..ctx })
    }
}
