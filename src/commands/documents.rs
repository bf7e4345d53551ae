//! Document commands: catalogue, generation, attachment, listing, open, delete

use serde_json::Value;

use crate::cli::{DocAttachArgs, DocGenerateArgs};
use crate::error::{AppError, CommandResult};
use crate::generators::{self, KindInfo};
use crate::models::{Document, Module};
use crate::registry::{DeleteOutcome, Opener, Registry};

use super::Session;

pub fn list_kinds() -> Vec<KindInfo> {
    generators::catalogue()
}

fn read_answers(args: &DocGenerateArgs) -> Result<Value, AppError> {
    let text = match (&args.answers, &args.json) {
        (Some(path), _) => {
            if !path.exists() {
                return Err(AppError::FileNotFound(path.display().to_string()));
            }
            std::fs::read_to_string(path)?
        }
        (None, Some(inline)) => inline.clone(),
        (None, None) => return Ok(Value::Null),
    };
    Ok(serde_json::from_str(&text)?)
}

pub fn generate_document(session: &Session, args: &DocGenerateArgs) -> CommandResult<Vec<Document>> {
    let answers = read_answers(args)?;
    Ok(generators::generate_and_register(
        &session.db,
        args.client,
        &args.doc_type,
        &answers,
        &session.settings.workspace,
    )?)
}

pub fn attach_document(session: &Session, args: &DocAttachArgs) -> CommandResult<Document> {
    let doc_type = args.doc_type.trim();
    if doc_type.is_empty() {
        return Err(AppError::Validation("document type is required".to_string()).into());
    }
    let module = Module::from_number(args.module)?;
    Ok(Registry::new(&session.db).attach(args.client, module, doc_type, &args.path)?)
}

pub fn list_documents(session: &Session, client_id: i64) -> CommandResult<Vec<Document>> {
    session.db.get_client(client_id)?;
    Ok(Registry::new(&session.db).list(client_id)?)
}

pub fn open_document(session: &Session, id: i64, opener: &dyn Opener) -> CommandResult<Document> {
    Ok(Registry::new(&session.db).open(id, opener)?)
}

pub fn delete_document(session: &Session, id: i64) -> CommandResult<DeleteOutcome> {
    Ok(Registry::new(&session.db).delete(id)?)
}
