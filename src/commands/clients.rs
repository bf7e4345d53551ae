//! Client commands

use serde::Serialize;

use crate::cli::ClientAddArgs;
use crate::error::CommandResult;
use crate::intake::{self, ClientIntake};
use crate::models::{CandidateProfile, Client, CvData, Document};
use crate::registry::Registry;

use super::Session;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedClient {
    #[serde(flatten)]
    pub client: Client,
    pub candidate_profile: Option<CandidateProfile>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDetail {
    #[serde(flatten)]
    pub client: Client,
    pub documents: Vec<Document>,
    pub latest_cv: Option<CvData>,
}

impl From<&ClientAddArgs> for ClientIntake {
    fn from(args: &ClientAddArgs) -> Self {
        ClientIntake {
            full_name: args.name.clone(),
            email: args.email.clone(),
            phone: args.phone.clone(),
            profession: args.profession.clone(),
            age: args.age,
            disc_type: args.disc.clone(),
            location: args.location.clone().unwrap_or_default(),
        }
    }
}

pub fn add_client(session: &Session, args: &ClientAddArgs) -> CommandResult<SavedClient> {
    let input = ClientIntake::from(args);
    let client = intake::register_client(&session.db, &input)?;
    let candidate_profile = match args.location {
        Some(_) => Some(intake::register_candidate(&session.db, &input)?),
        None => None,
    };
    Ok(SavedClient {
        client,
        candidate_profile,
    })
}

pub fn list_clients(session: &Session, search: Option<&str>) -> CommandResult<Vec<Client>> {
    Ok(session.db.list_clients(search)?)
}

pub fn show_client(session: &Session, id: i64) -> CommandResult<ClientDetail> {
    let client = session.db.get_client(id)?;
    let documents = Registry::new(&session.db).list(id)?;
    let latest_cv = session.db.latest_cv_data(id)?;
    Ok(ClientDetail {
        client,
        documents,
        latest_cv,
    })
}
