//! Data Models
//!
//! Rows of the local database and the value types shared between modules

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Functional area of the consulting workflow a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    /// Cross-module aggregate (final report outputs)
    Aggregate,
    DiagnosisBrand,
    DigitalPresence,
    SkillsSelection,
}

impl Module {
    pub fn number(self) -> i64 {
        match self {
            Module::Aggregate => 0,
            Module::DiagnosisBrand => 1,
            Module::DigitalPresence => 2,
            Module::SkillsSelection => 3,
        }
    }

    pub fn from_number(n: i64) -> Result<Self, AppError> {
        match n {
            0 => Ok(Module::Aggregate),
            1 => Ok(Module::DiagnosisBrand),
            2 => Ok(Module::DigitalPresence),
            3 => Ok(Module::SkillsSelection),
            other => Err(AppError::Validation(format!("module must be 0-3, got {}", other))),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Module::Aggregate => "Informe final",
            Module::DiagnosisBrand => "Diagnóstico & Marca",
            Module::DigitalPresence => "Presencia Digital",
            Module::SkillsSelection => "Skills & Selección",
        }
    }
}

/// Four-valued behavioral style tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscType {
    D,
    I,
    S,
    C,
}

impl DiscType {
    pub const ALL: [DiscType; 4] = [DiscType::D, DiscType::I, DiscType::S, DiscType::C];

    pub fn as_str(self) -> &'static str {
        match self {
            DiscType::D => "D",
            DiscType::I => "I",
            DiscType::S => "S",
            DiscType::C => "C",
        }
    }
}

impl fmt::Display for DiscType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "D" => Ok(DiscType::D),
            "I" => Ok(DiscType::I),
            "S" => Ok(DiscType::S),
            "C" => Ok(DiscType::C),
            _ => Err(AppError::Validation(format!(
                "DISC type must be one of D, I, S, C (got '{}')",
                s.trim()
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Consultor,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Consultor => "consultor",
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "consultor" => Ok(Role::Consultor),
            other => Err(AppError::Validation(format!("unknown role '{}'", other))),
        }
    }
}

/// Login identity
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
}

/// Client record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub profession: String,
    pub age: i64,
    pub disc_type: DiscType,
}

/// Validated intake data for a client, before it has an id
#[derive(Debug, Clone, PartialEq)]
pub struct NewClient {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub profession: String,
    pub age: i64,
    pub disc_type: DiscType,
}

/// One generated artifact tracked by the registry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: i64,
    pub client_id: i64,
    pub module: Module,
    pub doc_type: String,
    pub path: String,
    pub created_at: i64,
}

impl Document {
    pub fn file_path(&self) -> &Path {
        Path::new(&self.path)
    }

    /// Lowercased extension of the artifact path, without the dot.
    pub fn extension(&self) -> Option<String> {
        self.file_path()
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
    }
}

/// Row to be inserted into the registry
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub client_id: i64,
    pub module: Module,
    pub doc_type: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub location: String,
    pub disc_type: DiscType,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevantPosition {
    pub id: i64,
    pub candidate_id: i64,
    pub title: String,
    pub sector: String,
    pub score: f64,
}

/// Structured CV kept for later re-editing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CvData {
    pub id: i64,
    pub client_id: i64,
    pub updated_at: String,
    pub json_blob: String,
    pub pdf_path: String,
    pub docx_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disc_type_parses_case_insensitively() {
        assert_eq!("d".parse::<DiscType>().unwrap(), DiscType::D);
        assert_eq!(" c ".parse::<DiscType>().unwrap(), DiscType::C);
        assert!("X".parse::<DiscType>().is_err());
    }

    #[test]
    fn module_numbers_round_trip() {
        for n in 0..=3 {
            assert_eq!(Module::from_number(n).unwrap().number(), n);
        }
        assert!(Module::from_number(4).is_err());
    }

    #[test]
    fn document_extension_is_lowercased() {
        let doc = Document {
            id: 1,
            client_id: 1,
            module: Module::DiagnosisBrand,
            doc_type: "kpis".to_string(),
            path: "/tmp/Ana_abc123_kpis.XLSX".to_string(),
            created_at: 0,
        };
        assert_eq!(doc.extension().as_deref(), Some("xlsx"));
    }
}
