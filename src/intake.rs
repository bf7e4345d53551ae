//! Client intake, candidate profiles and demand analysis

use serde::Deserialize;

use crate::db::Database;
use crate::error::AppError;
use crate::models::{CandidateProfile, Client, DiscType, NewClient, RelevantPosition};

pub const MIN_AGE: i64 = 15;
pub const MAX_AGE: i64 = 90;

/// Sector and score given to manually entered positions
pub const MANUAL_SECTOR: &str = "N/A";
pub const MANUAL_SCORE: f64 = 0.8;

/// Raw intake answers, as typed by the consultant
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ClientIntake {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub profession: String,
    pub age: i64,
    pub disc_type: String,
    /// Only used for the candidate profile kept alongside the client
    pub location: String,
}

impl ClientIntake {
    /// Check every field and collect all problems in one error
    pub fn validate(&self) -> Result<NewClient, AppError> {
        let mut problems = Vec::new();
        for (label, value) in [
            ("name", &self.full_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("profession", &self.profession),
        ] {
            if value.trim().is_empty() {
                problems.push(format!("{} is required", label));
            }
        }
        if !(MIN_AGE..=MAX_AGE).contains(&self.age) {
            problems.push(format!("age must be between {} and {}", MIN_AGE, MAX_AGE));
        }
        let disc_type = match self.disc_type.parse::<DiscType>() {
            Ok(disc) => Some(disc),
            Err(e) => {
                problems.push(match e {
                    AppError::Validation(msg) => msg,
                    other => other.to_string(),
                });
                None
            }
        };

        match disc_type {
            Some(disc_type) if problems.is_empty() => Ok(NewClient {
                full_name: self.full_name.trim().to_string(),
                email: self.email.trim().to_string(),
                phone: self.phone.trim().to_string(),
                profession: self.profession.trim().to_string(),
                age: self.age,
                disc_type,
            }),
            _ => Err(AppError::Validation(problems.join("; "))),
        }
    }
}

/// Validate and upsert a client by email
pub fn register_client(db: &Database, intake: &ClientIntake) -> Result<Client, AppError> {
    let new_client = intake.validate()?;
    let client = db.upsert_client(&new_client)?;
    tracing::info!(client_id = client.id, "client saved");
    Ok(client)
}

/// Upsert the candidate profile matching a client intake
pub fn register_candidate(
    db: &Database,
    intake: &ClientIntake,
) -> Result<CandidateProfile, AppError> {
    let client = intake.validate()?;
    db.upsert_candidate_profile(
        &client.full_name,
        &client.email,
        intake.location.trim(),
        client.disc_type,
    )
}

/// Split a comma-separated list of position titles, dropping blanks
pub fn parse_position_titles(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Record manually entered relevant positions for a candidate
pub fn record_demand(
    db: &Database,
    candidate_id: i64,
    titles: &str,
) -> Result<Vec<RelevantPosition>, AppError> {
    if db.get_candidate_profile(candidate_id)?.is_none() {
        return Err(AppError::Validation(format!(
            "candidate profile {} does not exist",
            candidate_id
        )));
    }
    let rows: Vec<_> = parse_position_titles(titles)
        .into_iter()
        .map(|title| (title, MANUAL_SECTOR.to_string(), MANUAL_SCORE))
        .collect();
    if rows.is_empty() {
        return Err(AppError::Validation(
            "at least one position title is required".to_string(),
        ));
    }
    db.insert_positions(candidate_id, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ClientIntake {
        ClientIntake {
            full_name: "Ana Ruiz".to_string(),
            email: "ana@example.com".to_string(),
            phone: "600000000".to_string(),
            profession: "Analista".to_string(),
            age: 31,
            disc_type: "c".to_string(),
            location: "Madrid".to_string(),
        }
    }

    fn db() -> Database {
        let db = Database::in_memory().unwrap();
        db.initialize().unwrap();
        db
    }

    #[test]
    fn all_problems_are_reported_together() {
        let intake = ClientIntake {
            email: " ".to_string(),
            age: 14,
            disc_type: "X".to_string(),
            ..sample()
        };
        let msg = intake.validate().unwrap_err().to_string();
        assert!(msg.contains("email is required"));
        assert!(msg.contains("age must be between 15 and 90"));
        assert!(msg.contains("DISC type must be one of"));
    }

    #[test]
    fn age_bounds_are_inclusive() {
        for age in [15, 90] {
            assert!(ClientIntake { age, ..sample() }.validate().is_ok());
        }
        assert!(ClientIntake { age: 91, ..sample() }.validate().is_err());
    }

    #[test]
    fn reintake_with_same_email_keeps_id() {
        let db = db();
        let first = register_client(&db, &sample()).unwrap();
        let second = register_client(
            &db,
            &ClientIntake {
                profession: "Data Engineer".to_string(),
                ..sample()
            },
        )
        .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.profession, "Data Engineer");
        assert_eq!(second.disc_type, DiscType::C);
    }

    #[test]
    fn demand_titles_drop_blanks() {
        assert_eq!(
            parse_position_titles(" Data Analyst, ,BI Developer,"),
            vec!["Data Analyst", "BI Developer"]
        );
    }

    #[test]
    fn demand_rows_use_manual_sector_and_score() {
        let db = db();
        let profile = register_candidate(&db, &sample()).unwrap();

        let rows = record_demand(&db, profile.id, "Data Analyst, BI Developer").unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.sector == "N/A" && r.score == 0.8));
        assert!(matches!(
            record_demand(&db, profile.id, " , "),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            record_demand(&db, 999, "Analyst"),
            Err(AppError::Validation(_))
        ));
    }
}
