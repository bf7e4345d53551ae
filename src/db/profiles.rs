use rusqlite::{OptionalExtension, Row};

use super::{now_millis, Database};
use crate::error::AppError;
use crate::models::{CandidateProfile, CvData, DiscType, RelevantPosition};

fn candidate_from_row(row: &Row<'_>) -> rusqlite::Result<CandidateProfile> {
    Ok(CandidateProfile {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        location: row.get(3)?,
        disc_type: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl Database {
    /// Insert or update a candidate profile keyed by email
    pub fn upsert_candidate_profile(
        &self,
        full_name: &str,
        email: &str,
        location: &str,
        disc_type: DiscType,
    ) -> Result<CandidateProfile, AppError> {
        let tx = self.conn.unchecked_transaction()?;

        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM candidate_profiles WHERE email = ?1 ORDER BY id LIMIT 1",
                [email],
                |row| row.get(0),
            )
            .optional()?;

        let id = match existing {
            Some(id) => {
                tx.execute(
                    "UPDATE candidate_profiles SET full_name = ?1, location = ?2, disc_type = ?3 WHERE id = ?4",
                    (full_name, location, disc_type, id),
                )?;
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO candidate_profiles (full_name, email, location, disc_type, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    (full_name, email, location, disc_type, now_millis()),
                )?;
                tx.last_insert_rowid()
            }
        };

        let profile = tx.query_row(
            "SELECT id, full_name, email, location, disc_type, created_at
             FROM candidate_profiles WHERE id = ?1",
            [id],
            candidate_from_row,
        )?;

        tx.commit()?;
        Ok(profile)
    }

    pub fn get_candidate_profile(&self, id: i64) -> Result<Option<CandidateProfile>, AppError> {
        let profile = self
            .conn
            .query_row(
                "SELECT id, full_name, email, location, disc_type, created_at
                 FROM candidate_profiles WHERE id = ?1",
                [id],
                candidate_from_row,
            )
            .optional()?;
        Ok(profile)
    }

    pub fn insert_positions(
        &self,
        candidate_id: i64,
        positions: &[(String, String, f64)],
    ) -> Result<Vec<RelevantPosition>, AppError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut out = Vec::with_capacity(positions.len());

        for (title, sector, score) in positions {
            tx.execute(
                "INSERT INTO relevant_positions (candidate_id, title, sector, score)
                 VALUES (?1, ?2, ?3, ?4)",
                (candidate_id, title, sector, score),
            )?;
            out.push(RelevantPosition {
                id: tx.last_insert_rowid(),
                candidate_id,
                title: title.clone(),
                sector: sector.clone(),
                score: *score,
            });
        }

        tx.commit()?;
        Ok(out)
    }

    pub fn list_positions(&self, candidate_id: i64) -> Result<Vec<RelevantPosition>, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, candidate_id, title, sector, score FROM relevant_positions
             WHERE candidate_id = ?1 ORDER BY id",
        )?;
        let iter = stmt.query_map([candidate_id], |row| {
            Ok(RelevantPosition {
                id: row.get(0)?,
                candidate_id: row.get(1)?,
                title: row.get(2)?,
                sector: row.get(3)?,
                score: row.get(4)?,
            })
        })?;

        let mut out = Vec::new();
        for position in iter {
            out.push(position?);
        }
        Ok(out)
    }

    /// Store a new structured-CV snapshot
    pub fn save_cv_data(
        &self,
        client_id: i64,
        json_blob: &str,
        pdf_path: &str,
        docx_path: &str,
    ) -> Result<CvData, AppError> {
        let updated_at = chrono::Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO cv_data (client_id, updated_at, json_blob, pdf_path, docx_path)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (client_id, &updated_at, json_blob, pdf_path, docx_path),
        )?;

        Ok(CvData {
            id: self.conn.last_insert_rowid(),
            client_id,
            updated_at,
            json_blob: json_blob.to_string(),
            pdf_path: pdf_path.to_string(),
            docx_path: docx_path.to_string(),
        })
    }

    pub fn latest_cv_data(&self, client_id: i64) -> Result<Option<CvData>, AppError> {
        let cv = self
            .conn
            .query_row(
                "SELECT id, client_id, updated_at, json_blob, pdf_path, docx_path
                 FROM cv_data WHERE client_id = ?1 ORDER BY id DESC LIMIT 1",
                [client_id],
                |row| {
                    Ok(CvData {
                        id: row.get(0)?,
                        client_id: row.get(1)?,
                        updated_at: row.get(2)?,
                        json_blob: row.get(3)?,
                        pdf_path: row.get(4)?,
                        docx_path: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(cv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_upsert_reuses_row() {
        let db = Database::in_memory().unwrap();
        db.initialize().unwrap();

        let a = db
            .upsert_candidate_profile("Eva", "eva@example.com", "Madrid", DiscType::D)
            .unwrap();
        let b = db
            .upsert_candidate_profile("Eva Sanz", "eva@example.com", "Sevilla", DiscType::I)
            .unwrap();

        assert_eq!(a.id, b.id);
        assert_eq!(b.location, "Sevilla");
        assert_eq!(b.disc_type, DiscType::I);
    }

    #[test]
    fn positions_are_listed_in_insertion_order() {
        let db = Database::in_memory().unwrap();
        db.initialize().unwrap();
        let p = db
            .upsert_candidate_profile("Eva", "eva@example.com", "Madrid", DiscType::D)
            .unwrap();

        db.insert_positions(
            p.id,
            &[
                ("Data Analyst".to_string(), "N/A".to_string(), 0.8),
                ("BI Developer".to_string(), "N/A".to_string(), 0.8),
            ],
        )
        .unwrap();

        let titles: Vec<_> = db
            .list_positions(p.id)
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Data Analyst", "BI Developer"]);
    }
}
