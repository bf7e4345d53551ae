use rusqlite::{OptionalExtension, Row};

use super::{now_millis, Database};
use crate::error::AppError;
use crate::models::{Document, Module, NewDocument};

const DOCUMENT_COLUMNS: &str = "id, client_id, module, doc_type, path, created_at";

fn document_from_row(row: &Row<'_>) -> rusqlite::Result<Document> {
    Ok(Document {
        id: row.get(0)?,
        client_id: row.get(1)?,
        module: row.get(2)?,
        doc_type: row.get(3)?,
        path: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Result of swapping a client's aggregate rows
#[derive(Debug, Clone)]
pub struct AggregateSwap {
    pub inserted: Vec<Document>,
    pub removed: Vec<Document>,
}

impl Database {
    pub fn insert_document(&self, doc: &NewDocument) -> Result<Document, AppError> {
        let created_at = now_millis();
        let path = doc.path.to_string_lossy().to_string();
        self.conn.execute(
            "INSERT INTO documents (client_id, module, doc_type, path, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (doc.client_id, doc.module, &doc.doc_type, &path, created_at),
        )?;

        Ok(Document {
            id: self.conn.last_insert_rowid(),
            client_id: doc.client_id,
            module: doc.module,
            doc_type: doc.doc_type.clone(),
            path,
            created_at,
        })
    }

    /// All documents of a client, ordered by (module, created_at, id)
    pub fn list_documents(&self, client_id: i64) -> Result<Vec<Document>, AppError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM documents WHERE client_id = ?1
             ORDER BY module ASC, created_at ASC, id ASC",
            DOCUMENT_COLUMNS
        ))?;
        let iter = stmt.query_map([client_id], document_from_row)?;

        let mut out = Vec::new();
        for doc in iter {
            out.push(doc?);
        }
        Ok(out)
    }

    pub fn get_document(&self, id: i64) -> Result<Option<Document>, AppError> {
        let doc = self
            .conn
            .query_row(
                &format!("SELECT {} FROM documents WHERE id = ?1", DOCUMENT_COLUMNS),
                [id],
                document_from_row,
            )
            .optional()?;
        Ok(doc)
    }

    /// Returns whether a row was removed
    pub fn delete_document(&self, id: i64) -> Result<bool, AppError> {
        let affected = self.conn.execute("DELETE FROM documents WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    /// Replace every module-0 row of the client with `new_rows` in a single transaction.
    pub fn replace_aggregates(
        &self,
        client_id: i64,
        new_rows: &[NewDocument],
    ) -> Result<AggregateSwap, AppError> {
        let tx = self.conn.unchecked_transaction()?;

        let removed = {
            let mut stmt = tx.prepare(&format!(
                "SELECT {} FROM documents WHERE client_id = ?1 AND module = ?2 ORDER BY id",
                DOCUMENT_COLUMNS
            ))?;
            let iter = stmt.query_map((client_id, Module::Aggregate), document_from_row)?;
            let mut out = Vec::new();
            for doc in iter {
                out.push(doc?);
            }
            out
        };

        tx.execute(
            "DELETE FROM documents WHERE client_id = ?1 AND module = ?2",
            (client_id, Module::Aggregate),
        )?;

        let created_at = now_millis();
        let mut inserted = Vec::with_capacity(new_rows.len());
        for row in new_rows {
            if row.client_id != client_id || row.module != Module::Aggregate {
                return Err(AppError::InvalidOperation(format!(
                    "aggregate row '{}' must belong to client {} in module 0",
                    row.doc_type, client_id
                )));
            }
            let path = row.path.to_string_lossy().to_string();
            tx.execute(
                "INSERT INTO documents (client_id, module, doc_type, path, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (client_id, Module::Aggregate, &row.doc_type, &path, created_at),
            )?;
            inserted.push(Document {
                id: tx.last_insert_rowid(),
                client_id,
                module: Module::Aggregate,
                doc_type: row.doc_type.clone(),
                path,
                created_at,
            });
        }

        tx.commit()?;
        Ok(AggregateSwap { inserted, removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiscType, NewClient};
    use std::path::PathBuf;

    fn setup() -> (Database, i64) {
        let db = Database::in_memory().unwrap();
        db.initialize().unwrap();
        let client = db
            .upsert_client(&NewClient {
                full_name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                phone: "1".to_string(),
                profession: "QA".to_string(),
                age: 30,
                disc_type: DiscType::S,
            })
            .unwrap();
        (db, client.id)
    }

    fn row(client_id: i64, module: Module, doc_type: &str) -> NewDocument {
        NewDocument {
            client_id,
            module,
            doc_type: doc_type.to_string(),
            path: PathBuf::from(format!("/tmp/{}.pdf", doc_type)),
        }
    }

    #[test]
    fn replace_aggregates_swaps_only_module_zero() {
        let (db, client_id) = setup();
        db.insert_document(&row(client_id, Module::DiagnosisBrand, "brand_canvas"))
            .unwrap();
        db.insert_document(&row(client_id, Module::Aggregate, "final_pdf")).unwrap();

        let swap = db
            .replace_aggregates(client_id, &[row(client_id, Module::Aggregate, "final_xlsx")])
            .unwrap();

        assert_eq!(swap.removed.len(), 1);
        assert_eq!(swap.removed[0].doc_type, "final_pdf");
        let types: Vec<_> = db
            .list_documents(client_id)
            .unwrap()
            .into_iter()
            .map(|d| d.doc_type)
            .collect();
        assert_eq!(types, vec!["final_xlsx", "brand_canvas"]);
    }

    #[test]
    fn replace_aggregates_rolls_back_on_invalid_row() {
        let (db, client_id) = setup();
        db.insert_document(&row(client_id, Module::Aggregate, "final_pdf")).unwrap();

        let result = db.replace_aggregates(
            client_id,
            &[row(client_id, Module::DigitalPresence, "not_an_aggregate")],
        );

        assert!(matches!(result, Err(AppError::InvalidOperation(_))));
        let remaining = db.list_documents(client_id).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].doc_type, "final_pdf");
    }
}
