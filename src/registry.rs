//! Document Registry
//!
//! Records every generated artifact and resolves, opens and deletes them by id.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;

use crate::db::Database;
use crate::error::AppError;
use crate::models::{Document, Module, NewDocument};
use crate::utils::{validate_file_size, validate_path, MAX_ATTACHMENT_SIZE};

/// Hands a file to whatever displays it
pub trait Opener {
    fn open(&self, path: &Path) -> Result<(), AppError>;
}

/// Opens files with the operating system's default application
pub struct SystemOpener;

impl Opener for SystemOpener {
    fn open(&self, path: &Path) -> Result<(), AppError> {
        open::that(path)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum FileRemoval {
    Removed,
    AlreadyMissing,
    Failed(String),
    /// The row did not exist, so no file was touched
    NotAttempted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub row_deleted: bool,
    pub file: FileRemoval,
}

pub struct Registry<'a> {
    db: &'a Database,
}

impl<'a> Registry<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert one row stamped with the current time. The path is not checked.
    pub fn register(
        &self,
        client_id: i64,
        module: Module,
        doc_type: &str,
        path: &Path,
    ) -> Result<Document, AppError> {
        let doc = self.db.insert_document(&NewDocument {
            client_id,
            module,
            doc_type: doc_type.to_string(),
            path: path.to_path_buf(),
        })?;
        tracing::info!(
            document_id = doc.id,
            client_id,
            module = module.number(),
            doc_type,
            "registered document"
        );
        Ok(doc)
    }

    pub fn list(&self, client_id: i64) -> Result<Vec<Document>, AppError> {
        self.db.list_documents(client_id)
    }

    pub fn get(&self, document_id: i64) -> Result<Document, AppError> {
        self.db
            .get_document(document_id)?
            .ok_or(AppError::DocumentNotFound(document_id))
    }

    /// Remove the row, then try to remove the file. Unknown ids are a no-op.
    pub fn delete(&self, document_id: i64) -> Result<DeleteOutcome, AppError> {
        let Some(doc) = self.db.get_document(document_id)? else {
            tracing::debug!(document_id, "delete: row not found");
            return Ok(DeleteOutcome {
                row_deleted: false,
                file: FileRemoval::NotAttempted,
            });
        };

        let row_deleted = self.db.delete_document(document_id)?;
        let file = remove_file_best_effort(doc.file_path());

        Ok(DeleteOutcome { row_deleted, file })
    }

    /// Resolve the row and hand its file to `opener`. Stale rows are left in place.
    pub fn open(&self, document_id: i64, opener: &dyn Opener) -> Result<Document, AppError> {
        let doc = self.get(document_id)?;
        if !doc.file_path().exists() {
            return Err(AppError::FileNotFound(doc.path.clone()));
        }
        opener.open(doc.file_path())?;
        Ok(doc)
    }

    /// Register an externally produced file after path and size checks
    pub fn attach(
        &self,
        client_id: i64,
        module: Module,
        doc_type: &str,
        path: &str,
    ) -> Result<Document, AppError> {
        if module == Module::Aggregate {
            return Err(AppError::Validation(
                "module 0 is reserved for final report outputs".to_string(),
            ));
        }
        self.db.get_client(client_id)?;

        let canonical = validate_path(path)?;
        validate_file_size(&canonical, MAX_ATTACHMENT_SIZE)?;

        self.register(client_id, module, doc_type, &canonical)
    }
}

pub(crate) fn remove_file_best_effort(path: &Path) -> FileRemoval {
    match fs::remove_file(path) {
        Ok(()) => FileRemoval::Removed,
        Err(e) if e.kind() == ErrorKind::NotFound => FileRemoval::AlreadyMissing,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not remove file");
            FileRemoval::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiscType, NewClient};
    use std::cell::RefCell;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingOpener {
        opened: RefCell<Vec<PathBuf>>,
    }

    impl Opener for RecordingOpener {
        fn open(&self, path: &Path) -> Result<(), AppError> {
            self.opened.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    fn setup() -> (Database, i64) {
        let db = Database::in_memory().unwrap();
        db.initialize().unwrap();
        let client = db
            .upsert_client(&NewClient {
                full_name: "Ana Ruiz".to_string(),
                email: "ana@example.com".to_string(),
                phone: "600000000".to_string(),
                profession: "Marketing".to_string(),
                age: 30,
                disc_type: DiscType::I,
            })
            .unwrap();
        (db, client.id)
    }

    #[test]
    fn list_orders_by_module_then_insertion() {
        let (db, client_id) = setup();
        let reg = Registry::new(&db);
        reg.register(client_id, Module::SkillsSelection, "skill_matrix", Path::new("/x/c.pdf"))
            .unwrap();
        reg.register(client_id, Module::DiagnosisBrand, "brand_canvas", Path::new("/x/a.pdf"))
            .unwrap();
        reg.register(client_id, Module::DiagnosisBrand, "linkedin_kpis", Path::new("/x/b.xlsx"))
            .unwrap();

        let types: Vec<_> = reg
            .list(client_id)
            .unwrap()
            .into_iter()
            .map(|d| d.doc_type)
            .collect();
        assert_eq!(types, vec!["brand_canvas", "linkedin_kpis", "skill_matrix"]);
    }

    #[test]
    fn delete_is_idempotent_and_tolerates_missing_file() {
        let (db, client_id) = setup();
        let reg = Registry::new(&db);
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.pdf");
        fs::write(&file, b"%PDF").unwrap();

        let doc = reg
            .register(client_id, Module::DiagnosisBrand, "brand_canvas", &file)
            .unwrap();
        let first = reg.delete(doc.id).unwrap();
        assert!(first.row_deleted);
        assert_eq!(first.file, FileRemoval::Removed);
        assert!(!file.exists());

        let second = reg.delete(doc.id).unwrap();
        assert!(!second.row_deleted);
        assert_eq!(second.file, FileRemoval::NotAttempted);

        let stale = reg
            .register(client_id, Module::DiagnosisBrand, "brand_canvas", &file)
            .unwrap();
        let third = reg.delete(stale.id).unwrap();
        assert!(third.row_deleted);
        assert_eq!(third.file, FileRemoval::AlreadyMissing);
    }

    #[test]
    fn open_reports_unknown_id_and_missing_file() {
        let (db, client_id) = setup();
        let reg = Registry::new(&db);
        let opener = RecordingOpener::default();

        assert!(matches!(
            reg.open(999, &opener),
            Err(AppError::DocumentNotFound(999))
        ));

        let stale = reg
            .register(client_id, Module::DiagnosisBrand, "brand_canvas", Path::new("/nowhere/x.pdf"))
            .unwrap();
        assert!(matches!(reg.open(stale.id, &opener), Err(AppError::FileNotFound(_))));
        assert_eq!(reg.list(client_id).unwrap().len(), 1);
        assert!(opener.opened.borrow().is_empty());
    }

    #[test]
    fn open_hands_existing_file_to_opener() {
        let (db, client_id) = setup();
        let reg = Registry::new(&db);
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.pdf");
        fs::write(&file, b"%PDF").unwrap();
        let doc = reg
            .register(client_id, Module::DiagnosisBrand, "brand_canvas", &file)
            .unwrap();

        let opener = RecordingOpener::default();
        reg.open(doc.id, &opener).unwrap();
        assert_eq!(opener.opened.borrow().as_slice(), &[file]);
    }

    #[test]
    fn attach_registers_canonical_path() {
        let (db, client_id) = setup();
        let reg = Registry::new(&db);
        let dir = tempdir().unwrap();
        let file = dir.path().join("linkedin.pdf");
        fs::write(&file, b"%PDF").unwrap();

        let doc = reg
            .attach(client_id, Module::DiagnosisBrand, "linkedin_report", file.to_str().unwrap())
            .unwrap();
        assert_eq!(doc.file_path(), file.canonicalize().unwrap());

        assert!(matches!(
            reg.attach(client_id, Module::Aggregate, "final_pdf", file.to_str().unwrap()),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            reg.attach(client_id + 1, Module::DiagnosisBrand, "linkedin_report", file.to_str().unwrap()),
            Err(AppError::ClientNotFound(_))
        ));
    }
}
