//! Document Generators
//!
//! One table maps every document-type tag to its module, form schema and
//! generator. Generators only write files under the workspace; registering
//! the results is done by `generate_and_register`.

mod brand;
mod cv;
mod market;
pub mod schema;
mod search;
mod selection;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::db::Database;
use crate::error::AppError;
use crate::models::{Client, Document, Module};
use crate::registry::{remove_file_best_effort, Registry};
use crate::utils::output_path;

pub use schema::{Answers, FieldKind, FieldSpec};

/// Inputs shared by every generator
pub struct GenContext<'a> {
    pub client: &'a Client,
    pub answers: Answers<'a>,
    pub workspace: &'a Path,
    pub today: NaiveDate,
}

impl GenContext<'_> {
    /// Output path `<workspace>/<client>_<6hex>_<suffix>.<ext>`
    pub fn output(&self, suffix: &str, ext: &str) -> PathBuf {
        output_path(self.workspace, &self.client.full_name, suffix, ext)
    }

    pub fn date_line(&self) -> String {
        format!("Fecha: {}", self.today.format("%Y-%m-%d"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub doc_type: String,
    pub path: PathBuf,
}

impl GeneratedFile {
    pub fn new(doc_type: &str, path: PathBuf) -> Self {
        Self {
            doc_type: doc_type.to_string(),
            path,
        }
    }
}

/// Everything a generator produced
#[derive(Debug, Clone, Default)]
pub struct Artifacts {
    pub files: Vec<GeneratedFile>,
    /// Structured CV to keep in `cv_data`
    pub cv_record: Option<Value>,
}

impl From<Vec<GeneratedFile>> for Artifacts {
    fn from(files: Vec<GeneratedFile>) -> Self {
        Self {
            files,
            cv_record: None,
        }
    }
}

pub type GeneratorFn = fn(&GenContext<'_>) -> Result<Artifacts, AppError>;

pub struct DocumentKind {
    pub tag: &'static str,
    pub module: Module,
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
    /// `None` for documents that are only ever attached from outside
    pub generate: Option<GeneratorFn>,
}

impl DocumentKind {
    pub fn is_attach_only(&self) -> bool {
        self.generate.is_none()
    }
}

pub static DOCUMENT_KINDS: &[DocumentKind] = &[
    DocumentKind {
        tag: "brand_canvas",
        module: Module::DiagnosisBrand,
        title: "BrandCanvas",
        fields: brand::CANVAS_FIELDS,
        generate: Some(brand::brand_canvas),
    },
    DocumentKind {
        tag: "brand_strategy",
        module: Module::DiagnosisBrand,
        title: "Estrategia de marca personal",
        fields: brand::STRATEGY_FIELDS,
        generate: Some(brand::brand_strategy),
    },
    DocumentKind {
        tag: "sector_market",
        module: Module::DiagnosisBrand,
        title: "Sector & mercado",
        fields: market::SECTOR_FIELDS,
        generate: Some(market::sector_market),
    },
    DocumentKind {
        tag: "content_plan",
        module: Module::DiagnosisBrand,
        title: "Parrilla de contenidos",
        fields: market::CONTENT_PLAN_FIELDS,
        generate: Some(market::content_plan),
    },
    DocumentKind {
        tag: "networking_plan",
        module: Module::DiagnosisBrand,
        title: "Plan de networking",
        fields: brand::NETWORKING_FIELDS,
        generate: Some(brand::networking_plan),
    },
    DocumentKind {
        tag: "linkedin_kpis",
        module: Module::DiagnosisBrand,
        title: "Panel KPI LinkedIn",
        fields: market::KPI_FIELDS,
        generate: Some(market::linkedin_kpis),
    },
    DocumentKind {
        tag: "image_guidelines",
        module: Module::DiagnosisBrand,
        title: "Guía de imagen profesional",
        fields: brand::IMAGE_FIELDS,
        generate: Some(brand::image_guidelines),
    },
    DocumentKind {
        tag: "interview_report",
        module: Module::DiagnosisBrand,
        title: "Informe de entrevista",
        fields: selection::INTERVIEW_FIELDS,
        generate: Some(selection::interview_report),
    },
    DocumentKind {
        tag: "linkedin_networking",
        module: Module::DiagnosisBrand,
        title: "Networking en LinkedIn",
        fields: &[],
        generate: Some(brand::linkedin_networking),
    },
    DocumentKind {
        tag: "linkedin_report",
        module: Module::DiagnosisBrand,
        title: "Análisis de perfil LinkedIn (adjunto)",
        fields: &[],
        generate: None,
    },
    DocumentKind {
        tag: "cv",
        module: Module::DigitalPresence,
        title: "CV optimizado",
        fields: cv::CV_FIELDS,
        generate: Some(cv::cv),
    },
    DocumentKind {
        tag: "ats_guide",
        module: Module::DigitalPresence,
        title: "Guía de perfiles ATS",
        fields: search::ATS_FIELDS,
        generate: Some(search::ats_guide),
    },
    DocumentKind {
        tag: "search_guide",
        module: Module::DigitalPresence,
        title: "Guía de búsqueda activa",
        fields: search::SEARCH_FIELDS,
        generate: Some(search::search_guide),
    },
    DocumentKind {
        tag: "cold_messages",
        module: Module::DigitalPresence,
        title: "Mensajes en frío",
        fields: search::COLD_FIELDS,
        generate: Some(search::cold_messages),
    },
    DocumentKind {
        tag: "skill_matrix",
        module: Module::SkillsSelection,
        title: "Skill matrix",
        fields: selection::SKILL_MATRIX_FIELDS,
        generate: Some(selection::skill_matrix),
    },
    DocumentKind {
        tag: "comm_style",
        module: Module::SkillsSelection,
        title: "Guía de comunicación DISC",
        fields: selection::COMM_STYLE_FIELDS,
        generate: Some(selection::comm_style),
    },
    DocumentKind {
        tag: "selection_route",
        module: Module::SkillsSelection,
        title: "Ruta de selección",
        fields: selection::ROUTE_FIELDS,
        generate: Some(selection::selection_route),
    },
    DocumentKind {
        tag: "disc_competencies",
        module: Module::SkillsSelection,
        title: "Competencias DISC",
        fields: selection::DISC_COMP_FIELDS,
        generate: Some(selection::disc_competencies),
    },
];

pub fn find_kind(tag: &str) -> Result<&'static DocumentKind, AppError> {
    DOCUMENT_KINDS
        .iter()
        .find(|k| k.tag == tag.trim())
        .ok_or_else(|| AppError::UnknownDocumentType(tag.to_string()))
}

/// Validate, generate and register a document for a client.
///
/// A validation failure changes nothing. If registration fails the generated
/// files are removed.
pub fn generate_and_register(
    db: &Database,
    client_id: i64,
    tag: &str,
    answers: &Value,
    workspace: &Path,
) -> Result<Vec<Document>, AppError> {
    let kind = find_kind(tag)?;
    let generate = kind.generate.ok_or_else(|| {
        AppError::InvalidOperation(format!(
            "'{}' is attach-only; register the file with `doc attach`",
            kind.tag
        ))
    })?;
    schema::validate(kind.fields, answers)?;

    let client = db.get_client(client_id)?;
    fs::create_dir_all(workspace)?;

    let ctx = GenContext {
        client: &client,
        answers: Answers::new(answers),
        workspace,
        today: chrono::Local::now().date_naive(),
    };
    let artifacts = generate(&ctx)?;
    tracing::debug!(tag = kind.tag, files = artifacts.files.len(), "generated");

    match register_artifacts(db, &client, kind, &artifacts) {
        Ok(docs) => Ok(docs),
        Err(e) => {
            for file in &artifacts.files {
                remove_file_best_effort(&file.path);
            }
            Err(e)
        }
    }
}

fn register_artifacts(
    db: &Database,
    client: &Client,
    kind: &DocumentKind,
    artifacts: &Artifacts,
) -> Result<Vec<Document>, AppError> {
    let registry = Registry::new(db);
    let mut docs = Vec::with_capacity(artifacts.files.len());
    for file in &artifacts.files {
        docs.push(registry.register(client.id, kind.module, &file.doc_type, &file.path)?);
    }

    if let Some(record) = &artifacts.cv_record {
        let path_of = |doc_type: &str| {
            docs.iter()
                .find(|d| d.doc_type == doc_type)
                .map(|d| d.path.clone())
                .unwrap_or_default()
        };
        let blob = serde_json::to_string(record)?;
        db.save_cv_data(client.id, &blob, &path_of(cv::CV_PDF), &path_of(cv::CV_DOCX))?;
    }

    Ok(docs)
}

/// Summary row for listing the catalogue
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KindInfo {
    pub tag: &'static str,
    pub module: i64,
    pub title: &'static str,
    pub attach_only: bool,
    pub required: Vec<&'static str>,
    pub optional: Vec<&'static str>,
}

pub fn catalogue() -> Vec<KindInfo> {
    DOCUMENT_KINDS
        .iter()
        .map(|k| KindInfo {
            tag: k.tag,
            module: k.module.number(),
            title: k.title,
            attach_only: k.is_attach_only(),
            required: k.fields.iter().filter(|f| f.required).map(|f| f.key).collect(),
            optional: k.fields.iter().filter(|f| !f.required).map(|f| f.key).collect(),
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiscType, NewClient};
    use serde_json::json;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn setup() -> (Database, i64) {
        let db = Database::in_memory().unwrap();
        db.initialize().unwrap();
        let client = db
            .upsert_client(&NewClient {
                full_name: "Ana Ruiz".to_string(),
                email: "ana@example.com".to_string(),
                phone: "600000000".to_string(),
                profession: "Analista".to_string(),
                age: 31,
                disc_type: DiscType::C,
            })
            .unwrap();
        (db, client.id)
    }

    #[test]
    fn tags_are_unique_and_modules_are_not_aggregate() {
        let mut seen = HashSet::new();
        for kind in DOCUMENT_KINDS {
            assert!(seen.insert(kind.tag), "duplicate tag {}", kind.tag);
            assert_ne!(kind.module, Module::Aggregate);
        }
        assert_eq!(catalogue().len(), DOCUMENT_KINDS.len());
    }

    #[test]
    fn unknown_tag_is_reported() {
        assert!(matches!(find_kind("horoscope"), Err(AppError::UnknownDocumentType(_))));
    }

    #[test]
    fn invalid_answers_change_nothing() {
        let (db, client_id) = setup();
        let dir = tempdir().unwrap();
        let ws = dir.path().join("ws");

        let result = generate_and_register(&db, client_id, "networking_plan", &json!({}), &ws);

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(db.list_documents(client_id).unwrap().is_empty());
        assert!(!ws.exists());
    }

    #[test]
    fn generated_files_are_registered_under_the_kind_module() {
        let (db, client_id) = setup();
        let dir = tempdir().unwrap();

        let docs = generate_and_register(
            &db,
            client_id,
            "content_plan",
            &json!({ "pilares": ["Datos", "Carrera"], "freq": 3, "formatos": "Post, Carrusel", "semanas": 2 }),
            dir.path(),
        )
        .unwrap();

        let types: Vec<_> = docs.iter().map(|d| d.doc_type.as_str()).collect();
        assert_eq!(types, vec!["content_plan_docx", "content_plan_xlsx"]);
        assert!(docs.iter().all(|d| d.module == Module::DiagnosisBrand));
        assert_eq!(db.list_documents(client_id).unwrap().len(), 2);
    }

    #[test]
    fn attach_only_kind_cannot_be_generated() {
        let (db, client_id) = setup();
        let dir = tempdir().unwrap();
        assert!(matches!(
            generate_and_register(&db, client_id, "linkedin_report", &json!({}), dir.path()),
            Err(AppError::InvalidOperation(_))
        ));
    }

    #[test]
    fn cv_generation_stores_structured_record() {
        let (db, client_id) = setup();
        let dir = tempdir().unwrap();

        let docs = generate_and_register(
            &db,
            client_id,
            "cv",
            &json!({ "titulo": "Data Analyst", "resumen": "Analista con 5 años de experiencia" }),
            dir.path(),
        )
        .unwrap();
        assert_eq!(docs.len(), 2);

        let cv = db.latest_cv_data(client_id).unwrap().unwrap();
        let blob: Value = serde_json::from_str(&cv.json_blob).unwrap();
        assert_eq!(blob["titulo"], "Data Analyst");
        assert!(cv.pdf_path.ends_with("_cv.pdf"));
        assert!(cv.docx_path.ends_with("_cv.docx"));
    }
}
