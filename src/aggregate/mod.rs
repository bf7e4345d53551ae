//! Report Aggregator
//!
//! Builds a client's final report: every registered PDF concatenated into one
//! file and every workbook consolidated into another, both recorded as module-0
//! documents that replace any previous final report.

pub mod pdf;
pub mod xlsx;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::db::Database;
use crate::error::AppError;
use crate::models::{Document, Module, NewDocument};
use crate::registry::{remove_file_best_effort, Registry};
use crate::utils::output_path;

pub const FINAL_PDF: &str = "final_pdf";
pub const FINAL_XLSX: &str = "final_xlsx";
const OUTPUT_SUFFIX: &str = "informe_final";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalReport {
    pub pdf: Option<Document>,
    pub xlsx: Document,
    /// Registered sources whose files were missing
    pub skipped: Vec<PathBuf>,
    /// Number of previous aggregate rows replaced
    pub replaced: usize,
}

/// Split documents into (pdf, xlsx) source paths, keeping registry order.
/// Previous aggregates and other formats are left out.
fn partition_sources(docs: &[Document]) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut pdfs = Vec::new();
    let mut workbooks = Vec::new();
    for doc in docs.iter().filter(|d| d.module != Module::Aggregate) {
        match doc.extension().as_deref() {
            Some("pdf") => pdfs.push(doc.file_path().to_path_buf()),
            Some("xlsx") => workbooks.push(doc.file_path().to_path_buf()),
            _ => {}
        }
    }
    (pdfs, workbooks)
}

struct Outputs {
    pdf: Option<PathBuf>,
    xlsx: PathBuf,
    skipped: Vec<PathBuf>,
}

fn write_outputs(
    pdf_sources: &[PathBuf],
    xlsx_sources: &[PathBuf],
    pdf_out: &Path,
    xlsx_out: &Path,
    written: &mut Vec<PathBuf>,
) -> Result<Outputs, AppError> {
    let mut skipped = Vec::new();

    let pdf = if pdf_sources.is_empty() {
        None
    } else {
        written.push(pdf_out.to_path_buf());
        match pdf::merge_pdfs(pdf_sources, pdf_out)? {
            Some(merge) => {
                skipped.extend(merge.skipped);
                Some(pdf_out.to_path_buf())
            }
            None => {
                skipped.extend(pdf_sources.iter().cloned());
                None
            }
        }
    };

    written.push(xlsx_out.to_path_buf());
    xlsx::merge_workbooks(xlsx_sources, xlsx_out, &mut skipped)?;

    Ok(Outputs {
        pdf,
        xlsx: xlsx_out.to_path_buf(),
        skipped,
    })
}

/// Build and register the final report for a client.
///
/// Outputs are written first; the previous module-0 rows are then swapped for
/// the new ones in one transaction. On failure no row changes and the partial
/// outputs are removed.
pub fn build_final_report(
    db: &Database,
    client_id: i64,
    workspace: &Path,
) -> Result<FinalReport, AppError> {
    let client = db.get_client(client_id)?;
    let docs = Registry::new(db).list(client_id)?;
    let (pdf_sources, xlsx_sources) = partition_sources(&docs);

    fs::create_dir_all(workspace)?;
    let pdf_out = output_path(workspace, &client.full_name, OUTPUT_SUFFIX, "pdf");
    let xlsx_out = output_path(workspace, &client.full_name, OUTPUT_SUFFIX, "xlsx");

    let mut written = Vec::new();
    let outputs = match write_outputs(&pdf_sources, &xlsx_sources, &pdf_out, &xlsx_out, &mut written) {
        Ok(outputs) => outputs,
        Err(e) => {
            discard(&written);
            return Err(e);
        }
    };

    let mut rows = Vec::with_capacity(2);
    if let Some(path) = &outputs.pdf {
        rows.push(NewDocument {
            client_id,
            module: Module::Aggregate,
            doc_type: FINAL_PDF.to_string(),
            path: path.clone(),
        });
    }
    rows.push(NewDocument {
        client_id,
        module: Module::Aggregate,
        doc_type: FINAL_XLSX.to_string(),
        path: outputs.xlsx.clone(),
    });

    let swap = match db.replace_aggregates(client_id, &rows) {
        Ok(swap) => swap,
        Err(e) => {
            discard(&written);
            return Err(e);
        }
    };

    for old in &swap.removed {
        remove_file_best_effort(old.file_path());
    }

    for path in &outputs.skipped {
        tracing::warn!(client_id, path = %path.display(), "final report skipped missing source");
    }
    tracing::info!(
        client_id,
        pdf_sources = pdf_sources.len(),
        xlsx_sources = xlsx_sources.len(),
        skipped = outputs.skipped.len(),
        replaced = swap.removed.len(),
        "final report built"
    );

    let mut inserted = swap.inserted.into_iter();
    let pdf = if outputs.pdf.is_some() { inserted.next() } else { None };
    let xlsx = inserted
        .next()
        .ok_or_else(|| AppError::InvalidOperation("final workbook was not registered".to_string()))?;

    Ok(FinalReport {
        pdf,
        xlsx,
        skipped: outputs.skipped,
        replaced: swap.removed.len(),
    })
}

fn discard(paths: &[PathBuf]) {
    for path in paths {
        if path.exists() {
            remove_file_best_effort(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiscType, NewClient};
    use crate::office::xlsx::XlsxWorkbook;
    use crate::office::{PdfReport, Report};
    use calamine::{open_workbook_auto, Reader};
    use tempfile::tempdir;

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

    fn pdf_with_pages(path: &Path, pages: usize) {
        let mut report = PdfReport::new("x").unwrap();
        report.title("Documento");
        for _ in 1..pages {
            report.page_break();
        }
        report.save(path).unwrap();
    }

    fn workbook(path: &Path) {
        let mut wb = XlsxWorkbook::new();
        wb.add_sheet("Sheet1").push_row(vec!["Indicador".into(), 1.0.into()]);
        wb.save(path).unwrap();
    }

    #[test]
    fn merges_registered_pdfs_and_workbooks() {
        let (db, client_id) = setup();
        let reg = Registry::new(&db);
        let dir = tempdir().unwrap();
        let ws = dir.path().join("ws");

        let a = dir.path().join("canvas.pdf");
        let b = dir.path().join("ruta.PDF");
        pdf_with_pages(&a, 1);
        pdf_with_pages(&b, 3);
        let k = dir.path().join("kpis.xlsx");
        let c = dir.path().join("calendario.xlsx");
        workbook(&k);
        workbook(&c);

        reg.register(client_id, Module::SkillsSelection, "selection_route", &b).unwrap();
        reg.register(client_id, Module::DiagnosisBrand, "brand_canvas", &a).unwrap();
        reg.register(client_id, Module::DiagnosisBrand, "linkedin_kpis", &k).unwrap();
        reg.register(client_id, Module::DiagnosisBrand, "content_plan_xlsx", &c).unwrap();
        reg.register(client_id, Module::DiagnosisBrand, "brand_canvas_json", &dir.path().join("x.json"))
            .unwrap();

        let report = build_final_report(&db, client_id, &ws).unwrap();

        let pdf = report.pdf.expect("final pdf");
        assert_eq!(pdf.doc_type, FINAL_PDF);
        assert_eq!(pdf.module, Module::Aggregate);
        assert_eq!(pdf::page_count(pdf.file_path()).unwrap(), 4);
        assert!(pdf.path.ends_with("_informe_final.pdf"));

        let book = open_workbook_auto(report.xlsx.file_path()).unwrap();
        assert_eq!(
            book.sheet_names(),
            vec!["kpis_Sheet1".to_string(), "calendario_Sheet1".to_string()]
        );
        assert!(report.skipped.is_empty());
        assert_eq!(report.replaced, 0);
    }

    #[test]
    fn rerun_replaces_previous_aggregates_and_ignores_them_as_input() {
        let (db, client_id) = setup();
        let reg = Registry::new(&db);
        let dir = tempdir().unwrap();
        let ws = dir.path().join("ws");
        let a = dir.path().join("canvas.pdf");
        pdf_with_pages(&a, 2);
        reg.register(client_id, Module::DiagnosisBrand, "brand_canvas", &a).unwrap();

        let first = build_final_report(&db, client_id, &ws).unwrap();
        let second = build_final_report(&db, client_id, &ws).unwrap();

        assert_eq!(second.replaced, 2);
        assert_eq!(pdf::page_count(second.pdf.as_ref().unwrap().file_path()).unwrap(), 2);
        assert!(!first.pdf.unwrap().file_path().exists());
        assert!(!first.xlsx.file_path().exists());

        let aggregates: Vec<_> = reg
            .list(client_id)
            .unwrap()
            .into_iter()
            .filter(|d| d.module == Module::Aggregate)
            .map(|d| d.doc_type)
            .collect();
        assert_eq!(aggregates, vec![FINAL_PDF, FINAL_XLSX]);
    }

    #[test]
    fn failed_rerun_keeps_previous_report_and_removes_partial_outputs() {
        let (db, client_id) = setup();
        let reg = Registry::new(&db);
        let dir = tempdir().unwrap();
        let ws = dir.path().join("ws");
        let a = dir.path().join("canvas.pdf");
        pdf_with_pages(&a, 1);
        reg.register(client_id, Module::DiagnosisBrand, "brand_canvas", &a).unwrap();

        let first = build_final_report(&db, client_id, &ws).unwrap();
        let first_pdf = first.pdf.unwrap();
        let first_ids = vec![first_pdf.id, first.xlsx.id];
        let mut first_paths = vec![
            first_pdf.file_path().to_path_buf(),
            first.xlsx.file_path().to_path_buf(),
        ];
        first_paths.sort();

        for name in ["kpis.xlsx", "calendario.xlsx"] {
            let broken = dir.path().join(name);
            fs::write(&broken, b"not a zip archive").unwrap();
            reg.register(client_id, Module::DiagnosisBrand, "linkedin_kpis", &broken).unwrap();
        }

        let result = build_final_report(&db, client_id, &ws);
        assert!(matches!(result, Err(AppError::Spreadsheet(_))));

        let aggregate_ids: Vec<_> = reg
            .list(client_id)
            .unwrap()
            .into_iter()
            .filter(|d| d.module == Module::Aggregate)
            .map(|d| d.id)
            .collect();
        assert_eq!(aggregate_ids, first_ids);
        assert!(first_paths.iter().all(|p| p.exists()));

        let mut in_workspace: Vec<_> = fs::read_dir(&ws)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        in_workspace.sort();
        assert_eq!(in_workspace, first_paths);
    }

    #[test]
    fn without_pdfs_only_the_workbook_is_registered() {
        let (db, client_id) = setup();
        let dir = tempdir().unwrap();
        let gone = dir.path().join("gone.pdf");
        Registry::new(&db)
            .register(client_id, Module::DiagnosisBrand, "brand_canvas", &gone)
            .unwrap();

        let report = build_final_report(&db, client_id, dir.path()).unwrap();

        assert!(report.pdf.is_none());
        assert_eq!(report.skipped, vec![gone]);
        assert_eq!(report.xlsx.doc_type, FINAL_XLSX);
        let book = open_workbook_auto(report.xlsx.file_path()).unwrap();
        assert_eq!(book.sheet_names(), vec![xlsx::EMPTY_SHEET.to_string()]);
    }

    #[test]
    fn unknown_client_changes_nothing() {
        let (db, _) = setup();
        let dir = tempdir().unwrap();
        assert!(matches!(
            build_final_report(&db, 77, dir.path()),
            Err(AppError::ClientNotFound(77))
        ));
    }
}
