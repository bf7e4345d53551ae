//! Workbook consolidation: values of every sheet of every source, one sheet each

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::AppError;
use crate::office::xlsx::{CellValue, XlsxWorkbook};

/// Title of the placeholder sheet written when nothing could be copied
pub const EMPTY_SHEET: &str = "Resumen";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XlsxMerge {
    /// The only present source was copied byte for byte
    Copied(PathBuf),
    /// A new workbook was built with these sheet titles
    Built(Vec<String>),
}

fn to_cell(value: &Data) -> CellValue {
    match value {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
        Data::Empty => CellValue::Empty,
    }
}

fn copy_sheets(source: &Path, workbook: &mut XlsxWorkbook) -> Result<(), AppError> {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut book = open_workbook_auto(source)?;
    for sheet_name in book.sheet_names() {
        let range = book.worksheet_range(&sheet_name)?;
        let sheet = workbook.add_sheet(&format!("{}_{}", stem, sheet_name));

        if let Some((row0, col0)) = range.start() {
            for (r, c, value) in range.used_cells() {
                sheet.set(row0 as usize + r, col0 as usize + c, to_cell(value));
            }
        }
    }
    Ok(())
}

/// Consolidate `sources` into `out`.
///
/// Missing sources are appended to `skipped`. With exactly one present source
/// the file is copied unchanged; otherwise a values-only workbook is built, with
/// a single empty `Resumen` sheet when nothing was copied. `out` is always written.
pub fn merge_workbooks(
    sources: &[PathBuf],
    out: &Path,
    skipped: &mut Vec<PathBuf>,
) -> Result<XlsxMerge, AppError> {
    let mut present = Vec::new();
    for path in sources {
        if path.exists() {
            present.push(path);
        } else {
            tracing::warn!(path = %path.display(), "skipping missing spreadsheet source");
            skipped.push(path.clone());
        }
    }

    if let [only] = present.as_slice() {
        fs::copy(only, out)?;
        return Ok(XlsxMerge::Copied((*only).clone()));
    }

    let mut workbook = XlsxWorkbook::new();
    for source in &present {
        copy_sheets(source, &mut workbook)?;
    }
    if workbook.sheet_names().is_empty() {
        workbook.add_sheet(EMPTY_SHEET);
    }

    let titles = workbook
        .sheet_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    workbook.save(out)?;
    Ok(XlsxMerge::Built(titles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_xlsx(path: &Path, label: &str, value: f64) {
        let mut wb = XlsxWorkbook::new();
        let sheet = wb.add_sheet("Sheet1");
        sheet.push_row(vec![label.into(), value.into()]);
        wb.save(path).unwrap();
    }

    #[test]
    fn single_source_is_copied_byte_for_byte() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("kpis.xlsx");
        sample_xlsx(&src, "SSI", 40.0);
        let out = dir.path().join("final.xlsx");

        let mut skipped = Vec::new();
        let merge = merge_workbooks(&[src.clone()], &out, &mut skipped).unwrap();

        assert_eq!(merge, XlsxMerge::Copied(src.clone()));
        assert_eq!(fs::read(&src).unwrap(), fs::read(&out).unwrap());
    }

    #[test]
    fn same_sheet_names_become_distinct_prefixed_sheets() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("kpis.xlsx");
        let b = dir.path().join("calendario.xlsx");
        sample_xlsx(&a, "SSI", 40.0);
        sample_xlsx(&b, "Semana", 1.0);
        let out = dir.path().join("final.xlsx");

        let mut skipped = Vec::new();
        let merge = merge_workbooks(&[a, b], &out, &mut skipped).unwrap();
        assert_eq!(
            merge,
            XlsxMerge::Built(vec!["kpis_Sheet1".to_string(), "calendario_Sheet1".to_string()])
        );

        let mut book = open_workbook_auto(&out).unwrap();
        let range = book.worksheet_range("calendario_Sheet1").unwrap();
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("Semana".to_string())));
        assert_eq!(range.get_value((0, 1)), Some(&Data::Float(1.0)));
    }

    #[test]
    fn no_sources_yield_one_empty_summary_sheet() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("final.xlsx");
        let gone = dir.path().join("gone.xlsx");

        let mut skipped = Vec::new();
        let merge = merge_workbooks(&[gone.clone()], &out, &mut skipped).unwrap();

        assert_eq!(merge, XlsxMerge::Built(vec![EMPTY_SHEET.to_string()]));
        assert_eq!(skipped, vec![gone]);
        let book = open_workbook_auto(&out).unwrap();
        assert_eq!(book.sheet_names(), vec![EMPTY_SHEET.to_string()]);
    }
}
