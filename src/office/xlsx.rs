//! Minimal SpreadsheetML writer
//!
//! Produces a values-only workbook: inline strings, numbers, booleans and
//! formulas. Styles are reduced to the single default cell format.

use std::collections::HashSet;
use std::path::Path;

use super::{write_package, XmlOut};
use crate::error::AppError;

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Excel's limit on worksheet titles
pub const MAX_SHEET_TITLE: usize = 31;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    /// Formula without the leading `=`
    Formula(String),
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set a cell by zero-based (row, column), growing the grid as needed
    pub fn set(&mut self, row: usize, col: usize, value: CellValue) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Empty);
        }
        cells[col] = value;
    }

    pub fn push_row(&mut self, values: Vec<CellValue>) {
        self.rows.push(values);
    }

    /// 1-based number of the next row `push_row` will fill
    pub fn next_row_number(&self) -> usize {
        self.rows.len() + 1
    }

    fn to_xml(&self) -> Result<Vec<u8>, AppError> {
        let mut xml = XmlOut::new()?;
        xml.open("worksheet", &[("xmlns", MAIN_NS), ("xmlns:r", REL_NS)])?;

        if self.rows.iter().all(|r| r.iter().all(|c| *c == CellValue::Empty)) {
            xml.empty("sheetData", &[])?;
        } else {
            xml.open("sheetData", &[])?;
            for (r, cells) in self.rows.iter().enumerate() {
                if cells.iter().all(|c| *c == CellValue::Empty) {
                    continue;
                }
                let row_ref = (r + 1).to_string();
                xml.open("row", &[("r", &row_ref)])?;
                for (c, value) in cells.iter().enumerate() {
                    let cell_ref = format!("{}{}", column_name(c), r + 1);
                    write_cell(&mut xml, &cell_ref, value)?;
                }
                xml.close("row")?;
            }
            xml.close("sheetData")?;
        }

        xml.close("worksheet")?;
        Ok(xml.finish())
    }
}

fn write_cell(xml: &mut XmlOut, cell_ref: &str, value: &CellValue) -> Result<(), AppError> {
    match value {
        CellValue::Empty => {}
        CellValue::Number(n) if n.is_finite() => {
            xml.open("c", &[("r", cell_ref)])?;
            xml.leaf("v", &[], &n.to_string())?;
            xml.close("c")?;
        }
        // NaN and infinities have no numeric form in <v>
        CellValue::Number(n) => write_inline_text(xml, cell_ref, &n.to_string())?,
        CellValue::Bool(b) => {
            xml.open("c", &[("r", cell_ref), ("t", "b")])?;
            xml.leaf("v", &[], if *b { "1" } else { "0" })?;
            xml.close("c")?;
        }
        CellValue::Text(s) => write_inline_text(xml, cell_ref, s)?,
        CellValue::Formula(f) => {
            xml.open("c", &[("r", cell_ref)])?;
            xml.leaf("f", &[], f.trim_start_matches('='))?;
            xml.close("c")?;
        }
    }
    Ok(())
}

fn write_inline_text(xml: &mut XmlOut, cell_ref: &str, text: &str) -> Result<(), AppError> {
    xml.open("c", &[("r", cell_ref), ("t", "inlineStr")])?;
    xml.open("is", &[])?;
    xml.leaf("t", &[("xml:space", "preserve")], text)?;
    xml.close("is")?;
    xml.close("c")
}

/// Zero-based column index to letters (0 -> A, 26 -> AA)
pub fn column_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).to_string()
}

/// Longest prefix of `text` that fits in `max_units` UTF-16 code units.
/// Excel measures sheet titles in UTF-16, so astral characters count twice.
fn utf16_prefix(text: &str, max_units: usize) -> String {
    let mut units = 0;
    text.chars()
        .take_while(|c| {
            units += c.len_utf16();
            units <= max_units
        })
        .collect()
}

/// Replace characters Excel forbids in sheet titles and cut to 31 UTF-16 units
pub fn sanitize_sheet_title(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    let cleaned = utf16_prefix(&replaced, MAX_SHEET_TITLE);
    if cleaned.trim().is_empty() {
        "Hoja".to_string()
    } else {
        cleaned
    }
}

#[derive(Debug, Clone, Default)]
pub struct XlsxWorkbook {
    sheets: Vec<Sheet>,
}

impl XlsxWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Add a sheet, sanitising the title and suffixing `_2`, `_3`, ... on
    /// case-insensitive collisions while staying within 31 UTF-16 units.
    pub fn add_sheet(&mut self, title: &str) -> &mut Sheet {
        let base = sanitize_sheet_title(title);
        let taken: HashSet<String> = self.sheets.iter().map(|s| s.name.to_lowercase()).collect();

        let mut name = base.clone();
        let mut n = 2;
        while taken.contains(&name.to_lowercase()) {
            let suffix = format!("_{}", n);
            let keep = MAX_SHEET_TITLE - suffix.len();
            name = format!("{}{}", utf16_prefix(&base, keep), suffix);
            n += 1;
        }

        self.sheets.push(Sheet {
            name,
            rows: Vec::new(),
        });
        let last = self.sheets.len() - 1;
        &mut self.sheets[last]
    }

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        if self.sheets.is_empty() {
            return Err(AppError::InvalidOperation(
                "a workbook needs at least one sheet".to_string(),
            ));
        }

        let mut parts = vec![
            ("[Content_Types].xml".to_string(), self.content_types()?),
            ("_rels/.rels".to_string(), root_rels()?),
            ("xl/workbook.xml".to_string(), self.workbook_xml()?),
            ("xl/_rels/workbook.xml.rels".to_string(), self.workbook_rels()?),
            ("xl/styles.xml".to_string(), styles_xml()?),
        ];
        for (i, sheet) in self.sheets.iter().enumerate() {
            parts.push((format!("xl/worksheets/sheet{}.xml", i + 1), sheet.to_xml()?));
        }

        write_package(path, &parts)
    }

    fn content_types(&self) -> Result<Vec<u8>, AppError> {
        let mut xml = XmlOut::new()?;
        xml.open(
            "Types",
            &[("xmlns", "http://schemas.openxmlformats.org/package/2006/content-types")],
        )?;
        xml.empty(
            "Default",
            &[
                ("Extension", "rels"),
                ("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
            ],
        )?;
        xml.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
        xml.empty(
            "Override",
            &[
                ("PartName", "/xl/workbook.xml"),
                (
                    "ContentType",
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
                ),
            ],
        )?;
        xml.empty(
            "Override",
            &[
                ("PartName", "/xl/styles.xml"),
                (
                    "ContentType",
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml",
                ),
            ],
        )?;
        for i in 0..self.sheets.len() {
            let part = format!("/xl/worksheets/sheet{}.xml", i + 1);
            xml.empty(
                "Override",
                &[
                    ("PartName", &part),
                    (
                        "ContentType",
                        "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml",
                    ),
                ],
            )?;
        }
        xml.close("Types")?;
        Ok(xml.finish())
    }

    fn workbook_xml(&self) -> Result<Vec<u8>, AppError> {
        let mut xml = XmlOut::new()?;
        xml.open("workbook", &[("xmlns", MAIN_NS), ("xmlns:r", REL_NS)])?;
        xml.open("sheets", &[])?;
        for (i, sheet) in self.sheets.iter().enumerate() {
            let id = (i + 1).to_string();
            let rid = format!("rId{}", i + 1);
            xml.empty(
                "sheet",
                &[("name", &sheet.name), ("sheetId", &id), ("r:id", &rid)],
            )?;
        }
        xml.close("sheets")?;
        xml.close("workbook")?;
        Ok(xml.finish())
    }

    fn workbook_rels(&self) -> Result<Vec<u8>, AppError> {
        let mut xml = XmlOut::new()?;
        xml.open("Relationships", &[("xmlns", PKG_REL_NS)])?;
        for i in 0..self.sheets.len() {
            let rid = format!("rId{}", i + 1);
            let target = format!("worksheets/sheet{}.xml", i + 1);
            xml.empty(
                "Relationship",
                &[
                    ("Id", &rid),
                    (
                        "Type",
                        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet",
                    ),
                    ("Target", &target),
                ],
            )?;
        }
        let styles_rid = format!("rId{}", self.sheets.len() + 1);
        xml.empty(
            "Relationship",
            &[
                ("Id", &styles_rid),
                (
                    "Type",
                    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles",
                ),
                ("Target", "styles.xml"),
            ],
        )?;
        xml.close("Relationships")?;
        Ok(xml.finish())
    }
}

fn root_rels() -> Result<Vec<u8>, AppError> {
    let mut xml = XmlOut::new()?;
    xml.open("Relationships", &[("xmlns", PKG_REL_NS)])?;
    xml.empty(
        "Relationship",
        &[
            ("Id", "rId1"),
            (
                "Type",
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
            ),
            ("Target", "xl/workbook.xml"),
        ],
    )?;
    xml.close("Relationships")?;
    Ok(xml.finish())
}

fn styles_xml() -> Result<Vec<u8>, AppError> {
    let mut xml = XmlOut::new()?;
    xml.open("styleSheet", &[("xmlns", MAIN_NS)])?;

    xml.open("fonts", &[("count", "1")])?;
    xml.open("font", &[])?;
    xml.empty("sz", &[("val", "11")])?;
    xml.empty("name", &[("val", "Calibri")])?;
    xml.close("font")?;
    xml.close("fonts")?;

    xml.open("fills", &[("count", "2")])?;
    for pattern in ["none", "gray125"] {
        xml.open("fill", &[])?;
        xml.empty("patternFill", &[("patternType", pattern)])?;
        xml.close("fill")?;
    }
    xml.close("fills")?;

    xml.open("borders", &[("count", "1")])?;
    xml.open("border", &[])?;
    for side in ["left", "right", "top", "bottom", "diagonal"] {
        xml.empty(side, &[])?;
    }
    xml.close("border")?;
    xml.close("borders")?;

    xml.open("cellStyleXfs", &[("count", "1")])?;
    xml.empty(
        "xf",
        &[("numFmtId", "0"), ("fontId", "0"), ("fillId", "0"), ("borderId", "0")],
    )?;
    xml.close("cellStyleXfs")?;

    xml.open("cellXfs", &[("count", "1")])?;
    xml.empty(
        "xf",
        &[
            ("numFmtId", "0"),
            ("fontId", "0"),
            ("fillId", "0"),
            ("borderId", "0"),
            ("xfId", "0"),
        ],
    )?;
    xml.close("cellXfs")?;

    xml.close("styleSheet")?;
    Ok(xml.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook_auto, Data, Reader};
    use tempfile::tempdir;

    #[test]
    fn column_names() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn colliding_titles_get_numeric_suffix_within_limit() {
        let mut wb = XlsxWorkbook::new();
        let long = "a_very_long_workbook_file_name_Sheet1";
        wb.add_sheet(long);
        wb.add_sheet(long);
        wb.add_sheet("bad/name:[x]");

        let names = wb.sheet_names();
        assert_eq!(names[0], "a_very_long_workbook_file_name_");
        assert_eq!(names[1], "a_very_long_workbook_file_nam_2");
        assert_eq!(names[2], "bad_name__x_");
        assert!(names.iter().all(|n| n.chars().count() <= MAX_SHEET_TITLE));
    }

    #[test]
    fn title_limit_counts_utf16_units() {
        let chart = "📊".repeat(20);
        assert_eq!(sanitize_sheet_title(&chart), "📊".repeat(15));

        let mut wb = XlsxWorkbook::new();
        wb.add_sheet(&chart);
        wb.add_sheet(&chart);
        let names = wb.sheet_names();
        assert_eq!(names[1], format!("{}_2", "📊".repeat(14)));
        assert!(names.iter().all(|n| n.encode_utf16().count() <= MAX_SHEET_TITLE));
    }

    #[test]
    fn non_finite_numbers_are_written_as_text() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("ratios.xlsx");

        let mut wb = XlsxWorkbook::new();
        wb.add_sheet("Ratios")
            .push_row(vec![CellValue::Number(f64::NAN), CellValue::Number(f64::INFINITY), 2.0.into()]);
        wb.save(&out).unwrap();

        let mut book = open_workbook_auto(&out).unwrap();
        let range = book.worksheet_range("Ratios").unwrap();
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("NaN".to_string())));
        assert_eq!(range.get_value((0, 1)), Some(&Data::String("inf".to_string())));
        assert_eq!(range.get_value((0, 2)), Some(&Data::Float(2.0)));
    }

    #[test]
    fn saved_workbook_is_readable_by_calamine() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("kpis.xlsx");

        let mut wb = XlsxWorkbook::new();
        let sheet = wb.add_sheet("KPIs LinkedIn");
        sheet.push_row(vec!["Indicador".into(), "Actual".into()]);
        sheet.push_row(vec!["SSI".into(), 42.5.into()]);
        sheet.set(3, 2, CellValue::Bool(true));
        wb.save(&out).unwrap();

        let mut book = open_workbook_auto(&out).unwrap();
        assert_eq!(book.sheet_names(), vec!["KPIs LinkedIn".to_string()]);
        let range = book.worksheet_range("KPIs LinkedIn").unwrap();
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("Indicador".to_string())));
        assert_eq!(range.get_value((1, 1)), Some(&Data::Float(42.5)));
        assert_eq!(range.get_value((3, 2)), Some(&Data::Bool(true)));
    }

    #[test]
    fn empty_workbook_is_refused() {
        let dir = tempdir().unwrap();
        assert!(XlsxWorkbook::new().save(&dir.path().join("x.xlsx")).is_err());
    }
}
