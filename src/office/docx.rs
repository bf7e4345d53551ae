//! DOCX reports built with docx-rs

use std::fs::File;
use std::path::Path;

use docx_rs::{BreakType, Docx, Paragraph, Run};

use super::Report;
use crate::error::AppError;

/// Sizes are half-points
pub struct DocxReport {
    docx: Docx,
}

impl DocxReport {
    pub fn new() -> Self {
        Self { docx: Docx::new() }
    }

    fn push(&mut self, paragraph: Paragraph) {
        let docx = std::mem::take(&mut self.docx);
        self.docx = docx.add_paragraph(paragraph);
    }

    pub fn save(self, path: &Path) -> Result<(), AppError> {
        let file = File::create(path)?;
        self.docx.build().pack(file).map_err(AppError::render)?;
        Ok(())
    }
}

impl Default for DocxReport {
    fn default() -> Self {
        Self::new()
    }
}

impl Report for DocxReport {
    fn title(&mut self, text: &str) {
        self.push(Paragraph::new().add_run(Run::new().add_text(text).bold().size(36)));
    }

    fn heading(&mut self, text: &str) {
        self.push(Paragraph::new().add_run(Run::new().add_text(text).bold().size(26)));
    }

    fn paragraph(&mut self, text: &str) {
        for line in text.lines() {
            self.push(Paragraph::new().add_run(Run::new().add_text(line).size(22)));
        }
    }

    fn bullet(&mut self, text: &str) {
        self.push(Paragraph::new().add_run(Run::new().add_text(format!("• {}", text)).size(22)));
    }

    fn key_value(&mut self, key: &str, value: &str) {
        self.push(
            Paragraph::new()
                .add_run(Run::new().add_text(format!("{}: ", key)).bold().size(22))
                .add_run(Run::new().add_text(value).size(22)),
        );
    }

    fn page_break(&mut self) {
        self.push(Paragraph::new().add_run(Run::new().add_break(BreakType::Page)));
    }
}
