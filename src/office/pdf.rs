//! Paginated text reports rendered with printpdf

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

use super::{wrap_text, Report};
use crate::error::AppError;

// US Letter
const PAGE_WIDTH: Mm = Mm(215.9);
const PAGE_HEIGHT: Mm = Mm(279.4);
const LEFT_MARGIN: Mm = Mm(20.0);
const TOP_Y: Mm = Mm(259.4);
const BOTTOM_Y: Mm = Mm(22.0);

const BODY_SIZE: f32 = 11.0;
const BODY_CHARS: usize = 92;

pub struct PdfReport {
    doc: PdfDocumentReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    layer: PdfLayerReference,
    y: Mm,
    pages: usize,
}

impl PdfReport {
    pub fn new(title: &str) -> Result<Self, AppError> {
        let (doc, page1, layer1) = PdfDocument::new(title, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
        let layer = doc.get_page(page1).get_layer(layer1);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(AppError::render)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(AppError::render)?;

        Ok(Self {
            doc,
            regular,
            bold,
            layer,
            y: TOP_Y,
            pages: 1,
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = TOP_Y;
        self.pages += 1;
    }

    /// Move the cursor down, starting a new page when the bottom margin is reached.
    fn advance(&mut self, step: Mm) {
        if self.y - step < BOTTOM_Y {
            self.new_page();
        }
        self.y -= step;
    }

    fn line(&mut self, text: &str, size: f32, bold: bool, indent: Mm, step: Mm) {
        self.advance(step);
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(text, size, LEFT_MARGIN + indent, self.y, font);
    }

    /// Vertical gap
    pub fn spacer(&mut self, gap: Mm) {
        self.advance(gap);
    }

    pub fn save(self, path: &Path) -> Result<(), AppError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.doc.save(&mut writer).map_err(AppError::render)?;
        Ok(())
    }
}

impl Report for PdfReport {
    fn title(&mut self, text: &str) {
        for line in wrap_text(text, 52) {
            self.line(&line, 18.0, true, Mm(0.0), Mm(9.0));
        }
        self.spacer(Mm(4.0));
    }

    fn heading(&mut self, text: &str) {
        self.spacer(Mm(3.0));
        for line in wrap_text(text, 70) {
            self.line(&line, 13.0, true, Mm(0.0), Mm(7.0));
        }
    }

    fn paragraph(&mut self, text: &str) {
        for line in wrap_text(text, BODY_CHARS) {
            self.line(&line, BODY_SIZE, false, Mm(0.0), Mm(5.5));
        }
        self.spacer(Mm(1.5));
    }

    fn bullet(&mut self, text: &str) {
        let mut first = true;
        for line in wrap_text(text, BODY_CHARS - 4) {
            let shown = if first { format!("- {}", line) } else { format!("  {}", line) };
            first = false;
            self.line(&shown, BODY_SIZE, false, Mm(4.0), Mm(5.5));
        }
    }

    fn page_break(&mut self) {
        self.new_page();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn explicit_page_break_adds_a_page() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("report.pdf");

        let mut report = PdfReport::new("Prueba").unwrap();
        report.title("Ruta de selección");
        report.paragraph("Primera fase");
        report.page_break();
        report.heading("Segunda fase");
        report.bullet("Preparar preguntas");
        assert_eq!(report.page_count(), 2);
        report.save(&out).unwrap();

        let loaded = lopdf::Document::load(&out).unwrap();
        assert_eq!(loaded.get_pages().len(), 2);
    }

    #[test]
    fn long_content_flows_onto_new_pages() {
        let mut report = PdfReport::new("Largo").unwrap();
        for i in 0..120 {
            report.paragraph(&format!("Línea número {}", i));
        }
        assert!(report.page_count() > 1);
    }
}
