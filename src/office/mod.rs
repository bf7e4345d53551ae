//! Office Writers
//!
//! PDF reports (printpdf), DOCX reports (docx-rs), and XLSX / PPTX packages
//! assembled with zip + quick-xml. Also text extraction from source documents.

pub mod docx;
pub mod extract;
pub mod pdf;
pub mod pptx;
pub mod xlsx;

use std::fs::File;
use std::io::Write;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::error::AppError;

pub use docx::DocxReport;
pub use pdf::PdfReport;

/// Structured text sink shared by the PDF and DOCX report writers
pub trait Report {
    fn title(&mut self, text: &str);
    fn heading(&mut self, text: &str);
    fn paragraph(&mut self, text: &str);
    fn bullet(&mut self, text: &str);
    fn page_break(&mut self);

    fn key_value(&mut self, key: &str, value: &str) {
        self.paragraph(&format!("{}: {}", key, value));
    }

    fn bullets(&mut self, items: &[String]) {
        for item in items {
            self.bullet(item);
        }
    }
}

/// Thin event writer used to build OOXML parts
pub(crate) struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    pub fn new() -> Result<Self, AppError> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(AppError::render)?;
        Ok(Self { writer })
    }

    pub fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), AppError> {
        let start = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer
            .write_event(Event::Start(start))
            .map_err(AppError::render)
    }

    pub fn close(&mut self, name: &str) -> Result<(), AppError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(AppError::render)
    }

    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), AppError> {
        let start = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer
            .write_event(Event::Empty(start))
            .map_err(AppError::render)
    }

    pub fn text(&mut self, text: &str) -> Result<(), AppError> {
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(AppError::render)
    }

    /// `<name attrs>text</name>`
    pub fn leaf(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<(), AppError> {
        self.open(name, attrs)?;
        self.text(text)?;
        self.close(name)
    }

    pub fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

/// Write a zip package with the given (entry name, bytes) parts, in order.
pub(crate) fn write_package(path: &Path, parts: &[(String, Vec<u8>)]) -> Result<(), AppError> {
    let file = File::create(path)?;
    let mut archive = ZipWriter::new(file);

    for (name, bytes) in parts {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        archive
            .start_file(name.as_str(), options)
            .map_err(AppError::render)?;
        archive.write_all(bytes)?;
    }

    archive.finish().map_err(AppError::render)?;
    Ok(())
}

/// Split text into lines of at most `max_chars` characters, breaking on whitespace.
/// Explicit newlines are kept; a single word longer than the limit stays whole.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for source_line in text.lines() {
        let mut current_line = String::new();
        let mut current_len = 0usize;

        for word in source_line.split_whitespace() {
            let word_len = word.chars().count();
            if current_len > 0 && current_len + word_len + 1 > max_chars {
                lines.push(std::mem::take(&mut current_line));
                current_len = 0;
            }
            if current_len > 0 {
                current_line.push(' ');
                current_len += 1;
            }
            current_line.push_str(word);
            current_len += word_len;
        }

        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_text_respects_width_and_newlines() {
        let text = "Propuesta de valor clara para reclutadores del sector tecnológico\nSegunda línea";
        let lines = wrap_text(text, 20);

        assert!(lines.len() > 2);
        assert_eq!(lines.last().unwrap(), "Segunda línea");
        for line in &lines {
            assert!(line.chars().count() <= 20, "line too long: {}", line);
        }
    }

    #[test]
    fn xml_out_escapes_text_and_attributes() {
        let mut xml = XmlOut::new().unwrap();
        xml.leaf("t", &[("name", "a<b")], "R&D").unwrap();
        let out = String::from_utf8(xml.finish()).unwrap();
        assert!(out.contains("name=\"a&lt;b\""));
        assert!(out.contains(">R&amp;D</t>"));
    }
}
