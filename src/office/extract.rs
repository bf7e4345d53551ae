//! Plain-text extraction from source documents (PDF, DOCX, PPTX, TXT)

use std::fs;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::AppError;

pub fn extract_text(path: &Path) -> Result<String, AppError> {
    if !path.exists() {
        return Err(AppError::FileNotFound(path.display().to_string()));
    }
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "txt" | "md" => Ok(fs::read_to_string(path)?),
        "pdf" => pdf_extract::extract_text(path).map_err(AppError::render),
        "docx" => extract_docx_text(path),
        "pptx" => Ok(extract_pptx_slides(path)?.join("\n")),
        other => Err(AppError::Validation(format!(
            "unsupported source document type: '{}'",
            other
        ))),
    }
}

fn extract_docx_text(path: &Path) -> Result<String, AppError> {
    let buf = fs::read(path)?;
    let docx = docx_rs::read_docx(&buf).map_err(AppError::render)?;

    let mut text = String::new();
    for child in docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(p) = child {
            for child in p.children {
                if let docx_rs::ParagraphChild::Run(r) = child {
                    for child in r.children {
                        if let docx_rs::RunChild::Text(t) = child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text)
}

/// Text of each slide, in slide order. Runs inside one slide are joined by spaces.
pub fn extract_pptx_slides(path: &Path) -> Result<Vec<String>, AppError> {
    let file = fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(AppError::render)?;

    let mut slides = Vec::new();
    let mut slide_index = 1;
    loop {
        let slide_filename = format!("ppt/slides/slide{}.xml", slide_index);
        let mut slide_file = match archive.by_name(&slide_filename) {
            Ok(f) => f,
            Err(_) => break,
        };

        let mut content = String::new();
        slide_file.read_to_string(&mut content)?;
        slides.push(drawing_texts(&content)?.join(" "));
        slide_index += 1;
    }

    Ok(slides)
}

/// Collect the contents of every `<a:t>` element
fn drawing_texts(xml: &str) -> Result<Vec<String>, AppError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut texts = Vec::new();
    let mut in_text = false;
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"a:t" => {
                in_text = true;
                current.clear();
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"a:t" => {
                in_text = false;
                texts.push(std::mem::take(&mut current));
            }
            Ok(Event::Text(e)) if in_text => {
                current.push_str(&e.unescape().map_err(AppError::render)?);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(AppError::render(e)),
            _ => {}
        }
    }

    Ok(texts)
}
