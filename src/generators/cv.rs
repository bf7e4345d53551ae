//! Optimized CV, rendered to both DOCX and PDF from one structured record

use serde_json::{json, Value};

use super::schema::{FieldKind, FieldSpec};
use super::{Artifacts, GenContext, GeneratedFile};
use crate::error::AppError;
use crate::office::extract::extract_text;
use crate::office::{DocxReport, PdfReport, Report};
use crate::utils::validate_path;

pub const CV_PDF: &str = "cv_pdf";
pub const CV_DOCX: &str = "cv_docx";

pub const CV_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("nombre", "Nombre completo", FieldKind::Text),
    FieldSpec::optional("contacto", "Contacto", FieldKind::Text),
    FieldSpec::required("titulo", "Rol objetivo", FieldKind::Text),
    FieldSpec::required("resumen", "Resumen profesional", FieldKind::Text),
    FieldSpec::optional("skills", "Competencias clave", FieldKind::List),
    FieldSpec::optional("experiencia", "Experiencia", FieldKind::Text),
    FieldSpec::optional("educacion", "Educación", FieldKind::Text),
    FieldSpec::optional("certs", "Certificaciones", FieldKind::Text),
    FieldSpec::optional("idiomas", "Idiomas", FieldKind::Text),
    FieldSpec::optional("extras", "Premios / Publicaciones", FieldKind::Text),
    FieldSpec::optional("fuente", "CV actual (ruta PDF / DOCX)", FieldKind::Text),
];

/// (heading, key) of the list sections, in render order
const SECTIONS: [(&str, &str); 5] = [
    ("Experiencia", "experiencia"),
    ("Educación", "educacion"),
    ("Certificaciones", "certs"),
    ("Idiomas", "idiomas"),
    ("Premios / Publicaciones", "extras"),
];

/// Normalized CV built from the answers
#[derive(Debug, Clone)]
struct CvContent {
    name: String,
    contact: String,
    role: String,
    summary: String,
    skills: Vec<String>,
    sections: Vec<(&'static str, &'static str, Vec<String>)>,
}

impl CvContent {
    fn from_context(ctx: &GenContext<'_>) -> Self {
        let a = &ctx.answers;
        let name = match a.text("nombre") {
            n if n.is_empty() => ctx.client.full_name.clone(),
            n => n,
        };
        let contact = match a.text("contacto") {
            c if c.is_empty() => format!("{} · {}", ctx.client.email, ctx.client.phone),
            c => c,
        };
        Self {
            name,
            contact,
            role: a.text("titulo"),
            summary: a.text("resumen"),
            skills: a.list("skills"),
            sections: SECTIONS
                .iter()
                .map(|(heading, key)| (*heading, *key, a.lines(key)))
                .collect(),
        }
    }

    fn render(&self, report: &mut impl Report) {
        report.title(&self.name);
        report.heading(&self.role);
        report.paragraph(&self.contact);
        report.paragraph(&self.summary);

        if !self.skills.is_empty() {
            report.heading("Competencias clave");
            report.paragraph(&self.skills.join(" · "));
        }
        for (heading, _, lines) in &self.sections {
            if lines.is_empty() {
                continue;
            }
            report.heading(heading);
            report.bullets(lines);
        }
    }

    fn record(&self, source_text: Option<String>) -> Value {
        let mut record = json!({
            "nombre": self.name,
            "contacto": self.contact,
            "titulo": self.role,
            "resumen": self.summary,
            "skills": self.skills,
        });
        for (_, key, lines) in &self.sections {
            record[*key] = json!(lines);
        }
        if let Some(text) = source_text {
            record["fuente_texto"] = Value::String(text);
        }
        record
    }
}

pub fn cv(ctx: &GenContext<'_>) -> Result<Artifacts, AppError> {
    let source_text = match ctx.answers.text("fuente") {
        s if s.is_empty() => None,
        s => Some(extract_text(&validate_path(&s)?)?),
    };
    let content = CvContent::from_context(ctx);

    let mut docx = DocxReport::new();
    content.render(&mut docx);
    let docx_path = ctx.output("cv", "docx");
    docx.save(&docx_path)?;

    let mut pdf = PdfReport::new(&format!("CV {}", content.name))?;
    content.render(&mut pdf);
    let pdf_path = ctx.output("cv", "pdf");
    pdf.save(&pdf_path)?;

    Ok(Artifacts {
        files: vec![
            GeneratedFile::new(CV_PDF, pdf_path),
            GeneratedFile::new(CV_DOCX, docx_path),
        ],
        cv_record: Some(content.record(source_text)),
    })
}
