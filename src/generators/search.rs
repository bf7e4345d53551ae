//! Digital presence guides: ATS profiles, active search, cold messages

use super::schema::{FieldKind, FieldSpec};
use super::{Artifacts, GenContext, GeneratedFile};
use crate::error::AppError;
use crate::office::{PdfReport, Report};

pub const ATS_FIELDS: &[FieldSpec] = &[FieldSpec::required(
    "perfiles",
    "Perfiles por portal (portal -> {campo: texto})",
    FieldKind::Sections,
)];

/// `palabras_clave` -> `Palabras clave`
fn field_label(key: &str) -> String {
    let spaced = key.replace('_', " ").to_lowercase();
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn ats_guide(ctx: &GenContext<'_>) -> Result<Artifacts, AppError> {
    let mut pdf = PdfReport::new("Guía de perfiles")?;
    pdf.title(&format!("Guía de Perfiles – {}", ctx.client.full_name));
    pdf.paragraph(&ctx.date_line());

    for (site, fields) in ctx.answers.sections("perfiles") {
        pdf.heading(&site);
        for (key, text) in fields.pairs() {
            pdf.bullet(&format!("{}: {}", field_label(&key), text));
        }
    }

    let path = ctx.output("ats", "pdf");
    pdf.save(&path)?;
    Ok(vec![GeneratedFile::new("ats_guide", path)].into())
}

pub const SEARCH_FIELDS: &[FieldSpec] = &[FieldSpec::required(
    "metodos",
    "Métodos de búsqueda (método -> ejemplo / parámetros)",
    FieldKind::Map,
)];

pub const SEARCH_METHODS: [(&str, &str); 7] = [
    (
        "Alertas de Google",
        "Crea una búsqueda con operadores (AND, OR, \"\") y activa la alerta para recibir correos diarios/semanales.",
    ),
    (
        "Búsqueda avanzada LinkedIn",
        "Emplea filtros de ubicación, empresa, y palabras clave con Boolean para acotar resultados.",
    ),
    (
        "Filtros de portales de empleo",
        "Aprovecha filtros de rango salarial, fecha de publicación y trabajo remoto.",
    ),
    (
        "Boolean X-Ray (site:linkedin)",
        "Ejemplo: site:linkedin.com/in AND \"Recruiter\" AND \"company name\".",
    ),
    (
        "Hashtags sectoriales",
        "Sigue hashtags relevantes y activa notificaciones.",
    ),
    (
        "Grupos & Comunidades",
        "Únete a grupos en LinkedIn, Discord o Slack y participa activamente.",
    ),
    (
        "Networking de segundo grado",
        "Identifica conexiones mutuas y solicita presentación personalizada.",
    ),
];

fn method_description(name: &str) -> &'static str {
    SEARCH_METHODS
        .iter()
        .find(|(method, _)| *method == name)
        .map(|(_, description)| *description)
        .unwrap_or("")
}

pub fn search_guide(ctx: &GenContext<'_>) -> Result<Artifacts, AppError> {
    let mut pdf = PdfReport::new("Guía de búsqueda activa")?;
    pdf.title("Guía de Búsqueda Activa de Empleo");
    pdf.paragraph(&format!("{} – {}", ctx.client.full_name, ctx.today));

    for (method, notes) in ctx.answers.entries("metodos") {
        if notes.is_empty() {
            continue;
        }
        pdf.heading(&method);
        let description = method_description(&method);
        if !description.is_empty() {
            pdf.paragraph(description);
        }
        pdf.paragraph("Ejemplo / Parámetros:");
        pdf.paragraph(&notes);
    }

    let path = ctx.output("search", "pdf");
    pdf.save(&path)?;
    Ok(vec![GeneratedFile::new("search_guide", path)].into())
}

pub const COLD_FIELDS: &[FieldSpec] = &[FieldSpec::required(
    "mensajes",
    "Mensajes (audiencia -> mensaje)",
    FieldKind::Map,
)];

pub fn cold_messages(ctx: &GenContext<'_>) -> Result<Artifacts, AppError> {
    let mut pdf = PdfReport::new("Mensajes en frío")?;
    pdf.title(&format!("Mensajes en frío – {}", ctx.client.full_name));
    pdf.paragraph(&ctx.date_line());

    for (audience, message) in ctx.answers.entries("mensajes") {
        pdf.heading(&audience);
        pdf.paragraph(&message);
    }

    let path = ctx.output("cold_msgs", "pdf");
    pdf.save(&path)?;
    Ok(vec![GeneratedFile::new("cold_messages", path)].into())
}
