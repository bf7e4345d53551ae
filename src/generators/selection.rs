//! Skills & selection documents

use super::schema::{FieldKind, FieldSpec};
use super::{Artifacts, GenContext, GeneratedFile};
use crate::error::AppError;
use crate::models::DiscType;
use crate::office::{PdfReport, Report};

const LEVELS: &[&str] = &["Bajo", "Medio", "Alto"];
const DISC_LETTERS: &[&str] = &["D", "I", "S", "C"];

pub(crate) fn disc_description(disc: DiscType) -> &'static str {
    match disc {
        DiscType::D => "Directo, orientado a resultados y muy conciso. Prefiere mensajes breves, cifras claras y un llamado a la acción.",
        DiscType::I => "Entusiasta, conversacional y persuasivo. Valora historias, ejemplos y reconocimiento personal.",
        DiscType::S => "Cordial, colaborativo y paciente. Le gusta el contexto, la empatía y un ritmo pausado.",
        DiscType::C => "Analítico, preciso y estructurado. Exige datos, lógica y documentación de soporte.",
    }
}

pub const INTERVIEW_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("scores", "Calificación por bloque", FieldKind::ChoiceMap(LEVELS)),
    FieldSpec::optional("notes", "Observaciones", FieldKind::Text),
];

pub const INTERVIEW_BLOCKS: [&str; 5] = [
    "Personal & Profesional",
    "Formación académica",
    "Experiencia",
    "Soft skills",
    "Hard skills",
];

/// Canonical level and its points; anything unrecognized scores as `Bajo`
fn level_points(raw: &str) -> (&'static str, u8) {
    match raw.trim().to_lowercase().as_str() {
        "alto" => ("Alto", 3),
        "medio" => ("Medio", 2),
        _ => ("Bajo", 1),
    }
}

pub fn interview_report(ctx: &GenContext<'_>) -> Result<Artifacts, AppError> {
    let scores = ctx.answers.entries("scores");
    for (block, _) in &scores {
        if !INTERVIEW_BLOCKS.contains(&block.as_str()) {
            tracing::warn!(block = %block, "ignoring unknown interview block");
        }
    }

    let mut pdf = PdfReport::new("Informe de entrevista")?;
    pdf.title(&format!("Informe de Entrevista – {}", ctx.client.full_name));
    pdf.paragraph(&ctx.date_line());

    pdf.heading("Bloque | Calificación | Puntos");
    let mut total = 0u32;
    for block in INTERVIEW_BLOCKS {
        let raw = scores
            .iter()
            .find(|(name, _)| name == block)
            .map(|(_, level)| level.as_str())
            .unwrap_or("Bajo");
        let (level, points) = level_points(raw);
        total += u32::from(points);
        pdf.paragraph(&format!("{} | {} | {}", block, level, points));
    }
    pdf.key_value("Total", &format!("{} / {}", total, INTERVIEW_BLOCKS.len() * 3));

    pdf.heading("Observaciones");
    pdf.paragraph(&ctx.answers.text("notes"));

    let path = ctx.output("interview", "pdf");
    pdf.save(&path)?;
    Ok(vec![GeneratedFile::new("interview_report", path)].into())
}

pub const SKILL_MATRIX_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("soft", "Soft skills (skill -> definición)", FieldKind::Map),
    FieldSpec::optional("hard", "Hard skills (skill -> plataforma)", FieldKind::Map),
];

pub fn skill_matrix(ctx: &GenContext<'_>) -> Result<Artifacts, AppError> {
    let mut pdf = PdfReport::new("Skill matrix")?;
    pdf.title(&format!("Skill Matrix – {}", ctx.client.full_name));
    pdf.paragraph(&ctx.date_line());

    pdf.heading("Soft skills prioritarias");
    for (skill, definition) in ctx.answers.entries("soft") {
        pdf.key_value(&skill, &definition);
    }

    let hard = ctx.answers.entries("hard");
    if !hard.is_empty() {
        pdf.heading("Hard skills recomendadas");
        for (skill, platform) in hard {
            pdf.bullet(&format!("{} (Formarse en {})", skill, platform));
        }
    }

    let path = ctx.output("skills", "pdf");
    pdf.save(&path)?;
    Ok(vec![GeneratedFile::new("skill_matrix", path)].into())
}

pub const COMM_STYLE_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("categoria", "Categoría DISC", FieldKind::Choice(DISC_LETTERS)),
    FieldSpec::optional("notas", "Observaciones del consultor", FieldKind::List),
];

pub fn comm_style(ctx: &GenContext<'_>) -> Result<Artifacts, AppError> {
    let category = match ctx.answers.text("categoria") {
        c if c.is_empty() => ctx.client.disc_type,
        c => c.parse()?,
    };

    let mut pdf = PdfReport::new("Guía de comunicación DISC")?;
    pdf.title(&format!("Guía de Comunicación DISC – {}", ctx.client.full_name));
    pdf.paragraph(&ctx.date_line());
    pdf.heading(&format!("Categoría seleccionada: {}", category));
    pdf.paragraph(disc_description(category));

    let notes = ctx.answers.lines("notas");
    if !notes.is_empty() {
        pdf.heading("Observaciones del consultor:");
        pdf.bullets(&notes);
    }

    let path = ctx.output("comm_style", "pdf");
    pdf.save(&path)?;
    Ok(vec![GeneratedFile::new("comm_style", path)].into())
}

pub const ROUTE_FIELDS: &[FieldSpec] = &[FieldSpec::required(
    "fases",
    "Fases del proceso (fase -> {tips, notes})",
    FieldKind::Sections,
)];

/// One page per phase, in the order given
pub fn selection_route(ctx: &GenContext<'_>) -> Result<Artifacts, AppError> {
    let mut pdf = PdfReport::new("Ruta selección")?;
    pdf.title(&format!("Ruta de Proceso de Selección – {}", ctx.client.full_name));
    pdf.paragraph(&ctx.today.to_string());

    for (i, (phase, detail)) in ctx.answers.sections("fases").into_iter().enumerate() {
        if i > 0 {
            pdf.page_break();
        }
        pdf.heading(&format!("{}. {}", i + 1, phase));
        pdf.bullets(&detail.list("tips"));

        let notes = detail.text("notes");
        if !notes.is_empty() {
            pdf.paragraph("Notas / observaciones:");
            pdf.paragraph(&notes);
        }
    }

    let path = ctx.output("selection", "pdf");
    pdf.save(&path)?;
    Ok(vec![GeneratedFile::new("selection_route", path)].into())
}

pub const DISC_COMP_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("cat1", "Categoría principal", FieldKind::Choice(DISC_LETTERS)),
    FieldSpec::required("comp1", "Competencias (nombre -> definición)", FieldKind::Map),
    FieldSpec::optional("cat2", "Categoría secundaria", FieldKind::Choice(DISC_LETTERS)),
    FieldSpec::optional("comp2", "Competencias secundarias", FieldKind::Map),
];

fn competency_table(pdf: &mut PdfReport, category: &str, competencies: &[(String, String)]) {
    pdf.heading(&format!("Categoría DISC {}", category.to_uppercase()));
    for (name, definition) in competencies {
        pdf.key_value(name, definition);
    }
}

pub fn disc_competencies(ctx: &GenContext<'_>) -> Result<Artifacts, AppError> {
    let a = &ctx.answers;
    let mut pdf = PdfReport::new("Competencias DISC")?;
    pdf.title(&format!("Competencias DISC – {}", ctx.client.full_name));
    pdf.paragraph(&ctx.date_line());

    competency_table(&mut pdf, &a.text("cat1"), &a.entries("comp1"));
    let secondary = a.entries("comp2");
    if !secondary.is_empty() {
        competency_table(&mut pdf, &a.text("cat2"), &secondary);
    }

    let path = ctx.output("disc", "pdf");
    pdf.save(&path)?;
    Ok(vec![GeneratedFile::new("disc_competencies", path)].into())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::run;
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn unknown_levels_score_as_low() {
        assert_eq!(level_points("ALTO"), ("Alto", 3));
        assert_eq!(level_points("medio "), ("Medio", 2));
        assert_eq!(level_points("???"), ("Bajo", 1));
    }

    #[test]
    fn selection_route_puts_each_phase_on_its_own_page() {
        let dir = tempdir().unwrap();
        let out = run(
            "selection_route",
            json!({ "fases": {
                "Entrevista RRHH": { "tips": ["Investiga la empresa"], "notes": "Llevar CV impreso" },
                "Assessment": { "tips": [] },
                "Oferta": { "tips": "Negocia el salario" }
            }}),
            dir.path(),
        );
        let pages = crate::aggregate::pdf::page_count(&out.files[0].path).unwrap();
        assert_eq!(pages, 3);
    }

    #[test]
    fn interview_and_competency_reports_render() {
        let dir = tempdir().unwrap();
        run(
            "interview_report",
            json!({ "scores": { "Experiencia": "alto", "Soft skills": "Medio" }, "notes": "Buena actitud" }),
            dir.path(),
        );
        run(
            "disc_competencies",
            json!({ "cat1": "d", "comp1": { "Liderazgo": "Guía al equipo" }, "comp2": {} }),
            dir.path(),
        );
        run(
            "skill_matrix",
            json!({ "soft": { "Comunicación": "Expresa ideas con claridad" }, "hard": { "SQL": "Coursera" } }),
            dir.path(),
        );
    }

    #[test]
    fn comm_style_defaults_to_client_disc() {
        let dir = tempdir().unwrap();
        run("comm_style", json!({}), dir.path());
        run("comm_style", json!({ "categoria": "i", "notas": ["Usar ejemplos"] }), dir.path());
    }

    #[test]
    fn bad_level_is_rejected_by_schema() {
        let err = super::super::schema::validate(
            INTERVIEW_FIELDS,
            &json!({ "scores": { "Experiencia": "Excelente" } }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("must be one of Bajo, Medio, Alto"));
    }
}
