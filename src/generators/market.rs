//! Market research, content calendar and KPI documents

use chrono::{Datelike, Duration, NaiveDate};

use super::schema::{FieldKind, FieldSpec};
use super::{Artifacts, GenContext, GeneratedFile};
use crate::error::AppError;
use crate::office::pptx::{PptxDeck, Slide};
use crate::office::xlsx::{CellValue, XlsxWorkbook};
use crate::office::{DocxReport, Report};

pub const SECTOR_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("sector", "Sector", FieldKind::Text),
    FieldSpec::required("region", "Región", FieldKind::Text),
    FieldSpec::optional("empresas", "Empresas clave", FieldKind::Text),
    FieldSpec::optional("roles", "Roles más demandados", FieldKind::Text),
    FieldSpec::optional("hards", "Habilidades técnicas top", FieldKind::Text),
    FieldSpec::optional("softs", "Soft skills top", FieldKind::Text),
    FieldSpec::optional("tendencias", "Tendencias", FieldKind::Text),
    FieldSpec::optional("retos", "Retos / pain-points", FieldKind::Text),
    FieldSpec::optional("salarios", "Rangos salariales", FieldKind::Text),
];

/// Numbers in a line, in order ("40-55k" -> [40, 55])
fn numbers_in(line: &str) -> Vec<f64> {
    let mut found = Vec::new();
    let mut current = String::new();
    for ch in line.chars().chain(std::iter::once(' ')) {
        if ch.is_ascii_digit() || (ch == '.' && !current.is_empty() && !current.contains('.')) {
            current.push(ch);
        } else if !current.is_empty() {
            if let Ok(n) = current.trim_end_matches('.').parse() {
                found.push(n);
            }
            current.clear();
        }
    }
    found
}

/// Parse lines like `Senior 40-55k` into (label, midpoint).
/// The label is the first word; a single number is used as is; lines
/// without numbers are dropped.
pub(crate) fn parse_salary_lines(text: &str) -> Vec<(String, f64)> {
    text.lines()
        .filter_map(|line| {
            let label = line.split_whitespace().next()?;
            let nums = numbers_in(line);
            let value = match nums.as_slice() {
                [] => return None,
                [only] => *only,
                [a, b, ..] => (a + b) / 2.0,
            };
            Some((label.to_string(), value))
        })
        .collect()
}

fn format_amount(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{:.1}", n)
    }
}

pub fn sector_market(ctx: &GenContext<'_>) -> Result<Artifacts, AppError> {
    let a = &ctx.answers;
    let mut deck = PptxDeck::new();

    deck.add_slide(
        Slide::new(format!("Sector & Mercado – {}", ctx.client.full_name))
            .line(format!("{} · {}", a.text("sector"), a.text("region")))
            .line(ctx.today.to_string()),
    );

    let sections = [
        ("Empresas y Roles demandados", ("Empresas clave", "empresas"), ("Roles más demandados", "roles")),
        ("Habilidades & Salarios", ("Habilidades técnicas top", "hards"), ("Soft skills top", "softs")),
        ("Tendencias y Retos", ("Tendencias", "tendencias"), ("Retos / pain-points", "retos")),
    ];
    for (title, (first_label, first_key), (second_label, second_key)) in sections {
        let slide = Slide::new(title)
            .line(first_label)
            .lines(a.lines(first_key).into_iter().map(|l| format!("• {}", l)))
            .line(second_label)
            .lines(a.lines(second_key).into_iter().map(|l| format!("• {}", l)));
        deck.add_slide(slide);
    }

    let salaries = parse_salary_lines(&a.text("salarios"));
    if !salaries.is_empty() {
        let peak = salaries.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
        let bars = salaries.iter().map(|(label, value)| {
            let width = if peak > 0.0 {
                ((value / peak) * 20.0).round() as usize
            } else {
                0
            };
            format!("{:<10} {} {}", label, "█".repeat(width.max(1)), format_amount(*value))
        });
        deck.add_slide(
            Slide::new("Comparativa de rangos salariales")
                .line("Salario medio")
                .lines(bars),
        );
    }

    let path = ctx.output("sector", "pptx");
    deck.save(&path)?;
    Ok(vec![GeneratedFile::new("sector_market", path)].into())
}

pub const CONTENT_PLAN_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("pilares", "Pilares de contenido", FieldKind::List),
    FieldSpec::required("freq", "Publicaciones por semana", FieldKind::Number),
    FieldSpec::required("formatos", "Formatos permitidos", FieldKind::List),
    FieldSpec::required("semanas", "Duración (semanas)", FieldKind::Number),
];

const HOOKS: [&str; 5] = [
    "¿Sabías que…?",
    "Tip rápido:",
    "Historia personal:",
    "Dato revelador:",
    "Pregunta al público:",
];
const CTAS: [&str; 3] = [
    "Comenta tu experiencia.",
    "Guarda este post.",
    "Compártelo con tu red.",
];

/// Monday of the week containing `day`, shifted `weeks` forward
fn week_start(day: NaiveDate, weeks: i64) -> NaiveDate {
    let monday = day - Duration::days(day.weekday().num_days_from_monday() as i64);
    monday + Duration::weeks(weeks)
}

fn positive_count(value: Option<f64>, label: &str) -> Result<usize, AppError> {
    match value {
        Some(n) if n >= 1.0 => Ok(n as usize),
        _ => Err(AppError::Validation(format!("{} must be at least 1", label))),
    }
}

/// Calendar rows: (date, pillar, format, hook, copy). Only the first week
/// carries example hooks and copy.
pub(crate) fn calendar_rows(
    today: NaiveDate,
    pillars: &[String],
    formats: &[String],
    per_week: usize,
    weeks: usize,
) -> Vec<[String; 5]> {
    let mut rows = Vec::with_capacity(per_week * weeks);
    for w in 0..weeks {
        let monday = week_start(today, w as i64);
        for i in 0..per_week {
            let date = monday + Duration::days((i % 5) as i64);
            let pillar = &pillars[i % pillars.len()];
            let format = &formats[i % formats.len()];
            let (hook, copy) = if w == 0 {
                (
                    format!("{} ({})", HOOKS[i % HOOKS.len()], pillar),
                    format!(
                        "Desarrollo del tema sobre {}. {}",
                        pillar.to_lowercase(),
                        CTAS[i % CTAS.len()]
                    ),
                )
            } else {
                (String::new(), String::new())
            };
            rows.push([date.to_string(), pillar.clone(), format.clone(), hook, copy]);
        }
    }
    rows
}

pub fn content_plan(ctx: &GenContext<'_>) -> Result<Artifacts, AppError> {
    let a = &ctx.answers;
    let pillars = a.list("pilares");
    let formats = a.list("formatos");
    let per_week = positive_count(a.number("freq"), "freq")?;
    let weeks = positive_count(a.number("semanas"), "semanas")?;

    let mut doc = DocxReport::new();
    doc.title(&format!("Parrilla de Contenidos – {}", ctx.client.full_name));
    doc.paragraph(&format!("Pilares: {}", pillars.join(", ")));
    doc.paragraph(&format!("Frecuencia: {} publicaciones / semana", per_week));
    doc.paragraph(&format!("Formatos permitidos: {}", formats.join(", ")));
    doc.paragraph(&format!("Duración piloto: {} semanas", weeks));
    let docx_path = ctx.output("plan", "docx");
    doc.save(&docx_path)?;

    let mut book = XlsxWorkbook::new();
    let sheet = book.add_sheet("Calendario");
    sheet.push_row(
        ["Fecha", "Pilar", "Formato", "Hook / Título", "Idea / Copy (CTA)"]
            .into_iter()
            .map(CellValue::from)
            .collect(),
    );
    for row in calendar_rows(ctx.today, &pillars, &formats, per_week, weeks) {
        sheet.push_row(row.into_iter().map(CellValue::from).collect());
    }
    let xlsx_path = ctx.output("plan", "xlsx");
    book.save(&xlsx_path)?;

    Ok(vec![
        GeneratedFile::new("content_plan_docx", docx_path),
        GeneratedFile::new("content_plan_xlsx", xlsx_path),
    ]
    .into())
}

pub const KPI_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("actual", "Valores actuales", FieldKind::NumberMap),
    FieldSpec::optional("metas", "Metas", FieldKind::NumberMap),
];

pub const INDICATORS: [&str; 7] = [
    "SSI",
    "Visitantes perfil / semana",
    "Número de contactos",
    "Tasa aceptación invitaciones",
    "Impresiones contenido / semana",
    "Interacciones / semana",
    "InMail respondidos",
];

pub fn linkedin_kpis(ctx: &GenContext<'_>) -> Result<Artifacts, AppError> {
    let current = ctx.answers.number_entries("actual");
    let targets = ctx.answers.number_entries("metas");
    let lookup = |entries: &[(String, f64)], name: &str| {
        entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| *v)
            .unwrap_or(0.0)
    };

    for (name, _) in current.iter().chain(targets.iter()) {
        if !INDICATORS.contains(&name.as_str()) {
            tracing::warn!(indicator = %name, "ignoring unknown KPI indicator");
        }
    }

    let mut book = XlsxWorkbook::new();
    let sheet = book.add_sheet("KPIs LinkedIn");
    sheet.push_row(
        ["Indicador", "Actual", "Meta", "% progreso"]
            .into_iter()
            .map(CellValue::from)
            .collect(),
    );
    for indicator in INDICATORS {
        let row = sheet.next_row_number();
        let target = match lookup(&targets, indicator) {
            t if t == 0.0 => 1.0,
            t => t,
        };
        sheet.push_row(vec![
            indicator.into(),
            lookup(&current, indicator).into(),
            target.into(),
            CellValue::Formula(format!("B{}/C{}", row, row)),
        ]);
    }

    let path = ctx.output("kpis", "xlsx");
    book.save(&path)?;
    Ok(vec![GeneratedFile::new("linkedin_kpis", path)].into())
}
