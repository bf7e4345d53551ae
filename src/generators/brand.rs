//! Diagnosis & brand documents

use std::fs;

use serde_json::{json, Map, Value};

use super::schema::{FieldKind, FieldSpec};
use super::selection::disc_description;
use super::{Artifacts, GenContext, GeneratedFile};
use crate::error::AppError;
use crate::office::pptx::{PptxDeck, Slide};
use crate::office::{PdfReport, Report};

pub const CANVAS_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("proposito", "Propósito profesional", FieldKind::Text),
    FieldSpec::required("objetivos", "Objetivos a 12 meses", FieldKind::Text),
    FieldSpec::required("audiencia", "Audiencia", FieldKind::Text),
    FieldSpec::required("propuesta_valor", "Propuesta de valor", FieldKind::Text),
    FieldSpec::optional("logros", "Logros cuantificables", FieldKind::Text),
    FieldSpec::optional("pasiones", "Temas que apasionan", FieldKind::Text),
    FieldSpec::optional("tonalidad", "Tono a proyectar", FieldKind::Text),
];

pub fn brand_canvas(ctx: &GenContext<'_>) -> Result<Artifacts, AppError> {
    let client = ctx.client;

    let mut record = Map::new();
    record.insert("client_id".to_string(), json!(client.id));
    record.insert("date".to_string(), json!(ctx.today.to_string()));
    for spec in CANVAS_FIELDS {
        record.insert(spec.key.to_string(), Value::String(ctx.answers.text(spec.key)));
    }
    let json_path = ctx.output("canvas", "json");
    fs::write(&json_path, serde_json::to_string_pretty(&Value::Object(record))?)?;

    let mut pdf = PdfReport::new("BrandCanvas")?;
    pdf.title(&format!("BrandCanvas · {}", client.full_name));
    pdf.paragraph(&ctx.date_line());
    for spec in CANVAS_FIELDS {
        let value = ctx.answers.text(spec.key);
        if value.is_empty() {
            continue;
        }
        pdf.heading(spec.label);
        pdf.paragraph(&value);
    }
    let pdf_path = ctx.output("canvas", "pdf");
    pdf.save(&pdf_path)?;

    Ok(vec![
        GeneratedFile::new("brand_canvas", pdf_path),
        GeneratedFile::new("brand_canvas_json", json_path),
    ]
    .into())
}

pub const STRATEGY_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("proposito", "Propósito", FieldKind::Text),
    FieldSpec::required("objetivos", "Objetivos (6-12 m)", FieldKind::Text),
    FieldSpec::required("audiencia", "Audiencia", FieldKind::Text),
    FieldSpec::required("pvu", "Propuesta de valor", FieldKind::Text),
    FieldSpec::optional("disc", "Diferenciadores DISC", FieldKind::Text),
];

pub fn brand_strategy(ctx: &GenContext<'_>) -> Result<Artifacts, AppError> {
    let a = &ctx.answers;
    let mut pdf = PdfReport::new("Estrategia de marca")?;
    pdf.title(&format!("Estrategia de Marca Personal – {}", ctx.client.full_name));
    pdf.paragraph(&ctx.date_line());

    pdf.heading("Propósito");
    pdf.paragraph(&a.text("proposito"));
    pdf.heading("Objetivos (6-12 m)");
    pdf.bullets(&a.lines("objetivos"));
    pdf.heading("Audiencia");
    pdf.paragraph(&a.text("audiencia"));
    pdf.heading("Propuesta de valor");
    pdf.paragraph(&a.text("pvu"));

    pdf.heading("Diferenciadores DISC");
    let disc = a.text("disc");
    if disc.is_empty() {
        pdf.paragraph(&format!(
            "Perfil {}: {}",
            ctx.client.disc_type,
            disc_description(ctx.client.disc_type)
        ));
    } else {
        pdf.paragraph(&disc);
    }

    pdf.heading("Timeline sugerido");
    pdf.bullets(&[
        "Fase 1 (Mes 1-2): visibilidad".to_string(),
        "Fase 2 (Mes 3-4): autoridad".to_string(),
        "Fase 3 (Mes 5-6): posicionamiento avanzado".to_string(),
    ]);

    let path = ctx.output("strategy", "pdf");
    pdf.save(&path)?;
    Ok(vec![GeneratedFile::new("brand_strategy", path)].into())
}

pub const NETWORKING_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("meta", "Meta de conexiones nuevas", FieldKind::Number),
    FieldSpec::required("tipos", "Tipos de contacto", FieldKind::List),
    FieldSpec::required("mensaje", "Mensaje base de invitación", FieldKind::Text),
    FieldSpec::required("tiempo", "Tiempo diario disponible (min)", FieldKind::Number),
];

fn whole(n: Option<f64>) -> String {
    let n = n.unwrap_or(0.0);
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

pub fn networking_plan(ctx: &GenContext<'_>) -> Result<Artifacts, AppError> {
    let a = &ctx.answers;
    let mut pdf = PdfReport::new("Plan de networking")?;
    pdf.title(&format!("Plan de Networking – {}", ctx.client.full_name));
    pdf.paragraph(&ctx.date_line());

    pdf.key_value("Meta conexiones nuevas", &whole(a.number("meta")));
    pdf.key_value("Tipos de contacto", &a.list("tipos").join(", "));
    pdf.key_value("Tiempo diario disponible (min)", &whole(a.number("tiempo")));

    pdf.heading("Mensaje base de invitación");
    pdf.paragraph(&a.text("mensaje"));

    pdf.heading("Checklist diario");
    pdf.bullets(&[
        "Buscar contactos".to_string(),
        "Personalizar mensaje".to_string(),
        "Registrar seguimiento".to_string(),
    ]);

    let path = ctx.output("networking", "pdf");
    pdf.save(&path)?;
    Ok(vec![GeneratedFile::new("networking_plan", path)].into())
}

pub const IMAGE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("sector", "Sector", FieldKind::Text),
    FieldSpec::optional("colores", "Colores recomendados", FieldKind::Text),
    FieldSpec::optional("accesorios", "Accesorios", FieldKind::Text),
    FieldSpec::optional("foto_res", "Resolución", FieldKind::Text),
    FieldSpec::optional("foto_plano", "Plano", FieldKind::Text),
    FieldSpec::optional("foto_fondo", "Fondo", FieldKind::Text),
    FieldSpec::optional("foto_luz", "Iluminación", FieldKind::Text),
    FieldSpec::optional("banner_msg", "Mensaje del banner", FieldKind::Text),
    FieldSpec::optional("tipografia", "Tipografía", FieldKind::Text),
    FieldSpec::optional("paleta_hex", "Paleta", FieldKind::Text),
    FieldSpec::optional("logo", "¿Logo personal?", FieldKind::Text),
];

pub fn image_guidelines(ctx: &GenContext<'_>) -> Result<Artifacts, AppError> {
    let a = &ctx.answers;
    let mut pdf = PdfReport::new("Guía de imagen")?;
    pdf.title(&format!("Guía de Imagen Profesional – {}", ctx.client.full_name));
    pdf.paragraph(&ctx.date_line());

    let sections: [(&str, &[(&str, &str)]); 2] = [
        (
            "Vestimenta",
            &[
                ("Sector", "sector"),
                ("Colores recomendados", "colores"),
                ("Accesorios", "accesorios"),
            ],
        ),
        (
            "Foto Profesional",
            &[
                ("Resolución", "foto_res"),
                ("Plano", "foto_plano"),
                ("Fondo", "foto_fondo"),
                ("Iluminación", "foto_luz"),
            ],
        ),
    ];
    for (heading, rows) in sections {
        pdf.heading(heading);
        for (label, key) in rows {
            pdf.key_value(label, &a.text(key));
        }
    }

    pdf.heading("Banner de LinkedIn");
    pdf.paragraph(&format!("Mensaje visual sugerido: {}", a.text("banner_msg")));

    pdf.heading("Consistencia visual");
    pdf.key_value("Tipografía", &a.text("tipografia"));
    pdf.key_value("Paleta", &a.text("paleta_hex"));
    pdf.key_value("¿Logo personal?", &a.text("logo"));

    let path = ctx.output("image", "pdf");
    pdf.save(&path)?;
    Ok(vec![GeneratedFile::new("image_guidelines", path)].into())
}

pub fn linkedin_networking(ctx: &GenContext<'_>) -> Result<Artifacts, AppError> {
    let mut deck = PptxDeck::new();
    deck.add_slide(
        Slide::new("Networking en LinkedIn").line(format!("Guía para {}", ctx.client.full_name)),
    );
    deck.add_slide(Slide::new("Optimiza tu Perfil").lines([
        "Foto profesional",
        "Titular con PROBLEMA + RESULTADO",
        "About orientado a tu oferta de valor",
    ]));
    deck.add_slide(Slide::new("Búsquedas Avanzadas").lines([
        "Filtros por industria y cargo",
        "Guardar búsquedas",
        "Crear alertas",
    ]));
    deck.add_slide(Slide::new("Mensajes de Contacto en Frío").lines([
        "Ejemplo:",
        "Hola {{nombre}}, vi que lideras {{equipo}} en {{empresa}} …",
    ]));

    let path = ctx.output("networking_linkedin", "pptx");
    deck.save(&path)?;
    Ok(vec![GeneratedFile::new("linkedin_networking", path)].into())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::run;
    use crate::office::extract::extract_pptx_slides;
    use serde_json::{json, Value};
    use tempfile::tempdir;

    #[test]
    fn brand_canvas_writes_pdf_and_json() {
        let dir = tempdir().unwrap();
        let out = run(
            "brand_canvas",
            json!({
                "proposito": "Ayudar a pymes a decidir con datos",
                "objetivos": "Liderar un equipo de BI",
                "audiencia": "Directores financieros",
                "propuesta_valor": "Traduzco datos en decisiones"
            }),
            dir.path(),
        );

        assert_eq!(out.files[0].doc_type, "brand_canvas");
        assert_eq!(out.files[1].doc_type, "brand_canvas_json");
        let saved: Value =
            serde_json::from_str(&std::fs::read_to_string(&out.files[1].path).unwrap()).unwrap();
        assert_eq!(saved["client_id"], 1);
        assert_eq!(saved["date"], "2024-05-15");
        assert_eq!(saved["audiencia"], "Directores financieros");
    }

    #[test]
    fn brand_strategy_without_disc_notes() {
        let dir = tempdir().unwrap();
        run(
            "brand_strategy",
            json!({ "proposito": "p", "objetivos": "uno\ndos", "audiencia": "a", "pvu": "v" }),
            dir.path(),
        );
    }

    #[test]
    fn networking_and_image_guides() {
        let dir = tempdir().unwrap();
        run(
            "networking_plan",
            json!({ "meta": 30, "tipos": ["Reclutadores"], "mensaje": "Hola", "tiempo": "20" }),
            dir.path(),
        );
        run("image_guidelines", json!({ "sector": "Banca", "logo": "No" }), dir.path());
    }

    #[test]
    fn linkedin_networking_deck_has_four_slides() {
        let dir = tempdir().unwrap();
        let out = run("linkedin_networking", json!({}), dir.path());
        let slides = extract_pptx_slides(&out.files[0].path).unwrap();
        assert_eq!(slides.len(), 4);
        assert!(slides[0].contains("Guía para Ana Ruiz"));
    }
}
