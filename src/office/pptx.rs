//! PPTX Decks
//!
//! Text-only presentations: every slide has a title and a list of paragraphs.
//! The package carries one blank layout, its master and a plain theme.

use std::path::Path;

use super::{write_package, XmlOut};
use crate::error::AppError;

const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const P_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

// 4:3 slide in EMU
const SLIDE_CX: i64 = 9_144_000;
const SLIDE_CY: i64 = 6_858_000;

#[derive(Debug, Clone)]
pub struct Slide {
    pub title: String,
    pub lines: Vec<String>,
}

impl Slide {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    pub fn line(mut self, text: impl Into<String>) -> Self {
        self.lines.push(text.into());
        self
    }

    pub fn lines<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(items.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct PptxDeck {
    slides: Vec<Slide>,
}

impl PptxDeck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        if self.slides.is_empty() {
            return Err(AppError::InvalidOperation(
                "a presentation needs at least one slide".to_string(),
            ));
        }

        let mut parts = vec![
            ("[Content_Types].xml".to_string(), self.content_types()?),
            ("_rels/.rels".to_string(), root_rels()?),
            ("ppt/presentation.xml".to_string(), self.presentation_xml()?),
            ("ppt/_rels/presentation.xml.rels".to_string(), self.presentation_rels()?),
            (
                "ppt/slideMasters/slideMaster1.xml".to_string(),
                SLIDE_MASTER.as_bytes().to_vec(),
            ),
            (
                "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
                rels(&[
                    ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                    ("rId2", "theme", "../theme/theme1.xml"),
                ])?,
            ),
            (
                "ppt/slideLayouts/slideLayout1.xml".to_string(),
                SLIDE_LAYOUT.as_bytes().to_vec(),
            ),
            (
                "ppt/slideLayouts/_rels/slideLayout1.xml.rels".to_string(),
                rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")])?,
            ),
            ("ppt/theme/theme1.xml".to_string(), THEME.as_bytes().to_vec()),
        ];

        for (i, slide) in self.slides.iter().enumerate() {
            parts.push((format!("ppt/slides/slide{}.xml", i + 1), slide_xml(slide)?));
            parts.push((
                format!("ppt/slides/_rels/slide{}.xml.rels", i + 1),
                rels(&[("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")])?,
            ));
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

        let mut overrides = vec![
            (
                "/ppt/presentation.xml".to_string(),
                "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml",
            ),
            (
                "/ppt/slideMasters/slideMaster1.xml".to_string(),
                "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml",
            ),
            (
                "/ppt/slideLayouts/slideLayout1.xml".to_string(),
                "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml",
            ),
            (
                "/ppt/theme/theme1.xml".to_string(),
                "application/vnd.openxmlformats-officedocument.theme+xml",
            ),
        ];
        for i in 0..self.slides.len() {
            overrides.push((
                format!("/ppt/slides/slide{}.xml", i + 1),
                "application/vnd.openxmlformats-officedocument.presentationml.slide+xml",
            ));
        }
        for (part, content_type) in &overrides {
            xml.empty("Override", &[("PartName", part), ("ContentType", content_type)])?;
        }

        xml.close("Types")?;
        Ok(xml.finish())
    }

    fn presentation_xml(&self) -> Result<Vec<u8>, AppError> {
        let mut xml = XmlOut::new()?;
        xml.open(
            "p:presentation",
            &[("xmlns:a", A_NS), ("xmlns:r", R_NS), ("xmlns:p", P_NS)],
        )?;

        xml.open("p:sldMasterIdLst", &[])?;
        xml.empty("p:sldMasterId", &[("id", "2147483648"), ("r:id", "rId1")])?;
        xml.close("p:sldMasterIdLst")?;

        xml.open("p:sldIdLst", &[])?;
        for i in 0..self.slides.len() {
            let id = (256 + i).to_string();
            let rid = format!("rId{}", i + 2);
            xml.empty("p:sldId", &[("id", &id), ("r:id", &rid)])?;
        }
        xml.close("p:sldIdLst")?;

        let cx = SLIDE_CX.to_string();
        let cy = SLIDE_CY.to_string();
        xml.empty("p:sldSz", &[("cx", &cx), ("cy", &cy), ("type", "screen4x3")])?;
        xml.empty("p:notesSz", &[("cx", &cy), ("cy", &cx)])?;

        xml.close("p:presentation")?;
        Ok(xml.finish())
    }

    fn presentation_rels(&self) -> Result<Vec<u8>, AppError> {
        let mut entries: Vec<(String, &str, String)> = vec![(
            "rId1".to_string(),
            "slideMaster",
            "slideMasters/slideMaster1.xml".to_string(),
        )];
        for i in 0..self.slides.len() {
            entries.push((
                format!("rId{}", i + 2),
                "slide",
                format!("slides/slide{}.xml", i + 1),
            ));
        }
        entries.push((
            format!("rId{}", self.slides.len() + 2),
            "theme",
            "theme/theme1.xml".to_string(),
        ));

        let borrowed: Vec<(&str, &str, &str)> = entries
            .iter()
            .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
            .collect();
        rels(&borrowed)
    }
}

fn root_rels() -> Result<Vec<u8>, AppError> {
    let mut xml = XmlOut::new()?;
    xml.open("Relationships", &[("xmlns", PKG_REL_NS)])?;
    let kind = format!("{}/officeDocument", REL_TYPE);
    xml.empty(
        "Relationship",
        &[("Id", "rId1"), ("Type", &kind), ("Target", "ppt/presentation.xml")],
    )?;
    xml.close("Relationships")?;
    Ok(xml.finish())
}

/// Part relationships as (id, relationship kind, target)
fn rels(entries: &[(&str, &str, &str)]) -> Result<Vec<u8>, AppError> {
    let mut xml = XmlOut::new()?;
    xml.open("Relationships", &[("xmlns", PKG_REL_NS)])?;
    for (id, kind, target) in entries {
        let kind = format!("{}/{}", REL_TYPE, kind);
        xml.empty("Relationship", &[("Id", id), ("Type", &kind), ("Target", target)])?;
    }
    xml.close("Relationships")?;
    Ok(xml.finish())
}

fn group_shape_header(xml: &mut XmlOut) -> Result<(), AppError> {
    xml.open("p:nvGrpSpPr", &[])?;
    xml.empty("p:cNvPr", &[("id", "1"), ("name", "")])?;
    xml.empty("p:cNvGrpSpPr", &[])?;
    xml.empty("p:nvPr", &[])?;
    xml.close("p:nvGrpSpPr")?;

    xml.open("p:grpSpPr", &[])?;
    xml.open("a:xfrm", &[])?;
    xml.empty("a:off", &[("x", "0"), ("y", "0")])?;
    xml.empty("a:ext", &[("cx", "0"), ("cy", "0")])?;
    xml.empty("a:chOff", &[("x", "0"), ("y", "0")])?;
    xml.empty("a:chExt", &[("cx", "0"), ("cy", "0")])?;
    xml.close("a:xfrm")?;
    xml.close("p:grpSpPr")
}

/// One text box: position and size in EMU, paragraphs with a shared run size.
fn text_box(
    xml: &mut XmlOut,
    id: &str,
    name: &str,
    (x, y, cx, cy): (i64, i64, i64, i64),
    paragraphs: &[String],
    size: &str,
    bold: bool,
) -> Result<(), AppError> {
    xml.open("p:sp", &[])?;
    xml.open("p:nvSpPr", &[])?;
    xml.empty("p:cNvPr", &[("id", id), ("name", name)])?;
    xml.empty("p:cNvSpPr", &[("txBox", "1")])?;
    xml.empty("p:nvPr", &[])?;
    xml.close("p:nvSpPr")?;

    let (x, y, cx, cy) = (x.to_string(), y.to_string(), cx.to_string(), cy.to_string());
    xml.open("p:spPr", &[])?;
    xml.open("a:xfrm", &[])?;
    xml.empty("a:off", &[("x", &x), ("y", &y)])?;
    xml.empty("a:ext", &[("cx", &cx), ("cy", &cy)])?;
    xml.close("a:xfrm")?;
    xml.open("a:prstGeom", &[("prst", "rect")])?;
    xml.empty("a:avLst", &[])?;
    xml.close("a:prstGeom")?;
    xml.close("p:spPr")?;

    xml.open("p:txBody", &[])?;
    xml.empty("a:bodyPr", &[("wrap", "square")])?;
    xml.empty("a:lstStyle", &[])?;
    for text in paragraphs {
        xml.open("a:p", &[])?;
        xml.open("a:r", &[])?;
        let mut attrs = vec![("lang", "es-ES"), ("sz", size)];
        if bold {
            attrs.push(("b", "1"));
        }
        xml.empty("a:rPr", &attrs)?;
        xml.leaf("a:t", &[], text)?;
        xml.close("a:r")?;
        xml.close("a:p")?;
    }
    xml.close("p:txBody")?;
    xml.close("p:sp")
}

fn slide_xml(slide: &Slide) -> Result<Vec<u8>, AppError> {
    let mut xml = XmlOut::new()?;
    xml.open("p:sld", &[("xmlns:a", A_NS), ("xmlns:r", R_NS), ("xmlns:p", P_NS)])?;
    xml.open("p:cSld", &[])?;
    xml.open("p:spTree", &[])?;
    group_shape_header(&mut xml)?;

    text_box(
        &mut xml,
        "2",
        "Title",
        (457_200, 274_638, 8_229_600, 1_143_000),
        std::slice::from_ref(&slide.title),
        "3200",
        true,
    )?;
    if !slide.lines.is_empty() {
        text_box(
            &mut xml,
            "3",
            "Body",
            (457_200, 1_600_200, 8_229_600, 4_800_600),
            &slide.lines,
            "1800",
            false,
        )?;
    }

    xml.close("p:spTree")?;
    xml.close("p:cSld")?;
    xml.open("p:clrMapOvr", &[])?;
    xml.empty("a:masterClrMapping", &[])?;
    xml.close("p:clrMapOvr")?;
    xml.close("p:sld")?;
    Ok(xml.finish())
}

const SLIDE_MASTER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#;

const SLIDE_LAYOUT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank" preserve="1"><p:cSld name="Blank"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#;

const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Plain"><a:themeElements><a:clrScheme name="Plain"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="1F2A44"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2><a:accent1><a:srgbClr val="2E75B6"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2><a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4><a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme><a:fontScheme name="Plain"><a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Plain"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::office::extract::extract_pptx_slides;
    use tempfile::tempdir;

    #[test]
    fn saved_deck_keeps_slide_order_and_text() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("sector.pptx");

        let mut deck = PptxDeck::new();
        deck.add_slide(Slide::new("Análisis de mercado").line("Sector: Fintech"));
        deck.add_slide(Slide::new("Tendencias").lines(["IA aplicada", "Open banking"]));
        deck.save(&out).unwrap();

        let slides = extract_pptx_slides(&out).unwrap();
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0], "Análisis de mercado Sector: Fintech");
        assert_eq!(slides[1], "Tendencias IA aplicada Open banking");
    }

    #[test]
    fn empty_deck_is_refused() {
        let dir = tempdir().unwrap();
        assert!(PptxDeck::new().save(&dir.path().join("x.pptx")).is_err());
    }
}
