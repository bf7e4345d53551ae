//! Page-level PDF concatenation with lopdf

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::AppError;

/// Attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfMerge {
    pub pages: usize,
    pub skipped: Vec<PathBuf>,
}

fn type_of(object: &Object) -> Option<&[u8]> {
    object.as_dict().ok()?.get(b"Type").ok()?.as_name().ok()
}

/// Copy inherited page-tree attributes onto the page so it survives re-parenting
fn inherit_attributes(doc: &Document, page: &mut Dictionary) {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(parent_id) = parent {
        let Ok(node) = doc.get_dictionary(parent_id) else {
            break;
        };
        for key in INHERITABLE {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }
        depth += 1;
        if depth > 64 {
            break;
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
}

/// Concatenate the pages of `sources` in order into `out`.
///
/// Missing sources are skipped. Returns `None` (and writes nothing) when no
/// source exists. Outlines are dropped.
pub fn merge_pdfs(sources: &[PathBuf], out: &Path) -> Result<Option<PdfMerge>, AppError> {
    let mut skipped = Vec::new();
    let mut max_id = 1;
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for path in sources {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "skipping missing PDF source");
            skipped.push(path.clone());
            continue;
        }

        let mut doc = Document::load(path)?;
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        for (_, page_id) in doc.get_pages() {
            let mut page = doc.get_dictionary(page_id)?.clone();
            inherit_attributes(&doc, &mut page);
            pages.push((page_id, page));
        }
        objects.extend(doc.objects);
    }

    if pages.is_empty() && objects.is_empty() {
        return Ok(None);
    }

    let mut document = Document::with_version("1.5");
    let mut catalog: Option<(ObjectId, Dictionary)> = None;
    let mut pages_root: Option<(ObjectId, Dictionary)> = None;

    for (object_id, object) in objects {
        let kind = type_of(&object).map(<[u8]>::to_vec);
        match kind.as_deref() {
            Some(b"Catalog") => {
                if catalog.is_none() {
                    if let Ok(dict) = object.as_dict() {
                        catalog = Some((object_id, dict.clone()));
                    }
                }
            }
            Some(b"Pages") => {
                if let Ok(dict) = object.as_dict() {
                    match pages_root.as_mut() {
                        Some((_, root)) => root.extend(dict),
                        None => pages_root = Some((object_id, dict.clone())),
                    }
                }
            }
            Some(b"Page") | Some(b"Outlines") | Some(b"Outline") => {}
            _ => {
                document.objects.insert(object_id, object);
            }
        }
    }

    let (catalog_id, mut catalog) = catalog
        .ok_or_else(|| AppError::InvalidOperation("PDF sources have no catalog".to_string()))?;
    let (pages_id, mut pages_root) = pages_root
        .ok_or_else(|| AppError::InvalidOperation("PDF sources have no page tree".to_string()))?;

    let page_count = pages.len();
    let kids: Vec<Object> = pages.iter().map(|(id, _)| Object::Reference(*id)).collect();
    for (page_id, mut page) in pages {
        page.set("Parent", pages_id);
        document.objects.insert(page_id, Object::Dictionary(page));
    }

    pages_root.set("Count", Object::Integer(page_count as i64));
    pages_root.set("Kids", kids);
    pages_root.remove(b"Parent");
    document.objects.insert(pages_id, Object::Dictionary(pages_root));

    catalog.set("Pages", pages_id);
    catalog.remove(b"Outlines");
    document.objects.insert(catalog_id, Object::Dictionary(catalog));

    document.trailer.set("Root", catalog_id);
    document.max_id = document.objects.keys().map(|(id, _)| *id).max().unwrap_or(0);
    document.renumber_objects();
    document.compress();
    document.save(out)?;

    Ok(Some(PdfMerge {
        pages: page_count,
        skipped,
    }))
}

/// Number of pages in a PDF file
pub fn page_count(path: &Path) -> Result<usize, AppError> {
    Ok(Document::load(path)?.get_pages().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::office::{PdfReport, Report};
    use tempfile::tempdir;

    fn sample_pdf(path: &Path, title: &str, pages: usize) {
        let mut report = PdfReport::new(title).unwrap();
        report.title(title);
        for _ in 1..pages {
            report.page_break();
            report.paragraph(title);
        }
        report.save(path).unwrap();
    }

    #[test]
    fn page_counts_add_up_in_order() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        sample_pdf(&a, "Marca", 2);
        sample_pdf(&b, "Networking", 3);
        let out = dir.path().join("merged.pdf");

        let merge = merge_pdfs(&[a, b], &out).unwrap().unwrap();
        assert_eq!(merge.pages, 5);
        assert!(merge.skipped.is_empty());
        assert_eq!(page_count(&out).unwrap(), 5);
    }

    #[test]
    fn missing_sources_are_skipped() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        sample_pdf(&a, "Marca", 1);
        let gone = dir.path().join("gone.pdf");
        let out = dir.path().join("merged.pdf");

        let merge = merge_pdfs(&[gone.clone(), a], &out).unwrap().unwrap();
        assert_eq!(merge.pages, 1);
        assert_eq!(merge.skipped, vec![gone]);
    }

    #[test]
    fn all_sources_missing_writes_nothing() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("merged.pdf");
        let merge = merge_pdfs(&[dir.path().join("x.pdf")], &out).unwrap();
        assert!(merge.is_none());
        assert!(!out.exists());
    }
}
