use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Document, Object};
use tracing::{debug, instrument, warn};

use docintel_shared::{DocIntelError, DocumentRecord, HeadingLevel, HeadingNode, Result};

use crate::DocumentProcessor;
use crate::outline::{RawOutlineEntry, outline_from_entries};
use crate::text::{clean_page_text, collapse_whitespace, decode_pdf_string};

/// Pure-Rust [`DocumentProcessor`] backed by `lopdf`.
///
/// Outline comes from the PDF bookmark tree; a PDF without bookmarks yields an
/// empty outline (and therefore no scorable sections), which is not an error.
#[derive(Debug, Default, Clone)]
pub struct LopdfProcessor;

impl LopdfProcessor {
    /// Create a processor. It holds no state; one instance can serve every worker.
    pub fn new() -> Self {
        Self
    }
}

impl DocumentProcessor for LopdfProcessor {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    fn process(&self, path: &Path) -> Result<DocumentRecord> {
        let document = Document::load(path)
            .map_err(|e| DocIntelError::pdf(format!("{}: {e}", path.display())))?;

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| DocIntelError::validation(format!("'{}' has no file name", path.display())))?;

        let full_text = extract_pages(&document);
        let outline = extract_outline(&document, &filename);
        let title = info_title(&document)
            .or_else(|| first_top_level_heading(&outline))
            .unwrap_or_else(|| file_stem(path));

        debug!(
            %filename,
            %title,
            pages = full_text.len(),
            headings = outline.len(),
            "pdf processed"
        );

        DocumentRecord::new(filename, title, outline, full_text)
    }
}

/// Extract and clean the text of every page. Pages that fail extraction are kept empty.
fn extract_pages(document: &Document) -> BTreeMap<u32, String> {
    document
        .get_pages()
        .keys()
        .map(|&page_no| {
            let text = match document.extract_text(&[page_no]) {
                Ok(raw) => clean_page_text(&raw),
                Err(e) => {
                    debug!(page = page_no, error = %e, "text extraction failed for page");
                    String::new()
                }
            };
            (page_no, text)
        })
        .collect()
}

/// Read the bookmark tree. A PDF without bookmarks yields an empty outline
/// and contributes no sections.
fn extract_outline(document: &Document, filename: &str) -> Vec<HeadingNode> {
    let outline = match document.get_toc() {
        Ok(toc) => {
            for err in &toc.errors {
                debug!(error = %err, "outline warning");
            }
            let entries: Vec<RawOutlineEntry> = toc
                .toc
                .iter()
                .map(|item| RawOutlineEntry {
                    depth: item.level,
                    title: item.title.clone(),
                    page: item.page,
                })
                .collect();
            outline_from_entries(&entries)
        }
        Err(e) => {
            debug!(error = %e, "no readable outline");
            Vec::new()
        }
    };

    if outline.is_empty() {
        warn!(%filename, "pdf has no bookmarks, it will contribute no sections");
    }
    outline
}

/// `Title` from the document information dictionary, if present and non-empty.
fn info_title(document: &Document) -> Option<String> {
    let info = match document.trailer.get(b"Info").ok()? {
        Object::Reference(id) => document.get_dictionary(*id).ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };

    let raw = info.get(b"Title").ok()?.as_str().ok()?;
    let title = collapse_whitespace(&decode_pdf_string(raw));
    (!title.is_empty()).then_some(title)
}

fn first_top_level_heading(outline: &[HeadingNode]) -> Option<String> {
    outline
        .iter()
        .find(|h| h.level == HeadingLevel::H1)
        .map(|h| h.text.clone())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default()
}
