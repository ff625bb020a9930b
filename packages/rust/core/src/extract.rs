//! Candidate extraction: one scorable section per outline heading.
//!
//! A section spans from its heading's page up to, but not including, the page
//! of the next heading at the same or a shallower level. The last such section
//! runs to the document's last page.

use tracing::{debug, instrument};

use docintel_shared::{DocumentRecord, HeadingLevel};

/// A heading plus the text it governs.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionCandidate {
    /// Source document filename.
    pub document_filename: String,
    /// Position of the source document in the batch.
    pub document_index: usize,
    /// Position of the heading in its document's outline.
    pub ordinal: usize,
    /// Heading text.
    pub section_title: String,
    /// Heading level.
    pub level: HeadingLevel,
    /// Page the heading starts on.
    pub page_number: u32,
    /// Page text governed by the heading. May be empty.
    pub body_text: String,
}

/// Extract candidates from one document, in outline order.
///
/// A document with an empty outline yields no candidates.
pub fn extract_candidates(document: &DocumentRecord, document_index: usize) -> Vec<SectionCandidate> {
    let Some(last_page) = document.last_page() else {
        return Vec::new();
    };

    if document.outline.is_empty() {
        debug!(filename = %document.filename, "document has no outline, no candidates");
        return Vec::new();
    }

    document
        .outline
        .iter()
        .enumerate()
        .map(|(ordinal, heading)| {
            let end_page = document.outline[ordinal + 1..]
                .iter()
                .find(|next| next.level.is_same_or_shallower(heading.level))
                .map(|next| next.page);

            SectionCandidate {
                document_filename: document.filename.clone(),
                document_index,
                ordinal,
                section_title: heading.text.clone(),
                level: heading.level,
                page_number: heading.page,
                body_text: span_text(document, heading.page, end_page, last_page),
            }
        })
        .collect()
}

/// Extract candidates from every document, documents in batch order.
#[instrument(skip_all, fields(documents = documents.len()))]
pub fn extract_all(documents: &[DocumentRecord]) -> Vec<SectionCandidate> {
    let candidates: Vec<SectionCandidate> = documents
        .iter()
        .enumerate()
        .flat_map(|(index, doc)| extract_candidates(doc, index))
        .collect();

    debug!(candidates = candidates.len(), "candidates extracted");
    candidates
}

/// Join page text for pages `start..end` (or `start..=last_page` when `end` is `None`).
fn span_text(document: &DocumentRecord, start: u32, end: Option<u32>, last_page: u32) -> String {
    let end_inclusive = match end {
        Some(end) if end <= start => return String::new(),
        Some(end) => end - 1,
        None => last_page,
    };
    if start > end_inclusive {
        return String::new();
    }

    document
        .full_text
        .range(start..=end_inclusive)
        .map(|(_, text)| text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use docintel_shared::HeadingNode;

    fn make_doc(outline: &[(&str, HeadingLevel, u32)], pages: &[(u32, &str)]) -> DocumentRecord {
        let outline = outline
            .iter()
            .map(|(text, level, page)| HeadingNode::new(*text, *level, *page).unwrap())
            .collect();
        let full_text: BTreeMap<u32, String> =
            pages.iter().map(|(p, t)| (*p, t.to_string())).collect();
        DocumentRecord::new("guide.pdf", "Guide", outline, full_text).unwrap()
    }

    #[test]
    fn spans_stop_at_same_or_shallower_heading() {
        let doc = make_doc(
            &[
                ("Cities", HeadingLevel::H1, 1),
                ("Nice", HeadingLevel::H2, 2),
                ("Marseille", HeadingLevel::H2, 3),
                ("Cuisine", HeadingLevel::H1, 4),
            ],
            &[(1, "intro"), (2, "nice text"), (3, "marseille text"), (4, "food"), (5, "wine")],
        );

        let candidates = extract_candidates(&doc, 0);
        assert_eq!(candidates.len(), 4);
        // H1 "Cities" runs until the next H1 on page 4, across its H2 children.
        assert_eq!(candidates[0].body_text, "intro\n\nnice text\n\nmarseille text");
        assert_eq!(candidates[1].body_text, "nice text");
        // Marseille stops at the shallower Cuisine heading.
        assert_eq!(candidates[2].body_text, "marseille text");
        // Last section runs to the last page.
        assert_eq!(candidates[3].body_text, "food\n\nwine");
        assert_eq!(candidates[3].ordinal, 3);
    }

    #[test]
    fn heading_followed_on_same_page_has_empty_body() {
        let doc = make_doc(
            &[("Overview", HeadingLevel::H1, 2), ("Details", HeadingLevel::H1, 2)],
            &[(2, "all the text")],
        );
        let candidates = extract_candidates(&doc, 3);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].body_text, "");
        assert_eq!(candidates[1].body_text, "all the text");
        assert_eq!(candidates[1].document_index, 3);
    }

    #[test]
    fn empty_outline_yields_no_candidates() {
        let doc = make_doc(&[], &[(1, "text without headings")]);
        assert!(extract_candidates(&doc, 0).is_empty());
    }

    #[test]
    fn missing_pages_are_skipped() {
        let doc = make_doc(&[("Only", HeadingLevel::H1, 1)], &[(1, "a"), (3, " c ")]);
        let candidates = extract_candidates(&doc, 0);
        assert_eq!(candidates[0].body_text, "a\n\nc");
    }

    #[test]
    fn out_of_order_outline_gives_empty_body() {
        let doc = make_doc(
            &[("Late", HeadingLevel::H1, 5), ("Early", HeadingLevel::H1, 2)],
            &[(2, "two"), (5, "five")],
        );
        let candidates = extract_candidates(&doc, 0);
        assert_eq!(candidates[0].body_text, "");
        assert_eq!(candidates[1].body_text, "two\n\nfive");
    }

    #[test]
    fn extract_all_keeps_batch_order() {
        let a = make_doc(&[("A", HeadingLevel::H1, 1)], &[(1, "a")]);
        let b = make_doc(&[("B", HeadingLevel::H1, 1)], &[(1, "b")]);
        let candidates = extract_all(&[a, b]);
        assert_eq!(candidates[0].document_index, 0);
        assert_eq!(candidates[1].document_index, 1);
        assert!(extract_all(&[]).is_empty());
    }
}
