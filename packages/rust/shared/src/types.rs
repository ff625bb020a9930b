//! Core domain records shared by the processor, the analysis engine and the CLI.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DocIntelError, Result};

/// Deepest heading level accepted (`H6`).
pub const MAX_HEADING_DEPTH: u8 = 6;

// ---------------------------------------------------------------------------
// HeadingLevel
// ---------------------------------------------------------------------------

/// Outline depth of a heading. `H1` is the shallowest level.
///
/// Serialized as the string form (`"H1"`, `"H2"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    /// Top-level heading.
    pub const H1: HeadingLevel = HeadingLevel(1);
    /// Second-level heading.
    pub const H2: HeadingLevel = HeadingLevel(2);
    /// Third-level heading.
    pub const H3: HeadingLevel = HeadingLevel(3);

    /// Build a level from a 1-based depth, clamping anything deeper than `H6`.
    pub fn from_depth(depth: usize) -> Self {
        let clamped = depth.clamp(1, MAX_HEADING_DEPTH as usize);
        Self(clamped as u8)
    }

    /// True when `self` is at the same depth as `other` or shallower.
    pub fn is_same_or_shallower(self, other: HeadingLevel) -> bool {
        self.0 <= other.0
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.0)
    }
}

impl TryFrom<String> for HeadingLevel {
    type Error = DocIntelError;

    fn try_from(value: String) -> Result<Self> {
        let digits = value
            .trim()
            .strip_prefix(['H', 'h'])
            .ok_or_else(|| DocIntelError::validation(format!("invalid heading level '{value}'")))?;

        let depth: u8 = digits
            .parse()
            .map_err(|_| DocIntelError::validation(format!("invalid heading level '{value}'")))?;

        if depth == 0 || depth > MAX_HEADING_DEPTH {
            return Err(DocIntelError::validation(format!(
                "heading level '{value}' out of range H1..H{MAX_HEADING_DEPTH}"
            )));
        }

        Ok(Self(depth))
    }
}

impl From<HeadingLevel> for String {
    fn from(level: HeadingLevel) -> Self {
        level.to_string()
    }
}

// ---------------------------------------------------------------------------
// HeadingNode
// ---------------------------------------------------------------------------

/// A single outline entry. Position in [`DocumentRecord::outline`] is document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHeading")]
pub struct HeadingNode {
    /// Heading text as it appears in the outline.
    pub text: String,
    /// Outline depth.
    pub level: HeadingLevel,
    /// 1-based page the heading starts on.
    pub page: u32,
}

#[derive(Deserialize)]
struct RawHeading {
    text: String,
    level: HeadingLevel,
    page: u32,
}

impl TryFrom<RawHeading> for HeadingNode {
    type Error = DocIntelError;

    fn try_from(raw: RawHeading) -> Result<Self> {
        Self::new(raw.text, raw.level, raw.page)
    }
}

impl HeadingNode {
    /// Create a heading, rejecting page 0 (pages are 1-based).
    pub fn new(text: impl Into<String>, level: HeadingLevel, page: u32) -> Result<Self> {
        let text = text.into();
        if page == 0 {
            return Err(DocIntelError::validation(format!(
                "heading '{text}' has page 0; pages are 1-based"
            )));
        }
        Ok(Self {
            text: text.trim().to_string(),
            level,
            page,
        })
    }
}

// ---------------------------------------------------------------------------
// DocumentRecord
// ---------------------------------------------------------------------------

/// Extracted structure of one PDF: title, outline and per-page text.
///
/// Produced once per input file by the document processor and treated as
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDocument")]
pub struct DocumentRecord {
    /// File name as listed in the job input (e.g. `guide.pdf`).
    pub filename: String,
    /// Document title.
    pub title: String,
    /// Headings in document order.
    pub outline: Vec<HeadingNode>,
    /// Page number (1-based) to page text.
    pub full_text: BTreeMap<u32, String>,
}

#[derive(Deserialize)]
struct RawDocument {
    filename: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    outline: Vec<HeadingNode>,
    #[serde(default)]
    full_text: BTreeMap<u32, String>,
}

impl TryFrom<RawDocument> for DocumentRecord {
    type Error = DocIntelError;

    fn try_from(raw: RawDocument) -> Result<Self> {
        Self::new(raw.filename, raw.title, raw.outline, raw.full_text)
    }
}

impl DocumentRecord {
    /// Create a record, rejecting an empty filename or a page-0 text entry.
    pub fn new(
        filename: impl Into<String>,
        title: impl Into<String>,
        outline: Vec<HeadingNode>,
        full_text: BTreeMap<u32, String>,
    ) -> Result<Self> {
        let filename = filename.into();
        if filename.trim().is_empty() {
            return Err(DocIntelError::validation("document filename is empty"));
        }
        if full_text.contains_key(&0) {
            return Err(DocIntelError::validation(format!(
                "document '{filename}' has text for page 0; pages are 1-based"
            )));
        }
        Ok(Self {
            filename,
            title: title.into(),
            outline,
            full_text,
        })
    }

    /// Last page of the document: the highest page with text or referenced by a heading.
    pub fn last_page(&self) -> Option<u32> {
        let text_last = self.full_text.keys().next_back().copied();
        let outline_last = self.outline.iter().map(|h| h.page).max();
        text_last.max(outline_last)
    }

    /// Number of pages with extracted text.
    pub fn page_count(&self) -> usize {
        self.full_text.len()
    }
}

// ---------------------------------------------------------------------------
// PersonaTask
// ---------------------------------------------------------------------------

/// The declared reader role and the job they are trying to get done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaTask {
    /// Persona role (e.g. "Travel Planner").
    pub role: String,
    /// Job-to-be-done (e.g. "Plan a 4-day trip for 10 college friends").
    pub task: String,
}

impl PersonaTask {
    /// Pair a persona role with its job-to-be-done.
    pub fn new(role: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            task: task.into(),
        }
    }

    /// Free-text relevance query: role followed by task.
    pub fn query_text(&self) -> String {
        format!("{} {}", self.role, self.task)
    }
}

// ---------------------------------------------------------------------------
// Ranked output records
// ---------------------------------------------------------------------------

/// One entry of `extracted_sections` in the output artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedSection {
    /// Source document filename.
    pub document: String,
    /// Heading text of the section.
    pub section_title: String,
    /// 1-based dense rank; 1 is most relevant.
    pub importance_rank: u32,
    /// Page the section starts on.
    pub page_number: u32,
}

/// One entry of `subsection_analysis`, index-aligned with the ranked sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    /// Source document filename.
    pub document: String,
    /// Query-relevant excerpt of the section body.
    pub refined_text: String,
    /// Page the section starts on.
    pub page_number: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(entries: &[(u32, &str)]) -> BTreeMap<u32, String> {
        entries.iter().map(|(p, t)| (*p, t.to_string())).collect()
    }

    #[test]
    fn heading_level_parses_and_displays() {
        let level = HeadingLevel::try_from("H2".to_string()).expect("parse H2");
        assert_eq!(level, HeadingLevel::H2);
        assert_eq!(level.to_string(), "H2");
        assert_eq!(HeadingLevel::try_from("h3".to_string()).unwrap(), HeadingLevel::H3);

        assert!(HeadingLevel::try_from("H0".to_string()).is_err());
        assert!(HeadingLevel::try_from("H7".to_string()).is_err());
        assert!(HeadingLevel::try_from("Title".to_string()).is_err());
    }

    #[test]
    fn heading_level_ordering() {
        assert!(HeadingLevel::H1.is_same_or_shallower(HeadingLevel::H2));
        assert!(HeadingLevel::H2.is_same_or_shallower(HeadingLevel::H2));
        assert!(!HeadingLevel::H3.is_same_or_shallower(HeadingLevel::H2));
        assert_eq!(HeadingLevel::from_depth(0), HeadingLevel::H1);
        assert_eq!(HeadingLevel::from_depth(9).to_string(), format!("H{MAX_HEADING_DEPTH}"));
    }

    #[test]
    fn heading_rejects_page_zero() {
        assert!(HeadingNode::new("Intro", HeadingLevel::H1, 0).is_err());
        let h = HeadingNode::new("  Intro  ", HeadingLevel::H1, 1).expect("valid heading");
        assert_eq!(h.text, "Intro");
    }

    #[test]
    fn document_validation() {
        assert!(DocumentRecord::new("", "t", vec![], BTreeMap::new()).is_err());
        assert!(DocumentRecord::new("a.pdf", "t", vec![], pages(&[(0, "x")])).is_err());

        let doc = DocumentRecord::new(
            "a.pdf",
            "A",
            vec![HeadingNode::new("Later", HeadingLevel::H1, 7).unwrap()],
            pages(&[(1, "one"), (2, "two")]),
        )
        .expect("valid document");
        assert_eq!(doc.last_page(), Some(7));
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn document_deserialization_validates() {
        let json = r#"{
            "filename": "guide.pdf",
            "title": "Guide",
            "outline": [{"text": "Intro", "level": "H1", "page": 1}],
            "full_text": {"1": "Hello"}
        }"#;
        let doc: DocumentRecord = serde_json::from_str(json).expect("deserialize");
        assert_eq!(doc.outline[0].level, HeadingLevel::H1);
        assert_eq!(doc.full_text[&1], "Hello");

        let bad = r#"{"filename": "g.pdf", "outline": [{"text": "X", "level": "H1", "page": 0}]}"#;
        assert!(serde_json::from_str::<DocumentRecord>(bad).is_err());
    }

    #[test]
    fn persona_query_text() {
        let pt = PersonaTask::new("HR professional", "Create fillable forms");
        assert_eq!(pt.query_text(), "HR professional Create fillable forms");
    }
}
