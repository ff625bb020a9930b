//! Conversion of PDF bookmark entries into validated heading nodes.

use tracing::debug;

use docintel_shared::{HeadingLevel, HeadingNode};

use crate::text::collapse_whitespace;

/// A bookmark as read from the PDF outline tree, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutlineEntry {
    /// Nesting depth as reported by the reader (may start at 0 or 1).
    pub depth: usize,
    pub title: String,
    /// 1-based page; 0 when the destination could not be resolved.
    pub page: usize,
}

/// Build the heading outline from raw bookmark entries, preserving order.
///
/// Depths are rebased so the shallowest entry becomes `H1`. Entries with an
/// empty title or an unresolved page are dropped.
pub fn outline_from_entries(entries: &[RawOutlineEntry]) -> Vec<HeadingNode> {
    let Some(min_depth) = entries.iter().map(|e| e.depth).min() else {
        return Vec::new();
    };

    let mut outline = Vec::with_capacity(entries.len());
    for entry in entries {
        let text = collapse_whitespace(&entry.title);
        if text.is_empty() {
            debug!(page = entry.page, "skipping outline entry with empty title");
            continue;
        }

        let Ok(page) = u32::try_from(entry.page) else {
            debug!(%text, page = entry.page, "skipping outline entry with oversized page");
            continue;
        };

        let level = HeadingLevel::from_depth(entry.depth - min_depth + 1);
        match HeadingNode::new(text, level, page) {
            Ok(node) => outline.push(node),
            Err(e) => debug!(error = %e, "skipping invalid outline entry"),
        }
    }

    outline
}
