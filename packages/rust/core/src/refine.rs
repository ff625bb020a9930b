//! Subsection refinement: the most query-relevant excerpt of a section body.

use std::collections::BTreeSet;

use tracing::debug;

use docintel_shared::{PersonaTask, RankedSection, RefineConfig, ScoringConfig};

use crate::scoring::RelevanceScorer;
use crate::text::{split_chunks, truncate_at_word};

/// Builds excerpts for one persona/task pair.
#[derive(Debug, Clone)]
pub struct Refiner {
    scorer: RelevanceScorer,
    char_budget: usize,
}

impl Refiner {
    pub fn new(persona_task: &PersonaTask, refine: &RefineConfig, scoring: &ScoringConfig) -> Self {
        Self {
            scorer: RelevanceScorer::new(persona_task, scoring.clone()),
            char_budget: refine.char_budget,
        }
    }

    /// Excerpt of `body` no longer than the character budget.
    ///
    /// Bodies that already fit are returned trimmed but otherwise verbatim.
    /// Longer bodies are split into sentence chunks; the best-scoring chunks
    /// that fit are kept and joined in their original order.
    pub fn refine_body(&self, body: &str) -> String {
        let chunks = split_chunks(body);
        if chunks.is_empty() || self.char_budget == 0 {
            return String::new();
        }

        let trimmed = body.trim();
        if trimmed.chars().count() <= self.char_budget {
            return trimmed.to_string();
        }

        let scores: Vec<f64> = chunks
            .iter()
            .map(|chunk| self.scorer.score_text("", chunk).score)
            .collect();

        let mut by_relevance: Vec<usize> = (0..chunks.len()).collect();
        by_relevance.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));

        let mut selected = BTreeSet::new();
        let mut used = 0usize;
        for &idx in &by_relevance {
            let len = chunks[idx].chars().count();
            let needed = if selected.is_empty() { len } else { len + 1 };
            if used + needed <= self.char_budget {
                selected.insert(idx);
                used += needed;
            }
        }

        if selected.is_empty() {
            // Even the best chunk is over budget on its own.
            return truncate_at_word(&chunks[by_relevance[0]], self.char_budget);
        }

        selected
            .into_iter()
            .map(|idx| chunks[idx].as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Refined text for a ranked section.
pub fn refine(
    section: &RankedSection,
    body: &str,
    persona_task: &PersonaTask,
    refine: &RefineConfig,
    scoring: &ScoringConfig,
) -> String {
    let text = Refiner::new(persona_task, refine, scoring).refine_body(body);
    debug!(
        document = %section.document,
        page = section.page_number,
        body_chars = body.chars().count(),
        excerpt_chars = text.chars().count(),
        "section refined"
    );
    text
}
