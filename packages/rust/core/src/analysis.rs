//! The analysis engine's public entry points: [`analyze`] and [`rank`].
//!
//! Both are pure functions of their inputs. Calling them twice with the same
//! arguments yields identical output.

use tracing::{debug, info, instrument};

use docintel_shared::{
    DocumentRecord, PersonaTask, RankedSection, RefineConfig, ScoringConfig, SubsectionAnalysis,
};

use crate::extract::extract_all;
use crate::ranker::{select, select_top};
use crate::refine::refine;
use crate::scoring::{RelevanceScorer, ScoredCandidate};

/// Extract, score and select the `max_results` most relevant sections.
///
/// The result is sorted by rank order. Zero documents, zero candidates or a
/// zero `max_results` all produce an empty list.
#[instrument(skip_all, fields(documents = documents.len(), max_results))]
pub fn analyze(
    documents: &[DocumentRecord],
    persona_task: &PersonaTask,
    max_results: usize,
    scoring: &ScoringConfig,
) -> Vec<ScoredCandidate> {
    let candidates = extract_all(documents);
    let scorer = RelevanceScorer::new(persona_task, scoring.clone());

    if scorer.query().is_empty() {
        debug!("persona and task have no usable terms, every candidate scores 0");
    }

    let scored: Vec<ScoredCandidate> = candidates.iter().map(|c| scorer.score(c)).collect();
    let selected = select_top(scored, max_results);

    info!(
        candidates = candidates.len(),
        selected = selected.len(),
        "relevance analysis complete"
    );

    selected
}

/// Assign dense ranks and build the index-aligned subsection excerpts.
///
/// `scored` is re-sorted with the ranking order, so callers may pass it in
/// any order.
#[instrument(skip_all, fields(sections = scored.len()))]
pub fn rank(
    scored: &[ScoredCandidate],
    persona_task: &PersonaTask,
    refine_config: &RefineConfig,
    scoring: &ScoringConfig,
) -> (Vec<RankedSection>, Vec<SubsectionAnalysis>) {
    // Both lists come from the same total order, so they stay index-aligned.
    let ordered = select_top(scored.to_vec(), scored.len());
    let sections = select(ordered.clone(), ordered.len());

    let subsections = sections
        .iter()
        .zip(&ordered)
        .map(|(section, sc)| {
            debug!(
                rank = section.importance_rank,
                score = sc.relevance_score,
                level = %sc.candidate.level,
                document = %section.document,
                title = %section.section_title,
                "section ranked"
            );
            SubsectionAnalysis {
                document: section.document.clone(),
                refined_text: refine(
                    section,
                    &sc.candidate.body_text,
                    persona_task,
                    refine_config,
                    scoring,
                ),
                page_number: section.page_number,
            }
        })
        .collect();

    (sections, subsections)
}
