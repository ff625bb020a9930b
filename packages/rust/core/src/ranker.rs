//! Selection and dense ranking of scored candidates.

use std::cmp::Ordering;

use tracing::debug;

use docintel_shared::RankedSection;

use crate::scoring::ScoredCandidate;

/// Total order used for ranking.
///
/// Higher score first. Ties go to the earlier document in the batch, then the
/// earlier page, then the earlier heading, then the lexicographically smaller
/// filename. Nothing depends on input or completion order.
pub fn compare_ranked(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.relevance_score
        .total_cmp(&a.relevance_score)
        .then_with(|| a.candidate.document_index.cmp(&b.candidate.document_index))
        .then_with(|| a.candidate.page_number.cmp(&b.candidate.page_number))
        .then_with(|| a.candidate.ordinal.cmp(&b.candidate.ordinal))
        .then_with(|| {
            a.candidate
                .document_filename
                .cmp(&b.candidate.document_filename)
        })
}

/// Sort by [`compare_ranked`] and keep the first `max_results`.
pub fn select_top(mut scored: Vec<ScoredCandidate>, max_results: usize) -> Vec<ScoredCandidate> {
    scored.sort_by(compare_ranked);
    if scored.len() > max_results {
        debug!(
            candidates = scored.len(),
            max_results, "truncating to top candidates"
        );
    }
    scored.truncate(max_results);
    scored
}

/// Sort, truncate and assign dense 1-based ranks.
pub fn select(scored: Vec<ScoredCandidate>, max_results: usize) -> Vec<RankedSection> {
    select_top(scored, max_results)
        .iter()
        .enumerate()
        .map(|(i, sc)| to_ranked_section(sc, i + 1))
        .collect()
}

/// Build the output record for a candidate at `rank` (1-based).
pub fn to_ranked_section(scored: &ScoredCandidate, rank: usize) -> RankedSection {
    RankedSection {
        document: scored.candidate.document_filename.clone(),
        section_title: scored.candidate.section_title.clone(),
        importance_rank: u32::try_from(rank).unwrap_or(u32::MAX),
        page_number: scored.candidate.page_number,
    }
}
