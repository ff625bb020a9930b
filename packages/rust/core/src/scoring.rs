//! Relevance scoring of sections against a persona/task query.
//!
//! The score is a weighted cosine similarity between the query's term vector
//! and the section's term vector, where heading terms are multiplied by
//! [`ScoringConfig::heading_weight`] and body terms by
//! [`ScoringConfig::body_weight`]. Cosine normalization keeps long sections
//! from winning on volume alone. Scores lie in `[0, 1]`; no overlap scores 0.
//!
//! Term vectors are `BTreeMap`s so every sum runs in the same order and the
//! floating-point result is reproducible across runs.

use std::collections::BTreeMap;

use docintel_shared::{PersonaTask, ScoringConfig};

use crate::extract::SectionCandidate;
use crate::text::tokenize;

// ---------------------------------------------------------------------------
// Term vectors
// ---------------------------------------------------------------------------

/// Weighted term-frequency vector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    weights: BTreeMap<String, f64>,
}

impl TermVector {
    /// Build a vector from raw text, counting normalized terms.
    pub fn from_text(text: &str, sublinear_tf: bool) -> Self {
        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for term in tokenize(text) {
            *counts.entry(term).or_default() += 1;
        }

        let weights = counts
            .into_iter()
            .map(|(term, count)| {
                let tf = if sublinear_tf {
                    1.0 + f64::from(count).ln()
                } else {
                    f64::from(count)
                };
                (term, tf)
            })
            .collect();

        Self { weights }
    }

    /// Add `other * factor` into `self`.
    pub fn add_scaled(&mut self, other: &TermVector, factor: f64) {
        if factor <= 0.0 {
            return;
        }
        for (term, weight) in &other.weights {
            *self.weights.entry(term.clone()).or_default() += weight * factor;
        }
    }

    /// Dot product over the shared terms.
    pub fn dot(&self, other: &TermVector) -> f64 {
        self.weights
            .iter()
            .filter_map(|(term, w)| other.weights.get(term).map(|o| w * o))
            .sum()
    }

    /// Euclidean length.
    pub fn norm(&self) -> f64 {
        self.weights.values().map(|w| w * w).sum::<f64>().sqrt()
    }

    /// True when no term survived tokenization.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Weight of `term`, 0 when absent.
    pub fn weight(&self, term: &str) -> f64 {
        self.weights.get(term).copied().unwrap_or(0.0)
    }

    /// Terms in sorted order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// The persona/task pair as a term vector. Built once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    vector: TermVector,
}

impl Query {
    /// Tokenize `"role task"` with the configured tf scheme.
    pub fn new(persona_task: &PersonaTask, config: &ScoringConfig) -> Self {
        Self {
            vector: TermVector::from_text(&persona_task.query_text(), config.sublinear_tf),
        }
    }

    /// The query's term vector.
    pub fn vector(&self) -> &TermVector {
        &self.vector
    }

    /// True when role and task produced no usable terms.
    pub fn is_empty(&self) -> bool {
        self.vector.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Scored candidates
// ---------------------------------------------------------------------------

/// A candidate with its relevance score and the query terms that matched.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    /// The scored section.
    pub candidate: SectionCandidate,
    /// Relevance in `[0, 1]`; higher is more relevant. Never NaN.
    pub relevance_score: f64,
    /// Query terms present in the heading or body, sorted.
    pub matched_terms: Vec<String>,
}

/// Score plus matched terms for one piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextScore {
    /// Cosine similarity in `[0, 1]`.
    pub score: f64,
    /// Query terms present in the text, sorted.
    pub matched_terms: Vec<String>,
}

// ---------------------------------------------------------------------------
// Scorer
// ---------------------------------------------------------------------------

/// Stateless scorer: the score is a pure function of (text, query, config).
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    query: Query,
    config: ScoringConfig,
}

impl RelevanceScorer {
    /// Build the query once; every later score reuses it.
    pub fn new(persona_task: &PersonaTask, config: ScoringConfig) -> Self {
        Self {
            query: Query::new(persona_task, &config),
            config,
        }
    }

    /// The query this scorer compares against.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Score a section candidate.
    pub fn score(&self, candidate: &SectionCandidate) -> ScoredCandidate {
        let TextScore {
            score,
            matched_terms,
        } = self.score_text(&candidate.section_title, &candidate.body_text);

        ScoredCandidate {
            candidate: candidate.clone(),
            relevance_score: score,
            matched_terms,
        }
    }

    /// Score a heading/body pair. Either may be empty.
    pub fn score_text(&self, heading: &str, body: &str) -> TextScore {
        let sublinear = self.config.sublinear_tf;
        let mut doc = TermVector::default();
        doc.add_scaled(
            &TermVector::from_text(heading, sublinear),
            sanitize_weight(self.config.heading_weight),
        );
        doc.add_scaled(
            &TermVector::from_text(body, sublinear),
            sanitize_weight(self.config.body_weight),
        );

        let query = self.query.vector();
        let denominator = query.norm() * doc.norm();
        let score = if denominator > 0.0 {
            query.dot(&doc) / denominator
        } else {
            0.0
        };

        let matched_terms = query
            .terms()
            .filter(|term| doc.weight(term) > 0.0)
            .map(str::to_string)
            .collect();

        TextScore {
            score: clamp_score(score),
            matched_terms,
        }
    }
}

/// Negative or non-finite weights count as zero.
fn sanitize_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

/// Clamp to `[0, 1]`, mapping NaN and negative zero to `0.0`.
fn clamp_score(score: f64) -> f64 {
    if score.is_finite() && score > 0.0 {
        score.min(1.0)
    } else {
        0.0
    }
}
