//! Persona-driven document analysis for docintel.
//!
//! This crate turns processed PDFs into a ranked list of the sections most
//! relevant to a persona and task, plus a refined excerpt for each, and
//! drives the end-to-end run (`run_job`).

pub mod analysis;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod ranker;
pub mod refine;
pub mod scoring;
pub mod text;

pub use analysis::{analyze, rank};
pub use pipeline::{
    JobOutcome, ProgressReporter, RunConfig, RunSummary, SilentProgress, analyze_job, run_job,
};
