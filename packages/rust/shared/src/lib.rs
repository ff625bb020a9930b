//! Shared types, error model, and configuration for docintel.
//!
//! This crate is the foundation depended on by all other docintel crates.
//! It provides:
//! - [`DocIntelError`]: the unified error type
//! - Domain records ([`DocumentRecord`], [`HeadingNode`], [`PersonaTask`], [`RankedSection`])
//! - Job input/output records ([`JobInput`], [`AnalysisOutput`])
//! - Configuration ([`AppConfig`], config loading, run path resolution)

pub mod config;
pub mod error;
pub mod job;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AnalysisConfig, AppConfig, PathsConfig, ProcessingConfig, RefineConfig, RunPaths,
    ScoringConfig, clamp_max_results, config_dir, config_file_path, init_config, load_config,
    load_config_from, resolve_run_paths, resolve_working_dir,
};
pub use error::{DocIntelError, Result};
pub use job::{AnalysisOutput, DocumentRef, JobInput, JobToBeDone, OutputMetadata, Persona, load_job_input};
pub use types::{
    DocumentRecord, HeadingLevel, HeadingNode, MAX_HEADING_DEPTH, PersonaTask, RankedSection,
    SubsectionAnalysis,
};
