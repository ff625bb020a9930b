//! Job input (`challenge1b_input.json`) and result artifact (`challenge1b_output.json`) records.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DocIntelError, Result};
use crate::types::{PersonaTask, RankedSection, SubsectionAnalysis};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A document listed in the job input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// PDF file name, relative to the `PDFs` folder.
    pub filename: String,
    /// Optional title supplied by the job author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// `persona` object of the job input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Reader role, e.g. "HR professional".
    pub role: String,
}

/// `job_to_be_done` object of the job input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobToBeDone {
    /// What the persona needs to accomplish.
    pub task: String,
}

/// The job description file.
///
/// `documents`, `persona` and `job_to_be_done` are required; a file missing
/// any of them is rejected as a config error. `challenge_info` is opaque.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInput {
    /// PDFs to analyze, in batch order.
    pub documents: Vec<DocumentRef>,
    /// Who is reading.
    pub persona: Persona,
    /// What they are trying to do.
    pub job_to_be_done: JobToBeDone,
    /// Opaque challenge identifiers. Accepted and kept on the input, but not
    /// written to the result: the result's `metadata` carries only the
    /// documents, persona, task and timestamp, and downstream consumers of the
    /// result file expect exactly those keys.
    #[serde(default)]
    pub challenge_info: serde_json::Value,
}

impl JobInput {
    /// Parse a job input from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| DocIntelError::config(format!("invalid job input: {e}")))
    }

    /// The persona/task pair that drives relevance scoring.
    pub fn persona_task(&self) -> PersonaTask {
        PersonaTask::new(&self.persona.role, &self.job_to_be_done.task)
    }

    /// Filenames in the order they were listed.
    pub fn filenames(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.filename.clone()).collect()
    }
}

/// Load and parse the job input file.
pub fn load_job_input(path: &Path) -> Result<JobInput> {
    let content = std::fs::read_to_string(path).map_err(|e| DocIntelError::io(path, e))?;
    JobInput::from_json(&content).map_err(|e| match e {
        DocIntelError::Config { message } => {
            DocIntelError::config(format!("{}: {message}", path.display()))
        }
        other => other,
    })
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// `metadata` object of the result artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputMetadata {
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
    /// ISO-8601 local timestamp of the run.
    pub processing_timestamp: String,
}

/// The persisted result artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub metadata: OutputMetadata,
    pub extracted_sections: Vec<RankedSection>,
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}
