//! Result artifact assembly and writing.

use std::path::Path;

use serde::Serialize;
use tracing::{info, instrument};

use docintel_shared::{
    AnalysisOutput, DocIntelError, JobInput, OutputMetadata, RankedSection, Result,
    SubsectionAnalysis,
};

/// Local time in ISO-8601 with microseconds, e.g. `2025-07-10T15:31:22.632389`.
pub fn processing_timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// Assemble the result artifact.
///
/// `input_documents` lists every document named in the job, including any
/// that could not be processed.
pub fn build_output(
    input: &JobInput,
    extracted_sections: Vec<RankedSection>,
    subsection_analysis: Vec<SubsectionAnalysis>,
    processing_timestamp: String,
) -> AnalysisOutput {
    AnalysisOutput {
        metadata: OutputMetadata {
            input_documents: input.filenames(),
            persona: input.persona.role.clone(),
            job_to_be_done: input.job_to_be_done.task.clone(),
            processing_timestamp,
        },
        extracted_sections,
        subsection_analysis,
    }
}

/// Write the artifact as 4-space indented JSON. Non-ASCII text is kept as-is.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn write_output(path: &Path, output: &AnalysisOutput) -> Result<()> {
    write_json(path, output)?;
    info!(
        sections = output.extracted_sections.len(),
        "result written"
    );
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| DocIntelError::Serialization(e.to_string()))?;

    std::fs::write(path, buf).map_err(|e| DocIntelError::io(path, e))
}
