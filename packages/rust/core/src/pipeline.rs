//! End-to-end run: job input → document processing → analysis → ranking → result file.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

use docintel_pdf::DocumentProcessor;
use docintel_shared::{
    AnalysisOutput, AppConfig, DocIntelError, DocumentRecord, DocumentRef, JobInput,
    RefineConfig, Result, RunPaths, ScoringConfig, load_job_input,
};

use crate::analysis::{analyze, rank};
use crate::output::{build_output, processing_timestamp, write_output};

/// Runtime configuration for one run, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Input, output and PDF locations.
    pub paths: RunPaths,
    /// Maximum ranked sections.
    pub max_results: usize,
    /// Relevance scoring policy.
    pub scoring: ScoringConfig,
    /// Excerpt policy.
    pub refine: RefineConfig,
    /// PDFs processed at once.
    pub concurrency: usize,
}

impl RunConfig {
    /// Take limits and policies from `config`; `concurrency` is at least 1.
    pub fn new(config: &AppConfig, paths: RunPaths) -> Self {
        Self {
            paths,
            max_results: config.analysis.max_results(),
            scoring: config.scoring.clone(),
            refine: config.refine.clone(),
            concurrency: config.processing.concurrency.max(1) as usize,
        }
    }
}

/// Analysis result before it is written to disk.
#[derive(Debug)]
pub struct JobOutcome {
    /// The result artifact.
    pub output: AnalysisOutput,
    /// Documents processed successfully.
    pub documents_loaded: usize,
    /// Documents skipped because they could not be processed.
    pub documents_failed: usize,
}

/// Summary of a completed run.
#[derive(Debug)]
pub struct RunSummary {
    /// Where the result was written.
    pub output_path: std::path::PathBuf,
    /// Documents processed successfully.
    pub documents_loaded: usize,
    /// Documents skipped because they could not be processed.
    pub documents_failed: usize,
    /// Number of ranked sections written.
    pub sections_ranked: usize,
    /// Wall-clock time for the whole run.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when a document finished processing (successfully or not).
    fn document_loaded(&self, filename: &str, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn document_loaded(&self, _filename: &str, _current: usize, _total: usize) {}
    fn done(&self, _summary: &RunSummary) {}
}

/// Run the full pipeline and write the result file.
///
/// 1. Load the job input
/// 2. Process the listed PDFs
/// 3. Analyze and rank sections
/// 4. Write the result next to the input
#[instrument(skip_all, fields(input = %config.paths.input_json.display()))]
pub async fn run_job(
    config: &RunConfig,
    processor: Arc<dyn DocumentProcessor>,
    progress: &dyn ProgressReporter,
) -> Result<RunSummary> {
    let start = Instant::now();

    progress.phase("Loading job input");
    let input = load_job_input(&config.paths.input_json)?;
    info!(
        documents = input.documents.len(),
        persona = %input.persona.role,
        "job input loaded"
    );

    let outcome = analyze_job(config, &input, processor, progress).await?;

    progress.phase("Writing result");
    write_output(&config.paths.output_json, &outcome.output)?;

    let summary = RunSummary {
        output_path: config.paths.output_json.clone(),
        documents_loaded: outcome.documents_loaded,
        documents_failed: outcome.documents_failed,
        sections_ranked: outcome.output.extracted_sections.len(),
        elapsed: start.elapsed(),
    };

    progress.done(&summary);

    info!(
        documents_loaded = summary.documents_loaded,
        documents_failed = summary.documents_failed,
        sections = summary.sections_ranked,
        elapsed_ms = summary.elapsed.as_millis(),
        "run complete"
    );

    Ok(summary)
}

/// Process documents and produce the result artifact without writing it.
pub async fn analyze_job(
    config: &RunConfig,
    input: &JobInput,
    processor: Arc<dyn DocumentProcessor>,
    progress: &dyn ProgressReporter,
) -> Result<JobOutcome> {
    progress.phase("Processing documents");
    let (documents, documents_failed) = load_documents(
        &config.paths.pdf_dir,
        &input.documents,
        processor,
        config.concurrency,
        progress,
    )
    .await;

    if documents.is_empty() {
        warn!("no documents could be processed, the ranking will be empty");
    }

    progress.phase("Analyzing relevance");
    let persona_task = input.persona_task();
    let scored = analyze(&documents, &persona_task, config.max_results, &config.scoring);

    progress.phase("Ranking sections");
    let (sections, subsections) = rank(&scored, &persona_task, &config.refine, &config.scoring);

    Ok(JobOutcome {
        output: build_output(input, sections, subsections, processing_timestamp()),
        documents_loaded: documents.len(),
        documents_failed,
    })
}

/// Process every listed PDF, at most `concurrency` at a time.
///
/// Results come back in the order the documents were listed, whatever order
/// the workers finish in. Failures are logged and counted, never fatal. A
/// title given in the job input replaces the one extracted from the PDF.
#[instrument(skip_all, fields(documents = refs.len(), processor = processor.name()))]
pub async fn load_documents(
    pdf_dir: &Path,
    refs: &[DocumentRef],
    processor: Arc<dyn DocumentProcessor>,
    concurrency: usize,
    progress: &dyn ProgressReporter,
) -> (Vec<DocumentRecord>, usize) {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut handles = Vec::with_capacity(refs.len());

    for doc_ref in refs {
        let path = pdf_dir.join(&doc_ref.filename);
        let sem = semaphore.clone();
        let processor = processor.clone();

        handles.push(tokio::spawn(async move {
            let _permit = sem
                .acquire_owned()
                .await
                .map_err(|e| DocIntelError::pdf(format!("worker pool closed: {e}")))?;

            tokio::task::spawn_blocking(move || processor.process(&path))
                .await
                .map_err(|e| DocIntelError::pdf(format!("worker failed: {e}")))?
        }));
    }

    let total = refs.len();
    let mut documents = Vec::with_capacity(total);
    let mut failed = 0usize;

    for (i, (handle, doc_ref)) in handles.into_iter().zip(refs).enumerate() {
        let outcome = handle
            .await
            .map_err(|e| DocIntelError::pdf(format!("task failed: {e}")))
            .and_then(|result| result);

        match outcome {
            Ok(mut record) => {
                // Keep the name exactly as listed so the output matches the input.
                record.filename = doc_ref.filename.clone();
                if let Some(title) = doc_ref
                    .title
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                {
                    record.title = title.to_string();
                }
                documents.push(record);
            }
            Err(e) => {
                warn!(filename = %doc_ref.filename, error = %e, "skipping document");
                failed += 1;
            }
        }
        progress.document_loaded(&doc_ref.filename, i + 1, total);
    }

    info!(loaded = documents.len(), failed, "document processing complete");

    (documents, failed)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use super::*;
    use docintel_shared::{HeadingLevel, HeadingNode, PathsConfig};

    /// In-memory processor: documents keyed by file name, optional per-file delay.
    struct FakeProcessor {
        docs: BTreeMap<String, (DocumentRecord, u64)>,
    }

    impl FakeProcessor {
        fn new(entries: Vec<(DocumentRecord, u64)>) -> Self {
            Self {
                docs: entries
                    .into_iter()
                    .map(|(doc, delay)| (doc.filename.clone(), (doc, delay)))
                    .collect(),
            }
        }
    }

    impl DocumentProcessor for FakeProcessor {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn process(&self, path: &Path) -> Result<DocumentRecord> {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let (doc, delay) = self
                .docs
                .get(&name)
                .ok_or_else(|| DocIntelError::pdf(format!("{name}: not found")))?;
            std::thread::sleep(Duration::from_millis(*delay));
            Ok(doc.clone())
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        phases: Mutex<Vec<String>>,
        loaded: Mutex<Vec<String>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, name: &str) {
            self.phases.lock().unwrap().push(name.to_string());
        }
        fn document_loaded(&self, filename: &str, _current: usize, _total: usize) {
            self.loaded.lock().unwrap().push(filename.to_string());
        }
        fn done(&self, _summary: &RunSummary) {}
    }

    fn make_doc(filename: &str, heading: &str, body: &str) -> DocumentRecord {
        DocumentRecord::new(
            filename,
            filename,
            vec![HeadingNode::new(heading, HeadingLevel::H1, 1).unwrap()],
            BTreeMap::from([(1, body.to_string())]),
        )
        .unwrap()
    }

    fn run_config(dir: &Path) -> RunConfig {
        let paths = RunPaths {
            working_dir: dir.to_path_buf(),
            input_json: dir.join("challenge1b_input.json"),
            output_json: dir.join("challenge1b_output.json"),
            pdf_dir: dir.join("PDFs"),
        };
        RunConfig::new(&AppConfig::default(), paths)
    }

    fn job(files: &[&str]) -> JobInput {
        let documents: Vec<_> = files
            .iter()
            .map(|f| serde_json::json!({ "filename": f }))
            .collect();
        JobInput::from_json(
            &serde_json::json!({
                "documents": documents,
                "persona": {"role": "Travel Planner"},
                "job_to_be_done": {"task": "Plan beaches and nightlife for friends"},
                "challenge_info": {"challenge_id": "round_1b_002"}
            })
            .to_string(),
        )
        .unwrap()
    }

    #[test]
    fn run_config_from_app_config() {
        let config = run_config(Path::new("/tmp/collection"));
        assert_eq!(config.max_results, 10);
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.paths.pdf_dir, PathBuf::from("/tmp/collection/PDFs"));
        assert_eq!(PathsConfig::default().pdf_dir, "PDFs");
    }

    #[tokio::test]
    async fn documents_come_back_in_listed_order() {
        // The first document is the slowest; completion order is reversed.
        let processor: Arc<dyn DocumentProcessor> = Arc::new(FakeProcessor::new(vec![
            (make_doc("a.pdf", "A", "a"), 60),
            (make_doc("b.pdf", "B", "b"), 30),
            (make_doc("c.pdf", "C", "c"), 0),
        ]));
        let refs = job(&["a.pdf", "b.pdf", "c.pdf"]).documents;
        let progress = RecordingProgress::default();

        let (docs, failed) =
            load_documents(Path::new("/pdfs"), &refs, processor, 3, &progress).await;

        assert_eq!(failed, 0);
        let names: Vec<_> = docs.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf", "c.pdf"]);
        assert_eq!(progress.loaded.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn failed_documents_are_skipped() {
        let processor: Arc<dyn DocumentProcessor> =
            Arc::new(FakeProcessor::new(vec![(make_doc("a.pdf", "Beaches", "beaches"), 0)]));
        let refs = job(&["missing.pdf", "a.pdf"]).documents;

        let (docs, failed) =
            load_documents(Path::new("/pdfs"), &refs, processor, 1, &SilentProgress).await;

        assert_eq!(failed, 1);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].filename, "a.pdf");
    }

    #[tokio::test]
    async fn listed_title_replaces_extracted_title() {
        let processor: Arc<dyn DocumentProcessor> = Arc::new(FakeProcessor::new(vec![
            (make_doc("a.pdf", "Beaches", "beaches"), 0),
            (make_doc("b.pdf", "Nightlife", "clubs"), 0),
        ]));
        let refs: Vec<DocumentRef> = serde_json::from_value(serde_json::json!([
            {"filename": "a.pdf", "title": "South of France - Coast"},
            {"filename": "b.pdf", "title": "  "}
        ]))
        .unwrap();

        let (docs, _) =
            load_documents(Path::new("/pdfs"), &refs, processor, 2, &SilentProgress).await;

        assert_eq!(docs[0].title, "South of France - Coast");
        assert_eq!(docs[1].title, "b.pdf");
    }

    #[tokio::test]
    async fn analyze_job_ranks_and_reports_phases() {
        let dir = tempfile::tempdir().unwrap();
        let processor: Arc<dyn DocumentProcessor> = Arc::new(FakeProcessor::new(vec![
            (make_doc("cities.pdf", "Museums", "Art galleries and history."), 0),
            (make_doc("things.pdf", "Beaches and Nightlife", "Beach clubs for friends."), 0),
        ]));
        let progress = RecordingProgress::default();
        let input = job(&["cities.pdf", "things.pdf"]);

        let outcome = analyze_job(&run_config(dir.path()), &input, processor, &progress)
            .await
            .expect("analyze");

        let sections = &outcome.output.extracted_sections;
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].document, "things.pdf");
        assert_eq!(sections[0].importance_rank, 1);
        assert_eq!(outcome.output.subsection_analysis.len(), 2);
        assert_eq!(outcome.documents_loaded, 2);

        let phases = progress.phases.lock().unwrap();
        assert_eq!(
            *phases,
            vec!["Processing documents", "Analyzing relevance", "Ranking sections"]
        );
    }

    #[tokio::test]
    async fn run_job_with_no_documents_writes_empty_result() {
        let dir = tempfile::tempdir().unwrap();
        let config = run_config(dir.path());
        std::fs::write(
            &config.paths.input_json,
            serde_json::to_string(&job(&["gone.pdf"])).unwrap(),
        )
        .unwrap();

        let processor: Arc<dyn DocumentProcessor> = Arc::new(FakeProcessor::new(vec![]));
        let summary = run_job(&config, processor, &SilentProgress)
            .await
            .expect("run");

        assert_eq!(summary.documents_failed, 1);
        assert_eq!(summary.sections_ranked, 0);

        let written: AnalysisOutput =
            serde_json::from_str(&std::fs::read_to_string(&summary.output_path).unwrap()).unwrap();
        assert_eq!(written.metadata.input_documents, vec!["gone.pdf"]);
        assert!(written.extracted_sections.is_empty());
        assert!(written.subsection_analysis.is_empty());
    }

    #[tokio::test]
    async fn run_job_missing_input_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let processor: Arc<dyn DocumentProcessor> = Arc::new(FakeProcessor::new(vec![]));
        let err = run_job(&run_config(dir.path()), processor, &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, DocIntelError::Io { .. }));
    }
}
