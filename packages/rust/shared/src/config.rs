//! Application configuration for docintel.
//!
//! User config lives at `~/.docintel/docintel.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocIntelError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docintel.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docintel";

// ---------------------------------------------------------------------------
// Config structs (matching docintel.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Ranking limits.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Relevance scoring policy.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Excerpt refinement policy.
    #[serde(default)]
    pub refine: RefineConfig,

    /// Document processing.
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Collection layout.
    #[serde(default)]
    pub paths: PathsConfig,
}

/// `[analysis]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Maximum number of ranked sections. Zero or negative means none.
    #[serde(default = "default_max_results")]
    pub max_results: i64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

impl AnalysisConfig {
    /// `max_results` as a count; non-positive values become 0.
    pub fn max_results(&self) -> usize {
        clamp_max_results(self.max_results)
    }
}

fn default_max_results() -> i64 {
    10
}

/// Convert a caller-supplied result limit to a count. Non-positive means "no results".
pub fn clamp_max_results(requested: i64) -> usize {
    if requested <= 0 {
        tracing::debug!(requested, "non-positive max_results, no sections will be ranked");
        return 0;
    }
    usize::try_from(requested).unwrap_or(usize::MAX)
}

/// `[scoring]` section.
///
/// These weights are the only tunable relevance policy. Changing them changes
/// rankings, so tests pin the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Multiplier applied to heading term frequencies.
    #[serde(default = "default_heading_weight")]
    pub heading_weight: f64,

    /// Multiplier applied to body term frequencies.
    #[serde(default = "default_body_weight")]
    pub body_weight: f64,

    /// Use `1 + ln(tf)` instead of raw term counts.
    #[serde(default = "default_true")]
    pub sublinear_tf: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            heading_weight: default_heading_weight(),
            body_weight: default_body_weight(),
            sublinear_tf: true,
        }
    }
}

fn default_heading_weight() -> f64 {
    2.5
}
fn default_body_weight() -> f64 {
    1.0
}
fn default_true() -> bool {
    true
}

/// `[refine]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefineConfig {
    /// Maximum excerpt length in characters.
    #[serde(default = "default_char_budget")]
    pub char_budget: usize,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            char_budget: default_char_budget(),
        }
    }
}

fn default_char_budget() -> usize {
    600
}

/// `[processing]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Number of PDFs processed concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

fn default_concurrency() -> u32 {
    4
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Mounted collection directory used when running inside a container.
    #[serde(default = "default_container_data_dir")]
    pub container_data_dir: String,

    /// Job input file name inside the collection directory.
    #[serde(default = "default_input_file")]
    pub input_file: String,

    /// Result file name, written next to the input.
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// Sub-folder holding the PDFs.
    #[serde(default = "default_pdf_dir")]
    pub pdf_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            container_data_dir: default_container_data_dir(),
            input_file: default_input_file(),
            output_file: default_output_file(),
            pdf_dir: default_pdf_dir(),
        }
    }
}

fn default_container_data_dir() -> String {
    "/app/data".into()
}
fn default_input_file() -> String {
    "challenge1b_input.json".into()
}
fn default_output_file() -> String {
    "challenge1b_output.json".into()
}
fn default_pdf_dir() -> String {
    "PDFs".into()
}

// ---------------------------------------------------------------------------
// Run paths (resolved once per invocation)
// ---------------------------------------------------------------------------

/// Where a run reads its job and PDFs and writes its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    /// Collection directory.
    pub working_dir: PathBuf,
    /// Job input JSON.
    pub input_json: PathBuf,
    /// Result JSON.
    pub output_json: PathBuf,
    /// Folder holding the listed PDFs.
    pub pdf_dir: PathBuf,
}

/// Pick the collection directory: explicit path, else the container mount if present,
/// else the current directory.
pub fn resolve_working_dir(explicit: Option<&Path>, paths: &PathsConfig) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        if !dir.is_dir() {
            return Err(DocIntelError::config(format!(
                "collection directory '{}' does not exist",
                dir.display()
            )));
        }
        return Ok(dir.to_path_buf());
    }

    let container_dir = PathBuf::from(&paths.container_data_dir);
    if container_dir.is_dir() {
        tracing::info!(path = %container_dir.display(), "container data directory detected");
        return Ok(container_dir);
    }

    let cwd = std::env::current_dir().map_err(|e| DocIntelError::io(".", e))?;
    tracing::info!(path = %cwd.display(), "no container data directory, using current directory");
    Ok(cwd)
}

/// Resolve all run paths inside `working_dir`.
///
/// The configured input file is preferred. When it is absent and the directory
/// holds exactly one other JSON file (ignoring the output file), that one is used.
pub fn resolve_run_paths(working_dir: &Path, paths: &PathsConfig) -> Result<RunPaths> {
    let entries =
        std::fs::read_dir(working_dir).map_err(|e| DocIntelError::io(working_dir, e))?;

    let mut json_files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .filter(|p| p.file_name().is_some_and(|name| name != paths.output_file.as_str()))
        .collect();
    json_files.sort();

    if json_files.is_empty() {
        return Err(DocIntelError::config(format!(
            "no input JSON file found in '{}'",
            working_dir.display()
        )));
    }

    let preferred = working_dir.join(&paths.input_file);
    let input_json = if preferred.is_file() {
        preferred
    } else if json_files.len() == 1 {
        let only = json_files.remove(0);
        tracing::warn!(
            expected = %paths.input_file,
            using = %only.display(),
            "configured input file not found, using the only JSON file present"
        );
        only
    } else {
        return Err(DocIntelError::config(format!(
            "'{}' not found in '{}' and {} other JSON files are ambiguous",
            paths.input_file,
            working_dir.display(),
            json_files.len()
        )));
    };

    Ok(RunPaths {
        working_dir: working_dir.to_path_buf(),
        input_json,
        output_json: working_dir.join(&paths.output_file),
        pdf_dir: working_dir.join(&paths.pdf_dir),
    })
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docintel/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DocIntelError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docintel/docintel.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocIntelError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        DocIntelError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DocIntelError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocIntelError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocIntelError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("max_results"));
        assert!(toml_str.contains("heading_weight"));
        assert!(toml_str.contains("challenge1b_input.json"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.analysis.max_results, 10);
        assert_eq!(parsed.scoring, ScoringConfig::default());
        assert_eq!(parsed.refine.char_budget, 600);
        assert_eq!(parsed.paths.pdf_dir, "PDFs");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[scoring]
heading_weight = 3.0

[analysis]
max_results = 5
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.scoring.heading_weight, 3.0);
        assert_eq!(config.scoring.body_weight, 1.0);
        assert!(config.scoring.sublinear_tf);
        assert_eq!(config.analysis.max_results(), 5);
        assert_eq!(config.processing.concurrency, 4);
    }

    #[test]
    fn non_positive_max_results_means_none() {
        assert_eq!(clamp_max_results(0), 0);
        assert_eq!(clamp_max_results(-3), 0);
        assert_eq!(clamp_max_results(7), 7);
    }

    #[test]
    fn explicit_working_dir_must_exist() {
        let paths = PathsConfig::default();
        let err = resolve_working_dir(Some(Path::new("/definitely/not/here")), &paths);
        assert!(err.is_err());

        let dir = tempfile::tempdir().expect("tempdir");
        let resolved = resolve_working_dir(Some(dir.path()), &paths).expect("resolve");
        assert_eq!(resolved, dir.path());
    }

    #[test]
    fn run_paths_prefer_configured_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("challenge1b_input.json"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.json"), "{}").unwrap();

        let paths = PathsConfig::default();
        let run = resolve_run_paths(dir.path(), &paths).expect("resolve");
        assert!(run.input_json.ends_with("challenge1b_input.json"));
        assert!(run.output_json.ends_with("challenge1b_output.json"));
        assert!(run.pdf_dir.ends_with("PDFs"));
    }

    #[test]
    fn run_paths_fall_back_to_single_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("collection.json"), "{}").unwrap();
        std::fs::write(dir.path().join("challenge1b_output.json"), "{}").unwrap();

        let run = resolve_run_paths(dir.path(), &PathsConfig::default()).expect("resolve");
        assert!(run.input_json.ends_with("collection.json"));
    }

    #[test]
    fn run_paths_require_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = resolve_run_paths(dir.path(), &PathsConfig::default()).unwrap_err();
        assert!(err.to_string().contains("no input JSON"));

        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::write(dir.path().join("b.json"), "{}").unwrap();
        let err = resolve_run_paths(dir.path(), &PathsConfig::default()).unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
    }
}
