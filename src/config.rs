use std::env;
use std::path::{Path, PathBuf};

use crate::cli::ReportFormat;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const REPORT_STEM: &str = "boot-report";

/// Where the walker looks for sources and how it schedules them.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Conventional source directory, relative to the project root.
    pub source_root: PathBuf,
    /// How many levels below the root to search when `source_root` is absent.
    pub search_depth: usize,
    pub extension: String,
    /// Worker threads for parsing; `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("src/main/java"),
            search_depth: 3,
            extension: "java".to_string(),
            threads: None,
        }
    }
}

impl AnalyzerConfig {
    pub fn with_threads(threads: Option<usize>) -> Self {
        Self {
            threads: threads.filter(|n| *n > 0),
            ..Self::default()
        }
    }
}

/// Explicit `-o` wins; otherwise html and json land next to the project and
/// text goes to stdout.
pub fn resolve_output_path(
    output: Option<&Path>,
    project_root: &Path,
    format: ReportFormat,
) -> Option<PathBuf> {
    if let Some(p) = output {
        return Some(p.to_path_buf());
    }

    match format {
        ReportFormat::Html => Some(project_root.join(format!("{REPORT_STEM}.html"))),
        ReportFormat::Json => Some(project_root.join(format!("{REPORT_STEM}.json"))),
        ReportFormat::Text => None,
    }
}

pub fn resolve_bind(bind: Option<&str>) -> String {
    if let Some(b) = bind {
        return b.to_string();
    }

    if let Ok(b) = env::var("BOOT_INVENTORY_BIND")
        && !b.trim().is_empty()
    {
        return b;
    }

    DEFAULT_BIND.to_string()
}
