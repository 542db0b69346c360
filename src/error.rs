use std::path::{Path, PathBuf};
use thiserror::Error;

/// Problems with the project path handed to the analyzer.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Project path does not exist: {0}")]
    NotFound(PathBuf),
    #[error("Project path is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Failed to resolve project path {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Checks that `path` is an existing directory and returns it in absolute form.
pub fn validate_project_root(path: &Path) -> Result<PathBuf, AnalyzeError> {
    if !path.exists() {
        return Err(AnalyzeError::NotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(AnalyzeError::NotADirectory(path.to_path_buf()));
    }
    std::path::absolute(path).map_err(|source| AnalyzeError::Resolve {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = validate_project_root(&missing).unwrap_err();
        assert!(matches!(err, AnalyzeError::NotFound(_)));
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn file_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("pom.xml");
        std::fs::write(&file, "<project/>").unwrap();
        let err = validate_project_root(&file).unwrap_err();
        assert!(matches!(err, AnalyzeError::NotADirectory(_)));
    }

    #[test]
    fn directory_is_accepted_as_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let root = validate_project_root(dir.path()).unwrap();
        assert!(root.is_absolute());
    }
}
