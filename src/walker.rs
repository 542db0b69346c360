//! Source discovery and the per-file parse/classify pipeline.

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::classify::classify;
use crate::config::AnalyzerConfig;
use crate::model::{Bean, Diagnostic, ProjectModel};
use crate::syntax::{SourceFile, TypeKind, parse_source};

/// Picks the directory to scan: `<root>/src/main/java` when present, else the
/// first matching directory at most `search_depth` levels down (multi-module
/// layouts), else the root itself.
pub fn locate_source_root(root: &Path, config: &AnalyzerConfig) -> PathBuf {
    let conventional = root.join(&config.source_root);
    if conventional.is_dir() {
        return conventional;
    }

    let max_depth = config.search_depth + config.source_root.components().count();
    let mut found: Vec<PathBuf> = WalkBuilder::new(root)
        .max_depth(Some(max_depth))
        .hidden(false)
        .ignore(false)
        .parents(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_dir()))
        .map(|entry| entry.into_path())
        .filter(|path| path.ends_with(&config.source_root))
        .collect();
    found.sort();

    match found.into_iter().next() {
        Some(dir) => {
            debug!(dir = %dir.display(), "using nested source root");
            dir
        }
        None => {
            warn!(
                root = %root.display(),
                "no {} directory found, scanning the project root",
                config.source_root.display()
            );
            root.to_path_buf()
        }
    }
}

/// Every file under `base_path` with the given extension, sorted.
pub fn scan_sources(base_path: &Path, extension: &str) -> Vec<PathBuf> {
    let (tx, rx) = mpsc::channel();

    let walker = WalkBuilder::new(base_path)
        .hidden(false)
        .ignore(false)
        .parents(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build_parallel();

    walker.run(|| {
        let tx = tx.clone();
        Box::new(move |entry| {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_some_and(|t| t.is_file())
                        && path.extension().is_some_and(|e| e == extension)
                    {
                        let _ = tx.send(path.to_path_buf());
                    }
                }
                Err(err) => debug!("walk error: {err}"),
            }
            ignore::WalkState::Continue
        })
    });

    drop(tx);
    let mut files: Vec<PathBuf> = rx.iter().collect();
    files.sort();
    files
}

/// Runs the whole pipeline over a project directory.
///
/// Never fails: unreadable or malformed files become diagnostics on the
/// returned model. Files are classified in parallel and inserted in sorted
/// path order, so the result does not depend on scheduling.
pub fn analyze_project(root: &Path, config: &AnalyzerConfig) -> ProjectModel {
    let start = Instant::now();
    let mut model = ProjectModel::new(root.to_path_buf());

    if !root.is_dir() {
        warn!(root = %root.display(), "project root is not a directory");
        model.record_diagnostic(Diagnostic {
            path: root.to_path_buf(),
            message: "project root is not a directory".to_string(),
        });
        return model;
    }

    let source_root = locate_source_root(root, config);
    let files = scan_sources(&source_root, &config.extension);
    info!(
        source_root = %source_root.display(),
        files = files.len(),
        "scanning sources"
    );

    let outcomes = run_in_pool(config.threads, || {
        files
            .par_iter()
            .map(|path| analyze_file(path))
            .collect::<Vec<_>>()
    });

    for (path, outcome) in files.iter().zip(outcomes) {
        match outcome {
            Ok(beans) => {
                for bean in beans {
                    debug!(bean = %bean.qualified_name, role = bean.role.label(), "classified");
                    model.insert(bean);
                }
            }
            Err(err) => {
                warn!(file = %path.display(), "skipping file: {err:#}");
                model.record_diagnostic(Diagnostic {
                    path: path.clone(),
                    message: format!("{err:#}"),
                });
            }
        }
    }

    info!(
        beans = model.total(),
        skipped = model.diagnostics().len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "analysis finished"
    );
    model
}

fn run_in_pool<T: Send>(threads: Option<usize>, job: impl FnOnce() -> T + Send) -> T {
    let Some(n) = threads else {
        return job();
    };

    match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
        Ok(pool) => pool.install(job),
        Err(err) => {
            warn!("failed to build a {n}-thread pool, using the global one: {err}");
            job()
        }
    }
}

pub fn analyze_file(path: &Path) -> Result<Vec<Bean>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    // Legacy Latin-1 bytes are replaced rather than failing the file.
    let source = String::from_utf8_lossy(&bytes);
    let file = parse_source(&source)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(classify_file(&file, path))
}

/// Classifies the top-level classes of a parsed file. Interfaces, enums,
/// records and annotation types never become beans.
pub fn classify_file(file: &SourceFile, path: &Path) -> Vec<Bean> {
    let package = file.package.as_deref().unwrap_or("");
    file.types
        .iter()
        .filter(|decl| decl.kind == TypeKind::Class)
        .filter_map(|decl| classify(decl, package, path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;
    use std::fs;

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn locate_prefers_conventional_root() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src/main/java");
        fs::create_dir_all(&src).unwrap();

        assert_eq!(locate_source_root(dir.path(), &AnalyzerConfig::default()), src);
    }

    #[test]
    fn locate_finds_module_source_root() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("backend/src/main/java");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(dir.path().join("web/src/main/java")).unwrap();

        assert_eq!(locate_source_root(dir.path(), &AnalyzerConfig::default()), src);
    }

    #[test]
    fn locate_falls_back_to_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();

        assert_eq!(
            locate_source_root(dir.path(), &AnalyzerConfig::default()),
            dir.path()
        );
    }

    #[test]
    fn scan_sources_filters_by_extension_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("b/B.java"), "class B {}");
        write_file(&dir.path().join("a/A.java"), "class A {}");
        write_file(&dir.path().join("a/notes.txt"), "x");

        let files = scan_sources(dir.path(), "java");
        assert_eq!(
            files,
            vec![dir.path().join("a/A.java"), dir.path().join("b/B.java")]
        );
    }

    #[test]
    fn analyze_project_skips_broken_files_and_interfaces() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src/main/java/com/shop");
        write_file(
            &src.join("ShopApplication.java"),
            "package com.shop;\n@SpringBootApplication\npublic class ShopApplication {}\n",
        );
        write_file(
            &src.join("OrderService.java"),
            "package com.shop;\n@Service\npublic class OrderService {\n  OrderService(OrderRepository repo) {}\n}\n",
        );
        write_file(
            &src.join("OrderRepository.java"),
            "package com.shop;\n@Repository\npublic interface OrderRepository {}\n",
        );
        write_file(&src.join("Broken.java"), "package com.shop;\n@Service class Broken {\n");

        let model = analyze_project(dir.path(), &AnalyzerConfig::with_threads(Some(2)));

        assert_eq!(model.total(), 2);
        assert_eq!(
            model.entry_point().map(|b| b.qualified_name.as_str()),
            Some("com.shop.ShopApplication")
        );
        let services = model.entities_of(Role::Service);
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].dependencies, vec!["OrderRepository"]);

        assert_eq!(model.diagnostics().len(), 1);
        assert!(model.diagnostics()[0].path.ends_with("Broken.java"));
        assert!(model.diagnostics()[0].message.contains("syntax error"));
    }

    #[test]
    fn non_utf8_comment_still_classifies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("src/main/java/pl/Svc.java");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut bytes = b"package pl;\n// Autor: Micha".to_vec();
        bytes.push(0xB3);
        bytes.extend_from_slice(b"\n@Service\npublic class Svc {}\n");
        fs::write(&path, bytes).unwrap();

        let model = analyze_project(dir.path(), &AnalyzerConfig::default());
        assert!(model.diagnostics().is_empty());
        assert_eq!(model.total(), 1);
        assert_eq!(model.entities_of(Role::Service)[0].qualified_name, "pl.Svc");
    }

    #[test]
    fn ignore_files_do_not_hide_sources() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join(".ignore"), "*.java\n");
        write_file(&dir.path().join("src/main/java/a/.ignore"), "*\n");
        write_file(&dir.path().join("src/main/java/a/A.java"), "class A {}");

        let src = dir.path().join("src/main/java");
        assert_eq!(scan_sources(&src, "java"), vec![src.join("a/A.java")]);

        let multi = tempfile::tempdir().unwrap();
        write_file(&multi.path().join(".ignore"), "backend/\n");
        let nested = multi.path().join("backend/src/main/java");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(
            locate_source_root(multi.path(), &AnalyzerConfig::default()),
            nested
        );
    }

    #[test]
    fn analyze_project_orders_beans_by_path() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src/main/java");
        write_file(&src.join("b/SecondApp.java"), "package b;\n@SpringBootApplication class SecondApp {}");
        write_file(&src.join("a/FirstApp.java"), "package a;\n@SpringBootApplication class FirstApp {}");

        let model = analyze_project(dir.path(), &AnalyzerConfig::default());
        assert_eq!(
            model.entry_point().map(|b| b.qualified_name.as_str()),
            Some("a.FirstApp")
        );
    }

    #[test]
    fn analyze_missing_root_yields_empty_model() {
        let dir = tempfile::tempdir().unwrap();
        let model = analyze_project(&dir.path().join("missing"), &AnalyzerConfig::default());
        assert_eq!(model.total(), 0);
        assert_eq!(model.diagnostics().len(), 1);
    }

    #[test]
    fn classify_file_keeps_every_top_level_class() {
        let file = parse_source(
            "package x;\n@Service class A {}\nclass Plain {}\n@Component class B {}\n",
        )
        .unwrap();
        let beans = classify_file(&file, Path::new("X.java"));
        let names: Vec<&str> = beans.iter().map(|b| b.qualified_name.as_str()).collect();
        assert_eq!(names, vec!["x.A", "x.B"]);
    }
}
