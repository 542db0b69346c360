//! HTTP surface: `/analyze` renders a fresh report per request.

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::AnalyzerConfig;
use crate::error::validate_project_root;
use crate::report::{error_page, generated_stamp, render_html};
use crate::walker::analyze_project;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

pub fn routes(config: AnalyzerConfig) -> Router {
    Router::new()
        .route("/analyze", get(analyze_get).post(analyze_post))
        .route("/health", get(health))
        .with_state(Arc::new(config))
}

pub async fn serve(bind: &str, config: AnalyzerConfig) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!("HTTP server listening on {bind}");
    axum::serve(listener, routes(config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;
    info!("HTTP server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for Ctrl+C: {err}");
        std::future::pending::<()>().await;
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
    })
}

async fn analyze_get(
    State(config): State<Arc<AnalyzerConfig>>,
    Query(request): Query<AnalyzeRequest>,
) -> Html<String> {
    Html(analyze_path(config, request.path).await)
}

async fn analyze_post(
    State(config): State<Arc<AnalyzerConfig>>,
    Json(request): Json<AnalyzeRequest>,
) -> Html<String> {
    Html(analyze_path(config, request.path).await)
}

async fn analyze_path(config: Arc<AnalyzerConfig>, path: Option<String>) -> String {
    let Some(raw) = path.filter(|p| !p.trim().is_empty()) else {
        return error_page("Missing 'path' parameter");
    };

    let root = match validate_project_root(&PathBuf::from(&raw)) {
        Ok(root) => root,
        Err(err) => return error_page(&err.to_string()),
    };

    let task = tokio::task::spawn_blocking(move || {
        let model = analyze_project(&root, &config);
        if model.total() == 0 {
            return Err(format!("No Spring Boot beans found in: {}", root.display()));
        }
        Ok(render_html(&model, &generated_stamp()))
    });

    match task.await {
        Ok(Ok(html)) => html,
        Ok(Err(message)) => error_page(&message),
        Err(err) => {
            error!("analysis task failed: {err}");
            error_page(&format!("Analysis failed: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;

    fn spring_project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src/main/java/com/shop");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(
            src.join("CatalogService.java"),
            "package com.shop;\n@Service\npublic class CatalogService {}\n",
        )
        .unwrap();
        dir
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let server = TestServer::new(routes(AnalyzerConfig::default())).unwrap();
        let response = server.get("/health").await;
        response.assert_status_ok();
        let body: HealthResponse = response.json();
        assert_eq!(body.status, "OK");
    }

    #[tokio::test]
    async fn analyze_get_renders_report() {
        let project = spring_project();
        let server = TestServer::new(routes(AnalyzerConfig::default())).unwrap();

        let response = server
            .get("/analyze")
            .add_query_param("path", project.path().to_string_lossy())
            .await;
        response.assert_status_ok();
        let body = response.text();
        assert!(body.contains("CatalogService"));
        assert!(body.contains("<h2>Services</h2>"));
    }

    #[tokio::test]
    async fn analyze_post_reports_missing_directory() {
        let project = spring_project();
        let missing = project.path().join("nope");
        let server = TestServer::new(routes(AnalyzerConfig::default())).unwrap();

        let response = server
            .post("/analyze")
            .json(&serde_json::json!({ "path": missing.to_string_lossy() }))
            .await;
        response.assert_status_ok();
        assert!(response.text().contains("Project path does not exist"));
    }

    #[tokio::test]
    async fn analyze_reports_empty_project() {
        let dir = tempfile::tempdir().unwrap();
        let server = TestServer::new(routes(AnalyzerConfig::default())).unwrap();

        let response = server
            .get("/analyze")
            .add_query_param("path", dir.path().to_string_lossy())
            .await;
        assert!(response.text().contains("No Spring Boot beans found"));
    }

    #[tokio::test]
    async fn analyze_without_path_is_an_error_page() {
        let server = TestServer::new(routes(AnalyzerConfig::default())).unwrap();
        let response = server.get("/analyze").await;
        assert!(response.text().contains("Missing 'path' parameter"));
    }
}
