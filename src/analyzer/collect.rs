use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use thiserror::Error;

use super::cmd::run_analyzer;
use super::graph::ProjectGraph;
use super::parse::{AnalysisEvent, AnalysisStatistics, RawGraph, validate_graph};

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("failed to launch analyzer: {0}")]
    Spawn(String),
    #[error("analysis failed: {0}")]
    Failed(String),
    #[error("analysis cancelled")]
    Cancelled,
    #[error("analyzer exited without reporting a result")]
    Disconnected,
}

#[derive(Clone, Debug, Default)]
pub struct AnalysisProgress {
    pub files_processed: usize,
    pub total_files: usize,
    pub current_file: Option<String>,
}

/// Run `analyzer analyze <project>` to completion, forwarding progress
/// events as they stream in. Blocks the calling thread; the app runs it on
/// a worker thread and polls the result over a channel.
pub fn collect_project_graph(
    analyzer: &str,
    project_path: &str,
    cancel: &Arc<AtomicBool>,
    mut on_progress: impl FnMut(AnalysisProgress),
) -> Result<ProjectGraph, AnalyzerError> {
    let mut child = Command::new(analyzer)
        .args(["analyze", project_path])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|error| AnalyzerError::Spawn(format!("{analyzer}: {error}")))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| AnalyzerError::Spawn(format!("{analyzer}: no stdout pipe")))?;

    let mut outcome = None;
    for line in BufReader::new(stdout).lines() {
        if cancel.load(Ordering::Relaxed) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(AnalyzerError::Cancelled);
        }

        let line = match line {
            Ok(line) => line,
            Err(error) => {
                tracing::warn!("analyzer stream ended early: {error}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<AnalysisEvent>(&line) {
            Ok(AnalysisEvent::InProgress {
                files_processed,
                total_files,
                current_file,
            }) => on_progress(AnalysisProgress {
                files_processed,
                total_files,
                current_file,
            }),
            Ok(AnalysisEvent::Complete { graph, statistics }) => {
                outcome = Some((graph, statistics));
                break;
            }
            Ok(AnalysisEvent::Error { message }) => {
                let _ = child.wait();
                return Err(AnalyzerError::Failed(message));
            }
            Ok(AnalysisEvent::Cancelled) => {
                let _ = child.wait();
                return Err(AnalyzerError::Cancelled);
            }
            Err(error) => {
                // Tolerate stray non-protocol lines rather than aborting a
                // long analysis over one of them.
                tracing::warn!("skipping malformed analyzer event: {error}");
            }
        }
    }

    let _ = child.wait();
    let (raw_graph, statistics) = outcome.ok_or(AnalyzerError::Disconnected)?;
    Ok(build_graph(project_path, raw_graph, statistics))
}

/// One-shot graph fetch, used to refresh after a visibility toggle.
pub fn fetch_project_graph(analyzer: &str, project_path: &str) -> Result<ProjectGraph> {
    let raw = run_analyzer(analyzer, &["graph", project_path])
        .with_context(|| format!("failed to fetch graph for {project_path}"))?;
    let raw_graph: RawGraph =
        serde_json::from_str(&raw).context("invalid graph JSON from analyzer")?;
    Ok(build_graph(project_path, raw_graph, None))
}

pub fn set_file_hidden(
    analyzer: &str,
    project_path: &str,
    file_id: &str,
    hidden: bool,
) -> Result<()> {
    let flag = if hidden { "true" } else { "false" };
    run_analyzer(analyzer, &["set-hidden", project_path, file_id, flag])
        .with_context(|| format!("failed to toggle visibility of {file_id}"))?;
    Ok(())
}

fn build_graph(
    project_path: &str,
    raw_graph: RawGraph,
    statistics: Option<AnalysisStatistics>,
) -> ProjectGraph {
    let (nodes, edges) = validate_graph(raw_graph);
    let graph = ProjectGraph::new(project_path.to_owned(), nodes, edges);
    let reported = statistics.unwrap_or_default();
    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        dropped_edges = graph.stats.dropped_edges,
        reported_files = reported.files,
        reported_symbols = reported.symbols,
        reported_relationships = reported.relationships,
        "analysis result loaded"
    );
    graph
}
