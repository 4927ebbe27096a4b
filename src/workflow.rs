use crate::{
    analysis::{self, ReportSummary},
    backend::{Backend, Job},
    config::Config,
    payload::ReportPayload,
    task::{TaskClient, TaskState, WatchOutcome},
};
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const BLANK_REPO_MESSAGE: &str =
    "Please enter a repository URL, local file path, or directory path.";
pub const SCAN_DONE_MESSAGE: &str = "Repository scan completed successfully!";
pub const SCAN_EMPTY_OUTPUT: &str = "Scan completed with no output.";
pub const REPORT_DONE_MESSAGE: &str = "Report generation completed successfully!";

/// Result of a report run as the user sees it.
#[derive(Debug, Clone)]
pub struct ReportRun {
    pub payload_preview: String,
    pub state: TaskState,
    /// Single status line for display.
    pub message: String,
    pub markdown: Option<String>,
    pub summary: Option<ReportSummary>,
    pub detached_task: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ScanRun {
    pub state: TaskState,
    pub message: String,
    pub results: Option<String>,
    pub detached_task: Option<String>,
}

/// Submits a report job, follows it to the end, then opens the finished
/// report after `polling.redirect_delay_ms`.
pub fn run_report<B, F>(
    cfg: &Config,
    client: &mut TaskClient<B>,
    payload: ReportPayload,
    on_tick: F,
) -> Result<ReportRun>
where
    B: Backend,
    F: FnMut(&TaskState),
{
    let payload_preview =
        serde_json::to_string_pretty(&payload).with_context(|| "serializing payload preview")?;
    info!(
        "report payload os={} applications={} sources={}",
        payload.os.len(),
        payload.applications.len(),
        payload.sources.len()
    );

    let job = Job::Report(payload);
    if let Err(err) = client.submit(&job) {
        debug!("report submit ended the attempt: {err}");
    }
    let outcome = client.watch(on_tick);

    let mut run = ReportRun {
        payload_preview,
        state: client.state().clone(),
        message: String::new(),
        markdown: None,
        summary: None,
        detached_task: None,
    };

    let final_state = match outcome {
        WatchOutcome::Detached { task_id } => {
            run.message = format!("Stopped following task {task_id}; it continues on the server.");
            run.detached_task = Some(task_id);
            return Ok(run);
        }
        WatchOutcome::Finished(state) => state,
    };

    run.message = status_line(&final_state, REPORT_DONE_MESSAGE);
    if let TaskState::Completed { task_id, output, .. } = &final_state {
        let markdown = match (task_id, output) {
            // Legacy synchronous reply already carries the report.
            (None, Some(inline)) => Some(inline.clone()),
            (None, None) => None,
            (Some(_), _) => {
                redirect_pause(cfg);
                match client.backend().fetch_report() {
                    Ok(md) => Some(md),
                    Err(err) => {
                        warn!("report fetch after completion failed: {err:#}");
                        run.message = format!("{} {err:#}", run.message);
                        None
                    }
                }
            }
        };
        run.summary = markdown.as_deref().map(analysis::summarize);
        run.markdown = markdown;
    }
    Ok(run)
}

/// Submits a repository scan. `repo_url` may be a remote URL or a local path.
pub fn run_scan<B, F>(client: &mut TaskClient<B>, repo_url: &str, on_tick: F) -> ScanRun
where
    B: Backend,
    F: FnMut(&TaskState),
{
    let repo_url = repo_url.trim();
    if repo_url.is_empty() {
        return ScanRun {
            state: client.state().clone(),
            message: BLANK_REPO_MESSAGE.to_string(),
            results: None,
            detached_task: None,
        };
    }

    let job = Job::RepoScan {
        repo_url: repo_url.to_string(),
    };
    if let Err(err) = client.submit(&job) {
        debug!("scan submit ended the attempt: {err}");
    }

    match client.watch(on_tick) {
        WatchOutcome::Detached { task_id } => ScanRun {
            state: client.state().clone(),
            message: format!("Stopped following task {task_id}; it continues on the server."),
            results: None,
            detached_task: Some(task_id),
        },
        WatchOutcome::Finished(state) => {
            let results = match &state {
                TaskState::Completed { output, .. } => Some(
                    output
                        .clone()
                        .filter(|o| !o.is_empty())
                        .unwrap_or_else(|| SCAN_EMPTY_OUTPUT.to_string()),
                ),
                _ => None,
            };
            ScanRun {
                message: status_line(&state, SCAN_DONE_MESSAGE),
                state,
                results,
                detached_task: None,
            }
        }
    }
}

fn status_line(state: &TaskState, done: &str) -> String {
    match state {
        TaskState::Completed { task_id: Some(_), .. } => done.to_string(),
        TaskState::Completed { task_id: None, message, .. } => message.clone(),
        TaskState::SubmitFailed { message } => message.clone(),
        TaskState::Errored { error, .. } => error.to_string(),
        TaskState::Polling(p) => p.message.clone(),
        TaskState::Idle | TaskState::Submitting => String::new(),
    }
}

fn redirect_pause(cfg: &Config) {
    if cfg.polling.redirect_delay_ms > 0 {
        std::thread::sleep(Duration::from_millis(cfg.polling.redirect_delay_ms));
    }
}
