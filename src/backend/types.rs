use crate::payload::ReportPayload;
use serde::{Deserialize, Serialize};

/// A job the server runs out-of-band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    Report(ReportPayload),
    RepoScan { repo_url: String },
}

impl Job {
    pub fn label(&self) -> &'static str {
        match self {
            Job::Report(_) => "Report generation",
            Job::RepoScan { .. } => "Repository scan",
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            Job::Report(_) => "/api/generate/",
            Job::RepoScan { .. } => "/api/scan/repo/",
        }
    }

    pub fn body(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Job::Report(payload) => serde_json::to_value(payload),
            Job::RepoScan { repo_url } => Ok(serde_json::json!({ "repo_url": repo_url })),
        }
    }
}

/// Status line and body of a submit response, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    pub status: u16,
    pub body: String,
}

impl RawReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 2xx submit body. Both the task-handle and the legacy inline-output shapes
/// deserialize into this.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitBody {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    Pending,
    Running,
    Completed,
    Error,
    #[serde(other)]
    Unknown,
}

impl PollStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, PollStatus::Completed | PollStatus::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub status: PollStatus,
    #[serde(default)]
    pub progress: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReply {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub config: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConfig {
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default)]
    pub raw_content: String,
}
