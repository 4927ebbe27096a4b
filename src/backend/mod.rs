pub mod http;
pub mod types;

use anyhow::Result;
use std::path::Path;

pub use types::{CurrentConfig, Job, PollStatus, RawReply, SubmitBody, TaskStatus, UploadReply};

/// Server-side job API. `Err` from any method means the request did not
/// produce a usable reply (transport failure, or an unreadable body where
/// JSON is required).
pub trait Backend {
    /// Posts a job. Any HTTP status comes back as a reply; only transport
    /// failures are errors.
    fn submit(&self, job: &Job) -> Result<RawReply>;
    fn task_status(&self, task_id: &str) -> Result<TaskStatus>;
    /// Current report markdown, bypassing caches.
    fn fetch_report(&self) -> Result<String>;
    fn download_template(&self) -> Result<Vec<u8>>;
    fn upload_config(&self, file: &Path) -> Result<UploadReply>;
    fn current_config(&self) -> Result<CurrentConfig>;
}
