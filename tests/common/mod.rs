#![allow(dead_code)]

use anyhow::{Result, anyhow};
use intellihunt_client::{
    backend::{Backend, CurrentConfig, Job, PollStatus, RawReply, TaskStatus, UploadReply},
    config::Config,
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::Path;

/// In-memory backend that replays canned replies and counts requests.
#[derive(Default)]
pub struct ScriptedBackend {
    pub submit_replies: RefCell<VecDeque<Result<RawReply>>>,
    pub poll_replies: RefCell<VecDeque<Result<TaskStatus>>>,
    pub report: Option<String>,
    pub submitted: RefCell<Vec<Job>>,
    pub polls: Cell<usize>,
    pub report_fetches: Cell<usize>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_submit(self, status: u16, body: &str) -> Self {
        self.submit_replies.borrow_mut().push_back(Ok(RawReply {
            status,
            body: body.to_string(),
        }));
        self
    }

    pub fn on_submit_err(self, msg: &str) -> Self {
        self.submit_replies
            .borrow_mut()
            .push_back(Err(anyhow!(msg.to_string())));
        self
    }

    pub fn then_status(self, status: PollStatus, progress: i64, message: &str) -> Self {
        self.poll_replies
            .borrow_mut()
            .push_back(Ok(task_status(status, progress, message, None)));
        self
    }

    pub fn then_completed(self, output: Option<&str>) -> Self {
        self.poll_replies.borrow_mut().push_back(Ok(task_status(
            PollStatus::Completed,
            100,
            "done",
            output.map(str::to_string),
        )));
        self
    }

    pub fn then_poll_err(self, msg: &str) -> Self {
        self.poll_replies
            .borrow_mut()
            .push_back(Err(anyhow!(msg.to_string())));
        self
    }

    pub fn with_report(mut self, md: &str) -> Self {
        self.report = Some(md.to_string());
        self
    }
}

impl Backend for ScriptedBackend {
    fn submit(&self, job: &Job) -> Result<RawReply> {
        self.submitted.borrow_mut().push(job.clone());
        self.submit_replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted submit reply")))
    }

    fn task_status(&self, _task_id: &str) -> Result<TaskStatus> {
        self.polls.set(self.polls.get() + 1);
        self.poll_replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted poll reply")))
    }

    fn fetch_report(&self) -> Result<String> {
        self.report_fetches.set(self.report_fetches.get() + 1);
        self.report
            .clone()
            .ok_or_else(|| anyhow!("Report fetch failed: 404"))
    }

    fn download_template(&self) -> Result<Vec<u8>> {
        Ok(b"inventory: []\n".to_vec())
    }

    fn upload_config(&self, _file: &Path) -> Result<UploadReply> {
        Ok(UploadReply {
            message: "Configuration uploaded".into(),
            config: serde_json::json!({"inventory": []}),
        })
    }

    fn current_config(&self) -> Result<CurrentConfig> {
        Ok(CurrentConfig {
            config: serde_json::json!({"inventory": []}),
            raw_content: "inventory: []\n".into(),
        })
    }
}

pub fn task_status(
    status: PollStatus,
    progress: i64,
    message: &str,
    output: Option<String>,
) -> TaskStatus {
    TaskStatus {
        status,
        progress,
        message: message.to_string(),
        output,
        duration: None,
    }
}

/// Config with no waiting between polls or before the report fetch.
pub fn fast_config() -> Config {
    let mut cfg = Config::default();
    cfg.polling.interval_ms = 0;
    cfg.polling.redirect_delay_ms = 0;
    cfg
}

pub const STARTED_T1: &str = r#"{"status": "started", "task_id": "t1", "message": "queued"}"#;
