pub mod state;
pub mod submit;

use crate::{
    backend::{Backend, Job, PollStatus},
    config::Config,
    error::TaskError,
};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub use state::{CancelHandle, TaskProgress, TaskState};
pub use submit::Submission;

const CANCEL_CHECK: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    /// Loop ended on its own; the state is whatever it ended in.
    Finished(TaskState),
    /// Caller cancelled. The job behind `task_id` was not stopped.
    Detached { task_id: String },
}

/// Drives one task at a time through submit and polling.
///
/// Requests are issued one after another from the calling thread, so poll
/// replies are applied in the order they were requested. Each reply is a
/// full snapshot that replaces the previous progress and message.
pub struct TaskClient<B: Backend> {
    cfg: Config,
    backend: B,
    state: TaskState,
    cancel: CancelHandle,
}

impl<B: Backend> TaskClient<B> {
    pub fn new(cfg: &Config, backend: B) -> Self {
        Self {
            cfg: cfg.clone(),
            backend,
            state: TaskState::Idle,
            cancel: CancelHandle::new(),
        }
    }

    pub fn state(&self) -> &TaskState {
        &self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Handle for tearing down the polling loop from elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Starts a new attempt from `Idle`. Callers must not submit while a task
    /// is still being polled; nothing here prevents it.
    pub fn submit(&mut self, job: &Job) -> Result<Submission, TaskError> {
        self.state = TaskState::Idle;
        self.cancel.reset();

        self.state = TaskState::Submitting;
        info!("submitting {}", job.label());

        let reply = match self.backend.submit(job) {
            Ok(reply) => reply,
            Err(err) => {
                warn!("submit transport failure: {err:#}");
                let error = TaskError::SubmitRejected {
                    status: None,
                    message: format!("Failed to submit {} request: {err:#}", job.label()),
                };
                self.state = TaskState::SubmitFailed {
                    message: error.to_string(),
                };
                return Err(error);
            }
        };
        debug!("submit reply status={}", reply.status);

        let outcome = submit::classify(job, &reply);
        self.state = match &outcome {
            Ok(Submission::Started { task_id, message }) => {
                info!("task started task_id={task_id}");
                TaskState::Polling(TaskProgress::started(task_id.clone(), message.clone()))
            }
            Ok(Submission::Finished { output, message }) => {
                warn!("server answered synchronously with inline output (deprecated protocol)");
                TaskState::Completed {
                    task_id: None,
                    output: Some(output.clone()),
                    message: message.clone(),
                }
            }
            Ok(Submission::Acknowledged { message }) => {
                warn!("submit succeeded but the reply was not JSON");
                TaskState::Completed {
                    task_id: None,
                    output: None,
                    message: message.clone(),
                }
            }
            Err(err) => {
                warn!("submit rejected: {err}");
                TaskState::SubmitFailed {
                    message: err.to_string(),
                }
            }
        };
        outcome
    }

    /// One status request for the active task. No-op outside `Polling`.
    pub fn poll_once(&mut self) -> &TaskState {
        if let Some(task_id) = self.state.active_task_id().map(str::to_string) {
            if let Some(next) = self.tick(&task_id) {
                self.state = next;
            }
        }
        &self.state
    }

    fn tick(&mut self, task_id: &str) -> Option<TaskState> {
        let status = match self.backend.task_status(task_id) {
            Ok(status) => status,
            Err(err) => {
                error!("Error checking task status: {err:#}");
                return Some(TaskState::Errored {
                    task_id: task_id.to_string(),
                    error: TaskError::PollTransport {
                        task_id: task_id.to_string(),
                        message: format!("{err:#}"),
                    },
                });
            }
        };

        debug!(
            "poll task_id={task_id} status={:?} progress={} message={}",
            status.status, status.progress, status.message
        );
        if let TaskState::Polling(progress) = &mut self.state {
            progress.apply(&status);
        }

        match status.status {
            PollStatus::Completed => {
                info!("task completed task_id={task_id}");
                Some(TaskState::Completed {
                    task_id: Some(task_id.to_string()),
                    output: status.output,
                    message: status.message,
                })
            }
            PollStatus::Error => {
                warn!("task reported error task_id={task_id}: {}", status.message);
                Some(TaskState::Errored {
                    task_id: task_id.to_string(),
                    error: TaskError::ServerReported {
                        task_id: task_id.to_string(),
                        message: status.message,
                    },
                })
            }
            PollStatus::Pending | PollStatus::Running | PollStatus::Unknown => None,
        }
    }

    /// Polls every `polling.interval_ms` until the task reaches a terminal
    /// state or the cancel handle fires. `on_tick` sees the state after each
    /// request.
    pub fn watch<F: FnMut(&TaskState)>(&mut self, mut on_tick: F) -> WatchOutcome {
        let interval = Duration::from_millis(self.cfg.polling.interval_ms);
        while let Some(task_id) = self.state.active_task_id().map(str::to_string) {
            if !wait_unless_cancelled(&self.cancel, interval) {
                return self.detach(task_id);
            }
            self.poll_once();
            on_tick(&self.state);
        }
        WatchOutcome::Finished(self.state.clone())
    }

    /// Stops tracking the active task without waiting for it. Returns the
    /// task id that was dropped, if any.
    pub fn abort(&mut self) -> Option<String> {
        let task_id = self.state.active_task_id()?.to_string();
        match self.detach(task_id) {
            WatchOutcome::Detached { task_id } => Some(task_id),
            WatchOutcome::Finished(_) => None,
        }
    }

    fn detach(&mut self, task_id: String) -> WatchOutcome {
        warn!("stopped polling task_id={task_id}; the server-side job is still running");
        self.state = TaskState::Idle;
        WatchOutcome::Detached { task_id }
    }
}

/// Sleeps for `interval`, waking early to check `cancel`. Returns `false` if
/// cancelled.
fn wait_unless_cancelled(cancel: &CancelHandle, interval: Duration) -> bool {
    let start = Instant::now();
    loop {
        if cancel.is_cancelled() {
            return false;
        }
        let elapsed = start.elapsed();
        if elapsed >= interval {
            return true;
        }
        std::thread::sleep((interval - elapsed).min(CANCEL_CHECK));
    }
}
