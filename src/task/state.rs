use crate::backend::TaskStatus;
use crate::error::TaskError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskProgress {
    pub task_id: String,
    /// 0..=100. Not monotonic: every poll reply overwrites it.
    pub progress: u8,
    pub message: String,
}

impl TaskProgress {
    pub fn started(task_id: String, message: String) -> Self {
        Self {
            task_id,
            progress: 0,
            message,
        }
    }

    /// Overwrites progress and message with the reply's values.
    pub fn apply(&mut self, status: &TaskStatus) {
        self.progress = status.progress.clamp(0, 100) as u8;
        self.message = status.message.clone();
    }
}

/// Lifecycle of one task attempt.
///
/// `Idle -> Submitting -> (SubmitFailed | Polling)`, then
/// `Polling -> (Polling | Completed | Errored)`. `SubmitFailed`, `Completed`
/// and `Errored` are terminal for the attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Submitting,
    SubmitFailed {
        message: String,
    },
    Polling(TaskProgress),
    Completed {
        /// `None` when the server answered the submit synchronously.
        task_id: Option<String>,
        output: Option<String>,
        message: String,
    },
    Errored {
        task_id: String,
        error: TaskError,
    },
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::SubmitFailed { .. } | TaskState::Completed { .. } | TaskState::Errored { .. }
        )
    }

    pub fn active_task_id(&self) -> Option<&str> {
        match self {
            TaskState::Polling(p) => Some(&p.task_id),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TaskState::Idle => "idle",
            TaskState::Submitting => "submitting",
            TaskState::SubmitFailed { .. } => "submit_failed",
            TaskState::Polling(_) => "polling",
            TaskState::Completed { .. } => "completed",
            TaskState::Errored { .. } => "errored",
        }
    }
}

/// Stops a polling loop from outside it. Cancelling only releases the
/// client side; the server keeps running the job.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
