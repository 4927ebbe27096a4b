use thiserror::Error;

/// Failures that end a task attempt. Each one is shown to the user as text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// Submit was refused: non-2xx, a transport failure (`status` is `None`),
    /// or a 2xx body carrying neither a task id nor output.
    #[error("{message}")]
    SubmitRejected { status: Option<u16>, message: String },

    /// A status request failed below the application layer. No retry.
    #[error("Error checking task status: {message}")]
    PollTransport { task_id: String, message: String },

    /// The server reported `status: "error"` for the task.
    #[error("Error: {message}")]
    ServerReported { task_id: String, message: String },
}

impl TaskError {
    pub fn task_id(&self) -> Option<&str> {
        match self {
            TaskError::SubmitRejected { .. } => None,
            TaskError::PollTransport { task_id, .. } | TaskError::ServerReported { task_id, .. } => {
                Some(task_id.as_str())
            }
        }
    }
}
