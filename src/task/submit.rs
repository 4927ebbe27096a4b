use crate::backend::{Job, RawReply, SubmitBody};
use crate::error::TaskError;

pub const NO_OUTPUT_MESSAGE: &str = "Script ran, but no report content was returned.";
pub const NON_JSON_MESSAGE: &str =
    "Report generated, but received an unexpected non-JSON response.";
const STARTED_MESSAGE: &str = "Task started.";
const INLINE_MESSAGE: &str = "Report generated successfully.";

/// What an accepted submit turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Server queued the job; poll `task_id`.
    Started { task_id: String, message: String },
    /// Legacy synchronous shape: the job already ran and `output` is final.
    Finished { output: String, message: String },
    /// 2xx whose body was not JSON. Treated as done, with nothing to show.
    Acknowledged { message: String },
}

/// Interprets a submit reply. The task id decides; inline output is only
/// honoured when the server also says `status: "success"`.
pub fn classify(job: &Job, reply: &RawReply) -> Result<Submission, TaskError> {
    if !reply.is_success() {
        return Err(TaskError::SubmitRejected {
            status: Some(reply.status),
            message: rejection_message(job, reply),
        });
    }

    let body: SubmitBody = match serde_json::from_str(&reply.body) {
        Ok(body) => body,
        Err(_) => {
            return Ok(Submission::Acknowledged {
                message: NON_JSON_MESSAGE.to_string(),
            });
        }
    };

    if let Some(task_id) = body.task_id.filter(|id| !id.trim().is_empty()) {
        return Ok(Submission::Started {
            task_id,
            message: body.message.unwrap_or_else(|| STARTED_MESSAGE.to_string()),
        });
    }

    if body.status.as_deref() == Some("success") {
        if let Some(output) = body.output.filter(|o| !o.is_empty()) {
            return Ok(Submission::Finished {
                output,
                message: body.message.unwrap_or_else(|| INLINE_MESSAGE.to_string()),
            });
        }
    }

    Err(TaskError::SubmitRejected {
        status: Some(reply.status),
        message: body
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| NO_OUTPUT_MESSAGE.to_string()),
    })
}

/// A JSON body supplies the message (its `message` field, else the body
/// itself). Anything that is not JSON falls back to the status code.
fn rejection_message(job: &Job, reply: &RawReply) -> String {
    let generic = format!("{} failed: {}", job.label(), reply.status);
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&reply.body) else {
        return generic;
    };
    if let Some(msg) = value.get("message").and_then(|m| m.as_str()) {
        if !msg.is_empty() {
            return format!("Server Error: {msg}");
        }
    }
    let text = reply.body.trim();
    if text.is_empty() {
        generic
    } else {
        text.to_string()
    }
}
