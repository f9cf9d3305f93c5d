use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::EnvError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub status: CommandStatus,
    pub message: String,
    #[serde(default)]
    pub details: Value,
}

impl ExecutionOutcome {
    pub fn success(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::Ok,
            message: message.into(),
            details,
        }
    }

    pub fn failure(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::Failure,
            message: message.into(),
            details,
        }
    }

    pub fn user_error(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::UserError,
            message: message.into(),
            details,
        }
    }

    /// Map an environment error to the outcome shown to the user. I/O
    /// failures are ours; everything else is about the user's environments.
    pub fn from_env_error(err: &EnvError) -> Self {
        let mut message = err.to_string();
        if let EnvError::Io { source, .. } = err {
            message = format!("{message}: {source}");
            return Self::failure(message, err.details());
        }
        if let Some(first) = message.get(..1) {
            message = format!("{}{}", first.to_uppercase(), &message[1..]);
        }
        Self::user_error(message, err.details())
    }

    pub fn is_ok(&self) -> bool {
        self.status == CommandStatus::Ok
    }

    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommandStatus {
    Ok,
    UserError,
    Failure,
}

impl CommandStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::UserError => "user-error",
            Self::Failure => "error",
        }
    }

    pub fn exit_code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::UserError | Self::Failure => 1,
        }
    }
}

/// JSON envelope printed under `--json`.
pub fn to_json_response(command: &str, outcome: &ExecutionOutcome) -> Value {
    let details = match &outcome.details {
        Value::Object(_) => outcome.details.clone(),
        Value::Null => json!({}),
        other => json!({ "value": other }),
    };
    json!({
        "status": outcome.status.as_str(),
        "message": format_status_message(command, &outcome.message),
        "details": details,
    })
}

pub fn format_status_message(command: &str, message: &str) -> String {
    let prefix = format!("uvn {command}");
    if message.is_empty() {
        prefix
    } else if message.starts_with(&prefix) {
        message.to_string()
    } else {
        format!("{prefix}: {message}")
    }
}
