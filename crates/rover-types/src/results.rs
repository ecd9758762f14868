//! Command results and the script events that carry them.
//!
//! A command's outcome always has one of two shapes: success with zero or
//! more values, or failure with a message. Completions reach scripts as a
//! [`ScriptEvent`] named [`RESPONSE_EVENT`] whose arguments are
//! `[command_id, success, ...values]` or `[command_id, false, message]`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::ids::CommandId;

/// Event name used for every command completion of an actor.
pub const RESPONSE_EVENT: &str = "actor_response";

/// Outcome of executing one command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "status", content = "payload", rename_all = "snake_case")]
pub enum CommandResult {
    /// The command did what it was asked to do.
    Success(Vec<Value>),
    /// The command failed for a domain reason (obstruction, no fuel, ...).
    Failure(String),
}

impl CommandResult {
    /// Success without values.
    pub const fn success() -> Self {
        Self::Success(Vec::new())
    }

    /// Success carrying result values.
    pub const fn success_with(values: Vec<Value>) -> Self {
        Self::Success(values)
    }

    /// Failure with a message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    /// Whether this is the success shape.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The failure message, if any.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(message) => Some(message),
        }
    }

    /// Build the completion event for the command this result belongs to.
    pub fn into_event(self, id: CommandId) -> ScriptEvent {
        let mut args = vec![Value::from(id.get())];
        match self {
            Self::Success(values) => {
                args.push(Value::Bool(true));
                args.extend(values);
            }
            Self::Failure(message) => {
                args.push(Value::Bool(false));
                args.push(Value::String(message));
            }
        }
        ScriptEvent {
            name: RESPONSE_EVENT.to_owned(),
            args,
        }
    }
}

/// A generic event queued to a script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ScriptEvent {
    /// Event name.
    pub name: String,
    /// Positional arguments.
    pub args: Vec<Value>,
}

impl ScriptEvent {
    /// Construct an event.
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}
