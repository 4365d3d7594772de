pub mod handler;

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use tokio::sync::oneshot;

use crate::container_management::ContainerRecord;
use crate::error::Error;

/// A backend request the UI asks the runner to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    List,
    FilterByName(String),
    FilterByStatus(String),
    Start(String),
    Stop(String),
    Restart(String),
    Pause(String),
    Unpause(String),
    Remove(String),
    Exec { id: String, argv: Vec<String> },
    ShowLogs(String),
    NetworkInfo(String),
}

impl Operation {
    /// What the pending view says while the call runs.
    pub fn pending_message(&self) -> &'static str {
        match self {
            Operation::List | Operation::FilterByName(_) | Operation::FilterByStatus(_) => {
                "Loading containers.."
            }
            Operation::Start(_) => "Starting container..",
            Operation::Stop(_) => "Stopping container..",
            Operation::Restart(_) => "Restarting container..",
            Operation::Pause(_) => "Pausing container..",
            Operation::Unpause(_) => "Unpausing container..",
            Operation::Remove(_) => "Deleting container..",
            Operation::Exec { .. } => "Executing command..",
            Operation::ShowLogs(_) => "Fetching container logs..",
            Operation::NetworkInfo(_) => "Inspecting container networks..",
        }
    }

    /// Operations whose output is written straight to the terminal.
    pub fn writes_to_terminal(&self) -> bool {
        matches!(self, Operation::Exec { .. } | Operation::ShowLogs(_))
    }

    /// List-like operations populate a table instead of ending in a message.
    pub fn is_listing(&self) -> bool {
        matches!(
            self,
            Operation::List | Operation::FilterByName(_) | Operation::FilterByStatus(_)
        )
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::List => write!(f, "list containers"),
            Operation::FilterByName(name) => write!(f, "filter by name '{}'", name),
            Operation::FilterByStatus(status) => write!(f, "filter by status '{}'", status),
            Operation::Start(id) => write!(f, "start {}", id),
            Operation::Stop(id) => write!(f, "stop {}", id),
            Operation::Restart(id) => write!(f, "restart {}", id),
            Operation::Pause(id) => write!(f, "pause {}", id),
            Operation::Unpause(id) => write!(f, "unpause {}", id),
            Operation::Remove(id) => write!(f, "remove {}", id),
            Operation::Exec { id, argv } => write!(f, "exec {:?} in {}", argv, id),
            Operation::ShowLogs(id) => write!(f, "logs of {}", id),
            Operation::NetworkInfo(id) => write!(f, "network info of {}", id),
        }
    }
}

/// Successful payload of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Containers(Vec<ContainerRecord>),
    Networks(BTreeMap<String, String>),
}

pub type ActionResult = Result<Outcome, Error>;

#[derive(Debug)]
pub enum IoEvent {
    /// Run `operation` in the background and answer exactly once on `reply`.
    Perform {
        operation: Operation,
        reply: oneshot::Sender<ActionResult>,
    },
}
