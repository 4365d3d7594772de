mod docker;

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use async_trait::async_trait;

use crate::error::Error;

pub use docker::DockerBackend;

/// A container as reported by the runtime. Read-only for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRecord {
    pub id: String,
    /// The first name is the canonical one for display.
    pub names: Vec<String>,
    pub state: ContainerState,
    /// Network name -> assigned address.
    pub networks: BTreeMap<String, String>,
}

impl ContainerRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, state: ContainerState) -> Self {
        Self {
            id: id.into(),
            names: vec![name.into()],
            state,
            networks: BTreeMap::new(),
        }
    }

    /// Reports records the table can only show in a degraded form.
    pub fn check(&self) -> Result<(), Error> {
        if self.id.is_empty() {
            return Err(Error::MalformedRecord("empty container id".to_string()));
        }
        match self.names.first() {
            Some(name) if !name.trim_start_matches('/').is_empty() => Ok(()),
            _ => Err(Error::MalformedRecord(format!(
                "container {} has no name",
                self.id
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerState {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
    /// Anything the runtime reports that we don't know about, kept verbatim.
    Unknown(String),
}

impl ContainerState {
    pub fn as_str(&self) -> &str {
        match self {
            ContainerState::Created => "created",
            ContainerState::Running => "running",
            ContainerState::Paused => "paused",
            ContainerState::Restarting => "restarting",
            ContainerState::Removing => "removing",
            ContainerState::Exited => "exited",
            ContainerState::Dead => "dead",
            ContainerState::Unknown(s) => s.as_str(),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ContainerState::Running)
    }
}

impl From<String> for ContainerState {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "created" => ContainerState::Created,
            "running" => ContainerState::Running,
            "paused" => ContainerState::Paused,
            "restarting" => ContainerState::Restarting,
            "removing" => ContainerState::Removing,
            "exited" => ContainerState::Exited,
            "dead" => ContainerState::Dead,
            _ => ContainerState::Unknown(s),
        }
    }
}

impl From<&str> for ContainerState {
    fn from(s: &str) -> Self {
        ContainerState::from(s.to_string())
    }
}

impl Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything the dashboard asks of the container runtime.
///
/// Each call maps to one request against the daemon and resolves when the
/// daemon answers, so callers must keep them off the render loop. `exec` and
/// `stream_logs` write their output to the terminal side channel instead of
/// returning it; `stream_logs` only returns once the log stream ends.
#[async_trait]
pub trait ContainerBackend: Send + Sync {
    async fn list(&self, include_stopped: bool) -> Result<Vec<ContainerRecord>, Error>;
    async fn filter_by_name(&self, name: &str) -> Result<Vec<ContainerRecord>, Error>;
    async fn filter_by_status(&self, status: &str) -> Result<Vec<ContainerRecord>, Error>;

    async fn start(&self, id: &str) -> Result<(), Error>;
    /// Uses the daemon's default grace period.
    async fn stop(&self, id: &str) -> Result<(), Error>;
    /// Uses the daemon's default grace period.
    async fn restart(&self, id: &str) -> Result<(), Error>;
    async fn pause(&self, id: &str) -> Result<(), Error>;
    async fn unpause(&self, id: &str) -> Result<(), Error>;
    /// Always forced, running or not.
    async fn remove(&self, id: &str) -> Result<(), Error>;

    async fn exec(&self, id: &str, argv: &[String]) -> Result<(), Error>;
    async fn stream_logs(&self, id: &str) -> Result<(), Error>;
    async fn network_info(&self, id: &str) -> Result<BTreeMap<String, String>, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_states_parse_case_insensitively() {
        assert_eq!(ContainerState::from("running"), ContainerState::Running);
        assert_eq!(ContainerState::from("Exited"), ContainerState::Exited);
        assert_eq!(ContainerState::from("dead"), ContainerState::Dead);
    }

    #[test]
    fn unknown_state_is_kept_verbatim() {
        let state = ContainerState::from("hibernating");
        assert_eq!(state, ContainerState::Unknown("hibernating".to_string()));
        assert_eq!(state.to_string(), "hibernating");
        assert_eq!(state.as_str(), "hibernating");
        assert!(!state.is_running());
    }

    #[test]
    fn check_flags_missing_name_and_id() {
        let ok = ContainerRecord::new("abc", "/web", ContainerState::Running);
        assert!(ok.check().is_ok());

        let mut nameless = ok.clone();
        nameless.names.clear();
        assert!(matches!(nameless.check(), Err(Error::MalformedRecord(_))));

        let mut slash_only = ok.clone();
        slash_only.names = vec!["/".to_string()];
        assert!(slash_only.check().is_err());

        let no_id = ContainerRecord::new("", "/web", ContainerState::Running);
        assert!(no_id.check().is_err());
    }
}
