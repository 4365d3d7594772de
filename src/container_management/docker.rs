use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use async_trait::async_trait;
use bollard::container::{
    InspectContainerOptions, ListContainersOptions, LogOutput, LogsOptions,
    RemoveContainerOptions, RestartContainerOptions, StartContainerOptions, StopContainerOptions,
};
use bollard::exec::{CreateExecOptions, StartExecResults};
use bollard::models::{ContainerSummary, EndpointSettings};
use bollard::Docker;
use futures::stream::StreamExt;
use log::{debug, info};

use super::{ContainerBackend, ContainerRecord, ContainerState};
use crate::error::Error;

/// `ContainerBackend` over the local Docker daemon.
#[derive(Clone)]
pub struct DockerBackend {
    docker: Docker,
}

impl DockerBackend {
    /// Builds a client from the local defaults (`DOCKER_HOST` or the unix socket).
    pub fn connect() -> Result<Self, Error> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| Error::BackendUnavailable(e.to_string()))?;
        Ok(Self { docker })
    }

    async fn list_with(
        &self,
        all: bool,
        filters: HashMap<String, Vec<String>>,
    ) -> Result<Vec<ContainerRecord>, Error> {
        let summaries = self
            .docker
            .list_containers(Some(ListContainersOptions::<String> {
                all,
                filters,
                ..Default::default()
            }))
            .await?;
        debug!("Daemon returned {} containers", summaries.len());
        Ok(summaries.into_iter().map(ContainerRecord::from).collect())
    }
}

#[async_trait]
impl ContainerBackend for DockerBackend {
    async fn list(&self, include_stopped: bool) -> Result<Vec<ContainerRecord>, Error> {
        self.list_with(include_stopped, HashMap::new()).await
    }

    async fn filter_by_name(&self, name: &str) -> Result<Vec<ContainerRecord>, Error> {
        let filters = HashMap::from([("name".to_string(), vec![name.to_string()])]);
        self.list_with(true, filters).await
    }

    async fn filter_by_status(&self, status: &str) -> Result<Vec<ContainerRecord>, Error> {
        let filters = HashMap::from([("status".to_string(), vec![status.to_string()])]);
        self.list_with(true, filters).await
    }

    async fn start(&self, id: &str) -> Result<(), Error> {
        self.docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await?;
        Ok(())
    }

    async fn stop(&self, id: &str) -> Result<(), Error> {
        self.docker
            .stop_container(id, None::<StopContainerOptions>)
            .await?;
        Ok(())
    }

    async fn restart(&self, id: &str) -> Result<(), Error> {
        self.docker
            .restart_container(id, None::<RestartContainerOptions>)
            .await?;
        Ok(())
    }

    async fn pause(&self, id: &str) -> Result<(), Error> {
        self.docker.pause_container(id).await?;
        Ok(())
    }

    async fn unpause(&self, id: &str) -> Result<(), Error> {
        self.docker.unpause_container(id).await?;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), Error> {
        self.docker
            .remove_container(
                id,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await?;
        Ok(())
    }

    async fn exec(&self, id: &str, argv: &[String]) -> Result<(), Error> {
        let exec = self
            .docker
            .create_exec(
                id,
                CreateExecOptions::<String> {
                    cmd: Some(argv.to_vec()),
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    ..Default::default()
                },
            )
            .await?;
        info!("Created exec {} in container {}", exec.id, id);

        if let StartExecResults::Attached { mut output, .. } =
            self.docker.start_exec(&exec.id, None).await?
        {
            while let Some(chunk) = output.next().await {
                forward_to_terminal(&chunk?)?;
            }
        }
        Ok(())
    }

    async fn stream_logs(&self, id: &str) -> Result<(), Error> {
        let mut logs = Box::pin(self.docker.logs(
            id,
            Some(LogsOptions::<String> {
                follow: true,
                stdout: true,
                stderr: true,
                ..Default::default()
            }),
        ));
        while let Some(chunk) = logs.next().await {
            forward_to_terminal(&chunk?)?;
        }
        info!("Log stream for {} ended", id);
        Ok(())
    }

    async fn network_info(&self, id: &str) -> Result<BTreeMap<String, String>, Error> {
        let inspect = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await?;
        Ok(addresses(
            inspect
                .network_settings
                .and_then(|settings| settings.networks),
        ))
    }
}

impl From<ContainerSummary> for ContainerRecord {
    fn from(summary: ContainerSummary) -> Self {
        ContainerRecord {
            id: summary.id.unwrap_or_default(),
            names: summary.names.unwrap_or_default(),
            state: ContainerState::from(summary.state.unwrap_or_default()),
            networks: addresses(
                summary
                    .network_settings
                    .and_then(|settings| settings.networks),
            ),
        }
    }
}

fn addresses(networks: Option<HashMap<String, EndpointSettings>>) -> BTreeMap<String, String> {
    networks
        .unwrap_or_default()
        .into_iter()
        .map(|(name, endpoint)| (name, endpoint.ip_address.unwrap_or_default()))
        .collect()
}

/// Writes exec/log output straight to the process stdout, sharing the
/// terminal with the dashboard. The terminal is in raw mode, so line feeds
/// need an explicit carriage return.
fn forward_to_terminal(chunk: &LogOutput) -> Result<(), Error> {
    let text = format!("{}", chunk).replace('\n', "\r\n");
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
