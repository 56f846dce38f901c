// Docker container stats via bollard

mod stats;

use crate::collector::ContainerRuntime;
use crate::error::RuntimeError;
use crate::models::{ContainerHandle, ContainerMetadata, ContainerState, RawContainerStats};
use async_trait::async_trait;
use bollard::{API_DEFAULT_VERSION, Docker};
use bollard::exec::{StartExecOptions, StartExecResults};
use bollard::models::ExecConfig;
use bollard::query_parameters::{InspectContainerOptions, ListContainersOptions, StatsOptions};
use futures_util::StreamExt;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::instrument;

const CONNECT_TIMEOUT_SECS: u64 = 120;

/// Docker client that connects on first use. A missing socket or daemon is
/// reported as `RuntimeError::Unavailable` by whichever call needed it, and the
/// next call tries again.
pub struct DockerRepo {
    socket: Option<String>,
    client: Mutex<Option<Docker>>,
}

impl DockerRepo {
    /// `socket` overrides DOCKER_HOST and the platform's default socket.
    pub fn new(socket: Option<&str>) -> Self {
        Self {
            socket: socket.map(str::to_string),
            client: Mutex::new(None),
        }
    }

    fn client(&self) -> Result<Docker, RuntimeError> {
        let mut slot = self.client.lock().map_err(|e| {
            RuntimeError::Unavailable(format!("docker client lock poisoned: {}", e))
        })?;
        if let Some(docker) = slot.as_ref() {
            return Ok(docker.clone());
        }
        let docker = match &self.socket {
            Some(path) => {
                Docker::connect_with_socket(path, CONNECT_TIMEOUT_SECS, API_DEFAULT_VERSION)
            }
            None => Docker::connect_with_local_defaults(),
        }
        .map_err(map_bollard_error)?;
        *slot = Some(docker.clone());
        Ok(docker)
    }
}

fn map_bollard_error(e: bollard::errors::Error) -> RuntimeError {
    match e {
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404,
            message,
        } => RuntimeError::NotFound(message),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } => RuntimeError::Api(format!("{} {}", status_code, message)),
        other => RuntimeError::Unavailable(other.to_string()),
    }
}

#[async_trait]
impl ContainerRuntime for DockerRepo {
    #[instrument(skip(self), fields(repo = "docker", operation = "list_running"))]
    async fn list_running(&self) -> Result<Vec<ContainerHandle>, RuntimeError> {
        let mut filters = HashMap::new();
        filters.insert("status".to_string(), vec!["running".to_string()]);

        let filter = ListContainersOptions {
            all: false,
            filters: Some(filters),
            ..Default::default()
        };

        let containers = self
            .client()?
            .list_containers(Some(filter))
            .await
            .map_err(map_bollard_error)?;

        Ok(containers
            .into_iter()
            .map(|c| {
                let id = c.id.unwrap_or_default();
                let name = c
                    .names
                    .as_ref()
                    .and_then(|n| n.first())
                    .cloned()
                    .unwrap_or_else(|| id.clone());
                let name = name.trim_start_matches('/').to_string();
                ContainerHandle { id, name }
            })
            .collect())
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "stats", container = %container.name))]
    async fn stats(&self, container: &ContainerHandle) -> Result<RawContainerStats, RuntimeError> {
        let options = StatsOptions {
            stream: false,
            ..Default::default()
        };
        let docker = self.client()?;
        let mut stream = docker.stats(&container.id, Some(options));
        match stream.next().await {
            Some(Ok(s)) => stats::raw_stats(&s),
            Some(Err(e)) => Err(map_bollard_error(e)),
            None => Err(RuntimeError::Api(format!(
                "empty stats stream for container {}",
                container.name
            ))),
        }
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "inspect", container = %container.name))]
    async fn inspect(
        &self,
        container: &ContainerHandle,
    ) -> Result<ContainerMetadata, RuntimeError> {
        let info = self
            .client()?
            .inspect_container(&container.id, None::<InspectContainerOptions>)
            .await
            .map_err(map_bollard_error)?;
        let status = info
            .state
            .as_ref()
            .and_then(|s| s.status.as_ref())
            .map(|s| ContainerState::from_docker(&s.to_string()))
            .unwrap_or(ContainerState::Unknown);
        Ok(ContainerMetadata {
            status,
            restart_count: info.restart_count.unwrap_or(0).max(0) as u64,
        })
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "exec_probe", container = %container.name))]
    async fn exec_probe(
        &self,
        container: &ContainerHandle,
        command: &str,
    ) -> Result<i64, RuntimeError> {
        let config = ExecConfig {
            cmd: Some(vec!["sh".into(), "-c".into(), command.to_string()]),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..Default::default()
        };
        let docker = self.client()?;
        let exec = docker
            .create_exec(&container.id, config)
            .await
            .map_err(map_bollard_error)?;

        let started = docker
            .start_exec(
                &exec.id,
                Some(StartExecOptions {
                    detach: false,
                    ..Default::default()
                }),
            )
            .await
            .map_err(map_bollard_error)?;
        // Drain output so the command runs to completion before inspecting.
        if let StartExecResults::Attached { mut output, .. } = started {
            while let Some(chunk) = output.next().await {
                chunk.map_err(map_bollard_error)?;
            }
        }

        let inspect = docker
            .inspect_exec(&exec.id)
            .await
            .map_err(map_bollard_error)?;
        Ok(inspect.exit_code.unwrap_or(-1))
    }
}
