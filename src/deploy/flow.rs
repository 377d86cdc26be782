//! Deploy decision flow: clone if needed, then compose or Dockerfile.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use super::compose::{find_compose_file, rewrite_compose_file};
use super::docker::{Toolchain, container_name, image_name};
use super::inspect::{self, StatusReport};
use super::runner::CommandRunner;
use crate::config::LaunchpadConfig;
use crate::errors::DeployError;

pub const MISSING_DEPLOY_PARAMS: &str = "Missing parameters: nombre, link and puerto";
pub const MISSING_NOMBRE: &str = "Missing parameter 'nombre'";

/// A validated deploy request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    pub nombre: String,
    pub link: String,
    pub puerto: u16,
}

impl DeployRequest {
    /// Validate raw request parameters. `puerto` may be a JSON number or string.
    pub fn from_params(
        nombre: Option<&str>,
        link: Option<&str>,
        puerto: Option<&Value>,
    ) -> Result<Self, DeployError> {
        let nombre = nombre.map(str::trim).filter(|s| !s.is_empty());
        let link = link.map(str::trim).filter(|s| !s.is_empty());
        let puerto = puerto.filter(|v| is_present(v));

        let (Some(nombre), Some(link), Some(puerto)) = (nombre, link, puerto) else {
            return Err(DeployError::InvalidRequest(MISSING_DEPLOY_PARAMS.to_string()));
        };

        Ok(Self {
            nombre: validate_name(nombre)?.to_string(),
            link: validate_link(link)?.to_string(),
            puerto: parse_port(puerto)?,
        })
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

fn parse_port(value: &Value) -> Result<u16, DeployError> {
    let port = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u16>().ok(),
        _ => None,
    };
    port.filter(|p| *p != 0).ok_or_else(|| {
        DeployError::InvalidRequest(format!("Invalid puerto '{}': expected a port between 1 and 65535", value))
    })
}

/// Reject links git would parse as a command-line option.
fn validate_link(link: &str) -> Result<&str, DeployError> {
    if link.starts_with('-') {
        return Err(DeployError::InvalidRequest(format!(
            "Invalid link '{}': must be a repository URL or path",
            link
        )));
    }
    Ok(link)
}

/// Require a name that is a single safe path segment and a valid container name.
pub fn validate_name(nombre: &str) -> Result<&str, DeployError> {
    let valid = !nombre.is_empty()
        && !nombre.starts_with('.')
        && !nombre.starts_with('-')
        && nombre
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if valid {
        Ok(nombre)
    } else {
        Err(DeployError::InvalidRequest(format!(
            "Invalid nombre '{}': use letters, digits, '_', '.' or '-'",
            nombre
        )))
    }
}

/// How a project was launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployStrategy {
    Compose { file: PathBuf },
    Dockerfile { image: String, container: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    pub nombre: String,
    pub puerto: u16,
    /// False when the project directory already held a clone.
    pub cloned: bool,
    pub strategy: DeployStrategy,
}

impl DeployOutcome {
    pub fn message(&self) -> String {
        format!("Deployment started for {} at localhost:{}", self.nombre, self.puerto)
    }

    pub fn details(&self) -> String {
        match &self.strategy {
            DeployStrategy::Compose { file } => {
                let name = file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "compose file".to_string());
                format!("Using {}, running in background", name)
            }
            DeployStrategy::Dockerfile { .. } => "Using Dockerfile, running in background".to_string(),
        }
    }
}

/// Runs deployments under a base directory, one sub-directory per name.
pub struct Deployer {
    runner: Arc<dyn CommandRunner>,
    tools: Toolchain,
    projects_base: PathBuf,
    internal_port: u16,
}

impl Deployer {
    pub fn new(config: &LaunchpadConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            tools: Toolchain::from_config(config),
            projects_base: config.projects_base.clone(),
            internal_port: config.dockerfile_internal_port,
        }
    }

    pub fn project_dir(&self, nombre: &str) -> PathBuf {
        self.projects_base.join(nombre)
    }

    /// Clone (if needed) and launch a project.
    ///
    /// Returns once the background launch has been started; the clone and,
    /// for Dockerfile projects, the image build run to completion first.
    #[instrument(skip(self, req), fields(nombre = %req.nombre, puerto = req.puerto))]
    pub async fn deploy(&self, req: &DeployRequest) -> Result<DeployOutcome, DeployError> {
        let dir = self.project_dir(&req.nombre);
        std::fs::create_dir_all(&dir).map_err(|source| DeployError::Workspace {
            path: dir.clone(),
            source,
        })?;

        let cloned = self.ensure_cloned(&req.link, &dir).await?;

        let strategy = if let Some(file) = find_compose_file(&dir) {
            let summary = rewrite_compose_file(&file, req.puerto)?;
            info!(
                file = %file.display(),
                ports_rewritten = summary.ports_rewritten,
                volumes_removed = summary.volumes_removed,
                "compose file rewritten"
            );
            self.runner.spawn_detached(&self.tools.compose_up(&dir)).await?;
            DeployStrategy::Compose { file }
        } else if dir.join("Dockerfile").is_file() {
            let image = image_name(&req.nombre);
            let container = container_name(&req.nombre);

            let build = self.tools.build_image(&image, &dir);
            self.runner.output(&build).await?.check(&build)?;
            info!(image = %image, "image built");

            let run = self
                .tools
                .run_container(&image, &container, req.puerto, self.internal_port, &dir);
            self.runner.spawn_detached(&run).await?;
            DeployStrategy::Dockerfile { image, container }
        } else {
            return Err(DeployError::NothingToDeploy { path: dir });
        };

        Ok(DeployOutcome {
            nombre: req.nombre.clone(),
            puerto: req.puerto,
            cloned,
            strategy,
        })
    }

    /// Clone `link` into `dir` unless it already holds a repository.
    /// Returns whether a clone ran.
    async fn ensure_cloned(&self, link: &str, dir: &Path) -> Result<bool, DeployError> {
        if dir.join(".git").exists() {
            info!(dir = %dir.display(), "repository already cloned, skipping clone");
            return Ok(false);
        }
        let clone = self.tools.git_clone(link, dir);
        self.runner.output(&clone).await?.check(&clone)?;
        info!(link, dir = %dir.display(), "repository cloned");
        Ok(true)
    }

    pub async fn status(&self, nombre: &str) -> Result<StatusReport, DeployError> {
        let nombre = validate_name(nombre)?;
        inspect::status(self.runner.as_ref(), &self.tools, &self.project_dir(nombre), nombre).await
    }

    pub async fn list(&self) -> Result<Value, DeployError> {
        inspect::list(self.runner.as_ref(), &self.tools).await
    }

    pub async fn stop(&self, nombre: &str) -> Result<(), DeployError> {
        let nombre = validate_name(nombre)?;
        inspect::stop(self.runner.as_ref(), &self.tools, nombre).await
    }
}
