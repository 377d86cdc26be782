//! Runtime configuration for launchpad.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables, then CLI flags (applied by the `serve` command).
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 5000
//!
//! [deploy]
//! projects_base = "/proyectos"
//! dockerfile_internal_port = 5006
//! git_cmd = "git"
//! docker_cmd = "docker"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "launchpad.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchpadConfig {
    /// Directory holding one sub-directory per deployment.
    pub projects_base: PathBuf,
    pub host: String,
    pub port: u16,
    /// Container-side port published for Dockerfile deployments.
    pub dockerfile_internal_port: u16,
    pub git_cmd: String,
    pub docker_cmd: String,
}

impl Default for LaunchpadConfig {
    fn default() -> Self {
        Self {
            projects_base: PathBuf::from("/proyectos"),
            host: "0.0.0.0".to_string(),
            port: 5000,
            dockerfile_internal_port: 5006,
            git_cmd: "git".to_string(),
            docker_cmd: "docker".to_string(),
        }
    }
}

/// Raw TOML structure for `launchpad.toml`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LaunchpadToml {
    server: Option<ServerSection>,
    deploy: Option<DeploySection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerSection {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeploySection {
    projects_base: Option<PathBuf>,
    dockerfile_internal_port: Option<u16>,
    git_cmd: Option<String>,
    docker_cmd: Option<String>,
}

impl LaunchpadConfig {
    /// Load configuration from `path` (or `launchpad.toml` if `None`) and the
    /// process environment.
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_from(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parse a TOML document on top of the defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let toml: LaunchpadToml = toml::from_str(content)?;

        let mut config = Self::default();
        if let Some(server) = toml.server {
            if let Some(host) = server.host {
                config.host = host;
            }
            if let Some(port) = server.port {
                config.port = port;
            }
        }
        if let Some(deploy) = toml.deploy {
            if let Some(projects_base) = deploy.projects_base {
                config.projects_base = projects_base;
            }
            if let Some(port) = deploy.dockerfile_internal_port {
                config.dockerfile_internal_port = port;
            }
            if let Some(git_cmd) = deploy.git_cmd {
                config.git_cmd = git_cmd;
            }
            if let Some(docker_cmd) = deploy.docker_cmd {
                config.docker_cmd = docker_cmd;
            }
        }
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup("PROJECTS_BASE").filter(|v| !v.is_empty()) {
            self.projects_base = PathBuf::from(base);
        }
        if let Some(host) = lookup("LAUNCHPAD_HOST").filter(|v| !v.is_empty()) {
            self.host = host;
        }
        if let Some(port) = lookup("LAUNCHPAD_PORT") {
            self.port = parse_port_var("LAUNCHPAD_PORT", &port)?;
        }
        if let Some(port) = lookup("LAUNCHPAD_INTERNAL_PORT") {
            self.dockerfile_internal_port = parse_port_var("LAUNCHPAD_INTERNAL_PORT", &port)?;
        }
        if let Some(cmd) = lookup("LAUNCHPAD_GIT_CMD").filter(|v| !v.is_empty()) {
            self.git_cmd = cmd;
        }
        if let Some(cmd) = lookup("LAUNCHPAD_DOCKER_CMD").filter(|v| !v.is_empty()) {
            self.docker_cmd = cmd;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_port_var(name: &str, value: &str) -> Result<u16> {
    value
        .trim()
        .parse::<u16>()
        .with_context(|| format!("{} must be a port number, got '{}'", name, value))
}
