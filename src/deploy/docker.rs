//! Argument vectors for the git and Docker invocations launchpad makes.

use std::path::Path;

use super::runner::CommandSpec;
use crate::config::LaunchpadConfig;

pub fn image_name(nombre: &str) -> String {
    format!("{}-image", nombre)
}

pub fn container_name(nombre: &str) -> String {
    format!("{}-container", nombre)
}

/// Executable names for the external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub git: String,
    pub docker: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            docker: "docker".to_string(),
        }
    }
}

impl Toolchain {
    pub fn from_config(config: &LaunchpadConfig) -> Self {
        Self {
            git: config.git_cmd.clone(),
            docker: config.docker_cmd.clone(),
        }
    }

    /// `git clone -- <link> <dest>`; the `--` keeps a link from being read as an option.
    pub fn git_clone(&self, link: &str, dest: &Path) -> CommandSpec {
        CommandSpec::new(&self.git)
            .args(["clone", "--"])
            .arg(link)
            .arg(dest.to_string_lossy())
    }

    pub fn compose_up(&self, project_dir: &Path) -> CommandSpec {
        CommandSpec::new(&self.docker)
            .args(["compose", "up", "--build", "-d"])
            .current_dir(project_dir)
    }

    pub fn compose_ps(&self, project_dir: &Path) -> CommandSpec {
        CommandSpec::new(&self.docker)
            .args(["compose", "ps", "--format", "json"])
            .current_dir(project_dir)
    }

    pub fn build_image(&self, image: &str, project_dir: &Path) -> CommandSpec {
        CommandSpec::new(&self.docker)
            .args(["build", "-t", image, "."])
            .current_dir(project_dir)
    }

    pub fn run_container(
        &self,
        image: &str,
        container: &str,
        host_port: u16,
        container_port: u16,
        project_dir: &Path,
    ) -> CommandSpec {
        CommandSpec::new(&self.docker)
            .args(["run", "-d", "-p"])
            .arg(format!("{}:{}", host_port, container_port))
            .args(["--name", container, image])
            .current_dir(project_dir)
    }

    pub fn ps_by_name(&self, nombre: &str) -> CommandSpec {
        CommandSpec::new(&self.docker)
            .args(["ps", "--filter"])
            .arg(format!("name={}", nombre))
            .args(["--format", "json"])
    }

    pub fn ps_all(&self) -> CommandSpec {
        CommandSpec::new(&self.docker).args(["ps", "--format", "json"])
    }

    pub fn stop(&self, container: &str) -> CommandSpec {
        CommandSpec::new(&self.docker).args(["stop", container])
    }

    pub fn remove(&self, container: &str) -> CommandSpec {
        CommandSpec::new(&self.docker).args(["rm", container])
    }
}
