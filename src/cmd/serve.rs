//! Deployment API server command — `launchpad serve`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use launchpad::config::LaunchpadConfig;

pub async fn cmd_serve(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
    projects_base: Option<PathBuf>,
) -> Result<()> {
    let mut config = LaunchpadConfig::load(config_path)?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(projects_base) = projects_base {
        config.projects_base = projects_base;
    }

    launchpad::deploy::server::start_server(config).await
}
