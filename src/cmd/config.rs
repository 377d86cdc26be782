//! Effective configuration view — `launchpad config`.

use std::path::Path;

use anyhow::Result;
use launchpad::config::{DEFAULT_CONFIG_FILE, LaunchpadConfig};

pub fn cmd_config(config_path: Option<&Path>) -> Result<()> {
    let config = LaunchpadConfig::load(config_path)?;

    let source = match config_path {
        Some(path) => path.display().to_string(),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => DEFAULT_CONFIG_FILE.to_string(),
        None => "(defaults)".to_string(),
    };

    println!("Config file: {}", source);
    println!();
    println!("[server]");
    println!("  host = \"{}\"", config.host);
    println!("  port = {}", config.port);
    println!();
    println!("[deploy]");
    println!("  projects_base = \"{}\"", config.projects_base.display());
    println!("  dockerfile_internal_port = {}", config.dockerfile_internal_port);
    println!("  git_cmd = \"{}\"", config.git_cmd);
    println!("  docker_cmd = \"{}\"", config.docker_cmd);
    Ok(())
}
