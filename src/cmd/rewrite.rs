//! Offline compose rewrite — `launchpad rewrite`.

use std::path::Path;

use anyhow::{Context, Result};
use launchpad::deploy::compose::{rewrite_compose_file, rewrite_compose_str};

pub fn cmd_rewrite(file: &Path, port: u16, dry_run: bool) -> Result<()> {
    if dry_run {
        let content = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let (rewritten, _) = rewrite_compose_str(&content, port)
            .with_context(|| format!("Failed to rewrite {}", file.display()))?;
        print!("{}", rewritten);
        return Ok(());
    }

    let summary = rewrite_compose_file(file, port)?;
    println!(
        "Rewrote {} port mapping(s) to {} and removed volumes from {} service(s) in {}",
        summary.ports_rewritten,
        port,
        summary.volumes_removed,
        file.display()
    );
    Ok(())
}
