//! Compose file rewriting.
//!
//! Every service's published ports are pointed at a single public port and
//! every service-level `volumes` key is dropped, so a cloned project runs from
//! its image contents rather than host mounts. Key order is preserved on write.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::errors::ComposeError;

/// Compose file names in the order `docker compose` itself looks them up.
pub const COMPOSE_FILE_NAMES: [&str; 4] = [
    "compose.yaml",
    "compose.yml",
    "docker-compose.yaml",
    "docker-compose.yml",
];

/// Counts of what a rewrite changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    pub ports_rewritten: usize,
    pub volumes_removed: usize,
}

/// Locate the compose file `docker compose` would pick up in `dir`.
pub fn find_compose_file(dir: &Path) -> Option<PathBuf> {
    COMPOSE_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Rewrite a compose file in place.
pub fn rewrite_compose_file(path: &Path, port: u16) -> Result<RewriteSummary, ComposeError> {
    let content = std::fs::read_to_string(path).map_err(|source| ComposeError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let (rewritten, summary) = rewrite_compose_str(&content, port)?;

    std::fs::write(path, rewritten).map_err(|source| ComposeError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(summary)
}

/// Rewrite a compose document held in memory, returning the new YAML text.
pub fn rewrite_compose_str(content: &str, port: u16) -> Result<(String, RewriteSummary), ComposeError> {
    let mut doc: Value = serde_yaml::from_str(content)?;
    let summary = rewrite_document(&mut doc, port)?;
    Ok((serde_yaml::to_string(&doc)?, summary))
}

/// Apply the port and volume rewrite to a parsed compose document.
///
/// `<<` merge keys are expanded first so ports and volumes inherited from an
/// anchored block are rewritten too. A missing or non-mapping `services` key
/// is left alone.
pub fn rewrite_document(doc: &mut Value, port: u16) -> Result<RewriteSummary, ComposeError> {
    if !doc.is_mapping() {
        return Err(ComposeError::NotAMapping);
    }
    doc.apply_merge()?;
    let root = doc.as_mapping_mut().ok_or(ComposeError::NotAMapping)?;
    let mut summary = RewriteSummary::default();

    let Some(services) = root.get_mut("services").and_then(Value::as_mapping_mut) else {
        return Ok(summary);
    };

    for (_, service) in services.iter_mut() {
        let Some(service) = service.as_mapping_mut() else {
            continue;
        };
        summary.ports_rewritten += remap_service_ports(service, port);
        if service.remove("volumes").is_some() {
            summary.volumes_removed += 1;
        }
    }

    Ok(summary)
}

fn remap_service_ports(service: &mut Mapping, port: u16) -> usize {
    let Some(ports) = service.get_mut("ports").and_then(Value::as_sequence_mut) else {
        return 0;
    };
    ports
        .iter_mut()
        .map(|entry| remap_port_entry(entry, port))
        .filter(|changed| *changed)
        .count()
}

/// Point one `ports` entry at `port`. Returns whether the entry changed.
///
/// Entries that carry no container-side port to preserve (container-only short
/// syntax, long syntax without `target`, bare integers) are kept as they are.
fn remap_port_entry(entry: &mut Value, port: u16) -> bool {
    match entry {
        Value::String(short) => match remap_short_syntax(short, port) {
            Some(rewritten) => {
                *short = rewritten;
                true
            }
            None => false,
        },
        Value::Mapping(long) => {
            if !long.contains_key("target") {
                return false;
            }
            long.insert(
                Value::String("published".to_string()),
                Value::Number(port.into()),
            );
            true
        }
        _ => false,
    }
}

/// `[ip:]host:container[/proto]` → `[ip:]port:container[/proto]`
fn remap_short_syntax(short: &str, port: u16) -> Option<String> {
    let (host_part, container) = short.rsplit_once(':')?;
    match host_part.rsplit_once(':') {
        Some((ip, _)) => Some(format!("{}:{}:{}", ip, port, container)),
        None => Some(format!("{}:{}", port, container)),
    }
}
