//! Status, list and stop: thin pass-throughs to the Docker CLI.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::compose::find_compose_file;
use super::docker::Toolchain;
use super::runner::{CommandRunner, CommandSpec};
use crate::errors::DeployError;

/// What `status` found for a deployment.
///
/// Serializes as `{"services": ...}` or `{"containers": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusReport {
    /// `docker compose ps` output for a compose deployment.
    Services(Value),
    /// `docker ps --filter name=...` output otherwise.
    Containers(Value),
}

/// Parse `--format json` output from docker.
///
/// Depending on the version, docker prints one JSON document (array or object)
/// or one object per line. The result is always an array: a lone object, as
/// printed when exactly one container matches, becomes a one-element array.
pub fn parse_docker_json(stdout: &str) -> Result<Value, serde_json::Error> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Value::Array(Vec::new()));
    }
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(match value {
            Value::Array(_) => value,
            other => Value::Array(vec![other]),
        });
    }
    trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_str::<Value>(line))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

/// Run `spec`, require success, and parse its stdout as docker JSON.
async fn query_json(runner: &dyn CommandRunner, spec: &CommandSpec) -> Result<Value, DeployError> {
    let output = runner.output(spec).await?.check(spec)?;
    parse_docker_json(&output.stdout).map_err(|source| DeployError::OutputParse {
        command: spec.to_string(),
        source,
    })
}

pub async fn status(
    runner: &dyn CommandRunner,
    tools: &Toolchain,
    project_dir: &Path,
    nombre: &str,
) -> Result<StatusReport, DeployError> {
    if find_compose_file(project_dir).is_some() {
        let services = query_json(runner, &tools.compose_ps(project_dir)).await?;
        Ok(StatusReport::Services(services))
    } else {
        let containers = query_json(runner, &tools.ps_by_name(nombre)).await?;
        Ok(StatusReport::Containers(containers))
    }
}

pub async fn list(runner: &dyn CommandRunner, tools: &Toolchain) -> Result<Value, DeployError> {
    query_json(runner, &tools.ps_all()).await
}

/// Stop and remove a container. Removal only runs once the stop succeeded.
pub async fn stop(runner: &dyn CommandRunner, tools: &Toolchain, container: &str) -> Result<(), DeployError> {
    let stop = tools.stop(container);
    runner.output(&stop).await?.check(&stop)?;

    let remove = tools.remove(container);
    runner.output(&remove).await?.check(&remove)?;

    info!(container, "container stopped and removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::runner::fake::FakeRunner;
    use serde_json::json;

    #[test]
    fn test_parse_empty_output() {
        assert_eq!(parse_docker_json("").unwrap(), json!([]));
        assert_eq!(parse_docker_json("  \n").unwrap(), json!([]));
    }

    #[test]
    fn test_parse_single_document() {
        let out = r#"[{"Name":"shop-web-1","State":"running"}]"#;
        assert_eq!(
            parse_docker_json(out).unwrap(),
            json!([{"Name": "shop-web-1", "State": "running"}])
        );
        assert_eq!(
            parse_docker_json("{\"Names\":\"web\"}\n").unwrap(),
            json!([{"Names": "web"}])
        );
    }

    #[test]
    fn test_parse_line_delimited() {
        let out = "{\"Names\":\"a\",\"Status\":\"Up 2 minutes\"}\n\n{\"Names\":\"b\",\"Status\":\"Exited (0)\"}\n";
        assert_eq!(
            parse_docker_json(out).unwrap(),
            json!([
                {"Names": "a", "Status": "Up 2 minutes"},
                {"Names": "b", "Status": "Exited (0)"}
            ])
        );
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_docker_json("Cannot connect to the Docker daemon").is_err());
    }

    #[test]
    fn test_status_report_serialization() {
        let report = StatusReport::Services(json!([]));
        assert_eq!(serde_json::to_value(&report).unwrap(), json!({"services": []}));
        let report = StatusReport::Containers(json!([{"Names": "x"}]));
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({"containers": [{"Names": "x"}]})
        );
    }

    #[tokio::test]
    async fn test_status_uses_compose_when_present() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("docker-compose.yml"), "services: {}\n").unwrap();
        let runner = FakeRunner::new().respond("docker compose ps", r#"[{"Service":"web"}]"#);

        let report = status(&runner, &Toolchain::default(), dir.path(), "shop")
            .await
            .unwrap();
        assert_eq!(report, StatusReport::Services(json!([{"Service": "web"}])));

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].spec.cwd.as_deref(), Some(dir.path()));
    }

    #[tokio::test]
    async fn test_status_filters_by_name_without_compose() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new().respond("docker ps", "{\"Names\":\"shop-container\"}\n");

        let report = status(&runner, &Toolchain::default(), &dir.path().join("missing"), "shop")
            .await
            .unwrap();
        assert_eq!(
            report,
            StatusReport::Containers(json!([{"Names": "shop-container"}]))
        );
        assert_eq!(runner.lines(), vec!["docker ps --filter name=shop --format json"]);
    }

    #[tokio::test]
    async fn test_status_propagates_command_failure() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new().fail_on("docker ps", "Cannot connect to the Docker daemon");
        let err = status(&runner, &Toolchain::default(), dir.path(), "shop")
            .await
            .unwrap_err();
        assert_eq!(err.details(), "Cannot connect to the Docker daemon");
    }

    #[tokio::test]
    async fn test_list_parses_each_line() {
        let runner = FakeRunner::new().respond("docker ps --format json", "{\"ID\":\"1\"}\n{\"ID\":\"2\"}\n");
        let containers = list(&runner, &Toolchain::default()).await.unwrap();
        assert_eq!(containers, json!([{"ID": "1"}, {"ID": "2"}]));
    }

    #[tokio::test]
    async fn test_list_single_container_is_still_an_array() {
        let runner = FakeRunner::new().respond("docker ps --format json", "{\"ID\":\"1\",\"Names\":\"only\"}\n");
        let containers = list(&runner, &Toolchain::default()).await.unwrap();
        assert_eq!(containers, json!([{"ID": "1", "Names": "only"}]));
    }

    #[tokio::test]
    async fn test_status_single_container_is_an_array() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new().respond("docker ps --filter", "{\"Names\":\"shop-container\"}");

        let report = status(&runner, &Toolchain::default(), dir.path(), "shop")
            .await
            .unwrap();
        assert_eq!(
            report,
            StatusReport::Containers(json!([{"Names": "shop-container"}]))
        );
    }

    #[tokio::test]
    async fn test_status_single_compose_service_is_an_array() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("compose.yaml"), "services: {}\n").unwrap();
        let runner = FakeRunner::new().respond("docker compose ps", "{\"Service\":\"web\",\"State\":\"running\"}\n");

        let report = status(&runner, &Toolchain::default(), dir.path(), "shop")
            .await
            .unwrap();
        assert_eq!(
            report,
            StatusReport::Services(json!([{"Service": "web", "State": "running"}]))
        );
    }

    #[tokio::test]
    async fn test_stop_then_remove() {
        let runner = FakeRunner::new();
        stop(&runner, &Toolchain::default(), "shop-container").await.unwrap();
        assert_eq!(
            runner.lines(),
            vec!["docker stop shop-container", "docker rm shop-container"]
        );
    }

    #[tokio::test]
    async fn test_stop_failure_skips_remove() {
        let runner = FakeRunner::new().fail_on("docker stop", "No such container: ghost");
        let err = stop(&runner, &Toolchain::default(), "ghost").await.unwrap_err();
        assert!(matches!(err, DeployError::CommandFailed { .. }));
        assert_eq!(runner.lines(), vec!["docker stop ghost"]);
    }
}
