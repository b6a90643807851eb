//! Configuration file loading.
//!
//! A service entry may point at an external file with `path:`. That file is
//! either a full configuration document containing the same service name, or
//! a bare service definition; either way it replaces the inline entry as a
//! whole. Entries with `env_vars_file:` are rewritten to launch through bash
//! so the file can be sourced first.

use crate::config::schema::{Config, ServiceConfig};
use crate::error::{RuntimeError, Result};
use std::fs;
use std::path::Path;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/runtime-utils/runtime-configuration.yaml";

/// Load a configuration file and resolve external service files.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML (or a referenced service file) is invalid.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = read_config(path)?;
    let mut config = parse_config(&content, path)?;

    for (name, service) in config.services.iter_mut() {
        if let Some(external) = service.path.clone() {
            match load_external_service(name, Path::new(&external))? {
                Some(mut loaded) => {
                    loaded.path = Some(external);
                    *service = loaded;
                }
                None => {
                    tracing::warn!(
                        service = %name,
                        path = %external,
                        "external service config not found, using inline definition"
                    );
                }
            }
        }
        apply_env_file_shim(service);
    }

    Ok(config)
}

/// Parse YAML content into a [`Config`].
///
/// # Arguments
///
/// * `content` - The YAML content to parse
/// * `source_path` - Path for error reporting
pub fn parse_config(content: &str, source_path: &Path) -> Result<Config> {
    serde_yaml::from_str(content).map_err(|e| RuntimeError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RuntimeError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            RuntimeError::Io(e)
        }
    })
}

/// Load the definition of `name` from an external file.
///
/// Returns `Ok(None)` when the file does not exist.
fn load_external_service(name: &str, path: &Path) -> Result<Option<ServiceConfig>> {
    let content = match read_config(path) {
        Ok(c) => c,
        Err(RuntimeError::ConfigNotFound { .. }) => return Ok(None),
        Err(e) => return Err(e),
    };

    if let Ok(full) = serde_yaml::from_str::<Config>(&content) {
        if let Some(service) = full.services.get(name) {
            tracing::debug!(service = %name, path = %path.display(), "loaded service from full config");
            return Ok(Some(service.clone()));
        }
    }

    let service: ServiceConfig =
        serde_yaml::from_str(&content).map_err(|e| RuntimeError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    tracing::debug!(service = %name, path = %path.display(), "loaded service definition");
    Ok(Some(service))
}

/// Rewrite the launch command so that `env_vars_file` is sourced first.
///
/// `exe a b` with `env_vars_file: f` becomes `bash -c "source f; exe a b"`.
pub fn apply_env_file_shim(service: &mut ServiceConfig) {
    let Some(env_file) = service.env_vars_file.as_deref() else {
        return;
    };
    let executable = service.executable.as_deref().unwrap_or_default();
    let args = service.executable_args.join(" ");
    let script = format!("source {}; {} {}", env_file, executable, args);

    service.executable_args = vec!["-c".to_string(), script];
    service.executable = Some("bash".to_string());
    service.env_vars_file = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_missing_file_is_config_not_found() {
        let temp = TempDir::new().unwrap();
        let result = load_config(&temp.path().join("missing.yaml"));
        assert!(matches!(result, Err(RuntimeError::ConfigNotFound { .. })));
    }

    #[test]
    fn load_rejects_unknown_fields() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "cfg.yaml", "default:\n  runtime: {}\n");
        let result = load_config(&path);
        assert!(matches!(result, Err(RuntimeError::ConfigParseError { .. })));
    }

    #[test]
    fn external_full_config_replaces_service() {
        let temp = TempDir::new().unwrap();
        let external = write(
            &temp,
            "trino.yaml",
            r#"
services:
  TRINO:
    runtimes:
      java:
        version: "21"
    executable: /usr/lib/trino/bin/launcher
"#,
        );
        let main = write(
            &temp,
            "cfg.yaml",
            &format!(
                "services:\n  TRINO:\n    path: {}\n    runtimes:\n      java:\n        version: \"17\"\n        env_var: OLD\n",
                external.display()
            ),
        );

        let config = load_config(&main).unwrap();
        let trino = &config.services["TRINO"];
        assert_eq!(trino.runtimes["java"].version, "21");
        assert_eq!(trino.runtimes["java"].env_var, None);
        assert_eq!(
            trino.executable.as_deref(),
            Some("/usr/lib/trino/bin/launcher")
        );
    }

    #[test]
    fn external_service_file_replaces_service() {
        let temp = TempDir::new().unwrap();
        let external = write(
            &temp,
            "kafka.yaml",
            "runtimes:\n  java:\n    version: \"11\"\nexecutable: /opt/kafka/bin/kafka-server-start.sh\n",
        );
        let main = write(
            &temp,
            "cfg.yaml",
            &format!("services:\n  KAFKA:\n    path: {}\n", external.display()),
        );

        let config = load_config(&main).unwrap();
        assert_eq!(config.services["KAFKA"].runtimes["java"].version, "11");
        assert_eq!(
            config.services["KAFKA"].path.as_deref(),
            Some(external.to_str().unwrap())
        );
    }

    #[test]
    fn missing_external_file_keeps_inline_definition() {
        let temp = TempDir::new().unwrap();
        let main = write(
            &temp,
            "cfg.yaml",
            "services:\n  HIVE:\n    path: /nonexistent/hive.yaml\n    runtimes:\n      java:\n        version: \"8\"\n",
        );

        let config = load_config(&main).unwrap();
        assert_eq!(config.services["HIVE"].runtimes["java"].version, "8");
    }

    #[test]
    fn invalid_external_file_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let external = write(&temp, "bad.yaml", "unexpected_field: true\n");
        let main = write(
            &temp,
            "cfg.yaml",
            &format!("services:\n  BAD:\n    path: {}\n", external.display()),
        );

        let result = load_config(&main);
        assert!(matches!(result, Err(RuntimeError::ConfigParseError { .. })));
    }

    #[test]
    fn env_file_shim_rewrites_launch() {
        let mut service = ServiceConfig {
            executable: Some("/opt/app/bin/run".to_string()),
            executable_args: vec!["--port".to_string(), "9000".to_string()],
            env_vars_file: Some("/etc/app/env.sh".to_string()),
            ..Default::default()
        };
        apply_env_file_shim(&mut service);

        assert_eq!(service.executable.as_deref(), Some("bash"));
        assert_eq!(
            service.executable_args,
            vec![
                "-c".to_string(),
                "source /etc/app/env.sh; /opt/app/bin/run --port 9000".to_string()
            ]
        );
    }

    #[test]
    fn env_file_shim_ignores_services_without_env_file() {
        let mut service = ServiceConfig {
            executable: Some("/opt/app/bin/run".to_string()),
            ..Default::default()
        };
        let before = service.clone();
        apply_env_file_shim(&mut service);
        assert_eq!(service, before);
    }
}
