// src/config/mod.rs
mod models;

pub use models::*;

use config::{Environment, File, FileFormat};
use std::collections::HashMap;
use std::path::Path;

/// Load configuration from defaults, an optional file (YAML or JSON) and the
/// process environment, in increasing order of precedence.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_from_sources(path, None)
}

/// Same as [`load_config`], reading variables from `env` instead of the
/// process environment when given.
pub fn load_from_sources(
    path: Option<&Path>,
    env: Option<HashMap<String, String>>,
) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder()
        .set_default("listen_host", DEFAULT_HOST)?
        .set_default("port", i64::from(DEFAULT_PORT))?
        .set_default("laravel_api_url", DEFAULT_LARAVEL_API_URL)?
        .set_default("go_service_url", DEFAULT_GO_SERVICE_URL)?
        .set_default("upstream_b_name", DEFAULT_UPSTREAM_B_NAME)?
        .set_default("probe_timeout_secs", DEFAULT_PROBE_TIMEOUT_SECS as i64)?
        .set_default("log_format", "pretty")?;

    if let Some(path) = path {
        let format = match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            _ => FileFormat::Json,
        };
        builder = builder.add_source(File::new(&path.to_string_lossy(), format).required(true));
    }

    let raw: RawSettings = builder
        .add_source(
            Environment::default()
                .try_parsing(true)
                .ignore_empty(true)
                .source(env),
        )
        .build()?
        .try_deserialize()?;

    Config::try_from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults() {
        let config = load_from_sources(None, env(&[])).unwrap();

        assert_eq!(config.listen_addr().to_string(), "0.0.0.0:8082");
        assert_eq!(config.upstream_a.name, "laravel_api");
        assert_eq!(config.upstream_a.url.as_str(), "http://localhost:8080/api/users");
        assert_eq!(config.upstream_b.name, "go_service");
        assert_eq!(config.upstream_b.url.as_str(), "http://localhost:8081/ping");
        assert_eq!(config.probe_timeout, Duration::from_secs(10));
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_env_overrides() {
        let config = load_from_sources(
            None,
            env(&[
                ("PORT", "9000"),
                ("LARAVEL_API_URL", "http://laravel:8080/api/users"),
                ("GO_SERVICE_URL", "https://go:8443/ping"),
                ("PROBE_TIMEOUT_SECS", "3"),
                ("LOG_FORMAT", "json"),
            ]),
        )
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.upstream_a.url.host_str(), Some("laravel"));
        assert_eq!(config.upstream_b.url.scheme(), "https");
        assert_eq!(config.probe_timeout, Duration::from_secs(3));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_empty_env_values_fall_back_to_defaults() {
        let config = load_from_sources(None, env(&[("PORT", ""), ("GO_SERVICE_URL", "")])).unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.upstream_b.url.as_str(), DEFAULT_GO_SERVICE_URL);
    }

    #[test]
    fn test_php_api_url_takes_precedence() {
        let config = load_from_sources(
            None,
            env(&[
                ("PORT", "8085"),
                ("LARAVEL_API_URL", "http://laravel:8080/api/users"),
                ("PHP_API_URL", "http://php-api:80/users"),
            ]),
        )
        .unwrap();

        assert_eq!(config.port, 8085);
        assert_eq!(config.upstream_a.name, "php_api");
        assert_eq!(config.upstream_a.url.as_str(), "http://php-api/users");
    }

    #[test]
    fn test_explicit_upstream_names() {
        let config = load_from_sources(
            None,
            env(&[("UPSTREAM_A_NAME", "serviceA"), ("UPSTREAM_B_NAME", "serviceB")]),
        )
        .unwrap();

        assert_eq!(config.upstream_a.name, "serviceA");
        assert_eq!(config.upstream_b.name, "serviceB");
    }

    #[test]
    fn test_rejects_invalid_url() {
        let err = load_from_sources(None, env(&[("GO_SERVICE_URL", "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { ref name, .. } if name == "go_service"));

        let err = load_from_sources(None, env(&[("LARAVEL_API_URL", "ftp://host/file")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn test_rejects_bad_port_and_timeout() {
        let err = load_from_sources(None, env(&[("PORT", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(0)));

        let err = load_from_sources(None, env(&[("PROBE_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout(0)));

        let err = load_from_sources(None, env(&[("PROBE_TIMEOUT_SECS", "120")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout(120)));

        let err = load_from_sources(None, env(&[("PROBE_TIMEOUT_SECS", "-5")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout(-5)));
    }

    #[test]
    fn test_out_of_range_port_is_rejected_not_wrapped() {
        for (value, expected) in [("70000", 70000), ("65618", 65618), ("65536", 65536), ("-1", -1)] {
            let err = load_from_sources(None, env(&[("PORT", value)])).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidPort(p) if p == expected),
                "PORT={value} gave {err:?}"
            );
        }

        let config = load_from_sources(None, env(&[("PORT", "65535")])).unwrap();
        assert_eq!(config.port, 65535);
    }

    #[test]
    fn test_rejects_conflicting_names() {
        let err = load_from_sources(
            None,
            env(&[("UPSTREAM_A_NAME", "peer"), ("UPSTREAM_B_NAME", "peer")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateUpstreamName(ref n) if n == "peer"));

        let err = load_from_sources(None, env(&[("UPSTREAM_B_NAME", "timestamp")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUpstreamName(_)));
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        let err = load_from_sources(None, env(&[("LOG_FORMAT", "xml")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogFormat(_)));
    }

    #[test]
    fn test_yaml_file_layer_under_env() {
        let path = std::env::temp_dir().join(format!("service-prober-{}.yaml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "port: 8085").unwrap();
        writeln!(file, "go_service_url: http://from-file:8081/ping").unwrap();
        writeln!(file, "probe_timeout_secs: 5").unwrap();
        drop(file);

        let config = load_from_sources(Some(path.as_path()), env(&[("PROBE_TIMEOUT_SECS", "7")])).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.port, 8085);
        assert_eq!(config.upstream_b.url.host_str(), Some("from-file"));
        assert_eq!(config.probe_timeout, Duration::from_secs(7));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = Path::new("/nonexistent/service-prober.json");
        let err = load_from_sources(Some(path), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
