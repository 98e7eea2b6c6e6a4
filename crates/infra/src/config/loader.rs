//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `CONDUIT_BASE_URL` is unset, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `CONDUIT_BASE_URL`: API base URL (required)
//! - `CONDUIT_TIMEOUT_MS`: Per-attempt timeout in milliseconds
//! - `CONDUIT_USER_AGENT`: `User-Agent` header value
//! - `CONDUIT_MAX_RETRIES`: Additional attempts after the first
//! - `CONDUIT_BASE_DELAY_MS`: First backoff delay in milliseconds
//! - `CONDUIT_MAX_DELAY_MS`: Backoff ceiling in milliseconds
//! - `CONDUIT_REFRESH_PATH`: Refresh endpoint path
//! - `CONDUIT_KEYCHAIN_SERVICE`: Keychain service name
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./conduit.json` or `./conduit.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names in the parent and grandparent directories
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use conduit_domain::{ClientConfig, ConduitError, Result};

const FILE_NAMES: [&str; 4] = ["conduit.json", "conduit.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the base URL is
/// not set there, falls back to loading from a config file. The result is
/// validated either way.
///
/// # Errors
/// Returns `ConduitError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded configuration fails validation
pub fn load() -> Result<ClientConfig> {
    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };
    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// `CONDUIT_BASE_URL` must be present; every other variable falls back to
/// its default when unset.
///
/// # Errors
/// Returns `ConduitError::Config` if the base URL is missing or a numeric
/// variable does not parse.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig { base_url: env_var("CONDUIT_BASE_URL")?, ..Default::default() };

    if let Some(timeout) = env_parse("CONDUIT_TIMEOUT_MS")? {
        config.timeout_ms = timeout;
    }
    if let Some(agent) = env_opt("CONDUIT_USER_AGENT") {
        config.user_agent = agent;
    }
    if let Some(retries) = env_parse("CONDUIT_MAX_RETRIES")? {
        config.retry.max_retries = retries;
    }
    if let Some(delay) = env_parse("CONDUIT_BASE_DELAY_MS")? {
        config.retry.base_delay_ms = delay;
    }
    if let Some(delay) = env_parse("CONDUIT_MAX_DELAY_MS")? {
        config.retry.max_delay_ms = delay;
    }
    if let Some(path) = env_opt("CONDUIT_REFRESH_PATH") {
        config.auth.refresh_path = path;
    }
    if let Some(service) = env_opt("CONDUIT_KEYCHAIN_SERVICE") {
        config.auth.keychain_service = service;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
/// Missing keys take their defaults.
///
/// # Errors
/// Returns `ConduitError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConduitError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ConduitError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ConduitError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ConduitError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ConduitError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(ConduitError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, its parent and grandparent,
/// then the same three levels relative to the executable.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        roots.push(exe_dir);
    }

    roots.iter().flat_map(|root| candidates_in(root)).find(|path| path.exists())
}

fn candidates_in(root: &Path) -> Vec<PathBuf> {
    root.ancestors()
        .take(3)
        .flat_map(|dir| FILE_NAMES.iter().map(move |name| dir.join(name)))
        .collect()
}

/// Get required environment variable
///
/// # Errors
/// Returns `ConduitError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        ConduitError::Config(format!("Missing required environment variable: {}", key))
    })
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an optional numeric environment variable
///
/// # Errors
/// Returns `ConduitError::Config` if the variable is set but does not parse.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConduitError::Config(format!("Invalid value for {}: {}", key, e)))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_KEYS: [&str; 8] = [
        "CONDUIT_BASE_URL",
        "CONDUIT_TIMEOUT_MS",
        "CONDUIT_USER_AGENT",
        "CONDUIT_MAX_RETRIES",
        "CONDUIT_BASE_DELAY_MS",
        "CONDUIT_MAX_DELAY_MS",
        "CONDUIT_REFRESH_PATH",
        "CONDUIT_KEYCHAIN_SERVICE",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    fn write_temp(contents: &str, extension: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        path
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("CONDUIT_BASE_URL", "https://api.example.com/v1");
        std::env::set_var("CONDUIT_TIMEOUT_MS", "5000");
        std::env::set_var("CONDUIT_USER_AGENT", "tests/1.0");
        std::env::set_var("CONDUIT_MAX_RETRIES", "5");
        std::env::set_var("CONDUIT_BASE_DELAY_MS", "250");
        std::env::set_var("CONDUIT_MAX_DELAY_MS", "4000");
        std::env::set_var("CONDUIT_REFRESH_PATH", "/session/renew");
        std::env::set_var("CONDUIT_KEYCHAIN_SERVICE", "conduit.tests");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.base_url, "https://api.example.com/v1");
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.user_agent, "tests/1.0");
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.base_delay_ms, 250);
        assert_eq!(config.retry.max_delay_ms, 4000);
        assert_eq!(config.auth.refresh_path, "/session/renew");
        assert_eq!(config.auth.keychain_service, "conduit.tests");
    }

    #[test]
    fn test_load_from_env_defaults_optional_vars() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("CONDUIT_BASE_URL", "http://localhost:9000");
        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.timeout_ms, 30_000);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.auth.refresh_path, "/auth/refresh");
    }

    #[test]
    fn test_load_from_env_missing_base_url() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, ConduitError::Config(_)), "Should be a Config error");
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("CONDUIT_BASE_URL", "http://localhost:9000");
        std::env::set_var("CONDUIT_MAX_RETRIES", "many");
        let result = load_from_env();
        clear_env();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("CONDUIT_MAX_RETRIES"));
    }

    #[test]
    fn test_load_rejects_invalid_env_config() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("CONDUIT_BASE_URL", "ftp://files.example.com");
        let result = load();
        clear_env();

        assert!(matches!(result, Err(ConduitError::Config(_))));
    }

    #[test]
    fn test_load_from_file_json() {
        let path = write_temp(
            r#"{
                "base_url": "https://api.example.com",
                "timeout_ms": 1000,
                "retry": { "max_retries": 1 }
            }"#,
            "json",
        );

        let config = load_from_file(Some(path.clone())).expect("config from JSON file");
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.timeout_ms, 1000);
        assert_eq!(config.retry.max_retries, 1);
        assert_eq!(config.retry.base_delay_ms, 1000);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_toml() {
        let path = write_temp(
            r#"
base_url = "https://api.example.com"

[retry]
max_retries = 0
max_delay_ms = 2000

[auth]
refresh_path = "/token"
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).expect("config from TOML file");
        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.retry.max_delay_ms, 2000);
        assert_eq!(config.auth.refresh_path, "/token");
        assert_eq!(config.timeout_ms, 30_000);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let err = load_from_file(Some(PathBuf::from("/nonexistent/conduit.json"))).unwrap_err();
        assert!(matches!(err, ConduitError::Config(_)), "Should be a Config error");
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let path = write_temp(r#"{ "this is": "not valid json" "#, "json");

        assert!(load_from_file(Some(path.clone())).is_err(), "Should fail with invalid JSON");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("base_url: x", &PathBuf::from("conduit.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }

    #[test]
    fn test_candidates_cover_three_levels() {
        let candidates = candidates_in(Path::new("/a/b/c"));
        assert_eq!(candidates.len(), 12);
        assert_eq!(candidates[0], PathBuf::from("/a/b/c/conduit.json"));
        assert_eq!(candidates[4], PathBuf::from("/a/b/conduit.json"));
        assert_eq!(candidates[11], PathBuf::from("/a/config.toml"));
    }
}
