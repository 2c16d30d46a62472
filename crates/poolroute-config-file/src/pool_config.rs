//! Pool configuration file format

use http::HeaderName;
use poolroute_core::{Endpoint, EndpointRegistry, Error, Result};
use poolroute_egress::HttpClientConfig;
use poolroute_routing::{DEFAULT_CREDENTIAL_HEADER, DispatchConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Header that carries each endpoint's credential
    #[serde(default = "default_credential_header")]
    pub credential_header: String,

    /// Cooldown applied when a 429 has no usable retry-after
    #[serde(default = "default_cooldown_secs")]
    pub default_cooldown_secs: u64,

    /// Ordered endpoint pool
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,

    #[serde(default)]
    pub http: HttpSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub host: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,

    /// Environment variable holding the credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,

    #[serde(default = "default_pool_idle_timeout_secs")]
    pub pool_idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            credential_header: default_credential_header(),
            default_cooldown_secs: default_cooldown_secs(),
            endpoints: Vec::new(),
            http: HttpSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
            pool_idle_timeout_secs: default_pool_idle_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl PoolConfig {
    /// Read a config file; `.toml` files are parsed as TOML, anything else as YAML
    ///
    /// # Errors
    /// - `Error::ConfigNotFound` if the file doesn't exist
    /// - `Error::Io` if it can't be read
    /// - `Error::Config` if it doesn't parse
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = expand_tilde(path.as_ref())?;

        if !path.exists() {
            return Err(Error::ConfigNotFound);
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| {
            error!("Failed to read config file: {}", e);
            Error::Io(e)
        })?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            Self::from_toml_str(&contents)?
        } else {
            // Default to YAML
            Self::from_yaml_str(&contents)?
        };

        info!(
            path = ?path,
            endpoints = config.endpoints.len(),
            "Loaded pool configuration"
        );
        Ok(config)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents).map_err(|e| Error::Config(format!("Invalid YAML: {}", e)))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("POOLROUTE_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Ok(val) = std::env::var("POOLROUTE_DEFAULT_COOLDOWN_SECS") {
            match val.parse::<u64>() {
                Ok(secs) => self.default_cooldown_secs = secs,
                Err(_) => warn!(
                    value = %val,
                    "Invalid POOLROUTE_DEFAULT_COOLDOWN_SECS, keeping configured value"
                ),
            }
        }
    }

    /// Check settings that don't need the environment
    ///
    /// Pool-level rules (non-empty, unique hosts, valid hosts) are enforced by
    /// [`PoolConfig::build_registry`].
    pub fn validate(&self) -> Result<()> {
        self.credential_header_name()?;

        if self.default_cooldown_secs == 0 {
            return Err(Error::Config(
                "default_cooldown_secs must be greater than 0".to_string(),
            ));
        }

        for endpoint in &self.endpoints {
            match (&endpoint.credential, &endpoint.credential_env) {
                (Some(_), None) | (None, Some(_)) => {}
                (Some(_), Some(_)) => {
                    return Err(Error::Config(format!(
                        "endpoint '{}' sets both credential and credential_env",
                        endpoint.host
                    )));
                }
                (None, None) => {
                    return Err(Error::Config(format!(
                        "endpoint '{}' needs a credential or credential_env",
                        endpoint.host
                    )));
                }
            }
        }

        Ok(())
    }

    /// Resolve credentials and build the immutable endpoint registry
    pub fn build_registry(&self) -> Result<EndpointRegistry> {
        let endpoints = self
            .endpoints
            .iter()
            .map(EndpointConfig::resolve)
            .collect::<Result<Vec<_>>>()?;

        EndpointRegistry::new(endpoints)
    }

    pub fn dispatch_config(&self) -> Result<DispatchConfig> {
        Ok(DispatchConfig {
            credential_header: self.credential_header_name()?,
            default_cooldown: Duration::from_secs(self.default_cooldown_secs),
        })
    }

    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout_secs: self.http.timeout_secs,
            connect_timeout_secs: self.http.connect_timeout_secs,
            pool_max_idle_per_host: self.http.pool_max_idle_per_host,
            pool_idle_timeout_secs: self.http.pool_idle_timeout_secs,
            ..HttpClientConfig::default()
        }
    }

    fn credential_header_name(&self) -> Result<HeaderName> {
        HeaderName::from_bytes(self.credential_header.as_bytes()).map_err(|_| {
            Error::Config(format!(
                "Invalid credential_header '{}'",
                self.credential_header
            ))
        })
    }
}

impl EndpointConfig {
    /// Turn this entry into an [`Endpoint`], reading `credential_env` if set
    pub fn resolve(&self) -> Result<Endpoint> {
        let credential = match (&self.credential, &self.credential_env) {
            (Some(credential), _) => credential.clone(),
            (None, Some(var)) => std::env::var(var).map_err(|_| {
                Error::Config(format!(
                    "environment variable '{}' for endpoint '{}' is not set",
                    var, self.host
                ))
            })?,
            (None, None) => {
                return Err(Error::Config(format!(
                    "endpoint '{}' needs a credential or credential_env",
                    self.host
                )));
            }
        };

        debug!(host = %self.host, "Resolved endpoint credential");
        Ok(Endpoint::new(self.host.clone(), credential))
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => Ok(dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?
            .join(rest)),
        Err(_) => Ok(path.to_path_buf()),
    }
}

fn default_credential_header() -> String {
    DEFAULT_CREDENTIAL_HEADER.to_string()
}

fn default_cooldown_secs() -> u64 {
    60
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_pool_max_idle_per_host() -> usize {
    32
}

fn default_pool_idle_timeout_secs() -> u64 {
    90
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const YAML: &str = r#"
credential_header: api-key
default_cooldown_secs: 45
endpoints:
  - host: aoai-instance-eastus.openai.azure.com
    credential: key1
  - host: aoai-instance-westus.openai.azure.com
    credential: key2
http:
  timeout_secs: 30
logging:
  level: debug
"#;

    fn write_temp(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_yaml_file() {
        let file = write_temp(".yaml", YAML);
        let config = PoolConfig::from_file(file.path()).unwrap();

        assert_eq!(config.credential_header, "api-key");
        assert_eq!(config.default_cooldown_secs, 45);
        assert_eq!(config.endpoints.len(), 2);
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.http.connect_timeout_secs, 10); // default
        assert_eq!(config.logging.level, "debug");

        let registry = config.build_registry().unwrap();
        assert_eq!(
            registry.hosts(),
            vec![
                "aoai-instance-eastus.openai.azure.com",
                "aoai-instance-westus.openai.azure.com"
            ]
        );
        assert_eq!(registry.get(1).credential(), "key2");
    }

    #[test]
    fn test_load_toml_file() {
        let toml = r#"
credential_header = "authorization"

[[endpoints]]
host = "a.example.com"
credential = "Bearer a"
"#;
        let file = write_temp(".toml", toml);
        let config = PoolConfig::from_file(file.path()).unwrap();

        assert_eq!(config.default_cooldown_secs, 60);
        let dispatch = config.dispatch_config().unwrap();
        assert_eq!(dispatch.credential_header, http::header::AUTHORIZATION);
        assert_eq!(dispatch.default_cooldown, Duration::from_secs(60));
    }

    #[test]
    fn test_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.credential_header, "api-key");
        assert_eq!(config.default_cooldown_secs, 60);
        assert_eq!(config.logging.level, "info");

        let http = config.http_client_config();
        assert_eq!(http.timeout_secs, 600);
        assert_eq!(http.pool_idle_timeout_secs, 90);
    }

    #[test]
    fn test_missing_file() {
        let result = PoolConfig::from_file("/definitely/not/here/poolroute.yaml");
        assert!(matches!(result.unwrap_err(), Error::ConfigNotFound));
    }

    #[test]
    fn test_invalid_yaml() {
        let result = PoolConfig::from_yaml_str("endpoints: [unterminated");
        assert!(matches!(result.unwrap_err(), Error::Config(_)));
    }

    #[test]
    fn test_empty_pool_rejected() {
        let config = PoolConfig::from_yaml_str("endpoints: []").unwrap();
        assert!(config.validate().is_ok());
        assert!(matches!(
            config.build_registry().unwrap_err(),
            Error::EmptyRegistry
        ));
    }

    #[test]
    fn test_duplicate_hosts_rejected() {
        let config = PoolConfig::from_yaml_str(
            r#"
endpoints:
  - host: a.example.com
    credential: k1
  - host: a.example.com
    credential: k2
"#,
        )
        .unwrap();
        assert!(matches!(
            config.build_registry().unwrap_err(),
            Error::DuplicateHost(_)
        ));
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let mut config = PoolConfig::from_yaml_str(YAML).unwrap();
        assert!(config.validate().is_ok());

        config.default_cooldown_secs = 0;
        assert!(config.validate().is_err());

        let mut config = PoolConfig::from_yaml_str(YAML).unwrap();
        config.credential_header = "not a header".to_string();
        assert!(config.validate().is_err());

        let mut config = PoolConfig::from_yaml_str(YAML).unwrap();
        config.endpoints[0].credential = None;
        assert!(config.validate().is_err());

        let mut config = PoolConfig::from_yaml_str(YAML).unwrap();
        config.endpoints[0].credential_env = Some("SOME_VAR".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_credential_from_env() {
        // SAFETY: serialized with the other env tests
        unsafe { std::env::set_var("POOLROUTE_TEST_WESTUS_KEY", "key-from-env") };

        let config = PoolConfig::from_yaml_str(
            r#"
endpoints:
  - host: westus.example.com
    credential_env: POOLROUTE_TEST_WESTUS_KEY
"#,
        )
        .unwrap();
        config.validate().unwrap();

        let registry = config.build_registry().unwrap();
        assert_eq!(registry.get(0).credential(), "key-from-env");

        unsafe { std::env::remove_var("POOLROUTE_TEST_WESTUS_KEY") };
        let err = config.build_registry().unwrap_err();
        assert!(err.to_string().contains("POOLROUTE_TEST_WESTUS_KEY"));
    }

    #[test]
    #[serial]
    fn test_merge_env_overrides() {
        // SAFETY: serialized with the other env tests
        unsafe {
            std::env::set_var("POOLROUTE_LOG_LEVEL", "trace");
            std::env::set_var("POOLROUTE_DEFAULT_COOLDOWN_SECS", "15");
        }

        let mut config = PoolConfig::from_yaml_str(YAML).unwrap();
        config.merge_env();
        assert_eq!(config.logging.level, "trace");
        assert_eq!(config.default_cooldown_secs, 15);

        unsafe { std::env::set_var("POOLROUTE_DEFAULT_COOLDOWN_SECS", "soon") };
        let mut config = PoolConfig::from_yaml_str(YAML).unwrap();
        config.merge_env();
        assert_eq!(config.default_cooldown_secs, 45);

        unsafe {
            std::env::remove_var("POOLROUTE_LOG_LEVEL");
            std::env::remove_var("POOLROUTE_DEFAULT_COOLDOWN_SECS");
        }
    }

    #[test]
    fn test_expand_tilde_passthrough() {
        let path = Path::new("/etc/poolroute.yaml");
        assert_eq!(expand_tilde(path).unwrap(), PathBuf::from("/etc/poolroute.yaml"));
    }
}
