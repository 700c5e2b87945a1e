use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PosecamConfig {
    pub relay: RelayConfig,
    pub engine: EngineConfig,
    pub staging: StagingConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RelayConfig {
    /// IP address to bind to
    #[serde(default = "default_relay_ip")]
    pub ip: String,

    /// Port to listen on
    #[serde(default = "default_relay_port")]
    pub port: u16,

    /// Maximum accepted upload size in megabytes
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EngineConfig {
    /// Base URL of the external pose analysis engine
    #[serde(default = "default_engine_base_url")]
    pub base_url: String,

    /// Upper bound on a single engine call; unset means wait indefinitely
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StagingConfig {
    /// Directory holding uploads while they are forwarded
    #[serde(default = "default_staging_dir")]
    pub dir: PathBuf,

    /// How staged files are named
    #[serde(default = "default_staging_naming")]
    pub naming: StagingNaming,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ClientConfig {
    /// Base URL of the relay the client submits to
    #[serde(default = "default_client_relay_url")]
    pub relay_url: String,

    /// Upper bound on a single submission; unset means wait indefinitely
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

/// Naming policy for staged uploads
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StagingNaming {
    /// One shared slot; concurrent requests overwrite each other
    Fixed,
    /// A fresh name per request
    Unique,
}

impl EngineConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl RelayConfig {
    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_mb * 1024 * 1024
    }
}

impl PosecamConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("posecam.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("relay.ip", default_relay_ip())?
            .set_default("relay.port", default_relay_port())?
            .set_default("relay.body_limit_mb", default_body_limit_mb() as i64)?
            .set_default("engine.base_url", default_engine_base_url())?
            .set_default(
                "staging.dir",
                default_staging_dir().to_string_lossy().to_string(),
            )?
            .set_default("staging.naming", "unique")?
            .set_default("client.relay_url", default_client_relay_url())?
            .add_source(File::with_name(&path_str).required(false))
            // POSECAM_ENGINE__BASE_URL, POSECAM_RELAY__PORT, ...
            .add_source(
                Environment::with_prefix("POSECAM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: PosecamConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.relay.port == 0 {
            return Err(ConfigError::Message(
                "Relay port must be greater than 0".to_string(),
            ));
        }

        if self.relay.body_limit_mb == 0 {
            return Err(ConfigError::Message(
                "Relay body_limit_mb must be greater than 0".to_string(),
            ));
        }

        if self.engine.base_url.trim().is_empty() {
            return Err(ConfigError::Message(
                "Engine base_url must not be empty".to_string(),
            ));
        }

        if self.engine.timeout_seconds == Some(0) {
            return Err(ConfigError::Message(
                "Engine timeout_seconds must be greater than 0 when set".to_string(),
            ));
        }

        if self.staging.dir.as_os_str().is_empty() {
            return Err(ConfigError::Message(
                "Staging dir must not be empty".to_string(),
            ));
        }

        if self.client.relay_url.trim().is_empty() {
            return Err(ConfigError::Message(
                "Client relay_url must not be empty".to_string(),
            ));
        }

        if self.client.timeout_seconds == Some(0) {
            return Err(ConfigError::Message(
                "Client timeout_seconds must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for PosecamConfig {
    fn default() -> Self {
        Self {
            relay: RelayConfig {
                ip: default_relay_ip(),
                port: default_relay_port(),
                body_limit_mb: default_body_limit_mb(),
            },
            engine: EngineConfig {
                base_url: default_engine_base_url(),
                timeout_seconds: None,
            },
            staging: StagingConfig {
                dir: default_staging_dir(),
                naming: default_staging_naming(),
            },
            client: ClientConfig {
                relay_url: default_client_relay_url(),
                timeout_seconds: None,
            },
        }
    }
}

// Default value functions
fn default_relay_ip() -> String {
    "0.0.0.0".to_string()
}
fn default_relay_port() -> u16 {
    3000
}
fn default_body_limit_mb() -> usize {
    200
}

fn default_engine_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("./uploads")
}
fn default_staging_naming() -> StagingNaming {
    StagingNaming::Unique
}

fn default_client_relay_url() -> String {
    "http://localhost:3000".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = PosecamConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.staging.naming, StagingNaming::Unique);
        assert!(config.engine.timeout().is_none());
        assert_eq!(config.relay.body_limit_bytes(), 200 * 1024 * 1024);
    }

    #[test]
    fn test_config_validation() {
        let mut config = PosecamConfig::default();

        config.relay.port = 0;
        assert!(config.validate().is_err());
        config.relay.port = 3000;

        config.engine.base_url = "  ".to_string();
        assert!(config.validate().is_err());
        config.engine.base_url = default_engine_base_url();

        config.engine.timeout_seconds = Some(0);
        assert!(config.validate().is_err());
        config.engine.timeout_seconds = Some(30);
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.timeout(), Some(Duration::from_secs(30)));

        config.relay.body_limit_mb = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[relay]
port = 8181

[engine]
base_url = "http://engine.internal:5000"

[staging]
naming = "fixed"
"#
        )
        .unwrap();

        let config = PosecamConfig::load_from_file(file.path()).unwrap();

        assert_eq!(config.relay.port, 8181);
        assert_eq!(config.relay.ip, "0.0.0.0");
        assert_eq!(config.engine.base_url, "http://engine.internal:5000");
        assert_eq!(config.staging.naming, StagingNaming::Fixed);
        assert_eq!(config.staging.dir, PathBuf::from("./uploads"));
    }

    #[test]
    fn test_environment_variable_override() {
        env::set_var("POSECAM_CLIENT__RELAY_URL", "http://relay.test:9999");

        let config = PosecamConfig::load_from_file("does-not-exist.toml").unwrap();
        assert_eq!(config.client.relay_url, "http://relay.test:9999");

        env::remove_var("POSECAM_CLIENT__RELAY_URL");
    }

    #[test]
    fn test_print_default_config_roundtrips_through_toml() {
        let rendered = toml::to_string_pretty(&PosecamConfig::default()).unwrap();
        let parsed: PosecamConfig = toml::from_str(&rendered).unwrap();

        assert_eq!(parsed.relay.port, 3000);
        assert_eq!(parsed.staging.dir, PathBuf::from("./uploads"));
    }
}
