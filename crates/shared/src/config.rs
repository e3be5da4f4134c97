//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Upload storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// How stored filenames are generated from the client-supplied name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingScheme {
    /// `<millis>-<name>`, with a random suffix only when that name is taken.
    #[default]
    Timestamp,
    /// `<millis>-<suffix>-<name>` for every upload.
    TimestampWithSuffix,
}

/// Upload storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Directory holding uploaded files, created at startup if absent.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,
    /// Stored filename scheme.
    #[serde(default)]
    pub naming: NamingScheme,
    /// Maximum accepted request body size for uploads, unlimited when unset.
    #[serde(default)]
    pub max_body_bytes: Option<usize>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            uploads_dir: default_uploads_dir(),
            naming: NamingScheme::default(),
            max_body_bytes: None,
        }
    }
}

fn default_uploads_dir() -> String {
    "uploads".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FILEDROP").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Address the server binds to, as `host:port`.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_any_source() {
        temp_env::with_vars_unset(
            [
                "FILEDROP__SERVER__HOST",
                "FILEDROP__SERVER__PORT",
                "FILEDROP__STORAGE__UPLOADS_DIR",
                "FILEDROP__STORAGE__NAMING",
                "FILEDROP__STORAGE__MAX_BODY_BYTES",
            ],
            || {
                let config = AppConfig::load().expect("should load defaults");
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.server.port, 3000);
                assert_eq!(config.storage.uploads_dir, "uploads");
                assert_eq!(config.storage.naming, NamingScheme::Timestamp);
                assert_eq!(config.storage.max_body_bytes, None);
            },
        );
    }

    #[test]
    fn test_environment_overrides() {
        temp_env::with_vars(
            [
                ("FILEDROP__SERVER__PORT", Some("8088")),
                ("FILEDROP__STORAGE__UPLOADS_DIR", Some("/tmp/filedrop")),
                ("FILEDROP__STORAGE__NAMING", Some("timestamp_with_suffix")),
                ("FILEDROP__STORAGE__MAX_BODY_BYTES", Some("1048576")),
            ],
            || {
                let config = AppConfig::load().expect("should load from env");
                assert_eq!(config.server.port, 8088);
                assert_eq!(config.storage.uploads_dir, "/tmp/filedrop");
                assert_eq!(config.storage.naming, NamingScheme::TimestampWithSuffix);
                assert_eq!(config.storage.max_body_bytes, Some(1_048_576));
                assert_eq!(config.bind_address(), "0.0.0.0:8088");
            },
        );
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        temp_env::with_var("FILEDROP__SERVER__PORT", Some("not-a-port"), || {
            assert!(AppConfig::load().is_err());
        });
    }
}
