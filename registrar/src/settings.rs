use config::{Config, ConfigError, Environment, File};
use registrator_core::naming::DEFAULT_SERVICES_ROOT;
use registrator_core::AdapterOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Prefix of the environment variables overriding the file, e.g. `REGISTRAR_URI`.
pub const ENV_PREFIX: &str = "REGISTRAR";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RegistrarConfig {
    /// Adapter connection URI. The scheme selects the adapter.
    pub uri: String,
    /// Root of the services namespace in the store.
    pub services_root: String,
    pub connect_timeout_secs: u64,
    pub log_level: String,
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            uri: "etcdcatalog://".to_string(),
            services_root: DEFAULT_SERVICES_ROOT.to_string(),
            connect_timeout_secs: 5,
            log_level: "info".to_string(),
        }
    }
}

impl RegistrarConfig {
    /// Layers defaults, the optional file at `path`, then `REGISTRAR_*` variables.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn adapter_options(&self) -> AdapterOptions {
        AdapterOptions {
            services_root: self.services_root.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RegistrarConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.services_root, DEFAULT_SERVICES_ROOT);
        assert_eq!(config.connect_timeout_secs, 5);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "uri = \"etcdcatalog://10.0.0.1:2379\"").unwrap();
        writeln!(file, "services_root = \"/svc\"").unwrap();

        let config = RegistrarConfig::load(file.path()).unwrap();
        assert_eq!(config.uri, "etcdcatalog://10.0.0.1:2379");
        assert_eq!(config.log_level, "info");

        let options = config.adapter_options();
        assert_eq!(options.services_root, "/svc");
        assert_eq!(options.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "uri = ").unwrap();
        assert!(RegistrarConfig::load(file.path()).is_err());
    }
}
