//! Configuration loading.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`--config printwatch.toml`)
//! 3. Environment variables prefixed `PRINTWATCH_`, nested with `__`
//!    (e.g. `PRINTWATCH_OCTOPRINT__APIKEY`)
//! 4. Command-line overrides

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use printwatch_adapters::filament::DatabaseSettings;

use crate::duration::parse_duration;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "PRINTWATCH";

/// Annotated sample configuration printed by `--sample-config`.
pub const SAMPLE_CONFIG: &str = r#"# printwatch configuration

## How often to gather printer metrics
interval = "10s"
## Per-request timeout for OctoPrint and the filament database
timeout = "5s"

[octoprint]
## OctoPrint's URL
url = "http://octopi.local"
## OctoPrint's API key
apikey = ""
## Poll the DisplayLayerProgress plugin for layer counters
layer_progress = true

## OPTIONAL: FilamentManager PostgreSQL database.
## Set all four to enable spool metrics, or leave all four empty.
[filament]
## Database name
dbname = ""
## User that has access to the database
user = ""
## Password for the user
password = ""
## Host of the database, optionally with a port (db.local:5432)
host = ""

[output]
## Print InfluxDB line protocol to stdout
stdout = true
## Overwrite this file with each cycle's records as JSON (empty = disabled)
file = ""
## Send line protocol to this host:port (empty = disabled)
tcp = ""
"#;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A source could not be read or did not deserialize.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// No OctoPrint URL was configured.
    #[error("octoprint.url is required")]
    MissingUrl,

    /// A duration setting was zero.
    #[error("{key} must be greater than zero")]
    ZeroDuration { key: &'static str },

    /// Some but not all database settings were given.
    #[error(
        "filament database settings are incomplete (missing: {}); set all four or none",
        missing.join(", ")
    )]
    PartialDatabase { missing: Vec<&'static str> },
}

/// Values given on the command line; `None` leaves lower sources in charge.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub interval: Option<String>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(deserialize_with = "deserialize_duration")]
    pub interval: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    #[serde(default)]
    pub octoprint: OctoPrintSettings,
    #[serde(default)]
    pub filament: DatabaseSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OctoPrintSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default, alias = "api_key")]
    pub apikey: String,
    #[serde(default = "enabled")]
    pub layer_progress: bool,
}

impl Default for OctoPrintSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            apikey: String::new(),
            layer_progress: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "enabled")]
    pub stdout: bool,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub tcp: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            stdout: true,
            file: String::new(),
            tcp: String::new(),
        }
    }
}

impl OutputSettings {
    /// Path of the JSON file output, if enabled.
    pub fn file_path(&self) -> Option<PathBuf> {
        (!self.file.is_empty()).then(|| PathBuf::from(&self.file))
    }

    /// Address of the TCP output, if enabled.
    pub fn tcp_addr(&self) -> Option<&str> {
        (!self.tcp.is_empty()).then_some(self.tcp.as_str())
    }
}

fn enabled() -> bool {
    true
}

impl Settings {
    /// Load from an optional file, the process environment and overrides.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self, SettingsError> {
        Self::load_with_env(path, environment(), overrides)
    }

    /// Load with an explicit environment source.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Environment,
        overrides: &Overrides,
    ) -> Result<Self, SettingsError> {
        let mut builder = Config::builder()
            .set_default("interval", "10s")?
            .set_default("timeout", "5s")?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings: Settings = builder
            .add_source(env)
            .set_override_option("octoprint.url", overrides.url.clone())?
            .set_override_option("octoprint.apikey", overrides.api_key.clone())?
            .set_override_option("interval", overrides.interval.clone())?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.octoprint.url.trim().is_empty() {
            return Err(SettingsError::MissingUrl);
        }
        if self.interval.is_zero() {
            return Err(SettingsError::ZeroDuration { key: "interval" });
        }
        if self.timeout.is_zero() {
            return Err(SettingsError::ZeroDuration { key: "timeout" });
        }
        if !self.filament.is_empty() && !self.filament.is_complete() {
            return Err(SettingsError::PartialDatabase {
                missing: self.filament.missing(),
            });
        }
        Ok(())
    }

    /// True when the FilamentManager database is configured.
    pub fn filament_enabled(&self) -> bool {
        self.filament.is_complete()
    }
}

/// The `PRINTWATCH_` environment source.
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

/// Durations are strings with a unit ("10s") or a bare number of seconds.
fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Seconds(secs) => Ok(Duration::from_secs(secs)),
        Raw::Text(text) => match text.trim().parse::<u64>() {
            Ok(secs) => Ok(Duration::from_secs(secs)),
            Err(_) => parse_duration(&text).map_err(serde::de::Error::custom),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    fn with_url() -> Overrides {
        Overrides {
            url: Some("http://octopi.local".into()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_apply_without_file() {
        let settings = Settings::load_with_env(None, env(&[]), &with_url()).unwrap();

        assert_eq!(settings.interval, Duration::from_secs(10));
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.octoprint.url, "http://octopi.local");
        assert!(settings.octoprint.layer_progress);
        assert!(settings.output.stdout);
        assert!(settings.output.file_path().is_none());
        assert!(settings.output.tcp_addr().is_none());
        assert!(!settings.filament_enabled());
    }

    #[test]
    fn sample_config_is_valid() {
        let file = write_config(SAMPLE_CONFIG);
        let settings = Settings::load_with_env(Some(file.path()), env(&[]), &Overrides::default())
            .unwrap();

        assert_eq!(settings.octoprint.url, "http://octopi.local");
        assert_eq!(settings.interval, Duration::from_secs(10));
        assert!(!settings.filament_enabled());
    }

    #[test]
    fn file_values_are_read() {
        let file = write_config(
            r#"
            interval = "30s"
            timeout = 2

            [octoprint]
            url = "http://printer:5000"
            apikey = "ABC123"
            layer_progress = false

            [filament]
            dbname = "spools"
            user = "octo"
            password = "pw"
            host = "db.local:5433"

            [output]
            stdout = false
            file = "/var/lib/printwatch/latest.json"
            tcp = "localhost:8094"
            "#,
        );

        let settings =
            Settings::load_with_env(Some(file.path()), env(&[]), &Overrides::default()).unwrap();

        assert_eq!(settings.interval, Duration::from_secs(30));
        assert_eq!(settings.timeout, Duration::from_secs(2));
        assert_eq!(settings.octoprint.apikey, "ABC123");
        assert!(!settings.octoprint.layer_progress);
        assert!(settings.filament_enabled());
        assert_eq!(settings.filament.name, "spools");
        assert_eq!(settings.filament.host, "db.local:5433");
        assert!(!settings.output.stdout);
        assert_eq!(
            settings.output.file_path(),
            Some(PathBuf::from("/var/lib/printwatch/latest.json"))
        );
        assert_eq!(settings.output.tcp_addr(), Some("localhost:8094"));
    }

    #[test]
    fn environment_overrides_file() {
        let file = write_config(
            r#"
            [octoprint]
            url = "http://from-file"
            apikey = "file-key"
            "#,
        );

        let settings = Settings::load_with_env(
            Some(file.path()),
            env(&[
                ("PRINTWATCH_OCTOPRINT__APIKEY", "env-key"),
                ("PRINTWATCH_INTERVAL", "1m"),
            ]),
            &Overrides::default(),
        )
        .unwrap();

        assert_eq!(settings.octoprint.url, "http://from-file");
        assert_eq!(settings.octoprint.apikey, "env-key");
        assert_eq!(settings.interval, Duration::from_secs(60));
    }

    #[test]
    fn overrides_beat_environment() {
        let overrides = Overrides {
            url: Some("http://from-cli".into()),
            api_key: Some("cli-key".into()),
            interval: Some("2s".into()),
        };

        let settings = Settings::load_with_env(
            None,
            env(&[
                ("PRINTWATCH_OCTOPRINT__URL", "http://from-env"),
                ("PRINTWATCH_OCTOPRINT__APIKEY", "env-key"),
            ]),
            &overrides,
        )
        .unwrap();

        assert_eq!(settings.octoprint.url, "http://from-cli");
        assert_eq!(settings.octoprint.apikey, "cli-key");
        assert_eq!(settings.interval, Duration::from_secs(2));
    }

    #[test]
    fn bare_seconds_from_environment() {
        let settings = Settings::load_with_env(
            None,
            env(&[("PRINTWATCH_INTERVAL", "10"), ("PRINTWATCH_TIMEOUT", " 3 ")]),
            &with_url(),
        )
        .unwrap();

        assert_eq!(settings.interval, Duration::from_secs(10));
        assert_eq!(settings.timeout, Duration::from_secs(3));
    }

    #[test]
    fn missing_url_is_rejected() {
        let err = Settings::load_with_env(None, env(&[]), &Overrides::default()).unwrap_err();
        assert!(matches!(err, SettingsError::MissingUrl));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let overrides = Overrides {
            interval: Some("0s".into()),
            ..with_url()
        };
        let err = Settings::load_with_env(None, env(&[]), &overrides).unwrap_err();
        assert!(matches!(err, SettingsError::ZeroDuration { key: "interval" }));
    }

    #[test]
    fn malformed_duration_is_a_load_error() {
        let overrides = Overrides {
            interval: Some("soon".into()),
            ..with_url()
        };
        let err = Settings::load_with_env(None, env(&[]), &overrides).unwrap_err();
        assert!(matches!(err, SettingsError::Load(_)));
    }

    #[test]
    fn partial_database_settings_fail_loudly() {
        let file = write_config(
            r#"
            [octoprint]
            url = "http://octopi.local"

            [filament]
            dbname = "spools"
            user = "octo"
            "#,
        );

        let err = Settings::load_with_env(Some(file.path()), env(&[]), &Overrides::default())
            .unwrap_err();

        match err {
            SettingsError::PartialDatabase { missing } => {
                assert_eq!(missing, ["password", "host"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn partial_database_error_names_missing_keys() {
        let err = SettingsError::PartialDatabase {
            missing: vec!["password", "host"],
        };
        assert_eq!(
            err.to_string(),
            "filament database settings are incomplete (missing: password, host); set all four or none"
        );
    }
}
