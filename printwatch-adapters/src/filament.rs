//! FilamentManager adapter reading the plugin's PostgreSQL database.
//!
//! FilamentManager can store its spool inventory in an external PostgreSQL
//! database. Three tables are read:
//!
//! - `spools` - one row per physical spool (name, weight, used, profile_id)
//! - `profiles` - material profiles (vendor, material)
//! - `selections` - which spool is loaded, per tool
//!
//! With several tools loaded, the spool selected for the lowest tool number
//! is reported.
//!
//! ## Example
//!
//! ```rust,no_run
//! use printwatch_adapters::filament::{DatabaseSettings, PgFilamentStore};
//! use printwatch_adapters::FilamentStore;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = DatabaseSettings {
//!         name: "octoprint_filamentmanager".into(),
//!         user: "octoprint".into(),
//!         password: "secret".into(),
//!         host: "db.local:5432".into(),
//!     };
//!     let store = PgFilamentStore::connect(&settings, Duration::from_secs(5)).await?;
//!
//!     let spool = store.selected_spool().await?;
//!     println!("{} used {}g", spool.display_name(), spool.used);
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use printwatch_types::{FilamentProfile, SelectedSpool};

use crate::{AdapterError, FilamentStore};

const DEFAULT_PORT: u16 = 5432;

const SELECTED_SPOOL_QUERY: &str = "
    SELECT spools.id::BIGINT AS id,
           COALESCE(spools.name, '') AS name,
           COALESCE(ROUND(spools.weight), 0)::BIGINT AS weight,
           COALESCE(ROUND(spools.used), 0)::BIGINT AS used,
           COALESCE(profiles.vendor, '') AS vendor,
           COALESCE(profiles.material, '') AS material
    FROM spools, profiles, selections
    WHERE spools.profile_id = profiles.id AND selections.spool_id = spools.id
    ORDER BY selections.tool, spools.id
    LIMIT 1";

const PROFILES_QUERY: &str = "
    SELECT COALESCE(vendor, '') AS vendor,
           COALESCE(material, '') AS material
    FROM profiles
    ORDER BY id";

/// Connection settings for the FilamentManager database.
///
/// `host` may carry a port (`db.local:5433`); 5432 is assumed otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default, alias = "dbname")]
    pub name: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, alias = "ip")]
    pub host: String,
}

impl DatabaseSettings {
    /// Config keys of the settings that are empty.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("dbname", &self.name),
            ("user", &self.user),
            ("password", &self.password),
            ("host", &self.host),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(key, _)| key)
        .collect()
    }

    /// True when all four settings are set.
    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// True when none of the settings are set.
    pub fn is_empty(&self) -> bool {
        self.missing().len() == 4
    }

    /// Split `host` into host name and port.
    pub fn host_and_port(&self) -> Result<(&str, u16), AdapterError> {
        match self.host.rsplit_once(':') {
            // Bracketed IPv6 literal without a port, e.g. "[::1]"
            Some((_, rest)) if rest.ends_with(']') => {
                Ok((self.host.trim_start_matches('[').trim_end_matches(']'), DEFAULT_PORT))
            }
            Some((host, port)) if !host.is_empty() && !host.ends_with(':') => {
                let port = port.parse().map_err(|_| {
                    AdapterError::Query(format!("invalid database port {:?}", port))
                })?;
                Ok((host.trim_start_matches('[').trim_end_matches(']'), port))
            }
            _ => Ok((&self.host, DEFAULT_PORT)),
        }
    }

    /// Build sqlx connect options.
    pub fn connect_options(&self) -> Result<PgConnectOptions, AdapterError> {
        let (host, port) = self.host_and_port()?;
        Ok(PgConnectOptions::new()
            .host(host)
            .port(port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name))
    }
}

/// FilamentManager reader over a PostgreSQL pool.
///
/// The pool holds a single connection: the gatherer issues one query at a
/// time and cycles never overlap.
#[derive(Debug, Clone)]
pub struct PgFilamentStore {
    pool: PgPool,
}

impl PgFilamentStore {
    /// Connect eagerly, failing if the database cannot be reached.
    pub async fn connect(settings: &DatabaseSettings, timeout: Duration) -> Result<Self, AdapterError> {
        let options = settings.connect_options()?;
        let pool = pool_options(timeout).connect_with(options).await?;
        tracing::debug!(host = %settings.host, database = %settings.name, "connected to filament database");
        Ok(Self { pool })
    }
}

fn pool_options(timeout: Duration) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(timeout)
}

#[async_trait]
impl FilamentStore for PgFilamentStore {
    async fn selected_spool(&self) -> Result<SelectedSpool, AdapterError> {
        let row = sqlx::query_as::<_, SpoolRow>(SELECTED_SPOOL_QUERY)
            .fetch_optional(&self.pool)
            .await?;

        row.map(SelectedSpool::from)
            .ok_or_else(|| AdapterError::NotFound("no spool is currently selected".to_string()))
    }

    async fn profiles(&self) -> Result<Vec<FilamentProfile>, AdapterError> {
        let rows = sqlx::query_as::<_, ProfileRow>(PROFILES_QUERY)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(FilamentProfile::from).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SpoolRow {
    id: i64,
    name: String,
    weight: i64,
    used: i64,
    vendor: String,
    material: String,
}

impl From<SpoolRow> for SelectedSpool {
    fn from(row: SpoolRow) -> Self {
        SelectedSpool {
            id: row.id,
            name: row.name,
            weight: row.weight,
            used: row.used,
            vendor: row.vendor,
            material: row.material,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    vendor: String,
    material: String,
}

impl From<ProfileRow> for FilamentProfile {
    fn from(row: ProfileRow) -> Self {
        FilamentProfile {
            vendor: row.vendor,
            material: row.material,
        }
    }
}
