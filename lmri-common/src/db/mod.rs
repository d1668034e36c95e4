//! Database gateway
//!
//! LORIS runs on MySQL; connections go through the sqlx `Any` driver so the
//! same queries run against SQLite in tests. All SQL uses `?` placeholders,
//! which both backends accept.

pub mod settings;

use crate::config::DatabaseConfig;
use crate::{Error, Result};
use sqlx::any::{AnyConnectOptions, AnyPoolOptions};
use sqlx::mysql::MySqlConnectOptions;
use sqlx::{Any, AnyPool, ConnectOptions, Transaction};
use std::str::FromStr;
use tracing::{debug, info};

/// Open database handle
///
/// Holds a single-connection pool: the tools are strictly sequential and
/// one connection keeps the transaction and plain queries on the same
/// session.
#[derive(Debug, Clone)]
pub struct Database {
    pool: AnyPool,
}

impl Database {
    /// Connect using profile credentials and verify with `SELECT 1`
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = connect_options(config)?;
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        info!(
            host = %config.host,
            database = %config.database,
            "Connected to database"
        );

        Ok(Self { pool })
    }

    /// Underlying pool for ad-hoc queries
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Start a transaction
    pub async fn begin(&self) -> Result<Transaction<'static, Any>> {
        let tx = self.pool.begin().await?;
        debug!("Transaction started");
        Ok(tx)
    }

    /// Look up a value from the LORIS `Config` table
    pub async fn get_config(&self, name: &str) -> Result<Option<String>> {
        settings::get_config(&self.pool, name).await
    }

    /// Close all connections
    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// Build connection options from credentials
///
/// `url` wins when present; otherwise a MySQL URL is assembled from the
/// individual fields so that special characters in the password are
/// encoded by sqlx itself.
pub fn connect_options(config: &DatabaseConfig) -> Result<AnyConnectOptions> {
    sqlx::any::install_default_drivers();

    if let Some(url) = &config.url {
        return AnyConnectOptions::from_str(url)
            .map_err(|e| Error::Config(format!("Invalid database url: {}", e)));
    }

    config.validate()?;

    let mut mysql = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.username)
        .database(&config.database);
    if let Some(password) = config.resolved_password() {
        mysql = mysql.password(&password);
    }

    AnyConnectOptions::from_url(&mysql.to_url_lossy())
        .map_err(|e| Error::Config(format!("Invalid database credentials: {}", e)))
}
