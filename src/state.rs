use std::env;

use anyhow::Context;
use migration::{Migrator, MigratorTrait};

use crate::{prelude::*, sv::UserLocks};

pub struct Config {
  pub database_url: String,
  pub port: u16,
  pub admin_token: String,
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let database_url = env::var("DATABASE_URL")
      .unwrap_or_else(|_| "sqlite:nova.db?mode=rwc".into());
    let port =
      env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(3000);
    let admin_token = env::var("ADMIN_TOKEN").context("ADMIN_TOKEN not set")?;

    Ok(Self { database_url, port, admin_token })
  }
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub locks: UserLocks,
  pub config: Config,
}

impl AppState {
  /// Connects to the database and applies pending migrations before the
  /// server starts taking requests.
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    let db = Database::connect(&config.database_url)
      .await
      .context("Failed to connect to database")?;
    Migrator::up(&db, None).await.context("Migration failed")?;

    info!("database ready ({})", config.database_url);

    Ok(Self { db, locks: UserLocks::new(), config })
  }
}
