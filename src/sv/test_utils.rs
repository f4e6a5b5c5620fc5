//! Shared test utilities for database setup

#[cfg(test)]
pub mod test_db {
  use chrono::Utc;
  use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DbBackend, Schema, Set,
  };

  use crate::entity::*;

  /// Creates an in-memory SQLite database with all required tables
  pub async fn setup() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let schema = Schema::new(DbBackend::Sqlite);

    let stmt = schema.create_table_from_entity(user::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(tier::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(deposit::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(withdrawal::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(revenue::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(stats_cache::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(announcement::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    db
  }

  /// Baseline active model for a user; tests override the fields they
  /// care about with struct update syntax before inserting.
  pub fn user(id: i64) -> user::ActiveModel {
    let now = Utc::now().naive_utc();
    user::ActiveModel {
      id: Set(id),
      email: Set(format!("user{id}@example.com")),
      username: Set(format!("user{id}")),
      password_hash: Set("deadbeef".into()),
      is_verified: Set(true),
      is_admin: Set(false),
      tier_id: Set(0),
      payment_status: Set(PaymentStatus::Pending),
      wallet_network: Set(None),
      wallet_address: Set(None),
      locked_balance: Set(0),
      withdrawable_balance: Set(0),
      total_earnings: Set(0),
      total_withdrawal: Set(0),
      ad_views_today: Set(0),
      daily_earnings: Set(0),
      last_daily_reset: Set(None),
      referrer_id: Set(None),
      created_at: Set(now),
      updated_at: Set(now),
    }
  }

  pub fn tier(id: i32, price: i64) -> tier::ActiveModel {
    tier::ActiveModel { id: Set(id), price: Set(price) }
  }
}
