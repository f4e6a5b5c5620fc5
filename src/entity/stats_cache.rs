use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Single-row materialized aggregate (id is always 1, upsert-only).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admin_stats_cache")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: i32,
  pub total_revenue: i64,
  /// Distinct users with a completed subscription entry
  pub total_subscriptions: i64,
  pub pending_withdrawals_count: i64,
  pub pending_withdrawals_total: i64,
  pub last_updated: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
