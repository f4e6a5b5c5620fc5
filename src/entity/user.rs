use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{deposit, revenue, withdrawal};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  #[sea_orm(string_value = "pending")]
  #[default]
  Pending,
  #[sea_orm(string_value = "paid")]
  Paid,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub email: String,
  pub username: String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub is_verified: bool,
  pub is_admin: bool,
  /// 0 = no tier purchased yet
  pub tier_id: i32,
  pub payment_status: PaymentStatus,
  pub wallet_network: Option<String>,
  pub wallet_address: Option<String>,
  pub locked_balance: i64,
  pub withdrawable_balance: i64,
  pub total_earnings: i64,
  pub total_withdrawal: i64,
  pub ad_views_today: i32,
  pub daily_earnings: i64,
  pub last_daily_reset: Option<Date>,
  pub referrer_id: Option<i64>,
  pub created_at: DateTime,
  pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "deposit::Entity")]
  Deposits,
  #[sea_orm(has_many = "withdrawal::Entity")]
  Withdrawals,
  #[sea_orm(has_many = "revenue::Entity")]
  RevenueEntries,
}

impl Related<deposit::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Deposits.def()
  }
}

impl Related<withdrawal::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Withdrawals.def()
  }
}

impl Related<revenue::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::RevenueEntries.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
