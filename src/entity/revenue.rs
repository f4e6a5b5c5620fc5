use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{tier, user};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
  #[sea_orm(string_value = "subscription")]
  Subscription,
  #[sea_orm(string_value = "referral_payout")]
  ReferralPayout,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
  #[sea_orm(string_value = "pending")]
  Pending,
  #[sea_orm(string_value = "completed")]
  #[default]
  Completed,
}

/// Append-only ledger of balance-affecting events. Rows are never updated;
/// they are deleted only in bulk when the owning user is deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "revenue_entries")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub user_id: i64,
  pub tier_id: Option<i32>,
  /// Signed microUSDT: positive = income, negative = payout expense
  pub amount: i64,
  pub entry_type: EntryType,
  pub status: EntryStatus,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "user::Entity",
    from = "Column::UserId",
    to = "user::Column::Id"
  )]
  User,
  #[sea_orm(
    belongs_to = "tier::Entity",
    from = "Column::TierId",
    to = "tier::Column::Id"
  )]
  Tier,
}

impl Related<user::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::User.def()
  }
}

impl Related<tier::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Tier.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
