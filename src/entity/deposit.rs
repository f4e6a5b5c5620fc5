use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{tier, user};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
  #[sea_orm(string_value = "pending")]
  #[default]
  Pending,
  #[sea_orm(string_value = "approved")]
  Approved,
  #[sea_orm(string_value = "rejected")]
  Rejected,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "manual_deposits")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub user_id: i64,
  pub tier_id: i32,
  pub amount: i64,
  pub network: String,
  /// External on-chain transfer reference claimed by the user, globally unique
  pub tx_ref: String,
  pub status: DepositStatus,
  pub admin_notes: Option<String>,
  pub approved_by: Option<i64>,
  pub approved_at: Option<DateTime>,
  pub created_at: DateTime,
  pub updated_at: DateTime,
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
