use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::deposit;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tiers")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: i32,
  /// Price in microUSDT, fixed at seeding time
  pub price: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "deposit::Entity")]
  Deposits,
}

impl Related<deposit::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Deposits.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
