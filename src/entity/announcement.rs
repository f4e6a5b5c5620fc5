use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "announcements")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub title: String,
  pub content: String,
  /// At most one row is active at a time, swapped on publish
  pub is_active: bool,
  pub created_by: Option<i64>,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "user::Entity",
    from = "Column::CreatedBy",
    to = "user::Column::Id"
  )]
  Author,
}

impl Related<user::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Author.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
