use sea_orm_migration::prelude::*;

use super::{
  m20260601_000001_create_users::Users, m20260601_000002_create_tiers::Tiers,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(RevenueEntries::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(RevenueEntries::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(RevenueEntries::UserId).big_integer().not_null(),
          )
          .col(ColumnDef::new(RevenueEntries::TierId).integer().null())
          .col(
            ColumnDef::new(RevenueEntries::Amount).big_integer().not_null(),
          )
          .col(ColumnDef::new(RevenueEntries::EntryType).string().not_null())
          .col(
            ColumnDef::new(RevenueEntries::Status)
              .string()
              .not_null()
              .default("completed"),
          )
          .col(
            ColumnDef::new(RevenueEntries::CreatedAt).date_time().not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_revenue_entries_user")
              .from(RevenueEntries::Table, RevenueEntries::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_revenue_entries_tier")
              .from(RevenueEntries::Table, RevenueEntries::TierId)
              .to(Tiers::Table, Tiers::Id),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_revenue_entries_user")
          .table(RevenueEntries::Table)
          .col(RevenueEntries::UserId)
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_revenue_entries_type")
          .table(RevenueEntries::Table)
          .col(RevenueEntries::EntryType)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(RevenueEntries::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum RevenueEntries {
  Table,
  Id,
  UserId,
  TierId,
  Amount,
  EntryType,
  Status,
  CreatedAt,
}
