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
          .table(ManualDeposits::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(ManualDeposits::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(ManualDeposits::UserId).big_integer().not_null(),
          )
          .col(ColumnDef::new(ManualDeposits::TierId).integer().not_null())
          .col(
            ColumnDef::new(ManualDeposits::Amount).big_integer().not_null(),
          )
          .col(ColumnDef::new(ManualDeposits::Network).string().not_null())
          .col(
            ColumnDef::new(ManualDeposits::TxRef)
              .string()
              .not_null()
              .unique_key(),
          )
          .col(
            ColumnDef::new(ManualDeposits::Status)
              .string()
              .not_null()
              .default("pending"),
          )
          .col(ColumnDef::new(ManualDeposits::AdminNotes).string().null())
          .col(
            ColumnDef::new(ManualDeposits::ApprovedBy).big_integer().null(),
          )
          .col(ColumnDef::new(ManualDeposits::ApprovedAt).date_time().null())
          .col(
            ColumnDef::new(ManualDeposits::CreatedAt).date_time().not_null(),
          )
          .col(
            ColumnDef::new(ManualDeposits::UpdatedAt).date_time().not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_manual_deposits_user")
              .from(ManualDeposits::Table, ManualDeposits::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_manual_deposits_tier")
              .from(ManualDeposits::Table, ManualDeposits::TierId)
              .to(Tiers::Table, Tiers::Id),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_manual_deposits_user")
          .table(ManualDeposits::Table)
          .col(ManualDeposits::UserId)
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_manual_deposits_status")
          .table(ManualDeposits::Table)
          .col(ManualDeposits::Status)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(ManualDeposits::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum ManualDeposits {
  Table,
  Id,
  UserId,
  TierId,
  Amount,
  Network,
  TxRef,
  Status,
  AdminNotes,
  ApprovedBy,
  ApprovedAt,
  CreatedAt,
  UpdatedAt,
}
