use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Users::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Users::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(Users::Email)
              .string()
              .not_null()
              .unique_key(),
          )
          .col(
            ColumnDef::new(Users::Username)
              .string()
              .not_null()
              .unique_key(),
          )
          .col(ColumnDef::new(Users::PasswordHash).string().not_null())
          .col(
            ColumnDef::new(Users::IsVerified)
              .boolean()
              .not_null()
              .default(false),
          )
          .col(
            ColumnDef::new(Users::IsAdmin)
              .boolean()
              .not_null()
              .default(false),
          )
          .col(
            ColumnDef::new(Users::TierId)
              .integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(Users::PaymentStatus)
              .string()
              .not_null()
              .default("pending"),
          )
          .col(ColumnDef::new(Users::WalletNetwork).string().null())
          .col(ColumnDef::new(Users::WalletAddress).string().null())
          .col(
            ColumnDef::new(Users::LockedBalance)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(Users::WithdrawableBalance)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(Users::TotalEarnings)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(Users::TotalWithdrawal)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(Users::AdViewsToday)
              .integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(Users::DailyEarnings)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(ColumnDef::new(Users::LastDailyReset).date().null())
          .col(ColumnDef::new(Users::ReferrerId).big_integer().null())
          .col(ColumnDef::new(Users::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(Users::UpdatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_users_referrer")
              .from(Users::Table, Users::ReferrerId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::SetNull),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_users_referrer")
          .table(Users::Table)
          .col(Users::ReferrerId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Users::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Users {
  Table,
  Id,
  Email,
  Username,
  PasswordHash,
  IsVerified,
  IsAdmin,
  TierId,
  PaymentStatus,
  WalletNetwork,
  WalletAddress,
  LockedBalance,
  WithdrawableBalance,
  TotalEarnings,
  TotalWithdrawal,
  AdViewsToday,
  DailyEarnings,
  LastDailyReset,
  ReferrerId,
  CreatedAt,
  UpdatedAt,
}
