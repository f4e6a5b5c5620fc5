use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(AdminStatsCache::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(AdminStatsCache::Id)
              .integer()
              .not_null()
              .primary_key(),
          )
          .col(
            ColumnDef::new(AdminStatsCache::TotalRevenue)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(AdminStatsCache::TotalSubscriptions)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(AdminStatsCache::PendingWithdrawalsCount)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(AdminStatsCache::PendingWithdrawalsTotal)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(AdminStatsCache::LastUpdated)
              .date_time()
              .not_null(),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(AdminStatsCache::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum AdminStatsCache {
  Table,
  Id,
  TotalRevenue,
  TotalSubscriptions,
  PendingWithdrawalsCount,
  PendingWithdrawalsTotal,
  LastUpdated,
}
