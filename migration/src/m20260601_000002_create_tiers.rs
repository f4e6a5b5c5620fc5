use sea_orm_migration::prelude::*;

/// Tier price list in whole USDT, converted to micro-USDT on insert.
const TIER_PRICES: [(i32, i64); 25] = [
  (1, 20),
  (2, 50),
  (3, 80),
  (4, 100),
  (5, 120),
  (6, 150),
  (7, 200),
  (8, 250),
  (9, 300),
  (10, 400),
  (11, 500),
  (12, 600),
  (13, 700),
  (14, 800),
  (15, 1000),
  (16, 1200),
  (17, 1500),
  (18, 1800),
  (19, 2000),
  (20, 2500),
  (21, 3000),
  (22, 3500),
  (23, 4000),
  (24, 4500),
  (25, 5000),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Tiers::Table)
          .if_not_exists()
          .col(ColumnDef::new(Tiers::Id).integer().not_null().primary_key())
          .col(ColumnDef::new(Tiers::Price).big_integer().not_null())
          .to_owned(),
      )
      .await?;

    for (id, usdt) in TIER_PRICES {
      let insert = Query::insert()
        .into_table(Tiers::Table)
        .columns([Tiers::Id, Tiers::Price])
        .values_panic([id.into(), (usdt * 1_000_000).into()])
        .to_owned();
      manager.exec_stmt(insert).await?;
    }

    Ok(())
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Tiers::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Tiers {
  Table,
  Id,
  Price,
}
