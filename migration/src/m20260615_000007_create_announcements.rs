use sea_orm_migration::prelude::*;

use super::m20260601_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Announcements::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Announcements::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Announcements::Title).string().not_null())
          .col(ColumnDef::new(Announcements::Content).string().not_null())
          .col(
            ColumnDef::new(Announcements::IsActive)
              .boolean()
              .not_null()
              .default(true),
          )
          .col(ColumnDef::new(Announcements::CreatedBy).big_integer().null())
          .col(
            ColumnDef::new(Announcements::CreatedAt).date_time().not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_announcements_author")
              .from(Announcements::Table, Announcements::CreatedBy)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::SetNull),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Announcements::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum Announcements {
  Table,
  Id,
  Title,
  Content,
  IsActive,
  CreatedBy,
  CreatedAt,
}
