pub use sea_orm_migration::prelude::*;

mod m20260601_000001_create_users;
mod m20260601_000002_create_tiers;
mod m20260601_000003_create_manual_deposits;
mod m20260601_000004_create_withdrawals;
mod m20260601_000005_create_revenue_entries;
mod m20260601_000006_create_admin_stats_cache;
mod m20260615_000007_create_announcements;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20260601_000001_create_users::Migration),
      Box::new(m20260601_000002_create_tiers::Migration),
      Box::new(m20260601_000003_create_manual_deposits::Migration),
      Box::new(m20260601_000004_create_withdrawals::Migration),
      Box::new(m20260601_000005_create_revenue_entries::Migration),
      Box::new(m20260601_000006_create_admin_stats_cache::Migration),
      Box::new(m20260615_000007_create_announcements::Migration),
    ]
  }
}
