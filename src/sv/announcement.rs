use sea_orm::sea_query::Expr;

use crate::{entity::announcement, prelude::*};

pub struct Announcement<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Announcement<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Publishes a new announcement, deactivating every previous one in
  /// the same transaction so exactly one row stays active.
  pub async fn publish(
    &self,
    title: &str,
    content: &str,
    created_by: Option<i64>,
  ) -> Result<announcement::Model> {
    if title.trim().is_empty() || content.trim().is_empty() {
      return Err(Error::InvalidArgs("Title and content are required".into()));
    }

    let txn = self.db.begin().await?;

    announcement::Entity::update_many()
      .col_expr(announcement::Column::IsActive, Expr::value(false))
      .filter(announcement::Column::IsActive.eq(true))
      .exec(&txn)
      .await?;

    let created = announcement::ActiveModel {
      id: NotSet,
      title: Set(title.trim().to_string()),
      content: Set(content.trim().to_string()),
      is_active: Set(true),
      created_by: Set(created_by),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!("announcement #{} published", created.id);
    Ok(created)
  }

  pub async fn active(&self) -> Result<Option<announcement::Model>> {
    Ok(
      announcement::Entity::find()
        .filter(announcement::Column::IsActive.eq(true))
        .order_by_desc(announcement::Column::CreatedAt)
        .one(self.db)
        .await?,
    )
  }

  pub async fn history(
    &self,
    limit: u64,
  ) -> Result<Vec<announcement::Model>> {
    Ok(
      announcement::Entity::find()
        .order_by_desc(announcement::Column::CreatedAt)
        .limit(limit)
        .all(self.db)
        .await?,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test_utils::test_db;

  #[tokio::test]
  async fn publish_swaps_the_active_row() {
    let db = test_db::setup().await;
    let announcements = Announcement::new(&db);

    let first =
      announcements.publish("Welcome", "Hello world", None).await.unwrap();
    assert!(first.is_active);

    let second = announcements
      .publish("Maintenance", "Back at noon", None)
      .await
      .unwrap();

    let active: Vec<_> = announcement::Entity::find()
      .filter(announcement::Column::IsActive.eq(true))
      .all(&db)
      .await
      .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, second.id);

    assert_eq!(announcements.history(10).await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn publish_rejects_empty_fields() {
    let db = test_db::setup().await;

    let result = Announcement::new(&db).publish("", "body", None).await;
    assert!(matches!(result, Err(Error::InvalidArgs(_))));
  }
}
