use sea_orm::sea_query::Expr;

use crate::{
  entity::{
    EntryStatus, EntryType, WithdrawalStatus, deposit, revenue, stats_cache,
    tier, user, withdrawal,
  },
  prelude::*,
};

/// The aggregate is a single-row upsert keyed by this id.
const CACHE_ROW: i32 = 1;

pub struct Stats<'a> {
  db: &'a DatabaseConnection,
}

#[derive(Debug, Clone)]
pub struct Overview {
  pub total_users: u64,
  pub total_revenue: i64,
  pub total_subscriptions: i64,
  pub pending_withdrawals_count: i64,
  pub pending_withdrawals_total: i64,
  pub pending_deposits_count: i64,
  pub pending_deposits_total: i64,
  pub last_updated: DateTime,
}

#[derive(Debug, Clone)]
pub struct TierRevenue {
  pub tier_id: i32,
  pub price: i64,
  pub subscriptions: i64,
  pub revenue: i64,
}

impl<'a> Stats<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Recomputes the cache from the ledger and live withdrawal rows.
  pub async fn recompute(&self) -> Result<stats_cache::Model> {
    Self::recompute_at(self.db, Utc::now().naive_utc()).await
  }

  /// The cache must always equal this deterministic recomputation at the
  /// moment of the last update, so every mutating workflow calls this
  /// inside its own transaction. Idempotent for a fixed `now`.
  pub(crate) async fn recompute_at<C: ConnectionTrait>(
    conn: &C,
    now: DateTime,
  ) -> Result<stats_cache::Model> {
    let revenue: Option<Option<i64>> = revenue::Entity::find()
      .select_only()
      .column_as(Expr::col(revenue::Column::Amount).sum(), "total")
      .filter(revenue::Column::EntryType.eq(EntryType::Subscription))
      .filter(revenue::Column::Status.eq(EntryStatus::Completed))
      .into_tuple()
      .one(conn)
      .await?;
    let total_revenue = revenue.flatten().unwrap_or(0);

    let subscribers: Vec<i64> = revenue::Entity::find()
      .select_only()
      .column(revenue::Column::UserId)
      .filter(revenue::Column::EntryType.eq(EntryType::Subscription))
      .filter(revenue::Column::Status.eq(EntryStatus::Completed))
      .distinct()
      .into_tuple()
      .all(conn)
      .await?;
    let total_subscriptions = subscribers.len() as i64;

    let pending: Option<(i64, Option<i64>)> = withdrawal::Entity::find()
      .select_only()
      .column_as(Expr::col(withdrawal::Column::Id).count(), "count")
      .column_as(Expr::col(withdrawal::Column::Amount).sum(), "total")
      .filter(withdrawal::Column::Status.eq(WithdrawalStatus::Pending))
      .into_tuple()
      .one(conn)
      .await?;
    let (pending_count, pending_total) = match pending {
      Some((count, total)) => (count, total.unwrap_or(0)),
      None => (0, 0),
    };

    let snapshot = match stats_cache::Entity::find_by_id(CACHE_ROW)
      .one(conn)
      .await?
    {
      Some(cache) => {
        stats_cache::ActiveModel {
          total_revenue: Set(total_revenue),
          total_subscriptions: Set(total_subscriptions),
          pending_withdrawals_count: Set(pending_count),
          pending_withdrawals_total: Set(pending_total),
          last_updated: Set(now),
          ..cache.into()
        }
        .update(conn)
        .await?
      }
      None => {
        stats_cache::ActiveModel {
          id: Set(CACHE_ROW),
          total_revenue: Set(total_revenue),
          total_subscriptions: Set(total_subscriptions),
          pending_withdrawals_count: Set(pending_count),
          pending_withdrawals_total: Set(pending_total),
          last_updated: Set(now),
        }
        .insert(conn)
        .await?
      }
    };

    Ok(snapshot)
  }

  /// Cached aggregates plus the live counters the admin dashboard shows
  /// alongside them.
  pub async fn overview(&self) -> Result<Overview> {
    let cache =
      match stats_cache::Entity::find_by_id(CACHE_ROW).one(self.db).await? {
        Some(cache) => cache,
        None => self.recompute().await?,
      };

    let total_users = user::Entity::find().count(self.db).await?;

    let pending: Option<(i64, Option<i64>)> = deposit::Entity::find()
      .select_only()
      .column_as(Expr::col(deposit::Column::Id).count(), "count")
      .column_as(Expr::col(deposit::Column::Amount).sum(), "total")
      .filter(deposit::Column::Status.eq(deposit::DepositStatus::Pending))
      .into_tuple()
      .one(self.db)
      .await?;
    let (deposits_count, deposits_total) = match pending {
      Some((count, total)) => (count, total.unwrap_or(0)),
      None => (0, 0),
    };

    Ok(Overview {
      total_users,
      total_revenue: cache.total_revenue,
      total_subscriptions: cache.total_subscriptions,
      pending_withdrawals_count: cache.pending_withdrawals_count,
      pending_withdrawals_total: cache.pending_withdrawals_total,
      pending_deposits_count: deposits_count,
      pending_deposits_total: deposits_total,
      last_updated: cache.last_updated,
    })
  }

  pub async fn recent(&self, limit: u64) -> Result<Vec<revenue::Model>> {
    Ok(
      revenue::Entity::find()
        .order_by_desc(revenue::Column::CreatedAt)
        .limit(limit)
        .all(self.db)
        .await?,
    )
  }

  /// Completed subscription revenue rolled up per tier.
  pub async fn breakdown(&self) -> Result<Vec<TierRevenue>> {
    let rows: Vec<(Option<i32>, i64, Option<i64>)> = revenue::Entity::find()
      .select_only()
      .column(revenue::Column::TierId)
      .column_as(Expr::col(revenue::Column::Id).count(), "subscriptions")
      .column_as(Expr::col(revenue::Column::Amount).sum(), "revenue")
      .filter(revenue::Column::EntryType.eq(EntryType::Subscription))
      .filter(revenue::Column::Status.eq(EntryStatus::Completed))
      .group_by(revenue::Column::TierId)
      .into_tuple()
      .all(self.db)
      .await?;

    let tiers = tier::Entity::find()
      .order_by_asc(tier::Column::Id)
      .all(self.db)
      .await?;

    Ok(
      tiers
        .into_iter()
        .map(|t| {
          let row = rows.iter().find(|(id, ..)| *id == Some(t.id));
          TierRevenue {
            tier_id: t.id,
            price: t.price,
            subscriptions: row.map_or(0, |(_, count, _)| *count),
            revenue: row.and_then(|(.., sum)| *sum).unwrap_or(0),
          }
        })
        .collect(),
    )
  }
}
