use sea_orm::sea_query::Expr;

use crate::{
  entity::{WithdrawalStatus, user, withdrawal},
  prelude::*,
  sv::{Decision, Stats, locks::UserLocks, retry},
  utils::MICRO_USDT,
};

/// Policy minimum per request
pub const MIN_WITHDRAWAL: i64 = 11 * MICRO_USDT;
pub const VALID_NETWORKS: [&str; 4] = ["TRC20", "BSC20", "ERC20", "BTC"];
const MIN_ADDRESS_LEN: usize = 10;

pub struct Withdrawal<'a> {
  db: &'a DatabaseConnection,
  locks: &'a UserLocks,
}

#[derive(Debug, Clone)]
pub struct WithdrawalOutcome {
  pub id: i64,
  pub status: WithdrawalStatus,
  pub amount: i64,
}

#[derive(Debug, Clone, Default)]
pub struct WithdrawalSummary {
  pub total_requests: u64,
  pub pending: u64,
  pub approved: u64,
  pub rejected: u64,
  pub total_requested: i64,
  pub total_approved: i64,
}

impl<'a> Withdrawal<'a> {
  pub fn new(db: &'a DatabaseConnection, locks: &'a UserLocks) -> Self {
    Self { db, locks }
  }

  /// Creates a pending request and reserves the amount out of the
  /// withdrawable balance immediately, so concurrent requests cannot
  /// oversubscribe it.
  pub async fn request(
    &self,
    user_id: i64,
    amount: i64,
    network: &str,
    address: &str,
  ) -> Result<withdrawal::Model> {
    if amount < MIN_WITHDRAWAL {
      return Err(Error::InvalidArgs(
        "Minimum withdrawal amount is 11 USDT".into(),
      ));
    }
    if !VALID_NETWORKS.contains(&network) {
      return Err(Error::InvalidArgs(
        "Invalid network. Use TRC20, BSC20, ERC20 or BTC".into(),
      ));
    }
    let address = address.trim();
    if address.len() < MIN_ADDRESS_LEN {
      return Err(Error::InvalidArgs("Invalid wallet address format".into()));
    }

    let _guard = self.locks.acquire(user_id).await;
    retry::with_backoff(|| self.request_once(user_id, amount, network, address))
      .await
  }

  async fn request_once(
    &self,
    user_id: i64,
    amount: i64,
    network: &str,
    address: &str,
  ) -> Result<withdrawal::Model> {
    let now = Utc::now().naive_utc();
    let txn = self.db.begin().await?;

    let user = user::Entity::find_by_id(user_id)
      .one(&txn)
      .await?
      .ok_or(Error::UserNotFound)?;

    if user.withdrawable_balance < amount {
      return Err(Error::InsufficientBalance);
    }

    let request = withdrawal::ActiveModel {
      id: NotSet,
      user_id: Set(user_id),
      amount: Set(amount),
      network: Set(network.to_string()),
      wallet_address: Set(address.to_string()),
      status: Set(WithdrawalStatus::Pending),
      rejection_reason: Set(None),
      created_at: Set(now),
      updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    user::ActiveModel {
      withdrawable_balance: Set(user.withdrawable_balance - amount),
      updated_at: Set(now),
      ..user.into()
    }
    .update(&txn)
    .await?;

    Stats::recompute_at(&txn, now).await?;
    txn.commit().await?;

    info!("withdrawal #{} requested by user {user_id}", request.id);
    Ok(request)
  }

  /// Applies an admin verdict to a pending request. Approval only bumps
  /// the lifetime counter (the funds already left the available pool at
  /// request time); rejection returns the reservation.
  pub async fn decide(
    &self,
    withdrawal_id: i64,
    decision: Decision,
    reason: Option<String>,
  ) -> Result<WithdrawalOutcome> {
    let withdrawal = withdrawal::Entity::find_by_id(withdrawal_id)
      .one(self.db)
      .await?
      .ok_or(Error::WithdrawalNotFound)?;
    if withdrawal.status != WithdrawalStatus::Pending {
      return Err(Error::AlreadyProcessed);
    }

    let _guard = self.locks.acquire(withdrawal.user_id).await;
    retry::with_backoff(|| {
      self.decide_once(&withdrawal, decision, reason.clone())
    })
    .await
  }

  async fn decide_once(
    &self,
    withdrawal: &withdrawal::Model,
    decision: Decision,
    reason: Option<String>,
  ) -> Result<WithdrawalOutcome> {
    let now = Utc::now().naive_utc();

    let status = match decision {
      Decision::Approved => WithdrawalStatus::Approved,
      Decision::Rejected => WithdrawalStatus::Rejected,
    };
    let reason = match decision {
      Decision::Approved => None,
      Decision::Rejected => {
        Some(reason.unwrap_or_else(|| "No reason provided".to_string()))
      }
    };

    let txn = self.db.begin().await?;

    let updated = withdrawal::Entity::update_many()
      .col_expr(withdrawal::Column::Status, Expr::value(status))
      .col_expr(withdrawal::Column::RejectionReason, Expr::value(reason))
      .col_expr(withdrawal::Column::UpdatedAt, Expr::value(now))
      .filter(withdrawal::Column::Id.eq(withdrawal.id))
      .filter(withdrawal::Column::Status.eq(WithdrawalStatus::Pending))
      .exec(&txn)
      .await?;
    if updated.rows_affected == 0 {
      return Err(Error::AlreadyProcessed);
    }

    let user = user::Entity::find_by_id(withdrawal.user_id)
      .one(&txn)
      .await?
      .ok_or(Error::UserNotFound)?;

    match decision {
      Decision::Approved => {
        user::ActiveModel {
          total_withdrawal: Set(user.total_withdrawal + withdrawal.amount),
          updated_at: Set(now),
          ..user.into()
        }
        .update(&txn)
        .await?;
      }
      Decision::Rejected => {
        user::ActiveModel {
          withdrawable_balance: Set(
            user.withdrawable_balance + withdrawal.amount,
          ),
          updated_at: Set(now),
          ..user.into()
        }
        .update(&txn)
        .await?;
      }
    }

    Stats::recompute_at(&txn, now).await?;
    txn.commit().await?;

    info!("withdrawal #{} {:?}", withdrawal.id, status);

    Ok(WithdrawalOutcome {
      id: withdrawal.id,
      status,
      amount: withdrawal.amount,
    })
  }

  pub async fn history(
    &self,
    user_id: i64,
    limit: u64,
  ) -> Result<Vec<withdrawal::Model>> {
    Ok(
      withdrawal::Entity::find()
        .filter(withdrawal::Column::UserId.eq(user_id))
        .order_by_desc(withdrawal::Column::CreatedAt)
        .limit(limit)
        .all(self.db)
        .await?,
    )
  }

  pub async fn all(&self) -> Result<Vec<withdrawal::Model>> {
    Ok(
      withdrawal::Entity::find()
        .order_by_desc(withdrawal::Column::CreatedAt)
        .all(self.db)
        .await?,
    )
  }

  pub async fn summary(&self, user_id: i64) -> Result<WithdrawalSummary> {
    let rows = withdrawal::Entity::find()
      .filter(withdrawal::Column::UserId.eq(user_id))
      .all(self.db)
      .await?;

    let mut summary = WithdrawalSummary::default();
    for row in rows {
      summary.total_requests += 1;
      summary.total_requested += row.amount;
      match row.status {
        WithdrawalStatus::Pending => summary.pending += 1,
        WithdrawalStatus::Approved => {
          summary.approved += 1;
          summary.total_approved += row.amount;
        }
        WithdrawalStatus::Rejected => summary.rejected += 1,
      }
    }
    Ok(summary)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    entity::stats_cache, sv::test_utils::test_db, utils::MICRO_USDT,
  };

  const ADDRESS: &str = "TXmkAddressAddressAddr";

  async fn rich_user(db: &DatabaseConnection, id: i64, withdrawable: i64) {
    user::ActiveModel {
      withdrawable_balance: Set(withdrawable),
      ..test_db::user(id)
    }
    .insert(db)
    .await
    .unwrap();
  }

  #[tokio::test]
  async fn request_reserves_the_amount_immediately() {
    let db = test_db::setup().await;
    rich_user(&db, 1, 100 * MICRO_USDT).await;
    let locks = UserLocks::new();

    let request = Withdrawal::new(&db, &locks)
      .request(1, 40 * MICRO_USDT, "TRC20", ADDRESS)
      .await
      .unwrap();
    assert_eq!(request.status, WithdrawalStatus::Pending);

    let user = user::Entity::find_by_id(1i64).one(&db).await.unwrap().unwrap();
    assert_eq!(user.withdrawable_balance, 60 * MICRO_USDT);

    let cache = stats_cache::Entity::find().one(&db).await.unwrap().unwrap();
    assert_eq!(cache.pending_withdrawals_count, 1);
    assert_eq!(cache.pending_withdrawals_total, 40 * MICRO_USDT);
  }

  #[tokio::test]
  async fn request_rejects_amounts_below_the_minimum() {
    let db = test_db::setup().await;
    rich_user(&db, 1, 100 * MICRO_USDT).await;
    let locks = UserLocks::new();

    let result = Withdrawal::new(&db, &locks)
      .request(1, 10 * MICRO_USDT, "TRC20", ADDRESS)
      .await;
    assert!(matches!(result, Err(Error::InvalidArgs(_))));

    let user = user::Entity::find_by_id(1i64).one(&db).await.unwrap().unwrap();
    assert_eq!(user.withdrawable_balance, 100 * MICRO_USDT);
  }

  #[tokio::test]
  async fn request_fails_when_balance_is_insufficient() {
    let db = test_db::setup().await;
    rich_user(&db, 1, 20 * MICRO_USDT).await;
    let locks = UserLocks::new();

    let result = Withdrawal::new(&db, &locks)
      .request(1, 30 * MICRO_USDT, "TRC20", ADDRESS)
      .await;
    assert!(matches!(result, Err(Error::InsufficientBalance)));

    let user = user::Entity::find_by_id(1i64).one(&db).await.unwrap().unwrap();
    assert_eq!(user.withdrawable_balance, 20 * MICRO_USDT);
    assert!(withdrawal::Entity::find().one(&db).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn concurrent_requests_cannot_overdraw() {
    let db = test_db::setup().await;
    rich_user(&db, 1, 50 * MICRO_USDT).await;
    let locks = UserLocks::new();
    let withdrawals = Withdrawal::new(&db, &locks);

    let (first, second) = tokio::join!(
      withdrawals.request(1, 40 * MICRO_USDT, "TRC20", ADDRESS),
      withdrawals.request(1, 40 * MICRO_USDT, "TRC20", ADDRESS)
    );
    assert_eq!(
      [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(),
      1
    );

    let user = user::Entity::find_by_id(1i64).one(&db).await.unwrap().unwrap();
    assert_eq!(user.withdrawable_balance, 10 * MICRO_USDT);
  }

  #[tokio::test]
  async fn approval_bumps_lifetime_total_only() {
    let db = test_db::setup().await;
    rich_user(&db, 1, 100 * MICRO_USDT).await;
    let locks = UserLocks::new();
    let withdrawals = Withdrawal::new(&db, &locks);

    let request = withdrawals
      .request(1, 40 * MICRO_USDT, "TRC20", ADDRESS)
      .await
      .unwrap();
    let outcome = withdrawals
      .decide(request.id, Decision::Approved, None)
      .await
      .unwrap();
    assert_eq!(outcome.status, WithdrawalStatus::Approved);

    let user = user::Entity::find_by_id(1i64).one(&db).await.unwrap().unwrap();
    assert_eq!(user.withdrawable_balance, 60 * MICRO_USDT);
    assert_eq!(user.total_withdrawal, 40 * MICRO_USDT);

    let cache = stats_cache::Entity::find().one(&db).await.unwrap().unwrap();
    assert_eq!(cache.pending_withdrawals_count, 0);
  }

  #[tokio::test]
  async fn rejection_restores_the_reservation_exactly() {
    let db = test_db::setup().await;
    rich_user(&db, 1, 100 * MICRO_USDT).await;
    let locks = UserLocks::new();
    let withdrawals = Withdrawal::new(&db, &locks);

    let request = withdrawals
      .request(1, 40 * MICRO_USDT, "TRC20", ADDRESS)
      .await
      .unwrap();
    let outcome = withdrawals
      .decide(request.id, Decision::Rejected, Some("bad address".into()))
      .await
      .unwrap();
    assert_eq!(outcome.status, WithdrawalStatus::Rejected);

    let user = user::Entity::find_by_id(1i64).one(&db).await.unwrap().unwrap();
    assert_eq!(user.withdrawable_balance, 100 * MICRO_USDT);
    assert_eq!(user.total_withdrawal, 0);

    let stored = withdrawal::Entity::find_by_id(request.id)
      .one(&db)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(stored.rejection_reason.as_deref(), Some("bad address"));
  }

  #[tokio::test]
  async fn second_decision_conflicts() {
    let db = test_db::setup().await;
    rich_user(&db, 1, 100 * MICRO_USDT).await;
    let locks = UserLocks::new();
    let withdrawals = Withdrawal::new(&db, &locks);

    let request = withdrawals
      .request(1, 40 * MICRO_USDT, "TRC20", ADDRESS)
      .await
      .unwrap();
    withdrawals.decide(request.id, Decision::Rejected, None).await.unwrap();

    let result = withdrawals.decide(request.id, Decision::Rejected, None).await;
    assert!(matches!(result, Err(Error::AlreadyProcessed)));

    // the reservation must not be restored twice
    let user = user::Entity::find_by_id(1i64).one(&db).await.unwrap().unwrap();
    assert_eq!(user.withdrawable_balance, 100 * MICRO_USDT);
  }

  #[tokio::test]
  async fn summary_aggregates_per_user() {
    let db = test_db::setup().await;
    rich_user(&db, 1, 200 * MICRO_USDT).await;
    let locks = UserLocks::new();
    let withdrawals = Withdrawal::new(&db, &locks);

    let a = withdrawals
      .request(1, 40 * MICRO_USDT, "TRC20", ADDRESS)
      .await
      .unwrap();
    let b = withdrawals
      .request(1, 20 * MICRO_USDT, "TRC20", ADDRESS)
      .await
      .unwrap();
    withdrawals.request(1, 15 * MICRO_USDT, "TRC20", ADDRESS).await.unwrap();
    withdrawals.decide(a.id, Decision::Approved, None).await.unwrap();
    withdrawals.decide(b.id, Decision::Rejected, None).await.unwrap();

    let summary = withdrawals.summary(1).await.unwrap();
    assert_eq!(summary.total_requests, 3);
    assert_eq!(summary.pending, 1);
    assert_eq!(summary.approved, 1);
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.total_requested, 75 * MICRO_USDT);
    assert_eq!(summary.total_approved, 40 * MICRO_USDT);
  }
}
