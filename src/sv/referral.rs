use std::collections::HashMap;

use crate::{
  entity::{EntryStatus, EntryType, deposit, revenue, user},
  prelude::*,
};

/// Flat commission rate paid to a referrer when a referred user's
/// deposit is approved, in percent of the deposit amount.
pub const COMMISSION_RATE_PCT: i64 = 5;

pub fn commission(amount: i64) -> i64 {
  amount * COMMISSION_RATE_PCT / 100
}

pub struct Referral<'a> {
  db: &'a DatabaseConnection,
}

#[derive(Debug, Clone)]
pub struct ReferredUser {
  pub id: i64,
  pub username: String,
  pub tier_id: i32,
  pub paid: bool,
  pub total_spent: i64,
  pub commission_earned: i64,
  pub registered_at: DateTime,
}

#[derive(Debug, Clone)]
pub struct ReferralSummary {
  pub total_referrals: u64,
  pub successful_referrals: u64,
  pub pending_referrals: u64,
  pub total_earnings: i64,
  pub referred: Vec<ReferredUser>,
}

impl<'a> Referral<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Credits the referrer's withdrawable balance and lifetime earnings
  /// and appends the payout expense to the ledger. Commission is
  /// unconditional: no cap, no minimum, unverified referrers included.
  /// Returns the amount paid, or zero when the referrer row is gone.
  pub(crate) async fn pay_commission<C: ConnectionTrait>(
    conn: &C,
    referrer_id: i64,
    tier_id: i32,
    amount: i64,
    now: DateTime,
  ) -> Result<i64> {
    let Some(referrer) =
      user::Entity::find_by_id(referrer_id).one(conn).await?
    else {
      warn!("referrer {referrer_id} no longer exists, skipping commission");
      return Ok(0);
    };

    let payout = commission(amount);

    user::ActiveModel {
      withdrawable_balance: Set(referrer.withdrawable_balance + payout),
      total_earnings: Set(referrer.total_earnings + payout),
      updated_at: Set(now),
      ..referrer.into()
    }
    .update(conn)
    .await?;

    revenue::ActiveModel {
      id: NotSet,
      user_id: Set(referrer_id),
      tier_id: Set(Some(tier_id)),
      amount: Set(-payout),
      entry_type: Set(EntryType::ReferralPayout),
      status: Set(EntryStatus::Completed),
      created_at: Set(now),
    }
    .insert(conn)
    .await?;

    Ok(payout)
  }

  pub async fn summary(&self, user_id: i64) -> Result<ReferralSummary> {
    user::Entity::find_by_id(user_id)
      .one(self.db)
      .await?
      .ok_or(Error::UserNotFound)?;

    let referred_users = user::Entity::find()
      .filter(user::Column::ReferrerId.eq(user_id))
      .order_by_desc(user::Column::CreatedAt)
      .all(self.db)
      .await?;

    let ids: Vec<i64> = referred_users.iter().map(|u| u.id).collect();
    let mut spent_by_user: HashMap<i64, i64> = HashMap::new();
    if !ids.is_empty() {
      let approved = deposit::Entity::find()
        .filter(deposit::Column::UserId.is_in(ids))
        .filter(deposit::Column::Status.eq(deposit::DepositStatus::Approved))
        .all(self.db)
        .await?;
      for dep in approved {
        *spent_by_user.entry(dep.user_id).or_default() += dep.amount;
      }
    }

    // Lifetime commission comes from the ledger, where payouts are
    // recorded as negative expense rows.
    let payouts: Vec<i64> = revenue::Entity::find()
      .select_only()
      .column(revenue::Column::Amount)
      .filter(revenue::Column::UserId.eq(user_id))
      .filter(revenue::Column::EntryType.eq(EntryType::ReferralPayout))
      .into_tuple()
      .all(self.db)
      .await?;
    let total_earnings = -payouts.iter().sum::<i64>();

    let referred: Vec<ReferredUser> = referred_users
      .into_iter()
      .map(|u| {
        let total_spent = spent_by_user.get(&u.id).copied().unwrap_or(0);
        ReferredUser {
          id: u.id,
          username: u.username,
          tier_id: u.tier_id,
          paid: u.payment_status == user::PaymentStatus::Paid,
          total_spent,
          commission_earned: commission(total_spent),
          registered_at: u.created_at,
        }
      })
      .collect();

    let total_referrals = referred.len() as u64;
    let successful_referrals =
      referred.iter().filter(|r| r.paid).count() as u64;

    Ok(ReferralSummary {
      total_referrals,
      successful_referrals,
      pending_referrals: total_referrals - successful_referrals,
      total_earnings,
      referred,
    })
  }
}

#[cfg(test)]
mod tests {
  use sea_orm::ActiveModelTrait;

  use super::*;
  use crate::{entity::*, sv::test_utils::test_db, utils::MICRO_USDT};

  #[test]
  fn commission_is_five_percent() {
    assert_eq!(commission(200 * MICRO_USDT), 10 * MICRO_USDT);
    assert_eq!(commission(0), 0);
  }

  #[tokio::test]
  async fn pay_commission_credits_referrer_and_ledger() {
    let db = test_db::setup().await;
    test_db::tier(3, 0).insert(&db).await.unwrap();
    test_db::user(1).insert(&db).await.unwrap();

    let now = Utc::now().naive_utc();
    let paid = Referral::pay_commission(&db, 1, 3, 200 * MICRO_USDT, now)
      .await
      .unwrap();
    assert_eq!(paid, 10 * MICRO_USDT);

    let referrer =
      user::Entity::find_by_id(1i64).one(&db).await.unwrap().unwrap();
    assert_eq!(referrer.withdrawable_balance, 10 * MICRO_USDT);
    assert_eq!(referrer.total_earnings, 10 * MICRO_USDT);

    let entry = revenue::Entity::find().one(&db).await.unwrap().unwrap();
    assert_eq!(entry.user_id, 1);
    assert_eq!(entry.amount, -10 * MICRO_USDT);
    assert_eq!(entry.entry_type, EntryType::ReferralPayout);
  }

  #[tokio::test]
  async fn missing_referrer_is_skipped() {
    let db = test_db::setup().await;

    let now = Utc::now().naive_utc();
    let paid =
      Referral::pay_commission(&db, 404, 1, MICRO_USDT, now).await.unwrap();

    assert_eq!(paid, 0);
    assert!(revenue::Entity::find().one(&db).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn summary_counts_referred_users() {
    let db = test_db::setup().await;
    test_db::user(1).insert(&db).await.unwrap();
    user::ActiveModel {
      referrer_id: Set(Some(1)),
      payment_status: Set(PaymentStatus::Paid),
      tier_id: Set(2),
      ..test_db::user(2)
    }
    .insert(&db)
    .await
    .unwrap();
    user::ActiveModel { referrer_id: Set(Some(1)), ..test_db::user(3) }
      .insert(&db)
      .await
      .unwrap();

    let summary = Referral::new(&db).summary(1).await.unwrap();
    assert_eq!(summary.total_referrals, 2);
    assert_eq!(summary.successful_referrals, 1);
    assert_eq!(summary.pending_referrals, 1);
  }
}
