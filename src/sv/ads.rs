use crate::{
  entity::{PaymentStatus, user},
  prelude::*,
  sv::{locks::UserLocks, retry},
  utils,
};

/// Max rewarded ad views per London civil day
pub const DAILY_AD_LIMIT: i32 = 20;
/// Reward per view in basis points of total balance (0.05%)
pub const REWARD_RATE_BPS: i64 = 5;

pub fn reward_for(balance: i64) -> i64 {
  balance * REWARD_RATE_BPS / 10_000
}

/// Compounds `clicks` successive rewards on top of `balance`; each step
/// feeds the previous reward back into the base.
pub fn project(balance: i64, clicks: i32) -> (i64, i64) {
  let mut current = balance;
  let mut earned = 0;
  for _ in 0..clicks {
    let reward = reward_for(current);
    current += reward;
    earned += reward;
  }
  (current, earned)
}

pub struct Ads<'a> {
  db: &'a DatabaseConnection,
  locks: &'a UserLocks,
}

#[derive(Debug, Clone)]
pub struct AdReward {
  pub reward: i64,
  pub clicks_today: i32,
  pub clicks_remaining: i32,
  pub daily_earnings: i64,
  /// locked + withdrawable after the credit
  pub new_balance: i64,
  pub next_reset: TimeDelta,
}

#[derive(Debug, Clone)]
pub struct AdStats {
  pub clicks_today: i32,
  pub clicks_remaining: i32,
  pub daily_earnings: i64,
  pub current_balance: i64,
  pub earnings_per_click: i64,
  pub projected_daily_earnings: i64,
  pub projected_balance: i64,
  pub last_reset: Option<Date>,
  pub next_reset: TimeDelta,
}

impl<'a> Ads<'a> {
  pub fn new(db: &'a DatabaseConnection, locks: &'a UserLocks) -> Self {
    Self { db, locks }
  }

  pub async fn watch(&self, user_id: i64) -> Result<AdReward> {
    self.watch_at(user_id, Utc::now()).await
  }

  /// Clock-pinned variant; the London day is derived from `now`, never
  /// from the caller's timezone.
  pub(crate) async fn watch_at(
    &self,
    user_id: i64,
    now: chrono::DateTime<Utc>,
  ) -> Result<AdReward> {
    let _guard = self.locks.acquire(user_id).await;
    retry::with_backoff(|| self.watch_once(user_id, now)).await
  }

  async fn watch_once(
    &self,
    user_id: i64,
    now: chrono::DateTime<Utc>,
  ) -> Result<AdReward> {
    let today = utils::london_today(now);

    let txn = self.db.begin().await?;

    let user = user::Entity::find_by_id(user_id)
      .one(&txn)
      .await?
      .ok_or(Error::UserNotFound)?;

    if user.payment_status != PaymentStatus::Paid {
      return Err(Error::InvalidArgs(
        "An active tier subscription is required".into(),
      ));
    }

    // Lazy reset: the first touch after London midnight starts a fresh
    // window; there is no background scheduler.
    let new_day = user.last_daily_reset != Some(today);
    let clicks = if new_day { 0 } else { user.ad_views_today };
    let daily = if new_day { 0 } else { user.daily_earnings };

    if clicks >= DAILY_AD_LIMIT {
      return Err(Error::DailyLimitReached);
    }

    // Self-compounding: the base includes rewards already credited today
    let balance = user.locked_balance + user.withdrawable_balance;
    let reward = reward_for(balance);

    user::ActiveModel {
      ad_views_today: Set(clicks + 1),
      withdrawable_balance: Set(user.withdrawable_balance + reward),
      total_earnings: Set(user.total_earnings + reward),
      daily_earnings: Set(daily + reward),
      last_daily_reset: Set(Some(today)),
      updated_at: Set(now.naive_utc()),
      ..user.into()
    }
    .update(&txn)
    .await?;

    txn.commit().await?;

    debug!("user {user_id} watched ad {} of {DAILY_AD_LIMIT}", clicks + 1);

    Ok(AdReward {
      reward,
      clicks_today: clicks + 1,
      clicks_remaining: DAILY_AD_LIMIT - clicks - 1,
      daily_earnings: daily + reward,
      new_balance: balance + reward,
      next_reset: utils::until_next_reset(now),
    })
  }

  pub async fn stats(&self, user_id: i64) -> Result<AdStats> {
    self.stats_at(user_id, Utc::now()).await
  }

  /// Read-only view; a pending lazy reset is reflected in the numbers
  /// without being persisted.
  pub(crate) async fn stats_at(
    &self,
    user_id: i64,
    now: chrono::DateTime<Utc>,
  ) -> Result<AdStats> {
    let today = utils::london_today(now);

    let user = user::Entity::find_by_id(user_id)
      .one(self.db)
      .await?
      .ok_or(Error::UserNotFound)?;

    let new_day = user.last_daily_reset != Some(today);
    let clicks = if new_day { 0 } else { user.ad_views_today };
    let daily = if new_day { 0 } else { user.daily_earnings };

    let balance = user.locked_balance + user.withdrawable_balance;
    let remaining = DAILY_AD_LIMIT - clicks;
    let (projected_balance, projected_earnings) = project(balance, remaining);

    Ok(AdStats {
      clicks_today: clicks,
      clicks_remaining: remaining,
      daily_earnings: daily,
      current_balance: balance,
      earnings_per_click: reward_for(balance),
      projected_daily_earnings: projected_earnings,
      projected_balance,
      last_reset: user.last_daily_reset,
      next_reset: utils::until_next_reset(now),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{entity::*, sv::test_utils::test_db, utils::MICRO_USDT};

  fn utc(s: &str) -> chrono::DateTime<Utc> {
    s.parse().unwrap()
  }

  async fn paid_user(
    db: &DatabaseConnection,
    id: i64,
    locked: i64,
    withdrawable: i64,
  ) {
    user::ActiveModel {
      payment_status: Set(PaymentStatus::Paid),
      tier_id: Set(4),
      locked_balance: Set(locked),
      withdrawable_balance: Set(withdrawable),
      ..test_db::user(id)
    }
    .insert(db)
    .await
    .unwrap();
  }

  #[tokio::test]
  async fn first_view_pays_five_bps_of_balance() {
    let db = test_db::setup().await;
    paid_user(&db, 1, 100 * MICRO_USDT, 0).await;
    let locks = UserLocks::new();

    let now = utc("2026-03-10T12:00:00Z");
    let result = Ads::new(&db, &locks).watch_at(1, now).await.unwrap();

    // 100 USDT * 0.05% = 0.05 USDT
    assert_eq!(result.reward, 50_000);
    assert_eq!(result.clicks_today, 1);
    assert_eq!(result.clicks_remaining, 19);
    assert_eq!(result.new_balance, 100 * MICRO_USDT + 50_000);

    let user = user::Entity::find_by_id(1i64).one(&db).await.unwrap().unwrap();
    assert_eq!(user.withdrawable_balance, 50_000);
    assert_eq!(user.total_earnings, 50_000);
    assert_eq!(user.daily_earnings, 50_000);
    assert_eq!(user.ad_views_today, 1);
  }

  #[tokio::test]
  async fn second_view_compounds_on_credited_reward() {
    let db = test_db::setup().await;
    paid_user(&db, 1, 100 * MICRO_USDT, 0).await;
    let locks = UserLocks::new();
    let ads = Ads::new(&db, &locks);

    let now = utc("2026-03-10T12:00:00Z");
    ads.watch_at(1, now).await.unwrap();
    let second = ads.watch_at(1, now).await.unwrap();

    // 100.05 USDT * 0.05% = 0.050025 USDT
    assert_eq!(second.reward, 50_025);

    let user = user::Entity::find_by_id(1i64).one(&db).await.unwrap().unwrap();
    assert_eq!(user.withdrawable_balance, 100_025);
  }

  #[tokio::test]
  async fn twenty_first_view_hits_the_daily_limit() {
    let db = test_db::setup().await;
    paid_user(&db, 1, 100 * MICRO_USDT, 0).await;
    let locks = UserLocks::new();
    let ads = Ads::new(&db, &locks);

    let now = utc("2026-03-10T08:00:00Z");
    for _ in 0..DAILY_AD_LIMIT {
      ads.watch_at(1, now).await.unwrap();
    }

    let before =
      user::Entity::find_by_id(1i64).one(&db).await.unwrap().unwrap();
    let result = ads.watch_at(1, now).await;
    assert!(matches!(result, Err(Error::DailyLimitReached)));

    let after =
      user::Entity::find_by_id(1i64).one(&db).await.unwrap().unwrap();
    assert_eq!(before, after);
  }

  #[tokio::test]
  async fn daily_earnings_equal_the_compounded_delta() {
    let db = test_db::setup().await;
    paid_user(&db, 1, 100 * MICRO_USDT, 0).await;
    let locks = UserLocks::new();
    let ads = Ads::new(&db, &locks);

    let now = utc("2026-03-10T08:00:00Z");
    for _ in 0..DAILY_AD_LIMIT {
      ads.watch_at(1, now).await.unwrap();
    }

    let user = user::Entity::find_by_id(1i64).one(&db).await.unwrap().unwrap();
    let (projected, earned) = project(100 * MICRO_USDT, DAILY_AD_LIMIT);
    assert_eq!(user.daily_earnings, earned);
    assert_eq!(user.locked_balance + user.withdrawable_balance, projected);
    assert_eq!(user.daily_earnings, user.withdrawable_balance);
  }

  #[tokio::test]
  async fn counters_reset_lazily_after_london_midnight() {
    let db = test_db::setup().await;
    paid_user(&db, 1, 100 * MICRO_USDT, 0).await;
    let locks = UserLocks::new();
    let ads = Ads::new(&db, &locks);

    let day_one = utc("2026-03-10T08:00:00Z");
    for _ in 0..DAILY_AD_LIMIT {
      ads.watch_at(1, day_one).await.unwrap();
    }
    assert!(ads.watch_at(1, day_one).await.is_err());

    // 00:30 London time the next day
    let day_two = utc("2026-03-11T00:30:00Z");
    let result = ads.watch_at(1, day_two).await.unwrap();
    assert_eq!(result.clicks_today, 1);

    let user = user::Entity::find_by_id(1i64).one(&db).await.unwrap().unwrap();
    assert_eq!(user.ad_views_today, 1);
    assert_eq!(user.daily_earnings, result.reward);
    assert_eq!(user.last_daily_reset, Some("2026-03-11".parse().unwrap()));
  }

  #[tokio::test]
  async fn unpaid_users_earn_nothing() {
    let db = test_db::setup().await;
    test_db::user(1).insert(&db).await.unwrap();
    let locks = UserLocks::new();

    let result = Ads::new(&db, &locks).watch(1).await;
    assert!(matches!(result, Err(Error::InvalidArgs(_))));
  }

  #[tokio::test]
  async fn concurrent_views_cannot_pass_the_limit_twice() {
    let db = test_db::setup().await;
    let locks = UserLocks::new();

    user::ActiveModel {
      payment_status: Set(PaymentStatus::Paid),
      locked_balance: Set(100 * MICRO_USDT),
      ad_views_today: Set(DAILY_AD_LIMIT - 1),
      daily_earnings: Set(1),
      last_daily_reset: Set(Some(utils::london_today(Utc::now()))),
      ..test_db::user(1)
    }
    .insert(&db)
    .await
    .unwrap();

    let ads = Ads::new(&db, &locks);
    let now = Utc::now();
    let (first, second) =
      tokio::join!(ads.watch_at(1, now), ads.watch_at(1, now));

    assert_eq!(
      [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(),
      1
    );

    let user = user::Entity::find_by_id(1i64).one(&db).await.unwrap().unwrap();
    assert_eq!(user.ad_views_today, DAILY_AD_LIMIT);
  }

  #[tokio::test]
  async fn stats_project_the_remaining_clicks() {
    let db = test_db::setup().await;
    paid_user(&db, 1, 100 * MICRO_USDT, 0).await;
    let locks = UserLocks::new();
    let ads = Ads::new(&db, &locks);

    let now = utc("2026-03-10T12:00:00Z");
    ads.watch_at(1, now).await.unwrap();

    let stats = ads.stats_at(1, now).await.unwrap();
    assert_eq!(stats.clicks_today, 1);
    assert_eq!(stats.clicks_remaining, 19);
    assert_eq!(stats.earnings_per_click, reward_for(stats.current_balance));

    let (projected, earned) = project(stats.current_balance, 19);
    assert_eq!(stats.projected_balance, projected);
    assert_eq!(stats.projected_daily_earnings, earned);
  }
}
