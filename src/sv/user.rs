use sea_orm::sea_query::Expr;

use crate::{
  entity::{EntryType, PaymentStatus, deposit, revenue, user, withdrawal},
  prelude::*,
  sv::{Stats, locks::UserLocks, retry, withdrawal as withdrawal_sv},
};

pub struct User<'a> {
  db: &'a DatabaseConnection,
  locks: &'a UserLocks,
}

#[derive(Debug, Clone)]
pub struct DeletedUser {
  pub username: String,
  /// Sum of the user's completed subscription entries, removed from the
  /// global revenue total
  pub revenue_removed: i64,
  pub transactions_deleted: u64,
}

impl<'a> User<'a> {
  pub fn new(db: &'a DatabaseConnection, locks: &'a UserLocks) -> Self {
    Self { db, locks }
  }

  /// Creates a user row. The optional referrer is resolved by username
  /// (signup links carry `?ref=<username>`); an unknown one is ignored.
  pub async fn register(
    &self,
    email: &str,
    username: &str,
    password_hash: &str,
    referred_by: Option<&str>,
  ) -> Result<user::Model> {
    let email = email.trim().to_lowercase();
    let username = username.trim();

    if !email.contains('@') {
      return Err(Error::InvalidArgs("Invalid email address".into()));
    }
    if username.len() < 3 {
      return Err(Error::InvalidArgs(
        "Username must be at least 3 characters".into(),
      ));
    }

    if self.by_username(username).await?.is_some() {
      return Err(Error::InvalidArgs("Username already taken".into()));
    }
    let email_taken = user::Entity::find()
      .filter(user::Column::Email.eq(&email))
      .one(self.db)
      .await?;
    if email_taken.is_some() {
      return Err(Error::InvalidArgs("Email already registered".into()));
    }

    let referrer_id = match referred_by {
      Some(name) => {
        let referrer = self.by_username(name).await?;
        if referrer.is_none() {
          warn!("unknown referral code '{name}', registering without it");
        }
        referrer.map(|r| r.id)
      }
      None => None,
    };

    let now = Utc::now().naive_utc();
    let created = user::ActiveModel {
      id: NotSet,
      email: Set(email),
      username: Set(username.to_string()),
      password_hash: Set(password_hash.to_string()),
      is_verified: Set(false),
      is_admin: Set(false),
      tier_id: Set(0),
      payment_status: Set(PaymentStatus::Pending),
      wallet_network: Set(None),
      wallet_address: Set(None),
      locked_balance: Set(0),
      withdrawable_balance: Set(0),
      total_earnings: Set(0),
      total_withdrawal: Set(0),
      ad_views_today: Set(0),
      daily_earnings: Set(0),
      last_daily_reset: Set(None),
      referrer_id: Set(referrer_id),
      created_at: Set(now),
      updated_at: Set(now),
    }
    .insert(self.db)
    .await?;

    info!("user {} registered (#{})", created.username, created.id);
    Ok(created)
  }

  pub async fn by_id(&self, id: i64) -> Result<Option<user::Model>> {
    Ok(user::Entity::find_by_id(id).one(self.db).await?)
  }

  pub async fn by_username(
    &self,
    username: &str,
  ) -> Result<Option<user::Model>> {
    Ok(
      user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(self.db)
        .await?,
    )
  }

  pub async fn all(&self) -> Result<Vec<user::Model>> {
    Ok(
      user::Entity::find()
        .order_by_desc(user::Column::CreatedAt)
        .all(self.db)
        .await?,
    )
  }

  pub async fn set_referrer(
    &self,
    user_id: i64,
    referrer_id: i64,
  ) -> Result<()> {
    let user = user::Entity::find_by_id(user_id)
      .one(self.db)
      .await?
      .ok_or(Error::UserNotFound)?;

    if user.referrer_id.is_some() {
      return Err(Error::InvalidArgs("User already has a referrer".into()));
    }
    if user_id == referrer_id {
      return Err(Error::InvalidArgs("Cannot refer yourself".into()));
    }
    user::Entity::find_by_id(referrer_id)
      .one(self.db)
      .await?
      .ok_or(Error::UserNotFound)?;

    user::ActiveModel {
      referrer_id: Set(Some(referrer_id)),
      updated_at: Set(Utc::now().naive_utc()),
      ..user.into()
    }
    .update(self.db)
    .await?;

    Ok(())
  }

  /// Saved payout address used to prefill withdrawal requests.
  pub async fn set_wallet(
    &self,
    user_id: i64,
    network: &str,
    address: &str,
  ) -> Result<()> {
    if !withdrawal_sv::VALID_NETWORKS.contains(&network) {
      return Err(Error::InvalidArgs(
        "Invalid network. Use TRC20, BSC20, ERC20 or BTC".into(),
      ));
    }
    let address = address.trim();
    if address.len() < 10 {
      return Err(Error::InvalidArgs("Invalid wallet address format".into()));
    }

    let user = user::Entity::find_by_id(user_id)
      .one(self.db)
      .await?
      .ok_or(Error::UserNotFound)?;

    user::ActiveModel {
      wallet_network: Set(Some(network.to_string())),
      wallet_address: Set(Some(address.to_string())),
      updated_at: Set(Utc::now().naive_utc()),
      ..user.into()
    }
    .update(self.db)
    .await?;

    Ok(())
  }

  /// Removes the user together with every ledger row they own, then
  /// recomputes the global aggregates, all in one transaction.
  pub async fn delete(&self, user_id: i64) -> Result<DeletedUser> {
    let _guard = self.locks.acquire(user_id).await;
    retry::with_backoff(|| self.delete_once(user_id)).await
  }

  async fn delete_once(&self, user_id: i64) -> Result<DeletedUser> {
    let now = Utc::now().naive_utc();
    let txn = self.db.begin().await?;

    let user = user::Entity::find_by_id(user_id)
      .one(&txn)
      .await?
      .ok_or(Error::UserNotFound)?;

    let subscriptions: Option<Option<i64>> = revenue::Entity::find()
      .select_only()
      .column_as(Expr::col(revenue::Column::Amount).sum(), "total")
      .filter(revenue::Column::UserId.eq(user_id))
      .filter(revenue::Column::EntryType.eq(EntryType::Subscription))
      .into_tuple()
      .one(&txn)
      .await?;
    let revenue_removed = subscriptions.flatten().unwrap_or(0);

    let deleted = revenue::Entity::delete_many()
      .filter(revenue::Column::UserId.eq(user_id))
      .exec(&txn)
      .await?;

    deposit::Entity::delete_many()
      .filter(deposit::Column::UserId.eq(user_id))
      .exec(&txn)
      .await?;
    withdrawal::Entity::delete_many()
      .filter(withdrawal::Column::UserId.eq(user_id))
      .exec(&txn)
      .await?;

    // users referred by this account keep existing, unreferred
    user::Entity::update_many()
      .col_expr(user::Column::ReferrerId, Expr::value(None::<i64>))
      .filter(user::Column::ReferrerId.eq(user_id))
      .exec(&txn)
      .await?;

    user::Entity::delete_by_id(user_id).exec(&txn).await?;

    Stats::recompute_at(&txn, now).await?;
    txn.commit().await?;

    info!(
      "user {} (#{user_id}) deleted, {} ledger rows removed",
      user.username, deleted.rows_affected
    );

    Ok(DeletedUser {
      username: user.username,
      revenue_removed,
      transactions_deleted: deleted.rows_affected,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    entity::stats_cache, sv::test_utils::test_db, utils::MICRO_USDT,
  };

  #[tokio::test]
  async fn register_resolves_referrer_by_username() {
    let db = test_db::setup().await;
    let locks = UserLocks::new();
    let users = User::new(&db, &locks);

    let referrer = users
      .register("alice@example.com", "alice", "deadbeef", None)
      .await
      .unwrap();
    let referred = users
      .register("bob@example.com", "bob", "deadbeef", Some("alice"))
      .await
      .unwrap();

    assert_eq!(referred.referrer_id, Some(referrer.id));
    assert_eq!(referred.payment_status, PaymentStatus::Pending);
  }

  #[tokio::test]
  async fn register_ignores_unknown_referrer() {
    let db = test_db::setup().await;
    let locks = UserLocks::new();

    let user = User::new(&db, &locks)
      .register("bob@example.com", "bob", "deadbeef", Some("nobody"))
      .await
      .unwrap();
    assert_eq!(user.referrer_id, None);
  }

  #[tokio::test]
  async fn register_rejects_taken_username() {
    let db = test_db::setup().await;
    let locks = UserLocks::new();
    let users = User::new(&db, &locks);

    users.register("a@example.com", "alice", "deadbeef", None).await.unwrap();
    let result =
      users.register("b@example.com", "alice", "deadbeef", None).await;
    assert!(matches!(result, Err(Error::InvalidArgs(_))));
  }

  #[tokio::test]
  async fn set_referrer_rejects_self_referral() {
    let db = test_db::setup().await;
    test_db::user(1).insert(&db).await.unwrap();
    let locks = UserLocks::new();

    let result = User::new(&db, &locks).set_referrer(1, 1).await;
    assert!(matches!(result, Err(Error::InvalidArgs(_))));
  }

  #[tokio::test]
  async fn delete_purges_ledger_and_shrinks_revenue() {
    let db = test_db::setup().await;
    test_db::tier(1, 100 * MICRO_USDT).insert(&db).await.unwrap();
    test_db::user(1).insert(&db).await.unwrap();
    test_db::user(2).insert(&db).await.unwrap();
    let locks = UserLocks::new();

    let now = Utc::now().naive_utc();
    for (user_id, amount, entry_type) in [
      (1, 100 * MICRO_USDT, EntryType::Subscription),
      (2, 100 * MICRO_USDT, EntryType::Subscription),
      (1, -5 * MICRO_USDT, EntryType::ReferralPayout),
    ] {
      revenue::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        tier_id: Set(Some(1)),
        amount: Set(amount),
        entry_type: Set(entry_type),
        status: Set(crate::entity::EntryStatus::Completed),
        created_at: Set(now),
      }
      .insert(&db)
      .await
      .unwrap();
    }
    Stats::new(&db).recompute().await.unwrap();

    let deleted = User::new(&db, &locks).delete(1).await.unwrap();
    assert_eq!(deleted.revenue_removed, 100 * MICRO_USDT);
    assert_eq!(deleted.transactions_deleted, 2);

    assert!(user::Entity::find_by_id(1i64).one(&db).await.unwrap().is_none());
    let remaining = revenue::Entity::find().all(&db).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].user_id, 2);

    let cache = stats_cache::Entity::find().one(&db).await.unwrap().unwrap();
    assert_eq!(cache.total_revenue, 100 * MICRO_USDT);
    assert_eq!(cache.total_subscriptions, 1);
  }

  #[tokio::test]
  async fn delete_unlinks_referred_users() {
    let db = test_db::setup().await;
    test_db::user(1).insert(&db).await.unwrap();
    user::ActiveModel { referrer_id: Set(Some(1)), ..test_db::user(2) }
      .insert(&db)
      .await
      .unwrap();
    let locks = UserLocks::new();

    User::new(&db, &locks).delete(1).await.unwrap();

    let orphan =
      user::Entity::find_by_id(2i64).one(&db).await.unwrap().unwrap();
    assert_eq!(orphan.referrer_id, None);
  }

  #[tokio::test]
  async fn delete_missing_user_is_not_found() {
    let db = test_db::setup().await;
    let locks = UserLocks::new();

    let result = User::new(&db, &locks).delete(404).await;
    assert!(matches!(result, Err(Error::UserNotFound)));
  }
}
