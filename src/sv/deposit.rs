use sea_orm::sea_query::Expr;

use crate::{
  entity::{
    DepositStatus, EntryStatus, EntryType, PaymentStatus, deposit, revenue,
    tier, user,
  },
  prelude::*,
  sv::{Decision, Referral, Stats, locks::UserLocks, retry},
  utils,
};

pub const VALID_NETWORKS: [&str; 3] = ["TRC20", "BEP20", "ERC20"];
const MIN_TX_REF_LEN: usize = 20;

pub struct Deposit<'a> {
  db: &'a DatabaseConnection,
  locks: &'a UserLocks,
}

#[derive(Debug, Clone)]
pub struct DepositOutcome {
  pub id: i64,
  pub status: DepositStatus,
  pub amount: i64,
  pub commission_paid: i64,
}

impl<'a> Deposit<'a> {
  pub fn new(db: &'a DatabaseConnection, locks: &'a UserLocks) -> Self {
    Self { db, locks }
  }

  /// Records a claimed off-chain transfer awaiting admin confirmation.
  pub async fn submit(
    &self,
    user_id: i64,
    tier_id: i32,
    amount: i64,
    network: &str,
    tx_ref: &str,
  ) -> Result<deposit::Model> {
    if !VALID_NETWORKS.contains(&network) {
      return Err(Error::InvalidArgs(
        "Invalid network. Use TRC20, BEP20 or ERC20".into(),
      ));
    }

    let tx_ref = tx_ref.trim();
    if tx_ref.len() < MIN_TX_REF_LEN {
      return Err(Error::InvalidArgs(
        "Invalid transaction reference format".into(),
      ));
    }

    let user = user::Entity::find_by_id(user_id)
      .one(self.db)
      .await?
      .ok_or(Error::UserNotFound)?;
    let tier = tier::Entity::find_by_id(tier_id)
      .one(self.db)
      .await?
      .ok_or(Error::TierNotFound)?;

    if amount != tier.price {
      return Err(Error::InvalidArgs(format!(
        "Amount mismatch. Expected {}, received {}",
        utils::to_usdt(tier.price),
        utils::to_usdt(amount)
      )));
    }

    if user.tier_id == tier_id && user.payment_status == PaymentStatus::Paid {
      return Err(Error::InvalidArgs("You already own this tier".into()));
    }

    let duplicate = deposit::Entity::find()
      .filter(deposit::Column::TxRef.eq(tx_ref))
      .one(self.db)
      .await?;
    if duplicate.is_some() {
      return Err(Error::DuplicateTxRef);
    }

    let now = Utc::now().naive_utc();
    let deposit = deposit::ActiveModel {
      id: NotSet,
      user_id: Set(user_id),
      tier_id: Set(tier_id),
      amount: Set(amount),
      network: Set(network.to_string()),
      tx_ref: Set(tx_ref.to_string()),
      status: Set(DepositStatus::Pending),
      admin_notes: Set(None),
      approved_by: Set(None),
      approved_at: Set(None),
      created_at: Set(now),
      updated_at: Set(now),
    }
    .insert(self.db)
    .await?;

    info!(
      "deposit #{} submitted by user {user_id} for tier {tier_id}",
      deposit.id
    );
    Ok(deposit)
  }

  /// Applies an admin verdict to a pending deposit. Approval grants the
  /// tier, records the subscription in the ledger and cascades the
  /// referral commission; everything commits atomically or not at all.
  pub async fn decide(
    &self,
    deposit_id: i64,
    decision: Decision,
    notes: Option<String>,
    admin_id: Option<i64>,
  ) -> Result<DepositOutcome> {
    let deposit = deposit::Entity::find_by_id(deposit_id)
      .one(self.db)
      .await?
      .ok_or(Error::DepositNotFound)?;
    if deposit.status != DepositStatus::Pending {
      return Err(Error::AlreadyProcessed);
    }

    let user = user::Entity::find_by_id(deposit.user_id)
      .one(self.db)
      .await?
      .ok_or(Error::UserNotFound)?;

    let mut ids = vec![deposit.user_id];
    if let Some(referrer_id) = user.referrer_id {
      ids.push(referrer_id);
    }
    let _guards = self.locks.acquire_many(ids).await;

    retry::with_backoff(|| {
      self.decide_once(&deposit, decision, notes.clone(), admin_id)
    })
    .await
  }

  async fn decide_once(
    &self,
    deposit: &deposit::Model,
    decision: Decision,
    notes: Option<String>,
    admin_id: Option<i64>,
  ) -> Result<DepositOutcome> {
    let now = Utc::now().naive_utc();

    let status = match decision {
      Decision::Approved => DepositStatus::Approved,
      Decision::Rejected => DepositStatus::Rejected,
    };
    let notes = notes.unwrap_or_else(|| {
      match decision {
        Decision::Approved => "Approved by admin",
        Decision::Rejected => "Rejected by admin",
      }
      .to_string()
    });

    let txn = self.db.begin().await?;

    // Terminal transition guard: only a pending row may be decided, and
    // only once.
    let updated = deposit::Entity::update_many()
      .col_expr(deposit::Column::Status, Expr::value(status))
      .col_expr(deposit::Column::AdminNotes, Expr::value(notes))
      .col_expr(deposit::Column::ApprovedBy, Expr::value(admin_id))
      .col_expr(deposit::Column::ApprovedAt, Expr::value(now))
      .col_expr(deposit::Column::UpdatedAt, Expr::value(now))
      .filter(deposit::Column::Id.eq(deposit.id))
      .filter(deposit::Column::Status.eq(DepositStatus::Pending))
      .exec(&txn)
      .await?;
    if updated.rows_affected == 0 {
      return Err(Error::AlreadyProcessed);
    }

    let mut commission_paid = 0;

    if decision == Decision::Approved {
      let user = user::Entity::find_by_id(deposit.user_id)
        .one(&txn)
        .await?
        .ok_or(Error::UserNotFound)?;
      let referrer_id = user.referrer_id;

      // Principal reflects the current tier only, not a running sum
      user::ActiveModel {
        tier_id: Set(deposit.tier_id),
        payment_status: Set(PaymentStatus::Paid),
        locked_balance: Set(deposit.amount),
        updated_at: Set(now),
        ..user.into()
      }
      .update(&txn)
      .await?;

      revenue::ActiveModel {
        id: NotSet,
        user_id: Set(deposit.user_id),
        tier_id: Set(Some(deposit.tier_id)),
        amount: Set(deposit.amount),
        entry_type: Set(EntryType::Subscription),
        status: Set(EntryStatus::Completed),
        created_at: Set(now),
      }
      .insert(&txn)
      .await?;

      if let Some(referrer_id) = referrer_id {
        commission_paid = Referral::pay_commission(
          &txn,
          referrer_id,
          deposit.tier_id,
          deposit.amount,
          now,
        )
        .await?;
      }
    }

    Stats::recompute_at(&txn, now).await?;
    txn.commit().await?;

    info!("deposit #{} {:?} by admin {:?}", deposit.id, status, admin_id);

    Ok(DepositOutcome {
      id: deposit.id,
      status,
      amount: deposit.amount,
      commission_paid,
    })
  }

  /// Admin-granted subscription at the tier's listed price. Skips the
  /// referral cascade: nothing was deposited.
  pub async fn grant(&self, user_id: i64, tier_id: i32) -> Result<i64> {
    let tier = tier::Entity::find_by_id(tier_id)
      .one(self.db)
      .await?
      .ok_or(Error::TierNotFound)?;

    let _guard = self.locks.acquire(user_id).await;
    retry::with_backoff(|| self.grant_once(user_id, &tier)).await
  }

  async fn grant_once(&self, user_id: i64, tier: &tier::Model) -> Result<i64> {
    let now = Utc::now().naive_utc();
    let txn = self.db.begin().await?;

    let user = user::Entity::find_by_id(user_id)
      .one(&txn)
      .await?
      .ok_or(Error::UserNotFound)?;

    user::ActiveModel {
      tier_id: Set(tier.id),
      payment_status: Set(PaymentStatus::Paid),
      locked_balance: Set(tier.price),
      updated_at: Set(now),
      ..user.into()
    }
    .update(&txn)
    .await?;

    revenue::ActiveModel {
      id: NotSet,
      user_id: Set(user_id),
      tier_id: Set(Some(tier.id)),
      amount: Set(tier.price),
      entry_type: Set(EntryType::Subscription),
      status: Set(EntryStatus::Completed),
      created_at: Set(now),
    }
    .insert(&txn)
    .await?;

    Stats::recompute_at(&txn, now).await?;
    txn.commit().await?;

    info!("user {user_id} subscribed to tier {} by admin", tier.id);
    Ok(tier.price)
  }

  pub async fn history(&self, user_id: i64) -> Result<Vec<deposit::Model>> {
    Ok(
      deposit::Entity::find()
        .filter(deposit::Column::UserId.eq(user_id))
        .order_by_desc(deposit::Column::CreatedAt)
        .all(self.db)
        .await?,
    )
  }

  pub async fn all(&self) -> Result<Vec<deposit::Model>> {
    Ok(
      deposit::Entity::find()
        .order_by_desc(deposit::Column::CreatedAt)
        .all(self.db)
        .await?,
    )
  }
}
