use axum::{
  Json,
  extract::{Path, Query, Request, State},
  http::StatusCode,
  middleware::Next,
  response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{prelude::*, state::AppState, sv, sv::Decision, utils};

/// Shared-secret gate for the admin surface. Identity and session
/// handling live outside this service.
pub async fn require_admin_token(
  State(app): State<Arc<AppState>>,
  req: Request,
  next: Next,
) -> Response {
  let token =
    req.headers().get("x-admin-token").and_then(|value| value.to_str().ok());

  if token != Some(app.config.admin_token.as_str()) {
    return (
      StatusCode::UNAUTHORIZED,
      Json(json::json!({ "error": "Invalid admin token" })),
    )
      .into_response();
  }

  next.run(req).await
}

pub async fn users(
  State(app): State<Arc<AppState>>,
) -> Result<Json<json::Value>> {
  let users = sv::User::new(&app.db, &app.locks).all().await?;

  let users: Vec<_> = users
    .iter()
    .map(|u| {
      json::json!({
        "id": u.id,
        "username": u.username,
        "email": u.email,
        "tierId": u.tier_id,
        "paymentStatus": u.payment_status,
        "lockedBalance": utils::to_usdt(u.locked_balance),
        "withdrawableBalance": utils::to_usdt(u.withdrawable_balance),
        "totalEarnings": utils::to_usdt(u.total_earnings),
        "totalWithdrawal": utils::to_usdt(u.total_withdrawal),
        "createdAt": u.created_at,
      })
    })
    .collect();

  Ok(Json(json::json!(users)))
}

pub async fn delete_user(
  State(app): State<Arc<AppState>>,
  Path(user_id): Path<i64>,
) -> Result<Json<json::Value>> {
  let deleted = sv::User::new(&app.db, &app.locks).delete(user_id).await?;

  Ok(Json(json::json!({
    "message": format!("User {} deleted successfully", deleted.username),
    "revenueRemoved": utils::to_usdt(deleted.revenue_removed),
    "transactionsDeleted": deleted.transactions_deleted,
  })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscribe {
  pub tier_id: i32,
}

pub async fn subscribe(
  State(app): State<Arc<AppState>>,
  Path(user_id): Path<i64>,
  Json(req): Json<Subscribe>,
) -> Result<Json<json::Value>> {
  let amount =
    sv::Deposit::new(&app.db, &app.locks).grant(user_id, req.tier_id).await?;

  Ok(Json(json::json!({
    "message": format!("User subscribed to tier {} successfully", req.tier_id),
    "amount": utils::to_usdt(amount),
    "tier": req.tier_id,
  })))
}

pub async fn deposits(
  State(app): State<Arc<AppState>>,
) -> Result<Json<json::Value>> {
  let deposits = sv::Deposit::new(&app.db, &app.locks).all().await?;

  let deposits: Vec<_> = deposits
    .iter()
    .map(|d| {
      json::json!({
        "id": d.id,
        "userId": d.user_id,
        "tierId": d.tier_id,
        "amount": utils::to_usdt(d.amount),
        "network": d.network,
        "txRef": d.tx_ref,
        "status": d.status,
        "adminNotes": d.admin_notes,
        "approvedBy": d.approved_by,
        "approvedAt": d.approved_at,
        "createdAt": d.created_at,
      })
    })
    .collect();

  Ok(Json(json::json!(deposits)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideDeposit {
  pub status: Decision,
  pub admin_notes: Option<String>,
  pub admin_id: Option<i64>,
}

pub async fn decide_deposit(
  State(app): State<Arc<AppState>>,
  Path(deposit_id): Path<i64>,
  Json(req): Json<DecideDeposit>,
) -> Result<Json<json::Value>> {
  let outcome = sv::Deposit::new(&app.db, &app.locks)
    .decide(deposit_id, req.status, req.admin_notes, req.admin_id)
    .await?;

  let message = match req.status {
    Decision::Approved => {
      "Deposit approved successfully! User now has access to their tier."
    }
    Decision::Rejected => "Deposit rejected successfully.",
  };

  Ok(Json(json::json!({
    "success": true,
    "message": message,
    "depositId": outcome.id,
    "status": outcome.status,
    "amount": utils::to_usdt(outcome.amount),
    "commissionPaid": utils::to_usdt(outcome.commission_paid),
  })))
}

pub async fn withdrawals(
  State(app): State<Arc<AppState>>,
) -> Result<Json<json::Value>> {
  let withdrawals = sv::Withdrawal::new(&app.db, &app.locks).all().await?;

  let withdrawals: Vec<_> = withdrawals
    .iter()
    .map(|w| {
      json::json!({
        "id": w.id,
        "userId": w.user_id,
        "amount": utils::to_usdt(w.amount),
        "network": w.network,
        "walletAddress": w.wallet_address,
        "status": w.status,
        "rejectionReason": w.rejection_reason,
        "createdAt": w.created_at,
      })
    })
    .collect();

  Ok(Json(json::json!(withdrawals)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideWithdrawal {
  pub status: Decision,
  pub rejection_reason: Option<String>,
}

pub async fn decide_withdrawal(
  State(app): State<Arc<AppState>>,
  Path(withdrawal_id): Path<i64>,
  Json(req): Json<DecideWithdrawal>,
) -> Result<Json<json::Value>> {
  let outcome = sv::Withdrawal::new(&app.db, &app.locks)
    .decide(withdrawal_id, req.status, req.rejection_reason.clone())
    .await?;

  let message = match req.status {
    Decision::Approved => {
      "Withdrawal approved successfully! The user will receive their funds."
    }
    Decision::Rejected => {
      "Withdrawal rejected successfully! Funds returned to user's balance."
    }
  };

  Ok(Json(json::json!({
    "success": true,
    "message": message,
    "withdrawalId": outcome.id,
    "status": outcome.status,
    "amount": utils::to_usdt(outcome.amount),
    "rejectionReason": req.rejection_reason,
  })))
}

pub async fn stats(
  State(app): State<Arc<AppState>>,
) -> Result<Json<json::Value>> {
  let overview = sv::Stats::new(&app.db).overview().await?;

  Ok(Json(json::json!({
    "totalUsers": overview.total_users,
    "totalRevenue": utils::to_usdt(overview.total_revenue),
    "totalTierSubscriptions": overview.total_subscriptions,
    "pendingWithdrawals": {
      "count": overview.pending_withdrawals_count,
      "total": utils::to_usdt(overview.pending_withdrawals_total),
    },
    "pendingDeposits": {
      "count": overview.pending_deposits_count,
      "total": utils::to_usdt(overview.pending_deposits_total),
    },
    "lastUpdated": overview.last_updated,
  })))
}

#[derive(Deserialize)]
pub struct Paging {
  pub limit: Option<u64>,
}

pub async fn transactions(
  State(app): State<Arc<AppState>>,
  Query(paging): Query<Paging>,
) -> Result<Json<json::Value>> {
  let entries =
    sv::Stats::new(&app.db).recent(paging.limit.unwrap_or(20)).await?;

  let entries: Vec<_> = entries
    .iter()
    .map(|e| {
      json::json!({
        "id": e.id,
        "userId": e.user_id,
        "tierId": e.tier_id,
        "amount": utils::to_usdt(e.amount),
        "transactionType": e.entry_type,
        "status": e.status,
        "createdAt": e.created_at,
      })
    })
    .collect();

  Ok(Json(json::json!(entries)))
}

pub async fn revenue_breakdown(
  State(app): State<Arc<AppState>>,
) -> Result<Json<json::Value>> {
  let breakdown = sv::Stats::new(&app.db).breakdown().await?;

  let breakdown: Vec<_> = breakdown
    .iter()
    .map(|tier| {
      json::json!({
        "tierId": tier.tier_id,
        "price": utils::to_usdt(tier.price),
        "subscriptionCount": tier.subscriptions,
        "totalRevenue": utils::to_usdt(tier.revenue),
      })
    })
    .collect();

  Ok(Json(json::json!(breakdown)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishAnnouncement {
  pub title: String,
  pub content: String,
  pub admin_id: Option<i64>,
}

pub async fn publish_announcement(
  State(app): State<Arc<AppState>>,
  Json(req): Json<PublishAnnouncement>,
) -> Result<Json<json::Value>> {
  let announcement = sv::Announcement::new(&app.db)
    .publish(&req.title, &req.content, req.admin_id)
    .await?;

  Ok(Json(json::json!({
    "message":
      "Announcement published successfully! It will show to all users on their next login.",
    "announcement": announcement,
  })))
}

pub async fn announcements(
  State(app): State<Arc<AppState>>,
  Query(paging): Query<Paging>,
) -> Result<Json<json::Value>> {
  let history = sv::Announcement::new(&app.db)
    .history(paging.limit.unwrap_or(20))
    .await?;
  Ok(Json(json::json!(history)))
}
