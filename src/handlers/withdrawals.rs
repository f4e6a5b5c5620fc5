use axum::{
  Json,
  extract::{Path, State},
};
use serde::Deserialize;

use crate::{prelude::*, state::AppState, sv, utils};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestWithdrawal {
  pub amount: f64,
  pub network: String,
  pub wallet_address: String,
}

pub async fn request(
  State(app): State<Arc<AppState>>,
  Path(user_id): Path<i64>,
  Json(req): Json<RequestWithdrawal>,
) -> Result<Json<json::Value>> {
  let withdrawal = sv::Withdrawal::new(&app.db, &app.locks)
    .request(
      user_id,
      utils::from_usdt(req.amount),
      &req.network,
      &req.wallet_address,
    )
    .await?;

  Ok(Json(json::json!({
    "message":
      "Withdrawal request submitted successfully! It will be processed within 24-48 hours.",
    "withdrawalId": withdrawal.id,
    "amount": utils::to_usdt(withdrawal.amount),
    "network": withdrawal.network,
    "status": withdrawal.status,
  })))
}

pub async fn history(
  State(app): State<Arc<AppState>>,
  Path(user_id): Path<i64>,
) -> Result<Json<json::Value>> {
  let rows =
    sv::Withdrawal::new(&app.db, &app.locks).history(user_id, 20).await?;

  let withdrawals: Vec<_> = rows
    .iter()
    .map(|w| {
      json::json!({
        "id": w.id,
        "amount": utils::to_usdt(w.amount),
        "network": w.network,
        "walletAddress": w.wallet_address,
        "status": w.status,
        "rejectionReason": w.rejection_reason,
        "createdAt": w.created_at,
        "updatedAt": w.updated_at,
      })
    })
    .collect();

  Ok(Json(json::json!({ "withdrawals": withdrawals })))
}

pub async fn summary(
  State(app): State<Arc<AppState>>,
  Path(user_id): Path<i64>,
) -> Result<Json<json::Value>> {
  let summary =
    sv::Withdrawal::new(&app.db, &app.locks).summary(user_id).await?;

  Ok(Json(json::json!({
    "totalWithdrawals": summary.total_requests,
    "pendingWithdrawals": summary.pending,
    "approvedWithdrawals": summary.approved,
    "rejectedWithdrawals": summary.rejected,
    "totalAmountRequested": utils::to_usdt(summary.total_requested),
    "totalAmountApproved": utils::to_usdt(summary.total_approved),
  })))
}
