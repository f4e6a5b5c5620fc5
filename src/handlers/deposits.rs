use axum::{
  Json,
  extract::{Path, State},
};
use serde::Deserialize;

use crate::{prelude::*, state::AppState, sv, utils};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitDeposit {
  pub user_id: i64,
  pub tier_id: i32,
  /// Claimed transfer amount in USDT; must match the tier price
  pub amount: f64,
  pub network: String,
  pub tx_ref: String,
}

pub async fn submit(
  State(app): State<Arc<AppState>>,
  Json(req): Json<SubmitDeposit>,
) -> Result<Json<json::Value>> {
  let deposit = sv::Deposit::new(&app.db, &app.locks)
    .submit(
      req.user_id,
      req.tier_id,
      utils::from_usdt(req.amount),
      &req.network,
      &req.tx_ref,
    )
    .await?;

  Ok(Json(json::json!({
    "message": "Deposit submitted successfully! Admin will review within 24 hours.",
    "depositId": deposit.id,
    "status": deposit.status,
  })))
}

pub async fn history(
  State(app): State<Arc<AppState>>,
  Path(user_id): Path<i64>,
) -> Result<Json<json::Value>> {
  let deposits =
    sv::Deposit::new(&app.db, &app.locks).history(user_id).await?;

  let deposits: Vec<_> = deposits
    .iter()
    .map(|d| {
      json::json!({
        "id": d.id,
        "tierId": d.tier_id,
        "amount": utils::to_usdt(d.amount),
        "network": d.network,
        "txRef": d.tx_ref,
        "status": d.status,
        "adminNotes": d.admin_notes,
        "createdAt": d.created_at,
      })
    })
    .collect();

  Ok(Json(json::json!({ "deposits": deposits })))
}
