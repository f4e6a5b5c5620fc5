use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::{prelude::*, state::AppState, sv, utils};

use super::ads;

#[derive(Deserialize)]
pub struct Register {
  pub email: String,
  pub username: String,
  pub password: String,
  #[serde(rename = "ref")]
  pub referred_by: Option<String>,
}

pub async fn register(
  State(app): State<Arc<AppState>>,
  Json(req): Json<Register>,
) -> Result<(StatusCode, Json<json::Value>)> {
  if req.password.len() < 8 {
    return Err(Error::InvalidArgs(
      "Password must be at least 8 characters".into(),
    ));
  }
  let digest = hex::encode(Sha256::digest(req.password.as_bytes()));

  let user = sv::User::new(&app.db, &app.locks)
    .register(&req.email, &req.username, &digest, req.referred_by.as_deref())
    .await?;

  Ok((
    StatusCode::CREATED,
    Json(json::json!({
      "id": user.id,
      "username": user.username,
      "email": user.email,
      "referralLink": format!("/signup?ref={}", user.username),
    })),
  ))
}

pub async fn dashboard(
  State(app): State<Arc<AppState>>,
  Path(user_id): Path<i64>,
) -> Result<Json<json::Value>> {
  let user = sv::User::new(&app.db, &app.locks)
    .by_id(user_id)
    .await?
    .ok_or(Error::UserNotFound)?;
  let ad_stats = sv::Ads::new(&app.db, &app.locks).stats(user_id).await?;

  Ok(Json(json::json!({
    "user": {
      "id": user.id,
      "username": user.username,
      "email": user.email,
      "tierId": user.tier_id,
      "paymentStatus": user.payment_status,
      "lockedBalance": utils::to_usdt(user.locked_balance),
      "withdrawableBalance": utils::to_usdt(user.withdrawable_balance),
      "totalEarnings": utils::to_usdt(user.total_earnings),
      "totalWithdrawal": utils::to_usdt(user.total_withdrawal),
      "walletNetwork": user.wallet_network,
      "walletAddress": user.wallet_address,
    },
    "ads": ads::stats_json(&ad_stats),
  })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetWallet {
  pub network: String,
  pub wallet_address: String,
}

pub async fn set_wallet(
  State(app): State<Arc<AppState>>,
  Path(user_id): Path<i64>,
  Json(req): Json<SetWallet>,
) -> Result<Json<json::Value>> {
  sv::User::new(&app.db, &app.locks)
    .set_wallet(user_id, &req.network, &req.wallet_address)
    .await?;

  Ok(Json(json::json!({
    "message": "Withdrawal address updated successfully",
    "walletAddress": req.wallet_address.trim(),
    "network": req.network,
  })))
}

pub async fn active_announcement(
  State(app): State<Arc<AppState>>,
) -> Result<Json<json::Value>> {
  let announcement = sv::Announcement::new(&app.db).active().await?;
  Ok(Json(json::json!({ "announcement": announcement })))
}
