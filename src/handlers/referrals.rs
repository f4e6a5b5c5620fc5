use axum::{
  Json,
  extract::{Path, State},
};

use crate::{prelude::*, state::AppState, sv, utils};

pub async fn summary(
  State(app): State<Arc<AppState>>,
  Path(user_id): Path<i64>,
) -> Result<Json<json::Value>> {
  let user = sv::User::new(&app.db, &app.locks)
    .by_id(user_id)
    .await?
    .ok_or(Error::UserNotFound)?;
  let summary = sv::Referral::new(&app.db).summary(user_id).await?;

  let referred: Vec<_> = summary
    .referred
    .iter()
    .map(|r| {
      json::json!({
        "id": r.id,
        "username": r.username,
        "tierId": r.tier_id,
        "paid": r.paid,
        "totalSpent": utils::to_usdt(r.total_spent),
        "referralEarnings": utils::to_usdt(r.commission_earned),
        "registeredAt": r.registered_at,
      })
    })
    .collect();

  Ok(Json(json::json!({
    "referralLink": format!("/signup?ref={}", user.username),
    "totalEarnings": utils::to_usdt(summary.total_earnings),
    "referralCount": summary.total_referrals,
    "successfulReferralCount": summary.successful_referrals,
    "pendingReferralCount": summary.pending_referrals,
    "referredUsers": referred,
  })))
}
