use axum::{
  Json,
  extract::{Path, State},
};

use crate::{prelude::*, state::AppState, sv, utils};

pub async fn watch(
  State(app): State<Arc<AppState>>,
  Path(user_id): Path<i64>,
) -> Result<Json<json::Value>> {
  let result = sv::Ads::new(&app.db, &app.locks).watch(user_id).await?;

  Ok(Json(json::json!({
    "message": "Ad viewed successfully!",
    "reward": utils::to_usdt(result.reward),
    "clicksToday": result.clicks_today,
    "clicksRemaining": result.clicks_remaining,
    "dailyEarnings": utils::to_usdt(result.daily_earnings),
    "newBalance": utils::to_usdt(result.new_balance),
    "nextReset":
      format!("Resets in {}", utils::format_duration(result.next_reset)),
  })))
}

pub async fn stats(
  State(app): State<Arc<AppState>>,
  Path(user_id): Path<i64>,
) -> Result<Json<json::Value>> {
  let stats = sv::Ads::new(&app.db, &app.locks).stats(user_id).await?;
  Ok(Json(stats_json(&stats)))
}

pub(super) fn stats_json(stats: &sv::ads::AdStats) -> json::Value {
  json::json!({
    "clicksToday": stats.clicks_today,
    "clicksRemaining": stats.clicks_remaining,
    "dailyEarnings": utils::to_usdt(stats.daily_earnings),
    "currentBalance": utils::to_usdt(stats.current_balance),
    "earningsPerClick": utils::to_usdt(stats.earnings_per_click),
    "projectedDailyEarnings":
      utils::to_usdt(stats.projected_daily_earnings),
    "projectedBalance": utils::to_usdt(stats.projected_balance),
    "lastResetDate": stats.last_reset,
    "nextReset":
      format!("Resets in {}", utils::format_duration(stats.next_reset)),
  })
}
