mod admin;
mod ads;
mod deposits;
mod referrals;
mod users;
mod withdrawals;

use axum::{
  Router, middleware,
  routing::{delete, get, patch, post, put},
};

use crate::{prelude::*, state::AppState};

async fn health() -> &'static str {
  "OK"
}

pub fn router(state: Arc<AppState>) -> Router {
  let admin = Router::new()
    .route("/users", get(admin::users))
    .route("/users/{id}", delete(admin::delete_user))
    .route("/users/{id}/subscribe", post(admin::subscribe))
    .route("/deposits", get(admin::deposits))
    .route("/deposits/{id}", patch(admin::decide_deposit))
    .route("/withdrawals", get(admin::withdrawals))
    .route("/withdrawals/{id}", patch(admin::decide_withdrawal))
    .route("/stats", get(admin::stats))
    .route("/transactions", get(admin::transactions))
    .route("/revenue-breakdown", get(admin::revenue_breakdown))
    .route(
      "/announcements",
      post(admin::publish_announcement).get(admin::announcements),
    )
    .layer(middleware::from_fn_with_state(
      state.clone(),
      admin::require_admin_token,
    ));

  Router::new()
    .route("/health", get(health))
    .route("/api/users", post(users::register))
    .route("/api/users/{id}/dashboard", get(users::dashboard))
    .route("/api/users/{id}/wallet", put(users::set_wallet))
    .route("/api/users/{id}/referrals", get(referrals::summary))
    .route("/api/users/{id}/ads/watch", post(ads::watch))
    .route("/api/users/{id}/ads/stats", get(ads::stats))
    .route("/api/users/{id}/deposits", get(deposits::history))
    .route(
      "/api/users/{id}/withdrawals",
      post(withdrawals::request).get(withdrawals::history),
    )
    .route("/api/users/{id}/withdrawals/summary", get(withdrawals::summary))
    .route("/api/payments/deposits", post(deposits::submit))
    .route("/api/announcements/active", get(users::active_announcement))
    .nest("/api/admin", admin)
    .with_state(state)
}
