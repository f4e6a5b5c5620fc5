use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("user not found")]
  UserNotFound,
  #[error("tier not found")]
  TierNotFound,
  #[error("deposit not found")]
  DepositNotFound,
  #[error("withdrawal not found")]
  WithdrawalNotFound,
  #[error("request has already been processed")]
  AlreadyProcessed,
  #[error("insufficient withdrawable balance")]
  InsufficientBalance,
  #[error("daily ad limit reached (resets at 00:00 London time)")]
  DailyLimitReached,
  #[error("transaction reference already exists")]
  DuplicateTxRef,
  #[error("{0}")]
  InvalidArgs(String),
  #[error(transparent)]
  Db(#[from] sea_orm::DbErr),
}

impl Error {
  fn status(&self) -> StatusCode {
    match self {
      Self::UserNotFound
      | Self::TierNotFound
      | Self::DepositNotFound
      | Self::WithdrawalNotFound => StatusCode::NOT_FOUND,
      Self::AlreadyProcessed => StatusCode::CONFLICT,
      Self::InsufficientBalance
      | Self::DailyLimitReached
      | Self::DuplicateTxRef
      | Self::InvalidArgs(_) => StatusCode::BAD_REQUEST,
      Self::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    if let Self::Db(err) = &self {
      tracing::error!("storage error: {err}");
    }

    let status = self.status();
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
      "Internal server error".to_string()
    } else {
      self.to_string()
    };

    (status, Json(json::json!({ "error": message }))).into_response()
  }
}
