use std::future::Future;

use sea_orm::DbErr;

use crate::prelude::*;

const MAX_ATTEMPTS: u32 = 3;
const BASE_DELAY: Duration = Duration::from_millis(100);

fn is_transient(err: &DbErr) -> bool {
  let message = err.to_string();
  message.contains("database is locked")
    || message.contains("database is busy")
}

/// Re-runs `op` on transient SQLite contention, with linear backoff,
/// before surfacing the storage error. Non-storage failures and
/// permanent storage errors pass through on the first attempt.
pub async fn with_backoff<T, F, Fut>(mut op: F) -> Result<T>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T>>,
{
  let mut attempt = 1;
  loop {
    match op().await {
      Err(Error::Db(err)) if attempt < MAX_ATTEMPTS && is_transient(&err) => {
        warn!("storage contention (attempt {attempt}/{MAX_ATTEMPTS}): {err}");
        tokio::time::sleep(BASE_DELAY * attempt).await;
        attempt += 1;
      }
      result => return result,
    }
  }
}
