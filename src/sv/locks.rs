use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::prelude::*;

/// Registry of per-user mutexes. Check-then-act ledger operations (ad
/// accrual, withdrawal reservation, admin decisions) hold the owning
/// user's lock for their whole read-modify-write so concurrent requests
/// for the same user cannot interleave.
#[derive(Default)]
pub struct UserLocks {
  locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl UserLocks {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn acquire(&self, user_id: i64) -> OwnedMutexGuard<()> {
    let lock = self
      .locks
      .entry(user_id)
      .or_insert_with(|| Arc::new(Mutex::new(())))
      .clone();
    lock.lock_owned().await
  }

  /// Locks several users in ascending id order so operations touching
  /// more than one user (deposit approval paying a referrer) cannot
  /// deadlock against each other.
  pub async fn acquire_many(
    &self,
    mut ids: Vec<i64>,
  ) -> Vec<OwnedMutexGuard<()>> {
    ids.sort_unstable();
    ids.dedup();

    let mut guards = Vec::with_capacity(ids.len());
    for id in ids {
      guards.push(self.acquire(id).await);
    }
    guards
  }
}
