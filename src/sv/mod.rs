pub mod ads;
pub mod announcement;
pub mod deposit;
pub mod locks;
pub mod referral;
pub mod retry;
pub mod stats;
#[cfg(test)]
pub mod test_utils;
pub mod user;
pub mod withdrawal;

pub use ads::Ads;
pub use announcement::Announcement;
pub use deposit::Deposit;
pub use locks::UserLocks;
pub use referral::Referral;
pub use stats::Stats;
pub use user::User;
pub use withdrawal::Withdrawal;

use serde::Deserialize;

/// Admin verdict on a pending deposit or withdrawal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
  Approved,
  Rejected,
}
