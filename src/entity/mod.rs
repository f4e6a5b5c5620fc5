pub mod announcement;
pub mod deposit;
pub mod revenue;
pub mod stats_cache;
pub mod tier;
pub mod user;
pub mod withdrawal;

pub use deposit::DepositStatus;
pub use revenue::{EntryStatus, EntryType};
pub use user::PaymentStatus;
pub use withdrawal::WithdrawalStatus;
