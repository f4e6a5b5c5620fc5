use chrono::{DateTime, Days, TimeZone, Utc};
use chrono_tz::Europe::London;

use crate::prelude::{Date, TimeDelta};

/// 1 USDT = 1,000,000 microUSDT (USDT uses 6 decimal places)
pub const MICRO_USDT: i64 = 1_000_000;

pub fn to_usdt(micro: i64) -> f64 {
  micro as f64 / MICRO_USDT as f64
}

pub fn from_usdt(usdt: f64) -> i64 {
  (usdt * MICRO_USDT as f64).round() as i64
}

/// Civil date in London; the ad-reward day rolls over at London midnight.
pub fn london_today(now: DateTime<Utc>) -> Date {
  now.with_timezone(&London).date_naive()
}

/// Time remaining until the next London midnight.
pub fn until_next_reset(now: DateTime<Utc>) -> TimeDelta {
  let midnight = london_today(now)
    .checked_add_days(Days::new(1))
    .and_then(|date| date.and_hms_opt(0, 0, 0))
    .and_then(|naive| London.from_local_datetime(&naive).earliest());

  match midnight {
    Some(midnight) => midnight.with_timezone(&Utc) - now,
    None => TimeDelta::zero(),
  }
}

pub fn format_duration(duration: TimeDelta) -> String {
  format!("{}h {}m", duration.num_hours(), duration.num_minutes() % 60)
}
