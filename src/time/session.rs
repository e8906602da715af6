/// Market session and timing utilities
use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, Utc};
use chrono_tz::Asia::Kolkata;

/// Check if the date is a trading day (weekdays only, exchange holidays are not tracked)
pub fn is_trading_day(date: DateTime<Utc>) -> bool {
    let date_ist = date.with_timezone(&Kolkata);

    // Monday = 0, Saturday = 5, Sunday = 6
    date_ist.weekday().num_days_from_monday() < 5
}

/// Check if the cash market is open: 9:15 AM to 3:30 PM IST on a trading day
pub fn is_market_open(now: DateTime<Utc>) -> bool {
    if !is_trading_day(now) {
        return false;
    }

    let current_time = now.with_timezone(&Kolkata).time();
    let (market_open, market_close) = market_hours();

    current_time >= market_open && current_time < market_close
}

fn market_hours() -> (NaiveTime, NaiveTime) {
    (
        NaiveTime::from_hms_opt(9, 15, 0).unwrap_or_default(),
        NaiveTime::from_hms_opt(15, 30, 0).unwrap_or_default(),
    )
}

/// Current time in IST as a fixed-offset timestamp (serializes as RFC 3339)
pub fn now_ist(now: DateTime<Utc>) -> DateTime<FixedOffset> {
    now.with_timezone(&Kolkata).fixed_offset()
}
