//! Fixed-offset session calendar.
//!
//! Sessions open at a fixed local time in an exchange timezone given as a UTC
//! offset. A session is labelled by the local date on which it opens.

use crate::config::SessionConfig;
use crate::{AnchorPeriod, Error, Result, SessionCalendar, TimestampMs};
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Offset, Utc};

/// Session calendar for an exchange with a constant UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct FixedOffsetCalendar {
    offset: FixedOffset,
    session_open_minutes: u32,
}

impl FixedOffsetCalendar {
    /// UTC calendar with sessions opening at midnight.
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
            session_open_minutes: 0,
        }
    }

    /// Create a calendar from an offset (minutes east of UTC) and session open time.
    pub fn new(utc_offset_minutes: i32, session_open_minutes: u32) -> Result<Self> {
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60).ok_or_else(|| {
            Error::config(format!("invalid UTC offset: {utc_offset_minutes} minutes"))
        })?;
        if session_open_minutes >= 24 * 60 {
            return Err(Error::config(format!(
                "session open must be within the day, got {session_open_minutes} minutes"
            )));
        }
        Ok(Self {
            offset,
            session_open_minutes,
        })
    }

    /// Create a calendar from session configuration.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        Self::new(config.utc_offset_minutes, config.session_open_minutes)
    }

    fn local(&self, ts_ms: TimestampMs) -> DateTime<FixedOffset> {
        DateTime::<Utc>::from_timestamp_millis(ts_ms)
            .unwrap_or_default()
            .with_timezone(&self.offset)
    }

    /// Local date of the session containing `ts_ms`.
    pub fn session_date(&self, ts_ms: TimestampMs) -> NaiveDate {
        let shifted = self.local(ts_ms) - Duration::minutes(i64::from(self.session_open_minutes));
        shifted.date_naive()
    }
}

impl Default for FixedOffsetCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl SessionCalendar for FixedOffsetCalendar {
    fn session_start(&self, ts_ms: TimestampMs) -> TimestampMs {
        let date = self.session_date(ts_ms);
        let midnight_local_ms = date
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc().timestamp_millis())
            .unwrap_or(ts_ms);
        midnight_local_ms - i64::from(self.offset.local_minus_utc()) * 1_000
            + i64::from(self.session_open_minutes) * 60_000
    }

    fn anchor_key(&self, ts_ms: TimestampMs, period: AnchorPeriod) -> i64 {
        match period {
            AnchorPeriod::None => 0,
            AnchorPeriod::Session => i64::from(self.session_date(ts_ms).num_days_from_ce()),
            AnchorPeriod::Day => i64::from(self.local(ts_ms).date_naive().num_days_from_ce()),
            AnchorPeriod::Week => {
                let date = self.session_date(ts_ms);
                let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
                i64::from(monday.num_days_from_ce())
            }
            AnchorPeriod::Month => {
                let date = self.session_date(ts_ms);
                i64::from(date.year()) * 12 + i64::from(date.month0())
            }
        }
    }
}
