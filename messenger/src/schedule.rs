use chrono::{NaiveTime, TimeZone};
use votecap_api::{ALLOW_NEW_ACTIVE_PERCENTAGE, ALLOW_NEW_ACTIVE_SECONDS};

use crate::error::{ScheduleError, StoreError};
use crate::store::StateStore;

/// Outcome of an activation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub active: bool,
    /// Seconds until the next regular window; 0 before the first activation,
    /// negative once a window is overdue.
    pub seconds_till_activation: i64,
}

impl Activation {
    pub fn next_activation_at(&self, now: i64) -> i64 {
        now + self.seconds_till_activation
    }
}

/// The recurring messaging window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationClock {
    interval_secs: i64,
}

impl ActivationClock {
    pub fn new(interval_secs: u64) -> Self {
        Self {
            interval_secs: i64::try_from(interval_secs).unwrap_or(i64::MAX),
        }
    }

    /// Decides whether the window is open at `now`.
    ///
    /// Opening the window moves the stored activation timestamp to `now`
    /// immediately, before any voter is considered, so a second check in the
    /// same second reports the window closed.
    pub fn check(&self, store: &mut StateStore, now: i64) -> Result<Activation, StoreError> {
        let last_activation = store.last_activation_timestamp();
        let active = last_activation == 0 || now - last_activation > self.interval_secs;
        let seconds_till_activation = if last_activation == 0 {
            0
        } else {
            self.interval_secs - (now - last_activation)
        };

        if active {
            log::debug!("Messaging window open at {now}");
            store.set_last_activation_timestamp(now)?;
        }

        Ok(Activation {
            active,
            seconds_till_activation,
        })
    }

    /// Whether never-seen voters may be messaged outside the window.
    ///
    /// Held back once the next window is within 5% of the interval and
    /// within two hours.
    pub fn is_new_active(&self, seconds_till_activation: i64) -> bool {
        seconds_till_activation as f64 / self.interval_secs as f64 > ALLOW_NEW_ACTIVE_PERCENTAGE
            || seconds_till_activation > ALLOW_NEW_ACTIVE_SECONDS
    }

    /// Activation timestamp that places the window at `time` of day.
    ///
    /// The date is taken from the previous activation, or from one interval
    /// ago when there was none.
    pub fn override_timestamp<Tz: TimeZone>(
        &self,
        tz: &Tz,
        now: i64,
        last_activation: i64,
        time: NaiveTime,
    ) -> Result<i64, ScheduleError> {
        let base = if last_activation == 0 {
            now - self.interval_secs
        } else {
            last_activation
        };

        let date = tz
            .timestamp_opt(base, 0)
            .earliest()
            .ok_or(ScheduleError::TimestampOutOfRange(base))?
            .date_naive();

        tz.from_local_datetime(&date.and_time(time))
            .earliest()
            .map(|dt| dt.timestamp())
            .ok_or_else(|| ScheduleError::UnresolvableTime(time.to_string(), date.to_string()))
    }

    /// Applies [`Self::override_timestamp`] to the store and returns the new value.
    pub fn set_activation_time<Tz: TimeZone>(
        &self,
        store: &mut StateStore,
        tz: &Tz,
        now: i64,
        time: NaiveTime,
    ) -> Result<i64, ScheduleError> {
        let timestamp = self.override_timestamp(tz, now, store.last_activation_timestamp(), time)?;
        store.set_last_activation_timestamp(timestamp)?;
        Ok(timestamp)
    }
}
