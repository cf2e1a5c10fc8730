//! Sample dates and labels for the rate history chart.

use crate::core::error::{RateError, Result};
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_POINTS: usize = 52;
pub const MAX_STEP_DAYS: i64 = 366;

/// How many history samples to take and how far apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryWindow {
    #[serde(default = "default_points")]
    pub points: usize,
    #[serde(default = "default_step_days")]
    pub step_days: i64,
}

fn default_points() -> usize {
    5
}

fn default_step_days() -> i64 {
    7
}

impl Default for HistoryWindow {
    fn default() -> Self {
        HistoryWindow {
            points: default_points(),
            step_days: default_step_days(),
        }
    }
}

impl HistoryWindow {
    /// Rejects windows with no samples or steps outside `1..=MAX_STEP_DAYS`.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_POINTS).contains(&self.points) || !(1..=MAX_STEP_DAYS).contains(&self.step_days)
        {
            return Err(self.invalid());
        }
        Ok(())
    }

    fn invalid(&self) -> RateError {
        RateError::Unexpected(format!(
            "Invalid history window: {} points every {} days (expected 1-{MAX_POINTS} points, 1-{MAX_STEP_DAYS} days apart)",
            self.points, self.step_days
        ))
    }

    /// Dates stepping back from `today`, returned oldest first.
    pub fn sample_dates(&self, today: NaiveDate) -> Result<Vec<NaiveDate>> {
        self.validate()?;
        (0..self.points)
            .rev()
            .map(|i| {
                i64::try_from(i)
                    .ok()
                    .and_then(|i| self.step_days.checked_mul(i))
                    .and_then(TimeDelta::try_days)
                    .and_then(|back| today.checked_sub_signed(back))
                    .ok_or_else(|| self.invalid())
            })
            .collect()
    }
}

/// One plotted rate sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub label: String,
    pub rate: f64,
}

impl HistoryPoint {
    pub fn new(date: NaiveDate, rate: f64) -> Self {
        HistoryPoint {
            date,
            label: format_day_month(date),
            rate,
        }
    }
}

/// `"05 Mar"` style chart label.
pub fn format_day_month(date: NaiveDate) -> String {
    date.format("%d %b").to_string()
}

/// `"14:05 UTC"` style rate observation time.
pub fn format_rate_time(timestamp: DateTime<Utc>) -> String {
    format!("{} UTC", timestamp.format("%H:%M"))
}
