//! Days-late arithmetic, severity tiers and the overdue list filter.
//!
//! Tiers and filters use two different scales. Tiers escalate at 7 and 30
//! days; the list filter offers 3, 7 and 30. Keep them separate.
//!
//! Nothing here reads the clock: callers pass the reference "now".

use crate::error::{LendingError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::{trace, warn};
use std::fmt;

/// Days late at which an installment becomes [`DelinquencyTier::Warning`].
pub const WARNING_DAYS: u32 = 7;
/// Days late at which an installment becomes [`DelinquencyTier::Critical`].
pub const CRITICAL_DAYS: u32 = 30;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum DelinquencyTier {
    Current,
    Warning,
    Critical,
}

impl fmt::Display for DelinquencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DelinquencyTier::Current => "CURRENT",
            DelinquencyTier::Warning => "WARNING",
            DelinquencyTier::Critical => "CRITICAL",
        };
        write!(f, "{}", name)
    }
}

/// Choices of the overdue list filter control.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LateFilter {
    #[default]
    All,
    Over3Days,
    Over7Days,
    Over30Days,
}

impl LateFilter {
    pub const ALL: [LateFilter; 4] = [
        LateFilter::All,
        LateFilter::Over3Days,
        LateFilter::Over7Days,
        LateFilter::Over30Days,
    ];

    /// Minimum days late an installment needs to pass; 0 passes everything.
    pub fn threshold(&self) -> u32 {
        match self {
            LateFilter::All => 0,
            LateFilter::Over3Days => 3,
            LateFilter::Over7Days => 7,
            LateFilter::Over30Days => 30,
        }
    }

    pub fn from_threshold(threshold: u32) -> Result<Self> {
        match threshold {
            0 => Ok(LateFilter::All),
            3 => Ok(LateFilter::Over3Days),
            7 => Ok(LateFilter::Over7Days),
            30 => Ok(LateFilter::Over30Days),
            _ => {
                warn!("rejected filter threshold {}", threshold);
                Err(LendingError::InvalidInput(format!(
                    "filter threshold must be 0, 3, 7 or 30, got {}",
                    threshold
                )))
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LateFilter::All => "TODOS",
            LateFilter::Over3Days => "+3 DIAS",
            LateFilter::Over7Days => "+7 DIAS",
            LateFilter::Over30Days => "+30 DIAS",
        }
    }
}

impl fmt::Display for LateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// An installment's due date paired with the moment it is being looked at.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstallmentDueInfo {
    pub due_date: NaiveDate,
    pub reference_now: NaiveDateTime,
}

impl InstallmentDueInfo {
    pub fn new(due_date: NaiveDate, reference_now: NaiveDateTime) -> Self {
        Self {
            due_date,
            reference_now,
        }
    }

    pub fn days_late(&self) -> u32 {
        days_late(self.due_date, self.reference_now)
    }

    pub fn tier(&self) -> DelinquencyTier {
        classify(self.days_late())
    }

    pub fn matches(&self, filter: LateFilter) -> bool {
        matches_filter(self.days_late(), filter)
    }
}

/// Whole days from the start of `due_date` until `now`, truncated toward zero.
/// Due dates in the future give 0.
pub fn days_late(due_date: NaiveDate, now: NaiveDateTime) -> u32 {
    let elapsed = now
        .signed_duration_since(due_date.and_time(NaiveTime::MIN))
        .num_days();
    trace!("due {} seen at {}: {} days elapsed", due_date, now, elapsed);
    if elapsed <= 0 {
        0
    } else {
        u32::try_from(elapsed).unwrap_or(u32::MAX)
    }
}

pub fn classify(days_late: u32) -> DelinquencyTier {
    if days_late >= CRITICAL_DAYS {
        DelinquencyTier::Critical
    } else if days_late >= WARNING_DAYS {
        DelinquencyTier::Warning
    } else {
        DelinquencyTier::Current
    }
}

pub fn matches_filter(days_late: u32, filter: LateFilter) -> bool {
    filter == LateFilter::All || days_late >= filter.threshold()
}

/// Keeps the items whose due date passes `filter` at `now`, most overdue first.
/// Items equally late keep their input order.
pub fn filter_overdue<'a, T, F>(
    items: &'a [T],
    due_date: F,
    filter: LateFilter,
    now: NaiveDateTime,
) -> Vec<&'a T>
where
    F: Fn(&T) -> NaiveDate,
{
    let mut kept: Vec<(u32, &T)> = items
        .iter()
        .map(|item| (days_late(due_date(item), now), item))
        .filter(|(late, _)| matches_filter(*late, filter))
        .collect();
    kept.sort_by(|a, b| b.0.cmp(&a.0));
    kept.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_days_late() {
        let now = at(2024, 3, 15, 10, 30);
        assert_eq!(days_late(date(2024, 3, 15), now), 0);
        assert_eq!(days_late(date(2024, 3, 14), now), 1);
        assert_eq!(days_late(date(2024, 3, 8), now), 7);
        assert_eq!(days_late(date(2024, 2, 14), now), 30);
        assert_eq!(days_late(date(2023, 3, 15), now), 366);
    }

    #[test]
    fn test_days_late_truncates() {
        // 23h59m past the start of the due date is still day zero
        assert_eq!(days_late(date(2024, 3, 15), at(2024, 3, 15, 23, 59)), 0);
        assert_eq!(days_late(date(2024, 3, 14), at(2024, 3, 15, 0, 0)), 1);
        assert_eq!(days_late(date(2024, 3, 14), at(2024, 3, 15, 23, 59)), 1);
    }

    #[test]
    fn test_future_due_date_clamps() {
        let now = at(2024, 3, 15, 12, 0);
        assert_eq!(days_late(date(2024, 3, 16), now), 0);
        assert_eq!(days_late(date(2030, 1, 1), now), 0);
        assert_eq!(classify(days_late(date(2030, 1, 1), now)), DelinquencyTier::Current);
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(0), DelinquencyTier::Current);
        assert_eq!(classify(6), DelinquencyTier::Current);
        assert_eq!(classify(7), DelinquencyTier::Warning);
        assert_eq!(classify(29), DelinquencyTier::Warning);
        assert_eq!(classify(30), DelinquencyTier::Critical);
        assert_eq!(classify(u32::MAX), DelinquencyTier::Critical);
    }

    #[test]
    fn test_classify_is_monotonic() {
        let mut prev = classify(0);
        for days in 1..100 {
            let tier = classify(days);
            assert!(tier >= prev, "tier dropped at {} days", days);
            prev = tier;
        }
    }

    #[test]
    fn test_matches_filter() {
        assert!(matches_filter(5, LateFilter::Over3Days));
        assert!(!matches_filter(2, LateFilter::Over3Days));
        assert!(matches_filter(3, LateFilter::Over3Days));
        assert!(!matches_filter(29, LateFilter::Over30Days));
        assert!(matches_filter(30, LateFilter::Over30Days));
        for days in [0, 1, 6, 45, u32::MAX] {
            assert!(matches_filter(days, LateFilter::All));
        }
    }

    #[test]
    fn test_filter_scale_differs_from_tiers() {
        // four days late passes the +3 filter but is not yet a warning
        assert!(matches_filter(4, LateFilter::Over3Days));
        assert_eq!(classify(4), DelinquencyTier::Current);
    }

    #[test]
    fn test_filter_thresholds() {
        for filter in LateFilter::ALL {
            assert_eq!(LateFilter::from_threshold(filter.threshold()), Ok(filter));
        }
        assert!(matches!(
            LateFilter::from_threshold(5),
            Err(LendingError::InvalidInput(_))
        ));
        assert_eq!(LateFilter::default(), LateFilter::All);
        assert_eq!(LateFilter::All.to_string(), "TODOS");
        assert_eq!(LateFilter::Over30Days.label(), "+30 DIAS");
    }

    #[test]
    fn test_due_info() {
        let info = InstallmentDueInfo::new(date(2024, 3, 1), at(2024, 3, 10, 8, 0));
        assert_eq!(info.days_late(), 9);
        assert_eq!(info.tier(), DelinquencyTier::Warning);
        assert_eq!(info.tier().to_string(), "WARNING");
        assert!(info.matches(LateFilter::Over7Days));
        assert!(!info.matches(LateFilter::Over30Days));
        assert_eq!(info.days_late(), info.days_late());
    }

    #[test]
    fn test_filter_overdue() {
        let now = at(2024, 3, 31, 9, 0);
        let rows = vec![
            ("ana", date(2024, 3, 30)),
            ("bruno", date(2024, 2, 1)),
            ("carla", date(2024, 3, 20)),
            ("davi", date(2024, 4, 5)),
            ("elisa", date(2024, 3, 20)),
        ];

        let over3: Vec<&str> = filter_overdue(&rows, |r| r.1, LateFilter::Over3Days, now)
            .into_iter()
            .map(|r| r.0)
            .collect();
        assert_eq!(over3, vec!["bruno", "carla", "elisa"]);

        let all = filter_overdue(&rows, |r| r.1, LateFilter::All, now);
        assert_eq!(all.len(), 5);
        assert_eq!(all[0].0, "bruno");

        assert!(filter_overdue(&rows, |r| r.1, LateFilter::Over30Days, now)
            .iter()
            .all(|r| r.0 == "bruno"));
    }
}
