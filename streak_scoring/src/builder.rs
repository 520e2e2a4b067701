pub use crate::config::*;
use crate::{trim_runs, StreakRecord};

use log::warn;

/// A builder for records coming from untrusted input.
///
/// Every field is optional. Building never fails: a field that is missing or
/// out of range is replaced by the value an empty record would have.
///
/// ```
/// use streak_scoring::builder::RecordBuilder;
///
/// let rec = RecordBuilder::new()
///     .retention_days(-3)
///     .history(vec![true, true, true])
///     .build();
///
/// assert_eq!(rec.retention_days(), 7);
/// assert_eq!(rec.runs(), &[0]);
/// assert_eq!(rec.calculate_scores().as_tuple(), (1, 0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    pub(crate) _retention_days: Option<i64>,
    pub(crate) _history: Option<Vec<bool>>,
    pub(crate) _runs: Option<Vec<u32>>,
    pub(crate) _current_day: Option<i64>,
}

impl RecordBuilder {
    pub fn new() -> RecordBuilder {
        RecordBuilder::default()
    }

    /// The retention window. Values below 1 fall back to the default.
    pub fn retention_days(self, days: i64) -> RecordBuilder {
        RecordBuilder {
            _retention_days: Some(days),
            ..self
        }
    }

    pub fn history(self, history: Vec<bool>) -> RecordBuilder {
        RecordBuilder {
            _history: Some(history),
            ..self
        }
    }

    /// The cached run lengths. An empty list is replaced by `[0]`.
    pub fn runs(self, runs: Vec<u32>) -> RecordBuilder {
        RecordBuilder {
            _runs: Some(runs),
            ..self
        }
    }

    /// The day counter. A negative value is replaced by the history length.
    pub fn current_day(self, day: i64) -> RecordBuilder {
        RecordBuilder {
            _current_day: Some(day),
            ..self
        }
    }

    pub fn build(self) -> StreakRecord {
        let retention_days = match self._retention_days {
            Some(x) if x >= 1 && x <= u32::MAX as i64 => x as u32,
            Some(x) => {
                warn!(
                    "build: invalid retention {:?}, using {:?}",
                    x, DEFAULT_RETENTION_DAYS
                );
                DEFAULT_RETENTION_DAYS
            }
            None => DEFAULT_RETENTION_DAYS,
        };

        let history = self._history.unwrap_or_default();

        let mut runs = match self._runs {
            Some(runs) if !runs.is_empty() => runs,
            _ => vec![0],
        };
        trim_runs(&mut runs, retention_days);

        let current_day = match self._current_day {
            Some(x) if x >= 0 && x <= u32::MAX as i64 => x as u32,
            _ => history.len() as u32,
        };

        StreakRecord {
            history,
            runs,
            retention_days,
            current_day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder_gives_empty_record() {
        let rec = RecordBuilder::new().build();
        assert_eq!(rec, StreakRecord::default());
    }

    #[test]
    fn keeps_valid_fields() {
        let rec = RecordBuilder::new()
            .retention_days(3)
            .history(vec![true, false, true])
            .runs(vec![1, 1])
            .current_day(5)
            .build();
        assert_eq!(rec.retention_days(), 3);
        assert_eq!(rec.history(), &[true, false, true]);
        assert_eq!(rec.runs(), &[1, 1]);
        assert_eq!(rec.current_day(), 5);
    }

    #[test]
    fn replaces_invalid_fields() {
        let rec = RecordBuilder::new()
            .retention_days(0)
            .history(vec![true, true])
            .runs(vec![])
            .current_day(-1)
            .build();
        assert_eq!(rec.retention_days(), DEFAULT_RETENTION_DAYS);
        assert_eq!(rec.runs(), &[0]);
        assert_eq!(rec.current_day(), 2);
    }

    #[test]
    fn long_run_lists_are_cut() {
        let rec = RecordBuilder::new()
            .retention_days(1)
            .runs(vec![5, 0, 0, 1, 2])
            .build();
        assert_eq!(rec.runs(), &[0, 1, 2]);
    }
}
