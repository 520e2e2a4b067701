mod config;
pub mod builder;
pub mod codec;
pub mod manual;

use log::debug;

use std::collections::VecDeque;

pub use crate::config::*;

/// The attendance history of one person in one session.
///
/// The tracker keeps two views of the same data:
/// * `history`, the raw present/absent flags, oldest first. Scores are always
///   recomputed from it.
/// * `runs`, the lengths of the runs of consecutive present days. It is
///   updated incrementally and only serves the current streak.
///
/// ```
/// use streak_scoring::{BonusCounts, StreakRecord};
///
/// let mut rec = StreakRecord::new(7);
/// for _ in 0..10 {
///     rec.record(true);
/// }
/// assert_eq!(rec.calculate_scores(), BonusCounts::new(1, 1));
/// assert_eq!(rec.current_streak(), 10);
/// ```
#[derive(PartialEq, Debug, Clone)]
pub struct StreakRecord {
    pub(crate) history: Vec<bool>,
    // Invariant: never empty. The last element is the run in progress.
    pub(crate) runs: Vec<u32>,
    // Invariant: strictly positive.
    pub(crate) retention_days: u32,
    pub(crate) current_day: u32,
}

impl StreakRecord {
    /// An empty record. A zero retention is replaced by the default one.
    pub fn new(retention_days: u32) -> StreakRecord {
        StreakRecord {
            history: Vec::new(),
            runs: vec![0],
            retention_days: if retention_days == 0 {
                DEFAULT_RETENTION_DAYS
            } else {
                retention_days
            },
            current_day: 0,
        }
    }

    /// Records one session-day.
    ///
    /// Only the `2 * retention_days` most recent days are kept in the history,
    /// and only the run lengths those days can reach.
    /// A run that started before that window is scored from the window start.
    pub fn record(&mut self, present: bool) {
        if present {
            if let Some(last) = self.runs.last_mut() {
                *last += 1;
            }
        } else {
            self.runs.push(0);
        }
        self.history.push(present);
        self.current_day += 1;

        let window = history_window(self.retention_days);
        if self.history.len() > window {
            let excess = self.history.len() - window;
            self.history.drain(..excess);
            debug!("record: trimmed {} day(s) out of the history", excess);
        }
        trim_runs(&mut self.runs, self.retention_days);
    }

    /// Computes the 3-day and 7-day awards earned over the retained history.
    pub fn calculate_scores(&self) -> BonusCounts {
        let runs = rebuild_runs(&self.history);
        let res = award_bonuses(&runs);
        debug!("calculate_scores: runs: {:?} awards: {:?}", runs, res);
        res
    }

    /// The length of the run in progress, 0 if the last recorded day was an absence.
    pub fn current_streak(&self) -> u32 {
        self.runs.last().cloned().unwrap_or(0)
    }

    pub fn total_present(&self) -> u32 {
        self.history.iter().filter(|&&present| present).count() as u32
    }

    /// The share of present days in the history, 0 for an empty history.
    pub fn attendance_rate(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.total_present() as f64 / self.history.len() as f64
    }

    /// Forgets everything recorded so far. The retention is kept.
    pub fn reset(&mut self) {
        self.history.clear();
        self.runs = vec![0];
        self.current_day = 0;
    }

    pub fn history(&self) -> &[bool] {
        &self.history
    }

    pub fn runs(&self) -> &[u32] {
        &self.runs
    }

    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// The number of days recorded since the last reset, including trimmed ones.
    pub fn current_day(&self) -> u32 {
        self.current_day
    }
}

impl Default for StreakRecord {
    fn default() -> Self {
        StreakRecord::new(DEFAULT_RETENTION_DAYS)
    }
}

// The number of days kept in the history.
fn history_window(retention_days: u32) -> usize {
    2 * retention_days as usize
}

// A window of n days holds at most n + 1 runs (one per absence plus the first).
// Older cached run lengths are dropped. The run in progress is always kept.
pub(crate) fn trim_runs(runs: &mut Vec<u32>, retention_days: u32) {
    let max_runs = history_window(retention_days) + 1;
    if runs.len() > max_runs {
        let excess = runs.len() - max_runs;
        runs.drain(..excess);
    }
}

// A new run starts at every absence. The first element is the run before any absence.
fn rebuild_runs(history: &[bool]) -> Vec<u32> {
    let mut runs: Vec<u32> = vec![0];
    for &present in history {
        if present {
            if let Some(last) = runs.last_mut() {
                *last += 1;
            }
        } else {
            runs.push(0);
        }
    }
    runs
}

// Greedy decomposition: a run of 7 days or more is charged one 7-day award and
// what remains goes back in the queue to be scored like any other run.
fn award_bonuses(runs: &[u32]) -> BonusCounts {
    let mut queue: VecDeque<u32> = runs.iter().cloned().collect();
    let mut res = BonusCounts::EMPTY;
    while let Some(n) = queue.pop_front() {
        if n < SHORT_STREAK_DAYS {
            continue;
        }
        if n < LONG_STREAK_DAYS {
            res.three_day += 1;
            continue;
        }
        res.seven_day += 1;
        queue.push_back(n - LONG_STREAK_DAYS);
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn replay(history: &[bool]) -> StreakRecord {
        // Large retention so that nothing gets trimmed.
        let mut rec = StreakRecord::new(100);
        for &p in history {
            rec.record(p);
        }
        rec
    }

    #[test]
    fn empty_record() {
        init();
        let rec = StreakRecord::default();
        assert_eq!(rec.calculate_scores(), BonusCounts::EMPTY);
        assert_eq!(rec.current_streak(), 0);
        assert_eq!(rec.runs(), &[0]);
        assert_eq!(rec.retention_days(), DEFAULT_RETENTION_DAYS);
    }

    #[test]
    fn reset_clears_everything() {
        init();
        let mut rec = replay(&[true, true, true, false, true]);
        rec.reset();
        assert_eq!(rec.calculate_scores(), BonusCounts::EMPTY);
        assert_eq!(rec.current_streak(), 0);
        assert_eq!(rec.current_day(), 0);
        assert!(rec.history().is_empty());
        // Idempotent
        rec.reset();
        assert_eq!(rec, StreakRecord::new(100));
    }

    #[test]
    fn three_days() {
        init();
        let rec = replay(&[true; 3]);
        assert_eq!(rec.calculate_scores().as_tuple(), (1, 0));
    }

    #[test]
    fn seven_days() {
        init();
        let rec = replay(&[true; 7]);
        assert_eq!(rec.calculate_scores().as_tuple(), (0, 1));
    }

    #[test]
    fn ten_days_earns_both() {
        init();
        let rec = replay(&[true; 10]);
        assert_eq!(rec.calculate_scores().as_tuple(), (1, 1));
    }

    #[test]
    fn fourteen_days() {
        init();
        let rec = replay(&[true; 14]);
        assert_eq!(rec.calculate_scores().as_tuple(), (0, 2));
    }

    #[test]
    fn long_runs_compound() {
        init();
        // 7 + 7 + 3
        assert_eq!(replay(&[true; 17]).calculate_scores(), BonusCounts::new(1, 2));
        // 7 + 2: the remainder is too short
        assert_eq!(replay(&[true; 9]).calculate_scores(), BonusCounts::new(0, 1));
        // 7 + 6
        assert_eq!(replay(&[true; 13]).calculate_scores(), BonusCounts::new(1, 1));
    }

    #[test]
    fn short_runs_earn_nothing() {
        init();
        let rec = replay(&[true, false, true, true]);
        assert_eq!(rec.calculate_scores(), BonusCounts::EMPTY);
        assert_eq!(rec.runs(), &[1, 2]);
    }

    #[test]
    fn runs_are_scored_separately() {
        init();
        let mut h = vec![true; 4];
        h.push(false);
        h.push(false);
        h.extend(vec![true; 8]);
        let rec = replay(&h);
        assert_eq!(rec.calculate_scores(), BonusCounts::new(1, 1));
        assert_eq!(rec.runs(), &[4, 0, 8]);
    }

    #[test]
    fn scores_are_idempotent() {
        init();
        let rec = replay(&[true, true, true, false, true, true, true, true]);
        let first = rec.calculate_scores();
        let second = rec.calculate_scores();
        assert_eq!(first, second);
        assert_eq!(first, BonusCounts::new(2, 0));
    }

    #[test]
    fn current_streak_follows_last_run() {
        init();
        let mut rec = StreakRecord::default();
        rec.record(true);
        rec.record(true);
        rec.record(false);
        assert_eq!(rec.current_streak(), 0);
        rec.record(true);
        assert_eq!(rec.current_streak(), 1);
    }

    #[test]
    fn totals_and_rate() {
        init();
        let rec = StreakRecord::default();
        assert_eq!(rec.attendance_rate(), 0.0);

        let rec = replay(&[true, false, true, true]);
        assert_eq!(rec.total_present(), 3);
        assert!((rec.attendance_rate() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn history_is_trimmed_to_the_window() {
        init();
        let mut rec = StreakRecord::new(2);
        for p in [false, true, true, true, true, true] {
            rec.record(p);
        }
        assert_eq!(rec.history(), &[true, true, true, true]);
        assert_eq!(rec.current_day(), 6);
        // The run in progress outlives the trimmed history.
        assert_eq!(rec.current_streak(), 5);
        assert_eq!(rec.calculate_scores(), BonusCounts::new(1, 0));
    }

    #[test]
    fn run_lengths_stay_bounded() {
        init();
        let mut rec = StreakRecord::default();
        for _ in 0..1000 {
            rec.record(false);
        }
        assert_eq!(rec.history().len(), 14);
        assert_eq!(rec.runs().len(), 15);
        assert!(rec.runs().iter().all(|&n| n == 0));

        for _ in 0..4 {
            rec.record(true);
        }
        assert_eq!(rec.runs().len(), 15);
        assert_eq!(rec.current_streak(), 4);
        assert_eq!(rec.current_day(), 1004);
        assert_eq!(rec.calculate_scores(), BonusCounts::new(1, 0));
    }

    #[test]
    fn zero_retention_uses_default() {
        init();
        assert_eq!(StreakRecord::new(0).retention_days(), DEFAULT_RETENTION_DAYS);
    }

    #[test]
    fn points_from_awards() {
        let rules = PointRules {
            three_day: 1.0,
            seven_day: 2.5,
        };
        assert_eq!(BonusCounts::new(2, 1).points(&rules), 4.5);
        assert_eq!(BonusCounts::EMPTY.points(&PointRules::default()), 0.0);
    }
}
