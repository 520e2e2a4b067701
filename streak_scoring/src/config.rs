// ********* Scoring thresholds ***********

use serde::{Deserialize, Serialize};

/// The number of consecutive present days that earns a short bonus.
pub const SHORT_STREAK_DAYS: u32 = 3;

/// The number of consecutive present days that earns a long bonus.
/// A run longer than this is charged one long bonus and the rest of the run
/// is scored again.
pub const LONG_STREAK_DAYS: u32 = 7;

/// Retention used when none is given, or when a stored value is not usable.
pub const DEFAULT_RETENTION_DAYS: u32 = 7;

// ******** Output data structures *********

/// The bonuses accrued over a history.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Hash)]
pub struct BonusCounts {
    /// Runs (or run remainders) of 3 to 6 days.
    pub three_day: u32,
    /// Blocks of 7 days taken out of a run.
    pub seven_day: u32,
}

impl BonusCounts {
    pub const EMPTY: BonusCounts = BonusCounts {
        three_day: 0,
        seven_day: 0,
    };

    pub fn new(three_day: u32, seven_day: u32) -> BonusCounts {
        BonusCounts {
            three_day,
            seven_day,
        }
    }

    /// The awards as a `(three_day, seven_day)` pair.
    pub fn as_tuple(&self) -> (u32, u32) {
        (self.three_day, self.seven_day)
    }

    /// Converts the awards into points under the given rules.
    pub fn points(&self, rules: &PointRules) -> f64 {
        self.three_day as f64 * rules.three_day + self.seven_day as f64 * rules.seven_day
    }
}

// ********* Configuration **********

/// Points granted per award.
///
/// The multipliers are applied outside of the tracker: a record only knows
/// how many awards it earned.
#[derive(PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointRules {
    #[serde(rename = "_3_days", default = "default_three_day_points")]
    pub three_day: f64,
    #[serde(rename = "_7_days", default = "default_seven_day_points")]
    pub seven_day: f64,
}

fn default_three_day_points() -> f64 {
    PointRules::DEFAULT_RULES.three_day
}

fn default_seven_day_points() -> f64 {
    PointRules::DEFAULT_RULES.seven_day
}

impl PointRules {
    pub const DEFAULT_RULES: PointRules = PointRules {
        three_day: 1.0,
        seven_day: 3.0,
    };
}

impl Default for PointRules {
    fn default() -> Self {
        PointRules::DEFAULT_RULES
    }
}
