//! Conversion of records to and from JSON values.
//!
//! The layout is the one used by the data files:
//!
//! ```json
//! { "scoring": [3, 0, 2], "history": [true, true, true, false, true, true], "max_days": 7, "current_day": 6 }
//! ```
//!
//! `scoring` holds the cached run lengths and `max_days` the retention window.

use log::{debug, warn};
use serde_json::json;
use serde_json::Value as JSValue;

use crate::builder::RecordBuilder;
use crate::StreakRecord;

const RUNS_KEY: &str = "scoring";
const HISTORY_KEY: &str = "history";
const RETENTION_KEY: &str = "max_days";
const CURRENT_DAY_KEY: &str = "current_day";

pub fn to_value(rec: &StreakRecord) -> JSValue {
    json!({
        RUNS_KEY: rec.runs,
        HISTORY_KEY: rec.history,
        RETENTION_KEY: rec.retention_days,
        CURRENT_DAY_KEY: rec.current_day,
    })
}

/// Reads a record out of any JSON value.
///
/// This never fails. Each field that cannot be understood is dropped and the
/// record builder fills in the default for it.
pub fn from_value(js: &JSValue) -> StreakRecord {
    let obj = match js.as_object() {
        Some(obj) => obj,
        None => {
            warn!("from_value: expected an object, got {:?}", js);
            return StreakRecord::default();
        }
    };

    let mut builder = RecordBuilder::new();

    if let Some(x) = obj.get(RETENTION_KEY) {
        match read_js_int(x) {
            Some(days) => builder = builder.retention_days(days),
            None => warn!("from_value: could not read {} from {:?}", RETENTION_KEY, x),
        }
    }

    if let Some(x) = obj.get(HISTORY_KEY) {
        match read_history(x) {
            Some(history) => builder = builder.history(history),
            None => warn!("from_value: dropping malformed history {:?}", x),
        }
    }

    if let Some(x) = obj.get(RUNS_KEY) {
        match read_runs(x) {
            Some(runs) => builder = builder.runs(runs),
            None => warn!("from_value: dropping malformed run lengths {:?}", x),
        }
    }

    if let Some(day) = obj.get(CURRENT_DAY_KEY).and_then(read_js_int) {
        builder = builder.current_day(day);
    }

    let rec = builder.build();
    debug!("from_value: {:?}", rec);
    rec
}

// Integers may come as numbers or as strings. Fractional numbers are truncated.
fn read_js_int(x: &JSValue) -> Option<i64> {
    match x {
        JSValue::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        JSValue::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn read_history(x: &JSValue) -> Option<Vec<bool>> {
    x.as_array()?.iter().map(|elt| elt.as_bool()).collect()
}

// Run lengths follow the same integer rules as the other fields, and must not be negative.
fn read_runs(x: &JSValue) -> Option<Vec<u32>> {
    x.as_array()?
        .iter()
        .map(|elt| read_js_int(elt).and_then(|n| u32::try_from(n).ok()))
        .collect()
}
