use chrono::NaiveDateTime;
use text_diff::print_diff;

use crate::store::*;

const GENERATED_PREFIX: &str = "**Generated**:";
// Two trailing spaces: a Markdown line break inside the header paragraph.
const LINE_BREAK: &str = "  ";

/// The points of one person over the period.
#[derive(PartialEq, Debug, Clone)]
pub struct ReportRow {
    pub name: String,
    pub morning: f64,
    pub afternoon: f64,
    pub total: f64,
}

/// One row per person on the roster, in roster order. People without a record
/// in a session get no points for it.
pub fn build_rows(
    namelist: &[String],
    morning: &SessionRecords,
    afternoon: &SessionRecords,
    rules: &PointRules,
) -> Vec<ReportRow> {
    let session_points = |records: &SessionRecords, name: &String| -> f64 {
        records
            .get(name)
            .map(|rec| rec.calculate_scores().points(rules))
            .unwrap_or(0.0)
    };
    namelist
        .iter()
        .map(|name| {
            let m = session_points(morning, name);
            let a = session_points(afternoon, name);
            debug!("build_rows: {}: morning {} afternoon {}", name, m, a);
            ReportRow {
                name: name.clone(),
                morning: m,
                afternoon: a,
                total: m + a,
            }
        })
        .collect()
}

/// The number of days recorded during the period, across both sessions.
pub fn period_length(morning: &SessionRecords, afternoon: &SessionRecords) -> u32 {
    morning
        .values()
        .chain(afternoon.values())
        .map(|rec| rec.current_day())
        .max()
        .unwrap_or(0)
}

pub fn report_file_name(now: NaiveDateTime) -> String {
    format!("attendance_summary_{}.md", now.format("%Y%m%d_%H%M%S"))
}

pub fn render_report(
    rows: &[ReportRow],
    period_days: u32,
    rules: &PointRules,
    now: NaiveDateTime,
) -> String {
    let mut md = format!(
        "# Attendance summary report

{} {}{}
**This period is over, a new one starts now**
> Period length: {} days

## Points for this period

| Name | Morning | Afternoon | Total |
|------|---------|-----------|-------|
",
        GENERATED_PREFIX,
        now.format("%Y-%m-%d %H:%M:%S"),
        LINE_BREAK,
        period_days
    );

    for row in rows.iter() {
        md.push_str(&format!(
            "| {} | **{}** | **{}** | **{}** |\n",
            row.name, row.morning, row.afternoon, row.total
        ));
    }

    md.push_str(&format!(
        "
## Scoring

- {} to {} consecutive days: {} point(s) per award
- {} consecutive days: {} point(s) per award, the days beyond are scored again

## Note

The attendance data of this period has been reset. Counting starts again with the next session.
",
        SHORT_STREAK_DAYS,
        LONG_STREAK_DAYS - 1,
        rules.three_day,
        LONG_STREAK_DAYS,
        rules.seven_day
    ));
    md
}

// The generation time changes with every run, it is left out of comparisons.
fn strip_timestamp(report: &str) -> String {
    report
        .lines()
        .filter(|l| !l.starts_with(GENERATED_PREFIX))
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Compares a report with a reference file. Differences are printed and
/// reported as an error.
pub fn check_against_reference(report: &str, reference_path: &Path) -> StoreResult<()> {
    let reference = fs::read_to_string(reference_path).context(ReadingFileSnafu {
        path: display_path(reference_path),
    })?;
    let expected = strip_timestamp(&reference);
    let actual = strip_timestamp(report);
    if expected.trim_end() != actual.trim_end() {
        warn!("Found differences with the reference report {:?}", reference_path);
        print_diff(expected.as_str(), actual.as_str(), "\n");
        return ReportMismatchSnafu {
            path: display_path(reference_path),
        }
        .fail();
    }
    info!("The report matches the reference {:?}", reference_path);
    Ok(())
}
