use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use streak_scoring::*;

use std::collections::{BTreeMap, HashSet};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

use crate::store::io_common::*;
use crate::store::settings::*;

pub mod breakpoint;
pub mod io_common;
pub mod report;
pub mod settings;
pub mod timer;

pub const SETTINGS_FILE: &str = "settings.yml";
pub const DATA_DIR: &str = "data";
pub const REPORTS_DIR: &str = "reports";
pub const BREAKPOINT_FILE: &str = "breakpoint.json";

/// One of the two attendance-taking events of the day.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd, clap::ValueEnum)]
pub enum Session {
    Morning,
    Afternoon,
}

impl Session {
    pub const ALL: [Session; 2] = [Session::Morning, Session::Afternoon];

    pub fn as_str(&self) -> &'static str {
        match self {
            Session::Morning => "morning",
            Session::Afternoon => "afternoon",
        }
    }
}

impl Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Snafu)]
pub enum StoreError {
    #[snafu(display("Error creating directory {path}"))]
    CreatingDir {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading file {path}"))]
    ReadingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error handling JSON data for {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error handling the settings in {path}"))]
    ParsingYaml {
        source: serde_yaml::Error,
        path: String,
    },

    #[snafu(display("Select at least one of the {pronoun} before submitting the {session} session"))]
    EmptySelection { session: Session, pronoun: String },
    #[snafu(display("{name:?} is not on the roster"))]
    UnknownPerson { name: String },
    #[snafu(display("The report differs from the reference {path}"))]
    ReportMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The records of one session, by person name.
pub type SessionRecords = BTreeMap<String, StreakRecord>;

/// The state of one person, as shown by the status command.
#[derive(PartialEq, Debug, Clone)]
pub struct PersonSummary {
    pub name: String,
    pub current_streak: u32,
    pub total_present: u32,
    pub days: u32,
    pub attendance_rate: f64,
    pub bonus: BonusCounts,
    pub points: f64,
}

/// The files of one attendance roster: settings, session records, pending
/// selections and reports, all under a root directory.
pub struct AttendanceStore {
    root: PathBuf,
    settings: Settings,
}

impl AttendanceStore {
    /// Opens the store, creating the directories and the settings file if needed.
    pub fn open(root: &Path) -> StoreResult<AttendanceStore> {
        let settings = load_or_create_settings(&root.join(SETTINGS_FILE))?;
        AttendanceStore::with_settings(root, settings)
    }

    /// Opens the store with the given settings. The settings file is not touched.
    pub fn with_settings(root: &Path, settings: Settings) -> StoreResult<AttendanceStore> {
        ensure_dir(&root.join(DATA_DIR))?;
        ensure_dir(&root.join(REPORTS_DIR))?;
        info!(
            "Opened attendance store at {:?} with {} people on the roster",
            root,
            settings.namelist.len()
        );
        Ok(AttendanceStore {
            root: root.to_path_buf(),
            settings,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn session_path(&self, session: Session) -> PathBuf {
        self.root
            .join(DATA_DIR)
            .join(format!("{}_data.json", session.as_str()))
    }

    fn breakpoint_path(&self) -> PathBuf {
        self.root.join(DATA_DIR).join(BREAKPOINT_FILE)
    }

    pub(crate) fn reports_dir(&self) -> PathBuf {
        self.root.join(REPORTS_DIR)
    }

    /// Loads the records of a session.
    ///
    /// Everybody on the roster gets a record: people without saved state start
    /// with an empty one, and the file is updated accordingly.
    pub fn load_session(&self, session: Session) -> StoreResult<SessionRecords> {
        let path = self.session_path(session);
        let js = read_json(&path)?;
        let mut changed = js.is_none();

        let mut records: SessionRecords = BTreeMap::new();
        match js {
            Some(JSValue::Object(obj)) => {
                for (name, rec_js) in obj.iter() {
                    records.insert(name.clone(), codec::from_value(rec_js));
                }
            }
            Some(x) => {
                warn!(
                    "load_session: {:?}: expected an object of records, got {:?}; starting over",
                    path, x
                );
                changed = true;
            }
            None => {
                info!("No data for the {} session yet, creating {:?}", session, path);
            }
        }

        let retention_days = self.settings.retention_days();
        for name in self.settings.namelist.iter() {
            if !records.contains_key(name) {
                debug!("load_session: new record for {:?}", name);
                records.insert(name.clone(), StreakRecord::new(retention_days));
                changed = true;
            }
        }

        if changed {
            self.save_session(session, &records)?;
        }
        Ok(records)
    }

    pub fn save_session(&self, session: Session, records: &SessionRecords) -> StoreResult<()> {
        let mut obj: JSMap<String, JSValue> = JSMap::new();
        for (name, rec) in records.iter() {
            obj.insert(name.clone(), codec::to_value(rec));
        }
        write_json(&self.session_path(session), &JSValue::Object(obj))
    }

    fn check_on_roster(&self, names: &[String]) -> StoreResult<()> {
        for name in names.iter() {
            ensure!(
                self.settings.namelist.contains(name),
                UnknownPersonSnafu { name: name.clone() }
            );
        }
        Ok(())
    }

    /// Records one session-day: the given people are present, everybody else on
    /// the roster is absent. Clears the pending selection of this session.
    ///
    /// Returns the awards of everyone on the roster, in roster order.
    pub fn record_attendance(
        &self,
        session: Session,
        present: &[String],
    ) -> StoreResult<Vec<(String, BonusCounts)>> {
        ensure!(
            !present.is_empty(),
            EmptySelectionSnafu {
                session,
                pronoun: self.settings.display.pronoun.clone(),
            }
        );
        self.check_on_roster(present)?;
        let present_set: HashSet<&String> = present.iter().collect();

        let mut records = self.load_session(session)?;
        let mut res: Vec<(String, BonusCounts)> = Vec::new();
        for name in self.settings.namelist.iter() {
            let rec = records
                .entry(name.clone())
                .or_insert_with(|| StreakRecord::new(self.settings.retention_days()));
            rec.record(present_set.contains(name));
            res.push((name.clone(), rec.calculate_scores()));
        }
        self.save_session(session, &records)?;
        info!(
            "Recorded the {} session: {} present out of {}",
            session,
            present_set.len(),
            self.settings.namelist.len()
        );

        // The day is saved at this point: a failure to drop the pending
        // selection must not make the caller record it a second time.
        if let Err(e) = self.clear_breakpoint(session) {
            warn!(
                "Could not clear the pending selection of the {} session: {}",
                session, e
            );
        }
        Ok(res)
    }

    /// Records the session with its pending selection.
    pub fn submit_pending(&self, session: Session) -> StoreResult<Vec<(String, BonusCounts)>> {
        let pending = self.load_breakpoint(session)?;
        debug!("submit_pending: {}: {:?}", session, pending);
        self.record_attendance(session, &pending)
    }

    pub fn session_summary(&self, session: Session) -> StoreResult<Vec<PersonSummary>> {
        let records = self.load_session(session)?;
        let rules = &self.settings.points;
        let mut res: Vec<PersonSummary> = Vec::new();
        for name in self.settings.namelist.iter() {
            let rec = records.get(name).cloned().unwrap_or_default();
            let bonus = rec.calculate_scores();
            res.push(PersonSummary {
                name: name.clone(),
                current_streak: rec.current_streak(),
                total_present: rec.total_present(),
                days: rec.history().len() as u32,
                attendance_rate: rec.attendance_rate(),
                bonus,
                points: bonus.points(rules),
            });
        }
        Ok(res)
    }

    /// Resets every record of both sessions: a new period starts.
    pub fn reset_all(&self) -> StoreResult<()> {
        let morning = self.load_session(Session::Morning)?;
        let afternoon = self.load_session(Session::Afternoon)?;
        self.save_reset(&morning, &afternoon)
    }

    // Both sessions are read before this is called, so that a bad file cannot
    // leave one session reset and the other one not.
    fn save_reset(&self, morning: &SessionRecords, afternoon: &SessionRecords) -> StoreResult<()> {
        let reset = |records: &SessionRecords| -> SessionRecords {
            records
                .iter()
                .map(|(name, rec)| {
                    let mut rec = rec.clone();
                    rec.reset();
                    (name.clone(), rec)
                })
                .collect()
        };
        let morning = reset(morning);
        let afternoon = reset(afternoon);
        self.save_session(Session::Morning, &morning)?;
        self.save_session(Session::Afternoon, &afternoon)?;
        info!("Reset the records of all the sessions");
        Ok(())
    }

    pub fn load_breakpoint(&self, session: Session) -> StoreResult<Vec<String>> {
        breakpoint::load_breakpoint(&self.breakpoint_path(), session)
    }

    /// Saves a pending selection for the session, replacing the previous one.
    pub fn save_breakpoint(&self, session: Session, names: &[String]) -> StoreResult<()> {
        self.check_on_roster(names)?;
        breakpoint::save_breakpoint(&self.breakpoint_path(), session, names)
    }

    pub fn clear_breakpoint(&self, session: Session) -> StoreResult<()> {
        breakpoint::clear_breakpoint(&self.breakpoint_path(), session)
    }

    /// Writes the summary report of the period and resets all the records.
    ///
    /// If a reference is given, the report must match it (the generation time
    /// aside). Nothing is written or reset otherwise.
    pub fn generate_summary_report(
        &self,
        now: NaiveDateTime,
        reference: Option<&Path>,
    ) -> StoreResult<PathBuf> {
        let morning = self.load_session(Session::Morning)?;
        let afternoon = self.load_session(Session::Afternoon)?;

        let rows = report::build_rows(
            &self.settings.namelist,
            &morning,
            &afternoon,
            &self.settings.points,
        );
        let period_days = report::period_length(&morning, &afternoon);
        let content = report::render_report(&rows, period_days, &self.settings.points, now);

        if let Some(reference_path) = reference {
            report::check_against_reference(&content, reference_path)?;
        }

        let report_path = self.reports_dir().join(report::report_file_name(now));
        write_text(&report_path, &content)?;
        info!("Wrote the summary report to {:?}", report_path);

        self.save_reset(&morning, &afternoon)?;
        Ok(report_path)
    }
}
