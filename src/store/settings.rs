use serde::{Deserialize, Serialize};

use crate::store::timer::{parse_clock, validate_clock};
use crate::store::*;

/// The contents of `settings.yml`.
///
/// Every section may be left out of the file; the defaults fill in the gaps.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub points: PointRules,
    #[serde(default)]
    pub timer: TimerSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default = "default_namelist")]
    pub namelist: Vec<String>,
    #[serde(default = "default_max_days")]
    pub max_days: i64,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(default = "default_timer_on")]
    pub on: bool,
    #[serde(default = "default_morning_clock")]
    pub morning: String,
    #[serde(default = "default_afternoon_clock")]
    pub afternoon: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// How the people on the roster are referred to in messages.
    #[serde(default = "default_pronoun")]
    pub pronoun: String,
}

fn default_namelist() -> Vec<String> {
    ["alice", "bob", "carol", "dave"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_max_days() -> i64 {
    DEFAULT_RETENTION_DAYS as i64
}

fn default_timer_on() -> bool {
    true
}

fn default_morning_clock() -> String {
    "7:05".to_string()
}

fn default_afternoon_clock() -> String {
    "13:05".to_string()
}

fn default_pronoun() -> String {
    "students".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            points: PointRules::default(),
            timer: TimerSettings::default(),
            display: DisplaySettings::default(),
            namelist: default_namelist(),
            max_days: default_max_days(),
        }
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        TimerSettings {
            on: default_timer_on(),
            morning: default_morning_clock(),
            afternoon: default_afternoon_clock(),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            pronoun: default_pronoun(),
        }
    }
}

impl Settings {
    /// The retention of new records. Values below 1 fall back to the default.
    pub fn retention_days(&self) -> u32 {
        match u32::try_from(self.max_days) {
            Ok(x) if x >= 1 => x,
            _ => DEFAULT_RETENTION_DAYS,
        }
    }
}

impl TimerSettings {
    /// The (hour, minute) at which the session is submitted automatically.
    pub fn clock(&self, session: Session) -> (u32, u32) {
        match session {
            Session::Morning => parse_clock(&self.morning, session),
            Session::Afternoon => parse_clock(&self.afternoon, session),
        }
    }
}

/// Reads the settings, or writes the default settings if the file does not exist.
pub fn load_or_create_settings(path: &Path) -> StoreResult<Settings> {
    if !path.exists() {
        info!("No settings found, writing the default settings to {:?}", path);
        let settings = Settings::default();
        save_settings(path, &settings)?;
        return Ok(settings);
    }

    let contents = fs::read_to_string(path).context(ReadingFileSnafu {
        path: display_path(path),
    })?;
    let settings = parse_settings(&contents).context(ParsingYamlSnafu {
        path: display_path(path),
    })?;
    debug!("load_or_create_settings: {:?}", settings);

    for (session, clock) in [
        (Session::Morning, &settings.timer.morning),
        (Session::Afternoon, &settings.timer.afternoon),
    ] {
        if !validate_clock(clock) {
            warn!(
                "Invalid time {:?} for the {} session, using {:?} instead",
                clock,
                session,
                settings.timer.clock(session)
            );
        }
    }
    if settings.retention_days() as i64 != settings.max_days {
        warn!(
            "Invalid max_days {}, using {}",
            settings.max_days,
            settings.retention_days()
        );
    }
    Ok(settings)
}

pub fn parse_settings(contents: &str) -> Result<Settings, serde_yaml::Error> {
    // An empty document is a valid (empty) settings file.
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(contents)
}

pub fn save_settings(path: &Path, settings: &Settings) -> StoreResult<()> {
    let contents = serde_yaml::to_string(settings).context(ParsingYamlSnafu {
        path: display_path(path),
    })?;
    write_text(path, &contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_gets_defaults() {
        let s = parse_settings(
            r#"
points:
  _7_days: 2.5
namelist:
  - ann
  - ben
"#,
        )
        .unwrap();
        assert_eq!(s.points.three_day, 1.0);
        assert_eq!(s.points.seven_day, 2.5);
        assert_eq!(s.namelist, vec!["ann".to_string(), "ben".to_string()]);
        assert_eq!(s.timer, TimerSettings::default());
        assert_eq!(s.retention_days(), DEFAULT_RETENTION_DAYS);
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(parse_settings("").unwrap(), Settings::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(parse_settings("namelist: 12").is_err());
    }

    #[test]
    fn bad_max_days() {
        let s = parse_settings("max_days: -4").unwrap();
        assert_eq!(s.retention_days(), DEFAULT_RETENTION_DAYS);
        let s = parse_settings("max_days: 5").unwrap();
        assert_eq!(s.retention_days(), 5);
    }

    #[test]
    fn timer_clocks() {
        let s = parse_settings(
            r#"
timer:
  on: false
  morning: "8:30"
  afternoon: "nonsense"
"#,
        )
        .unwrap();
        assert!(!s.timer.on);
        assert_eq!(s.timer.clock(Session::Morning), (8, 30));
        assert_eq!(s.timer.clock(Session::Afternoon), (13, 5));
    }

    #[test]
    fn default_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        let created = load_or_create_settings(&path).unwrap();
        assert!(path.exists());
        let loaded = load_or_create_settings(&path).unwrap();
        assert_eq!(created, loaded);
    }
}
