use clap::{Parser, Subcommand};

use crate::store::Session;

/// This is an attendance tracking program that rewards attendance streaks.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (directory, default '.') The directory holding the settings, the attendance data and the reports.
    /// It is created if it does not exist.
    #[clap(long, value_parser, default_value = ".")]
    pub root: String,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Records a session now. The people listed are present, everybody else on the roster is absent.
    Record {
        #[clap(value_enum)]
        session: Session,
        #[clap(value_parser, required = true)]
        names: Vec<String>,
    },
    /// Saves a selection for a session without recording it. It replaces any previous pending selection.
    Hold {
        #[clap(value_enum)]
        session: Session,
        #[clap(value_parser)]
        names: Vec<String>,
    },
    /// Prints the pending selection of a session.
    Pending {
        #[clap(value_enum)]
        session: Session,
    },
    /// Records a session using its pending selection.
    Submit {
        #[clap(value_enum)]
        session: Session,
    },
    /// Waits until the time configured for the session, then records its pending selection.
    /// Type 'q' to cancel.
    Watch {
        #[clap(value_enum)]
        session: Session,
    },
    /// Prints the streaks, awards and points of everybody for a session.
    Status {
        #[clap(value_enum)]
        session: Session,
    },
    /// Writes the summary report of the period and resets all the attendance data.
    Report {
        /// (file path) A reference report. If provided, the report must match it (apart from the
        /// generation time), otherwise nothing is written or reset.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },
    /// Prints the settings in use, creating the default settings file if needed.
    Settings,
}
