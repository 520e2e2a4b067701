use log::{info, warn};

use snafu::{prelude::*, ErrorCompat};
use std::io::BufRead;
use std::path::Path;
use std::sync::mpsc::{channel, Sender};
use std::thread;
use std::time::Duration;

use clap::Parser;

mod args;
mod store;

use crate::args::{Args, Command};
use crate::store::timer::*;
use crate::store::*;
use streak_scoring::BonusCounts;

// How often the countdown of the watch command is printed.
const COUNTDOWN_TICK: Duration = Duration::from_secs(60);

fn print_scores(session: Session, scores: &[(String, BonusCounts)]) {
    println!("Recorded the {} session", session);
    for (name, bc) in scores.iter() {
        println!(
            "{:<20} 3-day: {:>3}  7-day: {:>3}",
            name, bc.three_day, bc.seven_day
        );
    }
}

// Closes the form when 'q' is typed.
fn watch_stdin(sender: Sender<FormEvent>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(l) if l.trim() == "q" => {
                    let _ = sender.send(FormEvent::Close);
                    return;
                }
                Ok(_) => {}
                Err(_) => return,
            }
        }
    });
}

fn watch(store: &AttendanceStore, session: Session) -> StoreResult<()> {
    let timer_settings = &store.settings().timer;
    if !timer_settings.on {
        warn!("The timer is turned off in the settings, nothing to watch");
        return Ok(());
    }
    let (hour, minute) = timer_settings.clock(session);
    let now = chrono::Local::now().naive_local();
    let target = next_fire_time(now, hour, minute);
    let delay = delay_until(now, target);
    println!(
        "The {} session will be submitted automatically at {} (type 'q' to cancel)",
        session,
        target.format("%H:%M")
    );

    let form = FormHandle::new();
    let (tx, rx) = channel();
    watch_stdin(tx.clone());
    let _timer = AutoSubmit::start(delay, COUNTDOWN_TICK, form.clone(), tx);

    match run_form(&rx, &form, || store.submit_pending(session))? {
        Some(scores) => print_scores(session, &scores),
        None => println!("The automatic submission was cancelled"),
    }
    Ok(())
}

fn run(args: &Args) -> StoreResult<()> {
    let store = AttendanceStore::open(Path::new(args.root.as_str()))?;

    match &args.command {
        Command::Record { session, names } => {
            let scores = store.record_attendance(*session, names)?;
            print_scores(*session, &scores);
        }
        Command::Hold { session, names } => {
            store.save_breakpoint(*session, names)?;
            println!(
                "Saved {} pending name(s) for the {} session",
                names.len(),
                session
            );
        }
        Command::Pending { session } => {
            for name in store.load_breakpoint(*session)? {
                println!("{}", name);
            }
        }
        Command::Submit { session } => {
            let scores = store.submit_pending(*session)?;
            print_scores(*session, &scores);
        }
        Command::Watch { session } => {
            watch(&store, *session)?;
        }
        Command::Status { session } => {
            println!(
                "{:<20} {:>6} {:>6} {:>6} {:>6} {:>6} {:>7}",
                "name", "streak", "days", "rate", "3-day", "7-day", "points"
            );
            for ps in store.session_summary(*session)? {
                println!(
                    "{:<20} {:>6} {:>6} {:>5.0}% {:>6} {:>6} {:>7}",
                    ps.name,
                    ps.current_streak,
                    format!("{}/{}", ps.total_present, ps.days),
                    ps.attendance_rate * 100.0,
                    ps.bonus.three_day,
                    ps.bonus.seven_day,
                    ps.points
                );
            }
        }
        Command::Report { reference } => {
            let now = chrono::Local::now().naive_local();
            let path =
                store.generate_summary_report(now, reference.as_ref().map(Path::new))?;
            println!("Summary report written to {}", path.display());
            println!("The attendance data has been reset, a new period starts.");
        }
        Command::Settings => {
            let contents = serde_yaml::to_string(store.settings())
                .whatever_context("Could not print the settings")?;
            print!("{}", contents);
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
            .init();
    }
    info!("args: {:?}", args);

    if let Err(e) = run(&args) {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured: {}", e);
        for cause in e.iter_chain().skip(1) {
            eprintln!("caused by: {}", cause);
        }
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
