//! Automatic submission of a session at a configured time of day.
//!
//! The timer runs on a background thread but never touches the store: it only
//! posts events to the thread that owns the form, which performs the submission.
//! Closing the form before the timer fires cancels the submission.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::store::*;

/// Messages received by the thread that owns the form.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum FormEvent {
    /// Time left before the submission.
    Countdown(Duration),
    /// The timer fired.
    Submit,
    /// The form was closed by the user.
    Close,
}

/// Liveness of a form, shared with its timer.
#[derive(Debug, Clone)]
pub struct FormHandle {
    open: Arc<AtomicBool>,
}

impl FormHandle {
    pub fn new() -> FormHandle {
        FormHandle {
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

impl Default for FormHandle {
    fn default() -> Self {
        FormHandle::new()
    }
}

/// A one-shot timer.
pub struct AutoSubmit {
    thread: thread::JoinHandle<()>,
}

impl AutoSubmit {
    /// Starts the timer. A countdown event is posted every `tick` until `delay`
    /// has elapsed, then a single submit event, unless the form got closed.
    pub fn start(
        delay: Duration,
        tick: Duration,
        form: FormHandle,
        sender: Sender<FormEvent>,
    ) -> AutoSubmit {
        let thread = thread::spawn(move || {
            let mut remaining = delay;
            while !remaining.is_zero() {
                if !form.is_open() {
                    debug!("AutoSubmit: form closed, stopping the timer");
                    return;
                }
                if sender.send(FormEvent::Countdown(remaining)).is_err() {
                    return;
                }
                let step = remaining.min(tick);
                thread::sleep(step);
                remaining -= step;
            }
            if form.is_open() {
                debug!("AutoSubmit: firing");
                let _ = sender.send(FormEvent::Submit);
            }
        });
        AutoSubmit { thread }
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}

/// Runs the event loop of a form on the current thread.
///
/// Returns the outcome of the submission, or None if the form was closed (or
/// all the senders went away) before the timer fired.
pub fn run_form<T, F>(
    events: &Receiver<FormEvent>,
    form: &FormHandle,
    mut on_submit: F,
) -> StoreResult<Option<T>>
where
    F: FnMut() -> StoreResult<T>,
{
    while let Ok(event) = events.recv() {
        match event {
            FormEvent::Countdown(remaining) => {
                info!("Automatic submission in {}", format_remaining(remaining));
            }
            FormEvent::Submit if form.is_open() => {
                let res = on_submit()?;
                form.close();
                return Ok(Some(res));
            }
            FormEvent::Submit => {
                debug!("run_form: the form is closed, ignoring the submission");
                return Ok(None);
            }
            FormEvent::Close => {
                info!("Form closed, the automatic submission is cancelled");
                form.close();
                return Ok(None);
            }
        }
    }
    form.close();
    Ok(None)
}

pub fn format_remaining(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}min {}s", secs / 60, secs % 60)
}

/// Accepts `H:MM` / `HH:MM` with a valid hour and minute.
pub fn validate_clock(text: &str) -> bool {
    read_clock(text).is_some()
}

fn read_clock(text: &str) -> Option<(u32, u32)> {
    let (h, m) = text.trim().split_once(':')?;
    let hour = h.parse::<u32>().ok()?;
    let minute = m.parse::<u32>().ok()?;
    if hour <= 23 && minute <= 59 {
        Some((hour, minute))
    } else {
        None
    }
}

/// The (hour, minute) of a clock setting. Unreadable settings fall back to
/// 7:05 for the morning and 13:05 for the afternoon.
pub fn parse_clock(text: &str, session: Session) -> (u32, u32) {
    read_clock(text).unwrap_or(match session {
        Session::Morning => (7, 5),
        Session::Afternoon => (13, 5),
    })
}

/// The next occurrence of hour:minute: today, or tomorrow if it already passed.
pub fn next_fire_time(now: NaiveDateTime, hour: u32, minute: u32) -> NaiveDateTime {
    let target = match now.date().and_hms_opt(hour, minute, 0) {
        Some(t) => t,
        None => return now,
    };
    if target < now {
        target + chrono::Duration::days(1)
    } else {
        target
    }
}

/// The time to wait before the session is submitted.
pub fn delay_until(now: NaiveDateTime, target: NaiveDateTime) -> Duration {
    (target - now).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::mpsc::channel;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 8)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn clocks() {
        assert_eq!(parse_clock("7:05", Session::Afternoon), (7, 5));
        assert_eq!(parse_clock(" 14:30 ", Session::Morning), (14, 30));
        assert_eq!(parse_clock("25:00", Session::Morning), (7, 5));
        assert_eq!(parse_clock("noon", Session::Afternoon), (13, 5));
        assert!(validate_clock("0:00"));
        assert!(validate_clock("23:59"));
        assert!(!validate_clock("12:60"));
        assert!(!validate_clock("12"));
        assert!(!validate_clock("a:b"));
    }

    #[test]
    fn fire_time_today_or_tomorrow() {
        assert_eq!(next_fire_time(at(6, 0, 0), 7, 5), at(7, 5, 0));
        assert_eq!(next_fire_time(at(7, 5, 0), 7, 5), at(7, 5, 0));
        let tomorrow = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 0)
            .unwrap();
        assert_eq!(next_fire_time(at(7, 5, 1), 7, 5), tomorrow);
        assert_eq!(
            delay_until(at(6, 59, 30), at(7, 5, 0)),
            Duration::from_secs(330)
        );
        assert_eq!(delay_until(at(8, 0, 0), at(7, 5, 0)), Duration::ZERO);
    }

    #[test]
    fn timer_submits() {
        let (tx, rx) = channel();
        let form = FormHandle::new();
        let _timer = AutoSubmit::start(
            Duration::from_millis(30),
            Duration::from_millis(10),
            form.clone(),
            tx,
        );
        let mut submitted = 0;
        let res = run_form(&rx, &form, || {
            submitted += 1;
            Ok(42)
        })
        .unwrap();
        assert_eq!(res, Some(42));
        assert_eq!(submitted, 1);
        assert!(!form.is_open());
    }

    #[test]
    fn closed_form_never_submits() {
        let (tx, rx) = channel();
        let form = FormHandle::new();
        let timer = AutoSubmit::start(
            Duration::from_millis(50),
            Duration::from_millis(5),
            form.clone(),
            tx.clone(),
        );
        tx.send(FormEvent::Close).unwrap();
        drop(tx);
        let res: Option<()> = run_form(&rx, &form, || panic!("should not submit")).unwrap();
        assert_eq!(res, None);
        assert!(!form.is_open());

        // The timer notices the closed form and stops without firing.
        while !timer.is_finished() {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(rx.try_iter().all(|e| e != FormEvent::Submit));
    }

    #[test]
    fn late_submit_is_ignored() {
        let (tx, rx) = channel();
        let form = FormHandle::new();
        form.close();
        tx.send(FormEvent::Submit).unwrap();
        let res: Option<()> = run_form(&rx, &form, || panic!("should not submit")).unwrap();
        assert_eq!(res, None);
    }

    #[test]
    fn remaining_format() {
        assert_eq!(format_remaining(Duration::from_secs(125)), "2min 5s");
    }
}
