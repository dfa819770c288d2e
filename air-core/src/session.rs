//! The submit-then-poll workflow: repeated status fetches at a fixed cadence
//! until the review reaches a terminal state, rendered as a single
//! live-updating line.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::Result;
use crate::review::{ReviewFormat, ReviewId, ReviewStatus};
use crate::status::format_status_line;

/// Upper bound on one slice of the inter-poll sleep, so a raised interrupt
/// flag cuts the wait short instead of running out the full interval.
const WAKE_SLICE: Duration = Duration::from_millis(100);

/// Source of review status records, one network call per fetch.
pub trait StatusSource {
    /// Fetch the current status, optionally asking the server to render
    /// results in `format`.
    fn fetch_status(&self, id: &ReviewId, format: Option<ReviewFormat>) -> Result<ReviewStatus>;
}

/// How a polling session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The review reached `done` or `error`; carries the last status seen.
    Terminal(ReviewStatus),
    /// The interrupt flag was raised; no further fetch was made.
    Interrupted,
}

/// A single terminal line that is rewritten in place.
///
/// Each update blanks the previous line's width before writing the new
/// text, so successive statuses appear as one live line rather than a
/// scrolling log.
#[derive(Debug, Default)]
pub struct StatusLine {
    last_len: usize,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update<W: Write>(&mut self, out: &mut W, line: &str) -> std::io::Result<()> {
        write!(out, "\r{}\r{}", " ".repeat(self.last_len), line)?;
        out.flush()?;
        self.last_len = line.chars().count();
        Ok(())
    }
}

/// Poll `source` every `interval` until the review is terminal or the
/// interrupt flag is raised.
///
/// Exactly one fetch per iteration, no fetch after a terminal state, and a
/// fetch error aborts immediately. The final status line is ended with a
/// newline before returning.
pub fn poll_until_terminal<S: StatusSource, W: Write>(
    source: &S,
    review_id: &ReviewId,
    interval: Duration,
    interrupt: &AtomicBool,
    out: &mut W,
    color: bool,
) -> Result<PollOutcome> {
    let mut line = StatusLine::new();

    loop {
        if interrupt.load(Ordering::Relaxed) {
            debug!("polling interrupted before fetch");
            return Ok(PollOutcome::Interrupted);
        }

        let status = source.fetch_status(review_id, None)?;
        debug!("review {} status: {}", review_id, status.state);
        line.update(out, &format_status_line(&status, color))?;

        if status.state.is_terminal() {
            writeln!(out)?;
            return Ok(PollOutcome::Terminal(status));
        }

        if sleep_unless_interrupted(interval, interrupt) {
            debug!("polling interrupted during sleep");
            return Ok(PollOutcome::Interrupted);
        }
    }
}

/// Sleep for `interval`, waking early if the flag is raised. Returns true
/// when interrupted.
fn sleep_unless_interrupted(interval: Duration, interrupt: &AtomicBool) -> bool {
    // An interval past what Instant arithmetic can represent has no
    // deadline; only the interrupt flag ends the wait then.
    let deadline = Instant::now().checked_add(interval);
    loop {
        if interrupt.load(Ordering::Relaxed) {
            return true;
        }
        let remaining = match deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => WAKE_SLICE,
        };
        if remaining.is_zero() {
            return false;
        }
        thread::sleep(remaining.min(WAKE_SLICE));
    }
}
