//! Status-line formatting and per-patch result rendering.
//!
//! Everything here is pure presentation: color is an explicit flag decided
//! by the caller, never read from the environment.

use std::io::{self, Write};

use crate::review::{ReviewState, ReviewStatus};

/// ANSI escape codes used for interactive output.
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const RED: &str = "\x1b[91m";
    pub const GREEN: &str = "\x1b[92m";
    pub const BLUE: &str = "\x1b[94m";
    pub const CYAN: &str = "\x1b[96m";
    pub const YELLOW: &str = "\x1b[93m";
}

const SEPARATOR_WIDTH: usize = 80;

/// Wrap `text` in the given escape codes, or return it untouched when color
/// is off.
fn paint(text: &str, codes: &[&str], color: bool) -> String {
    if !color {
        return text.to_string();
    }
    let mut painted = String::with_capacity(text.len() + 16);
    for code in codes {
        painted.push_str(code);
    }
    painted.push_str(text);
    painted.push_str(colors::RESET);
    painted
}

/// Format the one-line status summary shown while polling.
///
/// Same status and same `color` flag always produce the same string.
pub fn format_status_line(status: &ReviewStatus, color: bool) -> String {
    match &status.state {
        ReviewState::Queued => {
            let ahead = status
                .queue_len
                .map(|n| n.to_string())
                .unwrap_or_else(|| "?".to_string());
            format!(
                "Status: {} (patches ahead: {})",
                paint("queued", &[colors::CYAN], color),
                ahead
            )
        }
        ReviewState::InProgress => {
            let state = paint("in-progress", &[colors::YELLOW], color);
            if status.patch_count > 0 {
                format!(
                    "Status: {} ({}/{} patches completed)",
                    state, status.completed, status.patch_count
                )
            } else {
                format!("Status: {} (setting up...)", state)
            }
        }
        ReviewState::Done => format!(
            "Status: {} ({} patches reviewed)",
            paint("done", &[colors::GREEN, colors::BOLD], color),
            status.patch_count
        ),
        ReviewState::Error => format!(
            "Status: {} - {}",
            paint("error", &[colors::RED, colors::BOLD], color),
            status.message.as_deref().unwrap_or("unknown error")
        ),
        ReviewState::Other(raw) => format!("Status: {}", raw),
    }
}

/// Print one section per patch, in service order.
///
/// The output always has exactly `patch_count` sections: an entry missing
/// from `reviews` (or null on the wire) renders as a no-comments marker.
pub fn render_reviews<W: Write>(
    out: &mut W,
    reviews: &[Option<String>],
    patch_count: u64,
    color: bool,
) -> io::Result<()> {
    let separator = "=".repeat(SEPARATOR_WIDTH);
    for index in 1..=patch_count {
        let header = format!("PATCH {}/{}", index, patch_count);

        writeln!(out, "\n{}", separator)?;
        writeln!(out, "{}", paint(&header, &[colors::BOLD, colors::BLUE], color))?;
        writeln!(out, "{}", separator)?;

        let review = reviews
            .get((index - 1) as usize)
            .and_then(|entry| entry.as_deref());
        match review {
            Some(text) => writeln!(out, "{}", text)?,
            None => writeln!(
                out,
                "{}",
                paint("No review comments", &[colors::GREEN], color)
            )?,
        }
    }
    Ok(())
}
