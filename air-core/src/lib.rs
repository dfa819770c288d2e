pub mod client;
pub mod error;
pub mod review;
pub mod session;
pub mod status;
pub mod trees;

pub use client::AirClient;
pub use error::{AirError, Result};
pub use review::{
    PatchSource, ReviewFormat, ReviewId, ReviewRequest, ReviewState, ReviewStatus,
    SubmissionInput,
};
pub use session::{poll_until_terminal, PollOutcome, StatusLine, StatusSource};
pub use status::{format_status_line, render_reviews};
