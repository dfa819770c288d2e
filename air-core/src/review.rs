//! Wire types for the review API and the top-level submission modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{AirError, Result};

/// Newtype for the server-assigned review identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReviewId(pub String);

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ReviewId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ReviewId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// What a new submission carries: raw patch bodies or a patchwork series id.
///
/// Exactly one of the two exists by construction, so the request invariant
/// needs no runtime check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchSource {
    Patches(Vec<String>),
    Series(u64),
}

/// JSON body for `POST /api/review`.
#[derive(Debug, Serialize)]
pub struct ReviewRequest {
    token: String,
    tree: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    patches: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    patchwork_series_id: Option<u64>,
}

impl ReviewRequest {
    pub fn new(token: &str, tree: &str, branch: Option<&str>, source: PatchSource) -> Self {
        let (patches, patchwork_series_id) = match source {
            PatchSource::Patches(patches) => (Some(patches), None),
            PatchSource::Series(id) => (None, Some(id)),
        };
        Self {
            token: token.to_string(),
            tree: tree.to_string(),
            branch: branch.map(str::to_string),
            patches,
            patchwork_series_id,
        }
    }
}

/// Review lifecycle state as reported by the service.
///
/// Unknown strings are preserved in `Other` and displayed verbatim, so a
/// state this client predates never fails parsing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ReviewState {
    Queued,
    InProgress,
    Done,
    Error,
    Other(String),
}

impl ReviewState {
    /// Polling stops once the state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

impl From<String> for ReviewState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "queued" => Self::Queued,
            "in-progress" => Self::InProgress,
            "done" => Self::Done,
            "error" => Self::Error,
            _ => Self::Other(s),
        }
    }
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::InProgress => write!(f, "in-progress"),
            Self::Done => write!(f, "done"),
            Self::Error => write!(f, "error"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Response of `GET /api/review`.
///
/// `reviews` is present once the review is terminal and results were
/// requested; a `None` entry means that patch had no findings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReviewStatus {
    #[serde(rename = "status")]
    pub state: ReviewState,
    #[serde(default)]
    pub patch_count: u64,
    #[serde(default, rename = "completed_patches")]
    pub completed: u64,
    #[serde(rename = "queue-len")]
    pub queue_len: Option<u64>,
    pub message: Option<String>,
    #[serde(rename = "review")]
    pub reviews: Option<Vec<Option<String>>>,
}

/// Output format for rendered review results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewFormat {
    Json,
    Markup,
    #[default]
    Inline,
}

impl ReviewFormat {
    /// Value sent in the `format` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markup => "markup",
            Self::Inline => "inline",
        }
    }
}

impl fmt::Display for ReviewFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReviewFormat {
    type Err = AirError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Self::Json),
            "markup" => Ok(Self::Markup),
            "inline" => Ok(Self::Inline),
            other => Err(AirError::Usage(format!(
                "Unknown review format '{}' (expected json, markup, or inline)",
                other
            ))),
        }
    }
}

/// The three top-level modes an invocation can run in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionInput {
    /// Submit local patch files (read fully into memory, in argument order).
    PatchFiles(Vec<PathBuf>),
    /// Submit a reference to an externally hosted patchwork series.
    Series(u64),
    /// Skip submission and check an existing review.
    Existing(ReviewId),
}

impl SubmissionInput {
    /// Decide the mode from raw CLI input, before any file or network I/O.
    ///
    /// `--review-id` excludes the submission inputs; a new submission needs
    /// exactly one of patch files or a series id.
    pub fn select(
        patch_files: Vec<PathBuf>,
        series: Option<u64>,
        review_id: Option<String>,
    ) -> Result<Self> {
        if let Some(id) = review_id {
            if !patch_files.is_empty() || series.is_some() {
                return Err(AirError::Usage(
                    "Cannot combine --review-id with patch files or --pw-series".to_string(),
                ));
            }
            return Ok(Self::Existing(ReviewId(id)));
        }

        match (patch_files.is_empty(), series) {
            (false, Some(_)) => Err(AirError::Usage(
                "Cannot specify both --pw-series and patch files".to_string(),
            )),
            (true, None) => Err(AirError::Usage(
                "Must specify either --pw-series or patch files".to_string(),
            )),
            (false, None) => Ok(Self::PatchFiles(patch_files)),
            (true, Some(id)) => Ok(Self::Series(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_select_patch_files() {
        let input = SubmissionInput::select(paths(&["a.patch", "b.patch"]), None, None).unwrap();
        assert_eq!(
            input,
            SubmissionInput::PatchFiles(paths(&["a.patch", "b.patch"]))
        );
    }

    #[test]
    fn test_select_series() {
        let input = SubmissionInput::select(vec![], Some(1026553), None).unwrap();
        assert_eq!(input, SubmissionInput::Series(1026553));
    }

    #[test]
    fn test_select_existing_review() {
        let input = SubmissionInput::select(vec![], None, Some("abc-123-def".to_string())).unwrap();
        assert_eq!(input, SubmissionInput::Existing(ReviewId::from("abc-123-def")));
    }

    #[test]
    fn test_select_rejects_both_sources() {
        let err = SubmissionInput::select(paths(&["a.patch"]), Some(7), None).unwrap_err();
        assert!(matches!(err, AirError::Usage(_)));
        assert!(err.to_string().contains("both"));
    }

    #[test]
    fn test_select_rejects_neither_source() {
        let err = SubmissionInput::select(vec![], None, None).unwrap_err();
        assert!(matches!(err, AirError::Usage(_)));
        assert!(err.to_string().contains("either"));
    }

    #[test]
    fn test_select_rejects_review_id_with_submission_inputs() {
        let err = SubmissionInput::select(paths(&["a.patch"]), None, Some("abc".to_string()))
            .unwrap_err();
        assert!(matches!(err, AirError::Usage(_)));

        let err =
            SubmissionInput::select(vec![], Some(7), Some("abc".to_string())).unwrap_err();
        assert!(matches!(err, AirError::Usage(_)));
    }

    #[test]
    fn test_request_serializes_patches_in_order_without_series_key() {
        let request = ReviewRequest::new(
            "sekrit",
            "netdev/net-next",
            None,
            PatchSource::Patches(vec!["patch a".to_string(), "patch b".to_string()]),
        );
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["token"], "sekrit");
        assert_eq!(value["tree"], "netdev/net-next");
        assert_eq!(value["patches"], serde_json::json!(["patch a", "patch b"]));
        assert!(value.get("patchwork_series_id").is_none());
        assert!(value.get("branch").is_none());
    }

    #[test]
    fn test_request_serializes_series_without_patches_key() {
        let request = ReviewRequest::new(
            "sekrit",
            "wireless/wireless-next",
            Some("main"),
            PatchSource::Series(1026553),
        );
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["patchwork_series_id"], 1026553);
        assert_eq!(value["branch"], "main");
        assert!(value.get("patches").is_none());
    }

    #[test]
    fn test_state_parses_known_values() {
        assert_eq!(ReviewState::from("queued".to_string()), ReviewState::Queued);
        assert_eq!(
            ReviewState::from("in-progress".to_string()),
            ReviewState::InProgress
        );
        assert_eq!(ReviewState::from("done".to_string()), ReviewState::Done);
        assert_eq!(ReviewState::from("error".to_string()), ReviewState::Error);
    }

    #[test]
    fn test_state_preserves_unknown_values() {
        let state = ReviewState::from("archived".to_string());
        assert_eq!(state, ReviewState::Other("archived".to_string()));
        assert_eq!(state.to_string(), "archived");
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_terminal_states() {
        assert!(ReviewState::Done.is_terminal());
        assert!(ReviewState::Error.is_terminal());
        assert!(!ReviewState::Queued.is_terminal());
        assert!(!ReviewState::InProgress.is_terminal());
    }

    #[test]
    fn test_status_deserializes_wire_names() {
        let status: ReviewStatus = serde_json::from_str(
            r#"{
                "status": "in-progress",
                "patch_count": 4,
                "completed_patches": 2,
                "queue-len": 9,
                "message": null,
                "review": ["looks fine", null]
            }"#,
        )
        .unwrap();

        assert_eq!(status.state, ReviewState::InProgress);
        assert_eq!(status.patch_count, 4);
        assert_eq!(status.completed, 2);
        assert_eq!(status.queue_len, Some(9));
        assert_eq!(status.message, None);
        assert_eq!(
            status.reviews,
            Some(vec![Some("looks fine".to_string()), None])
        );
    }

    #[test]
    fn test_status_defaults_missing_fields() {
        let status: ReviewStatus = serde_json::from_str(r#"{"status": "queued"}"#).unwrap();

        assert_eq!(status.state, ReviewState::Queued);
        assert_eq!(status.patch_count, 0);
        assert_eq!(status.completed, 0);
        assert_eq!(status.queue_len, None);
        assert_eq!(status.message, None);
        assert_eq!(status.reviews, None);
    }

    #[test]
    fn test_format_round_trips_wire_values() {
        for (text, format) in [
            ("json", ReviewFormat::Json),
            ("markup", ReviewFormat::Markup),
            ("inline", ReviewFormat::Inline),
        ] {
            assert_eq!(text.parse::<ReviewFormat>().unwrap(), format);
            assert_eq!(format.as_str(), text);
        }
    }

    #[test]
    fn test_format_rejects_unknown_value() {
        let err = "html".parse::<ReviewFormat>().unwrap_err();
        assert!(matches!(err, AirError::Usage(_)));
        assert!(err.to_string().contains("html"));
    }
}
