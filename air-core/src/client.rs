use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{AirError, Result};
use crate::review::{PatchSource, ReviewFormat, ReviewId, ReviewRequest, ReviewStatus};
use crate::session::StatusSource;

/// Timeout applied to every request. Calls are never retried.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking client for the review service API.
#[derive(Clone)]
pub struct AirClient {
    client: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    review_id: String,
}

impl AirClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("air-submit/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn api_url(&self) -> String {
        format!("{}/api/review", self.base_url)
    }

    /// Submit patches for review. One POST, returning the server-assigned
    /// review id.
    pub fn submit(
        &self,
        tree: &str,
        branch: Option<&str>,
        source: PatchSource,
    ) -> Result<ReviewId> {
        let request = ReviewRequest::new(&self.token, tree, branch, source);
        let url = self.api_url();
        debug!("submitting review request to {}", url);

        let response = self.client.post(&url).json(&request).send()?;
        let body = read_success_body(response)?;
        let submitted: SubmitResponse = serde_json::from_str(&body)?;
        debug!("review accepted: {}", submitted.review_id);

        Ok(ReviewId(submitted.review_id))
    }

    /// Fetch the current status of a review, optionally asking the server to
    /// render results in the given format.
    pub fn status(&self, id: &ReviewId, format: Option<ReviewFormat>) -> Result<ReviewStatus> {
        let url = self.api_url();
        let mut params: Vec<(&str, &str)> =
            vec![("id", id.0.as_str()), ("token", self.token.as_str())];
        if let Some(format) = &format {
            params.push(("format", format.as_str()));
        }
        debug!("querying status of review {}", id);

        let response = self.client.get(&url).query(&params).send()?;
        let body = read_success_body(response)?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl StatusSource for AirClient {
    fn fetch_status(&self, id: &ReviewId, format: Option<ReviewFormat>) -> Result<ReviewStatus> {
        self.status(id, format)
    }
}

/// Return the response body, or the non-2xx status plus body as an error.
fn read_success_body(response: reqwest::blocking::Response) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(AirError::Server { status, body });
    }
    Ok(response.text()?)
}
