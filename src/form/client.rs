use crate::domain::models::{SurveyResponse, SurveySubmission};
use crate::error::ErrorBody;
use crate::web::survey::SubmitResponse;

pub const ACKNOWLEDGED: &str = "Survey submitted successfully!";
pub const SUBMISSION_FAILED: &str = "Submission failed";
pub const UNKNOWN_FAILURE: &str = "An unknown error occurred";

/// What the person filling in the form gets told after submitting.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// `record` is absent when the success body could not be read.
    Accepted { record: Option<SurveyResponse> },
    Rejected {
        status: u16,
        message: String,
    },
    Unreachable {
        reason: String,
    },
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted { .. })
    }

    pub fn user_message(&self) -> &str {
        match self {
            SubmitOutcome::Accepted { .. } => ACKNOWLEDGED,
            SubmitOutcome::Rejected { message, .. } => message,
            SubmitOutcome::Unreachable { .. } => UNKNOWN_FAILURE,
        }
    }
}

#[derive(Clone)]
pub struct SurveyClient {
    http: reqwest::Client,
    endpoint: String,
}

impl SurveyClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Sends one POST. Never retries.
    pub async fn submit(&self, submission: &SurveySubmission) -> SubmitOutcome {
        let response = match self.http.post(&self.endpoint).json(submission).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Could not reach survey endpoint {}: {}", self.endpoint, e);
                return SubmitOutcome::Unreachable {
                    reason: e.to_string(),
                };
            }
        };

        let status = response.status();
        if status.is_success() {
            let record = response.json::<SubmitResponse>().await.ok().map(|b| b.data);
            return SubmitOutcome::Accepted { record };
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .map(|b| b.error)
            .filter(|error| !error.trim().is_empty())
            .unwrap_or_else(|| SUBMISSION_FAILED.to_string());
        tracing::debug!("Survey endpoint answered {}: {}", status, message);

        SubmitOutcome::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}
