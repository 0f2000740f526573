use crate::domain::models::{SurveyResponse, SurveySubmission};
use crate::error::SubmissionError;
use crate::state::SharedState;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

pub const SUBMITTED: &str = "Survey submitted successfully";

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub message: String,
    pub data: SurveyResponse,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route(
            "/submit-survey",
            post(submit_survey).fallback(method_not_allowed),
        )
        .with_state(state)
}

async fn submit_survey(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<SubmitResponse>, SubmissionError> {
    match store_submission(&state, &body).await {
        Ok(record) => {
            tracing::info!(
                "Survey response stored: id={}, department={}",
                record.id,
                record.department
            );
            Ok(Json(SubmitResponse {
                message: SUBMITTED.to_string(),
                data: record,
            }))
        }
        Err(err) => {
            match &err {
                SubmissionError::Unknown { message } => {
                    tracing::error!("Failed to store survey response: {}", message)
                }
                other => tracing::warn!("Survey submission rejected: {}", other),
            }
            Err(err)
        }
    }
}

/// Validate, check uniqueness, write. The store handle lives only inside this
/// function, so it is released on every return path.
async fn store_submission(
    state: &SharedState,
    body: &[u8],
) -> Result<SurveyResponse, SubmissionError> {
    let submission = SurveySubmission::parse(body)?;

    let mut conn = state.store.acquire().await?;

    if conn
        .find_by_email(&submission.employee_email)
        .await?
        .is_some()
    {
        return Err(SubmissionError::duplicate_email());
    }

    // A concurrent submission can land between the check and the insert; the
    // store's unique constraint reports it as a duplicate as well.
    let record = conn.insert(&submission).await?;
    Ok(record)
}

async fn method_not_allowed(method: Method) -> impl IntoResponse {
    tracing::warn!("Rejected {} request to survey endpoint", method);
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        format!("Method {} Not Allowed", method),
    )
}
