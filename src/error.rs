use crate::db::StoreError;
use crate::domain::models::Field;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

pub const INVALID_DATA: &str = "Invalid survey data";
pub const DUPLICATE_EMAIL: &str = "A survey response for this email already exists";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

/// Why a submission was turned away.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("invalid survey data ({} issues)", .fields.len())]
    Validation { fields: Vec<FieldIssue> },
    #[error("a response already exists for unique field {field}")]
    UniqueConstraint { field: String },
    #[error("{message}")]
    Unknown { message: String },
}

impl SubmissionError {
    pub fn duplicate_email() -> Self {
        SubmissionError::UniqueConstraint {
            field: Field::EmployeeEmail.wire_name().to_string(),
        }
    }
}

impl FieldIssue {
    /// Issue for a field that is missing or holds the wrong JSON type.
    pub fn for_field(field: Field) -> Self {
        FieldIssue {
            field: field.wire_name().to_string(),
            message: field.message().unwrap_or("Feedback must be text").to_string(),
        }
    }

    /// Issue for a body that could not be read as a survey object at all.
    pub fn body(message: impl Into<String>) -> Self {
        FieldIssue {
            field: "body".to_string(),
            message: message.into(),
        }
    }
}

impl From<FieldIssue> for SubmissionError {
    fn from(issue: FieldIssue) -> Self {
        SubmissionError::Validation {
            fields: vec![issue],
        }
    }
}

impl From<ValidationErrors> for SubmissionError {
    fn from(errors: ValidationErrors) -> Self {
        let mut issues: Vec<(Option<Field>, FieldIssue)> = Vec::new();
        for (key, field_errors) in errors.field_errors() {
            let name: &str = &key;
            let field = Field::from_name(name);
            let wire = field.map(|f| f.wire_name()).unwrap_or(name).to_string();
            // One issue per field; the first failing rule speaks for it.
            if let Some(error) = field_errors.first() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .or_else(|| field.and_then(|f| f.message()).map(str::to_string))
                    .unwrap_or_else(|| error.code.to_string());
                issues.push((
                    field,
                    FieldIssue {
                        field: wire.clone(),
                        message,
                    },
                ));
            }
        }
        issues.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.field.cmp(&b.1.field)));
        SubmissionError::Validation {
            fields: issues.into_iter().map(|(_, issue)| issue).collect(),
        }
    }
}

impl From<StoreError> for SubmissionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { field } => SubmissionError::UniqueConstraint { field },
            StoreError::Database(e) => SubmissionError::Unknown {
                message: e
                    .as_database_error()
                    .map(|db| db.message().to_string())
                    .unwrap_or_else(|| e.to_string()),
            },
            StoreError::Unavailable(message) => SubmissionError::Unknown { message },
        }
    }
}

/// Body of every 400 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        let body = match self {
            SubmissionError::Validation { fields } => ErrorBody {
                error: INVALID_DATA.to_string(),
                details: Some(serde_json::json!(fields)),
            },
            SubmissionError::UniqueConstraint { field } => ErrorBody {
                error: DUPLICATE_EMAIL.to_string(),
                details: Some(serde_json::json!({ "field": field })),
            },
            SubmissionError::Unknown { message } => ErrorBody {
                error: INVALID_DATA.to_string(),
                details: Some(serde_json::Value::String(message)),
            },
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn render(err: SubmissionError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_response() {
        let (status, body) = render(SubmissionError::Validation {
            fields: vec![FieldIssue {
                field: "employeeName".into(),
                message: "Minimum 2 characters required".into(),
            }],
        })
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], INVALID_DATA);
        assert_eq!(body["details"][0]["field"], "employeeName");
    }

    #[tokio::test]
    async fn test_duplicate_response() {
        let (status, body) = render(SubmissionError::duplicate_email()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], DUPLICATE_EMAIL);
        assert_eq!(body["details"]["field"], "employeeEmail");
    }

    #[tokio::test]
    async fn test_store_errors_map_by_kind() {
        let unique: SubmissionError = StoreError::UniqueViolation {
            field: "employeeEmail".into(),
        }
        .into();
        assert!(matches!(unique, SubmissionError::UniqueConstraint { .. }));

        let (status, body) =
            render(StoreError::Unavailable("connection reset".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"], "connection reset");
    }
}
