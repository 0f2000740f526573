use crate::error::{FieldIssue, SubmissionError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::borrow::Cow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Fields of the survey, in the order the form presents them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    EmployeeName,
    EmployeeEmail,
    Department,
    WorkLifeBalance,
    JobSatisfaction,
    Feedback,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::EmployeeName,
        Field::EmployeeEmail,
        Field::Department,
        Field::WorkLifeBalance,
        Field::JobSatisfaction,
        Field::Feedback,
    ];

    pub fn wire_name(&self) -> &'static str {
        match self {
            Field::EmployeeName => "employeeName",
            Field::EmployeeEmail => "employeeEmail",
            Field::Department => "department",
            Field::WorkLifeBalance => "workLifeBalance",
            Field::JobSatisfaction => "jobSatisfaction",
            Field::Feedback => "feedback",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::EmployeeName => "Full Name",
            Field::EmployeeEmail => "Email",
            Field::Department => "Department",
            Field::WorkLifeBalance => "Work-Life Balance Rating (1-5)",
            Field::JobSatisfaction => "Job Satisfaction Rating (1-5)",
            Field::Feedback => "Additional Feedback",
        }
    }

    /// Message shown when the field fails validation. Feedback has no rule.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Field::EmployeeName => Some("Minimum 2 characters required"),
            Field::EmployeeEmail => Some("Valid email required"),
            Field::Department => Some("Department required"),
            Field::WorkLifeBalance | Field::JobSatisfaction => Some("Rating between 1-5 required"),
            Field::Feedback => None,
        }
    }

    /// Accepts both the wire name and the snake_case struct field name.
    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|field| field.wire_name() == name || field.snake_name() == name)
    }

    /// Whether a raw JSON value has the type this field takes.
    pub fn accepts(&self, value: Option<&Value>) -> bool {
        match self {
            Field::Feedback => matches!(value, None | Some(Value::Null) | Some(Value::String(_))),
            Field::WorkLifeBalance | Field::JobSatisfaction => value
                .and_then(Value::as_i64)
                .map_or(false, |n| i32::try_from(n).is_ok()),
            _ => matches!(value, Some(Value::String(_))),
        }
    }

    fn snake_name(&self) -> &'static str {
        match self {
            Field::EmployeeName => "employee_name",
            Field::EmployeeEmail => "employee_email",
            Field::Department => "department",
            Field::WorkLifeBalance => "work_life_balance",
            Field::JobSatisfaction => "job_satisfaction",
            Field::Feedback => "feedback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SurveySubmission {
    #[validate(length(min = 2, message = "Minimum 2 characters required"))]
    pub employee_name: String,
    #[validate(
        email(message = "Valid email required"),
        custom = "validate_email_domain"
    )]
    pub employee_email: String,
    #[validate(length(min = 2, message = "Department required"))]
    pub department: String,
    #[validate(range(min = 1, max = 5, message = "Rating between 1-5 required"))]
    pub work_life_balance: i32,
    #[validate(range(min = 1, max = 5, message = "Rating between 1-5 required"))]
    pub job_satisfaction: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl SurveySubmission {
    /// Deserializes a raw JSON body and applies the field rules.
    ///
    /// Anything that does not produce a valid submission is a validation
    /// failure. Missing or mistyped fields are reported against the field;
    /// a body that is not a JSON object is reported against `body`. Repeated
    /// keys keep the last value.
    pub fn parse(body: &[u8]) -> Result<Self, SubmissionError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| SubmissionError::from(FieldIssue::body(e.to_string())))?;
        let Value::Object(map) = value else {
            return Err(FieldIssue::body("expected a JSON object").into());
        };

        let mistyped: Vec<FieldIssue> = Field::ALL
            .into_iter()
            .filter(|field| !field.accepts(map.get(field.wire_name())))
            .map(FieldIssue::for_field)
            .collect();
        if !mistyped.is_empty() {
            return Err(SubmissionError::Validation { fields: mistyped });
        }

        let submission: SurveySubmission = serde_json::from_value(Value::Object(map))
            .map_err(|e| SubmissionError::from(FieldIssue::body(e.to_string())))?;
        submission.check()?;
        Ok(submission)
    }

    pub fn check(&self) -> Result<(), SubmissionError> {
        self.validate().map_err(SubmissionError::from)
    }
}

/// Requires a dotted domain ending in an alphabetic label of two or more
/// letters, which the plain email rule does not.
fn validate_email_domain(email: &str) -> Result<(), ValidationError> {
    let domain = email.rsplit_once('@').map(|(_, domain)| domain).unwrap_or("");
    let tld = domain.rsplit_once('.').map(|(_, tld)| tld).unwrap_or("");
    if tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return Ok(());
    }
    let mut err = ValidationError::new("email_domain");
    err.message = Some(Cow::Borrowed("Valid email required"));
    Err(err)
}

/// A stored survey response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponse {
    pub id: Uuid,
    pub employee_name: String,
    pub employee_email: String,
    pub department: String,
    pub work_life_balance: i32,
    pub job_satisfaction: i32,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SurveyResponse {
    pub fn from_submission(submission: &SurveySubmission) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_name: submission.employee_name.clone(),
            employee_email: submission.employee_email.clone(),
            department: submission.department.clone(),
            work_life_balance: submission.work_life_balance,
            job_satisfaction: submission.job_satisfaction,
            feedback: submission.feedback.clone(),
            created_at: Utc::now(),
        }
    }
}
