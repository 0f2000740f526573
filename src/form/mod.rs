//! Client side of the survey: transient form input, the same field rules the
//! server applies, and the HTTP submission.

pub mod client;

use crate::domain::models::{Field, SurveySubmission};
use crate::error::SubmissionError;
use std::collections::BTreeMap;

pub use client::{SubmitOutcome, SurveyClient};

/// Field messages keyed by field, in form order, plus an optional message
/// about the form as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", render(.fields, .form))]
pub struct FormErrors {
    fields: BTreeMap<Field, String>,
    form: Option<String>,
}

impl FormErrors {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn form(&self) -> Option<&str> {
        self.form.as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.fields
            .iter()
            .map(|(field, message)| (*field, message.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len() + usize::from(self.form.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    /// Folds the result of the shared rule check into the form errors.
    fn absorb(&mut self, checked: Result<(), SubmissionError>) {
        match checked {
            Ok(()) => {}
            Err(SubmissionError::Validation { fields }) => {
                for issue in fields {
                    match Field::from_name(&issue.field) {
                        Some(field) => self.insert(field, issue.message),
                        None => {
                            self.form.get_or_insert(issue.message);
                        }
                    }
                }
            }
            Err(other) => {
                tracing::warn!("Unexpected form check failure: {}", other);
                self.form.get_or_insert_with(|| other.to_string());
            }
        }
    }
}

fn render(fields: &BTreeMap<Field, String>, form: &Option<String>) -> String {
    form.iter()
        .cloned()
        .chain(
            fields
                .iter()
                .map(|(field, message)| format!("{}: {}", field.label(), message)),
        )
        .collect::<Vec<_>>()
        .join("; ")
}

/// Raw text typed into each field. Nothing is kept once the form is dropped.
#[derive(Debug, Clone, Default)]
pub struct SurveyForm {
    values: BTreeMap<Field, String>,
}

impl SurveyForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn value(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    /// Applies the server's rules. Ratings that are not whole numbers get the
    /// rating message; empty feedback is left out.
    pub fn validate(&self) -> Result<SurveySubmission, FormErrors> {
        let mut errors = FormErrors::default();

        let work_life_balance = self.rating(Field::WorkLifeBalance, &mut errors);
        let job_satisfaction = self.rating(Field::JobSatisfaction, &mut errors);
        let feedback = Some(self.value(Field::Feedback))
            .filter(|text| !text.trim().is_empty())
            .map(str::to_string);

        let submission = SurveySubmission {
            employee_name: self.value(Field::EmployeeName).to_string(),
            employee_email: self.value(Field::EmployeeEmail).to_string(),
            department: self.value(Field::Department).to_string(),
            work_life_balance,
            job_satisfaction,
            feedback,
        };

        errors.absorb(submission.check());

        if errors.is_empty() {
            Ok(submission)
        } else {
            Err(errors)
        }
    }

    /// Validates, then posts. Nothing is sent when a field is invalid.
    pub async fn submit(&self, client: &SurveyClient) -> Result<SubmitOutcome, FormErrors> {
        let submission = self.validate()?;
        Ok(client.submit(&submission).await)
    }

    fn rating(&self, field: Field, errors: &mut FormErrors) -> i32 {
        match self.value(field).trim().parse::<i32>() {
            Ok(value) => value,
            Err(_) => {
                if let Some(message) = field.message() {
                    errors.insert(field, message);
                }
                0
            }
        }
    }
}

/// Checks a single field as it is typed, independent of the others.
pub fn validate_field(field: Field, raw: &str) -> Result<(), String> {
    match SurveyForm::new().with(field, raw).validate() {
        Ok(_) => Ok(()),
        Err(errors) => match errors.get(field) {
            Some(message) => Err(message.to_string()),
            None => Ok(()),
        },
    }
}
