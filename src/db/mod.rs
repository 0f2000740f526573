pub mod memory;
pub mod postgres;

use crate::domain::models::{SurveyResponse, SurveySubmission};
use async_trait::async_trait;

pub use memory::MemoryStore;
pub use postgres::PgSurveyStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated on {field}")]
    UniqueViolation { field: String },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Source of per-request storage handles.
#[async_trait]
pub trait SurveyStore: Send + Sync {
    /// The returned handle is released when dropped.
    async fn acquire(&self) -> Result<Box<dyn StoreConnection>, StoreError>;
}

#[async_trait]
pub trait StoreConnection: Send {
    async fn find_by_email(&mut self, email: &str) -> Result<Option<SurveyResponse>, StoreError>;

    /// Fails with `StoreError::UniqueViolation` when the email is already stored.
    async fn insert(&mut self, submission: &SurveySubmission) -> Result<SurveyResponse, StoreError>;
}
