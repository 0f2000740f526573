use super::{StoreConnection, StoreError, SurveyStore};
use crate::domain::models::{Field, SurveyResponse, SurveySubmission};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-process store with the same email uniqueness rule as the database table.
/// Nothing survives a restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<Vec<SurveyResponse>>>,
    open_handles: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<SurveyResponse> {
        self.records.read().await.clone()
    }

    pub async fn count_by_email(&self, email: &str) -> usize {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.employee_email == email)
            .count()
    }

    /// Handles acquired and not yet dropped.
    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SurveyStore for MemoryStore {
    async fn acquire(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
        self.open_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryHandle {
            records: self.records.clone(),
            open_handles: self.open_handles.clone(),
        }))
    }
}

struct MemoryHandle {
    records: Arc<RwLock<Vec<SurveyResponse>>>,
    open_handles: Arc<AtomicUsize>,
}

impl Drop for MemoryHandle {
    fn drop(&mut self) {
        self.open_handles.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl StoreConnection for MemoryHandle {
    async fn find_by_email(&mut self, email: &str) -> Result<Option<SurveyResponse>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.employee_email == email).cloned())
    }

    async fn insert(&mut self, submission: &SurveySubmission) -> Result<SurveyResponse, StoreError> {
        let mut records = self.records.write().await;
        if records
            .iter()
            .any(|r| r.employee_email == submission.employee_email)
        {
            return Err(StoreError::UniqueViolation {
                field: Field::EmployeeEmail.wire_name().to_string(),
            });
        }
        let record = SurveyResponse::from_submission(submission);
        records.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(email: &str) -> SurveySubmission {
        SurveySubmission {
            employee_name: "Jo".into(),
            employee_email: email.into(),
            department: "IT".into(),
            work_life_balance: 3,
            job_satisfaction: 4,
            feedback: None,
        }
    }

    #[tokio::test]
    async fn test_insert_enforces_unique_email() {
        let store = MemoryStore::new();
        let mut conn = store.acquire().await.unwrap();

        let stored = conn.insert(&submission("jo@x.com")).await.unwrap();
        assert_eq!(stored.employee_email, "jo@x.com");

        let err = conn.insert(&submission("jo@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { ref field } if field == "employeeEmail"));

        conn.insert(&submission("ann@x.com")).await.unwrap();
        assert_eq!(store.count_by_email("jo@x.com").await, 1);
        assert_eq!(store.records().await.len(), 2);
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let store = MemoryStore::new();
        let mut conn = store.acquire().await.unwrap();
        assert!(conn.find_by_email("jo@x.com").await.unwrap().is_none());

        conn.insert(&submission("jo@x.com")).await.unwrap();
        let found = conn.find_by_email("jo@x.com").await.unwrap().unwrap();
        assert_eq!(found.department, "IT");
    }

    #[tokio::test]
    async fn test_handles_released_on_drop() {
        let store = MemoryStore::new();
        let first = store.acquire().await.unwrap();
        let second = store.acquire().await.unwrap();
        assert_eq!(store.open_handles(), 2);

        drop(first);
        assert_eq!(store.open_handles(), 1);
        drop(second);
        assert_eq!(store.open_handles(), 0);
    }
}
