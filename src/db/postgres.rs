use super::{StoreConnection, StoreError, SurveyStore};
use crate::domain::models::{Field, SurveyResponse, SurveySubmission};
use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool, Postgres};
use uuid::Uuid;

#[derive(Clone)]
pub struct PgSurveyStore {
    pool: PgPool,
}

impl PgSurveyStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl SurveyStore for PgSurveyStore {
    async fn acquire(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
        let conn = self.pool.acquire().await?;
        Ok(Box::new(PgHandle { conn }))
    }
}

/// Pooled connection; goes back to the pool on drop.
struct PgHandle {
    conn: PoolConnection<Postgres>,
}

#[async_trait]
impl StoreConnection for PgHandle {
    async fn find_by_email(&mut self, email: &str) -> Result<Option<SurveyResponse>, StoreError> {
        find_response_by_email(&mut self.conn, email).await
    }

    async fn insert(&mut self, submission: &SurveySubmission) -> Result<SurveyResponse, StoreError> {
        insert_response(&mut self.conn, submission).await
    }
}

pub async fn find_response_by_email(
    conn: &mut PgConnection,
    email: &str,
) -> Result<Option<SurveyResponse>, StoreError> {
    let response = sqlx::query_as::<_, SurveyResponse>(
        r#"
        SELECT
            id,
            employee_name,
            employee_email,
            department,
            work_life_balance,
            job_satisfaction,
            feedback,
            created_at
        FROM survey_responses
        WHERE employee_email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(conn)
    .await?;
    Ok(response)
}

pub async fn insert_response(
    conn: &mut PgConnection,
    submission: &SurveySubmission,
) -> Result<SurveyResponse, StoreError> {
    sqlx::query_as::<_, SurveyResponse>(
        r#"
        INSERT INTO survey_responses
            (id, employee_name, employee_email, department, work_life_balance, job_satisfaction, feedback)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING
            id,
            employee_name,
            employee_email,
            department,
            work_life_balance,
            job_satisfaction,
            feedback,
            created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&submission.employee_name)
    .bind(&submission.employee_email)
    .bind(&submission.department)
    .bind(submission.work_life_balance)
    .bind(submission.job_satisfaction)
    .bind(&submission.feedback)
    .fetch_one(conn)
    .await
    .map_err(classify_write_error)
}

fn classify_write_error(err: sqlx::Error) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            let field = constraint_field(db_err.constraint());
            return StoreError::UniqueViolation { field };
        }
    }
    StoreError::Database(err)
}

fn constraint_field(constraint: Option<&str>) -> String {
    match constraint {
        Some(name) if !name.contains("email") => name.to_string(),
        _ => Field::EmployeeEmail.wire_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_field() {
        assert_eq!(
            constraint_field(Some("survey_responses_employee_email_key")),
            "employeeEmail"
        );
        assert_eq!(constraint_field(None), "employeeEmail");
        assert_eq!(constraint_field(Some("survey_responses_pkey")), "survey_responses_pkey");
    }

    #[test]
    fn test_non_database_errors_stay_unknown() {
        let err = classify_write_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
    }
}
