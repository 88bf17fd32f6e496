//! Student repository for database operations
//!
//! Sole owner of the students table. The unique index on `student_number`
//! is the single source of conflict detection; the repository classifies
//! that violation itself and hands callers a typed outcome instead of a
//! store error code.

use sqlx::{PgPool, Row, postgres::PgRow};
use thiserror::Error;
use tracing::info;

use crate::models::student::{
    ProgramCount, StatusCount, StudentPayload, StudentRecord, StudentStatus, StudentSummary,
};

/// Typed outcomes of student persistence operations
#[derive(Debug, Error)]
pub enum StudentStoreError {
    /// Another record already holds this student number
    #[error("Student number already exists.")]
    DuplicateNumber,

    /// No row matched the requested id
    #[error("Student not found")]
    NotFound,

    /// Any other store failure
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

const STUDENT_SELECT: &str = r#"
SELECT id, student_number, first_name, last_name, email,
       COALESCE(contact_number, '') AS contact_number,
       program, year_level, admission_date, status, updated_at
FROM students
"#;

/// Student repository
#[derive(Clone)]
pub struct StudentRepository {
    pool: PgPool,
}

impl StudentRepository {
    /// Create a new student repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List every student, newest `updated_at` first
    pub async fn list_all(&self) -> Result<Vec<StudentRecord>, StudentStoreError> {
        let sql = format!("{STUDENT_SELECT} ORDER BY updated_at DESC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        Ok(rows.iter().map(record_from_row).collect())
    }

    /// Fetch one student by id
    pub async fn get_by_id(&self, id: i64) -> Result<Option<StudentRecord>, StudentStoreError> {
        let sql = format!("{STUDENT_SELECT} WHERE id = $1");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        Ok(row.as_ref().map(record_from_row))
    }

    /// Insert a validated student and return the generated id
    pub async fn create(&self, payload: &StudentPayload) -> Result<i64, StudentStoreError> {
        info!("Inserting student {}", payload.student_number);

        let row = sqlx::query(
            r#"
            INSERT INTO students (student_number, first_name, last_name, email,
                                  contact_number, program, year_level, admission_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&payload.student_number)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(&payload.email)
        .bind(nullable(&payload.contact_number))
        .bind(&payload.program)
        .bind(payload.year_level)
        .bind(payload.admission_date)
        .bind(payload.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(classify_write_error)?;

        Ok(row.get("id"))
    }

    /// Replace every column of an existing student
    pub async fn update(&self, id: i64, payload: &StudentPayload) -> Result<(), StudentStoreError> {
        info!("Updating student {}", id);

        let result = sqlx::query(
            r#"
            UPDATE students
            SET student_number = $1,
                first_name = $2,
                last_name = $3,
                email = $4,
                contact_number = $5,
                program = $6,
                year_level = $7,
                admission_date = $8,
                status = $9
            WHERE id = $10
            "#,
        )
        .bind(&payload.student_number)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(&payload.email)
        .bind(nullable(&payload.contact_number))
        .bind(&payload.program)
        .bind(payload.year_level)
        .bind(payload.admission_date)
        .bind(payload.status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(classify_write_error)?;

        if result.rows_affected() == 0 {
            return Err(StudentStoreError::NotFound);
        }

        Ok(())
    }

    /// Delete a student by id
    pub async fn delete(&self, id: i64) -> Result<(), StudentStoreError> {
        info!("Deleting student {}", id);

        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StudentStoreError::NotFound);
        }

        Ok(())
    }

    /// Aggregate statistics: total count, per-status breakdown, and the five
    /// most common programs (ties break in store-default order)
    pub async fn summary(&self) -> Result<StudentSummary, StudentStoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
            .fetch_one(&self.pool)
            .await?;

        let status_rows =
            sqlx::query("SELECT status, COUNT(*) AS count FROM students GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        let program_rows = sqlx::query(
            r#"
            SELECT program, COUNT(*) AS count
            FROM students
            GROUP BY program
            ORDER BY count DESC
            LIMIT 5
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(StudentSummary {
            total,
            status_breakdown: status_rows
                .into_iter()
                .map(|row| StatusCount {
                    status: row.get("status"),
                    count: row.get("count"),
                })
                .collect(),
            top_programs: program_rows
                .into_iter()
                .map(|row| ProgramCount {
                    program: row.get("program"),
                    count: row.get("count"),
                })
                .collect(),
        })
    }
}

/// Empty contact numbers are stored as NULL
fn nullable(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

fn classify_write_error(err: sqlx::Error) -> StudentStoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return StudentStoreError::DuplicateNumber;
        }
    }
    StudentStoreError::Database(err)
}

fn record_from_row(row: &PgRow) -> StudentRecord {
    StudentRecord {
        id: row.get("id"),
        student_number: row.get("student_number"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        contact_number: row.get("contact_number"),
        program: row.get("program"),
        year_level: row.get("year_level"),
        admission_date: row.get("admission_date"),
        status: StudentStatus::coerce(row.get::<&str, _>("status")),
        updated_at: row.get("updated_at"),
    }
}
