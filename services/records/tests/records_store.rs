//! Integration tests against a live PostgreSQL database
//!
//! These exercise the repositories and the identity resolver end to end.
//! They skip quietly when `DATABASE_URL` is not set, so the suite stays
//! green on machines without the infrastructure running. Test rows use
//! UUID-based natural keys to avoid colliding with existing data.

use std::time::Duration;

use common::database::{DatabaseConfig, init_pool};
use records::identity::{self, LoginOutcome, RegisterOutcome};
use records::models::student::{StudentDraft, StudentStatus};
use records::models::user::Role;
use records::oauth::VerifiedIdentity;
use records::repositories::{StudentRepository, StudentStoreError, UserRepository};
use records::validation::validate_student;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

async fn test_pool() -> Option<PgPool> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("skipping: DATABASE_URL not set");
        return None;
    }

    let config = DatabaseConfig::from_env().expect("database config");
    let pool = init_pool(&config).await.expect("database pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    Some(pool)
}

fn draft(number: &str, program: &str) -> StudentDraft {
    StudentDraft {
        student_number: number.to_string(),
        first_name: "Ana".to_string(),
        last_name: "Reyes".to_string(),
        email: "Ana.Reyes@School.EDU".to_string(),
        contact_number: String::new(),
        program: program.to_string(),
        year_level: json!(2),
        admission_date: "2024-06-01".to_string(),
        status: "enrolled".to_string(),
    }
}

#[tokio::test]
async fn duplicate_student_number_is_a_typed_conflict() {
    let Some(pool) = test_pool().await else { return };
    let students = StudentRepository::new(pool);

    let number = format!("TEST-{}", Uuid::new_v4());
    let payload = validate_student(&draft(&number, "BS Information Technology")).unwrap();

    let id = students.create(&payload).await.expect("first create");

    let second = students.create(&payload).await;
    assert!(
        matches!(second, Err(StudentStoreError::DuplicateNumber)),
        "second create with the same number must conflict"
    );

    students.delete(id).await.expect("cleanup");
}

#[tokio::test]
async fn missing_ids_come_back_as_not_found() {
    let Some(pool) = test_pool().await else { return };
    let students = StudentRepository::new(pool);

    let absent = 999_999_999_999_i64;

    assert!(students.get_by_id(absent).await.expect("get").is_none());
    assert!(matches!(
        students.delete(absent).await,
        Err(StudentStoreError::NotFound)
    ));

    let payload = validate_student(&draft("TEST-unused", "BS Nursing")).unwrap();
    assert!(matches!(
        students.update(absent, &payload).await,
        Err(StudentStoreError::NotFound)
    ));
}

#[tokio::test]
async fn create_fetch_update_roundtrip_replaces_every_field() {
    let Some(pool) = test_pool().await else { return };
    let students = StudentRepository::new(pool);

    let number = format!("TEST-{}", Uuid::new_v4());
    let payload = validate_student(&draft(&number, "BS Computer Science")).unwrap();
    let id = students.create(&payload).await.expect("create");

    let stored = students
        .get_by_id(id)
        .await
        .expect("get")
        .expect("student exists");
    assert_eq!(stored.student_number, number);
    assert_eq!(stored.email, "ana.reyes@school.edu");
    assert_eq!(stored.contact_number, "");
    assert_eq!(stored.status, StudentStatus::Enrolled);

    let mut replacement = draft(&number, "BS Mathematics");
    replacement.first_name = "Bianca".to_string();
    replacement.contact_number = "0917 555 0101".to_string();
    replacement.year_level = json!(3);
    replacement.status = "leave".to_string();
    let replacement = validate_student(&replacement).unwrap();

    students.update(id, &replacement).await.expect("update");

    let updated = students
        .get_by_id(id)
        .await
        .expect("get")
        .expect("student exists");
    assert_eq!(updated.first_name, "Bianca");
    assert_eq!(updated.program, "BS Mathematics");
    assert_eq!(updated.contact_number, "0917 555 0101");
    assert_eq!(updated.year_level, 3);
    assert_eq!(updated.status, StudentStatus::Leave);
    assert!(
        updated.updated_at > stored.updated_at,
        "the store must refresh updated_at on mutation"
    );

    students.delete(id).await.expect("cleanup");
}

#[tokio::test]
async fn listing_orders_by_newest_update_first() {
    let Some(pool) = test_pool().await else { return };
    let students = StudentRepository::new(pool);

    let first_number = format!("TEST-{}", Uuid::new_v4());
    let second_number = format!("TEST-{}", Uuid::new_v4());

    let first_payload = validate_student(&draft(&first_number, "BS Biology")).unwrap();
    let first_id = students.create(&first_payload).await.expect("create");

    tokio::time::sleep(Duration::from_millis(20)).await;
    let second_payload = validate_student(&draft(&second_number, "BS Biology")).unwrap();
    let second_id = students.create(&second_payload).await.expect("create");

    // Touching the first record moves it back to the top
    tokio::time::sleep(Duration::from_millis(20)).await;
    students.update(first_id, &first_payload).await.expect("update");

    let all = students.list_all().await.expect("list");
    let pos = |id: i64| all.iter().position(|s| s.id == id).expect("listed");
    assert!(
        pos(first_id) < pos(second_id),
        "most recently updated record must come first"
    );

    students.delete(first_id).await.expect("cleanup");
    students.delete(second_id).await.expect("cleanup");
}

#[tokio::test]
async fn summary_stays_consistent_with_the_table() {
    let Some(pool) = test_pool().await else { return };
    let students = StudentRepository::new(pool.clone());

    let before = students.summary().await.expect("summary");
    let breakdown_total: i64 = before.status_breakdown.iter().map(|s| s.count).sum();
    assert_eq!(
        breakdown_total, before.total,
        "status breakdown must cover every record"
    );
    assert!(before.top_programs.len() <= 5);

    let number = format!("TEST-{}", Uuid::new_v4());
    let payload = validate_student(&draft(&number, "BS Astronomy")).unwrap();
    let id = students.create(&payload).await.expect("create");

    let after = students.summary().await.expect("summary");
    assert_eq!(after.total, before.total + 1);

    students.delete(id).await.expect("cleanup");
}

#[tokio::test]
async fn registration_rejects_taken_usernames() {
    let Some(pool) = test_pool().await else { return };
    let users = UserRepository::new(pool);

    let username = format!("registrar-{}", Uuid::new_v4());

    let first = identity::register(&users, "Carla Santos", &username, "s3cret-pass", Some("registrar"))
        .await
        .expect("register");
    assert_eq!(first, RegisterOutcome::Created);

    let second = identity::register(&users, "Carla Santos", &username, "s3cret-pass", Some("registrar"))
        .await
        .expect("register");
    assert_eq!(second, RegisterOutcome::UsernameTaken);

    let account = users
        .find_by_username(&username)
        .await
        .expect("lookup")
        .expect("account exists");
    assert_eq!(account.role, Role::Registrar);
    assert_ne!(
        account.password_hash, "s3cret-pass",
        "passwords must never be stored in plaintext"
    );
}

#[tokio::test]
async fn unknown_requested_roles_register_as_students() {
    let Some(pool) = test_pool().await else { return };
    let users = UserRepository::new(pool);

    let username = format!("user-{}", Uuid::new_v4());
    identity::register(&users, "Dana Cruz", &username, "s3cret-pass", Some("superuser"))
        .await
        .expect("register");

    let account = users
        .find_by_username(&username)
        .await
        .expect("lookup")
        .expect("account exists");
    assert_eq!(account.role, Role::Student);
}

#[tokio::test]
async fn wrong_password_is_rejected_not_an_error() {
    let Some(pool) = test_pool().await else { return };
    let users = UserRepository::new(pool);

    let username = format!("user-{}", Uuid::new_v4());
    identity::register(&users, "Elena Gomez", &username, "correct-pass", None)
        .await
        .expect("register");

    let outcome = identity::resolve_manual(&users, &username, "wrong-pass")
        .await
        .expect("resolve");
    assert!(matches!(outcome, LoginOutcome::Rejected(_)));

    let outcome = identity::resolve_manual(&users, &username, "correct-pass")
        .await
        .expect("resolve");
    match outcome {
        LoginOutcome::Authenticated(auth) => {
            assert_eq!(auth.full_name, "Elena Gomez");
            assert_eq!(auth.role, Role::Student);
        }
        LoginOutcome::Rejected(message) => panic!("expected authentication, got {message:?}"),
    }
}

#[tokio::test]
async fn unseen_federated_subject_provisions_exactly_one_student_account() {
    let Some(pool) = test_pool().await else { return };
    let users = UserRepository::new(pool.clone());

    let assertion = VerifiedIdentity {
        subject: format!("google-{}", Uuid::new_v4()),
        email: "guest@example.com".to_string(),
        full_name: "Guest User".to_string(),
    };

    let first = identity::resolve_federated(&users, &assertion)
        .await
        .expect("first federated login");
    assert_eq!(first.role, Role::Student);
    assert_eq!(first.full_name, "Guest User");

    let second = identity::resolve_federated(&users, &assertion)
        .await
        .expect("second federated login");
    assert_eq!(second.user_id, first.user_id, "no second account is created");

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE federated_id = $1")
            .bind(&assertion.subject)
            .fetch_one(&pool)
            .await
            .expect("count");
    assert_eq!(count, 1);
}
