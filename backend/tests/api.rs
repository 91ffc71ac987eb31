use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use backend::access::{Claims, TokenVerifier};
use backend::orchestrator::Orchestrator;
use backend::services;
use backend::state::AppState;
use backend::store::memory::MemoryDocuments;
use backend::store::sqlite::SqliteStore;
use backend::store::DirectoryStore;
use backend::uploads::LocalUploads;
use chrono::Utc;
use common::requests::{CreateLecturerRequest, CreateStudentRequest, CreateUserRequest};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tempfile::TempDir;
use uuid::Uuid;

const SECRET: &str = "integration-secret";
const BOUNDARY: &str = "----achievement-boundary";

struct Harness {
    state: web::Data<AppState>,
    verifier: web::Data<TokenVerifier>,
    _uploads: TempDir,
    admin: String,
    student: String,
    lecturer: String,
}

async fn account(store: &SqliteStore, name: &str, role: &str) -> (Uuid, Uuid) {
    let role_id = store
        .list_roles()
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.name == role)
        .unwrap()
        .id;
    let user = store
        .create_user(&CreateUserRequest {
            username: name.into(),
            email: format!("{name}@campus.test"),
            full_name: name.into(),
            password_hash: "hash".into(),
            role_id,
        })
        .await
        .unwrap();
    (user.id, role_id)
}

async fn token(store: &SqliteStore, user_id: Uuid, role_id: Uuid, role: &str) -> String {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        user_id,
        role_id,
        role_name: role.into(),
        permissions: store.role_permissions(role_id).await.unwrap(),
        exp: now + 3600,
        iat: now,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

async fn harness() -> Harness {
    let sqlite = SqliteStore::open_in_memory().unwrap();
    let uploads = tempfile::tempdir().unwrap();

    let (admin_id, admin_role) = account(&sqlite, "root", "admin").await;
    let (lecturer_id, lecturer_role) = account(&sqlite, "dosen", "lecturer").await;
    let (student_id, student_role) = account(&sqlite, "ana", "student").await;

    let advisor = sqlite
        .create_lecturer(&CreateLecturerRequest {
            user_id: lecturer_id,
            lecturer_id: "NIP-001".into(),
            department: "Informatics".into(),
        })
        .await
        .unwrap();
    sqlite
        .create_student(&CreateStudentRequest {
            user_id: student_id,
            student_id: "NIM-001".into(),
            program_study: "Informatics".into(),
            academic_year: "2023".into(),
            advisor_id: Some(advisor.id),
        })
        .await
        .unwrap();

    let directory: Arc<dyn DirectoryStore> = Arc::new(sqlite.clone());
    let orchestrator = Orchestrator::new(
        Arc::new(sqlite.clone()),
        Arc::new(MemoryDocuments::new()),
        directory.clone(),
        Arc::new(LocalUploads::new(uploads.path(), "/uploads")),
    );

    Harness {
        admin: token(&sqlite, admin_id, admin_role, "admin").await,
        student: token(&sqlite, student_id, student_role, "student").await,
        lecturer: token(&sqlite, lecturer_id, lecturer_role, "lecturer").await,
        state: web::Data::new(AppState {
            orchestrator,
            directory,
            max_upload_bytes: 1024,
        }),
        verifier: web::Data::new(TokenVerifier::new(SECRET)),
        _uploads: uploads,
    }
}

macro_rules! app {
    ($h:expr) => {
        test::init_service(
            App::new()
                .app_data($h.state.clone())
                .app_data($h.verifier.clone())
                .configure(services::configure),
        )
        .await
    };
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

fn certificate() -> Value {
    json!({
        "achievementType": "certification",
        "title": "Cloud Practitioner",
        "description": "Vendor certification",
        "details": { "certificationName": "CCP", "issuedBy": "Vendor" },
        "tags": ["cloud"],
        "points": 15
    })
}

fn multipart(file_name: &str, bytes: &str) -> String {
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n{bytes}\r\n--{BOUNDARY}--\r\n"
    )
}

#[actix_web::test]
async fn create_submit_reject_then_resubmit_is_refused() {
    let h = harness().await;
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/v1/achievements")
        .insert_header(bearer(&h.student))
        .set_json(certificate())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["status"], "draft");
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/achievements/{id}/submit"))
        .insert_header(bearer(&h.student))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "submitted");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/achievements/{id}/reject"))
        .insert_header(bearer(&h.lecturer))
        .set_json(json!({ "note": "   " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/achievements/{id}/reject"))
        .insert_header(bearer(&h.lecturer))
        .set_json(json!({ "note": "Certificate number does not match" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/achievements/{id}/submit"))
        .insert_header(bearer(&h.student))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/achievements/{id}"))
        .insert_header(bearer(&h.student))
        .to_request();
    let detail: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(detail["status"], "rejected");
    assert_eq!(detail["rejectionNote"], "Certificate number does not match");
    assert_eq!(detail["details"]["title"], "Cloud Practitioner");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/achievements/{id}/history"))
        .insert_header(bearer(&h.student))
        .to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    let stages: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["status"].as_str().unwrap())
        .collect();
    assert_eq!(stages, ["created", "submitted", "rejected"]);
    assert_eq!(history[2]["note"], "Certificate number does not match");
}

#[actix_web::test]
async fn empty_list_is_an_empty_array() {
    let h = harness().await;
    let app = app!(h);

    let req = test::TestRequest::get()
        .uri("/api/v1/achievements")
        .insert_header(bearer(&h.student))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(body.as_ref(), b"[]");
}

#[actix_web::test]
async fn list_filters_by_status() {
    let h = harness().await;
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/v1/achievements")
        .insert_header(bearer(&h.student))
        .set_json(certificate())
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_str().unwrap().to_string();
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/achievements/{id}/submit"))
        .insert_header(bearer(&h.student))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/v1/achievements")
        .insert_header(bearer(&h.student))
        .set_json(certificate())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri("/api/v1/achievements?status=submitted")
        .insert_header(bearer(&h.lecturer))
        .to_request();
    let submitted: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(submitted.as_array().unwrap().len(), 1);
    assert_eq!(submitted[0]["type"], "certification");

    let req = test::TestRequest::get()
        .uri("/api/v1/achievements?status=archived")
        .insert_header(bearer(&h.admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn missing_or_bad_token_is_unauthorized() {
    let h = harness().await;
    let app = app!(h);

    let req = test::TestRequest::get().uri("/api/v1/achievements").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());

    let req = test::TestRequest::get()
        .uri("/api/v1/achievements")
        .insert_header(bearer("not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn wrong_role_is_forbidden() {
    let h = harness().await;
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/v1/achievements")
        .insert_header(bearer(&h.lecturer))
        .set_json(certificate())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/v1/achievements")
        .insert_header(bearer(&h.student))
        .set_json(certificate())
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/achievements/{id}/verify"))
        .insert_header(bearer(&h.student))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/api/v1/users")
        .insert_header(bearer(&h.student))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn malformed_ids_are_bad_requests() {
    let h = harness().await;
    let app = app!(h);

    let req = test::TestRequest::get()
        .uri("/api/v1/achievements/not-a-uuid")
        .insert_header(bearer(&h.admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/achievements/{}", Uuid::new_v4()))
        .insert_header(bearer(&h.admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn attachment_upload_is_recorded_on_the_draft() {
    let h = harness().await;
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/v1/achievements")
        .insert_header(bearer(&h.student))
        .set_json(certificate())
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/achievements/{id}/attachments"))
        .insert_header(bearer(&h.student))
        .insert_header((
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart("certificate.pdf", "%PDF-1.4 sample"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "File uploaded successfully");
    assert_eq!(body["data"]["fileName"], "certificate.pdf");
    assert_eq!(body["data"]["fileType"], "application/pdf");
    assert!(body["data"]["fileUrl"].as_str().unwrap().starts_with("/uploads/"));

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/achievements/{id}"))
        .insert_header(bearer(&h.student))
        .to_request();
    let detail: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(detail["details"]["attachments"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn oversized_or_missing_files_are_refused() {
    let h = harness().await;
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/v1/achievements")
        .insert_header(bearer(&h.student))
        .set_json(certificate())
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/achievements/{id}/attachments"))
        .insert_header(bearer(&h.student))
        .insert_header((
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart("huge.pdf", &"x".repeat(4096)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let empty = format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n");
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/achievements/{id}/attachments"))
        .insert_header(bearer(&h.student))
        .insert_header((
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(empty)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "No file uploaded");
}

#[actix_web::test]
async fn profile_reports_role_and_permissions() {
    let h = harness().await;
    let app = app!(h);

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/profile")
        .insert_header(bearer(&h.lecturer))
        .to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile["username"], "dosen");
    assert_eq!(profile["role"], "lecturer");
    let permissions = profile["permissions"].as_array().unwrap();
    assert!(permissions.iter().any(|p| p == "achievement:verify"));
}

#[actix_web::test]
async fn admin_manages_accounts_and_advisors() {
    let h = harness().await;
    let app = app!(h);

    let req = test::TestRequest::get()
        .uri("/api/v1/roles")
        .insert_header(bearer(&h.admin))
        .to_request();
    let roles: Value = test::call_and_read_body_json(&app, req).await;
    let student_role = roles
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["name"] == "student")
        .unwrap()["id"]
        .clone();

    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .insert_header(bearer(&h.admin))
        .set_json(json!({
            "username": "citra",
            "email": "citra@campus.test",
            "fullName": "Citra",
            "passwordHash": "hash",
            "roleId": student_role,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: Value = test::read_body_json(resp).await;
    assert!(user.get("passwordHash").is_none());
    let user_id = user["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/v1/students")
        .insert_header(bearer(&h.admin))
        .set_json(json!({
            "userId": user_id,
            "studentId": "NIM-002",
            "programStudy": "Informatics",
            "academicYear": "2024",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let student: Value = test::read_body_json(resp).await;
    let student_id = student["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/v1/lecturers")
        .insert_header(bearer(&h.admin))
        .to_request();
    let lecturers: Value = test::call_and_read_body_json(&app, req).await;
    let lecturer_id = lecturers[0]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/students/{student_id}/advisor"))
        .insert_header(bearer(&h.admin))
        .set_json(json!({ "lecturerId": lecturer_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/lecturers/{lecturer_id}/advisees"))
        .insert_header(bearer(&h.admin))
        .to_request();
    let advisees: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(advisees.as_array().unwrap().len(), 2);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/users/{user_id}"))
        .insert_header(bearer(&h.admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/users/{user_id}"))
        .insert_header(bearer(&h.admin))
        .to_request();
    let user: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(user["isActive"], false);
}

#[actix_web::test]
async fn duplicate_username_is_a_bad_request() {
    let h = harness().await;
    let app = app!(h);

    let req = test::TestRequest::get()
        .uri("/api/v1/roles")
        .insert_header(bearer(&h.admin))
        .to_request();
    let roles: Value = test::call_and_read_body_json(&app, req).await;
    let any_role = roles[0]["id"].clone();

    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .insert_header(bearer(&h.admin))
        .set_json(json!({
            "username": "ana",
            "email": "another@campus.test",
            "fullName": "Another Ana",
            "passwordHash": "hash",
            "roleId": any_role,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "A user with this username or email already exists");
}
