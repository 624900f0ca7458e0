//! Submission intake and review API tests.
//!
//! Run with: `cargo test -p formwright-api --test submissions_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use helpers::auth::TestUser;
use helpers::{api_path, setup_test_app};
use serde_json::{json, Value};

struct PublishedForm {
    id: String,
    public_id: String,
}

async fn publish_form(client: &TestServer, owner: &TestUser) -> PublishedForm {
    let response = client
        .post(&api_path("/ai/generate-form"))
        .authorization_bearer(&owner.token)
        .json(&json!({ "prompt": "a job application form with a resume upload" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let form = response.json::<Value>()["form"].clone();
    PublishedForm {
        id: form["id"].as_str().unwrap().to_string(),
        public_id: form["public_id"].as_str().unwrap().to_string(),
    }
}

fn responses(entries: Value) -> MultipartForm {
    MultipartForm::new().add_text("responses", entries.to_string())
}

fn valid_entries() -> Value {
    json!([
        { "fieldName": "full_name", "value": "Ada Lovelace" },
        { "fieldName": "email", "value": "ada@example.com" },
        { "fieldName": "age", "value": 36 }
    ])
}

fn pdf(name: &str) -> Part {
    Part::bytes(b"%PDF-1.4 resume".to_vec())
        .file_name(name)
        .mime_type("application/pdf")
}

async fn submit(client: &TestServer, public_id: &str, form: MultipartForm) -> axum_test::TestResponse {
    client
        .post(&api_path(&format!("/submissions/submit/{}", public_id)))
        .multipart(form)
        .await
}

async fn submit_valid(client: &TestServer, public_id: &str) -> String {
    let response = submit(client, public_id, responses(valid_entries())).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["submission_id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_submit_with_file() {
    let app = setup_test_app().await;
    let owner = TestUser::new("Robin");
    let form = publish_form(app.client(), &owner).await;

    let multipart = responses(valid_entries())
        .add_part("files", pdf("resume.pdf"))
        .add_text("fileFields", "resume");

    let response = app
        .client()
        .post(&api_path(&format!("/submissions/submit/{}", form.public_id)))
        .add_header("User-Agent", "integration-test")
        .add_header("X-Real-IP", "198.51.100.7")
        .multipart(multipart)
        .await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["message"], "Form submitted successfully");
    assert_eq!(app.stored_file_count(), 1);

    let submission_id = body["submission_id"].as_str().unwrap();
    let response = app
        .client()
        .get(&api_path(&format!("/submissions/{}", submission_id)))
        .authorization_bearer(&owner.token)
        .await;
    response.assert_status_ok();
    let submission = response.json::<Value>()["submission"].clone();
    assert_eq!(submission["status"], "pending");
    assert_eq!(submission["total_files"], 1);
    assert_eq!(submission["submitter"]["ip"], "198.51.100.7");
    assert_eq!(submission["submitter"]["user_agent"], "integration-test");

    let resume = submission["responses"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["fieldName"] == "resume")
        .expect("resume response")
        .clone();
    assert_eq!(resume["fieldType"], "file");
    assert_eq!(resume["fileReferences"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_submit_missing_required_field() {
    let app = setup_test_app().await;
    let owner = TestUser::new("Robin");
    let form = publish_form(app.client(), &owner).await;

    let response = submit(
        app.client(),
        &form.public_id,
        responses(json!([{ "fieldName": "email", "value": "ada@example.com" }])),
    )
    .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Field 'Full name' is required"
    );
}

#[tokio::test]
async fn test_submit_rule_violation_stores_nothing() {
    let app = setup_test_app().await;
    let owner = TestUser::new("Robin");
    let form = publish_form(app.client(), &owner).await;

    let entries = json!([
        { "fieldName": "full_name", "value": "Ada Lovelace" },
        { "fieldName": "email", "value": "ada@example.com" },
        { "fieldName": "age", "value": 16 }
    ]);
    let response = submit(
        app.client(),
        &form.public_id,
        responses(entries)
            .add_part("files", pdf("resume.pdf"))
            .add_text("fileFields", "resume"),
    )
    .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let listed = app
        .client()
        .get(&api_path(&format!("/submissions/form/{}", form.id)))
        .authorization_bearer(&owner.token)
        .await
        .json::<Value>();
    assert_eq!(listed["total"], 0);
}

#[tokio::test]
async fn test_submit_unknown_field() {
    let app = setup_test_app().await;
    let owner = TestUser::new("Robin");
    let form = publish_form(app.client(), &owner).await;

    let mut entries = valid_entries();
    entries
        .as_array_mut()
        .unwrap()
        .push(json!({ "fieldName": "salary", "value": 100 }));

    let response = submit(app.client(), &form.public_id, responses(entries)).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Unknown field: salary");
}

#[tokio::test]
async fn test_submit_invalid_responses_part() {
    let app = setup_test_app().await;
    let owner = TestUser::new("Robin");
    let form = publish_form(app.client(), &owner).await;

    let response = submit(
        app.client(),
        &form.public_id,
        MultipartForm::new().add_text("responses", "{not json"),
    )
    .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Invalid responses format");

    let response = submit(
        app.client(),
        &form.public_id,
        MultipartForm::new().add_text("other", "value"),
    )
    .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submit_rejects_disallowed_file_type() {
    let app = setup_test_app().await;
    let owner = TestUser::new("Robin");
    let form = publish_form(app.client(), &owner).await;

    let payload = Part::bytes(b"MZ".to_vec())
        .file_name("setup.exe")
        .mime_type("application/x-msdownload");
    let response = submit(
        app.client(),
        &form.public_id,
        responses(valid_entries())
            .add_part("files", payload)
            .add_text("fileFields", "resume"),
    )
    .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(app.stored_file_count(), 0);
}

#[tokio::test]
async fn test_submit_to_missing_or_private_form() {
    let app = setup_test_app().await;
    let owner = TestUser::new("Robin");
    let form = publish_form(app.client(), &owner).await;

    let response = submit(app.client(), "no-such-form", responses(valid_entries())).await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "Form not found");

    app.client()
        .put(&api_path(&format!("/forms/{}", form.id)))
        .authorization_bearer(&owner.token)
        .json(&json!({ "is_public": false }))
        .await
        .assert_status_ok();

    let response = submit(app.client(), &form.public_id, responses(valid_entries())).await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["error"], "This form is not public");
}

#[tokio::test]
async fn test_list_submissions_with_status_filter() {
    let app = setup_test_app().await;
    let owner = TestUser::new("Robin");
    let form = publish_form(app.client(), &owner).await;

    let first = submit_valid(app.client(), &form.public_id).await;
    submit_valid(app.client(), &form.public_id).await;
    submit_valid(app.client(), &form.public_id).await;

    app.client()
        .put(&api_path(&format!("/submissions/{}/status", first)))
        .authorization_bearer(&owner.token)
        .json(&json!({ "status": "approved" }))
        .await
        .assert_status_ok();

    let path = api_path(&format!("/submissions/form/{}", form.id));

    let body = app
        .client()
        .get(&path)
        .add_query_param("limit", 2)
        .authorization_bearer(&owner.token)
        .await
        .json::<Value>();
    assert_eq!(body["total"], 3);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["submissions"].as_array().map(Vec::len), Some(2));

    let body = app
        .client()
        .get(&path)
        .add_query_param("status", "approved")
        .authorization_bearer(&owner.token)
        .await
        .json::<Value>();
    assert_eq!(body["total"], 1);
    assert_eq!(body["submissions"][0]["id"], first.as_str());

    let analytics = app
        .client()
        .get(&api_path(&format!("/forms/{}/analytics", form.id)))
        .authorization_bearer(&owner.token)
        .await
        .json::<Value>();
    assert_eq!(analytics["analytics"]["total_submissions"], 3);
    assert_eq!(analytics["analytics"]["recent_submissions"], 3);
}

#[tokio::test]
async fn test_submissions_are_owner_only() {
    let app = setup_test_app().await;
    let owner = TestUser::new("Robin");
    let other = TestUser::new("Sam");
    let form = publish_form(app.client(), &owner).await;
    let submission_id = submit_valid(app.client(), &form.public_id).await;

    app.client()
        .get(&api_path(&format!("/submissions/form/{}", form.id)))
        .authorization_bearer(&other.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let response = app
        .client()
        .get(&api_path(&format!("/submissions/{}", submission_id)))
        .authorization_bearer(&other.token)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["error"], "Access denied");

    app.client()
        .delete(&api_path(&format!("/submissions/{}", submission_id)))
        .authorization_bearer(&other.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let response = app
        .client()
        .get(&api_path(&format!("/submissions/{}", uuid::Uuid::new_v4())))
        .authorization_bearer(&owner.token)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "Submission not found");
}

#[tokio::test]
async fn test_update_submission_status() {
    let app = setup_test_app().await;
    let owner = TestUser::new("Robin");
    let form = publish_form(app.client(), &owner).await;
    let submission_id = submit_valid(app.client(), &form.public_id).await;
    let path = api_path(&format!("/submissions/{}/status", submission_id));

    let response = app
        .client()
        .put(&path)
        .authorization_bearer(&owner.token)
        .json(&json!({ "status": "rejected", "notes": "Position filled" }))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["message"], "Submission status updated successfully");
    assert_eq!(body["submission"]["status"], "rejected");
    assert_eq!(body["submission"]["notes"], "Position filled");

    app.client()
        .put(&path)
        .authorization_bearer(&owner.token)
        .json(&json!({ "status": "archived" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_submission_removes_files() {
    let app = setup_test_app().await;
    let owner = TestUser::new("Robin");
    let form = publish_form(app.client(), &owner).await;

    let response = submit(
        app.client(),
        &form.public_id,
        responses(valid_entries())
            .add_part("files", pdf("resume.pdf"))
            .add_text("fileFields", "resume"),
    )
    .await;
    response.assert_status(StatusCode::CREATED);
    let submission_id = response.json::<Value>()["submission_id"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(app.stored_file_count(), 1);

    let path = api_path(&format!("/submissions/{}", submission_id));
    let response = app.client().delete(&path).authorization_bearer(&owner.token).await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["message"],
        "Submission deleted successfully"
    );
    assert_eq!(app.stored_file_count(), 0);

    app.client()
        .get(&path)
        .authorization_bearer(&owner.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
