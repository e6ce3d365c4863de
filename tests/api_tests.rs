mod common;

use actix_web::{http::StatusCode, test, web, App};
use common::{admin, budi_request, test_app, warga};
use serde_json::{json, Value};
use sitalaris_server::auth::{generate_access_token, Session};
use sitalaris_server::{configure_api, ErrorResponse};

fn bearer(session: &Session) -> (&'static str, String) {
    (
        "Authorization",
        format!("Bearer {}", generate_access_token(session).unwrap()),
    )
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(configure_api),
        )
        .await
    };
}

#[actix_web::test]
async fn test_requests_without_token_are_unauthorized() {
    let app = test_app();
    let service = init_app!(app.state.clone());

    let req = test::TestRequest::get().uri("/api/submissions").to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_full_review_flow_over_http() {
    let app = test_app();
    let service = init_app!(app.state.clone());

    let req = test::TestRequest::post()
        .uri("/api/submissions")
        .insert_header(bearer(&warga()))
        .set_json(budi_request())
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["status"], "SUBMITTED");
    assert_eq!(created["kondisi"], 1);

    let req = test::TestRequest::post()
        .uri(&format!("/api/submissions/{}/verify", id))
        .insert_header(bearer(&admin()))
        .set_json(json!({ "catatan": "Berkas lengkap" }))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri(&format!("/api/submissions/{}/approve", id))
        .insert_header(bearer(&admin()))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let approved: Value = test::read_body_json(resp).await;
    assert_eq!(approved["status"], "APPROVED");
    assert!(approved["dokumen"]["url"].as_str().unwrap().ends_with(".pdf"));

    let req = test::TestRequest::get()
        .uri(&format!("/api/submissions/{}/download", id))
        .insert_header(bearer(&warga()))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/pdf"
    );
    let body = test::read_body(resp).await;
    assert!(body.starts_with(b"%PDF"));

    let req = test::TestRequest::post()
        .uri(&format!("/api/submissions/{}/submit", id))
        .insert_header(bearer(&warga()))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/submissions/{}/logs", id))
        .insert_header(bearer(&warga()))
        .to_request();
    let logs: Vec<Value> = test::call_and_read_body_json(&service, req).await;
    let actions: Vec<&str> = logs.iter().filter_map(|l| l["action"].as_str()).collect();
    assert!(actions.starts_with(&["CREATED", "SUBMITTED", "VERIFIED", "APPROVED"]));
    assert!(actions.contains(&"DOWNLOADED"));
}

#[actix_web::test]
async fn test_validation_errors_list_fields() {
    let app = test_app();
    let service = init_app!(app.state.clone());

    let mut request = budi_request();
    request.pewaris.nomor_akta_kematian = String::new();
    request.ahli_waris[1].nik = "123".to_string();

    let req = test::TestRequest::post()
        .uri("/api/submissions")
        .insert_header(bearer(&warga()))
        .set_json(request)
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "ValidationError");
    let fields: Vec<String> = body
        .fields
        .unwrap_or_default()
        .into_iter()
        .map(|f| f.field)
        .collect();
    assert!(fields.contains(&"pewaris.nomor_akta_kematian".to_string()));
    assert!(fields.contains(&"ahli_waris[1].nik".to_string()));
}

#[actix_web::test]
async fn test_invalid_scenario_is_bad_request() {
    let app = test_app();
    let service = init_app!(app.state.clone());

    let mut request = budi_request();
    request.kondisi = 9;

    let req = test::TestRequest::post()
        .uri("/api/submissions")
        .insert_header(bearer(&warga()))
        .set_json(request)
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "InvalidScenario");
    assert!(body.fields.is_none());
}

#[actix_web::test]
async fn test_citizen_cannot_verify() {
    let app = test_app();
    let created = app.state.service.create(&warga(), budi_request()).await.unwrap();
    let service = init_app!(app.state.clone());

    let req = test::TestRequest::post()
        .uri(&format!("/api/submissions/{}/verify", created.id))
        .insert_header(bearer(&warga()))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_unknown_submission_is_not_found() {
    let app = test_app();
    let service = init_app!(app.state.clone());

    let req = test::TestRequest::get()
        .uri(&format!("/api/submissions/{}", uuid::Uuid::new_v4()))
        .insert_header(bearer(&admin()))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_malformed_json_uses_error_body() {
    let app = test_app();
    let service = init_app!(app.state.clone());

    let req = test::TestRequest::post()
        .uri("/api/submissions")
        .insert_header(bearer(&warga()))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"pewaris\": ")
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "BadRequest");
}
