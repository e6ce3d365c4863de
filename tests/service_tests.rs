mod common;

use common::{
    admin, budi_request, other_warga, settle, test_app, test_app_with, warga, MockObjectStorage,
    RecordingMailer, SentEmail, SlowGenerator,
};
use sitalaris_server::submission::models::{ListQuery, LogAction, SubmissionStatus};
use sitalaris_server::submission::number::is_valid_nomor_surat;
use sitalaris_server::submission::state::InvalidStateTransitionError;
use sitalaris_server::submission::SubmissionError;
use sitalaris_server::surat::{AhliWarisGenerator, InvalidScenarioError};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[tokio::test]
async fn test_create_assigns_number_and_logs() {
    let app = test_app();
    let created = app.state.service.create(&warga(), budi_request()).await.unwrap();

    assert!(is_valid_nomor_surat(&created.nomor_surat), "{}", created.nomor_surat);
    assert_eq!(created.status, SubmissionStatus::Submitted);
    assert_eq!(created.owner.user_id, "warga-1");

    let logs = app.state.service.logs(&warga(), created.id).await.unwrap();
    let actions: Vec<LogAction> = logs.iter().map(|l| l.action).collect();
    assert_eq!(actions, vec![LogAction::Created, LogAction::Submitted]);
}

#[tokio::test]
async fn test_same_day_numbers_differ() {
    let app = test_app();
    let first = app.state.service.create(&warga(), budi_request()).await.unwrap();
    let second = app.state.service.create(&warga(), budi_request()).await.unwrap();
    assert_ne!(first.nomor_surat, second.nomor_surat);
}

#[tokio::test]
async fn test_create_rejects_invalid_fields() {
    let app = test_app();
    let mut request = budi_request();
    request.pewaris.nama = "  ".to_string();
    request.pewaris.tanggal_meninggal = "20-11-2024".to_string();

    match app.state.service.create(&warga(), request).await {
        Err(SubmissionError::Validation(errors)) => {
            assert!(errors.has_field("pewaris.nama"));
            assert!(errors.has_field("pewaris.tanggal_meninggal"));
        }
        other => panic!("expected validation error, got {:?}", other.map(|s| s.id)),
    }
}

#[tokio::test]
async fn test_create_rejects_mismatched_scenario() {
    let app = test_app();
    let mut request = budi_request();
    request.kondisi = 5;

    let err = app.state.service.create(&warga(), request).await.unwrap_err();
    assert!(matches!(
        err,
        SubmissionError::InvalidScenario(InvalidScenarioError::MissingRole { code: 5, .. })
    ));
}

#[tokio::test]
async fn test_draft_then_submit() {
    let app = test_app();
    let mut request = budi_request();
    request.draft = true;
    let draft = app.state.service.create(&warga(), request).await.unwrap();
    assert_eq!(draft.status, SubmissionStatus::Draft);

    let err = app.state.service.submit(&other_warga(), draft.id).await.unwrap_err();
    assert!(matches!(err, SubmissionError::Forbidden(_)));

    let submitted = app.state.service.submit(&warga(), draft.id).await.unwrap();
    assert_eq!(submitted.status, SubmissionStatus::Submitted);
}

#[tokio::test]
async fn test_verify_then_approve_produces_document() {
    let app = test_app();
    let created = app.state.service.create(&warga(), budi_request()).await.unwrap();

    let verified = app
        .state
        .service
        .verify(&admin(), created.id, Some("Berkas lengkap".to_string()))
        .await
        .unwrap();
    assert_eq!(verified.status, SubmissionStatus::Verified);
    assert_eq!(verified.reviewed_by.as_deref(), Some("admin-1"));

    let approved = app.state.service.approve(&admin(), created.id, None).await.unwrap();
    assert_eq!(approved.status, SubmissionStatus::Approved);
    let dokumen = approved.dokumen.expect("document reference");
    assert_eq!(
        dokumen.filename,
        format!("surat-pernyataan-{}.pdf", created.nomor_surat)
    );
    assert_eq!(dokumen.download_count, 0);
    assert!(app.storage.has_file(&dokumen.filename).await);

    settle().await;
    let sent = app.mailer.sent.lock().await.clone();
    assert_eq!(
        sent,
        vec![SentEmail::Approval {
            to: "siti@example.com".to_string(),
            attachment: dokumen.filename.clone(),
        }]
    );
    let logs = app.state.service.logs(&admin(), created.id).await.unwrap();
    assert!(logs.iter().any(|l| l.action == LogAction::EmailSent));
}

#[tokio::test]
async fn test_approved_cannot_return_to_submitted() {
    let app = test_app();
    let created = app.state.service.create(&warga(), budi_request()).await.unwrap();
    app.state.service.verify(&admin(), created.id, None).await.unwrap();
    app.state.service.approve(&admin(), created.id, None).await.unwrap();

    let err = app.state.service.submit(&warga(), created.id).await.unwrap_err();
    match err {
        SubmissionError::InvalidStateTransition(InvalidStateTransitionError { from, to }) => {
            assert_eq!(from, SubmissionStatus::Approved);
            assert_eq!(to, SubmissionStatus::Submitted);
        }
        other => panic!("expected state transition error, got {:?}", other),
    }

    let stored = app.state.service.get(&warga(), created.id).await.unwrap();
    assert_eq!(stored.status, SubmissionStatus::Approved);
}

#[tokio::test]
async fn test_approve_requires_verification_and_admin() {
    let app = test_app();
    let created = app.state.service.create(&warga(), budi_request()).await.unwrap();

    let err = app.state.service.approve(&admin(), created.id, None).await.unwrap_err();
    assert!(matches!(err, SubmissionError::InvalidStateTransition(_)));

    let err = app.state.service.verify(&warga(), created.id, None).await.unwrap_err();
    assert!(matches!(err, SubmissionError::Forbidden(_)));
    assert_eq!(app.storage.upload_count(), 0);
}

#[tokio::test]
async fn test_email_failure_keeps_approval() {
    let app = test_app_with(
        MockObjectStorage::new(),
        RecordingMailer::new_failing(),
        Arc::new(AhliWarisGenerator::new("Jakarta", "Cakung Barat")),
        Duration::from_secs(30),
    );
    let created = app.state.service.create(&warga(), budi_request()).await.unwrap();
    app.state.service.verify(&admin(), created.id, None).await.unwrap();
    let approved = app.state.service.approve(&admin(), created.id, None).await.unwrap();
    assert_eq!(approved.status, SubmissionStatus::Approved);

    settle().await;
    let stored = app.state.service.get(&admin(), created.id).await.unwrap();
    assert_eq!(stored.status, SubmissionStatus::Approved);
    let logs = app.state.service.logs(&admin(), created.id).await.unwrap();
    let failed = logs
        .iter()
        .find(|l| l.action == LogAction::EmailFailed)
        .expect("EMAIL_FAILED log");
    assert!(failed.detail.contains("smtp down"));
}

#[tokio::test]
async fn test_storage_failure_leaves_status_unchanged() {
    let app = test_app_with(
        MockObjectStorage::new_failing(),
        RecordingMailer::new(),
        Arc::new(AhliWarisGenerator::new("Jakarta", "Cakung Barat")),
        Duration::from_secs(30),
    );
    let created = app.state.service.create(&warga(), budi_request()).await.unwrap();
    app.state.service.verify(&admin(), created.id, None).await.unwrap();

    let err = app.state.service.approve(&admin(), created.id, None).await.unwrap_err();
    assert!(matches!(err, SubmissionError::Storage(_)));

    let stored = app.state.service.get(&admin(), created.id).await.unwrap();
    assert_eq!(stored.status, SubmissionStatus::Verified);
    assert!(stored.dokumen.is_none());
}

#[tokio::test]
async fn test_generation_timeout_leaves_status_unchanged() {
    let app = test_app_with(
        MockObjectStorage::new(),
        RecordingMailer::new(),
        Arc::new(SlowGenerator {
            delay: Duration::from_millis(500),
        }),
        Duration::from_millis(50),
    );
    let created = app.state.service.create(&warga(), budi_request()).await.unwrap();
    app.state.service.verify(&admin(), created.id, None).await.unwrap();

    let err = app.state.service.approve(&admin(), created.id, None).await.unwrap_err();
    assert!(matches!(err, SubmissionError::GenerationTimeout(_)));

    let stored = app.state.service.get(&admin(), created.id).await.unwrap();
    assert_eq!(stored.status, SubmissionStatus::Verified);
    assert_eq!(app.storage.upload_count(), 0);
}

#[tokio::test]
async fn test_concurrent_approvals_commit_once() {
    let app = test_app();
    let created = app.state.service.create(&warga(), budi_request()).await.unwrap();
    app.state.service.verify(&admin(), created.id, None).await.unwrap();

    let admin = admin();
    let (first, second) = tokio::join!(
        app.state.service.approve(&admin, created.id, None),
        app.state.service.approve(&admin, created.id, None)
    );

    let outcomes = [first.is_ok(), second.is_ok()];
    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    let loser = if first.is_err() { first } else { second };
    assert!(matches!(
        loser,
        Err(SubmissionError::InvalidStateTransition(_))
    ));

    let logs = app.state.service.logs(&admin, created.id).await.unwrap();
    assert_eq!(
        logs.iter().filter(|l| l.action == LogAction::Approved).count(),
        1
    );
}

#[tokio::test]
async fn test_reject_requires_reason_and_sends_email() {
    let app = test_app();
    let created = app.state.service.create(&warga(), budi_request()).await.unwrap();

    let err = app.state.service.reject(&admin(), created.id, "   ").await.unwrap_err();
    assert!(matches!(err, SubmissionError::Validation(_)));

    let rejected = app
        .state
        .service
        .reject(&admin(), created.id, "Akta kematian tidak terbaca")
        .await
        .unwrap();
    assert_eq!(rejected.status, SubmissionStatus::Rejected);
    assert_eq!(
        rejected.review_notes.as_deref(),
        Some("Akta kematian tidak terbaca")
    );

    let err = app.state.service.archive(&admin(), created.id).await.unwrap_err();
    assert!(matches!(err, SubmissionError::InvalidStateTransition(_)));

    settle().await;
    let sent = app.mailer.sent.lock().await.clone();
    assert_eq!(
        sent,
        vec![SentEmail::Rejection {
            to: "siti@example.com".to_string(),
            alasan: "Akta kematian tidak terbaca".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_download_counts_and_logs() {
    let app = test_app();
    let created = app.state.service.create(&warga(), budi_request()).await.unwrap();

    let err = app.state.service.download(&warga(), created.id).await.unwrap_err();
    assert!(matches!(err, SubmissionError::NotFound(_)));

    app.state.service.verify(&admin(), created.id, None).await.unwrap();
    app.state.service.approve(&admin(), created.id, None).await.unwrap();

    let (filename, bytes) = app.state.service.download(&warga(), created.id).await.unwrap();
    assert!(filename.ends_with(".pdf"));
    assert!(bytes.starts_with(b"%PDF"));
    app.state.service.download(&warga(), created.id).await.unwrap();

    let err = app.state.service.download(&other_warga(), created.id).await.unwrap_err();
    assert!(matches!(err, SubmissionError::Forbidden(_)));

    let stored = app.state.service.get(&warga(), created.id).await.unwrap();
    assert_eq!(stored.dokumen.unwrap().download_count, 2);
    let logs = app.state.service.logs(&warga(), created.id).await.unwrap();
    assert_eq!(
        logs.iter().filter(|l| l.action == LogAction::Downloaded).count(),
        2
    );

    let archived = app.state.service.archive(&admin(), created.id).await.unwrap();
    assert_eq!(archived.status, SubmissionStatus::Archived);
    assert!(app.state.service.download(&warga(), created.id).await.is_ok());
}

#[tokio::test]
async fn test_preview_is_admin_only_and_stateless() {
    let app = test_app();
    let created = app.state.service.create(&warga(), budi_request()).await.unwrap();

    let err = app.state.service.preview(&warga(), created.id).await.unwrap_err();
    assert!(matches!(err, SubmissionError::Forbidden(_)));

    let document = app.state.service.preview(&admin(), created.id).await.unwrap();
    assert!(document.pdf.starts_with(b"%PDF"));
    assert_eq!(app.storage.upload_count(), 0);

    let stored = app.state.service.get(&admin(), created.id).await.unwrap();
    assert_eq!(stored.status, SubmissionStatus::Submitted);
}

#[tokio::test]
async fn test_list_scopes_to_owner() {
    let app = test_app();
    let mine = app.state.service.create(&warga(), budi_request()).await.unwrap();
    app.state.service.create(&other_warga(), budi_request()).await.unwrap();

    let page = app
        .state
        .service
        .list(&warga(), &ListQuery::default())
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, mine.id);
    assert_eq!((page.page, page.limit), (1, 20));

    let all = app
        .state
        .service
        .list(&admin(), &ListQuery::default())
        .await
        .unwrap();
    assert_eq!(all.items.len(), 2);

    let verified_only = app
        .state
        .service
        .list(
            &admin(),
            &ListQuery {
                status: Some(SubmissionStatus::Verified),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(verified_only.items.is_empty());
}

#[tokio::test]
async fn test_unknown_submission_is_not_found() {
    let app = test_app();
    let err = app.state.service.get(&admin(), Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, SubmissionError::NotFound(_)));
}
