use actix_web::http::header;
use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;

use crate::auth::Session;
use crate::submission::models::{
    CreateSubmissionRequest, DocumentLog, ListQuery, RejectRequest, ReviewRequest, Submission,
    SubmissionPage,
};
use crate::submission::service::SubmissionError;
use crate::{AppState, ErrorResponse};

/// Map a service error onto an HTTP response with an [`ErrorResponse`] body.
pub fn error_response(e: &SubmissionError) -> HttpResponse {
    match e {
        SubmissionError::Validation(errors) => HttpResponse::BadRequest()
            .json(ErrorResponse::validation(&e.to_string(), errors.errors().to_vec())),
        SubmissionError::InvalidScenario(_) => {
            HttpResponse::BadRequest().json(ErrorResponse::new("InvalidScenario", &e.to_string()))
        }
        SubmissionError::InvalidStateTransition(_) => HttpResponse::Conflict()
            .json(ErrorResponse::new("InvalidStateTransition", &e.to_string())),
        SubmissionError::Generation(_) | SubmissionError::GenerationTimeout(_) => {
            log::error!("Document generation failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "GenerationFailed",
                "Dokumen gagal dibuat, silakan coba lagi beberapa saat lagi",
            ))
        }
        SubmissionError::Storage(_) => {
            log::error!("Storage failure: {}", e);
            HttpResponse::BadGateway().json(ErrorResponse::new("StorageError", &e.to_string()))
        }
        SubmissionError::NotFound(_) => {
            HttpResponse::NotFound().json(ErrorResponse::not_found(&e.to_string()))
        }
        SubmissionError::Forbidden(_) => {
            HttpResponse::Forbidden().json(ErrorResponse::new("Forbidden", &e.to_string()))
        }
        SubmissionError::Repository(_) => {
            log::error!("Repository failure: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Terjadi kesalahan pada server"))
        }
    }
}

fn pdf_response(filename: &str, bytes: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(bytes)
}

#[utoipa::path(
    post,
    path = "/api/submissions",
    tag = "Submission",
    request_body = CreateSubmissionRequest,
    responses(
        (status = 201, description = "Submission created", body = Submission),
        (status = 400, description = "Invalid data or scenario", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_submission(
    state: web::Data<AppState>,
    session: Session,
    body: web::Json<CreateSubmissionRequest>,
) -> impl Responder {
    match state.service.create(&session, body.into_inner()).await {
        Ok(submission) => HttpResponse::Created().json(submission),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    get,
    path = "/api/submissions",
    tag = "Submission",
    params(ListQuery),
    responses(
        (status = 200, description = "Submissions, newest first", body = SubmissionPage)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_submissions(
    state: web::Data<AppState>,
    session: Session,
    query: web::Query<ListQuery>,
) -> impl Responder {
    match state.service.list(&session, &query).await {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    get,
    path = "/api/submissions/{id}",
    tag = "Submission",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission found", body = Submission),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_submission(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<Uuid>,
) -> impl Responder {
    match state.service.get(&session, path.into_inner()).await {
        Ok(submission) => HttpResponse::Ok().json(submission),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    post,
    path = "/api/submissions/{id}/submit",
    tag = "Submission",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Draft submitted for review", body = Submission),
        (status = 409, description = "Not a draft", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_submission(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<Uuid>,
) -> impl Responder {
    match state.service.submit(&session, path.into_inner()).await {
        Ok(submission) => HttpResponse::Ok().json(submission),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    post,
    path = "/api/submissions/{id}/verify",
    tag = "Review",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Submission verified", body = Submission),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 409, description = "Invalid state transition", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn verify_submission(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<Uuid>,
    body: Option<web::Json<ReviewRequest>>,
) -> impl Responder {
    let catatan = body.and_then(|b| b.into_inner().catatan);
    match state.service.verify(&session, path.into_inner(), catatan).await {
        Ok(submission) => HttpResponse::Ok().json(submission),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    post,
    path = "/api/submissions/{id}/approve",
    tag = "Review",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Submission approved and document generated", body = Submission),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 409, description = "Invalid state transition", body = ErrorResponse),
        (status = 500, description = "Document generation failed", body = ErrorResponse),
        (status = 502, description = "Document storage failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn approve_submission(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<Uuid>,
    body: Option<web::Json<ReviewRequest>>,
) -> impl Responder {
    let catatan = body.and_then(|b| b.into_inner().catatan);
    match state.service.approve(&session, path.into_inner(), catatan).await {
        Ok(submission) => HttpResponse::Ok().json(submission),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    post,
    path = "/api/submissions/{id}/reject",
    tag = "Review",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Submission rejected", body = Submission),
        (status = 400, description = "Missing reason", body = ErrorResponse),
        (status = 409, description = "Invalid state transition", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn reject_submission(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<Uuid>,
    body: web::Json<RejectRequest>,
) -> impl Responder {
    match state
        .service
        .reject(&session, path.into_inner(), &body.alasan)
        .await
    {
        Ok(submission) => HttpResponse::Ok().json(submission),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    post,
    path = "/api/submissions/{id}/archive",
    tag = "Review",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission archived", body = Submission),
        (status = 409, description = "Invalid state transition", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn archive_submission(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<Uuid>,
) -> impl Responder {
    match state.service.archive(&session, path.into_inner()).await {
        Ok(submission) => HttpResponse::Ok().json(submission),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    get,
    path = "/api/submissions/{id}/preview",
    tag = "Review",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Rendered PDF, nothing stored", content_type = "application/pdf"),
        (status = 400, description = "Scenario does not match heirs", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn preview_submission(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<Uuid>,
) -> impl Responder {
    match state.service.preview(&session, path.into_inner()).await {
        Ok(document) => pdf_response(&document.filename, document.pdf),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    get,
    path = "/api/submissions/{id}/download",
    tag = "Submission",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Approved document", content_type = "application/pdf"),
        (status = 404, description = "No document yet", body = ErrorResponse),
        (status = 502, description = "Document storage failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn download_submission(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<Uuid>,
) -> impl Responder {
    match state.service.download(&session, path.into_inner()).await {
        Ok((filename, bytes)) => pdf_response(&filename, bytes),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    get,
    path = "/api/submissions/{id}/logs",
    tag = "Submission",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Audit log, oldest first", body = Vec<DocumentLog>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_submission_logs(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<Uuid>,
) -> impl Responder {
    match state.service.logs(&session, path.into_inner()).await {
        Ok(logs) => HttpResponse::Ok().json(logs),
        Err(e) => error_response(&e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/submissions")
            .service(
                web::resource("")
                    .route(web::get().to(list_submissions))
                    .route(web::post().to(create_submission)),
            )
            .service(web::resource("/{id}").route(web::get().to(get_submission)))
            .service(web::resource("/{id}/submit").route(web::post().to(submit_submission)))
            .service(web::resource("/{id}/verify").route(web::post().to(verify_submission)))
            .service(web::resource("/{id}/approve").route(web::post().to(approve_submission)))
            .service(web::resource("/{id}/reject").route(web::post().to(reject_submission)))
            .service(web::resource("/{id}/archive").route(web::post().to(archive_submission)))
            .service(web::resource("/{id}/preview").route(web::get().to(preview_submission)))
            .service(web::resource("/{id}/download").route(web::get().to(download_submission)))
            .service(web::resource("/{id}/logs").route(web::get().to(get_submission_logs))),
    );
}
