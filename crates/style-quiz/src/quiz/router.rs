use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::content::{ContentError, ContentSource};
use super::domain::Choice;
use super::service::{QuizService, QuizServiceError};
use super::session::ContactInfo;
use super::store::ResultStore;

/// Router builder exposing the session lifecycle over HTTP.
pub fn quiz_router<C, S>(service: Arc<QuizService<C, S>>) -> Router
where
    C: ContentSource + 'static,
    S: ResultStore + 'static,
{
    Router::new()
        .route("/api/v1/quiz/sessions", post(create_session_handler::<C, S>))
        .route(
            "/api/v1/quiz/sessions/:session_id",
            get(snapshot_handler::<C, S>),
        )
        .route(
            "/api/v1/quiz/sessions/:session_id/start",
            post(start_handler::<C, S>),
        )
        .route(
            "/api/v1/quiz/sessions/:session_id/choices",
            post(choice_handler::<C, S>),
        )
        .route(
            "/api/v1/quiz/sessions/:session_id/submit",
            post(submit_handler::<C, S>),
        )
        .route(
            "/api/v1/quiz/sessions/:session_id/restart",
            post(restart_handler::<C, S>),
        )
        .route(
            "/api/v1/quiz/sessions/:session_id/results",
            get(results_handler::<C, S>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateSessionRequest {
    pub(crate) client: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChoiceRequest {
    pub(crate) choice: Choice,
}

pub(crate) async fn create_session_handler<C, S>(
    State(service): State<Arc<QuizService<C, S>>>,
    axum::Json(request): axum::Json<CreateSessionRequest>,
) -> Response
where
    C: ContentSource + 'static,
    S: ResultStore + 'static,
{
    match service.create_session(&request.client) {
        Ok(snapshot) => (StatusCode::CREATED, axum::Json(snapshot)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn snapshot_handler<C, S>(
    State(service): State<Arc<QuizService<C, S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    C: ContentSource + 'static,
    S: ResultStore + 'static,
{
    match service.snapshot(&session_id) {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn start_handler<C, S>(
    State(service): State<Arc<QuizService<C, S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    C: ContentSource + 'static,
    S: ResultStore + 'static,
{
    match service.start(&session_id) {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn choice_handler<C, S>(
    State(service): State<Arc<QuizService<C, S>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<ChoiceRequest>,
) -> Response
where
    C: ContentSource + 'static,
    S: ResultStore + 'static,
{
    match service.choose(&session_id, request.choice) {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_handler<C, S>(
    State(service): State<Arc<QuizService<C, S>>>,
    Path(session_id): Path<String>,
    axum::Json(contact): axum::Json<ContactInfo>,
) -> Response
where
    C: ContentSource + 'static,
    S: ResultStore + 'static,
{
    match service.submit(&session_id, contact) {
        Ok(results) => (StatusCode::OK, axum::Json(results)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn restart_handler<C, S>(
    State(service): State<Arc<QuizService<C, S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    C: ContentSource + 'static,
    S: ResultStore + 'static,
{
    match service.restart(&session_id) {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn results_handler<C, S>(
    State(service): State<Arc<QuizService<C, S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    C: ContentSource + 'static,
    S: ResultStore + 'static,
{
    match service.results(&session_id) {
        Ok(results) => (StatusCode::OK, axum::Json(results)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: QuizServiceError) -> Response {
    let status = match &err {
        QuizServiceError::Content(ContentError::ClientNotFound { .. })
        | QuizServiceError::Content(ContentError::NoQuestions)
        | QuizServiceError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        QuizServiceError::Content(ContentError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
        QuizServiceError::Session(_) | QuizServiceError::ResultsNotReady => StatusCode::CONFLICT,
    };

    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
