use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{
    Answer, AnswerSubmission, PatternId, QuestionAnswer, QuestionAnswerDraft, QuestionAnswerId,
    QuestionDraft, QuestionId, ResultPattern, ResultPatternDraft, UserId,
};
use super::service::{
    AdminService, AdminServiceError, SubmittedAnswer, SurveyService, SurveyServiceError,
};
use super::store::{CatalogStore, StoreError, SurveyStore};

/// Shared handler state bundling the two service facades.
pub struct SurveyApi<S> {
    pub survey: Arc<SurveyService<S>>,
    pub admin: Arc<AdminService<S>>,
}

impl<S> Clone for SurveyApi<S> {
    fn clone(&self) -> Self {
        Self {
            survey: Arc::clone(&self.survey),
            admin: Arc::clone(&self.admin),
        }
    }
}

/// Router builder exposing the survey and admin-console endpoints.
pub fn survey_router<S>(api: SurveyApi<S>) -> Router
where
    S: SurveyStore + CatalogStore + 'static,
{
    Router::new()
        .route("/api/v1/survey/questions", get(questions_handler::<S>))
        .route("/api/v1/survey/answers", post(submit_answer_handler::<S>))
        .route("/api/v1/survey/result", post(resolve_result_handler::<S>))
        .route("/api/v1/survey/results", get(tally_handler::<S>))
        .route("/api/v1/admin/questions", post(create_question_handler::<S>))
        .route(
            "/api/v1/admin/questions/:question_id",
            put(update_question_handler::<S>).delete(delete_question_handler::<S>),
        )
        .route(
            "/api/v1/admin/question-answers",
            post(create_question_answer_handler::<S>),
        )
        .route(
            "/api/v1/admin/question-answers/:question_answer_id",
            put(update_question_answer_handler::<S>).delete(delete_question_answer_handler::<S>),
        )
        .route(
            "/api/v1/admin/result-patterns",
            post(create_result_pattern_handler::<S>),
        )
        .route(
            "/api/v1/admin/result-patterns/:pattern_id",
            put(update_result_pattern_handler::<S>).delete(delete_result_pattern_handler::<S>),
        )
        .with_state(api)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResolveResultRequest {
    pub(crate) answers: Vec<Answer>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResolveResultResponse {
    pub(crate) pattern: Option<ResultPattern>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmittedAnswerView {
    pub(crate) answer: Answer,
    pub(crate) feedback: Option<QuestionAnswer>,
}

fn actor_from_headers(headers: &HeaderMap) -> Result<UserId, Response> {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(|value| UserId(value.to_string()))
        .ok_or_else(|| {
            let payload = json!({ "error": "x-user-id header required" });
            (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
        })
}

fn store_error_response(error: &StoreError) -> Response {
    let status = match error {
        StoreError::NotFound => StatusCode::NOT_FOUND,
        StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn survey_error_response(error: SurveyServiceError) -> Response {
    match error {
        SurveyServiceError::Store(inner) => store_error_response(&inner),
        other @ (SurveyServiceError::UnknownQuestion(_)
        | SurveyServiceError::IllegalOption { .. }) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}

fn admin_error_response(error: AdminServiceError) -> Response {
    match error {
        AdminServiceError::AccessDenied => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::FORBIDDEN, axum::Json(payload)).into_response()
        }
        AdminServiceError::Validation(inner) => {
            let payload = json!({ "error": inner.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        AdminServiceError::Store(inner) => store_error_response(&inner),
    }
}

pub(crate) async fn questions_handler<S>(State(api): State<SurveyApi<S>>) -> Response
where
    S: SurveyStore + CatalogStore + 'static,
{
    match api.survey.questions() {
        Ok(questions) => (StatusCode::OK, axum::Json(questions)).into_response(),
        Err(error) => survey_error_response(error),
    }
}

pub(crate) async fn submit_answer_handler<S>(
    State(api): State<SurveyApi<S>>,
    axum::Json(submission): axum::Json<AnswerSubmission>,
) -> Response
where
    S: SurveyStore + CatalogStore + 'static,
{
    match api.survey.submit_answer(submission) {
        Ok(SubmittedAnswer { answer, feedback }) => {
            let view = SubmittedAnswerView { answer, feedback };
            (StatusCode::CREATED, axum::Json(view)).into_response()
        }
        Err(error) => survey_error_response(error),
    }
}

/// Final evaluation over the answer set the client accumulated locally.
/// A missing pattern is the neutral completion outcome, not an error.
pub(crate) async fn resolve_result_handler<S>(
    State(api): State<SurveyApi<S>>,
    axum::Json(request): axum::Json<ResolveResultRequest>,
) -> Response
where
    S: SurveyStore + CatalogStore + 'static,
{
    match api.survey.resolve_result(&request.answers) {
        Ok(pattern) => {
            (StatusCode::OK, axum::Json(ResolveResultResponse { pattern })).into_response()
        }
        Err(error) => survey_error_response(error),
    }
}

pub(crate) async fn tally_handler<S>(State(api): State<SurveyApi<S>>) -> Response
where
    S: SurveyStore + CatalogStore + 'static,
{
    match api.survey.tally() {
        Ok(tallies) => (StatusCode::OK, axum::Json(tallies)).into_response(),
        Err(error) => survey_error_response(error),
    }
}

pub(crate) async fn create_question_handler<S>(
    State(api): State<SurveyApi<S>>,
    headers: HeaderMap,
    axum::Json(draft): axum::Json<QuestionDraft>,
) -> Response
where
    S: SurveyStore + CatalogStore + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match api.admin.create_question(&actor, draft) {
        Ok(question) => (StatusCode::CREATED, axum::Json(question)).into_response(),
        Err(error) => admin_error_response(error),
    }
}

pub(crate) async fn update_question_handler<S>(
    State(api): State<SurveyApi<S>>,
    Path(question_id): Path<String>,
    headers: HeaderMap,
    axum::Json(draft): axum::Json<QuestionDraft>,
) -> Response
where
    S: SurveyStore + CatalogStore + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match api
        .admin
        .update_question(&actor, &QuestionId(question_id), draft)
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => admin_error_response(error),
    }
}

pub(crate) async fn delete_question_handler<S>(
    State(api): State<SurveyApi<S>>,
    Path(question_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: SurveyStore + CatalogStore + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match api.admin.delete_question(&actor, &QuestionId(question_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => admin_error_response(error),
    }
}

pub(crate) async fn create_question_answer_handler<S>(
    State(api): State<SurveyApi<S>>,
    headers: HeaderMap,
    axum::Json(draft): axum::Json<QuestionAnswerDraft>,
) -> Response
where
    S: SurveyStore + CatalogStore + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match api.admin.create_question_answer(&actor, draft) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => admin_error_response(error),
    }
}

pub(crate) async fn update_question_answer_handler<S>(
    State(api): State<SurveyApi<S>>,
    Path(question_answer_id): Path<String>,
    headers: HeaderMap,
    axum::Json(draft): axum::Json<QuestionAnswerDraft>,
) -> Response
where
    S: SurveyStore + CatalogStore + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match api.admin.update_question_answer(
        &actor,
        &QuestionAnswerId(question_answer_id),
        draft,
    ) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => admin_error_response(error),
    }
}

pub(crate) async fn delete_question_answer_handler<S>(
    State(api): State<SurveyApi<S>>,
    Path(question_answer_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: SurveyStore + CatalogStore + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match api
        .admin
        .delete_question_answer(&actor, &QuestionAnswerId(question_answer_id))
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => admin_error_response(error),
    }
}

pub(crate) async fn create_result_pattern_handler<S>(
    State(api): State<SurveyApi<S>>,
    headers: HeaderMap,
    axum::Json(draft): axum::Json<ResultPatternDraft>,
) -> Response
where
    S: SurveyStore + CatalogStore + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match api.admin.create_result_pattern(&actor, draft) {
        Ok(pattern) => (StatusCode::CREATED, axum::Json(pattern)).into_response(),
        Err(error) => admin_error_response(error),
    }
}

pub(crate) async fn update_result_pattern_handler<S>(
    State(api): State<SurveyApi<S>>,
    Path(pattern_id): Path<String>,
    headers: HeaderMap,
    axum::Json(draft): axum::Json<ResultPatternDraft>,
) -> Response
where
    S: SurveyStore + CatalogStore + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match api
        .admin
        .update_result_pattern(&actor, &PatternId(pattern_id), draft)
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => admin_error_response(error),
    }
}

pub(crate) async fn delete_result_pattern_handler<S>(
    State(api): State<SurveyApi<S>>,
    Path(pattern_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: SurveyStore + CatalogStore + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match api
        .admin
        .delete_result_pattern(&actor, &PatternId(pattern_id))
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => admin_error_response(error),
    }
}
