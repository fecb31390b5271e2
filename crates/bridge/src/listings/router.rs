use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ListingId, ListingInput, SearchWordId, UserId};
use super::identity::{optional_caller, resolve_caller, IdentityError};
use super::repository::{ListingStore, RepositoryError};
use super::service::{DeleteOutcome, ListingService, ListingServiceError};
use crate::clock::Clock;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FieldParams {
    pub field: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterRequest {
    pub field: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Router builder exposing the listing operations over HTTP.
pub fn listing_router<S, C>(service: Arc<ListingService<S, C>>) -> Router
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route(
            "/api/v1/projects",
            post(create_handler::<S, C>).get(all_handler::<S, C>),
        )
        .route(
            "/api/v1/projects/:listing_id",
            get(detail_handler::<S, C>)
                .put(update_handler::<S, C>)
                .delete(delete_handler::<S, C>),
        )
        .route(
            "/api/v1/projects/:listing_id/close",
            post(close_handler::<S, C>),
        )
        .route(
            "/api/v1/projects/:listing_id/apply",
            post(apply_handler::<S, C>).delete(cancel_apply_handler::<S, C>),
        )
        .route(
            "/api/v1/projects/:listing_id/applicants",
            get(applicants_handler::<S, C>),
        )
        .route(
            "/api/v1/projects/:listing_id/applicants/:user_id/accept",
            post(accept_handler::<S, C>),
        )
        .route(
            "/api/v1/projects/:listing_id/applicants/:user_id/reject",
            post(reject_handler::<S, C>),
        )
        .route(
            "/api/v1/projects/:listing_id/scrap",
            post(scrap_handler::<S, C>),
        )
        .route(
            "/api/v1/me/applications",
            get(my_applications_handler::<S, C>),
        )
        .route("/api/v1/me/projects", get(my_projects_handler::<S, C>))
        .route("/api/v1/me/searches", get(my_searches_handler::<S, C>))
        .route(
            "/api/v1/me/searches/:search_word_id",
            delete(delete_search_handler::<S, C>),
        )
        .route("/api/v1/search/projects", get(search_handler::<S, C>))
        .route("/api/v1/search/filter", post(filter_handler::<S, C>))
        .route("/api/v1/rankings/top", get(top_handler::<S, C>))
        .route("/api/v1/rankings/imminent", get(imminent_handler::<S, C>))
        .with_state(service)
}

type SharedService<S, C> = State<Arc<ListingService<S, C>>>;

pub(crate) fn error_response(error: ListingServiceError) -> Response {
    let status = match &error {
        error if error.is_not_found() => StatusCode::NOT_FOUND,
        ListingServiceError::AlreadyApplied { .. }
        | ListingServiceError::AlreadyClosed(_)
        | ListingServiceError::StageLocked { .. }
        | ListingServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ListingServiceError::Recruitment(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn unauthorized(error: IdentityError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
}

fn forbidden(message: &str) -> Response {
    let payload = json!({ "error": message });
    (StatusCode::FORBIDDEN, axum::Json(payload)).into_response()
}

fn json_ok<T: serde::Serialize>(result: Result<T, ListingServiceError>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, axum::Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    axum::Json(input): axum::Json<ListingInput>,
) -> Response
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    let caller = match resolve_caller(&headers) {
        Ok(caller) => caller,
        Err(error) => return unauthorized(error),
    };
    match service.create(caller, input) {
        Ok(id) => (StatusCode::CREATED, axum::Json(json!({ "listing_id": id }))).into_response(),
        Err(rejected) => {
            let payload = json!({ "error": rejected.to_string() });
            (StatusCode::NOT_ACCEPTABLE, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn all_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
) -> Response
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    match optional_caller(&headers) {
        Ok(caller) => json_ok(service.all_projects(caller)),
        Err(error) => unauthorized(error),
    }
}

pub(crate) async fn detail_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    Path(listing_id): Path<u64>,
) -> Response
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    match resolve_caller(&headers) {
        Ok(caller) => json_ok(service.get(caller, ListingId(listing_id))),
        Err(error) => unauthorized(error),
    }
}

pub(crate) async fn update_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    Path(listing_id): Path<u64>,
    axum::Json(input): axum::Json<ListingInput>,
) -> Response
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    let listing_id = ListingId(listing_id);
    if let Some(response) = owner_gate(&service, &headers, listing_id) {
        return response;
    }
    json_ok(service.update(listing_id, input))
}

pub(crate) async fn delete_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    Path(listing_id): Path<u64>,
) -> Response
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    let caller = match resolve_caller(&headers) {
        Ok(caller) => caller,
        Err(error) => return unauthorized(error),
    };
    match service.delete(ListingId(listing_id), caller) {
        Ok(DeleteOutcome::Deleted) => {
            (StatusCode::ACCEPTED, axum::Json(json!({ "deleted": true }))).into_response()
        }
        Ok(DeleteOutcome::NotOwner) => forbidden("only the listing owner can delete it"),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn close_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    Path(listing_id): Path<u64>,
) -> Response
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    let listing_id = ListingId(listing_id);
    if let Some(response) = owner_gate(&service, &headers, listing_id) {
        return response;
    }
    json_ok(service.close(listing_id))
}

pub(crate) async fn apply_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    Path(listing_id): Path<u64>,
) -> Response
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    let caller = match resolve_caller(&headers) {
        Ok(caller) => caller,
        Err(error) => return unauthorized(error),
    };
    match service.apply(caller, ListingId(listing_id)) {
        Ok(_) => (StatusCode::OK, axum::Json(json!({ "applied": true }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cancel_apply_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    Path(listing_id): Path<u64>,
) -> Response
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    let caller = match resolve_caller(&headers) {
        Ok(caller) => caller,
        Err(error) => return unauthorized(error),
    };
    match service.cancel_apply(caller, ListingId(listing_id)) {
        Ok(()) => (StatusCode::OK, axum::Json(json!({ "cancelled": true }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn applicants_handler<S, C>(
    State(service): SharedService<S, C>,
    Path(listing_id): Path<u64>,
) -> Response
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    json_ok(service.list_applicants(ListingId(listing_id)))
}

pub(crate) async fn accept_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    Path((listing_id, user_id)): Path<(u64, u64)>,
) -> Response
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    let listing_id = ListingId(listing_id);
    if let Some(response) = owner_gate(&service, &headers, listing_id) {
        return response;
    }
    json_ok(service.accept_apply(listing_id, UserId(user_id)))
}

pub(crate) async fn reject_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    Path((listing_id, user_id)): Path<(u64, u64)>,
) -> Response
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    let listing_id = ListingId(listing_id);
    if let Some(response) = owner_gate(&service, &headers, listing_id) {
        return response;
    }
    json_ok(service.reject_apply(listing_id, UserId(user_id)))
}

pub(crate) async fn scrap_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    Path(listing_id): Path<u64>,
) -> Response
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    match resolve_caller(&headers) {
        Ok(caller) => json_ok(service.scrap(caller, ListingId(listing_id))),
        Err(error) => unauthorized(error),
    }
}

pub(crate) async fn my_applications_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
) -> Response
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    match resolve_caller(&headers) {
        Ok(caller) => json_ok(service.list_my_applications(caller)),
        Err(error) => unauthorized(error),
    }
}

pub(crate) async fn my_projects_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    Query(params): Query<FieldParams>,
) -> Response
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    let caller = match resolve_caller(&headers) {
        Ok(caller) => caller,
        Err(error) => return unauthorized(error),
    };
    match params.field {
        Some(field) => json_ok(service.list_by_owner_and_field(caller, &field)),
        None => json_ok(service.list_by_owner(caller)),
    }
}

pub(crate) async fn search_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Response
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    match optional_caller(&headers) {
        Ok(caller) => json_ok(service.search(caller, &params.q)),
        Err(error) => unauthorized(error),
    }
}

pub(crate) async fn my_searches_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
) -> Response
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    match resolve_caller(&headers) {
        Ok(caller) => json_ok(service.recent_searches(caller)),
        Err(error) => unauthorized(error),
    }
}

pub(crate) async fn delete_search_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    Path(search_word_id): Path<u64>,
) -> Response
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    let caller = match resolve_caller(&headers) {
        Ok(caller) => caller,
        Err(error) => return unauthorized(error),
    };
    match service.delete_search(caller, SearchWordId(search_word_id)) {
        Ok(()) => (StatusCode::OK, axum::Json(json!({ "deleted": true }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn filter_handler<S, C>(
    State(service): SharedService<S, C>,
    axum::Json(request): axum::Json<FilterRequest>,
) -> Response
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    json_ok(service.filter(&request.field, &request.skills))
}

pub(crate) async fn top_handler<S, C>(State(service): SharedService<S, C>) -> Response
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    json_ok(service.top_projects())
}

pub(crate) async fn imminent_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
) -> Response
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    match resolve_caller(&headers) {
        Ok(caller) => json_ok(service.imminent_projects(caller)),
        Err(error) => unauthorized(error),
    }
}

/// `Some(response)` when the caller cannot act as the listing owner.
fn owner_gate<S, C>(
    service: &ListingService<S, C>,
    headers: &HeaderMap,
    listing_id: ListingId,
) -> Option<Response>
where
    S: ListingStore + 'static,
    C: Clock + 'static,
{
    let caller = match resolve_caller(headers) {
        Ok(caller) => caller,
        Err(error) => return Some(unauthorized(error)),
    };
    match service.is_owner(caller, listing_id) {
        Ok(true) => None,
        Ok(false) => Some(forbidden("only the listing owner can manage it")),
        Err(error) => Some(error_response(error)),
    }
}
