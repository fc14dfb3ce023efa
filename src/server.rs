//! JSON HTTP API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/api/facilities` | Filtered, sorted, paginated facilities |
//! | `GET`  | `/api/facilities/featured` | Featured facilities |
//! | `GET`  | `/api/facilities/{id}` | One facility by id |
//! | `GET`  | `/api/facilities/slug/{slug}` | One facility by slug |
//! | `POST` | `/api/facilities` | Create a facility |
//! | `PUT`  | `/api/facilities/{id}` | Update a facility |
//! | `DELETE` | `/api/facilities/{id}` | Delete a facility |
//! | `GET`  | `/api/facilities/{id}/reviews` | Reviews of a facility |
//! | `POST` | `/api/facilities/{id}/reviews` | Review a facility |
//! | `POST` | `/api/reviews` | Review a facility named in the body |
//! | `GET`  | `/api/cities` | Cities with facility counts |
//! | `GET`  | `/api/cities/{slug}` | City with per-service-type counts |
//! | `GET`  | `/api/cities/{slug}/facilities` | Facilities in a city |
//! | `POST` | `/api/cities` | Create a city |
//! | `GET`  | `/api/resources` | Articles by category and city |
//! | `GET`  | `/api/resources/{slug}` | One article |
//! | `POST` | `/api/resources` | Create an article |
//! | `GET`  | `/api/ai/session` | Start an assistant session |
//! | `GET`  | `/api/ai/session/{sessionId}` | Session history |
//! | `POST` | `/api/ai/chat` | One assistant turn |
//! | `POST` | `/api/quiz/submit` | Record a quiz lead and match facilities |
//! | `PUT`  | `/api/quiz/leads/{id}/contacted` | Mark a lead contacted |
//! | `GET`  | `/api/service-types` | Service type catalog |
//!
//! # Error Contract
//!
//! ```json
//! { "message": "facility not found: 42", "code": "not_found" }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).
//!
//! Query parameters are parsed permissively: values that do not parse are
//! dropped rather than rejected. Request bodies that do not parse are 400s.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use care_directory_core::catalog::{service_types, ServiceTypeInfo};
use care_directory_core::models::{
    ChatSession, City, CityWithServiceCounts, Facility, FacilityPatch, NewCity, NewFacility,
    NewQuizLead, NewResource, NewReview, QuizLead, Resource, Review, ServiceType,
};
use care_directory_core::query::{FacilityFilter, SortKey};
use care_directory_core::store::Store;
use care_directory_core::DirectoryError;

use crate::assistant::{Assistant, ChatReply};
use crate::config::Config;
use crate::llm::{create_model, ChatModel};
use crate::seed::seeded_store;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn Store>,
    assistant: Arc<Assistant>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, assistant: Arc<Assistant>) -> Self {
        Self { store, assistant }
    }
}

/// Starts the HTTP server with the model selected by `[assistant].provider`.
///
/// Seeds a fresh in-memory store, binds to `[server].bind`, and serves until
/// the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let model = create_model(&config.assistant)?;
    run_server_with_model(config, model).await
}

/// Like [`run_server`], but with a caller-supplied chat model.
pub async fn run_server_with_model(
    config: &Config,
    model: Arc<dyn ChatModel>,
) -> anyhow::Result<()> {
    let store: Arc<dyn Store> = seeded_store(&config.seed).await?;
    let assistant = Arc::new(Assistant::new(
        store.clone(),
        model.clone(),
        config.assistant.suggestion_cities.clone(),
    ));
    let app = build_router(AppState::new(store, assistant));

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(
        bind = %config.server.bind,
        assistant = model.name(),
        "care directory listening"
    );
    println!("Care directory listening on http://{}", config.server.bind);

    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route(
            "/api/facilities",
            get(handle_list_facilities).post(handle_create_facility),
        )
        .route("/api/facilities/featured", get(handle_featured))
        .route("/api/facilities/slug/{slug}", get(handle_facility_by_slug))
        .route(
            "/api/facilities/{id}",
            get(handle_facility_by_id)
                .put(handle_update_facility)
                .delete(handle_delete_facility),
        )
        .route(
            "/api/facilities/{id}/reviews",
            get(handle_list_reviews).post(handle_create_facility_review),
        )
        .route("/api/reviews", post(handle_create_review))
        .route("/api/cities", get(handle_cities).post(handle_create_city))
        .route("/api/cities/{slug}", get(handle_city))
        .route("/api/cities/{slug}/facilities", get(handle_city_facilities))
        .route(
            "/api/resources",
            get(handle_resources).post(handle_create_resource),
        )
        .route("/api/resources/{slug}", get(handle_resource))
        .route("/api/ai/session", get(handle_new_session))
        .route("/api/ai/session/{session_id}", get(handle_session))
        .route("/api/ai/chat", post(handle_chat))
        .route("/api/quiz/submit", post(handle_quiz_submit))
        .route("/api/quiz/leads/{id}/contacted", put(handle_lead_contacted))
        .route("/api/service-types", get(handle_service_types))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: String,
}

/// Error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    let message = message.into();
    tracing::error!(error = %message, "request failed");
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message,
    }
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound { .. } => not_found(err.to_string()),
            DirectoryError::Validation(_) => bad_request(err.to_string()),
            DirectoryError::Internal(_) => internal(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DirectoryError>() {
            Some(inner) => inner.clone().into(),
            None => internal(format!("{:#}", err)),
        }
    }
}

type ApiResult<T> = Result<T, AppError>;

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(|e| bad_request(format!("invalid request body: {}", e)))
}

fn parse_id(raw: &str) -> ApiResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| bad_request(format!("invalid id: {}", raw)))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ Facilities ============

/// Raw query string of `GET /api/facilities`.
///
/// Everything arrives as a string and is interpreted by
/// [`FacilityQueryParams::into_filter`], which drops what it cannot parse.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityQueryParams {
    pub city: Option<String>,
    #[serde(rename = "type", alias = "serviceType")]
    pub service_type: Option<String>,
    pub search: Option<String>,
    /// Comma-separated.
    pub amenities: Option<String>,
    pub rating: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl FacilityQueryParams {
    pub fn into_filter(self) -> FacilityFilter {
        FacilityFilter {
            city: non_empty(self.city),
            service_type: self.service_type.and_then(|t| t.parse::<ServiceType>().ok()),
            search: non_empty(self.search),
            amenities: self
                .amenities
                .map(|list| {
                    list.split(',')
                        .map(str::trim)
                        .filter(|a| !a.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            rating: self.rating.and_then(|r| r.trim().parse::<f64>().ok()),
            min_price: self.min_price.and_then(parse_price),
            max_price: self.max_price.and_then(parse_price),
            sort: self.sort.and_then(|s| s.parse::<SortKey>().ok()),
            page: self.page.and_then(|p| p.trim().parse::<usize>().ok()),
            limit: self.limit.and_then(|l| l.trim().parse::<usize>().ok()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_price(raw: String) -> Option<u32> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p > 0.0)
        .map(|p| p.min(u32::MAX as f64) as u32)
}

async fn handle_list_facilities(
    State(state): State<AppState>,
    Query(params): Query<FacilityQueryParams>,
) -> ApiResult<Json<Vec<Facility>>> {
    let filter = params.into_filter();
    let facilities = state.store.list_facilities(&filter).await?;
    tracing::debug!(results = facilities.len(), "facility query");
    Ok(Json(facilities))
}

#[derive(Debug, Deserialize)]
struct LimitParams {
    limit: Option<String>,
}

async fn handle_featured(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> ApiResult<Json<Vec<Facility>>> {
    let limit = params.limit.and_then(|l| l.trim().parse::<usize>().ok());
    Ok(Json(state.store.featured_facilities(limit).await?))
}

async fn handle_facility_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Facility>> {
    let id = parse_id(&id)?;
    state
        .store
        .facility_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("facility not found: {}", id)))
}

async fn handle_facility_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Facility>> {
    state
        .store
        .facility_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("facility not found: {}", slug)))
}

async fn handle_create_facility(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Facility>)> {
    let facility: NewFacility = parse_body(&body)?;
    let created = state.store.create_facility(facility).await?;
    tracing::info!(id = created.id, slug = %created.slug, "facility created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn handle_update_facility(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Facility>> {
    let id = parse_id(&id)?;
    let patch: FacilityPatch = parse_body(&body)?;
    Ok(Json(state.store.update_facility(id, patch).await?))
}

async fn handle_delete_facility(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    if state.store.delete_facility(id).await? {
        tracing::info!(id, "facility deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(format!("facility not found: {}", id)))
    }
}

// ============ Reviews ============

async fn handle_list_reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Review>>> {
    let id = parse_id(&id)?;
    if state.store.facility_by_id(id).await?.is_none() {
        return Err(not_found(format!("facility not found: {}", id)));
    }
    Ok(Json(state.store.reviews_for_facility(id).await?))
}

async fn handle_create_facility_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Review>)> {
    let id = parse_id(&id)?;
    let mut review: NewReview = parse_body(&body)?;
    review.facility_id = id;
    create_review(&state, review).await
}

async fn handle_create_review(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Review>)> {
    let review: NewReview = parse_body(&body)?;
    create_review(&state, review).await
}

async fn create_review(
    state: &AppState,
    review: NewReview,
) -> ApiResult<(StatusCode, Json<Review>)> {
    let created = state.store.create_review(review).await?;
    tracing::info!(
        id = created.id,
        facility_id = created.facility_id,
        rating = created.rating,
        "review created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

// ============ Cities ============

async fn handle_cities(State(state): State<AppState>) -> ApiResult<Json<Vec<City>>> {
    Ok(Json(state.store.cities().await?))
}

async fn handle_city(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<CityWithServiceCounts>> {
    let city = state
        .store
        .city_by_slug(&slug)
        .await?
        .ok_or_else(|| not_found(format!("city not found: {}", slug)))?;
    let facilities = state.store.facilities_by_city(&slug, None).await?;
    Ok(Json(CityWithServiceCounts::new(city, &facilities)))
}

#[derive(Debug, Deserialize)]
struct TypeParams {
    #[serde(rename = "type")]
    service_type: Option<String>,
}

async fn handle_city_facilities(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<TypeParams>,
) -> ApiResult<Json<Vec<Facility>>> {
    let service_type = params
        .service_type
        .and_then(|t| t.parse::<ServiceType>().ok());
    Ok(Json(
        state.store.facilities_by_city(&slug, service_type).await?,
    ))
}

async fn handle_create_city(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<City>)> {
    let city: NewCity = parse_body(&body)?;
    let created = state.store.create_city(city).await?;
    tracing::info!(id = created.id, slug = %created.slug, "city created");
    Ok((StatusCode::CREATED, Json(created)))
}

// ============ Resources ============

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceParams {
    category: Option<String>,
    city_slug: Option<String>,
}

async fn handle_resources(
    State(state): State<AppState>,
    Query(params): Query<ResourceParams>,
) -> ApiResult<Json<Vec<Resource>>> {
    let category = non_empty(params.category);
    let city_slug = non_empty(params.city_slug);
    Ok(Json(
        state
            .store
            .resources(category.as_deref(), city_slug.as_deref())
            .await?,
    ))
}

async fn handle_resource(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Resource>> {
    state
        .store
        .resource_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("resource not found: {}", slug)))
}

async fn handle_create_resource(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Resource>)> {
    let resource: NewResource = parse_body(&body)?;
    let created = state.store.create_resource(resource).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// ============ Assistant ============

async fn handle_new_session(State(state): State<AppState>) -> ApiResult<Json<ChatSession>> {
    Ok(Json(state.assistant.create_session().await?))
}

async fn handle_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<ChatSession>> {
    state
        .assistant
        .session(&session_id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("chat session not found: {}", session_id)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    #[serde(default)]
    session_id: String,
    #[serde(default)]
    message: String,
}

async fn handle_chat(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<ChatReply>> {
    let request: ChatRequest = parse_body(&body)?;
    if request.session_id.trim().is_empty() || request.message.trim().is_empty() {
        return Err(bad_request("sessionId and message are required"));
    }
    let reply = state
        .assistant
        .handle_chat(&request.session_id, &request.message)
        .await?;
    Ok(Json(reply))
}

// ============ Quiz ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuizResponse {
    lead: QuizLead,
    matched_facilities: Vec<Facility>,
}

async fn handle_quiz_submit(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<QuizResponse>)> {
    let lead: NewQuizLead = parse_body(&body)?;
    let lead = state.store.create_quiz_lead(lead).await?;

    let filter = FacilityFilter {
        city: non_empty(lead.location_preference.clone()),
        service_type: lead.care_type.parse::<ServiceType>().ok(),
        ..Default::default()
    };
    let matched_facilities = state.store.list_facilities(&filter).await?;
    tracing::info!(
        id = lead.id,
        care_type = %lead.care_type,
        matches = matched_facilities.len(),
        "quiz lead recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(QuizResponse {
            lead,
            matched_facilities,
        }),
    ))
}

async fn handle_lead_contacted(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<QuizLead>> {
    let id = parse_id(&id)?;
    Ok(Json(state.store.mark_lead_contacted(id).await?))
}

// ============ Catalog ============

async fn handle_service_types() -> Json<Vec<ServiceTypeInfo>> {
    Json(service_types())
}
