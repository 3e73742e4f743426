//! JSON HTTP API over the content index and review intake.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/api/posts?page=&tag=` | One listing page, optionally by tag |
//! | `GET`  | `/api/posts/recent?count=` | Most recent posts |
//! | `GET`  | `/api/posts/{slug}` | Full post with body |
//! | `GET`  | `/api/posts/{slug}/related?count=` | Related posts |
//! | `GET`  | `/api/tags?distinct=` | Tag table, or sorted tag names with `distinct=true` |
//! | `GET`  | `/api/tags/{tag}` | Posts with an exact tag |
//! | `GET`  | `/api/reviews?bbl=` | Reviews for a building |
//! | `POST` | `/api/reviews` | Submit a review |
//! | `POST` | `/api/leads` | Submit a service lead |
//! | `GET`  | `/api/services` | Service and location catalog |
//! | `GET`  | `/api/services/{service}/{location}` | One landing-page combination |
//! | `GET`  | `/sitemap.xml` | Sitemap |
//! | `GET`  | `/robots.txt` | Robots rules |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "BBL required" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `rate_limited` (429),
//! `internal` (500).

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        ConnectInfo, Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use bhx_content_core::catalog::{self, Location, Service, ServiceLocation};
use bhx_content_core::models::{Post, PostMeta};
use bhx_content_core::paginate::{parse_page_param, Page};
use bhx_content_core::ratelimit::{Decision, RateLimiter};

use crate::config::Config;
use crate::index::ContentIndex;
use crate::leads::{self, LeadSubmission};
use crate::reviews::{
    self, InMemoryReviewStore, PublicReview, ReviewStore, ReviewSubmission, ReviewSummary,
};
use crate::sitemap;

const DEFAULT_RECENT: usize = 5;
const DEFAULT_RELATED: usize = 6;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    index: Arc<ContentIndex>,
    limiter: Arc<RateLimiter>,
    reviews: Arc<dyn ReviewStore>,
}

impl AppState {
    pub fn new(config: &Config, reviews: Arc<dyn ReviewStore>) -> Self {
        Self {
            index: Arc::new(ContentIndex::new(config.content.clone())),
            limiter: Arc::new(RateLimiter::new(
                config.reviews.window(),
                config.reviews.max_submissions,
            )),
            config: Arc::new(config.clone()),
            reviews,
        }
    }
}

/// Starts the HTTP server with an in-memory review store.
///
/// The content index is built before the listener binds, so a broken
/// content root fails startup instead of the first request.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    run_server_with_store(config, Arc::new(InMemoryReviewStore::new())).await
}

/// Like [`run_server`], with a caller-provided review store.
pub async fn run_server_with_store(
    config: &Config,
    reviews: Arc<dyn ReviewStore>,
) -> anyhow::Result<()> {
    let state = AppState::new(config, reviews);

    let index = state.index.clone();
    let count = tokio::task::spawn_blocking(move || index.warm()).await??;

    let bind_addr = config.server.bind.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(bind = %bind_addr, posts = count, "server listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/posts", get(handle_list_posts))
        .route("/api/posts/recent", get(handle_recent_posts))
        .route("/api/posts/{slug}", get(handle_get_post))
        .route("/api/posts/{slug}/related", get(handle_related_posts))
        .route("/api/tags", get(handle_tags))
        .route("/api/tags/{tag}", get(handle_tag_posts))
        .route(
            "/api/reviews",
            get(handle_list_reviews).post(handle_submit_review),
        )
        .route("/api/leads", post(handle_submit_lead))
        .route("/api/services", get(handle_services))
        .route(
            "/api/services/{service}/{location}",
            get(handle_service_location),
        )
        .route("/sitemap.xml", get(handle_sitemap))
        .route("/robots.txt", get(handle_robots))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!(error = %format!("{:#}", err), "request failed");
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal".to_string(),
            message: "internal error".to_string(),
        }
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

fn rate_limited(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::TOO_MANY_REQUESTS,
        code: "rate_limited".to_string(),
        message: message.into(),
    }
}

/// Unwrap query parameters, reporting malformed ones through the JSON error
/// contract instead of axum's plain-text rejection.
fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| bad_request(rejection.body_text()))
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

// ============ Posts ============

#[derive(Deserialize)]
struct ListParams {
    page: Option<String>,
    tag: Option<String>,
}

#[derive(Deserialize)]
struct CountParams {
    count: Option<usize>,
}

async fn handle_list_posts(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Page<PostMeta>>, AppError> {
    let params = query_params(params)?;
    let page = parse_page_param(params.page.as_deref());
    let tag = params.tag.as_deref().filter(|t| !t.is_empty());
    Ok(Json(state.index.page(tag, page)?))
}

async fn handle_recent_posts(
    State(state): State<AppState>,
    params: Result<Query<CountParams>, QueryRejection>,
) -> Result<Json<Vec<PostMeta>>, AppError> {
    let count = query_params(params)?.count.unwrap_or(DEFAULT_RECENT);
    Ok(Json(state.index.list_recent(count)?))
}

async fn handle_get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Post>, AppError> {
    let index = state.index.clone();
    let lookup = slug.clone();
    let post = tokio::task::spawn_blocking(move || index.get_by_slug(&lookup))
        .await
        .map_err(anyhow::Error::from)??;
    post.map(Json)
        .ok_or_else(|| not_found(format!("post not found: {}", slug)))
}

async fn handle_related_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    params: Result<Query<CountParams>, QueryRejection>,
) -> Result<Json<Vec<PostMeta>>, AppError> {
    let count = query_params(params)?.count.unwrap_or(DEFAULT_RELATED);
    Ok(Json(state.index.related_to(&slug, count)?))
}

#[derive(Deserialize)]
struct TagsParams {
    #[serde(default)]
    distinct: bool,
}

async fn handle_tags(
    State(state): State<AppState>,
    params: Result<Query<TagsParams>, QueryRejection>,
) -> Result<Response, AppError> {
    if query_params(params)?.distinct {
        Ok(Json(state.index.distinct_tags()?).into_response())
    } else {
        Ok(Json(state.index.all_tags()?).into_response())
    }
}

async fn handle_tag_posts(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<Json<Vec<PostMeta>>, AppError> {
    Ok(Json(state.index.list_by_tag(&tag)?))
}

// ============ Reviews ============

#[derive(Deserialize)]
struct ReviewQuery {
    bbl: Option<String>,
}

#[derive(Serialize)]
struct SubmitResponse {
    success: bool,
    review: PublicReview,
}

async fn handle_list_reviews(
    State(state): State<AppState>,
    query: Result<Query<ReviewQuery>, QueryRejection>,
) -> Result<Json<ReviewSummary>, AppError> {
    let params = query_params(query)?;
    let bbl = params
        .bbl
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .ok_or_else(|| bad_request("BBL required"))?;
    let reviews = state.reviews.list_for_building(bbl).await?;
    Ok(Json(reviews::summarize(reviews)))
}

async fn handle_submit_review(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Result<Json<ReviewSubmission>, JsonRejection>,
) -> Result<Json<SubmitResponse>, AppError> {
    let Json(submission) = body.map_err(|_| bad_request("Invalid JSON."))?;
    let review = submission
        .validate()
        .map_err(|rejection| bad_request(rejection.to_string()))?;

    let client = reviews::client_id(&headers, Some(peer));
    if let Decision::Denied { retry_after } = state.limiter.check_and_consume(client.as_deref()) {
        tracing::info!(
            client = client.as_deref().unwrap_or("-"),
            retry_after_secs = retry_after.as_secs(),
            "review submission rate limited"
        );
        return Err(rate_limited(
            "Too many review submissions. Please try again in a bit.",
        ));
    }

    let review = state.reviews.insert(review).await?;
    Ok(Json(SubmitResponse {
        success: true,
        review,
    }))
}

// ============ Leads ============

#[derive(Serialize)]
struct LeadResponse {
    ok: bool,
}

async fn handle_submit_lead(
    body: Result<Json<LeadSubmission>, JsonRejection>,
) -> Result<Json<LeadResponse>, AppError> {
    let Json(submission) = body.map_err(|_| bad_request("Invalid JSON."))?;
    let lead = submission
        .validate(Utc::now())
        .map_err(|missing| bad_request(missing.to_string()))?;
    leads::log_lead(&lead);
    Ok(Json(LeadResponse { ok: true }))
}

// ============ Service catalog ============

#[derive(Serialize)]
struct CatalogResponse {
    services: &'static [Service],
    locations: &'static [Location],
}

async fn handle_services() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        services: &catalog::SERVICES,
        locations: &catalog::LOCATIONS,
    })
}

async fn handle_service_location(
    Path((service, location)): Path<(String, String)>,
) -> Result<Json<ServiceLocation>, AppError> {
    catalog::combo(&service, &location).map(Json).ok_or_else(|| {
        not_found(format!(
            "unknown service or location: {}/{}",
            service, location
        ))
    })
}

// ============ Sitemap / robots ============

async fn handle_sitemap(State(state): State<AppState>) -> Result<Response, AppError> {
    let entries = sitemap::entries(&state.config.site, &state.index, Utc::now())?;
    Ok((
        [(header::CONTENT_TYPE, "application/xml")],
        sitemap::render_xml(&entries)?,
    )
        .into_response())
}

async fn handle_robots(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        sitemap::robots_txt(&state.config.site),
    )
}
