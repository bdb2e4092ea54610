//! REST API for the estimator service.
//!
//! Provides HTTP endpoints for the presentation layer.
//! Uses Axum as the web framework and supports CORS.

use std::sync::{Arc, OnceLock};

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};

use crate::catalog::{Catalog, CategorySummary};
use crate::config::ApiConfig;
use crate::estimator::Estimator;
use crate::model::{
    CalculationResult, CatalogEntry, EstimateError, EstimateRequest, PricingStrategy,
    QuantitySuggestion, SizeSuggestion,
};
use crate::types::Dims2;

#[derive(Clone)]
struct ApiState {
    estimator: Arc<Estimator>,
    catalog: Arc<Catalog>,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

// SRI hashes verified against https://unpkg.com/swagger-ui-dist@5.17.14/ on 2025-10-29.
const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>print-estimator API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                window.ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                });
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Response with the ranked price options.
#[derive(Serialize, ToSchema)]
pub struct EstimateResponse {
    pub results: Vec<CalculationResult>,
}

/// Response listing the catalog categories.
#[derive(Serialize, ToSchema)]
pub struct CategoriesResponse {
    pub categories: Vec<CategorySummary>,
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    details: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error, details))).into_response()
}

fn json_deserialize_error(err: JsonRejection) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid JSON data",
        err.to_string(),
    )
}

fn estimate_error_response(err: &EstimateError) -> Response {
    match err {
        EstimateError::InvalidInput(inner) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid input data",
            inner.to_string(),
        ),
        EstimateError::NoResults { .. } => {
            error_response(StatusCode::NOT_FOUND, "No results", err.to_string())
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_estimate, handle_categories),
    components(
        schemas(
            EstimateRequest,
            EstimateResponse,
            CategoriesResponse,
            CategorySummary,
            CalculationResult,
            CatalogEntry,
            PricingStrategy,
            SizeSuggestion,
            QuantitySuggestion,
            Dims2,
            ErrorResponse
        )
    ),
    tags((name = "estimate", description = "Endpoints for print-job price calculation"))
)]
struct ApiDoc;

fn build_router(estimator: Estimator, catalog: Catalog) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let state = ApiState {
        estimator: Arc::new(estimator),
        catalog: Arc::new(catalog),
    };

    Router::new()
        // API endpoints
        .route("/estimate", post(handle_estimate))
        .route("/categories", get(handle_categories))
        // API documentation
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Starts the API server.
///
/// Blocks until the server is terminated.
pub async fn start_api_server(
    config: ApiConfig,
    estimator: Estimator,
    catalog: Catalog,
) -> std::io::Result<()> {
    let app = build_router(estimator, catalog);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        "🚀 Server running on http://{}:{}",
        config.display_host(),
        config.port()
    );
    if config.binds_to_all_interfaces() && config.uses_default_host() {
        info!("💡 Local access: http://localhost:{}", config.port());
    }
    info!("📦 API endpoints: POST /estimate, GET /categories");
    info!("📑 Documentation: GET /docs, GET /docs/openapi.json");

    axum::serve(listener, app).await.inspect_err(|err| {
        error!("❌ API server terminated with an error: {err}");
    })
}

/// Handler for POST /estimate endpoint.
///
/// Prices the requested job against the catalog and returns the ranked options.
#[utoipa::path(
    post,
    path = "/estimate",
    request_body = EstimateRequest,
    responses(
        (status = 200, description = "Ranked price options", body = EstimateResponse),
        (status = NOT_FOUND, description = "No priceable entries in the category", body = ErrorResponse),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid request data",
            body = ErrorResponse
        )
    ),
    tag = "estimate"
)]
async fn handle_estimate(
    State(state): State<ApiState>,
    payload: Result<Json<EstimateRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(err) => return json_deserialize_error(err),
    };

    info!(
        "📥 New estimate request: {} x {} mm, {} pcs, category '{}'",
        request.width_mm, request.height_mm, request.quantity, request.category
    );
    match state
        .estimator
        .compute_options(state.catalog.entries(), &request)
    {
        Ok(results) => {
            info!("🧾 Result: {} options", results.len());
            (StatusCode::OK, Json(EstimateResponse { results })).into_response()
        }
        Err(err) => {
            info!("⚠️ Estimate rejected: {}", err);
            estimate_error_response(&err)
        }
    }
}

/// Handler for GET /categories endpoint.
#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "Catalog categories with entry counts", body = CategoriesResponse)
    ),
    tag = "estimate"
)]
async fn handle_categories(State(state): State<ApiState>) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: state.catalog.categories(),
    })
}

async fn serve_openapi_json() -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}
