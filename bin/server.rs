// DriveHive - Web Server
// JSON view-models over the same controller the TUI uses

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use drive_hive::{
    grid_view, Catalog, CompareView, ComparisonSet, Controller, FeedbackLog, GridView,
    ModelOptions, Notification, SearchForm, Settings, VehicleId, ViewModel,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
struct AppState {
    session: Arc<Mutex<Controller<FeedbackLog>>>,
}

impl AppState {
    fn new(catalog: Catalog, settings: &Settings) -> Self {
        Self {
            session: Arc::new(Mutex::new(Controller::new(
                catalog,
                settings,
                FeedbackLog::new(),
            ))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Controller<FeedbackLog>> {
        // A panic while holding the lock leaves nothing worth recovering
        self.session.lock().unwrap()
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

/// Result of a state-changing call, with whatever the session said about it
#[derive(Serialize)]
struct ChangeResponse<T> {
    #[serde(flatten)]
    view: T,
    announcements: Vec<String>,
    notifications: Vec<Notification>,
}

fn with_feedback<T>(controller: &mut Controller<FeedbackLog>, view: T) -> ChangeResponse<T> {
    let (announcements, notifications) = controller.feedback_mut().drain();
    ChangeResponse {
        view,
        announcements,
        notifications,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VehicleQuery {
    make: String,
    model: String,
    year: String,
    price_min: String,
    price_max: String,
    location: String,
}

impl From<VehicleQuery> for SearchForm {
    fn from(query: VehicleQuery) -> Self {
        SearchForm {
            make: query.make,
            model: query.model,
            year: query.year,
            price_min: query.price_min,
            price_max: query.price_max,
            location: query.location,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ModelQuery {
    make: String,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/vehicles - Filtered grid, flagged against the session's comparison
async fn get_vehicles(
    State(state): State<AppState>,
    Query(query): Query<VehicleQuery>,
) -> Json<ApiResponse<GridView>> {
    let criteria = SearchForm::from(query).criteria();
    let controller = state.lock();
    let state = controller.state();

    Json(ApiResponse::ok(grid_view(
        &state.catalog,
        Some(&criteria),
        &state.comparison,
    )))
}

/// GET /api/models?make= - Options for the dependent model selector
async fn get_models(
    State(state): State<AppState>,
    Query(query): Query<ModelQuery>,
) -> Json<ApiResponse<ModelOptions>> {
    let controller = state.lock();
    Json(ApiResponse::ok(ModelOptions::for_make(
        controller.catalog(),
        &query.make,
    )))
}

/// GET /api/compare - Comparison panel
async fn get_compare(State(state): State<AppState>) -> Json<ApiResponse<CompareView>> {
    Json(ApiResponse::ok(state.lock().compare_view()))
}

/// POST /api/compare/:id - Toggle a vehicle in or out of the comparison.
/// Unknown ids leave the comparison untouched and say nothing.
async fn toggle_compare(
    State(state): State<AppState>,
    Path(id): Path<VehicleId>,
) -> Json<ApiResponse<ChangeResponse<CompareView>>> {
    let mut controller = state.lock();
    controller.toggle_compare(id);
    let view = controller.compare_view();
    Json(ApiResponse::ok(with_feedback(&mut controller, view)))
}

/// DELETE /api/compare - Clear the comparison
async fn clear_compare(
    State(state): State<AppState>,
) -> Json<ApiResponse<ChangeResponse<CompareView>>> {
    let mut controller = state.lock();
    controller.clear_compare();
    let view = controller.compare_view();
    Json(ApiResponse::ok(with_feedback(&mut controller, view)))
}

#[derive(Serialize)]
struct Empty {}

/// POST /api/vehicles/:id/details
async fn view_details(
    State(state): State<AppState>,
    Path(id): Path<VehicleId>,
) -> Json<ApiResponse<ChangeResponse<Empty>>> {
    let mut controller = state.lock();
    controller.view_details(id);
    Json(ApiResponse::ok(with_feedback(&mut controller, Empty {})))
}

/// POST /api/vehicles/:id/contact
async fn contact_dealer(
    State(state): State<AppState>,
    Path(id): Path<VehicleId>,
) -> Json<ApiResponse<ChangeResponse<Empty>>> {
    let mut controller = state.lock();
    controller.contact_dealer(id);
    Json(ApiResponse::ok(with_feedback(&mut controller, Empty {})))
}

/// GET /api/view - Full view-model for the session
async fn get_view(State(state): State<AppState>) -> Json<ApiResponse<ViewModel>> {
    Json(ApiResponse::ok(state.lock().view()))
}

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/vehicles", get(get_vehicles))
        .route("/vehicles/:id/details", post(view_details))
        .route("/vehicles/:id/contact", post(contact_dealer))
        .route("/models", get(get_models))
        .route("/compare", get(get_compare).delete(clear_compare))
        .route("/compare/:id", post(toggle_compare))
        .route("/view", get(get_view))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();
    drive_hive::init_tracing("info", settings.log_file.as_deref())?;

    println!("🌐 DriveHive - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let catalog = settings.load_catalog()?;
    println!("✓ Catalog loaded: {} vehicles", catalog.len());

    // Sanity check the catalog renders before accepting traffic
    let preview = grid_view(&catalog, None, &ComparisonSet::new());
    tracing::info!(listings = preview.items().len(), "catalog ready");

    let app = router(AppState::new(catalog, &settings));

    let listener = tokio::net::TcpListener::bind(&settings.server_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", settings.server_addr, e))?;

    println!("\n🚀 Server running on http://{}", settings.server_addr);
    println!("   API: http://{}/api/vehicles", settings.server_addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
