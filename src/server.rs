use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use std::{
    net::SocketAddr,
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{SystemTime, UNIX_EPOCH},
};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::api::{
    weight_warnings, ApiAccountRequest, ApiAnalyzeRequest, ApiBatchRequest, ApiNewScenario,
    ApiProbabilityQuery, ApiProbabilityResponse, ApiResponse,
};
use influence_index::business::BatchAnalysis;
use influence_index::config::{AnalysisConfig, AnalysisMode, Settings};
use influence_index::scenarios::ScenarioDefinition;
use influence_index::store::SettingsStore;
use influence_index::{
    analyze, scenario_probability_for_key, AccountAnalysis, Analysis, AnalysisRequest,
};

#[derive(Clone)]
struct AppState {
    config: Arc<AnalysisConfig>,
    store: Arc<SettingsStore>,
}

impl AppState {
    async fn settings(&self, mode: AnalysisMode) -> Settings {
        match self.store.settings(mode).await {
            Some(settings) => settings,
            None => self.config.settings(mode),
        }
    }

    async fn catalog(&self) -> Vec<ScenarioDefinition> {
        self.store
            .scenarios()
            .await
            .unwrap_or_else(|| self.config.scenarios.clone())
    }
}

type ApiError = (StatusCode, String);

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub async fn serve(args: crate::ServeArgs, config: AnalysisConfig) -> Result<(), String> {
    let store = SettingsStore::load(PathBuf::from(&args.store))
        .await
        .map_err(|err| err.to_string())?;
    debug!(store = %store.path().display(), "settings store ready");
    let state = AppState {
        config: Arc::new(config),
        store: Arc::new(store),
    };

    let web_root = args.web_root;
    let index_path = format!("{}/index.html", web_root.trim_end_matches('/'));
    let static_service = ServeDir::new(&web_root).not_found_service(ServeFile::new(index_path));

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/analyze/account", post(account_handler))
        .route("/api/analyze/batch", post(batch_handler))
        .route("/api/scenarios/probability", get(probability_handler))
        .route("/api/settings", delete(reset_settings_handler))
        .route(
            "/api/settings/:mode",
            get(get_settings_handler).put(put_settings_handler),
        )
        .route(
            "/api/scenarios",
            get(list_scenarios_handler)
                .post(add_scenario_handler)
                .put(replace_scenarios_handler),
        )
        .route("/api/scenarios/:id/toggle", post(toggle_scenario_handler))
        .route("/api/scenarios/:id", delete(remove_scenario_handler))
        .fallback_service(static_service)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| format!("failed to bind server: {}", err))?;
    info!(%addr, web_root = %web_root, "influence-index server listening");

    axum::serve(listener, app)
        .await
        .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn analyze_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiAnalyzeRequest>,
) -> Result<Json<ApiResponse<Analysis>>, ApiError> {
    let request_id = request.request_id.unwrap_or_else(generate_request_id);
    let warnings = weight_warnings(&request.settings);
    let scenarios = match request.scenarios {
        Some(scenarios) => scenarios,
        None => state.catalog().await,
    };
    let analysis = AnalysisRequest::new(request.settings, request.records, scenarios)
        .and_then(|request| analyze(&request))
        .map_err(bad_request)?;
    Ok(Json(ApiResponse::new(request_id, analysis, warnings)))
}

async fn account_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiAccountRequest>,
) -> Result<Json<ApiResponse<AccountAnalysis>>, ApiError> {
    let request_id = request
        .request_id
        .clone()
        .unwrap_or_else(generate_request_id);
    let fallback = match state.settings(AnalysisMode::Creator).await {
        Settings::Creator(settings) => settings,
        Settings::Business(_) => state.config.creator.clone(),
    };
    let settings = request
        .resolve_settings(fallback)
        .map_err(|err| (StatusCode::BAD_REQUEST, err))?;
    let scenarios = match request.scenarios {
        Some(scenarios) => scenarios,
        None => state.catalog().await,
    };

    let settings = Settings::Creator(settings);
    let warnings = weight_warnings(&settings);
    let analysis = AnalysisRequest::new(settings, vec![request.record], scenarios)
        .and_then(|request| analyze(&request))
        .map_err(bad_request)?;
    match analysis {
        Analysis::Creator(result) => Ok(Json(ApiResponse::new(request_id, result, warnings))),
        Analysis::Business(_) => Err(internal_error("analysis mode mismatch")),
    }
}

async fn batch_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiBatchRequest>,
) -> Result<Json<ApiResponse<BatchAnalysis>>, ApiError> {
    let request_id = request.request_id.unwrap_or_else(generate_request_id);
    let settings = match request.settings {
        Some(settings) => Settings::Business(settings),
        None => state.settings(AnalysisMode::Business).await,
    };
    let warnings = weight_warnings(&settings);
    let analysis = AnalysisRequest::new(settings, request.records, Vec::new())
        .and_then(|request| analyze(&request))
        .map_err(bad_request)?;
    match analysis {
        Analysis::Business(result) => Ok(Json(ApiResponse::new(request_id, result, warnings))),
        Analysis::Creator(_) => Err(internal_error("analysis mode mismatch")),
    }
}

async fn probability_handler(Query(query): Query<ApiProbabilityQuery>) -> Json<ApiProbabilityResponse> {
    let probability = scenario_probability_for_key(&query.key, None);
    Json(ApiProbabilityResponse {
        key: query.key,
        probability,
    })
}

async fn get_settings_handler(
    State(state): State<AppState>,
    Path(mode): Path<String>,
) -> Result<Json<Settings>, ApiError> {
    let mode = parse_mode(&mode)?;
    Ok(Json(state.settings(mode).await))
}

async fn put_settings_handler(
    State(state): State<AppState>,
    Path(mode): Path<String>,
    Json(settings): Json<Settings>,
) -> Result<Json<ApiResponse<Settings>>, ApiError> {
    let mode = parse_mode(&mode)?;
    if settings.mode() != mode {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "settings mode {} does not match path mode {}",
                settings.mode().label(),
                mode.label()
            ),
        ));
    }
    let warnings = weight_warnings(&settings);
    let saved = state.store.save_settings(settings).await.map_err(store_error)?;
    Ok(Json(ApiResponse::new(generate_request_id(), saved, warnings)))
}

async fn reset_settings_handler(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.store.reset_settings().await.map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_scenarios_handler(State(state): State<AppState>) -> Json<Vec<ScenarioDefinition>> {
    Json(state.catalog().await)
}

async fn add_scenario_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiNewScenario>,
) -> Result<Json<Vec<ScenarioDefinition>>, ApiError> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "scenario name is required".to_string()));
    }
    let catalog = state
        .store
        .add_scenario(&state.config.scenarios, name, request.description, request.cost)
        .await
        .map_err(store_error)?;
    Ok(Json(catalog))
}

async fn replace_scenarios_handler(
    State(state): State<AppState>,
    Json(catalog): Json<Vec<ScenarioDefinition>>,
) -> Result<Json<Vec<ScenarioDefinition>>, ApiError> {
    let catalog = state.store.save_scenarios(catalog).await.map_err(store_error)?;
    Ok(Json(catalog))
}

async fn toggle_scenario_handler(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Vec<ScenarioDefinition>>, ApiError> {
    let (catalog, found) = state
        .store
        .toggle_scenario(&state.config.scenarios, id)
        .await
        .map_err(store_error)?;
    if !found {
        return Err((StatusCode::NOT_FOUND, format!("scenario not found: {}", id)));
    }
    Ok(Json(catalog))
}

async fn remove_scenario_handler(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Vec<ScenarioDefinition>>, ApiError> {
    let (catalog, removed) = state
        .store
        .remove_scenario(&state.config.scenarios, id)
        .await
        .map_err(store_error)?;
    if !removed {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("scenario {} is reserved or does not exist", id),
        ));
    }
    Ok(Json(catalog))
}

fn parse_mode(value: &str) -> Result<AnalysisMode, ApiError> {
    value
        .parse::<AnalysisMode>()
        .map_err(|err| (StatusCode::NOT_FOUND, err))
}

fn bad_request(err: influence_index::error::ValidationError) -> ApiError {
    (StatusCode::BAD_REQUEST, err.to_string())
}

fn store_error(err: influence_index::error::StoreError) -> ApiError {
    warn!(error = %err, "settings store failure");
    internal_error("settings store failure")
}

fn internal_error(message: &str) -> ApiError {
    (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
}

fn generate_request_id() -> String {
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("req-{}-{}", now_ms(), counter)
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0)
}
