//! Browser front end: embedded single-page UI plus a JSON API over the
//! calculators and the treasure register.

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard},
};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::{
    bridges::{calc_bridge_cost, BridgeCost, BridgeError, BridgeType},
    domain::{ItemCode, MapData, MaterialAmounts, Point, Server},
    geometry::{calc_segments, calc_span_length},
    highways::{calc_highway_cost, validate_points, HighwayCost},
    map::{MapView, OverlayMarker},
    storage::KeyValueStore,
    treasures::{RegisterError, TreasureMap, TreasureRegister},
    tunnels::{calc_tunnel_cost, TunnelCost, AVG_ACTIONS_PER_ORE_VEIN, ORE_PROBABILITY},
};

const INDEX_HTML: &str = include_str!("assets/index.html");
const STYLES_CSS: &str = include_str!("assets/styles.css");
const APP_JS: &str = include_str!("assets/app.js");

pub type SharedStore = Box<dyn KeyValueStore + Send>;

pub struct AppState {
    register: Mutex<TreasureRegister<SharedStore>>,
    default_width: u32,
    default_paving: ItemCode,
}

impl AppState {
    pub fn new(register: TreasureRegister<SharedStore>) -> Self {
        Self {
            register: Mutex::new(register),
            default_width: crate::highways::DEFAULT_WIDTH,
            default_paving: crate::highways::DEFAULT_PAVING,
        }
    }

    pub fn with_highway_defaults(mut self, width: u32, paving: ItemCode) -> Self {
        self.default_width = width;
        self.default_paving = paving;
        self
    }

    fn register(&self) -> MutexGuard<'_, TreasureRegister<SharedStore>> {
        self.register.lock().expect("register lock poisoned")
    }
}

pub struct WebServerConfig {
    pub host: String,
    pub port: u16,
}

pub async fn run(config: WebServerConfig, state: AppState) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    log::info!(
        "[web] Wurm utilities live at http://{}:{} (Ctrl+C to stop)",
        config.host,
        config.port
    );
    axum::serve(listener, router(Arc::new(state)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/styles.css", get(styles))
        .route("/app.js", get(script))
        .route("/api/servers", get(servers))
        .route("/api/bridge-types", get(bridge_types))
        .route("/api/highways", post(highway_cost))
        .route("/api/bridges", post(bridge_cost))
        .route("/api/tunnels", post(tunnel_cost))
        .route("/api/treasures", get(treasures).post(add_treasure))
        .route(
            "/api/treasures/:index",
            put(edit_treasure).delete(delete_treasure),
        )
        .route("/api/treasures/:index/claim", post(claim_treasure))
        .route("/api/treasures/:index/replace", post(replace_treasure))
        .route("/api/position", put(set_position))
        .route("/api/server", put(set_server))
        .with_state(state)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    log::info!("[web] Shutting down...");
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn styles() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLES_CSS)
}

async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        APP_JS,
    )
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unprocessable(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Unprocessable(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
            ApiError::Internal(message) => {
                log::error!("[web] {message}");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<RegisterError> for ApiError {
    fn from(err: RegisterError) -> Self {
        match err {
            RegisterError::IndexOutOfRange { .. } => ApiError::NotFound(err.to_string()),
            RegisterError::Store(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        ApiError::Unprocessable(err.to_string())
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    code: Server,
    label: String,
    host: String,
    map_data: MapData,
}

async fn servers() -> Json<Vec<ServerInfo>> {
    Json(
        Server::ALL
            .into_iter()
            .map(|server| ServerInfo {
                code: server,
                label: server.label(),
                host: server.map_host(),
                map_data: server.map_data(),
            })
            .collect(),
    )
}

#[derive(Serialize)]
pub struct BridgeTypeInfo {
    code: BridgeType,
    label: String,
}

async fn bridge_types() -> Json<Vec<BridgeTypeInfo>> {
    Json(
        BridgeType::ALL
            .into_iter()
            .map(|code| BridgeTypeInfo {
                code,
                label: code.label(),
            })
            .collect(),
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighwayRequest {
    pub points: Vec<Point>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub paving: Option<ItemCode>,
    #[serde(default)]
    pub sand_lining: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighwayResponse {
    #[serde(flatten)]
    pub cost: HighwayCost,
    pub raw_materials: MaterialAmounts,
}

async fn highway_cost(
    State(state): State<Arc<AppState>>,
    Json(request): Json<HighwayRequest>,
) -> ApiResult<HighwayResponse> {
    validate_points(&request.points).map_err(|err| ApiError::BadRequest(err.to_string()))?;
    let cost = calc_highway_cost(
        &calc_segments(&request.points),
        request.width.unwrap_or(state.default_width),
        request.paving.unwrap_or(state.default_paving),
        request.sand_lining,
    );
    let raw_materials = cost.raw_materials();
    Ok(Json(HighwayResponse {
        cost,
        raw_materials,
    }))
}

/// A length given directly, or measured between two points.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanRequest {
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default = "default_span_width")]
    pub width: u32,
    #[serde(default)]
    pub bridge_type: Option<BridgeType>,
}

fn default_span_width() -> u32 {
    1
}

impl SpanRequest {
    fn length(&self) -> std::result::Result<u32, ApiError> {
        match (self.length, self.points.as_slice()) {
            (Some(length), _) => Ok(length),
            (None, [_, _]) => Ok(calc_span_length(&self.points)),
            _ => Err(ApiError::BadRequest(
                "Give either a length or exactly two points!".to_string(),
            )),
        }
    }
}

async fn bridge_cost(Json(request): Json<SpanRequest>) -> ApiResult<BridgeCost> {
    let length = request.length()?;
    let kind = request.bridge_type.unwrap_or(BridgeType::FlatWood);
    Ok(Json(calc_bridge_cost(kind, length, request.width)?))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TunnelResponse {
    #[serde(flatten)]
    pub cost: TunnelCost,
    pub total_actions: u64,
    pub ore_probability: f64,
    pub avg_actions_per_ore_vein: u64,
}

async fn tunnel_cost(Json(request): Json<SpanRequest>) -> ApiResult<TunnelResponse> {
    let cost = calc_tunnel_cost(request.length()?, request.width);
    Ok(Json(TunnelResponse {
        cost,
        total_actions: cost.total_actions(),
        ore_probability: ORE_PROBABILITY,
        avg_actions_per_ore_vein: AVG_ACTIONS_PER_ORE_VEIN,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreasureRow {
    #[serde(flatten)]
    pub map: TreasureMap,
    pub link: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreasureState {
    pub maps: Vec<TreasureRow>,
    pub current_position: Option<Point>,
    pub server: Server,
    pub map_view: MapView,
    pub markers: Vec<OverlayMarker>,
}

fn treasure_state(register: &TreasureRegister<SharedStore>) -> TreasureState {
    let server = register.server();
    let map_view = MapView::for_server(server);
    let target = register.target().map(|_| 0);
    TreasureState {
        maps: register
            .maps()
            .iter()
            .map(|map| TreasureRow {
                link: server.map_link(map.position),
                map: map.clone(),
            })
            .collect(),
        current_position: register.current_position(),
        server,
        markers: map_view.overlay_markers(register, None, target),
        map_view,
    }
}

async fn treasures(State(state): State<Arc<AppState>>) -> Json<TreasureState> {
    Json(treasure_state(&state.register()))
}

async fn add_treasure(
    State(state): State<Arc<AppState>>,
    Json(map): Json<TreasureMap>,
) -> ApiResult<TreasureState> {
    let mut register = state.register();
    register.add(map)?;
    Ok(Json(treasure_state(&register)))
}

async fn edit_treasure(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
    Json(map): Json<TreasureMap>,
) -> ApiResult<TreasureState> {
    let mut register = state.register();
    register.edit(index, map)?;
    Ok(Json(treasure_state(&register)))
}

async fn delete_treasure(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> ApiResult<TreasureState> {
    let mut register = state.register();
    register.delete(index)?;
    Ok(Json(treasure_state(&register)))
}

async fn claim_treasure(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> ApiResult<TreasureState> {
    let mut register = state.register();
    let claimed = register.claim(index)?;
    log::info!("[web] claimed treasure at {}", claimed.position);
    Ok(Json(treasure_state(&register)))
}

async fn replace_treasure(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
    Json(map): Json<TreasureMap>,
) -> ApiResult<TreasureState> {
    let mut register = state.register();
    register.replace(index, map)?;
    Ok(Json(treasure_state(&register)))
}

async fn set_position(
    State(state): State<Arc<AppState>>,
    Json(position): Json<Point>,
) -> ApiResult<TreasureState> {
    let mut register = state.register();
    register.set_current_position(position)?;
    Ok(Json(treasure_state(&register)))
}

#[derive(Debug, Deserialize)]
pub struct ServerRequest {
    pub server: Server,
}

async fn set_server(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ServerRequest>,
) -> ApiResult<TreasureState> {
    let mut register = state.register();
    register.set_server(request.server)?;
    Ok(Json(treasure_state(&register)))
}
