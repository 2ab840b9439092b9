//! Axum web server with WebSocket streaming for visualization.

use std::sync::Arc;

use axum::{
    extract::{State, ws::{Message, WebSocket, WebSocketUpgrade}},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use sortscope_engine::{
    Algorithm, AlgorithmInfo, Error, Frame, RunState, StatsSnapshot, Visualizer, VisualizerConfig,
};
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;

use crate::render::BroadcastRenderer;

/// Frames buffered per WebSocket client before it starts lagging.
const FRAME_BUFFER: usize = 256;

/// Shared application state.
pub struct AppState {
    visualizer: Visualizer,
    frames: broadcast::Sender<Frame>,
}

/// Visualization server.
pub struct VisServer {
    state: Arc<AppState>,
}

impl VisServer {
    /// Create a server around a fresh visualizer.
    pub fn new(config: VisualizerConfig) -> Result<Self, Error> {
        let renderer = BroadcastRenderer::new(FRAME_BUFFER);
        let frames = renderer.sender();
        let visualizer = Visualizer::new(config, renderer)?;
        Ok(Self {
            state: Arc::new(AppState { visualizer, frames }),
        })
    }

    /// The controller behind the API.
    pub fn visualizer(&self) -> &Visualizer {
        &self.state.visualizer
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/status", get(status_handler))
            .route("/api/snapshot", get(snapshot_handler))
            .route("/api/stats", get(stats_handler))
            .route("/api/algorithms", get(algorithms_handler))
            .route("/api/run/start", post(start_handler))
            .route("/api/run/stop", post(stop_handler))
            .route("/api/run/pause", post(pause_handler))
            .route("/api/run/resume", post(resume_handler))
            .route("/api/sequence/regenerate", post(regenerate_handler))
            .route("/api/sequence/reset", post(reset_handler))
            .route("/api/tempo", post(tempo_handler))
            // WebSocket for real-time frames
            .route("/ws", get(ws_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Run the server on the given port.
    pub async fn serve(self, port: u16) -> Result<(), std::io::Error> {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Visualization server running on http://localhost:{}", port);
        axum::serve(listener, self.router()).await
    }
}

/// Engine error mapped onto an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            Error::Busy => StatusCode::CONFLICT,
            Error::InvalidSize { .. } | Error::InvalidTempo { .. } | Error::UnknownAlgorithm(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Interrupted | Error::IndexOutOfBounds { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Server status response.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    state: RunState,
    size: usize,
    tempo: u32,
    delay_ms: u64,
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let vis = &state.visualizer;
    Json(StatusResponse {
        status: "ok",
        state: vis.run_state(),
        size: vis.len(),
        tempo: vis.tempo(),
        delay_ms: vis.delay().as_millis() as u64,
    })
}

async fn snapshot_handler(State(state): State<Arc<AppState>>) -> Json<Frame> {
    Json(state.visualizer.frame())
}

async fn stats_handler(State(state): State<Arc<AppState>>) -> Json<StatsSnapshot> {
    Json(state.visualizer.statistics())
}

async fn algorithms_handler() -> Json<Vec<AlgorithmInfo>> {
    Json(Algorithm::ALL.iter().map(Algorithm::info).collect())
}

#[derive(Deserialize)]
struct StartRequest {
    algorithm: Algorithm,
}

/// Result of a playback control request.
#[derive(Debug, Serialize, Deserialize)]
struct ControlResponse {
    changed: bool,
    state: RunState,
}

async fn start_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartRequest>,
) -> Json<ControlResponse> {
    Json(spawn_run(&state, req.algorithm))
}

async fn stop_handler(State(state): State<Arc<AppState>>) -> Json<ControlResponse> {
    let changed = state.visualizer.stop();
    Json(control(&state, changed))
}

async fn pause_handler(State(state): State<Arc<AppState>>) -> Json<ControlResponse> {
    let changed = state.visualizer.pause();
    Json(control(&state, changed))
}

async fn resume_handler(State(state): State<Arc<AppState>>) -> Json<ControlResponse> {
    let changed = state.visualizer.resume();
    Json(control(&state, changed))
}

#[derive(Deserialize)]
struct RegenerateRequest {
    size: usize,
}

async fn regenerate_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegenerateRequest>,
) -> Result<Json<Frame>, ApiError> {
    state.visualizer.regenerate(req.size)?;
    Ok(Json(state.visualizer.frame()))
}

/// Stop any run and regenerate at the current length.
async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<Frame>, ApiError> {
    state.visualizer.reset()?;
    Ok(Json(state.visualizer.frame()))
}

#[derive(Deserialize)]
struct TempoRequest {
    rate: u32,
}

#[derive(Debug, Serialize)]
struct TempoResponse {
    rate: u32,
    delay_ms: u64,
}

async fn tempo_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TempoRequest>,
) -> Result<Json<TempoResponse>, ApiError> {
    state.visualizer.set_tempo(req.rate)?;
    Ok(Json(TempoResponse {
        rate: state.visualizer.tempo(),
        delay_ms: state.visualizer.delay().as_millis() as u64,
    }))
}

fn control(state: &AppState, changed: bool) -> ControlResponse {
    ControlResponse {
        changed,
        state: state.visualizer.run_state(),
    }
}

/// Claim the run state, then drive the run on its own task. Reports
/// `changed: false` when a run was already active.
fn spawn_run(state: &AppState, algorithm: Algorithm) -> ControlResponse {
    let Some(run) = state.visualizer.claim(algorithm) else {
        return control(state, false);
    };
    tokio::spawn(async move {
        match run.drive().await {
            Ok(outcome) => tracing::debug!(%algorithm, ?outcome, "run task finished"),
            Err(e) => tracing::error!(%algorithm, error = %e, "run task failed"),
        }
    });
    control(state, true)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(socket: WebSocket, state: Arc<AppState>) {
    let (tx, rx) = socket.split();
    serve_socket(tx, rx, state).await;
}

/// Stream frames to one client and answer its commands until either side
/// closes.
async fn serve_socket<Tx, Rx, E>(mut tx: Tx, mut rx: Rx, state: Arc<AppState>)
where
    Tx: Sink<Message> + Unpin,
    Rx: Stream<Item = Result<Message, E>> + Unpin,
{
    let mut frames = state.frames.subscribe();

    // Send the current frame first
    let initial = WsResponse::Frame(state.visualizer.frame());
    if send_json(&mut tx, &initial).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            frame = frames.recv() => match frame {
                Ok(frame) => {
                    if send_json(&mut tx, &WsResponse::Frame(frame)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "websocket client lagging");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            msg = rx.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    // Parse command and respond
                    let response = match serde_json::from_str::<WsCommand>(text.as_str()) {
                        Ok(cmd) => handle_ws_command(&state, cmd),
                        Err(e) => WsResponse::Error { message: e.to_string() },
                    };
                    if send_json(&mut tx, &response).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }
}

async fn send_json<Tx>(tx: &mut Tx, response: &WsResponse) -> Result<(), Tx::Error>
where
    Tx: Sink<Message> + Unpin,
{
    match serde_json::to_string(response) {
        Ok(json) => tx.send(Message::Text(json.into())).await,
        Err(e) => {
            tracing::warn!(error = %e, "failed to encode websocket response");
            Ok(())
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsCommand {
    GetFrame,
    Start { algorithm: Algorithm },
    Stop,
    Pause,
    Resume,
    Regenerate { size: usize },
    Reset,
    Tempo { rate: u32 },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsResponse {
    Frame(Frame),
    Control(ControlResponse),
    Tempo(TempoResponse),
    Error { message: String },
}

fn handle_ws_command(state: &AppState, cmd: WsCommand) -> WsResponse {
    let vis = &state.visualizer;
    match cmd {
        WsCommand::GetFrame => WsResponse::Frame(vis.frame()),
        WsCommand::Start { algorithm } => WsResponse::Control(spawn_run(state, algorithm)),
        WsCommand::Stop => WsResponse::Control(control(state, vis.stop())),
        WsCommand::Pause => WsResponse::Control(control(state, vis.pause())),
        WsCommand::Resume => WsResponse::Control(control(state, vis.resume())),
        WsCommand::Regenerate { size } => match vis.regenerate(size) {
            Ok(()) => WsResponse::Frame(vis.frame()),
            Err(e) => WsResponse::Error { message: e.to_string() },
        },
        WsCommand::Reset => match vis.reset() {
            Ok(()) => WsResponse::Frame(vis.frame()),
            Err(e) => WsResponse::Error { message: e.to_string() },
        },
        WsCommand::Tempo { rate } => match vis.set_tempo(rate) {
            Ok(()) => WsResponse::Tempo(TempoResponse {
                rate: vis.tempo(),
                delay_ms: vis.delay().as_millis() as u64,
            }),
            Err(e) => WsResponse::Error { message: e.to_string() },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;
    use serde_json::Value;
    use std::time::Duration;
    use tokio_test::assert_ok;

    fn app() -> (VisServer, Arc<AppState>) {
        let server = VisServer::new(VisualizerConfig::fast()).unwrap();
        let state = server.state.clone();
        (server, state)
    }

    #[test]
    fn router_builds() {
        let (server, _) = app();
        let _router = server.router();
    }

    #[test]
    fn errors_map_to_status_codes() {
        assert_eq!(ApiError(Error::Busy).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError(Error::UnknownAlgorithm("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        let response = ApiError(Error::InvalidSize { size: 1, min: 5, max: 100 }).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn regenerate_validates_size() {
        let (_, state) = app();
        let ok = regenerate_handler(State(state.clone()), Json(RegenerateRequest { size: 12 })).await;
        assert_eq!(assert_ok!(ok).0.elements.len(), 12);

        let err = regenerate_handler(State(state), Json(RegenerateRequest { size: 3 })).await;
        assert_eq!(err.unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn tempo_reports_delay() {
        let (_, state) = app();
        let Json(resp) = assert_ok!(tempo_handler(State(state), Json(TempoRequest { rate: 8 })).await);
        assert_eq!(resp.rate, 8);
        assert_eq!(resp.delay_ms, 125);
    }

    #[tokio::test]
    async fn algorithms_lists_all_five() {
        let Json(list) = algorithms_handler().await;
        assert_eq!(list.len(), 5);
        assert_eq!(list[4].id, Algorithm::Quick);
    }

    #[tokio::test(start_paused = true)]
    async fn start_streams_frames_and_stop_interrupts() {
        let (_, state) = app();
        let mut frames = state.frames.subscribe();

        let Json(started) =
            start_handler(State(state.clone()), Json(StartRequest { algorithm: Algorithm::Merge })).await;
        assert!(started.changed);

        let first = frames.recv().await.unwrap();
        assert_eq!(first.state, RunState::Running);
        assert_eq!(first.algorithm, Some(Algorithm::Merge));

        let Json(again) =
            start_handler(State(state.clone()), Json(StartRequest { algorithm: Algorithm::Bubble })).await;
        assert!(!again.changed);

        tokio::time::sleep(Duration::from_millis(10)).await;
        let Json(stopped) = stop_handler(State(state.clone())).await;
        assert!(stopped.changed);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(state.visualizer.run_state(), RunState::Idle);

        let Json(resp) =
            regenerate_handler(State(state), Json(RegenerateRequest { size: 20 })).await.unwrap();
        assert_eq!(resp.elements.len(), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_right_after_start_takes_effect() {
        let (_, state) = app();
        let started = spawn_run(&state, Algorithm::Bubble);
        assert!(started.changed);
        assert_eq!(started.state, RunState::Running);
        assert!(!spawn_run(&state, Algorithm::Quick).changed);

        // No yield between start and stop
        let Json(stopped) = stop_handler(State(state.clone())).await;
        assert!(stopped.changed);

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(state.visualizer.run_state(), RunState::Idle);
        assert_eq!(state.visualizer.statistics().comparisons, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_stops_the_run_and_keeps_length() {
        let (_, state) = app();
        assert_ok!(state.visualizer.regenerate(15));
        assert!(spawn_run(&state, Algorithm::Insertion).changed);
        tokio::time::sleep(Duration::from_millis(5)).await;

        let Json(frame) = assert_ok!(reset_handler(State(state.clone())).await);
        assert_eq!(frame.elements.len(), 15);
        assert_eq!(frame.stats, StatsSnapshot::default());
        assert!(!frame.state.is_active());

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(state.visualizer.run_state(), RunState::Idle);
    }

    fn text(json: &str) -> Result<Message, axum::Error> {
        Ok(Message::Text(json.to_owned().into()))
    }

    async fn next_of_type(out: &mut mpsc::UnboundedReceiver<Message>, kind: &str) -> Value {
        loop {
            let value: Value = match out.next().await {
                Some(Message::Text(text)) => serde_json::from_str(text.as_str()).unwrap(),
                other => panic!("unexpected message: {other:?}"),
            };
            if value["type"] == kind {
                return value;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn socket_streams_frames_and_answers_commands() {
        let (_, state) = app();
        let (out_tx, mut out) = mpsc::unbounded();
        let (mut commands, in_rx) = mpsc::unbounded();
        let session = tokio::spawn(serve_socket(out_tx, in_rx, state.clone()));

        let initial = next_of_type(&mut out, "frame").await;
        assert_eq!(initial["state"], "idle");
        assert_eq!(initial["elements"].as_array().unwrap().len(), 50);

        commands.send(text(r#"{"type":"start","algorithm":"bubble"}"#)).await.unwrap();
        let started = next_of_type(&mut out, "control").await;
        assert_eq!(started["changed"], true);
        assert_eq!(started["state"], "running");

        let streamed = next_of_type(&mut out, "frame").await;
        assert_eq!(streamed["state"], "running");
        assert_eq!(streamed["algorithm"], "bubble");

        commands.send(text(r#"{"type":"stop"}"#)).await.unwrap();
        let stopped = next_of_type(&mut out, "control").await;
        assert_eq!(stopped["changed"], true);
        loop {
            let frame = next_of_type(&mut out, "frame").await;
            if frame["state"] == "idle" {
                break;
            }
        }

        commands.send(text(r#"{"type":"reset"}"#)).await.unwrap();
        let reset = next_of_type(&mut out, "frame").await;
        assert_eq!(reset["stats"]["comparisons"], 0);
        assert_eq!(reset["elements"].as_array().unwrap().len(), 50);

        commands.send(text("not json")).await.unwrap();
        let error = next_of_type(&mut out, "error").await;
        assert!(error["message"].as_str().unwrap().contains("expected"));

        drop(commands);
        assert_ok!(session.await);
    }

    #[test]
    fn ws_commands_parse() {
        let cmd: WsCommand =
            serde_json::from_str(r#"{"type":"start","algorithm":"quick"}"#).unwrap();
        assert!(matches!(cmd, WsCommand::Start { algorithm: Algorithm::Quick }));

        let cmd: WsCommand = serde_json::from_str(r#"{"type":"tempo","rate":20}"#).unwrap();
        assert!(matches!(cmd, WsCommand::Tempo { rate: 20 }));

        let cmd: WsCommand = serde_json::from_str(r#"{"type":"reset"}"#).unwrap();
        assert!(matches!(cmd, WsCommand::Reset));
    }

    #[test]
    fn ws_command_errors_are_reported() {
        let (_, state) = app();
        let response = handle_ws_command(&state, WsCommand::Regenerate { size: 0 });
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"type\":\"error\""));
        assert!(json.contains("invalid array size 0"));
    }

    #[test]
    fn ws_frame_response_is_tagged() {
        let (_, state) = app();
        let json = serde_json::to_string(&handle_ws_command(&state, WsCommand::GetFrame)).unwrap();
        assert!(json.starts_with("{\"type\":\"frame\""));
    }
}
