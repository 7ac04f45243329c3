// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use gatehouse_api::{
    AchievementResponse, AmenityResponse, ApiError, AuthenticationService,
    AwardAchievementRequest, BookingResponse, BuildingResponse, ChatMessageResponse,
    ClearWalkInRequest, CreateAccountRequest, CreateAmenityRequest, DecideRequest,
    IssuePassRequest, LoginResponse, NoticeResponse, PostChatMessageRequest, PostNoticeRequest,
    ProfileResponse, ProposeBookingRequest, ProvisionBuildingRequest, RegisterContactRequest,
    RegisterResidentRequest, ValidateCodeRequest, VisitorResponse, WalkInRequest,
};
use gatehouse_notify::{Dispatcher, GateDecision, PushGatewayChannel, TelegramChannel};
use gatehouse_persistence::Persistence;

mod live;
mod session;

use live::{ChangeEvent, ChangeFeedBroadcaster, ChangeOp};
use session::SessionAccount;

/// Gatehouse Server - HTTP server for the Gatehouse community portal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Login name for a super-admin account created at startup if absent
    #[arg(long)]
    bootstrap_admin: Option<String>,

    /// Password for the bootstrap super-admin account
    #[arg(long)]
    bootstrap_password: Option<String>,

    /// Telegram bot token for gate notifications
    #[arg(long)]
    telegram_bot_token: Option<String>,

    /// Push relay URL for gate notifications
    #[arg(long)]
    push_gateway_url: Option<String>,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The persistence layer, one request at a time.
    persistence: Arc<Mutex<Persistence>>,
    /// The change-feed broadcaster for connected clients.
    feed: Arc<ChangeFeedBroadcaster>,
    /// The gate-notification dispatcher.
    dispatcher: Arc<Dispatcher>,
}

impl axum::extract::FromRef<AppState> for Arc<ChangeFeedBroadcaster> {
    fn from_ref(state: &AppState) -> Self {
        state.feed.clone()
    }
}

/// API request for logging in.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct LoginApiRequest {
    /// The account login name.
    login_name: String,
    /// The plain-text password.
    password: String,
}

/// API request for verifying a resident profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct VerifyResidentRequest {
    /// The building the profile belongs to.
    building_id: i64,
    /// The profile to verify.
    profile_id: i64,
}

/// API request for recording a visitor's exit.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ExitRequest {
    /// The building the visitor belongs to.
    building_id: i64,
    /// The visitor leaving the premises.
    visitor_id: i64,
}

/// Query parameters carrying only a building.
#[derive(Debug, Deserialize)]
struct BuildingQuery {
    /// The building.
    building_id: i64,
}

/// Query parameters for listing bookings.
#[derive(Debug, Deserialize)]
struct BookingsQuery {
    /// The building.
    building_id: i64,
    /// The amenity.
    amenity_id: i64,
    /// The date (`YYYY-MM-DD`).
    date: String,
}

/// Query parameters for listing achievements.
#[derive(Debug, Deserialize)]
struct AchievementsQuery {
    /// The building.
    building_id: i64,
    /// Optionally narrow to one resident.
    profile_id: Option<i64>,
}

/// API response for account creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CreateAccountResponse {
    /// The created account's identifier.
    account_id: i64,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status = match err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } | ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::InvalidState { .. } | ApiError::SlotOccupied { .. } => StatusCode::CONFLICT,
            ApiError::InvalidRange { .. }
            | ApiError::OutsideOperatingHours { .. }
            | ApiError::PasswordPolicyViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %err, "Internal error");
        }

        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Publishes a record change to the live feed.
///
/// Serialization failures are logged and dropped; the feed is
/// informational and must never fail the mutation that fed it.
fn broadcast_change<T: Serialize>(
    state: &AppState,
    op: ChangeOp,
    table: &str,
    building_id: i64,
    record: &T,
) {
    match serde_json::to_value(record) {
        Ok(record) => {
            state.feed.broadcast(&ChangeEvent::Change {
                op,
                table: table.to_string(),
                building_id,
                record,
            });
        }
        Err(e) => {
            warn!(table, error = %e, "Failed to serialize change-feed record");
        }
    }
}

// ============================================================================
// Authentication
// ============================================================================

/// Handler for POST /login endpoint.
async fn handle_login(
    AxumState(state): AxumState<AppState>,
    Json(req): Json<LoginApiRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    info!(login_name = %req.login_name, "Handling login request");

    let mut persistence = state.persistence.lock().await;
    let (session_token, actor, account) =
        AuthenticationService::login(&mut persistence, &req.login_name, &req.password).map_err(
            |e| HttpError {
                status: StatusCode::UNAUTHORIZED,
                message: e.to_string(),
            },
        )?;
    drop(persistence);

    Ok(Json(LoginResponse {
        session_token,
        role: actor.role.as_str().to_string(),
        building_id: account.building_id,
        profile_id: account.profile_id,
    }))
}

/// Handler for POST /logout endpoint.
async fn handle_logout(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, HttpError> {
    let token = headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(HttpError {
            status: StatusCode::UNAUTHORIZED,
            message: String::from("Missing bearer token"),
        })?;

    let mut persistence = state.persistence.lock().await;
    AuthenticationService::logout(&mut persistence, token).map_err(|e| HttpError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: e.to_string(),
    })?;

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /accounts endpoint.
async fn handle_create_account(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Json(req): Json<CreateAccountRequest>,
) -> Result<Json<CreateAccountResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let account_id = gatehouse_api::create_account(&mut persistence, &actor, &req)?;

    Ok(Json(CreateAccountResponse { account_id }))
}

// ============================================================================
// Buildings & residents
// ============================================================================

/// Handler for POST /buildings endpoint.
async fn handle_provision_building(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Json(req): Json<ProvisionBuildingRequest>,
) -> Result<Json<BuildingResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let building = gatehouse_api::provision_building(&mut persistence, &actor, &req)?;
    drop(persistence);

    broadcast_change(
        &state,
        ChangeOp::Insert,
        "buildings",
        building.building_id,
        &building,
    );
    Ok(Json(building))
}

/// Handler for GET /buildings endpoint.
async fn handle_list_buildings(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
) -> Result<Json<Vec<BuildingResponse>>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let buildings = gatehouse_api::list_buildings(&mut persistence, &actor)?;
    Ok(Json(buildings))
}

/// Handler for POST /residents endpoint.
async fn handle_register_resident(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Json(req): Json<RegisterResidentRequest>,
) -> Result<Json<ProfileResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let profile = gatehouse_api::register_resident(&mut persistence, &actor, &req)?;
    drop(persistence);

    broadcast_change(
        &state,
        ChangeOp::Insert,
        "profiles",
        profile.building_id,
        &profile,
    );
    Ok(Json(profile))
}

/// Handler for POST /residents/verify endpoint.
async fn handle_verify_resident(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Json(req): Json<VerifyResidentRequest>,
) -> Result<Json<ProfileResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let profile =
        gatehouse_api::verify_resident(&mut persistence, &actor, req.building_id, req.profile_id)?;
    drop(persistence);

    broadcast_change(
        &state,
        ChangeOp::Update,
        "profiles",
        profile.building_id,
        &profile,
    );
    Ok(Json(profile))
}

/// Handler for GET /residents endpoint.
async fn handle_list_residents(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Query(params): Query<BuildingQuery>,
) -> Result<Json<Vec<ProfileResponse>>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let profiles = gatehouse_api::list_residents(&mut persistence, &actor, params.building_id)?;
    Ok(Json(profiles))
}

/// Handler for POST /contact endpoint.
async fn handle_register_contact(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Json(req): Json<RegisterContactRequest>,
) -> Result<Json<ProfileResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let profile = gatehouse_api::register_contact(&mut persistence, &actor, &req)?;
    Ok(Json(profile))
}

// ============================================================================
// Amenities & bookings
// ============================================================================

/// Handler for POST /amenities endpoint.
async fn handle_create_amenity(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Json(req): Json<CreateAmenityRequest>,
) -> Result<Json<AmenityResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let amenity = gatehouse_api::create_amenity(&mut persistence, &actor, &req)?;
    drop(persistence);

    broadcast_change(
        &state,
        ChangeOp::Insert,
        "amenities",
        amenity.building_id,
        &amenity,
    );
    Ok(Json(amenity))
}

/// Handler for GET /amenities endpoint.
async fn handle_list_amenities(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Query(params): Query<BuildingQuery>,
) -> Result<Json<Vec<AmenityResponse>>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let amenities = gatehouse_api::list_amenities(&mut persistence, &actor, params.building_id)?;
    Ok(Json(amenities))
}

/// Handler for POST /bookings endpoint.
async fn handle_propose_booking(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Json(req): Json<ProposeBookingRequest>,
) -> Result<Json<BookingResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let booking = gatehouse_api::propose_booking(&mut persistence, &actor, &req)?;
    drop(persistence);

    broadcast_change(
        &state,
        ChangeOp::Insert,
        "bookings",
        booking.building_id,
        &booking,
    );
    Ok(Json(booking))
}

/// Handler for DELETE `/bookings/{booking_id}` endpoint.
async fn handle_cancel_booking(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Path(booking_id): Path<i64>,
    Query(params): Query<BuildingQuery>,
) -> Result<Json<BookingResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let booking =
        gatehouse_api::cancel_booking(&mut persistence, &actor, params.building_id, booking_id)?;
    drop(persistence);

    broadcast_change(
        &state,
        ChangeOp::Delete,
        "bookings",
        booking.building_id,
        &booking,
    );
    Ok(Json(booking))
}

/// Handler for GET /bookings endpoint.
async fn handle_list_bookings(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Query(params): Query<BookingsQuery>,
) -> Result<Json<Vec<BookingResponse>>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let bookings = gatehouse_api::list_bookings(
        &mut persistence,
        &actor,
        params.building_id,
        params.amenity_id,
        &params.date,
    )?;
    Ok(Json(bookings))
}

// ============================================================================
// Visitor lifecycle
// ============================================================================

/// Handler for POST /visitors/pass endpoint.
async fn handle_issue_pass(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Json(req): Json<IssuePassRequest>,
) -> Result<Json<VisitorResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let visitor = gatehouse_api::issue_pre_approved_pass(&mut persistence, &actor, &req)?;
    drop(persistence);

    broadcast_change(
        &state,
        ChangeOp::Insert,
        "visitors",
        visitor.building_id,
        &visitor,
    );
    Ok(Json(visitor))
}

/// Handler for POST `/visitors/walk_in` endpoint.
///
/// On success the resident is notified asynchronously; delivery failures
/// never affect this response.
async fn handle_walk_in(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Json(req): Json<WalkInRequest>,
) -> Result<Json<VisitorResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let outcome = gatehouse_api::request_walk_in_entry(&mut persistence, &actor, &req)?;
    drop(persistence);

    broadcast_change(
        &state,
        ChangeOp::Insert,
        "visitors",
        outcome.visitor.building_id,
        &outcome.visitor,
    );

    // Fire-and-forget: the visitor record stands whether or not the
    // resident could be reached
    let dispatcher = state.dispatcher.clone();
    let notification = outcome.notification;
    let destination = outcome.destination;
    tokio::spawn(async move {
        dispatcher.dispatch(&destination, &notification).await;
    });

    Ok(Json(outcome.visitor))
}

/// Handler for POST /visitors/clear endpoint.
async fn handle_clear_walk_in(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Json(req): Json<ClearWalkInRequest>,
) -> Result<Json<VisitorResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let visitor = gatehouse_api::clear_walk_in(&mut persistence, &actor, &req)?;
    drop(persistence);

    broadcast_change(
        &state,
        ChangeOp::Insert,
        "visitors",
        visitor.building_id,
        &visitor,
    );
    Ok(Json(visitor))
}

/// Handler for POST /visitors/decide endpoint.
async fn handle_decide(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Json(req): Json<DecideRequest>,
) -> Result<Json<VisitorResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let visitor = gatehouse_api::decide(&mut persistence, &actor, &req)?;
    drop(persistence);

    broadcast_change(
        &state,
        ChangeOp::Update,
        "visitors",
        visitor.building_id,
        &visitor,
    );
    Ok(Json(visitor))
}

/// Handler for GET /visitors endpoint.
async fn handle_list_visitors(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Query(params): Query<BuildingQuery>,
) -> Result<Json<Vec<VisitorResponse>>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let visitors = gatehouse_api::list_visitors(&mut persistence, &actor, params.building_id)?;
    Ok(Json(visitors))
}

// ============================================================================
// Gate operations
// ============================================================================

/// Handler for POST /gate/validate endpoint.
async fn handle_validate_code(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Json(req): Json<ValidateCodeRequest>,
) -> Result<Json<VisitorResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let visitor = gatehouse_api::validate_code(&mut persistence, &actor, &req)?;
    drop(persistence);

    broadcast_change(
        &state,
        ChangeOp::Update,
        "visitors",
        visitor.building_id,
        &visitor,
    );
    Ok(Json(visitor))
}

/// Handler for POST /gate/exit endpoint.
async fn handle_record_exit(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Json(req): Json<ExitRequest>,
) -> Result<Json<VisitorResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let visitor =
        gatehouse_api::record_exit(&mut persistence, &actor, req.building_id, req.visitor_id)?;
    drop(persistence);

    broadcast_change(
        &state,
        ChangeOp::Update,
        "visitors",
        visitor.building_id,
        &visitor,
    );
    Ok(Json(visitor))
}

/// Handler for POST /gate/callback endpoint.
///
/// This is the notification gateway's re-entry point: a tap on the
/// approve/deny button lands here. The decision goes through the same
/// guarded transition as an in-app decision.
async fn handle_gate_callback(
    AxumState(state): AxumState<AppState>,
    Json(decision): Json<GateDecision>,
) -> Result<Json<VisitorResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let visitor = gatehouse_api::decide_from_callback(&mut persistence, &decision)?;
    drop(persistence);

    broadcast_change(
        &state,
        ChangeOp::Update,
        "visitors",
        visitor.building_id,
        &visitor,
    );
    Ok(Json(visitor))
}

// ============================================================================
// Notices, chat, achievements
// ============================================================================

/// Handler for POST /notices endpoint.
async fn handle_post_notice(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Json(req): Json<PostNoticeRequest>,
) -> Result<Json<NoticeResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let notice = gatehouse_api::post_notice(&mut persistence, &actor, &req)?;
    drop(persistence);

    broadcast_change(
        &state,
        ChangeOp::Insert,
        "notices",
        notice.building_id,
        &notice,
    );
    Ok(Json(notice))
}

/// Handler for GET /notices endpoint.
async fn handle_list_notices(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Query(params): Query<BuildingQuery>,
) -> Result<Json<Vec<NoticeResponse>>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let notices = gatehouse_api::list_notices(&mut persistence, &actor, params.building_id)?;
    Ok(Json(notices))
}

/// Handler for DELETE `/notices/{notice_id}` endpoint.
async fn handle_delete_notice(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Path(notice_id): Path<i64>,
    Query(params): Query<BuildingQuery>,
) -> Result<StatusCode, HttpError> {
    let mut persistence = state.persistence.lock().await;
    gatehouse_api::delete_notice(&mut persistence, &actor, params.building_id, notice_id)?;
    drop(persistence);

    broadcast_change(
        &state,
        ChangeOp::Delete,
        "notices",
        params.building_id,
        &serde_json::json!({ "notice_id": notice_id }),
    );
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /chat endpoint.
async fn handle_post_chat_message(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Json(req): Json<PostChatMessageRequest>,
) -> Result<Json<ChatMessageResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let message = gatehouse_api::post_chat_message(&mut persistence, &actor, &req)?;
    drop(persistence);

    broadcast_change(
        &state,
        ChangeOp::Insert,
        "chat_messages",
        message.building_id,
        &message,
    );
    Ok(Json(message))
}

/// Handler for GET /chat endpoint.
async fn handle_list_chat_messages(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Query(params): Query<BuildingQuery>,
) -> Result<Json<Vec<ChatMessageResponse>>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let messages =
        gatehouse_api::list_chat_messages(&mut persistence, &actor, params.building_id)?;
    Ok(Json(messages))
}

/// Handler for POST /achievements endpoint.
async fn handle_award_achievement(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Json(req): Json<AwardAchievementRequest>,
) -> Result<Json<AchievementResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let achievement = gatehouse_api::award_achievement(&mut persistence, &actor, &req)?;
    drop(persistence);

    broadcast_change(
        &state,
        ChangeOp::Insert,
        "achievements",
        achievement.building_id,
        &achievement,
    );
    Ok(Json(achievement))
}

/// Handler for GET /achievements endpoint.
async fn handle_list_achievements(
    AxumState(state): AxumState<AppState>,
    SessionAccount(actor, _account): SessionAccount,
    Query(params): Query<AchievementsQuery>,
) -> Result<Json<Vec<AchievementResponse>>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let achievements = gatehouse_api::list_achievements(
        &mut persistence,
        &actor,
        params.building_id,
        params.profile_id,
    )?;
    Ok(Json(achievements))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/login", post(handle_login))
        .route("/logout", post(handle_logout))
        .route("/accounts", post(handle_create_account))
        .route("/buildings", post(handle_provision_building))
        .route("/buildings", get(handle_list_buildings))
        .route("/residents", post(handle_register_resident))
        .route("/residents", get(handle_list_residents))
        .route("/residents/verify", post(handle_verify_resident))
        .route("/contact", post(handle_register_contact))
        .route("/amenities", post(handle_create_amenity))
        .route("/amenities", get(handle_list_amenities))
        .route("/bookings", post(handle_propose_booking))
        .route("/bookings", get(handle_list_bookings))
        .route("/bookings/{booking_id}", delete(handle_cancel_booking))
        .route("/visitors/pass", post(handle_issue_pass))
        .route("/visitors/walk_in", post(handle_walk_in))
        .route("/visitors/clear", post(handle_clear_walk_in))
        .route("/visitors/decide", post(handle_decide))
        .route("/visitors", get(handle_list_visitors))
        .route("/gate/validate", post(handle_validate_code))
        .route("/gate/exit", post(handle_record_exit))
        .route("/gate/callback", post(handle_gate_callback))
        .route("/notices", post(handle_post_notice))
        .route("/notices", get(handle_list_notices))
        .route("/notices/{notice_id}", delete(handle_delete_notice))
        .route("/chat", post(handle_post_chat_message))
        .route("/chat", get(handle_list_chat_messages))
        .route("/achievements", post(handle_award_achievement))
        .route("/achievements", get(handle_list_achievements))
        .route("/live/{building_id}", get(live::change_feed_handler))
        .with_state(app_state)
}

/// Builds the notification dispatcher from the configured channels.
fn build_dispatcher(args: &Args) -> Dispatcher {
    let http = reqwest::Client::new();
    let mut dispatcher = Dispatcher::new();

    if let Some(token) = &args.telegram_bot_token {
        dispatcher = dispatcher.with_telegram(TelegramChannel::new(http.clone(), token.clone()));
        info!("Telegram notification channel configured");
    }
    if let Some(url) = &args.push_gateway_url {
        dispatcher = dispatcher.with_push(PushGatewayChannel::new(http, url.clone()));
        info!("Push relay notification channel configured");
    }
    if !dispatcher.has_channels() {
        warn!("No notification channels configured; gate notifications will be dropped");
    }

    dispatcher
}

/// Creates the bootstrap super-admin account if it does not exist yet.
fn bootstrap_admin(persistence: &mut Persistence, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let (Some(login), Some(password)) = (&args.bootstrap_admin, &args.bootstrap_password) else {
        return Ok(());
    };

    if persistence.get_account_by_login(login)?.is_some() {
        info!(login_name = %login, "Bootstrap admin already exists");
        return Ok(());
    }

    let now = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Iso8601::DEFAULT)?;
    persistence.create_account(login, password, "super_admin", None, None, &now)?;
    info!(login_name = %login, "Bootstrap super-admin account created");

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Gatehouse Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    bootstrap_admin(&mut persistence, &args)?;

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        feed: Arc::new(ChangeFeedBroadcaster::new()),
        dispatcher: Arc::new(build_dispatcher(&args)),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode as HttpStatusCode},
    };
    use tower::ServiceExt;

    const NOW: &str = "2024-06-01T00:00:00Z";

    /// Creates test app state with in-memory persistence and a seeded
    /// super-admin account.
    fn create_test_app_state() -> AppState {
        let mut persistence =
            Persistence::new_in_memory().expect("Failed to create in-memory persistence");
        persistence
            .create_account("root", "RootPassword42", "super_admin", None, None, NOW)
            .expect("Failed to seed super admin");

        AppState {
            persistence: Arc::new(Mutex::new(persistence)),
            feed: Arc::new(ChangeFeedBroadcaster::new()),
            dispatcher: Arc::new(Dispatcher::new()),
        }
    }

    async fn post_json<T: Serialize>(
        app: &Router,
        uri: &str,
        token: Option<&str>,
        body: &T,
    ) -> (HttpStatusCode, serde_json::Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        let response = app
            .clone()
            .oneshot(
                builder
                    .body(Body::from(serde_json::to_string(body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get_json(
        app: &Router,
        uri: &str,
        token: &str,
    ) -> (HttpStatusCode, serde_json::Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(uri)
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn login(app: &Router, login_name: &str, password: &str) -> String {
        let (status, body) = post_json(
            app,
            "/login",
            None,
            &LoginApiRequest {
                login_name: login_name.to_string(),
                password: password.to_string(),
            },
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK, "login failed: {body}");
        body["session_token"].as_str().unwrap().to_string()
    }

    /// Provisions a building plus admin/guard accounts; returns
    /// (building_id, admin token, guard token).
    async fn seed_building_with_staff(app: &Router) -> (i64, String, String) {
        let root = login(app, "root", "RootPassword42").await;

        let (status, building) = post_json(
            app,
            "/buildings",
            Some(&root),
            &ProvisionBuildingRequest {
                name: String::from("Sunrise Towers"),
                address: String::from("12 Lakeshore Road"),
            },
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        let building_id = building["building_id"].as_i64().unwrap();

        for (login_name, password, role) in [
            ("admin.one", "AdminPassword42", "admin"),
            ("guard.one", "GuardPassword42", "guard"),
        ] {
            let (status, _) = post_json(
                app,
                "/accounts",
                Some(&root),
                &CreateAccountRequest {
                    login_name: login_name.to_string(),
                    password: password.to_string(),
                    role: role.to_string(),
                    building_id: Some(building_id),
                    profile_id: None,
                },
            )
            .await;
            assert_eq!(status, HttpStatusCode::OK);
        }

        let admin = login(app, "admin.one", "AdminPassword42").await;
        let guard = login(app, "guard.one", "GuardPassword42").await;
        (building_id, admin, guard)
    }

    /// Registers and verifies a resident in B-404, creates their account,
    /// and returns (profile_id, resident token).
    async fn seed_resident(app: &Router, building_id: i64, admin: &str) -> (i64, String) {
        let (status, profile) = post_json(
            app,
            "/residents",
            Some(admin),
            &RegisterResidentRequest {
                building_id,
                flat: String::from("B-404"),
                name: String::from("Ravi Mehta"),
                phone: String::from("9876543210"),
            },
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        let profile_id = profile["profile_id"].as_i64().unwrap();

        let (status, _) = post_json(
            app,
            "/residents/verify",
            Some(admin),
            &VerifyResidentRequest {
                building_id,
                profile_id,
            },
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);

        let (status, _) = post_json(
            app,
            "/accounts",
            Some(admin),
            &CreateAccountRequest {
                login_name: String::from("ravi.mehta"),
                password: String::from("FlatPassword42"),
                role: String::from("resident"),
                building_id: Some(building_id),
                profile_id: Some(profile_id),
            },
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);

        let resident = login(app, "ravi.mehta", "FlatPassword42").await;
        (profile_id, resident)
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let app = build_router(create_test_app_state());

        let (status, _) = post_json(
            &app,
            "/login",
            None,
            &LoginApiRequest {
                login_name: String::from("root"),
                password: String::from("wrong-password"),
            },
        )
        .await;
        assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_requests_require_a_session() {
        let app = build_router(create_test_app_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/visitors?building_id=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_full_gate_pass_flow() {
        let state = create_test_app_state();
        let mut feed = state.feed.subscribe();
        let app = build_router(state);

        let (building_id, admin, guard) = seed_building_with_staff(&app).await;
        let (_profile_id, resident) = seed_resident(&app, building_id, &admin).await;

        // Resident issues a pass
        let (status, pass) = post_json(
            &app,
            "/visitors/pass",
            Some(&resident),
            &IssuePassRequest {
                building_id,
                flat: String::from("B-404"),
                guest_name: String::from("Asha Patel"),
                phone: String::from("9123456780"),
                purpose: String::from("Family visit"),
            },
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(pass["status"], "pending");
        let code = pass["invite_code"].as_str().unwrap().to_string();
        let visitor_id = pass["visitor_id"].as_i64().unwrap();

        // Gate validates the code
        let (status, entered) = post_json(
            &app,
            "/gate/validate",
            Some(&guard),
            &ValidateCodeRequest {
                building_id,
                code: code.clone(),
            },
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(entered["status"], "entered");
        assert!(entered["check_in_at"].is_string());

        // The code is single-use
        let (status, _) = post_json(
            &app,
            "/gate/validate",
            Some(&guard),
            &ValidateCodeRequest { building_id, code },
        )
        .await;
        assert_eq!(status, HttpStatusCode::NOT_FOUND);

        // Gate records the exit; a second exit conflicts
        let (status, exited) = post_json(
            &app,
            "/gate/exit",
            Some(&guard),
            &ExitRequest {
                building_id,
                visitor_id,
            },
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(exited["status"], "exited");

        let (status, _) = post_json(
            &app,
            "/gate/exit",
            Some(&guard),
            &ExitRequest {
                building_id,
                visitor_id,
            },
        )
        .await;
        assert_eq!(status, HttpStatusCode::CONFLICT);

        // The feed saw the pass's lifecycle for this building
        let mut visitor_events = 0;
        while let Ok(event) = feed.try_recv() {
            if let ChangeEvent::Change {
                table, building_id: b, ..
            } = event
                && table == "visitors"
            {
                assert_eq!(b, building_id);
                visitor_events += 1;
            }
        }
        assert!(visitor_events >= 3, "expected insert + 2 updates on the feed");
    }

    #[tokio::test]
    async fn test_walk_in_approval_via_callback() {
        let app = build_router(create_test_app_state());

        let (building_id, admin, guard) = seed_building_with_staff(&app).await;
        seed_resident(&app, building_id, &admin).await;

        let (status, visitor) = post_json(
            &app,
            "/visitors/walk_in",
            Some(&guard),
            &WalkInRequest {
                building_id,
                flat: String::from("B-404"),
                guest_name: String::from("Vikram Singh"),
                phone: String::from("9988776655"),
                purpose: String::from("Courier delivery"),
            },
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(visitor["status"], "waiting_approval");
        let visitor_id = visitor["visitor_id"].as_i64().unwrap();

        // The approval arrives through the gateway callback
        let (status, approved) = post_json(
            &app,
            "/gate/callback",
            None,
            &serde_json::json!({ "action": "approve", "visitor_id": visitor_id }),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(approved["status"], "entered");

        // A second tap conflicts instead of silently succeeding
        let (status, _) = post_json(
            &app,
            "/gate/callback",
            None,
            &serde_json::json!({ "action": "deny", "visitor_id": visitor_id }),
        )
        .await;
        assert_eq!(status, HttpStatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_walk_in_for_unknown_flat_is_refused() {
        let app = build_router(create_test_app_state());

        let (building_id, _admin, guard) = seed_building_with_staff(&app).await;

        let (status, _) = post_json(
            &app,
            "/visitors/walk_in",
            Some(&guard),
            &WalkInRequest {
                building_id,
                flat: String::from("C-1"),
                guest_name: String::from("Vikram Singh"),
                phone: String::from("9988776655"),
                purpose: String::from("Courier delivery"),
            },
        )
        .await;
        assert_eq!(status, HttpStatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_booking_conflicts_over_http() {
        let app = build_router(create_test_app_state());

        let (building_id, admin, _guard) = seed_building_with_staff(&app).await;
        let (_profile_id, resident) = seed_resident(&app, building_id, &admin).await;

        let (status, amenity) = post_json(
            &app,
            "/amenities",
            Some(&admin),
            &CreateAmenityRequest {
                building_id,
                name: String::from("Pool"),
                open_time: String::from("09:00"),
                close_time: String::from("22:00"),
            },
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        let amenity_id = amenity["amenity_id"].as_i64().unwrap();

        let propose = |start: &str, end: &str| ProposeBookingRequest {
            building_id,
            amenity_id,
            date: String::from("2024-06-01"),
            start_time: start.to_string(),
            end_time: end.to_string(),
        };

        // Before opening hours
        let (status, _) =
            post_json(&app, "/bookings", Some(&resident), &propose("08:00", "09:00")).await;
        assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);

        // First booking lands
        let (status, booking) =
            post_json(&app, "/bookings", Some(&resident), &propose("10:00", "11:00")).await;
        assert_eq!(status, HttpStatusCode::OK);
        let booking_id = booking["booking_id"].as_i64().unwrap();

        // Overlap conflicts, touching boundary does not
        let (status, _) =
            post_json(&app, "/bookings", Some(&resident), &propose("10:30", "11:30")).await;
        assert_eq!(status, HttpStatusCode::CONFLICT);
        let (status, _) =
            post_json(&app, "/bookings", Some(&resident), &propose("11:00", "12:00")).await;
        assert_eq!(status, HttpStatusCode::OK);

        // Inverted range is rejected outright
        let (status, _) =
            post_json(&app, "/bookings", Some(&resident), &propose("15:00", "14:00")).await;
        assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);

        // Cancel frees the slot
        let uri = format!("/bookings/{booking_id}?building_id={building_id}");
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(&uri)
                    .header("Authorization", format!("Bearer {resident}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::OK);

        let (status, _) =
            post_json(&app, "/bookings", Some(&resident), &propose("10:00", "11:00")).await;
        assert_eq!(status, HttpStatusCode::OK);

        let (status, listed) = get_json(
            &app,
            &format!("/bookings?building_id={building_id}&amenity_id={amenity_id}&date=2024-06-01"),
            &resident,
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_role_matrix_over_http() {
        let app = build_router(create_test_app_state());

        let (building_id, admin, guard) = seed_building_with_staff(&app).await;
        let (_profile_id, resident) = seed_resident(&app, building_id, &admin).await;

        // Guards cannot book amenities
        let (status, _) = post_json(
            &app,
            "/bookings",
            Some(&guard),
            &ProposeBookingRequest {
                building_id,
                amenity_id: 1,
                date: String::from("2024-06-01"),
                start_time: String::from("10:00"),
                end_time: String::from("11:00"),
            },
        )
        .await;
        assert_eq!(status, HttpStatusCode::FORBIDDEN);

        // Residents cannot validate codes
        let (status, _) = post_json(
            &app,
            "/gate/validate",
            Some(&resident),
            &ValidateCodeRequest {
                building_id,
                code: String::from("123456"),
            },
        )
        .await;
        assert_eq!(status, HttpStatusCode::FORBIDDEN);

        // Admins cannot provision buildings
        let (status, _) = post_json(
            &app,
            "/buildings",
            Some(&admin),
            &ProvisionBuildingRequest {
                name: String::from("Moonrise Court"),
                address: String::from("48 Hillside Lane"),
            },
        )
        .await;
        assert_eq!(status, HttpStatusCode::FORBIDDEN);

        // Residents cannot post notices
        let (status, _) = post_json(
            &app,
            "/notices",
            Some(&resident),
            &PostNoticeRequest {
                building_id,
                title: String::from("Hello"),
                body: String::from("World"),
            },
        )
        .await;
        assert_eq!(status, HttpStatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_callback_for_unknown_visitor_is_not_found() {
        let app = build_router(create_test_app_state());

        let (status, _) = post_json(
            &app,
            "/gate/callback",
            None,
            &serde_json::json!({ "action": "approve", "visitor_id": 424242 }),
        )
        .await;
        assert_eq!(status, HttpStatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_notices_and_chat_flow() {
        let app = build_router(create_test_app_state());

        let (building_id, admin, _guard) = seed_building_with_staff(&app).await;
        let (_profile_id, resident) = seed_resident(&app, building_id, &admin).await;

        let (status, notice) = post_json(
            &app,
            "/notices",
            Some(&admin),
            &PostNoticeRequest {
                building_id,
                title: String::from("Water outage"),
                body: String::from("Maintenance on Friday morning"),
            },
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);

        let (status, listed) =
            get_json(&app, &format!("/notices?building_id={building_id}"), &resident).await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let notice_id = notice["notice_id"].as_i64().unwrap();
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/notices/{notice_id}?building_id={building_id}"))
                    .header("Authorization", format!("Bearer {admin}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::NO_CONTENT);

        let (status, message) = post_json(
            &app,
            "/chat",
            Some(&resident),
            &PostChatMessageRequest {
                building_id,
                body: String::from("hello neighbors"),
            },
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(message["sender_name"], "Ravi Mehta");

        let (status, page) =
            get_json(&app, &format!("/chat?building_id={building_id}"), &resident).await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(page.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_logout_invalidates_the_session() {
        let app = build_router(create_test_app_state());
        let root = login(&app, "root", "RootPassword42").await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/logout")
                    .header("Authorization", format!("Bearer {root}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::NO_CONTENT);

        let (status, _) = get_json(&app, "/buildings", &root).await;
        assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
    }
}
