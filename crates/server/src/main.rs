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
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod mailer;
mod session;
mod storage;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, State as AxumState},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use hotel_booking_api::{
    AddToCartRequest, AddToCartResponse, ApiError, BookingDetailAdditionalInfo, BookingInfo,
    CancelBookingResponse, CheckoutRequest, CheckoutResponse, CorrectAdditionalRequest,
    CreateFirstAdminRequest, CreateFirstAdminResponse, CreateOperatorRequest,
    CreateOperatorResponse, HandlerOutcome, InvoiceInfo, LoginRequest, LoginResponse,
    Notification, ReceiptUpload, RemoveFromCartResponse, RemoveGuestsRequest,
    RemoveGuestsResponse, SetGuestsRequest, SetGuestsResponse, StatusChangeResponse,
    UpdateDetailStatusRequest, UpdateNotesRequest, UpdatePaymentStatusRequest,
    UpdatePaymentStatusResponse, UploadReceiptRequest, UploadReceiptResponse, WhoAmIResponse,
};
use hotel_booking_persistence::{CatalogImportSummary, CatalogSeed, SqlitePersistence};

use crate::mailer::{LogMailer, Mailer, dispatch_notifications};
use crate::session::{SessionError, SessionOperator, bearer_token};
use crate::storage::{FileStorage, LocalFileStorage, MAX_RECEIPT_BYTES, StorageError};

/// Hotel Booking Server - HTTP backend for agent bookings and admin review
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "HOTEL_BOOKING_DATABASE")]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Directory receipts are written to
    #[arg(long, default_value = "./uploads")]
    storage_dir: PathBuf,

    /// URL prefix under which stored receipts are served
    #[arg(long, default_value = "http://localhost:3000/uploads")]
    public_base_url: String,

    /// Upper bound for delivering one notification
    #[arg(long, default_value_t = 10)]
    notification_timeout_secs: u64,

    /// JSON catalog of hotels, rooms, prices, promos and add-ons to import at startup
    #[arg(long)]
    catalog_seed: Option<PathBuf>,

    /// Address that receives admin-facing notifications
    #[arg(long)]
    admin_email: Option<String>,
}

/// Runtime settings the handlers read.
#[derive(Debug, Clone)]
struct ServerConfig {
    admin_email: Option<String>,
    notification_timeout: Duration,
}

/// Application state shared across handlers.
///
/// The persistence layer is wrapped in a Mutex. Handlers release it before
/// any storage or notification I/O.
#[derive(Clone)]
struct AppState {
    persistence: Arc<Mutex<SqlitePersistence>>,
    mailer: Arc<dyn Mailer>,
    storage: Arc<dyn FileStorage>,
    config: Arc<ServerConfig>,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// Empty success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SuccessResponse {
    success: bool,
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
        let status: StatusCode = match err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<SessionError> for HttpError {
    fn from(err: SessionError) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: err.message(),
        }
    }
}

impl From<StorageError> for HttpError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidEncoding(_) | StorageError::EmptyFile => Self {
                status: StatusCode::BAD_REQUEST,
                message: err.to_string(),
            },
            StorageError::TooLarge { .. } => Self {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                message: err.to_string(),
            },
            StorageError::InvalidKey(_) | StorageError::Io(_) => {
                error!(error = %err, "Receipt storage failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: String::from("Failed to store the uploaded file"),
                }
            }
        }
    }
}

/// Hands committed notifications to the mailer without waiting for delivery.
fn notify(app_state: &AppState, notifications: Vec<Notification>) {
    if notifications.is_empty() {
        return;
    }
    drop(dispatch_notifications(
        Arc::clone(&app_state.mailer),
        notifications,
        app_state.config.notification_timeout,
    ));
}

/// Sends an outcome's notifications and returns its response.
fn deliver<T>(app_state: &AppState, outcome: HandlerOutcome<T>) -> T {
    notify(app_state, outcome.notifications);
    outcome.response
}

// ============================================================================
// Identity
// ============================================================================

/// Handler for POST `/auth/first_admin` endpoint.
///
/// Only succeeds while no operator exists.
async fn handle_create_first_admin(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateFirstAdminRequest>,
) -> Result<Json<CreateFirstAdminResponse>, HttpError> {
    info!(login_name = %req.login_name, "Handling create_first_admin request");

    let mut persistence = app_state.persistence.lock().await;
    let response: CreateFirstAdminResponse =
        hotel_booking_api::create_first_admin(&mut persistence, req)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/auth/login` endpoint.
async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    info!(login_name = %req.login_name, "Handling login request");

    let mut persistence = app_state.persistence.lock().await;
    let response: LoginResponse = hotel_booking_api::login(&mut persistence, &req)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/auth/logout` endpoint.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    headers: HeaderMap,
) -> Result<Json<SuccessResponse>, HttpError> {
    let token: &str = bearer_token(&headers)?;

    let mut persistence = app_state.persistence.lock().await;
    hotel_booking_api::logout(&mut persistence, token)?;
    drop(persistence);

    info!(operator_id = actor.operator_id, "Operator logged out");
    Ok(Json(SuccessResponse { success: true }))
}

/// Handler for GET `/auth/whoami` endpoint.
#[allow(clippy::unused_async)]
async fn handle_whoami(
    SessionOperator(_actor, operator): SessionOperator,
) -> Json<WhoAmIResponse> {
    Json(hotel_booking_api::whoami(&operator))
}

/// Handler for POST `/operators` endpoint.
async fn handle_create_operator(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Json(req): Json<CreateOperatorRequest>,
) -> Result<Json<CreateOperatorResponse>, HttpError> {
    info!(
        operator_id = actor.operator_id,
        login_name = %req.login_name,
        role = %req.role,
        "Handling create_operator request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: CreateOperatorResponse =
        hotel_booking_api::create_operator(&mut persistence, req, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

// ============================================================================
// Cart
// ============================================================================

/// Handler for GET `/cart` endpoint.
async fn handle_get_cart(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
) -> Result<Json<BookingInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: BookingInfo = hotel_booking_api::get_cart(&mut persistence, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/cart/items` endpoint.
///
/// Adds `quantity` rooms of one price offer to the agent's cart.
async fn handle_add_to_cart(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Json(req): Json<AddToCartRequest>,
) -> Result<Json<AddToCartResponse>, HttpError> {
    info!(
        agent_id = actor.operator_id,
        room_price_id = req.room_price_id,
        quantity = req.quantity,
        "Handling add_to_cart request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: AddToCartResponse =
        hotel_booking_api::add_to_cart(&mut persistence, &actor, &req)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for DELETE `/cart/items/{detail_id}` endpoint.
async fn handle_remove_from_cart(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(detail_id): Path<i64>,
) -> Result<Json<RemoveFromCartResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RemoveFromCartResponse =
        hotel_booking_api::remove_from_cart(&mut persistence, &actor, detail_id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for PUT `/cart/items/{detail_id}/notes` endpoint.
async fn handle_update_cart_notes(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(detail_id): Path<i64>,
    Json(req): Json<UpdateNotesRequest>,
) -> Result<Json<SuccessResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    hotel_booking_api::update_cart_additional_notes(&mut persistence, &actor, detail_id, &req)?;
    drop(persistence);

    Ok(Json(SuccessResponse { success: true }))
}

/// Handler for PUT `/cart/guests` endpoint.
async fn handle_add_guests(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Json(req): Json<SetGuestsRequest>,
) -> Result<Json<SetGuestsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: SetGuestsResponse =
        hotel_booking_api::add_guests_to_cart(&mut persistence, &actor, &req)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/cart/guests/remove` endpoint.
async fn handle_remove_guests(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Json(req): Json<RemoveGuestsRequest>,
) -> Result<Json<RemoveGuestsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RemoveGuestsResponse =
        hotel_booking_api::remove_guests_from_cart(&mut persistence, &actor, &req)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/cart/checkout` endpoint.
///
/// Submits the cart for approval and notifies the agent and, when
/// configured, the reviewing admins.
async fn handle_checkout(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, HttpError> {
    info!(agent_id = actor.operator_id, "Handling checkout request");

    let mut persistence = app_state.persistence.lock().await;
    let outcome: HandlerOutcome<CheckoutResponse> = hotel_booking_api::check_out_cart(
        &mut persistence,
        &actor,
        &req,
        app_state.config.admin_email.as_deref(),
    )?;
    drop(persistence);

    Ok(Json(deliver(&app_state, outcome)))
}

// ============================================================================
// Bookings
// ============================================================================

/// Handler for GET `/bookings/{booking_id}` endpoint.
async fn handle_get_booking(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: BookingInfo =
        hotel_booking_api::get_booking(&mut persistence, &actor, booking_id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/bookings/{booking_id}/details/status` endpoint.
///
/// Approves or rejects waiting sub-bookings and notifies their agent.
async fn handle_update_detail_status(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(booking_id): Path<i64>,
    Json(req): Json<UpdateDetailStatusRequest>,
) -> Result<Json<StatusChangeResponse>, HttpError> {
    info!(
        admin_id = actor.operator_id,
        booking_id,
        status = %req.status,
        detail_count = req.booking_detail_ids.len(),
        "Handling update_booking_detail_status request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let outcome: HandlerOutcome<StatusChangeResponse> =
        hotel_booking_api::update_booking_detail_status(
            &mut persistence,
            &actor,
            booking_id,
            &req,
        )?;
    drop(persistence);

    Ok(Json(deliver(&app_state, outcome)))
}

/// Handler for POST `/bookings/{booking_id}/details/payment` endpoint.
async fn handle_update_payment_status(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(booking_id): Path<i64>,
    Json(req): Json<UpdatePaymentStatusRequest>,
) -> Result<Json<UpdatePaymentStatusResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: UpdatePaymentStatusResponse =
        hotel_booking_api::update_payment_status(&mut persistence, &actor, booking_id, &req)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for PUT `/booking_details/{detail_id}/admin_notes` endpoint.
async fn handle_update_admin_notes(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(detail_id): Path<i64>,
    Json(req): Json<UpdateNotesRequest>,
) -> Result<Json<SuccessResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    hotel_booking_api::update_booking_detail_admin_notes(
        &mut persistence,
        &actor,
        detail_id,
        &req,
    )?;
    drop(persistence);

    Ok(Json(SuccessResponse { success: true }))
}

/// Handler for GET `/booking_details/{detail_id}/invoice` endpoint.
async fn handle_get_invoice(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(detail_id): Path<i64>,
) -> Result<Json<InvoiceInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: InvoiceInfo =
        hotel_booking_api::get_invoice(&mut persistence, &actor, detail_id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for PUT `/booking_detail_additionals/{id}` endpoint.
async fn handle_correct_additional(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(additional_id): Path<i64>,
    Json(req): Json<CorrectAdditionalRequest>,
) -> Result<Json<BookingDetailAdditionalInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: BookingDetailAdditionalInfo =
        hotel_booking_api::correct_booking_detail_additional(
            &mut persistence,
            &actor,
            additional_id,
            &req,
        )?;
    drop(persistence);

    Ok(Json(response))
}

// ============================================================================
// Sub-bookings
// ============================================================================

/// Handler for POST `/sub_bookings/{code}/cancel` endpoint.
async fn handle_cancel_booking(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(code): Path<String>,
) -> Result<Json<CancelBookingResponse>, HttpError> {
    info!(
        agent_id = actor.operator_id,
        sub_booking_code = %code,
        "Handling cancel_booking request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let outcome: HandlerOutcome<CancelBookingResponse> =
        hotel_booking_api::cancel_booking(&mut persistence, &actor, &code)?;
    drop(persistence);

    Ok(Json(deliver(&app_state, outcome)))
}

/// Handler for POST `/sub_bookings/{code}/receipt` endpoint.
///
/// The file is written to storage between two short persistence calls,
/// so no database lock is held during the upload.
async fn handle_upload_receipt(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(code): Path<String>,
    Json(req): Json<UploadReceiptRequest>,
) -> Result<Json<UploadReceiptResponse>, HttpError> {
    info!(
        agent_id = actor.operator_id,
        sub_booking_code = %code,
        file_name = %req.file_name,
        "Handling upload_receipt request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let upload: ReceiptUpload =
        hotel_booking_api::prepare_receipt_upload(&mut persistence, &actor, &code, &req)?;
    drop(persistence);

    let content: Vec<u8> = storage::decode_upload(&req.content_base64)?;
    let receipt_url: String = app_state
        .storage
        .upload(&upload.object_key, &upload.content_type, content)
        .await?;

    let mut persistence = app_state.persistence.lock().await;
    let response: UploadReceiptResponse =
        hotel_booking_api::record_receipt(&mut persistence, &actor, &code, &receipt_url)?;
    drop(persistence);

    Ok(Json(response))
}

/// Request body limit for receipt uploads, allowing for base64 expansion.
const RECEIPT_BODY_LIMIT: usize = MAX_RECEIPT_BYTES / 3 * 4 + 64 * 1024;

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/auth/first_admin", post(handle_create_first_admin))
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/auth/whoami", get(handle_whoami))
        .route("/operators", post(handle_create_operator))
        .route("/cart", get(handle_get_cart))
        .route("/cart/items", post(handle_add_to_cart))
        .route("/cart/items/{detail_id}", delete(handle_remove_from_cart))
        .route("/cart/items/{detail_id}/notes", put(handle_update_cart_notes))
        .route("/cart/guests", put(handle_add_guests))
        .route("/cart/guests/remove", post(handle_remove_guests))
        .route("/cart/checkout", post(handle_checkout))
        .route("/bookings/{booking_id}", get(handle_get_booking))
        .route(
            "/bookings/{booking_id}/details/status",
            post(handle_update_detail_status),
        )
        .route(
            "/bookings/{booking_id}/details/payment",
            post(handle_update_payment_status),
        )
        .route(
            "/booking_details/{detail_id}/admin_notes",
            put(handle_update_admin_notes),
        )
        .route(
            "/booking_details/{detail_id}/invoice",
            get(handle_get_invoice),
        )
        .route(
            "/booking_detail_additionals/{id}",
            put(handle_correct_additional),
        )
        .route("/sub_bookings/{code}/cancel", post(handle_cancel_booking))
        .route(
            "/sub_bookings/{code}/receipt",
            post(handle_upload_receipt).layer(DefaultBodyLimit::max(RECEIPT_BODY_LIMIT)),
        )
        .with_state(app_state)
}

/// Imports the catalog seed file into the database.
async fn import_catalog_seed(
    persistence: &mut SqlitePersistence,
    path: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw: String = tokio::fs::read_to_string(path).await?;
    let seed: CatalogSeed = serde_json::from_str(&raw)?;
    let summary: CatalogImportSummary = persistence.import_catalog(&seed)?;
    info!(
        path = %path.display(),
        hotels = summary.hotels,
        room_types = summary.room_types,
        room_prices = summary.room_prices,
        promos = summary.promos,
        additionals = summary.additionals,
        "Imported catalog seed"
    );
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

    info!("Initializing Hotel Booking Server");

    let mut persistence: SqlitePersistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        SqlitePersistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        SqlitePersistence::new_in_memory()?
    };

    let expired: usize = persistence.delete_expired_sessions()?;
    if expired > 0 {
        info!(expired, "Removed expired sessions");
    }

    if let Some(seed_path) = &args.catalog_seed {
        import_catalog_seed(&mut persistence, seed_path).await?;
    }

    if args.admin_email.is_none() {
        warn!("No --admin-email configured; admins will not be notified of new bookings");
    }

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        mailer: LogMailer::shared(),
        storage: LocalFileStorage::new(&args.storage_dir, &args.public_base_url).shared(),
        config: Arc::new(ServerConfig {
            admin_email: args.admin_email,
            notification_timeout: Duration::from_secs(args.notification_timeout_secs),
        }),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
