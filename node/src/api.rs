//! # REST API
//!
//! Builds the axum router for the donation service. All handlers share
//! application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                  | Description                                    |
//! |--------|-----------------------|------------------------------------------------|
//! | GET    | `/`                   | Service banner                                 |
//! | GET    | `/health`             | Liveness probe                                 |
//! | POST   | `/create`             | Sign a donation request                        |
//! | POST   | `/api/payu`           | Same as `/create`                              |
//! | POST   | `/api/payu/initiate`  | Same as `/create`                              |
//! | POST   | `/verify`             | Verify a callback (JSON or form), return JSON  |
//! | POST   | `/payu/callback`      | Verify a gateway post-back and redirect        |

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use donation_protocol::callback::VerificationResult;
use donation_protocol::config::{GatewayEndpoints, Profile};
use donation_protocol::{
    build_payload, verify_callback, GatewayCallback, MerchantCredentials, Outcome,
    OutcomeResolver, ProtocolError, SignedPaymentPayload, TransactionRequest, TxnIdGenerator,
};

use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone; everything heavy sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Reported version string.
    pub version: String,
    pub profile: Profile,
    /// `None` only in the development profile when no secrets were supplied.
    pub credentials: Option<Arc<MerchantCredentials>>,
    pub endpoints: Arc<GatewayEndpoints>,
    pub resolver: Arc<OutcomeResolver>,
    pub txnids: Arc<TxnIdGenerator>,
    pub metrics: SharedMetrics,
    /// Adds panic messages and computed callback hashes to responses.
    pub expose_error_detail: bool,
}

impl AppState {
    fn credentials(&self) -> Result<&MerchantCredentials, ApiError> {
        self.credentials.as_deref().ok_or_else(|| {
            ApiError::Protocol(ProtocolError::Configuration {
                reason: "merchant credentials not supplied".into(),
            })
        })
    }

    fn count_validation(&self, err: ProtocolError) -> ProtocolError {
        if matches!(err, ProtocolError::Validation { .. }) {
            self.metrics.validation_errors_total.inc();
        }
        err
    }
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all routes, CORS, tracing, and panic
/// recovery.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/create", post(create_handler))
        .route("/api/payu", post(create_handler))
        .route("/api/payu/initiate", post(create_handler))
        .route("/verify", post(verify_handler))
        .route("/payu/callback", post(callback_handler))
        .layer(CatchPanicLayer::custom(panic_response(state.expose_error_detail)))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Everything a handler can fail with.
#[derive(Debug)]
pub enum ApiError {
    /// Validation or configuration failure from the protocol crate.
    Protocol(ProtocolError),
    /// The body could not be read as JSON or form data.
    MalformedBody { status: StatusCode, message: String },
    /// Unexpected failure. `detail` is already gated on `expose_error_detail`.
    Internal { detail: Option<String> },
}

/// Error body shared by every non-2xx JSON response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            missing_fields: Vec::new(),
            detail: None,
        }
    }
}

impl From<ProtocolError> for ApiError {
    fn from(err: ProtocolError) -> Self {
        ApiError::Protocol(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Protocol(err @ ProtocolError::Validation { .. }) => {
                let mut body = ErrorResponse::new(err.to_string());
                body.missing_fields = err
                    .missing_fields()
                    .iter()
                    .map(|field| field.to_string())
                    .collect();
                (StatusCode::BAD_REQUEST, body)
            }
            ApiError::Protocol(ProtocolError::Configuration { reason }) => {
                tracing::error!(%reason, "request refused: service not configured");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse::new("payment service is not configured"),
                )
            }
            ApiError::MalformedBody { status, message } => (status, ErrorResponse::new(message)),
            ApiError::Internal { detail } => {
                let mut body = ErrorResponse::new("internal server error");
                body.detail = detail;
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Turns a handler panic into a 500 JSON response instead of a dropped
/// connection.
fn panic_response(
    expose_error_detail: bool,
) -> impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone {
    move |payload: Box<dyn Any + Send + 'static>| {
        let message = if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else {
            "unknown panic".to_string()
        };
        tracing::error!(panic = %message, "handler panicked");

        ApiError::Internal {
            detail: expose_error_detail.then_some(message),
        }
        .into_response()
    }
}

// ---------------------------------------------------------------------------
// Extractors
// ---------------------------------------------------------------------------

/// A gateway callback read from either a JSON or a form-encoded body.
///
/// The gateway itself posts `application/x-www-form-urlencoded`; frontends
/// relaying the callback usually send JSON.
pub struct CallbackBody(pub GatewayCallback);

#[axum::async_trait]
impl<S> FromRequest<S> for CallbackBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or(false, |ct| {
                ct.starts_with("application/x-www-form-urlencoded")
            });

        if is_form {
            let Form(callback) = Form::<GatewayCallback>::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::MalformedBody {
                    status: rejection.status(),
                    message: rejection.body_text(),
                })?;
            Ok(CallbackBody(callback))
        } else {
            let Json(callback) = Json::<GatewayCallback>::from_request(req, state).await?;
            Ok(CallbackBody(callback))
        }
    }
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Response to the create routes.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateResponse {
    pub success: bool,
    /// Gateway URL the frontend must POST `params` to.
    pub action: String,
    pub params: SignedPaymentPayload,
}

/// Response to `/verify`, and to `/payu/callback` when there is nowhere to
/// redirect.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub txnid: String,
    pub status: String,
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed_hash: Option<String>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /`: service banner.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "donation-node",
        "version": state.version,
        "profile": state.profile.to_string(),
        "signing_enabled": state.credentials.is_some(),
    }))
}

/// `GET /health`: returns 200 while the process is up.
///
/// Deliberately independent of credentials; a development instance without
/// secrets is still alive.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// `POST /create` and its aliases: signs a donation request.
///
/// Uses the caller's `txnId` when one is supplied, otherwise generates one.
async fn create_handler(
    State(state): State<AppState>,
    body: Result<Json<TransactionRequest>, JsonRejection>,
) -> Result<Json<CreateResponse>, ApiError> {
    let Json(request) = body?;
    let credentials = state.credentials()?;

    let txnid = state.txnids.resolve(request.txn_id.as_deref());

    let timer = state.metrics.signing_latency_seconds.start_timer();
    let payload = build_payload(&request, &txnid, credentials, &state.endpoints)
        .map_err(|e| state.count_validation(e))?;
    timer.observe_duration();

    state.metrics.payments_signed_total.inc();
    tracing::info!(txnid = %txnid, "payment request signed");

    Ok(Json(CreateResponse {
        success: true,
        action: state.endpoints.payment_url.clone(),
        params: payload,
    }))
}

/// `POST /verify`: checks a callback and reports the resolved outcome.
async fn verify_handler(
    State(state): State<AppState>,
    CallbackBody(callback): CallbackBody,
) -> Result<Json<VerifyResponse>, ApiError> {
    let (result, outcome) = check_callback(&state, &callback)?;
    Ok(Json(verify_response(&state, &callback, result, outcome)))
}

/// `POST /payu/callback`: the gateway's browser post-back to `surl`/`furl`.
///
/// Redirects (303) to the outcome's target. A pending outcome has no target
/// and is answered with the same JSON as `/verify`.
async fn callback_handler(
    State(state): State<AppState>,
    CallbackBody(callback): CallbackBody,
) -> Result<Response, ApiError> {
    let (result, outcome) = check_callback(&state, &callback)?;
    match outcome.redirect.clone() {
        Some(target) => Ok(Redirect::to(&target).into_response()),
        None => Ok(Json(verify_response(&state, &callback, result, outcome)).into_response()),
    }
}

fn check_callback(
    state: &AppState,
    callback: &GatewayCallback,
) -> Result<(VerificationResult, Outcome), ApiError> {
    let credentials = state.credentials()?;
    let result = verify_callback(callback, credentials).map_err(|e| state.count_validation(e))?;

    if result.is_valid {
        state.metrics.callbacks_verified_total.inc();
    } else {
        state.metrics.callbacks_rejected_total.inc();
    }

    let outcome = state.resolver.resolve(callback.status(), result.is_valid);
    state
        .metrics
        .outcomes_total
        .with_label_values(&[outcome.disposition.as_str()])
        .inc();

    tracing::info!(
        txnid = callback.txnid(),
        status = callback.status(),
        valid = result.is_valid,
        disposition = %outcome.disposition,
        "callback resolved"
    );
    Ok((result, outcome))
}

fn verify_response(
    state: &AppState,
    callback: &GatewayCallback,
    result: VerificationResult,
    outcome: Outcome,
) -> VerifyResponse {
    VerifyResponse {
        success: true,
        txnid: callback.txnid().to_string(),
        status: callback.status().to_string(),
        is_valid: result.is_valid,
        computed_hash: state.expose_error_detail.then_some(result.computed_hash),
        outcome,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
