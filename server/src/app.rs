//! Router, shared state and request handlers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use ledger_core::{verify_webhook, Ledger, PaymentProvider, TopUpKind};
use message_core::{Composer, Intent, PersonalizationProfile};
use voice_core::{SynthesisGateway, SynthesisMeta, SynthesisOutcome};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::validation::{validate_identifier, validate_quantity, validate_synthesis_text};

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub composer: Arc<Composer>,
    pub synthesis: Arc<SynthesisGateway>,
    pub payments: Arc<dyn PaymentProvider>,
    pub request_count: Arc<AtomicU64>,
    pub config: ServerConfig,
}

pub fn build_router(state: AppState) -> Router {
    let public_api = Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .route("/message", post(message_endpoint))
        .route("/tts", post(tts_endpoint))
        .route("/credits/consume", post(consume_credit_endpoint))
        .route("/listens/complete", post(complete_listen_endpoint))
        .route("/listens/restart", post(restart_listen_endpoint))
        .route("/checkout", post(checkout_endpoint))
        .route("/checkout/confirm", post(confirm_checkout_endpoint))
        .route("/webhook", post(webhook_endpoint));

    // Metrics endpoint - consider adding authentication in production
    let metrics_api = Router::new().route("/metrics", get(metrics_endpoint));

    let api = Router::new().merge(public_api).merge(metrics_api);

    Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .with_state(state)
}

pub async fn health_check() -> &'static str {
    "ok"
}

#[derive(Deserialize)]
pub struct MessageRequest {
    identifier: String,
    #[serde(default)]
    locale: Option<String>,
    #[serde(default)]
    personalization: Option<PersonalizationProfile>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    text: String,
    intent: Intent,
    remaining: u64,
}

/// Generate one personalized message. The credit gate runs before any
/// generation work; once the decrement succeeds the endpoint cannot fail,
/// because the composer always falls back to a template.
pub async fn message_endpoint(
    State(state): State<AppState>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    validate_identifier(&req.identifier, "identifier")?;

    let mut profile = match req.personalization {
        Some(p) => p,
        None => state
            .ledger
            .account(&req.identifier)
            .await?
            .personalization
            .ok_or_else(|| {
                ApiError::NotFound(format!("no personalization stored for {}", req.identifier))
            })?,
    };
    if profile.locale.is_none() {
        profile.locale = req.locale;
    }

    let remaining = state.ledger.consume_credit(&req.identifier).await?;
    let message = state.composer.generate(&req.identifier, &profile).await;

    info!(identifier = %req.identifier, intent = message.intent.name(), remaining, "message generated");
    Ok(Json(MessageResponse {
        text: message.text,
        intent: message.intent,
        remaining,
    }))
}

#[derive(Deserialize)]
pub struct TtsRequest {
    text: String,
    #[serde(default)]
    locale: Option<String>,
    #[serde(default)]
    voice: Option<String>,
    #[serde(default)]
    meta: Option<SynthesisMeta>,
}

pub async fn tts_endpoint(
    State(state): State<AppState>,
    Json(req): Json<TtsRequest>,
) -> Result<Json<SynthesisOutcome>, ApiError> {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    validate_synthesis_text(&req.text)?;

    let locale = message_core::Locale::parse(req.locale.as_deref().unwrap_or(""));
    let gender = message_core::Gender::parse(req.voice.as_deref().unwrap_or(""));
    let meta = req.meta.unwrap_or_default();

    let outcome = state
        .synthesis
        .synthesize(&req.text, locale, gender, &meta)
        .await?;
    Ok(Json(outcome))
}

#[derive(Deserialize)]
pub struct ConsumeRequest {
    identifier: String,
}

#[derive(Serialize)]
pub struct BalanceResponse {
    remaining: u64,
}

pub async fn consume_credit_endpoint(
    State(state): State<AppState>,
    Json(req): Json<ConsumeRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    validate_identifier(&req.identifier, "identifier")?;
    let remaining = state.ledger.consume_credit(&req.identifier).await?;
    Ok(Json(BalanceResponse { remaining }))
}

#[derive(Deserialize)]
pub struct ListenRequest {
    recording_id: String,
    session_id: String,
}

pub async fn complete_listen_endpoint(
    State(state): State<AppState>,
    Json(req): Json<ListenRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    validate_identifier(&req.recording_id, "recording_id")?;
    validate_identifier(&req.session_id, "session_id")?;
    let remaining = state
        .ledger
        .complete_listen(&req.recording_id, &req.session_id)
        .await?;
    Ok(Json(BalanceResponse { remaining }))
}

#[derive(Serialize)]
pub struct AckResponse {
    ok: bool,
}

pub async fn restart_listen_endpoint(
    State(state): State<AppState>,
    Json(req): Json<ListenRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    validate_identifier(&req.recording_id, "recording_id")?;
    validate_identifier(&req.session_id, "session_id")?;
    state.ledger.restart_listen(&req.recording_id, &req.session_id);
    Ok(Json(AckResponse { ok: true }))
}

#[derive(Deserialize)]
pub struct CheckoutRequest {
    identifier: String,
    credits: u64,
    #[serde(default)]
    kind: TopUpKind,
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    session_id: String,
    url: String,
}

pub async fn checkout_endpoint(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    validate_identifier(&req.identifier, "identifier")?;
    validate_quantity(req.credits)?;

    let session = state
        .payments
        .create_checkout_session(
            &req.identifier,
            req.kind,
            req.credits,
            state.config.credit_price_cents,
        )
        .await?;
    Ok(Json(CheckoutResponse {
        session_id: session.session_id,
        url: session.redirect_url,
    }))
}

#[derive(Deserialize)]
pub struct ConfirmRequest {
    session_id: String,
}

#[derive(Serialize)]
pub struct ConfirmResponse {
    ok: bool,
    kind: TopUpKind,
    total: u64,
}

/// Redirect-side payment confirmation. Idempotent: the webhook may already
/// have applied this session, in which case the current total comes back.
pub async fn confirm_checkout_endpoint(
    State(state): State<AppState>,
    Json(req): Json<ConfirmRequest>,
) -> Result<Json<ConfirmResponse>, ApiError> {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    if req.session_id.trim().is_empty() {
        return Err(ApiError::InvalidInput("session_id cannot be empty".to_string()));
    }

    let status = state.payments.retrieve_session(&req.session_id).await?;
    if !status.paid {
        return Err(ApiError::PaymentNotConfirmed(req.session_id));
    }

    let total = state
        .ledger
        .apply_payment(
            &req.session_id,
            &status.metadata.identifier,
            status.metadata.kind,
            status.metadata.quantity,
        )
        .await?;
    Ok(Json(ConfirmResponse {
        ok: true,
        kind: status.metadata.kind,
        total,
    }))
}

#[derive(Serialize)]
pub struct WebhookResponse {
    received: bool,
}

/// Payment-provider webhook. The raw body is verified against the signature
/// header before any parsing; unverified requests never touch the ledger.
pub async fn webhook_endpoint(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookResponse>, ApiError> {
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::InvalidInput("missing stripe-signature header".to_string()))?;

    let event = verify_webhook(&state.config.stripe_webhook_secret, signature, &body)?;

    if let Some(checkout) = event {
        if checkout.paid {
            state
                .ledger
                .apply_payment(
                    &checkout.session_id,
                    &checkout.metadata.identifier,
                    checkout.metadata.kind,
                    checkout.metadata.quantity,
                )
                .await?;
        } else {
            warn!(session_id = %checkout.session_id, "completed checkout not marked paid, ignoring");
        }
    }

    Ok(Json(WebhookResponse { received: true }))
}

#[derive(Serialize)]
pub struct MetricsResponse {
    pub cpu_usage_percent: f32,
    pub memory_used_mb: u64,
    pub memory_total_mb: u64,
    pub memory_usage_percent: f32,
    pub request_count: u64,
    pub uptime_seconds: u64,
    pub system_load: Option<f64>,
}

static START_TIME: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();

pub fn mark_started() {
    let _ = START_TIME.get_or_init(std::time::Instant::now);
}

pub async fn metrics_endpoint(State(state): State<AppState>) -> Json<MetricsResponse> {
    let mut system = sysinfo::System::new();
    system.refresh_cpu();
    system.refresh_memory();

    let cpu_usage = system.global_cpu_info().cpu_usage();
    let memory_used = system.used_memory();
    let memory_total = system.total_memory();
    let memory_usage_percent = if memory_total > 0 {
        (memory_used as f64 / memory_total as f64 * 100.0) as f32
    } else {
        0.0
    };

    let request_count = state.request_count.load(Ordering::Relaxed);
    let uptime = START_TIME
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0);

    let system_load = {
        #[cfg(unix)]
        {
            std::fs::read_to_string("/proc/loadavg")
                .ok()
                .and_then(|loadavg| {
                    loadavg
                        .split_whitespace()
                        .next()
                        .and_then(|s| s.parse::<f64>().ok())
                })
        }
        #[cfg(not(unix))]
        None
    };

    Json(MetricsResponse {
        cpu_usage_percent: cpu_usage,
        memory_used_mb: memory_used / 1024 / 1024,
        memory_total_mb: memory_total / 1024 / 1024,
        memory_usage_percent,
        request_count,
        uptime_seconds: uptime,
        system_load,
    })
}
