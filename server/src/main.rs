use std::net::SocketAddr;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::GlobalKeyExtractor, GovernorLayer,
};
use tracing::{info, warn};

use ledger_core::{Ledger, MemoryLedger, PaymentProvider, StripePayment};
use message_core::{Composer, MessageStrategy, OpenAiTextProvider};
use voice_core::{HttpObjectStore, MemoryStore, ObjectStore, OpenAiSpeech, SynthesisGateway};

use server::app::{build_router, mark_started, AppState};
use server::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _ = dotenv::dotenv();

    async_main().await
}

async fn async_main() -> anyhow::Result<()> {
    info!("Starting message/voice server...");

    let config = ServerConfig::from_env();
    mark_started();

    let composer = match config.message_strategy {
        MessageStrategy::Provider if !config.openai_api_key.is_empty() => {
            info!("Message strategy: provider ({})", config.text_model);
            Arc::new(Composer::with_provider(Arc::new(OpenAiTextProvider::new(
                &config.openai_api_key,
                &config.text_model,
            ))))
        }
        MessageStrategy::Provider => {
            warn!("MESSAGE_STRATEGY=provider but no OPENAI_API_KEY, using templates");
            Arc::new(Composer::template())
        }
        MessageStrategy::Template => Arc::new(Composer::template()),
    };

    let store: Arc<dyn ObjectStore> = match &config.storage_base_url {
        Some(base_url) => {
            info!("Audio storage: {base_url} bucket={}", config.storage_bucket);
            Arc::new(HttpObjectStore::new(
                base_url,
                &config.storage_bucket,
                &config.storage_service_key,
            ))
        }
        None => {
            warn!("STORAGE_BASE_URL not set, audio cache is in-memory only");
            Arc::new(MemoryStore::new())
        }
    };
    let synthesis = Arc::new(
        SynthesisGateway::new(Arc::new(OpenAiSpeech::new(&config.openai_api_key)), store)
            .with_timeout(config.synth_timeout()),
    );

    // TODO: back this with the jewels database once its Rust client lands;
    // the in-memory ledger only survives a single process.
    let ledger = Arc::new(Ledger::new(Arc::new(MemoryLedger::new())));

    let payments: Arc<dyn PaymentProvider> = Arc::new(StripePayment::new(
        &config.stripe_secret_key,
        &config.checkout_success_url,
        &config.checkout_cancel_url,
    ));

    let state = AppState {
        ledger,
        composer,
        synthesis,
        payments,
        request_count: Arc::new(AtomicU64::new(0)),
        config: config.clone(),
    };
    info!(
        "Server configuration loaded: port={}, rate_limit={}/min, synth_timeout={}s",
        config.port, config.rate_limit_per_minute, config.synth_timeout_secs
    );

    // CORS configuration - environment-aware
    let cors = if let Some(ref allowed_origins) = config.cors_allowed_origins {
        let origins: Vec<axum::http::HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin: &String| origin.parse::<axum::http::HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            warn!("CORS_ALLOWED_ORIGINS is empty, falling back to permissive CORS");
            permissive_cors()
        } else {
            info!("CORS configured for {} origin(s)", origins.len());
            CorsLayer::new()
                .allow_origin(tower_http::cors::AllowOrigin::list(origins))
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(tower_http::cors::Any)
                .allow_credentials(false)
        }
    } else {
        warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (development mode)");
        permissive_cors()
    };

    // Global rate limiting; per-IP extraction is unreliable behind proxies
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second((config.rate_limit_per_minute / 60) as u64)
            .burst_size(config.rate_limit_per_minute)
            .key_extractor(GlobalKeyExtractor)
            .finish()
            .expect("governor configuration is valid"),
    );
    info!("Rate limiting: {} requests per minute", config.rate_limit_per_minute);

    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer::new(governor_conf))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(cors)
        .into_inner();

    let app = build_router(state)
        .layer(axum::middleware::from_fn(add_request_id))
        .layer(middleware_stack);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {addr}: {e}. Try a different PORT."))?;

    info!("Server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn permissive_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers(tower_http::cors::Any)
        .allow_credentials(false)
}

// Request ID middleware for tracing
async fn add_request_id(mut request: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    if let Ok(value) = axum::http::HeaderValue::from_str(&request_id) {
        request.headers_mut().insert("x-request-id", value.clone());
        let mut response = next.run(request).await;
        response.headers_mut().insert("x-request-id", value);
        response
    } else {
        next.run(request).await
    }
}
