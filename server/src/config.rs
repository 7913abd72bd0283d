// Configuration constants for the server

use std::time::Duration;

use message_core::MessageStrategy;

#[derive(Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub rate_limit_per_minute: u32,
    pub request_timeout_secs: u64,
    pub synth_timeout_secs: u64,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub message_strategy: MessageStrategy,
    pub openai_api_key: String,
    pub text_model: String,
    pub storage_base_url: Option<String>,
    pub storage_bucket: String,
    pub storage_service_key: String,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub credit_price_cents: u64,
    pub checkout_success_url: String,
    pub checkout_cancel_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8085,
            rate_limit_per_minute: 60,
            request_timeout_secs: 60,
            synth_timeout_secs: 30,
            cors_allowed_origins: None,
            message_strategy: MessageStrategy::Template,
            openai_api_key: String::new(),
            text_model: "gpt-4o-mini".to_string(),
            storage_base_url: None,
            storage_bucket: "voices".to_string(),
            storage_service_key: String::new(),
            stripe_secret_key: String::new(),
            stripe_webhook_secret: String::new(),
            credit_price_cents: 100,
            checkout_success_url: "http://localhost:3000/listen?payment=success".to_string(),
            checkout_cancel_url: "http://localhost:3000/setup?payment=cancelled".to_string(),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|origins| origins.split(',').map(|s| s.trim().to_string()).collect());

        let message_strategy = match env_string("MESSAGE_STRATEGY", "template").as_str() {
            "provider" => MessageStrategy::Provider,
            _ => MessageStrategy::Template,
        };

        Self {
            port: env_or("PORT", defaults.port),
            rate_limit_per_minute: env_or("RATE_LIMIT_PER_MINUTE", defaults.rate_limit_per_minute),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            synth_timeout_secs: env_or("SYNTH_TIMEOUT_SECS", defaults.synth_timeout_secs),
            cors_allowed_origins,
            message_strategy,
            openai_api_key: env_string("OPENAI_API_KEY", ""),
            text_model: env_string("TEXT_MODEL", &defaults.text_model),
            storage_base_url: std::env::var("STORAGE_BASE_URL").ok().filter(|s| !s.is_empty()),
            storage_bucket: env_string("STORAGE_BUCKET", &defaults.storage_bucket),
            storage_service_key: env_string("STORAGE_SERVICE_KEY", ""),
            stripe_secret_key: env_string("STRIPE_SECRET_KEY", ""),
            stripe_webhook_secret: env_string("STRIPE_WEBHOOK_SECRET", ""),
            credit_price_cents: env_or("CREDIT_PRICE_CENTS", defaults.credit_price_cents),
            checkout_success_url: env_string("CHECKOUT_SUCCESS_URL", &defaults.checkout_success_url),
            checkout_cancel_url: env_string("CHECKOUT_CANCEL_URL", &defaults.checkout_cancel_url),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn synth_timeout(&self) -> Duration {
        Duration::from_secs(self.synth_timeout_secs)
    }
}
