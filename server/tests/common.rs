//! Common utilities for integration tests

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;

use ledger_core::{
    CheckoutSession, Ledger, LedgerError, MemoryLedger, PaymentMetadata, PaymentProvider,
    Recording, SessionStatus, TopUpKind,
};
use message_core::{Composer, PersonalizationProfile};
use server::app::AppState;
use server::config::ServerConfig;
use voice_core::{MemoryStore, SpeechSynthesizer, SynthesisGateway, VoiceError};

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test";

/// Deterministic fake speech engine; counts calls so tests can assert the
/// cache short-circuits the provider.
pub struct FakeSynth {
    pub calls: AtomicU64,
}

#[async_trait]
impl SpeechSynthesizer for FakeSynth {
    async fn synthesize(&self, _speaker: &str, text: &str) -> Result<Vec<u8>, VoiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(text.as_bytes().to_vec())
    }
}

/// Speech engine that always fails, standing in for a provider outage.
pub struct BrokenSynth;

#[async_trait]
impl SpeechSynthesizer for BrokenSynth {
    async fn synthesize(&self, _speaker: &str, _text: &str) -> Result<Vec<u8>, VoiceError> {
        Err(VoiceError::UpstreamUnavailable(
            "speech provider offline".to_string(),
        ))
    }
}

/// Fake payment provider: sessions named `cs_paid_*` are paid, everything
/// else is pending. Metadata mirrors the checkout request.
pub struct FakePayments;

#[async_trait]
impl PaymentProvider for FakePayments {
    async fn create_checkout_session(
        &self,
        identifier: &str,
        kind: TopUpKind,
        quantity: u64,
        _unit_amount_cents: u64,
    ) -> Result<CheckoutSession, LedgerError> {
        let kind_tag = match kind {
            TopUpKind::Credits => "credits",
            TopUpKind::Listens => "listens",
        };
        Ok(CheckoutSession {
            session_id: format!("cs_paid_{identifier}_{kind_tag}_{quantity}"),
            redirect_url: "https://checkout.example/session".to_string(),
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionStatus, LedgerError> {
        let parts: Vec<&str> = session_id.split('_').collect();
        if parts.len() < 5 {
            return Err(LedgerError::NotFound(format!("unknown session {session_id}")));
        }
        let kind = match parts[3] {
            "listens" => TopUpKind::Listens,
            _ => TopUpKind::Credits,
        };
        let quantity: u64 = parts[4].parse().unwrap_or(0);
        Ok(SessionStatus {
            paid: parts[1] == "paid",
            metadata: PaymentMetadata {
                identifier: parts[2].to_string(),
                kind,
                quantity,
            },
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub synth: Arc<FakeSynth>,
}

/// Create a test app instance over in-memory collaborators. The seeded
/// jewel `mw-1` has 3 credits and a locked recording `rec-1` with 2 listens.
pub fn create_test_app() -> TestApp {
    let synth = Arc::new(FakeSynth {
        calls: AtomicU64::new(0),
    });
    TestApp {
        router: build_app(synth.clone()),
        synth,
    }
}

/// Same seeded app, but every synthesis call fails.
pub fn create_broken_synth_app() -> Router {
    build_app(Arc::new(BrokenSynth))
}

fn build_app(synth: Arc<dyn SpeechSynthesizer>) -> Router {
    let store = MemoryLedger::new();
    store.seed_account(
        "mw-1",
        ledger_core::JewelAccount {
            credits: 3,
            active: true,
            personalization: Some(PersonalizationProfile {
                first_name: Some("Marie".to_string()),
                theme: Some("Amour".to_string()),
                ..Default::default()
            }),
        },
    );
    store.seed_account(
        "mw-empty",
        ledger_core::JewelAccount {
            credits: 0,
            active: true,
            personalization: None,
        },
    );
    store.seed_recording(Recording {
        id: "rec-1".to_string(),
        identifier: "mw-1".to_string(),
        listens: 2,
        locked: true,
        created_at: Utc::now(),
    });

    let synthesis = Arc::new(SynthesisGateway::new(synth, Arc::new(MemoryStore::new())));

    let config = ServerConfig {
        stripe_webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
        ..Default::default()
    };

    let state = AppState {
        ledger: Arc::new(Ledger::new(Arc::new(store))),
        composer: Arc::new(Composer::template()),
        synthesis,
        payments: Arc::new(FakePayments),
        request_count: Arc::new(AtomicU64::new(0)),
        config,
    };

    server::app::build_router(state)
}

/// HMAC-SHA256 signature header in the provider's `t=...,v1=...` format.
pub fn webhook_signature(secret: &str, timestamp: &str, body: &str) -> String {
    use sha2::{Digest, Sha256};

    const BLOCK: usize = 64;
    let key = secret.as_bytes();
    let mut key_block = [0u8; BLOCK];
    if key.len() > BLOCK {
        key_block[..32].copy_from_slice(&Sha256::digest(key));
    } else {
        key_block[..key.len()].copy_from_slice(key);
    }

    let message = format!("{timestamp}.{body}");
    let mut inner = Sha256::new();
    inner.update(key_block.map(|b| b ^ 0x36));
    inner.update(message.as_bytes());
    let inner_digest = inner.finalize();

    let mut outer = Sha256::new();
    outer.update(key_block.map(|b| b ^ 0x5c));
    outer.update(inner_digest);
    let mac = outer.finalize();

    format!("t={timestamp},v1={}", hex::encode(mac))
}
