//! Payment provider abstraction and webhook verification.
//!
//! Only the metadata contract matters to the ledger: a session carries the
//! jewel identifier, what is being bought and how many. The Stripe-style
//! implementation speaks the form-encoded checkout API over reqwest.

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::LedgerError;
use crate::ledger::TopUpKind;

/// A created checkout session: where to send the buyer.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub session_id: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone)]
pub struct PaymentMetadata {
    pub identifier: String,
    pub kind: TopUpKind,
    pub quantity: u64,
}

#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub paid: bool,
    pub metadata: PaymentMetadata,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_checkout_session(
        &self,
        identifier: &str,
        kind: TopUpKind,
        quantity: u64,
        unit_amount_cents: u64,
    ) -> Result<CheckoutSession, LedgerError>;

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionStatus, LedgerError>;
}

#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    url: Option<String>,
    payment_status: Option<String>,
    #[serde(default)]
    metadata: StripeMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct StripeMetadata {
    identifier: Option<String>,
    kind: Option<String>,
    quantity: Option<String>,
}

impl StripeMetadata {
    fn parse(self) -> Result<PaymentMetadata, LedgerError> {
        let identifier = self
            .identifier
            .filter(|s| !s.is_empty())
            .ok_or_else(|| LedgerError::InvalidInput("session metadata missing identifier".to_string()))?;
        let quantity: u64 = self
            .quantity
            .as_deref()
            .unwrap_or("0")
            .parse()
            .map_err(|_| LedgerError::InvalidInput("session metadata quantity not a number".to_string()))?;
        if quantity == 0 {
            return Err(LedgerError::InvalidInput(
                "session metadata quantity must be positive".to_string(),
            ));
        }
        let kind = match self.kind.as_deref() {
            Some("listens") => TopUpKind::Listens,
            _ => TopUpKind::Credits,
        };
        Ok(PaymentMetadata {
            identifier,
            kind,
            quantity,
        })
    }
}

/// Stripe checkout client.
pub struct StripePayment {
    client: reqwest::Client,
    secret_key: String,
    base_url: String,
    success_url: String,
    cancel_url: String,
}

impl StripePayment {
    pub fn new(secret_key: &str, success_url: &str, cancel_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: secret_key.to_string(),
            base_url: "https://api.stripe.com".to_string(),
            success_url: success_url.to_string(),
            cancel_url: cancel_url.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn kind_label(kind: TopUpKind) -> &'static str {
        match kind {
            TopUpKind::Credits => "credits",
            TopUpKind::Listens => "listens",
        }
    }
}

#[async_trait]
impl PaymentProvider for StripePayment {
    async fn create_checkout_session(
        &self,
        identifier: &str,
        kind: TopUpKind,
        quantity: u64,
        unit_amount_cents: u64,
    ) -> Result<CheckoutSession, LedgerError> {
        let kind_label = Self::kind_label(kind);
        let form: Vec<(&str, String)> = vec![
            ("mode", "payment".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("line_items[0][price_data][currency]", "eur".to_string()),
            (
                "line_items[0][price_data][product_data][name]",
                format!("{quantity} personalized message top-up"),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                unit_amount_cents.to_string(),
            ),
            ("line_items[0][quantity]", quantity.to_string()),
            ("success_url", self.success_url.clone()),
            ("cancel_url", self.cancel_url.clone()),
            ("metadata[identifier]", identifier.to_string()),
            ("metadata[kind]", kind_label.to_string()),
            ("metadata[quantity]", quantity.to_string()),
        ];

        let res = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| LedgerError::UpstreamUnavailable(format!("checkout create failed: {e}")))?;

        if !res.status().is_success() {
            let status = res.status();
            return Err(LedgerError::UpstreamUnavailable(format!(
                "checkout create returned {status}"
            )));
        }

        let session: StripeSession = res
            .json()
            .await
            .map_err(|e| LedgerError::UpstreamUnavailable(format!("checkout decode failed: {e}")))?;
        let redirect_url = session.url.ok_or_else(|| {
            LedgerError::UpstreamUnavailable("checkout session has no redirect url".to_string())
        })?;
        debug!(session_id = %session.id, "checkout session created");
        Ok(CheckoutSession {
            session_id: session.id,
            redirect_url,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionStatus, LedgerError> {
        let res = self
            .client
            .get(format!("{}/v1/checkout/sessions/{session_id}", self.base_url))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| LedgerError::UpstreamUnavailable(format!("session fetch failed: {e}")))?;

        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(LedgerError::NotFound(format!("unknown session {session_id}")));
        }
        if !res.status().is_success() {
            let status = res.status();
            return Err(LedgerError::UpstreamUnavailable(format!(
                "session fetch returned {status}"
            )));
        }

        let session: StripeSession = res
            .json()
            .await
            .map_err(|e| LedgerError::UpstreamUnavailable(format!("session decode failed: {e}")))?;
        Ok(SessionStatus {
            paid: session.payment_status.as_deref() == Some("paid"),
            metadata: session.metadata.parse()?,
        })
    }
}

/// A verified `checkout.session.completed` event.
#[derive(Debug, Clone)]
pub struct CompletedCheckout {
    pub session_id: String,
    pub paid: bool,
    pub metadata: PaymentMetadata,
}

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    data: WebhookData,
}

#[derive(Debug, Deserialize)]
struct WebhookData {
    object: StripeSession,
}

/// Verify a `t=...,v1=...` signature header against the raw body and parse
/// the event. Returns `Ok(None)` for event types the ledger ignores.
pub fn verify_webhook(
    secret: &str,
    signature_header: &str,
    body: &str,
) -> Result<Option<CompletedCheckout>, LedgerError> {
    let (timestamp, candidates) = parse_signature_header(signature_header)?;

    let signed_payload = format!("{timestamp}.{body}");
    let expected = hmac_sha256(secret.as_bytes(), signed_payload.as_bytes());

    let verified = candidates
        .iter()
        .any(|candidate| constant_time_eq(candidate, &expected));
    if !verified {
        return Err(LedgerError::InvalidSignature);
    }

    let envelope: WebhookEnvelope = serde_json::from_str(body)
        .map_err(|e| LedgerError::InvalidInput(format!("webhook body not valid JSON: {e}")))?;
    if envelope.event_type != "checkout.session.completed" {
        return Ok(None);
    }

    let session = envelope.data.object;
    Ok(Some(CompletedCheckout {
        session_id: session.id,
        paid: session.payment_status.as_deref() == Some("paid"),
        metadata: session.metadata.parse()?,
    }))
}

fn parse_signature_header(header: &str) -> Result<(&str, Vec<Vec<u8>>), LedgerError> {
    let mut timestamp = None;
    let mut candidates = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", v)) => timestamp = Some(v),
            Some(("v1", v)) => {
                let bytes = hex::decode(v).map_err(|_| LedgerError::InvalidSignature)?;
                candidates.push(bytes);
            }
            _ => {}
        }
    }
    let timestamp = timestamp.ok_or(LedgerError::InvalidSignature)?;
    if candidates.is_empty() {
        return Err(LedgerError::InvalidSignature);
    }
    Ok((timestamp, candidates))
}

// HMAC-SHA256 per RFC 2104, block size 64.
fn hmac_sha256(key: &[u8], message: &[u8]) -> Vec<u8> {
    const BLOCK: usize = 64;

    let mut key_block = [0u8; BLOCK];
    if key.len() > BLOCK {
        key_block[..32].copy_from_slice(&Sha256::digest(key));
    } else {
        key_block[..key.len()].copy_from_slice(key);
    }

    let mut inner = Sha256::new();
    inner.update(key_block.map(|b| b ^ 0x36));
    inner.update(message);
    let inner_digest = inner.finalize();

    let mut outer = Sha256::new();
    outer.update(key_block.map(|b| b ^ 0x5c));
    outer.update(inner_digest);
    outer.finalize().to_vec()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
