//! Ledger facade combining the store, play-session tracking and idempotent
//! payment application.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::LedgerError;
use crate::session::ListenTracker;
use crate::store::{JewelAccount, LedgerStore};

/// What a confirmed payment buys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TopUpKind {
    #[default]
    Credits,
    Listens,
}

pub struct Ledger {
    store: Arc<dyn LedgerStore>,
    sessions: ListenTracker,
}

impl Ledger {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            store,
            sessions: ListenTracker::new(),
        }
    }

    pub async fn account(&self, identifier: &str) -> Result<JewelAccount, LedgerError> {
        self.store.get_account(identifier).await
    }

    /// Spend one message credit. This is the gate in front of every
    /// generation attempt; a spent credit is never refunded downstream.
    pub async fn consume_credit(&self, identifier: &str) -> Result<u64, LedgerError> {
        let remaining = self.store.consume_credit(identifier).await?;
        info!(%identifier, remaining, "credit consumed");
        Ok(remaining)
    }

    /// Charge one listen for a completed playback. A second completion in
    /// the same play session is a no-op that reports the current balance.
    pub async fn complete_listen(
        &self,
        recording_id: &str,
        session_id: &str,
    ) -> Result<u64, LedgerError> {
        if !self.sessions.claim(recording_id, session_id) {
            return Ok(self.store.get_recording(recording_id).await?.listens);
        }

        match self.store.consume_listen(recording_id).await {
            Ok(remaining) => {
                info!(%recording_id, %session_id, remaining, "listen charged");
                Ok(remaining)
            }
            Err(e) => {
                // Leave the session chargeable for after a top-up.
                self.sessions.release(recording_id, session_id);
                Err(e)
            }
        }
    }

    /// Restarting playback from zero makes the session chargeable again.
    pub fn restart_listen(&self, recording_id: &str, session_id: &str) {
        self.sessions.restart(recording_id, session_id);
    }

    /// Apply a confirmed payment exactly once per payment-session id.
    /// Replays return the current balance without mutating anything.
    pub async fn apply_payment(
        &self,
        payment_session_id: &str,
        identifier: &str,
        kind: TopUpKind,
        quantity: u64,
    ) -> Result<u64, LedgerError> {
        if quantity == 0 {
            return Err(LedgerError::InvalidInput(
                "top-up quantity must be positive".to_string(),
            ));
        }

        if !self.store.claim_payment_session(payment_session_id).await? {
            warn!(%payment_session_id, "payment session already applied, replay ignored");
            return self.current_total(identifier, kind).await;
        }

        let total = match kind {
            TopUpKind::Credits => self.store.top_up_credits(identifier, quantity).await?,
            TopUpKind::Listens => self.store.top_up_listens(identifier, quantity).await?,
        };
        info!(%identifier, %payment_session_id, ?kind, quantity, total, "top-up applied");
        Ok(total)
    }

    async fn current_total(&self, identifier: &str, kind: TopUpKind) -> Result<u64, LedgerError> {
        match kind {
            TopUpKind::Credits => Ok(self.store.get_account(identifier).await?.credits),
            TopUpKind::Listens => {
                Ok(self.store.latest_locked_recording(identifier).await?.listens)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::store::{MemoryLedger, Recording};

    use super::*;

    fn ledger_with_recording(listens: u64) -> Ledger {
        let store = MemoryLedger::new();
        store.seed_account(
            "mw-1",
            JewelAccount {
                credits: 2,
                active: true,
                personalization: None,
            },
        );
        store.seed_recording(Recording {
            id: "rec-1".to_string(),
            identifier: "mw-1".to_string(),
            listens,
            locked: true,
            created_at: Utc::now(),
        });
        Ledger::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_completion_charges_once_per_session() {
        let ledger = ledger_with_recording(3);

        assert_eq!(ledger.complete_listen("rec-1", "sess-a").await.unwrap(), 2);
        // Replaying the same completion is a no-op.
        assert_eq!(ledger.complete_listen("rec-1", "sess-a").await.unwrap(), 2);
        // A different session charges normally.
        assert_eq!(ledger.complete_listen("rec-1", "sess-b").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_restart_opens_a_new_charge() {
        let ledger = ledger_with_recording(3);

        assert_eq!(ledger.complete_listen("rec-1", "sess-a").await.unwrap(), 2);
        ledger.restart_listen("rec-1", "sess-a");
        assert_eq!(ledger.complete_listen("rec-1", "sess-a").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_listens_stay_chargeable_after_top_up() {
        let ledger = ledger_with_recording(0);

        let err = ledger.complete_listen("rec-1", "sess-a").await.unwrap_err();
        assert!(matches!(err, LedgerError::ExhaustedOrInactive(_)));

        ledger
            .apply_payment("cs_1", "mw-1", TopUpKind::Listens, 3)
            .await
            .unwrap();
        // The failed completion did not burn the session claim.
        assert_eq!(ledger.complete_listen("rec-1", "sess-a").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_payment_applies_once_across_replays() {
        let ledger = ledger_with_recording(0);

        let first = ledger
            .apply_payment("cs_1", "mw-1", TopUpKind::Credits, 10)
            .await
            .unwrap();
        assert_eq!(first, 12);

        // Webhook and redirect confirm may both deliver the same session.
        let replay = ledger
            .apply_payment("cs_1", "mw-1", TopUpKind::Credits, 10)
            .await
            .unwrap();
        assert_eq!(replay, 12);
    }

    #[tokio::test]
    async fn test_zero_quantity_top_up_rejected() {
        let ledger = ledger_with_recording(0);
        let err = ledger
            .apply_payment("cs_1", "mw-1", TopUpKind::Credits, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput(_)));
    }
}
