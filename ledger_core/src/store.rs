//! Ledger storage.
//!
//! Every balance mutation is an atomic single-key conditional update inside
//! the store. Application code never reads a balance and writes it back, so
//! concurrent consumers can race freely without going negative.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{DashMap, DashSet};
use serde::{Deserialize, Serialize};

use message_core::PersonalizationProfile;

use crate::error::LedgerError;

/// One jewel: a message-credit balance plus its personalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JewelAccount {
    pub credits: u64,
    pub active: bool,
    #[serde(default)]
    pub personalization: Option<PersonalizationProfile>,
}

/// One recorded voice. Listens attach to the most recent locked recording
/// of a jewel, not to the jewel itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    pub id: String,
    pub identifier: String,
    pub listens: u64,
    pub locked: bool,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn get_account(&self, identifier: &str) -> Result<JewelAccount, LedgerError>;

    /// Spend one credit. Fails with `ExhaustedOrInactive` when the balance
    /// is zero or the jewel is inactive; returns the remaining balance.
    async fn consume_credit(&self, identifier: &str) -> Result<u64, LedgerError>;

    /// Add credits and reactivate the jewel. Returns the new balance.
    async fn top_up_credits(&self, identifier: &str, quantity: u64) -> Result<u64, LedgerError>;

    async fn get_recording(&self, recording_id: &str) -> Result<Recording, LedgerError>;

    /// Most recent locked recording for a jewel.
    async fn latest_locked_recording(&self, identifier: &str) -> Result<Recording, LedgerError>;

    /// Spend one listen on a recording. Same contract as `consume_credit`.
    async fn consume_listen(&self, recording_id: &str) -> Result<u64, LedgerError>;

    /// Add listens to the most recent locked recording of a jewel.
    async fn top_up_listens(&self, identifier: &str, quantity: u64) -> Result<u64, LedgerError>;

    /// Claim a payment session id. Returns `false` if it was already
    /// processed; the claim is what makes top-ups idempotent.
    async fn claim_payment_session(&self, session_id: &str) -> Result<bool, LedgerError>;
}

/// In-memory ledger used by tests and local development. Shard locks on the
/// maps provide the per-key atomic sections.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    accounts: DashMap<String, JewelAccount>,
    recordings: DashMap<String, Recording>,
    processed_sessions: DashSet<String>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_account(&self, identifier: &str, account: JewelAccount) {
        self.accounts.insert(identifier.to_string(), account);
    }

    pub fn seed_recording(&self, recording: Recording) {
        self.recordings.insert(recording.id.clone(), recording);
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn get_account(&self, identifier: &str) -> Result<JewelAccount, LedgerError> {
        self.accounts
            .get(identifier)
            .map(|a| a.clone())
            .ok_or_else(|| LedgerError::NotFound(format!("unknown jewel {identifier}")))
    }

    async fn consume_credit(&self, identifier: &str) -> Result<u64, LedgerError> {
        let mut account = self
            .accounts
            .get_mut(identifier)
            .ok_or_else(|| LedgerError::NotFound(format!("unknown jewel {identifier}")))?;
        if !account.active || account.credits == 0 {
            return Err(LedgerError::ExhaustedOrInactive(identifier.to_string()));
        }
        account.credits -= 1;
        Ok(account.credits)
    }

    async fn top_up_credits(&self, identifier: &str, quantity: u64) -> Result<u64, LedgerError> {
        let mut account = self
            .accounts
            .entry(identifier.to_string())
            .or_insert_with(|| JewelAccount {
                credits: 0,
                active: true,
                personalization: None,
            });
        account.credits += quantity;
        account.active = true;
        Ok(account.credits)
    }

    async fn get_recording(&self, recording_id: &str) -> Result<Recording, LedgerError> {
        self.recordings
            .get(recording_id)
            .map(|r| r.clone())
            .ok_or_else(|| LedgerError::NotFound(format!("unknown recording {recording_id}")))
    }

    async fn latest_locked_recording(&self, identifier: &str) -> Result<Recording, LedgerError> {
        self.recordings
            .iter()
            .filter(|r| r.identifier == identifier && r.locked)
            .max_by_key(|r| r.created_at)
            .map(|r| r.clone())
            .ok_or_else(|| LedgerError::NotFound(format!("no locked recording for {identifier}")))
    }

    async fn consume_listen(&self, recording_id: &str) -> Result<u64, LedgerError> {
        let mut recording = self
            .recordings
            .get_mut(recording_id)
            .ok_or_else(|| LedgerError::NotFound(format!("unknown recording {recording_id}")))?;
        if recording.listens == 0 {
            return Err(LedgerError::ExhaustedOrInactive(recording_id.to_string()));
        }
        recording.listens -= 1;
        Ok(recording.listens)
    }

    async fn top_up_listens(&self, identifier: &str, quantity: u64) -> Result<u64, LedgerError> {
        let latest = self.latest_locked_recording(identifier).await?;
        let mut recording = self
            .recordings
            .get_mut(&latest.id)
            .ok_or_else(|| LedgerError::NotFound(format!("unknown recording {}", latest.id)))?;
        recording.listens += quantity;
        Ok(recording.listens)
    }

    async fn claim_payment_session(&self, session_id: &str) -> Result<bool, LedgerError> {
        Ok(self.processed_sessions.insert(session_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn ledger_with(identifier: &str, credits: u64, active: bool) -> MemoryLedger {
        let ledger = MemoryLedger::new();
        ledger.seed_account(
            identifier,
            JewelAccount {
                credits,
                active,
                personalization: None,
            },
        );
        ledger
    }

    #[tokio::test]
    async fn test_consume_decrements_and_reports_remaining() {
        let ledger = ledger_with("mw-1", 3, true);
        assert_eq!(ledger.consume_credit("mw-1").await.unwrap(), 2);
        assert_eq!(ledger.consume_credit("mw-1").await.unwrap(), 1);
        assert_eq!(ledger.get_account("mw-1").await.unwrap().credits, 1);
    }

    #[tokio::test]
    async fn test_zero_balance_rejected_without_going_negative() {
        let ledger = ledger_with("mw-1", 0, true);
        let err = ledger.consume_credit("mw-1").await.unwrap_err();
        assert!(matches!(err, LedgerError::ExhaustedOrInactive(_)));
        assert_eq!(ledger.get_account("mw-1").await.unwrap().credits, 0);
    }

    #[tokio::test]
    async fn test_inactive_jewel_rejected_even_with_balance() {
        let ledger = ledger_with("mw-1", 5, false);
        let err = ledger.consume_credit("mw-1").await.unwrap_err();
        assert!(matches!(err, LedgerError::ExhaustedOrInactive(_)));
    }

    #[tokio::test]
    async fn test_unknown_jewel_is_not_found() {
        let ledger = MemoryLedger::new();
        assert!(matches!(
            ledger.consume_credit("ghost").await.unwrap_err(),
            LedgerError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_consumers_cannot_double_spend() {
        let ledger = Arc::new(ledger_with("mw-1", 1, true));

        let a = tokio::spawn({
            let ledger = ledger.clone();
            async move { ledger.consume_credit("mw-1").await }
        });
        let b = tokio::spawn({
            let ledger = ledger.clone();
            async move { ledger.consume_credit("mw-1").await }
        });

        let (ra, rb) = (a.await.unwrap(), b.await.unwrap());
        assert_eq!(
            ra.is_ok() as u8 + rb.is_ok() as u8,
            1,
            "exactly one consumer may win: {ra:?} {rb:?}"
        );
        assert_eq!(ledger.get_account("mw-1").await.unwrap().credits, 0);
    }

    #[tokio::test]
    async fn test_top_up_reactivates() {
        let ledger = ledger_with("mw-1", 0, false);
        assert_eq!(ledger.top_up_credits("mw-1", 10).await.unwrap(), 10);
        let account = ledger.get_account("mw-1").await.unwrap();
        assert!(account.active);
        assert_eq!(ledger.consume_credit("mw-1").await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_listens_attach_to_most_recent_locked_recording() {
        let ledger = MemoryLedger::new();
        let old = Recording {
            id: "rec-old".to_string(),
            identifier: "mw-1".to_string(),
            listens: 0,
            locked: true,
            created_at: Utc::now() - chrono::Duration::days(2),
        };
        let unlocked = Recording {
            id: "rec-draft".to_string(),
            identifier: "mw-1".to_string(),
            listens: 0,
            locked: false,
            created_at: Utc::now(),
        };
        let latest = Recording {
            id: "rec-new".to_string(),
            identifier: "mw-1".to_string(),
            listens: 0,
            locked: true,
            created_at: Utc::now() - chrono::Duration::hours(1),
        };
        ledger.seed_recording(old);
        ledger.seed_recording(unlocked);
        ledger.seed_recording(latest);

        ledger.top_up_listens("mw-1", 5).await.unwrap();
        assert_eq!(ledger.consume_listen("rec-new").await.unwrap(), 4);
        assert!(matches!(
            ledger.consume_listen("rec-old").await.unwrap_err(),
            LedgerError::ExhaustedOrInactive(_)
        ));
    }

    #[tokio::test]
    async fn test_payment_session_claimed_once() {
        let ledger = MemoryLedger::new();
        assert!(ledger.claim_payment_session("cs_1").await.unwrap());
        assert!(!ledger.claim_payment_session("cs_1").await.unwrap());
        assert!(ledger.claim_payment_session("cs_2").await.unwrap());
    }
}
