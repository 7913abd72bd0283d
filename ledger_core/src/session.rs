//! Play-session de-duplication.
//!
//! A listen is charged when playback completes, and a given play session
//! charges at most once until it is explicitly restarted. The tracker only
//! holds claim flags; the balance itself lives in the store.

use dashmap::DashSet;

#[derive(Debug, Default)]
pub struct ListenTracker {
    charged: DashSet<(String, String)>,
}

impl ListenTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the charge for a (recording, session) pair. Returns `false`
    /// if this session already paid for this recording.
    pub fn claim(&self, recording_id: &str, session_id: &str) -> bool {
        self.charged
            .insert((recording_id.to_string(), session_id.to_string()))
    }

    /// Undo a claim after a failed decrement, so the session can charge
    /// again once the balance is topped up.
    pub fn release(&self, recording_id: &str, session_id: &str) {
        self.charged
            .remove(&(recording_id.to_string(), session_id.to_string()));
    }

    /// Restarting playback from zero opens a fresh charge.
    pub fn restart(&self, recording_id: &str, session_id: &str) {
        self.release(recording_id, session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_claims_once() {
        let tracker = ListenTracker::new();
        assert!(tracker.claim("rec-1", "sess-a"));
        assert!(!tracker.claim("rec-1", "sess-a"));
    }

    #[test]
    fn test_sessions_are_independent() {
        let tracker = ListenTracker::new();
        assert!(tracker.claim("rec-1", "sess-a"));
        assert!(tracker.claim("rec-1", "sess-b"));
        assert!(tracker.claim("rec-2", "sess-a"));
    }

    #[test]
    fn test_restart_reopens_the_charge() {
        let tracker = ListenTracker::new();
        assert!(tracker.claim("rec-1", "sess-a"));
        tracker.restart("rec-1", "sess-a");
        assert!(tracker.claim("rec-1", "sess-a"));
    }
}
