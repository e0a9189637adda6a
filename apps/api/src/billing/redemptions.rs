use std::collections::HashSet;
use std::sync::Mutex;

use tracing::debug;

/// Checkout sessions that have already bought a rewrite.
///
/// One paid session buys exactly one rewrite. A session id is claimed before the
/// model is called and released again if the rewrite fails, so the customer can
/// retry without paying twice. Process-local: a restart forgets every claim.
#[derive(Debug, Default)]
pub struct RedeemedSessions {
    ids: Mutex<HashSet<String>>,
}

impl RedeemedSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `session_id` as used. Returns `false` if it was already claimed.
    pub fn claim(&self, session_id: &str) -> bool {
        let claimed = self
            .ids
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(session_id.to_string());
        debug!(session_id, claimed, "Checkout session claim");
        claimed
    }

    /// Undoes a claim after a failed rewrite.
    pub fn release(&self, session_id: &str) {
        self.ids
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(session_id);
    }

    pub fn is_redeemed(&self, session_id: &str) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(session_id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_second_claim_is_refused() {
        let redeemed = RedeemedSessions::new();
        assert!(redeemed.claim("cs_test_1"));
        assert!(!redeemed.claim("cs_test_1"));
        assert!(redeemed.claim("cs_test_2"));
    }

    #[test]
    fn test_release_allows_retry() {
        let redeemed = RedeemedSessions::new();
        assert!(redeemed.claim("cs_test_1"));
        redeemed.release("cs_test_1");
        assert!(!redeemed.is_redeemed("cs_test_1"));
        assert!(redeemed.claim("cs_test_1"));
    }

    #[test]
    fn test_concurrent_claims_admit_one() {
        let redeemed = Arc::new(RedeemedSessions::new());
        let winners: usize = (0..8)
            .map(|_| {
                let redeemed = redeemed.clone();
                thread::spawn(move || redeemed.claim("cs_test_race"))
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum();
        assert_eq!(winners, 1);
    }
}
