//! Authentication gate in front of the account.
use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::bank::{Account, SessionId};

/// Tracks which sessions have presented the right PIN.
#[derive(Debug)]
pub struct SessionGate {
    /// Authenticated sessions and the time each was last used.
    sessions: HashMap<SessionId, DateTime<Utc>>,

    /// How long a session may stay idle before it has to log in again.
    ttl: Duration,
}

impl SessionGate {
    pub fn new(ttl: Duration) -> Self {
        SessionGate {
            sessions: HashMap::new(),
            ttl,
        }
    }

    /// Marks `session` authenticated if `candidate` matches the account PIN.
    /// A mismatch leaves the gate untouched.
    pub fn authenticate(
        &mut self,
        session: SessionId,
        candidate: &str,
        account: &Account,
        now: DateTime<Utc>,
    ) -> bool {
        if !account.verify_pin(candidate) {
            return false;
        }
        let ttl = self.ttl;
        self.sessions.retain(|_, last_seen| now - *last_seen <= ttl);
        self.sessions.insert(session, now);
        true
    }

    pub fn is_authenticated(&self, session: &SessionId, now: DateTime<Utc>) -> bool {
        self.sessions
            .get(session)
            .is_some_and(|last_seen| !self.is_expired(*last_seen, now))
    }

    /// Admits `session` and refreshes its activity time, or rejects it.
    /// Expired sessions are forgotten.
    pub fn require(&mut self, session: &SessionId, now: DateTime<Utc>) -> Result<(), Unauthorized> {
        let Some(last_seen) = self.sessions.get(session).copied() else {
            return Err(Unauthorized);
        };
        if self.is_expired(last_seen, now) {
            self.sessions.remove(session);
            return Err(Unauthorized);
        }
        self.sessions.insert(*session, now);
        Ok(())
    }

    /// Ends the session. Logging out twice is fine.
    pub fn logout(&mut self, session: &SessionId) {
        self.sessions.remove(session);
    }

    fn is_expired(&self, last_seen: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - last_seen > self.ttl
    }
}

/// The caller has no valid session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unauthorized;
