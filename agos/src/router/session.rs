//! Per-sender session store
//!
//! Single-writer-per-key: the outer lock covers entry lookup only, the
//! per-sender mutex is held across the whole read-modify-write so
//! concurrent messages from one sender cannot interleave. Cross-sender
//! traffic shares nothing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::Mutex;
use tracing::debug;

use crate::risk::RiskAssessment;

/// Conversational memory for one sender. At most one live assessment.
#[derive(Debug, Default)]
pub struct Session {
    pub assessment: Option<RiskAssessment>,
    pub location_name: Option<String>,
    /// Set by STOP; the session stays inert until a location text
    /// re-opts-in
    pub unsubscribed: bool,
}

/// Sessions keyed by sender id. No persistence: process restart starts
/// every conversation over.
#[derive(Default)]
pub struct SessionStore {
    inner: StdMutex<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch or create the session for `sender`.
    pub fn entry(&self, sender: &str) -> Arc<Mutex<Session>> {
        let mut map = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match map.get(sender) {
            Some(session) => Arc::clone(session),
            None => {
                debug!(%sender, "SessionStore::entry: new session");
                let session = Arc::new(Mutex::new(Session::default()));
                map.insert(sender.to_string(), Arc::clone(&session));
                session
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
