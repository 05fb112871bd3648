//! Conversation session.
//!
//! This module provides:
//! - [`SessionState`]: history, live settings and the idle/pending gate
//! - [`Session`]: async driver that runs one outbound call per admitted
//!   question against a [`QaService`]
//!
//! At most one request is outstanding per session. A second submit while
//! one is pending is rejected. There is no cancel operation; a caller that
//! drops a pending submit gets an error turn in its place.

mod state;

pub use state::*;

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::SettingsResult;
use crate::rulebot::QaService;
use crate::settings::Settings;

/// Result of a call to [`Session::submit`]
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Not admitted; history is unchanged.
    Rejected(RejectReason),
    /// The service answered; holds the appended assistant turn.
    Answered(ConversationTurn),
    /// The request failed; holds the appended error turn.
    Failed(ConversationTurn),
}

/// A conversation with the question-answering service.
///
/// Safe to share across tasks; the state lock is never held across the
/// outbound call, so history and lifecycle stay readable while pending.
pub struct Session<S> {
    service: S,
    state: Mutex<SessionState>,
}

impl<S: QaService> Session<S> {
    /// Start a session with the given initial settings.
    pub fn new(service: S, settings: Settings) -> Self {
        let state = SessionState::new(settings);
        info!(session_id = %state.id(), "Session started");
        Self {
            service,
            state: Mutex::new(state),
        }
    }

    pub fn id(&self) -> Uuid {
        self.lock().id()
    }

    /// Copy of the conversation so far, oldest first.
    pub fn history(&self) -> Vec<ConversationTurn> {
        self.lock().turns().to_vec()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lock().lifecycle()
    }

    /// Copy of the live settings.
    pub fn settings(&self) -> Settings {
        self.lock().settings().clone()
    }

    pub fn last_failure(&self) -> Option<String> {
        self.lock().last_failure().map(str::to_string)
    }

    /// Change a live setting. In-flight requests keep their snapshot.
    pub fn update_setting(&self, name: &str, value: &str) -> SettingsResult<()> {
        let mut state = self.lock();
        match state.update_setting(name, value) {
            Ok(()) => {
                debug!(session_id = %state.id(), setting = %name, value = %value, "Setting updated");
                Ok(())
            }
            Err(e) => {
                warn!(session_id = %state.id(), setting = %name, error = %e, "Setting update rejected");
                Err(e)
            }
        }
    }

    pub fn draft(&self) -> String {
        self.lock().draft().to_string()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.lock().set_draft(text);
    }

    /// Submit the current draft.
    pub async fn submit_draft(&self) -> SubmitOutcome {
        let text = self.draft();
        self.submit(&text).await
    }

    /// Ask `text` and record the answer or failure as the next turn.
    ///
    /// Dropping the returned future while the call is outstanding resolves
    /// the turn as [`ServiceError::Abandoned`](crate::error::ServiceError)
    /// and returns the session to `Idle`.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let (session_id, pending) = {
            let mut state = self.lock();
            let session_id = state.id();
            match state.begin(text) {
                Ok(pending) => (session_id, pending),
                Err(reason) => {
                    debug!(session_id = %session_id, reason = ?reason, "Submission rejected");
                    return SubmitOutcome::Rejected(reason);
                }
            }
        };
        let guard = PendingGuard {
            state: &self.state,
            session_id,
            armed: true,
        };

        if pending.snapshot().debug_mode {
            debug!(
                session_id = %session_id,
                snapshot = ?pending.snapshot(),
                "Sending question with settings"
            );
        }

        let start = Instant::now();
        let outcome = self
            .service
            .ask(pending.snapshot(), pending.question())
            .await;

        let resolution = {
            let mut state = self.lock();
            guard.disarm();
            state.complete(pending, outcome)
        };
        let latency_ms = start.elapsed().as_millis();

        match resolution {
            Resolution::Answered(turn) => {
                info!(
                    session_id = %session_id,
                    latency_ms,
                    created_at = %turn.created_at(),
                    "Turn answered"
                );
                SubmitOutcome::Answered(turn)
            }
            Resolution::Failed(turn) => {
                warn!(
                    session_id = %session_id,
                    latency_ms,
                    created_at = %turn.created_at(),
                    "Turn failed"
                );
                SubmitOutcome::Failed(turn)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        lock_state(&self.state)
    }
}

fn lock_state(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Resolves the pending turn if `submit` is dropped before the call returns.
struct PendingGuard<'a> {
    state: &'a Mutex<SessionState>,
    session_id: Uuid,
    armed: bool,
}

impl PendingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(Resolution::Failed(turn)) = lock_state(self.state).abandon() {
            warn!(
                session_id = %self.session_id,
                created_at = %turn.created_at(),
                "Submission dropped while pending"
            );
        }
    }
}
