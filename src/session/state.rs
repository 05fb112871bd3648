use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult, SettingsResult};
use crate::interpreter::interpret;
use crate::rulebot::ServiceResponse;
use crate::settings::{ConfigurationSnapshot, SettingName, Settings};

/// Assistant turn every session starts with.
pub const GREETING: &str = "Hello! How can I help you today?";

/// Opening line of an assistant turn that reports a failed request.
pub const ERROR_PREFIX: &str = "Sorry, I encountered an error. Please try again.";

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message of the conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    role: Role,
    content: String,
    created_at: DateTime<Utc>,
}

impl ConversationTurn {
    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Request lifecycle of a session.
///
/// A resolved or failed request returns the session to `Idle`; the detail of
/// the last failure stays available through `last_failure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Idle,
    Pending,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Idle => f.write_str("idle"),
            Lifecycle::Pending => f.write_str("pending"),
        }
    }
}

/// Why a submission was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Text was empty after trimming.
    Empty,
    /// A request is already outstanding.
    Busy,
}

/// Admitted question waiting for the service.
///
/// Only [`SessionState::begin`] creates one and [`SessionState::complete`]
/// consumes it, so at most one exists per session.
#[derive(Debug)]
pub struct PendingRequest {
    snapshot: ConfigurationSnapshot,
    question: String,
}

impl PendingRequest {
    pub fn snapshot(&self) -> &ConfigurationSnapshot {
        &self.snapshot
    }

    /// The trimmed question text.
    pub fn question(&self) -> &str {
        &self.question
    }
}

/// How a completed request was recorded
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Answered(ConversationTurn),
    Failed(ConversationTurn),
}

/// Conversation history, live settings and request lifecycle.
///
/// All transitions are synchronous; the outbound call happens between
/// [`begin`](Self::begin) and [`complete`](Self::complete).
#[derive(Debug)]
pub struct SessionState {
    id: Uuid,
    turns: Vec<ConversationTurn>,
    lifecycle: Lifecycle,
    settings: Settings,
    draft: String,
    last_failure: Option<String>,
}

impl SessionState {
    /// New idle session holding only the greeting.
    pub fn new(settings: Settings) -> Self {
        Self {
            id: Uuid::new_v4(),
            turns: vec![ConversationTurn::assistant(GREETING)],
            lifecycle: Lifecycle::Idle,
            settings,
            draft: String::new(),
            last_failure: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Detail of the most recent failure, cleared by the next admitted submit.
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replace the unsent input text. Allowed in any lifecycle state.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Change a live setting; applies from the next submit on.
    pub fn update_setting(&mut self, name: &str, value: &str) -> SettingsResult<()> {
        let name: SettingName = name.parse()?;
        self.settings.update(name, value)
    }

    /// Admit `text` as the next question.
    ///
    /// On admission the untrimmed text becomes a user turn, the settings are
    /// frozen, the draft is cleared and the session turns `Pending`.
    pub fn begin(&mut self, text: &str) -> Result<PendingRequest, RejectReason> {
        if self.lifecycle == Lifecycle::Pending {
            return Err(RejectReason::Busy);
        }
        let question = text.trim();
        if question.is_empty() {
            return Err(RejectReason::Empty);
        }

        let pending = PendingRequest {
            snapshot: self.settings.capture(),
            question: question.to_string(),
        };

        self.turns.push(ConversationTurn::user(text));
        self.draft.clear();
        self.last_failure = None;
        self.lifecycle = Lifecycle::Pending;

        Ok(pending)
    }

    /// Record the outcome of the outstanding request and return to `Idle`.
    pub fn complete(
        &mut self,
        pending: PendingRequest,
        outcome: ServiceResult<ServiceResponse>,
    ) -> Resolution {
        match outcome {
            Ok(response) => {
                let turn = ConversationTurn::assistant(interpret(
                    &response,
                    pending.snapshot.debug_mode,
                ));
                self.resolve(turn.clone());
                Resolution::Answered(turn)
            }
            Err(err) => self.fail(&err),
        }
    }

    /// Resolve an outstanding request whose token was lost before it could
    /// be completed. Records a `ServiceError::Abandoned` error turn.
    ///
    /// Returns `None` when nothing is pending.
    pub fn abandon(&mut self) -> Option<Resolution> {
        if self.lifecycle != Lifecycle::Pending {
            return None;
        }
        Some(self.fail(&ServiceError::Abandoned))
    }

    fn fail(&mut self, err: &ServiceError) -> Resolution {
        let turn = ConversationTurn::assistant(error_message(err));
        self.last_failure = Some(err.detail());
        self.resolve(turn.clone());
        Resolution::Failed(turn)
    }

    fn resolve(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
        self.lifecycle = Lifecycle::Idle;
    }
}

/// Content of the assistant turn reporting `err`.
pub fn error_message(err: &ServiceError) -> String {
    format!("{ERROR_PREFIX}\n\n{}", err.detail())
}
