//! # Rulebot Client
//!
//! Conversational client for the ice hockey rulebook question-answering
//! service. A question is sent together with a snapshot of the retrieval and
//! generation settings; the answer is appended to the conversation, optionally
//! followed by a trace of the rules and situations the service retrieved.
//!
//! ## Architecture
//!
//! ```text
//! Terminal → Session ──(snapshot + question)──→ QA service (HTTP POST /ask)
//!               ↑                                   │
//!               └── interpreter ← trace ←───────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use rulebot_client::{Config, Session};
//! use rulebot_client::rulebot::RulebotClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let client = RulebotClient::new(&config.service, config.request.clone())?;
//!     let session = Session::new(client, config.settings.clone());
//!     session.update_setting("debug", "on")?;
//!     session.submit("Is a puck off the netting still in play?").await;
//!     for turn in session.history() {
//!         println!("{:?}: {}", turn.role(), turn.content());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Configuration management for the client.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// Rendering of a service response into display text.
pub mod interpreter;
/// Question-answering service client and types.
pub mod rulebot;
/// Conversation session and request lifecycle.
pub mod session;
/// Live settings and the per-request configuration snapshot.
pub mod settings;
/// Text rendering of scored retrieval candidates.
pub mod trace;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use session::{Session, SubmitOutcome};
pub use settings::{ConfigurationSnapshot, Settings};
