//! Remote question-answering service.
//!
//! This module provides:
//! - Wire types for `POST /ask` and its error body
//! - Validated retrieval candidates and the parsed service response
//! - The [`QaService`] seam the session talks to, and its HTTP client

mod client;
mod types;


pub use client::{RulebotClient, ASK_PATH};
pub use types::*;

use async_trait::async_trait;

use crate::error::ServiceResult;
use crate::settings::ConfigurationSnapshot;

/// Outbound call made once per admitted question.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QaService: Send + Sync {
    /// Send `question` (already trimmed) with the frozen settings.
    async fn ask(
        &self,
        snapshot: &ConfigurationSnapshot,
        question: &str,
    ) -> ServiceResult<ServiceResponse>;
}
