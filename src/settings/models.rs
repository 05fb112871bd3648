//! Catalog of models the question-answering service is known to accept.

/// A selectable model with its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelOption {
    /// Identifier sent to the service.
    pub value: &'static str,
    /// Human-readable label.
    pub label: &'static str,
}

/// Chat models used for answer generation.
pub const CHAT_MODELS: &[ModelOption] = &[
    ModelOption {
        value: "gpt-4o-mini",
        label: "GPT-4o Mini",
    },
    ModelOption {
        value: "gpt-3.5-turbo",
        label: "GPT-3.5 Turbo",
    },
    ModelOption {
        value: "gpt-4o",
        label: "GPT-4o",
    },
    ModelOption {
        value: "gpt-3",
        label: "GPT-3",
    },
];

/// Sentence embedders used for retrieval.
pub const EMBEDDER_MODELS: &[ModelOption] = &[ModelOption {
    value: "sentence-transformers/all-MiniLM-L6-v2",
    label: "all-MiniLM-L6-v2",
}];

/// Default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Default embedder model.
pub const DEFAULT_EMBEDDER_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Returns true if `value` names a catalogued chat model.
pub fn is_known_chat_model(value: &str) -> bool {
    CHAT_MODELS.iter().any(|m| m.value == value)
}

/// Returns true if `value` names a catalogued embedder.
pub fn is_known_embedder_model(value: &str) -> bool {
    EMBEDDER_MODELS.iter().any(|m| m.value == value)
}
