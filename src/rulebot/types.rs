use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::ServiceError;
use crate::settings::ConfigurationSnapshot;

/// Identifier of a rule or situation, kept exactly as the service spelled it.
///
/// The service sends rule ids as strings (`"4.1."`) and situation ids as
/// numbers; both are carried as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CandidateId(String);

impl CandidateId {
    /// View the id as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CandidateId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CandidateId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CandidateId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => CandidateId(text),
            RawId::Number(number) => CandidateId(number.to_string()),
        })
    }
}

/// Body of `POST /ask`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskRequest {
    pub gpt_model: String,
    pub embedder_model_name: String,
    pub embedding_dim: u32,
    pub top_k_chunks: u32,
    pub top_k_rules: u32,
    pub top_k_situations: u32,
    pub threshold: f64,
    pub situation_threshold: f64,
    pub temperature: f64,
    pub max_length: u32,
    pub question: String,
}

impl AskRequest {
    /// Map a snapshot and an already-trimmed question onto the wire shape.
    pub fn new(snapshot: &ConfigurationSnapshot, question: impl Into<String>) -> Self {
        Self {
            gpt_model: snapshot.model.clone(),
            embedder_model_name: snapshot.embedder_model.clone(),
            embedding_dim: snapshot.embedding_dim,
            top_k_chunks: snapshot.top_k_chunks,
            top_k_rules: snapshot.top_k_rules,
            top_k_situations: snapshot.top_k_situations,
            threshold: snapshot.threshold,
            situation_threshold: snapshot.situation_threshold,
            temperature: snapshot.temperature,
            max_length: snapshot.max_length,
            question: question.into(),
        }
    }
}

/// Successful `/ask` response body as sent by the service
#[derive(Debug, Clone, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    /// Prompt the service built; logged, never displayed.
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub retrieved_all_rules: Option<Vec<RuleCandidate>>,
    #[serde(default)]
    pub retrieved_top_rules: Option<Vec<RuleCandidate>>,
    #[serde(default)]
    pub retrieved_situations: Option<Vec<SituationCandidate>>,
}

/// Rule entry of a retrieval list
#[derive(Debug, Clone, Deserialize)]
pub struct RuleCandidate {
    pub rule_id: CandidateId,
    pub score_sum: f64,
    #[serde(default)]
    pub rule_title: Option<String>,
    #[serde(default)]
    pub subrule_title: Option<String>,
}

/// Situation entry of a retrieval list
#[derive(Debug, Clone, Deserialize)]
pub struct SituationCandidate {
    pub situation_id: CandidateId,
    pub rule_id: CandidateId,
    pub similarity: f64,
}

/// Error body of a non-success response (`{"detail": ...}`)
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Human-readable message carried by `detail`, if any.
    ///
    /// Validation failures arrive as an array of objects rather than a
    /// string; those are rendered as compact JSON.
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.trim().is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// A rule the service retrieved and scored.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedRule {
    pub rule_id: CandidateId,
    pub rule_title: String,
    pub subrule_title: Option<String>,
    pub aggregate_score: f64,
}

/// A situation the service retrieved and scored.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedSituation {
    pub situation_id: CandidateId,
    pub rule_id: CandidateId,
    pub similarity_score: f64,
}

/// Validated answer plus retrieval trace.
///
/// The three lists are independent and kept in service order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceResponse {
    pub answer_text: String,
    pub retrieved_all_rules: Vec<RetrievedRule>,
    pub retrieved_top_rules: Vec<RetrievedRule>,
    pub retrieved_situations: Vec<RetrievedSituation>,
}

impl ServiceResponse {
    /// Response with an answer and no retrieval trace.
    pub fn new(answer_text: impl Into<String>) -> Self {
        Self {
            answer_text: answer_text.into(),
            ..Default::default()
        }
    }
}

impl TryFrom<AskResponse> for ServiceResponse {
    type Error = ServiceError;

    fn try_from(raw: AskResponse) -> Result<Self, Self::Error> {
        let retrieved_all_rules = convert_rules("retrieved_all_rules", raw.retrieved_all_rules)?;
        let retrieved_top_rules = convert_rules("retrieved_top_rules", raw.retrieved_top_rules)?;

        let retrieved_situations = raw
            .retrieved_situations
            .unwrap_or_default()
            .into_iter()
            .map(|situation| -> Result<RetrievedSituation, ServiceError> {
                ensure_finite(
                    "retrieved_situations",
                    situation.situation_id.as_str(),
                    situation.similarity,
                )?;
                Ok(RetrievedSituation {
                    situation_id: situation.situation_id,
                    rule_id: situation.rule_id,
                    similarity_score: situation.similarity,
                })
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;

        Ok(Self {
            answer_text: raw.answer,
            retrieved_all_rules,
            retrieved_top_rules,
            retrieved_situations,
        })
    }
}

fn convert_rules(
    list: &str,
    rules: Option<Vec<RuleCandidate>>,
) -> Result<Vec<RetrievedRule>, ServiceError> {
    rules
        .unwrap_or_default()
        .into_iter()
        .map(|rule| -> Result<RetrievedRule, ServiceError> {
            ensure_finite(list, rule.rule_id.as_str(), rule.score_sum)?;
            Ok(RetrievedRule {
                rule_id: rule.rule_id,
                rule_title: rule.rule_title.unwrap_or_default(),
                subrule_title: rule.subrule_title.filter(|s| !s.is_empty()),
                aggregate_score: rule.score_sum,
            })
        })
        .collect()
}

fn ensure_finite(list: &str, id: &str, score: f64) -> Result<(), ServiceError> {
    if score.is_finite() {
        Ok(())
    } else {
        Err(ServiceError::InvalidResponse {
            message: format!("non-finite score {score} for {id} in {list}"),
        })
    }
}
