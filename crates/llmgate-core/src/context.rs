//! Caller metadata carried through admission for observability

use serde::{Deserialize, Serialize};

/// Which kind of caller asked for a completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestSource {
    /// Interactive chat turn
    #[default]
    Chat,
    /// Workflow step
    Workflow,
    /// Autonomous agent action
    Agent,
}

impl std::fmt::Display for RequestSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestSource::Chat => write!(f, "chat"),
            RequestSource::Workflow => write!(f, "workflow"),
            RequestSource::Agent => write!(f, "agent"),
        }
    }
}

/// Opaque caller metadata. The limiter stores it but never inspects it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub source: RequestSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

impl RequestContext {
    pub fn chat() -> Self {
        Self::default()
    }

    pub fn workflow(workflow_id: impl Into<String>, execution_id: impl Into<String>) -> Self {
        Self {
            source: RequestSource::Workflow,
            workflow_id: Some(workflow_id.into()),
            execution_id: Some(execution_id.into()),
            agent_id: None,
        }
    }

    pub fn agent(agent_id: impl Into<String>) -> Self {
        Self {
            source: RequestSource::Agent,
            agent_id: Some(agent_id.into()),
            ..Default::default()
        }
    }
}
