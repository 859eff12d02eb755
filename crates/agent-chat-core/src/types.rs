//! Shared data types for conversations and the remote agent API.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Identifier of a durable conversation log, minted locally.
///
/// Distinct from the remote agent session id, which is remote-assigned
/// and attached to the conversation only after resolution.
pub type ConversationId = Uuid;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The human driving the conversation.
    User,
    /// The remote coding agent.
    Agent,
}

/// One persisted turn in a conversation log.
///
/// Records are append-only: never mutated, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Message author.
    pub role: Role,
    /// Message body; may contain structured text or code.
    pub content: String,
    /// Store-assigned creation timestamp (microseconds), strictly
    /// monotonic within a conversation. The sole ordering key.
    pub created_at: i64,
}

/// Conversation metadata kept alongside the message log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation identifier.
    pub id: ConversationId,
    /// Short title derived from the first prompt.
    pub title: String,
    /// Remote agent session bound to this conversation, once resolved.
    pub agent_session_id: Option<String>,
    /// Creation timestamp (microseconds).
    pub created_at: i64,
    /// Last update timestamp.
    pub updated_at: i64,
}

/// Remote session handle for a conversation.
///
/// Only the session resolver transitions `Unresolved` to `Resolved`,
/// and a conversation is promoted at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRef {
    /// No remote session exists yet.
    Unresolved,
    /// A remote session id has been assigned.
    Resolved(String),
}

impl SessionRef {
    /// Rebuild the reference from a persisted optional id.
    #[must_use]
    pub fn from_stored(id: Option<String>) -> Self {
        id.map_or(Self::Unresolved, Self::Resolved)
    }

    /// The resolved session id, if any.
    #[must_use]
    pub fn resolved_id(&self) -> Option<&str> {
        match self {
            Self::Unresolved => None,
            Self::Resolved(id) => Some(id),
        }
    }

    /// Whether a remote session id has been assigned.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Source repository routing for newly created sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceContext {
    /// Repository owner; the client falls back to its documented
    /// default when unset.
    pub owner: Option<String>,
    /// Repository name; same fallback rule as `owner`.
    pub repo: Option<String>,
    /// Starting branch for agent work.
    pub branch: String,
}

impl Default for SourceContext {
    fn default() -> Self {
        Self {
            owner: None,
            repo: None,
            branch: "main".to_string(),
        }
    }
}

/// A source repository visible to the remote agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Resource name, e.g. `sources/github/owner/repo`.
    pub name: String,
    /// Human-readable name, when the API provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// A remote session as returned by session creation.
#[derive(Debug, Clone)]
pub struct AgentSession {
    /// Full resource name, e.g. `sessions/abc123`.
    pub name: String,
    /// Short id: the trailing path segment of `name`.
    pub id: String,
    /// Title assigned at creation.
    pub title: Option<String>,
}

/// Normalized reply from a send operation.
#[derive(Debug, Clone)]
pub struct AgentReply {
    /// Extracted reply text.
    pub content: String,
    /// Raw response payload, kept for diagnostics.
    pub raw: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Agent).unwrap(), "\"agent\"");
    }

    #[test]
    fn session_ref_from_stored() {
        assert_eq!(SessionRef::from_stored(None), SessionRef::Unresolved);
        assert_eq!(
            SessionRef::from_stored(Some("abc123".to_string())),
            SessionRef::Resolved("abc123".to_string())
        );
        assert_eq!(
            SessionRef::from_stored(Some("abc123".to_string())).resolved_id(),
            Some("abc123")
        );
    }

    #[test]
    fn source_context_defaults_to_main() {
        let ctx = SourceContext::default();
        assert_eq!(ctx.branch, "main");
        assert!(ctx.owner.is_none());
        assert!(ctx.repo.is_none());
    }
}
