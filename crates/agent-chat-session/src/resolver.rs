//! Lazy session resolution with a bounded send fallback.

use std::sync::{Arc, RwLock};

use agent_chat_core::{AgentApi, AgentReply, ApiError, SessionRef, SourceContext};

/// Outcome of a resolve-and-send: the agent reply, plus the session id
/// minted when delivery required creating a session.
#[derive(Debug)]
pub struct Resolution {
    /// Normalized agent reply.
    pub reply: AgentReply,
    /// Newly assigned session id, present only when this send created
    /// the session. The caller promotes it exactly once.
    pub minted_session_id: Option<String>,
}

/// Guarantees a valid remote session exists by the time a message is
/// delivered, with at most one creation attempt per user-initiated send.
pub struct SessionResolver<A: AgentApi> {
    api: Arc<A>,
    routing: RwLock<SourceContext>,
}

impl<A: AgentApi> SessionResolver<A> {
    /// Create a resolver with the default routing for new sessions.
    #[must_use]
    pub fn new(api: Arc<A>, routing: SourceContext) -> Self {
        Self {
            api,
            routing: RwLock::new(routing),
        }
    }

    /// Replace the default routing, e.g. after a settings save.
    pub fn set_routing(&self, routing: SourceContext) {
        *self.routing.write().unwrap() = routing;
    }

    /// Resolve a session and deliver `prompt` to it.
    ///
    /// A resolved session is tried directly; any send failure falls
    /// back to creating a session from the default routing and retrying
    /// the send exactly once. An unresolved session goes straight to
    /// creation. Fallback depth is one: a failed creation or a failed
    /// retried send propagates.
    ///
    /// # Errors
    /// Returns the creation error or the retried send's error.
    pub async fn resolve_and_send(
        &self,
        session: &SessionRef,
        prompt: &str,
    ) -> Result<Resolution, ApiError> {
        if let SessionRef::Resolved(id) = session {
            match self.api.send_message(id, prompt).await {
                Ok(reply) => {
                    return Ok(Resolution {
                        reply,
                        minted_session_id: None,
                    });
                }
                Err(err) => {
                    // Any failure is treated as "session gone"; no
                    // status-code branching.
                    tracing::warn!(session = %id, "send failed, creating a session: {err}");
                }
            }
        }

        let routing = self.routing.read().unwrap().clone();
        let created = self.api.create_session(prompt, &routing).await?;
        tracing::debug!(session = %created.id, "created agent session");

        let reply = self.api.send_message(&created.name, prompt).await?;
        Ok(Resolution {
            reply,
            minted_session_id: Some(created.id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedApi;

    fn resolver(api: &Arc<ScriptedApi>) -> SessionResolver<ScriptedApi> {
        SessionResolver::new(Arc::clone(api), SourceContext::default())
    }

    #[tokio::test]
    async fn healthy_resolved_session_sends_without_creating() {
        let api = Arc::new(ScriptedApi::new());
        api.push_send_ok("pong");

        let resolution = resolver(&api)
            .resolve_and_send(&SessionRef::Resolved("abc123".to_string()), "ping")
            .await
            .unwrap();

        assert_eq!(resolution.reply.content, "pong");
        assert!(resolution.minted_session_id.is_none());
        assert_eq!(api.create_calls(), 0);
        assert_eq!(api.send_calls(), 1);
    }

    #[tokio::test]
    async fn failed_send_creates_once_and_retries_once() {
        let api = Arc::new(ScriptedApi::new());
        api.push_send_err(404);
        api.push_create_ok("abc123");
        api.push_send_ok("Here is your form...");

        let resolution = resolver(&api)
            .resolve_and_send(&SessionRef::Resolved("stale".to_string()), "Build a login form")
            .await
            .unwrap();

        assert_eq!(resolution.reply.content, "Here is your form...");
        assert_eq!(resolution.minted_session_id.as_deref(), Some("abc123"));
        assert_eq!(api.create_calls(), 1);
        assert_eq!(api.send_calls(), 2);
        // The retry targets the full resource name of the new session.
        assert_eq!(api.sent_to(), vec!["stale", "sessions/abc123"]);
    }

    #[tokio::test]
    async fn unresolved_session_creates_then_sends_once() {
        let api = Arc::new(ScriptedApi::new());
        api.push_create_ok("fresh");
        api.push_send_ok("hello");

        let resolution = resolver(&api)
            .resolve_and_send(&SessionRef::Unresolved, "hi")
            .await
            .unwrap();

        assert_eq!(resolution.minted_session_id.as_deref(), Some("fresh"));
        assert_eq!(api.create_calls(), 1);
        assert_eq!(api.send_calls(), 1);
    }

    #[tokio::test]
    async fn creation_failure_propagates_without_more_sends() {
        let api = Arc::new(ScriptedApi::new());
        api.push_send_err(404);
        api.push_create_err(500);

        let err = resolver(&api)
            .resolve_and_send(&SessionRef::Resolved("stale".to_string()), "hi")
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::CreateSession { status: 500, .. }));
        assert_eq!(api.create_calls(), 1);
        assert_eq!(api.send_calls(), 1);
    }

    #[tokio::test]
    async fn failed_retry_propagates_at_depth_one() {
        let api = Arc::new(ScriptedApi::new());
        api.push_send_err(404);
        api.push_create_ok("abc123");
        api.push_send_err(503);

        let err = resolver(&api)
            .resolve_and_send(&SessionRef::Resolved("stale".to_string()), "hi")
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::SendMessage { status: 503, .. }));
        // Exactly one creation attempt and one retried send, never more.
        assert_eq!(api.create_calls(), 1);
        assert_eq!(api.send_calls(), 2);
    }
}
