//! `reqwest`-based implementation of the remote agent API.

use std::sync::RwLock;

use agent_chat_core::{
    AgentApi, AgentReply, AgentSession, ApiError, Source, SourceContext, extract_reply_text,
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::wire::{
    CreateSessionRequest, GithubRepoContext, ListSourcesResponse, SendMessageRequest,
    SessionResource, SourceContextBody,
};

const DEFAULT_BASE_URL: &str = "https://jules.googleapis.com/v1alpha";
const API_KEY_HEADER: &str = "X-Goog-Api-Key";

/// Fallback routing when the configuration leaves owner/repo unset.
/// The source must exist or be accessible to the API key user.
const DEFAULT_OWNER: &str = "google";
const DEFAULT_REPO: &str = "jules-samples";

/// Session titles are clipped to this many characters of the prompt.
const TITLE_MAX_CHARS: usize = 50;

/// Stateless HTTP wrapper over the three remote agent operations.
///
/// Holds a single mutable API key slot so the credential can be
/// re-injected on a settings save without rebuilding the client.
pub struct HttpAgentClient {
    client: Client,
    base_url: String,
    api_key: RwLock<String>,
}

impl HttpAgentClient {
    /// Create a client against the default endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: RwLock::new(api_key.into()),
        }
    }

    /// Override the API endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Re-inject the credential, e.g. after a settings save.
    pub fn set_api_key(&self, key: impl Into<String>) {
        *self.api_key.write().unwrap() = key.into();
    }

    fn key(&self) -> Result<String, ApiError> {
        let key = self.api_key.read().unwrap().clone();
        if key.is_empty() {
            Err(ApiError::MissingApiKey)
        } else {
            Ok(key)
        }
    }

    async fn try_list_sources(&self) -> Result<Vec<Source>, ApiError> {
        let key = self.key()?;
        let response = self
            .client
            .get(format!("{}/sources", self.base_url))
            .header(API_KEY_HEADER, key)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Transport(format!(
                "list sources failed ({}): {body}",
                status.as_u16()
            )));
        }

        let parsed: ListSourcesResponse = response.json().await.map_err(transport)?;
        Ok(parsed.sources)
    }
}

#[async_trait]
impl AgentApi for HttpAgentClient {
    fn has_api_key(&self) -> bool {
        !self.api_key.read().unwrap().is_empty()
    }

    async fn list_sources(&self) -> Vec<Source> {
        match self.try_list_sources().await {
            Ok(sources) => sources,
            Err(err) => {
                tracing::warn!("failed to list sources (non-fatal): {err}");
                Vec::new()
            }
        }
    }

    async fn create_session(
        &self,
        prompt: &str,
        ctx: &SourceContext,
    ) -> Result<AgentSession, ApiError> {
        let key = self.key()?;

        let owner = ctx.owner.as_deref().unwrap_or(DEFAULT_OWNER);
        let repo = ctx.repo.as_deref().unwrap_or(DEFAULT_REPO);
        let source = format!("sources/github/{owner}/{repo}");
        tracing::debug!(%source, branch = %ctx.branch, "creating agent session");

        let body = CreateSessionRequest {
            prompt: prompt.to_string(),
            source_context: SourceContextBody {
                source,
                github_repo_context: GithubRepoContext {
                    starting_branch: ctx.branch.clone(),
                },
            },
            title: clip_chars(prompt, TITLE_MAX_CHARS),
        };

        let response = self
            .client
            .post(format!("{}/sessions", self.base_url))
            .header(API_KEY_HEADER, key)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "session creation rejected");
            return Err(ApiError::CreateSession {
                status: status.as_u16(),
                body,
            });
        }

        let resource: SessionResource = response.json().await.map_err(transport)?;
        let id = trailing_segment(&resource.name).to_string();
        tracing::debug!(session = %id, "agent session created");

        Ok(AgentSession {
            name: resource.name,
            id,
            title: resource.title,
        })
    }

    async fn send_message(&self, session_id: &str, content: &str) -> Result<AgentReply, ApiError> {
        let key = self.key()?;

        let resource = session_resource_path(session_id);
        tracing::debug!(%resource, "sending message");

        let response = self
            .client
            .post(format!("{}/{resource}:sendMessage", self.base_url))
            .header(API_KEY_HEADER, key)
            .json(&SendMessageRequest {
                prompt: content.to_string(),
            })
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::SendMessage {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await.map_err(transport)?;
        Ok(parse_reply(text))
    }
}

/// Normalize a 2xx response body into a reply.
///
/// The reply shape is not stable; a non-JSON body degrades to its raw
/// text rather than an error.
fn parse_reply(text: String) -> AgentReply {
    let raw: Value = serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text));
    let content = extract_reply_text(&raw);
    AgentReply { content, raw }
}

fn transport(err: reqwest::Error) -> ApiError {
    ApiError::Transport(err.to_string())
}

/// Expand a bare id to a full session resource path; a path-style id is
/// used as-is.
fn session_resource_path(session_id: &str) -> String {
    if session_id.contains('/') {
        session_id.to_string()
    } else {
        format!("sessions/{session_id}")
    }
}

fn trailing_segment(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn clip_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
