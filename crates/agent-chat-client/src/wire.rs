//! Wire payloads for the remote agent API.

use agent_chat_core::Source;
use serde::{Deserialize, Serialize};

/// `POST /sessions` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    /// Initial instruction for the session.
    pub prompt: String,
    /// Source repository the session works against.
    pub source_context: SourceContextBody,
    /// Short title, clipped from the prompt.
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceContextBody {
    /// Source resource name, e.g. `sources/github/owner/repo`.
    pub source: String,
    pub github_repo_context: GithubRepoContext,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubRepoContext {
    pub starting_branch: String,
}

/// `POST /sessions` response body (only the fields relied upon).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResource {
    /// Path-style resource identifier, e.g. `sessions/abc123`.
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// `GET /sources` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ListSourcesResponse {
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// `:sendMessage` request body.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub prompt: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_session_request_uses_camel_case() {
        let request = CreateSessionRequest {
            prompt: "Build a login form".to_string(),
            source_context: SourceContextBody {
                source: "sources/github/octocat/hello-world".to_string(),
                github_repo_context: GithubRepoContext {
                    starting_branch: "main".to_string(),
                },
            },
            title: "Build a login form".to_string(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json["sourceContext"]["source"],
            "sources/github/octocat/hello-world"
        );
        assert_eq!(
            json["sourceContext"]["githubRepoContext"]["startingBranch"],
            "main"
        );
        assert_eq!(json["title"], "Build a login form");
    }

    #[test]
    fn list_sources_response_tolerates_missing_list() {
        let parsed: ListSourcesResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.sources.is_empty());

        let parsed: ListSourcesResponse = serde_json::from_str(
            "{\"sources\": [{\"name\": \"sources/github/a/b\", \"displayName\": \"a/b\"}]}",
        )
        .unwrap();
        assert_eq!(parsed.sources.len(), 1);
        assert_eq!(parsed.sources[0].display_name.as_deref(), Some("a/b"));
    }

    #[test]
    fn session_resource_ignores_unknown_fields() {
        let parsed: SessionResource = serde_json::from_str(
            "{\"name\": \"sessions/abc123\", \"state\": \"ACTIVE\", \"createTime\": \"now\"}",
        )
        .unwrap();
        assert_eq!(parsed.name, "sessions/abc123");
        assert!(parsed.title.is_none());
    }
}
