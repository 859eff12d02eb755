//! Shared test doubles for the orchestration tests.

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use agent_chat_core::{AgentApi, AgentReply, AgentSession, ApiError, Source, SourceContext};
use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Notify;

/// Scripted `AgentApi` double that counts calls.
///
/// Results are consumed in push order; an unscripted call fails, which
/// keeps tests honest about exactly how many calls they expect.
pub struct ScriptedApi {
    send_script: Mutex<VecDeque<Result<AgentReply, ApiError>>>,
    create_script: Mutex<VecDeque<Result<AgentSession, ApiError>>>,
    send_calls: AtomicUsize,
    create_calls: AtomicUsize,
    sent_to: Mutex<Vec<String>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self {
            send_script: Mutex::new(VecDeque::new()),
            create_script: Mutex::new(VecDeque::new()),
            send_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            sent_to: Mutex::new(Vec::new()),
            gate: Mutex::new(None),
        }
    }

    pub fn push_send_ok(&self, text: &str) {
        self.send_script.lock().unwrap().push_back(Ok(AgentReply {
            content: text.to_string(),
            raw: json!({ "response": text }),
        }));
    }

    pub fn push_send_err(&self, status: u16) {
        self.send_script
            .lock()
            .unwrap()
            .push_back(Err(ApiError::SendMessage {
                status,
                body: "scripted failure".to_string(),
            }));
    }

    pub fn push_create_ok(&self, id: &str) {
        self.create_script.lock().unwrap().push_back(Ok(AgentSession {
            name: format!("sessions/{id}"),
            id: id.to_string(),
            title: None,
        }));
    }

    pub fn push_create_err(&self, status: u16) {
        self.create_script
            .lock()
            .unwrap()
            .push_back(Err(ApiError::CreateSession {
                status,
                body: "scripted failure".to_string(),
            }));
    }

    /// Make the next send block until the returned handle is notified.
    pub fn hold_next_send(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn sent_to(&self) -> Vec<String> {
        self.sent_to.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentApi for ScriptedApi {
    fn has_api_key(&self) -> bool {
        true
    }

    async fn list_sources(&self) -> Vec<Source> {
        Vec::new()
    }

    async fn create_session(
        &self,
        _prompt: &str,
        _ctx: &SourceContext,
    ) -> Result<AgentSession, ApiError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.create_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ApiError::CreateSession {
                    status: 599,
                    body: "unscripted create_session call".to_string(),
                })
            })
    }

    async fn send_message(&self, session_id: &str, _content: &str) -> Result<AgentReply, ApiError> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        self.sent_to.lock().unwrap().push(session_id.to_string());

        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.send_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ApiError::SendMessage {
                    status: 599,
                    body: "unscripted send_message call".to_string(),
                })
            })
    }
}
