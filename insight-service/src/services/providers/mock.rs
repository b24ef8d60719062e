//! Scripted chat provider for testing.

use super::{ChatCompletion, ChatProvider, ChatRequest, ProviderError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

enum Script {
    Reply(String),
    Fail(fn() -> ProviderError),
}

/// Returns a fixed reply (or failure) and records every request it sees.
pub struct ScriptedChatProvider {
    script: Script,
    calls: AtomicUsize,
    last_request: Mutex<Option<ChatRequest>>,
}

impl ScriptedChatProvider {
    pub fn replying(content: impl Into<String>) -> Self {
        Self::with_script(Script::Reply(content.into()))
    }

    /// Fails every call with the error built by `error`.
    pub fn failing(error: fn() -> ProviderError) -> Self {
        Self::with_script(Script::Fail(error))
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }
}

#[async_trait]
impl ChatProvider for ScriptedChatProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted/model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        match &self.script {
            Script::Reply(content) => Ok(ChatCompletion {
                content: content.clone(),
                finish_reason: Some("stop".to_string()),
                usage: None,
            }),
            Script::Fail(error) => Err(error()),
        }
    }
}
