pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One request to the text-generation capability. Sampling settings are
/// supplied by the caller as policy constants, never exposed per-request
/// to end users.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Ask the upstream for a machine-parseable (JSON) reply.
    pub json_mode: bool,
}

/// Upstream token accounting, passed through to callers where the API
/// surface exposes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

/// Boundary to the external LLM collaborator. The pipeline core only sees
/// this trait; transport status codes are classified into the `AppError`
/// taxonomy inside the adapter.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: CompletionRequest) -> Result<Completion, AppError>;
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Scripted generator for tests: replies in order from a queue and
    /// records every request it receives.
    pub struct MockLlm {
        replies: Mutex<Vec<Result<String, AppError>>>,
        pub requests: Mutex<Vec<CompletionRequest>>,
    }

    impl MockLlm {
        /// `replies` are consumed front-to-back, one per `generate` call.
        pub fn scripted(replies: Vec<Result<String, AppError>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Replies `"generated: {n}"` for the n-th call, never failing.
        pub fn echoing() -> Self {
            Self::scripted(Vec::new())
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextGenerator for MockLlm {
        async fn generate(&self, request: CompletionRequest) -> Result<Completion, AppError> {
            let mut requests = self.requests.lock().unwrap();
            let call_index = requests.len();
            requests.push(request);
            drop(requests);

            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                return Ok(Completion {
                    text: format!("generated: {call_index}"),
                    usage: Some(TokenUsage {
                        prompt_tokens: 10,
                        completion_tokens: 5,
                        total_tokens: 15,
                    }),
                });
            }
            replies.remove(0).map(|text| Completion {
                text,
                usage: Some(TokenUsage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                }),
            })
        }
    }

    /// Generator that panics if reached. Used to prove gates run first.
    pub struct UnreachableLlm;

    #[async_trait]
    impl TextGenerator for UnreachableLlm {
        async fn generate(&self, _request: CompletionRequest) -> Result<Completion, AppError> {
            panic!("TextGenerator must not be called on this path");
        }
    }
}
