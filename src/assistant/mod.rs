//! Chat bookkeeping for the fitness assistant.
//!
//! The model call itself sits behind [`CompletionService`]; this module owns the
//! retained history, the system prompt and the mapping from service failures
//! to the apology shown in the chat.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

pub const SYSTEM_PROMPT: &str = "You are a professional fitness coach and nutritionist AI assistant. \
You provide helpful, accurate, and motivating advice about:
- Workout routines and exercise techniques
- Nutrition and meal planning
- Fitness goals and progress tracking
- Injury prevention and recovery
- Mental health and motivation

Always provide practical, actionable advice. Use markdown formatting for better readability. \
Be encouraging and supportive while maintaining professionalism. If asked about medical \
conditions, always recommend consulting with healthcare professionals.";

const APOLOGY_PREFIX: &str = "I apologize, but I'm having trouble connecting right now. ";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion service rejected the credentials")]
    Authentication,
    #[error("completion service rate limit exceeded")]
    RateLimited,
    #[error("completion service unreachable: {0}")]
    Connectivity(String),
}

impl CompletionError {
    /// Text shown in the chat in place of an answer.
    pub fn user_message(&self) -> String {
        let hint = match self {
            CompletionError::Authentication => "Please check your API key and try again.",
            CompletionError::RateLimited => "Rate limit exceeded. Please try again in a moment.",
            CompletionError::Connectivity(_) => {
                "Please try again later or use one of the quick actions above."
            }
        };
        format!("{APOLOGY_PREFIX}{hint}")
    }
}

/// A chat model. `messages` starts with the system prompt, followed by the
/// retained history ending in the newest user turn.
pub trait CompletionService: Send + Sync {
    fn complete(
        &self,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<String, CompletionError>> + Send;
}

pub struct Conversation<S> {
    service: S,
    history: Vec<ChatMessage>,
    window: usize,
}

impl<S: CompletionService> Conversation<S> {
    pub fn new(service: S, window: usize) -> Self {
        Self {
            service,
            history: Vec::new(),
            window: window.max(1),
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Sends one user turn. Blank input is ignored and returns `None`.
    ///
    /// On failure the user turn stays in the history and the returned
    /// assistant message carries the apology instead of an answer. Either way
    /// the history never grows past the window.
    pub async fn send(&mut self, input: &str) -> Option<ChatMessage> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        self.history.push(ChatMessage::new(Role::User, input));
        self.trim_to_window();

        let mut messages = Vec::with_capacity(self.history.len() + 1);
        messages.push(ChatMessage::new(Role::System, SYSTEM_PROMPT));
        messages.extend(self.history.iter().cloned());

        match self.service.complete(&messages).await {
            Ok(answer) => {
                let reply = ChatMessage::new(Role::Assistant, answer);
                self.history.push(reply.clone());
                self.trim_to_window();
                log_info!("Assistant replied; {} messages retained", self.history.len());
                Some(reply)
            }
            Err(err) => {
                log_warn!("Assistant request failed: {err}");
                Some(ChatMessage::new(Role::Assistant, err.user_message()))
            }
        }
    }

    fn trim_to_window(&mut self) {
        if self.history.len() > self.window {
            let excess = self.history.len() - self.window;
            self.history.drain(..excess);
        }
    }
}
