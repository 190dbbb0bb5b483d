use tracing::info;

use crate::fallback::{CHAT_FALLBACK, WELCOME_MESSAGE};
use crate::gateway::{log_failure, AiGateway};
use crate::model::{ChatRole, ChatTurn};

/// Append-only turn history. The gateway is stateless, so every `send`
/// replays the full prior history.
#[derive(Debug, Clone)]
pub struct ChatLog {
    turns: Vec<ChatTurn>,
}

impl Default for ChatLog {
    fn default() -> Self {
        ChatLog {
            turns: vec![ChatTurn::new(ChatRole::Model, WELCOME_MESSAGE)],
        }
    }
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    /// Sends one user turn and appends the reply. Blank input is ignored and
    /// returns `None`; a failed call appends a canned apology.
    pub async fn send(&mut self, gateway: &dyn AiGateway, text: &str) -> Option<&ChatTurn> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let history_len = self.turns.len();
        self.turns.push(ChatTurn::new(ChatRole::User, text));

        let reply = match gateway.chat(&self.turns[..history_len], text).await {
            Ok(reply) => reply,
            Err(e) => {
                log_failure("chat", &e);
                CHAT_FALLBACK.to_string()
            }
        };
        info!(turns = self.turns.len() + 1, "chat reply received");
        self.turns.push(ChatTurn::new(ChatRole::Model, &reply));
        self.turns.last()
    }
}
