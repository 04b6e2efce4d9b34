//! Conversation history.
//!
//! Only text-mode exchanges are recorded. Vision turns carry image parts
//! that are never replayed on later sends.

use edumind_core::message::{Conversation, ConversationTurn};

#[derive(Debug, Default)]
pub struct ConversationHistory {
    conversation: Conversation,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: ConversationTurn) {
        self.conversation.push(turn);
    }

    /// Record a completed exchange: the user turn and the assistant reply.
    pub fn record_exchange(&mut self, user: ConversationTurn, assistant: ConversationTurn) {
        self.conversation.push(user);
        self.conversation.push(assistant);
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.conversation.turns
    }

    pub fn len(&self) -> usize {
        self.conversation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversation.is_empty()
    }

    pub fn clear(&mut self) {
        self.conversation.clear();
    }

    /// The message list for a text-mode request: every recorded turn
    /// followed by the pending user turn.
    pub fn request_messages(&self, pending: &ConversationTurn) -> Vec<ConversationTurn> {
        let mut messages = Vec::with_capacity(self.len() + 1);
        messages.extend(self.turns().iter().cloned());
        messages.push(pending.clone());
        messages
    }
}
