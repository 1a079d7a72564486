//! Conversation history for chat-mode refinement.
//!
//! The history grows by one turn at a time (user turn, then assistant turn),
//! is append-only during the session, and is flattened to text wholesale at
//! generation time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{DomainError, Timestamp};

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    /// Label used when flattening the transcript.
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Assistant => "assistant",
        }
    }
}

/// One turn in the refinement conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    id: Uuid,
    speaker: Speaker,
    text: String,
    at: Timestamp,
}

impl Turn {
    fn new(speaker: Speaker, text: &str) -> Result<Self, DomainError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::empty_field("text"));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            speaker,
            text: text.to_string(),
            at: Timestamp::now(),
        })
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn at(&self) -> &Timestamp {
        &self.at
    }
}

/// Append-only ordered sequence of conversation turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded turns in order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of recorded turns, counting both speakers.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Appends a user turn.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the text is empty or whitespace-only
    pub fn push_user(&mut self, text: &str) -> Result<(), DomainError> {
        self.turns.push(Turn::new(Speaker::User, text)?);
        Ok(())
    }

    /// Appends an assistant turn.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the text is empty or whitespace-only
    pub fn push_assistant(&mut self, text: &str) -> Result<(), DomainError> {
        self.turns.push(Turn::new(Speaker::Assistant, text)?);
        Ok(())
    }

    /// Flattens the whole history to `speaker: text` lines for the
    /// generation prompt.
    pub fn flatten(&self) -> String {
        self.turns
            .iter()
            .map(|t| format!("{}: {}", t.speaker().label(), t.text()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
