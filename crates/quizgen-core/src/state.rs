//! UI-agnostic pipeline state types
//!
//! This module contains data structures that are shared between the core
//! pipelines and any UI that drives them (the TUI today), without depending
//! on a specific UI framework.

use serde::{Deserialize, Serialize};

use crate::quiz::QuizQuestion;

/// A chat message sent to the chat-completion endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
}

/// Quiz JSON handed from generation to submission.
///
/// Generation produces one; the UI shows its text in an editable buffer and
/// builds a fresh draft from whatever the buffer holds when submission is
/// triggered. The draft itself never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizDraft {
    text: String,
}

impl QuizDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of array entries that read as a [`QuizQuestion`].
    ///
    /// Informational only; `None` when the text is not a JSON array.
    pub fn question_count(&self) -> Option<usize> {
        let entries: Vec<serde_json::Value> = serde_json::from_str(&self.text).ok()?;
        Some(
            entries
                .iter()
                .filter(|entry| QuizQuestion::deserialize(*entry).is_ok())
                .count(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Sending,
    Succeeded,
    Failed,
}

/// Lifecycle of one pipeline's trigger: `Idle -> Sending -> {Succeeded, Failed}`.
///
/// Only `Sending` keeps the trigger disabled; both outcomes are idle again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineRun {
    phase: RunPhase,
}

impl PipelineRun {
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_sending(&self) -> bool {
        self.phase == RunPhase::Sending
    }

    pub fn trigger_enabled(&self) -> bool {
        !self.is_sending()
    }

    /// Enter `Sending`. Returns false (and changes nothing) if a run is
    /// already in flight.
    pub fn begin(&mut self) -> bool {
        if self.is_sending() {
            return false;
        }
        self.phase = RunPhase::Sending;
        true
    }

    pub fn finish(&mut self, succeeded: bool) {
        self.phase = if succeeded {
            RunPhase::Succeeded
        } else {
            RunPhase::Failed
        };
    }
}
