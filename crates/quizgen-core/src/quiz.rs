//! Quiz data exchanged with the model and the quiz script.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "AI Generated Quiz (Default)";
pub const DEFAULT_DESCRIPTION: &str = "Generated by AI Chrome Extension";
pub const DEFAULT_FOLDER: &str = "Generated AI Quizzes";

/// A single generated question.
///
/// `correct_answers` is expected to be a subset of `choices`, but nothing
/// checks it: the quiz script is the only consumer that cares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question_text: String,
    pub choices: Vec<String>,
    pub correct_answers: Vec<String>,
    pub points: f64,
}

/// Free-text details typed next to the quiz data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizMetadata {
    pub title: String,
    pub description: String,
    pub folder: String,
}

impl QuizMetadata {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            folder: folder.into(),
        }
    }
}

/// Body posted to the quiz script.
///
/// `quiz_data` is the parsed draft as-is; its question shape is not checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizPayload {
    pub quiz_data: serde_json::Value,
    pub title: String,
    pub description: String,
    pub folder_name: String,
}

impl QuizPayload {
    /// Bundle parsed quiz data with metadata, falling back to the defaults
    /// for every field left blank.
    pub fn new(quiz_data: serde_json::Value, metadata: &QuizMetadata) -> Self {
        Self {
            quiz_data,
            title: or_default(&metadata.title, DEFAULT_TITLE),
            description: or_default(&metadata.description, DEFAULT_DESCRIPTION),
            folder_name: or_default(&metadata.folder, DEFAULT_FOLDER),
        }
    }
}

fn or_default(value: &str, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Reply from the quiz script, read leniently from whatever JSON came back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptResult {
    pub status: String,
    pub message: String,
    pub form_id: Option<String>,
    pub edit_url: Option<String>,
    pub published_url: Option<String>,
}

impl ScriptResult {
    pub fn from_value(value: &serde_json::Value) -> Self {
        let text = |key: &str| value.get(key).and_then(|v| v.as_str()).map(str::to_string);

        Self {
            status: text("status").unwrap_or_default(),
            message: text("message").unwrap_or_default(),
            form_id: text("formId"),
            edit_url: text("editUrl"),
            published_url: text("publishedUrl"),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}
