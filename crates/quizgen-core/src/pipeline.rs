//! The two user-triggered pipelines, as UI-independent async functions.

use crate::ai::OpenRouterClient;
use crate::config::{API_KEY_ENV, SCRIPT_URL_ENV};
use crate::error::{QuizError, QuizResult};
use crate::prompt::build_quiz_prompt;
use crate::quiz::{QuizMetadata, ScriptResult};
use crate::script::{prepare_payload, ScriptClient};
use crate::state::QuizDraft;

/// Build the prompt from the user's text and ask the model for quiz JSON.
///
/// Blank input fails before the client is even looked at.
pub async fn generate(client: Option<&OpenRouterClient>, user_text: &str) -> QuizResult<QuizDraft> {
    let prompt = build_quiz_prompt(user_text)?;
    let client = client.ok_or(QuizError::MissingConfig(API_KEY_ENV))?;
    client.generate_quiz_json(&prompt).await
}

/// Send the draft as it stands now, with its metadata, to the quiz script.
pub async fn submit(
    client: Option<&ScriptClient>,
    draft: &QuizDraft,
    metadata: &QuizMetadata,
) -> QuizResult<ScriptResult> {
    prepare_payload(draft, metadata)?;
    let client = client.ok_or(QuizError::MissingConfig(SCRIPT_URL_ENV))?;
    client.submit_quiz(draft, metadata).await
}
