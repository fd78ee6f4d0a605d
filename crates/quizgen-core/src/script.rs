use std::sync::Arc;

use crate::error::{JsonStage, QuizError, QuizResult};
use crate::quiz::{QuizMetadata, QuizPayload, ScriptResult};
use crate::state::QuizDraft;
use crate::transport::{HttpTransport, JsonPost};

/// Characters of a non-JSON reply kept for diagnostics.
pub const RAW_PREFIX_CHARS: usize = 200;

const UNKNOWN_SCRIPT_ERROR: &str = "Unknown error from script.";

/// Client for the quiz-creation web app (a Google Apps Script deployment).
#[derive(Clone)]
pub struct ScriptClient {
    transport: Arc<dyn HttpTransport>,
    url: String,
}

impl ScriptClient {
    pub fn new(transport: Arc<dyn HttpTransport>, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
        }
    }

    /// Post the draft and its metadata to the script and interpret the reply.
    ///
    /// The draft is parsed again here because the user may have edited it
    /// since generation. Nothing is sent when it is empty or not JSON.
    pub async fn submit_quiz(
        &self,
        draft: &QuizDraft,
        metadata: &QuizMetadata,
    ) -> QuizResult<ScriptResult> {
        let payload = prepare_payload(draft, metadata)?;
        let body =
            serde_json::to_value(&payload).map_err(|e| QuizError::Encode(e.to_string()))?;

        log::info!(
            "Submitting quiz '{}' to folder '{}'",
            payload.title,
            payload.folder_name
        );

        let reply = self
            .transport
            .post_json(
                JsonPost::new(&self.url, body)
                    .with_header("Content-Type", "application/json;charset=utf-8")
                    .with_header("Cache-Control", "no-cache"),
            )
            .await?;

        interpret_reply(&reply.body)
    }
}

/// Check the draft and bundle it with metadata, without touching the network.
pub fn prepare_payload(draft: &QuizDraft, metadata: &QuizMetadata) -> QuizResult<QuizPayload> {
    if draft.is_empty() {
        return Err(QuizError::NoDataToSubmit);
    }

    let quiz_data: serde_json::Value = serde_json::from_str(draft.as_str())
        .map_err(|e| QuizError::invalid_json(JsonStage::Submit, &e, None))?;

    Ok(QuizPayload::new(quiz_data, metadata))
}

/// Turn the script's raw reply body into an outcome. The HTTP status is not
/// consulted; the script reports failures in the body.
pub fn interpret_reply(body: &str) -> QuizResult<ScriptResult> {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Quiz script replied with non-JSON body: {}", e);
            return Err(QuizError::NonJsonResponse {
                raw_prefix: body.chars().take(RAW_PREFIX_CHARS).collect(),
            });
        }
    };

    let result = ScriptResult::from_value(&value);
    if result.is_success() {
        log::info!(
            "Quiz script created form {}",
            result.form_id.as_deref().unwrap_or("<unknown>")
        );
        return Ok(result);
    }

    let message = if result.message.is_empty() {
        UNKNOWN_SCRIPT_ERROR.to_string()
    } else {
        result.message
    };
    log::warn!("Quiz script reported an error: {}", message);
    Err(QuizError::RemoteScript { message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{DEFAULT_DESCRIPTION, DEFAULT_FOLDER, DEFAULT_TITLE};
    use crate::transport::{HttpReply, MockHttpTransport};

    const SCRIPT_URL: &str = "https://script.google.com/macros/s/test/exec";
    const QUIZ: &str =
        r#"[{"questionText":"Q","choices":["A","B"],"correctAnswers":["A"],"points":1}]"#;

    fn client_replying(body: &'static str) -> ScriptClient {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_post_json()
            .times(1)
            .returning(move |_| Ok(HttpReply::new(200, body)));
        ScriptClient::new(Arc::new(transport), SCRIPT_URL)
    }

    fn client_never_called() -> ScriptClient {
        let mut transport = MockHttpTransport::new();
        transport.expect_post_json().times(0);
        ScriptClient::new(Arc::new(transport), SCRIPT_URL)
    }

    #[tokio::test]
    async fn blank_metadata_gets_defaults_in_payload() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_post_json()
            .withf(|request| {
                request.url == SCRIPT_URL
                    && request.bearer_token.is_none()
                    && request.header("Cache-Control") == Some("no-cache")
                    && request.body["title"] == DEFAULT_TITLE
                    && request.body["description"] == DEFAULT_DESCRIPTION
                    && request.body["folderName"] == DEFAULT_FOLDER
                    && request.body["quizData"][0]["questionText"] == "Q"
            })
            .times(1)
            .returning(|_| Ok(HttpReply::new(200, r#"{"status":"success","message":"ok"}"#)));
        let client = ScriptClient::new(Arc::new(transport), SCRIPT_URL);

        let result = client
            .submit_quiz(&QuizDraft::new(QUIZ), &QuizMetadata::new("", " ", ""))
            .await
            .unwrap();
        assert_eq!(result.message, "ok");
    }

    #[tokio::test]
    async fn success_reply_is_returned_with_links() {
        let client = client_replying(
            r#"{"status":"success","message":"ok","formId":"F1","editUrl":"http://e","publishedUrl":"http://p"}"#,
        );

        let result = client
            .submit_quiz(&QuizDraft::new(QUIZ), &QuizMetadata::default())
            .await
            .unwrap();

        assert_eq!(result.message, "ok");
        assert_eq!(result.form_id.as_deref(), Some("F1"));
        assert_eq!(result.edit_url.as_deref(), Some("http://e"));
        assert_eq!(result.published_url.as_deref(), Some("http://p"));
    }

    #[tokio::test]
    async fn empty_draft_is_not_sent() {
        let client = client_never_called();

        assert_eq!(
            client
                .submit_quiz(&QuizDraft::new(""), &QuizMetadata::default())
                .await,
            Err(QuizError::NoDataToSubmit)
        );
    }

    #[tokio::test]
    async fn hand_edited_invalid_json_is_not_sent() {
        let client = client_never_called();

        match client
            .submit_quiz(&QuizDraft::new("[{\"a\":}]"), &QuizMetadata::default())
            .await
        {
            Err(QuizError::InvalidJson { stage, raw, .. }) => {
                assert_eq!(stage, JsonStage::Submit);
                assert_eq!(raw, None);
            }
            other => panic!("expected InvalidJson, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn non_json_reply_keeps_raw_prefix() {
        let client = client_replying("not json");

        assert_eq!(
            client
                .submit_quiz(&QuizDraft::new(QUIZ), &QuizMetadata::default())
                .await,
            Err(QuizError::NonJsonResponse {
                raw_prefix: "not json".into()
            })
        );
    }

    #[test]
    fn long_non_json_reply_is_truncated_by_characters() {
        let body = "é".repeat(250);

        match interpret_reply(&body) {
            Err(QuizError::NonJsonResponse { raw_prefix }) => {
                assert_eq!(raw_prefix.chars().count(), RAW_PREFIX_CHARS);
                assert!(body.starts_with(&raw_prefix));
            }
            other => panic!("expected NonJsonResponse, got {:?}", other),
        }
    }

    #[test]
    fn script_error_uses_its_message() {
        assert_eq!(
            interpret_reply(r#"{"status":"error","message":"Folder not found"}"#),
            Err(QuizError::RemoteScript {
                message: "Folder not found".into()
            })
        );
    }

    #[test]
    fn script_error_without_message_uses_default() {
        for body in [r#"{"status":"error"}"#, r#"{"status":"error","message":""}"#, "[]"] {
            assert_eq!(
                interpret_reply(body),
                Err(QuizError::RemoteScript {
                    message: "Unknown error from script.".into()
                })
            );
        }
    }
}
