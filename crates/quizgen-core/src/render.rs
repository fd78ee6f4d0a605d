//! Turns pipeline outcomes into the text shown in the two status regions.
//!
//! Everything here is a pure function of its input so any UI can draw it.

use crate::error::{QuizError, QuizResult};
use crate::quiz::ScriptResult;
use crate::state::QuizDraft;

pub const GENERATE_SENDING: &str = "Sending to AI... Please wait.";
pub const SUBMIT_SENDING: &str = "Sending data to Google Apps Script... Please wait.";
pub const GENERATE_FAILED_BUFFER: &str = "Failed to get data from AI.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Error,
}

/// One status line; `link` is set when the line ends in a URL the user can open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub link: Option<String>,
}

impl StatusLine {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: None,
        }
    }

    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: label.into(),
            link: Some(url.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub tone: Tone,
    pub lines: Vec<StatusLine>,
}

impl StatusReport {
    pub fn info(text: impl Into<String>) -> Self {
        Self::single(Tone::Info, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::single(Tone::Error, text)
    }

    fn single(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            tone,
            lines: vec![StatusLine::text(text)],
        }
    }

    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| line.link.as_deref())
    }

    /// Lines joined with newlines, links written out after their label.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| match &line.link {
                Some(url) => format!("{}{}", line.text, url),
                None => line.text.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// What the UI should show after a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateView {
    pub status: StatusReport,
    /// New checkpoint buffer contents; `None` leaves it as it is.
    pub buffer: Option<String>,
    pub offer_submit: bool,
}

pub fn render_generate(outcome: &QuizResult<QuizDraft>) -> GenerateView {
    match outcome {
        Ok(draft) => GenerateView {
            status: StatusReport {
                tone: Tone::Success,
                lines: vec![StatusLine::text(
                    "AI processing complete. Review the data below and fill in Quiz Details if needed.",
                )],
            },
            buffer: Some(draft.as_str().to_string()),
            offer_submit: true,
        },
        Err(QuizError::EmptyInput) => GenerateView {
            status: StatusReport::error(QuizError::EmptyInput.to_string()),
            buffer: None,
            offer_submit: false,
        },
        Err(err @ (QuizError::MalformedAiOutput | QuizError::Encode(_))) => GenerateView {
            status: StatusReport::error(err.to_string()),
            buffer: None,
            offer_submit: false,
        },
        Err(QuizError::InvalidJson { message, raw, .. }) => GenerateView {
            status: StatusReport::error(format!(
                "Error: AI output was not valid JSON. {}",
                message
            )),
            buffer: raw.clone(),
            offer_submit: false,
        },
        Err(other) => GenerateView {
            status: StatusReport::error(format!("Error communicating with AI: {}", other)),
            buffer: Some(GENERATE_FAILED_BUFFER.to_string()),
            offer_submit: false,
        },
    }
}

pub fn render_submit(outcome: &QuizResult<ScriptResult>) -> StatusReport {
    match outcome {
        Ok(result) => {
            let mut lines = vec![
                StatusLine::text(format!("Google Apps Script: {}", result.message)),
                StatusLine::text(format!(
                    "Quiz ID: {}",
                    result.form_id.as_deref().unwrap_or("")
                )),
            ];
            if let Some(url) = &result.edit_url {
                lines.push(StatusLine::link("Edit URL: ", url));
            }
            if let Some(url) = &result.published_url {
                lines.push(StatusLine::link("Published URL: ", url));
            }
            StatusReport {
                tone: Tone::Success,
                lines,
            }
        }
        Err(QuizError::InvalidJson { .. }) => StatusReport::error(
            "Error: The AI-generated data is not valid JSON. Cannot send.",
        ),
        Err(
            err @ (QuizError::NoDataToSubmit
            | QuizError::NonJsonResponse { .. }
            | QuizError::RemoteScript { .. }
            | QuizError::MissingConfig(_)
            | QuizError::Encode(_)),
        ) => StatusReport::error(err.to_string()),
        Err(other) => StatusReport::error(format!(
            "Error communicating with Google Apps Script: {}",
            other
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JsonStage;

    #[test]
    fn generate_success_fills_buffer_and_offers_submit() {
        let view = render_generate(&Ok(QuizDraft::new("[1]")));

        assert_eq!(view.status.tone, Tone::Success);
        assert_eq!(view.buffer.as_deref(), Some("[1]"));
        assert!(view.offer_submit);
    }

    #[test]
    fn invalid_json_shows_raw_text_verbatim() {
        let raw = "[{\"a\":}]".to_string();
        let view = render_generate(&Err(QuizError::InvalidJson {
            stage: JsonStage::Generate,
            message: "expected value at line 1 column 7".into(),
            raw: Some(raw.clone()),
        }));

        assert_eq!(view.buffer, Some(raw));
        assert!(!view.offer_submit);
        assert_eq!(
            view.status.plain_text(),
            "Error: AI output was not valid JSON. expected value at line 1 column 7"
        );
    }

    #[test]
    fn empty_input_leaves_buffer_alone() {
        let view = render_generate(&Err(QuizError::EmptyInput));

        assert_eq!(view.buffer, None);
        assert_eq!(
            view.status.plain_text(),
            "Please enter some content or instructions for the AI."
        );
    }

    #[test]
    fn remote_failures_replace_buffer() {
        let view = render_generate(&Err(QuizError::NoArrayFound));

        assert_eq!(view.buffer.as_deref(), Some(GENERATE_FAILED_BUFFER));
        assert!(view
            .status
            .plain_text()
            .starts_with("Error communicating with AI: AI did not return"));
    }

    #[test]
    fn submit_success_surfaces_message_id_and_links() {
        let report = render_submit(&Ok(ScriptResult {
            status: "success".into(),
            message: "ok".into(),
            form_id: Some("F1".into()),
            edit_url: Some("http://e".into()),
            published_url: Some("http://p".into()),
        }));

        let text = report.plain_text();
        assert!(text.contains("ok"));
        assert!(text.contains("F1"));
        assert_eq!(report.links().collect::<Vec<_>>(), vec!["http://e", "http://p"]);
    }

    #[test]
    fn submit_non_json_is_a_diagnostic() {
        let report = render_submit(&Err(QuizError::NonJsonResponse {
            raw_prefix: "not json".into(),
        }));

        assert_eq!(report.tone, Tone::Error);
        assert_eq!(
            report.plain_text(),
            "Received non-JSON response from Apps Script. Raw: not json..."
        );
    }

    #[test]
    fn local_encode_failures_are_not_reported_as_network_errors() {
        let err = QuizError::Encode("key must be a string".into());

        let view = render_generate(&Err(err.clone()));
        assert_eq!(
            view.status.plain_text(),
            "Failed to encode request: key must be a string"
        );
        assert_eq!(view.buffer, None);

        let report = render_submit(&Err(err));
        assert_eq!(
            report.plain_text(),
            "Failed to encode request: key must be a string"
        );
    }

    #[test]
    fn submit_success_names_google_apps_script() {
        let report = render_submit(&Ok(ScriptResult {
            status: "success".into(),
            message: "Quiz created".into(),
            ..ScriptResult::default()
        }));
        assert!(report
            .plain_text()
            .starts_with("Google Apps Script: Quiz created"));
    }

    #[test]
    fn submit_network_failure_is_prefixed() {
        let report = render_submit(&Err(QuizError::Network("dns error".into())));
        assert_eq!(
            report.plain_text(),
            "Error communicating with Google Apps Script: dns error"
        );
    }

    #[test]
    fn submit_invalid_json_refuses_to_send() {
        let report = render_submit(&Err(QuizError::InvalidJson {
            stage: JsonStage::Submit,
            message: "eof".into(),
            raw: None,
        }));
        assert_eq!(
            report.plain_text(),
            "Error: The AI-generated data is not valid JSON. Cannot send."
        );
    }
}
