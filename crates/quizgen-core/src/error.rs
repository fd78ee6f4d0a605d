use std::fmt;

use thiserror::Error;

/// Which pipeline parsed the quiz JSON when it turned out to be invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonStage {
    /// The span extracted from the model's reply.
    Generate,
    /// The (possibly hand-edited) buffer handed to the quiz script.
    Submit,
}

impl fmt::Display for JsonStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonStage::Generate => write!(f, "generate"),
            JsonStage::Submit => write!(f, "submit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuizError {
    #[error("Please enter some content or instructions for the AI.")]
    EmptyInput,

    #[error("AI API Error: {status} {reason} - {message}", reason = status_reason(.status))]
    RemoteApi { status: u16, message: String },

    #[error("AI returned no content.")]
    MalformedAiOutput,

    #[error("AI did not return a recognizable array structure. Check the AI's response and your prompt.")]
    NoArrayFound,

    /// `raw` carries the offending text when it should still be shown to the user.
    #[error("Invalid JSON ({stage}): {message}")]
    InvalidJson {
        stage: JsonStage,
        message: String,
        raw: Option<String>,
    },

    #[error("No quiz data generated by AI.")]
    NoDataToSubmit,

    #[error("Received non-JSON response from Apps Script. Raw: {raw_prefix}...")]
    NonJsonResponse { raw_prefix: String },

    #[error("Google Apps Script Error: {message}")]
    RemoteScript { message: String },

    #[error("{0}")]
    Network(String),

    /// A request body could not be serialized; nothing was sent.
    #[error("Failed to encode request: {0}")]
    Encode(String),

    #[error("Missing configuration: {0} is not set. Set it with the settings popup or the environment.")]
    MissingConfig(&'static str),
}

impl QuizError {
    pub fn invalid_json(stage: JsonStage, err: &serde_json::Error, raw: Option<String>) -> Self {
        QuizError::InvalidJson {
            stage,
            message: err.to_string(),
            raw,
        }
    }
}

impl From<reqwest::Error> for QuizError {
    fn from(err: reqwest::Error) -> Self {
        QuizError::Network(err.to_string())
    }
}

fn status_reason(status: &u16) -> &'static str {
    reqwest::StatusCode::from_u16(*status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
}

pub type QuizResult<T> = Result<T, QuizError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_api_error_includes_status_and_reason() {
        let err = QuizError::RemoteApi {
            status: 401,
            message: "No auth credentials found".into(),
        };
        assert_eq!(
            err.to_string(),
            "AI API Error: 401 Unauthorized - No auth credentials found"
        );
    }

    #[test]
    fn invalid_json_names_the_stage() {
        let parse_err = serde_json::from_str::<serde_json::Value>("[{\"a\":}]").unwrap_err();
        let err = QuizError::invalid_json(JsonStage::Submit, &parse_err, None);

        assert!(err.to_string().starts_with("Invalid JSON (submit): "));
    }

    #[test]
    fn script_error_names_google_apps_script() {
        let err = QuizError::RemoteScript {
            message: "Folder not found".into(),
        };
        assert_eq!(err.to_string(), "Google Apps Script Error: Folder not found");
    }

    #[test]
    fn non_json_response_shows_prefix() {
        let err = QuizError::NonJsonResponse {
            raw_prefix: "<html>".into(),
        };
        assert_eq!(
            err.to_string(),
            "Received non-JSON response from Apps Script. Raw: <html>..."
        );
    }
}
