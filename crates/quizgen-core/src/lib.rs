pub mod ai;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod quiz;
pub mod render;
pub mod script;
pub mod state;
pub mod transport;

// Re-export main types for convenience
pub use ai::{ArrayScan, OpenRouterClient};
pub use config::{Config, KeySource, Settings};
pub use error::{JsonStage, QuizError, QuizResult};
pub use quiz::{QuizMetadata, QuizPayload, QuizQuestion, ScriptResult};
pub use render::{GenerateView, StatusLine, StatusReport, Tone};
pub use script::ScriptClient;
pub use state::{ChatMessage, ChatRole, PipelineRun, QuizDraft, RunPhase};
pub use transport::{HttpReply, HttpTransport, JsonPost, ReqwestTransport};
