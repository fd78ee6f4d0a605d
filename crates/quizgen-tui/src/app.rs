use std::path::PathBuf;
use std::sync::Arc;

use quizgen_core::render::{self, GENERATE_SENDING, SUBMIT_SENDING};
use quizgen_core::{
    pipeline, Config, HttpTransport, OpenRouterClient, PipelineRun, QuizDraft, QuizError,
    QuizMetadata, QuizResult, ReqwestTransport, ScriptClient, ScriptResult, Settings,
    StatusReport,
};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Input fields in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Folder,
    Prompt,
    QuizJson,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Title,
        Field::Description,
        Field::Folder,
        Field::Prompt,
        Field::QuizJson,
    ];

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Quiz Title",
            Field::Description => "Description",
            Field::Folder => "Drive Folder",
            Field::Prompt => "Content / Instructions",
            Field::QuizJson => "Quiz JSON",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    ApiKey,
    ScriptUrl,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Editable text with a character-indexed cursor.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    text: String,
    cursor: usize,
    multiline: bool,
}

impl TextInput {
    pub fn single_line() -> Self {
        Self::default()
    }

    pub fn multi_line() -> Self {
        Self {
            multiline: true,
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_multiline(&self) -> bool {
        self.multiline
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        if c == '\n' && !self.multiline {
            return;
        }
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        let (line, _) = self.cursor_position();
        self.cursor = self.index_of(line, 0);
    }

    pub fn move_end(&mut self) {
        let (line, _) = self.cursor_position();
        self.cursor = self.index_of(line, usize::MAX);
    }

    pub fn move_up(&mut self) {
        let (line, col) = self.cursor_position();
        if line > 0 {
            self.cursor = self.index_of(line - 1, col);
        }
    }

    pub fn move_down(&mut self) {
        let (line, col) = self.cursor_position();
        if line + 1 < self.text.split('\n').count() {
            self.cursor = self.index_of(line + 1, col);
        }
    }

    /// (line, column) of the cursor, both counted in characters.
    pub fn cursor_position(&self) -> (usize, usize) {
        let mut line = 0;
        let mut col = 0;
        for c in self.text.chars().take(self.cursor) {
            if c == '\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    fn index_of(&self, line: usize, col: usize) -> usize {
        let mut idx = 0;
        for (i, text) in self.text.split('\n').enumerate() {
            let len = text.chars().count();
            if i == line {
                return idx + col.min(len);
            }
            idx += len + 1;
        }
        self.text.chars().count()
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: Field,

    // Form
    pub title: TextInput,
    pub description: TextInput,
    pub folder: TextInput,
    pub prompt: TextInput,
    pub quiz_json: TextInput,

    // Generate pipeline
    pub generate_run: PipelineRun,
    pub generate_task: Option<JoinHandle<QuizResult<QuizDraft>>>,
    pub ai_status: Option<StatusReport>,

    // Submit pipeline
    pub submit_offered: bool,
    pub submit_run: PipelineRun,
    pub submit_task: Option<JoinHandle<QuizResult<ScriptResult>>>,
    pub script_status: Option<StatusReport>,
    pub last_result: Option<ScriptResult>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Settings popup state
    pub popup: Option<Popup>,
    pub popup_input: TextInput,

    // Settings and clients
    pub config_path: Option<PathBuf>,
    pub settings: Settings,
    transport: Arc<dyn HttpTransport>,
    pub ai_client: Option<OpenRouterClient>,
    pub script_client: Option<ScriptClient>,
}

impl App {
    /// Build the app from the settings file and environment.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Config::get_config_path().ok();
        let config = match &config_path {
            Some(path) => Config::load_from(path).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable settings file {}: {}", path.display(), e);
                Config::new()
            }),
            None => Config::new(),
        };

        let settings = Settings::resolve(&config);
        Ok(Self::new(settings, Arc::new(ReqwestTransport::new()), config_path))
    }

    pub fn new(
        settings: Settings,
        transport: Arc<dyn HttpTransport>,
        config_path: Option<PathBuf>,
    ) -> Self {
        let mut app = Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            focus: Field::Prompt,

            title: TextInput::single_line(),
            description: TextInput::single_line(),
            folder: TextInput::single_line(),
            prompt: TextInput::multi_line(),
            quiz_json: TextInput::multi_line(),

            generate_run: PipelineRun::default(),
            generate_task: None,
            ai_status: None,

            submit_offered: false,
            submit_run: PipelineRun::default(),
            submit_task: None,
            script_status: None,
            last_result: None,

            animation_frame: 0,

            popup: None,
            popup_input: TextInput::single_line(),

            config_path,
            settings,
            transport,
            ai_client: None,
            script_client: None,
        };
        app.rebuild_clients();
        app
    }

    fn rebuild_clients(&mut self) {
        self.ai_client = self.settings.api_key.clone().map(|key| {
            OpenRouterClient::new(self.transport.clone(), key)
                .with_model(self.settings.model.clone())
                .with_endpoint(self.settings.chat_completions_url.clone())
        });
        self.script_client = self
            .settings
            .script_url
            .clone()
            .map(|url| ScriptClient::new(self.transport.clone(), url));
    }

    pub fn field(&self, field: Field) -> &TextInput {
        match field {
            Field::Title => &self.title,
            Field::Description => &self.description,
            Field::Folder => &self.folder,
            Field::Prompt => &self.prompt,
            Field::QuizJson => &self.quiz_json,
        }
    }

    pub fn field_mut(&mut self, field: Field) -> &mut TextInput {
        match field {
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
            Field::Folder => &mut self.folder,
            Field::Prompt => &mut self.prompt,
            Field::QuizJson => &mut self.quiz_json,
        }
    }

    pub fn focused_input(&mut self) -> &mut TextInput {
        self.field_mut(self.focus)
    }

    pub fn metadata(&self) -> QuizMetadata {
        QuizMetadata::new(self.title.text(), self.description.text(), self.folder.text())
    }

    pub fn generate_enabled(&self) -> bool {
        self.generate_run.trigger_enabled()
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_offered && self.submit_run.trigger_enabled()
    }

    /// Start the generate pipeline in the background.
    pub fn start_generate(&mut self) {
        if !self.generate_run.begin() {
            return;
        }

        self.ai_status = Some(StatusReport::info(GENERATE_SENDING));
        self.quiz_json.clear();
        self.submit_offered = false;
        self.script_status = None;
        self.last_result = None;

        let client = self.ai_client.clone();
        let text = self.prompt.text().to_string();
        self.generate_task = Some(tokio::spawn(async move {
            pipeline::generate(client.as_ref(), &text).await
        }));
    }

    /// Start the submit pipeline with whatever the JSON buffer holds now.
    pub fn start_submit(&mut self) {
        if !self.submit_offered || !self.submit_run.begin() {
            return;
        }

        self.script_status = Some(StatusReport::info(SUBMIT_SENDING));

        let client = self.script_client.clone();
        let draft = QuizDraft::new(self.quiz_json.text());
        let metadata = self.metadata();
        self.submit_task = Some(tokio::spawn(async move {
            pipeline::submit(client.as_ref(), &draft, &metadata).await
        }));
    }

    /// Apply the outcome of any pipeline task that has finished.
    pub async fn poll_tasks(&mut self) {
        if self.generate_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.generate_task.take() {
                let outcome = task
                    .await
                    .unwrap_or_else(|e| Err(QuizError::Network(format!("generation task failed: {}", e))));
                self.finish_generate(outcome);
            }
        }

        if self.submit_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.submit_task.take() {
                let outcome = task
                    .await
                    .unwrap_or_else(|e| Err(QuizError::Network(format!("submit task failed: {}", e))));
                self.finish_submit(outcome);
            }
        }
    }

    pub fn finish_generate(&mut self, outcome: QuizResult<QuizDraft>) {
        if let Err(e) = &outcome {
            log::warn!("Quiz generation failed: {}", e);
        }

        let view = render::render_generate(&outcome);
        self.generate_run.finish(outcome.is_ok());
        self.ai_status = Some(view.status);
        if let Some(buffer) = view.buffer {
            self.quiz_json.set_text(buffer);
        }
        self.submit_offered = view.offer_submit;
    }

    pub fn finish_submit(&mut self, outcome: QuizResult<ScriptResult>) {
        self.submit_run.finish(outcome.is_ok());
        self.script_status = Some(render::render_submit(&outcome));
        self.last_result = outcome.ok();
    }

    /// Question count shown next to the JSON buffer.
    pub fn draft_question_count(&self) -> Option<usize> {
        QuizDraft::new(self.quiz_json.text()).question_count()
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.generate_run.is_sending() || self.submit_run.is_sending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn open_popup(&mut self, popup: Popup) {
        self.popup_input.clear();
        if popup == Popup::ScriptUrl {
            if let Some(url) = &self.settings.script_url {
                self.popup_input.set_text(url.clone());
            }
        }
        self.popup = Some(popup);
    }

    pub fn close_popup(&mut self) {
        self.popup = None;
        self.popup_input.clear();
    }

    /// Save the popup's value to the settings file and apply it.
    pub fn confirm_popup(&mut self) -> anyhow::Result<()> {
        let Some(popup) = self.popup else {
            return Ok(());
        };
        let value = self.popup_input.text().trim().to_string();
        if value.is_empty() {
            self.close_popup();
            return Ok(());
        }

        let path = self
            .config_path
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        let mut config = Config::load_from(&path)?;
        match popup {
            Popup::ApiKey => config.openrouter_api_key = Some(value),
            Popup::ScriptUrl => config.script_url = Some(value),
        }
        config.save_to(&path)?;
        log::info!("Saved settings to {}", path.display());

        self.settings = Settings::resolve(&config);
        self.rebuild_clients();
        self.close_popup();
        Ok(())
    }
}
