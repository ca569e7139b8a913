use anyhow::Result;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;

use crate::attachment::Attached;
use crate::config::Config;
use crate::gemini::GeminiClient;
use crate::model::{CopyRequest, CopyResponse};
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Input,
    Loading,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Form fields in Tab order. Content type and tone are picker-driven;
/// the rest are free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Description,
    ContentType,
    Tone,
    CharLimit,
    Image,
    Location,
    Trigger,
    Outcome,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            FormField::Description => FormField::ContentType,
            FormField::ContentType => FormField::Tone,
            FormField::Tone => FormField::CharLimit,
            FormField::CharLimit => FormField::Image,
            FormField::Image => FormField::Location,
            FormField::Location => FormField::Trigger,
            FormField::Trigger => FormField::Outcome,
            FormField::Outcome => FormField::Description,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FormField::Description => FormField::Outcome,
            FormField::ContentType => FormField::Description,
            FormField::Tone => FormField::ContentType,
            FormField::CharLimit => FormField::Tone,
            FormField::Image => FormField::CharLimit,
            FormField::Location => FormField::Image,
            FormField::Trigger => FormField::Location,
            FormField::Outcome => FormField::Trigger,
        }
    }
}

pub const CONTENT_TYPES: [&str; 8] = [
    "Tooltip",
    "Error message",
    "Button (CTA)",
    "Success message",
    "Onboarding tip",
    "Empty state",
    "Modal title",
    "Modal body",
];

pub const TONES: [&str; 6] = [
    "Friendly",
    "Neutral",
    "Serious",
    "Formal",
    "Casual",
    "Empathetic",
];

// "Copied!" reverts after this many ticks (300ms each).
const COPIED_TICKS: u8 = 7;

/// The editable form. Survives a failed generation so the user can
/// adjust and resubmit; cleared only by start/start-over.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub description: String,
    pub content_type: String,
    pub tone: String,
    pub char_limit: String,
    pub location: String,
    pub trigger: String,
    pub outcome: String,
    pub image_path: String,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub theme: Theme,

    // Form state
    pub form: FormState,
    pub focused_field: FormField,
    pub cursor: usize,
    pub attachment: Option<Attached>,
    pub attachment_error: Option<String>,

    // Picker state
    pub show_content_type_picker: bool,
    pub content_type_state: ListState,
    pub show_tone_picker: bool,
    pub tone_state: ListState,

    // Generation state: the request/response/error triple plus the
    // in-flight task and its generation id.
    pub request: Option<CopyRequest>,
    pub response: Option<CopyResponse>,
    pub error: Option<String>,
    pub generation: u64,
    pub generate_task: Option<(u64, JoinHandle<Result<CopyResponse>>)>,

    // Output state
    pub selected_option: usize,
    pub copied_option: Option<usize>,
    copied_ticks: u8,

    // Animation state
    pub animation_frame: u8,

    // AI client
    pub client: GeminiClient,
}

impl App {
    pub fn new(client: GeminiClient) -> Self {
        let config = Config::load().unwrap_or_else(|_| Config::new());
        let theme = config
            .theme
            .as_deref()
            .and_then(Theme::from_str)
            .unwrap_or_default();

        Self {
            should_quit: false,
            screen: Screen::Home,
            input_mode: InputMode::Normal,
            theme,

            form: FormState::default(),
            focused_field: FormField::Description,
            cursor: 0,
            attachment: None,
            attachment_error: None,

            show_content_type_picker: false,
            content_type_state: ListState::default(),
            show_tone_picker: false,
            tone_state: ListState::default(),

            request: None,
            response: None,
            error: None,
            generation: 0,
            generate_task: None,

            selected_option: 0,
            copied_option: None,
            copied_ticks: 0,

            animation_frame: 0,

            client,
        }
    }

    fn reset(&mut self) {
        self.form = FormState::default();
        self.focused_field = FormField::Description;
        self.cursor = 0;
        self.attachment = None;
        self.attachment_error = None;
        self.show_content_type_picker = false;
        self.show_tone_picker = false;
        self.request = None;
        self.response = None;
        self.error = None;
        self.selected_option = 0;
        self.copied_option = None;
        self.copied_ticks = 0;
        self.input_mode = InputMode::Normal;
        // Dropping the handle detaches any in-flight task; its eventual
        // result is discarded.
        self.generate_task = None;
    }

    /// Home -> Input, starting from a clean slate.
    pub fn start(&mut self) {
        self.reset();
        self.screen = Screen::Input;
        self.input_mode = InputMode::Editing;
    }

    /// Full reset back to Home, from any screen.
    pub fn start_over(&mut self) {
        self.reset();
        self.screen = Screen::Home;
    }

    pub fn can_submit(&self) -> bool {
        !self.form.description.trim().is_empty() && self.generate_task.is_none()
    }

    /// Snapshot the form and enter Loading. Returns the generation id and
    /// request for the caller to spawn; `None` when submission is blocked.
    pub fn submit(&mut self) -> Option<(u64, CopyRequest)> {
        if !self.can_submit() {
            return None;
        }

        let request = CopyRequest {
            description: self.form.description.clone(),
            content_type: self.form.content_type.clone(),
            location: self.form.location.clone(),
            trigger: self.form.trigger.clone(),
            outcome: self.form.outcome.clone(),
            tone: self.form.tone.clone(),
            char_limit: self.form.char_limit.clone(),
            image: self.attachment.as_ref().map(|a| a.image.clone()),
        };

        self.request = Some(request.clone());
        self.response = None;
        self.error = None;
        self.input_mode = InputMode::Normal;
        self.screen = Screen::Loading;
        self.animation_frame = 0;
        self.generation += 1;

        Some((self.generation, request))
    }

    /// Replay the stored request verbatim through the submit path.
    pub fn regenerate(&mut self) -> Option<(u64, CopyRequest)> {
        if self.generate_task.is_some() {
            return None;
        }
        let request = self.request.clone()?;

        self.error = None;
        self.screen = Screen::Loading;
        self.animation_frame = 0;
        self.generation += 1;

        Some((self.generation, request))
    }

    /// Apply the outcome of a generation task. A completion that does not
    /// match the current generation, or arrives after the user left the
    /// loading screen, is dropped.
    pub fn complete(&mut self, id: u64, result: Result<CopyResponse>) {
        if id != self.generation || self.screen != Screen::Loading {
            tracing::debug!("dropping stale generation result (id {})", id);
            return;
        }

        match result {
            Ok(response) => {
                self.response = Some(response);
                self.selected_option = 0;
                self.copied_option = None;
                self.screen = Screen::Output;
            }
            Err(e) => {
                tracing::warn!("generation failed: {}", e);
                self.error = Some(e.to_string());
                self.screen = Screen::Input;
            }
        }
    }

    // Form helpers

    pub fn focus_field(&mut self, field: FormField) {
        self.focused_field = field;
        self.cursor = self
            .focused_text()
            .map(|t| t.chars().count())
            .unwrap_or(0);
    }

    pub fn focus_next_field(&mut self) {
        self.focus_field(self.focused_field.next());
    }

    pub fn focus_prev_field(&mut self) {
        self.focus_field(self.focused_field.prev());
    }

    pub fn focused_text(&self) -> Option<&String> {
        match self.focused_field {
            FormField::Description => Some(&self.form.description),
            FormField::CharLimit => Some(&self.form.char_limit),
            FormField::Image => Some(&self.form.image_path),
            FormField::Location => Some(&self.form.location),
            FormField::Trigger => Some(&self.form.trigger),
            FormField::Outcome => Some(&self.form.outcome),
            FormField::ContentType | FormField::Tone => None,
        }
    }

    pub fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focused_field {
            FormField::Description => Some(&mut self.form.description),
            FormField::CharLimit => Some(&mut self.form.char_limit),
            FormField::Image => Some(&mut self.form.image_path),
            FormField::Location => Some(&mut self.form.location),
            FormField::Trigger => Some(&mut self.form.trigger),
            FormField::Outcome => Some(&mut self.form.outcome),
            FormField::ContentType | FormField::Tone => None,
        }
    }

    // Image attachment

    pub fn attach_image(&mut self) {
        let path = self.form.image_path.trim().to_string();
        if path.is_empty() {
            return;
        }

        match crate::attachment::load(std::path::Path::new(&path)) {
            Ok(attached) => {
                tracing::info!("attached {} ({} bytes)", attached.file_name, attached.bytes);
                self.attachment = Some(attached);
                self.attachment_error = None;
            }
            Err(e) => {
                // Image treated as absent; the rest of the form is unaffected.
                self.attachment = None;
                self.attachment_error = Some(e.to_string());
            }
        }
    }

    pub fn remove_image(&mut self) {
        self.attachment = None;
        self.attachment_error = None;
        self.form.image_path.clear();
        if self.focused_field == FormField::Image {
            self.cursor = 0;
        }
    }

    // Pickers

    pub fn open_content_type_picker(&mut self) {
        let current = CONTENT_TYPES
            .iter()
            .position(|t| *t == self.form.content_type)
            .map(|i| i + 1)
            .unwrap_or(0);
        self.content_type_state.select(Some(current));
        self.show_content_type_picker = true;
    }

    pub fn open_tone_picker(&mut self) {
        let current = TONES
            .iter()
            .position(|t| *t == self.form.tone)
            .map(|i| i + 1)
            .unwrap_or(0);
        self.tone_state.select(Some(current));
        self.show_tone_picker = true;
    }

    /// Apply the highlighted picker entry. Index 0 is "(none)".
    pub fn select_content_type(&mut self) {
        if let Some(i) = self.content_type_state.selected() {
            self.form.content_type = if i == 0 {
                String::new()
            } else {
                CONTENT_TYPES.get(i - 1).copied().unwrap_or("").to_string()
            };
        }
        self.show_content_type_picker = false;
    }

    pub fn select_tone(&mut self) {
        if let Some(i) = self.tone_state.selected() {
            self.form.tone = if i == 0 {
                String::new()
            } else {
                TONES.get(i - 1).copied().unwrap_or("").to_string()
            };
        }
        self.show_tone_picker = false;
    }

    // Output navigation

    pub fn option_count(&self) -> usize {
        self.response.as_ref().map(|r| r.options.len()).unwrap_or(0)
    }

    pub fn select_next_option(&mut self) {
        let len = self.option_count();
        if len > 0 {
            self.selected_option = (self.selected_option + 1).min(len - 1);
        }
    }

    pub fn select_prev_option(&mut self) {
        self.selected_option = self.selected_option.saturating_sub(1);
    }

    pub fn mark_copied(&mut self, index: usize) {
        self.copied_option = Some(index);
        self.copied_ticks = COPIED_TICKS;
    }

    // Theme

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        let _ = Config::save_theme(self.theme.as_str());
    }

    /// Advance animation and timers; called on every Tick event.
    pub fn tick(&mut self) {
        if self.screen == Screen::Loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        if self.copied_ticks > 0 {
            self.copied_ticks -= 1;
            if self.copied_ticks == 0 {
                self.copied_option = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CopyOption, ImageAttachment};
    use anyhow::anyhow;

    fn test_app() -> App {
        App::new(GeminiClient::new("test-key"))
    }

    fn filled_app() -> App {
        let mut app = test_app();
        app.start();
        app.form.description = "Tooltip for disabled export button".to_string();
        app.form.content_type = "Tooltip".to_string();
        app.form.tone = "Friendly".to_string();
        app.form.char_limit = "80".to_string();
        app
    }

    fn one_option_response() -> CopyResponse {
        CopyResponse {
            options: vec![CopyOption {
                text: "Export is disabled until you pick at least one filter.".to_string(),
                tone: "Friendly".to_string(),
                character_count: 53,
            }],
        }
    }

    #[test]
    fn test_initial_state_is_home() {
        let app = test_app();
        assert_eq!(app.screen, Screen::Home);
        assert!(app.request.is_none());
        assert!(app.response.is_none());
        assert!(app.error.is_none());
    }

    #[test]
    fn test_start_clears_prior_state() {
        let mut app = test_app();
        app.error = Some("old error".to_string());
        app.response = Some(one_option_response());
        app.request = Some(CopyRequest::default());

        app.start();
        assert_eq!(app.screen, Screen::Input);
        assert!(app.request.is_none());
        assert!(app.response.is_none());
        assert!(app.error.is_none());
    }

    #[test]
    fn test_empty_description_blocks_submit() {
        let mut app = test_app();
        app.start();
        app.form.description = "   \t ".to_string();
        assert!(!app.can_submit());
        assert!(app.submit().is_none());
        assert_eq!(app.screen, Screen::Input);
    }

    #[test]
    fn test_submit_snapshots_form_and_enters_loading() {
        let mut app = filled_app();
        app.error = Some("stale error".to_string());

        let (id, request) = app.submit().unwrap();
        assert_eq!(id, 1);
        assert_eq!(app.screen, Screen::Loading);
        assert!(app.error.is_none());
        assert!(app.response.is_none());
        assert_eq!(request.description, "Tooltip for disabled export button");
        assert_eq!(request.content_type, "Tooltip");
        assert_eq!(app.request.as_ref(), Some(&request));
    }

    #[test]
    fn test_submit_carries_attachment() {
        let mut app = filled_app();
        app.attachment = Some(crate::attachment::Attached {
            image: ImageAttachment {
                mime_type: "image/png".to_string(),
                data: "aGVsbG8=".to_string(),
            },
            file_name: "mock.png".to_string(),
            bytes: 5,
        });

        let (_, request) = app.submit().unwrap();
        let image = request.image.unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "aGVsbG8=");
    }

    #[test]
    fn test_success_enters_output() {
        let mut app = filled_app();
        let (id, _) = app.submit().unwrap();

        app.complete(id, Ok(one_option_response()));
        assert_eq!(app.screen, Screen::Output);
        assert_eq!(app.option_count(), 1);
        assert_eq!(app.selected_option, 0);
    }

    #[test]
    fn test_failure_returns_to_input_with_form_intact() {
        let mut app = filled_app();
        let (id, _) = app.submit().unwrap();

        app.complete(id, Err(anyhow!("Failed to get suggestions from AI: timeout")));
        assert_eq!(app.screen, Screen::Input);
        let error = app.error.as_deref().unwrap();
        assert!(!error.is_empty());
        // The submitted request and the form both survive for re-editing.
        assert!(app.request.is_some());
        assert_eq!(app.form.description, "Tooltip for disabled export button");
        assert_eq!(app.form.tone, "Friendly");
    }

    #[test]
    fn test_regenerate_replays_identical_request() {
        let mut app = filled_app();
        let (id, first) = app.submit().unwrap();
        app.complete(id, Ok(one_option_response()));

        let (second_id, second) = app.regenerate().unwrap();
        assert!(second_id > id);
        assert_eq!(second, first);
        assert_eq!(app.screen, Screen::Loading);
    }

    #[test]
    fn test_stale_completion_is_dropped() {
        let mut app = filled_app();
        let (id, _) = app.submit().unwrap();

        app.start_over();
        app.complete(id, Ok(one_option_response()));

        assert_eq!(app.screen, Screen::Home);
        assert!(app.response.is_none());
    }

    #[test]
    fn test_outdated_generation_id_is_dropped() {
        let mut app = filled_app();
        let (first_id, _) = app.submit().unwrap();
        app.complete(first_id, Err(anyhow!("transport error")));

        let (second_id, _) = app.submit().unwrap();
        assert!(second_id > first_id);

        // A late result from the first attempt must not win.
        app.complete(first_id, Ok(one_option_response()));
        assert_eq!(app.screen, Screen::Loading);
        assert!(app.response.is_none());
    }

    #[test]
    fn test_start_over_resets_everything() {
        let mut app = filled_app();
        let (id, _) = app.submit().unwrap();
        app.complete(id, Ok(one_option_response()));

        app.start_over();
        assert_eq!(app.screen, Screen::Home);
        assert!(app.request.is_none());
        assert!(app.response.is_none());
        assert!(app.error.is_none());
        assert!(app.form.description.is_empty());
        assert!(app.attachment.is_none());
    }

    #[test]
    fn test_content_type_picker_roundtrip() {
        let mut app = test_app();
        app.start();
        app.open_content_type_picker();
        assert_eq!(app.content_type_state.selected(), Some(0));

        app.content_type_state.select(Some(1));
        app.select_content_type();
        assert_eq!(app.form.content_type, "Tooltip");
        assert!(!app.show_content_type_picker);

        // Reopening highlights the current value; index 0 clears it.
        app.open_content_type_picker();
        assert_eq!(app.content_type_state.selected(), Some(1));
        app.content_type_state.select(Some(0));
        app.select_content_type();
        assert!(app.form.content_type.is_empty());
    }

    #[test]
    fn test_attach_rejects_unsupported_file() {
        let mut app = test_app();
        app.start();
        app.form.image_path = "/tmp/readme.md".to_string();
        app.attach_image();
        assert!(app.attachment.is_none());
        assert!(app
            .attachment_error
            .as_deref()
            .unwrap()
            .contains("Unsupported file type"));
    }

    #[test]
    fn test_attach_reports_read_failure_and_leaves_image_absent() {
        let mut app = test_app();
        app.start();
        app.form.image_path = "/nonexistent/shot.png".to_string();
        app.attach_image();
        assert!(app.attachment.is_none());
        assert!(app
            .attachment_error
            .as_deref()
            .unwrap()
            .contains("Failed to read the file"));
    }

    #[test]
    fn test_copied_indicator_reverts_after_ticks() {
        let mut app = test_app();
        app.mark_copied(0);
        assert_eq!(app.copied_option, Some(0));
        for _ in 0..COPIED_TICKS {
            app.tick();
        }
        assert!(app.copied_option.is_none());
    }

    #[test]
    fn test_tab_order_wraps_both_ways() {
        let mut field = FormField::Description;
        for _ in 0..8 {
            field = field.next();
        }
        assert_eq!(field, FormField::Description);
        for _ in 0..8 {
            field = field.prev();
        }
        assert_eq!(field, FormField::Description);
    }
}
