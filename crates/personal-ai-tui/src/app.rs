use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use personal_ai_core::chat::CounterLevel;
use personal_ai_core::wizard::{Navigation, NotifyLevel, StepAction};
use personal_ai_core::{
    ChatError, ChatSession, ChatView, Config, Debouncer, Feedback, FieldName, FormError, FormView,
    FormWizard, Message, Profile, ProfileStore, Style, ThreadRandom, TOTAL_STEPS,
};
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Train,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// What the training screen currently shows. Driven by the wizard.
#[derive(Debug, Clone)]
pub struct TrainView {
    pub step: usize,
    pub fields: Vec<FieldName>,
    pub percent: u16,
    pub completed: usize,
    pub total: usize,
    pub feedback: HashMap<FieldName, Feedback>,
    pub navigation: Navigation,
    pub submitting: bool,
    pub success: bool,
    pub status: Option<(String, NotifyLevel)>,
}

impl Default for TrainView {
    fn default() -> Self {
        Self {
            step: 1,
            fields: Vec::new(),
            percent: 0,
            completed: 0,
            total: TOTAL_STEPS,
            feedback: HashMap::new(),
            navigation: Navigation {
                prev_enabled: false,
                action: StepAction::Next,
            },
            submitting: false,
            success: false,
            status: None,
        }
    }
}

impl TrainView {
    pub fn feedback_for(&self, field: FieldName) -> &Feedback {
        self.feedback.get(&field).unwrap_or(&Feedback::None)
    }
}

impl FormView for TrainView {
    fn show_step(&mut self, step: usize, fields: &[FieldName]) {
        self.step = step;
        self.fields = fields.to_vec();
    }

    fn set_progress(&mut self, percent: u16, completed: usize, total: usize) {
        self.percent = percent;
        self.completed = completed;
        self.total = total;
    }

    fn set_feedback(&mut self, field: FieldName, feedback: Feedback) {
        self.feedback.insert(field, feedback);
    }

    fn set_navigation(&mut self, navigation: Navigation) {
        self.navigation = navigation;
    }

    fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    fn show_success(&mut self) {
        self.success = true;
    }

    fn notify(&mut self, message: &str, level: NotifyLevel) {
        self.status = Some((message.to_string(), level));
    }
}

/// What the chat screen currently shows. Driven by the chat session.
#[derive(Debug, Clone, Default)]
pub struct ChatPane {
    pub typing: bool,
    pub send_enabled: bool,
    pub scroll: u16,
    pub height: u16, // Height of transcript area for scroll calculations
    pub width: u16,  // Width of transcript area for wrap calculations
    pub follow: bool,
}

impl ChatView for ChatPane {
    fn append_message(&mut self, _message: &Message) {
        self.follow = true;
    }

    fn set_typing(&mut self, typing: bool) {
        self.typing = typing;
        self.follow = true;
    }

    fn set_send_enabled(&mut self, enabled: bool) {
        self.send_enabled = enabled;
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub config: Config,
    store: Box<dyn ProfileStore>,
    events: UnboundedSender<AppEvent>,

    // Training form
    pub wizard: FormWizard,
    pub train_view: TrainView,
    pub field_cursor: usize,
    pub style_state: ListState,
    debouncer: Debouncer<AppEvent>,
    pending_submission: Option<Profile>,

    // Chat
    pub chat: ChatSession,
    pub chat_view: ChatPane,
    pub chat_input: String,
    pub chat_cursor: usize,
    rng: ThreadRandom,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    /// Must be called inside a tokio runtime; the welcome timer starts here.
    pub fn new(
        config: Config,
        store: Box<dyn ProfileStore>,
        events: UnboundedSender<AppEvent>,
        screen: Screen,
    ) -> Self {
        let profile = match store.load() {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "could not read stored profile");
                None
            }
        };

        let mut wizard = FormWizard::new();
        if let Some(profile) = &profile {
            prefill(&mut wizard, profile);
        }
        let mut train_view = TrainView::default();
        wizard.render(&mut train_view);

        let mut style_state = ListState::default();
        let selected_style = Style::from_str(wizard.value(FieldName::Style))
            .and_then(|style| Style::all().iter().position(|s| *s == style));
        style_state.select(selected_style);

        let debouncer = Debouncer::new(config.validation_debounce(), events.clone());
        let chat = ChatSession::new(profile, config.reply_delay_window());

        let mut app = Self {
            should_quit: false,
            screen,
            input_mode: InputMode::Normal,
            config,
            store,
            events,

            wizard,
            train_view,
            field_cursor: 0,
            style_state,
            debouncer,
            pending_submission: None,

            chat,
            chat_view: ChatPane::default(),
            chat_input: String::new(),
            chat_cursor: 0,
            rng: ThreadRandom,

            animation_frame: 0,
        };
        app.schedule_welcome();
        app
    }

    /// Post `event` back into the loop after `delay`.
    fn schedule(&self, delay: Duration, event: AppEvent) {
        let tx = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(event);
        });
    }

    fn schedule_welcome(&self) {
        if self.chat.welcome_message().is_some() {
            self.schedule(self.config.welcome_delay(), AppEvent::Welcome);
        }
    }

    /// The field being edited on the current step.
    pub fn current_field(&self) -> Option<FieldName> {
        self.wizard.current_fields().first().copied()
    }

    pub fn current_value(&self) -> &str {
        self.current_field()
            .map(|field| self.wizard.value(field))
            .unwrap_or("")
    }

    // Training form actions

    pub fn set_current_value(&mut self, value: String) {
        if let Some(field) = self.current_field() {
            self.wizard.set_value(field, value);
            self.debouncer.call(AppEvent::Validate(field));
        }
    }

    /// Debounced check fired; validate whatever the field holds now.
    pub fn recheck_field(&mut self, field: FieldName) {
        self.wizard.recheck(field, &mut self.train_view);
    }

    /// Leave the input box and validate immediately.
    pub fn finish_editing(&mut self) {
        self.input_mode = InputMode::Normal;
        if let Some(field) = self.current_field() {
            self.debouncer.cancel();
            let _ = self.wizard.blur(field, &mut self.train_view);
        }
    }

    pub fn start_editing(&mut self) {
        if self.current_field() == Some(FieldName::Style) {
            return;
        }
        self.input_mode = InputMode::Editing;
        self.field_cursor = self.current_value().chars().count();
    }

    pub fn form_forward(&mut self) {
        if self.train_view.submitting || self.train_view.success {
            return;
        }
        match self.train_view.navigation.action {
            StepAction::Next => self.form_next(),
            StepAction::Submit => self.form_submit(),
        }
    }

    fn form_next(&mut self) {
        self.debouncer.cancel();
        match self.wizard.next(&mut self.train_view) {
            Ok(step) => {
                self.train_view.status = None;
                self.field_cursor = self.current_value().chars().count();
                debug!(step, "advanced");
            }
            Err(e) => debug!(error = %e, "cannot advance"),
        }
    }

    pub fn form_previous(&mut self) {
        if self.train_view.submitting || self.train_view.success {
            return;
        }
        self.debouncer.cancel();
        if self.wizard.previous(&mut self.train_view) {
            self.field_cursor = self.current_value().chars().count();
        }
    }

    fn form_submit(&mut self) {
        self.debouncer.cancel();
        match self.wizard.prepare_submission(&mut self.train_view, Utc::now()) {
            Ok(profile) => {
                self.train_view.status = Some(("Processing...".to_string(), NotifyLevel::Info));
                self.pending_submission = Some(profile);
                self.schedule(self.config.submit_delay(), AppEvent::SubmitReady);
            }
            Err(e) => debug!(error = %e, "submission refused"),
        }
    }

    /// Processing delay is over; write the profile.
    pub fn finish_submission(&mut self) {
        let Some(profile) = self.pending_submission.take() else {
            return;
        };

        match self
            .wizard
            .complete_submission(&profile, self.store.as_mut(), &mut self.train_view)
        {
            Ok(()) => {
                // The chat picks up the freshly trained profile
                self.chat = ChatSession::new(Some(profile), self.config.reply_delay_window());
                self.chat_view = ChatPane::default();
                self.chat.refresh_send_control(&self.chat_input, &mut self.chat_view);
                self.schedule_welcome();
            }
            Err(FormError::Store(e)) => warn!(error = %e, "profile not saved"),
            Err(e) => warn!(error = %e, "submission failed"),
        }
    }

    /// Back to step 1 with the current answers kept, for re-training.
    pub fn restart_training(&mut self) {
        let mut wizard = FormWizard::new();
        for field in FieldName::all() {
            wizard.set_value(field, self.wizard.value(field));
        }
        self.wizard = wizard;
        self.train_view = TrainView::default();
        self.wizard.render(&mut self.train_view);
        self.field_cursor = self.current_value().chars().count();
    }

    pub fn style_nav_down(&mut self) {
        let len = Style::all().len();
        let i = self.style_state.selected().map_or(0, |i| (i + 1).min(len - 1));
        self.select_style(i);
    }

    pub fn style_nav_up(&mut self) {
        let i = self.style_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.select_style(i);
    }

    fn select_style(&mut self, i: usize) {
        self.style_state.select(Some(i));
        if let Some(style) = Style::all().get(i) {
            self.set_current_value(style.as_str().to_string());
        }
    }

    // Chat actions

    pub fn refresh_send_control(&mut self) {
        self.chat.refresh_send_control(&self.chat_input, &mut self.chat_view);
    }

    pub fn counter_level(&self) -> CounterLevel {
        personal_ai_core::chat::counter_level(self.chat_input.trim().chars().count())
    }

    pub fn send_message(&mut self) {
        match self
            .chat
            .send(&self.chat_input, &mut self.rng, &mut self.chat_view, Utc::now())
        {
            Ok(delay) => {
                self.chat_input.clear();
                self.chat_cursor = 0;
                self.schedule(delay, AppEvent::ReplyReady);
            }
            Err(ChatError::ResponsePending) => debug!("send blocked while reply pending"),
            Err(ChatError::EmptyMessage) => {}
        }
    }

    pub fn send_suggestion(&mut self, index: usize) {
        if let Some(text) = personal_ai_core::chat::SUGGESTIONS.get(index) {
            if self.chat.is_pending() {
                return;
            }
            self.chat_input = text.to_string();
            self.chat_cursor = self.chat_input.chars().count();
            self.send_message();
        }
    }

    pub fn deliver_reply(&mut self) {
        self.chat
            .deliver_reply(&mut self.rng, &mut self.chat_view, Utc::now());
        self.refresh_send_control();
    }

    pub fn deliver_welcome(&mut self) {
        self.chat.deliver_welcome(&mut self.chat_view, Utc::now());
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.chat_view.typing || self.train_view.submitting {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_chat_down(&mut self) {
        self.chat_view.follow = false;
        self.chat_view.scroll = self.chat_view.scroll.saturating_add(1);
    }

    pub fn scroll_chat_up(&mut self) {
        self.chat_view.follow = false;
        self.chat_view.scroll = self.chat_view.scroll.saturating_sub(1);
    }

    /// Scroll transcript to bottom so the newest message is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_view.width > 0 {
            self.chat_view.width as usize
        } else {
            50
        };

        let total_lines = transcript_lines(self.chat.messages(), wrap_width, self.chat_view.typing);

        let visible_height = if self.chat_view.height > 0 {
            self.chat_view.height
        } else {
            20
        };

        // Paragraph scroll offsets are u16; pin very long transcripts to the end
        let total_lines = u16::try_from(total_lines).unwrap_or(u16::MAX);
        self.chat_view.scroll = total_lines.saturating_sub(visible_height);
        self.chat_view.follow = false;
    }
}

/// Rendered line count of the transcript at the given wrap width.
fn transcript_lines(messages: &[Message], wrap_width: usize, typing: bool) -> usize {
    let wrap_width = wrap_width.max(1);
    let mut total_lines = 0usize;

    for msg in messages {
        total_lines += 1; // Label line ("DS 09:15" or "AI 09:15")
        for line in msg.text.lines() {
            // Use character count, not byte length, for proper UTF-8 handling
            let char_count = line.chars().count();
            total_lines += char_count / wrap_width + 1;
        }
        total_lines += 1; // Blank line after message
    }

    if typing {
        total_lines += 2; // "AI" + "Thinking..."
    }
    total_lines
}

fn prefill(wizard: &mut FormWizard, profile: &Profile) {
    wizard.set_value(FieldName::Name, profile.name.as_str());
    wizard.set_value(FieldName::Field, profile.field.as_str());
    wizard.set_value(FieldName::Approach, profile.approach.as_str());
    wizard.set_value(FieldName::Tools, profile.tools.as_str());
    wizard.set_value(
        FieldName::Style,
        profile.style.map(|s| s.as_str()).unwrap_or(""),
    );
    wizard.set_value(FieldName::Example, profile.example.as_str());
}
