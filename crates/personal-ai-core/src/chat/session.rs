//! Chat transcript controller.
//!
//! One reply in flight at a time. `send` records the user message and hands
//! back how long to wait; the caller runs the timer and calls `deliver_reply`.

use std::ops::Range;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::selector::ResponseSelector;
use crate::error::ChatError;
use crate::profile::{initials_of, Profile};
use crate::random::RandomSource;
use crate::state::{Message, Sender};

pub const MAX_INPUT_CHARS: usize = 500;
const WARN_INPUT_CHARS: usize = 450;
const LIMIT_INPUT_CHARS: usize = 480;

/// Canned prompts offered under the input box.
pub const SUGGESTIONS: [&str; 4] = [
    "Hello! What can you do?",
    "Help me solve a problem at work",
    "How can I be more productive this week?",
    "Explain how you'd tackle this with my approach",
];

/// Rendering surface for the transcript and send control.
pub trait ChatView {
    fn append_message(&mut self, message: &Message);
    fn set_typing(&mut self, typing: bool);
    fn set_send_enabled(&mut self, enabled: bool);
}

/// Colour band for the character counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterLevel {
    Normal,
    Warning,
    Error,
}

pub fn counter_level(chars: usize) -> CounterLevel {
    if chars > LIMIT_INPUT_CHARS {
        CounterLevel::Error
    } else if chars > WARN_INPUT_CHARS {
        CounterLevel::Warning
    } else {
        CounterLevel::Normal
    }
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    selector: ResponseSelector,
    messages: Vec<Message>,
    pending: Option<String>,
    delay_window: Range<u64>,
}

impl ChatSession {
    pub fn new(profile: Option<Profile>, delay_window: Range<u64>) -> Self {
        Self {
            selector: ResponseSelector::new(profile),
            messages: Vec::new(),
            pending: None,
            delay_window,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.selector.profile()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Label for user messages: the initials of the profile name, "Y" when unnamed.
    pub fn user_label(&self) -> String {
        initials_of(self.profile().map_or("", |profile| profile.name.as_str()))
    }

    pub fn label_for(&self, sender: Sender) -> String {
        match sender {
            Sender::User => self.user_label(),
            Sender::Ai => "AI".to_string(),
        }
    }

    /// Send is allowed for non-blank input while nothing is pending.
    pub fn can_send(&self, input: &str) -> bool {
        !input.trim().is_empty() && !self.is_pending()
    }

    pub fn refresh_send_control(&self, input: &str, view: &mut impl ChatView) {
        view.set_send_enabled(self.can_send(input));
    }

    /// Greeting for a profile that finished training.
    pub fn welcome_message(&self) -> Option<String> {
        let profile = self.profile().filter(|p| p.trained)?;
        Some(format!(
            "Welcome back, {}! I've been trained on your thinking patterns from {}. How can I help you today?",
            profile.name, profile.field
        ))
    }

    pub fn deliver_welcome(&mut self, view: &mut impl ChatView, now: DateTime<Utc>) {
        if let Some(text) = self.welcome_message() {
            self.push(Message::ai(text, now), view);
        }
    }

    /// Record the user's message and start a reply.
    ///
    /// Returns the simulated latency to wait before [`deliver_reply`].
    ///
    /// [`deliver_reply`]: ChatSession::deliver_reply
    pub fn send(
        &mut self,
        input: &str,
        rng: &mut impl RandomSource,
        view: &mut impl ChatView,
        now: DateTime<Utc>,
    ) -> Result<Duration, ChatError> {
        if self.is_pending() {
            return Err(ChatError::ResponsePending);
        }

        let text: String = input.trim().chars().take(MAX_INPUT_CHARS).collect();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        self.push(Message::user(text.clone(), now), view);
        self.pending = Some(text);

        view.set_typing(true);
        view.set_send_enabled(false);

        let delay = rng.between(self.delay_window.clone());
        debug!(delay_ms = delay, "reply scheduled");
        Ok(Duration::from_millis(delay))
    }

    /// Generate and append the pending reply. `None` if nothing was pending.
    pub fn deliver_reply(
        &mut self,
        rng: &mut impl RandomSource,
        view: &mut impl ChatView,
        now: DateTime<Utc>,
    ) -> Option<&Message> {
        let prompt = self.pending.take()?;
        let reply = self.selector.respond(&prompt, rng);
        info!(chars = reply.len(), "reply delivered");

        view.set_typing(false);
        self.push(Message::ai(reply, now), view);
        self.messages.last()
    }

    fn push(&mut self, message: Message, view: &mut impl ChatView) {
        view.append_message(&message);
        self.messages.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Style;

    #[derive(Default)]
    struct RecordingView {
        appended: Vec<Message>,
        typing: bool,
        send_enabled: bool,
    }

    impl ChatView for RecordingView {
        fn append_message(&mut self, message: &Message) {
            self.appended.push(message.clone());
        }
        fn set_typing(&mut self, typing: bool) {
            self.typing = typing;
        }
        fn set_send_enabled(&mut self, enabled: bool) {
            self.send_enabled = enabled;
        }
    }

    /// Replays a fixed script of picks and delays.
    struct Scripted {
        pick: usize,
        delay: u64,
    }

    impl RandomSource for Scripted {
        fn pick(&mut self, len: usize) -> usize {
            self.pick % len
        }
        fn between(&mut self, range: Range<u64>) -> u64 {
            self.delay.clamp(range.start, range.end - 1)
        }
    }

    fn trained_profile() -> Profile {
        Profile {
            name: "Dana Scully".to_string(),
            field: "Forensic Pathology".to_string(),
            approach: "systematic and evidence-first".to_string(),
            tools: "Microscope".to_string(),
            style: Some(Style::Detailed),
            example: String::new(),
            timestamp: "2025-01-01T00:00:00Z".parse().unwrap(),
            trained: true,
        }
    }

    fn now() -> DateTime<Utc> {
        "2025-06-01T09:15:00Z".parse().unwrap()
    }

    #[test]
    fn test_send_then_deliver() {
        let mut session = ChatSession::new(None, 1500..2500);
        let mut view = RecordingView::default();
        let mut rng = Scripted { pick: 0, delay: 1800 };

        let delay = session.send("  hello there  ", &mut rng, &mut view, now()).unwrap();
        assert_eq!(delay, Duration::from_millis(1800));
        assert!(session.is_pending());
        assert!(view.typing);
        assert!(!view.send_enabled);
        assert_eq!(session.messages()[0].text, "hello there");
        assert_eq!(session.messages()[0].sender, Sender::User);

        let reply = session.deliver_reply(&mut rng, &mut view, now()).unwrap();
        assert_eq!(reply.sender, Sender::Ai);
        assert!(reply.text.starts_with("Hello! I'm here to help"));
        assert!(!session.is_pending());
        assert!(!view.typing);
        assert_eq!(view.appended.len(), 2);
    }

    #[test]
    fn test_send_while_pending_is_rejected() {
        let mut session = ChatSession::new(None, 1500..2500);
        let mut view = RecordingView::default();
        let mut rng = Scripted { pick: 0, delay: 0 };

        session.send("first", &mut rng, &mut view, now()).unwrap();
        assert!(!session.can_send("second"));
        assert_eq!(
            session.send("second", &mut rng, &mut view, now()),
            Err(ChatError::ResponsePending)
        );
        assert!(!view.send_enabled);
        assert_eq!(session.messages().len(), 1);

        session.deliver_reply(&mut rng, &mut view, now());
        assert!(session.can_send("second"));
        session.refresh_send_control("second", &mut view);
        assert!(view.send_enabled);
        assert!(session.send("second", &mut rng, &mut view, now()).is_ok());
    }

    #[test]
    fn test_delay_stays_in_window() {
        let mut session = ChatSession::new(None, 1500..2500);
        let mut view = RecordingView::default();
        let mut rng = Scripted { pick: 0, delay: 9000 };

        let delay = session.send("x", &mut rng, &mut view, now()).unwrap();
        assert_eq!(delay, Duration::from_millis(2499));
    }

    #[test]
    fn test_blank_input_rejected() {
        let mut session = ChatSession::new(None, 1500..2500);
        let mut view = RecordingView::default();
        let mut rng = Scripted { pick: 0, delay: 0 };

        assert!(!session.can_send("   "));
        assert_eq!(
            session.send(" \n ", &mut rng, &mut view, now()),
            Err(ChatError::EmptyMessage)
        );
        assert!(session.messages().is_empty());
        assert!(!session.is_pending());
    }

    #[test]
    fn test_input_capped() {
        let mut session = ChatSession::new(None, 1500..2500);
        let mut view = RecordingView::default();
        let mut rng = Scripted { pick: 0, delay: 0 };

        session.send(&"a".repeat(700), &mut rng, &mut view, now()).unwrap();
        assert_eq!(session.messages()[0].text.chars().count(), MAX_INPUT_CHARS);
    }

    #[test]
    fn test_deliver_without_pending_is_noop() {
        let mut session = ChatSession::new(None, 1500..2500);
        let mut view = RecordingView::default();
        let mut rng = Scripted { pick: 0, delay: 0 };

        assert!(session.deliver_reply(&mut rng, &mut view, now()).is_none());
        assert!(view.appended.is_empty());
    }

    #[test]
    fn test_reply_is_personalized() {
        let mut session = ChatSession::new(Some(trained_profile()), 1500..2500);
        let mut view = RecordingView::default();
        let mut rng = Scripted { pick: 1, delay: 0 };

        session.send("tell me about my approach", &mut rng, &mut view, now()).unwrap();
        let reply = session.deliver_reply(&mut rng, &mut view, now()).unwrap();
        assert_eq!(
            reply.text,
            "Let me think about this from your perspective. Based on your experience in forensic pathology... I notice you prefer systematic approaches, so let's break this down methodically."
        );
    }

    #[test]
    fn test_welcome_only_when_trained() {
        let mut session = ChatSession::new(Some(trained_profile()), 1500..2500);
        let mut view = RecordingView::default();
        session.deliver_welcome(&mut view, now());
        assert_eq!(
            session.messages()[0].text,
            "Welcome back, Dana Scully! I've been trained on your thinking patterns from Forensic Pathology. How can I help you today?"
        );

        let mut untrained = trained_profile();
        untrained.trained = false;
        let mut session = ChatSession::new(Some(untrained), 1500..2500);
        let mut view = RecordingView::default();
        session.deliver_welcome(&mut view, now());
        assert!(session.messages().is_empty());

        assert!(ChatSession::new(None, 1500..2500).welcome_message().is_none());
    }

    #[test]
    fn test_labels() {
        let session = ChatSession::new(Some(trained_profile()), 1500..2500);
        assert_eq!(session.label_for(Sender::User), "DS");
        assert_eq!(session.label_for(Sender::Ai), "AI");
        assert_eq!(ChatSession::new(None, 1500..2500).user_label(), "Y");

        let mut unnamed = trained_profile();
        unnamed.name = "   ".to_string();
        let session = ChatSession::new(Some(unnamed.clone()), 1500..2500);
        assert_eq!(session.user_label(), unnamed.initials());
        assert_eq!(session.user_label(), "Y");
    }

    #[test]
    fn test_counter_level() {
        assert_eq!(counter_level(0), CounterLevel::Normal);
        assert_eq!(counter_level(450), CounterLevel::Normal);
        assert_eq!(counter_level(451), CounterLevel::Warning);
        assert_eq!(counter_level(481), CounterLevel::Error);
    }
}
