//! Conversation engine for a single form-filling session.
//!
//! The scripted flow is fixed: `welcome -> name -> email -> custom -> complete`,
//! where `custom` only exists for forms with a custom question. Each visitor
//! answer goes through [`transition`], a pure function of the current state,
//! the form and the answer; the engine then performs the side effects
//! (pacing, messages, lead submission) the transition asks for.
//!
//! Every bot message is preceded by a typing indicator. Renderers observe
//! typing/submitting flags, messages and step changes through the event bus
//! returned by [`ConversationEngine::subscribe`].
//!
//! A turn that is dropped mid-way (its future cancelled) leaves the engine
//! consistent: a stored lead is already reflected in the `complete` state,
//! and a bot message that was owed is delivered at the start of the next
//! turn instead of being lost.

use leadchat_types::chat::{
    ChatEvent, ChatMessage, ChatSnapshot, ChatStep, MagnetAccess, TurnOutcome,
};
use leadchat_types::config::{ChatPacing, Locale};
use leadchat_types::error::ChatError;
use leadchat_types::form::FormDefinition;
use leadchat_types::lead::{CreateLeadRequest, Lead, is_valid_email};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::chat::bus::ChatEventBus;
use crate::chat::capture::LeadCapture;
use crate::chat::copy::ChatCopy;

/// Invoked once with the stored lead when a conversation completes.
pub type CompletionCallback = Box<dyn Fn(&Lead) + Send + Sync>;

/// Conversation state. Each variant carries exactly the answers captured so far.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatState {
    Welcome,
    AwaitingName,
    AwaitingEmail { name: String },
    AwaitingCustom { name: String, email: String },
    Complete { lead: Lead },
}

impl ChatState {
    /// The public step tag for this state.
    pub fn step(&self) -> ChatStep {
        match self {
            ChatState::Welcome => ChatStep::Welcome,
            ChatState::AwaitingName => ChatStep::Name,
            ChatState::AwaitingEmail { .. } => ChatStep::Email,
            ChatState::AwaitingCustom { .. } => ChatStep::Custom,
            ChatState::Complete { .. } => ChatStep::Complete,
        }
    }
}

/// What a visitor answer leads to.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Move to `next` and ask `prompt`.
    Ask { next: ChatState, prompt: String },
    /// The answer is not a valid email; stay put.
    RejectEmail,
    /// All answers are in; submit the lead.
    Finalize(CreateLeadRequest),
    /// The state does not take answers.
    Closed,
}

/// Decide the next step for a trimmed, non-empty answer.
pub fn transition(state: &ChatState, form: &FormDefinition, answer: &str) -> Transition {
    match state {
        ChatState::AwaitingName => Transition::Ask {
            next: ChatState::AwaitingEmail {
                name: answer.to_string(),
            },
            prompt: form.email_prompt_for(answer),
        },
        ChatState::AwaitingEmail { name } => {
            if !is_valid_email(answer) {
                return Transition::RejectEmail;
            }
            match form.custom_question.as_deref().map(str::trim) {
                Some(question) if !question.is_empty() => Transition::Ask {
                    next: ChatState::AwaitingCustom {
                        name: name.clone(),
                        email: answer.to_string(),
                    },
                    prompt: question.to_string(),
                },
                _ => Transition::Finalize(CreateLeadRequest {
                    form_id: form.id.clone(),
                    name: name.clone(),
                    email: answer.to_string(),
                    custom_answer: None,
                }),
            }
        }
        ChatState::AwaitingCustom { name, email } => Transition::Finalize(CreateLeadRequest {
            form_id: form.id.clone(),
            name: name.clone(),
            email: email.clone(),
            custom_answer: Some(answer.to_string()),
        }),
        ChatState::Welcome | ChatState::Complete { .. } => Transition::Closed,
    }
}

/// Drives one visitor through one form.
pub struct ConversationEngine<C: LeadCapture> {
    form: FormDefinition,
    capture: C,
    pacing: ChatPacing,
    copy: ChatCopy,
    state: ChatState,
    messages: Vec<ChatMessage>,
    typing: bool,
    submitting: bool,
    started: bool,
    /// Bot message scheduled for display but not yet in the transcript.
    owed: Option<String>,
    completion_announced: bool,
    on_complete: Option<CompletionCallback>,
    events: ChatEventBus,
}

impl<C: LeadCapture> ConversationEngine<C> {
    /// Bind a new conversation to `form`.
    pub fn new(form: FormDefinition, capture: C, pacing: ChatPacing, locale: Locale) -> Self {
        Self {
            form,
            capture,
            pacing,
            copy: ChatCopy::for_locale(locale),
            state: ChatState::Welcome,
            messages: Vec::new(),
            typing: false,
            submitting: false,
            started: false,
            owed: None,
            completion_announced: false,
            on_complete: None,
            events: ChatEventBus::default(),
        }
    }

    /// Register a callback invoked with the stored lead on completion.
    pub fn with_completion_callback(mut self, callback: impl Fn(&Lead) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Receive every future event of this conversation.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    pub fn form(&self) -> &FormDefinition {
        &self.form
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn step(&self) -> ChatStep {
        self.state.step()
    }

    /// The ordered message log.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Whether `submit` would currently accept an answer.
    pub fn accepts_input(&self) -> bool {
        self.step().accepts_input() && !self.typing && !self.submitting
    }

    /// The stored lead, once complete.
    pub fn lead(&self) -> Option<&Lead> {
        match &self.state {
            ChatState::Complete { lead } => Some(lead),
            _ => None,
        }
    }

    /// The lead magnet and its access action, once complete.
    pub fn magnet_access(&self) -> Option<MagnetAccess> {
        self.lead().map(|_| MagnetAccess {
            magnet: self.form.lead_magnet.clone(),
            action_label: self.copy.action_for(self.form.lead_magnet.kind).to_string(),
        })
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            step: self.step(),
            messages: self.messages.clone(),
            typing: self.typing,
            submitting: self.submitting,
            magnet: self.magnet_access(),
        }
    }

    /// Open the conversation: count the view, greet, and ask for the name.
    pub async fn start(&mut self) -> Result<(), ChatError> {
        if self.started {
            return Err(ChatError::AlreadyStarted);
        }
        self.started = true;

        self.capture.record_view(&self.form.id).await;

        self.owed = Some(self.form.welcome_message.clone());
        pause(self.pacing.initial_delay()).await;
        self.deliver().await;

        pause(self.pacing.welcome_gap_after_typing()).await;
        self.enter(ChatState::AwaitingName);
        let name_label = self.form.name_label.clone();
        self.say(name_label).await;

        Ok(())
    }

    /// Handle one visitor answer.
    ///
    /// Blank input and input outside an answer step are refused without
    /// touching the transcript.
    pub async fn submit(&mut self, text: &str) -> Result<TurnOutcome, ChatError> {
        self.settle_interrupted_turn();
        let step = self.step();
        if !step.accepts_input() {
            return Err(ChatError::InputClosed(step));
        }
        let answer = text.trim();
        if answer.is_empty() {
            return Err(ChatError::EmptyInput);
        }

        self.push(ChatMessage::user(answer));

        match transition(&self.state, &self.form, answer) {
            Transition::Ask { next, prompt } => {
                pause(self.pacing.transition_delay()).await;
                self.enter(next);
                self.say(prompt).await;
                Ok(TurnOutcome::Advanced { step: self.step() })
            }
            Transition::RejectEmail => {
                debug!(form_id = %self.form.id, "email rejected");
                pause(self.pacing.transition_delay()).await;
                self.say(self.copy.invalid_email.to_string()).await;
                Ok(TurnOutcome::ValidationFailed)
            }
            Transition::Finalize(request) => Ok(self.finalize(request).await),
            Transition::Closed => Err(ChatError::InputClosed(step)),
        }
    }

    async fn finalize(&mut self, request: CreateLeadRequest) -> TurnOutcome {
        self.set_submitting(true);
        let result = self.capture.submit_lead(request).await;
        self.set_submitting(false);

        match result {
            Ok(lead) => {
                // Committed before the next await: the lead is stored.
                self.enter(ChatState::Complete { lead: lead.clone() });
                if let Some(callback) = &self.on_complete {
                    callback(&lead);
                }
                self.owed = Some(self.form.thank_you_message.clone());
                pause(self.pacing.transition_delay()).await;
                self.deliver().await;
                self.announce_completion();
                TurnOutcome::Completed { lead }
            }
            Err(e) => {
                warn!(form_id = %self.form.id, error = %e, "lead submission failed");
                pause(self.pacing.transition_delay()).await;
                self.say(self.copy.submission_failed.to_string()).await;
                TurnOutcome::SubmissionFailed
            }
        }
    }

    fn enter(&mut self, state: ChatState) {
        debug!(form_id = %self.form.id, from = %self.step(), to = %state.step(), "chat step changed");
        self.state = state;
        self.events.publish(ChatEvent::StepChanged { step: self.step() });
    }

    /// Show the typing indicator, then append a bot message.
    async fn say(&mut self, content: String) {
        self.owed = Some(content);
        self.deliver().await;
    }

    /// Type out the owed message, if any.
    async fn deliver(&mut self) {
        self.set_typing(true);
        pause(self.pacing.typing_delay()).await;
        if let Some(content) = self.owed.take() {
            self.push(ChatMessage::bot(content));
        }
        self.set_typing(false);
    }

    fn announce_completion(&mut self) {
        if self.completion_announced {
            return;
        }
        if let Some(access) = self.magnet_access() {
            self.completion_announced = true;
            self.events.publish(ChatEvent::Completed { access });
        }
    }

    /// Finish whatever a dropped turn left half done, without pacing.
    fn settle_interrupted_turn(&mut self) {
        if self.submitting {
            warn!(form_id = %self.form.id, "lead submission was interrupted");
            self.set_submitting(false);
        }
        if let Some(content) = self.owed.take() {
            self.push(ChatMessage::bot(content));
        }
        if self.typing {
            self.set_typing(false);
        }
        if self.started && self.state == ChatState::Welcome {
            self.enter(ChatState::AwaitingName);
            self.push(ChatMessage::bot(self.form.name_label.clone()));
        }
        if matches!(self.state, ChatState::Complete { .. }) {
            self.announce_completion();
        }
    }

    fn push(&mut self, message: ChatMessage) {
        self.messages.push(message.clone());
        self.events.publish(ChatEvent::Message { message });
    }

    fn set_typing(&mut self, active: bool) {
        self.typing = active;
        self.events.publish(ChatEvent::Typing { active });
    }

    fn set_submitting(&mut self, active: bool) {
        self.submitting = active;
        self.events.publish(ChatEvent::Submitting { active });
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use leadchat_types::chat::MessageRole;
    use leadchat_types::error::LeadError;
    use leadchat_types::form::{FormId, LeadMagnetInput, LeadMagnetKind};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    /// Records calls and can be told to fail submissions.
    #[derive(Default)]
    struct FakeCapture {
        views: AtomicUsize,
        fail: AtomicBool,
        leads: Mutex<Vec<Lead>>,
    }

    impl LeadCapture for FakeCapture {
        async fn record_view(&self, _form_id: &FormId) {
            self.views.fetch_add(1, Ordering::SeqCst);
        }

        async fn submit_lead(&self, request: CreateLeadRequest) -> Result<Lead, LeadError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(LeadError::Storage("database is down".to_string()));
            }
            let lead = request.into_lead();
            self.leads.lock().unwrap().push(lead.clone());
            Ok(lead)
        }
    }

    fn form(custom_question: Option<&str>) -> FormDefinition {
        FormDefinition {
            id: FormId::new(),
            title: "Scenario".to_string(),
            slug: "scenario".to_string(),
            welcome_message: "Hi".to_string(),
            name_label: "Name?".to_string(),
            email_label: "Email {name}?".to_string(),
            custom_question: custom_question.map(str::to_string),
            thank_you_message: "Thanks".to_string(),
            lead_magnet: LeadMagnetInput {
                title: "Guide".to_string(),
                url: "https://example.com/guide.pdf".to_string(),
                kind: Some(LeadMagnetKind::File),
                ..Default::default()
            }
            .into_magnet(Uuid::now_v7()),
            published: true,
            view_count: 0,
            conversion_count: 0,
            created_at: Utc::now(),
        }
    }

    async fn started(
        form: FormDefinition,
    ) -> (ConversationEngine<Arc<FakeCapture>>, Arc<FakeCapture>) {
        let capture = Arc::new(FakeCapture::default());
        let mut engine = ConversationEngine::new(
            form,
            capture.clone(),
            ChatPacing::instant(),
            Locale::English,
        );
        engine.start().await.unwrap();
        (engine, capture)
    }

    fn bot_texts(engine: &ConversationEngine<Arc<FakeCapture>>) -> Vec<&str> {
        bot_texts_of(engine.messages())
    }

    fn bot_texts_of(messages: &[ChatMessage]) -> Vec<&str> {
        messages
            .iter()
            .filter(|m| m.role == MessageRole::Bot)
            .map(|m| m.content.as_str())
            .collect()
    }

    #[tokio::test]
    async fn test_start_greets_and_counts_view() {
        let (engine, capture) = started(form(None)).await;
        assert_eq!(engine.step(), ChatStep::Name);
        assert_eq!(bot_texts(&engine), vec!["Hi", "Name?"]);
        assert_eq!(capture.views.load(Ordering::SeqCst), 1);
        assert!(engine.accepts_input());
    }

    #[tokio::test]
    async fn test_start_twice_is_refused() {
        let (mut engine, capture) = started(form(None)).await;
        assert_eq!(engine.start().await.unwrap_err(), ChatError::AlreadyStarted);
        assert_eq!(capture.views.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_input_before_start_is_closed() {
        let mut engine = ConversationEngine::new(
            form(None),
            FakeCapture::default(),
            ChatPacing::instant(),
            Locale::English,
        );
        assert_eq!(
            engine.submit("Bob").await.unwrap_err(),
            ChatError::InputClosed(ChatStep::Welcome)
        );
        assert!(engine.messages().is_empty());
    }

    #[tokio::test]
    async fn test_scenario_without_custom_question() {
        let (mut engine, capture) = started(form(None)).await;

        let outcome = engine.submit("Bob").await.unwrap();
        assert_eq!(outcome, TurnOutcome::Advanced { step: ChatStep::Email });
        assert_eq!(bot_texts(&engine).last(), Some(&"Email Bob?"));

        let outcome = engine.submit("not-an-email").await.unwrap();
        assert_eq!(outcome, TurnOutcome::ValidationFailed);
        assert_eq!(engine.step(), ChatStep::Email);
        assert_eq!(
            bot_texts(&engine).last(),
            Some(&ChatCopy::for_locale(Locale::English).invalid_email)
        );
        assert!(capture.leads.lock().unwrap().is_empty());

        let outcome = engine.submit("bob@x.com").await.unwrap();
        let TurnOutcome::Completed { lead } = outcome else {
            panic!("expected completion, got {outcome:?}");
        };
        assert_eq!(lead.name, "Bob");
        assert_eq!(lead.email, "bob@x.com");
        assert!(lead.custom_answer.is_none());
        assert_eq!(engine.step(), ChatStep::Complete);
        assert_eq!(bot_texts(&engine).last(), Some(&"Thanks"));
        assert_eq!(capture.leads.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_custom_question_needs_three_turns() {
        let (mut engine, _capture) = started(form(Some("Which team?"))).await;

        engine.submit("Ana").await.unwrap();
        let outcome = engine.submit("ana@x.com").await.unwrap();
        assert_eq!(outcome, TurnOutcome::Advanced { step: ChatStep::Custom });
        assert_eq!(bot_texts(&engine).last(), Some(&"Which team?"));

        let outcome = engine.submit("Sales, Marketing").await.unwrap();
        let TurnOutcome::Completed { lead } = outcome else {
            panic!("expected completion");
        };
        assert_eq!(lead.custom_answer.as_deref(), Some("Sales, Marketing"));
        assert_eq!(
            engine.messages().iter().filter(|m| m.role == MessageRole::User).count(),
            3
        );
    }

    #[tokio::test]
    async fn test_invalid_email_can_be_retried_many_times() {
        let (mut engine, _capture) = started(form(None)).await;
        engine.submit("Bob").await.unwrap();
        for attempt in ["bob", "bob@", "bob@x", "@x.com", "b ob@x.com"] {
            assert_eq!(
                engine.submit(attempt).await.unwrap(),
                TurnOutcome::ValidationFailed
            );
            assert_eq!(engine.step(), ChatStep::Email);
        }
        assert!(matches!(
            engine.submit("bob@x.com").await.unwrap(),
            TurnOutcome::Completed { .. }
        ));
    }

    #[tokio::test]
    async fn test_blank_input_is_not_a_turn() {
        let (mut engine, _capture) = started(form(None)).await;
        let before = engine.messages().len();
        assert_eq!(engine.submit("   ").await.unwrap_err(), ChatError::EmptyInput);
        assert_eq!(engine.messages().len(), before);
        assert_eq!(engine.step(), ChatStep::Name);
    }

    #[tokio::test]
    async fn test_name_is_trimmed_before_substitution() {
        let (mut engine, _capture) = started(form(None)).await;
        engine.submit("  Ana  ").await.unwrap();
        assert_eq!(bot_texts(&engine).last(), Some(&"Email Ana?"));
        assert_eq!(engine.messages().last().unwrap().content, "Email Ana?");
        assert_eq!(
            engine.state(),
            &ChatState::AwaitingEmail {
                name: "Ana".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_submission_failure_allows_resubmission() {
        let (mut engine, capture) = started(form(Some("Which team?"))).await;
        engine.submit("Ana").await.unwrap();
        engine.submit("ana@x.com").await.unwrap();

        capture.fail.store(true, Ordering::SeqCst);
        assert_eq!(
            engine.submit("Design").await.unwrap(),
            TurnOutcome::SubmissionFailed
        );
        assert_eq!(engine.step(), ChatStep::Custom);
        assert!(!engine.is_submitting());
        assert_eq!(
            bot_texts(&engine).last(),
            Some(&ChatCopy::for_locale(Locale::English).submission_failed)
        );

        capture.fail.store(false, Ordering::SeqCst);
        let TurnOutcome::Completed { lead } = engine.submit("Design").await.unwrap() else {
            panic!("expected completion");
        };
        assert_eq!(lead.email, "ana@x.com");
        assert_eq!(lead.custom_answer.as_deref(), Some("Design"));
    }

    #[tokio::test]
    async fn test_complete_closes_input_and_exposes_magnet() {
        let (mut engine, _capture) = started(form(None)).await;
        engine.submit("Bob").await.unwrap();
        engine.submit("bob@x.com").await.unwrap();

        assert!(!engine.accepts_input());
        assert_eq!(
            engine.submit("again").await.unwrap_err(),
            ChatError::InputClosed(ChatStep::Complete)
        );

        let access = engine.magnet_access().unwrap();
        assert_eq!(access.action_label, "Download material");
        assert_eq!(access.magnet.title, "Guide");
        assert!(engine.snapshot().magnet.is_some());
    }

    #[tokio::test]
    async fn test_completion_callback_receives_lead() {
        let seen: Arc<Mutex<Option<Lead>>> = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let mut engine = ConversationEngine::new(
            form(None),
            FakeCapture::default(),
            ChatPacing::instant(),
            Locale::English,
        )
        .with_completion_callback(move |lead| {
            *sink.lock().unwrap() = Some(lead.clone());
        });
        engine.start().await.unwrap();
        engine.submit("Bob").await.unwrap();
        engine.submit("bob@x.com").await.unwrap();

        let lead = seen.lock().unwrap().clone().unwrap();
        assert_eq!(lead.email, "bob@x.com");
        assert_eq!(engine.lead(), Some(&lead));
    }

    #[tokio::test]
    async fn test_events_follow_the_conversation() {
        let capture = FakeCapture::default();
        let mut engine =
            ConversationEngine::new(form(None), capture, ChatPacing::instant(), Locale::English);
        let mut rx = engine.subscribe();
        engine.start().await.unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }

        assert_eq!(events[0], ChatEvent::Typing { active: true });
        assert!(matches!(&events[1], ChatEvent::Message { message } if message.content == "Hi"));
        assert_eq!(events[2], ChatEvent::Typing { active: false });
        assert_eq!(events[3], ChatEvent::StepChanged { step: ChatStep::Name });
        assert!(matches!(&events[5], ChatEvent::Message { message } if message.content == "Name?"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_pacing_timeline() {
        let mut engine = ConversationEngine::new(
            form(None),
            FakeCapture::default(),
            ChatPacing::default(),
            Locale::English,
        );
        let began = tokio::time::Instant::now();
        engine.start().await.unwrap();
        // 500 initial + 800 typing + 200 remaining gap + 800 typing
        assert_eq!(began.elapsed(), Duration::from_millis(2300));

        let began = tokio::time::Instant::now();
        engine.submit("Bob").await.unwrap();
        // 500 transition + 800 typing
        assert_eq!(began.elapsed(), Duration::from_millis(1300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_turn_delivers_owed_prompt() {
        let capture = Arc::new(FakeCapture::default());
        let mut engine = ConversationEngine::new(
            form(None),
            capture.clone(),
            ChatPacing::default(),
            Locale::English,
        );
        engine.start().await.unwrap();

        // Cut off while the email prompt is still typing.
        let cut = tokio::time::timeout(Duration::from_millis(600), engine.submit("Bob")).await;
        assert!(cut.is_err());
        assert!(engine.is_typing());
        assert_eq!(engine.step(), ChatStep::Email);

        let outcome = engine.submit("bob@x.com").await.unwrap();
        assert!(matches!(outcome, TurnOutcome::Completed { .. }));
        assert!(bot_texts_of(engine.messages()).contains(&"Email Bob?"));
        assert!(!engine.is_typing());
        assert_eq!(capture.leads.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_finalize_stores_exactly_one_lead() {
        let capture = Arc::new(FakeCapture::default());
        let mut engine = ConversationEngine::new(
            form(None),
            capture.clone(),
            ChatPacing::default(),
            Locale::English,
        );
        let mut rx = engine.subscribe();
        engine.start().await.unwrap();
        engine.submit("Bob").await.unwrap();

        let cut =
            tokio::time::timeout(Duration::from_millis(100), engine.submit("bob@x.com")).await;
        assert!(cut.is_err());
        assert_eq!(engine.step(), ChatStep::Complete);
        assert_eq!(capture.leads.lock().unwrap().len(), 1);

        assert_eq!(
            engine.submit("bob@x.com").await.unwrap_err(),
            ChatError::InputClosed(ChatStep::Complete)
        );
        assert_eq!(capture.leads.lock().unwrap().len(), 1);
        assert_eq!(bot_texts_of(engine.messages()).last(), Some(&"Thanks"));

        let mut completions = 0;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, ChatEvent::Completed { .. }) {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_start_still_asks_for_name() {
        let mut engine = ConversationEngine::new(
            form(None),
            FakeCapture::default(),
            ChatPacing::default(),
            Locale::English,
        );
        let cut = tokio::time::timeout(Duration::from_millis(100), engine.start()).await;
        assert!(cut.is_err());
        assert_eq!(engine.step(), ChatStep::Welcome);

        // Settling happens before the answer is read, so the name goes through.
        let outcome = engine.submit("Bob").await.unwrap();
        assert_eq!(outcome, TurnOutcome::Advanced { step: ChatStep::Email });
        assert_eq!(
            bot_texts_of(engine.messages()),
            vec!["Hi", "Name?", "Email Bob?"]
        );
    }

    #[test]
    fn test_transition_is_pure() {
        let f = form(None);
        let state = ChatState::AwaitingEmail {
            name: "Bob".to_string(),
        };
        assert_eq!(transition(&state, &f, "nope"), Transition::RejectEmail);
        assert_eq!(
            transition(&ChatState::Welcome, &f, "Bob"),
            Transition::Closed
        );
        match transition(&state, &f, "bob@x.com") {
            Transition::Finalize(req) => {
                assert_eq!(req.name, "Bob");
                assert!(req.custom_answer.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
