//! Debounced, cancelable translation controller.
//!
//! One controller backs one translator view. It runs as a single tokio task
//! that owns all mutable state: user events arrive over a channel, the
//! debounce deadline and request completions are awaited in the same loop, so
//! state is only ever touched from one place. Requests run in their own task
//! wrapped in [`Abortable`]; a completion is applied only if it belongs to the
//! current session.

use futures::future::{AbortHandle, AbortRegistration, Abortable, Aborted};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info};

use super::interface::{TargetLanguage, TranslateError, TranslationRequest, TranslationService};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(700);

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub debounce: Duration,
    pub initial_input: String,
    pub initial_target: TargetLanguage,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            initial_input: String::new(),
            initial_target: TargetLanguage::default(),
        }
    }
}

/// What the result panel shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TranslationResult {
    #[default]
    Empty,
    Success(String),
    Failure(String),
}

impl TranslationResult {
    /// Drop an error, keep a successful translation.
    fn without_error(self) -> Option<String> {
        match self {
            TranslationResult::Success(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    /// Waiting for the quiet period; the previous outcome stays on screen.
    PendingDebounce(TranslationResult),
    /// A request is outstanding. Errors are cleared when a request starts,
    /// so only an earlier successful translation can be kept around.
    InFlight { previous: Option<String> },
    Resolved(TranslationResult),
}

impl ControllerState {
    fn tag(&self) -> &'static str {
        match self {
            ControllerState::Idle => "idle",
            ControllerState::PendingDebounce(_) => "pending",
            ControllerState::InFlight { .. } => "in-flight",
            ControllerState::Resolved(_) => "resolved",
        }
    }

    /// The outcome currently visible to the user
    fn displayed(&self) -> TranslationResult {
        match self {
            ControllerState::Idle => TranslationResult::Empty,
            ControllerState::PendingDebounce(result) | ControllerState::Resolved(result) => result.clone(),
            ControllerState::InFlight { previous } => previous
                .clone()
                .map(TranslationResult::Success)
                .unwrap_or_default(),
        }
    }
}

/// Snapshot handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerView {
    pub input: String,
    pub target: TargetLanguage,
    pub state: &'static str,
    pub result: String,
    pub loading: bool,
    pub error: Option<String>,
}

impl ControllerView {
    fn new(input: &str, target: TargetLanguage, state: &ControllerState) -> Self {
        let (result, error) = match state.displayed() {
            TranslationResult::Empty => (String::new(), None),
            TranslationResult::Success(text) => (text, None),
            TranslationResult::Failure(message) => (String::new(), Some(message)),
        };
        Self {
            input: input.to_string(),
            target,
            state: state.tag(),
            result,
            loading: matches!(state, ControllerState::InFlight { .. }),
            error,
        }
    }
}

#[derive(Debug)]
enum ControllerEvent {
    InputChanged(String),
    TargetChanged(TargetLanguage),
    TranslateNow,
    Clear,
    Teardown,
}

struct Completion {
    session: u64,
    outcome: Result<Result<String, TranslateError>, Aborted>,
}

/// The request currently outstanding
struct TranslationSession {
    id: u64,
    abort: AbortHandle,
}

enum Step {
    Event(Option<ControllerEvent>),
    Settled(Completion),
    DebounceElapsed,
}

/// Cloneable handle used by the view to drive a controller
#[derive(Clone)]
pub struct ControllerHandle {
    events: mpsc::UnboundedSender<ControllerEvent>,
    view: watch::Receiver<ControllerView>,
}

impl ControllerHandle {
    pub fn set_input(&self, text: impl Into<String>) {
        self.send(ControllerEvent::InputChanged(text.into()));
    }

    pub fn set_target(&self, target: TargetLanguage) {
        self.send(ControllerEvent::TargetChanged(target));
    }

    pub fn translate_now(&self) {
        self.send(ControllerEvent::TranslateNow);
    }

    pub fn clear(&self) {
        self.send(ControllerEvent::Clear);
    }

    /// Stop the controller. The pending timer and any in-flight request are
    /// canceled and no further views are published.
    pub fn teardown(&self) {
        self.send(ControllerEvent::Teardown);
    }

    pub fn view(&self) -> ControllerView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ControllerView> {
        self.view.clone()
    }

    fn send(&self, event: ControllerEvent) {
        if let Err(e) = self.events.send(event) {
            debug!("Controller already stopped, dropping {:?}", e.0);
        }
    }
}

pub struct TranslationController {
    service: Arc<dyn TranslationService>,
    debounce: Duration,
    input: String,
    target: TargetLanguage,
    state: ControllerState,
    debounce_deadline: Option<Instant>,
    session: Option<TranslationSession>,
    next_session: u64,
    events: mpsc::UnboundedReceiver<ControllerEvent>,
    completions: mpsc::UnboundedReceiver<Completion>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    updates: watch::Sender<ControllerView>,
}

impl TranslationController {
    /// Start a controller task and return its handle.
    ///
    /// The first debounce period starts immediately, so a non-empty initial
    /// input is translated once the quiet period elapses.
    pub fn spawn(service: Arc<dyn TranslationService>, settings: ControllerSettings) -> ControllerHandle {
        let (events_tx, events) = mpsc::unbounded_channel();
        let (completion_tx, completions) = mpsc::unbounded_channel();

        let state = ControllerState::PendingDebounce(TranslationResult::Empty);
        let initial = ControllerView::new(&settings.initial_input, settings.initial_target, &state);
        let (updates, view) = watch::channel(initial);

        let controller = Self {
            service,
            debounce: settings.debounce,
            input: settings.initial_input,
            target: settings.initial_target,
            state,
            debounce_deadline: Some(Instant::now() + settings.debounce),
            session: None,
            next_session: 0,
            events,
            completions,
            completion_tx,
            updates,
        };
        tokio::spawn(controller.run());

        ControllerHandle {
            events: events_tx,
            view,
        }
    }

    async fn run(mut self) {
        loop {
            let step = tokio::select! {
                event = self.events.recv() => Step::Event(event),
                Some(done) = self.completions.recv() => Step::Settled(done),
                _ = wait_until(self.debounce_deadline) => Step::DebounceElapsed,
            };

            match step {
                Step::Event(None) | Step::Event(Some(ControllerEvent::Teardown)) => break,
                Step::Event(Some(event)) => self.handle_event(event),
                Step::Settled(done) => self.apply_completion(done),
                Step::DebounceElapsed => {
                    self.debounce_deadline = None;
                    self.translate();
                }
            }
            self.publish();
        }

        self.teardown();
    }

    fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::InputChanged(text) => {
                if text != self.input {
                    self.input = text;
                    self.restart_debounce();
                }
            }
            ControllerEvent::TargetChanged(target) => {
                if target != self.target {
                    self.target = target;
                    self.restart_debounce();
                }
            }
            ControllerEvent::TranslateNow => {
                self.debounce_deadline = None;
                self.translate();
            }
            ControllerEvent::Clear => {
                self.debounce_deadline = None;
                self.cancel_session();
                self.input.clear();
                self.state = ControllerState::Idle;
            }
            ControllerEvent::Teardown => {}
        }
    }

    fn restart_debounce(&mut self) {
        // Whatever is in flight was issued for values that no longer exist.
        self.cancel_session();
        self.state = ControllerState::PendingDebounce(self.state.displayed());
        self.debounce_deadline = Some(Instant::now() + self.debounce);
    }

    fn translate(&mut self) {
        let previous = self.state.displayed().without_error();

        if self.input.trim().is_empty() {
            self.cancel_session();
            self.state = ControllerState::Idle;
            return;
        }

        let request = TranslationRequest::new(self.input.clone(), self.target);
        self.start_session(request);
        self.state = ControllerState::InFlight { previous };
    }

    /// Abort the outstanding request, if any, and issue `request` in its place.
    fn start_session(&mut self, request: TranslationRequest) {
        self.cancel_session();

        self.next_session += 1;
        let id = self.next_session;
        let (abort, registration) = AbortHandle::new_pair();

        debug!("Starting translation session {} (target={})", id, request.target_language.code());
        tokio::spawn(run_request(
            Arc::clone(&self.service),
            request,
            registration,
            id,
            self.completion_tx.clone(),
        ));

        self.session = Some(TranslationSession { id, abort });
    }

    fn cancel_session(&mut self) {
        if let Some(session) = self.session.take() {
            debug!("Canceling translation session {}", session.id);
            session.abort.abort();
        }
    }

    fn apply_completion(&mut self, done: Completion) {
        let current = self.session.as_ref().map(|s| s.id);
        if current != Some(done.session) {
            debug!("Discarding outcome of superseded session {}", done.session);
            return;
        }

        let outcome = match done.outcome {
            Ok(outcome) => outcome,
            Err(Aborted) => return,
        };
        self.session = None;

        self.state = match outcome {
            Ok(text) => {
                debug!("Translation session {} resolved", done.session);
                ControllerState::Resolved(TranslationResult::Success(text))
            }
            Err(e) => {
                info!("Translation session {} failed: {}", done.session, e);
                ControllerState::Resolved(TranslationResult::Failure(e.to_string()))
            }
        };
    }

    fn publish(&self) {
        let view = ControllerView::new(&self.input, self.target, &self.state);
        self.updates.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }

    fn teardown(&mut self) {
        self.debounce_deadline = None;
        self.cancel_session();
        debug!("Translation controller stopped");
    }
}

async fn run_request(
    service: Arc<dyn TranslationService>,
    request: TranslationRequest,
    registration: AbortRegistration,
    session: u64,
    completions: mpsc::UnboundedSender<Completion>,
) {
    let call = async move { service.translate(&request).await };
    let outcome = Abortable::new(call, registration).await;
    // The controller may be gone already; nothing to report to then.
    let _ = completions.send(Completion { session, outcome });
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
