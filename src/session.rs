//! Conversation session controller.
//!
//! [`SessionState`] is the single source of truth for what the view shows:
//! the ordered messages, the conversation identity, the busy flag and the
//! last error.  Its transitions (`begin_submit`, `resolve`, `fail`, `reset`)
//! are plain synchronous methods.  [`SessionController`] sequences them
//! around the one remote call a submit makes, holding the state behind a
//! mutex that is never held across an await point.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::client::Client;
use crate::domains::derive_domains;
use crate::error::Result;
use crate::observability::{
    SESSION_RESETS, SESSION_STALE_RESPONSES, SESSION_SUBMITS, SESSION_SUBMITS_FAILED,
    SESSION_SUBMITS_IGNORED,
};
use crate::types::{ChatRequest, ChatResponse, ToolListResponse};

/// Id reserved for the in-flight assistant placeholder.
pub const PENDING_MESSAGE_ID: &str = "pending";

/////////////////////////////////////////// Backend ///////////////////////////////////////////

/// The remote operations a session needs.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one chat turn.
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// List the tool catalog.
    async fn list_tools(&self, domain: Option<&str>) -> Result<ToolListResponse>;
}

#[async_trait::async_trait]
impl ChatBackend for Client {
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse> {
        Client::send_message(self, request).await
    }

    async fn list_tools(&self, domain: Option<&str>) -> Result<ToolListResponse> {
        Client::list_tools(self, domain).await
    }
}

/////////////////////////////////////////// Messages ///////////////////////////////////////////

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person at the keyboard.
    User,
    /// The remote assistant.
    Assistant,
}

/// One entry of the visible conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Stable identifier for list keys.
    pub id: String,
    /// Who wrote the message.
    pub role: Role,
    /// Message text; empty while pending.
    pub content: String,
    /// When the message was appended.
    pub timestamp: OffsetDateTime,
    /// True only for the placeholder of an in-flight request.
    pub pending: bool,
}

impl Message {
    fn user(id: String, content: &str) -> Self {
        Self {
            id,
            role: Role::User,
            content: content.to_string(),
            timestamp: OffsetDateTime::now_utc(),
            pending: false,
        }
    }

    fn placeholder() -> Self {
        Self {
            id: PENDING_MESSAGE_ID.to_string(),
            role: Role::Assistant,
            content: String::new(),
            timestamp: OffsetDateTime::now_utc(),
            pending: true,
        }
    }

    fn assistant(id: String, content: String) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content,
            timestamp: OffsetDateTime::now_utc(),
            pending: false,
        }
    }
}

//////////////////////////////////////////// State ////////////////////////////////////////////

/// Correlates a completion with the submit that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTicket {
    generation: u64,
}

/// Observable session state plus the bookkeeping its transitions need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    messages: Vec<Message>,
    conversation_id: Option<String>,
    busy: bool,
    last_error: Option<String>,
    next_sequence: u64,
    generation: u64,
}

impl SessionState {
    /// Creates an empty, idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// The messages in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The conversation identity assigned by the server, if any.
    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// True while a submit is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// The description of the most recent failure, if not yet cleared.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Admits a submit and returns the request to send.
    ///
    /// Returns `None` without touching state when `text` is blank or a
    /// submit is already in flight.
    pub fn begin_submit(
        &mut self,
        text: &str,
        domains: &BTreeSet<String>,
    ) -> Option<(PendingTicket, ChatRequest)> {
        if text.trim().is_empty() || self.busy {
            return None;
        }
        self.next_sequence += 1;
        let id = format!("msg-{}", self.next_sequence);
        self.messages.push(Message::user(id, text));
        self.last_error = None;
        self.busy = true;
        self.messages.push(Message::placeholder());

        let domains = if domains.is_empty() {
            None
        } else {
            Some(domains.iter().cloned().collect())
        };
        let request = ChatRequest::new(text)
            .with_conversation_id(self.conversation_id.clone())
            .with_domains(domains);
        let ticket = PendingTicket {
            generation: self.generation,
        };
        Some((ticket, request))
    }

    /// Replaces the placeholder with the assistant's answer.
    ///
    /// Returns false, leaving state untouched, when the ticket predates a
    /// reset or the placeholder is gone.
    pub fn resolve(&mut self, ticket: &PendingTicket, response: ChatResponse) -> bool {
        let Some(index) = self.placeholder_index(ticket) else {
            return false;
        };
        if self.conversation_id.is_none() {
            self.conversation_id = Some(response.conversation_id);
        }
        self.messages[index] = Message::assistant(response.request_id, response.response);
        self.busy = false;
        true
    }

    /// Drops the placeholder and records the failure.
    ///
    /// The user's message and the conversation identity are kept.  Returns
    /// false, leaving state untouched, for a stale ticket.
    pub fn fail(&mut self, ticket: &PendingTicket, error: &str) -> bool {
        let Some(index) = self.placeholder_index(ticket) else {
            return false;
        };
        self.messages.remove(index);
        self.last_error = Some(error.to_string());
        self.busy = false;
        true
    }

    /// Starts a new conversation.
    ///
    /// In-flight tickets become stale.  Idempotent apart from that.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.conversation_id = None;
        self.last_error = None;
        self.busy = false;
        self.generation += 1;
    }

    fn placeholder_index(&self, ticket: &PendingTicket) -> Option<usize> {
        if ticket.generation != self.generation {
            return None;
        }
        self.messages
            .iter()
            .position(|m| m.pending && m.id == PENDING_MESSAGE_ID)
    }
}

//////////////////////////////////////////// Domains ////////////////////////////////////////////

/// The domains the catalog offers and the user's current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainFilter {
    available: Vec<String>,
    selected: BTreeSet<String>,
}

impl DomainFilter {
    /// Domains derived from the tool catalog, in first-occurrence order.
    pub fn available(&self) -> &[String] {
        &self.available
    }

    /// The selected domains; empty means all domains.
    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    /// Adds `domain` if absent, removes it if present.
    pub fn toggle(&mut self, domain: &str) {
        if !self.selected.remove(domain) {
            self.selected.insert(domain.to_string());
        }
    }

    /// Selects nothing, which allows every domain.
    pub fn clear(&mut self) {
        self.selected.clear();
    }
}

////////////////////////////////////////// Controller //////////////////////////////////////////

/// What became of a call to [`SessionController::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input or a submit already in flight; nothing happened.
    Ignored,
    /// The assistant answered and the placeholder was replaced.
    Resolved,
    /// The request failed; the placeholder was removed.
    Failed(String),
    /// The session was reset while the request was in flight.
    Discarded,
}

/// Sequences user commands against a [`ChatBackend`].
pub struct SessionController<B: ChatBackend> {
    backend: B,
    state: Mutex<SessionState>,
    domains: Mutex<DomainFilter>,
}

impl<B: ChatBackend> SessionController<B> {
    /// Creates a controller with an empty session.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: Mutex::new(SessionState::new()),
            domains: Mutex::new(DomainFilter::default()),
        }
    }

    /// The backend requests go to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Fetches the tool catalog once and records its domains.
    ///
    /// On failure the domain list is left empty; the session stays usable.
    pub async fn load_domains(&self) -> Result<Vec<String>> {
        match self.backend.list_tools(None).await {
            Ok(listing) => {
                let derived = derive_domains(&listing.tools);
                tracing::debug!(tools = listing.tools.len(), domains = ?derived, "loaded tool catalog");
                self.lock_domains().available = derived.clone();
                Ok(derived)
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load tool catalog");
                Err(err)
            }
        }
    }

    /// Sends `text` as the next user turn.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let domains = self.lock_domains().selected.clone();
        let admitted = {
            let mut state = self.lock_state();
            state.begin_submit(text, &domains)
        };
        let Some((ticket, request)) = admitted else {
            SESSION_SUBMITS_IGNORED.click();
            tracing::debug!("submit ignored: blank input or request in flight");
            return SubmitOutcome::Ignored;
        };
        SESSION_SUBMITS.click();
        tracing::debug!(
            conversation_id = ?request.conversation_id,
            domains = ?request.domains,
            "submitting message"
        );

        let result = self.backend.send_message(&request).await;

        let mut state = self.lock_state();
        match result {
            Ok(response) => {
                if state.resolve(&ticket, response) {
                    SubmitOutcome::Resolved
                } else {
                    SESSION_STALE_RESPONSES.click();
                    tracing::debug!("discarded response for a reset session");
                    SubmitOutcome::Discarded
                }
            }
            Err(err) => {
                let message = err.message().to_string();
                if state.fail(&ticket, &message) {
                    SESSION_SUBMITS_FAILED.click();
                    tracing::warn!(error = %err, "submit failed");
                    SubmitOutcome::Failed(message)
                } else {
                    SESSION_STALE_RESPONSES.click();
                    tracing::debug!(error = %err, "discarded failure for a reset session");
                    SubmitOutcome::Discarded
                }
            }
        }
    }

    /// Clears messages, conversation identity and error.
    ///
    /// The domain list and the selection are kept.
    pub fn reset(&self) {
        SESSION_RESETS.click();
        self.lock_state().reset();
    }

    /// Toggles `domain` in the selection.
    pub fn toggle_domain(&self, domain: &str) {
        self.lock_domains().toggle(domain);
    }

    /// Empties the selection.
    pub fn clear_domain_filter(&self) {
        self.lock_domains().clear();
    }

    /// A copy of the current session state for rendering.
    pub fn snapshot(&self) -> SessionState {
        self.lock_state().clone()
    }

    /// Returns true while a submit is in flight.
    pub fn is_busy(&self) -> bool {
        self.lock_state().busy
    }

    /// The current conversation identity.
    pub fn conversation_id(&self) -> Option<String> {
        self.lock_state().conversation_id.clone()
    }

    /// The most recent failure description.
    pub fn last_error(&self) -> Option<String> {
        self.lock_state().last_error.clone()
    }

    /// A copy of the domain list and selection.
    pub fn domain_filter(&self) -> DomainFilter {
        self.lock_domains().clone()
    }

    /// The selected domains, sorted.
    pub fn selected_domains(&self) -> Vec<String> {
        self.lock_domains().selected.iter().cloned().collect()
    }

    /// The domains the catalog offered at startup.
    pub fn available_domains(&self) -> Vec<String> {
        self.lock_domains().available.clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_domains(&self) -> MutexGuard<'_, DomainFilter> {
        self.domains.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use tokio::sync::oneshot;
    use tokio_test::task;
    use tokio_test::{assert_pending, assert_ready_eq};

    use super::*;
    use crate::Error;
    use crate::types::ToolDescriptor;

    enum Reply {
        Ready(Result<ChatResponse>),
        Gated(oneshot::Receiver<Result<ChatResponse>>),
    }

    #[derive(Default)]
    struct ScriptedBackend {
        replies: Mutex<VecDeque<Reply>>,
        requests: Mutex<Vec<ChatRequest>>,
        tools: Vec<ToolDescriptor>,
        tools_fail: bool,
    }

    impl ScriptedBackend {
        fn reply(self, response: Result<ChatResponse>) -> Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Reply::Ready(response));
            self
        }

        fn gated(&self) -> oneshot::Sender<Result<ChatResponse>> {
            let (tx, rx) = oneshot::channel();
            self.replies.lock().unwrap().push_back(Reply::Gated(rx));
            tx
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse> {
            let reply = {
                self.requests.lock().unwrap().push(request.clone());
                self.replies.lock().unwrap().pop_front()
            };
            match reply {
                Some(Reply::Ready(result)) => result,
                Some(Reply::Gated(rx)) => rx
                    .await
                    .unwrap_or_else(|_| Err(Error::connection("gate dropped", None))),
                None => Err(Error::connection("no scripted reply", None)),
            }
        }

        async fn list_tools(&self, _domain: Option<&str>) -> Result<ToolListResponse> {
            if self.tools_fail {
                return Err(Error::api(502, "Failed to retrieve tools from MCP Server"));
            }
            Ok(ToolListResponse {
                tools: self.tools.clone(),
                count: self.tools.len(),
            })
        }
    }

    fn ok(conversation_id: &str, response: &str, request_id: &str) -> Result<ChatResponse> {
        Ok(ChatResponse {
            conversation_id: conversation_id.to_string(),
            response: response.to_string(),
            request_id: request_id.to_string(),
        })
    }

    async fn wait_until_busy<B: ChatBackend>(controller: &SessionController<B>) {
        while !controller.is_busy() {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn begin_submit_appends_user_then_placeholder() {
        let mut state = SessionState::new();
        let (_, request) = state.begin_submit("Hello", &BTreeSet::new()).unwrap();
        assert_eq!(request, ChatRequest::new("Hello"));
        assert!(state.is_busy());
        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.messages()[0].role, Role::User);
        assert_eq!(state.messages()[0].content, "Hello");
        assert!(!state.messages()[0].pending);
        assert_eq!(state.messages()[1].id, PENDING_MESSAGE_ID);
        assert!(state.messages()[1].pending);
        assert!(state.messages()[1].content.is_empty());
    }

    #[test]
    fn blank_input_changes_nothing() {
        let mut state = SessionState::new();
        for text in ["", "   ", "\n\t "] {
            assert!(state.begin_submit(text, &BTreeSet::new()).is_none());
        }
        assert_eq!(state, SessionState::new());
    }

    #[test]
    fn busy_state_rejects_second_submit() {
        let mut state = SessionState::new();
        state.begin_submit("first", &BTreeSet::new()).unwrap();
        let before = state.clone();
        assert!(state.begin_submit("second", &BTreeSet::new()).is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn user_message_ids_are_unique() {
        let mut state = SessionState::new();
        let (ticket, _) = state.begin_submit("one", &BTreeSet::new()).unwrap();
        state.resolve(&ticket, ok("c1", "a", "r1").unwrap());
        let (ticket, _) = state.begin_submit("two", &BTreeSet::new()).unwrap();
        state.resolve(&ticket, ok("c1", "b", "r2").unwrap());
        let ids: BTreeSet<&str> = state.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn fail_keeps_identity_and_user_message() {
        let mut state = SessionState::new();
        let (ticket, _) = state.begin_submit("one", &BTreeSet::new()).unwrap();
        state.resolve(&ticket, ok("c1", "a", "r1").unwrap());
        let (ticket, _) = state.begin_submit("two", &BTreeSet::new()).unwrap();
        assert!(state.fail(&ticket, "boom"));
        assert_eq!(state.conversation_id(), Some("c1"));
        assert_eq!(state.messages().len(), 3);
        assert_eq!(state.messages()[2].content, "two");
        assert_eq!(state.last_error(), Some("boom"));
        assert!(!state.is_busy());
    }

    #[test]
    fn next_submit_clears_last_error() {
        let mut state = SessionState::new();
        let (ticket, _) = state.begin_submit("one", &BTreeSet::new()).unwrap();
        state.fail(&ticket, "boom");
        state.begin_submit("again", &BTreeSet::new()).unwrap();
        assert_eq!(state.last_error(), None);
    }

    #[test]
    fn stale_ticket_is_ignored_after_reset() {
        let mut state = SessionState::new();
        let (stale, _) = state.begin_submit("old", &BTreeSet::new()).unwrap();
        state.reset();
        let (fresh, _) = state.begin_submit("new", &BTreeSet::new()).unwrap();
        assert!(!state.resolve(&stale, ok("c-old", "late", "r-old").unwrap()));
        assert!(!state.fail(&stale, "late failure"));
        assert!(state.is_busy());
        assert_eq!(state.messages().len(), 2);
        assert!(state.resolve(&fresh, ok("c-new", "fresh", "r-new").unwrap()));
        assert_eq!(state.conversation_id(), Some("c-new"));
    }

    #[test]
    fn reset_is_idempotent() {
        let mut state = SessionState::new();
        let (ticket, _) = state.begin_submit("x", &BTreeSet::new()).unwrap();
        state.fail(&ticket, "boom");
        state.reset();
        let once = state.clone();
        state.reset();
        assert!(state.messages().is_empty());
        assert_eq!(state.conversation_id(), None);
        assert_eq!(state.last_error(), None);
        assert_eq!(once.messages(), state.messages());
    }

    #[test]
    fn toggle_is_an_involution() {
        let mut filter = DomainFilter::default();
        filter.toggle("erp");
        let before = filter.clone();
        filter.toggle("hr");
        filter.toggle("hr");
        assert_eq!(filter, before);
        filter.toggle("erp");
        assert!(filter.selected().is_empty());
    }

    #[tokio::test]
    async fn scenario_a_first_message_adopts_identity() {
        let backend = ScriptedBackend::default().reply(ok("c1", "Hi!", "r1"));
        let controller = SessionController::new(backend);

        assert_eq!(controller.submit("Hello").await, SubmitOutcome::Resolved);

        assert_eq!(controller.backend().requests(), vec![ChatRequest::new("Hello")]);
        let state = controller.snapshot();
        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.messages()[0].content, "Hello");
        assert_eq!(state.messages()[1].role, Role::Assistant);
        assert_eq!(state.messages()[1].content, "Hi!");
        assert_eq!(state.messages()[1].id, "r1");
        assert!(!state.messages()[1].pending);
        assert_eq!(state.conversation_id(), Some("c1"));
        assert!(!state.is_busy());
    }

    #[tokio::test]
    async fn scenario_b_identity_is_echoed_and_never_reassigned() {
        let backend = ScriptedBackend::default()
            .reply(ok("c1", "Hi!", "r1"))
            .reply(ok("c2", "Sure.", "r2"))
            .reply(ok("c3", "Done.", "r3"));
        let controller = SessionController::new(backend);

        controller.submit("Hello").await;
        controller.submit("more").await;
        controller.submit("and more").await;

        let requests = controller.backend().requests();
        assert_eq!(requests[0].conversation_id, None);
        assert_eq!(
            requests[1],
            ChatRequest::new("more").with_conversation_id(Some("c1".to_string()))
        );
        assert_eq!(requests[2].conversation_id.as_deref(), Some("c1"));
        assert_eq!(controller.conversation_id().as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn scenario_c_failure_removes_placeholder() {
        let backend =
            ScriptedBackend::default().reply(Err(Error::api(500, "LLM unavailable")));
        let controller = SessionController::new(backend);

        let outcome = controller.submit("Hello").await;

        assert_eq!(outcome, SubmitOutcome::Failed("LLM unavailable".to_string()));
        let state = controller.snapshot();
        assert_eq!(state.last_error(), Some("LLM unavailable"));
        assert_eq!(state.messages().len(), 1);
        assert_eq!(state.messages()[0].role, Role::User);
        assert!(state.messages().iter().all(|m| !m.pending));
        assert!(!state.is_busy());
        assert_eq!(state.conversation_id(), None);
    }

    #[tokio::test]
    async fn scenario_d_cleared_filter_sends_no_domains() {
        let backend = ScriptedBackend::default()
            .reply(ok("c1", "a", "r1"))
            .reply(ok("c1", "b", "r2"));
        let controller = SessionController::new(backend);

        controller.toggle_domain("hr");
        controller.toggle_domain("erp");
        controller.submit("filtered").await;
        controller.clear_domain_filter();
        assert!(controller.selected_domains().is_empty());
        controller.submit("unfiltered").await;

        let requests = controller.backend().requests();
        assert_eq!(
            requests[0].domains,
            Some(vec!["erp".to_string(), "hr".to_string()])
        );
        assert_eq!(requests[1].domains, None);
    }

    #[tokio::test]
    async fn blank_submit_makes_no_call() {
        let controller = SessionController::new(ScriptedBackend::default());
        assert_eq!(controller.submit("   ").await, SubmitOutcome::Ignored);
        assert!(controller.backend().requests().is_empty());
        assert_eq!(controller.snapshot(), SessionState::new());
    }

    #[tokio::test]
    async fn user_message_is_visible_before_the_response() {
        let backend = ScriptedBackend::default();
        let gate = backend.gated();
        let controller = SessionController::new(backend);

        let observer = async {
            wait_until_busy(&controller).await;
            let state = controller.snapshot();
            assert_eq!(state.messages().len(), 2);
            assert_eq!(state.messages()[0].content, "Hello");
            assert!(state.messages()[1].pending);

            assert_eq!(controller.submit("again").await, SubmitOutcome::Ignored);
            assert_eq!(controller.snapshot().messages().len(), 2);

            gate.send(ok("c1", "Hi!", "r1")).unwrap();
        };
        let (outcome, ()) = tokio::join!(controller.submit("Hello"), observer);

        assert_eq!(outcome, SubmitOutcome::Resolved);
        assert_eq!(controller.backend().requests().len(), 1);
        assert_eq!(controller.snapshot().messages().len(), 2);
    }

    #[test]
    fn submit_appends_before_first_poll_returns() {
        let backend = ScriptedBackend::default();
        let gate = backend.gated();
        let controller = SessionController::new(backend);

        let mut submit = task::spawn(controller.submit("  Hello "));
        assert_pending!(submit.poll());

        let state = controller.snapshot();
        assert!(state.is_busy());
        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.messages()[0].role, Role::User);
        assert_eq!(state.messages()[0].content, "  Hello ");
        assert!(state.messages()[1].pending);
        assert_eq!(state.messages()[1].id, PENDING_MESSAGE_ID);

        gate.send(ok("c1", "Hi!", "r1")).unwrap();
        assert_ready_eq!(submit.poll(), SubmitOutcome::Resolved);
        assert_eq!(controller.backend().requests()[0].message, "  Hello ");
        assert_eq!(controller.snapshot().messages()[1].content, "Hi!");
    }

    #[tokio::test]
    async fn reset_during_flight_discards_late_response() {
        let backend = ScriptedBackend::default();
        let gate = backend.gated();
        let controller = SessionController::new(backend);

        let observer = async {
            wait_until_busy(&controller).await;
            controller.reset();
            gate.send(ok("c-stale", "late", "r-stale")).unwrap();
        };
        let (outcome, ()) = tokio::join!(controller.submit("Hello"), observer);

        assert_eq!(outcome, SubmitOutcome::Discarded);
        let state = controller.snapshot();
        assert!(state.messages().is_empty());
        assert_eq!(state.conversation_id(), None);
        assert!(!state.is_busy());
    }

    #[tokio::test]
    async fn late_response_does_not_touch_newer_session() {
        let backend = ScriptedBackend::default();
        let stale_gate = backend.gated();
        let fresh_gate = backend.gated();
        let controller = SessionController::new(backend);

        let driver = async {
            wait_until_busy(&controller).await;
            controller.reset();
            let fresh = async {
                wait_until_busy(&controller).await;
                stale_gate.send(ok("c-stale", "late", "r-stale")).unwrap();
                tokio::task::yield_now().await;
                fresh_gate.send(ok("c-new", "fresh", "r-new")).unwrap();
            };
            let (outcome, ()) = tokio::join!(controller.submit("new"), fresh);
            outcome
        };
        let (stale, fresh) = tokio::join!(controller.submit("old"), driver);

        assert_eq!(stale, SubmitOutcome::Discarded);
        assert_eq!(fresh, SubmitOutcome::Resolved);
        let state = controller.snapshot();
        assert_eq!(state.conversation_id(), Some("c-new"));
        let contents: Vec<&str> = state.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["new", "fresh"]);
    }

    #[tokio::test]
    async fn reset_keeps_domains_and_selection() {
        let backend = ScriptedBackend {
            tools: vec![
                ToolDescriptor::new("hr.get_employee", ""),
                ToolDescriptor::new("erp.create_invoice", ""),
            ],
            ..ScriptedBackend::default()
        }
        .reply(ok("c1", "Hi!", "r1"));
        let controller = SessionController::new(backend);

        let domains = controller.load_domains().await.unwrap();
        assert_eq!(domains, vec!["hr", "erp"]);
        controller.toggle_domain("hr");
        controller.submit("Hello").await;
        controller.reset();

        assert!(controller.snapshot().messages().is_empty());
        assert_eq!(controller.conversation_id(), None);
        assert_eq!(controller.available_domains(), vec!["hr", "erp"]);
        assert_eq!(controller.selected_domains(), vec!["hr"]);
    }

    #[tokio::test]
    async fn catalog_failure_leaves_session_usable() {
        let backend = ScriptedBackend {
            tools_fail: true,
            ..ScriptedBackend::default()
        }
        .reply(ok("c1", "Hi!", "r1"));
        let controller = SessionController::new(backend);

        assert!(controller.load_domains().await.is_err());
        assert!(controller.available_domains().is_empty());
        assert_eq!(controller.submit("Hello").await, SubmitOutcome::Resolved);
    }
}
