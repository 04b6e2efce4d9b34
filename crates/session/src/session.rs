//! The chat session: owns pending attachments and history, and drives one
//! send at a time through routing, extraction, assembly, and dispatch.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use edumind_config::AppConfig;
use edumind_core::attachment::{Attachment, ExtractedContent};
use edumind_core::error::SessionError;
use edumind_core::message::ConversationTurn;
use edumind_core::model::Capability;
use edumind_core::provider::{ChatRequest, DEFAULT_MAX_TOKENS, Provider};
use edumind_extract::AttachmentExtractor;
use tracing::{debug, info, warn};

use crate::assembler::{ContentAssembler, PreparedAttachment};
use crate::history::ConversationHistory;
use crate::router::{ModelCapabilityRouter, RouteDecision};

/// Where the current send is. Every send ends back at `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Routing,
    Extracting,
    Assembling,
    Dispatched,
    Completed,
    Failed,
}

impl fmt::Display for SendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Routing => "routing",
            Self::Extracting => "extracting",
            Self::Assembling => "assembling",
            Self::Dispatched => "dispatched",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// What one send produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    /// The assistant reply, or an `[error]`/`[exception]` line on failure
    pub reply: String,

    /// The model the request was sent to
    pub model: String,

    pub capability: Capability,

    /// Set when the model was switched automatically
    pub notice: Option<String>,

    /// Whether the exchange was added to history
    pub recorded: bool,

    pub failed: bool,
}

pub struct ChatSession {
    provider: Arc<dyn Provider>,
    extractor: Arc<AttachmentExtractor>,
    router: ModelCapabilityRouter,
    assembler: ContentAssembler,
    history: ConversationHistory,
    pending: Vec<Attachment>,
    selected_model: String,
    max_tokens: u32,
    state: SendState,
}

impl ChatSession {
    pub fn new(
        provider: Arc<dyn Provider>,
        extractor: AttachmentExtractor,
        router: ModelCapabilityRouter,
        assembler: ContentAssembler,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            extractor: Arc::new(extractor),
            router,
            assembler,
            history: ConversationHistory::new(),
            pending: Vec::new(),
            selected_model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            state: SendState::Idle,
        }
    }

    /// Build a session from configuration, with pdfium for PDF access.
    pub fn from_config(config: &AppConfig, provider: Arc<dyn Provider>) -> Self {
        let extractor = AttachmentExtractor::from_config(&config.extraction);
        Self::with_extractor(config, provider, extractor)
    }

    /// Build a session from configuration with a caller-supplied extractor.
    pub fn with_extractor(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        extractor: AttachmentExtractor,
    ) -> Self {
        let router = ModelCapabilityRouter::new(
            config.model_registry(),
            config.vision_fallback_model.clone(),
        );
        Self::new(
            provider,
            extractor,
            router,
            ContentAssembler::new(&config.response_language),
            config.default_model.clone(),
        )
        .with_max_tokens(config.max_tokens)
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Queue a file for the next send. The file must exist and have an
    /// accepted extension.
    pub fn attach(&mut self, path: impl Into<PathBuf>) -> Result<&Attachment, SessionError> {
        let attachment = Attachment::open(path)?;
        debug!(file = %attachment.file_name(), "Attachment queued");
        self.pending.push(attachment);
        Ok(&self.pending[self.pending.len() - 1])
    }

    pub fn pending_attachments(&self) -> &[Attachment] {
        &self.pending
    }

    /// Select the model for subsequent sends and return its capability.
    pub fn select_model(&mut self, model: impl Into<String>) -> Capability {
        self.selected_model = model.into();
        let capability = self.router.capability_of(&self.selected_model);
        info!(model = %self.selected_model, %capability, "Model selected");
        capability
    }

    pub fn selected_model(&self) -> &str {
        &self.selected_model
    }

    pub fn router(&self) -> &ModelCapabilityRouter {
        &self.router
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn state(&self) -> SendState {
        self.state
    }

    /// Clear history and pending attachments, and return to `Idle`.
    pub fn reset(&mut self) {
        self.history.clear();
        self.pending.clear();
        self.set_state(SendState::Idle);
        info!("Session reset");
    }

    /// Send one user turn with every pending attachment.
    ///
    /// The user text is trimmed. Backend and transport failures are
    /// reported in the outcome, not as `Err`. The pending attachments are
    /// consumed either way.
    pub async fn send(&mut self, text: &str) -> Result<SendOutcome, SessionError> {
        if self.state != SendState::Idle {
            return Err(SessionError::Busy);
        }
        let text = text.trim();
        if text.is_empty() && self.pending.is_empty() {
            return Err(SessionError::EmptyTurn);
        }

        let attachments = std::mem::take(&mut self.pending);

        // Extraction runs once up front so the router can see scans.
        self.set_state(SendState::Routing);
        let extractor = Arc::clone(&self.extractor);
        let extracted = tokio::task::spawn_blocking(move || {
            let contents: Vec<ExtractedContent> =
                attachments.iter().map(|a| extractor.extract(a)).collect();
            (attachments, contents)
        })
        .await;
        let (attachments, contents) = match extracted {
            Ok(extracted) => extracted,
            Err(e) => return Err(self.abort_extraction(e)),
        };
        let decision = self.router.route(&self.selected_model, &contents);

        self.set_state(SendState::Extracting);
        let extractor = Arc::clone(&self.extractor);
        let vision = decision.is_vision();
        let prepared = tokio::task::spawn_blocking(move || {
            attachments
                .into_iter()
                .zip(contents)
                .map(|(attachment, content)| {
                    let content = if vision {
                        extractor.resolve_scanned(&attachment, content)
                    } else {
                        content
                    };
                    PreparedAttachment::new(attachment, content)
                })
                .collect::<Vec<_>>()
        })
        .await;
        let prepared = match prepared {
            Ok(prepared) => prepared,
            Err(e) => return Err(self.abort_extraction(e)),
        };

        self.set_state(SendState::Assembling);
        let content = self.assembler.assemble(text, decision.capability, &prepared);
        let user_turn = ConversationTurn::user(content);
        let messages = match decision.capability {
            Capability::Text => self.history.request_messages(&user_turn),
            Capability::Vision => vec![user_turn.clone()],
        };

        self.set_state(SendState::Dispatched);
        let outcome = self.dispatch(decision, messages, user_turn).await;
        self.set_state(SendState::Idle);
        Ok(outcome)
    }

    async fn dispatch(
        &mut self,
        decision: RouteDecision,
        messages: Vec<ConversationTurn>,
        user_turn: ConversationTurn,
    ) -> SendOutcome {
        let request =
            ChatRequest::new(decision.model.clone(), messages).with_max_tokens(self.max_tokens);
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            images = user_turn.content.image_count(),
            "Dispatching request"
        );

        let provider = Arc::clone(&self.provider);
        let handle = tokio::spawn(async move { provider.complete(request).await });

        let (reply, failed) = match handle.await {
            Ok(Ok(reply)) => (reply, false),
            Ok(Err(e)) if e.is_transport() => {
                warn!(error = %e, "Request failed before the backend answered");
                (format!("[exception] {}", e.user_message()), true)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Backend returned an error");
                (format!("[error] {}", e.user_message()), true)
            }
            Err(e) => {
                warn!(error = %e, "Dispatch task did not complete");
                (format!("[exception] {e}"), true)
            }
        };

        let recorded = !failed && decision.capability == Capability::Text;
        if recorded {
            self.history
                .record_exchange(user_turn, ConversationTurn::assistant(reply.clone()));
        }
        self.set_state(if failed { SendState::Failed } else { SendState::Completed });

        SendOutcome {
            reply,
            model: decision.model,
            capability: decision.capability,
            notice: decision.notice,
            recorded,
            failed,
        }
    }

    fn abort_extraction(&mut self, e: tokio::task::JoinError) -> SessionError {
        warn!(error = %e, "Extraction task did not complete");
        self.set_state(SendState::Idle);
        SessionError::Extraction(e.to_string())
    }

    fn set_state(&mut self, next: SendState) {
        debug!(from = %self.state, to = %next, "Send state");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use edumind_core::error::ProviderError;
    use edumind_core::message::{ContentPart, MessageContent, Role};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted results and records every request it sees.
    struct ScriptedProvider {
        replies: Mutex<VecDeque<Result<String, ProviderError>>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<Result<String, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError> {
            self.requests.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("ok".into()))
        }
    }

    fn session(provider: Arc<ScriptedProvider>) -> ChatSession {
        ChatSession::from_config(&AppConfig::default(), provider)
    }

    const TEXT_MODEL: &str = "deepseek-ai/DeepSeek-V3.2";
    const VISION_MODEL: &str = "deepseek-ai/deepseek-vl2";

    #[tokio::test]
    async fn text_send_records_exchange() {
        let provider = ScriptedProvider::new(vec![Ok("Hello!".into())]);
        let mut s = session(provider.clone());
        s.select_model(TEXT_MODEL);

        let outcome = s.send("hi").await.unwrap();
        assert_eq!(outcome.reply, "Hello!");
        assert!(outcome.recorded);
        assert!(!outcome.failed);
        assert_eq!(outcome.capability, Capability::Text);
        assert!(outcome.notice.is_none());

        let turns = s.history().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].content.as_text(), Some("hi"));
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].content.as_text(), Some("Hello!"));
        assert_eq!(s.state(), SendState::Idle);

        let request = &provider.requests()[0];
        assert_eq!(request.model, TEXT_MODEL);
        assert_eq!(request.max_tokens, 4000);
        assert!(!request.stream);
    }

    #[tokio::test]
    async fn text_sends_replay_history() {
        let provider = ScriptedProvider::new(vec![Ok("one".into()), Ok("two".into())]);
        let mut s = session(provider.clone());

        s.send("first").await.unwrap();
        s.send("second").await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests[0].messages.len(), 1);
        assert_eq!(requests[1].messages.len(), 3);
        assert_eq!(requests[1].messages[1].content.as_text(), Some("one"));
        assert_eq!(s.history().len(), 4);
    }

    #[tokio::test]
    async fn vision_send_is_not_recorded_and_sends_only_new_turn() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("cell.png");
        std::fs::write(&image, [0x89, b'P', b'N', b'G', 1, 2, 3]).unwrap();

        let provider = ScriptedProvider::new(vec![Ok("first".into()), Ok("a cell".into())]);
        let mut s = session(provider.clone());
        s.send("warm up").await.unwrap();
        assert_eq!(s.history().len(), 2);

        assert_eq!(s.select_model(VISION_MODEL), Capability::Vision);
        s.attach(&image).unwrap();
        let outcome = s.send("describe").await.unwrap();

        assert_eq!(outcome.reply, "a cell");
        assert!(!outcome.recorded);
        assert_eq!(s.history().len(), 2);
        assert!(s.pending_attachments().is_empty());

        let request = &provider.requests()[1];
        assert_eq!(request.messages.len(), 1);
        let parts = request.messages[0].content.parts().unwrap();
        assert_eq!(parts[0], ContentPart::text("describe\n(Please respond in English)"));
        assert_eq!(request.messages[0].content.image_count(), 1);
    }

    #[tokio::test]
    async fn backend_error_becomes_reply_and_skips_history() {
        let provider = ScriptedProvider::new(vec![Err(ProviderError::ApiError {
            status_code: 400,
            message: "Model does not exist.".into(),
        })]);
        let mut s = session(provider);

        let outcome = s.send("hi").await.unwrap();
        assert_eq!(outcome.reply, "[error] Model does not exist.");
        assert!(outcome.failed);
        assert!(!outcome.recorded);
        assert!(s.history().is_empty());
        assert_eq!(s.state(), SendState::Idle);
    }

    #[tokio::test]
    async fn transport_failure_is_tagged_as_exception() {
        let provider =
            ScriptedProvider::new(vec![Err(ProviderError::Timeout("timed out after 120s".into()))]);
        let mut s = session(provider);

        let outcome = s.send("hi").await.unwrap();
        assert_eq!(outcome.reply, "[exception] timed out after 120s");
        assert!(outcome.failed);
        assert!(s.history().is_empty());
    }

    #[tokio::test]
    async fn failed_send_still_clears_attachments() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("rules.txt");
        std::fs::write(&notes, "rule A").unwrap();

        let provider = ScriptedProvider::new(vec![Err(ProviderError::Network("refused".into()))]);
        let mut s = session(provider);
        s.attach(&notes).unwrap();

        let outcome = s.send("summarize").await.unwrap();
        assert!(outcome.failed);
        assert!(s.pending_attachments().is_empty());
    }

    #[tokio::test]
    async fn text_attachment_is_inlined() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("name.txt");
        std::fs::write(&notes, "rule A").unwrap();

        let provider = ScriptedProvider::new(vec![]);
        let mut s = session(provider.clone());
        s.attach(&notes).unwrap();
        s.send("summarize").await.unwrap();

        let request = &provider.requests()[0];
        assert_eq!(
            request.messages[0].content,
            MessageContent::Text("summarize\n[file: name.txt]\nrule A".into())
        );
    }

    #[tokio::test]
    async fn send_trims_user_text() {
        let provider = ScriptedProvider::new(vec![]);
        let mut s = session(provider.clone());
        s.send("  hi \n").await.unwrap();

        let request = &provider.requests()[0];
        assert_eq!(request.messages[0].content, MessageContent::Text("hi".into()));
        assert_eq!(s.history().turns()[0].content.as_text(), Some("hi"));
    }

    #[tokio::test]
    async fn empty_turn_is_rejected() {
        let provider = ScriptedProvider::new(vec![]);
        let mut s = session(provider.clone());
        assert!(matches!(s.send("   ").await, Err(SessionError::EmptyTurn)));
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn send_while_dispatched_is_busy() {
        let provider = ScriptedProvider::new(vec![]);
        let mut s = session(provider.clone());
        s.state = SendState::Dispatched;

        assert!(matches!(s.send("hi").await, Err(SessionError::Busy)));
        assert!(provider.requests().is_empty());

        s.reset();
        assert!(s.send("hi").await.is_ok());
    }

    #[test]
    fn attach_rejects_unsupported_and_missing() {
        let mut s = session(ScriptedProvider::new(vec![]));
        assert!(matches!(
            s.attach("/tmp/notes.docx"),
            Err(SessionError::Attachment(_))
        ));
        assert!(matches!(
            s.attach("/nonexistent/notes.txt"),
            Err(SessionError::Attachment(_))
        ));
        assert!(s.pending_attachments().is_empty());
    }

    #[tokio::test]
    async fn reset_clears_history_and_attachments() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("rules.txt");
        std::fs::write(&notes, "rule A").unwrap();

        let mut s = session(ScriptedProvider::new(vec![]));
        s.send("hi").await.unwrap();
        s.attach(&notes).unwrap();

        s.reset();
        assert!(s.history().is_empty());
        assert!(s.pending_attachments().is_empty());
        assert_eq!(s.state(), SendState::Idle);
    }
}
