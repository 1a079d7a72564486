//! Gateway over the hosted completion service.
//!
//! Isolates all remote interaction behind three operations: open a guided
//! interview session, exchange one message, and produce a structured
//! profile from accumulated material.
//!
//! Sessions are explicit handles returned by [`InterviewGateway::start_interview`]
//! and threaded through [`InterviewGateway::send_message`]; the gateway
//! itself holds no session state, so any number of sessions may coexist.

use std::sync::Arc;

use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::domain::generation::{
    history_generation_prompt, interviewer_instruction, wizard_generation_prompt, FALLBACK_REPLY,
    OPENING_PROBE_FRESH, OPENING_PROBE_SEEDED,
};
use crate::domain::profile::{decode_profile_fields, response_schema, Profile, ProfileParseError, Role};
use crate::ports::{CompletionError, CompletionProvider, CompletionRequest, Message, MessageRole};

/// Errors raised by gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The interview session could not be opened.
    #[error("failed to open interview session: {0}")]
    SessionInit(#[source] CompletionError),

    /// A message was sent without an open session.
    #[error("no active interview session")]
    NoActiveSession,

    /// The remote call failed during a conversational turn.
    #[error("completion failed: {0}")]
    Completion(#[source] CompletionError),

    /// The remote call failed during finalization.
    #[error("profile generation failed: {0}")]
    Generation(#[source] CompletionError),

    /// The structured response violated the profile schema.
    #[error(transparent)]
    Parse(#[from] ProfileParseError),
}

/// One stateful conversational context, scoped to a role.
///
/// Holds the system instruction and the full message log replayed with
/// every exchange, since the completion service itself is stateless.
#[derive(Debug, Clone)]
pub struct InterviewSession {
    id: Uuid,
    role: Role,
    system_instruction: String,
    messages: Vec<Message>,
}

impl InterviewSession {
    fn new(role: Role, system_instruction: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            system_instruction,
            messages: Vec::new(),
        }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    /// The role this session is scoped to; immutable for its lifetime.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Messages exchanged so far, both roles.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

/// Source material for profile generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSource {
    /// A flattened conversation transcript.
    Transcript(String),
    /// The five wizard answers, in question order.
    WizardAnswers(Vec<String>),
}

/// Session-oriented client for the completion service.
#[derive(Clone)]
pub struct InterviewGateway {
    provider: Arc<dyn CompletionProvider>,
}

impl InterviewGateway {
    /// Creates a gateway over the given provider.
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Opens a new interview session scoped to `role` and performs the
    /// opening exchange.
    ///
    /// With a seed profile the session's instructions bias the assistant
    /// toward deepening the existing profile rather than collecting basic
    /// facts from scratch. Returns the session handle together with the
    /// assistant's greeting.
    ///
    /// # Errors
    ///
    /// - `SessionInit` if the opening exchange fails
    #[instrument(skip(self, seed), fields(role = %role))]
    pub async fn start_interview(
        &self,
        role: Role,
        seed: Option<&Profile>,
    ) -> Result<(InterviewSession, String), GatewayError> {
        let instruction = interviewer_instruction(role, seed);
        let mut session = InterviewSession::new(role, instruction);

        let probe = if seed.is_some() {
            OPENING_PROBE_SEEDED
        } else {
            OPENING_PROBE_FRESH
        };

        let greeting = self
            .exchange(&mut session, probe)
            .await
            .map_err(GatewayError::SessionInit)?;

        debug!(session_id = %session.id(), "interview session opened");
        Ok((session, greeting))
    }

    /// Sends one user message on the session and returns the assistant's
    /// reply.
    ///
    /// On failure the session's message log is left unchanged, so the same
    /// turn can be retried.
    ///
    /// # Errors
    ///
    /// - `Completion` on transport or service failure
    #[instrument(skip(self, session, text), fields(session_id = %session.id()))]
    pub async fn send_message(
        &self,
        session: &mut InterviewSession,
        text: &str,
    ) -> Result<String, GatewayError> {
        self.exchange(session, text)
            .await
            .map_err(GatewayError::Completion)
    }

    /// One-shot, session-independent structured generation.
    ///
    /// The response must be a JSON object satisfying the profile schema.
    /// The emitted profile's `role` is stamped from the input — never taken
    /// from the model's own output — and gets a placeholder avatar and
    /// `is_verified = false`.
    ///
    /// # Errors
    ///
    /// - `Generation` if the remote call fails
    /// - `Parse` if the response violates the schema contract
    #[instrument(skip(self, source), fields(role = %role))]
    pub async fn generate_profile(
        &self,
        role: Role,
        source: &ProfileSource,
    ) -> Result<Profile, GatewayError> {
        let prompt = match source {
            ProfileSource::Transcript(transcript) => history_generation_prompt(role, transcript),
            ProfileSource::WizardAnswers(answers) => wizard_generation_prompt(role, answers),
        };

        let request = CompletionRequest::new()
            .with_message(MessageRole::User, prompt)
            .with_response_schema(response_schema());

        let response = self
            .provider
            .complete(request)
            .await
            .map_err(GatewayError::Generation)?;

        debug!(
            total_tokens = response.usage.total_tokens,
            model = %response.model,
            "structured generation completed"
        );

        let fields = decode_profile_fields(&response.content)?;

        Ok(Profile {
            name: fields.name,
            role,
            tagline: fields.tagline,
            tags: fields.tags,
            description: fields.description,
            needs: fields.needs,
            offers: fields.offers,
            avatar_url: Some(placeholder_avatar()),
            is_verified: false,
        })
    }

    /// Runs one request/reply exchange, appending both turns to the session
    /// log only after the reply arrives.
    async fn exchange(
        &self,
        session: &mut InterviewSession,
        text: &str,
    ) -> Result<String, CompletionError> {
        let request = CompletionRequest::new()
            .with_system_instruction(session.system_instruction.clone())
            .with_messages(session.messages.iter().cloned())
            .with_message(MessageRole::User, text);

        let response = self.provider.complete(request).await?;

        let reply = if response.content.trim().is_empty() {
            warn!(session_id = %session.id(), "empty reply, substituting fallback");
            FALLBACK_REPLY.to_string()
        } else {
            response.content
        };

        session.messages.push(Message::user(text));
        session.messages.push(Message::assistant(reply.clone()));

        debug!(
            session_id = %session.id(),
            turns = session.messages.len(),
            total_tokens = response.usage.total_tokens,
            "exchange completed"
        );
        Ok(reply)
    }
}

/// Placeholder avatar for freshly generated profiles.
fn placeholder_avatar() -> String {
    format!("https://picsum.photos/seed/{}/200/200", Uuid::new_v4())
}
