//! Async driver for the profile generation flow.
//!
//! [`ProfileFlow`] owns one [`FlowMachine`] and one optional gateway
//! session. User actions become machine events; the commands the machine
//! returns are executed against the gateway and their outcomes fed back as
//! events, so the machine alone decides every transition.

use tracing::{info, instrument};

use crate::application::gateway::{
    GatewayError, InterviewGateway, InterviewSession, ProfileSource,
};
use crate::domain::generation::{
    Command, ConversationHistory, FlowEvent, FlowMachine, FlowState, GeneratorMode,
};
use crate::domain::profile::{Profile, Role};

/// What a flow operation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowUpdate {
    /// The input was rejected locally (empty, or a request is already in
    /// flight); nothing changed.
    Ignored,
    /// The flow advanced and waits for the next input.
    AwaitingInput,
    /// The assistant replied to a conversational turn.
    AssistantReplied(String),
    /// The flow completed with a generated profile.
    ProfileReady(Profile),
    /// The member abandoned the flow.
    Cancelled,
}

/// One end-to-end run of the profile-generation process.
///
/// Errors returned by the async operations are always recoverable: the
/// flow has already been rewound to its last interactive state with all
/// collected answers and history intact, so the caller can simply retry.
pub struct ProfileFlow {
    gateway: InterviewGateway,
    machine: FlowMachine,
    session: Option<InterviewSession>,
    seed: Option<Profile>,
}

impl ProfileFlow {
    /// Creates a wizard-mode flow.
    ///
    /// Without a role the flow starts at role selection.
    pub fn wizard(gateway: InterviewGateway, role: Option<Role>) -> Self {
        Self {
            gateway,
            machine: FlowMachine::wizard(role),
            session: None,
            seed: None,
        }
    }

    /// Creates a chat-mode flow.
    ///
    /// With a seed profile the flow refines it and the role is taken from
    /// the profile, skipping role selection entirely.
    pub fn chat(gateway: InterviewGateway, role: Role, seed: Option<Profile>) -> Self {
        let effective_role = seed.as_ref().map(|p| p.role).unwrap_or(role);
        Self {
            gateway,
            machine: FlowMachine::chat(effective_role),
            session: None,
            seed,
        }
    }

    /// Overrides the chat turn limit (policy value).
    pub fn with_turn_limit(mut self, limit: usize) -> Self {
        self.machine = self.machine.with_turn_limit(limit);
        self
    }

    /// Starts the flow.
    ///
    /// In chat mode this opens the interview session and performs the
    /// opening exchange; the greeting is the first visible turn. In wizard
    /// mode there is nothing to open.
    ///
    /// # Errors
    ///
    /// - `SessionInit` if the session could not be opened; calling `start`
    ///   again retries
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<FlowUpdate, GatewayError> {
        match self.machine.mode() {
            GeneratorMode::Wizard => Ok(FlowUpdate::AwaitingInput),
            GeneratorMode::Chat => {
                if self.session.is_some() {
                    return Ok(FlowUpdate::Ignored);
                }
                let role = self.machine.role().ok_or(GatewayError::NoActiveSession)?;
                let (session, greeting) = self
                    .gateway
                    .start_interview(role, self.seed.as_ref())
                    .await?;
                self.session = Some(session);
                self.machine.apply(FlowEvent::ReplyReceived(greeting.clone()));
                Ok(FlowUpdate::AssistantReplied(greeting))
            }
        }
    }

    /// Records the member's role choice (wizard mode).
    pub fn select_role(&mut self, role: Role) -> FlowUpdate {
        let before = self.machine.state().clone();
        self.machine.apply(FlowEvent::RoleSelected(role));
        if self.machine.state() == &before {
            FlowUpdate::Ignored
        } else {
            FlowUpdate::AwaitingInput
        }
    }

    /// Submits an answer to the current wizard question.
    ///
    /// The fifth answer triggers generation; a failed generation rewinds
    /// to the last question with all answers preserved.
    #[instrument(skip(self, text))]
    pub async fn submit_answer(&mut self, text: &str) -> Result<FlowUpdate, GatewayError> {
        let before = self.machine.state().clone();
        match self.machine.apply(FlowEvent::AnswerSubmitted(text.to_string())) {
            Some(command) => self.execute(command).await,
            None if self.machine.state() == &before => Ok(FlowUpdate::Ignored),
            None => Ok(FlowUpdate::AwaitingInput),
        }
    }

    /// Sends a chat message.
    ///
    /// Once the turn limit is reached the message routes to finalization
    /// instead of producing another assistant reply.
    ///
    /// # Errors
    ///
    /// - `NoActiveSession` if called before [`ProfileFlow::start`]
    /// - `Completion` / `Generation` / `Parse` on remote failures; the
    ///   conversation history is preserved in every case
    #[instrument(skip(self, text))]
    pub async fn send_message(&mut self, text: &str) -> Result<FlowUpdate, GatewayError> {
        if self.machine.mode() == GeneratorMode::Chat && self.session.is_none() {
            return Err(GatewayError::NoActiveSession);
        }
        match self.machine.apply(FlowEvent::MessageSubmitted(text.to_string())) {
            Some(command) => self.execute(command).await,
            None => Ok(FlowUpdate::Ignored),
        }
    }

    /// Finalizes the flow explicitly ("save and exit"), or retries a failed
    /// wizard generation, without submitting a new message.
    #[instrument(skip(self))]
    pub async fn finalize(&mut self) -> Result<FlowUpdate, GatewayError> {
        match self.machine.apply(FlowEvent::FinalizeRequested) {
            Some(command) => self.execute(command).await,
            None => Ok(FlowUpdate::Ignored),
        }
    }

    /// Abandons the flow before completion.
    pub fn cancel(&mut self) -> FlowUpdate {
        if self.machine.state() == &FlowState::Terminated {
            return FlowUpdate::Ignored;
        }
        self.machine.apply(FlowEvent::Cancelled);
        info!("profile generation flow cancelled");
        FlowUpdate::Cancelled
    }

    pub fn state(&self) -> &FlowState {
        self.machine.state()
    }

    pub fn role(&self) -> Option<Role> {
        self.machine.role()
    }

    pub fn history(&self) -> &ConversationHistory {
        self.machine.history()
    }

    /// The wizard question currently presented, if any.
    pub fn current_question(&self) -> Option<&'static str> {
        self.machine.current_question()
    }

    pub fn is_terminated(&self) -> bool {
        self.machine.state() == &FlowState::Terminated
    }

    /// Executes one machine command against the gateway and feeds the
    /// outcome back as an event.
    async fn execute(&mut self, command: Command) -> Result<FlowUpdate, GatewayError> {
        match command {
            Command::SendMessage(text) => {
                let session = self.session.as_mut().ok_or(GatewayError::NoActiveSession)?;
                match self.gateway.send_message(session, &text).await {
                    Ok(reply) => {
                        self.machine.apply(FlowEvent::ReplyReceived(reply.clone()));
                        Ok(FlowUpdate::AssistantReplied(reply))
                    }
                    Err(err) => {
                        self.machine.apply(FlowEvent::TurnFailed);
                        Err(err)
                    }
                }
            }
            Command::GenerateFromWizard { role, answers } => {
                self.run_generation(role, ProfileSource::WizardAnswers(answers))
                    .await
            }
            Command::GenerateFromHistory { role, transcript } => {
                self.run_generation(role, ProfileSource::Transcript(transcript))
                    .await
            }
        }
    }

    async fn run_generation(
        &mut self,
        role: Role,
        source: ProfileSource,
    ) -> Result<FlowUpdate, GatewayError> {
        match self.gateway.generate_profile(role, &source).await {
            Ok(profile) => {
                self.machine.apply(FlowEvent::GenerationSucceeded);
                info!(%role, "profile generated");
                Ok(FlowUpdate::ProfileReady(profile))
            }
            Err(err) => {
                self.machine.apply(FlowEvent::GenerationFailed);
                Err(err)
            }
        }
    }
}
