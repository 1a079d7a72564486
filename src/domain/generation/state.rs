//! Flow state machine for profile generation.
//!
//! Transitions are pure: [`FlowMachine::apply`] mutates only the machine's
//! own record (state, answers, history) and returns the side effect the
//! driver must run against the gateway. No I/O happens here, which keeps
//! every transition testable without a network.

use crate::domain::generation::transcript::ConversationHistory;
use crate::domain::generation::wizard::{questions_for, WizardAnswerSet, WIZARD_QUESTION_COUNT};
use crate::domain::profile::Role;

/// Number of recorded turns (both speakers) after which the next user
/// message routes to finalization instead of another assistant reply.
///
/// Policy value, not an intrinsic constant; override with
/// [`FlowMachine::with_turn_limit`].
pub const CHAT_TURN_LIMIT: usize = 7;

/// Which interaction mode the flow runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorMode {
    /// Fixed five-question, role-specific, single-pass sequence.
    Wizard,
    /// Open-ended multi-turn conversational refinement.
    Chat,
}

/// The single active state of a generation flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    /// Waiting for the member to pick a community role.
    RoleSelection,
    /// Presenting the `index`-th wizard question (0-based).
    WizardQuestion { index: usize },
    /// Conversational refinement; `pending` is true while a gateway
    /// request is in flight and sending is disabled.
    Conversation { pending: bool },
    /// A structured generation request is in flight.
    Generating,
    /// The flow ended, either with a profile or by cancellation.
    Terminated,
}

/// An input to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    /// The member picked a role.
    RoleSelected(Role),
    /// The member answered the current wizard question.
    AnswerSubmitted(String),
    /// The member sent a chat message.
    MessageSubmitted(String),
    /// The gateway delivered an assistant reply.
    ReplyReceived(String),
    /// The in-flight conversational request failed.
    TurnFailed,
    /// The member asked to finalize now ("save and exit", or a wizard
    /// retry after a failed generation).
    FinalizeRequested,
    /// The structured generation request produced a profile.
    GenerationSucceeded,
    /// The structured generation request failed.
    GenerationFailed,
    /// The member abandoned the flow.
    Cancelled,
}

/// A side effect the driver must execute against the gateway.
///
/// Commands are self-contained: they carry everything the driver needs so
/// the machine's internals never have to be re-read mid-execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Send one user message and await the assistant reply.
    SendMessage(String),
    /// Produce a profile from the five wizard answers.
    GenerateFromWizard { role: Role, answers: Vec<String> },
    /// Produce a profile from the flattened conversation history.
    GenerateFromHistory { role: Role, transcript: String },
}

/// Pure state machine driving one profile-generation flow.
///
/// Exactly one [`FlowState`] is active at a time. The role, once set, is
/// immutable for the session. Empty or whitespace-only input never changes
/// state and never yields a command.
#[derive(Debug, Clone)]
pub struct FlowMachine {
    mode: GeneratorMode,
    state: FlowState,
    role: Option<Role>,
    answers: Option<WizardAnswerSet>,
    history: ConversationHistory,
    turn_limit: usize,
}

impl FlowMachine {
    /// Creates a wizard-mode machine.
    ///
    /// With a known role (e.g. from an existing profile) the flow starts at
    /// the first question; otherwise it starts at role selection.
    pub fn wizard(role: Option<Role>) -> Self {
        let (state, answers) = match role {
            Some(r) => (
                FlowState::WizardQuestion { index: 0 },
                Some(WizardAnswerSet::new(r)),
            ),
            None => (FlowState::RoleSelection, None),
        };
        Self {
            mode: GeneratorMode::Wizard,
            state,
            role,
            answers,
            history: ConversationHistory::new(),
            turn_limit: CHAT_TURN_LIMIT,
        }
    }

    /// Creates a chat-mode machine scoped to `role`.
    ///
    /// The machine starts with the opening exchange already in flight
    /// (`Conversation { pending: true }`); the driver feeds the greeting
    /// back as a [`FlowEvent::ReplyReceived`].
    pub fn chat(role: Role) -> Self {
        Self {
            mode: GeneratorMode::Chat,
            state: FlowState::Conversation { pending: true },
            role: Some(role),
            answers: None,
            history: ConversationHistory::new(),
            turn_limit: CHAT_TURN_LIMIT,
        }
    }

    /// Overrides the chat turn limit (policy value).
    pub fn with_turn_limit(mut self, limit: usize) -> Self {
        self.turn_limit = limit;
        self
    }

    pub fn mode(&self) -> GeneratorMode {
        self.mode
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Wizard answers recorded so far, if the wizard has started.
    pub fn answers(&self) -> Option<&WizardAnswerSet> {
        self.answers.as_ref()
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn turn_limit(&self) -> usize {
        self.turn_limit
    }

    /// The wizard question currently presented, if any.
    pub fn current_question(&self) -> Option<&'static str> {
        match (&self.state, self.role) {
            (FlowState::WizardQuestion { index }, Some(role)) => {
                questions_for(role).get(*index).copied()
            }
            _ => None,
        }
    }

    /// Applies one event, returning the command the driver must execute.
    ///
    /// Events that do not fit the current state are ignored: the state is
    /// left unchanged and no command is returned.
    pub fn apply(&mut self, event: FlowEvent) -> Option<Command> {
        match (self.state.clone(), event) {
            (FlowState::RoleSelection, FlowEvent::RoleSelected(role)) => {
                self.role = Some(role);
                self.answers = Some(WizardAnswerSet::new(role));
                self.state = FlowState::WizardQuestion { index: 0 };
                None
            }

            (FlowState::WizardQuestion { index }, FlowEvent::AnswerSubmitted(text)) => {
                let answers = self.answers.as_mut()?;
                // Empty input is rejected locally: no state change.
                answers.record(&text).ok()?;

                if index + 1 < WIZARD_QUESTION_COUNT {
                    self.state = FlowState::WizardQuestion { index: index + 1 };
                    None
                } else {
                    self.state = FlowState::Generating;
                    Some(Command::GenerateFromWizard {
                        role: answers.role(),
                        answers: answers.answers().to_vec(),
                    })
                }
            }

            (FlowState::WizardQuestion { .. }, FlowEvent::FinalizeRequested) => {
                // Retry path after a failed generation: all five answers
                // are already recorded.
                match self.answers.as_ref() {
                    Some(answers) if answers.is_complete() => {
                        self.state = FlowState::Generating;
                        Some(Command::GenerateFromWizard {
                            role: answers.role(),
                            answers: answers.answers().to_vec(),
                        })
                    }
                    _ => None,
                }
            }

            (FlowState::Conversation { pending: false }, FlowEvent::MessageSubmitted(text)) => {
                let role = self.role?;
                let text = text.trim().to_string();
                if text.is_empty() {
                    return None;
                }

                if self.history.len() >= self.turn_limit {
                    // Turn budget spent: this message rides along with
                    // finalization instead of producing another reply.
                    self.history.push_user(&text).ok()?;
                    self.state = FlowState::Generating;
                    Some(Command::GenerateFromHistory {
                        role,
                        transcript: self.history.flatten(),
                    })
                } else {
                    self.history.push_user(&text).ok()?;
                    self.state = FlowState::Conversation { pending: true };
                    Some(Command::SendMessage(text))
                }
            }

            // A send while a request is in flight is ignored outright.
            (FlowState::Conversation { pending: true }, FlowEvent::MessageSubmitted(_)) => None,

            (FlowState::Conversation { pending: true }, FlowEvent::ReplyReceived(text)) => {
                if !text.trim().is_empty() {
                    let _ = self.history.push_assistant(&text);
                }
                self.state = FlowState::Conversation { pending: false };
                None
            }

            (FlowState::Conversation { pending: true }, FlowEvent::TurnFailed) => {
                self.state = FlowState::Conversation { pending: false };
                None
            }

            (FlowState::Conversation { pending: false }, FlowEvent::FinalizeRequested) => {
                let role = self.role?;
                self.state = FlowState::Generating;
                Some(Command::GenerateFromHistory {
                    role,
                    transcript: self.history.flatten(),
                })
            }

            (FlowState::Generating, FlowEvent::GenerationSucceeded) => {
                self.state = FlowState::Terminated;
                None
            }

            (FlowState::Generating, FlowEvent::GenerationFailed) => {
                // Rewind to the last interactive state with all collected
                // material intact so the member can retry.
                self.state = match self.mode {
                    GeneratorMode::Wizard => FlowState::WizardQuestion {
                        index: WIZARD_QUESTION_COUNT - 1,
                    },
                    GeneratorMode::Chat => FlowState::Conversation { pending: false },
                };
                None
            }

            (FlowState::Terminated, _) => None,

            (_, FlowEvent::Cancelled) => {
                self.state = FlowState::Terminated;
                None
            }

            _ => None,
        }
    }
}
