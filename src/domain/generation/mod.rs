//! Profile generation flow: wizard questions, conversation transcript,
//! prompt builders, and the pure flow state machine.

mod prompts;
mod state;
mod transcript;
mod wizard;

pub use prompts::{
    history_generation_prompt, interviewer_instruction, wizard_generation_prompt, FALLBACK_REPLY,
    OPENING_PROBE_FRESH, OPENING_PROBE_SEEDED,
};
pub use state::{Command, FlowEvent, FlowMachine, FlowState, GeneratorMode, CHAT_TURN_LIMIT};
pub use transcript::{ConversationHistory, Speaker, Turn};
pub use wizard::{questions_for, WizardAnswerSet, WIZARD_QUESTION_COUNT};
