//! Ports: trait boundaries between the domain and external collaborators.

mod completion_provider;

pub use completion_provider::{
    CompletionError, CompletionProvider, CompletionRequest, CompletionResponse, Message,
    MessageRole, ProviderInfo, TokenUsage,
};
