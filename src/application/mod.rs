//! Application layer: the interview gateway and the async flow driver.

mod flow;
mod gateway;

pub use flow::{FlowUpdate, ProfileFlow};
pub use gateway::{GatewayError, InterviewGateway, InterviewSession, ProfileSource};
