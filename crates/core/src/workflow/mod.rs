pub mod controller;
pub mod engine;
pub mod states;

pub use controller::WorkflowController;
pub use engine::{SubmitBlockReason, WorkflowEngine, WorkflowTransitionError};
pub use states::{
    EventKind, StateKind, TransitionOutcome, WorkflowAction, WorkflowEvent, WorkflowState,
};
