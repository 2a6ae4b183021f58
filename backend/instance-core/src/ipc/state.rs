use serde::Serialize;

/// Lifecycle of the activation accept loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ActivationLoopState {
    #[default]
    NotStarted,
    Listening,
    Cancelling,
    Stopped,
}

impl ActivationLoopState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ActivationLoopState::Stopped)
    }
}
