//! Error types for the state machine

use std::fmt::Debug;
use thiserror::Error;

/// Rejection reason carried by a gated method call that the current state does not permit.
pub const METHOD_NOT_ALLOWED: &str = "method not allowed";

/// Rejection reason carried by a transition the current state does not permit.
pub const TRANSITION_NOT_ALLOWED: &str = "transition not allowed";

/// Result type alias for state machine operations
pub type FsmResult<T, S> = std::result::Result<T, FsmError<S>>;

/// Policy rejections produced by the state machine.
///
/// These are the only two failures the machine itself raises. Whatever a
/// host method returns (including its own `Result`) is passed through as the
/// resolved value untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsmError<S: Debug> {
    /// The method was called while uninitialized, in a state that does not list it,
    /// or under a name that was never registered.
    #[error("method not allowed: `{method}` in state {state:?}")]
    MethodNotAllowed {
        /// Name the caller tried to invoke
        method: String,
        /// State at call time, `None` before the first transition
        state: Option<S>,
    },

    /// The target is not reachable from the current state.
    #[error("transition not allowed: {from:?} -> {to:?}")]
    TransitionNotAllowed {
        /// State at call time, `None` before the first transition
        from: Option<S>,
        /// Requested target
        to: S,
    },
}

impl<S: Debug> FsmError<S> {
    /// The sentinel reason string, [`METHOD_NOT_ALLOWED`] or [`TRANSITION_NOT_ALLOWED`].
    pub fn reason(&self) -> &'static str {
        match self {
            FsmError::MethodNotAllowed { .. } => METHOD_NOT_ALLOWED,
            FsmError::TransitionNotAllowed { .. } => TRANSITION_NOT_ALLOWED,
        }
    }

    /// True for [`FsmError::MethodNotAllowed`].
    pub fn is_method_not_allowed(&self) -> bool {
        matches!(self, FsmError::MethodNotAllowed { .. })
    }

    /// True for [`FsmError::TransitionNotAllowed`].
    pub fn is_transition_not_allowed(&self) -> bool {
        matches!(self, FsmError::TransitionNotAllowed { .. })
    }
}
