//! The settled asynchronous result returned by every gated operation

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::FsmError;

/// An already-settled asynchronous result.
///
/// The state check and any wrapped call have finished by the time a
/// `Deferred` exists, so it is either resolved with a value or rejected
/// with an [`FsmError`]. Awaiting it completes on the first poll; it can also
/// be inspected without an executor.
#[must_use = "a rejected Deferred is silently dropped unless inspected or awaited"]
#[derive(Debug)]
pub struct Deferred<T, S: Debug> {
    outcome: Option<Result<T, FsmError<S>>>,
}

impl<T, S: Debug> Deferred<T, S> {
    /// A deferred resolved with `value`
    pub fn resolved(value: T) -> Self {
        Self {
            outcome: Some(Ok(value)),
        }
    }

    /// A deferred rejected with `error`
    pub fn rejected(error: FsmError<S>) -> Self {
        Self {
            outcome: Some(Err(error)),
        }
    }

    /// True if resolved with a value
    pub fn is_resolved(&self) -> bool {
        matches!(self.outcome, Some(Ok(_)))
    }

    /// True if rejected with an [`FsmError`]
    pub fn is_rejected(&self) -> bool {
        matches!(self.outcome, Some(Err(_)))
    }

    /// Borrow the outcome. `None` only after the deferred has been awaited.
    pub fn as_result(&self) -> Option<&Result<T, FsmError<S>>> {
        self.outcome.as_ref()
    }

    /// Take the outcome without going through an executor.
    ///
    /// # Panics
    /// If the deferred was already polled to completion.
    pub fn into_result(self) -> Result<T, FsmError<S>> {
        self.outcome
            .expect("Deferred outcome already taken by a completed poll")
    }
}

impl<T, S: Debug> From<Result<T, FsmError<S>>> for Deferred<T, S> {
    fn from(outcome: Result<T, FsmError<S>>) -> Self {
        Self {
            outcome: Some(outcome),
        }
    }
}

// Never pinned structurally; the outcome is moved out on completion.
impl<T, S: Debug> Unpin for Deferred<T, S> {}

impl<T, S: Debug> Future for Deferred<T, S> {
    type Output = Result<T, FsmError<S>>;

    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        Poll::Ready(
            self.outcome
                .take()
                .expect("Deferred polled after completion"),
        )
    }
}
