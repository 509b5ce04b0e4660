//! A state machine shared between tasks

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::{FsmResult, StateMachine, Transition};

/// Cloneable handle to a [`StateMachine`] behind an async mutex.
///
/// Each operation holds the lock for its whole check-and-act step, so the
/// read-modify-write of the current state in [`SharedStateMachine::transition`]
/// cannot interleave with another task's call.
pub struct SharedStateMachine<S, H, A, R>
where
    S: Hash + Eq + Clone + Debug,
{
    inner: Arc<Mutex<StateMachine<S, H, A, R>>>,
}

impl<S, H, A, R> Clone for SharedStateMachine<S, H, A, R>
where
    S: Hash + Eq + Clone + Debug,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, H, A, R> From<StateMachine<S, H, A, R>> for SharedStateMachine<S, H, A, R>
where
    S: Hash + Eq + Clone + Debug,
{
    fn from(machine: StateMachine<S, H, A, R>) -> Self {
        Self::new(machine)
    }
}

impl<S, H, A, R> SharedStateMachine<S, H, A, R>
where
    S: Hash + Eq + Clone + Debug,
{
    /// Take ownership of `machine` and share it
    pub fn new(machine: StateMachine<S, H, A, R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(machine)),
        }
    }

    /// See [`StateMachine::call`]
    pub async fn call(&self, method: &str, args: A) -> FsmResult<R, S> {
        self.inner.lock().await.call(method, args).into_result()
    }

    /// See [`StateMachine::transition`]
    pub async fn transition(&self, target: S) -> FsmResult<Transition<S>, S> {
        self.inner.lock().await.transition(target).into_result()
    }

    /// See [`StateMachine::transition_allowed`]
    pub async fn transition_allowed(&self, target: &S) -> bool {
        self.inner.lock().await.transition_allowed(target)
    }

    /// See [`StateMachine::current_state`]
    pub async fn current_state(&self) -> Option<S> {
        self.inner.lock().await.current_state().cloned()
    }

    /// See [`StateMachine::states`]
    pub async fn states(&self) -> Vec<S> {
        self.inner.lock().await.states().to_vec()
    }

    /// Lock the machine for a sequence of operations
    pub async fn lock(&self) -> MutexGuard<'_, StateMachine<S, H, A, R>> {
        self.inner.lock().await
    }
}
