//! Builder pattern implementation for state machines

use crate::{HostMethod, StateDefinition, StateMachine, StateTable};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Builder for constructing state machines
pub struct StateMachineBuilder<S, H, A, R>
where
    S: Clone + Debug + Eq + Hash,
{
    host: H,
    table: StateTable<S>,
    methods: HashMap<String, HostMethod<H, A, R>>,
}

impl<S, H, A, R> StateMachineBuilder<S, H, A, R>
where
    S: Clone + Debug + Eq + Hash,
{
    /// Create a new builder around the given host object
    pub fn new(host: H) -> Self {
        Self {
            host,
            table: StateTable::new(),
            methods: HashMap::new(),
        }
    }

    /// Add a state to the state table
    pub fn state(mut self, state_id: S, definition: StateDefinition<S>) -> Self {
        self.table.insert(state_id, definition);
        self
    }

    /// Add every state of `table`, after any states added so far
    pub fn table(mut self, table: StateTable<S>) -> Self {
        for (state_id, definition) in table.iter() {
            self.table.insert(state_id.clone(), definition.clone());
        }
        self
    }

    /// Register a host method under `name`. A later registration with the same name wins.
    pub fn method<F>(mut self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut H, A) -> R + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Box::new(func));
        self
    }

    /// Build the state machine
    pub fn build(self) -> StateMachine<S, H, A, R> {
        StateMachine::create(self.host, self.table, self.methods)
    }
}
