//! State definitions and the state table

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// What a single state permits: which host methods may run and which states may follow.
///
/// Both lists keep insertion order and ignore duplicates. An empty
/// `allowed_methods` means no host method runs in this state; an empty
/// `allowed_transitions` makes the state terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDefinition<S> {
    allowed_methods: Vec<String>,
    allowed_transitions: Vec<S>,
}

impl<S> Default for StateDefinition<S> {
    fn default() -> Self {
        Self {
            allowed_methods: Vec::new(),
            allowed_transitions: Vec::new(),
        }
    }
}

impl<S: PartialEq> StateDefinition<S> {
    /// A state that allows nothing and is terminal
    pub fn new() -> Self {
        Self::default()
    }

    /// Permit the named host method in this state
    pub fn allow_method(mut self, method: impl Into<String>) -> Self {
        let method = method.into();
        if !self.allowed_methods.contains(&method) {
            self.allowed_methods.push(method);
        }
        self
    }

    /// Permit a transition from this state to `target`
    pub fn allow_transition(mut self, target: S) -> Self {
        if !self.allowed_transitions.contains(&target) {
            self.allowed_transitions.push(target);
        }
        self
    }

    /// Permit every method in `methods`
    pub fn with_methods<I, M>(self, methods: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        methods.into_iter().fold(self, Self::allow_method)
    }

    /// Permit a transition to every state in `targets`
    pub fn with_transitions<I>(self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        targets.into_iter().fold(self, Self::allow_transition)
    }

    /// Whether `method` may run in this state
    pub fn allows_method(&self, method: &str) -> bool {
        self.allowed_methods.iter().any(|m| m == method)
    }

    /// Whether `target` is reachable from this state
    pub fn allows_transition(&self, target: &S) -> bool {
        self.allowed_transitions.contains(target)
    }

    /// Methods permitted in this state
    pub fn allowed_methods(&self) -> &[String] {
        &self.allowed_methods
    }

    /// States reachable from this state
    pub fn allowed_transitions(&self) -> &[S] {
        &self.allowed_transitions
    }

    /// True when no transition leaves this state
    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions.is_empty()
    }
}

/// Mapping from state name to [`StateDefinition`], in insertion order.
///
/// The key set is exactly the set of valid states. References inside a
/// definition are not checked against it; a dangling name simply never
/// matches anything.
#[derive(Debug, Clone)]
pub struct StateTable<S> {
    order: Vec<S>,
    definitions: HashMap<S, StateDefinition<S>>,
}

impl<S> Default for StateTable<S> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            definitions: HashMap::new(),
        }
    }
}

impl<S> StateTable<S>
where
    S: Clone + Debug + Eq + Hash,
{
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a state, builder style
    pub fn state(mut self, state: S, definition: StateDefinition<S>) -> Self {
        self.insert(state, definition);
        self
    }

    /// Add or replace a state. A replaced state keeps its original position.
    pub fn insert(&mut self, state: S, definition: StateDefinition<S>) -> Option<StateDefinition<S>> {
        let previous = self.definitions.insert(state.clone(), definition);
        if previous.is_none() {
            self.order.push(state);
        }
        previous
    }

    /// Whether `state` is a key of this table
    pub fn contains(&self, state: &S) -> bool {
        self.definitions.contains_key(state)
    }

    /// Definition of `state`, if present
    pub fn get(&self, state: &S) -> Option<&StateDefinition<S>> {
        self.definitions.get(state)
    }

    /// State names in insertion order
    pub fn names(&self) -> &[S] {
        &self.order
    }

    /// Iterate `(state, definition)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&S, &StateDefinition<S>)> {
        self.order
            .iter()
            .filter_map(move |s| self.definitions.get(s).map(|d| (s, d)))
    }

    /// Number of states
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when the table has no states
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<S> FromIterator<(S, StateDefinition<S>)> for StateTable<S>
where
    S: Clone + Debug + Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (S, StateDefinition<S>)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (state, definition) in iter {
            table.insert(state, definition);
        }
        table
    }
}
