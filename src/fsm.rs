//! A finite state machine that gates the methods of a host object by state.
//!
//! # Type Parameters
//! - `S`: State identifier type. Must implement `Hash`, `Eq`, `Clone`, and `Debug`.
//! - `H`: The host object. Its fields stay reachable, ungated, through [`StateMachine::host`].
//! - `A`: Argument type shared by every registered host method.
//! - `R`: Return type shared by every registered host method.
//!
//! # Usage
//! 1. Describe each state with a [`StateDefinition`] and collect them in a [`StateTable`].
//! 2. Register the host's callable surface by name (see [`StateMachineBuilder::method`]).
//! 3. Enter a first state with [`StateMachine::transition`]; any state in the table is
//!    reachable from the uninitialized machine.
//! 4. Invoke host methods through [`StateMachine::call`].
//!
//! Every `call` and `transition` returns a [`Deferred`] that is already settled: the
//! state check, the state change and the wrapped method itself have all run by the time
//! it is returned.
//!
//! # Errors
//! Rejections are [`FsmError::MethodNotAllowed`] and [`FsmError::TransitionNotAllowed`]. Host
//! methods are never wrapped in error handling: their return value (including a
//! `Result`) resolves the deferred as-is, and a panic unwinds through `call`.
//!
//! # See Also
//! - [`StateMachineBuilder`]: the usual way to construct a machine.
//! - [`Deferred`]: the settled asynchronous result.
//!
//! [`StateMachineBuilder`]: crate::StateMachineBuilder
//! [`StateMachineBuilder::method`]: crate::StateMachineBuilder::method
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::hash::Hash;

use tracing::{debug, trace};

use crate::{Deferred, FsmError, StateDefinition, StateTable};

/// A registered host method: receives the host and the call arguments.
pub type HostMethod<H, A, R> = Box<dyn Fn(&mut H, A) -> R + Send + Sync>;

/// Payload of a successful transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<S> {
    /// State before the transition, `None` for the first one
    pub old_state: Option<S>,
    /// State after the transition
    pub new_state: S,
}

/// A host object wrapped in a state machine.
pub struct StateMachine<S, H, A, R>
where
    S: Hash + Eq + Clone + Debug,
{
    table: StateTable<S>,
    // Captured at construction; later edits to a cloned table are not seen here.
    state_names: Vec<S>,
    current_state: Option<S>,
    host: H,
    methods: HashMap<String, HostMethod<H, A, R>>,
}

impl<S, H, A, R> StateMachine<S, H, A, R>
where
    S: Hash + Eq + Clone + Debug,
{
    /// Wrap `host` with the given state table and its registered methods.
    ///
    /// The table is not checked for consistency. An empty table yields a machine
    /// that can never leave the uninitialized state.
    pub fn create(
        host: H,
        table: StateTable<S>,
        methods: HashMap<String, HostMethod<H, A, R>>,
    ) -> Self {
        let state_names = table.names().to_vec();
        debug!(
            states = ?state_names,
            methods = methods.len(),
            "state machine created"
        );
        Self {
            table,
            state_names,
            current_state: None,
            host,
            methods,
        }
    }

    /// The current state, `None` until the first successful transition
    pub fn current_state(&self) -> Option<&S> {
        self.current_state.as_ref()
    }

    /// Every state known to the table, in table order
    pub fn states(&self) -> &[S] {
        &self.state_names
    }

    /// The state table this machine was built with
    pub fn table(&self) -> &StateTable<S> {
        &self.table
    }

    /// Whether [`StateMachine::transition`] to `target` would succeed right now.
    ///
    /// The target must be a state of the table. From the uninitialized state
    /// that is enough; afterwards it must also be listed in the current
    /// state's allowed transitions.
    pub fn transition_allowed(&self, target: &S) -> bool {
        if !self.state_names.contains(target) {
            return false;
        }
        match &self.current_state {
            None => true,
            Some(current) => self
                .current_definition(current)
                .is_some_and(|def| def.allows_transition(target)),
        }
    }

    /// Move to `target` if allowed.
    ///
    /// Resolves with the old and new state. On rejection the current state is
    /// left unchanged.
    pub fn transition(&mut self, target: S) -> Deferred<Transition<S>, S> {
        if !self.transition_allowed(&target) {
            debug!(from = ?self.current_state, to = ?target, "transition rejected");
            return Deferred::rejected(FsmError::TransitionNotAllowed {
                from: self.current_state.clone(),
                to: target,
            });
        }

        let old_state = self.current_state.replace(target.clone());
        debug!(from = ?old_state, to = ?target, "transition");
        Deferred::resolved(Transition {
            old_state,
            new_state: target,
        })
    }

    /// Whether `method` is permitted in the current state.
    ///
    /// This is the gate [`StateMachine::call`] applies, without invoking anything.
    pub fn method_allowed(&self, method: &str) -> bool {
        self.current_state
            .as_ref()
            .and_then(|current| self.current_definition(current))
            .is_some_and(|def| def.allows_method(method))
    }

    /// Whether a host method is registered under `method`
    pub fn has_method(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    /// Registered method names, in no particular order
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Invoke the host method `method` with `args` if the current state permits it.
    ///
    /// The state is read at call time. When permitted, the method runs to
    /// completion before this returns and its value resolves the deferred.
    pub fn call(&mut self, method: &str, args: A) -> Deferred<R, S> {
        if !self.method_allowed(method) {
            debug!(method, state = ?self.current_state, "method rejected");
            return Deferred::rejected(self.method_not_allowed(method));
        }

        let Some(implementation) = self.methods.get(method) else {
            debug!(method, state = ?self.current_state, "method not registered");
            return Deferred::rejected(self.method_not_allowed(method));
        };

        trace!(method, state = ?self.current_state, "dispatching method");
        Deferred::resolved(implementation(&mut self.host, args))
    }

    /// Get a reference to the host object
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Get a mutable reference to the host object.
    ///
    /// Field access is not gated; only registered methods are.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Unwrap the machine and return the host object
    pub fn into_host(self) -> H {
        self.host
    }

    fn current_definition(&self, current: &S) -> Option<&StateDefinition<S>> {
        self.table.get(current)
    }

    fn method_not_allowed(&self, method: &str) -> FsmError<S> {
        FsmError::MethodNotAllowed {
            method: method.to_string(),
            state: self.current_state.clone(),
        }
    }

    /// Render the state table as a PlantUML state diagram
    #[cfg(feature = "plantuml")]
    #[cfg_attr(docsrs, doc(cfg(feature = "plantuml")))]
    pub fn export_plantuml(&self) -> String {
        crate::plantuml::generate_plantuml(&self.table, self.current_state.as_ref())
    }

    /// Stub for export_plantuml when feature is disabled
    #[cfg(not(feature = "plantuml"))]
    pub fn export_plantuml(&self) -> String {
        String::from("PlantUML export not available (requires 'plantuml' feature)")
    }
}

impl<S, H, A, R> Debug for StateMachine<S, H, A, R>
where
    S: Hash + Eq + Clone + Debug,
    H: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&str> = self.methods().collect();
        methods.sort_unstable();
        f.debug_struct("StateMachine")
            .field("current_state", &self.current_state)
            .field("states", &self.state_names)
            .field("methods", &methods)
            .field("host", &self.host)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StateMachineBuilder;
    use tokio_test::{assert_ready_err, assert_ready_ok, task};

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    enum TestState {
        Idle,
        Running,
        Paused,
        Stopped,
    }

    #[derive(Debug, Default)]
    struct Counter {
        value: i32,
        label: &'static str,
    }

    fn create_test_fsm() -> StateMachine<TestState, Counter, i32, i32> {
        StateMachineBuilder::new(Counter {
            value: 0,
            label: "counter",
        })
        .state(
            TestState::Idle,
            StateDefinition::new()
                .allow_method("read")
                .allow_transition(TestState::Running),
        )
        .state(
            TestState::Running,
            StateDefinition::new()
                .with_methods(["read", "add"])
                .with_transitions([TestState::Paused, TestState::Stopped]),
        )
        .state(
            TestState::Paused,
            StateDefinition::new()
                .allow_method("read")
                .with_transitions([TestState::Running, TestState::Stopped]),
        )
        .state(TestState::Stopped, StateDefinition::new())
        .method("read", |c: &mut Counter, _| c.value)
        .method("add", |c: &mut Counter, n: i32| {
            c.value += n;
            c.value
        })
        .build()
    }

    #[tokio::test]
    async fn test_initialization() {
        let fsm = create_test_fsm();
        assert_eq!(fsm.current_state(), None);
        assert_eq!(
            fsm.states(),
            [
                TestState::Idle,
                TestState::Running,
                TestState::Paused,
                TestState::Stopped
            ]
        );
        assert!(fsm.has_method("read"));
        assert!(fsm.has_method("add"));
        assert!(!fsm.method_allowed("read"));
    }

    #[tokio::test]
    async fn test_calls_rejected_before_first_transition() {
        let mut fsm = create_test_fsm();
        let err = fsm.call("read", 0).await.unwrap_err();
        assert_eq!(
            err,
            FsmError::MethodNotAllowed {
                method: "read".into(),
                state: None
            }
        );
        assert_eq!(fsm.host().value, 0);
    }

    #[tokio::test]
    async fn test_initial_transition_to_any_state() {
        for state in create_test_fsm().states().to_vec() {
            let mut fsm = create_test_fsm();
            assert!(fsm.transition_allowed(&state));
            let t = fsm.transition(state.clone()).await.unwrap();
            assert_eq!(t.old_state, None);
            assert_eq!(t.new_state, state);
            assert_eq!(fsm.current_state(), Some(&state));
        }
    }

    #[tokio::test]
    async fn test_basic_transitions() {
        let mut fsm = create_test_fsm();
        fsm.transition(TestState::Idle).await.unwrap();

        let t = fsm.transition(TestState::Running).await.unwrap();
        assert_eq!(
            t,
            Transition {
                old_state: Some(TestState::Idle),
                new_state: TestState::Running
            }
        );

        fsm.transition(TestState::Paused).await.unwrap();
        fsm.transition(TestState::Running).await.unwrap();
        fsm.transition(TestState::Stopped).await.unwrap();
        assert_eq!(fsm.current_state(), Some(&TestState::Stopped));
    }

    #[tokio::test]
    async fn test_rejected_transition_keeps_state() {
        let mut fsm = create_test_fsm();
        fsm.transition(TestState::Idle).await.unwrap();

        assert!(!fsm.transition_allowed(&TestState::Paused));
        let err = fsm.transition(TestState::Paused).await.unwrap_err();
        assert_eq!(
            err,
            FsmError::TransitionNotAllowed {
                from: Some(TestState::Idle),
                to: TestState::Paused
            }
        );
        assert_eq!(fsm.current_state(), Some(&TestState::Idle));
    }

    #[tokio::test]
    async fn test_self_transition_requires_edge() {
        let mut fsm = create_test_fsm();
        fsm.transition(TestState::Running).await.unwrap();
        assert!(fsm.transition(TestState::Running).await.is_err());
    }

    #[tokio::test]
    async fn test_terminal_state() {
        let mut fsm = create_test_fsm();
        fsm.transition(TestState::Stopped).await.unwrap();
        for state in fsm.states().to_vec() {
            assert!(!fsm.transition_allowed(&state));
        }
        assert!(fsm.call("read", 0).await.unwrap_err().is_method_not_allowed());
    }

    #[tokio::test]
    async fn test_method_gating_follows_state() {
        let mut fsm = create_test_fsm();
        fsm.transition(TestState::Idle).await.unwrap();
        assert!(fsm.call("add", 5).await.is_err());
        assert_eq!(fsm.call("read", 0).await.unwrap(), 0);

        fsm.transition(TestState::Running).await.unwrap();
        assert_eq!(fsm.call("add", 5).await.unwrap(), 5);
        assert_eq!(fsm.call("add", 2).await.unwrap(), 7);

        fsm.transition(TestState::Paused).await.unwrap();
        assert!(fsm.call("add", 100).await.is_err());
        assert_eq!(fsm.call("read", 0).await.unwrap(), 7);
        assert_eq!(fsm.host().value, 7);
    }

    #[tokio::test]
    async fn test_unregistered_method_is_rejected() {
        let mut fsm: StateMachine<&str, (), (), ()> = StateMachineBuilder::new(())
            .state("only", StateDefinition::new().allow_method("ghost"))
            .build();
        fsm.transition("only").await.unwrap();

        assert!(fsm.method_allowed("ghost"));
        assert!(!fsm.has_method("ghost"));
        let err = fsm.call("ghost", ()).await.unwrap_err();
        assert_eq!(err.reason(), crate::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_deferreds_settle_before_poll() {
        let mut fsm = create_test_fsm();

        let rejected = fsm.call("read", 0);
        assert!(rejected.is_rejected());

        let transition = fsm.transition(TestState::Running);
        // The state changed before anything was polled.
        assert_eq!(fsm.current_state(), Some(&TestState::Running));
        assert_ready_ok!(task::spawn(transition).poll());

        let added = fsm.call("add", 3);
        assert_eq!(fsm.host().value, 3);
        assert_eq!(assert_ready_ok!(task::spawn(added).poll()), 3);

        assert_ready_err!(task::spawn(rejected).poll());
    }

    #[tokio::test]
    async fn test_queries_have_no_side_effects() {
        let mut fsm = create_test_fsm();
        for _ in 0..5 {
            let _ = fsm.current_state();
            let _ = fsm.states();
            let _ = fsm.transition_allowed(&TestState::Paused);
            let _ = fsm.method_allowed("add");
        }
        assert_eq!(fsm.current_state(), None);
        fsm.transition(TestState::Running).await.unwrap();
        for _ in 0..5 {
            let _ = fsm.current_state();
            let _ = fsm.states();
        }
        assert_eq!(fsm.call("add", 1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_host_fields_are_not_gated() {
        let mut fsm = create_test_fsm();
        assert_eq!(fsm.host().label, "counter");
        fsm.host_mut().value = 40;
        fsm.transition(TestState::Running).await.unwrap();
        assert_eq!(fsm.call("add", 2).await.unwrap(), 42);

        let host = fsm.into_host();
        assert_eq!(host.value, 42);
        assert_eq!(host.label, "counter");
    }

    #[tokio::test]
    async fn test_empty_table_never_initializes() {
        let mut fsm: StateMachine<&str, Counter, i32, i32> =
            StateMachineBuilder::new(Counter::default())
                .method("read", |c: &mut Counter, _| c.value)
                .build();
        assert!(fsm.states().is_empty());
        assert!(!fsm.transition_allowed(&"anything"));
        assert!(fsm.transition("anything").await.is_err());
        assert_eq!(fsm.current_state(), None);
        assert!(fsm.call("read", 0).await.is_err());
    }

    #[tokio::test]
    async fn test_dangling_transition_target_rejected() {
        let mut fsm: StateMachine<&str, (), (), ()> = StateMachineBuilder::new(())
            .state(
                "a",
                StateDefinition::new()
                    .allow_method("any")
                    .with_transitions(["missing", "b"]),
            )
            .state("b", StateDefinition::new())
            .build();
        fsm.transition("a").await.unwrap();

        // Listed as an edge but not a state of the table.
        assert!(!fsm.transition_allowed(&"missing"));
        let err = fsm.transition("missing").await.unwrap_err();
        assert_eq!(
            err,
            FsmError::TransitionNotAllowed {
                from: Some("a"),
                to: "missing"
            }
        );
        assert_eq!(fsm.current_state(), Some(&"a"));
        assert!(fsm.method_allowed("any"));

        fsm.transition("b").await.unwrap();
        for state in fsm.states() {
            assert!(fsm.table().contains(state));
        }
        assert!(fsm.table().contains(fsm.current_state().unwrap()));
    }

    #[test]
    fn test_debug_lists_sorted_methods() {
        let fsm = create_test_fsm();
        let out = format!("{:?}", fsm);
        assert!(out.contains("methods: [\"add\", \"read\"]"));
        assert!(out.contains("current_state: None"));
    }

    #[cfg(not(feature = "plantuml"))]
    #[test]
    fn test_plantuml_disabled() {
        let fsm = create_test_fsm();
        assert!(fsm.export_plantuml().contains("not available"));
    }
}
