//! # Gated Finite State Machine
//!
//! Wrap any host object in a finite state machine that decides which of its
//! methods may run. Every state lists the host methods it permits and the
//! states it may move to; calls and transitions outside those lists are
//! rejected instead of executed.
//!
//! ## Features
//!
//! - 🚦 **Method Gating**: Each registered host method is checked against the current state at call time
//! - 🔀 **Validated Transitions**: Moves between states follow an explicit transition table
//! - ⏳ **Uniform Deferred Results**: Calls and transitions both return a settled, awaitable [`Deferred`]
//! - 🧵 **Shared Machines**: Optional `tokio` mutex wrapper for multi-task hosts
//! - 📊 **PlantUML Export**: Render the state table as a diagram
//!
//! ## Quick Start
//!
//! ```rust
//! use gated_fsm::*;
//!
//! #[derive(Debug, Default)]
//! struct Document { body: String }
//!
//! # async fn example() -> FsmResult<(), &'static str> {
//! let mut doc = StateMachineBuilder::new(Document::default())
//!     .state(
//!         "draft",
//!         StateDefinition::new().allow_method("edit").allow_transition("published"),
//!     )
//!     .state("published", StateDefinition::new().allow_method("view"))
//!     .method("edit", |doc: &mut Document, text: &str| {
//!         doc.body.push_str(text);
//!         doc.body.len()
//!     })
//!     .method("view", |doc: &mut Document, _| doc.body.len())
//!     .build();
//!
//! // Nothing runs before the first transition.
//! assert!(doc.call("edit", "hello").await.is_err());
//!
//! doc.transition("draft").await?;
//! assert_eq!(doc.call("edit", "hello").await?, 5);
//!
//! doc.transition("published").await?;
//! assert_eq!(
//!     doc.call("edit", "!").await.unwrap_err().reason(),
//!     METHOD_NOT_ALLOWED,
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Any state in the table can be entered from the uninitialized machine.
//! Restricting the first transition to designated entry states is not
//! supported.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

mod builder;
mod deferred;
mod error;
mod fsm;
mod table;

#[cfg(feature = "plantuml")]
mod plantuml;

#[cfg(feature = "tokio-integration")]
mod shared;

pub use builder::StateMachineBuilder;
pub use deferred::Deferred;
pub use error::{FsmError, FsmResult, METHOD_NOT_ALLOWED, TRANSITION_NOT_ALLOWED};
pub use fsm::{HostMethod, StateMachine, Transition};
pub use table::{StateDefinition, StateTable};

#[cfg(feature = "tokio-integration")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio-integration")))]
pub use shared::SharedStateMachine;

pub mod prelude {
    //! Prelude module for convenient imports
    pub use crate::{
        Deferred, FsmError, FsmResult, StateDefinition, StateMachine, StateMachineBuilder, StateTable,
        Transition, METHOD_NOT_ALLOWED, TRANSITION_NOT_ALLOWED,
    };

    #[cfg(feature = "tokio-integration")]
    pub use crate::SharedStateMachine;
}
