//! Document workflow example
//!
//! A document moves through three states:
//! - Draft: the text can be edited
//! - Review: the text can be read and approved, or sent back to Draft
//! - Published: the text can only be read
//!
//! The example shows:
//! - Method gating by state
//! - Rejected transitions leaving the state untouched
//! - Sharing one machine between tasks
//! - PlantUML export of the state table
//!
//! Run with `RUST_LOG=gated_fsm=trace cargo run --example document_workflow`
//! to see the gate decisions.

use gated_fsm::{SharedStateMachine, StateDefinition, StateMachine, StateMachineBuilder};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DocState {
    Draft,
    Review,
    Published,
}

#[derive(Debug)]
enum Op {
    Append(String),
    Read,
    Approve(&'static str),
}

#[derive(Debug, Default)]
struct Document {
    body: String,
    approvals: Vec<&'static str>,
}

fn create_document_fsm() -> StateMachine<DocState, Document, Op, String> {
    StateMachineBuilder::new(Document::default())
        .state(
            DocState::Draft,
            StateDefinition::new()
                .allow_method("append")
                .allow_transition(DocState::Review),
        )
        .state(
            DocState::Review,
            StateDefinition::new()
                .with_methods(["read", "approve"])
                .with_transitions([DocState::Draft, DocState::Published]),
        )
        .state(
            DocState::Published,
            StateDefinition::new().allow_method("read"),
        )
        .method("append", |doc: &mut Document, op: Op| {
            if let Op::Append(text) = op {
                doc.body.push_str(&text);
            }
            doc.body.clone()
        })
        .method("read", |doc: &mut Document, _| doc.body.clone())
        .method("approve", |doc: &mut Document, op: Op| {
            if let Op::Approve(reviewer) = op {
                doc.approvals.push(reviewer);
            }
            doc.approvals.join(", ")
        })
        .build()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("📄 Document Workflow Example");
    println!("============================\n");

    let mut doc = create_document_fsm();
    println!("States: {:?}", doc.states());
    println!("Current: {:?}\n", doc.current_state());

    if let Err(e) = doc.call("read", Op::Read).await {
        println!("❌ read before any state: {}", e);
    }

    doc.transition(DocState::Draft).await?;
    doc.call("append", Op::Append("Hello".into())).await?;
    let body = doc.call("append", Op::Append(", world".into())).await?;
    println!("✏️  Draft body: {:?}", body);

    if let Err(e) = doc.transition(DocState::Published).await {
        println!("❌ skip review: {}", e);
    }
    println!("   Still in {:?}", doc.current_state());

    let t = doc.transition(DocState::Review).await?;
    println!("🔀 {:?} -> {:?}", t.old_state, t.new_state);

    if let Err(e) = doc.call("append", Op::Append("!".into())).await {
        println!("❌ edit during review: {}", e);
    }

    // Reviewers approve concurrently through a shared handle.
    let shared = SharedStateMachine::from(doc);
    let reviewers = ["alice", "bob", "carol"].map(|name| {
        let shared = shared.clone();
        tokio::spawn(async move { shared.call("approve", Op::Approve(name)).await })
    });
    for reviewer in reviewers {
        reviewer.await??;
    }

    shared.transition(DocState::Published).await?;
    println!(
        "✅ Published: {:?}",
        shared.call("read", Op::Read).await?
    );

    let doc = shared.lock().await;
    println!("   Approvals: {:?}", doc.host().approvals);

    println!("\n📊 State Diagram:");
    println!("{}", doc.export_plantuml());

    Ok(())
}
