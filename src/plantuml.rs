//! PlantUML diagram generation

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::StateTable;

/// Generate a PlantUML state diagram from a state table.
///
/// States are declared as `state "label" as S<n>` in table order, so string
/// ids render without quotes and any label is a valid PlantUML name. Every
/// state gets an entry arrow from `[*]` since any of them can be the first.
/// Edges to names missing from the table can never be taken and are left out.
pub fn generate_plantuml<S>(table: &StateTable<S>, current_state: Option<&S>) -> String
where
    S: Clone + Debug + Eq + Hash,
{
    let ids: HashMap<&S, String> = table
        .names()
        .iter()
        .enumerate()
        .map(|(i, state)| (state, format!("S{}", i)))
        .collect();

    let mut plantuml = String::new();
    plantuml.push_str("@startuml\n");
    plantuml.push_str("skinparam state {\n");
    plantuml.push_str("  BackgroundColor<<Current>> YellowGreen\n");
    plantuml.push_str("}\n\n");

    for state in table.names() {
        let stereotype = if current_state == Some(state) {
            " <<Current>>"
        } else {
            ""
        };
        plantuml.push_str(&format!(
            "state \"{}\" as {}{}\n",
            state_label(state),
            ids[state],
            stereotype
        ));
    }
    plantuml.push('\n');

    for state in table.names() {
        plantuml.push_str(&format!("[*] --> {}\n", ids[state]));
    }

    for (from, definition) in table.iter() {
        for to in definition.allowed_transitions() {
            if let Some(to_id) = ids.get(to) {
                plantuml.push_str(&format!("{} --> {}\n", ids[from], to_id));
            }
        }
    }

    // Allowed methods as notes
    for (state, definition) in table.iter() {
        if !definition.allowed_methods().is_empty() {
            plantuml.push_str(&format!(
                "note right of {} : {}\n",
                ids[state],
                definition.allowed_methods().join(", ")
            ));
        }
    }

    plantuml.push_str("@enduml\n");
    plantuml
}

// Debug output of a state id, without the quotes string ids carry.
fn state_label<S: Debug>(state: &S) -> String {
    let label = format!("{:?}", state);
    let unquoted = label
        .strip_prefix('"')
        .and_then(|l| l.strip_suffix('"'))
        .unwrap_or(&label);
    unquoted.replace("\\\"", "'").replace('"', "'")
}
