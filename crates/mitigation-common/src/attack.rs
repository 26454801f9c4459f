use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::alert::Alert;
use crate::primitive::Primitive;

/// Either a raw alert bound to a node, or a constant carried along for
/// downstream binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Alert(Alert),
    Primitive(Primitive),
}

/// A live instance of an attack graph actively being tracked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attack {
    pub id: i64,
    /// Identifies the attack graph this Attack instantiates, by the graph's
    /// initial node id.
    pub attack_graph: i64,
    /// The next attack node expected to be triggered.
    pub attack_front: i64,
    /// Keyed by the node id that triggered the entry, or by a constant name.
    pub context: HashMap<String, ContextValue>,
    pub is_complete: bool,
}
