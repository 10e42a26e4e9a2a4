//! Derived views of a [`Poset`]: its Hasse diagram, one linear extension and
//! a serializable snapshot.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::error::PosetError;
use crate::id::ElementId;
use crate::poset::Poset;

/// Covering pairs `(a, b)`: `a < b` with nothing strictly in between.
///
/// Pairs are listed by insertion order of `a`, then of `b`.
pub fn covers(poset: &Poset) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for (a, x) in poset.entries() {
        for (b, y) in poset.entries() {
            if x == y || !poset.leq(x, y) {
                continue;
            }
            let between = poset.above(x).any(|m| m != y && poset.leq(m, y));
            if !between {
                out.push((a.to_string(), b.to_string()));
            }
        }
    }
    out
}

/// One deterministic topological order: every `a <= b` lists `a` first.
pub fn linear_extension(poset: &Poset) -> Result<Vec<String>, PosetError> {
    // One node per element, in insertion order
    let mut g: DiGraph<&str, ()> = DiGraph::new();
    let mut nodes: HashMap<ElementId, NodeIndex> = HashMap::with_capacity(poset.len());
    for (name, id) in poset.entries() {
        nodes.insert(id, g.add_node(name));
    }

    for (_, x) in poset.entries() {
        for y in poset.above(x) {
            if let (Some(&u), Some(&v)) = (nodes.get(&x), nodes.get(&y)) {
                g.add_edge(u, v, ());
            }
        }
    }

    match toposort(&g, None) {
        Ok(order) => Ok(order.into_iter().map(|ix| g[ix].to_string()).collect()),
        Err(cycle) => Err(PosetError::InvariantViolated(format!(
            "cycle through {:?}",
            g[cycle.node_id()]
        ))),
    }
}

/// Plain-data picture of a poset: its elements and every strict pair of the
/// closed relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosetSnapshot {
    pub elements: Vec<String>,
    pub relations: Vec<(String, String)>,
}

pub fn snapshot(poset: &Poset) -> PosetSnapshot {
    let elements = poset.elements().map(str::to_string).collect();
    let mut relations = Vec::new();
    for (a, x) in poset.entries() {
        for (b, y) in poset.entries() {
            if x != y && poset.leq(x, y) {
                relations.push((a.to_string(), b.to_string()));
            }
        }
    }
    PosetSnapshot { elements, relations }
}
