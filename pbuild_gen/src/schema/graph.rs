use crate::schema::model::MessageSchema;
use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

#[cfg(feature = "graph_trace")]
fn trace_log(msg: impl AsRef<str>) {
    eprintln!("[reference_graph] {}", msg.as_ref());
}

#[cfg(not(feature = "graph_trace"))]
fn trace_log(_msg: impl AsRef<str>) {}

/// Embedded-message references between the schemas of one file, in
/// declaration order.
#[derive(Debug)]
pub struct ReferenceGraph {
    nodes: IndexMap<String, ReferenceNode>,
}

#[derive(Debug, Clone)]
pub struct ReferenceNode {
    pub id: usize,
    pub ident: String,
    pub edges: Vec<ReferenceEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEdge {
    pub to: String,
    /// Some singular `required` field forces an instance of `to`.
    pub required: bool,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReferenceGraphError {
    #[error("required references form a cycle: {0:?}")]
    UnboundedRecursion(Vec<String>),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Active,
    Done,
}

impl ReferenceGraph {
    pub fn build(schemas: &[&MessageSchema]) -> Self {
        let mut nodes = IndexMap::new();
        for (idx, schema) in schemas.iter().enumerate() {
            let mut edges: Vec<ReferenceEdge> = Vec::new();
            for field in &schema.fields {
                let Some(target) = &field.message_ref else {
                    continue;
                };
                let required = field.required && !field.repetition.appends();
                match edges.iter_mut().find(|edge| &edge.to == target) {
                    Some(edge) => edge.required |= required,
                    None => edges.push(ReferenceEdge {
                        to: target.clone(),
                        required,
                    }),
                }
            }
            nodes.insert(
                schema.ident.clone(),
                ReferenceNode {
                    id: idx,
                    ident: schema.ident.clone(),
                    edges,
                },
            );
        }
        Self { nodes }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ReferenceNode> {
        self.nodes.values()
    }

    /// Edges that close a cycle when the graph is walked depth-first in
    /// declaration order. Removing them leaves a DAG, so nested Builders on
    /// every other edge can be constructed eagerly.
    pub fn back_edges(&self) -> BTreeSet<(String, String)> {
        let mut state: BTreeMap<&str, Visit> = BTreeMap::new();
        let mut back = BTreeSet::new();
        for ident in self.nodes.keys() {
            if !state.contains_key(ident.as_str()) {
                self.visit(ident, &mut state, &mut back);
            }
        }
        back
    }

    fn visit<'a>(
        &'a self,
        ident: &'a str,
        state: &mut BTreeMap<&'a str, Visit>,
        back: &mut BTreeSet<(String, String)>,
    ) {
        state.insert(ident, Visit::Active);
        if let Some(node) = self.nodes.get(ident) {
            for edge in &node.edges {
                match state.get(edge.to.as_str()).copied() {
                    Some(Visit::Active) => {
                        trace_log(format!("back edge {ident} -> {}", edge.to));
                        back.insert((ident.to_string(), edge.to.clone()));
                    }
                    Some(Visit::Done) => {}
                    None => self.visit(&edge.to, state, back),
                }
            }
        }
        state.insert(ident, Visit::Done);
    }

    /// Fails when required references alone form a cycle: no finite message
    /// can satisfy such a schema. Uses Kahn's algorithm over required edges.
    pub fn check_base_case(&self) -> Result<(), ReferenceGraphError> {
        let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
        let mut adjacency: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        let mut predecessors: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

        for (ident, node) in &self.nodes {
            in_degree.entry(ident.as_str()).or_insert(0);
            for edge in node.edges.iter().filter(|edge| edge.required) {
                if !self.nodes.contains_key(&edge.to) {
                    continue;
                }
                adjacency.entry(ident.as_str()).or_default().push(edge.to.as_str());
                predecessors.entry(edge.to.as_str()).or_default().push(ident.as_str());
                *in_degree.entry(edge.to.as_str()).or_insert(0) += 1;
            }
        }

        let mut queue: VecDeque<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(ident, _)| *ident)
            .collect();
        let mut processed = 0usize;

        while let Some(ident) = queue.pop_front() {
            trace_log(format!("processing node {ident}"));
            processed += 1;
            for child in adjacency.get(ident).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(child) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        queue.push_back(*child);
                    }
                }
            }
        }

        if processed == in_degree.len() {
            return Ok(());
        }

        let remaining: BTreeSet<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree > 0)
            .map(|(ident, _)| *ident)
            .collect();
        Err(ReferenceGraphError::UnboundedRecursion(extract_cycle(
            &remaining,
            &predecessors,
        )))
    }
}

/* Every node left over by Kahn's algorithm has a predecessor that is also
   left over, so walking predecessors must revisit a node. */
fn extract_cycle(remaining: &BTreeSet<&str>, predecessors: &BTreeMap<&str, Vec<&str>>) -> Vec<String> {
    let Some(start) = remaining.iter().next() else {
        return Vec::new();
    };
    let mut seen: Vec<&str> = Vec::new();
    let mut current = *start;
    loop {
        if let Some(pos) = seen.iter().position(|ident| *ident == current) {
            let mut cycle: Vec<String> = seen[pos..].iter().rev().map(|s| s.to_string()).collect();
            cycle.push(cycle[0].clone());
            return cycle;
        }
        seen.push(current);
        let next = predecessors
            .get(current)
            .and_then(|preds| preds.iter().find(|pred| remaining.contains(*pred)));
        match next {
            Some(pred) => current = *pred,
            None => return seen.iter().map(|s| s.to_string()).collect(),
        }
    }
}
