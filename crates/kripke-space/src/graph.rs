//! Directed multigraph over state and operation identifiers
//!
//! Only directed-multigraph-with-named-edges semantics are needed, so the
//! structure is an explicit pair of adjacency maps rather than a general
//! graph library: operation id to (source, destination), and state id to
//! incident operation ids. Multiple edges may share endpoints, but an
//! operation id names exactly one edge.

use rustc_hash::{FxHashMap, FxHashSet};

/// The state space's underlying graph: vertices are state ids, edges are
/// operation ids
#[derive(Debug, Clone, Default)]
pub struct StateGraph {
    vertices: FxHashSet<String>,
    edges: FxHashMap<String, (String, String)>,
    out: FxHashMap<String, Vec<String>>,
    in_: FxHashMap<String, Vec<String>>,
}

impl StateGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a vertex; returns whether it was new
    pub fn add_vertex(&mut self, state_id: impl Into<String>) -> bool {
        self.vertices.insert(state_id.into())
    }

    pub fn contains_vertex(&self, state_id: &str) -> bool {
        self.vertices.contains(state_id)
    }

    pub fn contains_edge(&self, op_id: &str) -> bool {
        self.edges.contains_key(op_id)
    }

    /// Insert an edge, adding missing endpoint vertices.
    ///
    /// A no-op returning `false` when `op_id` already names an edge,
    /// regardless of the endpoints supplied on the second attempt.
    pub fn add_edge(
        &mut self,
        op_id: impl Into<String>,
        src: impl Into<String>,
        dst: impl Into<String>,
    ) -> bool {
        let op_id = op_id.into();
        if self.edges.contains_key(&op_id) {
            return false;
        }
        let src = src.into();
        let dst = dst.into();
        self.vertices.insert(src.clone());
        self.vertices.insert(dst.clone());
        self.out.entry(src.clone()).or_default().push(op_id.clone());
        self.in_.entry(dst.clone()).or_default().push(op_id.clone());
        self.edges.insert(op_id, (src, dst));
        true
    }

    /// Outgoing operation ids of a state, in insertion order
    pub fn out_edges(&self, state_id: &str) -> &[String] {
        self.out.get(state_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Incoming operation ids of a state, in insertion order
    pub fn in_edges(&self, state_id: &str) -> &[String] {
        self.in_.get(state_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// The (source, destination) pair of an edge
    pub fn endpoints(&self, op_id: &str) -> Option<(&str, &str)> {
        self.edges
            .get(op_id)
            .map(|(src, dst)| (src.as_str(), dst.as_str()))
    }

    pub fn source(&self, op_id: &str) -> Option<&str> {
        self.endpoints(op_id).map(|(src, _)| src)
    }

    pub fn dest(&self, op_id: &str) -> Option<&str> {
        self.endpoints(op_id).map(|(_, dst)| dst)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertices(&self) -> impl Iterator<Item = &str> {
        self.vertices.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_add_missing_vertices() {
        let mut graph = StateGraph::new();
        assert!(graph.add_edge("1", "root", "s1"));
        assert!(graph.contains_vertex("root"));
        assert!(graph.contains_vertex("s1"));
        assert_eq!(graph.out_edges("root"), &["1".to_string()]);
        assert_eq!(graph.in_edges("s1"), &["1".to_string()]);
        assert_eq!(graph.endpoints("1"), Some(("root", "s1")));
    }

    #[test]
    fn duplicate_edge_id_is_a_no_op() {
        let mut graph = StateGraph::new();
        assert!(graph.add_edge("1", "root", "s1"));
        // second insert with different endpoints must change nothing
        assert!(!graph.add_edge("1", "s1", "s2"));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.endpoints("1"), Some(("root", "s1")));
        assert!(!graph.contains_vertex("s2"));
    }

    #[test]
    fn parallel_edges_share_endpoints() {
        let mut graph = StateGraph::new();
        graph.add_edge("1", "root", "s1");
        graph.add_edge("2", "root", "s1");
        assert_eq!(graph.out_edges("root").len(), 2);
        assert_eq!(graph.in_edges("s1").len(), 2);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.vertex_count(), 2);
    }

    #[test]
    fn self_loops_are_edges_like_any_other() {
        let mut graph = StateGraph::new();
        graph.add_edge("7", "s1", "s1");
        assert_eq!(graph.out_edges("s1"), graph.in_edges("s1"));
        assert_eq!(graph.endpoints("7"), Some(("s1", "s1")));
    }

    #[test]
    fn unknown_states_have_no_edges() {
        let graph = StateGraph::new();
        assert!(graph.out_edges("nowhere").is_empty());
        assert!(graph.in_edges("nowhere").is_empty());
        assert_eq!(graph.endpoints("1"), None);
    }
}
