//! Causal DAG over named variables.
//!
//! Built from a [`CausalSpec`]: every common cause points at both treatment
//! and outcome, every instrument points at the treatment, and the treatment
//! points at the outcome. Arbitrary DAGs can also be built from an edge list
//! (used for structural tests of d-separation).

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use cc_core::{Error, Result};
use petgraph::Direction;
use petgraph::algo::{has_path_connecting, is_cyclic_directed};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, Reversed};
use serde::{Deserialize, Serialize};

/// Treatment / outcome / confounder declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CausalSpec {
    /// Treatment variable.
    pub treatment: String,
    /// Outcome variable.
    pub outcome: String,
    /// Observed confounders of treatment and outcome.
    pub common_causes: Vec<String>,
    /// Variables that affect the outcome only through the treatment.
    pub instruments: Vec<String>,
}

impl Default for CausalSpec {
    fn default() -> Self {
        Self {
            treatment: "Contract".into(),
            outcome: "Churn".into(),
            common_causes: vec!["tenure".into(), "MonthlyCharges".into(), "InternetService".into()],
            instruments: Vec::new(),
        }
    }
}

impl CausalSpec {
    /// All variables in declaration order: treatment, outcome, common causes, instruments.
    pub fn variables(&self) -> Vec<&str> {
        let mut v = vec![self.treatment.as_str(), self.outcome.as_str()];
        v.extend(self.common_causes.iter().map(String::as_str));
        v.extend(self.instruments.iter().map(String::as_str));
        v
    }

    /// Check that treatment and outcome differ and no variable is declared twice.
    pub fn validate(&self) -> Result<()> {
        if self.treatment.is_empty() || self.outcome.is_empty() {
            return Err(Error::Validation("treatment and outcome must be named".into()));
        }
        if self.treatment == self.outcome {
            return Err(Error::Validation(format!(
                "treatment and outcome must differ (both '{}')",
                self.treatment
            )));
        }
        let mut seen = HashSet::new();
        for v in self.variables() {
            if !seen.insert(v) {
                return Err(Error::Validation(format!("variable '{v}' is declared more than once")));
            }
        }
        Ok(())
    }
}

/// Role of a node in the causal diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// The intervened-on variable.
    Treatment,
    /// The affected variable.
    Outcome,
    /// Observed confounder.
    CommonCause,
    /// Instrumental variable.
    Instrument,
    /// Any other variable (edge-list graphs).
    Other,
}

/// Node weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CausalNode {
    /// Variable name.
    pub name: String,
    /// Role in the diagram.
    pub role: NodeRole,
}

/// Directed acyclic graph of causal assumptions.
#[derive(Debug, Clone)]
pub struct CausalGraph {
    graph: DiGraph<CausalNode, ()>,
    index: HashMap<String, NodeIndex>,
    treatment: Option<NodeIndex>,
    outcome: Option<NodeIndex>,
}

impl CausalGraph {
    fn empty() -> Self {
        Self { graph: DiGraph::new(), index: HashMap::new(), treatment: None, outcome: None }
    }

    fn add_node(&mut self, name: &str, role: NodeRole) -> NodeIndex {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(CausalNode { name: name.to_string(), role });
        self.index.insert(name.to_string(), idx);
        idx
    }

    fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) {
        if self.graph.find_edge(from, to).is_none() {
            self.graph.add_edge(from, to, ());
        }
    }

    fn ensure_acyclic(&self) -> Result<()> {
        if is_cyclic_directed(&self.graph) {
            return Err(Error::Validation("causal graph contains a cycle".into()));
        }
        Ok(())
    }

    /// Build the diagram implied by a causal specification.
    pub fn from_spec(spec: &CausalSpec) -> Result<Self> {
        spec.validate()?;
        let mut g = Self::empty();

        for c in &spec.common_causes {
            g.add_node(c, NodeRole::CommonCause);
        }
        for z in &spec.instruments {
            g.add_node(z, NodeRole::Instrument);
        }
        let t = g.add_node(&spec.treatment, NodeRole::Treatment);
        let y = g.add_node(&spec.outcome, NodeRole::Outcome);
        g.treatment = Some(t);
        g.outcome = Some(y);

        for c in &spec.common_causes {
            let ci = g.index[c.as_str()];
            g.add_edge(ci, t);
            g.add_edge(ci, y);
        }
        for z in &spec.instruments {
            let zi = g.index[z.as_str()];
            g.add_edge(zi, t);
        }
        g.add_edge(t, y);

        g.ensure_acyclic()?;
        tracing::debug!(
            nodes = g.graph.node_count(),
            edges = g.graph.edge_count(),
            "built causal graph"
        );
        Ok(g)
    }

    /// Build a graph from `(from, to)` edges, marking treatment and outcome.
    pub fn from_edges(treatment: &str, outcome: &str, edges: &[(&str, &str)]) -> Result<Self> {
        if treatment == outcome {
            return Err(Error::Validation("treatment and outcome must differ".into()));
        }
        let mut g = Self::empty();
        let t = g.add_node(treatment, NodeRole::Treatment);
        let y = g.add_node(outcome, NodeRole::Outcome);
        g.treatment = Some(t);
        g.outcome = Some(y);
        for (a, b) in edges {
            if a == b {
                return Err(Error::Validation(format!("self-loop on '{a}'")));
            }
            let ai = g.add_node(a, NodeRole::Other);
            let bi = g.add_node(b, NodeRole::Other);
            g.add_edge(ai, bi);
        }
        g.ensure_acyclic()?;
        Ok(g)
    }

    /// Treatment variable name.
    pub fn treatment(&self) -> &str {
        self.treatment.map_or("", |i| self.graph[i].name.as_str())
    }

    /// Outcome variable name.
    pub fn outcome(&self) -> &str {
        self.outcome.map_or("", |i| self.graph[i].name.as_str())
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &CausalNode> {
        self.graph.node_indices().map(move |i| &self.graph[i])
    }

    /// Edges as `(from, to)` name pairs.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| (self.graph[a].name.as_str(), self.graph[b].name.as_str()))
            .collect()
    }

    /// Role of a node.
    pub fn role(&self, name: &str) -> Option<NodeRole> {
        self.index.get(name).map(|&i| self.graph[i].role)
    }

    fn idx(&self, name: &str) -> Result<NodeIndex> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| Error::Validation(format!("'{name}' is not a node of the causal graph")))
    }

    fn names_of(&self, idxs: impl IntoIterator<Item = NodeIndex>) -> Vec<String> {
        let mut v: Vec<NodeIndex> = idxs.into_iter().collect();
        v.sort();
        v.into_iter().map(|i| self.graph[i].name.clone()).collect()
    }

    /// Direct causes of `name`, in insertion order.
    pub fn parents(&self, name: &str) -> Result<Vec<String>> {
        let i = self.idx(name)?;
        Ok(self.names_of(self.graph.neighbors_directed(i, Direction::Incoming)))
    }

    /// Direct effects of `name`, in insertion order.
    pub fn children(&self, name: &str) -> Result<Vec<String>> {
        let i = self.idx(name)?;
        Ok(self.names_of(self.graph.neighbors_directed(i, Direction::Outgoing)))
    }

    /// Every node reachable from `name` along directed edges (excluding itself).
    pub fn descendants(&self, name: &str) -> Result<Vec<String>> {
        let start = self.idx(name)?;
        let mut dfs = Dfs::new(&self.graph, start);
        let mut out = Vec::new();
        while let Some(n) = dfs.next(&self.graph) {
            if n != start {
                out.push(n);
            }
        }
        Ok(self.names_of(out))
    }

    /// Every node with a directed path into `name` (excluding itself).
    pub fn ancestors(&self, name: &str) -> Result<Vec<String>> {
        let start = self.idx(name)?;
        let rev = Reversed(&self.graph);
        let mut dfs = Dfs::new(rev, start);
        let mut out = Vec::new();
        while let Some(n) = dfs.next(rev) {
            if n != start {
                out.push(n);
            }
        }
        Ok(self.names_of(out))
    }

    /// `true` if a directed path leads from `from` to `to`.
    pub fn has_directed_path(&self, from: &str, to: &str) -> Result<bool> {
        let a = self.idx(from)?;
        let b = self.idx(to)?;
        Ok(a != b && has_path_connecting(&self.graph, a, b, None))
    }

    /// Copy of the graph with every edge leaving `name` removed.
    pub fn without_outgoing(&self, name: &str) -> Result<Self> {
        let i = self.idx(name)?;
        let mut g = self.clone();
        g.graph.retain_edges(|gr, e| gr.edge_endpoints(e).is_none_or(|(a, _)| a != i));
        Ok(g)
    }

    /// Copy of the graph with every edge leaving any node in `names` removed.
    pub fn without_outgoing_all(&self, names: &[String]) -> Result<Self> {
        let set: HashSet<NodeIndex> = names.iter().map(|n| self.idx(n)).collect::<Result<_>>()?;
        let mut g = self.clone();
        g.graph.retain_edges(|gr, e| gr.edge_endpoints(e).is_none_or(|(a, _)| !set.contains(&a)));
        Ok(g)
    }

    /// d-separation test: are all of `xs` independent of all of `ys` given `zs`?
    ///
    /// Reachability ("Bayes-ball") over (node, direction) states: a trail
    /// passes a non-collider only if it is unobserved, and a collider only if
    /// it or one of its descendants is observed.
    pub fn d_separated(&self, xs: &[&str], ys: &[&str], zs: &[&str]) -> Result<bool> {
        let xs: Vec<NodeIndex> = xs.iter().map(|n| self.idx(n)).collect::<Result<_>>()?;
        let ys: HashSet<NodeIndex> = ys.iter().map(|n| self.idx(n)).collect::<Result<_>>()?;
        let zs: HashSet<NodeIndex> = zs.iter().map(|n| self.idx(n)).collect::<Result<_>>()?;

        if xs.iter().any(|x| ys.contains(x)) {
            return Ok(false);
        }

        // Observed nodes and their ancestors open colliders.
        let mut opens_collider: HashSet<NodeIndex> = HashSet::new();
        let mut stack: Vec<NodeIndex> = zs.iter().copied().collect();
        while let Some(n) = stack.pop() {
            if opens_collider.insert(n) {
                stack.extend(self.graph.neighbors_directed(n, Direction::Incoming));
            }
        }

        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        enum Dir {
            // Arrived from a child.
            Up,
            // Arrived from a parent.
            Down,
        }

        let mut visited: HashSet<(NodeIndex, Dir)> = HashSet::new();
        let mut queue: Vec<(NodeIndex, Dir)> = xs.iter().map(|&x| (x, Dir::Up)).collect();

        while let Some((n, d)) = queue.pop() {
            if !visited.insert((n, d)) {
                continue;
            }
            let observed = zs.contains(&n);
            if !observed && ys.contains(&n) {
                return Ok(false);
            }
            match d {
                Dir::Up if !observed => {
                    for p in self.graph.neighbors_directed(n, Direction::Incoming) {
                        queue.push((p, Dir::Up));
                    }
                    for c in self.graph.neighbors_directed(n, Direction::Outgoing) {
                        queue.push((c, Dir::Down));
                    }
                }
                Dir::Up => {}
                Dir::Down => {
                    if !observed {
                        for c in self.graph.neighbors_directed(n, Direction::Outgoing) {
                            queue.push((c, Dir::Down));
                        }
                    }
                    if opens_collider.contains(&n) {
                        for p in self.graph.neighbors_directed(n, Direction::Incoming) {
                            queue.push((p, Dir::Up));
                        }
                    }
                }
            }
        }
        Ok(true)
    }

    /// Graphviz DOT rendering.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph causal_model {\n");
        out.push_str("    rankdir=TB;\n    node [shape=ellipse];\n");
        for node in self.nodes() {
            let style = match node.role {
                NodeRole::Treatment => " style=filled fillcolor=\"#c6dbef\"",
                NodeRole::Outcome => " style=filled fillcolor=\"#fdd0a2\"",
                _ => "",
            };
            let _ = writeln!(out, "    \"{}\" [label=\"{}\"{}];", node.name, node.name, style);
        }
        for (a, b) in self.edges() {
            let _ = writeln!(out, "    \"{a}\" -> \"{b}\";");
        }
        out.push_str("}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn churn_graph() -> CausalGraph {
        CausalGraph::from_spec(&CausalSpec::default()).unwrap()
    }

    #[test]
    fn spec_graph_edges() {
        let g = churn_graph();
        let edges = g.edges();
        assert_eq!(edges.len(), 7);
        assert!(edges.contains(&("tenure", "Contract")));
        assert!(edges.contains(&("tenure", "Churn")));
        assert!(edges.contains(&("Contract", "Churn")));
        assert_eq!(g.treatment(), "Contract");
        assert_eq!(g.outcome(), "Churn");
        assert_eq!(g.role("InternetService"), Some(NodeRole::CommonCause));
        assert_eq!(
            g.parents("Contract").unwrap(),
            vec!["tenure", "MonthlyCharges", "InternetService"]
        );
        assert_eq!(g.children("Contract").unwrap(), vec!["Churn"]);
    }

    #[test]
    fn spec_validation() {
        let same = CausalSpec { outcome: "Contract".into(), ..CausalSpec::default() };
        assert!(CausalGraph::from_spec(&same).is_err());
        let dup = CausalSpec {
            common_causes: vec!["tenure".into(), "tenure".into()],
            ..CausalSpec::default()
        };
        assert!(CausalGraph::from_spec(&dup).is_err());
    }

    #[test]
    fn cycles_are_rejected() {
        assert!(CausalGraph::from_edges("a", "c", &[("a", "b"), ("b", "c"), ("c", "a")]).is_err());
        assert!(CausalGraph::from_edges("a", "b", &[("a", "a")]).is_err());
    }

    #[test]
    fn ancestry_and_paths() {
        let g = CausalGraph::from_edges("t", "y", &[("t", "m"), ("m", "y"), ("u", "t")]).unwrap();
        assert!(g.has_directed_path("t", "y").unwrap());
        assert!(!g.has_directed_path("y", "t").unwrap());
        assert_eq!(g.descendants("t").unwrap(), vec!["y", "m"]);
        assert_eq!(g.ancestors("y").unwrap(), vec!["t", "m", "u"]);
        let cut = g.without_outgoing("t").unwrap();
        assert!(!cut.has_directed_path("t", "y").unwrap());
        assert!(cut.has_directed_path("u", "t").unwrap());
    }

    #[test]
    fn d_separation_chain() {
        let g = CausalGraph::from_edges("a", "c", &[("a", "b"), ("b", "c")]).unwrap();
        assert!(!g.d_separated(&["a"], &["c"], &[]).unwrap());
        assert!(g.d_separated(&["a"], &["c"], &["b"]).unwrap());
    }

    #[test]
    fn d_separation_fork() {
        let g = CausalGraph::from_edges("a", "c", &[("b", "a"), ("b", "c")]).unwrap();
        assert!(!g.d_separated(&["a"], &["c"], &[]).unwrap());
        assert!(g.d_separated(&["a"], &["c"], &["b"]).unwrap());
    }

    #[test]
    fn d_separation_collider() {
        let g =
            CausalGraph::from_edges("a", "c", &[("a", "b"), ("c", "b"), ("b", "d")]).unwrap();
        assert!(g.d_separated(&["a"], &["c"], &[]).unwrap());
        assert!(!g.d_separated(&["a"], &["c"], &["b"]).unwrap());
        // Observing a descendant of the collider also opens it.
        assert!(!g.d_separated(&["a"], &["c"], &["d"]).unwrap());
    }

    #[test]
    fn backdoor_blocked_by_confounders() {
        let g = churn_graph().without_outgoing("Contract").unwrap();
        assert!(!g.d_separated(&["Contract"], &["Churn"], &[]).unwrap());
        assert!(!g.d_separated(&["Contract"], &["Churn"], &["tenure"]).unwrap());
        assert!(
            g.d_separated(
                &["Contract"],
                &["Churn"],
                &["tenure", "MonthlyCharges", "InternetService"]
            )
            .unwrap()
        );
    }

    #[test]
    fn dot_lists_nodes_and_edges() {
        let dot = churn_graph().to_dot();
        assert!(dot.starts_with("digraph causal_model {"));
        assert!(dot.contains("\"tenure\" -> \"Contract\";"));
        assert!(dot.contains("\"Contract\" -> \"Churn\";"));
        assert!(dot.trim_end().ends_with('}'));
    }
}
