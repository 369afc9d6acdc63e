//! Dependency resolution over the feature registry.
//!
//! [`DependencyGraph::resolve`] walks only the features reachable from one
//! target and emits them in post-order, so every dependency lands before its
//! dependents. [`RegistryGraph`] is the whole-registry view used for
//! reverse-dependency queries.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::ops::Deref;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::feature::FeatureRegistry;

/// Traversal state of a single feature during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitState {
    #[default]
    Unvisited,
    InProgress,
    Done,
}

/// Topological linearization of one target's dependency closure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BuildOrder(Vec<String>);

impl BuildOrder {
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    /// Position of a feature in the order, if it was reached.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|n| n == name)
    }
}

impl Deref for BuildOrder {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for BuildOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// Traversal state for one resolution, passed explicitly through the walk.
#[derive(Debug, Default)]
pub struct ResolveContext {
    states: HashMap<String, VisitState>,
    order: Vec<String>,
}

impl ResolveContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, name: &str) -> VisitState {
        self.states.get(name).copied().unwrap_or_default()
    }

    /// Visits `name` and everything it depends on.
    ///
    /// `required_by` is the feature whose `depends_on` led here; `None` for the
    /// requested target itself.
    pub fn visit(
        &mut self,
        registry: &FeatureRegistry,
        name: &str,
        required_by: Option<&str>,
    ) -> Result<()> {
        match self.state(name) {
            VisitState::InProgress => return Err(Error::CircularDependency(name.to_string())),
            VisitState::Done => return Ok(()),
            VisitState::Unvisited => {}
        }

        let feature = match required_by {
            Some(parent) => registry
                .get(name)
                .ok_or_else(|| Error::UnknownDependency {
                    feature: parent.to_string(),
                    dependency: name.to_string(),
                })?,
            None => registry.require(name)?,
        };

        self.states.insert(name.to_string(), VisitState::InProgress);
        for dep in &feature.depends_on {
            self.visit(registry, dep, Some(name))?;
        }
        self.states.insert(name.to_string(), VisitState::Done);
        self.order.push(name.to_string());

        Ok(())
    }

    pub fn into_order(self) -> BuildOrder {
        BuildOrder(self.order)
    }
}

/// Resolves build orders against a registry.
#[derive(Debug, Clone, Copy)]
pub struct DependencyGraph<'a> {
    registry: &'a FeatureRegistry,
}

impl<'a> DependencyGraph<'a> {
    pub fn new(registry: &'a FeatureRegistry) -> Self {
        Self { registry }
    }

    /// Returns the build order for `target`: its transitive dependencies,
    /// each exactly once, followed by the target.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CircularDependency`] if a cycle is reachable from the
    /// target, [`Error::UnknownDependency`] for a dangling `depends_on` entry,
    /// and [`Error::UnknownFeature`] if the target itself is not registered.
    pub fn resolve(&self, target: &str) -> Result<BuildOrder> {
        let mut ctx = ResolveContext::new();
        ctx.visit(self.registry, target, None)?;
        let order = ctx.into_order();
        debug!(target, %order, "resolved build order");
        Ok(order)
    }
}

/// Convenience wrapper around [`DependencyGraph::resolve`].
pub fn resolve(target: &str, registry: &FeatureRegistry) -> Result<BuildOrder> {
    DependencyGraph::new(registry).resolve(target)
}

/// Whole-registry dependency graph.
///
/// Unlike [`DependencyGraph::resolve`], construction validates every feature,
/// so any dangling reference or cycle anywhere in the registry is an error.
#[derive(Debug)]
pub struct RegistryGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
    topological_order: Vec<String>,
}

impl RegistryGraph {
    /// Builds the graph with edges pointing from each feature to its dependencies.
    ///
    /// # Errors
    ///
    /// Returns an error on unknown dependencies or cycles.
    pub fn new(registry: &FeatureRegistry) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::with_capacity(registry.len());

        for feature in registry.iter() {
            let node = graph.add_node(feature.name.clone());
            node_map.insert(feature.name.clone(), node);
        }

        for feature in registry.iter() {
            let from = node_map[&feature.name];
            for dep in &feature.depends_on {
                let to = node_map
                    .get(dep)
                    .ok_or_else(|| Error::UnknownDependency {
                        feature: feature.name.clone(),
                        dependency: dep.clone(),
                    })?;
                graph.add_edge(from, *to, ());
            }
        }

        let sorted = toposort(&graph, None)
            .map_err(|cycle| Error::CircularDependency(graph[cycle.node_id()].clone()))?;

        let topological_order = sorted
            .into_iter()
            .rev()
            .map(|idx| graph[idx].clone())
            .collect();

        Ok(Self {
            graph,
            node_map,
            topological_order,
        })
    }

    /// All features, dependencies before dependents.
    #[inline]
    pub fn topological_order(&self) -> &[String] {
        &self.topological_order
    }

    fn node(&self, name: &str) -> Result<NodeIndex> {
        self.node_map
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownFeature {
                name: name.to_string(),
                available: self.topological_order.join(", "),
            })
    }

    /// Features that list `name` directly in their `depends_on`.
    pub fn dependents(&self, name: &str) -> Result<BTreeSet<String>> {
        let node = self.node(name)?;
        Ok(self
            .graph
            .neighbors_directed(node, Direction::Incoming)
            .map(|idx| self.graph[idx].clone())
            .collect())
    }

    /// Every feature that would rebuild if `name` changed, excluding `name`.
    pub fn all_dependents(&self, name: &str) -> Result<BTreeSet<String>> {
        let mut result = BTreeSet::new();
        let mut stack = vec![self.node(name)?];

        while let Some(current) = stack.pop() {
            for idx in self.graph.neighbors_directed(current, Direction::Incoming) {
                if result.insert(self.graph[idx].clone()) {
                    stack.push(idx);
                }
            }
        }

        result.remove(name);
        Ok(result)
    }
}
