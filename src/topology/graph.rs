// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 acs-pipeline contributors

//! Artifact dependency graph
//!
//! Artifacts are the only way data moves between actions. This module
//! builds the graph whose edges run from the action producing an artifact
//! to every action consuming it, and checks that it is well formed.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

use crate::errors::{AcsError, AcsResult};
use crate::topology::{Action, Artifact, Topology};

/// An action's position in the topology
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionNode {
    pub stage_index: usize,
    pub stage: String,
    pub action: String,
}

impl ActionNode {
    fn label(&self) -> String {
        format!("{}/{}", self.stage, self.action)
    }
}

/// A producer → consumer edge carrying one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactEdge {
    pub from: String,
    pub to: String,
    pub artifact: Artifact,
}

/// Dependency graph between actions
pub struct ArtifactGraph {
    graph: DiGraph<ActionNode, Artifact>,
    name_to_index: HashMap<String, NodeIndex>,
}

impl ArtifactGraph {
    /// Build the graph from a topology
    pub fn build(topology: &Topology) -> AcsResult<Self> {
        let mut graph = DiGraph::new();
        let mut name_to_index = HashMap::new();
        let mut producers: HashMap<&Artifact, NodeIndex> = HashMap::new();

        // Add all actions as nodes, recording who produces what
        for (stage_index, stage, action) in topology.actions() {
            let node = graph.add_node(ActionNode {
                stage_index,
                stage: stage.name.clone(),
                action: action.name.clone(),
            });

            if name_to_index.insert(action.name.clone(), node).is_some() {
                return Err(AcsError::InvalidTopology {
                    reason: format!("Duplicate action name: '{}'", action.name),
                });
            }

            for output in &action.outputs {
                if producers.insert(output, node).is_some() {
                    return Err(AcsError::InvalidTopology {
                        reason: format!("Artifact '{}' is produced more than once", output),
                    });
                }
            }
        }

        // Connect each consumed artifact to its producer
        for (_, _, action) in topology.actions() {
            let consumer = name_to_index[&action.name];

            for input in &action.inputs {
                let producer = producers.get(input).ok_or_else(|| AcsError::InvalidTopology {
                    reason: format!(
                        "Action '{}' consumes artifact '{}' which no action produces",
                        action.name, input
                    ),
                })?;

                graph.add_edge(*producer, consumer, input.clone());
            }
        }

        let built = Self {
            graph,
            name_to_index,
        };
        built.execution_order()?;

        Ok(built)
    }

    /// Action names in a valid execution order
    pub fn execution_order(&self) -> AcsResult<Vec<String>> {
        toposort(&self.graph, None)
            .map(|nodes| {
                nodes
                    .into_iter()
                    .map(|n| self.graph[n].action.clone())
                    .collect()
            })
            .map_err(|cycle| AcsError::InvalidTopology {
                reason: format!(
                    "Artifact cycle through action '{}'",
                    self.graph[cycle.node_id()].action
                ),
            })
    }

    /// Every edge, ordered by producer then consumer position in the topology
    pub fn edges(&self) -> Vec<ArtifactEdge> {
        let mut edges: Vec<_> = self
            .graph
            .edge_references()
            .map(|e| (e.source(), e.target(), e.weight().clone()))
            .collect();
        edges.sort_by(|a, b| (a.0, a.1, &a.2).cmp(&(b.0, b.1, &b.2)));

        edges
            .into_iter()
            .map(|(from, to, artifact)| ArtifactEdge {
                from: self.graph[from].action.clone(),
                to: self.graph[to].action.clone(),
                artifact,
            })
            .collect()
    }

    /// Node for an action
    pub fn node(&self, action: &str) -> Option<&ActionNode> {
        self.name_to_index.get(action).map(|idx| &self.graph[*idx])
    }

    /// Edges whose consumer is not in a strictly later stage than the producer
    pub fn backward_edges(&self) -> Vec<ArtifactEdge> {
        self.edges()
            .into_iter()
            .filter(|edge| {
                let from = &self.graph[self.name_to_index[&edge.from]];
                let to = &self.graph[self.name_to_index[&edge.to]];
                to.stage_index <= from.stage_index
            })
            .collect()
    }

    /// Generate a text listing of stages, actions and their artifact inputs
    pub fn to_text(&self, topology: &Topology) -> String {
        let mut out = String::new();

        for (i, stage) in topology.stages.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, stage.name));

            for action in &stage.actions {
                out.push_str(&format!("   - {} ({})", action.name, action.kind_name()));
                out.push_str(&Self::artifact_summary(action));
                out.push('\n');
            }
        }

        out
    }

    fn artifact_summary(action: &Action) -> String {
        let mut out = String::new();

        if !action.inputs.is_empty() {
            let names: Vec<_> = action.inputs.iter().map(Artifact::name).collect();
            out.push_str(&format!(" [in: {}]", names.join(", ")));
        }

        if !action.outputs.is_empty() {
            let names: Vec<_> = action.outputs.iter().map(Artifact::name).collect();
            out.push_str(&format!(" [out: {}]", names.join(", ")));
        }

        out
    }

    /// Generate Mermaid diagram of the graph
    pub fn to_mermaid(&self, topology: &Topology) -> String {
        let mut out = String::from("graph LR\n");

        for stage in &topology.stages {
            out.push_str(&format!("    subgraph {}\n", stage.name));
            for action in &stage.actions {
                out.push_str(&format!("        {}_node[{}]\n", action.name, action.name));
            }
            out.push_str("    end\n");
        }

        for edge in self.edges() {
            out.push_str(&format!(
                "    {}_node -->|{}| {}_node\n",
                edge.from, edge.artifact, edge.to
            ));
        }

        out
    }

    /// Generate DOT diagram of the graph
    pub fn to_dot(&self, topology: &Topology) -> String {
        let mut out = String::from("digraph pipeline {\n");
        out.push_str("    rankdir=LR;\n");
        out.push_str("    node [shape=box, style=rounded];\n\n");

        for (i, stage) in topology.stages.iter().enumerate() {
            out.push_str(&format!("    subgraph cluster_{} {{\n", i));
            out.push_str(&format!("        label=\"{}\";\n", stage.name));
            for action in &stage.actions {
                let label = self
                    .node(&action.name)
                    .map(ActionNode::label)
                    .unwrap_or_else(|| action.name.clone());
                out.push_str(&format!(
                    "        \"{}\" [label=\"{}\"];\n",
                    action.name, label
                ));
            }
            out.push_str("    }\n");
        }

        out.push('\n');
        for edge in self.edges() {
            out.push_str(&format!(
                "    \"{}\" -> \"{}\" [label=\"{}\"];\n",
                edge.from, edge.to, edge.artifact
            ));
        }

        out.push_str("}\n");
        out
    }
}
