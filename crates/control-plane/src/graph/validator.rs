//! Structural validation of workflow graphs.
//!
//! Checks, in order, failing on the first violation:
//! - node ids are unique
//! - edge ids are unique
//! - every edge's source and target name an existing node
//! - no edge loops back to its own node unless that node is a `decision`

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;

use super::types::{NodeType, WorkflowGraph};

/// Which end of an edge failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeEndpoint {
    Source,
    Target,
}

impl std::fmt::Display for EdgeEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeEndpoint::Source => write!(f, "source"),
            EdgeEndpoint::Target => write!(f, "target"),
        }
    }
}

/// Structural violation found in a workflow graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Duplicate node id: {0}")]
    DuplicateNodeId(String),

    #[error("Duplicate edge id: {0}")]
    DuplicateEdgeId(String),

    #[error("Edge '{edge_id}' {endpoint} references unknown node '{node_id}'")]
    DanglingEdge {
        edge_id: String,
        endpoint: EdgeEndpoint,
        node_id: String,
    },

    #[error("Edge '{edge_id}' loops back to node '{node_id}', which is not a decision node")]
    SelfLoop { edge_id: String, node_id: String },

    #[error("Workflow graph has no nodes to execute")]
    EmptyGraph,
}

impl GraphError {
    /// Id of the node or edge that broke the rule, if any.
    pub fn offending_id(&self) -> Option<&str> {
        match self {
            GraphError::DuplicateNodeId(id) | GraphError::DuplicateEdgeId(id) => Some(id),
            GraphError::DanglingEdge { edge_id, .. } | GraphError::SelfLoop { edge_id, .. } => {
                Some(edge_id)
            }
            GraphError::EmptyGraph => None,
        }
    }
}

/// Validate the structure of a graph. An empty graph is valid.
pub fn validate(graph: &WorkflowGraph) -> Result<(), GraphError> {
    let mut node_types: HashMap<&str, NodeType> = HashMap::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        if node_types.insert(node.id.as_str(), node.node_type).is_some() {
            return Err(GraphError::DuplicateNodeId(node.id.clone()));
        }
    }

    let mut seen_edges = HashSet::with_capacity(graph.edges.len());
    for edge in &graph.edges {
        if !seen_edges.insert(edge.id.as_str()) {
            return Err(GraphError::DuplicateEdgeId(edge.id.clone()));
        }
    }

    for edge in &graph.edges {
        for (endpoint, node_id) in [
            (EdgeEndpoint::Source, &edge.source),
            (EdgeEndpoint::Target, &edge.target),
        ] {
            if !node_types.contains_key(node_id.as_str()) {
                return Err(GraphError::DanglingEdge {
                    edge_id: edge.id.clone(),
                    endpoint,
                    node_id: node_id.clone(),
                });
            }
        }
    }

    for edge in &graph.edges {
        if edge.source == edge.target
            && node_types.get(edge.source.as_str()) != Some(&NodeType::Decision)
        {
            return Err(GraphError::SelfLoop {
                edge_id: edge.id.clone(),
                node_id: edge.source.clone(),
            });
        }
    }

    Ok(())
}

/// Validate a graph that is about to be handed to the runner.
pub fn validate_for_execution(graph: &WorkflowGraph) -> Result<(), GraphError> {
    validate(graph)?;
    if !graph.is_executable() {
        return Err(GraphError::EmptyGraph);
    }
    Ok(())
}
