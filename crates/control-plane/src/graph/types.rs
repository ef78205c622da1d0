//! Workflow graph types.

use serde::{Deserialize, Serialize};

/// Kind of step a node represents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    Trigger,
    DataMining,
    SeoAnalysis,
    ContentGen,
    Monitoring,
    Blockchain,
    Notification,
    Decision,
}

impl NodeType {
    pub const ALL: [NodeType; 8] = [
        NodeType::Trigger,
        NodeType::DataMining,
        NodeType::SeoAnalysis,
        NodeType::ContentGen,
        NodeType::Monitoring,
        NodeType::Blockchain,
        NodeType::Notification,
        NodeType::Decision,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Trigger => "trigger",
            NodeType::DataMining => "dataMining",
            NodeType::SeoAnalysis => "seoAnalysis",
            NodeType::ContentGen => "contentGen",
            NodeType::Monitoring => "monitoring",
            NodeType::Blockchain => "blockchain",
            NodeType::Notification => "notification",
            NodeType::Decision => "decision",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown node type: {}", s))
    }
}

/// Canvas position of a node.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A workflow step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub position: Position,
    /// Step configuration, opaque to this crate.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl WorkflowNode {
    pub fn new(id: impl Into<String>, node_type: NodeType) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            node_type,
            position: Position::default(),
            data: serde_json::Value::Null,
        }
    }
}

/// Directed connection between two nodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkflowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl WorkflowEdge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Nodes and edges of a workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkflowGraph {
    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,
    #[serde(default)]
    pub edges: Vec<WorkflowEdge>,
}

impl WorkflowGraph {
    /// An empty graph is valid but has nothing to run.
    pub fn is_executable(&self) -> bool {
        !self.nodes.is_empty()
    }
}
