// Tree node model.
// The single entity returned to the GUI: organizations, repositories, containers, and leaves.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Closed set of node kinds. Determines rendering and whether a node can expand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Organization,
    Repository,
    Workflows,
    Workflow,
    WorkflowRuns,
    WorkflowRun,
    Runners,
    Runner,
    Branches,
    Branch,
    PullRequests,
    PullRequest,
    Issues,
    Issue,
}

impl NodeType {
    /// Aggregate nodes grouping same-type leaves under a repository.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeType::Workflows
                | NodeType::WorkflowRuns
                | NodeType::Runners
                | NodeType::Branches
                | NodeType::PullRequests
                | NodeType::Issues
        )
    }

    pub fn is_leaf(&self) -> bool {
        !self.is_container() && !matches!(self, NodeType::Organization | NodeType::Repository)
    }
}

/// A node of the repository tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub status: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub children: Vec<TreeNode>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// The node has, or may have once expanded, children.
    pub has_children: bool,
    /// `children` is the full current child set rather than a placeholder.
    pub is_loaded: bool,
}

impl TreeNode {
    fn new(id: String, name: String, node_type: NodeType) -> Self {
        Self {
            id,
            name,
            node_type,
            status: None,
            url: None,
            children: Vec::new(),
            metadata: Map::new(),
            has_children: false,
            is_loaded: true,
        }
    }

    /// A leaf with nothing beneath it.
    pub fn leaf(id: impl Into<String>, name: impl Into<String>, node_type: NodeType) -> Self {
        Self::new(id.into(), name.into(), node_type)
    }

    /// A placeholder whose children are fetched on demand.
    pub fn lazy(id: impl Into<String>, name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            has_children: true,
            is_loaded: false,
            ..Self::new(id.into(), name.into(), node_type)
        }
    }

    /// A fully materialized node holding `children`.
    pub fn loaded(
        id: impl Into<String>,
        name: impl Into<String>,
        node_type: NodeType,
        children: Vec<TreeNode>,
    ) -> Self {
        Self {
            has_children: !children.is_empty(),
            children,
            ..Self::new(id.into(), name.into(), node_type)
        }
    }

    pub fn with_status(mut self, status: Option<impl Into<String>>) -> Self {
        self.status = status.map(Into::into);
        self
    }

    pub fn with_url(mut self, url: Option<impl Into<String>>) -> Self {
        self.url = url.map(Into::into);
        self
    }

    pub fn with_meta(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    /// Merge an on-demand detail expansion into this node.
    pub fn attach_children(&mut self, children: Vec<TreeNode>) {
        self.has_children = !children.is_empty();
        self.children = children;
        self.is_loaded = true;
    }

    /// Depth-first lookup by id.
    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Whether the loading flags of this subtree agree with its contents.
    pub fn is_consistent(&self) -> bool {
        let flags_ok = if self.is_loaded {
            self.has_children == !self.children.is_empty()
        } else {
            self.has_children && self.children.is_empty()
        };
        let containers_loaded = !self.node_type.is_container() || self.is_loaded;

        flags_ok && containers_loaded && self.children.iter().all(TreeNode::is_consistent)
    }
}
