//! Scene graph produced by the importers.
//!
//! Nodes and meshes live in flat tables owned by [`SceneGraph`] and refer to
//! each other by index. Nodes can only be created as the child of an existing
//! node, so the node relation is always a tree rooted at [`SceneGraph::root`].

use cgmath::Matrix4;

use crate::data_structures::mesh::Mesh;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub(crate) usize);

impl std::fmt::Display for MeshId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Node {
    pub name: Option<String>,
    /// Kept for callers that want the hierarchy's pivots. Flattening ignores it.
    pub local_transform: Option<Matrix4<f32>>,
    meshes: Vec<MeshId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn meshes(&self) -> &[MeshId] {
        &self.meshes
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Clone, Debug)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    meshes: Vec<Mesh>,
    root: NodeId,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Creates a graph holding a single, empty root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            meshes: Vec::new(),
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Moves `mesh` into the mesh table. It is not reachable until a node references it.
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    /// Appends a new, empty child to `parent`. Returns `None` if `parent` doesn't exist.
    pub fn add_child(&mut self, parent: NodeId, name: Option<String>) -> Option<NodeId> {
        if parent.0 >= self.nodes.len() {
            return None;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name,
            ..Default::default()
        });
        self.nodes[parent.0].children.push(id);
        Some(id)
    }

    /// Adds a mesh reference to `node`. References are kept in insertion order
    /// and may repeat. Returns `false` if `node` doesn't exist.
    pub fn attach_mesh(&mut self, node: NodeId, mesh: MeshId) -> bool {
        match self.nodes.get_mut(node.0) {
            Some(node) => {
                node.meshes.push(mesh);
                true
            }
            None => false,
        }
    }

    /// Nodes in depth-first pre-order: a node, then each child's subtree in listed order.
    pub fn depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            graph: self,
            stack: vec![self.root],
        }
    }
}

/// Pre-order traversal driven by an explicit stack.
pub struct DepthFirst<'a> {
    graph: &'a SceneGraph,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = &self.graph.nodes[id.0];
        // reversed so the first child is popped next
        self.stack.extend(node.children.iter().rev().copied());
        Some((id, node))
    }
}
