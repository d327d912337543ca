//! Parent/child trees assembled from rows.
//!
//! Nodes live in one arena and refer to each other by [`NodeId`]. A node's
//! parent link is only used for upward lookups; ownership flows from the
//! tree to its nodes.

use rustc_hash::FxHashMap;

use crate::errors::EvalErrorKind;
use crate::value::hash_key;
use crate::Value;

/// Index of a node in its tree's arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub struct HierarchyNode {
    pub values: Vec<Value>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Distance from the node's root; roots are at level 0.
    pub level: usize,
}

#[derive(Debug)]
pub struct HierarchicalTree {
    columns: Vec<String>,
    key_column: usize,
    nodes: Vec<HierarchyNode>,
    roots: Vec<NodeId>,
}

impl HierarchicalTree {
    /// Assemble a tree from `rows` linked by `key` and `parent` columns.
    ///
    /// Rows whose parent key is null or matches no row become roots. Children
    /// keep row order. Rows that cannot be reached from any root (parent
    /// cycles) are an error.
    pub fn build(
        source: &str,
        columns: &[String],
        rows: &[Vec<Value>],
        key: &str,
        parent: &str,
    ) -> Result<Self, EvalErrorKind> {
        let position = |column: &str| {
            columns
                .iter()
                .position(|c| c == column)
                .ok_or_else(|| EvalErrorKind::UnknownColumn {
                    table: source.to_string(),
                    column: column.to_string(),
                })
        };
        let key_column = position(key)?;
        let parent_column = position(parent)?;

        let mut by_key: FxHashMap<String, NodeId> = FxHashMap::default();
        let mut nodes: Vec<HierarchyNode> = Vec::with_capacity(rows.len());
        for (index, values) in rows.iter().enumerate() {
            let key_value = values.get(key_column).unwrap_or(&Value::Null);
            if !key_value.is_null() {
                by_key
                    .entry(hash_key(std::slice::from_ref(key_value)))
                    .or_insert(NodeId(index));
            }
            nodes.push(HierarchyNode {
                values: values.clone(),
                parent: None,
                children: Vec::new(),
                level: 0,
            });
        }

        let mut roots = Vec::new();
        for index in 0..nodes.len() {
            let parent_key = nodes[index].values.get(parent_column).unwrap_or(&Value::Null);
            let parent = if parent_key.is_null() {
                None
            } else {
                by_key
                    .get(&hash_key(std::slice::from_ref(parent_key)))
                    .copied()
            };
            match parent {
                Some(parent) => {
                    nodes[index].parent = Some(parent);
                    nodes[parent.0].children.push(NodeId(index));
                }
                None => roots.push(NodeId(index)),
            }
        }

        // Levels top-down; anything not visited hangs off a cycle.
        let mut visited = 0;
        let mut stack: Vec<(NodeId, usize)> = roots.iter().map(|&root| (root, 0)).collect();
        while let Some((id, level)) = stack.pop() {
            visited += 1;
            nodes[id.0].level = level;
            stack.extend(nodes[id.0].children.iter().map(|&child| (child, level + 1)));
        }
        if visited < nodes.len() {
            return Err(EvalErrorKind::HierarchyCycle(nodes.len() - visited));
        }

        Ok(HierarchicalTree {
            columns: columns.to_vec(),
            key_column,
            nodes,
            roots,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Every node in row order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &HierarchyNode {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn level(&self, id: NodeId) -> usize {
        self.node(id).level
    }

    pub fn values(&self, id: NodeId) -> &[Value] {
        &self.node(id).values
    }

    pub fn key(&self, id: NodeId) -> &Value {
        self.values(id).get(self.key_column).unwrap_or(&Value::Null)
    }

    /// Column `name` of the node's row.
    pub fn field(&self, id: NodeId, name: &str) -> Option<&Value> {
        let column = self.columns.iter().position(|c| c == name)?;
        self.values(id).get(column)
    }

    /// Depth-first, pre-order walk of the subtree rooted at `start`.
    pub fn preorder(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        order
    }

    /// Depth-first walk of the whole forest, roots in row order.
    pub fn traverse(&self) -> Vec<NodeId> {
        self.roots
            .iter()
            .flat_map(|&root| self.preorder(root))
            .collect()
    }
}
