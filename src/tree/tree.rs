//! Decision tree structure.
//!
//! [`Tree`] is an immutable array-of-structs tree as exported by a training
//! library: node 0 is the root and every other node has exactly one parent.
//! Trees are validated on construction so encoders can index nodes freely.

use crate::core::error::{Result, TreeMipError};
use crate::core::types::{FeatureIndex, NodeIndex};
use crate::tree::node::TreeNode;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Marker used in exported child arrays for "no child".
pub const TREE_LEAF: i64 = -1;

/// Parallel-array form of a tree, the layout training libraries export.
///
/// `children_left[i] == -1` marks node `i` as a leaf; `feature` and
/// `threshold` are ignored for leaves. `value[i]` holds one entry per output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeArrays {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

/// Trained regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TreeArrays", into = "TreeArrays")]
pub struct Tree {
    /// Nodes; index 0 is the root
    nodes: Vec<TreeNode>,
    /// Width of the leaf value vectors
    n_outputs: usize,
    /// Length of the longest root-to-leaf path
    max_depth: usize,
}

impl Tree {
    /// Creates a validated tree from its nodes.
    pub fn new(mut nodes: Vec<TreeNode>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(TreeMipError::invalid_tree("tree has no nodes"));
        }

        let n_outputs = nodes
            .iter()
            .find(|n| n.is_leaf())
            .map(|n| n.value().len())
            .ok_or_else(|| TreeMipError::invalid_tree("tree has no leaves"))?;
        if n_outputs == 0 {
            return Err(TreeMipError::invalid_tree("leaf values are empty"));
        }

        let capacity = nodes.len();
        let mut parent_count = vec![0usize; capacity];
        for (index, node) in nodes.iter().enumerate() {
            if node.is_leaf() {
                if node.value().len() != n_outputs {
                    return Err(TreeMipError::invalid_tree(format!(
                        "leaf {} has {} values, expected {}",
                        index,
                        node.value().len(),
                        n_outputs
                    )));
                }
                if let Some(v) = node.value().iter().find(|v| !v.is_finite()) {
                    return Err(TreeMipError::invalid_tree(format!(
                        "leaf {} has non-finite value {}",
                        index, v
                    )));
                }
                continue;
            }

            let (left, right) = node.children().ok_or_else(|| {
                TreeMipError::invalid_tree(format!("node {} has only one child", index))
            })?;
            for child in [left, right] {
                if child >= capacity {
                    return Err(TreeMipError::invalid_tree(format!(
                        "node {} has child {} outside 0..{}",
                        index, child, capacity
                    )));
                }
                if child == 0 {
                    return Err(TreeMipError::invalid_tree(format!(
                        "node {} points back to the root",
                        index
                    )));
                }
                parent_count[child] += 1;
            }
            if left == right {
                return Err(TreeMipError::invalid_tree(format!(
                    "node {} has identical children",
                    index
                )));
            }
            match node.threshold() {
                Some(t) if t.is_finite() => {}
                other => {
                    return Err(TreeMipError::invalid_tree(format!(
                        "node {} has invalid threshold {:?}",
                        index, other
                    )))
                }
            }
            if !node.value().is_empty() && node.value().len() != n_outputs {
                return Err(TreeMipError::invalid_tree(format!(
                    "node {} has {} values, expected {}",
                    index,
                    node.value().len(),
                    n_outputs
                )));
            }
        }

        if let Some(index) = (1..capacity).find(|&i| parent_count[i] != 1) {
            return Err(TreeMipError::invalid_tree(format!(
                "node {} has {} parents, expected exactly one",
                index, parent_count[index]
            )));
        }

        // Every node has one parent, so the walk visits each node at most once.
        let mut depth = vec![usize::MAX; capacity];
        let mut queue = VecDeque::from([0usize]);
        depth[0] = 0;
        let mut max_depth = 0;
        while let Some(index) = queue.pop_front() {
            max_depth = max_depth.max(depth[index]);
            if let Some((left, right)) = nodes[index].children() {
                for child in [left, right] {
                    if depth[child] != usize::MAX {
                        return Err(TreeMipError::invalid_tree(format!(
                            "node {} is reachable twice",
                            child
                        )));
                    }
                    depth[child] = depth[index] + 1;
                    queue.push_back(child);
                }
            }
        }
        if let Some(index) = depth.iter().position(|&d| d == usize::MAX) {
            return Err(TreeMipError::invalid_tree(format!(
                "node {} is not reachable from the root",
                index
            )));
        }

        // Split nodes without a value read back from arrays as zeros
        for node in nodes.iter_mut().filter(|n| !n.is_leaf() && n.value().is_empty()) {
            *node = node.clone().with_value(vec![0.0; n_outputs]);
        }

        Ok(Tree {
            nodes,
            n_outputs,
            max_depth,
        })
    }

    /// Creates a tree from exported parallel arrays.
    ///
    /// `value` has one row per node and one column per output.
    pub fn from_arrays(
        children_left: &[i64],
        children_right: &[i64],
        feature: &[i64],
        threshold: &[f64],
        value: ArrayView2<'_, f64>,
    ) -> Result<Self> {
        let capacity = children_left.len();
        for (name, len) in [
            ("children_right", children_right.len()),
            ("feature", feature.len()),
            ("threshold", threshold.len()),
            ("value", value.nrows()),
        ] {
            if len != capacity {
                return Err(TreeMipError::dimension_mismatch(
                    format!("{} entries in {}", capacity, name),
                    len.to_string(),
                ));
            }
        }

        let to_index = |node: usize, raw: i64| -> Result<NodeIndex> {
            usize::try_from(raw).map_err(|_| {
                TreeMipError::invalid_tree(format!("node {} has invalid child {}", node, raw))
            })
        };

        let mut nodes = Vec::with_capacity(capacity);
        for i in 0..capacity {
            let node_value = value.row(i).to_vec();
            let node = match (children_left[i], children_right[i]) {
                (TREE_LEAF, TREE_LEAF) => TreeNode::leaf_multi(node_value),
                (left, right) => {
                    let split_feature = usize::try_from(feature[i]).map_err(|_| {
                        TreeMipError::invalid_tree(format!(
                            "node {} has invalid feature {}",
                            i, feature[i]
                        ))
                    })?;
                    TreeNode::split(
                        split_feature,
                        threshold[i],
                        to_index(i, left)?,
                        to_index(i, right)?,
                    )
                    .with_value(node_value)
                }
            };
            nodes.push(node);
        }

        Self::new(nodes)
    }

    /// A tree made of a single leaf.
    pub fn constant(value: f64) -> Self {
        Tree {
            nodes: vec![TreeNode::leaf(value)],
            n_outputs: 1,
            max_depth: 0,
        }
    }

    /// Total node count, leaves included.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Width of the leaf values.
    pub fn n_outputs(&self) -> usize {
        self.n_outputs
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.max_depth
    }

    /// Node at `index`.
    pub fn node(&self, index: NodeIndex) -> Option<&TreeNode> {
        self.nodes.get(index)
    }

    /// All nodes in index order.
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Root node.
    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    /// Indices of the leaves in ascending order.
    pub fn leaf_indices(&self) -> Vec<NodeIndex> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| if node.is_leaf() { Some(i) } else { None })
            .collect()
    }

    /// Indices of the split nodes in ascending order.
    pub fn split_indices(&self) -> Vec<NodeIndex> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| if node.is_leaf() { None } else { Some(i) })
            .collect()
    }

    /// Number of leaves.
    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Largest feature index used by any split, if the tree splits at all.
    pub fn max_feature(&self) -> Option<FeatureIndex> {
        self.nodes.iter().filter_map(|n| n.feature()).max()
    }

    /// `(min, max)` over every leaf value.
    pub fn leaf_value_range(&self) -> (f64, f64) {
        self.nodes
            .iter()
            .filter(|n| n.is_leaf())
            .flat_map(|n| n.value().iter().copied())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Root-to-leaf path followed by `features`.
    pub fn decision_path(&self, features: ArrayView1<'_, f64>) -> Result<Vec<NodeIndex>> {
        let mut path = vec![0];
        let mut index = 0;
        while let Some((left, right)) = self.nodes[index].children() {
            let node = &self.nodes[index];
            // validated split nodes always carry feature and threshold
            let feature = node.feature().unwrap_or_default();
            let threshold = node.threshold().unwrap_or_default();
            let value = *features.get(feature).ok_or_else(|| {
                TreeMipError::dimension_mismatch(
                    format!("at least {} features", feature + 1),
                    features.len().to_string(),
                )
            })?;
            index = if value <= threshold { left } else { right };
            path.push(index);
        }
        Ok(path)
    }

    /// Leaf reached by `features`.
    pub fn predict_leaf_index(&self, features: ArrayView1<'_, f64>) -> Result<NodeIndex> {
        let path = self.decision_path(features)?;
        Ok(*path.last().unwrap_or(&0))
    }

    /// Value vector of the leaf reached by `features`.
    pub fn predict_values(&self, features: ArrayView1<'_, f64>) -> Result<&[f64]> {
        let leaf = self.predict_leaf_index(features)?;
        Ok(self.nodes[leaf].value())
    }

    /// First output of the leaf reached by `features`.
    pub fn predict(&self, features: ArrayView1<'_, f64>) -> Result<f64> {
        Ok(self.predict_values(features)?[0])
    }

    /// First output for every row of `features`.
    pub fn predict_batch(&self, features: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        features
            .axis_iter(Axis(0))
            .map(|row| self.predict(row))
            .collect::<Result<Vec<_>>>()
            .map(Array1::from)
    }

    /// Export as parallel arrays.
    pub fn to_arrays(&self) -> TreeArrays {
        let capacity = self.nodes.len();
        let mut arrays = TreeArrays {
            children_left: Vec::with_capacity(capacity),
            children_right: Vec::with_capacity(capacity),
            feature: Vec::with_capacity(capacity),
            threshold: Vec::with_capacity(capacity),
            value: Vec::with_capacity(capacity),
        };
        for node in &self.nodes {
            match node.children() {
                Some((left, right)) => {
                    arrays.children_left.push(left as i64);
                    arrays.children_right.push(right as i64);
                    arrays.feature.push(node.feature().unwrap_or_default() as i64);
                    arrays.threshold.push(node.threshold().unwrap_or_default());
                }
                None => {
                    arrays.children_left.push(TREE_LEAF);
                    arrays.children_right.push(TREE_LEAF);
                    arrays.feature.push(-2);
                    arrays.threshold.push(-2.0);
                }
            }
            arrays.value.push(node.value().to_vec());
        }
        arrays
    }
}

impl TryFrom<TreeArrays> for Tree {
    type Error = TreeMipError;

    fn try_from(arrays: TreeArrays) -> Result<Self> {
        let capacity = arrays.value.len();
        let width = arrays.value.first().map(Vec::len).unwrap_or(0);
        let flat: Vec<f64> = arrays.value.iter().flatten().copied().collect();
        if flat.len() != capacity * width {
            return Err(TreeMipError::invalid_tree("value rows have different widths"));
        }
        let value = Array2::from_shape_vec((capacity, width), flat)
            .map_err(|e| TreeMipError::invalid_tree(e.to_string()))?;
        Tree::from_arrays(
            &arrays.children_left,
            &arrays.children_right,
            &arrays.feature,
            &arrays.threshold,
            value.view(),
        )
    }
}

impl From<Tree> for TreeArrays {
    fn from(tree: Tree) -> Self {
        tree.to_arrays()
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tree(nodes={}, leaves={}, depth={}, outputs={})",
            self.capacity(),
            self.num_leaves(),
            self.depth(),
            self.n_outputs()
        )
    }
}
