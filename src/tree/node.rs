//! Tree node representation.
//!
//! A node is either a split (feature, threshold, two children) or a leaf.
//! Every node carries a value vector with one entry per output; for leaves
//! it is the prediction, for splits it is whatever the training library
//! stored (usually the subtree mean) and is not used for encoding.

use crate::core::types::{FeatureIndex, NodeIndex};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Single node of a decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Left child node index (split nodes only)
    left_child: Option<NodeIndex>,
    /// Right child node index (split nodes only)
    right_child: Option<NodeIndex>,
    /// Split feature index (split nodes only)
    feature: Option<FeatureIndex>,
    /// Split threshold; samples with `x[feature] <= threshold` go left
    threshold: Option<f64>,
    /// Node value, one entry per output
    value: Vec<f64>,
}

impl TreeNode {
    /// Creates a single-output leaf.
    pub fn leaf(value: f64) -> Self {
        Self::leaf_multi(vec![value])
    }

    /// Creates a leaf with one value per output.
    pub fn leaf_multi(value: Vec<f64>) -> Self {
        TreeNode {
            left_child: None,
            right_child: None,
            feature: None,
            threshold: None,
            value,
        }
    }

    /// Creates a split node.
    pub fn split(
        feature: FeatureIndex,
        threshold: f64,
        left_child: NodeIndex,
        right_child: NodeIndex,
    ) -> Self {
        TreeNode {
            left_child: Some(left_child),
            right_child: Some(right_child),
            feature: Some(feature),
            threshold: Some(threshold),
            value: Vec::new(),
        }
    }

    /// Attach a node value (used when loading exported arrays).
    pub fn with_value(mut self, value: Vec<f64>) -> Self {
        self.value = value;
        self
    }

    /// Returns true if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.left_child.is_none() && self.right_child.is_none()
    }

    /// Left child index.
    pub fn left_child(&self) -> Option<NodeIndex> {
        self.left_child
    }

    /// Right child index.
    pub fn right_child(&self) -> Option<NodeIndex> {
        self.right_child
    }

    /// Both children, if this is a split node.
    pub fn children(&self) -> Option<(NodeIndex, NodeIndex)> {
        match (self.left_child, self.right_child) {
            (Some(left), Some(right)) => Some((left, right)),
            _ => None,
        }
    }

    /// Split feature index.
    pub fn feature(&self) -> Option<FeatureIndex> {
        self.feature
    }

    /// Split threshold.
    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }

    /// Node value vector.
    pub fn value(&self) -> &[f64] {
        &self.value
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.feature, self.threshold) {
            (Some(feature), Some(threshold)) if !self.is_leaf() => {
                write!(f, "Split(x[{}] <= {})", feature, threshold)
            }
            _ => write!(f, "Leaf({:?})", self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf() {
        let node = TreeNode::leaf(2.5);
        assert!(node.is_leaf());
        assert_eq!(node.value(), &[2.5]);
        assert_eq!(node.children(), None);
        assert_eq!(node.feature(), None);
        assert_eq!(node.to_string(), "Leaf([2.5])");
    }

    #[test]
    fn test_split() {
        let node = TreeNode::split(3, 0.5, 1, 2);
        assert!(!node.is_leaf());
        assert_eq!(node.children(), Some((1, 2)));
        assert_eq!(node.feature(), Some(3));
        assert_eq!(node.threshold(), Some(0.5));
        assert_eq!(node.to_string(), "Split(x[3] <= 0.5)");
    }
}
