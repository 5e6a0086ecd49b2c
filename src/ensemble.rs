//! Tree ensembles and the predictor variants accepted by the encoders.
//!
//! Random forests and gradient boosting share one representation: an
//! ordered list of `(tree, weight)` members plus a [`Combination`] rule.
//! A forest averages its members; boosting scales each stage by the
//! learning rate and adds the trained initial constant.

use crate::core::error::{Result, TreeMipError};
use crate::tree::Tree;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How member predictions are combined into the ensemble output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Combination {
    /// Arithmetic mean of the members (member weights are ignored)
    Mean,
    /// `bias + Σ weight_i · member_i`
    WeightedSumPlusBias {
        /// Constant added to the weighted sum
        bias: f64,
    },
}

impl Default for Combination {
    fn default() -> Self {
        Combination::Mean
    }
}

/// One tree of an ensemble.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleMember {
    /// The member tree
    pub tree: Tree,
    /// Weight in a weighted sum; `1/N` is implied for means
    pub weight: f64,
}

/// Ordered collection of trees with a combination rule.
///
/// Construct through [`random_forest`](Self::random_forest),
/// [`gradient_boosting`](Self::gradient_boosting) or [`new`](Self::new),
/// which validate the members.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEnsemble {
    members: Vec<EnsembleMember>,
    combination: Combination,
}

impl TreeEnsemble {
    /// Random forest: mean of `trees`.
    pub fn random_forest(trees: Vec<Tree>) -> Result<Self> {
        if trees.is_empty() {
            return Err(TreeMipError::invalid_ensemble(
                "random forest must contain at least one tree",
            ));
        }
        let weight = 1.0 / trees.len() as f64;
        let members = trees
            .into_iter()
            .map(|tree| EnsembleMember { tree, weight })
            .collect();
        Self::new(members, Combination::Mean)
    }

    /// Gradient boosting: `constant + learning_rate · Σ stage`.
    pub fn gradient_boosting(trees: Vec<Tree>, learning_rate: f64, constant: f64) -> Result<Self> {
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(TreeMipError::invalid_parameter(
                "learning_rate",
                learning_rate.to_string(),
                "must be finite and positive",
            ));
        }
        let members = trees
            .into_iter()
            .map(|tree| EnsembleMember {
                tree,
                weight: learning_rate,
            })
            .collect();
        Self::new(members, Combination::WeightedSumPlusBias { bias: constant })
    }

    /// General constructor; checks that all members agree on output width.
    pub fn new(members: Vec<EnsembleMember>, combination: Combination) -> Result<Self> {
        if let Combination::WeightedSumPlusBias { bias } = combination {
            if !bias.is_finite() {
                return Err(TreeMipError::invalid_parameter(
                    "constant",
                    bias.to_string(),
                    "must be finite",
                ));
            }
        }
        if combination == Combination::Mean && members.is_empty() {
            return Err(TreeMipError::invalid_ensemble(
                "the mean of an empty ensemble is undefined",
            ));
        }
        if let Some((index, member)) = members
            .iter()
            .enumerate()
            .find(|(_, m)| !m.weight.is_finite())
        {
            return Err(TreeMipError::invalid_ensemble(format!(
                "member {} has non-finite weight {}",
                index, member.weight
            )));
        }
        if let Some(first) = members.first() {
            let width = first.tree.n_outputs();
            if let Some(index) = members.iter().position(|m| m.tree.n_outputs() != width) {
                return Err(TreeMipError::invalid_ensemble(format!(
                    "member {} has {} outputs, member 0 has {}",
                    index,
                    members[index].tree.n_outputs(),
                    width
                )));
            }
        } else {
            log::warn!("Ensemble has no members; its output is the constant term");
        }
        Ok(TreeEnsemble {
            members,
            combination,
        })
    }

    /// Members in order.
    pub fn members(&self) -> &[EnsembleMember] {
        &self.members
    }

    /// Member trees in order.
    pub fn trees(&self) -> impl Iterator<Item = &Tree> + '_ {
        self.members.iter().map(|m| &m.tree)
    }

    /// Combination rule.
    pub fn combination(&self) -> Combination {
        self.combination
    }

    /// Number of members.
    pub fn n_estimators(&self) -> usize {
        self.members.len()
    }

    /// Output width shared by all members (1 for an empty ensemble).
    pub fn n_outputs(&self) -> usize {
        self.members.first().map(|m| m.tree.n_outputs()).unwrap_or(1)
    }

    /// Common member weight of a weighted sum, if all members share one.
    pub fn learning_rate(&self) -> Option<f64> {
        match self.combination {
            Combination::Mean => None,
            Combination::WeightedSumPlusBias { .. } => {
                let first = self.members.first()?.weight;
                self.members
                    .iter()
                    .all(|m| m.weight == first)
                    .then_some(first)
            }
        }
    }

    /// Constant term of a weighted sum.
    pub fn bias(&self) -> f64 {
        match self.combination {
            Combination::Mean => 0.0,
            Combination::WeightedSumPlusBias { bias } => bias,
        }
    }

    /// Native evaluation of the first output.
    pub fn predict(&self, features: ArrayView1<'_, f64>) -> Result<f64> {
        match self.combination {
            Combination::Mean => {
                let mut total = 0.0;
                for tree in self.trees() {
                    total += tree.predict(features)?;
                }
                Ok(total / self.members.len() as f64)
            }
            Combination::WeightedSumPlusBias { bias } => {
                let mut total = bias;
                for member in &self.members {
                    total += member.weight * member.tree.predict(features)?;
                }
                Ok(total)
            }
        }
    }
}

/// Predictor kinds the encoders accept.
#[derive(Debug, Clone, PartialEq)]
pub enum Predictor {
    /// A single regression tree
    DecisionTree(Tree),
    /// A random forest regressor
    RandomForest(TreeEnsemble),
    /// A gradient boosting regressor
    GradientBoosting(TreeEnsemble),
}

impl Predictor {
    /// Output width of the predictor.
    pub fn n_outputs(&self) -> usize {
        match self {
            Predictor::DecisionTree(tree) => tree.n_outputs(),
            Predictor::RandomForest(ensemble) | Predictor::GradientBoosting(ensemble) => {
                ensemble.n_outputs()
            }
        }
    }

    /// Minimum number of input columns the splits reference.
    pub fn n_features_required(&self) -> usize {
        let max_feature = match self {
            Predictor::DecisionTree(tree) => tree.max_feature(),
            Predictor::RandomForest(ensemble) | Predictor::GradientBoosting(ensemble) => {
                ensemble.trees().filter_map(Tree::max_feature).max()
            }
        };
        max_feature.map(|f| f + 1).unwrap_or(0)
    }

    /// Native evaluation of the first output.
    pub fn predict(&self, features: ArrayView1<'_, f64>) -> Result<f64> {
        match self {
            Predictor::DecisionTree(tree) => tree.predict(features),
            Predictor::RandomForest(ensemble) | Predictor::GradientBoosting(ensemble) => {
                ensemble.predict(features)
            }
        }
    }

    /// Short kind name used in logs and file tags.
    pub fn kind(&self) -> &'static str {
        match self {
            Predictor::DecisionTree(_) => "decision_tree",
            Predictor::RandomForest(_) => "random_forest",
            Predictor::GradientBoosting(_) => "gradient_boosting",
        }
    }
}

impl fmt::Display for Predictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predictor::DecisionTree(tree) => write!(f, "DecisionTreeRegressor({})", tree),
            Predictor::RandomForest(ensemble) => write!(
                f,
                "RandomForestRegressor(n_estimators={}, n_outputs={})",
                ensemble.n_estimators(),
                ensemble.n_outputs()
            ),
            Predictor::GradientBoosting(ensemble) => write!(
                f,
                "GradientBoostingRegressor(n_estimators={}, constant={})",
                ensemble.n_estimators(),
                ensemble.bias()
            ),
        }
    }
}

impl From<Tree> for Predictor {
    fn from(tree: Tree) -> Self {
        Predictor::DecisionTree(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeNode;
    use ndarray::array;

    fn stump(threshold: f64, left: f64, right: f64) -> Tree {
        Tree::new(vec![
            TreeNode::split(0, threshold, 1, 2),
            TreeNode::leaf(left),
            TreeNode::leaf(right),
        ])
        .unwrap()
    }

    #[test]
    fn test_random_forest_mean() {
        let forest =
            TreeEnsemble::random_forest(vec![stump(0.0, 1.0, 2.0), stump(1.0, 3.0, 5.0)]).unwrap();
        assert_eq!(forest.n_estimators(), 2);
        assert_eq!(forest.combination(), Combination::Mean);
        assert_eq!(forest.members()[0].weight, 0.5);
        assert_eq!(forest.learning_rate(), None);
        assert_eq!(forest.predict(array![0.5].view()).unwrap(), 2.5);
    }

    #[test]
    fn test_gradient_boosting_sum() {
        let boosting = TreeEnsemble::gradient_boosting(
            vec![stump(0.0, 1.0, 2.0), stump(1.0, 3.0, 5.0)],
            0.1,
            10.0,
        )
        .unwrap();
        assert_eq!(boosting.learning_rate(), Some(0.1));
        assert_eq!(boosting.bias(), 10.0);
        let prediction = boosting.predict(array![2.0].view()).unwrap();
        assert!((prediction - (10.0 + 0.1 * (2.0 + 5.0))).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_ensembles() {
        assert!(TreeEnsemble::random_forest(vec![]).is_err());
        assert!(TreeEnsemble::gradient_boosting(vec![stump(0.0, 1.0, 2.0)], 0.0, 0.0).is_err());
        assert!(TreeEnsemble::gradient_boosting(vec![], 0.1, f64::NAN).is_err());

        let wide = Tree::new(vec![TreeNode::leaf_multi(vec![1.0, 2.0])]).unwrap();
        let mixed = TreeEnsemble::random_forest(vec![stump(0.0, 1.0, 2.0), wide]);
        assert!(matches!(mixed, Err(TreeMipError::InvalidEnsemble { .. })));
    }

    #[test]
    fn test_empty_boosting_is_constant() {
        let boosting = TreeEnsemble::gradient_boosting(vec![], 0.1, 4.0).unwrap();
        assert_eq!(boosting.n_outputs(), 1);
        assert_eq!(boosting.learning_rate(), None);
        assert_eq!(boosting.predict(array![0.0].view()).unwrap(), 4.0);
    }

    #[test]
    fn test_predictor_helpers() {
        let predictor = Predictor::from(stump(0.0, 1.0, 2.0));
        assert_eq!(predictor.kind(), "decision_tree");
        assert_eq!(predictor.n_outputs(), 1);
        assert_eq!(predictor.n_features_required(), 1);
        assert!(predictor.to_string().starts_with("DecisionTreeRegressor(Tree(nodes=3"));

        let forest = Predictor::RandomForest(
            TreeEnsemble::random_forest(vec![Tree::constant(1.0)]).unwrap(),
        );
        assert_eq!(forest.n_features_required(), 0);
        assert_eq!(forest.predict(ndarray::Array1::<f64>::zeros(0).view()).unwrap(), 1.0);
    }
}
