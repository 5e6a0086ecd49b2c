//! JSON documents holding trained predictors.
//!
//! A document is tagged by `kind` and stores every tree as the parallel
//! arrays a training library exports:
//!
//! ```json
//! {
//!   "kind": "gradient_boosting",
//!   "learning_rate": 0.1,
//!   "constant": 2.5,
//!   "trees": [
//!     {"children_left": [1, -1, -1], "children_right": [2, -1, -1],
//!      "feature": [0, -2, -2], "threshold": [0.5, -2.0, -2.0],
//!      "value": [[0.0], [-1.0], [1.0]]}
//!   ]
//! }
//! ```
//!
//! Trees are validated while they are read.

use crate::core::error::{Result, TreeMipError};
use crate::ensemble::{Combination, Predictor, TreeEnsemble};
use crate::tree::Tree;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// On-disk form of a [`Predictor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictorFile {
    /// A single regression tree
    DecisionTree {
        /// The tree
        tree: Tree,
    },
    /// A random forest regressor
    RandomForest {
        /// Member trees
        trees: Vec<Tree>,
    },
    /// A gradient boosting regressor
    GradientBoosting {
        /// Weight of every stage
        learning_rate: f64,
        /// Initial prediction added to the weighted sum
        constant: f64,
        /// Stage trees
        trees: Vec<Tree>,
    },
}

impl TryFrom<PredictorFile> for Predictor {
    type Error = TreeMipError;

    fn try_from(file: PredictorFile) -> Result<Self> {
        Ok(match file {
            PredictorFile::DecisionTree { tree } => Predictor::DecisionTree(tree),
            PredictorFile::RandomForest { trees } => {
                Predictor::RandomForest(TreeEnsemble::random_forest(trees)?)
            }
            PredictorFile::GradientBoosting {
                learning_rate,
                constant,
                trees,
            } => Predictor::GradientBoosting(TreeEnsemble::gradient_boosting(
                trees,
                learning_rate,
                constant,
            )?),
        })
    }
}

impl TryFrom<&Predictor> for PredictorFile {
    type Error = TreeMipError;

    fn try_from(predictor: &Predictor) -> Result<Self> {
        match predictor {
            Predictor::DecisionTree(tree) => Ok(PredictorFile::DecisionTree { tree: tree.clone() }),
            Predictor::RandomForest(forest) => {
                if forest.combination() != Combination::Mean {
                    return Err(TreeMipError::serialization(
                        "random forest members must be averaged",
                    ));
                }
                Ok(PredictorFile::RandomForest {
                    trees: forest.trees().cloned().collect(),
                })
            }
            Predictor::GradientBoosting(boosting) => {
                let learning_rate = match boosting.learning_rate() {
                    Some(rate) => rate,
                    // no stage carries the rate; any positive value reads back the same
                    None if boosting.n_estimators() == 0 => 1.0,
                    None => {
                        return Err(TreeMipError::serialization(
                            "gradient boosting stages must share one learning rate",
                        ))
                    }
                };
                Ok(PredictorFile::GradientBoosting {
                    learning_rate,
                    constant: boosting.bias(),
                    trees: boosting.trees().cloned().collect(),
                })
            }
        }
    }
}

impl Predictor {
    /// Parse a predictor document.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: PredictorFile = serde_json::from_str(json)?;
        Predictor::try_from(file)
    }

    /// Serialize into a predictor document.
    pub fn to_json(&self) -> Result<String> {
        let file = PredictorFile::try_from(self)?;
        Ok(serde_json::to_string_pretty(&file)?)
    }
}

/// Read a predictor document from `path`.
pub fn load_predictor<P: AsRef<Path>>(path: P) -> Result<Predictor> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let predictor = Predictor::from_json(&content)?;
    log::info!("Loaded {} from {}", predictor, path.display());
    Ok(predictor)
}

/// Write `predictor` to `path` as a predictor document.
pub fn save_predictor<P: AsRef<Path>>(predictor: &Predictor, path: P) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, predictor.to_json()?)?;
    log::info!("Saved {} to {}", predictor.kind(), path.display());
    Ok(())
}
