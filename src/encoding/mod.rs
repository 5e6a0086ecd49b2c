//! Encoders that insert tree predictors into an optimization model.
//!
//! Each encoder checks the predictor and the variable shapes first, then
//! appends variables and constraints to the model, and returns a record of
//! what it added. [`add_predictor_constr`] dispatches on [`Predictor`].

pub mod decision_tree;
pub mod stats;
pub mod tree_ensemble;

pub use decision_tree::{add_decision_tree_constr, DecisionTreeConstr};
pub use stats::ModelStats;
pub use tree_ensemble::{
    add_gradient_boosting_constr, add_random_forest_constr, add_tree_ensemble_constr,
    GradientBoostingConstr, RandomForestConstr, TreeEnsembleConstr,
};

use crate::config::EncoderConfig;
use crate::core::error::{Result, TreeMipError};
use crate::core::traits::{OptimizationModel, PredictorConstraints};
use crate::core::types::{VarId, VarType};
use crate::ensemble::Predictor;

use ndarray::Array2;
use std::io::Write;

/// Record of any encoder, as returned by [`add_predictor_constr`].
#[derive(Debug, Clone)]
pub enum PredictorConstr {
    /// A single tree
    DecisionTree(DecisionTreeConstr),
    /// A random forest
    RandomForest(RandomForestConstr),
    /// A gradient boosting regressor
    GradientBoosting(GradientBoostingConstr),
}

impl PredictorConstr {
    fn inner(&self) -> &dyn PredictorConstraints {
        match self {
            PredictorConstr::DecisionTree(c) => c,
            PredictorConstr::RandomForest(c) | PredictorConstr::GradientBoosting(c) => c,
        }
    }

    /// Member encoders of an ensemble; empty for a single tree.
    pub fn estimators(&self) -> &[DecisionTreeConstr] {
        match self {
            PredictorConstr::DecisionTree(_) => &[],
            PredictorConstr::RandomForest(c) | PredictorConstr::GradientBoosting(c) => {
                c.estimators()
            }
        }
    }

    /// The single-tree record, if this is one.
    pub fn as_decision_tree(&self) -> Option<&DecisionTreeConstr> {
        match self {
            PredictorConstr::DecisionTree(c) => Some(c),
            _ => None,
        }
    }

    /// The ensemble record, if this is one.
    pub fn as_tree_ensemble(&self) -> Option<&TreeEnsembleConstr> {
        match self {
            PredictorConstr::DecisionTree(_) => None,
            PredictorConstr::RandomForest(c) | PredictorConstr::GradientBoosting(c) => Some(c),
        }
    }
}

impl PredictorConstraints for PredictorConstr {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn input(&self) -> &Array2<VarId> {
        self.inner().input()
    }

    fn output(&self) -> &Array2<VarId> {
        self.inner().output()
    }

    fn stats(&self) -> ModelStats {
        self.inner().stats()
    }

    fn print_stats(&self, out: &mut dyn Write, abbrev: bool) -> std::io::Result<()> {
        self.inner().print_stats(out, abbrev)
    }
}

/// Insert `predictor` into `model`, predicting `output` from `input`.
///
/// `input` is `examples x features`. When `output` is `None` a free
/// `examples x 1` output matrix is created.
pub fn add_predictor_constr<M>(
    model: &mut M,
    predictor: &Predictor,
    input: &Array2<VarId>,
    output: Option<&Array2<VarId>>,
    config: &EncoderConfig,
) -> Result<PredictorConstr>
where
    M: OptimizationModel + ?Sized,
{
    log::debug!("Adding {} to the model", predictor);
    let constr = match predictor {
        Predictor::DecisionTree(tree) => {
            PredictorConstr::DecisionTree(add_decision_tree_constr(model, tree, input, output, config)?)
        }
        Predictor::RandomForest(forest) => PredictorConstr::RandomForest(add_random_forest_constr(
            model, forest, input, output, config,
        )?),
        Predictor::GradientBoosting(boosting) => PredictorConstr::GradientBoosting(
            add_gradient_boosting_constr(model, boosting, input, output, config)?,
        ),
    };
    Ok(constr)
}

/// Input and output must agree on examples; the output is one column wide.
pub(crate) fn check_io_shapes(input: &Array2<VarId>, output_shape: (usize, usize)) -> Result<()> {
    let (rows, cols) = output_shape;
    if rows != input.nrows() {
        return Err(TreeMipError::dimension_mismatch(
            format!("{} output rows", input.nrows()),
            format!("{} output rows", rows),
        ));
    }
    if cols != 1 {
        return Err(TreeMipError::dimension_mismatch(
            "1 output column",
            format!("{} output columns", cols),
        ));
    }
    Ok(())
}

/// Caller's output matrix, or a fresh free `examples x 1` one.
pub(crate) fn resolve_output<M>(
    model: &mut M,
    input: &Array2<VarId>,
    output: Option<&Array2<VarId>>,
) -> Array2<VarId>
where
    M: OptimizationModel + ?Sized,
{
    match output {
        Some(output) => output.clone(),
        None => model.add_vars(
            (input.nrows(), 1),
            f64::NEG_INFINITY,
            f64::INFINITY,
            VarType::Continuous,
            "output",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensemble::TreeEnsemble;
    use crate::model::Model;
    use crate::tree::{Tree, TreeNode};

    fn stump() -> Tree {
        Tree::new(vec![
            TreeNode::split(0, 0.0, 1, 2),
            TreeNode::leaf(1.0),
            TreeNode::leaf(2.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_dispatch() {
        let config = EncoderConfig::default();
        let predictors = [
            Predictor::from(stump()),
            Predictor::RandomForest(TreeEnsemble::random_forest(vec![stump(), stump()]).unwrap()),
            Predictor::GradientBoosting(
                TreeEnsemble::gradient_boosting(vec![stump()], 0.5, 1.0).unwrap(),
            ),
        ];
        let expected = [("tree", 0), ("rf", 2), ("gbt", 1)];

        for (predictor, (name, members)) in predictors.iter().zip(expected) {
            let mut model = Model::new("dispatch");
            let input = model.add_vars((2, 1), -1.0, 1.0, VarType::Continuous, "x");
            let constr = add_predictor_constr(&mut model, predictor, &input, None, &config).unwrap();
            assert_eq!(constr.name(), name);
            assert_eq!(constr.estimators().len(), members);
            assert_eq!(constr.output().dim(), (2, 1));
            assert_eq!(constr.stats().variables + 2, model.num_vars());
            assert_eq!(constr.as_tree_ensemble().is_some(), members > 0);
        }
    }

    #[test]
    fn test_caller_output_is_used() {
        let mut model = Model::new("output");
        let input = model.add_vars((1, 1), -1.0, 1.0, VarType::Continuous, "x");
        let output = model.add_vars((1, 1), -10.0, 10.0, VarType::Continuous, "y");
        let constr = add_predictor_constr(
            &mut model,
            &Predictor::from(stump()),
            &input,
            Some(&output),
            &EncoderConfig::default(),
        )
        .unwrap();
        assert_eq!(constr.output(), &output);
        assert_eq!(model.bounds(output[[0, 0]]).unwrap(), (1.0, 2.0));
        assert!(constr.as_decision_tree().is_some());
    }

    #[test]
    fn test_output_shape_checks() {
        let mut model = Model::new("shapes");
        let input = model.add_vars((2, 1), -1.0, 1.0, VarType::Continuous, "x");
        let wide = model.add_vars((2, 2), -1.0, 1.0, VarType::Continuous, "y");
        let err = add_predictor_constr(
            &mut model,
            &Predictor::from(stump()),
            &input,
            Some(&wide),
            &EncoderConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TreeMipError::DimensionMismatch { .. }));
        assert_eq!(model.num_vars(), 6);
    }
}
