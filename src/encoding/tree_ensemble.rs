//! Encoding of tree ensembles.
//!
//! Forests and boosting share one composition: every member tree writes
//! into its own column of an `examples x members` auxiliary matrix
//! (`estimator[k,i]`), and a single linear row per example combines the
//! columns into the final output according to the ensemble's
//! [`Combination`].

use super::decision_tree::{check_tree, DecisionTreeConstr};
use super::stats::{
    write_stats_footer, write_stats_header, write_stats_row, write_summary, ModelStats,
};
use super::{check_io_shapes, resolve_output};
use crate::config::EncoderConfig;
use crate::core::error::{Result, TreeMipError};
use crate::core::traits::{OptimizationModel, PredictorConstraints};
use crate::core::types::*;
use crate::ensemble::{Combination, TreeEnsemble};
use crate::model::expr::LinExpr;

use ndarray::{Array2, Axis};
use std::io::Write;

/// What an ensemble encoder added to a model.
#[derive(Debug, Clone)]
pub struct TreeEnsembleConstr {
    name: String,
    combination: Combination,
    input: Array2<VarId>,
    output: Array2<VarId>,
    estimator_vars: Array2<VarId>,
    estimators: Vec<DecisionTreeConstr>,
    stats: ModelStats,
}

/// Record returned by [`add_random_forest_constr`].
pub type RandomForestConstr = TreeEnsembleConstr;

/// Record returned by [`add_gradient_boosting_constr`].
pub type GradientBoostingConstr = TreeEnsembleConstr;

impl TreeEnsembleConstr {
    /// Per-member outputs, `examples x members`.
    pub fn estimator_vars(&self) -> &Array2<VarId> {
        &self.estimator_vars
    }

    /// Encoders of the member trees, in member order.
    pub fn estimators(&self) -> &[DecisionTreeConstr] {
        &self.estimators
    }

    /// Combination rule the output row implements.
    pub fn combination(&self) -> Combination {
        self.combination
    }

    /// Sum of the statistics of the member encoders.
    pub fn member_stats(&self) -> ModelStats {
        sum_stats(&self.estimators)
    }
}

fn sum_stats(estimators: &[DecisionTreeConstr]) -> ModelStats {
    estimators
        .iter()
        .fold(ModelStats::default(), |acc, e| acc + e.stats())
}

impl PredictorConstraints for TreeEnsembleConstr {
    fn name(&self) -> &str {
        &self.name
    }

    fn input(&self) -> &Array2<VarId> {
        &self.input
    }

    fn output(&self) -> &Array2<VarId> {
        &self.output
    }

    fn stats(&self) -> ModelStats {
        self.stats
    }

    fn print_stats(&self, out: &mut dyn Write, abbrev: bool) -> std::io::Result<()> {
        if abbrev {
            return write_stats_row(out, &self.name, self.output.dim(), &self.stats);
        }
        write_summary(
            out,
            &self.name,
            self.input.dim(),
            self.output.dim(),
            &self.stats,
        )?;
        writeln!(out)?;
        write_stats_header(out)?;
        for estimator in &self.estimators {
            estimator.print_stats(out, true)?;
        }
        write_stats_footer(out)
    }
}

/// Add a random forest (mean of its trees) to `model`.
pub fn add_random_forest_constr<M>(
    model: &mut M,
    forest: &TreeEnsemble,
    input: &Array2<VarId>,
    output: Option<&Array2<VarId>>,
    config: &EncoderConfig,
) -> Result<RandomForestConstr>
where
    M: OptimizationModel + ?Sized,
{
    if forest.combination() != Combination::Mean {
        return Err(TreeMipError::invalid_ensemble(
            "random forest members must be averaged",
        ));
    }
    add_tree_ensemble_constr(model, forest, input, output, &config.forest_name, config)
}

/// Add a gradient boosting regressor (`constant + lr * Σ stage`) to `model`.
pub fn add_gradient_boosting_constr<M>(
    model: &mut M,
    boosting: &TreeEnsemble,
    input: &Array2<VarId>,
    output: Option<&Array2<VarId>>,
    config: &EncoderConfig,
) -> Result<GradientBoostingConstr>
where
    M: OptimizationModel + ?Sized,
{
    if boosting.combination() == Combination::Mean {
        return Err(TreeMipError::invalid_ensemble(
            "gradient boosting stages must be combined by a weighted sum",
        ));
    }
    add_tree_ensemble_constr(model, boosting, input, output, &config.boosting_name, config)
}

/// Add any [`TreeEnsemble`] to `model` under `name`.
///
/// Member encoders are named `{name}_{tree_name}`. The whole ensemble is
/// checked before the first variable is added.
pub fn add_tree_ensemble_constr<M>(
    model: &mut M,
    ensemble: &TreeEnsemble,
    input: &Array2<VarId>,
    output: Option<&Array2<VarId>>,
    name: &str,
    config: &EncoderConfig,
) -> Result<TreeEnsembleConstr>
where
    M: OptimizationModel + ?Sized,
{
    config.validate()?;
    if ensemble.n_outputs() != 1 {
        return Err(TreeMipError::no_model(
            format!("{} ({} members)", name, ensemble.n_estimators()),
            format!(
                "Can only deal with 1-dimensional regression. Output dimension {}",
                ensemble.n_outputs()
            ),
        ));
    }
    let output_shape = output.map(|o| o.dim()).unwrap_or((input.nrows(), 1));
    check_io_shapes(input, output_shape)?;
    for tree in ensemble.trees() {
        check_tree(tree, input, (input.nrows(), 1))?;
    }

    let before = model.stats_snapshot();
    let output = resolve_output(model, input, output);
    let examples = input.nrows();
    let estimator_vars = model.add_vars(
        (examples, ensemble.n_estimators()),
        f64::NEG_INFINITY,
        f64::INFINITY,
        VarType::Continuous,
        "estimator",
    );

    let member_name = format!("{}_{}", name, config.tree_name);
    let mut estimators = Vec::with_capacity(ensemble.n_estimators());
    for (i, tree) in ensemble.trees().enumerate() {
        let column = estimator_vars.column(i).to_owned().insert_axis(Axis(1));
        estimators.push(DecisionTreeConstr::build(
            model,
            tree,
            input,
            &column,
            &member_name,
            config,
        )?);
    }

    for k in 0..examples {
        let y = output[[k, 0]];
        let (expr, rhs) = match ensemble.combination() {
            Combination::Mean => {
                let mut expr = LinExpr::term(y, ensemble.n_estimators() as f64);
                for &aux in estimator_vars.row(k) {
                    expr.add_term(aux, -1.0);
                }
                (expr, 0.0)
            }
            Combination::WeightedSumPlusBias { bias } => {
                let mut expr = LinExpr::term(y, 1.0);
                for (member, &aux) in ensemble.members().iter().zip(estimator_vars.row(k)) {
                    expr.add_term(aux, -member.weight);
                }
                (expr, bias)
            }
        };
        model.add_linear(&format!("{}.combine[{}]", name, k), expr, Sense::Eq, rhs)?;
    }

    let stats = model.stats_snapshot().added_since(&before);
    log::debug!(
        "Encoded {} with {} members for {} examples: members {}; combination {}",
        name,
        ensemble.n_estimators(),
        examples,
        sum_stats(&estimators),
        stats.added_since(&sum_stats(&estimators))
    );

    Ok(TreeEnsembleConstr {
        name: name.to_string(),
        combination: ensemble.combination(),
        input: input.clone(),
        output,
        estimator_vars,
        estimators,
        stats,
    })
}
