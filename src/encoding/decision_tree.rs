//! Encoding of a single regression tree.
//!
//! Every (example, node) pair gets a binary activation variable `a[k,n]`.
//! Linear constraints make an internal node active exactly when one of its
//! children is, indicator constraints tie each branch to its split
//! comparison, and each leaf fixes the output when it is active.

use super::stats::ModelStats;
use super::{check_io_shapes, resolve_output};
use crate::config::EncoderConfig;
use crate::core::error::{Result, TreeMipError};
use crate::core::traits::{OptimizationModel, PredictorConstraints};
use crate::core::types::*;
use crate::model::expr::LinExpr;
use crate::tree::Tree;

use ndarray::Array2;

/// What [`add_decision_tree_constr`] added to a model.
#[derive(Debug, Clone)]
pub struct DecisionTreeConstr {
    name: String,
    input: Array2<VarId>,
    output: Array2<VarId>,
    node_vars: Array2<VarId>,
    stats: ModelStats,
}

impl DecisionTreeConstr {
    /// Node activation variables, `examples x capacity`.
    pub fn node_vars(&self) -> &Array2<VarId> {
        &self.node_vars
    }

    /// Encode `tree` under an explicit name. `output` must already exist.
    pub(crate) fn build<M>(
        model: &mut M,
        tree: &Tree,
        input: &Array2<VarId>,
        output: &Array2<VarId>,
        name: &str,
        config: &EncoderConfig,
    ) -> Result<Self>
    where
        M: OptimizationModel + ?Sized,
    {
        check_tree(tree, input, output.dim())?;
        let before = model.stats_snapshot();
        let node_vars = encode_tree(model, tree, input, output, name, config)?;
        let stats = model.stats_snapshot().added_since(&before);

        log::debug!(
            "Encoded {} with {} nodes for {} examples: {}",
            name,
            tree.capacity(),
            input.nrows(),
            stats
        );

        Ok(DecisionTreeConstr {
            name: name.to_string(),
            input: input.clone(),
            output: output.clone(),
            node_vars,
            stats,
        })
    }
}

impl PredictorConstraints for DecisionTreeConstr {
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
}

/// Add the constraints of `tree` to `model`, predicting `output` from `input`.
///
/// When `output` is `None` an `examples x 1` free output matrix is created.
/// Nothing is added when the tree or the shapes are rejected.
pub fn add_decision_tree_constr<M>(
    model: &mut M,
    tree: &Tree,
    input: &Array2<VarId>,
    output: Option<&Array2<VarId>>,
    config: &EncoderConfig,
) -> Result<DecisionTreeConstr>
where
    M: OptimizationModel + ?Sized,
{
    config.validate()?;
    let output_shape = output.map(|o| o.dim()).unwrap_or((input.nrows(), 1));
    check_tree(tree, input, output_shape)?;

    let before = model.stats_snapshot();
    let output = resolve_output(model, input, output);
    let mut constr = DecisionTreeConstr::build(model, tree, input, &output, &config.tree_name, config)?;
    constr.stats = model.stats_snapshot().added_since(&before);
    Ok(constr)
}

/// Checks run before a tree is encoded.
pub(crate) fn check_tree(
    tree: &Tree,
    input: &Array2<VarId>,
    output_shape: (usize, usize),
) -> Result<()> {
    if tree.n_outputs() != 1 {
        return Err(TreeMipError::no_model(
            tree.to_string(),
            format!(
                "Can only deal with 1-dimensional regression trees. Output dimension {}",
                tree.n_outputs()
            ),
        ));
    }
    check_io_shapes(input, output_shape)?;
    if let Some(feature) = tree.max_feature() {
        if feature >= input.ncols() {
            return Err(TreeMipError::dimension_mismatch(
                format!("input with at least {} columns", feature + 1),
                format!("{} columns", input.ncols()),
            ));
        }
    }
    Ok(())
}

fn encode_tree<M>(
    model: &mut M,
    tree: &Tree,
    input: &Array2<VarId>,
    output: &Array2<VarId>,
    name: &str,
    config: &EncoderConfig,
) -> Result<Array2<VarId>>
where
    M: OptimizationModel + ?Sized,
{
    let examples = input.nrows();
    let nodes = model.add_vars(
        (examples, tree.capacity()),
        0.0,
        1.0,
        VarType::Binary,
        "node",
    );

    let splits: Vec<(NodeIndex, NodeIndex, NodeIndex)> = tree
        .split_indices()
        .into_iter()
        .filter_map(|n| tree.nodes()[n].children().map(|(l, r)| (n, l, r)))
        .collect();

    // Structure rows go in as four groups, each over all splits and examples
    for group in StructureRow::ALL {
        for &(n, l, r) in &splits {
            for k in 0..examples {
                let (expr, sense, rhs) = group.row(nodes[[k, n]], nodes[[k, l]], nodes[[k, r]]);
                model.add_linear(
                    &format!("{}.{}[{},{}]", name, group.label(), k, n),
                    expr,
                    sense,
                    rhs,
                )?;
            }
        }
    }

    for (n, node) in tree.nodes().iter().enumerate() {
        match (node.children(), node.feature(), node.threshold()) {
            (Some((l, r)), Some(feature), Some(threshold)) => {
                let threshold = config.float_precision.round(threshold);
                let scale = config.threshold_scaling.scale_for(threshold);
                for k in 0..examples {
                    let x = input[[k, feature]];
                    model.add_indicator(
                        &format!("{}.left[{},{}]", name, k, n),
                        nodes[[k, l]],
                        true,
                        LinExpr::term(x, scale),
                        Sense::Le,
                        scale * threshold,
                    )?;
                    model.add_indicator(
                        &format!("{}.right[{},{}]", name, k, n),
                        nodes[[k, r]],
                        true,
                        LinExpr::term(x, scale),
                        Sense::Ge,
                        scale * threshold + config.epsilon,
                    )?;
                }
            }
            _ => {
                let value = node.value()[0];
                for k in 0..examples {
                    model.add_indicator(
                        &format!("{}.leaf[{},{}]", name, k, n),
                        nodes[[k, n]],
                        true,
                        LinExpr::term(output[[k, 0]], 1.0),
                        Sense::Eq,
                        value,
                    )?;
                }
            }
        }
    }

    let leaves = tree.leaf_indices();
    for k in 0..examples {
        let expr = LinExpr::sum(leaves.iter().map(|&n| nodes[[k, n]]));
        model.add_linear(&format!("{}.one_leaf[{}]", name, k), expr, Sense::Eq, 1.0)?;
    }

    let (lb, ub) = tree.leaf_value_range();
    for &y in output.column(0) {
        model.set_bounds(y, lb, ub)?;
    }

    Ok(nodes)
}

/// Rows linking a split node `n` to its children `l` and `r`.
#[derive(Debug, Clone, Copy)]
enum StructureRow {
    /// `a[n] >= a[l]`
    GeLeft,
    /// `a[n] >= a[r]`
    GeRight,
    /// `a[n] <= a[l] + a[r]`
    LeChildren,
    /// `a[l] + a[r] <= 1`
    OneChild,
}

impl StructureRow {
    const ALL: [StructureRow; 4] = [
        StructureRow::GeLeft,
        StructureRow::GeRight,
        StructureRow::LeChildren,
        StructureRow::OneChild,
    ];

    fn label(self) -> &'static str {
        match self {
            StructureRow::GeLeft => "ge_left",
            StructureRow::GeRight => "ge_right",
            StructureRow::LeChildren => "le_children",
            StructureRow::OneChild => "one_child",
        }
    }

    fn row(self, n: VarId, l: VarId, r: VarId) -> (LinExpr, Sense, f64) {
        match self {
            StructureRow::GeLeft => (LinExpr::term(n, 1.0).with_term(l, -1.0), Sense::Ge, 0.0),
            StructureRow::GeRight => (LinExpr::term(n, 1.0).with_term(r, -1.0), Sense::Ge, 0.0),
            StructureRow::LeChildren => (
                LinExpr::term(n, 1.0).with_term(l, -1.0).with_term(r, -1.0),
                Sense::Le,
                0.0,
            ),
            StructureRow::OneChild => (LinExpr::term(l, 1.0).with_term(r, 1.0), Sense::Le, 1.0),
        }
    }
}
