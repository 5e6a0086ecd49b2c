//! Core trait definitions for treemip.
//!
//! [`OptimizationModel`] is the seam to the optimization solver: encoders
//! only ever talk to a model through it. [`PredictorConstraints`] is the
//! common surface of every encoder record.

use crate::core::error::Result;
use crate::core::types::*;
use crate::encoding::stats::{write_stats_row, write_summary, ModelStats};
use crate::model::expr::LinExpr;
use ndarray::Array2;

use std::fmt::Debug;
use std::io::Write;

/// A mutable optimization model that accepts variables and constraints.
///
/// Implementations are expected to hand out dense [`VarId`]s in creation
/// order and to reject constraints that mention unknown variables.
pub trait OptimizationModel {
    /// Add a single variable.
    fn add_var(&mut self, name: &str, lb: f64, ub: f64, vtype: VarType) -> VarId;

    /// Add a `rows x cols` matrix of variables named `name[i,j]`.
    fn add_vars(
        &mut self,
        shape: (usize, usize),
        lb: f64,
        ub: f64,
        vtype: VarType,
        name: &str,
    ) -> Array2<VarId> {
        // from_shape_fn visits indices in row-major order, so ids stay dense per row
        Array2::from_shape_fn(shape, |(i, j)| {
            self.add_var(&format!("{}[{},{}]", name, i, j), lb, ub, vtype)
        })
    }

    /// Number of variables in the model.
    fn num_vars(&self) -> usize;

    /// Current `(lb, ub)` of a variable.
    fn bounds(&self, var: VarId) -> Result<(f64, f64)>;

    /// Replace the bounds of a variable.
    fn set_bounds(&mut self, var: VarId, lb: f64, ub: f64) -> Result<()>;

    /// Domain of a variable.
    fn var_type(&self, var: VarId) -> Result<VarType>;

    /// Add the linear constraint `expr (sense) rhs`.
    fn add_linear(&mut self, name: &str, expr: LinExpr, sense: Sense, rhs: f64) -> Result<()>;

    /// Add the indicator constraint `binary = active_value => expr (sense) rhs`.
    fn add_indicator(
        &mut self,
        name: &str,
        binary: VarId,
        active_value: bool,
        expr: LinExpr,
        sense: Sense,
        rhs: f64,
    ) -> Result<()>;

    /// Number of linear constraints.
    fn num_linear_constrs(&self) -> usize;

    /// Number of quadratic constraints.
    fn num_quadratic_constrs(&self) -> usize {
        0
    }

    /// Number of general constraints (indicators included).
    fn num_general_constrs(&self) -> usize;

    /// Snapshot of the model sizes, used to attribute additions to encoders.
    fn stats_snapshot(&self) -> ModelStats {
        ModelStats {
            variables: self.num_vars(),
            linear_constraints: self.num_linear_constrs(),
            quadratic_constraints: self.num_quadratic_constrs(),
            general_constraints: self.num_general_constrs(),
        }
    }
}

/// Record of what an encoder added to a model.
pub trait PredictorConstraints: Debug {
    /// Identifier used in statistics tables (e.g. `rf_tree`).
    fn name(&self) -> &str;

    /// Input variables the predictor reads, `examples x features`.
    fn input(&self) -> &Array2<VarId>;

    /// Output variables the predictor writes, `examples x 1`.
    fn output(&self) -> &Array2<VarId>;

    /// Variables and constraints added by this encoder and its children.
    fn stats(&self) -> ModelStats;

    /// Write a report of the model additions.
    ///
    /// With `abbrev` only the single table row is written.
    fn print_stats(&self, out: &mut dyn Write, abbrev: bool) -> std::io::Result<()> {
        if abbrev {
            return write_stats_row(out, self.name(), self.output().dim(), &self.stats());
        }
        write_summary(
            out,
            self.name(),
            self.input().dim(),
            self.output().dim(),
            &self.stats(),
        )
    }
}
