//! In-memory optimization model.
//!
//! [`Model`] records variables, linear rows and indicator constraints the
//! way a solver front-end would, without solving anything. It can export
//! itself in LP format and check candidate solutions, which is how the
//! encoders are verified.

use crate::core::error::{Result, TreeMipError};
use crate::core::traits::OptimizationModel;
use crate::core::types::*;
use crate::model::constraint::{IndicatorConstraint, LinearConstraint, Variable, Violation};
use crate::model::expr::LinExpr;
use crate::model::lp_format;
use crate::model::solution::Solution;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Recording optimization model.
#[derive(Debug, Clone, Default)]
pub struct Model {
    name: String,
    variables: Vec<Variable>,
    linear: Vec<LinearConstraint>,
    indicators: Vec<IndicatorConstraint>,
    objective: LinExpr,
    objective_sense: ObjectiveSense,
}

impl Model {
    /// Creates an empty model.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Model {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All variables in creation order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Variable record behind a handle.
    pub fn variable(&self, var: VarId) -> Result<&Variable> {
        self.variables
            .get(var.index())
            .ok_or_else(|| TreeMipError::unknown_variable(var.index(), self.variables.len()))
    }

    /// Linear constraints in creation order.
    pub fn linear_constraints(&self) -> &[LinearConstraint] {
        &self.linear
    }

    /// Indicator constraints in creation order.
    pub fn indicator_constraints(&self) -> &[IndicatorConstraint] {
        &self.indicators
    }

    /// Objective expression.
    pub fn objective(&self) -> &LinExpr {
        &self.objective
    }

    /// Objective direction.
    pub fn objective_sense(&self) -> ObjectiveSense {
        self.objective_sense
    }

    /// Replace the objective.
    pub fn set_objective(&mut self, expr: LinExpr, sense: ObjectiveSense) -> Result<()> {
        self.check_expr(&expr)?;
        self.objective = expr;
        self.objective_sense = sense;
        Ok(())
    }

    /// Fix a variable to a single value.
    pub fn fix(&mut self, var: VarId, value: f64) -> Result<()> {
        self.set_bounds(var, value, value)
    }

    /// Every way `solution` fails this model, within `tolerance`.
    pub fn check_solution(&self, solution: &Solution, tolerance: f64) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (index, variable) in self.variables.iter().enumerate() {
            let var = VarId(index);
            let value = solution.value(var);
            if value < variable.lb - tolerance || value > variable.ub + tolerance {
                violations.push(Violation::Bound {
                    var,
                    value,
                    lb: variable.lb,
                    ub: variable.ub,
                });
            }
            if variable.vtype != VarType::Continuous && (value - value.round()).abs() > tolerance {
                violations.push(Violation::Integrality { var, value });
            }
        }

        for constraint in &self.linear {
            let lhs = constraint.expr.evaluate(solution);
            if !constraint.sense.holds(lhs, constraint.rhs, tolerance) {
                violations.push(Violation::Linear {
                    name: constraint.name.clone(),
                    lhs,
                    sense: constraint.sense,
                    rhs: constraint.rhs,
                });
            }
        }

        for constraint in &self.indicators {
            if (solution.value(constraint.binary) - constraint.trigger()).abs() > tolerance {
                continue;
            }
            let lhs = constraint.expr.evaluate(solution);
            if !constraint.sense.holds(lhs, constraint.rhs, tolerance) {
                violations.push(Violation::Indicator {
                    name: constraint.name.clone(),
                    lhs,
                    sense: constraint.sense,
                    rhs: constraint.rhs,
                });
            }
        }

        violations
    }

    /// True when `solution` satisfies every bound and constraint.
    pub fn is_feasible(&self, solution: &Solution, tolerance: f64) -> bool {
        self.check_solution(solution, tolerance).is_empty()
    }

    /// Write the model in LP format.
    pub fn write_lp<W: Write>(&self, out: &mut W) -> Result<()> {
        lp_format::write_lp(self, out)?;
        Ok(())
    }

    /// Save the model as an LP file.
    pub fn save_lp<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_lp(&mut writer)?;
        writer.flush()?;
        log::info!(
            "Wrote model '{}' ({} variables) to {}",
            self.name,
            self.variables.len(),
            path.display()
        );
        Ok(())
    }

    fn check_var(&self, var: VarId) -> Result<()> {
        if var.index() < self.variables.len() {
            Ok(())
        } else {
            Err(TreeMipError::unknown_variable(var.index(), self.variables.len()))
        }
    }

    fn check_expr(&self, expr: &LinExpr) -> Result<()> {
        for (var, _) in expr.terms() {
            self.check_var(var)?;
        }
        Ok(())
    }
}

impl OptimizationModel for Model {
    fn add_var(&mut self, name: &str, lb: f64, ub: f64, vtype: VarType) -> VarId {
        let (lb, ub) = match vtype {
            VarType::Binary => (lb.max(0.0), ub.min(1.0)),
            _ => (lb, ub),
        };
        self.variables.push(Variable {
            name: name.to_string(),
            lb,
            ub,
            vtype,
        });
        VarId(self.variables.len() - 1)
    }

    fn num_vars(&self) -> usize {
        self.variables.len()
    }

    fn bounds(&self, var: VarId) -> Result<(f64, f64)> {
        let variable = self.variable(var)?;
        Ok((variable.lb, variable.ub))
    }

    fn set_bounds(&mut self, var: VarId, lb: f64, ub: f64) -> Result<()> {
        self.check_var(var)?;
        let variable = &mut self.variables[var.index()];
        variable.lb = lb;
        variable.ub = ub;
        Ok(())
    }

    fn var_type(&self, var: VarId) -> Result<VarType> {
        Ok(self.variable(var)?.vtype)
    }

    fn add_linear(&mut self, name: &str, expr: LinExpr, sense: Sense, rhs: f64) -> Result<()> {
        self.check_expr(&expr)?;
        let (expr, constant) = expr.split_constant();
        self.linear.push(LinearConstraint {
            name: name.to_string(),
            expr,
            sense,
            rhs: rhs - constant,
        });
        Ok(())
    }

    fn add_indicator(
        &mut self,
        name: &str,
        binary: VarId,
        active_value: bool,
        expr: LinExpr,
        sense: Sense,
        rhs: f64,
    ) -> Result<()> {
        if self.var_type(binary)? != VarType::Binary {
            return Err(TreeMipError::invalid_parameter(
                "binary",
                self.variables[binary.index()].name.clone(),
                "indicator variable must be binary",
            ));
        }
        self.check_expr(&expr)?;
        let (expr, constant) = expr.split_constant();
        self.indicators.push(IndicatorConstraint {
            name: name.to_string(),
            binary,
            active_value,
            expr,
            sense,
            rhs: rhs - constant,
        });
        Ok(())
    }

    fn num_linear_constrs(&self) -> usize {
        self.linear.len()
    }

    fn num_general_constrs(&self) -> usize {
        self.indicators.len()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Model({}, vars={}, linear={}, indicators={})",
            self.name,
            self.variables.len(),
            self.linear.len(),
            self.indicators.len()
        )
    }
}
