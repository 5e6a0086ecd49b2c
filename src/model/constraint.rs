//! Variable and constraint records stored by [`Model`](crate::model::Model).

use crate::core::types::{Sense, VarId, VarType};
use crate::model::expr::LinExpr;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A decision variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Display name
    pub name: String,
    /// Lower bound (may be `-inf`)
    pub lb: f64,
    /// Upper bound (may be `+inf`)
    pub ub: f64,
    /// Domain
    pub vtype: VarType,
}

/// `expr (sense) rhs`, with the constant of `expr` folded into `rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraint {
    /// Display name
    pub name: String,
    /// Left-hand side without constant
    pub expr: LinExpr,
    /// Comparison
    pub sense: Sense,
    /// Right-hand side
    pub rhs: f64,
}

/// `binary = active_value => expr (sense) rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConstraint {
    /// Display name
    pub name: String,
    /// Controlling binary variable
    pub binary: VarId,
    /// Value of `binary` that activates the constraint
    pub active_value: bool,
    /// Left-hand side without constant
    pub expr: LinExpr,
    /// Comparison
    pub sense: Sense,
    /// Right-hand side
    pub rhs: f64,
}

impl IndicatorConstraint {
    /// Value `binary` takes when the implication is enforced.
    pub fn trigger(&self) -> f64 {
        if self.active_value {
            1.0
        } else {
            0.0
        }
    }
}

/// One way a candidate solution fails a model.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// Value outside `[lb, ub]`
    Bound {
        var: VarId,
        value: f64,
        lb: f64,
        ub: f64,
    },
    /// Non-integral value of a binary/integer variable
    Integrality { var: VarId, value: f64 },
    /// Linear row not satisfied
    Linear {
        name: String,
        lhs: f64,
        sense: Sense,
        rhs: f64,
    },
    /// Active indicator whose implied row is not satisfied
    Indicator {
        name: String,
        lhs: f64,
        sense: Sense,
        rhs: f64,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Bound { var, value, lb, ub } => {
                write!(f, "{} = {} outside [{}, {}]", var, value, lb, ub)
            }
            Violation::Integrality { var, value } => {
                write!(f, "{} = {} is not integral", var, value)
            }
            Violation::Linear {
                name,
                lhs,
                sense,
                rhs,
            } => write!(f, "linear {}: {} {} {} violated", name, lhs, sense, rhs),
            Violation::Indicator {
                name,
                lhs,
                sense,
                rhs,
            } => write!(f, "indicator {}: {} {} {} violated", name, lhs, sense, rhs),
        }
    }
}
