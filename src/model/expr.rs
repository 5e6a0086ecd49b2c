//! Linear expressions over model variables.

use crate::core::types::VarId;
use crate::model::solution::Solution;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// `Σ coeff · var + constant`, with terms kept sorted by variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinExpr {
    terms: BTreeMap<VarId, f64>,
    constant: f64,
}

impl LinExpr {
    /// The zero expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// A constant expression.
    pub fn constant(value: f64) -> Self {
        LinExpr {
            terms: BTreeMap::new(),
            constant: value,
        }
    }

    /// `coeff · var`.
    pub fn term(var: VarId, coeff: f64) -> Self {
        LinExpr::new().with_term(var, coeff)
    }

    /// `Σ vars`.
    pub fn sum<I: IntoIterator<Item = VarId>>(vars: I) -> Self {
        let mut expr = LinExpr::new();
        for var in vars {
            expr.add_term(var, 1.0);
        }
        expr
    }

    /// Add `coeff · var`, merging with an existing term on the same variable.
    pub fn add_term(&mut self, var: VarId, coeff: f64) {
        let entry = self.terms.entry(var).or_insert(0.0);
        *entry += coeff;
        if *entry == 0.0 {
            self.terms.remove(&var);
        }
    }

    /// Builder form of [`add_term`](Self::add_term).
    pub fn with_term(mut self, var: VarId, coeff: f64) -> Self {
        self.add_term(var, coeff);
        self
    }

    /// Add a constant offset.
    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// Constant part of the expression.
    pub fn constant_value(&self) -> f64 {
        self.constant
    }

    /// Non-zero terms in variable order.
    pub fn terms(&self) -> impl Iterator<Item = (VarId, f64)> + '_ {
        self.terms.iter().map(|(&var, &coeff)| (var, coeff))
    }

    /// Coefficient of `var` (zero if absent).
    pub fn coefficient(&self, var: VarId) -> f64 {
        self.terms.get(&var).copied().unwrap_or(0.0)
    }

    /// Number of non-zero terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True when the expression has no variable terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Split into its variable part and its constant.
    pub fn split_constant(mut self) -> (LinExpr, f64) {
        let constant = self.constant;
        self.constant = 0.0;
        (self, constant)
    }

    /// Value of the expression under `solution`.
    pub fn evaluate(&self, solution: &Solution) -> f64 {
        self.terms
            .iter()
            .map(|(&var, &coeff)| coeff * solution.value(var))
            .sum::<f64>()
            + self.constant
    }
}

impl From<VarId> for LinExpr {
    fn from(var: VarId) -> Self {
        LinExpr::term(var, 1.0)
    }
}

impl Add for LinExpr {
    type Output = LinExpr;

    fn add(mut self, rhs: LinExpr) -> LinExpr {
        for (var, coeff) in rhs.terms {
            self.add_term(var, coeff);
        }
        self.constant += rhs.constant;
        self
    }
}

impl Sub for LinExpr {
    type Output = LinExpr;

    fn sub(self, rhs: LinExpr) -> LinExpr {
        self + (-rhs)
    }
}

impl Neg for LinExpr {
    type Output = LinExpr;

    fn neg(self) -> LinExpr {
        self * -1.0
    }
}

impl Mul<f64> for LinExpr {
    type Output = LinExpr;

    fn mul(mut self, scale: f64) -> LinExpr {
        if scale == 0.0 {
            return LinExpr::new();
        }
        for coeff in self.terms.values_mut() {
            *coeff *= scale;
        }
        self.constant *= scale;
        self
    }
}

impl fmt::Display for LinExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (var, coeff) in self.terms() {
            if first {
                write!(f, "{} {}", coeff, var)?;
                first = false;
            } else if coeff < 0.0 {
                write!(f, " - {} {}", -coeff, var)?;
            } else {
                write!(f, " + {} {}", coeff, var)?;
            }
        }
        if first {
            write!(f, "{}", self.constant)
        } else if self.constant != 0.0 {
            write!(f, " {:+}", self.constant)
        } else {
            Ok(())
        }
    }
}
