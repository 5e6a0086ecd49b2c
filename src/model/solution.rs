//! Candidate variable assignments.

use crate::core::types::VarId;
use serde::{Deserialize, Serialize};

/// Dense assignment of values to model variables, indexed by [`VarId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    values: Vec<f64>,
}

impl Solution {
    /// All-zero assignment for a model with `num_vars` variables.
    pub fn zeros(num_vars: usize) -> Self {
        Solution {
            values: vec![0.0; num_vars],
        }
    }

    /// Wrap an existing value vector.
    pub fn from_values(values: Vec<f64>) -> Self {
        Solution { values }
    }

    /// Value of `var`. Variables beyond the vector read as zero.
    pub fn value(&self, var: VarId) -> f64 {
        self.values.get(var.index()).copied().unwrap_or(0.0)
    }

    /// Assign `value` to `var`, growing the vector if needed.
    pub fn set(&mut self, var: VarId, value: f64) {
        if var.index() >= self.values.len() {
            self.values.resize(var.index() + 1, 0.0);
        }
        self.values[var.index()] = value;
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no value is stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw values in variable order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_grows() {
        let mut solution = Solution::zeros(2);
        solution.set(VarId(4), 1.5);
        assert_eq!(solution.len(), 5);
        assert_eq!(solution.value(VarId(4)), 1.5);
        assert_eq!(solution.value(VarId(1)), 0.0);
        assert_eq!(solution.value(VarId(10)), 0.0);
    }
}
